//! Account validation helpers used by registration and login.

use crate::error::CoreError;

/// Maximum length for a display name.
pub const MAX_NAME_LENGTH: usize = 200;

/// Validate registration input: every field must be non-blank and the email
/// must look like an address.
pub fn validate_registration(name: &str, email: &str, password: &str) -> Result<(), CoreError> {
    if name.trim().is_empty() {
        return Err(CoreError::Validation("Name is required".to_string()));
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(CoreError::Validation(format!(
            "Name exceeds maximum length of {MAX_NAME_LENGTH} characters"
        )));
    }
    validate_email(email)?;
    if password.is_empty() {
        return Err(CoreError::Validation("Password is required".to_string()));
    }
    Ok(())
}

/// Minimal shape check: one `@` with something on both sides.
pub fn validate_email(email: &str) -> Result<(), CoreError> {
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() && !domain.contains('@') => {
            Ok(())
        }
        _ => Err(CoreError::Validation(format!(
            "Invalid email address '{email}'"
        ))),
    }
}
