//! Customer validation.

use crate::error::CoreError;

/// Validate a customer name: required and non-blank.
pub fn validate_customer_name(name: &str) -> Result<(), CoreError> {
    if name.trim().is_empty() {
        return Err(CoreError::Validation(
            "Customer name is required".to_string(),
        ));
    }
    Ok(())
}

/// Revenue is a whole-currency amount and cannot be negative.
pub fn validate_revenue(revenue: Option<i64>) -> Result<(), CoreError> {
    match revenue {
        Some(r) if r < 0 => Err(CoreError::Validation(format!(
            "Revenue cannot be negative, got {r}"
        ))),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_is_required() {
        assert!(validate_customer_name("Acme").is_ok());
        assert!(validate_customer_name("").is_err());
        assert!(validate_customer_name("\t").is_err());
    }

    #[test]
    fn revenue_must_not_be_negative() {
        assert!(validate_revenue(None).is_ok());
        assert!(validate_revenue(Some(0)).is_ok());
        assert!(validate_revenue(Some(-10)).is_err());
    }
}
