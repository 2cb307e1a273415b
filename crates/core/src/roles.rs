//! Well-known role name constants.
//!
//! These must match the `CHECK` constraint on `users.role` in
//! `20250301000001_create_users.sql`.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_MEMBER: &str = "member";

/// Role assigned to every self-registered account.
pub const DEFAULT_ROLE: &str = ROLE_MEMBER;
