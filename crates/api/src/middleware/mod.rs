//! Request extractors.
//!
//! - [`auth::AuthUser`] -- the authenticated caller, decoded from a token header.

pub mod auth;
