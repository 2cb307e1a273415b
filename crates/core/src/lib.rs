//! Domain types and pure logic for the Echo request tracker.
//!
//! Nothing in this crate touches the network or the database; the `db`,
//! `api` and `client` crates build on it.

pub mod associations;
pub mod customer;
pub mod error;
pub mod request;
pub mod roles;
pub mod stats;
pub mod types;
pub mod user;
