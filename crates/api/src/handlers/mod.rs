pub mod auth;
pub mod customer;
pub mod request;
pub mod stats;
