//! Row structs (`FromRow`) and input DTOs (`Deserialize`) for every table.

pub mod activity;
pub mod comment;
pub mod customer;
pub mod request;
pub mod stats;
pub mod user;
