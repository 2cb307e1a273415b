//! Customer entity model and DTOs.

use echo_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::request::Request;

/// A customer row from the `customers` table.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Customer {
    pub id: DbId,
    pub name: String,
    pub stage: Option<String>,
    pub revenue: Option<i64>,
    pub tier: Option<String>,
    /// Owner (the user who created the customer).
    pub user_id: Option<DbId>,
    pub created_at: Timestamp,
}

/// A customer with the number of requests linked to it.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CustomerWithRequestCount {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub customer: Customer,
    pub requests: i64,
}

/// A customer together with every request linked to it, newest first.
#[derive(Debug, Clone, Serialize)]
pub struct CustomerDetail {
    #[serde(flatten)]
    pub customer: Customer,
    pub requests: Vec<Request>,
}

/// Compact `{id, name}` reference embedded in request listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerRef {
    pub id: DbId,
    pub name: String,
}

/// DTO for creating a new customer.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCustomer {
    pub name: String,
    pub stage: Option<String>,
    pub revenue: Option<i64>,
    pub tier: Option<String>,
}

/// DTO for updating an existing customer. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCustomer {
    pub name: Option<String>,
    pub stage: Option<String>,
    pub revenue: Option<i64>,
    pub tier: Option<String>,
}
