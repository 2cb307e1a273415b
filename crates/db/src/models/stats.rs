//! Read-only dashboard aggregates.

use echo_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

use crate::models::activity::ActivityWithActor;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct StatusCount {
    pub status: String,
    pub count: i64,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PriorityCount {
    pub priority: String,
    pub count: i64,
}

/// Summary row for the "recent requests" widget.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RecentRequest {
    pub id: String,
    pub title: String,
    pub priority: String,
    pub status: String,
    pub created_at: Timestamp,
}

/// A customer ranked by number of linked requests.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TopCustomer {
    pub id: DbId,
    pub name: String,
    pub tier: Option<String>,
    pub revenue: Option<i64>,
    pub requests: i64,
}

/// Headline numbers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardMetrics {
    pub total_requests: i64,
    pub active_customers: i64,
    /// Whole percent, `0` when there are no requests.
    pub completion_rate: i64,
    /// One decimal place, `0.0` when there are no active customers.
    pub request_to_customer_ratio: f64,
}

/// Everything the dashboard renders, in one payload.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardStats {
    pub metrics: DashboardMetrics,
    /// Descending by count.
    pub requests_by_status: Vec<StatusCount>,
    /// Critical, High, Medium, Low, then anything else.
    pub requests_by_priority: Vec<PriorityCount>,
    pub recent_requests: Vec<RecentRequest>,
    pub recent_activities: Vec<ActivityWithActor>,
    pub top_customers: Vec<TopCustomer>,
}
