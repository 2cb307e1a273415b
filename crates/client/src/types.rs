//! Wire types exchanged with the Echo API.
//!
//! Request priorities and statuses decode straight into the
//! [`echo_core::request`] enums; the server only ever stores valid values.

use echo_core::request::{Priority, Status};
use echo_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};

/* --------------------------------------------------------------------------
Auth
-------------------------------------------------------------------------- */

/// The authenticated user.
///
/// Register/login return the short form; `GET /api/auth/user` also carries
/// the timestamps.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct User {
    pub id: DbId,
    pub name: String,
    pub email: String,
    pub role: String,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
    #[serde(default)]
    pub last_login: Option<Timestamp>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

/// `{msg}` body returned by deletes.
#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub msg: String,
}

/* --------------------------------------------------------------------------
Requests
-------------------------------------------------------------------------- */

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Request {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
    pub status: Status,
    /// Weeks.
    pub effort: i32,
    pub position: i32,
    pub user_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CustomerRef {
    pub id: DbId,
    pub name: String,
}

/// List item from `GET /api/requests`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RequestWithRelations {
    #[serde(flatten)]
    pub request: Request,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub customers: Vec<CustomerRef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RequestDetail {
    #[serde(flatten)]
    pub request: RequestWithRelations,
    pub comments: Vec<Comment>,
    pub activities: Vec<Activity>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Comment {
    pub id: DbId,
    pub request_id: String,
    pub user_id: DbId,
    pub content: String,
    pub created_at: Timestamp,
    pub user_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Activity {
    pub id: DbId,
    pub user_id: DbId,
    pub action: String,
    pub target_type: String,
    pub target_id: String,
    pub created_at: Timestamp,
    pub user_name: String,
}

/// Body of `POST /api/requests`. Omitted fields take server defaults.
#[derive(Debug, Clone, Default, Serialize)]
pub struct NewRequest {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effort: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<i32>,
    pub customers: Vec<DbId>,
    pub labels: Vec<String>,
}

/// Body of `PUT /api/requests/{id}`.
///
/// Only `Some` fields are sent. `customers`/`labels` replace the whole set
/// when present; an empty list clears it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RequestChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effort: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customers: Option<Vec<DbId>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
}

impl RequestChanges {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Fold a later edit into this one. Fields set in `newer` win.
    pub fn merge(&mut self, newer: RequestChanges) {
        fn take<T>(slot: &mut Option<T>, value: Option<T>) {
            if value.is_some() {
                *slot = value;
            }
        }
        take(&mut self.title, newer.title);
        take(&mut self.description, newer.description);
        take(&mut self.priority, newer.priority);
        take(&mut self.status, newer.status);
        take(&mut self.effort, newer.effort);
        take(&mut self.position, newer.position);
        take(&mut self.customers, newer.customers);
        take(&mut self.labels, newer.labels);
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NewComment {
    pub content: String,
}

/* --------------------------------------------------------------------------
Customers
-------------------------------------------------------------------------- */

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Customer {
    pub id: DbId,
    pub name: String,
    pub stage: Option<String>,
    pub revenue: Option<i64>,
    pub tier: Option<String>,
    pub user_id: Option<DbId>,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CustomerWithRequestCount {
    #[serde(flatten)]
    pub customer: Customer,
    pub requests: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CustomerDetail {
    #[serde(flatten)]
    pub customer: Customer,
    pub requests: Vec<Request>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct NewCustomer {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revenue: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CustomerChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revenue: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier: Option<String>,
}

/* --------------------------------------------------------------------------
Dashboard
-------------------------------------------------------------------------- */

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DashboardMetrics {
    pub total_requests: i64,
    pub active_customers: i64,
    /// Whole percent.
    pub completion_rate: i64,
    pub request_to_customer_ratio: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatusCount {
    pub status: Status,
    pub count: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PriorityCount {
    pub priority: Priority,
    pub count: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecentRequest {
    pub id: String,
    pub title: String,
    pub priority: Priority,
    pub status: Status,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TopCustomer {
    pub id: DbId,
    pub name: String,
    pub tier: Option<String>,
    pub revenue: Option<i64>,
    pub requests: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DashboardStats {
    pub metrics: DashboardMetrics,
    pub requests_by_status: Vec<StatusCount>,
    pub requests_by_priority: Vec<PriorityCount>,
    pub recent_requests: Vec<RecentRequest>,
    pub recent_activities: Vec<Activity>,
    pub top_customers: Vec<TopCustomer>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn list_item_decodes_with_relations() {
        let item: RequestWithRelations = serde_json::from_value(json!({
            "id": "REQ-001",
            "title": "Add SSO",
            "description": null,
            "priority": "High",
            "status": "In Review",
            "effort": 2,
            "position": 0,
            "user_id": 1,
            "created_at": "2026-01-05T10:00:00Z",
            "updated_at": "2026-01-05T10:00:00Z",
            "labels": ["auth"],
            "customers": [{ "id": 7, "name": "Acme" }]
        }))
        .unwrap();

        assert_eq!(item.request.priority, Priority::High);
        assert_eq!(item.request.status, Status::InReview);
        assert_eq!(item.labels, vec!["auth"]);
        assert_eq!(item.customers[0].name, "Acme");
    }

    #[test]
    fn changes_only_serialize_set_fields() {
        let changes = RequestChanges {
            status: Some(Status::Completed),
            labels: Some(vec![]),
            ..Default::default()
        };

        assert_eq!(
            serde_json::to_value(&changes).unwrap(),
            json!({ "status": "Completed", "labels": [] })
        );
    }

    #[test]
    fn merge_keeps_earlier_fields_and_overrides_repeated_ones() {
        let mut pending = RequestChanges {
            title: Some("Draft".into()),
            effort: Some(1),
            ..Default::default()
        };
        pending.merge(RequestChanges {
            title: Some("Final".into()),
            priority: Some(Priority::Critical),
            ..Default::default()
        });

        assert_eq!(pending.title.as_deref(), Some("Final"));
        assert_eq!(pending.effort, Some(1));
        assert_eq!(pending.priority, Some(Priority::Critical));
        assert!(!pending.is_empty());
        assert!(RequestChanges::default().is_empty());
    }
}
