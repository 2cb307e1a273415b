//! Feature-request entity model and DTOs.

use echo_core::types::{DbId, Timestamp};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;

use crate::models::activity::ActivityWithActor;
use crate::models::comment::CommentWithAuthor;
use crate::models::customer::CustomerRef;

/// A request row from the `requests` table.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Request {
    /// Human-readable key, e.g. `REQ-007`.
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub priority: String,
    pub status: String,
    /// Estimated effort in weeks.
    pub effort: i32,
    /// Manual ordering within a list.
    pub position: i32,
    /// Creator.
    pub user_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A request with its distinct labels and linked customers.
///
/// Both collections are empty (never null) when nothing is attached.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RequestWithRelations {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub request: Request,
    pub labels: Vec<String>,
    pub customers: Json<Vec<CustomerRef>>,
}

/// Full detail view: relations plus the comment thread and activity log.
#[derive(Debug, Clone, Serialize)]
pub struct RequestDetail {
    #[serde(flatten)]
    pub request: RequestWithRelations,
    /// Oldest first.
    pub comments: Vec<CommentWithAuthor>,
    /// Newest first.
    pub activities: Vec<ActivityWithActor>,
}

/// DTO for creating a new request.
///
/// Omitted fields take the defaults of the new-request form: priority
/// `Medium`, status `Not Started`, effort and position `0`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateRequest {
    pub title: String,
    pub description: Option<String>,
    pub priority: Option<String>,
    pub effort: Option<i32>,
    pub status: Option<String>,
    pub position: Option<i32>,
    /// Customer ids to link.
    #[serde(default)]
    pub customers: Vec<DbId>,
    #[serde(default)]
    pub labels: Vec<String>,
}

/// DTO for updating an existing request. All fields are optional.
///
/// `description`: absent leaves it untouched, `null` clears it.
///
/// `customers` / `labels`: `None` leaves the associations untouched,
/// `Some(vec![])` clears them, anything else replaces them.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateRequest {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub description: Option<Option<String>>,
    pub priority: Option<String>,
    pub effort: Option<i32>,
    pub status: Option<String>,
    pub position: Option<i32>,
    pub customers: Option<Vec<DbId>>,
    pub labels: Option<Vec<String>>,
}

/// Marks a field as present, so an explicit `null` becomes `Some(None)`
/// while a missing field stays `None` through `#[serde(default)]`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_description_distinguishes_missing_from_null() {
        let missing: UpdateRequest = serde_json::from_str(r#"{"title":"A"}"#).unwrap();
        assert_eq!(missing.description, None);

        let cleared: UpdateRequest = serde_json::from_str(r#"{"description":null}"#).unwrap();
        assert_eq!(cleared.description, Some(None));

        let set: UpdateRequest = serde_json::from_str(r#"{"description":"x"}"#).unwrap();
        assert_eq!(set.description, Some(Some("x".to_string())));
    }
}
