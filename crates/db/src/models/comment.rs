//! Comment entity model and DTOs.

use echo_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A comment row from the `comments` table.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Comment {
    pub id: DbId,
    pub request_id: String,
    pub user_id: DbId,
    pub content: String,
    pub created_at: Timestamp,
}

/// A comment annotated with the commenter's display name.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CommentWithAuthor {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub comment: Comment,
    pub user_name: String,
}

/// DTO for adding a comment. Empty content is stored as-is.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateComment {
    #[serde(default)]
    pub content: String,
}
