//! Activity (audit trail) model.

use echo_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// An activity row from the `activities` table.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Activity {
    pub id: DbId,
    pub user_id: DbId,
    /// Free-text verb: `"created"`, `"updated"`, `"commented on"`.
    pub action: String,
    pub target_type: String,
    pub target_id: String,
    pub created_at: Timestamp,
}

/// An activity annotated with the actor's display name.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ActivityWithActor {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub activity: Activity,
    pub user_name: String,
}
