//! Repository for the `activities` table.
//!
//! Rows are only appended, except when their target is deleted.

use echo_core::types::DbId;
use sqlx::PgPool;

use crate::models::activity::{Activity, ActivityWithActor};

/// Column list for `activities` queries.
const COLUMNS: &str = "id, user_id, action, target_type, target_id, created_at";

/// `activities` columns qualified with the `a` alias, plus the actor name.
const WITH_ACTOR_COLUMNS: &str = "a.id, a.user_id, a.action, a.target_type, a.target_id, \
     a.created_at, u.name AS user_name";

/// Records and reads audit-trail entries.
pub struct ActivityRepo;

impl ActivityRepo {
    /// Append an activity inside the caller's transaction.
    ///
    /// Activities are only ever written as part of a composite write, so
    /// there is no pool-level variant.
    pub async fn record(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        user_id: DbId,
        action: &str,
        target_type: &str,
        target_id: &str,
    ) -> Result<Activity, sqlx::Error> {
        let query = format!(
            "INSERT INTO activities (user_id, action, target_type, target_id) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Activity>(&query)
            .bind(user_id)
            .bind(action)
            .bind(target_type)
            .bind(target_id)
            .fetch_one(&mut **tx)
            .await
    }

    /// Remove the whole trail of a target inside the caller's transaction.
    /// Returns the number of rows removed.
    pub async fn delete_for_target(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        target_type: &str,
        target_id: &str,
    ) -> Result<u64, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM activities WHERE target_type = $1 AND target_id = $2")
                .bind(target_type)
                .bind(target_id)
                .execute(&mut **tx)
                .await?;
        Ok(result.rows_affected())
    }

    /// All activities for one target, newest first.
    pub async fn list_for_target(
        pool: &PgPool,
        target_type: &str,
        target_id: &str,
    ) -> Result<Vec<ActivityWithActor>, sqlx::Error> {
        let query = format!(
            "SELECT {WITH_ACTOR_COLUMNS} \
             FROM activities a \
             JOIN users u ON u.id = a.user_id \
             WHERE a.target_type = $1 AND a.target_id = $2 \
             ORDER BY a.created_at DESC, a.id DESC"
        );
        sqlx::query_as::<_, ActivityWithActor>(&query)
            .bind(target_type)
            .bind(target_id)
            .fetch_all(pool)
            .await
    }

    /// The most recent activities across all targets.
    pub async fn list_recent(
        pool: &PgPool,
        limit: i64,
    ) -> Result<Vec<ActivityWithActor>, sqlx::Error> {
        let query = format!(
            "SELECT {WITH_ACTOR_COLUMNS} \
             FROM activities a \
             JOIN users u ON u.id = a.user_id \
             ORDER BY a.created_at DESC, a.id DESC \
             LIMIT $1"
        );
        sqlx::query_as::<_, ActivityWithActor>(&query)
            .bind(limit)
            .fetch_all(pool)
            .await
    }
}
