//! Repository for the `comments` table.

use echo_core::request::{ACTION_COMMENTED, TARGET_REQUEST};
use echo_core::types::DbId;
use sqlx::PgPool;

use crate::models::comment::CommentWithAuthor;
use crate::repositories::ActivityRepo;

/// Provides the append-only comment thread of a request.
pub struct CommentRepo;

impl CommentRepo {
    /// Add a comment to a request and record a `"commented on"` activity.
    ///
    /// Both rows are written in one transaction. Returns `None` (and writes
    /// nothing) if the parent request does not exist.
    pub async fn create(
        pool: &PgPool,
        request_id: &str,
        user_id: DbId,
        content: &str,
    ) -> Result<Option<CommentWithAuthor>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        // Share-lock the parent so a concurrent delete cannot slip in between.
        let parent: Option<String> =
            sqlx::query_scalar("SELECT id FROM requests WHERE id = $1 FOR SHARE")
                .bind(request_id)
                .fetch_optional(&mut *tx)
                .await?;
        if parent.is_none() {
            return Ok(None);
        }

        let comment = sqlx::query_as::<_, CommentWithAuthor>(
            "WITH inserted AS ( \
                 INSERT INTO comments (request_id, user_id, content) \
                 VALUES ($1, $2, $3) \
                 RETURNING id, request_id, user_id, content, created_at \
             ) \
             SELECT i.id, i.request_id, i.user_id, i.content, i.created_at, u.name AS user_name \
             FROM inserted i \
             JOIN users u ON u.id = i.user_id",
        )
        .bind(request_id)
        .bind(user_id)
        .bind(content)
        .fetch_one(&mut *tx)
        .await?;

        ActivityRepo::record(&mut tx, user_id, ACTION_COMMENTED, TARGET_REQUEST, request_id)
            .await?;

        tx.commit().await?;
        Ok(Some(comment))
    }

    /// All comments for a request, oldest first. Empty for unknown ids.
    pub async fn list_for_request(
        pool: &PgPool,
        request_id: &str,
    ) -> Result<Vec<CommentWithAuthor>, sqlx::Error> {
        sqlx::query_as::<_, CommentWithAuthor>(
            "SELECT c.id, c.request_id, c.user_id, c.content, c.created_at, u.name AS user_name \
             FROM comments c \
             JOIN users u ON u.id = c.user_id \
             WHERE c.request_id = $1 \
             ORDER BY c.created_at ASC, c.id ASC",
        )
        .bind(request_id)
        .fetch_all(pool)
        .await
    }
}
