//! Repository for the `requests` table and its `request_labels` /
//! `customer_requests` associations.

use echo_core::associations::{normalize_labels, reconcile};
use echo_core::request::{
    format_request_id, initial_id_candidate, parse_request_number, Priority, Status,
    ACTION_CREATED, ACTION_UPDATED, MAX_ID_ATTEMPTS, TARGET_REQUEST,
};
use echo_core::types::DbId;
use sqlx::PgPool;

use crate::models::request::{
    CreateRequest, Request, RequestDetail, RequestWithRelations, UpdateRequest,
};
use crate::repositories::{ActivityRepo, CommentRepo};

/// Column list for the `requests` table.
const COLUMNS: &str =
    "id, title, description, priority, status, effort, position, user_id, created_at, updated_at";

/// `requests` columns qualified with the `r` alias.
const R_COLUMNS: &str = "r.id, r.title, r.description, r.priority, r.status, r.effort, \
     r.position, r.user_id, r.created_at, r.updated_at";

/// Distinct labels and `{id, name}` customers of `r`, as correlated subqueries.
///
/// `ARRAY(...)` and the `COALESCE` keep both columns non-null when a request
/// has nothing attached.
const RELATION_COLUMNS: &str = "\
    ARRAY(SELECT DISTINCT rl.label FROM request_labels rl \
          WHERE rl.request_id = r.id ORDER BY rl.label) AS labels, \
    COALESCE((SELECT jsonb_agg(jsonb_build_object('id', c.id, 'name', c.name) ORDER BY c.name) \
              FROM customer_requests cr \
              JOIN customers c ON c.id = cr.customer_id \
              WHERE cr.request_id = r.id), '[]'::jsonb) AS customers";

type PgTransaction<'a> = sqlx::Transaction<'a, sqlx::Postgres>;

/// Provides CRUD and composite transactional writes for requests.
pub struct RequestRepo;

impl RequestRepo {
    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// List every request with its labels and customers, newest first.
    pub async fn list_with_relations(
        pool: &PgPool,
    ) -> Result<Vec<RequestWithRelations>, sqlx::Error> {
        let query = format!(
            "SELECT {R_COLUMNS}, {RELATION_COLUMNS} \
             FROM requests r \
             ORDER BY r.created_at DESC, r.id DESC"
        );
        sqlx::query_as::<_, RequestWithRelations>(&query)
            .fetch_all(pool)
            .await
    }

    /// Find one request with its labels and customers.
    pub async fn find_with_relations(
        pool: &PgPool,
        id: &str,
    ) -> Result<Option<RequestWithRelations>, sqlx::Error> {
        let query = format!(
            "SELECT {R_COLUMNS}, {RELATION_COLUMNS} \
             FROM requests r \
             WHERE r.id = $1"
        );
        sqlx::query_as::<_, RequestWithRelations>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find one request with relations, comments (oldest first) and
    /// activities (newest first).
    pub async fn find_detail(
        pool: &PgPool,
        id: &str,
    ) -> Result<Option<RequestDetail>, sqlx::Error> {
        let Some(request) = Self::find_with_relations(pool, id).await? else {
            return Ok(None);
        };
        let comments = CommentRepo::list_for_request(pool, id).await?;
        let activities = ActivityRepo::list_for_target(pool, TARGET_REQUEST, id).await?;

        Ok(Some(RequestDetail {
            request,
            comments,
            activities,
        }))
    }

    /// Requests linked to a customer, newest first.
    pub async fn list_for_customer(
        pool: &PgPool,
        customer_id: DbId,
    ) -> Result<Vec<Request>, sqlx::Error> {
        let query = format!(
            "SELECT {R_COLUMNS} \
             FROM requests r \
             JOIN customer_requests cr ON cr.request_id = r.id \
             WHERE cr.customer_id = $1 \
             ORDER BY r.created_at DESC, r.id DESC"
        );
        sqlx::query_as::<_, Request>(&query)
            .bind(customer_id)
            .fetch_all(pool)
            .await
    }

    // -----------------------------------------------------------------------
    // Composite writes
    // -----------------------------------------------------------------------

    /// Create a request with its customer links, labels, and a `"created"`
    /// activity, all in one transaction.
    ///
    /// The id is `REQ-<count + 1>`; if that id is already taken (after a
    /// delete, or by a concurrent creator) the next free number is used.
    /// Returns the bare request row.
    pub async fn create(
        pool: &PgPool,
        user_id: DbId,
        input: &CreateRequest,
    ) -> Result<Request, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM requests")
            .fetch_one(&mut *tx)
            .await?;

        let request = Self::insert_with_next_id(&mut tx, count, user_id, input).await?;

        let customers = reconcile(&[], &input.customers).to_add;
        Self::insert_customer_links(&mut tx, &request.id, &customers).await?;
        Self::insert_labels(&mut tx, &request.id, &normalize_labels(&input.labels)).await?;

        ActivityRepo::record(&mut tx, user_id, ACTION_CREATED, TARGET_REQUEST, &request.id)
            .await?;

        tx.commit().await?;

        tracing::debug!(request_id = %request.id, user_id, "Request row created");
        Ok(request)
    }

    /// Update a request. Only non-`None` fields in `input` are applied;
    /// `description: Some(None)` clears the description.
    ///
    /// Supplied `customers` / `labels` lists become the exact association
    /// sets; only the difference against the stored rows is written. An
    /// `"updated"` activity is appended in the same transaction.
    ///
    /// Returns `None` (and writes nothing) if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: &str,
        user_id: DbId,
        input: &UpdateRequest,
    ) -> Result<Option<Request>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let existing: Option<String> =
            sqlx::query_scalar("SELECT id FROM requests WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        if existing.is_none() {
            return Ok(None);
        }

        let update_query = format!(
            "UPDATE requests SET \
                title = COALESCE($2, title), \
                description = CASE WHEN $8 THEN $3 ELSE description END, \
                priority = COALESCE($4, priority), \
                effort = COALESCE($5, effort), \
                status = COALESCE($6, status), \
                position = COALESCE($7, position), \
                updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        let request = sqlx::query_as::<_, Request>(&update_query)
            .bind(id)
            .bind(&input.title)
            .bind(input.description.as_ref().and_then(|d| d.as_deref()))
            .bind(&input.priority)
            .bind(input.effort)
            .bind(&input.status)
            .bind(input.position)
            .bind(input.description.is_some())
            .fetch_one(&mut *tx)
            .await?;

        if let Some(customers) = &input.customers {
            Self::sync_customers(&mut tx, id, customers).await?;
        }
        if let Some(labels) = &input.labels {
            Self::sync_labels(&mut tx, id, labels).await?;
        }

        ActivityRepo::record(&mut tx, user_id, ACTION_UPDATED, TARGET_REQUEST, id).await?;

        tx.commit().await?;
        Ok(Some(request))
    }

    /// Delete a request together with its activity trail, in one
    /// transaction. Labels, customer links, and comments go with the row via
    /// `ON DELETE CASCADE`.
    ///
    /// Ids are reused after a delete, so the old trail must not survive to
    /// be read back under a new request.
    ///
    /// Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: &str) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let result = sqlx::query("DELETE FROM requests WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Ok(false);
        }

        let removed = ActivityRepo::delete_for_target(&mut tx, TARGET_REQUEST, id).await?;
        tx.commit().await?;

        tracing::debug!(request_id = %id, activities = removed, "Request row deleted");
        Ok(true)
    }

    // -----------------------------------------------------------------------
    // Association helpers
    // -----------------------------------------------------------------------

    /// Customer ids currently linked to a request, ascending.
    pub async fn customer_ids(pool: &PgPool, request_id: &str) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT customer_id FROM customer_requests \
             WHERE request_id = $1 ORDER BY customer_id",
        )
        .bind(request_id)
        .fetch_all(pool)
        .await
    }

    // -----------------------------------------------------------------------
    // Internal helpers
    // -----------------------------------------------------------------------

    /// Insert the request row, bumping the id candidate until one is free.
    ///
    /// `ON CONFLICT DO NOTHING` keeps the transaction usable when the
    /// candidate collides, so the retry happens in the same transaction.
    async fn insert_with_next_id(
        tx: &mut PgTransaction<'_>,
        existing_count: i64,
        user_id: DbId,
        input: &CreateRequest,
    ) -> Result<Request, sqlx::Error> {
        let insert_query = format!(
            "INSERT INTO requests \
                (id, title, description, priority, effort, status, position, user_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             ON CONFLICT (id) DO NOTHING \
             RETURNING {COLUMNS}"
        );
        let priority = input
            .priority
            .as_deref()
            .unwrap_or(Priority::default().as_str());
        let status = input
            .status
            .as_deref()
            .unwrap_or(Status::default().as_str());

        let mut candidate = initial_id_candidate(existing_count);
        for attempt in 1..=MAX_ID_ATTEMPTS {
            let id = format_request_id(candidate);
            let inserted = sqlx::query_as::<_, Request>(&insert_query)
                .bind(&id)
                .bind(&input.title)
                .bind(&input.description)
                .bind(priority)
                .bind(input.effort.unwrap_or(0))
                .bind(status)
                .bind(input.position.unwrap_or(0))
                .bind(user_id)
                .fetch_optional(&mut **tx)
                .await?;

            if let Some(request) = inserted {
                return Ok(request);
            }

            tracing::warn!(request_id = %id, attempt, "Request id already taken, retrying");
            candidate = Self::max_request_number(tx).await?.max(candidate) + 1;
        }

        Err(sqlx::Error::Protocol(format!(
            "could not allocate a request id after {MAX_ID_ATTEMPTS} attempts"
        )))
    }

    /// Highest numeric suffix among `REQ-<digits>` ids, or `0`.
    async fn max_request_number(tx: &mut PgTransaction<'_>) -> Result<i64, sqlx::Error> {
        let ids: Vec<String> = sqlx::query_scalar("SELECT id FROM requests")
            .fetch_all(&mut **tx)
            .await?;
        Ok(ids
            .iter()
            .filter_map(|id| parse_request_number(id))
            .max()
            .unwrap_or(0))
    }

    async fn insert_customer_links(
        tx: &mut PgTransaction<'_>,
        request_id: &str,
        customer_ids: &[DbId],
    ) -> Result<(), sqlx::Error> {
        if customer_ids.is_empty() {
            return Ok(());
        }
        sqlx::query(
            "INSERT INTO customer_requests (customer_id, request_id) \
             SELECT UNNEST($1::BIGINT[]), $2",
        )
        .bind(customer_ids)
        .bind(request_id)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    async fn insert_labels(
        tx: &mut PgTransaction<'_>,
        request_id: &str,
        labels: &[String],
    ) -> Result<(), sqlx::Error> {
        if labels.is_empty() {
            return Ok(());
        }
        sqlx::query(
            "INSERT INTO request_labels (request_id, label) \
             SELECT $1, UNNEST($2::TEXT[])",
        )
        .bind(request_id)
        .bind(labels)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    /// Reconcile customer links within an existing transaction.
    async fn sync_customers(
        tx: &mut PgTransaction<'_>,
        request_id: &str,
        desired: &[DbId],
    ) -> Result<(), sqlx::Error> {
        let current: Vec<DbId> =
            sqlx::query_scalar("SELECT customer_id FROM customer_requests WHERE request_id = $1")
                .bind(request_id)
                .fetch_all(&mut **tx)
                .await?;

        let diff = reconcile(&current, desired);
        if diff.is_noop() {
            return Ok(());
        }

        if !diff.to_remove.is_empty() {
            sqlx::query(
                "DELETE FROM customer_requests \
                 WHERE request_id = $1 AND customer_id = ANY($2)",
            )
            .bind(request_id)
            .bind(&diff.to_remove)
            .execute(&mut **tx)
            .await?;
        }
        Self::insert_customer_links(tx, request_id, &diff.to_add).await
    }

    /// Reconcile labels within an existing transaction.
    async fn sync_labels(
        tx: &mut PgTransaction<'_>,
        request_id: &str,
        desired: &[String],
    ) -> Result<(), sqlx::Error> {
        let current: Vec<String> =
            sqlx::query_scalar("SELECT label FROM request_labels WHERE request_id = $1")
                .bind(request_id)
                .fetch_all(&mut **tx)
                .await?;

        let diff = reconcile(&current, &normalize_labels(desired));
        if diff.is_noop() {
            return Ok(());
        }

        if !diff.to_remove.is_empty() {
            sqlx::query(
                "DELETE FROM request_labels \
                 WHERE request_id = $1 AND label = ANY($2)",
            )
            .bind(request_id)
            .bind(&diff.to_remove)
            .execute(&mut **tx)
            .await?;
        }
        Self::insert_labels(tx, request_id, &diff.to_add).await
    }
}
