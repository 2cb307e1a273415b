//! Read-only aggregate queries backing the dashboard.

use echo_core::request::{priority_sort_key, Status};
use echo_core::stats::{
    completion_rate, request_to_customer_ratio, DASHBOARD_LIST_LIMIT, STAGE_ACTIVE,
};
use sqlx::PgPool;

use crate::models::stats::{
    DashboardMetrics, DashboardStats, PriorityCount, RecentRequest, StatusCount, TopCustomer,
};
use crate::repositories::ActivityRepo;

/// Dashboard aggregates. Every method is a plain read; nothing here writes.
pub struct StatsRepo;

impl StatsRepo {
    /// Assemble the full dashboard payload.
    pub async fn dashboard(pool: &PgPool) -> Result<DashboardStats, sqlx::Error> {
        let metrics = Self::metrics(pool).await?;
        let requests_by_status = Self::requests_by_status(pool).await?;
        let requests_by_priority = Self::requests_by_priority(pool).await?;
        let recent_requests = Self::recent_requests(pool, DASHBOARD_LIST_LIMIT).await?;
        let recent_activities = ActivityRepo::list_recent(pool, DASHBOARD_LIST_LIMIT).await?;
        let top_customers = Self::top_customers(pool, DASHBOARD_LIST_LIMIT).await?;

        Ok(DashboardStats {
            metrics,
            requests_by_status,
            requests_by_priority,
            recent_requests,
            recent_activities,
            top_customers,
        })
    }

    /// Headline numbers: totals plus the derived rates.
    pub async fn metrics(pool: &PgPool) -> Result<DashboardMetrics, sqlx::Error> {
        let (total_requests, completed): (i64, i64) = sqlx::query_as(
            "SELECT COUNT(*), COUNT(*) FILTER (WHERE status = $1) FROM requests",
        )
        .bind(Status::Completed.as_str())
        .fetch_one(pool)
        .await?;

        let active_customers: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM customers WHERE stage = $1")
                .bind(STAGE_ACTIVE)
                .fetch_one(pool)
                .await?;

        Ok(DashboardMetrics {
            total_requests,
            active_customers,
            completion_rate: completion_rate(completed, total_requests),
            request_to_customer_ratio: request_to_customer_ratio(total_requests, active_customers),
        })
    }

    /// Request counts per status, largest first.
    pub async fn requests_by_status(pool: &PgPool) -> Result<Vec<StatusCount>, sqlx::Error> {
        sqlx::query_as::<_, StatusCount>(
            "SELECT status, COUNT(*) AS count \
             FROM requests \
             GROUP BY status \
             ORDER BY count DESC, status",
        )
        .fetch_all(pool)
        .await
    }

    /// Request counts per priority, most severe first.
    pub async fn requests_by_priority(pool: &PgPool) -> Result<Vec<PriorityCount>, sqlx::Error> {
        let mut counts = sqlx::query_as::<_, PriorityCount>(
            "SELECT priority, COUNT(*) AS count \
             FROM requests \
             GROUP BY priority \
             ORDER BY priority",
        )
        .fetch_all(pool)
        .await?;

        counts.sort_by_key(|c| priority_sort_key(&c.priority));
        Ok(counts)
    }

    /// The newest requests.
    pub async fn recent_requests(
        pool: &PgPool,
        limit: i64,
    ) -> Result<Vec<RecentRequest>, sqlx::Error> {
        sqlx::query_as::<_, RecentRequest>(
            "SELECT id, title, priority, status, created_at \
             FROM requests \
             ORDER BY created_at DESC, id DESC \
             LIMIT $1",
        )
        .bind(limit)
        .fetch_all(pool)
        .await
    }

    /// Customers with the most linked requests. Customers with no links are
    /// excluded.
    pub async fn top_customers(
        pool: &PgPool,
        limit: i64,
    ) -> Result<Vec<TopCustomer>, sqlx::Error> {
        sqlx::query_as::<_, TopCustomer>(
            "SELECT c.id, c.name, c.tier, c.revenue, COUNT(cr.request_id) AS requests \
             FROM customers c \
             JOIN customer_requests cr ON cr.customer_id = c.id \
             GROUP BY c.id \
             ORDER BY requests DESC, c.name \
             LIMIT $1",
        )
        .bind(limit)
        .fetch_all(pool)
        .await
    }
}
