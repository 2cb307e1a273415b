//! Repository for the `customers` table.

use echo_core::types::DbId;
use sqlx::PgPool;

use crate::models::customer::{
    CreateCustomer, Customer, CustomerDetail, CustomerWithRequestCount, UpdateCustomer,
};
use crate::repositories::RequestRepo;

/// Column list for the `customers` table.
const COLUMNS: &str = "id, name, stage, revenue, tier, user_id, created_at";

/// Provides CRUD operations for customers.
pub struct CustomerRepo;

impl CustomerRepo {
    /// Insert a new customer owned by `user_id`.
    pub async fn create(
        pool: &PgPool,
        user_id: DbId,
        input: &CreateCustomer,
    ) -> Result<Customer, sqlx::Error> {
        let query = format!(
            "INSERT INTO customers (name, stage, revenue, tier, user_id) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Customer>(&query)
            .bind(&input.name)
            .bind(&input.stage)
            .bind(input.revenue)
            .bind(&input.tier)
            .bind(user_id)
            .fetch_one(pool)
            .await
    }

    /// Find a customer by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Customer>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM customers WHERE id = $1");
        sqlx::query_as::<_, Customer>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a customer together with its linked requests.
    pub async fn find_detail(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<CustomerDetail>, sqlx::Error> {
        let Some(customer) = Self::find_by_id(pool, id).await? else {
            return Ok(None);
        };
        let requests = RequestRepo::list_for_customer(pool, id).await?;
        Ok(Some(CustomerDetail { customer, requests }))
    }

    /// List all customers by name with the number of linked requests.
    pub async fn list_with_request_counts(
        pool: &PgPool,
    ) -> Result<Vec<CustomerWithRequestCount>, sqlx::Error> {
        sqlx::query_as::<_, CustomerWithRequestCount>(
            "SELECT c.id, c.name, c.stage, c.revenue, c.tier, c.user_id, c.created_at, \
                    COUNT(cr.request_id) AS requests \
             FROM customers c \
             LEFT JOIN customer_requests cr ON cr.customer_id = c.id \
             GROUP BY c.id \
             ORDER BY c.name, c.id",
        )
        .fetch_all(pool)
        .await
    }

    /// Update a customer. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateCustomer,
    ) -> Result<Option<Customer>, sqlx::Error> {
        let query = format!(
            "UPDATE customers SET \
                name = COALESCE($2, name), \
                stage = COALESCE($3, stage), \
                revenue = COALESCE($4, revenue), \
                tier = COALESCE($5, tier) \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Customer>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.stage)
            .bind(input.revenue)
            .bind(&input.tier)
            .fetch_optional(pool)
            .await
    }

    /// Delete a customer. Its request links are removed by cascade; the
    /// requests themselves are kept.
    ///
    /// Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM customers WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
