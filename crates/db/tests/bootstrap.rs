use sqlx::PgPool;

/// Full bootstrap test: connect, migrate, verify schema.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_full_bootstrap(pool: PgPool) {
    echo_db::health_check(&pool).await.unwrap();

    let tables = [
        "users",
        "customers",
        "requests",
        "customer_requests",
        "request_labels",
        "comments",
        "activities",
    ];

    for table in tables {
        let count: (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(&pool)
            .await
            .unwrap_or_else(|e| panic!("{table} query failed: {e}"));
        assert_eq!(count.0, 0, "{table} should start empty");
    }
}

/// Enumerated columns reject values outside their allowed sets.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_request_check_constraints(pool: PgPool) {
    let result = sqlx::query(
        "INSERT INTO requests (id, title, priority) VALUES ('REQ-001', 'Bad', 'Urgent')",
    )
    .execute(&pool)
    .await;
    assert!(result.is_err(), "unknown priority should be rejected");

    let result = sqlx::query(
        "INSERT INTO requests (id, title, effort) VALUES ('REQ-001', 'Bad', -1)",
    )
    .execute(&pool)
    .await;
    assert!(result.is_err(), "negative effort should be rejected");
}
