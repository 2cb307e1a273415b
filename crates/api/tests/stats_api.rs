//! HTTP-level integration tests for `GET /api/stats`.

mod common;

use axum::http::StatusCode;
use common::{auth_token, body_json, build_test_app, get_auth, post_json_auth};
use serde_json::json;
use sqlx::PgPool;

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_stats_on_empty_database(pool: PgPool) {
    let token = auth_token(&pool).await;

    let response = get_auth(build_test_app(pool), "/api/stats", &token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(
        json["metrics"],
        json!({
            "total_requests": 0,
            "active_customers": 0,
            "completion_rate": 0,
            "request_to_customer_ratio": 0.0,
        })
    );
    assert_eq!(json["requests_by_status"], json!([]));
    assert_eq!(json["requests_by_priority"], json!([]));
    assert_eq!(json["recent_requests"], json!([]));
    assert_eq!(json["recent_activities"], json!([]));
    assert_eq!(json["top_customers"], json!([]));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_stats_after_activity(pool: PgPool) {
    let token = auth_token(&pool).await;

    let customer = body_json(
        post_json_auth(
            build_test_app(pool.clone()),
            "/api/customers",
            json!({ "name": "Acme", "stage": "Active", "tier": "Enterprise" }),
            &token,
        )
        .await,
    )
    .await;
    let acme = customer["id"].as_i64().unwrap();

    for body in [
        json!({ "title": "A", "status": "Completed", "priority": "Low", "customers": [acme] }),
        json!({ "title": "B", "status": "In Progress", "priority": "Critical" }),
    ] {
        let response =
            post_json_auth(build_test_app(pool.clone()), "/api/requests", body, &token).await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let json = body_json(get_auth(build_test_app(pool), "/api/stats", &token).await).await;

    assert_eq!(json["metrics"]["total_requests"], 2);
    assert_eq!(json["metrics"]["active_customers"], 1);
    assert_eq!(json["metrics"]["completion_rate"], 50);
    assert_eq!(json["metrics"]["request_to_customer_ratio"], 2.0);
    assert_eq!(json["requests_by_priority"][0]["priority"], "Critical");
    assert_eq!(json["requests_by_priority"][1]["priority"], "Low");
    assert_eq!(json["recent_requests"][0]["title"], "B");
    assert_eq!(json["recent_activities"][0]["action"], "created");
    assert_eq!(json["recent_activities"][0]["user_name"], "Tester");
    assert_eq!(
        json["top_customers"],
        json!([{ "id": acme, "name": "Acme", "tier": "Enterprise", "revenue": null, "requests": 1 }])
    );
}
