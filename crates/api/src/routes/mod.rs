pub mod auth;
pub mod customers;
pub mod health;
pub mod requests;
pub mod stats;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/register                 register (public)
/// /auth/login                    login (public)
/// /auth/user                     current user
///
/// /requests                      list, create
/// /requests/{id}                 get, update, delete
/// /requests/{id}/comments        list, add
///
/// /customers                     list, create
/// /customers/{id}                get, update, delete
///
/// /stats                         dashboard aggregates
/// ```
///
/// Everything except register and login requires a token.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/requests", requests::router())
        .nest("/customers", customers::router())
        .nest("/stats", stats::router())
}
