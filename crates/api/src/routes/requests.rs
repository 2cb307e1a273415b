//! Route definitions for the `/requests` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::request;
use crate::state::AppState;

/// Routes mounted at `/requests`.
///
/// ```text
/// GET    /                -> list
/// POST   /                -> create
/// GET    /{id}            -> get_by_id
/// PUT    /{id}            -> update
/// DELETE /{id}            -> delete
/// GET    /{id}/comments   -> list_comments
/// POST   /{id}/comments   -> add_comment
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(request::list).post(request::create))
        .route(
            "/{id}",
            get(request::get_by_id)
                .put(request::update)
                .delete(request::delete),
        )
        .route(
            "/{id}/comments",
            get(request::list_comments).post(request::add_comment),
        )
}
