//! Shared response payloads for API handlers.

use serde::Serialize;

/// `{ "msg": ... }` acknowledgement returned by delete endpoints.
///
/// ```ignore
/// Ok(Json(MessageResponse::new("Request removed")))
/// ```
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub msg: &'static str,
}

impl MessageResponse {
    pub fn new(msg: &'static str) -> Self {
        Self { msg }
    }
}
