//! Request body extractors.

use axum::extract::FromRequest;

use crate::error::AppError;

/// [`axum::Json`] whose rejections (malformed JSON, missing or mistyped
/// fields, wrong content type) render as a 400 [`AppError`] body instead of
/// axum's plain-text 4xx.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);
