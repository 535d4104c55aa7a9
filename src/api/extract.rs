use axum::extract::FromRequest;

use crate::api::error::ApiError;

/// `Json` whose rejections answer with the same `{"detail": ...}` body as every
/// other API error.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct AppJson<T>(pub T);
