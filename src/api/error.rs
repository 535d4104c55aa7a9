use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::domain::CompareError;

/// Error responses carry `{"detail": ...}`: comparison rejections are 400, model
/// failures 500, unreadable bodies keep the status axum assigns them.
#[derive(Debug)]
pub enum ApiError {
    Compare(CompareError),
    Body(JsonRejection),
}

impl From<CompareError> for ApiError {
    fn from(err: CompareError) -> Self {
        Self::Compare(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Body(rejection)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Compare(err) if err.is_validation() => StatusCode::BAD_REQUEST,
            Self::Compare(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Body(rejection) => rejection.status(),
        }
    }

    pub fn detail(&self) -> String {
        match self {
            Self::Compare(err) => err.to_string(),
            Self::Body(rejection) => rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = self.detail();

        if status.is_server_error() {
            tracing::error!(error = %detail, "comparison failed");
        } else {
            tracing::warn!(status = %status.as_u16(), error = %detail, "request rejected");
        }

        (status, Json(json!({ "detail": detail }))).into_response()
    }
}
