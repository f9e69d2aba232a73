use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use hive_common::HiveError;
use serde_json::json;
use tracing::error;

/// A [`HiveError`] rendered as an HTTP response.
#[derive(Debug)]
pub struct ApiError(pub HiveError);

impl From<HiveError> for ApiError {
    fn from(err: HiveError) -> Self {
        ApiError(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            HiveError::NotFound(_) => StatusCode::NOT_FOUND,
            HiveError::NotMember { .. } | HiveError::Forbidden(_) => StatusCode::FORBIDDEN,
            HiveError::InvalidInput(_) | HiveError::EmptyRoster => StatusCode::BAD_REQUEST,
            HiveError::EventFinalized(_) => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("❌ Request failed: {}", self.0);
        }
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}
