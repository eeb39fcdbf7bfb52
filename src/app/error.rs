use crate::utils::error::TrackerError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};

/// Error response of the HTTP layer.
///
/// Client mistakes carry `{ "message": ... }`; store faults are logged and
/// answered with 500 and `{ "error": "Failed to <action>" }`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: Value,
}

impl ApiError {
    pub fn new(err: TrackerError, failure: &str) -> Self {
        match err {
            TrackerError::NotFound { entity, .. } => Self {
                status: StatusCode::NOT_FOUND,
                body: json!({ "message": format!("{} not found", entity) }),
            },
            TrackerError::ValidationError { message } | TrackerError::Conflict { message } => Self {
                status: StatusCode::BAD_REQUEST,
                body: json!({ "message": message }),
            },
            other => {
                tracing::error!(
                    error = %other,
                    category = ?other.category(),
                    "{}",
                    failure
                );
                Self {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    body: json!({ "error": failure }),
                }
            }
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

pub trait ApiResultExt<T> {
    /// Maps the error to a response, naming `failure` if it becomes a 500.
    fn or_fail(self, failure: &str) -> Result<T, ApiError>;
}

impl<T> ApiResultExt<T> for crate::utils::error::Result<T> {
    fn or_fail(self, failure: &str) -> Result<T, ApiError> {
        self.map_err(|err| ApiError::new(err, failure))
    }
}
