use crate::store::StoreError;
use axum::{
    Json,
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::error;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("missing image field")]
    MissingFile,
    /// Rejected multipart body, with the status the parser chose.
    #[error("{1}")]
    Multipart(StatusCode, String),
    #[error("{0}")]
    ValidationError(String),
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("file store error: {0}")]
    FileSystem(String),
    #[error("internal error: {0}")]
    InternalError(String),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::Persistence(err.to_string())
    }
}

impl From<std::io::Error> for ApiError {
    fn from(err: std::io::Error) -> Self {
        ApiError::FileSystem(err.to_string())
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        ApiError::Multipart(err.status(), err.body_text())
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingFile | ApiError::ValidationError(_) => StatusCode::BAD_REQUEST,
            ApiError::Multipart(status, _) => *status,
            ApiError::Persistence(_) | ApiError::FileSystem(_) | ApiError::InternalError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// Convert our custom errors to HTTP responses
///
/// Client errors echo their message back. Server-side failures are logged
/// here and answered with a generic body.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status.is_server_error() {
            error!("Internal error: {}", self);
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        (
            status,
            Json(serde_json::json!({
              "error": message
            })),
        )
            .into_response()
    }
}
