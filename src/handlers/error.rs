// API error type and its JSON envelope

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::downloader::DownloadError;
use crate::users::UserError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Missing or malformed input
    #[error("{0}")]
    Validation(String),

    #[error("Unsupported platform")]
    UnsupportedPlatform,

    #[error("{0}")]
    Conflict(String),

    #[error(transparent)]
    Download(#[from] DownloadError),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<UserError> for AppError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::MissingFields => AppError::Validation(err.to_string()),
            UserError::AlreadyExists => AppError::Conflict(err.to_string()),
            UserError::Database(e) => AppError::Database(e.to_string()),
            UserError::Timestamp(e) => AppError::Internal(e.to_string()),
        }
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::UnsupportedPlatform => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Download(_) | AppError::Database(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let mut body = json!({
            "success": false,
            "error": self.to_string(),
        });

        match &self {
            AppError::Download(e) => {
                tracing::error!(error = %e, "download pipeline error");
                if let Some(reason) = e.reason() {
                    body["reason"] = json!(reason);
                    body["hint"] = json!(reason.description());
                    body["retryable"] = json!(reason.is_retryable());
                }
            }
            AppError::Database(e) | AppError::Internal(e) => {
                tracing::error!(error = %e, "internal error");
            }
            _ => {}
        }

        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
