//! Error types for the PDF Shelf server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Application-wide result type
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Invalid file type: {0}")]
    InvalidFileType(String),

    #[error("File too large (max: {max} bytes)")]
    FileTooLarge { max: u64 },

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Storage-specific errors
///
/// Every failure of the record store surfaces as one of these. None of them
/// leave a partially written record behind.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Storage full: {0}")]
    Full(String),

    #[error("Storage quota exceeded: {used} bytes used, {requested} requested, quota {quota}")]
    QuotaExceeded { used: u64, requested: u64, quota: u64 },

    #[error("Corrupted record: {0}")]
    Corrupted(String),

    #[error("Duplicate record id: {0}")]
    DuplicateId(String),
}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err) => {
                if db_err.is_unique_violation() {
                    return StorageError::DuplicateId(db_err.message().to_string());
                }
                // SQLITE_FULL
                if db_err.code().as_deref() == Some("13") {
                    return StorageError::Full(db_err.message().to_string());
                }
                StorageError::Unavailable(err.to_string())
            }
            sqlx::Error::ColumnDecode { .. }
            | sqlx::Error::Decode(_)
            | sqlx::Error::ColumnNotFound(_) => StorageError::Corrupted(err.to_string()),
            _ => StorageError::Unavailable(err.to_string()),
        }
    }
}

impl StorageError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Full(_) | Self::QuotaExceeded { .. } => StatusCode::INSUFFICIENT_STORAGE,
            Self::Corrupted(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::DuplicateId(_) => StatusCode::CONFLICT,
        }
    }
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg.clone()),
            AppError::InvalidFileType(content_type) => (
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                "invalid_file_type",
                format!("Only PDF files are supported (got {})", content_type),
            ),
            AppError::FileTooLarge { max } => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "file_too_large",
                format!("Files may be at most {} bytes", max),
            ),
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                )
            }
            AppError::Storage(e) => {
                tracing::error!("Storage error: {}", e);
                let status = e.status_code();
                match e {
                    StorageError::QuotaExceeded { .. } | StorageError::Full(_) => {
                        (status, "storage_full", e.to_string())
                    }
                    StorageError::DuplicateId(_) => (status, "conflict", e.to_string()),
                    StorageError::Unavailable(_) => (
                        status,
                        "storage_unavailable",
                        "Storage is unavailable".to_string(),
                    ),
                    StorageError::Corrupted(_) => (
                        status,
                        "storage_error",
                        "Stored data could not be read".to_string(),
                    ),
                }
            }
        };

        let body = Json(ErrorResponse {
            error: error_type.to_string(),
            message,
            details: if cfg!(debug_assertions) {
                Some(self.to_string())
            } else {
                None
            },
        });

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let not_found = AppError::NotFound("pdf".to_string()).into_response();
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);

        let invalid = AppError::InvalidFileType("text/plain".to_string()).into_response();
        assert_eq!(invalid.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);

        let quota = AppError::from(StorageError::QuotaExceeded {
            used: 10,
            requested: 5,
            quota: 12,
        })
        .into_response();
        assert_eq!(quota.status(), StatusCode::INSUFFICIENT_STORAGE);
    }

    #[test]
    fn test_pool_errors_are_unavailable() {
        let err = StorageError::from(sqlx::Error::PoolTimedOut);
        assert!(matches!(err, StorageError::Unavailable(_)));
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_decode_errors_are_corruption() {
        let err = StorageError::from(sqlx::Error::ColumnNotFound("created".to_string()));
        assert!(matches!(err, StorageError::Corrupted(_)));
    }
}
