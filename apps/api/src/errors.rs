use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        rejection::{JsonRejection, QueryRejection},
        FromRequest, FromRequestParts,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::pipeline::QueryError;
use crate::providers::probe::ProbeError;
use crate::store::StoreError;
use crate::tasks::upload::UploadError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Upload(#[from] UploadError),

    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    Probe(#[from] ProbeError),

    #[error("Multipart error: {0}")]
    Multipart(#[from] MultipartError),

    #[error("Invalid multipart request: {0}")]
    MultipartRequest(#[from] MultipartRejection),

    #[error("Invalid JSON body: {0}")]
    JsonBody(#[from] JsonRejection),

    #[error("Invalid query string: {0}")]
    QueryString(#[from] QueryRejection),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
            AppError::Store(e) => match e {
                StoreError::NotFound { .. } => (StatusCode::NOT_FOUND, "NOT_FOUND", e.to_string()),
                StoreError::Protected { .. } => {
                    (StatusCode::CONFLICT, "PROTECTED_STATUS", e.to_string())
                }
                StoreError::DuplicateId { .. } => {
                    (StatusCode::CONFLICT, "DUPLICATE_ID", e.to_string())
                }
            },
            AppError::Upload(e) => {
                let status = match e {
                    UploadError::FileTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
                    _ => StatusCode::BAD_REQUEST,
                };
                (status, e.code(), e.to_string())
            }
            AppError::Query(e) => (StatusCode::BAD_REQUEST, "INVALID_QUERY", e.to_string()),
            AppError::Probe(e) => (StatusCode::BAD_REQUEST, "PROBE_ERROR", e.to_string()),
            AppError::Multipart(e) => (e.status(), "INVALID_MULTIPART", e.body_text()),
            AppError::MultipartRequest(e) => (e.status(), "INVALID_MULTIPART", e.body_text()),
            AppError::JsonBody(e) => (e.status(), "INVALID_BODY", e.body_text()),
            AppError::QueryString(e) => (StatusCode::BAD_REQUEST, "INVALID_QUERY", e.body_text()),
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

/// `Json` extractor whose rejections use the error body above.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// `Query` extractor whose rejections use the error body above.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct AppQuery<T>(pub T);

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_store_errors_map_to_http_status() {
        assert_eq!(
            status_of(
                StoreError::NotFound {
                    kind: "job",
                    id: "job-9".to_string()
                }
                .into()
            ),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(
                StoreError::Protected {
                    kind: "template",
                    id: "t1".to_string(),
                    reason: "enabled".to_string()
                }
                .into()
            ),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_upload_too_large_is_413() {
        let err = UploadError::FileTooLarge {
            filename: "scan.jpg".to_string(),
            limit_bytes: 10,
        };
        assert_eq!(status_of(err.into()), StatusCode::PAYLOAD_TOO_LARGE);
        let err = UploadError::UnsupportedFormat {
            filename: "a.exe".to_string(),
        };
        assert_eq!(status_of(err.into()), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_internal_error_hides_message() {
        let resp = AppError::Internal(anyhow::anyhow!("secret detail")).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
