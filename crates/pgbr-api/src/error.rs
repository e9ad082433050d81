//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Maps storage manager errors to HTTP status codes with a JSON body
//! carrying a machine-readable code and a message. Storage failures are
//! logged with full context and answered with an opaque message.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use pgbr_core::StoreError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured JSON error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "BAD_REQUEST", "CONFLICT").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

/// Application-level error type that implements [`IntoResponse`] for Axum.
#[derive(Error, Debug)]
pub enum AppError {
    /// Invalid instance name, segment name or timestamp (400).
    #[error("{0}")]
    BadRequest(String),

    /// An artifact with the same name is already stored (409).
    #[error("{0}")]
    Conflict(String),

    /// Storage failure (500). Message is logged but not returned to client.
    #[error("internal error: {0}")]
    Internal(String),

    /// The service cannot currently serve requests (503).
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl AppError {
    /// Return the HTTP status code and machine-readable error code for this error.
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            Self::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            Self::ServiceUnavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "SERVICE_UNAVAILABLE"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        // Never expose paths or OS errors to clients.
        let message = match &self {
            Self::Internal(_) => "An internal error occurred".to_string(),
            other => other.to_string(),
        };

        match &self {
            Self::Internal(_) => tracing::error!(error = %self, "storage failure"),
            Self::ServiceUnavailable(_) => tracing::warn!(error = %self, "service unavailable"),
            _ => {}
        }

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate { .. } => Self::Conflict(err.to_string()),
            _ if err.is_client_error() => Self::BadRequest(err.to_string()),
            _ => Self::Internal(err.to_string()),
        }
    }
}

impl From<pgbr_core::NameError> for AppError {
    fn from(err: pgbr_core::NameError) -> Self {
        Self::BadRequest(err.to_string())
    }
}

impl From<pgbr_core::TimestampError> for AppError {
    fn from(err: pgbr_core::TimestampError) -> Self {
        Self::BadRequest(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use pgbr_core::{ArtifactKind, InstanceName};

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn invalid_name_is_bad_request() {
        let err: AppError = InstanceName::parse("../etc").unwrap_err().into();
        let (status, code) = err.status_and_code();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(code, "BAD_REQUEST");
        assert_eq!(err.to_string(), "invalid instance name: \"../etc\"");
    }

    #[test]
    fn duplicate_is_conflict() {
        let err: AppError = StoreError::Duplicate {
            kind: ArtifactKind::WalSegment,
            name: "seg".into(),
        }
        .into();
        assert_eq!(err.status_and_code().0, StatusCode::CONFLICT);
    }

    #[test]
    fn invalid_timestamp_is_bad_request() {
        let err: AppError = StoreError::from(
            pgbr_core::BackupTimestamp::parse("yesterday").unwrap_err(),
        )
        .into();
        assert_eq!(err.status_and_code().0, StatusCode::BAD_REQUEST);
        assert!(err.to_string().starts_with("invalid backup timestamp"));
    }

    #[test]
    fn storage_failure_is_internal() {
        let err: AppError = StoreError::Config("gone".into()).into();
        assert_eq!(err.status_and_code().0, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn internal_message_is_opaque() {
        let err = AppError::Internal("failed to publish artifact at /srv/secret".into());
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "INTERNAL_ERROR");
        assert_eq!(json["error"]["message"], "An internal error occurred");
        assert!(!json.to_string().contains("/srv/secret"));
    }

    #[tokio::test]
    async fn client_message_is_returned() {
        let response = AppError::BadRequest("invalid WAL segment name: \".x\"".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"]["message"], "invalid WAL segment name: \".x\"");
    }
}
