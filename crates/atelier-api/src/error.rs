//! HTTP error response conversion
//!
//! **Preferred handler pattern:** Return `Result<impl IntoResponse,
//! HttpAppError>`. Use `AppError` (or types that implement
//! `Into<AppError>`) for errors so they render consistently (status, body,
//! logging).

use atelier_core::{AppError, ErrorMetadata, LogLevel};
use atelier_engine::EngineError;
use atelier_store::StoreError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// Machine-readable error code for programmatic handling
    pub code: String,
    /// Whether this error is recoverable (can be retried)
    pub recoverable: bool,
}

/// Wrapper type for AppError to implement IntoResponse
/// This is necessary because of Rust's orphan rules - we can't implement
/// IntoResponse (external trait) for AppError (external type from
/// atelier-core)
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

impl From<anyhow::Error> for HttpAppError {
    fn from(err: anyhow::Error) -> Self {
        HttpAppError(AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        })
    }
}

fn log_error(error: &AppError) {
    let error_type = error.error_type();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Error => {
            tracing::error!(error = %error, error_type = error_type, "Error occurred");
        }
    }
}

fn is_production_env() -> bool {
    std::env::var("ENVIRONMENT")
        .or_else(|_| std::env::var("APP_ENV"))
        .map(|env| env.to_lowercase() == "production" || env.to_lowercase() == "prod")
        .unwrap_or(false)
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let app_error = &self.0;

        let status = StatusCode::from_u16(app_error.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        log_error(app_error);

        // Hide internals in production; show the chain otherwise.
        let details = if is_production_env() {
            None
        } else {
            Some(app_error.detailed_message())
        };

        let body = Json(ErrorResponse {
            error: app_error.client_message(),
            details,
            code: app_error.error_code().to_string(),
            recoverable: app_error.is_recoverable(),
        });

        (status, body).into_response()
    }
}

// Convert domain errors to HttpAppError (avoids orphan rule: we impl for
// local HttpAppError)

impl From<StoreError> for HttpAppError {
    fn from(err: StoreError) -> Self {
        HttpAppError(store_error_to_app(err))
    }
}

fn store_error_to_app(err: StoreError) -> AppError {
    match err {
        StoreError::NotFound(msg) => AppError::NotFound(msg),
        StoreError::InvalidName(msg) => AppError::InvalidInput(format!("Invalid file name: {}", msg)),
        StoreError::Validation(msg) => AppError::InvalidInput(msg),
        StoreError::FileTooLarge { size, max } => AppError::PayloadTooLarge(format!(
            "File too large: {} bytes exceeds maximum of {} bytes",
            size, max
        )),
        StoreError::Protected(msg) => AppError::ProtectedRecord(msg),
        StoreError::WriteFailed(msg) => AppError::Internal(msg),
        StoreError::Io(err) => AppError::Internal(format!("IO error: {}", err)),
        StoreError::Serialization(err) => AppError::Internal(format!("Serialization error: {}", err)),
    }
}

impl From<EngineError> for HttpAppError {
    fn from(err: EngineError) -> Self {
        let app = match err {
            EngineError::Unavailable(msg) => AppError::EngineUnavailable(msg),
            EngineError::Generation(msg) => AppError::Generation(msg),
            EngineError::Fetch(msg) => AppError::Fetch(msg),
            EngineError::InvalidResponse(msg) => {
                AppError::Internal(format!("Malformed engine response: {}", msg))
            }
            EngineError::Subprocess(msg) => AppError::Generation(msg),
            EngineError::Timeout(msg) => AppError::EngineUnavailable(msg),
            EngineError::Store(inner) => store_error_to_app(inner),
        };
        HttpAppError(app)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_store_error_not_found() {
        let HttpAppError(app) = StoreError::NotFound("Voice not found".to_string()).into();
        match app {
            AppError::NotFound(msg) => assert_eq!(msg, "Voice not found"),
            _ => panic!("Expected NotFound variant"),
        }
    }

    #[test]
    fn test_from_store_error_protected() {
        let HttpAppError(app) = StoreError::Protected("Cannot delete default voice".to_string()).into();
        assert!(matches!(app, AppError::ProtectedRecord(_)));
        assert_eq!(app.http_status_code(), 400);
    }

    #[test]
    fn test_from_store_error_file_too_large() {
        let HttpAppError(app) = StoreError::FileTooLarge { size: 100, max: 50 }.into();
        match app {
            AppError::PayloadTooLarge(msg) => {
                assert!(msg.contains("100"));
                assert!(msg.contains("50"));
            }
            _ => panic!("Expected PayloadTooLarge variant"),
        }
    }

    #[test]
    fn test_from_engine_error_unavailable() {
        let HttpAppError(app) = EngineError::Unavailable("offline".to_string()).into();
        assert!(matches!(app, AppError::EngineUnavailable(_)));
        assert_eq!(app.http_status_code(), 502);
        assert!(app.is_recoverable());
    }

    #[test]
    fn test_from_engine_error_store_unwraps() {
        let err = EngineError::Store(StoreError::NotFound("gone".to_string()));
        let HttpAppError(app) = err.into();
        assert!(matches!(app, AppError::NotFound(_)));
    }

    #[test]
    fn test_error_response_shape() {
        let response = ErrorResponse {
            error: "Not found".to_string(),
            details: None,
            code: "NOT_FOUND".to_string(),
            recoverable: false,
        };
        let json = serde_json::to_value(&response).expect("serialize");
        assert!(json.get("error").and_then(|v| v.as_str()).is_some());
        assert_eq!(json.get("code").and_then(|v| v.as_str()), Some("NOT_FOUND"));
        assert!(json.get("details").is_none());
    }
}
