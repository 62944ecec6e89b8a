//! Error handling module
//!
//! Centralized error types and HTTP response conversion.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// Application-wide Result type
pub type AppResult<T> = Result<T, AppError>;

/// Application error types
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Client errors (4xx)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Wallet not found: {0}")]
    WalletNotFound(String),

    #[error("Wallet already exists for user: {0}")]
    DuplicateWallet(String),

    // Domain errors
    #[error(transparent)]
    Domain(#[from] crate::domain::DomainError),

    // Replay errors
    #[error(transparent)]
    Replay(#[from] crate::replay::ReplayError),

    // Server errors (5xx)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}

impl From<crate::event_store::EventStoreError> for AppError {
    fn from(err: crate::event_store::EventStoreError) -> Self {
        use crate::event_store::EventStoreError;
        match err {
            EventStoreError::Database(e) => AppError::Database(e),
            EventStoreError::Serialization(e) => AppError::Internal(e.to_string()),
        }
    }
}

impl From<crate::projection::ProjectionError> for AppError {
    fn from(err: crate::projection::ProjectionError) -> Self {
        use crate::projection::ProjectionError;
        match err {
            ProjectionError::Database(e) => AppError::Database(e),
            ProjectionError::Duplicate(user_id) => AppError::DuplicateWallet(user_id.to_string()),
        }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub error_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_code, details) = match &self {
            // 400 Bad Request
            AppError::InvalidRequest(msg) => {
                (StatusCode::BAD_REQUEST, "invalid_request", Some(msg.clone()))
            }

            // 404 Not Found
            AppError::WalletNotFound(id) => {
                (StatusCode::NOT_FOUND, "wallet_not_found", Some(id.clone()))
            }

            // 409 Conflict
            AppError::DuplicateWallet(id) => {
                (StatusCode::CONFLICT, "duplicate_wallet", Some(id.clone()))
            }

            // Domain errors - map to appropriate HTTP status
            AppError::Domain(ref domain_err) => {
                use crate::domain::DomainError;
                match domain_err {
                    DomainError::InvalidAmount(msg) => {
                        (StatusCode::BAD_REQUEST, "invalid_amount", Some(msg.clone()))
                    }
                    DomainError::InsufficientFunds { .. } => (
                        StatusCode::BAD_REQUEST,
                        "insufficient_funds",
                        Some(domain_err.to_string()),
                    ),
                    DomainError::DuplicateWallet(id) => {
                        (StatusCode::CONFLICT, "duplicate_wallet", Some(id.clone()))
                    }
                    DomainError::WalletNotFound(id) => {
                        (StatusCode::NOT_FOUND, "wallet_not_found", Some(id.clone()))
                    }
                    DomainError::WalletDeleted(id) => {
                        (StatusCode::BAD_REQUEST, "wallet_deleted", Some(id.clone()))
                    }
                    DomainError::UnknownEventType(t) => {
                        // Data corruption in the log; never a caller problem
                        tracing::error!("Unknown event type in log: {}", t);
                        (
                            StatusCode::INTERNAL_SERVER_ERROR,
                            "unknown_event_type",
                            None,
                        )
                    }
                }
            }

            // Replay errors
            AppError::Replay(ref replay_err) => {
                use crate::replay::ReplayError;
                match replay_err {
                    ReplayError::InvalidWindow { .. } => (
                        StatusCode::BAD_REQUEST,
                        "invalid_window",
                        Some(replay_err.to_string()),
                    ),
                    ReplayError::UnknownEventType(t) => {
                        tracing::error!("Unknown event type during replay: {}", t);
                        (
                            StatusCode::INTERNAL_SERVER_ERROR,
                            "unknown_event_type",
                            None,
                        )
                    }
                    ReplayError::CorruptEventData { .. } => {
                        tracing::error!("Corrupt event data during replay: {}", replay_err);
                        (
                            StatusCode::INTERNAL_SERVER_ERROR,
                            "corrupt_event_data",
                            None,
                        )
                    }
                    ReplayError::Store(_) => {
                        tracing::error!("Store error during replay: {:?}", replay_err);
                        (StatusCode::INTERNAL_SERVER_ERROR, "database_error", None)
                    }
                }
            }

            // 500 Internal Server Error
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "database_error", None)
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
            AppError::Config(e) => {
                tracing::error!("Config error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "config_error", None)
            }
        };

        let body = ErrorResponse {
            error: self.to_string(),
            error_code: error_code.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}
