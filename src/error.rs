use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::auth::AuthError;

/// Failures of the persistence store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("corrupt row: {0}")]
    CorruptRow(String),
}

/// Every way a request can fail, mapped to a status code at the handler
/// boundary.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("no valid session")]
    Unauthenticated,
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("todo not found")]
    NotFound,
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Identity(#[from] AuthError),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Store(_) | AppError::Identity(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Store(StoreError::Database(err))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            AppError::Validation(message) => {
                (status, Json(json!({ "error": message }))).into_response()
            }
            AppError::Store(ref err) => {
                tracing::error!(error = %err, "store failure");
                (status, Json(json!({}))).into_response()
            }
            AppError::Identity(ref err) => {
                tracing::error!(error = %err, "identity provider failure");
                (status, Json(json!({}))).into_response()
            }
            AppError::Unauthenticated | AppError::NotFound => {
                (status, Json(json!({}))).into_response()
            }
        }
    }
}

/// Problems found while reading configuration at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required setting {0}")]
    Missing(&'static str),
    #[error("invalid value {value:?} for {key}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}
