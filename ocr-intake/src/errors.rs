use crate::storage::StorageError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;
use utoipa::ToSchema;

#[derive(ThisError, Debug)]
pub enum Error {
    /// Upload exceeds the configured size limit
    #[error("File too large: {size} bytes read, limit is {limit}")]
    FileTooLarge { size: u64, limit: u64 },

    /// Derived extension is not in the configured allow-set
    #[error("File type not allowed: {extension:?}")]
    FileTypeNotAllowed { extension: String },

    /// Invalid request data, e.g. a malformed multipart body
    #[error("{message}")]
    BadRequest { message: String },

    /// Generic internal service error
    #[error("Failed to {operation}")]
    Internal { operation: String },

    /// Storage backend error
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Unexpected error with full context chain
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// JSON body returned for every failed request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    /// Human-readable description of the failure
    #[schema(example = "File too large")]
    pub detail: String,
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::FileTooLarge { .. } => StatusCode::BAD_REQUEST,
            Error::FileTypeNotAllowed { .. } => StatusCode::BAD_REQUEST,
            Error::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Error::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Error::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the `detail` string for the response body.
    ///
    /// Validation failures use their fixed client-facing messages; internal
    /// failures surface the underlying description so callers see what broke.
    pub fn user_message(&self) -> String {
        match self {
            Error::FileTooLarge { .. } => "File too large".to_string(),
            Error::FileTypeNotAllowed { .. } => "File type not allowed".to_string(),
            Error::BadRequest { message } => message.clone(),
            Error::Internal { operation } => format!("Failed to {operation}"),
            Error::Storage(err) => err.to_string(),
            Error::Other(err) => format!("{err:#}"),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        // Log full error details for debugging - different log levels based on severity
        match &self {
            Error::Internal { .. } | Error::Storage(_) | Error::Other(_) => {
                tracing::error!("Internal service error: {:#}", self);
            }
            Error::FileTooLarge { .. } | Error::FileTypeNotAllowed { .. } | Error::BadRequest { .. } => {
                tracing::debug!("Client error: {}", self);
            }
        }

        let status = self.status_code();
        let body = ErrorBody {
            detail: self.user_message(),
        };

        (status, Json(body)).into_response()
    }
}

/// Type alias for service operation results
pub type Result<T> = std::result::Result<T, Error>;
