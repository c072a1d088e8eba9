use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::{error::Error as StdError, fmt};
use thiserror::Error;

/// Boxed cause carried by [`PictureError`] for diagnostics.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Errors raised by picture operations.
///
/// Every variant carries a human readable message and, optionally, the
/// original error that caused it so the full chain can be logged.
#[derive(Debug, Error)]
pub enum PictureError {
    /// General failure that is neither a bad request nor a storage failure,
    /// e.g. the request body could not be read or a dependency failed to start.
    #[error("{message}")]
    Picture {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    /// The upload to (or URL lookup from) the storage backend failed.
    #[error("{message}")]
    Upload {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    /// The caller supplied data that cannot be uploaded.
    #[error("{message}")]
    InvalidInput {
        message: String,
        #[source]
        source: Option<BoxError>,
    },
}

impl PictureError {
    pub fn picture(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Picture {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    pub fn upload(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Upload {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Input error without an underlying cause.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
            source: None,
        }
    }

    pub fn invalid_input_caused_by(
        message: impl Into<String>,
        source: impl Into<BoxError>,
    ) -> Self {
        Self::InvalidInput {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Picture { message, .. }
            | Self::Upload { message, .. }
            | Self::InvalidInput { message, .. } => message,
        }
    }

    /// The wrapped cause, if any.
    pub fn original_error(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        match self {
            Self::Picture { source, .. }
            | Self::Upload { source, .. }
            | Self::InvalidInput { source, .. } => source.as_deref(),
        }
    }

    /// HTTP status the route layer answers with for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidInput { .. } => StatusCode::BAD_REQUEST,
            Self::Upload { .. } | Self::Picture { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// A lightweight wrapper for HTTP-facing errors that keeps the message local.
#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    /// Create a new AppError with a specific status and message.
    pub fn new(status: StatusCode, msg: impl Into<String>) -> Self {
        Self {
            status,
            message: msg.into(),
        }
    }

    /// Shortcut for 400 Bad Request
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, msg)
    }

    /// Shortcut for 404 Not Found
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, msg)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "detail": self.message,
            "status": self.status.as_u16()
        }));

        (self.status, body).into_response()
    }
}

/// Detail sent for server-side failures; the real message only goes to the log.
pub const INTERNAL_ERROR_DETAIL: &str = "Internal Server Error";

impl From<PictureError> for AppError {
    fn from(err: PictureError) -> Self {
        let status = err.status();
        let cause = err
            .original_error()
            .map(|source| source.to_string())
            .unwrap_or_default();
        if status.is_server_error() {
            tracing::error!(error = %err, cause = %cause, "picture request failed");
        } else {
            tracing::warn!(error = %err, cause = %cause, "picture request rejected");
        }
        if status.is_server_error() {
            return AppError::new(status, INTERNAL_ERROR_DETAIL);
        }
        AppError::new(status, err.message())
    }
}
