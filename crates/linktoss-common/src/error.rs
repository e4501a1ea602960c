//! Error types for the LinkToss client.

use thiserror::Error;

/// Client result type.
pub type ApiResult<T> = Result<T, ApiError>;

/// Client error type.
///
/// Splits into errors raised before a request is sent (`Validation`),
/// errors mapped from backend status codes, and transport/decoding
/// failures from the HTTP layer itself.
#[derive(Debug, Error)]
pub enum ApiError {
    // === Raised client-side, before any request is issued ===
    #[error("Validation error: {0}")]
    Validation(String),

    // === Mapped from backend status codes ===
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("Unexpected status {status}: {message}")]
    UnexpectedStatus { status: u16, message: String },

    // === Transport / decoding ===
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Map a non-success backend status code to an error.
    ///
    /// 401 is intentionally absent from the mapping here: the request
    /// layer consumes it for the refresh-and-retry path and only
    /// produces [`ApiError::Unauthorized`] once that path is exhausted.
    #[must_use]
    pub fn from_status(status: u16, message: String) -> Self {
        match status {
            400 => Self::BadRequest(message),
            401 => Self::Unauthorized,
            403 => Self::Forbidden(message),
            404 => Self::NotFound(message),
            500..=599 => Self::Server { status, message },
            _ => Self::UnexpectedStatus { status, message },
        }
    }

    /// Returns the error code for diagnostics and user-facing dispatch.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Server { .. } => "SERVER_ERROR",
            Self::UnexpectedStatus { .. } => "UNEXPECTED_STATUS",
            Self::Transport(_) => "TRANSPORT_ERROR",
            Self::Decode(_) => "DECODE_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Whether the error originated on this side of the wire, without
    /// the backend having processed a request.
    #[must_use]
    pub const fn is_local(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::Config(_) | Self::Internal(_)
        )
    }

    /// Whether the caller lost its session as part of this error.
    #[must_use]
    pub const fn is_auth_failure(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }

    /// Log this error with the level appropriate to its class.
    ///
    /// Backend 4xx responses are expected flow-control and log at debug;
    /// everything the caller cannot fix by changing its input logs at warn.
    pub fn log(&self, context: &str) {
        match self {
            Self::Validation(_)
            | Self::BadRequest(_)
            | Self::Unauthorized
            | Self::Forbidden(_)
            | Self::NotFound(_) => {
                tracing::debug!(error = %self, code = self.error_code(), context, "Request failed");
            }
            _ => {
                tracing::warn!(error = %self, code = self.error_code(), context, "Request failed");
            }
        }
    }
}

// === From implementations ===

impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<url::ParseError> for ApiError {
    fn from(err: url::ParseError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}
