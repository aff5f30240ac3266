//! Error type returned by every call that goes through the request pipeline

use thiserror::Error;

use crate::csrf::CsrfError;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Transport-level failure (DNS, refused connection, timeout, abort)
    #[error("Network error: {0}")]
    Network(String),

    /// The CSRF token endpoint returned something unusable
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// The server reported the session as missing or expired (401)
    #[error("Authentication required")]
    AuthRequired,

    /// Access denied (403), also after the single token-refresh retry
    #[error("Access forbidden: {0}")]
    Forbidden(String),

    /// Any other non-2xx response
    #[error("Request failed ({status}): {message}")]
    RequestFailed { status: u16, message: String },

    /// A successful response body did not match the expected type
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// The request body could not be encoded
    #[error("Failed to encode request: {0}")]
    Serialization(String),

    /// The client could not be built from its configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ApiError {
    /// HTTP status associated with the error, `0` when no response was received.
    pub fn status(&self) -> u16 {
        match self {
            ApiError::AuthRequired => 401,
            ApiError::Forbidden(_) => 403,
            ApiError::RequestFailed { status, .. } => *status,
            ApiError::Network(_)
            | ApiError::Protocol(_)
            | ApiError::Decode(_)
            | ApiError::Serialization(_)
            | ApiError::Config(_) => 0,
        }
    }
}

impl From<CsrfError> for ApiError {
    fn from(err: CsrfError) -> Self {
        match err {
            CsrfError::Network(msg) => ApiError::Network(msg),
            CsrfError::Protocol(msg) => ApiError::Protocol(msg),
        }
    }
}
