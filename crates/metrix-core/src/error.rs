//! Shared error type across metrix crates.

use thiserror::Error;

/// Client-facing error codes (stable API).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCode {
    /// Invalid input / malformed payload / bad signature.
    BadRequest,
    /// Metric or resource does not exist.
    NotFound,
    /// A backing service (database, upstream server) is not reachable.
    Unavailable,
    /// Internal server error.
    Internal,
}

impl ClientCode {
    /// String representation used in responses and logs.
    pub fn as_str(self) -> &'static str {
        match self {
            ClientCode::BadRequest => "BAD_REQUEST",
            ClientCode::NotFound => "NOT_FOUND",
            ClientCode::Unavailable => "UNAVAILABLE",
            ClientCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, MetrixError>;

/// Unified error type used by core, server and agent.
#[derive(Debug, Error)]
pub enum MetrixError {
    #[error("malformed payload: {0}")]
    MalformedPayload(String),
    #[error("invalid metric kind: {0}")]
    InvalidMetricKind(String),
    #[error("signature mismatch")]
    SignatureMismatch,
    #[error("not found: {0}")]
    NotFound(String),
    #[error("delivery failed: {0}")]
    DeliveryFailed(String),
    #[error("persistence write failed: {0}")]
    PersistenceWriteFailed(String),
    #[error("persistence read failed: {0}")]
    PersistenceReadFailed(String),
    #[error("backend unreachable: {0}")]
    BackendUnreachable(String),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl MetrixError {
    /// Map internal error to a stable client-facing code.
    pub fn client_code(&self) -> ClientCode {
        match self {
            MetrixError::MalformedPayload(_)
            | MetrixError::InvalidMetricKind(_)
            | MetrixError::SignatureMismatch
            | MetrixError::InvalidConfig(_) => ClientCode::BadRequest,
            MetrixError::NotFound(_) => ClientCode::NotFound,
            MetrixError::DeliveryFailed(_) | MetrixError::BackendUnreachable(_) => {
                ClientCode::Unavailable
            }
            MetrixError::PersistenceWriteFailed(_)
            | MetrixError::PersistenceReadFailed(_)
            | MetrixError::Internal(_) => ClientCode::Internal,
        }
    }
}
