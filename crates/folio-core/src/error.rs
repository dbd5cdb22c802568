//! Shared error type across folio crates.

use thiserror::Error;

/// Client-facing error codes (stable API).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCode {
    /// Invalid input / malformed frame.
    BadRequest,
    /// Event name outside the inbound vocabulary.
    UnknownEvent,
    /// Unsupported protocol version.
    UnsupportedVersion,
    /// Presence dispatcher is not running.
    Unavailable,
    /// Internal server error.
    Internal,
}

impl ClientCode {
    /// String representation used in JSON responses and logs.
    pub fn as_str(self) -> &'static str {
        match self {
            ClientCode::BadRequest => "BAD_REQUEST",
            ClientCode::UnknownEvent => "UNKNOWN_EVENT",
            ClientCode::UnsupportedVersion => "UNSUPPORTED_VERSION",
            ClientCode::Unavailable => "UNAVAILABLE",
            ClientCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, FolioError>;

/// Unified error type used by core and gateway.
#[derive(Debug, Error)]
pub enum FolioError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("unknown event: {0}")]
    UnknownEvent(String),
    #[error("unsupported protocol version")]
    UnsupportedVersion,
    #[error("presence dispatcher unavailable")]
    Unavailable,
    #[error("internal: {0}")]
    Internal(String),
}

impl FolioError {
    /// Map internal error to a stable client-facing code.
    pub fn client_code(&self) -> ClientCode {
        match self {
            FolioError::BadRequest(_) => ClientCode::BadRequest,
            FolioError::UnknownEvent(_) => ClientCode::UnknownEvent,
            FolioError::UnsupportedVersion => ClientCode::UnsupportedVersion,
            FolioError::Unavailable => ClientCode::Unavailable,
            FolioError::Internal(_) => ClientCode::Internal,
        }
    }
}
