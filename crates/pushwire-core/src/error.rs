//! Shared error type across pushwire crates.

use thiserror::Error;

/// Stable error codes (used in logs and by consumers of the error queue).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Transport could not be established.
    Connection,
    /// Transport failed while awaiting a frame.
    Read,
    /// Malformed envelope, routing header or event payload.
    Decode,
    /// Control frame could not be written.
    Write,
    /// Close handshake failed.
    Close,
    /// Invalid configuration.
    Config,
    /// Lifecycle operation not allowed in the current state.
    InvalidState,
}

impl ErrorCode {
    /// String representation used in structured logs.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::Connection => "CONNECTION",
            ErrorCode::Read => "READ",
            ErrorCode::Decode => "DECODE",
            ErrorCode::Write => "WRITE",
            ErrorCode::Close => "CLOSE",
            ErrorCode::Config => "CONFIG",
            ErrorCode::InvalidState => "INVALID_STATE",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, PushError>;

/// Unified error type used by core and client.
#[derive(Debug, Error)]
pub enum PushError {
    #[error("connection failed: {0}")]
    Connection(String),
    #[error("read failed: {0}")]
    Read(String),
    #[error("decode failed: {0}")]
    Decode(String),
    #[error("write failed: {0}")]
    Write(String),
    #[error("close failed: {0}")]
    Close(String),
    #[error("invalid config: {0}")]
    Config(String),
    #[error("invalid state: {0}")]
    InvalidState(String),
}

impl PushError {
    /// Map the error to its stable code.
    pub fn code(&self) -> ErrorCode {
        match self {
            PushError::Connection(_) => ErrorCode::Connection,
            PushError::Read(_) => ErrorCode::Read,
            PushError::Decode(_) => ErrorCode::Decode,
            PushError::Write(_) => ErrorCode::Write,
            PushError::Close(_) => ErrorCode::Close,
            PushError::Config(_) => ErrorCode::Config,
            PushError::InvalidState(_) => ErrorCode::InvalidState,
        }
    }
}
