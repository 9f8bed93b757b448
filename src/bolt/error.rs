//! Bolt framing error types.

use std::io;

use thiserror::Error;

use super::packstream::PackStreamError;

/// Result type for Bolt operations.
pub type BoltResult<T> = Result<T, BoltError>;

/// Errors raised while framing messages.
#[derive(Error, Debug)]
pub enum BoltError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// PackStream serialization error
    #[error("PackStream error: {0}")]
    PackStream(#[from] PackStreamError),

    /// Message too large
    #[error("Message too large: {size} bytes (max: {max})")]
    MessageTooLarge {
        /// Size reached so far
        size: usize,
        /// Configured limit
        max: usize,
    },
}

impl BoltError {
    /// Whether the connection must be torn down.
    ///
    /// Every framing error leaves the stream position unknown except a
    /// refused outgoing value, which never reaches the destination buffer.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            BoltError::PackStream(PackStreamError::ProtocolViolation { .. })
        )
    }
}
