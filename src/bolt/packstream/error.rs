//! PackStream error types.
//!
//! Every failure aborts the enclosing read or write call. Nothing in the codec
//! produces a partial value or silently drops one.

use std::io;

use thiserror::Error;

/// Result type for PackStream operations.
pub type PackStreamResult<T> = Result<T, PackStreamError>;

/// Top-level PackStream error.
#[derive(Error, Debug)]
pub enum PackStreamError {
    /// The byte stream could not be decoded
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    /// A value was sent in a direction the protocol forbids
    #[error("Protocol violation: {type_name} {reason}")]
    ProtocolViolation {
        /// Name of the offending type
        type_name: &'static str,
        /// What was wrong
        reason: String,
    },

    /// The codec was configured incorrectly
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// Value too large to encode
    #[error("{kind} too large: {len} (max: {max})")]
    ValueTooLarge {
        /// Value kind ("string", "list", ...)
        kind: &'static str,
        /// Actual length
        len: usize,
        /// Largest length the wire format can carry
        max: usize,
    },

    /// I/O error from the byte source or sink
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl PackStreamError {
    /// Build a protocol violation.
    pub fn violation(type_name: &'static str, reason: impl Into<String>) -> Self {
        Self::ProtocolViolation {
            type_name,
            reason: reason.into(),
        }
    }

    /// Whether this is a decode error.
    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Decode(_))
    }

    /// Whether this is a protocol violation.
    pub fn is_protocol_violation(&self) -> bool {
        matches!(self, Self::ProtocolViolation { .. })
    }

    /// The wrapped decode error, if any.
    pub fn as_decode(&self) -> Option<&DecodeError> {
        match self {
            Self::Decode(e) => Some(e),
            _ => None,
        }
    }
}

/// Malformed input. Fatal to the current read; the stream position is unknown
/// afterwards and the connection must be torn down.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Source exhausted in the middle of a value
    #[error("unexpected end of PackStream data")]
    UnexpectedEof,

    /// Marker byte outside every known range
    #[error("unknown PackStream marker: 0x{0:02X}")]
    UnknownMarker(u8),

    /// Structure tag with no registered handler
    #[error("no handler registered for structure tag 0x{0:02X}")]
    UnknownStructureTag(u8),

    /// Structure field count differs from what the handler expects
    #[error("structure 0x{tag:02X} expects {expected} fields, got {actual}")]
    ArityMismatch {
        /// Structure tag
        tag: u8,
        /// Field count the handler declares
        expected: usize,
        /// Field count found on the wire
        actual: usize,
    },

    /// Nesting exceeded the configured maximum depth
    #[error("value nesting exceeds maximum depth of {max_depth}")]
    NestingTooDeep {
        /// Configured limit
        max_depth: usize,
    },

    /// Text with invalid UTF-8
    #[error("invalid UTF-8 in string: {0}")]
    InvalidUtf8(String),

    /// Map key that is not text
    #[error("map keys must be strings, found {found}")]
    InvalidMapKey {
        /// Category of the key found
        found: &'static str,
    },

    /// Same key twice in one map
    #[error("duplicate map key: {0:?}")]
    DuplicateMapKey(String),

    /// A structure field had the wrong category
    #[error("expected {expected}, found {found}")]
    UnexpectedType {
        /// Expected category
        expected: &'static str,
        /// Category found
        found: &'static str,
    },

    /// A structure field had the right category but an unusable value
    #[error("invalid field {field} of structure 0x{tag:02X}: {reason}")]
    InvalidField {
        /// Structure tag
        tag: u8,
        /// Field name
        field: &'static str,
        /// What was wrong
        reason: String,
    },

    /// Bytes left over after a complete message
    #[error("{remaining} trailing bytes after message")]
    TrailingBytes {
        /// Unconsumed byte count
        remaining: usize,
    },

    /// An earlier read failed on this reader
    #[error("reader is poisoned by an earlier decode failure")]
    Poisoned,
}

/// Codec initialization errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// Two handlers claimed the same structure tag
    #[error("structure tag 0x{tag:02X} already bound to {existing}, cannot register {rejected}")]
    DuplicateTag {
        /// Contested tag
        tag: u8,
        /// Handler already registered
        existing: &'static str,
        /// Handler that was refused
        rejected: &'static str,
    },
}
