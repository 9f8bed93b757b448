//! # Bolt Protocol Layer
//!
//! Wire-level building blocks for talking to Bolt-compatible graph databases.
//!
//! ## Overview
//!
//! - **PackStream** - Binary serialization with pluggable structure handlers
//! - **Codec** - Chunked message framing for Tokio
//! - **Config** - Decoder limits
//!
//! Socket I/O, handshake, authentication and routing live outside this crate.
//! The codec performs no I/O of its own; it only transforms buffers.
//!
//! ## Submodules
//!
//! - [`packstream`] - Values, reader/writer machines, handler registry
//! - [`codec`] - Tokio codec for async I/O
//! - [`config`] - Codec limits
//! - [`error`] - Framing error types

pub mod codec;
pub mod config;
pub mod error;
pub mod packstream;

pub use codec::{BoltCodec, END_MARKER};
pub use config::{CodecConfig, CodecConfigBuilder};
pub use error::{BoltError, BoltResult};
pub use packstream::{
    DecodeError, HandlerRegistry, PackStreamError, PackStreamReader, PackStreamWriter, Value,
};
