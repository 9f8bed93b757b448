//! # Zeta4G Bolt
//!
//! Wire codec and connection metrics for the [Zeta4G](https://github.com/zeta9044/zeta4g)
//! Bolt driver.
//!
//! ## Features
//!
//! - **PackStream** - Streaming reader/writer with a pluggable structure handler registry
//! - **Directionality** - Server-only types (nodes, relationships, paths) refuse to be sent
//! - **Framing** - Chunked Bolt message codec for `tokio_util`
//! - **Metrics** - Lock-free per-address connection and in-use time histograms
//!
//! ## Encoding and Decoding
//!
//! ```rust
//! use std::sync::Arc;
//! use zeta4g_bolt::bolt::packstream::{decode, encode};
//! use zeta4g_bolt::{HandlerRegistry, Value};
//!
//! let registry = Arc::new(HandlerRegistry::bolt());
//!
//! let value = Value::List(vec![Value::Integer(1), Value::from("two")]);
//! let bytes = encode(&value, &registry).unwrap();
//! assert_eq!(decode(&bytes, &registry).unwrap(), value);
//! ```
//!
//! Relationships may be received but never sent:
//!
//! ```rust
//! use std::sync::Arc;
//! use zeta4g_bolt::bolt::packstream::{encode, Map, Relationship};
//! use zeta4g_bolt::{HandlerRegistry, PackStreamError, Value};
//!
//! let registry = Arc::new(HandlerRegistry::bolt());
//! let rel = Relationship::new(1, 2, 3, "KNOWS", Map::new());
//!
//! let err = encode(&Value::Relationship(rel), &registry).unwrap_err();
//! assert!(matches!(err, PackStreamError::ProtocolViolation { .. }));
//! ```
//!
//! ## Modules
//!
//! - [`bolt`] - PackStream codec and message framing
//! - [`metrics`] - Connection lifecycle metrics
//!

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod bolt;
pub mod metrics;

// Re-exports for convenience
pub use bolt::{
    BoltCodec, BoltError, BoltResult, CodecConfig, DecodeError, HandlerRegistry,
    PackStreamError, PackStreamReader, PackStreamWriter, Value,
};

pub use metrics::{
    ConnectionListener, ConnectionMetrics, ConnectionMetricsRecorder, ListenerEvent,
    MetricsConfig, ServerAddress,
};
