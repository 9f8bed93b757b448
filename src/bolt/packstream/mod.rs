//! PackStream serialization format.
//!
//! PackStream is the binary serialization format used by the Bolt protocol
//! to encode values for transmission between client and server.
//!
//! # Wire Categories
//!
//! - **Null**: Single byte marker
//! - **Boolean**: True/False markers
//! - **Integer**: Smallest of tiny, 8, 16, 32 or 64 bits
//! - **Float**: 64-bit IEEE 754
//! - **String**: UTF-8 encoded, tiny or 8/16/32-bit length prefix
//! - **Bytes**: Raw bytes, 8/16/32-bit length prefix
//! - **List**: Heterogeneous collections
//! - **Map**: String keys to arbitrary values
//! - **Structure**: Tag byte plus a fixed number of fields
//!
//! # Structures
//!
//! Structures are decoded and encoded by [`StructHandler`]s looked up by tag in
//! a [`HandlerRegistry`]. The registry is built once and shared read-only.
//!
//! - **Graph** (receive only): Node, Relationship, UnboundRelationship, Path
//! - **Temporal**: Date, Time, LocalTime, DateTime, LocalDateTime, Duration
//! - **Spatial**: Point2D, Point3D
//! - **Bolt messages**: requests (send only), responses (receive only)
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use zeta4g_bolt::bolt::packstream::{decode, encode, HandlerRegistry, Value};
//!
//! let registry = Arc::new(HandlerRegistry::values());
//! let value = Value::List(vec![Value::Integer(1), Value::from("two")]);
//!
//! let bytes = encode(&value, &registry).unwrap();
//! assert_eq!(decode(&bytes, &registry).unwrap(), value);
//! ```

pub mod error;
mod graph;
pub mod handler;
pub mod handlers;
pub mod io;
pub mod marker;
mod reader;
mod registry;
mod spatial;
mod temporal;
mod value;
mod writer;

pub use error::{ConfigurationError, DecodeError, PackStreamError, PackStreamResult};
pub use graph::{Node, Path, Relationship, UnboundRelationship};
pub use handler::{Direction, StructHandler, StructReader, StructWriter};
pub use io::{ByteSink, ByteSource, IoSink, IoSource, SliceSource};
pub use reader::{PackStreamReader, DEFAULT_MAX_NESTING_DEPTH};
pub use registry::{HandlerRegistry, HandlerRegistryBuilder};
pub use spatial::Point;
pub use temporal::{Duration, OffsetTime};
pub use value::{Map, Structure, Value};
pub use writer::PackStreamWriter;

use std::sync::Arc;

use bytes::BytesMut;

/// Encode one value into a fresh buffer.
pub fn encode(value: &Value, registry: &Arc<HandlerRegistry>) -> PackStreamResult<BytesMut> {
    let mut writer = PackStreamWriter::new(BytesMut::with_capacity(256), Arc::clone(registry));
    writer.write(value)?;
    Ok(writer.into_inner())
}

/// Decode exactly one value from `bytes`.
///
/// Leftover bytes after the value are an error.
pub fn decode(bytes: &[u8], registry: &Arc<HandlerRegistry>) -> PackStreamResult<Value> {
    let mut reader = PackStreamReader::new(SliceSource::new(bytes), Arc::clone(registry));
    let value = reader.read()?;
    let remaining = reader.source().remaining();
    if remaining > 0 {
        return Err(DecodeError::TrailingBytes { remaining }.into());
    }
    Ok(value)
}
