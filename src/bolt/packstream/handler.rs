//! Structure handler abstraction.
//!
//! A handler owns one structure tag. It declares the field count it expects
//! and the direction it may travel in, and converts between the structure's
//! fields and a domain [`Value`].
//!
//! Handlers see the reader and writer only through [`StructReader`] and
//! [`StructWriter`], so the same handler works over any byte source or sink.

use std::fmt;

use super::error::{DecodeError, PackStreamError, PackStreamResult};
use super::value::{Map, Value};

/// Which way a structure may travel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Server to client only
    DecodeOnly,
    /// Client to server only
    EncodeOnly,
    /// Both ways
    Both,
}

impl Direction {
    /// Whether a client may send the structure.
    pub fn can_encode(self) -> bool {
        matches!(self, Direction::EncodeOnly | Direction::Both)
    }

    /// Whether a client may receive the structure.
    pub fn can_decode(self) -> bool {
        matches!(self, Direction::DecodeOnly | Direction::Both)
    }
}

/// Decode/encode unit bound to one structure tag.
pub trait StructHandler: Send + Sync + fmt::Debug {
    /// Structure tag.
    fn tag(&self) -> u8;

    /// Type name for diagnostics.
    fn name(&self) -> &'static str;

    /// Field count the structure must carry.
    fn field_count(&self) -> usize;

    /// Allowed direction of travel.
    fn direction(&self) -> Direction;

    /// Read `field_count` fields from `reader` and build the value.
    ///
    /// The structure header and tag have already been consumed.
    fn decode(&self, reader: &mut dyn StructReader, field_count: usize) -> PackStreamResult<Value> {
        let _ = (reader, field_count);
        Err(PackStreamError::violation(
            self.name(),
            "is client-to-server only and cannot be received",
        ))
    }

    /// Write `value` as a complete structure, header included.
    fn encode(&self, value: &Value, writer: &mut dyn StructWriter) -> PackStreamResult<()> {
        let _ = (value, writer);
        Err(PackStreamError::violation(
            self.name(),
            "is server-to-client only and cannot be sent",
        ))
    }
}

/// Fail unless the wire field count is the one the handler expects.
pub fn ensure_arity(handler: &dyn StructHandler, actual: usize) -> Result<(), DecodeError> {
    let expected = handler.field_count();
    if actual != expected {
        return Err(DecodeError::ArityMismatch {
            tag: handler.tag(),
            expected,
            actual,
        });
    }
    Ok(())
}

/// Error for a value handed to the wrong handler.
pub fn unexpected_value(handler: &dyn StructHandler, value: &Value) -> PackStreamError {
    PackStreamError::violation(
        handler.name(),
        format!("handler cannot encode a {} value", value.type_name()),
    )
}

/// Reader view given to handlers.
pub trait StructReader {
    /// Read the next complete value.
    fn read(&mut self) -> PackStreamResult<Value>;

    /// Read an integer field.
    fn read_int(&mut self) -> PackStreamResult<i64> {
        match self.read()? {
            Value::Integer(i) => Ok(i),
            other => Err(unexpected_type("Integer", &other)),
        }
    }

    /// Read a float field.
    fn read_float(&mut self) -> PackStreamResult<f64> {
        match self.read()? {
            Value::Float(f) => Ok(f),
            other => Err(unexpected_type("Float", &other)),
        }
    }

    /// Read a text field.
    fn read_string(&mut self) -> PackStreamResult<String> {
        match self.read()? {
            Value::String(s) => Ok(s),
            other => Err(unexpected_type("String", &other)),
        }
    }

    /// Read a list field.
    fn read_list(&mut self) -> PackStreamResult<Vec<Value>> {
        match self.read()? {
            Value::List(l) => Ok(l),
            other => Err(unexpected_type("List", &other)),
        }
    }

    /// Read a map field.
    fn read_map(&mut self) -> PackStreamResult<Map> {
        match self.read()? {
            Value::Map(m) => Ok(m),
            other => Err(unexpected_type("Map", &other)),
        }
    }
}

fn unexpected_type(expected: &'static str, found: &Value) -> PackStreamError {
    DecodeError::UnexpectedType {
        expected,
        found: found.type_name(),
    }
    .into()
}

/// Writer view given to handlers.
pub trait StructWriter {
    /// Write a structure header: marker with field count, then the tag.
    fn write_struct_header(&mut self, field_count: usize, tag: u8) -> PackStreamResult<()>;

    /// Write a complete value.
    fn write(&mut self, value: &Value) -> PackStreamResult<()>;

    /// Write an integer.
    fn write_int(&mut self, value: i64) -> PackStreamResult<()>;

    /// Write a float.
    fn write_float(&mut self, value: f64) -> PackStreamResult<()>;

    /// Write text.
    fn write_string(&mut self, value: &str) -> PackStreamResult<()>;
}
