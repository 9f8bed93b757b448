//! Generic structure handler and Bolt message envelopes.

use crate::bolt::packstream::error::{PackStreamError, PackStreamResult};
use crate::bolt::packstream::handler::{
    ensure_arity, unexpected_value, Direction, StructHandler, StructReader, StructWriter,
};
use crate::bolt::packstream::value::{Structure, Value};

use self::message_tag::*;

/// Bolt message signatures.
pub mod message_tag {
    /// HELLO request (0x01)
    pub const HELLO: u8 = 0x01;
    /// GOODBYE request (0x02)
    pub const GOODBYE: u8 = 0x02;
    /// RESET request (0x0F)
    pub const RESET: u8 = 0x0F;
    /// RUN request (0x10)
    pub const RUN: u8 = 0x10;
    /// BEGIN request (0x11)
    pub const BEGIN: u8 = 0x11;
    /// COMMIT request (0x12)
    pub const COMMIT: u8 = 0x12;
    /// ROLLBACK request (0x13)
    pub const ROLLBACK: u8 = 0x13;
    /// DISCARD request (0x2F)
    pub const DISCARD: u8 = 0x2F;
    /// PULL request (0x3F)
    pub const PULL: u8 = 0x3F;

    /// SUCCESS response (0x70)
    pub const SUCCESS: u8 = 0x70;
    /// RECORD response (0x71)
    pub const RECORD: u8 = 0x71;
    /// IGNORED response (0x7E)
    pub const IGNORED: u8 = 0x7E;
    /// FAILURE response (0x7F)
    pub const FAILURE: u8 = 0x7F;
}

/// Handler for structures without a dedicated domain type.
///
/// Decodes into [`Value::Structure`] and encodes from it, enforcing the
/// declared arity and direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenericStructHandler {
    tag: u8,
    name: &'static str,
    field_count: usize,
    direction: Direction,
}

impl GenericStructHandler {
    /// Create a handler for `tag`.
    pub const fn new(tag: u8, name: &'static str, field_count: usize, direction: Direction) -> Self {
        Self {
            tag,
            name,
            field_count,
            direction,
        }
    }
}

impl StructHandler for GenericStructHandler {
    fn tag(&self) -> u8 {
        self.tag
    }

    fn name(&self) -> &'static str {
        self.name
    }

    fn field_count(&self) -> usize {
        self.field_count
    }

    fn direction(&self) -> Direction {
        self.direction
    }

    fn decode(&self, reader: &mut dyn StructReader, field_count: usize) -> PackStreamResult<Value> {
        if !self.direction.can_decode() {
            return Err(PackStreamError::violation(
                self.name,
                "is client-to-server only and cannot be received",
            ));
        }
        ensure_arity(self, field_count)?;

        let mut fields = Vec::with_capacity(field_count);
        for _ in 0..field_count {
            fields.push(reader.read()?);
        }
        Ok(Value::Structure(Structure::new(self.tag, fields)))
    }

    fn encode(&self, value: &Value, writer: &mut dyn StructWriter) -> PackStreamResult<()> {
        if !self.direction.can_encode() {
            return Err(PackStreamError::violation(
                self.name,
                "is server-to-client only and cannot be sent",
            ));
        }
        let Value::Structure(s) = value else {
            return Err(unexpected_value(self, value));
        };
        if s.tag != self.tag || s.len() != self.field_count {
            return Err(PackStreamError::violation(
                self.name,
                format!(
                    "expects tag 0x{:02X} with {} fields, got tag 0x{:02X} with {}",
                    self.tag,
                    self.field_count,
                    s.tag,
                    s.len()
                ),
            ));
        }

        writer.write_struct_header(s.len(), s.tag)?;
        for field in &s.fields {
            writer.write(field)?;
        }
        Ok(())
    }
}

pub(super) const MESSAGE_HANDLERS: [GenericStructHandler; 13] = [
    GenericStructHandler::new(HELLO, "HELLO", 1, Direction::EncodeOnly),
    GenericStructHandler::new(GOODBYE, "GOODBYE", 0, Direction::EncodeOnly),
    GenericStructHandler::new(RESET, "RESET", 0, Direction::EncodeOnly),
    GenericStructHandler::new(RUN, "RUN", 3, Direction::EncodeOnly),
    GenericStructHandler::new(BEGIN, "BEGIN", 1, Direction::EncodeOnly),
    GenericStructHandler::new(COMMIT, "COMMIT", 0, Direction::EncodeOnly),
    GenericStructHandler::new(ROLLBACK, "ROLLBACK", 0, Direction::EncodeOnly),
    GenericStructHandler::new(DISCARD, "DISCARD", 1, Direction::EncodeOnly),
    GenericStructHandler::new(PULL, "PULL", 1, Direction::EncodeOnly),
    GenericStructHandler::new(SUCCESS, "SUCCESS", 1, Direction::DecodeOnly),
    GenericStructHandler::new(RECORD, "RECORD", 1, Direction::DecodeOnly),
    GenericStructHandler::new(IGNORED, "IGNORED", 0, Direction::DecodeOnly),
    GenericStructHandler::new(FAILURE, "FAILURE", 1, Direction::DecodeOnly),
];
