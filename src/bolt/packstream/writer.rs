//! PackStream writer machine.

use std::sync::Arc;

use super::error::{PackStreamError, PackStreamResult};
use super::handler::StructWriter;
use super::io::ByteSink;
use super::marker::*;
use super::registry::HandlerRegistry;
use super::value::{Map, Value};

/// Push-based encoder.
///
/// Every value is written in the smallest representation that holds it.
/// Domain values are handed to their registered handler. A failed write
/// poisons the writer: bytes already pushed to the sink stay there and the
/// caller must discard the message.
pub struct PackStreamWriter<K> {
    sink: K,
    registry: Arc<HandlerRegistry>,
    poisoned: bool,
}

impl<K: ByteSink> PackStreamWriter<K> {
    /// Create a writer over `sink`.
    pub fn new(sink: K, registry: Arc<HandlerRegistry>) -> Self {
        Self {
            sink,
            registry,
            poisoned: false,
        }
    }

    /// Whether an earlier write failed.
    pub fn is_poisoned(&self) -> bool {
        self.poisoned
    }

    /// Borrow the byte sink.
    pub fn sink(&self) -> &K {
        &self.sink
    }

    /// Unwrap the byte sink.
    pub fn into_inner(self) -> K {
        self.sink
    }

    /// Write a complete value.
    pub fn write(&mut self, value: &Value) -> PackStreamResult<()> {
        self.guarded(|w| w.write_value(value))
    }

    /// Write a structure header. The caller writes `field_count` fields next.
    pub fn write_struct_header(&mut self, field_count: usize, tag: u8) -> PackStreamResult<()> {
        self.guarded(|w| w.struct_header(field_count, tag))
    }

    /// Write null.
    pub fn write_null(&mut self) -> PackStreamResult<()> {
        self.guarded(|w| w.sink.write_byte(NULL))
    }

    /// Write a boolean.
    pub fn write_bool(&mut self, value: bool) -> PackStreamResult<()> {
        self.guarded(|w| w.sink.write_byte(if value { TRUE } else { FALSE }))
    }

    /// Write an integer.
    pub fn write_int(&mut self, value: i64) -> PackStreamResult<()> {
        self.guarded(|w| w.int(value))
    }

    /// Write a float.
    pub fn write_float(&mut self, value: f64) -> PackStreamResult<()> {
        self.guarded(|w| w.float(value))
    }

    /// Write text.
    pub fn write_string(&mut self, value: &str) -> PackStreamResult<()> {
        self.guarded(|w| w.string(value))
    }

    /// Write a byte array.
    pub fn write_bytes(&mut self, value: &[u8]) -> PackStreamResult<()> {
        self.guarded(|w| {
            w.sized_header(&BYTES_MARKERS, value.len())?;
            w.sink.write_bytes(value)
        })
    }

    /// Write a list header. The caller writes `len` items next.
    pub fn write_list_header(&mut self, len: usize) -> PackStreamResult<()> {
        self.guarded(|w| w.sized_header(&LIST_MARKERS, len))
    }

    /// Write a map header. The caller writes `len` key/value pairs next.
    pub fn write_map_header(&mut self, len: usize) -> PackStreamResult<()> {
        self.guarded(|w| w.sized_header(&MAP_MARKERS, len))
    }

    /// Write a list.
    pub fn write_list(&mut self, items: &[Value]) -> PackStreamResult<()> {
        self.guarded(|w| w.list(items))
    }

    /// Write a map.
    pub fn write_map(&mut self, map: &Map) -> PackStreamResult<()> {
        self.guarded(|w| w.map(map))
    }

    /// Flush the sink.
    pub fn flush(&mut self) -> PackStreamResult<()> {
        self.guarded(|w| w.sink.flush())
    }

    fn guarded(
        &mut self,
        f: impl FnOnce(&mut Self) -> PackStreamResult<()>,
    ) -> PackStreamResult<()> {
        if self.poisoned {
            return Err(PackStreamError::violation(
                "PackStreamWriter",
                "is poisoned by an earlier write failure",
            ));
        }
        let result = f(self);
        if let Err(e) = &result {
            self.poisoned = true;
            tracing::warn!("PackStream writer poisoned: {}", e);
        }
        result
    }

    fn write_value(&mut self, value: &Value) -> PackStreamResult<()> {
        match value {
            Value::Null => self.sink.write_byte(NULL),
            Value::Boolean(b) => self.sink.write_byte(if *b { TRUE } else { FALSE }),
            Value::Integer(i) => self.int(*i),
            Value::Float(f) => self.float(*f),
            Value::Bytes(b) => {
                self.sized_header(&BYTES_MARKERS, b.len())?;
                self.sink.write_bytes(b)
            }
            Value::String(s) => self.string(s),
            Value::List(items) => self.list(items),
            Value::Map(map) => self.map(map),
            other => self.structure(other),
        }
    }

    fn int(&mut self, value: i64) -> PackStreamResult<()> {
        if is_tiny_int(value) {
            self.sink.write_byte(value as u8)
        } else if value >= i8::MIN as i64 && value <= i8::MAX as i64 {
            self.sink.write_byte(INT_8)?;
            self.sink.write_byte(value as i8 as u8)
        } else if value >= i16::MIN as i64 && value <= i16::MAX as i64 {
            self.sink.write_byte(INT_16)?;
            self.sink.write_bytes(&(value as i16).to_be_bytes())
        } else if value >= i32::MIN as i64 && value <= i32::MAX as i64 {
            self.sink.write_byte(INT_32)?;
            self.sink.write_bytes(&(value as i32).to_be_bytes())
        } else {
            self.sink.write_byte(INT_64)?;
            self.sink.write_bytes(&value.to_be_bytes())
        }
    }

    fn float(&mut self, value: f64) -> PackStreamResult<()> {
        self.sink.write_byte(FLOAT_64)?;
        self.sink.write_bytes(&value.to_be_bytes())
    }

    fn string(&mut self, value: &str) -> PackStreamResult<()> {
        self.sized_header(&STRING_MARKERS, value.len())?;
        self.sink.write_bytes(value.as_bytes())
    }

    fn list(&mut self, items: &[Value]) -> PackStreamResult<()> {
        self.sized_header(&LIST_MARKERS, items.len())?;
        for item in items {
            self.write_value(item)?;
        }
        Ok(())
    }

    fn map(&mut self, map: &Map) -> PackStreamResult<()> {
        self.sized_header(&MAP_MARKERS, map.len())?;
        for (key, value) in map {
            self.string(key)?;
            self.write_value(value)?;
        }
        Ok(())
    }

    fn sized_header(&mut self, markers: &SizedMarkers, len: usize) -> PackStreamResult<()> {
        if let Some(tiny) = markers.tiny {
            if len <= TINY_MAX_LEN {
                return self.sink.write_byte(tiny | len as u8);
            }
        }

        if len <= u8::MAX as usize {
            self.sink.write_byte(markers.prefixed[0])?;
            self.sink.write_byte(len as u8)
        } else if len <= u16::MAX as usize {
            self.sink.write_byte(markers.prefixed[1])?;
            self.sink.write_bytes(&(len as u16).to_be_bytes())
        } else if len <= u32::MAX as usize {
            self.sink.write_byte(markers.prefixed[2])?;
            self.sink.write_bytes(&(len as u32).to_be_bytes())
        } else {
            Err(PackStreamError::ValueTooLarge {
                kind: markers.kind,
                len,
                max: u32::MAX as usize,
            })
        }
    }

    fn struct_header(&mut self, field_count: usize, tag: u8) -> PackStreamResult<()> {
        if field_count <= TINY_MAX_LEN {
            self.sink.write_byte(TINY_STRUCT | field_count as u8)?;
        } else if field_count <= u8::MAX as usize {
            self.sink.write_byte(STRUCT_8)?;
            self.sink.write_byte(field_count as u8)?;
        } else if field_count <= u16::MAX as usize {
            self.sink.write_byte(STRUCT_16)?;
            self.sink.write_bytes(&(field_count as u16).to_be_bytes())?;
        } else {
            return Err(PackStreamError::ValueTooLarge {
                kind: "structure",
                len: field_count,
                max: u16::MAX as usize,
            });
        }
        self.sink.write_byte(tag)
    }

    fn structure(&mut self, value: &Value) -> PackStreamResult<()> {
        let Some(tag) = value.struct_tag() else {
            return Err(PackStreamError::violation(
                value.type_name(),
                "is not a structure",
            ));
        };
        let registry = Arc::clone(&self.registry);
        let Some(handler) = registry.resolve(tag) else {
            return Err(PackStreamError::violation(
                value.type_name(),
                format!("has no handler registered for tag 0x{:02X}", tag),
            ));
        };
        tracing::trace!("Encoding structure {} (0x{:02X})", handler.name(), tag);
        handler.encode(value, self)
    }
}

impl<K: ByteSink> StructWriter for PackStreamWriter<K> {
    fn write_struct_header(&mut self, field_count: usize, tag: u8) -> PackStreamResult<()> {
        self.struct_header(field_count, tag)
    }

    fn write(&mut self, value: &Value) -> PackStreamResult<()> {
        self.write_value(value)
    }

    fn write_int(&mut self, value: i64) -> PackStreamResult<()> {
        self.int(value)
    }

    fn write_float(&mut self, value: f64) -> PackStreamResult<()> {
        self.float(value)
    }

    fn write_string(&mut self, value: &str) -> PackStreamResult<()> {
        self.string(value)
    }
}

impl<K> std::fmt::Debug for PackStreamWriter<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PackStreamWriter")
            .field("poisoned", &self.poisoned)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(value: &Value) -> Vec<u8> {
        let mut writer = PackStreamWriter::new(Vec::new(), Arc::new(HandlerRegistry::values()));
        writer.write(value).unwrap();
        writer.into_inner()
    }

    #[test]
    fn test_encode_scalars() {
        assert_eq!(encode(&Value::Null), vec![NULL]);
        assert_eq!(encode(&Value::Boolean(true)), vec![TRUE]);
        assert_eq!(encode(&Value::Boolean(false)), vec![FALSE]);

        let mut float = vec![FLOAT_64];
        float.extend_from_slice(&(-0.5f64).to_be_bytes());
        assert_eq!(encode(&Value::Float(-0.5)), float);
    }

    #[test]
    fn test_encode_int_boundaries() {
        let cases: [(i64, &[u8]); 12] = [
            (0, &[0x00]),
            (127, &[0x7F]),
            (-16, &[0xF0]),
            (-17, &[INT_8, 0xEF]),
            (-128, &[INT_8, 0x80]),
            (128, &[INT_16, 0x00, 0x80]),
            (-129, &[INT_16, 0xFF, 0x7F]),
            (32_767, &[INT_16, 0x7F, 0xFF]),
            (32_768, &[INT_32, 0x00, 0x00, 0x80, 0x00]),
            (i32::MIN as i64, &[INT_32, 0x80, 0x00, 0x00, 0x00]),
            (i32::MAX as i64 + 1, &[INT_64, 0, 0, 0, 0, 0x80, 0, 0, 0]),
            (i64::MIN, &[INT_64, 0x80, 0, 0, 0, 0, 0, 0, 0]),
        ];
        for (value, expected) in cases {
            assert_eq!(encode(&Value::Integer(value)), expected, "value {}", value);
        }
    }

    #[test]
    fn test_encode_length_tiers() {
        assert_eq!(encode(&Value::from(""))[0], 0x80);
        assert_eq!(encode(&Value::from("a".repeat(15)))[0], 0x8F);
        assert_eq!(&encode(&Value::from("a".repeat(16)))[..2], &[STRING_8, 16]);
        assert_eq!(&encode(&Value::from("a".repeat(256)))[..3], &[STRING_16, 0x01, 0x00]);
        assert_eq!(
            &encode(&Value::from("a".repeat(65_536)))[..5],
            &[STRING_32, 0x00, 0x01, 0x00, 0x00]
        );

        assert_eq!(&encode(&Value::Bytes(vec![]))[..], &[BYTES_8, 0x00]);
        assert_eq!(encode(&Value::List(vec![Value::Null; 15]))[0], 0x9F);
        assert_eq!(&encode(&Value::List(vec![Value::Null; 16]))[..2], &[LIST_8, 16]);
    }

    #[test]
    fn test_encode_map() {
        let mut map = Map::new();
        map.insert("a".into(), Value::Integer(1));
        assert_eq!(encode(&Value::Map(map)), vec![0xA1, 0x81, b'a', 0x01]);
    }

    #[test]
    fn test_struct_header_tiers() {
        let mut writer = PackStreamWriter::new(Vec::new(), Arc::new(HandlerRegistry::empty()));
        writer.write_struct_header(3, 0x4E).unwrap();
        writer.write_struct_header(16, 0x10).unwrap();
        writer.write_struct_header(300, 0x20).unwrap();
        assert_eq!(
            writer.into_inner(),
            vec![0xB3, 0x4E, STRUCT_8, 16, 0x10, STRUCT_16, 0x01, 0x2C, 0x20]
        );
    }

    #[test]
    fn test_struct_header_too_large() {
        let mut writer = PackStreamWriter::new(Vec::new(), Arc::new(HandlerRegistry::empty()));
        let err = writer.write_struct_header(70_000, 0x01).unwrap_err();
        assert!(matches!(err, PackStreamError::ValueTooLarge { kind: "structure", .. }));
    }

    #[test]
    fn test_convenience_writers() {
        let mut writer = PackStreamWriter::new(Vec::new(), Arc::new(HandlerRegistry::empty()));
        writer.write_list_header(2).unwrap();
        writer.write_int(1).unwrap();
        writer.write_string("x").unwrap();
        writer.write_map_header(0).unwrap();
        writer.write_null().unwrap();
        writer.write_bool(true).unwrap();
        writer.write_bytes(&[7]).unwrap();
        writer.flush().unwrap();
        assert_eq!(
            writer.into_inner(),
            vec![0x92, 0x01, 0x81, b'x', 0xA0, NULL, TRUE, BYTES_8, 0x01, 0x07]
        );
    }

    #[test]
    fn test_structure_without_handler() {
        let mut writer = PackStreamWriter::new(Vec::new(), Arc::new(HandlerRegistry::empty()));
        let value = Value::Structure(crate::bolt::packstream::Structure::new(0x33, vec![]));
        assert!(writer.write(&value).unwrap_err().is_protocol_violation());
    }

    #[test]
    fn test_poisoned_after_failure() {
        let mut writer = PackStreamWriter::new(Vec::new(), Arc::new(HandlerRegistry::values()));
        let rel = crate::bolt::packstream::Relationship::new(1, 2, 3, "R", Map::new());

        assert!(writer.write(&Value::Relationship(rel)).is_err());
        assert!(writer.is_poisoned());

        let err = writer.write(&Value::Null).unwrap_err();
        assert!(err.is_protocol_violation());
        assert!(err.to_string().contains("poisoned"));
    }
}
