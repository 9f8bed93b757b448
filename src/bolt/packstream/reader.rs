//! PackStream reader machine.

use std::sync::Arc;

use super::error::{DecodeError, PackStreamResult};
use super::handler::StructReader;
use super::io::ByteSource;
use super::marker::{Length, Marker, Width};
use super::registry::HandlerRegistry;
use super::value::{Map, Value};

/// Default maximum container nesting depth.
pub const DEFAULT_MAX_NESTING_DEPTH: usize = 256;

/// Upper bound on capacity reserved from a declared length.
const MAX_PREALLOC: usize = 1024;

/// Pull-based decoder producing one [`Value`] per [`read`](Self::read).
///
/// Structures are resolved through the shared [`HandlerRegistry`]. A failed
/// read poisons the reader; the stream position is unknown afterwards.
pub struct PackStreamReader<S> {
    source: S,
    registry: Arc<HandlerRegistry>,
    max_depth: usize,
    depth: usize,
    poisoned: bool,
}

impl<S: ByteSource> PackStreamReader<S> {
    /// Create a reader over `source`.
    pub fn new(source: S, registry: Arc<HandlerRegistry>) -> Self {
        Self {
            source,
            registry,
            max_depth: DEFAULT_MAX_NESTING_DEPTH,
            depth: 0,
            poisoned: false,
        }
    }

    /// Set the maximum container nesting depth.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Maximum container nesting depth.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Whether an earlier read failed.
    pub fn is_poisoned(&self) -> bool {
        self.poisoned
    }

    /// Borrow the byte source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Unwrap the byte source.
    pub fn into_inner(self) -> S {
        self.source
    }

    /// Read the next complete value.
    pub fn read(&mut self) -> PackStreamResult<Value> {
        if self.poisoned {
            return Err(DecodeError::Poisoned.into());
        }
        self.depth = 0;
        match self.read_value() {
            Ok(value) => Ok(value),
            Err(e) => {
                self.poisoned = true;
                tracing::warn!("PackStream reader poisoned: {}", e);
                Err(e)
            }
        }
    }

    fn read_value(&mut self) -> PackStreamResult<Value> {
        let marker = self.source.read_byte()?;
        match Marker::classify(marker)? {
            Marker::Null => Ok(Value::Null),
            Marker::Boolean(b) => Ok(Value::Boolean(b)),
            Marker::TinyInt(i) => Ok(Value::Integer(i as i64)),
            Marker::Int(width) => self.read_int_body(width).map(Value::Integer),
            Marker::Float64 => Ok(Value::Float(self.source.read_f64()?)),
            Marker::Bytes(width) => {
                let len = self.read_len(width)?;
                Ok(Value::Bytes(self.source.read_bytes(len)?))
            }
            Marker::String(length) => {
                let len = self.length(length)?;
                self.read_string_body(len).map(Value::String)
            }
            Marker::List(length) => {
                let len = self.length(length)?;
                self.nested(|r| r.read_list_body(len))
            }
            Marker::Map(length) => {
                let len = self.length(length)?;
                self.nested(|r| r.read_map_body(len))
            }
            Marker::Struct(length) => {
                let field_count = self.length(length)?;
                let tag = self.source.read_byte()?;
                self.nested(|r| r.read_struct_body(field_count, tag))
            }
        }
    }

    fn nested<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> PackStreamResult<T>,
    ) -> PackStreamResult<T> {
        if self.depth >= self.max_depth {
            return Err(DecodeError::NestingTooDeep {
                max_depth: self.max_depth,
            }
            .into());
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    fn read_int_body(&mut self, width: Width) -> PackStreamResult<i64> {
        Ok(match width {
            Width::W8 => self.source.read_byte()? as i8 as i64,
            Width::W16 => self.source.read_i16()? as i64,
            Width::W32 => self.source.read_i32()? as i64,
            Width::W64 => self.source.read_i64()?,
        })
    }

    fn length(&mut self, length: Length) -> PackStreamResult<usize> {
        match length {
            Length::Tiny(len) => Ok(len),
            Length::Prefixed(width) => self.read_len(width),
        }
    }

    fn read_len(&mut self, width: Width) -> PackStreamResult<usize> {
        Ok(match width {
            Width::W8 => self.source.read_byte()? as usize,
            Width::W16 => self.source.read_u16()? as usize,
            Width::W32 => self.source.read_u32()? as usize,
            Width::W64 => self.source.read_i64()? as u64 as usize,
        })
    }

    fn read_string_body(&mut self, len: usize) -> PackStreamResult<String> {
        let bytes = self.source.read_bytes(len)?;
        String::from_utf8(bytes).map_err(|e| DecodeError::InvalidUtf8(e.to_string()).into())
    }

    fn read_list_body(&mut self, len: usize) -> PackStreamResult<Value> {
        let mut items = Vec::with_capacity(len.min(MAX_PREALLOC));
        for _ in 0..len {
            items.push(self.read_value()?);
        }
        Ok(Value::List(items))
    }

    fn read_map_body(&mut self, len: usize) -> PackStreamResult<Value> {
        let mut map = Map::with_capacity(len.min(MAX_PREALLOC));
        for _ in 0..len {
            let key = match self.read_value()? {
                Value::String(s) => s,
                other => {
                    return Err(DecodeError::InvalidMapKey {
                        found: other.type_name(),
                    }
                    .into())
                }
            };
            let value = self.read_value()?;
            if map.contains_key(&key) {
                return Err(DecodeError::DuplicateMapKey(key).into());
            }
            map.insert(key, value);
        }
        Ok(Value::Map(map))
    }

    fn read_struct_body(&mut self, field_count: usize, tag: u8) -> PackStreamResult<Value> {
        let registry = Arc::clone(&self.registry);
        let handler = registry
            .resolve(tag)
            .ok_or(DecodeError::UnknownStructureTag(tag))?;
        tracing::trace!(
            "Decoding structure {} (0x{:02X}) with {} fields",
            handler.name(),
            tag,
            field_count
        );
        handler.decode(self, field_count)
    }
}

impl<S: ByteSource> StructReader for PackStreamReader<S> {
    fn read(&mut self) -> PackStreamResult<Value> {
        self.read_value()
    }
}

impl<S> std::fmt::Debug for PackStreamReader<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PackStreamReader")
            .field("max_depth", &self.max_depth)
            .field("poisoned", &self.poisoned)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bolt::packstream::io::SliceSource;
    use crate::bolt::packstream::marker::*;

    fn decode(data: &[u8]) -> PackStreamResult<Value> {
        PackStreamReader::new(SliceSource::new(data), Arc::new(HandlerRegistry::values())).read()
    }

    #[test]
    fn test_decode_scalars() {
        assert_eq!(decode(&[NULL]).unwrap(), Value::Null);
        assert_eq!(decode(&[TRUE]).unwrap(), Value::Boolean(true));
        assert_eq!(decode(&[FALSE]).unwrap(), Value::Boolean(false));
        assert_eq!(decode(&[0x2A]).unwrap(), Value::Integer(42));
        assert_eq!(decode(&[0xF0]).unwrap(), Value::Integer(-16));
        assert_eq!(decode(&[INT_8, 0x80]).unwrap(), Value::Integer(-128));
        assert_eq!(decode(&[INT_16, 0x01, 0x00]).unwrap(), Value::Integer(256));
        assert_eq!(
            decode(&[INT_64, 0x7F, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF]).unwrap(),
            Value::Integer(i64::MAX)
        );

        let mut float = vec![FLOAT_64];
        float.extend_from_slice(&1.5f64.to_be_bytes());
        assert_eq!(decode(&float).unwrap(), Value::Float(1.5));
    }

    #[test]
    fn test_decode_text_and_bytes() {
        assert_eq!(decode(&[0x83, b'a', b'b', b'c']).unwrap(), Value::from("abc"));
        assert_eq!(decode(&[STRING_8, 0x01, b'z']).unwrap(), Value::from("z"));
        assert_eq!(
            decode(&[BYTES_8, 0x02, 0xDE, 0xAD]).unwrap(),
            Value::Bytes(vec![0xDE, 0xAD])
        );
    }

    #[test]
    fn test_decode_containers() {
        let value = decode(&[0x92, 0x01, 0x91, 0x02]).unwrap();
        assert_eq!(
            value,
            Value::List(vec![Value::Integer(1), Value::List(vec![Value::Integer(2)])])
        );

        let value = decode(&[0xA1, 0x81, b'k', 0x05]).unwrap();
        let map = value.as_map().unwrap();
        assert_eq!(map.get("k"), Some(&Value::Integer(5)));
    }

    #[test]
    fn test_unexpected_eof() {
        let err = decode(&[0x83, b'a']).unwrap_err();
        assert_eq!(err.as_decode(), Some(&DecodeError::UnexpectedEof));

        let err = decode(&[]).unwrap_err();
        assert_eq!(err.as_decode(), Some(&DecodeError::UnexpectedEof));

        let err = decode(&[0x93, 0x01]).unwrap_err();
        assert_eq!(err.as_decode(), Some(&DecodeError::UnexpectedEof));
    }

    #[test]
    fn test_unknown_marker() {
        let err = decode(&[0xE7]).unwrap_err();
        assert_eq!(err.as_decode(), Some(&DecodeError::UnknownMarker(0xE7)));
    }

    #[test]
    fn test_unknown_structure_tag() {
        let err = decode(&[0xB1, 0x13, 0x01]).unwrap_err();
        assert_eq!(err.as_decode(), Some(&DecodeError::UnknownStructureTag(0x13)));
    }

    #[test]
    fn test_invalid_utf8() {
        let err = decode(&[0x82, 0xC3, 0x28]).unwrap_err();
        assert!(matches!(err.as_decode(), Some(DecodeError::InvalidUtf8(_))));
    }

    #[test]
    fn test_map_key_must_be_text() {
        let err = decode(&[0xA1, 0x01, 0x02]).unwrap_err();
        assert_eq!(
            err.as_decode(),
            Some(&DecodeError::InvalidMapKey { found: "Integer" })
        );
    }

    #[test]
    fn test_duplicate_map_key() {
        let err = decode(&[0xA2, 0x81, b'a', 0x01, 0x81, b'a', 0x02]).unwrap_err();
        assert_eq!(
            err.as_decode(),
            Some(&DecodeError::DuplicateMapKey("a".into()))
        );
    }

    #[test]
    fn test_nesting_limit() {
        let registry = Arc::new(HandlerRegistry::values());

        let mut reader =
            PackStreamReader::new(SliceSource::new(&[0x91, 0x91, 0x01]), registry.clone())
                .with_max_depth(2);
        assert!(reader.read().is_ok());

        let mut reader =
            PackStreamReader::new(SliceSource::new(&[0x91, 0x91, 0x91, 0x01]), registry)
                .with_max_depth(2);
        let err = reader.read().unwrap_err();
        assert_eq!(
            err.as_decode(),
            Some(&DecodeError::NestingTooDeep { max_depth: 2 })
        );
    }

    #[test]
    fn test_deep_nesting_default_limit() {
        let mut data = vec![0x91; DEFAULT_MAX_NESTING_DEPTH + 1];
        data.push(NULL);
        let err = decode(&data).unwrap_err();
        assert_eq!(
            err.as_decode(),
            Some(&DecodeError::NestingTooDeep {
                max_depth: DEFAULT_MAX_NESTING_DEPTH
            })
        );

        let mut data = vec![0x91; DEFAULT_MAX_NESTING_DEPTH];
        data.push(NULL);
        assert!(decode(&data).is_ok());
    }

    #[test]
    fn test_depth_resets_between_reads() {
        let data = [0x91, 0x91, 0x01, 0x91, 0x91, 0x02];
        let mut reader = PackStreamReader::new(
            SliceSource::new(&data),
            Arc::new(HandlerRegistry::empty()),
        )
        .with_max_depth(2);
        assert!(reader.read().is_ok());
        assert!(reader.read().is_ok());
        assert!(reader.source().is_empty());
    }

    #[test]
    fn test_poisoned_after_failure() {
        let data = [0xE7, NULL];
        let mut reader = PackStreamReader::new(
            SliceSource::new(&data),
            Arc::new(HandlerRegistry::empty()),
        );
        assert!(reader.read().is_err());
        assert!(reader.is_poisoned());
        assert_eq!(
            reader.read().unwrap_err().as_decode(),
            Some(&DecodeError::Poisoned)
        );
    }

    #[test]
    fn test_huge_declared_length_fails_cleanly() {
        let err = decode(&[LIST_32, 0xFF, 0xFF, 0xFF, 0xFF]).unwrap_err();
        assert_eq!(err.as_decode(), Some(&DecodeError::UnexpectedEof));

        let err = decode(&[STRING_32, 0xFF, 0xFF, 0xFF, 0xFF, b'a']).unwrap_err();
        assert_eq!(err.as_decode(), Some(&DecodeError::UnexpectedEof));
    }
}
