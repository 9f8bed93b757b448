//! PackStream marker table.
//!
//! Every value starts with a marker byte. Some markers carry the value or the
//! length inline (tiny forms); the rest announce a fixed-width payload or a
//! length prefix of 1, 2 or 4 bytes. The byte values must match the server's
//! protocol version exactly.

use super::error::DecodeError;

/// Null marker
pub const NULL: u8 = 0xC0;
/// Float marker (64-bit IEEE 754)
pub const FLOAT_64: u8 = 0xC1;
/// Boolean markers
pub const FALSE: u8 = 0xC2;
pub const TRUE: u8 = 0xC3;

/// Tiny integers (-16 to 127) are the marker byte itself
pub const TINY_INT_MIN: i64 = -16;
pub const TINY_INT_MAX: i64 = 127;
pub const INT_8: u8 = 0xC8;
pub const INT_16: u8 = 0xC9;
pub const INT_32: u8 = 0xCA;
pub const INT_64: u8 = 0xCB;

/// Bytes markers
pub const BYTES_8: u8 = 0xCC;
pub const BYTES_16: u8 = 0xCD;
pub const BYTES_32: u8 = 0xCE;

/// Tiny forms keep the length in the low nibble (0-15)
pub const TINY_MAX_LEN: usize = 15;

/// String markers
pub const TINY_STRING: u8 = 0x80;
pub const STRING_8: u8 = 0xD0;
pub const STRING_16: u8 = 0xD1;
pub const STRING_32: u8 = 0xD2;

/// List markers
pub const TINY_LIST: u8 = 0x90;
pub const LIST_8: u8 = 0xD4;
pub const LIST_16: u8 = 0xD5;
pub const LIST_32: u8 = 0xD6;

/// Map markers
pub const TINY_MAP: u8 = 0xA0;
pub const MAP_8: u8 = 0xD8;
pub const MAP_16: u8 = 0xD9;
pub const MAP_32: u8 = 0xDA;

/// Structure markers
pub const TINY_STRUCT: u8 = 0xB0;
pub const STRUCT_8: u8 = 0xDC;
pub const STRUCT_16: u8 = 0xDD;

/// Structure tags for graph types
pub const NODE_TAG: u8 = 0x4E; // 'N'
pub const RELATIONSHIP_TAG: u8 = 0x52; // 'R'
pub const UNBOUND_RELATIONSHIP_TAG: u8 = 0x72; // 'r'
pub const PATH_TAG: u8 = 0x50; // 'P'

/// Structure tags for temporal types
pub const DATE_TAG: u8 = 0x44; // 'D'
pub const TIME_TAG: u8 = 0x54; // 'T'
pub const LOCAL_TIME_TAG: u8 = 0x74; // 't'
pub const DATE_TIME_TAG: u8 = 0x46; // 'F'
pub const LOCAL_DATE_TIME_TAG: u8 = 0x64; // 'd'
pub const DURATION_TAG: u8 = 0x45; // 'E'

/// Structure tags for spatial types
pub const POINT_2D_TAG: u8 = 0x58; // 'X'
pub const POINT_3D_TAG: u8 = 0x59; // 'Y'

/// Width of a fixed-size payload or length prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Width {
    /// 1 byte
    W8,
    /// 2 bytes
    W16,
    /// 4 bytes
    W32,
    /// 8 bytes
    W64,
}

/// How a container or text announces its length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Length {
    /// Length packed into the marker's low nibble
    Tiny(usize),
    /// Length follows as a big-endian unsigned prefix
    Prefixed(Width),
}

/// A classified marker byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum Marker {
    Null,
    Boolean(bool),
    TinyInt(i8),
    Int(Width),
    Float64,
    Bytes(Width),
    String(Length),
    List(Length),
    Map(Length),
    Struct(Length),
}

impl Marker {
    /// Classify a marker byte. Reserved bytes are rejected.
    pub fn classify(byte: u8) -> Result<Self, DecodeError> {
        let marker = match byte {
            0x00..=0x7F | 0xF0..=0xFF => Marker::TinyInt(byte as i8),
            0x80..=0x8F => Marker::String(Length::Tiny(low_nibble(byte))),
            0x90..=0x9F => Marker::List(Length::Tiny(low_nibble(byte))),
            0xA0..=0xAF => Marker::Map(Length::Tiny(low_nibble(byte))),
            0xB0..=0xBF => Marker::Struct(Length::Tiny(low_nibble(byte))),
            NULL => Marker::Null,
            FLOAT_64 => Marker::Float64,
            FALSE => Marker::Boolean(false),
            TRUE => Marker::Boolean(true),
            INT_8 => Marker::Int(Width::W8),
            INT_16 => Marker::Int(Width::W16),
            INT_32 => Marker::Int(Width::W32),
            INT_64 => Marker::Int(Width::W64),
            BYTES_8 => Marker::Bytes(Width::W8),
            BYTES_16 => Marker::Bytes(Width::W16),
            BYTES_32 => Marker::Bytes(Width::W32),
            STRING_8 => Marker::String(Length::Prefixed(Width::W8)),
            STRING_16 => Marker::String(Length::Prefixed(Width::W16)),
            STRING_32 => Marker::String(Length::Prefixed(Width::W32)),
            LIST_8 => Marker::List(Length::Prefixed(Width::W8)),
            LIST_16 => Marker::List(Length::Prefixed(Width::W16)),
            LIST_32 => Marker::List(Length::Prefixed(Width::W32)),
            MAP_8 => Marker::Map(Length::Prefixed(Width::W8)),
            MAP_16 => Marker::Map(Length::Prefixed(Width::W16)),
            MAP_32 => Marker::Map(Length::Prefixed(Width::W32)),
            STRUCT_8 => Marker::Struct(Length::Prefixed(Width::W8)),
            STRUCT_16 => Marker::Struct(Length::Prefixed(Width::W16)),
            _ => return Err(DecodeError::UnknownMarker(byte)),
        };
        Ok(marker)
    }
}

#[inline]
fn low_nibble(byte: u8) -> usize {
    (byte & 0x0F) as usize
}

/// Check if an integer fits in the marker byte itself.
#[inline]
pub fn is_tiny_int(value: i64) -> bool {
    (TINY_INT_MIN..=TINY_INT_MAX).contains(&value)
}

/// Markers for a length-prefixed category, in 8/16/32-bit order.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SizedMarkers {
    pub kind: &'static str,
    pub tiny: Option<u8>,
    pub prefixed: [u8; 3],
}

pub(crate) const BYTES_MARKERS: SizedMarkers = SizedMarkers {
    kind: "bytes",
    tiny: None,
    prefixed: [BYTES_8, BYTES_16, BYTES_32],
};

pub(crate) const STRING_MARKERS: SizedMarkers = SizedMarkers {
    kind: "string",
    tiny: Some(TINY_STRING),
    prefixed: [STRING_8, STRING_16, STRING_32],
};

pub(crate) const LIST_MARKERS: SizedMarkers = SizedMarkers {
    kind: "list",
    tiny: Some(TINY_LIST),
    prefixed: [LIST_8, LIST_16, LIST_32],
};

pub(crate) const MAP_MARKERS: SizedMarkers = SizedMarkers {
    kind: "map",
    tiny: Some(TINY_MAP),
    prefixed: [MAP_8, MAP_16, MAP_32],
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_tiny_int() {
        assert_eq!(Marker::classify(0x00).unwrap(), Marker::TinyInt(0));
        assert_eq!(Marker::classify(0x7F).unwrap(), Marker::TinyInt(127));
        assert_eq!(Marker::classify(0xF0).unwrap(), Marker::TinyInt(-16));
        assert_eq!(Marker::classify(0xFF).unwrap(), Marker::TinyInt(-1));
    }

    #[test]
    fn test_classify_tiny_containers() {
        assert_eq!(Marker::classify(0x85).unwrap(), Marker::String(Length::Tiny(5)));
        assert_eq!(Marker::classify(0x90).unwrap(), Marker::List(Length::Tiny(0)));
        assert_eq!(Marker::classify(0xAF).unwrap(), Marker::Map(Length::Tiny(15)));
        assert_eq!(Marker::classify(0xB5).unwrap(), Marker::Struct(Length::Tiny(5)));
    }

    #[test]
    fn test_classify_prefixed() {
        assert_eq!(Marker::classify(INT_16).unwrap(), Marker::Int(Width::W16));
        assert_eq!(
            Marker::classify(LIST_32).unwrap(),
            Marker::List(Length::Prefixed(Width::W32))
        );
        assert_eq!(
            Marker::classify(STRUCT_16).unwrap(),
            Marker::Struct(Length::Prefixed(Width::W16))
        );
        assert_eq!(Marker::classify(BYTES_8).unwrap(), Marker::Bytes(Width::W8));
    }

    #[test]
    fn test_classify_reserved() {
        for byte in [0xC4, 0xC5, 0xC6, 0xC7, 0xCF, 0xD3, 0xD7, 0xDB, 0xDE, 0xDF, 0xE0, 0xEF] {
            assert_eq!(
                Marker::classify(byte).unwrap_err(),
                DecodeError::UnknownMarker(byte),
                "byte 0x{:02X} should be reserved",
                byte
            );
        }
    }

    #[test]
    fn test_is_tiny_int() {
        assert!(is_tiny_int(0));
        assert!(is_tiny_int(127));
        assert!(is_tiny_int(-16));
        assert!(!is_tiny_int(128));
        assert!(!is_tiny_int(-17));
    }

    #[test]
    fn test_every_byte_classifies_or_is_reserved() {
        let mut known = 0;
        for byte in 0..=255u8 {
            if Marker::classify(byte).is_ok() {
                known += 1;
            }
        }
        // 144 tiny ints, 64 tiny containers, 22 fixed markers
        assert_eq!(known, 144 + 64 + 22);
    }
}
