//! PackStream value model.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use indexmap::IndexMap;

use super::graph::{Node, Path, Relationship, UnboundRelationship};
use super::marker::*;
use super::spatial::Point;
use super::temporal::{Duration, OffsetTime};

/// Map of text keys to values.
///
/// Keys are unique. Iteration follows insertion order, equality ignores it.
pub type Map = IndexMap<String, Value>;

/// A value that can travel over the wire.
///
/// The first eight variants are the wire categories. The rest are domain
/// values materialized from tagged structures by the handler registry.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Null value
    Null,
    /// Boolean value
    Boolean(bool),
    /// 64-bit signed integer
    Integer(i64),
    /// 64-bit floating point
    Float(f64),
    /// Byte array
    Bytes(Vec<u8>),
    /// UTF-8 string
    String(String),
    /// List of values
    List(Vec<Value>),
    /// Map of string keys to values
    Map(Map),
    /// Graph node (server only)
    Node(Node),
    /// Graph relationship (server only)
    Relationship(Relationship),
    /// Relationship without endpoints, as carried inside a path (server only)
    UnboundRelationship(UnboundRelationship),
    /// Graph path (server only)
    Path(Path),
    /// Date
    Date(NaiveDate),
    /// Time of day with a UTC offset
    Time(OffsetTime),
    /// Time of day without a timezone
    LocalTime(NaiveTime),
    /// Date and time with a UTC offset
    DateTime(DateTime<FixedOffset>),
    /// Date and time without a timezone
    LocalDateTime(NaiveDateTime),
    /// Temporal amount
    Duration(Duration),
    /// 2D or 3D point
    Point(Point),
    /// Tagged structure without a dedicated domain type
    Structure(Structure),
}

/// A raw tagged structure.
#[derive(Debug, Clone, PartialEq)]
pub struct Structure {
    /// Structure tag (identifies the type)
    pub tag: u8,
    /// Structure fields
    pub fields: Vec<Value>,
}

impl Structure {
    /// Create a new structure with given tag and fields.
    pub fn new(tag: u8, fields: Vec<Value>) -> Self {
        Self { tag, fields }
    }

    /// Get the number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if the structure has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Value {
    /// Check if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Try to get as boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Try to get as integer.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Try to get as float. Integers widen.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Try to get as string reference.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get as bytes reference.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// Try to get as list reference.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(l) => Some(l),
            _ => None,
        }
    }

    /// Try to get as map reference.
    pub fn as_map(&self) -> Option<&Map> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Try to get as node reference.
    pub fn as_node(&self) -> Option<&Node> {
        match self {
            Value::Node(n) => Some(n),
            _ => None,
        }
    }

    /// Try to get as relationship reference.
    pub fn as_relationship(&self) -> Option<&Relationship> {
        match self {
            Value::Relationship(r) => Some(r),
            _ => None,
        }
    }

    /// Try to get as path reference.
    pub fn as_path(&self) -> Option<&Path> {
        match self {
            Value::Path(p) => Some(p),
            _ => None,
        }
    }

    /// Try to get as raw structure reference.
    pub fn as_structure(&self) -> Option<&Structure> {
        match self {
            Value::Structure(s) => Some(s),
            _ => None,
        }
    }

    /// Structure tag this value is written under, `None` for wire categories.
    pub fn struct_tag(&self) -> Option<u8> {
        match self {
            Value::Null
            | Value::Boolean(_)
            | Value::Integer(_)
            | Value::Float(_)
            | Value::Bytes(_)
            | Value::String(_)
            | Value::List(_)
            | Value::Map(_) => None,
            Value::Node(_) => Some(NODE_TAG),
            Value::Relationship(_) => Some(RELATIONSHIP_TAG),
            Value::UnboundRelationship(_) => Some(UNBOUND_RELATIONSHIP_TAG),
            Value::Path(_) => Some(PATH_TAG),
            Value::Date(_) => Some(DATE_TAG),
            Value::Time(_) => Some(TIME_TAG),
            Value::LocalTime(_) => Some(LOCAL_TIME_TAG),
            Value::DateTime(_) => Some(DATE_TIME_TAG),
            Value::LocalDateTime(_) => Some(LOCAL_DATE_TIME_TAG),
            Value::Duration(_) => Some(DURATION_TAG),
            Value::Point(p) if p.z.is_some() => Some(POINT_3D_TAG),
            Value::Point(_) => Some(POINT_2D_TAG),
            Value::Structure(s) => Some(s.tag),
        }
    }

    /// Get the type name for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "Null",
            Value::Boolean(_) => "Boolean",
            Value::Integer(_) => "Integer",
            Value::Float(_) => "Float",
            Value::Bytes(_) => "Bytes",
            Value::String(_) => "String",
            Value::List(_) => "List",
            Value::Map(_) => "Map",
            Value::Node(_) => "Node",
            Value::Relationship(_) => "Relationship",
            Value::UnboundRelationship(_) => "UnboundRelationship",
            Value::Path(_) => "Path",
            Value::Date(_) => "Date",
            Value::Time(_) => "Time",
            Value::LocalTime(_) => "LocalTime",
            Value::DateTime(_) => "DateTime",
            Value::LocalDateTime(_) => "LocalDateTime",
            Value::Duration(_) => "Duration",
            Value::Point(_) => "Point",
            Value::Structure(_) => "Structure",
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(v as i64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::List(v)
    }
}

impl From<Map> for Value {
    fn from(v: Map) -> Self {
        Value::Map(v)
    }
}

impl From<Structure> for Value {
    fn from(v: Structure) -> Self {
        Value::Structure(v)
    }
}

impl From<Duration> for Value {
    fn from(v: Duration) -> Self {
        Value::Duration(v)
    }
}

impl From<Point> for Value {
    fn from(v: Point) -> Self {
        Value::Point(v)
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Value::Date(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors() {
        assert!(Value::Null.is_null());
        assert_eq!(Value::Boolean(true).as_bool(), Some(true));
        assert_eq!(Value::Integer(42).as_int(), Some(42));
        assert_eq!(Value::Integer(42).as_float(), Some(42.0));
        assert_eq!(Value::Float(3.5).as_int(), None);
        assert_eq!(Value::from("hello").as_str(), Some("hello"));
        assert_eq!(Value::Bytes(vec![1, 2]).as_bytes(), Some(&[1u8, 2][..]));
    }

    #[test]
    fn test_map_equality_ignores_order() {
        let mut a = Map::new();
        a.insert("x".into(), Value::Integer(1));
        a.insert("y".into(), Value::Integer(2));

        let mut b = Map::new();
        b.insert("y".into(), Value::Integer(2));
        b.insert("x".into(), Value::Integer(1));

        assert_eq!(Value::Map(a.clone()), Value::Map(b));
        // iteration keeps insertion order
        let keys: Vec<_> = a.keys().cloned().collect();
        assert_eq!(keys, vec!["x", "y"]);
    }

    #[test]
    fn test_struct_tag() {
        assert_eq!(Value::Integer(1).struct_tag(), None);
        assert_eq!(Value::Map(Map::new()).struct_tag(), None);
        assert_eq!(
            Value::Point(Point::new_2d(4326, 1.0, 2.0)).struct_tag(),
            Some(POINT_2D_TAG)
        );
        assert_eq!(
            Value::Point(Point::new_3d(4979, 1.0, 2.0, 3.0)).struct_tag(),
            Some(POINT_3D_TAG)
        );
        assert_eq!(
            Value::Structure(Structure::new(0x70, vec![])).struct_tag(),
            Some(0x70)
        );
    }

    #[test]
    fn test_structure() {
        let s = Structure::new(0x4E, vec![Value::Integer(1)]);
        assert_eq!(s.len(), 1);
        assert!(!s.is_empty());
        assert!(Value::from(s).as_structure().is_some());
    }

    #[test]
    fn test_type_name() {
        assert_eq!(Value::Null.type_name(), "Null");
        assert_eq!(Value::List(vec![]).type_name(), "List");
        assert_eq!(Value::Duration(Duration::new(0, 0, 0, 0)).type_name(), "Duration");
    }
}
