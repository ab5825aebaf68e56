//! Decoded values.
//!
//! [`Value`] is a dynamically-typed union mirroring the schema shapes, plus
//! the decoded representations of the logical types a
//! [`ConversionRegistry`](crate::logical::ConversionRegistry) knows how to
//! produce. A `String` and a `Bytes` of identical content are distinct
//! values even though their wire bytes are identical.

use crate::decimal::Decimal;

/// A decoded value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Null value.
    Null,
    /// Boolean value.
    Boolean(bool),
    /// 32-bit signed integer.
    Int(i32),
    /// 64-bit signed integer.
    Long(i64),
    /// 32-bit floating point.
    Float(f32),
    /// 64-bit floating point.
    Double(f64),
    /// Byte sequence.
    Bytes(Vec<u8>),
    /// UTF-8 string.
    String(String),
    /// Record as ordered (field name, value) pairs.
    Record(Vec<(String, Value)>),
    /// Enum as (position in the schema's symbol list, symbol).
    Enum(u32, String),
    /// Ordered list of values.
    Array(Vec<Value>),
    /// String-keyed map as ordered (key, value) pairs.
    Map(Vec<(String, Value)>),
    /// Union as (branch index, value).
    Union(u32, Box<Value>),
    /// Fixed-length byte sequence.
    Fixed(Vec<u8>),

    // Logical type representations
    /// Arbitrary-precision decimal.
    Decimal(Decimal),
    /// Days since the Unix epoch.
    Date(i32),
    /// Milliseconds since midnight.
    TimeMillis(i32),
    /// Microseconds since midnight.
    TimeMicros(i64),
    /// Milliseconds since the Unix epoch.
    TimestampMillis(i64),
    /// Microseconds since the Unix epoch.
    TimestampMicros(i64),
    /// Local (zoneless) milliseconds since the Unix epoch.
    LocalTimestampMillis(i64),
    /// Local (zoneless) microseconds since the Unix epoch.
    LocalTimestampMicros(i64),
}

impl Value {
    /// A short human-readable type name for error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Int(_) => "int",
            Value::Long(_) => "long",
            Value::Float(_) => "float",
            Value::Double(_) => "double",
            Value::Bytes(_) => "bytes",
            Value::String(_) => "string",
            Value::Record(_) => "record",
            Value::Enum(..) => "enum",
            Value::Array(_) => "array",
            Value::Map(_) => "map",
            Value::Union(..) => "union",
            Value::Fixed(_) => "fixed",
            Value::Decimal(_) => "decimal",
            Value::Date(_) => "date",
            Value::TimeMillis(_) => "time-millis",
            Value::TimeMicros(_) => "time-micros",
            Value::TimestampMillis(_) => "timestamp-millis",
            Value::TimestampMicros(_) => "timestamp-micros",
            Value::LocalTimestampMillis(_) => "local-timestamp-millis",
            Value::LocalTimestampMicros(_) => "local-timestamp-micros",
        }
    }

    /// Look up a record field by name.
    pub fn field(&self, name: &str) -> Option<&Value> {
        match self {
            Value::Record(fields) => fields.iter().find(|(n, _)| n == name).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Unwrap union tagging, returning the inner value.
    pub fn into_inner(self) -> Value {
        match self {
            Value::Union(_, inner) => inner.into_inner(),
            other => other,
        }
    }
}

impl From<Decimal> for Value {
    fn from(d: Decimal) -> Self {
        Value::Decimal(d)
    }
}
