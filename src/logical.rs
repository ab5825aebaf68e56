//! Pluggable logical-type conversions.
//!
//! A logical type never changes the wire encoding; it changes how a value is
//! interpreted before encoding and after decoding. Conversions are looked up
//! in an explicit [`ConversionRegistry`] keyed by logical type name. A
//! logical type with no registered conversion is passed through as its base
//! primitive value - silently, by contract.
//!
//! The decimal conversion is strict on encode: the value's scale must equal
//! the schema's scale exactly (no implicit rounding) and the unscaled digit
//! count must fit the schema's declared precision.

use std::collections::HashMap;
use std::sync::Arc;

use crate::decimal::Decimal;
use crate::error::{DecodeError, EncodeError};
use crate::schema::{LogicalTypeName, Schema};
use crate::value::Value;

/// A two-way mapping between a base primitive value and its logical-type
/// representation.
///
/// Implementations must pass unrecognized values through unchanged so that
/// primitive data written without the conversion still round-trips.
pub trait LogicalConversion: Send + Sync {
    /// Interpret a decoded base value as the logical type's representation.
    fn decode(&self, value: Value, kind: &LogicalTypeName) -> Result<Value, DecodeError>;

    /// Lower a logical-type value to the base value the encoder writes.
    fn encode(
        &self,
        value: Value,
        kind: &LogicalTypeName,
        base: &Schema,
    ) -> Result<Value, EncodeError>;
}

/// Registry of logical-type conversions, keyed by logical type name.
#[derive(Clone, Default)]
pub struct ConversionRegistry {
    conversions: HashMap<&'static str, Arc<dyn LogicalConversion>>,
}

impl std::fmt::Debug for ConversionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<_> = self.conversions.keys().collect();
        names.sort();
        f.debug_struct("ConversionRegistry")
            .field("conversions", &names)
            .finish()
    }
}

impl ConversionRegistry {
    /// A registry with no conversions: every logical type passes through as
    /// its base primitive.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A registry with the built-in conversions: decimal and the date/time
    /// family.
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        registry.register("decimal", Arc::new(DecimalConversion));
        let temporal: Arc<dyn LogicalConversion> = Arc::new(TemporalConversion);
        for name in [
            "date",
            "time-millis",
            "time-micros",
            "timestamp-millis",
            "timestamp-micros",
            "local-timestamp-millis",
            "local-timestamp-micros",
        ] {
            registry.register(name, Arc::clone(&temporal));
        }
        registry
    }

    /// Register a conversion under a logical type name.
    pub fn register(&mut self, name: &'static str, conversion: Arc<dyn LogicalConversion>) {
        self.conversions.insert(name, conversion);
    }

    /// Look up a conversion.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn LogicalConversion>> {
        self.conversions.get(name)
    }

    /// Apply the registered conversion after decoding, or pass the base
    /// value through when none is registered.
    pub fn decode(&self, value: Value, kind: &LogicalTypeName) -> Result<Value, DecodeError> {
        match self.conversions.get(kind.name()) {
            Some(conversion) => conversion.decode(value, kind),
            None => Ok(value),
        }
    }

    /// Apply the registered conversion before encoding, or pass the value
    /// through when none is registered.
    pub fn encode(
        &self,
        value: Value,
        kind: &LogicalTypeName,
        base: &Schema,
    ) -> Result<Value, EncodeError> {
        match self.conversions.get(kind.name()) {
            Some(conversion) => conversion.encode(value, kind, base),
            None => Ok(value),
        }
    }
}

/// The `decimal(precision, scale)` conversion over bytes and fixed.
///
/// The unscaled integer travels as big-endian two's-complement bytes, raw in
/// a fixed type (sign-extended to its full size) and length-prefixed on
/// bytes.
pub struct DecimalConversion;

impl LogicalConversion for DecimalConversion {
    fn decode(&self, value: Value, kind: &LogicalTypeName) -> Result<Value, DecodeError> {
        let LogicalTypeName::Decimal { scale, .. } = kind else {
            return Ok(value);
        };
        match value {
            Value::Bytes(bytes) | Value::Fixed(bytes) => Ok(Value::Decimal(
                Decimal::from_signed_bytes_be(&bytes, *scale),
            )),
            other => Ok(other),
        }
    }

    fn encode(
        &self,
        value: Value,
        kind: &LogicalTypeName,
        base: &Schema,
    ) -> Result<Value, EncodeError> {
        let LogicalTypeName::Decimal { precision, scale } = kind else {
            return Ok(value);
        };
        let decimal = match value {
            Value::Decimal(d) => d,
            // Raw bytes bypass the conversion entirely.
            other => return Ok(other),
        };

        if decimal.scale() != *scale {
            return Err(EncodeError::ScaleMismatch {
                value_scale: decimal.scale(),
                schema_scale: *scale,
            });
        }
        if decimal.precision() > *precision as u64 {
            return Err(EncodeError::PrecisionOverflow {
                value_precision: decimal.precision(),
                schema_precision: *precision,
            });
        }

        let bytes = decimal.to_signed_bytes_be();
        match base.without_logical() {
            Schema::Bytes => Ok(Value::Bytes(bytes)),
            Schema::Fixed(f) => {
                if bytes.len() > f.size {
                    return Err(EncodeError::DecimalTooWide {
                        name: f.fullname(),
                        size: f.size,
                        needed: bytes.len(),
                    });
                }
                let fill = if decimal.is_negative() { 0xff } else { 0x00 };
                let mut padded = vec![fill; f.size - bytes.len()];
                padded.extend_from_slice(&bytes);
                Ok(Value::Fixed(padded))
            }
            other => Err(EncodeError::TypeMismatch {
                expected: "bytes or fixed".to_string(),
                found: other.type_name(),
            }),
        }
    }
}

/// The date/time conversions: plain integer tagging in both directions.
pub struct TemporalConversion;

impl LogicalConversion for TemporalConversion {
    fn decode(&self, value: Value, kind: &LogicalTypeName) -> Result<Value, DecodeError> {
        Ok(match (value, kind) {
            (Value::Int(v), LogicalTypeName::Date) => Value::Date(v),
            (Value::Int(v), LogicalTypeName::TimeMillis) => Value::TimeMillis(v),
            (Value::Long(v), LogicalTypeName::TimeMicros) => Value::TimeMicros(v),
            (Value::Long(v), LogicalTypeName::TimestampMillis) => Value::TimestampMillis(v),
            (Value::Long(v), LogicalTypeName::TimestampMicros) => Value::TimestampMicros(v),
            (Value::Long(v), LogicalTypeName::LocalTimestampMillis) => {
                Value::LocalTimestampMillis(v)
            }
            (Value::Long(v), LogicalTypeName::LocalTimestampMicros) => {
                Value::LocalTimestampMicros(v)
            }
            (other, _) => other,
        })
    }

    fn encode(
        &self,
        value: Value,
        _kind: &LogicalTypeName,
        _base: &Schema,
    ) -> Result<Value, EncodeError> {
        Ok(match value {
            Value::Date(v) | Value::TimeMillis(v) => Value::Int(v),
            Value::TimeMicros(v)
            | Value::TimestampMillis(v)
            | Value::TimestampMicros(v)
            | Value::LocalTimestampMillis(v)
            | Value::LocalTimestampMicros(v) => Value::Long(v),
            other => other,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FixedSchema;

    fn decimal_kind(precision: u32, scale: u32) -> LogicalTypeName {
        LogicalTypeName::Decimal { precision, scale }
    }

    #[test]
    fn unregistered_conversion_passes_primitives_through() {
        let registry = ConversionRegistry::empty();
        let value = registry
            .decode(Value::Bytes(vec![0x30, 0x39]), &decimal_kind(5, 2))
            .unwrap();
        assert_eq!(value, Value::Bytes(vec![0x30, 0x39]));
    }

    #[test]
    fn decimal_decodes_from_bytes_and_fixed() {
        let registry = ConversionRegistry::with_defaults();
        // 12345 = 0x3039, scale 2 -> 123.45
        let from_bytes = registry
            .decode(Value::Bytes(vec![0x30, 0x39]), &decimal_kind(5, 2))
            .unwrap();
        assert_eq!(from_bytes, Value::Decimal(Decimal::new(12345, 2)));

        let from_fixed = registry
            .decode(Value::Fixed(vec![0x00, 0x30, 0x39]), &decimal_kind(5, 2))
            .unwrap();
        assert_eq!(from_fixed, Value::Decimal(Decimal::new(12345, 2)));
    }

    #[test]
    fn decimal_scale_must_match_exactly() {
        let registry = ConversionRegistry::with_defaults();
        let err = registry
            .encode(
                Value::Decimal(Decimal::new(123_450_000_000_000_00i64, 15)),
                &decimal_kind(5, 4),
                &Schema::Bytes,
            )
            .unwrap_err();
        assert_eq!(
            err,
            EncodeError::ScaleMismatch {
                value_scale: 15,
                schema_scale: 4
            }
        );
    }

    #[test]
    fn decimal_precision_is_enforced() {
        let registry = ConversionRegistry::with_defaults();
        // 9123.45 has precision 6, schema allows 5.
        let err = registry
            .encode(
                Value::Decimal(Decimal::new(912_345, 2)),
                &decimal_kind(5, 2),
                &Schema::Bytes,
            )
            .unwrap_err();
        assert_eq!(
            err,
            EncodeError::PrecisionOverflow {
                value_precision: 6,
                schema_precision: 5
            }
        );
    }

    #[test]
    fn decimal_encodes_minimal_bytes() {
        let registry = ConversionRegistry::with_defaults();
        let value = registry
            .encode(
                Value::Decimal(Decimal::new(12345, 2)),
                &decimal_kind(5, 2),
                &Schema::Bytes,
            )
            .unwrap();
        assert_eq!(value, Value::Bytes(vec![0x30, 0x39]));
    }

    #[test]
    fn decimal_sign_extends_into_fixed() {
        let registry = ConversionRegistry::with_defaults();
        let base = Schema::Fixed(FixedSchema::new("fixed", 4));

        let positive = registry
            .encode(
                Value::Decimal(Decimal::new(12345, 2)),
                &decimal_kind(5, 2),
                &base,
            )
            .unwrap();
        assert_eq!(positive, Value::Fixed(vec![0x00, 0x00, 0x30, 0x39]));

        let negative = registry
            .encode(
                Value::Decimal(Decimal::new(-12345, 2)),
                &decimal_kind(5, 2),
                &base,
            )
            .unwrap();
        assert_eq!(negative, Value::Fixed(vec![0xff, 0xff, 0xcf, 0xc7]));
    }

    #[test]
    fn decimal_rejects_a_too_small_fixed() {
        let registry = ConversionRegistry::with_defaults();
        let base = Schema::Fixed(FixedSchema::new("tiny", 1));
        let err = registry
            .encode(
                Value::Decimal(Decimal::new(12345, 2)),
                &decimal_kind(5, 2),
                &base,
            )
            .unwrap_err();
        assert_eq!(
            err,
            EncodeError::DecimalTooWide {
                name: "tiny".to_string(),
                size: 1,
                needed: 2
            }
        );
    }

    #[test]
    fn temporal_values_tag_and_untag() {
        let registry = ConversionRegistry::with_defaults();
        let decoded = registry
            .decode(Value::Long(1_234_567), &LogicalTypeName::TimestampMillis)
            .unwrap();
        assert_eq!(decoded, Value::TimestampMillis(1_234_567));

        let encoded = registry
            .encode(
                Value::TimestampMillis(1_234_567),
                &LogicalTypeName::TimestampMillis,
                &Schema::Long,
            )
            .unwrap();
        assert_eq!(encoded, Value::Long(1_234_567));

        let date = registry
            .decode(Value::Int(19_000), &LogicalTypeName::Date)
            .unwrap();
        assert_eq!(date, Value::Date(19_000));
    }

    #[test]
    fn decimal_round_trips_through_the_registry() {
        let registry = ConversionRegistry::with_defaults();
        let kind = decimal_kind(5, 2);
        let original = Value::Decimal(Decimal::new(-12345, 2));
        let wire = registry
            .encode(original.clone(), &kind, &Schema::Bytes)
            .unwrap();
        let back = registry.decode(wire, &kind).unwrap();
        assert_eq!(back, original);
    }
}
