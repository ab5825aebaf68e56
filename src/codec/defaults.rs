//! Materializing JSON field defaults as values.
//!
//! Reader fields absent from the writer schema are populated from their JSON
//! default. Bytes and fixed defaults are JSON strings whose code points
//! U+0000..U+00FF map one-to-one onto bytes; union defaults describe the
//! union's first branch.

use serde_json::Value as JsonValue;

use crate::error::DecodeError;
use crate::logical::ConversionRegistry;
use crate::schema::{NamedTypes, Schema};
use crate::value::Value;

/// Materialize a JSON default against a schema.
///
/// `field` names the reader field being defaulted, for error context.
pub fn value_from_json(
    json: &JsonValue,
    schema: &Schema,
    field: &str,
    names: &NamedTypes,
    registry: &ConversionRegistry,
) -> Result<Value, DecodeError> {
    let bad = |reason: String| DecodeError::BadDefault {
        field: field.to_string(),
        reason,
    };

    match (json, schema) {
        (JsonValue::Null, Schema::Null) => Ok(Value::Null),
        (JsonValue::Bool(b), Schema::Boolean) => Ok(Value::Boolean(*b)),

        (JsonValue::Number(n), Schema::Int) => {
            let v = n
                .as_i64()
                .filter(|v| i32::try_from(*v).is_ok())
                .ok_or_else(|| bad(format!("{n} is not an int")))?;
            Ok(Value::Int(v as i32))
        }
        (JsonValue::Number(n), Schema::Long) => {
            let v = n.as_i64().ok_or_else(|| bad(format!("{n} is not a long")))?;
            Ok(Value::Long(v))
        }
        (JsonValue::Number(n), Schema::Float) => {
            let v = n
                .as_f64()
                .ok_or_else(|| bad(format!("{n} is not a float")))?;
            Ok(Value::Float(v as f32))
        }
        (JsonValue::Number(n), Schema::Double) => {
            let v = n
                .as_f64()
                .ok_or_else(|| bad(format!("{n} is not a double")))?;
            Ok(Value::Double(v))
        }

        (JsonValue::String(s), Schema::String) => Ok(Value::String(s.clone())),
        (JsonValue::String(s), Schema::Bytes) => Ok(Value::Bytes(json_chars_to_bytes(s, &bad)?)),
        (JsonValue::String(s), Schema::Fixed(f)) => {
            let bytes = json_chars_to_bytes(s, &bad)?;
            if bytes.len() != f.size {
                return Err(bad(format!(
                    "fixed default has {} bytes, schema requires {}",
                    bytes.len(),
                    f.size
                )));
            }
            Ok(Value::Fixed(bytes))
        }
        (JsonValue::String(s), Schema::Enum(e)) => {
            let index = e
                .symbol_index(s)
                .ok_or_else(|| bad(format!("'{s}' is not a symbol of enum '{}'", e.fullname())))?;
            Ok(Value::Enum(index as u32, s.clone()))
        }

        (JsonValue::Array(items), Schema::Array(item_schema)) => {
            let values: Result<Vec<Value>, DecodeError> = items
                .iter()
                .map(|item| value_from_json(item, item_schema, field, names, registry))
                .collect();
            Ok(Value::Array(values?))
        }

        (JsonValue::Object(entries), Schema::Map(value_schema)) => {
            let values: Result<Vec<(String, Value)>, DecodeError> = entries
                .iter()
                .map(|(k, v)| {
                    Ok((
                        k.clone(),
                        value_from_json(v, value_schema, field, names, registry)?,
                    ))
                })
                .collect();
            Ok(Value::Map(values?))
        }

        (JsonValue::Object(entries), Schema::Record(record)) => {
            let mut fields = Vec::with_capacity(record.fields.len());
            for record_field in &record.fields {
                let value = match entries.get(&record_field.name) {
                    Some(v) => {
                        value_from_json(v, &record_field.schema, field, names, registry)?
                    }
                    None => match &record_field.default {
                        Some(default) => value_from_json(
                            default,
                            &record_field.schema,
                            field,
                            names,
                            registry,
                        )?,
                        None => {
                            return Err(bad(format!(
                                "record default lacks field '{}'",
                                record_field.name
                            )))
                        }
                    },
                };
                fields.push((record_field.name.clone(), value));
            }
            Ok(Value::Record(fields))
        }

        // A union default always describes the union's first branch.
        (json, Schema::Union(union)) => {
            let first = union
                .branches()
                .first()
                .ok_or_else(|| bad("empty union".to_string()))?;
            let value = value_from_json(json, first, field, names, registry)?;
            Ok(Value::Union(0, Box::new(value)))
        }

        (json, Schema::Named(name)) => {
            let resolved = names
                .get(name)
                .ok_or_else(|| DecodeError::UnresolvedReference(name.clone()))?;
            value_from_json(json, resolved, field, names, registry)
        }

        (json, Schema::Logical(logical)) => {
            let base = value_from_json(json, &logical.base, field, names, registry)?;
            registry.decode(base, &logical.kind)
        }

        (json, schema) => Err(bad(format!(
            "JSON {json} does not fit {}",
            schema.type_name()
        ))),
    }
}

/// Bytes/fixed defaults are JSON strings whose chars are code points
/// U+0000..U+00FF, one byte each.
fn json_chars_to_bytes(
    s: &str,
    bad: &dyn Fn(String) -> DecodeError,
) -> Result<Vec<u8>, DecodeError> {
    s.chars()
        .map(|c| {
            u8::try_from(c as u32)
                .map_err(|_| bad(format!("code point {c:?} is out of byte range")))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{EnumSchema, FieldSchema, RecordSchema, UnionSchema};
    use serde_json::json;

    fn materialize(json: &JsonValue, schema: &Schema) -> Result<Value, DecodeError> {
        let names = NamedTypes::from_schema(schema);
        let registry = ConversionRegistry::with_defaults();
        value_from_json(json, schema, "f", &names, &registry)
    }

    #[test]
    fn scalars() {
        assert_eq!(materialize(&json!(null), &Schema::Null).unwrap(), Value::Null);
        assert_eq!(
            materialize(&json!(true), &Schema::Boolean).unwrap(),
            Value::Boolean(true)
        );
        assert_eq!(materialize(&json!(42), &Schema::Int).unwrap(), Value::Int(42));
        assert_eq!(
            materialize(&json!(42), &Schema::Long).unwrap(),
            Value::Long(42)
        );
        assert_eq!(
            materialize(&json!(2.5), &Schema::Float).unwrap(),
            Value::Float(2.5)
        );
        assert_eq!(
            materialize(&json!("unknown"), &Schema::String).unwrap(),
            Value::String("unknown".to_string())
        );
    }

    #[test]
    fn int_range_is_checked() {
        let err = materialize(&json!(4_000_000_000i64), &Schema::Int).unwrap_err();
        assert!(matches!(err, DecodeError::BadDefault { .. }));
    }

    #[test]
    fn bytes_default_maps_chars_to_bytes() {
        assert_eq!(
            materialize(&json!("\u{00}\u{ff}A"), &Schema::Bytes).unwrap(),
            Value::Bytes(vec![0x00, 0xff, 0x41])
        );
    }

    #[test]
    fn enum_default_must_be_a_symbol() {
        let schema = Schema::Enum(EnumSchema::new(
            "Color",
            vec!["RED".to_string(), "GREEN".to_string()],
        ));
        assert_eq!(
            materialize(&json!("GREEN"), &schema).unwrap(),
            Value::Enum(1, "GREEN".to_string())
        );
        assert!(materialize(&json!("BLUE"), &schema).is_err());
    }

    #[test]
    fn union_default_takes_the_first_branch() {
        let schema =
            Schema::Union(UnionSchema::new(vec![Schema::Null, Schema::Long]).unwrap());
        assert_eq!(
            materialize(&json!(null), &schema).unwrap(),
            Value::Union(0, Box::new(Value::Null))
        );
        // A long default cannot describe the null first branch.
        assert!(materialize(&json!(42), &schema).is_err());
    }

    #[test]
    fn record_default_fills_nested_defaults() {
        let schema = Schema::Record(RecordSchema::new(
            "Point",
            vec![
                FieldSchema::new("x", Schema::Int),
                FieldSchema::new("y", Schema::Int).with_default(json!(0)),
            ],
        ));
        assert_eq!(
            materialize(&json!({"x": 3}), &schema).unwrap(),
            Value::Record(vec![
                ("x".to_string(), Value::Int(3)),
                ("y".to_string(), Value::Int(0)),
            ])
        );
    }

    #[test]
    fn array_default() {
        let schema = Schema::Array(Box::new(Schema::Int));
        assert_eq!(
            materialize(&json!([1, 2]), &schema).unwrap(),
            Value::Array(vec![Value::Int(1), Value::Int(2)])
        );
    }

    #[test]
    fn shape_mismatch_is_a_bad_default() {
        let err = materialize(&json!("nope"), &Schema::Int).unwrap_err();
        assert!(matches!(err, DecodeError::BadDefault { .. }));
    }
}
