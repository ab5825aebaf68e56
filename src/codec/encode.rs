//! Binary encoding against a writer schema.
//!
//! Encoding is a direct structural traversal of (schema, value); no
//! resolution is involved. A value whose shape does not match the schema
//! kind is a hard [`EncodeError`], never coerced. Logical values are lowered
//! to their base primitives through the conversion registry before the base
//! encoding runs; that is where decimal strictness is enforced.

use crate::codec::varint;
use crate::error::EncodeError;
use crate::logical::ConversionRegistry;
use crate::schema::{NamedTypes, Schema};
use crate::value::Value;

/// Encode one value shaped by `schema`, appending to `out`.
pub fn encode_value(
    out: &mut Vec<u8>,
    schema: &Schema,
    value: &Value,
    names: &NamedTypes,
    registry: &ConversionRegistry,
) -> Result<(), EncodeError> {
    match schema {
        Schema::Null => match value {
            Value::Null => Ok(()),
            other => Err(mismatch(schema, other)),
        },
        Schema::Boolean => match value {
            Value::Boolean(b) => {
                out.push(*b as u8);
                Ok(())
            }
            other => Err(mismatch(schema, other)),
        },
        Schema::Int => match value {
            Value::Int(v) => {
                varint::write_int(out, *v);
                Ok(())
            }
            other => Err(mismatch(schema, other)),
        },
        Schema::Long => match value {
            Value::Long(v) => {
                varint::write_long(out, *v);
                Ok(())
            }
            other => Err(mismatch(schema, other)),
        },
        Schema::Float => match value {
            Value::Float(v) => {
                out.extend_from_slice(&v.to_le_bytes());
                Ok(())
            }
            other => Err(mismatch(schema, other)),
        },
        Schema::Double => match value {
            Value::Double(v) => {
                out.extend_from_slice(&v.to_le_bytes());
                Ok(())
            }
            other => Err(mismatch(schema, other)),
        },
        Schema::Bytes => match value {
            Value::Bytes(b) => {
                varint::write_long(out, b.len() as i64);
                out.extend_from_slice(b);
                Ok(())
            }
            other => Err(mismatch(schema, other)),
        },
        Schema::String => match value {
            Value::String(s) => {
                varint::write_long(out, s.len() as i64);
                out.extend_from_slice(s.as_bytes());
                Ok(())
            }
            other => Err(mismatch(schema, other)),
        },

        Schema::Record(record) => match value {
            Value::Record(fields) => {
                for field in &record.fields {
                    let field_value = fields
                        .iter()
                        .find(|(name, _)| name == &field.name)
                        .map(|(_, v)| v)
                        .ok_or_else(|| EncodeError::MissingField {
                            field: field.name.clone(),
                        })?;
                    encode_value(out, &field.schema, field_value, names, registry)?;
                }
                Ok(())
            }
            other => Err(mismatch(schema, other)),
        },

        Schema::Enum(e) => match value {
            Value::Enum(_, symbol) => {
                let index =
                    e.symbol_index(symbol)
                        .ok_or_else(|| EncodeError::UnknownEnumSymbol {
                            name: e.fullname(),
                            symbol: symbol.clone(),
                        })?;
                varint::write_int(out, index as i32);
                Ok(())
            }
            other => Err(mismatch(schema, other)),
        },

        Schema::Array(items) => match value {
            Value::Array(values) => {
                if !values.is_empty() {
                    varint::write_long(out, values.len() as i64);
                    for item in values {
                        encode_value(out, items, item, names, registry)?;
                    }
                }
                varint::write_long(out, 0);
                Ok(())
            }
            other => Err(mismatch(schema, other)),
        },

        Schema::Map(value_schema) => match value {
            Value::Map(entries) => {
                if !entries.is_empty() {
                    varint::write_long(out, entries.len() as i64);
                    for (key, item) in entries {
                        varint::write_long(out, key.len() as i64);
                        out.extend_from_slice(key.as_bytes());
                        encode_value(out, value_schema, item, names, registry)?;
                    }
                }
                varint::write_long(out, 0);
                Ok(())
            }
            other => Err(mismatch(schema, other)),
        },

        Schema::Union(union) => match value {
            Value::Union(index, inner) => {
                let branch = union.branches().get(*index as usize).ok_or(
                    EncodeError::UnionIndexOutOfRange {
                        index: *index,
                        branches: union.len(),
                    },
                )?;
                varint::write_int(out, *index as i32);
                encode_value(out, branch, inner, names, registry)
            }
            other => Err(mismatch(schema, other)),
        },

        Schema::Fixed(f) => match value {
            Value::Fixed(bytes) => {
                if bytes.len() != f.size {
                    return Err(EncodeError::FixedSizeMismatch {
                        name: f.fullname(),
                        expected: f.size,
                        found: bytes.len(),
                    });
                }
                out.extend_from_slice(bytes);
                Ok(())
            }
            other => Err(mismatch(schema, other)),
        },

        Schema::Named(name) => {
            let resolved = names
                .get(name)
                .ok_or_else(|| EncodeError::UnresolvedReference(name.clone()))?;
            encode_value(out, resolved, value, names, registry)
        }

        Schema::Logical(logical) => {
            let lowered = registry.encode(value.clone(), &logical.kind, schema)?;
            encode_value(out, &logical.base, &lowered, names, registry)
        }
    }
}

fn mismatch(schema: &Schema, value: &Value) -> EncodeError {
    EncodeError::TypeMismatch {
        expected: schema.type_name(),
        found: value.kind_name().to_string(),
    }
}
