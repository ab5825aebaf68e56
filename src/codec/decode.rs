//! Binary decoding against a single writer schema.
//!
//! The decoder follows the binary format exactly:
//! - varints are zig-zag encoded,
//! - floats and doubles are little-endian IEEE 754,
//! - bytes and strings are length-prefixed,
//! - arrays and maps are sequences of count-prefixed blocks terminated by a
//!   zero count, where a negative count is followed by the block's byte
//!   length so the whole block can be skipped without decoding.
//!
//! Reading with a reader schema that differs from the writer's lives in
//! [`resolve`](crate::codec::resolve); this module is the shared leaf layer
//! and the skip machinery.

use crate::codec::reader::ByteReader;
use crate::codec::varint;
use crate::error::DecodeError;
use crate::logical::ConversionRegistry;
use crate::schema::{NamedTypes, Schema};
use crate::value::Value;

/// Decode a null (consumes nothing).
#[inline]
pub fn read_null(_r: &mut ByteReader<'_>) -> Result<(), DecodeError> {
    Ok(())
}

/// Decode a boolean; only 0x00 and 0x01 are accepted.
#[inline]
pub fn read_boolean(r: &mut ByteReader<'_>) -> Result<bool, DecodeError> {
    let offset = r.position();
    match r.read_byte()? {
        0 => Ok(false),
        1 => Ok(true),
        value => Err(DecodeError::InvalidBoolean { offset, value }),
    }
}

/// Decode a little-endian IEEE 754 binary32.
#[inline]
pub fn read_float(r: &mut ByteReader<'_>) -> Result<f32, DecodeError> {
    let bytes = r.read_slice(4)?;
    Ok(f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

/// Decode a little-endian IEEE 754 binary64.
#[inline]
pub fn read_double(r: &mut ByteReader<'_>) -> Result<f64, DecodeError> {
    let bytes = r.read_slice(8)?;
    Ok(f64::from_le_bytes([
        bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5], bytes[6], bytes[7],
    ]))
}

/// Decode a length-prefixed byte sequence.
pub fn read_bytes(r: &mut ByteReader<'_>) -> Result<Vec<u8>, DecodeError> {
    let offset = r.position();
    let length = varint::read_long(r)?;
    if length < 0 {
        return Err(DecodeError::NegativeLength { offset, length });
    }
    Ok(r.read_slice(length as usize)?.to_vec())
}

/// Decode a length-prefixed UTF-8 string.
pub fn read_string(r: &mut ByteReader<'_>) -> Result<String, DecodeError> {
    let offset = r.position();
    let bytes = read_bytes(r)?;
    String::from_utf8(bytes).map_err(|_| DecodeError::InvalidUtf8 { offset })
}

/// Decode exactly `size` raw bytes.
pub fn read_fixed(r: &mut ByteReader<'_>, size: usize) -> Result<Vec<u8>, DecodeError> {
    Ok(r.read_slice(size)?.to_vec())
}

/// One array/map block header: `None` terminates the sequence; otherwise the
/// item count, with the block's byte length when the writer supplied one.
pub fn read_block_header(
    r: &mut ByteReader<'_>,
) -> Result<Option<(usize, Option<usize>)>, DecodeError> {
    let offset = r.position();
    let count = varint::read_long(r)?;
    if count == 0 {
        return Ok(None);
    }
    if count > 0 {
        return Ok(Some((count as usize, None)));
    }
    let len_offset = r.position();
    let byte_length = varint::read_long(r)?;
    if byte_length < 0 {
        return Err(DecodeError::NegativeLength {
            offset: len_offset,
            length: byte_length,
        });
    }
    let count = count.checked_neg().ok_or(DecodeError::NegativeLength {
        offset,
        length: count,
    })?;
    Ok(Some((count as usize, Some(byte_length as usize))))
}

/// Decode a value shaped by `schema`, resolving named references through
/// `names` and applying registered logical conversions.
pub fn decode_value(
    r: &mut ByteReader<'_>,
    schema: &Schema,
    names: &NamedTypes,
    registry: &ConversionRegistry,
) -> Result<Value, DecodeError> {
    match schema {
        Schema::Null => {
            read_null(r)?;
            Ok(Value::Null)
        }
        Schema::Boolean => Ok(Value::Boolean(read_boolean(r)?)),
        Schema::Int => Ok(Value::Int(varint::read_int(r)?)),
        Schema::Long => Ok(Value::Long(varint::read_long(r)?)),
        Schema::Float => Ok(Value::Float(read_float(r)?)),
        Schema::Double => Ok(Value::Double(read_double(r)?)),
        Schema::Bytes => Ok(Value::Bytes(read_bytes(r)?)),
        Schema::String => Ok(Value::String(read_string(r)?)),

        Schema::Record(record) => {
            let mut fields = Vec::with_capacity(record.fields.len());
            for field in &record.fields {
                let value = decode_value(r, &field.schema, names, registry)?;
                fields.push((field.name.clone(), value));
            }
            Ok(Value::Record(fields))
        }

        Schema::Enum(e) => {
            let offset = r.position();
            let index = varint::read_int(r)? as i64;
            if index < 0 || index as usize >= e.symbols.len() {
                return Err(DecodeError::EnumIndexOutOfRange {
                    offset,
                    name: e.fullname(),
                    index,
                    symbols: e.symbols.len(),
                });
            }
            Ok(Value::Enum(index as u32, e.symbols[index as usize].clone()))
        }

        Schema::Array(items) => {
            let mut out = Vec::new();
            while let Some((count, _)) = read_block_header(r)? {
                out.reserve(count);
                for _ in 0..count {
                    out.push(decode_value(r, items, names, registry)?);
                }
            }
            Ok(Value::Array(out))
        }

        Schema::Map(values) => {
            let mut out = Vec::new();
            while let Some((count, _)) = read_block_header(r)? {
                out.reserve(count);
                for _ in 0..count {
                    let key = read_string(r)?;
                    let value = decode_value(r, values, names, registry)?;
                    out.push((key, value));
                }
            }
            Ok(Value::Map(out))
        }

        Schema::Union(union) => {
            let offset = r.position();
            let index = varint::read_int(r)? as i64;
            if index < 0 || index as usize >= union.len() {
                return Err(DecodeError::UnionIndexOutOfRange {
                    offset,
                    index,
                    branches: union.len(),
                });
            }
            let value = decode_value(r, &union.branches()[index as usize], names, registry)?;
            Ok(Value::Union(index as u32, Box::new(value)))
        }

        Schema::Fixed(f) => Ok(Value::Fixed(read_fixed(r, f.size)?)),

        Schema::Named(name) => {
            let resolved = names
                .get(name)
                .ok_or_else(|| DecodeError::UnresolvedReference(name.clone()))?;
            decode_value(r, resolved, names, registry)
        }

        Schema::Logical(logical) => {
            let base = decode_value(r, &logical.base, names, registry)?;
            registry.decode(base, &logical.kind)
        }
    }
}

/// Advance the cursor past one value without materializing it.
///
/// Array and map blocks that carry a byte length are skipped wholesale.
pub fn skip_value(
    r: &mut ByteReader<'_>,
    schema: &Schema,
    names: &NamedTypes,
) -> Result<(), DecodeError> {
    match schema {
        Schema::Null => Ok(()),
        Schema::Boolean => r.skip(1),
        Schema::Int | Schema::Long => varint::skip_varint(r),
        Schema::Float => r.skip(4),
        Schema::Double => r.skip(8),
        Schema::Bytes | Schema::String => {
            let offset = r.position();
            let length = varint::read_long(r)?;
            if length < 0 {
                return Err(DecodeError::NegativeLength { offset, length });
            }
            r.skip(length as usize)
        }
        Schema::Fixed(f) => r.skip(f.size),
        Schema::Enum(_) => varint::skip_varint(r),
        Schema::Array(items) => skip_blocks(r, items, names),
        Schema::Map(values) => skip_blocks_keyed(r, values, names),
        Schema::Union(union) => {
            let offset = r.position();
            let index = varint::read_int(r)? as i64;
            if index < 0 || index as usize >= union.len() {
                return Err(DecodeError::UnionIndexOutOfRange {
                    offset,
                    index,
                    branches: union.len(),
                });
            }
            skip_value(r, &union.branches()[index as usize], names)
        }
        Schema::Record(record) => {
            for field in &record.fields {
                skip_value(r, &field.schema, names)?;
            }
            Ok(())
        }
        Schema::Named(name) => {
            let resolved = names
                .get(name)
                .ok_or_else(|| DecodeError::UnresolvedReference(name.clone()))?;
            skip_value(r, resolved, names)
        }
        Schema::Logical(logical) => skip_value(r, &logical.base, names),
    }
}

fn skip_blocks(
    r: &mut ByteReader<'_>,
    items: &Schema,
    names: &NamedTypes,
) -> Result<(), DecodeError> {
    while let Some((count, byte_length)) = read_block_header(r)? {
        match byte_length {
            Some(len) => r.skip(len)?,
            None => {
                for _ in 0..count {
                    skip_value(r, items, names)?;
                }
            }
        }
    }
    Ok(())
}

fn skip_blocks_keyed(
    r: &mut ByteReader<'_>,
    values: &Schema,
    names: &NamedTypes,
) -> Result<(), DecodeError> {
    while let Some((count, byte_length)) = read_block_header(r)? {
        match byte_length {
            Some(len) => r.skip(len)?,
            None => {
                for _ in 0..count {
                    skip_value(r, &Schema::String, names)?;
                    skip_value(r, values, names)?;
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{EnumSchema, FieldSchema, RecordSchema, UnionSchema};

    fn plain(schema: &Schema, bytes: &[u8]) -> Result<Value, DecodeError> {
        let names = NamedTypes::from_schema(schema);
        let registry = ConversionRegistry::empty();
        let mut r = ByteReader::new(bytes);
        decode_value(&mut r, schema, &names, &registry)
    }

    #[test]
    fn null_consumes_nothing() {
        assert_eq!(plain(&Schema::Null, &[]).unwrap(), Value::Null);
    }

    #[test]
    fn booleans_are_strict() {
        assert_eq!(
            plain(&Schema::Boolean, &[0x01]).unwrap(),
            Value::Boolean(true)
        );
        assert_eq!(
            plain(&Schema::Boolean, &[0x00]).unwrap(),
            Value::Boolean(false)
        );
        assert_eq!(
            plain(&Schema::Boolean, &[0x02]).unwrap_err(),
            DecodeError::InvalidBoolean {
                offset: 0,
                value: 0x02
            }
        );
    }

    #[test]
    fn floats_are_little_endian() {
        assert_eq!(
            plain(&Schema::Float, &[0x00, 0x00, 0x80, 0x3f]).unwrap(),
            Value::Float(1.0)
        );
        assert_eq!(
            plain(
                &Schema::Double,
                &[0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xf0, 0x3f]
            )
            .unwrap(),
            Value::Double(1.0)
        );
    }

    #[test]
    fn any_nan_pattern_decodes_to_a_nan() {
        let value = plain(
            &Schema::Double,
            &[0x12, 0x34, 0x56, 0x78, 0x9a, 0xbc, 0xf8, 0x7f],
        )
        .unwrap();
        match value {
            Value::Double(d) => assert!(d.is_nan()),
            other => panic!("expected double, got {other:?}"),
        }
    }

    #[test]
    fn strings_and_bytes_share_a_layout_but_not_a_type() {
        let hello = [0x0a, 0x48, 0x65, 0x6c, 0x6c, 0x6f];
        assert_eq!(
            plain(&Schema::String, &hello).unwrap(),
            Value::String("Hello".to_string())
        );
        assert_eq!(
            plain(&Schema::Bytes, &hello).unwrap(),
            Value::Bytes(b"Hello".to_vec())
        );
        assert_ne!(
            plain(&Schema::String, &hello).unwrap(),
            plain(&Schema::Bytes, &hello).unwrap()
        );
    }

    #[test]
    fn negative_lengths_are_rejected_with_an_offset() {
        // Length -1 encodes as 0x01.
        assert_eq!(
            plain(&Schema::Bytes, &[0x01]).unwrap_err(),
            DecodeError::NegativeLength {
                offset: 0,
                length: -1
            }
        );
    }

    #[test]
    fn array_blocks_in_all_three_forms() {
        let schema = Schema::Array(Box::new(Schema::Long));
        let expected = Value::Array(vec![Value::Long(4), Value::Long(5), Value::Long(6)]);

        // One three-item block.
        assert_eq!(
            plain(&schema, &[0x06, 0x08, 0x0a, 0x0c, 0x00]).unwrap(),
            expected
        );
        // Three one-item blocks.
        assert_eq!(
            plain(&schema, &[0x02, 0x08, 0x02, 0x0a, 0x02, 0x0c, 0x00]).unwrap(),
            expected
        );
        // Three one-item blocks with byte lengths (count -1 then size 1).
        assert_eq!(
            plain(
                &schema,
                &[0x01, 0x02, 0x08, 0x01, 0x02, 0x0a, 0x01, 0x02, 0x0c, 0x00]
            )
            .unwrap(),
            expected
        );
    }

    #[test]
    fn empty_array_is_a_lone_zero_block() {
        let schema = Schema::Array(Box::new(Schema::Long));
        assert_eq!(plain(&schema, &[0x00]).unwrap(), Value::Array(vec![]));
    }

    #[test]
    fn map_blocks_decode_pairs() {
        let schema = Schema::Map(Box::new(Schema::Long));
        let bytes = [
            0x04, 0x0a, 0x48, 0x65, 0x6c, 0x6c, 0x6f, 0x08, 0x06, 0x42, 0x79, 0x65, 0x0a, 0x00,
        ];
        assert_eq!(
            plain(&schema, &bytes).unwrap(),
            Value::Map(vec![
                ("Hello".to_string(), Value::Long(4)),
                ("Bye".to_string(), Value::Long(5)),
            ])
        );
    }

    #[test]
    fn enum_decodes_by_index() {
        let schema = Schema::Enum(EnumSchema::new(
            "Color",
            vec!["RED".to_string(), "GREEN".to_string(), "BLUE".to_string()],
        ));
        assert_eq!(
            plain(&schema, &[0x02]).unwrap(),
            Value::Enum(1, "GREEN".to_string())
        );
        assert!(matches!(
            plain(&schema, &[0x06]).unwrap_err(),
            DecodeError::EnumIndexOutOfRange { index: 3, .. }
        ));
    }

    #[test]
    fn union_decodes_the_indexed_branch() {
        let schema =
            Schema::Union(UnionSchema::new(vec![Schema::Null, Schema::String]).unwrap());
        assert_eq!(
            plain(&schema, &[0x00]).unwrap(),
            Value::Union(0, Box::new(Value::Null))
        );
        assert_eq!(
            plain(&schema, &[0x02, 0x02, 0x41]).unwrap(),
            Value::Union(1, Box::new(Value::String("A".to_string())))
        );
        assert!(matches!(
            plain(&schema, &[0x04]).unwrap_err(),
            DecodeError::UnionIndexOutOfRange { index: 2, .. }
        ));
    }

    #[test]
    fn record_fields_concatenate_in_declaration_order() {
        let schema = Schema::Record(RecordSchema::new(
            "SimpleRecord",
            vec![
                FieldSchema::new("id", Schema::Long),
                FieldSchema::new("name", Schema::String),
            ],
        ));
        let bytes = [0x02, 0x06, 0x6f, 0x6e, 0x65];
        assert_eq!(
            plain(&schema, &bytes).unwrap(),
            Value::Record(vec![
                ("id".to_string(), Value::Long(1)),
                ("name".to_string(), Value::String("one".to_string())),
            ])
        );
    }

    #[test]
    fn skip_value_matches_decode_consumption() {
        let schema = Schema::Record(RecordSchema::new(
            "R",
            vec![
                FieldSchema::new("a", Schema::Array(Box::new(Schema::Long))),
                FieldSchema::new("b", Schema::String),
                FieldSchema::new("c", Schema::Double),
            ],
        ));
        let bytes = [
            0x06, 0x08, 0x0a, 0x0c, 0x00, // array [4, 5, 6]
            0x06, 0x42, 0x79, 0x65, // "Bye"
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xf0, 0x3f, // 1.0
        ];
        let names = NamedTypes::from_schema(&schema);
        let mut r = ByteReader::new(&bytes);
        skip_value(&mut r, &schema, &names).unwrap();
        assert_eq!(r.position(), bytes.len());
    }

    #[test]
    fn skip_uses_block_byte_lengths() {
        let schema = Schema::Array(Box::new(Schema::Long));
        // count -2, byte length 2, items 4 and 5, terminator.
        let bytes = [0x03, 0x04, 0x08, 0x0a, 0x00];
        let names = NamedTypes::new();
        let mut r = ByteReader::new(&bytes);
        skip_value(&mut r, &schema, &names).unwrap();
        assert_eq!(r.position(), bytes.len());

        // The same data also decodes.
        assert_eq!(
            plain(&schema, &bytes).unwrap(),
            Value::Array(vec![Value::Long(4), Value::Long(5)])
        );
    }

    #[test]
    fn truncated_record_reports_the_offset() {
        let schema = Schema::Record(RecordSchema::new(
            "R",
            vec![
                FieldSchema::new("id", Schema::Long),
                FieldSchema::new("name", Schema::String),
            ],
        ));
        // id present, name's length says 3 but only 1 byte follows.
        let err = plain(&schema, &[0x02, 0x06, 0x6f]).unwrap_err();
        assert_eq!(err, DecodeError::TruncatedInput { offset: 3 });
    }
}
