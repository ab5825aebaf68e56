//! Binary encoding and decoding.
//!
//! The encode path is a direct structural traversal of (writer schema,
//! value). The decode path walks a (writer schema, reader schema) pair in
//! lock-step, consuming bytes per the writer and shaping the result per the
//! reader; [`decode`] is the writer-equals-reader special case.
//!
//! All entry points are pure functions over byte slices: no I/O, no state
//! between calls. Independent calls may run concurrently even when they
//! share schemas.

pub mod decode;
pub mod defaults;
pub mod encode;
pub mod reader;
pub mod resolve;
pub mod varint;

pub use reader::ByteReader;
pub use resolve::{ResolutionPolicy, Resolver};

use crate::error::{DecodeError, EncodeError};
use crate::logical::ConversionRegistry;
use crate::schema::{NamedTypes, Schema};
use crate::value::Value;

/// Encode a value against a writer schema, with the default logical-type
/// conversions.
pub fn encode(schema: &Schema, value: &Value) -> Result<Vec<u8>, EncodeError> {
    encode_with(schema, value, &ConversionRegistry::with_defaults())
}

/// Encode a value against a writer schema, with an explicit conversion
/// registry.
pub fn encode_with(
    schema: &Schema,
    value: &Value,
    registry: &ConversionRegistry,
) -> Result<Vec<u8>, EncodeError> {
    let names = NamedTypes::from_schema(schema);
    let mut out = Vec::new();
    encode::encode_value(&mut out, schema, value, &names, registry)?;
    Ok(out)
}

/// Decode bytes with writer schema = reader schema, with the default
/// logical-type conversions. Returns the value and the bytes consumed.
pub fn decode(schema: &Schema, bytes: &[u8]) -> Result<(Value, usize), DecodeError> {
    decode_with(schema, bytes, &ConversionRegistry::with_defaults())
}

/// Decode bytes with writer schema = reader schema, with an explicit
/// conversion registry.
pub fn decode_with(
    schema: &Schema,
    bytes: &[u8],
    registry: &ConversionRegistry,
) -> Result<(Value, usize), DecodeError> {
    let names = NamedTypes::from_schema(schema);
    let mut r = ByteReader::new(bytes);
    let value = decode::decode_value(&mut r, schema, &names, registry)?;
    Ok((value, r.position()))
}

/// Decode writer-schema bytes into a reader-schema-shaped value, with the
/// default conversions and policy.
pub fn decode_resolved(
    writer: &Schema,
    reader: &Schema,
    bytes: &[u8],
) -> Result<(Value, usize), DecodeError> {
    decode_resolved_with(
        writer,
        reader,
        bytes,
        &ConversionRegistry::with_defaults(),
        ResolutionPolicy::default(),
    )
}

/// Decode writer-schema bytes into a reader-schema-shaped value, with an
/// explicit conversion registry and resolution policy.
pub fn decode_resolved_with(
    writer: &Schema,
    reader: &Schema,
    bytes: &[u8],
    registry: &ConversionRegistry,
    policy: ResolutionPolicy,
) -> Result<(Value, usize), DecodeError> {
    let resolver = Resolver::new(writer, reader, registry, policy);
    let mut r = ByteReader::new(bytes);
    let value = resolver.read_value(writer, reader, &mut r)?;
    Ok((value, r.position()))
}
