//! Single-object message framing.
//!
//! A self-describing message is two magic bytes `0xC3 0x01`, the schema's
//! 8-byte fingerprint little-endian on the wire, and then the normal binary
//! payload encoded with writer schema = reader schema = the identified
//! schema. A [`SchemaStore`] decodes streams whose schema is identified
//! only by fingerprint.

use std::collections::HashMap;

use crate::codec;
use crate::error::{DecodeError, EncodeError};
use crate::fingerprint::fingerprint64;
use crate::logical::ConversionRegistry;
use crate::schema::Schema;
use crate::value::Value;

/// Leading magic bytes of every single-object message.
pub const MESSAGE_MAGIC: [u8; 2] = [0xc3, 0x01];

/// Magic plus fingerprint.
pub const HEADER_LENGTH: usize = 10;

/// Frame a value as a single-object message.
pub fn encode_message(schema: &Schema, value: &Value) -> Result<Vec<u8>, EncodeError> {
    encode_message_with(schema, value, &ConversionRegistry::with_defaults())
}

/// Frame a value as a single-object message, with an explicit conversion
/// registry.
pub fn encode_message_with(
    schema: &Schema,
    value: &Value,
    registry: &ConversionRegistry,
) -> Result<Vec<u8>, EncodeError> {
    let payload = codec::encode_with(schema, value, registry)?;
    let mut out = Vec::with_capacity(HEADER_LENGTH + payload.len());
    out.extend_from_slice(&MESSAGE_MAGIC);
    out.extend_from_slice(&fingerprint64(schema).to_le_bytes());
    out.extend_from_slice(&payload);
    Ok(out)
}

/// Validate the header and return the message's schema fingerprint.
pub fn read_fingerprint(bytes: &[u8]) -> Result<u64, DecodeError> {
    if bytes.len() < HEADER_LENGTH {
        return Err(DecodeError::TruncatedInput {
            offset: bytes.len(),
        });
    }
    if bytes[0] != MESSAGE_MAGIC[0] || bytes[1] != MESSAGE_MAGIC[1] {
        return Err(DecodeError::BadMessageMagic {
            found: [bytes[0], bytes[1]],
        });
    }
    let mut fp = [0u8; 8];
    fp.copy_from_slice(&bytes[2..HEADER_LENGTH]);
    Ok(u64::from_le_bytes(fp))
}

/// Decode a single-object message against a known schema.
///
/// The header's fingerprint must match the schema's. Returns the value and
/// the total bytes consumed, header included.
pub fn decode_message(schema: &Schema, bytes: &[u8]) -> Result<(Value, usize), DecodeError> {
    decode_message_with(schema, bytes, &ConversionRegistry::with_defaults())
}

/// Decode a single-object message against a known schema, with an explicit
/// conversion registry.
pub fn decode_message_with(
    schema: &Schema,
    bytes: &[u8],
    registry: &ConversionRegistry,
) -> Result<(Value, usize), DecodeError> {
    let found = read_fingerprint(bytes)?;
    let expected = fingerprint64(schema);
    if found != expected {
        return Err(DecodeError::FingerprintMismatch { expected, found });
    }
    let (value, consumed) = codec::decode_with(schema, &bytes[HEADER_LENGTH..], registry)?;
    Ok((value, HEADER_LENGTH + consumed))
}

/// A fingerprint-keyed schema lookup for decoding self-describing messages.
#[derive(Debug, Clone, Default)]
pub struct SchemaStore {
    schemas: HashMap<u64, Schema>,
}

impl SchemaStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a schema; returns its fingerprint.
    pub fn register(&mut self, schema: Schema) -> u64 {
        let fp = fingerprint64(&schema);
        self.schemas.insert(fp, schema);
        fp
    }

    /// Look up a schema by fingerprint.
    pub fn get(&self, fingerprint: u64) -> Option<&Schema> {
        self.schemas.get(&fingerprint)
    }

    /// Decode a message whose schema is identified by its fingerprint.
    pub fn decode(&self, bytes: &[u8]) -> Result<(&Schema, Value, usize), DecodeError> {
        self.decode_with(bytes, &ConversionRegistry::with_defaults())
    }

    /// Decode with an explicit conversion registry.
    pub fn decode_with(
        &self,
        bytes: &[u8],
        registry: &ConversionRegistry,
    ) -> Result<(&Schema, Value, usize), DecodeError> {
        let fingerprint = read_fingerprint(bytes)?;
        let schema = self
            .get(fingerprint)
            .ok_or(DecodeError::UnknownFingerprint { fingerprint })?;
        let (value, consumed) = codec::decode_with(schema, &bytes[HEADER_LENGTH..], registry)?;
        Ok((schema, value, HEADER_LENGTH + consumed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_message_layout_is_pinned() {
        let message = encode_message(&Schema::Int, &Value::Int(1_234_567)).unwrap();
        assert_eq!(message.len(), 14);
        assert_eq!(message[0], 0xc3);
        assert_eq!(message[1], 0x01);
        // Fingerprint 0x7275d51a3f395c8f, little-endian on the wire.
        assert_eq!(&message[2..6], &[0x8f, 0x5c, 0x39, 0x3f]);
        assert_eq!(&message[6..10], &[0x1a, 0xd5, 0x75, 0x72]);

        let (value, consumed) = decode_message(&Schema::Int, &message).unwrap();
        assert_eq!(value, Value::Int(1_234_567));
        assert_eq!(consumed, 14);
    }

    #[test]
    fn round_trip_small_ints() {
        for v in [1, 0, -1] {
            let message = encode_message(&Schema::Int, &Value::Int(v)).unwrap();
            let (value, _) = decode_message(&Schema::Int, &message).unwrap();
            assert_eq!(value, Value::Int(v));
        }
    }

    #[test]
    fn bad_magic_is_rejected() {
        let mut message = encode_message(&Schema::Int, &Value::Int(1)).unwrap();
        message[0] = 0x4f;
        assert_eq!(
            decode_message(&Schema::Int, &message).unwrap_err(),
            DecodeError::BadMessageMagic {
                found: [0x4f, 0x01]
            }
        );
    }

    #[test]
    fn wrong_schema_is_a_fingerprint_mismatch() {
        let message = encode_message(&Schema::Int, &Value::Int(1)).unwrap();
        assert!(matches!(
            decode_message(&Schema::Long, &message).unwrap_err(),
            DecodeError::FingerprintMismatch { .. }
        ));
    }

    #[test]
    fn truncated_header() {
        assert_eq!(
            read_fingerprint(&[0xc3, 0x01, 0x00]).unwrap_err(),
            DecodeError::TruncatedInput { offset: 3 }
        );
    }

    #[test]
    fn store_routes_by_fingerprint() {
        let mut store = SchemaStore::new();
        store.register(Schema::Int);
        store.register(Schema::String);

        let message = encode_message(&Schema::String, &Value::String("hi".to_string())).unwrap();
        let (schema, value, consumed) = store.decode(&message).unwrap();
        assert_eq!(schema, &Schema::String);
        assert_eq!(value, Value::String("hi".to_string()));
        assert_eq!(consumed, message.len());
    }

    #[test]
    fn store_rejects_unknown_fingerprints() {
        let store = SchemaStore::new();
        let message = encode_message(&Schema::Int, &Value::Int(1)).unwrap();
        assert!(matches!(
            store.decode(&message).unwrap_err(),
            DecodeError::UnknownFingerprint { .. }
        ));
    }
}
