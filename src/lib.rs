//! Schema-driven binary serialization with schema evolution.
//!
//! This crate implements a self-describing binary format: a primitive codec
//! (zig-zag varints, block-structured arrays and maps, length-prefixed
//! bytes and strings), a resolving codec that reconciles the schema bytes
//! were written with against the schema a reader wants, an offline
//! compatibility checker, a strict decimal logical type, and 64-bit schema
//! fingerprints for single-object messages.
//!
//! Schemas are immutable values constructed through the model API and
//! freely shareable across threads. Encoding and decoding are pure,
//! synchronous traversals over byte slices; every error is terminal for the
//! current call.

pub mod codec;
pub mod decimal;
pub mod error;
pub mod fingerprint;
pub mod logical;
pub mod message;
pub mod schema;
pub mod value;

// Re-export main types
pub use codec::{
    decode, decode_resolved, decode_resolved_with, decode_with, encode, encode_with, ByteReader,
    ResolutionPolicy, Resolver,
};
pub use decimal::Decimal;
pub use error::{DecodeError, EncodeError, SchemaError};
pub use fingerprint::{fingerprint64, rabin64};
pub use logical::{ConversionRegistry, DecimalConversion, LogicalConversion, TemporalConversion};
pub use message::{
    decode_message, decode_message_with, encode_message, encode_message_with, read_fingerprint,
    SchemaStore, HEADER_LENGTH, MESSAGE_MAGIC,
};
pub use schema::{
    check, check_with, CompatibilityResult, EnumSchema, FieldOrder, FieldSchema, FixedSchema,
    Incompatibility, IncompatibilityKind, LogicalSchema, LogicalTypeName, NamedTypes,
    RecordSchema, Schema, UnionSchema, Verdict,
};
pub use value::Value;
