//! Error types for schema handling, encoding, and decoding.
//!
//! Three disjoint families:
//! - [`SchemaError`]: the schema model itself is malformed.
//! - [`EncodeError`]: the datum handed to the encoder does not match the
//!   writer schema (a caller-contract violation).
//! - [`DecodeError`]: the bytes cannot be decoded, or the writer and reader
//!   schemas cannot be reconciled (structural/resolution failures).
//!
//! Decode errors carry the byte offset at which they were detected wherever
//! a cursor was involved; resolution errors carry the schema context instead.

use thiserror::Error;

/// Errors raised while constructing or validating a schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// A record declares the same field name twice.
    #[error("duplicate field '{field}' in record '{record}'")]
    DuplicateField { record: String, field: String },

    /// An enum declares the same symbol twice.
    #[error("duplicate symbol '{symbol}' in enum '{name}'")]
    DuplicateSymbol { name: String, symbol: String },

    /// An enum's default symbol is not one of its symbols.
    #[error("default symbol '{symbol}' is not declared by enum '{name}'")]
    UnknownDefaultSymbol { name: String, symbol: String },

    /// Two union branches share a primitive tag or a named-type full name.
    #[error("union branch {index} duplicates branch {first} ('{tag}')")]
    DuplicateUnionBranch {
        first: usize,
        index: usize,
        tag: String,
    },

    /// A union directly contains another union.
    #[error("union branch {index} is itself a union; unions may not immediately contain unions")]
    NestedUnion { index: usize },

    /// A named reference does not resolve to any named type in the schema.
    #[error("unresolved named type reference '{0}'")]
    UnresolvedReference(String),
}

/// Errors raised while encoding a value against a writer schema.
///
/// These all mean "your datum is wrong", as opposed to [`DecodeError`] which
/// can also mean "the two schemas disagree".
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    /// The value's shape does not match the schema kind at this position.
    #[error("value does not match schema: found {found}, expecting {expected}")]
    TypeMismatch { expected: String, found: String },

    /// A record value does not supply a field the schema declares.
    #[error("record value is missing field '{field}'")]
    MissingField { field: String },

    /// An enum value names a symbol the schema does not declare.
    #[error("enum symbol '{symbol}' is not declared by enum '{name}'")]
    UnknownEnumSymbol { name: String, symbol: String },

    /// A union value's branch index is outside the schema's branch list.
    #[error("union branch index {index} out of range ({branches} branches)")]
    UnionIndexOutOfRange { index: u32, branches: usize },

    /// A fixed value has the wrong number of bytes.
    #[error("fixed '{name}' requires {expected} bytes, value has {found}")]
    FixedSizeMismatch {
        name: String,
        expected: usize,
        found: usize,
    },

    /// A decimal value's scale differs from the schema's declared scale.
    #[error(
        "cannot encode decimal with scale {value_scale} as scale {schema_scale} without rounding"
    )]
    ScaleMismatch { value_scale: u32, schema_scale: u32 },

    /// A decimal value's digit count exceeds the schema's declared precision.
    #[error(
        "cannot encode decimal with precision {value_precision} as max precision {schema_precision}"
    )]
    PrecisionOverflow {
        value_precision: u64,
        schema_precision: u32,
    },

    /// A decimal's unscaled bytes do not fit the backing fixed type.
    #[error("decimal unscaled value needs {needed} bytes but fixed '{name}' has {size}")]
    DecimalTooWide {
        name: String,
        size: usize,
        needed: usize,
    },

    /// The schema contains a named reference that cannot be resolved.
    #[error("unresolved named type reference '{0}'")]
    UnresolvedReference(String),
}

/// Errors raised while decoding bytes, with or without schema resolution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The input ended before the value did.
    #[error("unexpected end of input at byte {offset}")]
    TruncatedInput { offset: usize },

    /// A varint ran past the group limit for its type, or carried value
    /// bits beyond the type's width.
    #[error("varint at byte {offset} does not fit in {bits} bits")]
    VarintOverflow { offset: usize, bits: u32 },

    /// A boolean byte was neither 0x00 nor 0x01.
    #[error("invalid boolean byte {value:#04x} at byte {offset}")]
    InvalidBoolean { offset: usize, value: u8 },

    /// A bytes/string/block length was negative.
    #[error("negative length {length} at byte {offset}")]
    NegativeLength { offset: usize, length: i64 },

    /// String payload was not valid UTF-8.
    #[error("invalid UTF-8 in string at byte {offset}")]
    InvalidUtf8 { offset: usize },

    /// An enum index was outside the writer's symbol list.
    #[error("enum index {index} out of range for '{name}' ({symbols} symbols) at byte {offset}")]
    EnumIndexOutOfRange {
        offset: usize,
        name: String,
        index: i64,
        symbols: usize,
    },

    /// A union branch index was outside the writer's branch list.
    #[error("union branch index {index} out of range ({branches} branches) at byte {offset}")]
    UnionIndexOutOfRange {
        offset: usize,
        index: i64,
        branches: usize,
    },

    /// Writer and reader schemas disagree at this position.
    #[error("found {writer}, expecting {reader}")]
    TypeMismatch { writer: String, reader: String },

    /// The reader declares a field the writer lacks, and it has no default.
    #[error("reader field '{field}' is missing from the writer schema and has no default")]
    MissingDefault { field: String },

    /// No branch of the reader union accepts the writer's type.
    #[error("found {writer}, expecting union")]
    MissingUnionBranch { writer: String },

    /// The writer's enum symbol is absent from the reader's symbol list.
    #[error("enum symbol '{symbol}' is not declared by the reader enum")]
    EnumSymbolNotFound { symbol: String },

    /// Writer and reader fixed sizes differ.
    #[error("fixed size mismatch: writer has {writer} bytes, reader expects {reader}")]
    FixedSizeMismatch { writer: usize, reader: usize },

    /// A reader field default could not be materialized against its schema.
    #[error("invalid default for field '{field}': {reason}")]
    BadDefault { field: String, reason: String },

    /// The schema contains a named reference that cannot be resolved.
    #[error("unresolved named type reference '{0}'")]
    UnresolvedReference(String),

    /// A single-object message did not start with the expected magic bytes.
    #[error("bad message magic: expected [0xc3, 0x01], found {found:02x?}")]
    BadMessageMagic { found: [u8; 2] },

    /// A single-object message's fingerprint did not match the given schema.
    #[error(
        "message fingerprint {found:#018x} does not match schema fingerprint {expected:#018x}"
    )]
    FingerprintMismatch { expected: u64, found: u64 },

    /// A single-object message's fingerprint matched no registered schema.
    #[error("no schema registered for fingerprint {fingerprint:#018x}")]
    UnknownFingerprint { fingerprint: u64 },
}
