//! The schema model: types, named-reference resolution, canonical form, and
//! compatibility checking.

pub mod canonical;
pub mod compatibility;
pub mod resolution;
pub mod types;

pub use canonical::canonical_form;
pub use compatibility::{
    check, check_with, CompatibilityResult, Incompatibility, IncompatibilityKind, Verdict,
};
pub use resolution::NamedTypes;
pub use types::{
    EnumSchema, FieldOrder, FieldSchema, FixedSchema, LogicalSchema, LogicalTypeName,
    RecordSchema, Schema, UnionSchema,
};

pub use crate::error::SchemaError;
