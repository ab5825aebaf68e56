//! Named-type arena for late-bound schema references.
//!
//! Self-referential schemas (a record containing a union including itself)
//! are expressed with [`Schema::Named`] references instead of ownership
//! cycles. A [`NamedTypes`] arena collects every named definition in a schema
//! by full name; the codec and the compatibility checker look references up
//! here while walking.

use std::collections::HashMap;

use crate::error::DecodeError;
use crate::schema::{Schema, SchemaError};

/// An arena of named type definitions, keyed by full name.
#[derive(Debug, Clone, Default)]
pub struct NamedTypes {
    types: HashMap<String, Schema>,
}

impl NamedTypes {
    /// Create an empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect every named type (record, enum, fixed) defined in a schema.
    pub fn from_schema(schema: &Schema) -> Self {
        let mut arena = Self::new();
        arena.collect(schema);
        arena
    }

    /// Register a named type under its full name.
    pub fn register(&mut self, name: impl Into<String>, schema: Schema) {
        self.types.insert(name.into(), schema);
    }

    /// Look up a named type.
    pub fn get(&self, name: &str) -> Option<&Schema> {
        self.types.get(name)
    }

    /// True when the arena holds a definition for `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// Follow a `Named` reference to its definition; other schemas pass
    /// through unchanged.
    pub fn deref<'a>(&'a self, schema: &'a Schema) -> Result<&'a Schema, DecodeError> {
        match schema {
            Schema::Named(name) => self
                .get(name)
                .ok_or_else(|| DecodeError::UnresolvedReference(name.clone())),
            other => Ok(other),
        }
    }

    /// Follow a `Named` reference for schema-construction contexts.
    pub fn deref_schema<'a>(&'a self, schema: &'a Schema) -> Result<&'a Schema, SchemaError> {
        match schema {
            Schema::Named(name) => self
                .get(name)
                .ok_or_else(|| SchemaError::UnresolvedReference(name.clone())),
            other => Ok(other),
        }
    }

    fn collect(&mut self, schema: &Schema) {
        match schema {
            Schema::Record(record) => {
                self.types.insert(record.fullname(), schema.clone());
                for field in &record.fields {
                    self.collect(&field.schema);
                }
            }
            Schema::Enum(e) => {
                self.types.insert(e.fullname(), schema.clone());
            }
            Schema::Fixed(f) => {
                self.types.insert(f.fullname(), schema.clone());
            }
            Schema::Array(items) => self.collect(items),
            Schema::Map(values) => self.collect(values),
            Schema::Union(union) => {
                for branch in union.branches() {
                    self.collect(branch);
                }
            }
            Schema::Logical(l) => self.collect(&l.base),
            // Primitives and references define nothing.
            _ => {}
        }
    }
}
