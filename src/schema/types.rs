//! The schema type system: primitives, complex types, and logical types.
//!
//! Schemas are immutable after construction. Composite schemas own their
//! children directly, except that self-referential types are expressed with
//! [`Schema::Named`] references resolved through a
//! [`NamedTypes`](crate::schema::NamedTypes) arena, so no ownership cycles
//! exist.

use serde_json::Value as JsonValue;

use crate::error::SchemaError;

/// A schema describing the shape of a value.
#[derive(Debug, Clone, PartialEq)]
pub enum Schema {
    // Primitive types
    /// Null type - no value, no bytes.
    Null,
    /// Boolean type.
    Boolean,
    /// 32-bit signed integer.
    Int,
    /// 64-bit signed integer.
    Long,
    /// 32-bit IEEE 754 floating-point.
    Float,
    /// 64-bit IEEE 754 floating-point.
    Double,
    /// Sequence of bytes.
    Bytes,
    /// Unicode string.
    String,

    // Complex types
    /// Record with ordered named fields.
    Record(RecordSchema),
    /// Enumeration with an ordered symbol list.
    Enum(EnumSchema),
    /// Array of items with a single element schema.
    Array(Box<Schema>),
    /// Map with string keys and a single value schema.
    Map(Box<Schema>),
    /// Union of multiple branch schemas.
    Union(UnionSchema),
    /// Fixed-size byte array.
    Fixed(FixedSchema),

    /// Late-bound reference to a named type by full name.
    Named(String),

    /// Logical type annotation over a base schema.
    Logical(LogicalSchema),
}

impl Schema {
    /// Check if this schema is a primitive type.
    pub fn is_primitive(&self) -> bool {
        matches!(
            self,
            Schema::Null
                | Schema::Boolean
                | Schema::Int
                | Schema::Long
                | Schema::Float
                | Schema::Double
                | Schema::Bytes
                | Schema::String
        )
    }

    /// Check if this schema is a named type (record, enum, or fixed).
    pub fn is_named(&self) -> bool {
        matches!(
            self,
            Schema::Record(_) | Schema::Enum(_) | Schema::Fixed(_)
        )
    }

    /// The fully qualified name of a named type or reference, if any.
    pub fn fullname(&self) -> Option<String> {
        match self {
            Schema::Record(r) => Some(r.fullname()),
            Schema::Enum(e) => Some(e.fullname()),
            Schema::Fixed(f) => Some(f.fullname()),
            Schema::Named(n) => Some(n.clone()),
            Schema::Logical(l) => l.base.fullname(),
            _ => None,
        }
    }

    /// A short human-readable type name for error messages.
    pub fn type_name(&self) -> String {
        match self {
            Schema::Null => "null".to_string(),
            Schema::Boolean => "boolean".to_string(),
            Schema::Int => "int".to_string(),
            Schema::Long => "long".to_string(),
            Schema::Float => "float".to_string(),
            Schema::Double => "double".to_string(),
            Schema::Bytes => "bytes".to_string(),
            Schema::String => "string".to_string(),
            Schema::Record(r) => format!("record '{}'", r.fullname()),
            Schema::Enum(e) => format!("enum '{}'", e.fullname()),
            Schema::Array(_) => "array".to_string(),
            Schema::Map(_) => "map".to_string(),
            Schema::Union(_) => "union".to_string(),
            Schema::Fixed(f) => format!("fixed '{}'", f.fullname()),
            Schema::Named(n) => format!("named '{}'", n),
            Schema::Logical(l) => l.base.type_name(),
        }
    }

    /// The logical type annotation, if this schema carries one.
    pub fn logical_type(&self) -> Option<&LogicalTypeName> {
        match self {
            Schema::Logical(l) => Some(&l.kind),
            _ => None,
        }
    }

    /// The schema beneath any logical annotation.
    pub fn without_logical(&self) -> &Schema {
        match self {
            Schema::Logical(l) => &l.base,
            other => other,
        }
    }

    /// Deep invariant check: unique field names, unique enum symbols, union
    /// constraints, and resolvable named references.
    ///
    /// Union constraints are also enforced by [`UnionSchema::new`]; this
    /// re-checks them for schemas assembled from parts.
    pub fn validate(&self) -> Result<(), SchemaError> {
        let names = super::resolution::NamedTypes::from_schema(self);
        self.validate_inner(&names)
    }

    fn validate_inner(&self, names: &super::resolution::NamedTypes) -> Result<(), SchemaError> {
        match self {
            Schema::Record(record) => {
                let mut seen = std::collections::HashSet::new();
                for field in &record.fields {
                    if !seen.insert(field.name.as_str()) {
                        return Err(SchemaError::DuplicateField {
                            record: record.fullname(),
                            field: field.name.clone(),
                        });
                    }
                    field.schema.validate_inner(names)?;
                }
                Ok(())
            }
            Schema::Enum(e) => {
                let mut seen = std::collections::HashSet::new();
                for symbol in &e.symbols {
                    if !seen.insert(symbol.as_str()) {
                        return Err(SchemaError::DuplicateSymbol {
                            name: e.fullname(),
                            symbol: symbol.clone(),
                        });
                    }
                }
                if let Some(default) = &e.default {
                    if !seen.contains(default.as_str()) {
                        return Err(SchemaError::UnknownDefaultSymbol {
                            name: e.fullname(),
                            symbol: default.clone(),
                        });
                    }
                }
                Ok(())
            }
            Schema::Array(items) => items.validate_inner(names),
            Schema::Map(values) => values.validate_inner(names),
            Schema::Union(union) => {
                UnionSchema::check_branches(&union.branches)?;
                for branch in &union.branches {
                    branch.validate_inner(names)?;
                }
                Ok(())
            }
            Schema::Named(name) => {
                if names.contains(name) {
                    Ok(())
                } else {
                    Err(SchemaError::UnresolvedReference(name.clone()))
                }
            }
            Schema::Logical(l) => l.base.validate_inner(names),
            _ => Ok(()),
        }
    }
}

/// Schema for a record type.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordSchema {
    /// The name of the record.
    pub name: String,
    /// Optional namespace.
    pub namespace: Option<String>,
    /// The fields of the record, in declaration order.
    pub fields: Vec<FieldSchema>,
    /// Optional documentation.
    pub doc: Option<String>,
    /// Aliases for this record.
    pub aliases: Vec<String>,
}

impl RecordSchema {
    /// Create a new record schema with the given name and fields.
    pub fn new(name: impl Into<String>, fields: Vec<FieldSchema>) -> Self {
        Self {
            name: name.into(),
            namespace: None,
            fields,
            doc: None,
            aliases: Vec::new(),
        }
    }

    /// Set the namespace.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Set the documentation.
    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    /// Add aliases.
    pub fn with_aliases(mut self, aliases: Vec<String>) -> Self {
        self.aliases = aliases;
        self
    }

    /// The fully qualified name.
    pub fn fullname(&self) -> String {
        match &self.namespace {
            Some(ns) => format!("{}.{}", ns, self.name),
            None => self.name.clone(),
        }
    }

    /// Look up a field by name.
    pub fn field(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Schema for a field within a record.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSchema {
    /// The name of the field.
    pub name: String,
    /// The schema of the field's value.
    pub schema: Schema,
    /// Optional default, as a JSON value interpreted against `schema`.
    pub default: Option<JsonValue>,
    /// Optional documentation.
    pub doc: Option<String>,
    /// Sort order used by record comparison.
    pub order: FieldOrder,
    /// Aliases for this field.
    pub aliases: Vec<String>,
}

impl FieldSchema {
    /// Create a new field with the given name and schema.
    pub fn new(name: impl Into<String>, schema: Schema) -> Self {
        Self {
            name: name.into(),
            schema,
            default: None,
            doc: None,
            order: FieldOrder::Ascending,
            aliases: Vec::new(),
        }
    }

    /// Set the default value.
    pub fn with_default(mut self, default: JsonValue) -> Self {
        self.default = Some(default);
        self
    }

    /// Set the documentation.
    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    /// Add aliases.
    pub fn with_aliases(mut self, aliases: Vec<String>) -> Self {
        self.aliases = aliases;
        self
    }
}

/// Field ordering for record comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldOrder {
    #[default]
    Ascending,
    Descending,
    Ignore,
}

/// Schema for an enumeration type.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumSchema {
    /// The name of the enum.
    pub name: String,
    /// Optional namespace.
    pub namespace: Option<String>,
    /// The symbols of the enum, in declaration order.
    pub symbols: Vec<String>,
    /// Optional documentation.
    pub doc: Option<String>,
    /// Aliases for this enum.
    pub aliases: Vec<String>,
    /// Default symbol substituted during resolution when the policy allows.
    pub default: Option<String>,
}

impl EnumSchema {
    /// Create a new enum schema with the given name and symbols.
    pub fn new(name: impl Into<String>, symbols: Vec<String>) -> Self {
        Self {
            name: name.into(),
            namespace: None,
            symbols,
            doc: None,
            aliases: Vec::new(),
            default: None,
        }
    }

    /// Set the namespace.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Set the default symbol.
    pub fn with_default(mut self, symbol: impl Into<String>) -> Self {
        self.default = Some(symbol.into());
        self
    }

    /// The fully qualified name.
    pub fn fullname(&self) -> String {
        match &self.namespace {
            Some(ns) => format!("{}.{}", ns, self.name),
            None => self.name.clone(),
        }
    }

    /// The index of a symbol, if declared.
    pub fn symbol_index(&self, symbol: &str) -> Option<usize> {
        self.symbols.iter().position(|s| s == symbol)
    }
}

/// Schema for a fixed-size byte array.
#[derive(Debug, Clone, PartialEq)]
pub struct FixedSchema {
    /// The name of the fixed type.
    pub name: String,
    /// Optional namespace.
    pub namespace: Option<String>,
    /// The size in bytes.
    pub size: usize,
    /// Optional documentation.
    pub doc: Option<String>,
    /// Aliases for this fixed type.
    pub aliases: Vec<String>,
}

impl FixedSchema {
    /// Create a new fixed schema with the given name and size.
    pub fn new(name: impl Into<String>, size: usize) -> Self {
        Self {
            name: name.into(),
            namespace: None,
            size,
            doc: None,
            aliases: Vec::new(),
        }
    }

    /// Set the namespace.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// The fully qualified name.
    pub fn fullname(&self) -> String {
        match &self.namespace {
            Some(ns) => format!("{}.{}", ns, self.name),
            None => self.name.clone(),
        }
    }
}

/// Schema for a union type.
///
/// Constructed through [`UnionSchema::new`], which enforces the union
/// invariants: no two branches with the same primitive tag or named-type
/// full name, and no branch that is itself a union.
#[derive(Debug, Clone, PartialEq)]
pub struct UnionSchema {
    branches: Vec<Schema>,
}

impl UnionSchema {
    /// Create a union, rejecting duplicate and nested branches.
    pub fn new(branches: Vec<Schema>) -> Result<Self, SchemaError> {
        Self::check_branches(&branches)?;
        Ok(Self { branches })
    }

    /// The branches in declaration order.
    pub fn branches(&self) -> &[Schema] {
        &self.branches
    }

    /// Number of branches.
    pub fn len(&self) -> usize {
        self.branches.len()
    }

    /// True when the union has no branches.
    pub fn is_empty(&self) -> bool {
        self.branches.is_empty()
    }

    /// True when one branch is `null`.
    pub fn is_nullable(&self) -> bool {
        self.branches.iter().any(|b| matches!(b, Schema::Null))
    }

    /// The identity tag used for the duplicate-branch check: the primitive
    /// tag for unnamed types, the full name for named types.
    fn branch_tag(schema: &Schema) -> String {
        match schema.without_logical() {
            Schema::Record(r) => r.fullname(),
            Schema::Enum(e) => e.fullname(),
            Schema::Fixed(f) => f.fullname(),
            Schema::Named(n) => n.clone(),
            other => other.type_name(),
        }
    }

    pub(crate) fn check_branches(branches: &[Schema]) -> Result<(), SchemaError> {
        let mut seen: std::collections::HashMap<String, usize> = std::collections::HashMap::new();
        for (index, branch) in branches.iter().enumerate() {
            if matches!(branch.without_logical(), Schema::Union(_)) {
                return Err(SchemaError::NestedUnion { index });
            }
            let tag = Self::branch_tag(branch);
            if let Some(&first) = seen.get(&tag) {
                return Err(SchemaError::DuplicateUnionBranch { first, index, tag });
            }
            seen.insert(tag, index);
        }
        Ok(())
    }
}

/// A logical type annotation over a base schema.
///
/// The annotation never changes the wire encoding of the base schema; it
/// changes how an in-memory value is interpreted before encoding and after
/// decoding, and only when a conversion is registered for it.
#[derive(Debug, Clone, PartialEq)]
pub struct LogicalSchema {
    /// The underlying schema carrying the bytes.
    pub base: Box<Schema>,
    /// The logical type name and parameters.
    pub kind: LogicalTypeName,
}

impl LogicalSchema {
    /// Annotate a base schema with a logical type.
    pub fn new(base: Schema, kind: LogicalTypeName) -> Self {
        Self {
            base: Box::new(base),
            kind,
        }
    }

    /// `decimal(precision, scale)` over bytes.
    pub fn decimal_bytes(precision: u32, scale: u32) -> Schema {
        Schema::Logical(Self::new(
            Schema::Bytes,
            LogicalTypeName::Decimal { precision, scale },
        ))
    }

    /// `decimal(precision, scale)` over a fixed type.
    pub fn decimal_fixed(fixed: FixedSchema, precision: u32, scale: u32) -> Schema {
        Schema::Logical(Self::new(
            Schema::Fixed(fixed),
            LogicalTypeName::Decimal { precision, scale },
        ))
    }
}

/// Logical type names with their parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum LogicalTypeName {
    /// Decimal with precision and scale, over bytes or fixed.
    Decimal { precision: u32, scale: u32 },
    /// UUID, over string.
    Uuid,
    /// Date as days since the Unix epoch, over int.
    Date,
    /// Time of day in milliseconds, over int.
    TimeMillis,
    /// Time of day in microseconds, over long.
    TimeMicros,
    /// Timestamp in milliseconds since the Unix epoch, over long.
    TimestampMillis,
    /// Timestamp in microseconds since the Unix epoch, over long.
    TimestampMicros,
    /// Local (zoneless) timestamp in milliseconds, over long.
    LocalTimestampMillis,
    /// Local (zoneless) timestamp in microseconds, over long.
    LocalTimestampMicros,
    /// Duration as (months, days, milliseconds), over fixed(12).
    Duration,
}

impl LogicalTypeName {
    /// The registry key for this logical type.
    pub fn name(&self) -> &'static str {
        match self {
            LogicalTypeName::Decimal { .. } => "decimal",
            LogicalTypeName::Uuid => "uuid",
            LogicalTypeName::Date => "date",
            LogicalTypeName::TimeMillis => "time-millis",
            LogicalTypeName::TimeMicros => "time-micros",
            LogicalTypeName::TimestampMillis => "timestamp-millis",
            LogicalTypeName::TimestampMicros => "timestamp-micros",
            LogicalTypeName::LocalTimestampMillis => "local-timestamp-millis",
            LogicalTypeName::LocalTimestampMicros => "local-timestamp-micros",
            LogicalTypeName::Duration => "duration",
        }
    }
}
