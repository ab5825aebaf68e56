//! Reader/writer schema resolution during decoding.
//!
//! The resolver walks a (writer, reader) schema pair in lock-step with the
//! byte cursor: bytes are consumed per the writer schema and the produced
//! value is shaped like the reader schema. Along the way it applies:
//! - primitive promotions (int -> long -> float -> double, string <-> bytes),
//! - record field matching by name and alias, in both directions,
//! - default injection for reader fields the writer lacks,
//! - union branch re-resolution in reader-declared order,
//! - the policy-gated enum default fallback,
//! - registered logical-type conversions.
//!
//! A resolver borrows its schemas for the duration of one decode call and
//! holds no state afterwards.

use std::collections::HashMap;

use tracing::{debug, trace};

use crate::codec::decode;
use crate::codec::defaults;
use crate::codec::reader::ByteReader;
use crate::codec::varint;
use crate::error::DecodeError;
use crate::logical::ConversionRegistry;
use crate::schema::{EnumSchema, NamedTypes, RecordSchema, Schema, UnionSchema};
use crate::value::Value;

/// Knobs for version-dependent resolution behavior.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolutionPolicy {
    /// Substitute the reader enum's default symbol for writer symbols absent
    /// from the reader's list, instead of failing. Off by default, matching
    /// the stricter historical behavior.
    pub use_enum_default: bool,
}

/// A lock-step (writer, reader) decoder.
pub struct Resolver<'a> {
    writer_names: NamedTypes,
    reader_names: NamedTypes,
    registry: &'a ConversionRegistry,
    policy: ResolutionPolicy,
}

impl<'a> Resolver<'a> {
    /// Build a resolver for one writer/reader schema pair.
    pub fn new(
        writer: &Schema,
        reader: &Schema,
        registry: &'a ConversionRegistry,
        policy: ResolutionPolicy,
    ) -> Self {
        debug!(
            writer = %writer.type_name(),
            reader = %reader.type_name(),
            "building schema resolver"
        );
        Self {
            writer_names: NamedTypes::from_schema(writer),
            reader_names: NamedTypes::from_schema(reader),
            registry,
            policy,
        }
    }

    /// Decode one value: consume bytes per `writer`, shape per `reader`.
    pub fn read_value(
        &self,
        writer: &Schema,
        reader: &Schema,
        r: &mut ByteReader<'_>,
    ) -> Result<Value, DecodeError> {
        let writer = self.writer_names.deref(writer)?;
        let reader = self.reader_names.deref(reader)?;

        // Writer union: decode the indexed branch, then resolve that branch
        // against the whole reader schema (which need not be a union).
        if let Schema::Union(wu) = writer {
            let offset = r.position();
            let index = varint::read_int(r)? as i64;
            if index < 0 || index as usize >= wu.len() {
                return Err(DecodeError::UnionIndexOutOfRange {
                    offset,
                    index,
                    branches: wu.len(),
                });
            }
            return self.read_value(&wu.branches()[index as usize], reader, r);
        }

        // Non-union writer against a reader union: first structurally
        // matching reader branch, in reader-declared order.
        if let Schema::Union(ru) = reader {
            let index = select_union_branch(writer, ru, &self.reader_names)?.ok_or_else(|| {
                DecodeError::MissingUnionBranch {
                    writer: writer.type_name(),
                }
            })?;
            trace!(branch = index, writer = %writer.type_name(), "selected reader union branch");
            let value = self.read_value(writer, &ru.branches()[index], r)?;
            return Ok(Value::Union(index as u32, Box::new(value)));
        }

        // Resolve the bases, then apply the logical conversion when both
        // sides carry the same annotation and one is registered.
        let raw = self.read_raw(writer.without_logical(), reader.without_logical(), r)?;
        match (writer.logical_type(), reader.logical_type()) {
            (Some(wk), Some(rk)) if wk == rk => self.registry.decode(raw, rk),
            _ => Ok(raw),
        }
    }

    fn read_raw(
        &self,
        writer: &Schema,
        reader: &Schema,
        r: &mut ByteReader<'_>,
    ) -> Result<Value, DecodeError> {
        match (writer, reader) {
            // Same-kind primitives.
            (Schema::Null, Schema::Null) => Ok(Value::Null),
            (Schema::Boolean, Schema::Boolean) => Ok(Value::Boolean(decode::read_boolean(r)?)),
            (Schema::Int, Schema::Int) => Ok(Value::Int(varint::read_int(r)?)),
            (Schema::Long, Schema::Long) => Ok(Value::Long(varint::read_long(r)?)),
            (Schema::Float, Schema::Float) => Ok(Value::Float(decode::read_float(r)?)),
            (Schema::Double, Schema::Double) => Ok(Value::Double(decode::read_double(r)?)),
            (Schema::Bytes, Schema::Bytes) => Ok(Value::Bytes(decode::read_bytes(r)?)),
            (Schema::String, Schema::String) => Ok(Value::String(decode::read_string(r)?)),

            // One-directional promotions.
            (Schema::Int, Schema::Long) => Ok(Value::Long(varint::read_int(r)? as i64)),
            (Schema::Int, Schema::Float) => Ok(Value::Float(varint::read_int(r)? as f32)),
            (Schema::Int, Schema::Double) => Ok(Value::Double(varint::read_int(r)? as f64)),
            (Schema::Long, Schema::Float) => Ok(Value::Float(varint::read_long(r)? as f32)),
            (Schema::Long, Schema::Double) => Ok(Value::Double(varint::read_long(r)? as f64)),
            (Schema::Float, Schema::Double) => Ok(Value::Double(decode::read_float(r)? as f64)),

            // String/bytes re-interpret the same payload.
            (Schema::String, Schema::Bytes) => Ok(Value::Bytes(decode::read_bytes(r)?)),
            (Schema::Bytes, Schema::String) => Ok(Value::String(decode::read_string(r)?)),

            (Schema::Record(wr), Schema::Record(rr)) => self.read_record(wr, rr, r),
            (Schema::Enum(we), Schema::Enum(re)) => self.read_enum(we, re, r),

            (Schema::Array(wi), Schema::Array(ri)) => {
                let mut out = Vec::new();
                while let Some((count, _)) = decode::read_block_header(r)? {
                    out.reserve(count);
                    for _ in 0..count {
                        out.push(self.read_value(wi, ri, r)?);
                    }
                }
                Ok(Value::Array(out))
            }

            (Schema::Map(wv), Schema::Map(rv)) => {
                let mut out = Vec::new();
                while let Some((count, _)) = decode::read_block_header(r)? {
                    out.reserve(count);
                    for _ in 0..count {
                        let key = decode::read_string(r)?;
                        out.push((key, self.read_value(wv, rv, r)?));
                    }
                }
                Ok(Value::Map(out))
            }

            // Sizes must agree; names are not compared.
            (Schema::Fixed(wf), Schema::Fixed(rf)) => {
                if wf.size != rf.size {
                    return Err(DecodeError::FixedSizeMismatch {
                        writer: wf.size,
                        reader: rf.size,
                    });
                }
                Ok(Value::Fixed(decode::read_fixed(r, wf.size)?))
            }

            (writer, reader) => Err(DecodeError::TypeMismatch {
                writer: writer.type_name(),
                reader: reader.type_name(),
            }),
        }
    }

    fn read_record(
        &self,
        writer: &RecordSchema,
        reader: &RecordSchema,
        r: &mut ByteReader<'_>,
    ) -> Result<Value, DecodeError> {
        // Writer fields indexed by name and by alias; first declaration wins.
        let mut by_name: HashMap<&str, usize> = HashMap::new();
        for (widx, wf) in writer.fields.iter().enumerate() {
            by_name.entry(wf.name.as_str()).or_insert(widx);
            for alias in &wf.aliases {
                by_name.entry(alias.as_str()).or_insert(widx);
            }
        }

        // Claim a writer field for each reader field, by name then alias.
        let mut reader_for_writer: Vec<Option<usize>> = vec![None; writer.fields.len()];
        for (ridx, rf) in reader.fields.iter().enumerate() {
            let found = by_name.get(rf.name.as_str()).copied().or_else(|| {
                rf.aliases
                    .iter()
                    .find_map(|alias| by_name.get(alias.as_str()).copied())
            });
            if let Some(widx) = found {
                if reader_for_writer[widx].is_none() {
                    reader_for_writer[widx] = Some(ridx);
                }
            }
        }

        // Phase 1: consume bytes in writer order; fields without a reader
        // counterpart advance the cursor without materializing.
        let mut decoded: Vec<Option<Value>> = vec![None; reader.fields.len()];
        for (widx, wf) in writer.fields.iter().enumerate() {
            match reader_for_writer[widx] {
                Some(ridx) => {
                    let value =
                        self.read_value(&wf.schema, &reader.fields[ridx].schema, r)?;
                    decoded[ridx] = Some(value);
                }
                None => decode::skip_value(r, &wf.schema, &self.writer_names)?,
            }
        }

        // Phase 2: assemble in reader order, defaulting what the writer
        // never wrote.
        let mut fields = Vec::with_capacity(reader.fields.len());
        for (ridx, rf) in reader.fields.iter().enumerate() {
            let value = match decoded[ridx].take() {
                Some(value) => value,
                None => match &rf.default {
                    Some(json) => defaults::value_from_json(
                        json,
                        &rf.schema,
                        &rf.name,
                        &self.reader_names,
                        self.registry,
                    )?,
                    None => {
                        return Err(DecodeError::MissingDefault {
                            field: rf.name.clone(),
                        })
                    }
                },
            };
            fields.push((rf.name.clone(), value));
        }
        Ok(Value::Record(fields))
    }

    fn read_enum(
        &self,
        writer: &EnumSchema,
        reader: &EnumSchema,
        r: &mut ByteReader<'_>,
    ) -> Result<Value, DecodeError> {
        let offset = r.position();
        let index = varint::read_int(r)? as i64;
        if index < 0 || index as usize >= writer.symbols.len() {
            return Err(DecodeError::EnumIndexOutOfRange {
                offset,
                name: writer.fullname(),
                index,
                symbols: writer.symbols.len(),
            });
        }
        let symbol = &writer.symbols[index as usize];
        if let Some(pos) = reader.symbol_index(symbol) {
            return Ok(Value::Enum(pos as u32, symbol.clone()));
        }
        if self.policy.use_enum_default {
            if let Some(default) = &reader.default {
                if let Some(pos) = reader.symbol_index(default) {
                    trace!(symbol = %symbol, default = %default, "substituting reader enum default");
                    return Ok(Value::Enum(pos as u32, default.clone()));
                }
            }
        }
        Err(DecodeError::EnumSymbolNotFound {
            symbol: symbol.clone(),
        })
    }
}

/// True when writer bytes are readable as `reader` at the primitive/kind
/// level: identical kinds, or a one-directional promotion.
pub(crate) fn promotes(writer: &Schema, reader: &Schema) -> bool {
    matches!(
        (writer, reader),
        (Schema::Null, Schema::Null)
            | (Schema::Boolean, Schema::Boolean)
            | (Schema::Int, Schema::Int)
            | (Schema::Int, Schema::Long)
            | (Schema::Int, Schema::Float)
            | (Schema::Int, Schema::Double)
            | (Schema::Long, Schema::Long)
            | (Schema::Long, Schema::Float)
            | (Schema::Long, Schema::Double)
            | (Schema::Float, Schema::Float)
            | (Schema::Float, Schema::Double)
            | (Schema::Double, Schema::Double)
            | (Schema::Bytes, Schema::Bytes)
            | (Schema::Bytes, Schema::String)
            | (Schema::String, Schema::String)
            | (Schema::String, Schema::Bytes)
            | (Schema::Record(_), Schema::Record(_))
            | (Schema::Enum(_), Schema::Enum(_))
            | (Schema::Array(_), Schema::Array(_))
            | (Schema::Map(_), Schema::Map(_))
            | (Schema::Fixed(_), Schema::Fixed(_))
    )
}

/// Pick the reader union branch for a non-union writer: an exact full-name
/// match for named types first, then the first kind-level structural match
/// in reader-declared order. `Ok(None)` means no branch accepts the writer.
pub(crate) fn select_union_branch(
    writer: &Schema,
    union: &UnionSchema,
    reader_names: &NamedTypes,
) -> Result<Option<usize>, DecodeError> {
    let writer_core = writer.without_logical();

    if let Some(writer_name) = named_fullname(writer_core) {
        for (index, branch) in union.branches().iter().enumerate() {
            let branch = reader_names.deref(branch)?.without_logical();
            if promotes(writer_core, branch) && named_fullname(branch) == Some(writer_name.clone())
            {
                return Ok(Some(index));
            }
        }
    }

    for (index, branch) in union.branches().iter().enumerate() {
        let branch = reader_names.deref(branch)?.without_logical();
        if promotes(writer_core, branch) {
            return Ok(Some(index));
        }
    }
    Ok(None)
}

fn named_fullname(schema: &Schema) -> Option<String> {
    match schema {
        Schema::Record(r) => Some(r.fullname()),
        Schema::Enum(e) => Some(e.fullname()),
        Schema::Fixed(f) => Some(f.fullname()),
        _ => None,
    }
}
