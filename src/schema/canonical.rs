//! Parsing canonical form of a schema.
//!
//! The canonical form is a JSON rendering with everything irrelevant to
//! reading data stripped away: documentation, defaults, aliases, and field
//! order are removed, names are fully qualified, object keys appear in a
//! fixed order (`name`, `type`, `fields`, `symbols`, `items`, `values`,
//! `size`), and no whitespace is emitted. Two schemas that resolve data the
//! same way produce byte-identical canonical forms, which is what the
//! fingerprinter hashes.
//!
//! The text is assembled by hand rather than through a JSON value tree so
//! that key order is exact.

use std::fmt::Write;

use crate::schema::{LogicalSchema, Schema};

/// Render the parsing canonical form of a schema.
pub fn canonical_form(schema: &Schema) -> String {
    let mut out = String::new();
    write_canonical(schema, None, &mut out);
    out
}

impl Schema {
    /// The parsing canonical form of this schema.
    ///
    /// Documentation, defaults, aliases, and logical annotations do not
    /// affect the result.
    pub fn canonical_form(&self) -> String {
        canonical_form(self)
    }
}

fn write_canonical(schema: &Schema, enclosing_namespace: Option<&str>, out: &mut String) {
    match schema {
        Schema::Null => out.push_str("\"null\""),
        Schema::Boolean => out.push_str("\"boolean\""),
        Schema::Int => out.push_str("\"int\""),
        Schema::Long => out.push_str("\"long\""),
        Schema::Float => out.push_str("\"float\""),
        Schema::Double => out.push_str("\"double\""),
        Schema::Bytes => out.push_str("\"bytes\""),
        Schema::String => out.push_str("\"string\""),

        Schema::Record(record) => {
            let fullname = record.fullname();
            out.push_str("{\"name\":");
            write_json_string(&fullname, out);
            out.push_str(",\"type\":\"record\",\"fields\":[");
            let namespace = record.namespace.as_deref().or(enclosing_namespace);
            for (i, field) in record.fields.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str("{\"name\":");
                write_json_string(&field.name, out);
                out.push_str(",\"type\":");
                write_canonical(&field.schema, namespace, out);
                out.push('}');
            }
            out.push_str("]}");
        }

        Schema::Enum(e) => {
            out.push_str("{\"name\":");
            write_json_string(&e.fullname(), out);
            out.push_str(",\"type\":\"enum\",\"symbols\":[");
            for (i, symbol) in e.symbols.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_json_string(symbol, out);
            }
            out.push_str("]}");
        }

        Schema::Array(items) => {
            out.push_str("{\"type\":\"array\",\"items\":");
            write_canonical(items, enclosing_namespace, out);
            out.push('}');
        }

        Schema::Map(values) => {
            out.push_str("{\"type\":\"map\",\"values\":");
            write_canonical(values, enclosing_namespace, out);
            out.push('}');
        }

        Schema::Union(union) => {
            out.push('[');
            for (i, branch) in union.branches().iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(branch, enclosing_namespace, out);
            }
            out.push(']');
        }

        Schema::Fixed(f) => {
            out.push_str("{\"name\":");
            write_json_string(&f.fullname(), out);
            let _ = write!(out, ",\"type\":\"fixed\",\"size\":{}}}", f.size);
        }

        // A reference renders as the (already full) name, qualified against
        // the enclosing namespace when it is a bare name.
        Schema::Named(name) => {
            if name.contains('.') {
                write_json_string(name, out);
            } else {
                match enclosing_namespace {
                    Some(ns) => write_json_string(&format!("{}.{}", ns, name), out),
                    None => write_json_string(name, out),
                }
            }
        }

        // Logical annotations are metadata: canonical form is the base's.
        Schema::Logical(LogicalSchema { base, .. }) => {
            write_canonical(base, enclosing_namespace, out)
        }
    }
}

fn write_json_string(s: &str, out: &mut String) {
    // serde_json produces a quoted, escaped JSON string literal.
    match serde_json::to_string(s) {
        Ok(quoted) => out.push_str(&quoted),
        Err(_) => {
            out.push('"');
            out.push_str(s);
            out.push('"');
        }
    }
}
