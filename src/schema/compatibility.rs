//! Offline reader/writer compatibility checking.
//!
//! [`check`] runs the same traversal as the resolving decoder but never
//! touches bytes: wherever the decoder would fail structurally, the checker
//! records an incompatibility and moves on to the next sibling position, so
//! independent problems are all reported. It never recurses *inside* a
//! subtree already found incompatible, and an `Incompatible` verdict always
//! carries at least one entry.
//!
//! Entries appear in the order the depth-first traversal first encountered
//! them; that order is part of the contract.

use std::collections::HashSet;

use tracing::debug;

use crate::codec::resolve::{promotes, select_union_branch};
use crate::codec::ResolutionPolicy;
use crate::schema::{NamedTypes, Schema};

/// The overall outcome of a compatibility check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Every value the writer can produce is readable by the reader.
    Compatible,
    /// At least one position cannot be resolved.
    Incompatible,
}

/// What went wrong at one position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncompatibilityKind {
    /// The kinds cannot be reconciled, even with promotion.
    TypeMismatch,
    /// A reader field is missing from the writer and has no default.
    MissingDefault,
    /// A union side has no branch for the other side's type.
    MissingUnionBranch,
    /// A writer enum symbol is absent from the reader's list.
    EnumSymbolNotFound,
    /// Fixed sizes differ.
    FixedSizeMismatch,
}

/// One incompatibility, located by a dotted/bracketed breadcrumb path
/// (`field.subfield[1]`, `items`, `values`; the empty string is the root).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Incompatibility {
    pub kind: IncompatibilityKind,
    pub path: String,
}

impl std::fmt::Display for Incompatibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.path.is_empty() {
            write!(f, "{:?} at schema root", self.kind)
        } else {
            write!(f, "{:?} at '{}'", self.kind, self.path)
        }
    }
}

/// The verdict plus every incompatibility found, in traversal order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompatibilityResult {
    pub verdict: Verdict,
    pub incompatibilities: Vec<Incompatibility>,
}

impl CompatibilityResult {
    /// True when the verdict is [`Verdict::Compatible`].
    pub fn is_compatible(&self) -> bool {
        self.verdict == Verdict::Compatible
    }
}

/// Check whether reader-schema consumers can read writer-schema data, with
/// the default resolution policy.
pub fn check(writer: &Schema, reader: &Schema) -> CompatibilityResult {
    check_with(writer, reader, ResolutionPolicy::default())
}

/// Check compatibility under an explicit resolution policy.
pub fn check_with(
    writer: &Schema,
    reader: &Schema,
    policy: ResolutionPolicy,
) -> CompatibilityResult {
    let mut checker = Checker {
        writer_names: NamedTypes::from_schema(writer),
        reader_names: NamedTypes::from_schema(reader),
        policy,
        in_progress: HashSet::new(),
    };
    let mut incompatibilities = Vec::new();
    checker.check(writer, reader, "", &mut incompatibilities);
    let verdict = if incompatibilities.is_empty() {
        Verdict::Compatible
    } else {
        Verdict::Incompatible
    };
    debug!(?verdict, count = incompatibilities.len(), "compatibility check finished");
    CompatibilityResult {
        verdict,
        incompatibilities,
    }
}

struct Checker {
    writer_names: NamedTypes,
    reader_names: NamedTypes,
    policy: ResolutionPolicy,
    // (writer fullname, reader fullname) record pairs currently on the
    // stack; revisiting one terminates recursive schemas.
    in_progress: HashSet<(String, String)>,
}

impl Checker {
    fn check(&mut self, writer: &Schema, reader: &Schema, path: &str, out: &mut Vec<Incompatibility>) {
        let writer = match self.writer_names.deref(writer) {
            Ok(writer) => writer.clone(),
            Err(_) => {
                out.push(Incompatibility {
                    kind: IncompatibilityKind::TypeMismatch,
                    path: path.to_string(),
                });
                return;
            }
        };
        let reader = match self.reader_names.deref(reader) {
            Ok(reader) => reader.clone(),
            Err(_) => {
                out.push(Incompatibility {
                    kind: IncompatibilityKind::TypeMismatch,
                    path: path.to_string(),
                });
                return;
            }
        };

        // Writer union: every branch the writer might emit must resolve.
        if let Schema::Union(wu) = &writer {
            for (index, branch) in wu.branches().iter().enumerate() {
                let branch_path = format!("{path}[{index}]");
                if let Schema::Union(ru) = &reader {
                    match select_union_branch(
                        self.writer_names.deref(branch).unwrap_or(branch),
                        ru,
                        &self.reader_names,
                    ) {
                        Ok(Some(selected)) => {
                            let target = ru.branches()[selected].clone();
                            self.check(branch, &target, &branch_path, out);
                        }
                        _ => out.push(Incompatibility {
                            kind: IncompatibilityKind::MissingUnionBranch,
                            path: branch_path,
                        }),
                    }
                } else {
                    self.check(branch, &reader, &branch_path, out);
                }
            }
            return;
        }

        // Non-union writer against a reader union: the first structural
        // match carries the rest of the check.
        if let Schema::Union(ru) = &reader {
            match select_union_branch(&writer, ru, &self.reader_names) {
                Ok(Some(selected)) => {
                    let target = ru.branches()[selected].clone();
                    self.check(&writer, &target, path, out);
                }
                _ => out.push(Incompatibility {
                    kind: IncompatibilityKind::MissingUnionBranch,
                    path: path.to_string(),
                }),
            }
            return;
        }

        let writer = writer.without_logical().clone();
        let reader = reader.without_logical().clone();

        match (&writer, &reader) {
            (Schema::Record(wr), Schema::Record(rr)) => {
                let guard = (wr.fullname(), rr.fullname());
                if !self.in_progress.insert(guard.clone()) {
                    return;
                }

                // Writer fields indexed by name and alias.
                let mut by_name: std::collections::HashMap<&str, usize> =
                    std::collections::HashMap::new();
                for (widx, wf) in wr.fields.iter().enumerate() {
                    by_name.entry(wf.name.as_str()).or_insert(widx);
                    for alias in &wf.aliases {
                        by_name.entry(alias.as_str()).or_insert(widx);
                    }
                }

                for rf in &rr.fields {
                    let field_path = join(path, &rf.name);
                    let found = by_name.get(rf.name.as_str()).copied().or_else(|| {
                        rf.aliases
                            .iter()
                            .find_map(|alias| by_name.get(alias.as_str()).copied())
                    });
                    match found {
                        Some(widx) => {
                            let wf_schema = wr.fields[widx].schema.clone();
                            self.check(&wf_schema, &rf.schema, &field_path, out);
                        }
                        None => {
                            if rf.default.is_none() {
                                out.push(Incompatibility {
                                    kind: IncompatibilityKind::MissingDefault,
                                    path: field_path,
                                });
                            }
                        }
                    }
                }

                self.in_progress.remove(&guard);
            }

            (Schema::Enum(we), Schema::Enum(re)) => {
                let covered = self.policy.use_enum_default && re.default.is_some();
                if !covered {
                    let reader_symbols: HashSet<&str> =
                        re.symbols.iter().map(|s| s.as_str()).collect();
                    for symbol in &we.symbols {
                        if !reader_symbols.contains(symbol.as_str()) {
                            out.push(Incompatibility {
                                kind: IncompatibilityKind::EnumSymbolNotFound,
                                path: path.to_string(),
                            });
                        }
                    }
                }
            }

            (Schema::Array(wi), Schema::Array(ri)) => {
                let wi = wi.as_ref().clone();
                let ri = ri.as_ref().clone();
                self.check(&wi, &ri, &join(path, "items"), out);
            }

            (Schema::Map(wv), Schema::Map(rv)) => {
                let wv = wv.as_ref().clone();
                let rv = rv.as_ref().clone();
                self.check(&wv, &rv, &join(path, "values"), out);
            }

            (Schema::Fixed(wf), Schema::Fixed(rf)) => {
                if wf.size != rf.size {
                    out.push(Incompatibility {
                        kind: IncompatibilityKind::FixedSizeMismatch,
                        path: path.to_string(),
                    });
                }
            }

            (writer, reader) => {
                if !promotes(writer, reader) {
                    out.push(Incompatibility {
                        kind: IncompatibilityKind::TypeMismatch,
                        path: path.to_string(),
                    });
                }
            }
        }
    }
}

fn join(path: &str, component: &str) -> String {
    if path.is_empty() {
        component.to_string()
    } else {
        format!("{path}.{component}")
    }
}
