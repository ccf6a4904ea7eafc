//! # Schema Reference Resolution
//!
//! The piecewise driver cuts fragments out of the schema and hands them to
//! the matcher one at a time. A fragment containing `{"$ref": "#/..."}`
//! would point at a root it no longer has, so references are inlined once,
//! before validation starts, and the driver only ever sees a
//! self-contained tree.
//!
//! Only document-local JSON Pointer references are supported. Keywords
//! next to a `$ref` are dropped up to Draft 7, which ignores them. From
//! 2019-09 on they still apply, so the target is kept under `allOf`
//! beside them.

use serde_json::{Map, Value};

use crate::error::ResolveError;
use crate::matcher::SchemaDraft;

/// Turns a schema with references into one without.
pub trait SchemaResolver {
    /// Resolve every reference in `schema`.
    ///
    /// # Errors
    ///
    /// A [`ResolveError`] naming the first reference that could not be
    /// resolved.
    fn resolve(&self, schema: Value) -> Result<Value, ResolveError>;
}

/// Inlines local `#/...` references by copying the target fragment.
///
/// The dialect decides what happens to keywords beside a `$ref`. Without
/// an explicit one it is read from the schema's `$schema`, else Draft 7.
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineRefResolver {
    draft: Option<SchemaDraft>,
}

impl InlineRefResolver {
    /// A resolver that takes the dialect from the schema itself.
    pub fn new() -> Self {
        Self::default()
    }

    /// A resolver for an explicitly chosen dialect.
    pub fn with_draft(draft: SchemaDraft) -> Self {
        Self { draft: Some(draft) }
    }
}

impl SchemaResolver for InlineRefResolver {
    fn resolve(&self, schema: Value) -> Result<Value, ResolveError> {
        let draft = self
            .draft
            .or_else(|| SchemaDraft::detect(&schema))
            .unwrap_or_default();
        let mut inliner = Inliner {
            root: &schema,
            keep_siblings: draft.applies_ref_siblings(),
            in_progress: Vec::new(),
        };
        inliner.inline(&schema)
    }
}

struct Inliner<'a> {
    root: &'a Value,
    keep_siblings: bool,
    in_progress: Vec<String>,
}

impl Inliner<'_> {
    fn inline(&mut self, node: &Value) -> Result<Value, ResolveError> {
        match node {
            Value::Object(map) => {
                if let Some(Value::String(reference)) = map.get("$ref") {
                    let target = self.follow(reference)?;
                    if !self.keep_siblings || map.len() == 1 {
                        return Ok(target);
                    }
                    let mut out = self.inline_members(map.iter().filter(|(k, _)| *k != "$ref"))?;
                    let all_of = match out.remove("allOf") {
                        Some(Value::Array(mut items)) => {
                            items.insert(0, target);
                            items
                        }
                        Some(other) => vec![target, other],
                        None => vec![target],
                    };
                    out.insert("allOf".to_string(), Value::Array(all_of));
                    return Ok(Value::Object(out));
                }
                self.inline_members(map.iter()).map(Value::Object)
            }
            Value::Array(items) => items
                .iter()
                .map(|item| self.inline(item))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            other => Ok(other.clone()),
        }
    }

    fn inline_members<'m>(
        &mut self,
        members: impl Iterator<Item = (&'m String, &'m Value)>,
    ) -> Result<Map<String, Value>, ResolveError> {
        let mut out = Map::new();
        for (key, value) in members {
            out.insert(key.clone(), self.inline(value)?);
        }
        Ok(out)
    }

    fn follow(&mut self, reference: &str) -> Result<Value, ResolveError> {
        let Some(fragment) = reference.strip_prefix('#') else {
            return Err(ResolveError::Unsupported {
                reference: reference.to_string(),
            });
        };
        if !fragment.is_empty() && !fragment.starts_with('/') {
            // Named anchors (`#foo`) are not JSON Pointers.
            return Err(ResolveError::Unsupported {
                reference: reference.to_string(),
            });
        }
        if self.in_progress.iter().any(|r| r == fragment) {
            return Err(ResolveError::Recursive {
                reference: reference.to_string(),
            });
        }

        let root = self.root;
        let target = root.pointer(fragment).ok_or_else(|| ResolveError::Dangling {
            reference: reference.to_string(),
        })?;

        self.in_progress.push(fragment.to_string());
        let resolved = self.inline(target);
        self.in_progress.pop();
        resolved
    }
}
