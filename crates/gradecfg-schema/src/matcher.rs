//! # Matcher
//!
//! The single-object-against-single-schema primitive. The piecewise
//! driver treats it as a black box: pass, or the first violation.
//!
//! [`JsonSchemaMatcher`] is the production implementation, backed by the
//! `jsonschema` crate. Tests and embedders can plug in their own
//! [`Matcher`] to observe or stub the calls the driver makes.

use jsonschema::Draft;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ConstraintViolation, MatchError};

/// Checks one document fragment against one schema fragment.
pub trait Matcher {
    /// Return `Ok(())` if `instance` satisfies `schema`, otherwise the
    /// first violation found.
    ///
    /// # Errors
    ///
    /// [`MatchError::Mismatch`] when the instance does not conform,
    /// [`MatchError::InvalidSchema`] when `schema` is not a valid schema.
    fn check(&self, instance: &Value, schema: &Value) -> Result<(), MatchError>;
}

impl<M: Matcher + ?Sized> Matcher for &M {
    fn check(&self, instance: &Value, schema: &Value) -> Result<(), MatchError> {
        (**self).check(instance, schema)
    }
}

/// JSON Schema dialect used to compile schema fragments.
///
/// Fragments cut out of a larger schema lose their `$schema` keyword, so
/// the dialect is fixed up front rather than detected per fragment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaDraft {
    /// Draft 4.
    Draft4,
    /// Draft 6.
    Draft6,
    /// Draft 7, the dialect grading-configuration schemas are written in.
    #[default]
    Draft7,
    /// Draft 2019-09.
    Draft201909,
    /// Draft 2020-12.
    Draft202012,
}

impl SchemaDraft {
    /// Read the dialect from a root schema's `$schema` URI, if it names one.
    pub fn detect(schema: &Value) -> Option<Self> {
        let uri = schema.get("$schema")?.as_str()?;
        if uri.contains("draft-04") {
            Some(Self::Draft4)
        } else if uri.contains("draft-06") {
            Some(Self::Draft6)
        } else if uri.contains("draft-07") {
            Some(Self::Draft7)
        } else if uri.contains("2019-09") {
            Some(Self::Draft201909)
        } else if uri.contains("2020-12") {
            Some(Self::Draft202012)
        } else {
            None
        }
    }

    /// Whether keywords beside a `$ref` still take part in validation.
    pub fn applies_ref_siblings(self) -> bool {
        matches!(self, Self::Draft201909 | Self::Draft202012)
    }
}

impl From<SchemaDraft> for Draft {
    fn from(draft: SchemaDraft) -> Self {
        match draft {
            SchemaDraft::Draft4 => Draft::Draft4,
            SchemaDraft::Draft6 => Draft::Draft6,
            SchemaDraft::Draft7 => Draft::Draft7,
            SchemaDraft::Draft201909 => Draft::Draft201909,
            SchemaDraft::Draft202012 => Draft::Draft202012,
        }
    }
}

/// A [`Matcher`] backed by the `jsonschema` crate.
///
/// Each call compiles the schema fragment it is given. Fragments are
/// expected to be self-contained: `$ref`s must already be inlined (see
/// [`InlineRefResolver`](crate::InlineRefResolver)).
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSchemaMatcher {
    draft: SchemaDraft,
}

impl JsonSchemaMatcher {
    /// Create a matcher compiling fragments as `draft`.
    pub fn new(draft: SchemaDraft) -> Self {
        Self { draft }
    }

    /// The dialect this matcher compiles with.
    pub fn draft(&self) -> SchemaDraft {
        self.draft
    }
}

impl Matcher for JsonSchemaMatcher {
    fn check(&self, instance: &Value, schema: &Value) -> Result<(), MatchError> {
        let mut opts = jsonschema::options();
        opts.with_draft(self.draft.into());
        let validator = opts.build(schema).map_err(|e| MatchError::InvalidSchema {
            reason: e.to_string(),
        })?;

        let first = validator.iter_errors(instance).next().map(|e| ConstraintViolation {
            instance_path: e.instance_path.to_string(),
            schema_path: e.schema_path.to_string(),
            message: e.to_string(),
        });

        match first {
            None => Ok(()),
            Some(violation) => Err(MatchError::Mismatch(violation)),
        }
    }
}
