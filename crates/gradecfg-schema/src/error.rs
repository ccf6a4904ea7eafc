//! # Violation Reports
//!
//! The single failure type raised by piecewise validation, plus the
//! error types for the layers around it (matching, reference
//! resolution, document loading).
//!
//! ## Report Kinds
//!
//! - **Schema defect**: the schema has no entry for a key the validator
//!   was asked to check, or a schema fragment cannot be compiled. Signals
//!   a bug in the schema, never in the configuration.
//! - **Non-conformance**: a present configuration chunk does not satisfy
//!   its resolved schema chunk.
//!
//! Both kinds travel as a [`ViolationReport`] so callers have one thing to
//! catch, render, and exit on.

use std::fmt;
use std::io::{self, Write};

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Which side of the contract a report blames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    /// The schema is missing (or cannot compile) a fragment the driver needs.
    SchemaDefect,
    /// A present configuration chunk failed its schema chunk.
    NonConformance,
}

/// The first constraint violation reported by a [`Matcher`](crate::Matcher).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConstraintViolation {
    /// JSON Pointer to the violating value, relative to the checked chunk.
    pub instance_path: String,
    /// JSON Pointer to the keyword within the schema chunk that failed.
    pub schema_path: String,
    /// Human-readable description of the violation.
    pub message: String,
}

impl fmt::Display for ConstraintViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.instance_path.is_empty() {
            write!(f, "(root): {}", self.message)
        } else {
            write!(f, "{}: {}", self.instance_path, self.message)
        }
    }
}

/// A localized validation failure.
///
/// Carries the exact configuration chunk and schema chunk that were
/// compared, not the whole documents, so the rendered message points
/// at the sub-object the author has to fix.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViolationReport {
    /// Which side is at fault.
    pub kind: ReportKind,
    /// Where in the configuration tree the failure happened, e.g.
    /// `"testcase_2 points"` or `"global resource_limits"`.
    pub title: String,
    /// One-line human summary.
    pub summary: String,
    /// The configuration fragment that failed.
    pub config_chunk: Value,
    /// The schema fragment it was checked against.
    pub schema_chunk: Value,
    /// The matcher's own description of the first violation, if any.
    pub violation: Option<ConstraintViolation>,
}

impl ViolationReport {
    /// A present chunk failed its schema chunk.
    pub fn non_conformance(
        title: impl Into<String>,
        config_chunk: &Value,
        schema_chunk: &Value,
        violation: ConstraintViolation,
    ) -> Self {
        let title = title.into();
        Self {
            kind: ReportKind::NonConformance,
            summary: format!("{title} was not properly formatted"),
            title,
            config_chunk: config_chunk.clone(),
            schema_chunk: schema_chunk.clone(),
            violation: Some(violation),
        }
    }

    /// The schema has no entry for `key`.
    ///
    /// The chunks recorded are the parents the lookup was attempted on.
    pub fn schema_defect(
        title: impl Into<String>,
        key: &str,
        parent_config: Option<&Value>,
        parent_schema: &Value,
    ) -> Self {
        Self {
            kind: ReportKind::SchemaDefect,
            title: title.into(),
            summary: format!(
                "There is no specification for {key} in the schema. Please add a specification."
            ),
            config_chunk: parent_config.cloned().unwrap_or(Value::Null),
            schema_chunk: parent_schema.clone(),
            violation: None,
        }
    }

    /// A schema fragment exists but is not itself a valid schema.
    pub fn invalid_schema(title: impl Into<String>, schema_chunk: &Value, reason: &str) -> Self {
        let title = title.into();
        Self {
            kind: ReportKind::SchemaDefect,
            summary: format!("The schema for {title} could not be compiled: {reason}"),
            title,
            config_chunk: Value::Null,
            schema_chunk: schema_chunk.clone(),
            violation: None,
        }
    }

    /// True when the schema, not the configuration, is at fault.
    pub fn is_schema_defect(&self) -> bool {
        self.kind == ReportKind::SchemaDefect
    }

    /// Write the human-readable form of this report.
    ///
    /// Layout: a blank line, the summary, then (for non-conformance) the
    /// matcher's message and a 4-space-indented dump of the offending
    /// configuration chunk.
    pub fn render(&self, out: &mut impl Write) -> io::Result<()> {
        writeln!(out)?;
        writeln!(out, "ERROR: {}:", self.summary)?;
        if let Some(violation) = &self.violation {
            writeln!(out, "{}", violation.message)?;
            if !violation.instance_path.is_empty() {
                writeln!(out, "(at {})", violation.instance_path)?;
            }
            writeln!(out, "The portion of your configuration that caused the error is:")?;
            writeln!(out, "{}", pretty_json(&self.config_chunk)?)?;
        }
        Ok(())
    }

    /// Render to stderr. Reports never go to stdout.
    pub fn eprint(&self) {
        let stderr = io::stderr();
        let mut handle = stderr.lock();
        // Nothing sensible to do if stderr itself is gone.
        let _ = self.render(&mut handle);
    }
}

impl fmt::Display for ViolationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.violation {
            Some(v) => write!(f, "{}: {}", self.summary, v.message),
            None => write!(f, "{}", self.summary),
        }
    }
}

impl std::error::Error for ViolationReport {}

/// Pretty-print with 4-space indentation.
fn pretty_json(value: &Value) -> io::Result<String> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser).map_err(io::Error::other)?;
    String::from_utf8(buf).map_err(io::Error::other)
}

/// Error returned by the matcher primitive.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MatchError {
    /// The instance violates the schema.
    #[error("{0}")]
    Mismatch(ConstraintViolation),

    /// The schema fragment could not be compiled into a validator.
    #[error("invalid schema: {reason}")]
    InvalidSchema {
        /// Reason reported by the schema compiler.
        reason: String,
    },
}

/// Error while inlining `$ref` pointers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// Only document-local `#/...` references are inlined.
    #[error("unsupported reference '{reference}': only local '#/...' pointers are resolved")]
    Unsupported {
        /// The `$ref` value as written.
        reference: String,
    },

    /// The pointer does not address anything in the schema.
    #[error("dangling reference '{reference}': no such location in the schema")]
    Dangling {
        /// The `$ref` value as written.
        reference: String,
    },

    /// The reference (transitively) contains itself.
    #[error("recursive reference '{reference}' cannot be inlined")]
    Recursive {
        /// The `$ref` value as written.
        reference: String,
    },
}

/// Error while reading a configuration or schema from disk.
#[derive(Error, Debug)]
pub enum LoadError {
    /// The configuration document could not be read or parsed.
    #[error("failed to load document {path}: {reason}")]
    DocumentLoadError {
        /// Path to the document.
        path: String,
        /// Human-readable reason.
        reason: String,
    },

    /// The schema document could not be read or parsed.
    #[error("failed to load schema {path}: {reason}")]
    SchemaLoadError {
        /// Path to the schema.
        path: String,
        /// Human-readable reason.
        reason: String,
    },

    /// The schema's references could not be inlined.
    #[error("failed to resolve schema references in {path}: {source}")]
    Resolve {
        /// Path to the schema.
        path: String,
        /// Underlying resolver error.
        #[source]
        source: ResolveError,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Everything a file-level validation call can fail with.
#[derive(Error, Debug)]
pub enum ConfigCheckError {
    /// The inputs could not be loaded.
    #[error(transparent)]
    Load(#[from] LoadError),

    /// Fail-fast validation stopped at this report.
    #[error(transparent)]
    Violation(#[from] ViolationReport),

    /// Accumulating validation found these reports, in traversal order.
    #[error("{} violation(s) found", .0.len())]
    Violations(Vec<ViolationReport>),
}

impl ConfigCheckError {
    /// The reports carried by this error, empty for load failures.
    pub fn reports(&self) -> &[ViolationReport] {
        match self {
            Self::Load(_) => &[],
            Self::Violation(report) => std::slice::from_ref(report),
            Self::Violations(reports) => reports,
        }
    }
}
