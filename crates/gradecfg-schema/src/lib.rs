//! # gradecfg-schema — Piecewise Configuration Validation
//!
//! Validates an autograding configuration against its JSON Schema one
//! piece at a time, so a malformed configuration is pinned to the
//! sub-object that violates its sub-schema rather than reported as one
//! opaque top-level failure.
//!
//! ## Pieces
//!
//! - [`chunk`]: picks the `(config, schema)` pair for a key; tells a
//!   missing schema entry (schema defect) from a missing config entry
//!   (vacuously valid).
//! - [`matcher`]: the single-object primitive, backed by `jsonschema`.
//! - [`classify`]: decides whether a testcase is a submission limit, a
//!   file check, or a regular testcase, first match wins.
//! - [`piecewise`]: the driver: global keys, each testcase, then the
//!   whole document, in a fixed order.
//! - [`error`]: [`ViolationReport`] and its terminal rendering.
//! - [`resolve`]: inlines local `$ref`s once, before validation.
//! - [`load`]: reads JSON/YAML documents from disk.
//!
//! ## Example
//!
//! ```no_run
//! use std::path::Path;
//! use gradecfg_schema::{validate_files, InlineRefResolver, ValidationOptions};
//!
//! let result = validate_files(
//!     Path::new("config.json"),
//!     Path::new("complete_config_schema.json"),
//!     &InlineRefResolver::new(),
//!     ValidationOptions { warn: true, ..Default::default() },
//! );
//! if let Err(err) = result {
//!     for report in err.reports() {
//!         report.eprint();
//!     }
//!     std::process::exit(1);
//! }
//! ```
//!
//! ## Crate Policy
//!
//! - Inputs are read-only; every call is independent.
//! - Absence of an optional configuration chunk is never an error.
//! - Reports are rendered to stderr only.

pub mod chunk;
pub mod classify;
pub mod error;
pub mod load;
pub mod matcher;
pub mod piecewise;
pub mod resolve;

pub use chunk::{descriptive_title, Chunk};
pub use classify::{Candidate, Classification, Disambiguator, Rejection, TestcaseKind};
pub use error::{
    ConfigCheckError, ConstraintViolation, LoadError, MatchError, ReportKind, ResolveError,
    ViolationReport,
};
pub use load::{effective_draft, load_document, load_schema, validate_files, validate_files_all};
pub use matcher::{JsonSchemaMatcher, Matcher, SchemaDraft};
pub use piecewise::{
    PiecewiseValidator, TestcaseSummary, ValidationOptions, GLOBAL_KEYS, TESTCASE_KEYS,
    WHOLE_CONFIG_TITLE,
};
pub use resolve::{InlineRefResolver, SchemaResolver};
