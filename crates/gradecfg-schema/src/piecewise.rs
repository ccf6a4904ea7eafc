//! # Piecewise Validation
//!
//! Walks a grading configuration's known substructure in a fixed order,
//! validating each named sub-chunk against its sub-schema, and finally
//! validates the whole document against the whole schema.
//!
//! ## Traversal Order
//!
//! 1. Global keys: [`GLOBAL_KEYS`] against the root `properties`.
//! 2. Each entry of `testcases`, in document order:
//!    - classify it (submission limit, file check, regular); classified
//!      entries get no further checks;
//!    - regular entries: [`TESTCASE_KEYS`] against the testcase
//!      `properties`, every `containers` and `solution_containers`
//!      element against `definitions.container`, every `validation`
//!      element against both `abstract_validation_object` and
//!      `validator_definitions`, then the entry as a whole.
//! 3. The whole configuration against the whole schema.
//!
//! The order is fixed so error messages are reproducible. The final
//! whole-document pass always runs; it is what catches constraints the
//! piecewise steps do not decompose, such as unexpected top-level keys.
//!
//! ## Failure Modes
//!
//! [`PiecewiseValidator::validate`] stops at the first report.
//! [`PiecewiseValidator::validate_all`] keeps going and returns every
//! report in traversal order. Schema defects stop both.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::chunk::{self, descriptive_title, schema_fragment, Chunk};
use crate::classify::{Disambiguator, TestcaseKind};
use crate::error::{MatchError, ViolationReport};
use crate::load::effective_draft;
use crate::matcher::{JsonSchemaMatcher, Matcher, SchemaDraft};

/// Top-level keys checked individually, in this order.
pub const GLOBAL_KEYS: [&str; 4] = [
    "autograding",
    "autograding_method",
    "container_options",
    "resource_limits",
];

/// Per-testcase keys checked individually, in this order.
pub const TESTCASE_KEYS: [&str; 13] = [
    "dispatcher_actions",
    "actions",
    "points",
    "type",
    "pre_commands",
    "single_port_per_container",
    "use_router",
    "title",
    "hidden",
    "extra_credit",
    "input_generation_commands",
    "executable_name",
    "testcase_label",
];

/// Title used for the final whole-document pass.
pub const WHOLE_CONFIG_TITLE: &str = "Your config json";

const GLOBAL_PREFIX: &str = "global";

/// Knobs for a validation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationOptions {
    /// Log a warning for every optional chunk missing from the config.
    /// Never changes the outcome.
    pub warn: bool,
    /// Dialect schema fragments are compiled as. `None` defers to the
    /// schema's `$schema` (see [`PiecewiseValidator::for_schema`]), else
    /// Draft 7.
    pub draft: Option<SchemaDraft>,
}

/// One testcase as seen by the classifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestcaseSummary {
    /// 1-based position in `testcases`.
    pub index: usize,
    /// Label used in report titles, e.g. `testcase_3`.
    pub label: String,
    /// Classified kind.
    pub kind: TestcaseKind,
    /// The entry's `title`, when it has a string one.
    pub title: Option<String>,
}

/// Where the walk is. Threaded by value; nothing is shared across calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct WalkContext {
    testcase_index: usize,
}

impl WalkContext {
    fn start() -> Self {
        Self { testcase_index: 1 }
    }

    fn label(self) -> String {
        format!("testcase_{}", self.testcase_index)
    }

    fn advance(self) -> Self {
        Self {
            testcase_index: self.testcase_index + 1,
        }
    }
}

/// Where non-conformance reports go.
enum Sink {
    FailFast,
    Collect(Vec<ViolationReport>),
}

impl Sink {
    fn report(&mut self, report: ViolationReport) -> Result<(), ViolationReport> {
        match self {
            Self::FailFast => Err(report),
            Self::Collect(reports) => {
                reports.push(report);
                Ok(())
            }
        }
    }

    fn into_reports(self) -> Vec<ViolationReport> {
        match self {
            Self::FailFast => Vec::new(),
            Self::Collect(reports) => reports,
        }
    }
}

/// The schema fragments the walk needs, looked up once.
struct SchemaFragments<'s> {
    properties: &'s Value,
    testcase: &'s Value,
    testcase_properties: &'s Value,
    submission_limit: &'s Value,
    filecheck: &'s Value,
    container: &'s Value,
    abstract_validation: &'s Value,
    validator_definitions: &'s Value,
}

impl<'s> SchemaFragments<'s> {
    fn lookup(schema: &'s Value) -> Result<Self, ViolationReport> {
        let properties = schema_fragment(schema, "properties", "properties")?;
        let definitions = schema_fragment(schema, "definitions", "definitions")?;
        let def = |key: &str| schema_fragment(definitions, key, &descriptive_title("definitions", key));

        let testcase = def("testcase")?;
        let testcase_properties =
            schema_fragment(testcase, "properties", "definitions testcase properties")?;

        Ok(Self {
            properties,
            testcase,
            testcase_properties,
            submission_limit: def("submission_limit")?,
            filecheck: def("filecheck")?,
            container: def("container")?,
            abstract_validation: def("abstract_validation_object")?,
            validator_definitions: def("validator_definitions")?,
        })
    }
}

/// Drives piecewise validation of one configuration against one schema.
///
/// Stateless between calls: validating the same pair twice gives the
/// same outcome.
#[derive(Debug, Clone)]
pub struct PiecewiseValidator<M = JsonSchemaMatcher> {
    matcher: M,
    options: ValidationOptions,
}

impl PiecewiseValidator<JsonSchemaMatcher> {
    /// A validator using the `jsonschema`-backed matcher. An unset
    /// `options.draft` means Draft 7.
    pub fn new(options: ValidationOptions) -> Self {
        Self {
            matcher: JsonSchemaMatcher::new(options.draft.unwrap_or_default()),
            options,
        }
    }

    /// A validator for `schema`: an unset `options.draft` is taken from the
    /// schema's `$schema`, else Draft 7.
    pub fn for_schema(options: ValidationOptions, schema: &Value) -> Self {
        let draft = effective_draft(options.draft, schema);
        Self::new(ValidationOptions {
            draft: Some(draft),
            ..options
        })
    }
}

impl Default for PiecewiseValidator<JsonSchemaMatcher> {
    fn default() -> Self {
        Self::new(ValidationOptions::default())
    }
}

impl<M: Matcher> PiecewiseValidator<M> {
    /// A validator using a custom matcher. `options.draft` is ignored.
    pub fn with_matcher(matcher: M, options: ValidationOptions) -> Self {
        Self { matcher, options }
    }

    /// The options this validator runs with.
    pub fn options(&self) -> ValidationOptions {
        self.options
    }

    /// Validate `config` against `schema`, stopping at the first failure.
    ///
    /// `schema` must already have its references resolved.
    ///
    /// # Errors
    ///
    /// The first [`ViolationReport`] in traversal order.
    pub fn validate(&self, config: &Value, schema: &Value) -> Result<(), ViolationReport> {
        let mut sink = Sink::FailFast;
        self.walk(config, schema, &mut sink)
    }

    /// Validate `config` against `schema`, collecting every failure.
    ///
    /// Returns the reports in traversal order; empty means valid. A schema
    /// defect ends the walk and is the last report.
    pub fn validate_all(&self, config: &Value, schema: &Value) -> Vec<ViolationReport> {
        let mut sink = Sink::Collect(Vec::new());
        let outcome = self.walk(config, schema, &mut sink);
        let mut reports = sink.into_reports();
        if let Err(defect) = outcome {
            reports.push(defect);
        }
        reports
    }

    /// Validate the chunk under `key` (or the whole value for an empty
    /// key) against the matching schema chunk.
    ///
    /// # Errors
    ///
    /// A schema defect if `schema` has no entry for `key`; a
    /// non-conformance report if the config chunk is present and invalid.
    pub fn validate_chunk(
        &self,
        config: &Value,
        schema: &Value,
        key: &str,
        prefix: &str,
    ) -> Result<(), ViolationReport> {
        self.check_key(Some(config), schema, key, prefix, &mut Sink::FailFast)
    }

    /// Classify every testcase without validating anything else.
    ///
    /// # Errors
    ///
    /// A schema defect if the schema lacks the fragments classification
    /// needs.
    pub fn classify_testcases(
        &self,
        config: &Value,
        schema: &Value,
    ) -> Result<Vec<TestcaseSummary>, ViolationReport> {
        let fragments = SchemaFragments::lookup(schema)?;
        let disambiguator = Disambiguator::standard(fragments.submission_limit, fragments.filecheck);

        let mut ctx = WalkContext::start();
        let mut summaries = Vec::new();
        for entry in testcases(config) {
            let label = ctx.label();
            let classification = disambiguator.classify(entry, &self.matcher, &label)?;
            summaries.push(TestcaseSummary {
                index: ctx.testcase_index,
                label,
                kind: classification.kind,
                title: entry.get("title").and_then(Value::as_str).map(str::to_string),
            });
            ctx = ctx.advance();
        }
        Ok(summaries)
    }

    fn walk(&self, config: &Value, schema: &Value, sink: &mut Sink) -> Result<(), ViolationReport> {
        let fragments = SchemaFragments::lookup(schema)?;

        for key in GLOBAL_KEYS {
            self.check_key(Some(config), fragments.properties, key, GLOBAL_PREFIX, sink)?;
        }

        let disambiguator = Disambiguator::standard(fragments.submission_limit, fragments.filecheck);
        let mut ctx = WalkContext::start();
        for entry in testcases(config) {
            let label = ctx.label();
            let classification = disambiguator.classify(entry, &self.matcher, &label)?;
            tracing::debug!(testcase = %label, kind = %classification.kind, "classified testcase");
            if classification.kind == TestcaseKind::Regular {
                self.check_regular_testcase(entry, &fragments, &label, sink)?;
            }
            ctx = ctx.advance();
        }

        self.check_key(Some(config), schema, "", WHOLE_CONFIG_TITLE, sink)
    }

    fn check_regular_testcase(
        &self,
        entry: &Value,
        fragments: &SchemaFragments<'_>,
        label: &str,
        sink: &mut Sink,
    ) -> Result<(), ViolationReport> {
        for key in TESTCASE_KEYS {
            self.check_key(Some(entry), fragments.testcase_properties, key, label, sink)?;
        }

        for list in ["containers", "solution_containers"] {
            for (i, container) in sub_list(entry, list).iter().enumerate() {
                let prefix = format!("{label} {list}[{i}]");
                self.check_key(Some(container), fragments.container, "", &prefix, sink)?;
            }
        }

        for (i, validator) in sub_list(entry, "validation").iter().enumerate() {
            let prefix = format!("{label} validation[{i}]");
            self.check_key(Some(validator), fragments.abstract_validation, "", &prefix, sink)?;
            self.check_key(Some(validator), fragments.validator_definitions, "", &prefix, sink)?;
        }

        self.check_key(Some(entry), fragments.testcase, "", label, sink)
    }

    fn check_key(
        &self,
        config: Option<&Value>,
        schema: &Value,
        key: &str,
        prefix: &str,
        sink: &mut Sink,
    ) -> Result<(), ViolationReport> {
        let title = descriptive_title(prefix, key);
        let (config, schema) = match chunk::resolve(config, schema, key, &title, self.options.warn)? {
            Chunk::Present { config, schema } => (config, schema),
            Chunk::Absent => return Ok(()),
        };

        match self.matcher.check(config, schema) {
            Ok(()) => Ok(()),
            Err(MatchError::Mismatch(violation)) => {
                tracing::debug!(%title, "{violation}");
                sink.report(ViolationReport::non_conformance(title, config, schema, violation))
            }
            Err(MatchError::InvalidSchema { reason }) => {
                Err(ViolationReport::invalid_schema(title, schema, &reason))
            }
        }
    }
}

/// The configuration's testcase entries; none when absent or not a list.
fn testcases(config: &Value) -> &[Value] {
    sub_list(config, "testcases")
}

fn sub_list<'a>(parent: &'a Value, key: &str) -> &'a [Value] {
    match parent.get(key) {
        Some(Value::Array(items)) => items.as_slice(),
        Some(Value::Null) | None => &[],
        Some(_) => {
            // Left to the enclosing whole-chunk pass to report.
            tracing::debug!(key, "not a list; skipping per-element checks");
            &[]
        }
    }
}
