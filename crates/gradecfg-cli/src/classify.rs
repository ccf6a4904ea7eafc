//! # Classify Subcommand
//!
//! Prints how each testcase entry is classified (submission limit, file
//! check, or regular), without validating anything else. Useful when a
//! testcase is unexpectedly held to the regular-testcase schema.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use gradecfg_schema::{
    load_document, load_schema, InlineRefResolver, PiecewiseValidator, SchemaDraft,
    TestcaseSummary, ValidationOptions,
};

use crate::{DraftArg, EXIT_LOAD_ERROR, EXIT_OK, EXIT_VIOLATION};

/// Arguments for the `gradecfg classify` subcommand.
#[derive(Args, Debug)]
pub struct ClassifyArgs {
    /// Configuration file (JSON, or YAML by extension).
    #[arg(value_name = "CONFIG")]
    pub config: PathBuf,

    /// Complete configuration schema.
    #[arg(long, short)]
    pub schema: PathBuf,

    /// Emit a JSON array instead of a table.
    #[arg(long)]
    pub json: bool,

    /// Schema dialect; defaults to the schema's `$schema`, else draft 7.
    #[arg(long, value_enum)]
    pub draft: Option<DraftArg>,
}

/// Execute the classify subcommand, writing the listing to stdout.
pub fn run_classify(args: &ClassifyArgs) -> Result<u8> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    run_classify_to(args, &mut out)
}

/// Execute the classify subcommand, writing the listing to `out`.
pub fn run_classify_to(args: &ClassifyArgs, out: &mut impl Write) -> Result<u8> {
    let draft = args.draft.map(SchemaDraft::from);
    let resolver = draft.map_or_else(InlineRefResolver::new, InlineRefResolver::with_draft);
    let loaded = load_schema(&args.schema, &resolver)
        .and_then(|schema| load_document(&args.config).map(|config| (config, schema)));
    let (config, schema) = match loaded {
        Ok(inputs) => inputs,
        Err(e) => {
            eprintln!("ERROR: {e}");
            return Ok(EXIT_LOAD_ERROR);
        }
    };

    let options = ValidationOptions { warn: false, draft };
    let validator = PiecewiseValidator::for_schema(options, &schema);
    let summaries = match validator.classify_testcases(&config, &schema) {
        Ok(summaries) => summaries,
        Err(report) => {
            report.eprint();
            return Ok(EXIT_VIOLATION);
        }
    };

    if args.json {
        let json = serde_json::to_string_pretty(&summaries)
            .context("failed to serialize classification")?;
        writeln!(out, "{json}")?;
    } else {
        write_table(&summaries, out)?;
    }
    Ok(EXIT_OK)
}

fn write_table(summaries: &[TestcaseSummary], out: &mut impl Write) -> Result<()> {
    let width = summaries
        .iter()
        .map(|s| s.label.len())
        .max()
        .unwrap_or(0);
    for s in summaries {
        let kind = s.kind.to_string();
        match &s.title {
            Some(title) => writeln!(out, "{:<width$}  {kind:<16}  {title}", s.label)?,
            None => writeln!(out, "{:<width$}  {kind}", s.label)?,
        }
    }
    Ok(())
}
