//! # Validate Subcommand
//!
//! Piecewise validation of one configuration file against one schema file.
//! Reports go to stderr; the one-line verdict goes to stdout.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use gradecfg_schema::{
    validate_files, validate_files_all, ConfigCheckError, InlineRefResolver, SchemaDraft,
    ValidationOptions,
};

use crate::{DraftArg, EXIT_LOAD_ERROR, EXIT_OK, EXIT_VIOLATION};

/// Arguments for the `gradecfg validate` subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Configuration file (JSON, or YAML by extension).
    #[arg(value_name = "CONFIG")]
    pub config: PathBuf,

    /// Complete configuration schema.
    #[arg(long, short)]
    pub schema: PathBuf,

    /// Warn about optional keys missing from the configuration.
    #[arg(long)]
    pub warn: bool,

    /// Report every violation instead of stopping at the first.
    #[arg(long)]
    pub all_errors: bool,

    /// Schema dialect; defaults to the schema's `$schema`, else draft 7.
    #[arg(long, value_enum)]
    pub draft: Option<DraftArg>,
}

/// Execute the validate subcommand.
///
/// Returns exit code: 0 on success, 1 on violations, 2 on load errors.
pub fn run_validate(args: &ValidateArgs) -> Result<u8> {
    let draft = args.draft.map(SchemaDraft::from);
    let resolver = draft.map_or_else(InlineRefResolver::new, InlineRefResolver::with_draft);
    let options = ValidationOptions {
        warn: args.warn,
        draft,
    };
    tracing::info!(draft = ?options.draft, warn = options.warn, "validating {}", args.config.display());

    let outcome = if args.all_errors {
        validate_files_all(&args.config, &args.schema, &resolver, options)
    } else {
        validate_files(&args.config, &args.schema, &resolver, options)
    };

    let err = match outcome {
        Ok(()) => {
            println!("OK: {}", args.config.display());
            return Ok(EXIT_OK);
        }
        Err(ConfigCheckError::Load(e)) => {
            eprintln!("ERROR: {e}");
            return Ok(EXIT_LOAD_ERROR);
        }
        Err(err) => err,
    };

    for report in err.reports() {
        report.eprint();
    }
    println!(
        "FAIL: {} — {} violation(s)",
        args.config.display(),
        err.reports().len()
    );
    Ok(EXIT_VIOLATION)
}
