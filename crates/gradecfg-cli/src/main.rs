//! # gradecfg CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use gradecfg_cli::classify::{run_classify, ClassifyArgs};
use gradecfg_cli::validate::{run_validate, ValidateArgs};

/// Piecewise validation of autograding configurations.
///
/// Checks a configuration against its JSON Schema one sub-object at a
/// time and reports exactly which part is malformed.
#[derive(Parser, Debug)]
#[command(name = "gradecfg", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate a configuration against its schema.
    Validate(ValidateArgs),

    /// Show how each testcase is classified.
    Classify(ClassifyArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // `warn` keeps the missing-key warnings visible by default.
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Validate(args) => run_validate(&args),
        Commands::Classify(args) => run_classify(&args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(gradecfg_cli::EXIT_LOAD_ERROR)
        }
    }
}
