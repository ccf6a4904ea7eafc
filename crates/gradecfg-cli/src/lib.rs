//! # gradecfg-cli — Command-Line Interface
//!
//! Provides the `gradecfg` binary on top of `gradecfg-schema`.
//!
//! ## Subcommands
//!
//! - `gradecfg validate`: piecewise validation of a configuration.
//! - `gradecfg classify`: show how each testcase is classified.
//!
//! ```bash
//! gradecfg validate config.json --schema complete_config_schema.json --warn
//! gradecfg validate config.json --schema complete_config_schema.json --all-errors
//! gradecfg classify config.json --schema complete_config_schema.json --json
//! ```
//!
//! ## Exit Codes
//!
//! - `0`: the configuration is valid.
//! - `1`: the configuration (or schema) violates the contract; the reports
//!   have been rendered to stderr.
//! - `2`: an input could not be loaded.

pub mod classify;
pub mod validate;

use clap::ValueEnum;
use gradecfg_schema::SchemaDraft;

/// Exit code for a valid configuration.
pub const EXIT_OK: u8 = 0;
/// Exit code when violation reports were produced.
pub const EXIT_VIOLATION: u8 = 1;
/// Exit code when inputs could not be loaded.
pub const EXIT_LOAD_ERROR: u8 = 2;

/// `--draft` values.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftArg {
    /// JSON Schema draft 4.
    #[value(name = "4")]
    Draft4,
    /// JSON Schema draft 6.
    #[value(name = "6")]
    Draft6,
    /// JSON Schema draft 7.
    #[value(name = "7")]
    Draft7,
    /// JSON Schema 2019-09.
    #[value(name = "2019-09")]
    Draft201909,
    /// JSON Schema 2020-12.
    #[value(name = "2020-12")]
    Draft202012,
}

impl From<DraftArg> for SchemaDraft {
    fn from(arg: DraftArg) -> Self {
        match arg {
            DraftArg::Draft4 => SchemaDraft::Draft4,
            DraftArg::Draft6 => SchemaDraft::Draft6,
            DraftArg::Draft7 => SchemaDraft::Draft7,
            DraftArg::Draft201909 => SchemaDraft::Draft201909,
            DraftArg::Draft202012 => SchemaDraft::Draft202012,
        }
    }
}
