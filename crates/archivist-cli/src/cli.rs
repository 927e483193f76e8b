//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Output format for command results.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Plain text for terminals.
    #[default]
    Human,
    /// A single JSON document.
    Json,
}

const SETTINGS_HELP: &str = "\
Settings flags go before the command:
  --config-path <PATH>               TOML settings file
  --plugin-dir <DIR>                 Directory scanned for archives
  --extension <EXT>                  Archive file extension
  --minimum-format-version <N>       Oldest accepted archive format
  --current-format-version <N>       Newest accepted archive format
  --log-filter <FILTER>              tracing filter expression
  --log-format <json|compact>        Log output format
Each also reads from ARCHIVIST_<NAME> in the environment.";

/// Inspects plugin archives the way the host loader sees them.
#[derive(Parser, Debug)]
#[command(
    name = "archivist",
    version,
    disable_help_subcommand = true,
    after_help = SETTINGS_HELP
)]
pub(crate) struct Cli {
    /// Command to run.
    #[command(subcommand)]
    pub(crate) command: Command,
}

/// Subcommands.
#[derive(Subcommand, Debug, Clone)]
pub(crate) enum Command {
    /// Lists the plugins found in the plugin directory.
    List {
        /// Output format.
        #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
        format: OutputFormat,
    },
    /// Reads a single plugin archive and describes it.
    Inspect {
        /// Archive to inspect.
        #[arg(value_name = "FILE")]
        file: PathBuf,
        /// Output format.
        #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
        format: OutputFormat,
    },
}
