//! CLI argument definitions for `osi`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use osi_model::CodingSystemMapping;
use osi_store::DEFAULT_VERSION;

#[derive(Parser)]
#[command(
    name = "osi",
    version,
    about = "Open Syndrome case filtering - apply syndrome definitions to case records",
    long_about = "Apply machine-readable syndrome case definitions to tabular case records.\n\n\
                  Definitions are read from a local versioned store and downloaded on demand."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Prefix log lines with a timestamp.
    #[arg(long = "log-timestamps", global = true)]
    pub log_timestamps: bool,

    /// Include the module path of each log event.
    #[arg(long = "log-target", global = true)]
    pub log_target: bool,

    #[command(flatten)]
    pub store: StoreArgs,
}

/// Definition store location and network policy.
#[derive(Args)]
pub struct StoreArgs {
    /// TOML configuration file (defaults to $OSI_CONFIG when set).
    #[arg(long = "config", value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Root of the local definitions tree.
    #[arg(long = "definitions-dir", value_name = "DIR", global = true)]
    pub definitions_dir: Option<PathBuf>,

    /// Local path of the definition schema.
    #[arg(long = "schema-file", value_name = "FILE", global = true)]
    pub schema_file: Option<PathBuf>,

    /// Never download; fail when a definition is not cached locally.
    #[arg(long = "offline", global = true)]
    pub offline: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// List definitions whose name contains a search term.
    Find(FindArgs),

    /// Annotate a CSV case table with one boolean column per definition.
    Filter(FilterArgs),

    /// Show the codes shared by two or more definitions.
    Overlap(OverlapArgs),

    /// Download the definitions repository and/or the schema.
    Fetch(FetchArgs),

    /// Check a definition JSON file against the definition schema.
    Validate(ValidateArgs),
}

#[derive(Parser)]
pub struct FindArgs {
    /// Case-insensitive substring of the definition name.
    #[arg(value_name = "TERM")]
    pub term: String,

    /// Definition version directory.
    #[arg(long = "version", default_value = DEFAULT_VERSION)]
    pub version: String,
}

#[derive(Parser)]
pub struct FilterArgs {
    /// CSV file with one case record per row.
    #[arg(value_name = "CSV")]
    pub input: PathBuf,

    /// Definition to apply (repeatable).
    #[arg(long = "definition", short = 'd', value_name = "NAME", required = true)]
    pub definitions: Vec<String>,

    /// JSON mapping file: [{"system": "ICD-10", "code": "column"}].
    #[arg(long = "mapping", value_name = "FILE", conflicts_with = "map")]
    pub mapping: Option<PathBuf>,

    /// Inline mapping entry SYSTEM=COLUMN (repeatable).
    #[arg(long = "map", value_name = "SYSTEM=COLUMN", required_unless_present = "mapping")]
    pub map: Vec<CodingSystemMapping>,

    /// Definition version directory.
    #[arg(long = "version", default_value = DEFAULT_VERSION)]
    pub version: String,

    /// Write the result to this CSV file instead of stdout.
    #[arg(long = "output", short = 'o', value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Keep only rows matched by at least one definition.
    #[arg(long = "select")]
    pub select: bool,
}

#[derive(Parser)]
pub struct OverlapArgs {
    /// Definitions to compare (at least two).
    #[arg(value_name = "NAME", num_args = 2.., required = true)]
    pub definitions: Vec<String>,

    /// Definition version directory.
    #[arg(long = "version", default_value = DEFAULT_VERSION)]
    pub version: String,
}

#[derive(Parser)]
pub struct FetchArgs {
    /// Download the definitions repository archive.
    #[arg(long = "definitions")]
    pub definitions: bool,

    /// Download the definition schema.
    #[arg(long = "schema")]
    pub schema: bool,
}

impl FetchArgs {
    /// Neither flag means both.
    pub fn targets(&self) -> (bool, bool) {
        if self.definitions || self.schema {
            (self.definitions, self.schema)
        } else {
            (true, true)
        }
    }
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

#[derive(Parser)]
pub struct ValidateArgs {
    /// Definition document to check.
    #[arg(value_name = "JSON_FILE")]
    pub file: PathBuf,
}
