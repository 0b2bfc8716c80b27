//! CLI argument definitions for the DBF tool.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "dbf-tool",
    version,
    about = "Inspect, convert and re-encode dBASE (DBF) tables",
    long_about = "Inspect, convert and re-encode dBASE (DBF) tables.\n\n\
                  Reads damaged headers where possible, converts to and from CSV,\n\
                  and handles legacy code pages such as windows-1251 and cp866."
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
}

#[derive(Subcommand)]
pub enum Command {
    /// Show header, fields, diagnostics and the first rows of a table.
    Inspect(InspectArgs),

    /// Convert a DBF table to UTF-8 CSV.
    Export(ExportArgs),

    /// Convert a CSV file to a DBF table.
    Import(ImportArgs),

    /// Re-encode the text of a DBF table into another code page.
    Recode(RecodeArgs),

    /// Print or save the field layout of a DBF table.
    Fields(FieldsArgs),

    /// Guess the code page of a DBF table.
    Detect(DetectArgs),

    /// List supported code page labels.
    Encodings,
}

/// Code page of the DBF being read.
#[derive(Args)]
pub struct EncodingArg {
    /// Code page label (e.g. windows-1251, cp866, koi8-u). Detected when omitted.
    #[arg(long = "encoding", short = 'e', value_name = "LABEL")]
    pub encoding: Option<String>,
}

#[derive(Parser)]
pub struct InspectArgs {
    /// DBF file to inspect.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    #[command(flatten)]
    pub encoding: EncodingArg,

    /// Number of rows to show.
    #[arg(long = "rows", short = 'n', default_value_t = 10)]
    pub rows: usize,
}

#[derive(Parser)]
pub struct ExportArgs {
    /// DBF file to export.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// CSV file to write.
    #[arg(long = "output", short = 'o', value_name = "PATH")]
    pub output: PathBuf,

    #[command(flatten)]
    pub encoding: EncodingArg,
}

#[derive(Parser)]
pub struct ImportArgs {
    /// UTF-8 CSV file with a header line.
    #[arg(value_name = "CSV")]
    pub file: PathBuf,

    /// DBF file to write.
    #[arg(long = "output", short = 'o', value_name = "PATH")]
    pub output: PathBuf,

    /// Code page for the written table.
    #[arg(long = "encoding", short = 'e', value_name = "LABEL", default_value = "utf-8")]
    pub encoding: String,

    /// Make every inferred column C(20) instead of guessing types.
    #[arg(long = "no-detect")]
    pub no_detect: bool,

    /// Field layout as JSON (as written by `fields --output`).
    #[arg(long = "fields", value_name = "LAYOUT", conflicts_with = "fields_from")]
    pub fields: Option<PathBuf>,

    /// Reuse the field layout of an existing DBF table.
    #[arg(long = "fields-from", value_name = "DBF")]
    pub fields_from: Option<PathBuf>,
}

#[derive(Parser)]
pub struct RecodeArgs {
    /// DBF file to re-encode.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Code page the table is written in now.
    #[arg(long = "from", value_name = "LABEL")]
    pub from: String,

    /// Code page to write.
    #[arg(long = "to", value_name = "LABEL")]
    pub to: String,

    /// DBF file to write.
    #[arg(long = "output", short = 'o', value_name = "PATH")]
    pub output: PathBuf,
}

#[derive(Parser)]
pub struct FieldsArgs {
    /// DBF file to read.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    #[command(flatten)]
    pub encoding: EncodingArg,

    /// Save the layout as JSON instead of printing a table.
    #[arg(long = "output", short = 'o', value_name = "PATH")]
    pub output: Option<PathBuf>,
}

#[derive(Parser)]
pub struct DetectArgs {
    /// DBF file to examine.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,
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
