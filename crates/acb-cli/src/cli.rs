//! CLI argument definitions for the panel builder.

use std::path::PathBuf;

use acb_model::Granularity;
use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "acb-panel",
    version,
    about = "Anticholinergic burden panel builder",
    long_about = "Build subject-by-period anticholinergic burden panels from prescription \
                  events.\n\n\
                  Aggregates events into monthly and yearly grids, joins demographics and \
                  visit-based covariates, and censors each subject to their presence window."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
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
    /// Build the censored month and/or year panels.
    Panel(PanelArgs),

    /// Derive presence windows from the prescription log and mortality table.
    Presence(PresenceArgs),

    /// Harmonize the anticholinergic scales into one combined table.
    Scales(ScalesArgs),
}

/// Options shared by commands that read the pipeline configuration.
#[derive(Args, Clone, Default)]
pub struct ConfigArgs {
    /// TOML configuration file (defaults apply when omitted).
    #[arg(long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Directory holding the input tables (overrides the config).
    #[arg(long = "data-dir", value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Directory for written tables (overrides the config).
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,
}

#[derive(Args, Clone)]
pub struct PanelArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Panels to build.
    #[arg(long = "granularity", value_enum, default_value = "both")]
    pub granularity: GranularityArg,

    /// Field separator of the panel tables (overrides the config).
    #[arg(long = "separator", value_name = "CHAR")]
    pub separator: Option<char>,
}

#[derive(Args, Clone)]
pub struct PresenceArgs {
    #[command(flatten)]
    pub config: ConfigArgs,
}

#[derive(Args, Clone)]
pub struct ScalesArgs {
    /// Folder containing the eleven scale tables.
    #[arg(value_name = "SCALES_DIR")]
    pub scales_dir: PathBuf,

    /// Brand to generic name table (default: <SCALES_DIR>/alternative drug names_reformatted.csv).
    #[arg(long = "names", value_name = "FILE")]
    pub names: Option<PathBuf>,

    /// Combined output table (default: <SCALES_DIR>/aas_combined.csv).
    #[arg(long = "output", value_name = "FILE")]
    pub output: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum GranularityArg {
    Month,
    Year,
    Both,
}

impl GranularityArg {
    pub fn granularities(self) -> Vec<Granularity> {
        match self {
            GranularityArg::Month => vec![Granularity::Month],
            GranularityArg::Year => vec![Granularity::Year],
            GranularityArg::Both => Granularity::ALL.to_vec(),
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
