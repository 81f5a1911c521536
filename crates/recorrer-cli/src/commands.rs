//! CLI command definitions using clap

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Recorredor: CLI for the recorrer browser-funnel acceptance harness
#[derive(Parser, Debug)]
#[command(name = "recorredor")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the registered page objects
    Pages(PagesArgs),

    /// Run the pet store API conformance suite
    Api(ApiArgs),

    /// Run the search funnel load plan
    Load(LoadArgs),
}

/// Arguments for the pages command
#[derive(Parser, Debug)]
pub struct PagesArgs {
    /// Output format
    #[arg(short, long, default_value = "text")]
    pub format: ReportFormat,
}

/// Arguments for the api command
#[derive(Parser, Debug)]
pub struct ApiArgs {
    /// Base URL of the API under test
    #[arg(long, default_value = recorrer::api::DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Key sent in the `api_key` header for authenticated deletes
    #[arg(long, default_value = "special-key")]
    pub api_key: String,

    /// Stop at the first failed check
    #[arg(long)]
    pub fail_fast: bool,

    /// Output format
    #[arg(short, long, default_value = "text")]
    pub format: ReportFormat,

    /// Write the JSON report to this file
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for the load command
#[derive(Parser, Debug)]
pub struct LoadArgs {
    /// Base URL of the site under load (scheme and host)
    #[arg(long)]
    pub host: String,

    /// Number of concurrent simulated users
    #[arg(short, long, default_value = "5")]
    pub users: usize,

    /// Run duration in seconds
    #[arg(short, long, default_value = "30")]
    pub duration: u64,

    /// Pause between user actions in seconds
    #[arg(long, default_value = "2")]
    pub think_time: u64,

    /// Relative path of the search results page
    #[arg(long, default_value = "/arama")]
    pub search_path: String,

    /// Relative path of the auto-suggest endpoint
    #[arg(long, default_value = "/arama/tamamla")]
    pub suggest_path: String,

    /// Output format
    #[arg(short, long, default_value = "text")]
    pub format: ReportFormat,

    /// Write the JSON report to this file
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Report output format
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ReportFormat {
    /// Human-readable text
    #[default]
    Text,
    /// JSON
    Json,
}

/// Color output argument
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum ColorArg {
    /// Automatic color detection
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl From<ColorArg> for crate::config::ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}
