//! Recorrer CLI Library
//!
//! Command-line interface for the recorrer acceptance harness: page object
//! inspection, the pet store API conformance suite, and the search funnel
//! load plan.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::format_push_string)] // String building is clear and correct
#![allow(clippy::missing_errors_doc)] // Error types are self-documenting

mod commands;
mod config;
mod error;
pub mod handlers;
mod output;

pub use commands::{
    ApiArgs, Cli, ColorArg, Commands, LoadArgs, PagesArgs, ReportFormat,
};
pub use config::{CliConfig, ColorChoice, Verbosity};
pub use error::{CliError, CliResult};
pub use handlers::{
    execute_api, execute_load, execute_pages, render_api_report, render_load_report,
    render_pages_json, render_pages_report,
};
pub use output::ProgressReporter;
