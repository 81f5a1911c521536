//! Api command handler

use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::output::ProgressReporter;
use crate::{ApiArgs, ReportFormat};
use console::style;
use recorrer::api::{PetSuite, SuiteConfig, SuiteReport};
use std::path::Path;
use std::time::Duration;

/// Execute the api command
pub fn execute_api(config: &CliConfig, args: &ApiArgs) -> CliResult<()> {
    let reporter = ProgressReporter::new(config.color.should_color(), config.verbosity.is_quiet());

    let suite = PetSuite::new(
        SuiteConfig::default()
            .with_base_url(&args.base_url)
            .with_api_key(&args.api_key)
            .with_fail_fast(args.fail_fast || config.fail_fast),
    );

    reporter.info(&format!("running conformance checks against {}", args.base_url));

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::execution(format!("failed to start async runtime: {e}")))?;
    let report = rt.block_on(suite.run());

    match args.format {
        ReportFormat::Text => println!("{}", render_api_report(&report, reporter.use_color)),
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    if let Some(path) = &args.output {
        write_report_file(path, &report)?;
        reporter.info(&format!("report written to {}", path.display()));
    }

    reporter.summary(
        report.passed(),
        report.failed(),
        Duration::from_secs_f64(report.elapsed_secs),
    );

    if report.all_passed() {
        Ok(())
    } else {
        Err(CliError::execution(format!(
            "{} conformance check(s) failed",
            report.failed()
        )))
    }
}

/// Render a human-readable conformance report.
#[must_use]
pub fn render_api_report(report: &SuiteReport, use_color: bool) -> String {
    let width = report
        .checks
        .iter()
        .map(|check| check.name.len())
        .max()
        .unwrap_or(0);

    let mut out = format!("Pet store conformance: {}\n", report.base_url);
    out.push_str(&format!(
        "Run {} started {}\n\n",
        report.run_id, report.started_at
    ));

    for check in &report.checks {
        let mark = if check.passed {
            if use_color {
                style("✓").green().to_string()
            } else {
                "PASS".to_string()
            }
        } else if use_color {
            style("✗").red().to_string()
        } else {
            "FAIL".to_string()
        };
        out.push_str(&format!(
            "{mark} {:<width$}  {:>5} ms  {}\n",
            check.name, check.elapsed_ms, check.detail
        ));
    }

    out.push_str(&format!(
        "\n{}/{} checks passed in {:.2}s\n",
        report.passed(),
        report.checks.len(),
        report.elapsed_secs
    ));
    out
}

fn write_report_file(path: &Path, report: &SuiteReport) -> CliResult<()> {
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    std::fs::write(path, serde_json::to_string_pretty(report)?)?;
    Ok(())
}
