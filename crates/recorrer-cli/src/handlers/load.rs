//! Load command handler

use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::output::ProgressReporter;
use crate::{LoadArgs, ReportFormat};
use console::style;
use recorrer::load::{LoadPlan, LoadReport, LoadRunner};
use std::path::Path;
use std::time::Duration;

/// Execute the load command
pub fn execute_load(config: &CliConfig, args: &LoadArgs) -> CliResult<()> {
    let mut reporter =
        ProgressReporter::new(config.color.should_color(), config.verbosity.is_quiet());

    let plan = LoadPlan::new(&args.host)
        .with_routes(&args.search_path, &args.suggest_path)
        .with_concurrency(args.users)
        .with_duration(Duration::from_secs(args.duration))
        .with_think_time(Duration::from_secs(args.think_time));
    let runner = LoadRunner::new(plan);

    reporter.start_progress(
        args.duration,
        &format!("{} users against {}", args.users, args.host),
    );

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::execution(format!("failed to start async runtime: {e}")))?;
    let report = rt
        .block_on(async {
            let mut handle = tokio::spawn(async move { runner.run().await });
            let mut ticker = tokio::time::interval(Duration::from_secs(1));
            // The first tick completes immediately.
            ticker.tick().await;
            loop {
                tokio::select! {
                    result = &mut handle => break result,
                    _ = ticker.tick() => reporter.increment(1),
                }
            }
        })
        .map_err(|e| CliError::execution(format!("load worker panicked: {e}")))?;
    reporter.finish();

    match args.format {
        ReportFormat::Text => println!("{}", render_load_report(&report, reporter.use_color)),
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    if let Some(path) = &args.output {
        write_report_file(path, &report)?;
        reporter.info(&format!("report written to {}", path.display()));
    }

    if report.failed > 0 {
        reporter.warning(&format!(
            "{} of {} requests failed during the run",
            report.failed, report.total_requests
        ));
    }

    Ok(())
}

/// Render a human-readable load report.
#[must_use]
pub fn render_load_report(report: &LoadReport, use_color: bool) -> String {
    let mut out = format!("Search funnel load: {}\n", report.base_url);
    out.push_str(&format!("Run {} at {}\n\n", report.run_id, report.timestamp));

    let failed_shown = if use_color && report.failed > 0 {
        style(report.failed).red().to_string()
    } else {
        report.failed.to_string()
    };
    out.push_str(&format!("  users       {}\n", report.concurrency));
    out.push_str(&format!("  elapsed     {:.1}s\n", report.elapsed_secs));
    out.push_str(&format!(
        "  requests    {} ({} ok, {failed_shown} failed)\n",
        report.total_requests, report.successful
    ));
    out.push_str(&format!("  throughput  {:.1} req/s\n", report.throughput_rps));
    out.push_str(&format!(
        "  latency     p50 {:.0} ms, p95 {:.0} ms, p99 {:.0} ms\n",
        report.latency_p50_ms, report.latency_p95_ms, report.latency_p99_ms
    ));

    if !report.steps.is_empty() {
        let width = report
            .steps
            .iter()
            .map(|step| step.label.len())
            .max()
            .unwrap_or(0);
        out.push_str("\nSteps\n");
        for step in &report.steps {
            out.push_str(&format!(
                "  {:<width$}  {:>7} reqs  {:>5} failed  p50 {:>5.0} ms  p95 {:>5.0} ms\n",
                step.label, step.requests, step.failed, step.latency_p50_ms, step.latency_p95_ms
            ));
        }
    }

    if !report.journeys.is_empty() {
        let width = report
            .journeys
            .iter()
            .map(|journey| journey.name.len())
            .max()
            .unwrap_or(0);
        out.push_str("\nJourneys\n");
        for journey in &report.journeys {
            out.push_str(&format!(
                "  {:<width$}  {:>7} reqs  {:>5} failed\n",
                journey.name, journey.requests, journey.failed
            ));
        }
    }

    out
}

fn write_report_file(path: &Path, report: &LoadReport) -> CliResult<()> {
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    std::fs::write(path, serde_json::to_string_pretty(report)?)?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use recorrer::load::{JourneyStats, StepStats};

    fn sample_report() -> LoadReport {
        LoadReport {
            run_id: uuid::Uuid::new_v4(),
            timestamp: "2026-08-25T10:30:00Z".to_string(),
            base_url: "https://www.n11.com".to_string(),
            concurrency: 5,
            elapsed_secs: 30.2,
            total_requests: 412,
            successful: 405,
            failed: 7,
            throughput_rps: 13.6,
            latency_p50_ms: 142.0,
            latency_p95_ms: 561.0,
            latency_p99_ms: 902.0,
            steps: vec![
                StepStats {
                    label: "homepage".to_string(),
                    requests: 82,
                    failed: 0,
                    latency_p50_ms: 120.0,
                    latency_p95_ms: 430.0,
                },
                StepStats {
                    label: "search: telefon".to_string(),
                    requests: 64,
                    failed: 3,
                    latency_p50_ms: 210.0,
                    latency_p95_ms: 640.0,
                },
            ],
            journeys: vec![
                JourneyStats {
                    name: "basic_search".to_string(),
                    requests: 180,
                    failed: 2,
                },
                JourneyStats {
                    name: "search_and_paginate".to_string(),
                    requests: 232,
                    failed: 5,
                },
            ],
        }
    }

    #[test]
    fn test_render_load_report_totals() {
        let rendered = render_load_report(&sample_report(), false);

        assert!(rendered.contains("Search funnel load: https://www.n11.com"));
        assert!(rendered.contains("412 (405 ok, 7 failed)"));
        assert!(rendered.contains("13.6 req/s"));
        assert!(rendered.contains("p50 142 ms, p95 561 ms, p99 902 ms"));
    }

    #[test]
    fn test_render_load_report_step_table() {
        let rendered = render_load_report(&sample_report(), false);

        assert!(rendered.contains("Steps"));
        assert!(rendered.contains("homepage"));
        assert!(rendered.contains("search: telefon"));
    }

    #[test]
    fn test_render_load_report_journey_table() {
        let rendered = render_load_report(&sample_report(), false);

        assert!(rendered.contains("Journeys"));
        assert!(rendered.contains("basic_search"));
        assert!(rendered.contains("search_and_paginate"));
    }

    #[test]
    fn test_render_load_report_without_breakdowns() {
        let mut report = sample_report();
        report.steps.clear();
        report.journeys.clear();

        let rendered = render_load_report(&report, false);
        assert!(!rendered.contains("Steps"));
        assert!(!rendered.contains("Journeys"));
    }

    #[test]
    fn test_report_round_trips_through_json() {
        let report = sample_report();
        let json = serde_json::to_string_pretty(&report).unwrap();
        let parsed: LoadReport = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.run_id, report.run_id);
        assert_eq!(parsed.total_requests, 412);
        assert_eq!(parsed.steps.len(), 2);
        assert_eq!(parsed.journeys.len(), 2);
    }

    #[test]
    fn test_write_report_file_creates_parent_dirs() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("reports").join("load.json");

        write_report_file(&path, &sample_report()).unwrap();

        assert!(path.exists());
        let content = std::fs::read_to_string(&path).unwrap();
        let parsed: LoadReport = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed.concurrency, 5);
    }
}
