//! Pages command handler

use crate::config::CliConfig;
use crate::error::CliResult;
use crate::{PagesArgs, ReportFormat};
use console::style;
use recorrer::pages::standard_registry;
use recorrer::PageRegistry;

/// Execute the pages command
pub fn execute_pages(config: &CliConfig, args: &PagesArgs) -> CliResult<()> {
    let registry = standard_registry()?;

    match args.format {
        ReportFormat::Text => {
            println!(
                "{}",
                render_pages_report(&registry, config.color.should_color())
            );
        }
        ReportFormat::Json => println!("{}", render_pages_json(&registry)?),
    }

    Ok(())
}

/// Render the registry as an aligned two-column listing.
#[must_use]
pub fn render_pages_report(registry: &PageRegistry, use_color: bool) -> String {
    let entries = registry.entries();
    let width = entries
        .iter()
        .map(|(name, _)| name.len())
        .max()
        .unwrap_or(0);

    let mut out = format!("Registered page objects ({})\n", entries.len());
    for (name, type_name) in entries {
        let padded = format!("{name:<width$}");
        let shown = if use_color {
            style(padded).cyan().to_string()
        } else {
            padded
        };
        out.push_str(&format!("  {shown}  {type_name}\n"));
    }
    out
}

/// Render the registry as a JSON array of `{name, type}` objects.
pub fn render_pages_json(registry: &PageRegistry) -> CliResult<String> {
    let entries: Vec<serde_json::Value> = registry
        .entries()
        .into_iter()
        .map(|(name, type_name)| {
            serde_json::json!({
                "name": name,
                "type": type_name,
            })
        })
        .collect();

    Ok(serde_json::to_string_pretty(&entries)?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_render_pages_report_lists_all_pages() {
        let registry = standard_registry().unwrap();
        let report = render_pages_report(&registry, false);

        assert!(report.contains("Registered page objects (4)"));
        assert!(report.contains("home_page"));
        assert!(report.contains("careers_page"));
        assert!(report.contains("qa_careers_page"));
        assert!(report.contains("vacancies_page"));
        assert!(report.contains("HomePage"));
        assert!(report.contains("VacanciesPage"));
    }

    #[test]
    fn test_render_pages_report_preserves_registration_order() {
        let registry = standard_registry().unwrap();
        let report = render_pages_report(&registry, false);

        let home = report.find("home_page").unwrap();
        let careers = report.find("careers_page").unwrap();
        let vacancies = report.find("vacancies_page").unwrap();
        assert!(home < careers);
        assert!(careers < vacancies);
    }

    #[test]
    fn test_render_pages_json_is_valid() {
        let registry = standard_registry().unwrap();
        let json = render_pages_json(&registry).unwrap();

        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        let entries = parsed.as_array().unwrap();
        assert_eq!(entries.len(), 4);
        assert_eq!(entries[0]["name"], "home_page");
        assert_eq!(entries[0]["type"], "HomePage");
        assert_eq!(entries[3]["name"], "vacancies_page");
    }

    #[test]
    fn test_execute_pages_text() {
        let config = CliConfig::default();
        let args = PagesArgs {
            format: ReportFormat::Text,
        };
        assert!(execute_pages(&config, &args).is_ok());
    }

    #[test]
    fn test_execute_pages_json() {
        let config = CliConfig::default();
        let args = PagesArgs {
            format: ReportFormat::Json,
        };
        assert!(execute_pages(&config, &args).is_ok());
    }
}
