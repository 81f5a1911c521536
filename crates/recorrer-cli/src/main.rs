//! Recorrer CLI: acceptance harness runner
//!
//! ## Usage
//!
//! ```bash
//! recorredor pages                          # List registered page objects
//! recorredor api                            # Pet store conformance suite
//! recorredor api --format json -o api.json  # Machine-readable report
//! recorredor load --host https://www.n11.com -u 10 -d 60
//! ```

use clap::Parser;
use recorrer_cli::{
    execute_api, execute_load, execute_pages, Cli, CliConfig, CliResult, ColorChoice, Commands,
    Verbosity,
};
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> CliResult<()> {
    let cli = Cli::parse();

    // Build configuration from CLI args
    let config = build_config(&cli);
    init_tracing(config.verbosity);

    match cli.command {
        Commands::Pages(args) => execute_pages(&config, &args),
        Commands::Api(args) => execute_api(&config, &args),
        Commands::Load(args) => execute_load(&config, &args),
    }
}

fn build_config(cli: &Cli) -> CliConfig {
    let verbosity = if cli.quiet {
        Verbosity::Quiet
    } else {
        match cli.verbose {
            0 => Verbosity::Normal,
            1 => Verbosity::Verbose,
            _ => Verbosity::Debug,
        }
    };

    let color: ColorChoice = cli.color.clone().into();

    CliConfig::new().with_verbosity(verbosity).with_color(color)
}

const fn default_filter(verbosity: Verbosity) -> &'static str {
    match verbosity {
        Verbosity::Quiet => "recorrer=error",
        Verbosity::Normal => "recorrer=warn",
        Verbosity::Verbose => "recorrer=info",
        Verbosity::Debug => "recorrer=debug",
    }
}

fn init_tracing(verbosity: Verbosity) {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter(verbosity))),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_build_config_defaults() {
        let cli = Cli::parse_from(["recorredor", "pages"]);
        let config = build_config(&cli);

        assert_eq!(config.verbosity, Verbosity::Normal);
        assert_eq!(config.color, ColorChoice::Auto);
        assert!(!config.fail_fast);
    }

    #[test]
    fn test_build_config_quiet_wins_over_verbose() {
        let cli = Cli::parse_from(["recorredor", "-q", "-vv", "pages"]);
        assert_eq!(build_config(&cli).verbosity, Verbosity::Quiet);
    }

    #[test]
    fn test_build_config_verbosity_levels() {
        let cli = Cli::parse_from(["recorredor", "-v", "pages"]);
        assert_eq!(build_config(&cli).verbosity, Verbosity::Verbose);

        let cli = Cli::parse_from(["recorredor", "-vvv", "pages"]);
        assert_eq!(build_config(&cli).verbosity, Verbosity::Debug);
    }

    #[test]
    fn test_build_config_color_never() {
        let cli = Cli::parse_from(["recorredor", "--color", "never", "pages"]);
        assert_eq!(build_config(&cli).color, ColorChoice::Never);
    }

    #[test]
    fn test_default_filter_per_verbosity() {
        assert_eq!(default_filter(Verbosity::Quiet), "recorrer=error");
        assert_eq!(default_filter(Verbosity::Normal), "recorrer=warn");
        assert_eq!(default_filter(Verbosity::Verbose), "recorrer=info");
        assert_eq!(default_filter(Verbosity::Debug), "recorrer=debug");
    }
}
