//! osm_mosaic CLI application
//!
//! Downloads the OpenStreetMap tiles covering an area and merges them into
//! one PNG. Exits with 0 on success, 1 on any error and 42 when cancelled
//! by Ctrl-C or SIGTERM.

use std::process;

use tracing::info;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::{fmt, EnvFilter};

use osm_mosaic::app::SessionStatus;
use osm_mosaic::cli::{handle_run, Cli};
use osm_mosaic::config::AppConfig;
use osm_mosaic::constants::exit_codes;
use osm_mosaic::errors::{AppError, Result};

#[tokio::main]
async fn main() {
    match run().await {
        Ok(SessionStatus::Completed) => {}
        Ok(SessionStatus::Cancelled) => process::exit(exit_codes::CANCELLED),
        Err(e) => {
            eprintln!("Error: {}", e);
            let mut source = std::error::Error::source(&e);
            while let Some(cause) = source {
                eprintln!("  caused by: {}", cause);
                source = cause.source();
            }
            process::exit(exit_codes::FAILURE);
        }
    }
}

/// Main application logic
async fn run() -> Result<SessionStatus> {
    let cli = Cli::parse_args();

    if cli.print_config {
        print!("{}", AppConfig::generate_default_config_content());
        return Ok(SessionStatus::Completed);
    }

    let config = AppConfig::load(cli.config.clone()).await?;
    init_logging(&cli, &config)?;

    info!("osm_mosaic v{} starting", env!("CARGO_PKG_VERSION"));
    handle_run(&cli, &config).await
}

/// Initialize logging from the configured level and CLI verbosity flags
fn init_logging(cli: &Cli, config: &AppConfig) -> Result<()> {
    let log_level = cli.log_level(config.logging.level()?);

    let directive: Directive = format!("osm_mosaic={}", log_level)
        .parse()
        .map_err(|e| AppError::generic(format!("Invalid log directive: {}", e)))?;
    let filter = EnvFilter::from_default_env().add_directive(directive);

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(cli.very_verbose)
        .with_writer(std::io::stderr)
        .init();

    if cli.very_verbose {
        info!("Very verbose logging enabled");
    } else if cli.verbose {
        info!("Verbose logging enabled");
    }
    Ok(())
}
