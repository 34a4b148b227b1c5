//! Command handler for the osm_mosaic CLI
//!
//! Resolves the area to fetch from the arguments or the prompt, merges
//! command-line flags over the loaded configuration and runs the
//! coordinator with signal handling and a progress display attached.

use tracing::{debug, info};

use crate::app::geo::{validate_zoom, GeoBoundingBox};
use crate::app::{
    create_shutdown_channel, progress_channel, Coordinator, RunConfig, SessionStatus,
    SignalHandler, TileClient,
};
use crate::cli::{prompt_area, Cli, ProgressDisplay};
use crate::config::AppConfig;
use crate::errors::{AppError, Result};

/// Fetch and merge the requested area
///
/// Returns how the run ended; errors are fatal for the process.
pub async fn handle_run(cli: &Cli, config: &AppConfig) -> Result<SessionStatus> {
    if !cli.quiet {
        eprintln!("osm_mosaic version {}", env!("CARGO_PKG_VERSION"));
    }

    let (bbox, zoom) = resolve_area(cli, config).await?;
    let run_config = apply_overrides(config.to_run_config(bbox, Some(zoom)), cli);
    if !cli.quiet {
        print_run_config(&run_config);
    }
    debug!(?run_config, "Resolved run configuration");

    let client = TileClient::with_config(&config.to_client_config())?;

    let (shutdown_tx, shutdown_rx) = create_shutdown_channel();
    let signal_task = SignalHandler::new(shutdown_tx).setup();

    let (reporter, event_rx) = progress_channel();
    let display_task = ProgressDisplay::new(cli.quiet).spawn(event_rx);

    let mut coordinator = Coordinator::new(run_config, client).with_progress(reporter);
    let result = coordinator.run(shutdown_rx).await;

    // Closing the progress channel lets the display drain and stop
    drop(coordinator);
    if let Err(e) = display_task.await {
        debug!("Progress display task failed: {}", e);
    }
    signal_task.abort();

    let session = result?;
    info!("{}", session.summary());
    Ok(session.status)
}

/// Area from the positional arguments, or from the prompt if none were given
async fn resolve_area(cli: &Cli, config: &AppConfig) -> Result<(GeoBoundingBox, u8)> {
    if let Some((longitude, latitude)) = cli.coordinates() {
        let bbox = GeoBoundingBox::from_ranges(longitude, latitude)?;
        let zoom = validate_zoom(cli.zoom.unwrap_or(config.tiles.default_zoom))?;
        return Ok((bbox, zoom));
    }

    let default_zoom = config.tiles.default_zoom;
    let area = tokio::task::spawn_blocking(move || {
        let stdin = std::io::stdin();
        let mut input = stdin.lock();
        let mut output = std::io::stderr();
        prompt_area(&mut input, &mut output, default_zoom)
    })
    .await
    .map_err(|e| AppError::generic(format!("Prompt task failed: {}", e)))??;

    Ok((area.bbox, area.zoom))
}

/// Command-line flags take precedence over the configuration file
fn apply_overrides(mut run_config: RunConfig, cli: &Cli) -> RunConfig {
    if let Some(cache) = &cli.cache {
        run_config.cache_dir = cache.clone();
    }
    if let Some(output) = &cli.output {
        run_config.output = output.clone();
    }
    if cli.keep_cache {
        run_config.keep_cache = true;
    }
    run_config
}

fn print_run_config(run_config: &RunConfig) {
    if run_config.keep_cache {
        eprintln!("Keeping cached files");
    }
    eprintln!("Area      : {}", run_config.bbox);
    eprintln!("Zoom      : {}", run_config.zoom);
    eprintln!("Cache     : {}", run_config.cache_dir.display());
    eprintln!("Output    : {}", run_config.output.display());
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use clap::Parser;

    use super::*;
    use crate::errors::BoundsError;

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("osm_mosaic").chain(args.iter().copied())).unwrap()
    }

    #[tokio::test]
    async fn test_resolve_area_from_arguments() {
        let config = AppConfig::default();
        let (bbox, zoom) = resolve_area(&cli(&["11.1-11.0", "46.0-46.1", "14"]), &config)
            .await
            .unwrap();

        assert_eq!(zoom, 14);
        assert_eq!(bbox.lon_min(), 11.0);
        assert_eq!(bbox.lon_max(), 11.1);
    }

    #[tokio::test]
    async fn test_resolve_area_uses_configured_zoom() {
        let mut config = AppConfig::default();
        config.tiles.default_zoom = 7;
        let (_, zoom) = resolve_area(&cli(&["11.5", "48.1"]), &config).await.unwrap();
        assert_eq!(zoom, 7);
    }

    #[tokio::test]
    async fn test_resolve_area_rejects_bad_input() {
        let config = AppConfig::default();

        let result = resolve_area(&cli(&["200", "48.1"]), &config).await;
        assert!(matches!(
            result,
            Err(AppError::Bounds(BoundsError::LongitudeOutOfRange { .. }))
        ));

        let result = resolve_area(&cli(&["11.5", "48.1", "25"]), &config).await;
        assert!(matches!(
            result,
            Err(AppError::Bounds(BoundsError::InvalidZoom { .. }))
        ));
    }

    #[test]
    fn test_flags_override_config() {
        let mut config = AppConfig::default();
        config.cache.dir = PathBuf::from("/from/config");
        let bbox = GeoBoundingBox::point(1.0, 1.0).unwrap();

        let run = apply_overrides(
            config.to_run_config(bbox, None),
            &cli(&["-c", "/from/flag", "-o", "map.png", "-k", "1", "1"]),
        );
        assert_eq!(run.cache_dir, PathBuf::from("/from/flag"));
        assert_eq!(run.output, PathBuf::from("map.png"));
        assert!(run.keep_cache);

        let run = apply_overrides(config.to_run_config(bbox, None), &cli(&["1", "1"]));
        assert_eq!(run.cache_dir, PathBuf::from("/from/config"));
        assert!(!run.keep_cache);
    }
}
