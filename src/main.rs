//! geoscatter - categorical scatter maps over a coastline basemap
//!
//! This is the main entry point for the geoscatter command.

use tracing::{error, info};

use geoscatter::logging::{init_tracing, log_error};
use geoscatter::{pipeline, Config, Result};

fn main() -> Result<()> {
    // Load configuration
    let config = Config::load().map_err(|e| {
        init_tracing("info");
        log_error(&e, "loading configuration");
        e
    })?;

    init_tracing(&config.log_level);
    info!("Starting geoscatter v{}", env!("CARGO_PKG_VERSION"));

    // Validate configuration
    config.validate().map_err(|e| {
        error!("Invalid configuration: {}", e);
        e
    })?;

    info!(
        panels = config.panels.len(),
        natural_earth_dir = %config.natural_earth_dir().display(),
        "Rendering figure"
    );

    let output = pipeline::run(&config).map_err(|e| {
        log_error(&e, "rendering figure");
        e
    })?;

    info!("Figure saved to {}", output.display());
    Ok(())
}
