//! From a validated configuration to a written figure.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

use crate::boundary::{load_cached, BoundaryGeometry};
use crate::config::{Config, PanelConfig};
use crate::data_loader::load_points;
use crate::error::Result;
use crate::logging::{log_operation_end, log_operation_start};
use crate::render::{Figure, GeoScatterRenderer, Panel, RenderOptions};

/// Renderer settings taken from the configuration
pub fn render_options(config: &Config) -> RenderOptions {
    RenderOptions {
        dpi: config.output.dpi,
        format: config.output_format(),
        fonts: config.fonts.clone(),
    }
}

fn panel_boundary(config: &Config, panel: &PanelConfig) -> Result<Arc<BoundaryGeometry>> {
    let natural_earth_dir = config.natural_earth_dir();
    let countries = load_cached(panel.basemap.boundary.to_source(&natural_earth_dir)?.as_ref())?;

    match panel.basemap.coastline_layer() {
        Some(spec) => {
            let coastline = load_cached(spec.to_source(&natural_earth_dir)?.as_ref())?;
            Ok(Arc::new(countries.merged(&coastline)))
        }
        None => Ok(countries),
    }
}

/// Load every panel's points and boundaries into a figure
pub fn build_figure(config: &Config) -> Result<Figure> {
    let mut panels = Vec::with_capacity(config.panels.len());

    for (index, panel_config) in config.panels.iter().enumerate() {
        let extent = config.panel_extent(index)?;
        let points = load_points(&panel_config.data, &panel_config.columns)?;
        let boundary = panel_boundary(config, panel_config)?;

        let mut panel = Panel::new(extent, boundary, points, panel_config.style.clone());
        panel.legend = panel_config.legend.clone();
        panel.annotations = panel_config.annotations.clone();
        panel.basemap = panel_config.basemap.style.clone();
        panel.grid = panel_config.grid.clone();
        panel.markers = panel_config.markers;
        panels.push(panel);
    }

    let figure = &config.figure;
    Ok(Figure {
        width_in: figure.width_in,
        height_in: figure.height_in,
        rows: figure.rows,
        columns: figure.columns,
        margins: figure.margins,
        background: figure.background,
        panels,
    })
}

/// Render the configured figure and return the path written
pub fn run(config: &Config) -> Result<PathBuf> {
    let start = Instant::now();
    log_operation_start("figure", Some(&format!("{} panel(s)", config.panels.len())));

    let result = build_figure(config).and_then(|figure| {
        let output = config.output_path();
        let renderer = GeoScatterRenderer::new(render_options(config));
        renderer.render_to_file(&figure, &output)?;
        info!(
            path = %output.display(),
            format = %renderer.options().format,
            dpi = renderer.options().dpi,
            "Figure written"
        );
        Ok(output)
    });

    log_operation_end("figure", start, result.is_ok());
    result
}
