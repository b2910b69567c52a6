//! Figure rendering.
//!
//! A figure is one page holding one or more map panels. Each panel is drawn in a
//! fixed layer order: ocean, land, highlighted region, coastlines, gridlines and
//! the category markers (all clipped to the map box), then the map frame, tick
//! labels, text annotations and the legend. The page is composed as SVG and then
//! encoded to the requested output format.

pub mod annotation;
pub mod basemap;
pub mod canvas;
pub mod encode;
pub mod gridlines;
pub mod layout;
pub mod legend;
pub mod scatter;

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use svg::node::element::Group;
use tracing::{debug, info};

use crate::boundary::{load_cached, BoundaryGeometry, BoundarySource};
use crate::data_loader::{distinct_categories, PointRecord};
use crate::error::{GeoScatterError, Result};
use crate::geoutil::{Extent, PlateCarree};
use crate::logging::{log_operation_end, log_operation_start, log_timed_operation};
use crate::style::{sort_categories, CategoryStyle, Color, StyleMapping};

pub use annotation::TextAnnotation;
pub use basemap::BasemapStyle;
pub use encode::{FontOptions, OutputFormat};
pub use gridlines::{GridSpec, LabelSides};
pub use layout::{Margins, POINTS_PER_INCH};
pub use legend::{LegendLocation, LegendSpec};
pub use canvas::{FontStyle, FontWeight, HorizontalAlign, VerticalAlign};
pub use scatter::MarkerAppearance;

use canvas::{Paint, SvgDocument};

/// Resolution used when the caller does not pick one
pub const DEFAULT_DPI: f64 = 600.0;

/// Page size of a single-panel figure, in inches
pub const DEFAULT_FIGURE_SIZE: (f64, f64) = (10.0, 6.0);

/// Output settings shared by every figure a renderer produces
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    pub dpi: f64,
    pub format: OutputFormat,
    pub fonts: FontOptions,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            dpi: DEFAULT_DPI,
            format: OutputFormat::Png,
            fonts: FontOptions::default(),
        }
    }
}

/// One map with its data and decorations
#[derive(Debug, Clone)]
pub struct Panel {
    pub extent: Extent,
    pub boundary: Arc<BoundaryGeometry>,
    pub points: Vec<PointRecord>,
    pub style: StyleMapping,
    pub legend: LegendSpec,
    pub annotations: Vec<TextAnnotation>,
    pub basemap: BasemapStyle,
    pub grid: GridSpec,
    pub markers: MarkerAppearance,
}

impl Panel {
    pub fn new(
        extent: Extent,
        boundary: Arc<BoundaryGeometry>,
        points: Vec<PointRecord>,
        style: StyleMapping,
    ) -> Self {
        Self {
            extent,
            boundary,
            points,
            style,
            legend: LegendSpec::default(),
            annotations: Vec::new(),
            basemap: BasemapStyle::default(),
            grid: GridSpec::default(),
            markers: MarkerAppearance::default(),
        }
    }

    /// Categories in draw order, each resolved against the style mapping.
    ///
    /// Fails on the first category without a style entry.
    pub fn categories(&self) -> Result<Vec<(String, &CategoryStyle)>> {
        sort_categories(distinct_categories(&self.points))
            .into_iter()
            .map(|key| {
                let style = self.style.lookup(&key)?;
                Ok((key, style))
            })
            .collect()
    }

    pub fn validate(&self) -> Result<()> {
        self.extent.validate()?;
        for annotation in &self.annotations {
            annotation.validate()?;
        }
        if !self.markers.size.is_finite() || self.markers.size < 0.0 {
            return Err(GeoScatterError::InvalidParameter {
                param: "marker_size".to_string(),
                message: format!("Marker size must be a non-negative area in pt², got {}", self.markers.size),
            });
        }
        if !self.grid.step.is_finite() || self.grid.step <= 0.0 {
            return Err(GeoScatterError::InvalidParameter {
                param: "grid.step".to_string(),
                message: format!("Grid step must be positive, got {}", self.grid.step),
            });
        }
        Ok(())
    }
}

/// A page of panels laid out on a `rows × columns` grid, filled row by row
#[derive(Debug, Clone)]
pub struct Figure {
    pub width_in: f64,
    pub height_in: f64,
    pub rows: usize,
    pub columns: usize,
    pub margins: Margins,
    pub background: Color,
    pub panels: Vec<Panel>,
}

impl Figure {
    pub fn single(panel: Panel) -> Self {
        Self {
            width_in: DEFAULT_FIGURE_SIZE.0,
            height_in: DEFAULT_FIGURE_SIZE.1,
            rows: 1,
            columns: 1,
            margins: Margins::default(),
            background: Color::WHITE,
            panels: vec![panel],
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.width_in.is_finite() && self.height_in.is_finite())
            || self.width_in <= 0.0
            || self.height_in <= 0.0
        {
            return Err(GeoScatterError::InvalidParameter {
                param: "figure_size".to_string(),
                message: format!(
                    "Figure size must be positive, got {} x {} in",
                    self.width_in, self.height_in
                ),
            });
        }
        if self.panels.is_empty() {
            return Err(GeoScatterError::InvalidParameter {
                param: "panels".to_string(),
                message: "A figure needs at least one panel".to_string(),
            });
        }
        if self.rows == 0 || self.columns == 0 || self.panels.len() > self.rows * self.columns {
            return Err(GeoScatterError::InvalidParameter {
                param: "layout".to_string(),
                message: format!(
                    "{} panels do not fit a {} x {} grid",
                    self.panels.len(),
                    self.rows,
                    self.columns
                ),
            });
        }
        for panel in &self.panels {
            panel.validate()?;
        }
        Ok(())
    }
}

/// Renders figures to image bytes or files
#[derive(Debug, Clone, Default)]
pub struct GeoScatterRenderer {
    options: RenderOptions,
}

impl GeoScatterRenderer {
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Compose the page as an SVG document
    pub fn compose_svg(&self, figure: &Figure) -> Result<String> {
        figure.validate()?;

        let width = figure.width_in * POINTS_PER_INCH;
        let height = figure.height_in * POINTS_PER_INCH;
        let mut doc = SvgDocument::new(width, height, &self.options.fonts.family);
        doc.rect(
            &crate::geoutil::AxesBox {
                x: 0.0,
                y: 0.0,
                width,
                height,
            },
            Paint::fill(figure.background),
        );

        let cells = layout::grid_cells(width, height, figure.rows, figure.columns);
        for (index, (panel, cell)) in figure.panels.iter().zip(cells.iter()).enumerate() {
            let axes = layout::fit_axes(cell, &figure.margins, &panel.extent)?;
            let proj = PlateCarree::new(panel.extent, axes);
            draw_panel(&mut doc, index, &proj, panel)?;
        }

        Ok(doc.finish())
    }

    /// Render a figure to bytes in the configured format
    pub fn render_figure(&self, figure: &Figure) -> Result<Vec<u8>> {
        if !self.options.dpi.is_finite() || self.options.dpi <= 0.0 {
            return Err(GeoScatterError::InvalidParameter {
                param: "dpi".to_string(),
                message: format!("DPI must be positive, got {}", self.options.dpi),
            });
        }

        log_timed_operation("render_figure", || {
            let svg = self.compose_svg(figure)?;
            let start = Instant::now();
            let bytes = encode::encode(
                &svg,
                self.options.format,
                self.options.dpi,
                &self.options.fonts,
            );
            debug!(
                format = %self.options.format,
                dpi = self.options.dpi,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "Figure encoded"
            );
            bytes
        })
    }

    /// Render a figure and write it to `path`
    pub fn render_to_file(&self, figure: &Figure, path: &Path) -> Result<()> {
        let start = Instant::now();
        log_operation_start("render_to_file", Some(&path.display().to_string()));

        let result = self
            .render_figure(figure)
            .and_then(|bytes| encode::write_output(path, &bytes));

        log_operation_end("render_to_file", start, result.is_ok());
        result
    }

    /// Render a single panel with default gridlines and markers.
    ///
    /// `basemap` carries the land, ocean and coastline colors along with the
    /// optional highlighted region.
    #[allow(clippy::too_many_arguments)]
    pub fn render(
        &self,
        extent: Extent,
        boundary: &dyn BoundarySource,
        basemap: &BasemapStyle,
        points: &[PointRecord],
        style: &StyleMapping,
        annotations: &[TextAnnotation],
        legend_title: &str,
    ) -> Result<Vec<u8>> {
        extent.validate()?;
        let geometry = load_cached(boundary)?;

        let mut panel = Panel::new(extent, geometry, points.to_vec(), style.clone());
        panel.legend = LegendSpec::titled(legend_title);
        panel.annotations = annotations.to_vec();
        panel.basemap = basemap.clone();

        self.render_figure(&Figure::single(panel))
    }
}

fn draw_panel(doc: &mut SvgDocument, index: usize, proj: &PlateCarree, panel: &Panel) -> Result<()> {
    // Every category must resolve before anything is drawn
    let order = panel.categories()?;

    doc.begin_group(Group::new().set("class", "panel").set("data-panel", index));

    let clip = doc.clip_rect(&proj.axes);
    doc.begin_group(
        Group::new()
            .set("class", "map")
            .set("clip-path", format!("url(#{})", clip)),
    );
    basemap::draw_basemap(doc, proj, &panel.boundary, &panel.basemap);
    gridlines::draw_grid_lines(doc, proj, &panel.grid);
    let drawn = scatter::draw_points(doc, proj, &order, &panel.points, &panel.markers);
    doc.end_group();

    doc.rect(&proj.axes, Paint::stroke(Color::BLACK, 0.8));
    gridlines::draw_grid_labels(doc, proj, &panel.grid);
    annotation::draw_annotations(doc, &proj.axes, &panel.annotations);
    legend::draw_legend(doc, &proj.axes, &panel.legend, &order, &panel.markers);

    doc.end_group();

    info!(
        panel = index,
        extent = %proj.extent,
        categories = order.len(),
        points = panel.points.len(),
        drawn = drawn,
        outside_extent = panel.points.len() - drawn,
        "Panel composed"
    );
    Ok(())
}
