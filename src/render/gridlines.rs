//! Latitude/longitude reference lines and their degree tick labels.

use serde::{Deserialize, Serialize};
use svg::node::element::{Group, Path};

use super::canvas::{fmt_num, HorizontalAlign, Paint, PathData, SvgDocument, TextStyle, VerticalAlign};
use crate::geoutil::{format_latitude, format_longitude, tick_locations, PlateCarree};
use crate::style::Color;

/// Gap between the axes frame and tick labels, in points
const LABEL_PAD: f64 = 4.0;

/// Which sides of the axes box carry tick labels; all four by default
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelSides {
    #[serde(default = "enabled")]
    pub top: bool,
    #[serde(default = "enabled")]
    pub bottom: bool,
    #[serde(default = "enabled")]
    pub left: bool,
    #[serde(default = "enabled")]
    pub right: bool,
}

impl Default for LabelSides {
    fn default() -> Self {
        Self {
            top: true,
            bottom: true,
            left: true,
            right: true,
        }
    }
}

fn enabled() -> bool {
    true
}

/// Gridline placement and appearance.
///
/// Ticks run from the start value (defaulting to the extent's west/south edge) in
/// `step` increments, stopping before the east/north edge. A zero line width hides
/// the lines but keeps the labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridSpec {
    #[serde(default = "default_step")]
    pub step: f64,

    #[serde(default)]
    pub lon_start: Option<f64>,

    #[serde(default)]
    pub lat_start: Option<f64>,

    #[serde(default)]
    pub line_width: f64,

    #[serde(default = "default_line_color")]
    pub line_color: Color,

    #[serde(default = "enabled")]
    pub dashed: bool,

    #[serde(default = "default_label_size")]
    pub label_size: f64,

    #[serde(default)]
    pub labels: LabelSides,
}

impl Default for GridSpec {
    fn default() -> Self {
        Self {
            step: default_step(),
            lon_start: None,
            lat_start: None,
            line_width: 0.0,
            line_color: default_line_color(),
            dashed: true,
            label_size: default_label_size(),
            labels: LabelSides::default(),
        }
    }
}

fn default_step() -> f64 {
    5.0
}

fn default_line_color() -> Color {
    Color::BLACK
}

fn default_label_size() -> f64 {
    10.0
}

impl GridSpec {
    pub fn longitudes(&self, proj: &PlateCarree) -> Vec<f64> {
        let start = self.lon_start.unwrap_or(proj.extent.west);
        tick_locations(start, proj.extent.east, self.step)
            .into_iter()
            .filter(|lon| *lon >= proj.extent.west)
            .collect()
    }

    pub fn latitudes(&self, proj: &PlateCarree) -> Vec<f64> {
        let start = self.lat_start.unwrap_or(proj.extent.south);
        tick_locations(start, proj.extent.north, self.step)
            .into_iter()
            .filter(|lat| *lat >= proj.extent.south)
            .collect()
    }
}

/// Draw the reference lines; call inside the axes clip group
pub fn draw_grid_lines(doc: &mut SvgDocument, proj: &PlateCarree, grid: &GridSpec) {
    if grid.line_width <= 0.0 {
        return;
    }

    let axes = &proj.axes;
    let mut d = PathData::new();
    for lon in grid.longitudes(proj) {
        let (x, _) = proj.project(lon, proj.extent.south);
        d.move_to(x, axes.y);
        d.line_to(x, axes.bottom());
    }
    for lat in grid.latitudes(proj) {
        let (_, y) = proj.project(proj.extent.west, lat);
        d.move_to(axes.x, y);
        d.line_to(axes.right(), y);
    }

    let mut path = Paint::stroke(grid.line_color, grid.line_width).on(
        Path::new()
            .set("class", "gridlines")
            .set("d", d.into_data()),
    );
    if grid.dashed {
        path = path.set(
            "stroke-dasharray",
            format!(
                "{} {}",
                fmt_num(grid.line_width * 3.7),
                fmt_num(grid.line_width * 1.6)
            ),
        );
    }
    doc.push(path);
}

/// Draw tick labels around the axes box; call outside the clip group
pub fn draw_grid_labels(doc: &mut SvgDocument, proj: &PlateCarree, grid: &GridSpec) {
    let axes = proj.axes;
    let sides = grid.labels;
    doc.begin_group(Group::new().set("class", "grid-labels"));

    for lon in grid.longitudes(proj) {
        let (x, _) = proj.project(lon, proj.extent.south);
        let label = format_longitude(lon);
        if sides.bottom {
            let style = TextStyle::new(grid.label_size)
                .align(HorizontalAlign::Center, VerticalAlign::Top);
            doc.text(x, axes.bottom() + LABEL_PAD, &label, &style);
        }
        if sides.top {
            let style = TextStyle::new(grid.label_size)
                .align(HorizontalAlign::Center, VerticalAlign::Bottom);
            doc.text(x, axes.y - LABEL_PAD, &label, &style);
        }
    }

    for lat in grid.latitudes(proj) {
        let (_, y) = proj.project(proj.extent.west, lat);
        let label = format_latitude(lat);
        if sides.left {
            let style = TextStyle::new(grid.label_size)
                .align(HorizontalAlign::Right, VerticalAlign::Center);
            doc.text(axes.x - LABEL_PAD, y, &label, &style);
        }
        if sides.right {
            let style = TextStyle::new(grid.label_size)
                .align(HorizontalAlign::Left, VerticalAlign::Center);
            doc.text(axes.right() + LABEL_PAD, y, &label, &style);
        }
    }

    doc.end_group();
}
