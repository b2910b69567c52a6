//! Basemap drawing: ocean, land, highlighted region and coastline outlines.

use geo::{BoundingRect, LineString, Polygon};
use serde::{Deserialize, Serialize};
use svg::node::element::Path;

use super::canvas::{Paint, PathData, SvgDocument};
use crate::boundary::BoundaryGeometry;
use crate::geoutil::PlateCarree;
use crate::style::Color;

/// Vertices closer than this to the previous one (in points) are dropped
const MIN_VERTEX_SPACING: f64 = 0.05;

/// Colors and line widths of the basemap
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasemapStyle {
    /// Region code drawn in `region_color` above the land layer (e.g. "JPN")
    #[serde(default)]
    pub region: Option<String>,

    #[serde(default = "default_land_color")]
    pub land_color: Color,

    #[serde(default = "default_ocean_color")]
    pub ocean_color: Color,

    /// Defaults to the land color
    #[serde(default)]
    pub region_color: Option<Color>,

    #[serde(default = "default_coastline_color")]
    pub coastline_color: Color,

    #[serde(default = "default_coastline_width")]
    pub coastline_width: f64,
}

impl Default for BasemapStyle {
    fn default() -> Self {
        Self {
            region: None,
            land_color: default_land_color(),
            ocean_color: default_ocean_color(),
            region_color: None,
            coastline_color: default_coastline_color(),
            coastline_width: default_coastline_width(),
        }
    }
}

fn default_land_color() -> Color {
    Color::rgb(0xA9, 0xA9, 0xA9)
}

fn default_ocean_color() -> Color {
    Color::WHITE
}

fn default_coastline_color() -> Color {
    Color::BLACK
}

fn default_coastline_width() -> f64 {
    0.8
}

/// Append one projected line to `d`, dropping vertices that land within
/// `MIN_VERTEX_SPACING` of the previous one. Rings are closed with `close`.
fn project_line(d: &mut PathData, line: &LineString<f64>, proj: &PlateCarree, shift: f64, close: bool) {
    let mut last: Option<(f64, f64)> = None;
    for coord in line.coords() {
        let (x, y) = project_raw(proj, coord.x + shift, coord.y);
        match last {
            None => d.move_to(x, y),
            Some((lx, ly)) => {
                if (x - lx).abs() < MIN_VERTEX_SPACING && (y - ly).abs() < MIN_VERTEX_SPACING {
                    continue;
                }
                d.line_to(x, y);
            }
        }
        last = Some((x, y));
    }
    if close && last.is_some() {
        d.close();
    }
}

// Polygons are shifted as a whole, so no per-vertex unwrapping here.
fn project_raw(proj: &PlateCarree, lon: f64, lat: f64) -> (f64, f64) {
    let extent = &proj.extent;
    let u = (lon - extent.west) / extent.width();
    let v = (lat - extent.south) / extent.height();
    proj.axes.from_axes(u, v)
}

/// Whole-turn longitude shift that brings a geometry's bounding box into the extent
fn shift_into_extent<T: BoundingRect<f64, Output = Option<geo::Rect<f64>>>>(
    geometry: &T,
    proj: &PlateCarree,
) -> Option<f64> {
    let rect = geometry.bounding_rect()?;
    proj.extent
        .overlap_shift(rect.min().x, rect.min().y, rect.max().x, rect.max().y)
}

/// Path data for every polygon that touches the extent
fn polygons_path<'a>(polygons: impl Iterator<Item = &'a Polygon<f64>>, proj: &PlateCarree) -> PathData {
    let mut d = PathData::new();
    for polygon in polygons {
        let Some(shift) = shift_into_extent(polygon, proj) else {
            continue;
        };
        project_line(&mut d, polygon.exterior(), proj, shift, true);
        for interior in polygon.interiors() {
            project_line(&mut d, interior, proj, shift, true);
        }
    }
    d
}

fn filled_layer(class: &str, d: PathData, color: Color) -> Path {
    Paint::fill(color).on(
        Path::new()
            .set("class", class)
            .set("fill-rule", "evenodd")
            .set("d", d.into_data()),
    )
}

/// Draw the basemap layers into `doc`; the caller supplies the clip group
pub fn draw_basemap(
    doc: &mut SvgDocument,
    proj: &PlateCarree,
    geometry: &BoundaryGeometry,
    style: &BasemapStyle,
) {
    doc.rect(&proj.axes, Paint::fill(style.ocean_color));

    let land = polygons_path(
        geometry.countries.iter().flat_map(|c| c.geometry.0.iter()),
        proj,
    );
    doc.push(filled_layer("land", land.clone(), style.land_color));

    if let Some(code) = &style.region {
        let region = polygons_path(
            geometry.region(code).flat_map(|c| c.geometry.0.iter()),
            proj,
        );
        let color = style.region_color.unwrap_or(style.land_color);
        doc.push(filled_layer("region", region, color));
    }

    if style.coastline_width <= 0.0 {
        return;
    }

    let outline = if geometry.coastlines.is_empty() {
        // No coastline layer: outline the land polygons instead
        land
    } else {
        let mut d = PathData::new();
        for line in &geometry.coastlines {
            if let Some(shift) = shift_into_extent(line, proj) {
                project_line(&mut d, line, proj, shift, false);
            }
        }
        d
    };

    doc.push(
        Paint::stroke(style.coastline_color, style.coastline_width).on(
            Path::new()
                .set("class", "coastline")
                .set("stroke-linejoin", "round")
                .set("d", outline.into_data()),
        ),
    );
}
