//! Categorical point layer.

use serde::{Deserialize, Serialize};
use svg::node::element::{Group, Path};

use super::canvas::{translate, Paint, SvgDocument};
use crate::data_loader::PointRecord;
use crate::geoutil::PlateCarree;
use crate::style::{CategoryStyle, Color};

/// How data markers are sized and outlined.
///
/// `size` is the marker area in pt², so the glyph spans `sqrt(size)` points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarkerAppearance {
    #[serde(default = "default_size")]
    pub size: f64,

    #[serde(default = "default_edge_color")]
    pub edge_color: Color,

    #[serde(default = "default_edge_width")]
    pub edge_width: f64,

    /// Stroke width of unfilled glyphs such as `+` and `x`
    #[serde(default = "default_line_width")]
    pub line_width: f64,
}

impl Default for MarkerAppearance {
    fn default() -> Self {
        Self {
            size: default_size(),
            edge_color: default_edge_color(),
            edge_width: default_edge_width(),
            line_width: default_line_width(),
        }
    }
}

fn default_size() -> f64 {
    36.0
}

fn default_edge_color() -> Color {
    Color::BLACK
}

fn default_edge_width() -> f64 {
    0.5
}

fn default_line_width() -> f64 {
    1.0
}

impl MarkerAppearance {
    /// Glyph diameter in points
    pub fn diameter(&self) -> f64 {
        self.size.max(0.0).sqrt()
    }

    /// Fill and stroke of one category's glyphs
    pub fn paint(&self, style: &CategoryStyle) -> Paint {
        if style.marker.is_filled() {
            Paint::new(Some(style.color), Some((self.edge_color, self.edge_width)))
        } else {
            Paint::stroke(style.color, self.line_width)
        }
    }
}

/// Draw one group per category, in the given order, and return how many points
/// landed inside the extent.
///
/// Points outside the extent are skipped; everything here sits inside the axes clip.
pub fn draw_points(
    doc: &mut SvgDocument,
    proj: &PlateCarree,
    order: &[(String, &CategoryStyle)],
    points: &[PointRecord],
    appearance: &MarkerAppearance,
) -> usize {
    let glyph_size = appearance.diameter();
    let mut drawn = 0;

    for (category, style) in order {
        let glyph = style.marker.path_data(glyph_size);
        doc.begin_group(
            appearance
                .paint(style)
                .on(Group::new().set("class", "category").set("data-category", category.as_str())),
        );
        for point in points.iter().filter(|p| &p.category == category) {
            if !proj.extent.contains(point.longitude, point.latitude) {
                continue;
            }
            let (x, y) = proj.project(point.longitude, point.latitude);
            doc.push(
                Path::new()
                    .set("d", glyph.clone().into_data())
                    .set("transform", translate(x, y)),
            );
            drawn += 1;
        }
        doc.end_group();
    }

    drawn
}
