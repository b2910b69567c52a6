//! Free-text labels placed in normalized axes coordinates.

use serde::{Deserialize, Serialize};
use svg::node::element::Group;

use super::canvas::{FontStyle, FontWeight, HorizontalAlign, SvgDocument, TextStyle, VerticalAlign};
use crate::error::{GeoScatterError, Result};
use crate::geoutil::AxesBox;
use crate::style::Color;

/// A text label anchored relative to the axes box.
///
/// `x` and `y` are fractions of the box (0 = left/bottom, 1 = right/top) and may
/// fall outside it, which is how axis titles and panel letters are placed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextAnnotation {
    pub text: String,
    pub x: f64,
    pub y: f64,

    /// Degrees, counter-clockwise
    #[serde(default)]
    pub rotation: f64,

    #[serde(default = "default_color")]
    pub color: Color,

    #[serde(default = "default_size")]
    pub size: f64,

    #[serde(default)]
    pub weight: FontWeight,

    #[serde(default)]
    pub style: FontStyle,

    #[serde(default)]
    pub ha: HorizontalAlign,

    #[serde(default)]
    pub va: VerticalAlign,
}

fn default_color() -> Color {
    Color::BLACK
}

fn default_size() -> f64 {
    10.0
}

impl TextAnnotation {
    pub fn new(text: &str, x: f64, y: f64) -> Self {
        Self {
            text: text.to_string(),
            x,
            y,
            rotation: 0.0,
            color: default_color(),
            size: default_size(),
            weight: FontWeight::Normal,
            style: FontStyle::Normal,
            ha: HorizontalAlign::Center,
            va: VerticalAlign::Bottom,
        }
    }

    pub fn size(mut self, size: f64) -> Self {
        self.size = size;
        self
    }

    pub fn color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn rotation(mut self, degrees: f64) -> Self {
        self.rotation = degrees;
        self
    }

    pub fn bold(mut self) -> Self {
        self.weight = FontWeight::Bold;
        self
    }

    pub fn italic(mut self) -> Self {
        self.style = FontStyle::Italic;
        self
    }

    pub fn align(mut self, ha: HorizontalAlign, va: VerticalAlign) -> Self {
        self.ha = ha;
        self.va = va;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !self.x.is_finite() || !self.y.is_finite() || !self.rotation.is_finite() {
            return Err(GeoScatterError::InvalidParameter {
                param: "annotation".to_string(),
                message: format!("Annotation '{}' has a non-finite position", self.text),
            });
        }
        if self.size.is_nan() || self.size <= 0.0 {
            return Err(GeoScatterError::InvalidParameter {
                param: "annotation".to_string(),
                message: format!("Annotation '{}' must have a positive font size", self.text),
            });
        }
        Ok(())
    }

    fn text_style(&self) -> TextStyle {
        TextStyle {
            size: self.size,
            color: self.color,
            weight: self.weight,
            style: self.style,
            ha: self.ha,
            va: self.va,
            rotation: self.rotation,
        }
    }
}

/// Place every annotation relative to `axes`
pub fn draw_annotations(doc: &mut SvgDocument, axes: &AxesBox, annotations: &[TextAnnotation]) {
    if annotations.is_empty() {
        return;
    }
    doc.begin_group(Group::new().set("class", "annotations"));
    for annotation in annotations {
        let (x, y) = axes.from_axes(annotation.x, annotation.y);
        doc.text(x, y, &annotation.text, &annotation.text_style());
    }
    doc.end_group();
}
