//! Category legend.
//!
//! One entry per category in draw order. Glyphs use a fixed marker area so the
//! legend stays uniform whatever size the data markers are plotted at. Spacing is
//! expressed in multiples of the label font size.

use serde::{Deserialize, Serialize};
use svg::node::element::{Group, Path};

use super::canvas::{
    estimate_text_width, translate, FontWeight, HorizontalAlign, Paint, SvgDocument, TextStyle,
    VerticalAlign,
};
use super::scatter::MarkerAppearance;
use crate::geoutil::AxesBox;
use crate::style::{CategoryStyle, Color};

const BORDER_PAD: f64 = 0.4;
const ROW_HEIGHT: f64 = 1.5;
const HANDLE_LENGTH: f64 = 2.0;
const HANDLE_TEXT_PAD: f64 = 0.8;
const TITLE_HEIGHT: f64 = 1.4;

/// Which corner of the legend box sits on the anchor point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LegendLocation {
    UpperLeft,
    UpperRight,
    LowerLeft,
    #[default]
    LowerRight,
    Center,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegendSpec {
    #[serde(default)]
    pub title: String,

    #[serde(default = "enabled")]
    pub show: bool,

    /// Anchor point in axes coordinates
    #[serde(default = "default_anchor")]
    pub anchor: [f64; 2],

    #[serde(default)]
    pub loc: LegendLocation,

    #[serde(default = "default_title_size")]
    pub title_size: f64,

    #[serde(default = "default_label_size")]
    pub label_size: f64,

    /// Glyph area in pt², replacing the data marker size
    #[serde(default = "default_marker_size")]
    pub marker_size: f64,

    #[serde(default = "default_face_color")]
    pub face_color: Color,

    #[serde(default = "default_edge_color")]
    pub edge_color: Color,

    #[serde(default = "default_frame_alpha")]
    pub frame_alpha: f64,
}

impl Default for LegendSpec {
    fn default() -> Self {
        Self {
            title: String::new(),
            show: true,
            anchor: default_anchor(),
            loc: LegendLocation::default(),
            title_size: default_title_size(),
            label_size: default_label_size(),
            marker_size: default_marker_size(),
            face_color: default_face_color(),
            edge_color: default_edge_color(),
            frame_alpha: default_frame_alpha(),
        }
    }
}

fn enabled() -> bool {
    true
}

fn default_anchor() -> [f64; 2] {
    [0.98, 0.02]
}

fn default_title_size() -> f64 {
    10.0
}

fn default_label_size() -> f64 {
    8.0
}

fn default_marker_size() -> f64 {
    30.0
}

fn default_face_color() -> Color {
    Color::WHITE
}

fn default_edge_color() -> Color {
    Color::BLACK
}

fn default_frame_alpha() -> f64 {
    0.8
}

impl LegendSpec {
    pub fn titled(title: &str) -> Self {
        Self {
            title: title.to_string(),
            ..Default::default()
        }
    }

    /// Size of the legend box for the given entry labels
    pub fn box_size<S: AsRef<str>>(&self, labels: &[S]) -> (f64, f64) {
        let em = self.label_size;
        let widest_label = labels
            .iter()
            .map(|l| estimate_text_width(l.as_ref(), em, FontWeight::Normal))
            .fold(0.0, f64::max);
        let title_w = estimate_text_width(&self.title, self.title_size, FontWeight::Bold);
        let title_h = if self.title.is_empty() {
            0.0
        } else {
            self.title_size * TITLE_HEIGHT
        };

        let width = 2.0 * BORDER_PAD * em
            + title_w.max((HANDLE_LENGTH + HANDLE_TEXT_PAD) * em + widest_label);
        let height = 2.0 * BORDER_PAD * em + title_h + labels.len() as f64 * ROW_HEIGHT * em;
        (width, height)
    }

    /// Legend box placed against its anchor point
    pub fn placement<S: AsRef<str>>(&self, axes: &AxesBox, labels: &[S]) -> AxesBox {
        let (width, height) = self.box_size(labels);
        let (px, py) = axes.from_axes(self.anchor[0], self.anchor[1]);
        let (x, y) = match self.loc {
            LegendLocation::UpperLeft => (px, py),
            LegendLocation::UpperRight => (px - width, py),
            LegendLocation::LowerLeft => (px, py - height),
            LegendLocation::LowerRight => (px - width, py - height),
            LegendLocation::Center => (px - width / 2.0, py - height / 2.0),
        };
        AxesBox {
            x,
            y,
            width,
            height,
        }
    }

    fn frame_color(&self, color: Color) -> Color {
        let [r, g, b, a] = color.rgba();
        let alpha = (a as f64 * self.frame_alpha.clamp(0.0, 1.0)).round() as u8;
        Color([r, g, b, alpha])
    }
}

/// Draw the legend for `entries` (category key and style, in draw order)
pub fn draw_legend(
    doc: &mut SvgDocument,
    axes: &AxesBox,
    spec: &LegendSpec,
    entries: &[(String, &CategoryStyle)],
    appearance: &MarkerAppearance,
) {
    if !spec.show || entries.is_empty() {
        return;
    }

    let labels: Vec<&str> = entries.iter().map(|(key, _)| key.as_str()).collect();
    let frame = spec.placement(axes, &labels);
    let em = spec.label_size;

    doc.begin_group(Group::new().set("class", "legend"));
    doc.rect(
        &frame,
        Paint::new(
            Some(spec.frame_color(spec.face_color)),
            Some((spec.frame_color(spec.edge_color), 0.8)),
        ),
    );

    let mut y = frame.y + BORDER_PAD * em;
    if !spec.title.is_empty() {
        let style = TextStyle::new(spec.title_size)
            .bold()
            .align(HorizontalAlign::Center, VerticalAlign::Top);
        doc.text(frame.x + frame.width / 2.0, y, &spec.title, &style);
        y += spec.title_size * TITLE_HEIGHT;
    }

    let glyph_appearance = MarkerAppearance {
        size: spec.marker_size,
        ..*appearance
    };
    let glyph_x = frame.x + BORDER_PAD * em + HANDLE_LENGTH * em / 2.0;
    let label_x = frame.x + BORDER_PAD * em + (HANDLE_LENGTH + HANDLE_TEXT_PAD) * em;
    let label_style =
        TextStyle::new(spec.label_size).align(HorizontalAlign::Left, VerticalAlign::Center);

    for (key, style) in entries {
        let row_center = y + ROW_HEIGHT * em / 2.0;
        doc.begin_group(
            Group::new()
                .set("class", "legend-entry")
                .set("data-category", key.as_str()),
        );
        doc.push(
            glyph_appearance.paint(style).on(
                Path::new()
                    .set("d", style.marker.path_data(glyph_appearance.diameter()).into_data())
                    .set("transform", translate(glyph_x, row_center)),
            ),
        );
        doc.text(label_x, row_center, key, &label_style);
        doc.end_group();
        y += ROW_HEIGHT * em;
    }

    doc.end_group();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::{MarkerStyle, NamedShape};

    fn axes() -> AxesBox {
        AxesBox {
            x: 0.0,
            y: 0.0,
            width: 400.0,
            height: 200.0,
        }
    }

    #[test]
    fn test_lower_right_anchor() {
        let spec = LegendSpec::titled("Cruise");
        let frame = spec.placement(&axes(), &["KS-22-15", "KH-23-3"]);
        // (0.98, 0.02) in axes coordinates is (392, 196) on the page
        assert!((frame.right() - 392.0).abs() < 1e-9);
        assert!((frame.bottom() - 196.0).abs() < 1e-9);
        assert!(frame.width > 0.0 && frame.height > 0.0);
    }

    #[test]
    fn test_box_grows_with_entries() {
        let spec = LegendSpec::titled("Cluster");
        let (_, two) = spec.box_size(&["1", "2"]);
        let (_, three) = spec.box_size(&["1", "2", "3"]);
        assert!((three - two - ROW_HEIGHT * spec.label_size).abs() < 1e-9);
    }

    #[test]
    fn test_one_entry_per_category() {
        let red = CategoryStyle::new(Color::rgb(255, 0, 0), MarkerStyle::Named(NamedShape::Circle));
        let blue = CategoryStyle::new(Color::rgb(0, 0, 255), MarkerStyle::x_in_square());
        let entries = vec![("1".to_string(), &red), ("7".to_string(), &blue)];

        let mut doc = SvgDocument::new(400.0, 200.0, "serif");
        draw_legend(
            &mut doc,
            &axes(),
            &LegendSpec::titled("Cluster"),
            &entries,
            &MarkerAppearance::default(),
        );
        let svg = doc.finish();

        assert_eq!(svg.matches(r#"class="legend-entry""#).count(), 2);
        assert!(svg.contains(">Cluster</text>"));
        assert!(svg.contains(r#"data-category="7""#));
        assert!(svg.contains(r#"fill-opacity="0.8""#));
    }

    #[test]
    fn test_hidden_legend() {
        let red = CategoryStyle::new(Color::rgb(255, 0, 0), MarkerStyle::default());
        let entries = vec![("A".to_string(), &red)];
        let spec = LegendSpec {
            show: false,
            ..Default::default()
        };
        let mut doc = SvgDocument::new(400.0, 200.0, "serif");
        draw_legend(&mut doc, &axes(), &spec, &entries, &MarkerAppearance::default());
        assert!(!doc.finish().contains("legend"));
    }
}
