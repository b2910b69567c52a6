//! Page composition on top of the `svg` DOM.
//!
//! The whole figure is composed as SVG in figure units (points, 72 per inch) and
//! then handed to the encoder. Coordinates are rounded to two decimals before they
//! reach the document so equal inputs always produce byte-identical output.

use svg::node::element::path::Data;
use svg::node::element::{ClipPath, Definitions, Group, Rectangle, Text};
use svg::{Document, Node};

use crate::geoutil::AxesBox;
use crate::style::Color;

/// Font weight of a text run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    #[default]
    Normal,
    Bold,
}

/// Font style of a text run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
}

/// Horizontal alignment of text relative to its anchor point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HorizontalAlign {
    Left,
    #[default]
    Center,
    Right,
}

/// Vertical alignment of text relative to its anchor point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerticalAlign {
    Top,
    Center,
    #[default]
    Bottom,
    Baseline,
}

/// Everything needed to place one text run
#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub size: f64,
    pub color: Color,
    pub weight: FontWeight,
    pub style: FontStyle,
    pub ha: HorizontalAlign,
    pub va: VerticalAlign,
    /// Degrees, counter-clockwise
    pub rotation: f64,
}

impl TextStyle {
    pub fn new(size: f64) -> Self {
        Self {
            size,
            color: Color::BLACK,
            weight: FontWeight::Normal,
            style: FontStyle::Normal,
            ha: HorizontalAlign::Center,
            va: VerticalAlign::Baseline,
            rotation: 0.0,
        }
    }

    pub fn bold(mut self) -> Self {
        self.weight = FontWeight::Bold;
        self
    }

    pub fn align(mut self, ha: HorizontalAlign, va: VerticalAlign) -> Self {
        self.ha = ha;
        self.va = va;
        self
    }
}

/// Rough advance width of a string, for sizing boxes around text
pub fn estimate_text_width(text: &str, size: f64, weight: FontWeight) -> f64 {
    let per_char = match weight {
        FontWeight::Normal => 0.55,
        FontWeight::Bold => 0.62,
    };
    text.chars().count() as f64 * size * per_char
}

/// Round to the document precision; also folds -0 into 0
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0 + 0.0
}

/// Format a number at document precision with trailing zeros trimmed
pub fn fmt_num(value: f64) -> String {
    let s = format!("{:.2}", round2(value));
    let s = s.trim_end_matches('0');
    let s = s.trim_end_matches('.');
    s.to_string()
}

/// `translate(x y)` at document precision
pub fn translate(x: f64, y: f64) -> String {
    format!("translate({} {})", fmt_num(x), fmt_num(y))
}

/// Incrementally built path data with rounded coordinates
#[derive(Debug, Clone, Default)]
pub struct PathData {
    data: Data,
}

impl PathData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn move_to(&mut self, x: f64, y: f64) {
        self.data = std::mem::take(&mut self.data).move_to((round2(x), round2(y)));
    }

    pub fn line_to(&mut self, x: f64, y: f64) {
        self.data = std::mem::take(&mut self.data).line_to((round2(x), round2(y)));
    }

    /// Elliptical arc with both radii `r`
    pub fn arc_to(&mut self, r: f64, large_arc: bool, sweep: bool, x: f64, y: f64) {
        let r = round2(r);
        self.data = std::mem::take(&mut self.data).elliptical_arc_to((
            r,
            r,
            0,
            large_arc as u8,
            sweep as u8,
            round2(x),
            round2(y),
        ));
    }

    pub fn close(&mut self) {
        self.data = std::mem::take(&mut self.data).close();
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn into_data(self) -> Data {
        self.data
    }
}

/// Fill and stroke of a shape
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Paint {
    pub fill: Option<Color>,
    /// Color and width; zero-width strokes are dropped
    pub stroke: Option<(Color, f64)>,
}

impl Paint {
    pub fn new(fill: Option<Color>, stroke: Option<(Color, f64)>) -> Self {
        Self { fill, stroke }
    }

    pub fn fill(color: Color) -> Self {
        Self::new(Some(color), None)
    }

    pub fn stroke(color: Color, width: f64) -> Self {
        Self::new(None, Some((color, width)))
    }

    /// Set the paint attributes on `node`
    pub fn apply<T: Node>(&self, node: &mut T) {
        match self.fill {
            Some(c) => {
                node.assign("fill", c.to_hex());
                if c.rgba()[3] != 255 {
                    node.assign("fill-opacity", fmt_num(c.opacity()));
                }
            }
            None => node.assign("fill", "none"),
        }
        match self.stroke {
            Some((c, width)) if width > 0.0 => {
                node.assign("stroke", c.to_hex());
                node.assign("stroke-width", fmt_num(width));
                if c.rgba()[3] != 255 {
                    node.assign("stroke-opacity", fmt_num(c.opacity()));
                }
            }
            _ => node.assign("stroke", "none"),
        }
    }

    /// Builder form of `apply`
    pub fn on<T: Node>(&self, mut node: T) -> T {
        self.apply(&mut node);
        node
    }
}

/// A page under construction.
///
/// Groups opened with `begin_group` collect every node added until the matching
/// `end_group`; clip paths go into a leading `<defs>`.
#[derive(Debug, Clone)]
pub struct SvgDocument {
    width: f64,
    height: f64,
    font_family: String,
    defs: Definitions,
    has_defs: bool,
    body: Vec<Box<dyn Node>>,
    open: Vec<Group>,
    next_id: usize,
}

impl SvgDocument {
    pub fn new(width: f64, height: f64, font_family: &str) -> Self {
        Self {
            width,
            height,
            font_family: font_family.to_string(),
            defs: Definitions::new(),
            has_defs: false,
            body: Vec::new(),
            open: Vec::new(),
            next_id: 0,
        }
    }

    fn unique_id(&mut self, prefix: &str) -> String {
        let id = format!("{}-{}", prefix, self.next_id);
        self.next_id += 1;
        id
    }

    /// Define a rectangular clip path and return its id
    pub fn clip_rect(&mut self, rect: &AxesBox) -> String {
        let id = self.unique_id("clip");
        let clip = ClipPath::new().set("id", id.clone()).add(rectangle(rect));
        self.defs.append(clip);
        self.has_defs = true;
        id
    }

    /// Add a node to the innermost open group
    pub fn push<T: Into<Box<dyn Node>>>(&mut self, node: T) {
        match self.open.last_mut() {
            Some(group) => group.append(node),
            None => self.body.push(node.into()),
        }
    }

    /// Open a group; must be matched by `end_group`
    pub fn begin_group(&mut self, group: Group) {
        self.open.push(group);
    }

    pub fn end_group(&mut self) {
        if let Some(group) = self.open.pop() {
            self.push(group);
        }
    }

    pub fn rect(&mut self, rect: &AxesBox, paint: Paint) {
        self.push(paint.on(rectangle(rect)));
    }

    /// Place a text run at a point in figure units
    pub fn text(&mut self, x: f64, y: f64, content: &str, style: &TextStyle) {
        let anchor = match style.ha {
            HorizontalAlign::Left => "start",
            HorizontalAlign::Center => "middle",
            HorizontalAlign::Right => "end",
        };
        let baseline = match style.va {
            VerticalAlign::Top => "hanging",
            VerticalAlign::Center => "central",
            VerticalAlign::Bottom => "text-after-edge",
            VerticalAlign::Baseline => "alphabetic",
        };

        let transform = if style.rotation != 0.0 {
            // SVG rotates clockwise
            format!("{} rotate({})", translate(x, y), fmt_num(-style.rotation))
        } else {
            translate(x, y)
        };

        let mut text = Text::new(content)
            .set("x", 0)
            .set("y", 0)
            .set("font-size", fmt_num(style.size))
            .set("text-anchor", anchor)
            .set("dominant-baseline", baseline)
            .set("transform", transform);
        Paint::fill(style.color).apply(&mut text);
        if style.weight == FontWeight::Bold {
            text.assign("font-weight", "bold");
        }
        if style.style == FontStyle::Italic {
            text.assign("font-style", "italic");
        }
        self.push(text);
    }

    /// Serialize the document, closing any group left open
    pub fn finish(mut self) -> String {
        while !self.open.is_empty() {
            self.end_group();
        }

        let mut document = Document::new()
            .set("width", fmt_num(self.width))
            .set("height", fmt_num(self.height))
            .set(
                "viewBox",
                format!("0 0 {} {}", fmt_num(self.width), fmt_num(self.height)),
            )
            .set("font-family", self.font_family);
        if self.has_defs {
            document.append(self.defs);
        }
        for node in self.body {
            document.append(node);
        }

        let mut out = document.to_string();
        out.push('\n');
        out
    }
}

fn rectangle(rect: &AxesBox) -> Rectangle {
    Rectangle::new()
        .set("x", fmt_num(rect.x))
        .set("y", fmt_num(rect.y))
        .set("width", fmt_num(rect.width))
        .set("height", fmt_num(rect.height))
}
