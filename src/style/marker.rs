//! Marker glyphs.
//!
//! Glyphs are defined in a unit box centred on the origin (diameter 1, y up) and
//! scaled to the requested marker size when emitted as SVG path data.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use crate::error::{GeoScatterError, Result};
use crate::render::canvas::PathData;

/// One step of a marker outline
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathCommand {
    MoveTo([f64; 2]),
    LineTo([f64; 2]),
    Close,
}

/// Built-in marker shapes, named by their matplotlib codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum NamedShape {
    Circle,
    Point,
    Square,
    Diamond,
    TriangleUp,
    TriangleDown,
    TriangleLeft,
    TriangleRight,
    Pentagon,
    Star,
    Hexagon,
    Plus,
    Cross,
}

impl NamedShape {
    /// Look up a shape by its matplotlib marker code
    pub fn from_code(code: &str) -> Result<Self> {
        match code.trim() {
            "o" | "circle" => Ok(NamedShape::Circle),
            "." | "point" => Ok(NamedShape::Point),
            "s" | "square" => Ok(NamedShape::Square),
            "D" | "diamond" => Ok(NamedShape::Diamond),
            "^" | "triangle_up" => Ok(NamedShape::TriangleUp),
            "v" | "triangle_down" => Ok(NamedShape::TriangleDown),
            "<" | "triangle_left" => Ok(NamedShape::TriangleLeft),
            ">" | "triangle_right" => Ok(NamedShape::TriangleRight),
            "p" | "pentagon" => Ok(NamedShape::Pentagon),
            "*" | "star" => Ok(NamedShape::Star),
            "h" | "hexagon" => Ok(NamedShape::Hexagon),
            "+" | "plus" => Ok(NamedShape::Plus),
            "x" | "cross" => Ok(NamedShape::Cross),
            other => Err(GeoScatterError::InvalidParameter {
                param: "marker".to_string(),
                message: format!("Unknown marker shape: {}", other),
            }),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            NamedShape::Circle => "o",
            NamedShape::Point => ".",
            NamedShape::Square => "s",
            NamedShape::Diamond => "D",
            NamedShape::TriangleUp => "^",
            NamedShape::TriangleDown => "v",
            NamedShape::TriangleLeft => "<",
            NamedShape::TriangleRight => ">",
            NamedShape::Pentagon => "p",
            NamedShape::Star => "*",
            NamedShape::Hexagon => "h",
            NamedShape::Plus => "+",
            NamedShape::Cross => "x",
        }
    }

    /// Line-only shapes are stroked in the category color instead of filled
    pub fn is_filled(&self) -> bool {
        !matches!(self, NamedShape::Plus | NamedShape::Cross)
    }

    fn outline(&self) -> Vec<PathCommand> {
        match self {
            NamedShape::Circle | NamedShape::Point => Vec::new(),
            NamedShape::Square => polygon(&[(-0.5, -0.5), (0.5, -0.5), (0.5, 0.5), (-0.5, 0.5)]),
            NamedShape::Diamond => polygon(&[(0.0, 0.5), (0.5, 0.0), (0.0, -0.5), (-0.5, 0.0)]),
            NamedShape::TriangleUp => polygon(&[(0.0, 0.5), (-0.5, -0.5), (0.5, -0.5)]),
            NamedShape::TriangleDown => polygon(&[(0.0, -0.5), (0.5, 0.5), (-0.5, 0.5)]),
            NamedShape::TriangleLeft => polygon(&[(-0.5, 0.0), (0.5, -0.5), (0.5, 0.5)]),
            NamedShape::TriangleRight => polygon(&[(0.5, 0.0), (-0.5, 0.5), (-0.5, -0.5)]),
            NamedShape::Pentagon => polygon(&regular_vertices(5, 0.5, 0.0)),
            NamedShape::Hexagon => polygon(&regular_vertices(6, 0.5, 0.0)),
            NamedShape::Star => {
                let outer = regular_vertices(5, 0.5, 0.0);
                let inner = regular_vertices(5, 0.5 * 0.381966, PI / 5.0);
                let points: Vec<(f64, f64)> = outer
                    .iter()
                    .zip(inner.iter())
                    .flat_map(|(o, i)| [*o, *i])
                    .collect();
                polygon(&points)
            }
            NamedShape::Plus => vec![
                PathCommand::MoveTo([-0.5, 0.0]),
                PathCommand::LineTo([0.5, 0.0]),
                PathCommand::MoveTo([0.0, -0.5]),
                PathCommand::LineTo([0.0, 0.5]),
            ],
            NamedShape::Cross => vec![
                PathCommand::MoveTo([-0.5, -0.5]),
                PathCommand::LineTo([0.5, 0.5]),
                PathCommand::MoveTo([-0.5, 0.5]),
                PathCommand::LineTo([0.5, -0.5]),
            ],
        }
    }
}

impl TryFrom<String> for NamedShape {
    type Error = GeoScatterError;

    fn try_from(s: String) -> std::result::Result<Self, Self::Error> {
        NamedShape::from_code(&s)
    }
}

impl From<NamedShape> for String {
    fn from(shape: NamedShape) -> Self {
        shape.code().to_string()
    }
}

/// Marker glyph selected per category.
///
/// In JSON a named marker is its code (`"o"`, `"^"`), a composite marker is
/// `{"composite": [{"move_to": [x, y]}, {"line_to": [x, y]}, "close", ...]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MarkerStyle {
    Named(NamedShape),
    Composite { composite: Vec<PathCommand> },
}

impl MarkerStyle {
    /// An X inscribed in a square, the glyph used when a category names no shape
    pub fn x_in_square() -> Self {
        MarkerStyle::Composite {
            composite: vec![
                PathCommand::MoveTo([-0.2, -0.2]),
                PathCommand::LineTo([0.2, -0.2]),
                PathCommand::LineTo([0.2, 0.2]),
                PathCommand::LineTo([-0.2, 0.2]),
                PathCommand::Close,
                PathCommand::MoveTo([-0.2, -0.2]),
                PathCommand::LineTo([0.2, 0.2]),
                PathCommand::MoveTo([-0.2, 0.2]),
                PathCommand::LineTo([0.2, -0.2]),
            ],
        }
    }

    pub fn is_filled(&self) -> bool {
        match self {
            MarkerStyle::Named(shape) => shape.is_filled(),
            MarkerStyle::Composite { .. } => true,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if let MarkerStyle::Composite { composite } = self {
            match composite.first() {
                Some(PathCommand::MoveTo(_)) => {}
                _ => {
                    return Err(GeoScatterError::InvalidParameter {
                        param: "marker".to_string(),
                        message: "Composite marker must start with move_to".to_string(),
                    })
                }
            }
            if scale_to_unit(composite) == 0.0 {
                return Err(GeoScatterError::InvalidParameter {
                    param: "marker".to_string(),
                    message: "Composite marker has zero extent".to_string(),
                });
            }
        }
        Ok(())
    }

    /// SVG path data for this glyph centred at the origin with the given diameter.
    ///
    /// Composite paths are rescaled so their largest coordinate reaches the glyph edge.
    pub fn path_data(&self, size: f64) -> PathData {
        match self {
            MarkerStyle::Named(NamedShape::Circle) => circle_path(size / 2.0),
            MarkerStyle::Named(NamedShape::Point) => circle_path(size / 4.0),
            MarkerStyle::Named(shape) => commands_to_path(&shape.outline(), size),
            MarkerStyle::Composite { composite } => {
                let scale = scale_to_unit(composite);
                let factor = if scale > 0.0 { size * 0.5 / scale } else { 0.0 };
                commands_to_path(composite, factor)
            }
        }
    }
}

impl Default for MarkerStyle {
    fn default() -> Self {
        MarkerStyle::Named(NamedShape::Circle)
    }
}

fn polygon(points: &[(f64, f64)]) -> Vec<PathCommand> {
    let mut commands = Vec::with_capacity(points.len() + 1);
    for (i, (x, y)) in points.iter().enumerate() {
        if i == 0 {
            commands.push(PathCommand::MoveTo([*x, *y]));
        } else {
            commands.push(PathCommand::LineTo([*x, *y]));
        }
    }
    commands.push(PathCommand::Close);
    commands
}

/// Vertices of a regular polygon, first vertex pointing up (rotated by `offset`)
fn regular_vertices(n: usize, radius: f64, offset: f64) -> Vec<(f64, f64)> {
    (0..n)
        .map(|i| {
            let angle = PI / 2.0 + offset + 2.0 * PI * i as f64 / n as f64;
            (radius * angle.cos(), radius * angle.sin())
        })
        .collect()
}

/// Largest absolute coordinate in a command list
fn scale_to_unit(commands: &[PathCommand]) -> f64 {
    commands
        .iter()
        .filter_map(|c| match c {
            PathCommand::MoveTo([x, y]) | PathCommand::LineTo([x, y]) => Some(x.abs().max(y.abs())),
            PathCommand::Close => None,
        })
        .fold(0.0, f64::max)
}

fn circle_path(r: f64) -> PathData {
    let mut d = PathData::new();
    d.move_to(r, 0.0);
    d.arc_to(r, true, false, -r, 0.0);
    d.arc_to(r, true, false, r, 0.0);
    d.close();
    d
}

// Glyph y grows upward, SVG y grows downward.
fn commands_to_path(commands: &[PathCommand], factor: f64) -> PathData {
    let mut d = PathData::new();
    for command in commands {
        match command {
            PathCommand::MoveTo([x, y]) => d.move_to(x * factor, -y * factor),
            PathCommand::LineTo([x, y]) => d.line_to(x * factor, -y * factor),
            PathCommand::Close => d.close(),
        }
    }
    d
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_codes() {
        for code in ["o", ".", "s", "D", "^", "v", "<", ">", "p", "*", "h", "+", "x"] {
            let shape = NamedShape::from_code(code).unwrap();
            assert_eq!(shape.code(), code);
        }
        assert!(NamedShape::from_code("Q").is_err());
    }

    #[test]
    fn test_line_markers_are_not_filled() {
        assert!(!MarkerStyle::Named(NamedShape::Plus).is_filled());
        assert!(!MarkerStyle::Named(NamedShape::Cross).is_filled());
        assert!(MarkerStyle::Named(NamedShape::Circle).is_filled());
        assert!(MarkerStyle::x_in_square().is_filled());
    }

    fn path_string(marker: &MarkerStyle, size: f64) -> String {
        let path = svg::node::element::Path::new().set("d", marker.path_data(size).into_data());
        path.to_string()
    }

    #[test]
    fn test_triangle_path() {
        let d = path_string(&MarkerStyle::Named(NamedShape::TriangleUp), 10.0);
        assert!(d.contains(r#"d="M0,-5 L-5,5 L5,5 z""#));
    }

    #[test]
    fn test_circle_path() {
        let d = path_string(&MarkerStyle::Named(NamedShape::Circle), 6.0);
        assert!(d.contains(r#"d="M3,0 A3,3,0,1,0,-3,0 A3,3,0,1,0,3,0 z""#));
    }

    #[test]
    fn test_composite_is_rescaled() {
        // ±0.2 in the definition becomes ±size/2 on the page
        let d = path_string(&MarkerStyle::x_in_square(), 10.0);
        assert!(d.contains(r#"d="M-5,5 L5,5 "#));
        assert_eq!(d.matches('M').count(), 3);
        assert_eq!(d.matches('z').count(), 1);
    }

    #[test]
    fn test_composite_validation() {
        assert!(MarkerStyle::x_in_square().validate().is_ok());
        let bad = MarkerStyle::Composite {
            composite: vec![PathCommand::LineTo([0.1, 0.1])],
        };
        assert!(bad.validate().is_err());
        let flat = MarkerStyle::Composite {
            composite: vec![PathCommand::MoveTo([0.0, 0.0])],
        };
        assert!(flat.validate().is_err());
    }

    #[test]
    fn test_marker_serde() {
        let named: MarkerStyle = serde_json::from_str("\"^\"").unwrap();
        assert_eq!(named, MarkerStyle::Named(NamedShape::TriangleUp));

        let composite: MarkerStyle = serde_json::from_str(
            r#"{"composite": [{"move_to": [-1, 0]}, {"line_to": [1, 0]}, "close"]}"#,
        )
        .unwrap();
        assert_eq!(
            composite,
            MarkerStyle::Composite {
                composite: vec![
                    PathCommand::MoveTo([-1.0, 0.0]),
                    PathCommand::LineTo([1.0, 0.0]),
                    PathCommand::Close,
                ]
            }
        );

        assert!(serde_json::from_str::<MarkerStyle>("\"nope\"").is_err());
    }
}
