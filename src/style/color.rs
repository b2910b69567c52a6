//! Color parsing and formatting.
//!
//! Accepts CSS color names and hex strings (parsed by `colorgrad`) as well as the
//! single-letter matplotlib shorthands used in figure scripts (`k`, `r`, `w`, ...).

use serde::{Deserialize, Serialize};

use crate::error::{GeoScatterError, Result};

/// An 8-bit RGBA color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color(pub [u8; 4]);

impl Color {
    pub const BLACK: Color = Color([0, 0, 0, 255]);
    pub const WHITE: Color = Color([255, 255, 255, 255]);

    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color([r, g, b, 255])
    }

    /// Parse a color string
    pub fn parse(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let expanded = matplotlib_shorthand(trimmed).unwrap_or(trimmed);
        let parsed =
            colorgrad::Color::from_html(expanded).map_err(|e| GeoScatterError::InvalidParameter {
                param: "color".to_string(),
                message: format!("Invalid color '{}': {}", s, e),
            })?;
        Ok(Color(parsed.to_rgba8()))
    }

    pub fn rgba(&self) -> [u8; 4] {
        self.0
    }

    /// `#rrggbb`, without alpha
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0[0], self.0[1], self.0[2])
    }

    /// Alpha as a 0..1 opacity
    pub fn opacity(&self) -> f64 {
        self.0[3] as f64 / 255.0
    }
}

impl TryFrom<String> for Color {
    type Error = GeoScatterError;

    fn try_from(s: String) -> std::result::Result<Self, Self::Error> {
        Color::parse(&s)
    }
}

impl From<Color> for String {
    fn from(c: Color) -> Self {
        if c.0[3] == 255 {
            c.to_hex()
        } else {
            format!("{}{:02x}", c.to_hex(), c.0[3])
        }
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&String::from(*self))
    }
}

fn matplotlib_shorthand(s: &str) -> Option<&'static str> {
    match s {
        "b" => Some("#0000ff"),
        "g" => Some("#008000"),
        "r" => Some("#ff0000"),
        "c" => Some("#00bfbf"),
        "m" => Some("#bf00bf"),
        "y" => Some("#bfbf00"),
        "k" => Some("#000000"),
        "w" => Some("#ffffff"),
        _ => None,
    }
}
