//! Geographic utility functions for extents, tick labels and the plate carrée mapping.
//!
//! All map drawing happens in an equirectangular projection: longitude maps linearly
//! to the horizontal axis and latitude linearly to the vertical axis.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{GeoScatterError, Result};

/// Geographic bounding box in degrees.
///
/// Serialized as `[west, east, south, north]`, the order cartopy's `set_extent` uses.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct Extent {
    pub west: f64,
    pub east: f64,
    pub south: f64,
    pub north: f64,
}

impl Extent {
    /// Create a validated extent
    pub fn new(west: f64, east: f64, south: f64, north: f64) -> Result<Self> {
        let extent = Self {
            west,
            east,
            south,
            north,
        };
        extent.validate()?;
        Ok(extent)
    }

    /// Check `west < east`, `south < north` and the coordinate ranges
    pub fn validate(&self) -> Result<()> {
        let values = [self.west, self.east, self.south, self.north];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(GeoScatterError::InvalidExtent {
                message: format!("{} contains a non-finite value", self),
            });
        }
        if self.west >= self.east {
            return Err(GeoScatterError::InvalidExtent {
                message: format!("west ({}) must be < east ({})", self.west, self.east),
            });
        }
        if self.south >= self.north {
            return Err(GeoScatterError::InvalidExtent {
                message: format!("south ({}) must be < north ({})", self.south, self.north),
            });
        }
        if self.south < -90.0 || self.north > 90.0 {
            return Err(GeoScatterError::InvalidExtent {
                message: "Latitude must be in the range -90 to 90".to_string(),
            });
        }
        if self.west < -180.0 || self.east > 360.0 || self.east - self.west > 360.0 {
            return Err(GeoScatterError::InvalidExtent {
                message: "Longitude must lie within -180 to 360 and span at most 360 degrees"
                    .to_string(),
            });
        }
        Ok(())
    }

    pub fn width(&self) -> f64 {
        self.east - self.west
    }

    pub fn height(&self) -> f64 {
        self.north - self.south
    }

    /// Width over height, which is also the on-page aspect ratio in plate carrée
    pub fn aspect(&self) -> f64 {
        self.width() / self.height()
    }

    /// Shift a longitude by whole turns so that it lands inside this extent when possible.
    ///
    /// Extents east of the antimeridian (e.g. 170..200) then accept points given as -170.
    pub fn unwrap_longitude(&self, lon: f64) -> f64 {
        [lon, lon + 360.0, lon - 360.0]
            .into_iter()
            .find(|candidate| (self.west..=self.east).contains(candidate))
            .unwrap_or(lon)
    }

    /// Inclusive containment test, with longitude unwrapping
    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        let lon = self.unwrap_longitude(lon);
        (self.west..=self.east).contains(&lon) && (self.south..=self.north).contains(&lat)
    }

    /// Longitude offset (0, +360 or -360) that makes a lon/lat rectangle overlap
    /// this extent, or `None` when it lies outside under every offset
    pub fn overlap_shift(
        &self,
        min_lon: f64,
        min_lat: f64,
        max_lon: f64,
        max_lat: f64,
    ) -> Option<f64> {
        if min_lat > self.north || max_lat < self.south {
            return None;
        }
        [0.0, 360.0, -360.0]
            .into_iter()
            .find(|shift| min_lon + shift <= self.east && max_lon + shift >= self.west)
    }
}

impl From<[f64; 4]> for Extent {
    fn from(v: [f64; 4]) -> Self {
        Self {
            west: v[0],
            east: v[1],
            south: v[2],
            north: v[3],
        }
    }
}

impl From<Extent> for [f64; 4] {
    fn from(e: Extent) -> Self {
        [e.west, e.east, e.south, e.north]
    }
}

impl std::fmt::Display for Extent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "({}, {}, {}, {})",
            self.west, self.east, self.south, self.north
        )
    }
}

impl FromStr for Extent {
    type Err = GeoScatterError;

    /// Parse "west,east,south,north"
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 4 {
            return Err(GeoScatterError::InvalidParameter {
                param: "extent".to_string(),
                message: "Extent must be in format 'west,east,south,north'".to_string(),
            });
        }

        let mut values = [0.0f64; 4];
        for (slot, (part, name)) in values
            .iter_mut()
            .zip(parts.iter().zip(["west", "east", "south", "north"]))
        {
            *slot = part
                .parse::<f64>()
                .map_err(|_| GeoScatterError::InvalidParameter {
                    param: "extent".to_string(),
                    message: format!("Invalid {}: {}", name, part),
                })?;
        }

        let extent = Extent::from(values);
        extent.validate()?;
        Ok(extent)
    }
}

/// Check that a point lies on the globe
pub fn validate_coordinates(lon: f64, lat: f64) -> Result<()> {
    if !lon.is_finite() || !(-180.0..=180.0).contains(&lon) {
        return Err(GeoScatterError::InvalidCoordinates {
            message: format!("longitude {} outside [-180, 180]", lon),
        });
    }
    if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
        return Err(GeoScatterError::InvalidCoordinates {
            message: format!("latitude {} outside [-90, 90]", lat),
        });
    }
    Ok(())
}

/// Normalize a longitude value to the range (-180, 180]
pub fn normalize_longitude(lon: f64) -> f64 {
    let normalized = ((lon + 180.0) % 360.0 + 360.0) % 360.0 - 180.0;
    if normalized == -180.0 {
        180.0
    } else {
        normalized
    }
}

/// Tick positions `start, start + step, ...` strictly below `stop`, like `np.arange`.
pub fn tick_locations(start: f64, stop: f64, step: f64) -> Vec<f64> {
    if step <= 0.0 || !step.is_finite() {
        return Vec::new();
    }
    let count = ((stop - start) / step).ceil().max(0.0) as usize;
    (0..count).map(|i| start + i as f64 * step).collect()
}

fn format_degrees(value: f64) -> String {
    if (value - value.round()).abs() < 1e-9 {
        format!("{}", value.round() as i64)
    } else {
        let s = format!("{:.2}", value);
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

/// Longitude tick label with hemisphere suffix: `131°E`, `75°W`, `0°`, `180°`
pub fn format_longitude(lon: f64) -> String {
    let lon = normalize_longitude(lon);
    if lon.abs() < 1e-9 || (lon.abs() - 180.0).abs() < 1e-9 {
        format!("{}°", format_degrees(lon.abs()))
    } else if lon > 0.0 {
        format!("{}°E", format_degrees(lon))
    } else {
        format!("{}°W", format_degrees(-lon))
    }
}

/// Latitude tick label with hemisphere suffix: `26°N`, `10°S`, `0°`
pub fn format_latitude(lat: f64) -> String {
    if lat.abs() < 1e-9 {
        "0°".to_string()
    } else if lat > 0.0 {
        format!("{}°N", format_degrees(lat))
    } else {
        format!("{}°S", format_degrees(-lat))
    }
}

/// Rectangle on the page in figure units (points, y grows downward).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxesBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl AxesBox {
    /// Map normalized axes coordinates (0..1, v grows upward) to figure units
    pub fn from_axes(&self, u: f64, v: f64) -> (f64, f64) {
        (self.x + u * self.width, self.y + (1.0 - v) * self.height)
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }
}

/// Equirectangular mapping of an extent onto an axes box
#[derive(Debug, Clone, Copy)]
pub struct PlateCarree {
    pub extent: Extent,
    pub axes: AxesBox,
}

impl PlateCarree {
    pub fn new(extent: Extent, axes: AxesBox) -> Self {
        Self { extent, axes }
    }

    /// Project a lon/lat pair to figure units
    pub fn project(&self, lon: f64, lat: f64) -> (f64, f64) {
        let lon = self.extent.unwrap_longitude(lon);
        let u = (lon - self.extent.west) / self.extent.width();
        let v = (lat - self.extent.south) / self.extent.height();
        self.axes.from_axes(u, v)
    }
}
