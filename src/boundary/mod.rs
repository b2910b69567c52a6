//! Boundary (country and coastline) geometry sources.
//!
//! The basemap is drawn from an externally supplied set of country polygons and,
//! optionally, coastline line strings. Sources are read-only; loaded geometry can be
//! shared process-wide so multi-panel figures read each file once.

pub mod geojson_source;
pub mod shapefile_source;

use geo::{BoundingRect, LineString, MultiPolygon, Rect};
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

use crate::error::{GeoScatterError, Result};

pub use geojson_source::GeoJsonSource;
pub use shapefile_source::ShapefileSource;

/// Attribute holding the ISO-like country code in Natural Earth admin-0 layers
pub const DEFAULT_CODE_ATTRIBUTE: &str = "ADM0_A3";

/// A country polygon tagged with its region code
#[derive(Debug, Clone, PartialEq)]
pub struct CountryShape {
    pub code: String,
    pub geometry: MultiPolygon<f64>,
}

impl CountryShape {
    pub fn new(code: impl Into<String>, geometry: MultiPolygon<f64>) -> Self {
        Self {
            code: code.into(),
            geometry,
        }
    }

    pub fn bounds(&self) -> Option<Rect<f64>> {
        self.geometry.bounding_rect()
    }
}

/// Loaded basemap geometry
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundaryGeometry {
    pub countries: Vec<CountryShape>,
    pub coastlines: Vec<LineString<f64>>,
}

impl BoundaryGeometry {
    pub fn new(countries: Vec<CountryShape>) -> Self {
        Self {
            countries,
            coastlines: Vec::new(),
        }
    }

    /// Countries whose code equals `code` (case-insensitive)
    pub fn region<'a>(&'a self, code: &'a str) -> impl Iterator<Item = &'a CountryShape> + 'a {
        self.countries
            .iter()
            .filter(move |c| c.code.eq_ignore_ascii_case(code))
    }

    /// Combine two geometry sets, e.g. a country layer with a coastline layer
    pub fn merged(&self, other: &BoundaryGeometry) -> BoundaryGeometry {
        let mut combined = self.clone();
        combined.countries.extend(other.countries.iter().cloned());
        combined.coastlines.extend(other.coastlines.iter().cloned());
        combined
    }

    pub fn is_empty(&self) -> bool {
        self.countries.is_empty() && self.coastlines.is_empty()
    }
}

/// Something that can produce boundary geometry
pub trait BoundarySource {
    /// Human-readable description used in logs and errors
    fn describe(&self) -> String;

    /// Key for the process-wide cache; `None` disables caching for this source
    fn cache_key(&self) -> Option<String>;

    /// Read the geometry
    fn load(&self) -> Result<BoundaryGeometry>;
}

impl BoundarySource for BoundaryGeometry {
    fn describe(&self) -> String {
        format!(
            "in-memory ({} countries, {} coastlines)",
            self.countries.len(),
            self.coastlines.len()
        )
    }

    fn cache_key(&self) -> Option<String> {
        None
    }

    fn load(&self) -> Result<BoundaryGeometry> {
        Ok(self.clone())
    }
}

static BOUNDARY_CACHE: Lazy<Mutex<HashMap<String, Arc<BoundaryGeometry>>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

/// Load through the process-wide cache
pub fn load_cached(source: &dyn BoundarySource) -> Result<Arc<BoundaryGeometry>> {
    let Some(key) = source.cache_key() else {
        return source.load().map(Arc::new);
    };

    if let Some(hit) = BOUNDARY_CACHE.lock().get(&key) {
        debug!(source = %key, "Boundary cache hit");
        return Ok(Arc::clone(hit));
    }

    let geometry = Arc::new(source.load()?);
    BOUNDARY_CACHE.lock().insert(key, Arc::clone(&geometry));
    Ok(geometry)
}

/// Configured boundary source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BoundarySpec {
    /// A Natural Earth layer resolved inside a cartopy-style data directory
    NaturalEarth {
        #[serde(default = "default_resolution")]
        resolution: String,
        #[serde(default = "default_category")]
        category: String,
        #[serde(default = "default_layer")]
        name: String,
        /// Overrides the figure-wide Natural Earth directory
        #[serde(default)]
        data_dir: Option<PathBuf>,
        #[serde(default = "default_code_attribute")]
        code_attribute: String,
    },
    Shapefile {
        path: PathBuf,
        #[serde(default = "default_code_attribute")]
        code_attribute: String,
    },
    #[serde(rename = "geojson")]
    GeoJson {
        path: PathBuf,
        #[serde(default = "default_code_attribute")]
        code_property: String,
    },
}

impl BoundarySpec {
    /// The 10m admin-0 countries layer
    pub fn natural_earth_countries() -> Self {
        BoundarySpec::NaturalEarth {
            resolution: default_resolution(),
            category: default_category(),
            name: default_layer(),
            data_dir: None,
            code_attribute: default_code_attribute(),
        }
    }

    /// The Natural Earth `physical/coastline` layer drawn with a Natural Earth
    /// country layer, at the same resolution and from the same directory.
    /// Other sources have no companion coastline.
    pub fn coastline_companion(&self) -> Option<Self> {
        match self {
            BoundarySpec::NaturalEarth {
                resolution,
                data_dir,
                ..
            } => Some(BoundarySpec::NaturalEarth {
                resolution: resolution.clone(),
                category: "physical".to_string(),
                name: "coastline".to_string(),
                data_dir: data_dir.clone(),
                code_attribute: default_code_attribute(),
            }),
            BoundarySpec::Shapefile { .. } | BoundarySpec::GeoJson { .. } => None,
        }
    }

    /// Turn this entry into a concrete source, resolving Natural Earth layers
    /// against `natural_earth_dir` unless it names its own directory.
    pub fn to_source(&self, natural_earth_dir: &Path) -> Result<Box<dyn BoundarySource>> {
        match self {
            BoundarySpec::NaturalEarth {
                resolution,
                category,
                name,
                data_dir,
                code_attribute,
            } => {
                let dir = data_dir.as_deref().unwrap_or(natural_earth_dir);
                let path = natural_earth_path(dir, resolution, category, name)?;
                Ok(Box::new(ShapefileSource::new(path, code_attribute)))
            }
            BoundarySpec::Shapefile {
                path,
                code_attribute,
            } => Ok(Box::new(ShapefileSource::new(path.clone(), code_attribute))),
            BoundarySpec::GeoJson {
                path,
                code_property,
            } => Ok(Box::new(GeoJsonSource::new(path.clone(), code_property))),
        }
    }
}

/// Path of a Natural Earth shapefile inside a cartopy data directory:
/// `<dir>/shapefiles/natural_earth/<category>/ne_<resolution>_<name>.shp`
pub fn natural_earth_path(
    dir: &Path,
    resolution: &str,
    category: &str,
    name: &str,
) -> Result<PathBuf> {
    match resolution {
        "10m" | "50m" | "110m" => {}
        other => {
            return Err(GeoScatterError::InvalidParameter {
                param: "resolution".to_string(),
                message: format!("Unknown Natural Earth resolution: {}", other),
            })
        }
    }
    match category {
        "cultural" | "physical" => {}
        other => {
            return Err(GeoScatterError::InvalidParameter {
                param: "category".to_string(),
                message: format!("Unknown Natural Earth category: {}", other),
            })
        }
    }

    Ok(dir
        .join("shapefiles")
        .join("natural_earth")
        .join(category)
        .join(format!("ne_{}_{}.shp", resolution, name)))
}

fn default_resolution() -> String {
    "10m".to_string()
}

fn default_category() -> String {
    "cultural".to_string()
}

fn default_layer() -> String {
    "admin_0_countries".to_string()
}

fn default_code_attribute() -> String {
    DEFAULT_CODE_ATTRIBUTE.to_string()
}
