//! GeoJSON boundary source.

use geojson::GeoJson;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use super::{BoundaryGeometry, BoundarySource, CountryShape};
use crate::error::{GeoScatterError, Result};
use crate::logging::log_boundary_load_stats;

/// Reads a FeatureCollection; polygons become countries, line strings coastlines
#[derive(Debug, Clone)]
pub struct GeoJsonSource {
    pub path: PathBuf,
    pub code_property: String,
}

impl GeoJsonSource {
    pub fn new(path: PathBuf, code_property: &str) -> Self {
        Self {
            path,
            code_property: code_property.to_string(),
        }
    }

    fn parse(&self, geojson: GeoJson) -> Result<BoundaryGeometry> {
        let collection = match geojson {
            GeoJson::FeatureCollection(fc) => fc,
            _ => {
                return Err(GeoScatterError::data_source(format!(
                    "{} must contain a FeatureCollection",
                    self.path.display()
                )))
            }
        };

        let mut geometry = BoundaryGeometry::default();

        for feature in collection.features {
            let code = match feature
                .properties
                .as_ref()
                .and_then(|props| props.get(&self.code_property))
            {
                Some(serde_json::Value::String(s)) => s.trim().to_string(),
                Some(serde_json::Value::Number(n)) => n.to_string(),
                _ => String::new(),
            };

            let Some(geom) = feature.geometry else {
                continue;
            };

            let value: geo::Geometry<f64> = geom.value.try_into().map_err(|e| {
                GeoScatterError::data_source(format!(
                    "Failed to convert geometry in {}: {:?}",
                    self.path.display(),
                    e
                ))
            })?;

            match value {
                geo::Geometry::Polygon(p) => geometry
                    .countries
                    .push(CountryShape::new(code, geo::MultiPolygon::new(vec![p]))),
                geo::Geometry::MultiPolygon(mp) => {
                    geometry.countries.push(CountryShape::new(code, mp))
                }
                geo::Geometry::LineString(l) => geometry.coastlines.push(l),
                geo::Geometry::MultiLineString(ml) => geometry.coastlines.extend(ml.0),
                _ => {}
            }
        }

        Ok(geometry)
    }
}

impl BoundarySource for GeoJsonSource {
    fn describe(&self) -> String {
        format!("geojson {}", self.path.display())
    }

    fn cache_key(&self) -> Option<String> {
        Some(format!("geojson:{}:{}", self.path.display(), self.code_property))
    }

    fn load(&self) -> Result<BoundaryGeometry> {
        let file = File::open(&self.path).map_err(|e| {
            GeoScatterError::data_source(format!(
                "Failed to open GeoJSON {}: {}",
                self.path.display(),
                e
            ))
        })?;

        let geojson = GeoJson::from_reader(BufReader::new(file)).map_err(|e| {
            GeoScatterError::data_source(format!(
                "Failed to parse GeoJSON {}: {}",
                self.path.display(),
                e
            ))
        })?;

        let geometry = self.parse(geojson)?;
        log_boundary_load_stats(&self.describe(), &geometry);
        Ok(geometry)
    }
}
