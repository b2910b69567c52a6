//! ESRI shapefile boundary source (Natural Earth ships its layers in this format).

use geo::{LineString, MultiLineString, MultiPolygon};
use shapefile::dbase::FieldValue;
use shapefile::{Reader, Shape};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, warn};

use super::{BoundaryGeometry, BoundarySource, CountryShape};
use crate::error::{GeoScatterError, Result};
use crate::logging::log_boundary_load_stats;

/// Reads polygons (countries) and polylines (coastlines) from a `.shp`/`.dbf` pair
#[derive(Debug, Clone)]
pub struct ShapefileSource {
    pub path: PathBuf,
    pub code_attribute: String,
}

impl ShapefileSource {
    pub fn new(path: PathBuf, code_attribute: &str) -> Self {
        Self {
            path,
            code_attribute: code_attribute.to_string(),
        }
    }
}

impl BoundarySource for ShapefileSource {
    fn describe(&self) -> String {
        format!("shapefile {}", self.path.display())
    }

    fn cache_key(&self) -> Option<String> {
        Some(format!("shp:{}:{}", self.path.display(), self.code_attribute))
    }

    fn load(&self) -> Result<BoundaryGeometry> {
        let start = Instant::now();
        if !self.path.exists() {
            return Err(GeoScatterError::data_source(format!(
                "Shapefile not found: {}",
                self.path.display()
            )));
        }

        let mut reader = Reader::from_path(&self.path).map_err(|e| {
            GeoScatterError::data_source(format!(
                "Failed to open shapefile {}: {}",
                self.path.display(),
                e
            ))
        })?;

        let mut geometry = BoundaryGeometry::default();
        let mut skipped = 0usize;

        for result in reader.iter_shapes_and_records() {
            let (shape, record) = result.map_err(|e| {
                GeoScatterError::data_source(format!(
                    "Failed to read shapefile {}: {}",
                    self.path.display(),
                    e
                ))
            })?;

            let code = match record.get(&self.code_attribute) {
                Some(FieldValue::Character(Some(s))) => s.trim().to_string(),
                _ => String::new(),
            };

            match shape {
                Shape::Polygon(polygon) => {
                    let mp: MultiPolygon<f64> = polygon
                        .try_into()
                        .map_err(|e| convert_error(&self.path, e))?;
                    geometry.countries.push(CountryShape::new(code, mp));
                }
                Shape::PolygonM(polygon) => {
                    let mp: MultiPolygon<f64> = polygon
                        .try_into()
                        .map_err(|e| convert_error(&self.path, e))?;
                    geometry.countries.push(CountryShape::new(code, mp));
                }
                Shape::PolygonZ(polygon) => {
                    let mp: MultiPolygon<f64> = polygon
                        .try_into()
                        .map_err(|e| convert_error(&self.path, e))?;
                    geometry.countries.push(CountryShape::new(code, mp));
                }
                Shape::Polyline(polyline) => {
                    let lines: MultiLineString<f64> = polyline
                        .try_into()
                        .map_err(|e| convert_error(&self.path, e))?;
                    geometry.coastlines.extend(lines.0.into_iter());
                }
                Shape::PolylineM(polyline) => {
                    let lines: MultiLineString<f64> = polyline
                        .try_into()
                        .map_err(|e| convert_error(&self.path, e))?;
                    geometry.coastlines.extend(lines.0.into_iter());
                }
                Shape::PolylineZ(polyline) => {
                    let lines: MultiLineString<f64> = polyline
                        .try_into()
                        .map_err(|e| convert_error(&self.path, e))?;
                    geometry.coastlines.extend(lines.0.into_iter());
                }
                _ => skipped += 1,
            }
        }

        if skipped > 0 {
            warn!(
                path = %self.path.display(),
                skipped = skipped,
                "Skipped non-polygon, non-polyline shapes"
            );
        }
        geometry.coastlines.retain(|l: &LineString<f64>| l.0.len() >= 2);

        debug!(
            path = %self.path.display(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Shapefile read"
        );
        log_boundary_load_stats(&self.describe(), &geometry);

        Ok(geometry)
    }
}

fn convert_error(path: &std::path::Path, e: impl std::fmt::Debug) -> GeoScatterError {
    GeoScatterError::data_source(format!(
        "Failed to convert geometry in {}: {:?}",
        path.display(),
        e
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_shapefile() {
        let source = ShapefileSource::new(PathBuf::from("/no/such/ne_10m_admin_0_countries.shp"), "ADM0_A3");
        let err = source.load().unwrap_err();
        assert!(matches!(err, GeoScatterError::DataSource { .. }));
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_cache_key_includes_attribute() {
        let a = ShapefileSource::new(PathBuf::from("a.shp"), "ADM0_A3");
        let b = ShapefileSource::new(PathBuf::from("a.shp"), "ISO_A3");
        assert_ne!(a.cache_key(), b.cache_key());
    }
}
