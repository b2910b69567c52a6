//! Point data loading.
//!
//! Reads a delimited text file with longitude, latitude and category columns into
//! `PointRecord`s. Category values are normalized on load so they compare directly
//! with style-mapping keys.

use csv::{ReaderBuilder, StringRecord, Trim};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::File;
use std::path::Path;
use tracing::{debug, info};

use crate::error::{GeoScatterError, Result};
use crate::geoutil::validate_coordinates;
use crate::style::normalize_category_key;

/// One plotted sample location
#[derive(Debug, Clone, PartialEq)]
pub struct PointRecord {
    pub longitude: f64,
    pub latitude: f64,
    pub category: String,
}

impl PointRecord {
    /// Create a point, validating its coordinates and normalizing its category
    pub fn new(longitude: f64, latitude: f64, category: &str) -> Result<Self> {
        validate_coordinates(longitude, latitude)?;
        Ok(Self {
            longitude,
            latitude,
            category: normalize_category_key(category),
        })
    }
}

/// Column layout of a point file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointColumns {
    #[serde(default = "default_longitude_column")]
    pub longitude: String,

    #[serde(default = "default_latitude_column")]
    pub latitude: String,

    /// Name of the categorical column, e.g. "Cruise" or "Cluster"
    pub category: String,

    /// Field delimiter; defaults to tab for `.tsv` files and comma otherwise
    #[serde(default)]
    pub delimiter: Option<char>,
}

impl PointColumns {
    pub fn new(category: &str) -> Self {
        Self {
            longitude: default_longitude_column(),
            latitude: default_latitude_column(),
            category: category.to_string(),
            delimiter: None,
        }
    }
}

fn default_longitude_column() -> String {
    "Longitude".to_string()
}

fn default_latitude_column() -> String {
    "Latitude".to_string()
}

/// Load point records from a delimited file
pub fn load_points(path: &Path, columns: &PointColumns) -> Result<Vec<PointRecord>> {
    if !path.exists() {
        return Err(GeoScatterError::data_source(format!(
            "Point data file not found: {}",
            path.display()
        )));
    }

    let file = File::open(path).map_err(|e| {
        GeoScatterError::data_source(format!("Failed to open {}: {}", path.display(), e))
    })?;

    let delimiter = columns.delimiter.unwrap_or_else(|| {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("tsv") => '\t',
            _ => ',',
        }
    });
    if !delimiter.is_ascii() {
        return Err(GeoScatterError::InvalidParameter {
            param: "delimiter".to_string(),
            message: format!("Delimiter must be an ASCII character, got '{}'", delimiter),
        });
    }

    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter as u8)
        .trim(Trim::All)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| {
            GeoScatterError::data_source(format!(
                "Failed to read header of {}: {}",
                path.display(),
                e
            ))
        })?
        .clone();

    let find = |name: &str| -> Result<usize> {
        headers
            .iter()
            .position(|h| h == name)
            .or_else(|| headers.iter().position(|h| h.eq_ignore_ascii_case(name)))
            .ok_or_else(|| {
                GeoScatterError::data_source(format!(
                    "Column '{}' not found in {}",
                    name,
                    path.display()
                ))
            })
    };

    let lon_idx = find(&columns.longitude)?;
    let lat_idx = find(&columns.latitude)?;
    let cat_idx = find(&columns.category)?;
    debug!(
        lon_idx = lon_idx,
        lat_idx = lat_idx,
        cat_idx = cat_idx,
        "Resolved point columns"
    );

    let mut points = Vec::new();
    for (row, result) in reader.records().enumerate() {
        // Header is line 1
        let line = row + 2;
        let record = result.map_err(|e| {
            GeoScatterError::data_source(format!("{}:{}: {}", path.display(), line, e))
        })?;

        let longitude = parse_number(&record, lon_idx, &columns.longitude, path, line)?;
        let latitude = parse_number(&record, lat_idx, &columns.latitude, path, line)?;
        let category = required_field(&record, cat_idx, &columns.category, path, line)?;

        points.push(PointRecord::new(longitude, latitude, category)?);
    }

    info!(
        file_path = %path.display(),
        point_count = points.len(),
        category_count = distinct_categories(&points).len(),
        "Point data loaded"
    );

    Ok(points)
}

fn required_field<'r>(
    record: &'r StringRecord,
    idx: usize,
    name: &str,
    path: &Path,
    line: usize,
) -> Result<&'r str> {
    match record.get(idx) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(GeoScatterError::data_source(format!(
            "{}:{}: missing value for '{}'",
            path.display(),
            line,
            name
        ))),
    }
}

fn parse_number(
    record: &StringRecord,
    idx: usize,
    name: &str,
    path: &Path,
    line: usize,
) -> Result<f64> {
    let raw = required_field(record, idx, name, path, line)?;
    raw.parse::<f64>().map_err(|_| {
        GeoScatterError::data_source(format!(
            "{}:{}: invalid {} '{}'",
            path.display(),
            line,
            name,
            raw
        ))
    })
}

/// Distinct category keys in first-appearance order
pub fn distinct_categories(points: &[PointRecord]) -> Vec<String> {
    let mut seen = HashSet::new();
    points
        .iter()
        .filter(|p| seen.insert(p.category.as_str()))
        .map(|p| p.category.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(dir: &tempfile::TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut f = File::create(&path).unwrap();
        f.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_load_cruise_points() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "cruise.csv",
            "Station,Longitude,Latitude,Cruise\nS1,135.0,35.0,KS-22-15\nS2, 140.5 ,45.25,KH-23-3\n",
        );

        let points = load_points(&path, &PointColumns::new("Cruise")).unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0], PointRecord::new(135.0, 35.0, "KS-22-15").unwrap());
        assert_eq!(points[1].longitude, 140.5);
        assert_eq!(points[1].category, "KH-23-3");
    }

    #[test]
    fn test_numeric_categories_are_normalized() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "clusters.csv",
            "Longitude,Latitude,Cluster\n135,35,7\n136,36,07\n137,37,7.0\n",
        );

        let points = load_points(&path, &PointColumns::new("Cluster")).unwrap();
        assert!(points.iter().all(|p| p.category == "7"));
        assert_eq!(distinct_categories(&points), vec!["7"]);
    }

    #[test]
    fn test_tab_delimited() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "clusters.tsv", "Longitude\tLatitude\tCluster\n135\t35\t1\n");
        let points = load_points(&path, &PointColumns::new("Cluster")).unwrap();
        assert_eq!(points.len(), 1);
    }

    #[test]
    fn test_missing_file_is_data_source_error() {
        let err = load_points(Path::new("/no/such/file.csv"), &PointColumns::new("Cruise"))
            .unwrap_err();
        assert!(matches!(err, GeoScatterError::DataSource { .. }));
    }

    #[test]
    fn test_missing_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "p.csv", "Longitude,Latitude\n135,35\n");
        let err = load_points(&path, &PointColumns::new("Cruise")).unwrap_err();
        assert!(err.to_string().contains("Column 'Cruise' not found"));
    }

    #[test]
    fn test_invalid_number_reports_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "p.csv", "Longitude,Latitude,Cruise\n135,35,A\nabc,35,B\n");
        let err = load_points(&path, &PointColumns::new("Cruise")).unwrap_err();
        assert!(matches!(err, GeoScatterError::DataSource { .. }));
        assert!(err.to_string().contains(":3:"));
    }

    #[test]
    fn test_out_of_range_coordinates() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "p.csv", "Longitude,Latitude,Cruise\n200,35,A\n");
        let err = load_points(&path, &PointColumns::new("Cruise")).unwrap_err();
        assert!(matches!(err, GeoScatterError::InvalidCoordinates { .. }));
    }

    #[test]
    fn test_case_insensitive_header_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "p.csv", "longitude,latitude,cluster\n135,35,2\n");
        let points = load_points(&path, &PointColumns::new("Cluster")).unwrap();
        assert_eq!(points[0].category, "2");
    }
}
