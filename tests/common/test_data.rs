//! Test data generation utilities.
//!
//! This module writes small point files, boundary files and figure descriptions
//! with known contents for end-to-end rendering tests.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use geoscatter::{CategoryStyle, Color, Extent, MarkerStyle, NamedShape, StyleMapping};

/// The map window used throughout the tests (Sea of Japan / NW Pacific)
pub fn japan_extent() -> Extent {
    Extent::from([126.0, 162.0, 26.0, 50.0])
}

/// A boxy "Japan" and "Korea" as a GeoJSON FeatureCollection
pub const COUNTRIES_GEOJSON: &str = r#"{
    "type": "FeatureCollection",
    "features": [
        {
            "type": "Feature",
            "properties": {"ADM0_A3": "JPN", "NAME": "Japan"},
            "geometry": {
                "type": "MultiPolygon",
                "coordinates": [
                    [[[130.0, 31.0], [142.0, 31.0], [142.0, 45.0], [130.0, 45.0], [130.0, 31.0]]],
                    [[[143.0, 42.0], [146.0, 42.0], [146.0, 44.0], [143.0, 44.0], [143.0, 42.0]]]
                ]
            }
        },
        {
            "type": "Feature",
            "properties": {"ADM0_A3": "KOR", "NAME": "South Korea"},
            "geometry": {
                "type": "Polygon",
                "coordinates": [[[126.5, 34.5], [129.5, 34.5], [129.5, 38.0], [126.5, 38.0], [126.5, 34.5]]]
            }
        },
        {
            "type": "Feature",
            "properties": {"ADM0_A3": "FRA", "NAME": "France"},
            "geometry": {
                "type": "Polygon",
                "coordinates": [[[-4.0, 43.0], [7.0, 43.0], [7.0, 50.0], [-4.0, 50.0], [-4.0, 43.0]]]
            }
        }
    ]
}"#;

/// Write the country GeoJSON into `dir`
pub fn write_countries_geojson(dir: &Path) -> io::Result<PathBuf> {
    let path = dir.join("countries.geojson");
    fs::write(&path, COUNTRIES_GEOJSON)?;
    Ok(path)
}

/// Write a CSV point file with `Longitude,Latitude,<category_column>` columns
pub fn write_points_csv(
    dir: &Path,
    name: &str,
    category_column: &str,
    rows: &[(f64, f64, &str)],
) -> io::Result<PathBuf> {
    let mut content = format!("Station,Longitude,Latitude,{}\n", category_column);
    for (i, (lon, lat, category)) in rows.iter().enumerate() {
        content.push_str(&format!("S{},{},{},{}\n", i + 1, lon, lat, category));
    }
    let path = dir.join(name);
    fs::write(&path, content)?;
    Ok(path)
}

/// The two-category scenario: A is a red circle, B a blue triangle
pub fn two_category_style() -> StyleMapping {
    StyleMapping::new()
        .with(
            "A",
            CategoryStyle::new(Color::rgb(255, 0, 0), MarkerStyle::Named(NamedShape::Circle)),
        )
        .unwrap()
        .with(
            "B",
            CategoryStyle::new(
                Color::rgb(0, 0, 255),
                MarkerStyle::Named(NamedShape::TriangleUp),
            ),
        )
        .unwrap()
}

/// A three-panel cluster figure over `dir`, rendered at a low DPI
pub fn cluster_figure_json(output: &Path, format: &str) -> String {
    let panel = |data: &str, label: &str| {
        format!(
            r##"{{
                "data": "{data}",
                "columns": {{"category": "Cluster"}},
                "legend": {{"title": "Cluster", "title_size": 12, "label_size": 10}},
                "style": {{
                    "1": {{"color": "red", "marker": "o"}},
                    "2": {{"color": "blue", "marker": "^"}},
                    "3": {{"color": "green", "marker": "+"}},
                    "7": {{"color": "pink", "marker": null}}
                }},
                "basemap": {{
                    "region": "JPN",
                    "boundary": {{"kind": "geojson", "path": "countries.geojson"}}
                }},
                "annotations": [
                    {{"text": "Sea of Japan", "x": 0.25, "y": 0.55, "color": "#808080", "size": 12, "weight": "bold", "style": "italic"}},
                    {{"text": "Japan", "x": 0.35, "y": 0.37, "rotation": 36, "color": "white", "size": 12, "weight": "bold", "style": "italic"}},
                    {{"text": "{label}", "x": 0.02, "y": 0.98, "size": 16, "weight": "bold", "ha": "left", "va": "top"}}
                ]
            }}"##
        )
    };

    format!(
        r#"{{
            "log_level": "debug",
            "output": {{"path": "{output}", "format": "{format}", "dpi": 20}},
            "figure": {{"width_in": 17.4, "height_in": 23.4, "columns": 3}},
            "extent": [126.0, 162.0, 26.0, 50.0],
            "fonts": {{"system_fonts": false}},
            "panels": [{a}, {b}, {c}]
        }}"#,
        output = output.display(),
        format = format,
        a = panel("bucket.csv", "(a)"),
        b = panel("intake.csv", "(b)"),
        c = panel("niskin.csv", "(c)"),
    )
}
