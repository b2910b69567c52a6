//! Configuration management for geoscatter.
//!
//! This module handles the layered configuration system with the following precedence:
//! 1. Command-line arguments (highest priority)
//! 2. Environment variables
//! 3. JSON figure file
//! 4. Default values (lowest priority)

use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::boundary::BoundarySpec;
use crate::data_loader::PointColumns;
use crate::error::{GeoScatterError, Result};
use crate::geoutil::Extent;
use crate::render::{
    BasemapStyle, FontOptions, GridSpec, LegendSpec, Margins, MarkerAppearance, OutputFormat,
    TextAnnotation, DEFAULT_DPI, DEFAULT_FIGURE_SIZE,
};
use crate::style::{Color, StyleMapping};

/// Command-line arguments for geoscatter
#[derive(Parser, Debug)]
#[command(name = "geoscatter")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the JSON figure description
    pub figure: PathBuf,

    /// Output file (overrides the figure file)
    #[arg(short, long, env = "GEOSCATTER_OUTPUT")]
    pub output: Option<PathBuf>,

    /// Output format (png, jpeg, pdf, svg); guessed from the output extension if omitted
    #[arg(short, long, env = "GEOSCATTER_FORMAT")]
    pub format: Option<OutputFormat>,

    /// Raster resolution in dots per inch
    #[arg(long, env = "GEOSCATTER_DPI")]
    pub dpi: Option<f64>,

    /// Map extent "west,east,south,north" applied to every panel
    #[arg(long, env = "GEOSCATTER_EXTENT", allow_hyphen_values = true)]
    pub extent: Option<Extent>,

    /// Directory holding cartopy-style Natural Earth shapefiles
    #[arg(long, env = "GEOSCATTER_NATURAL_EARTH_DIR")]
    pub natural_earth_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "GEOSCATTER_LOG_LEVEL")]
    pub log_level: Option<String>,
}

/// Output file settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub path: Option<PathBuf>,

    #[serde(default)]
    pub format: Option<OutputFormat>,

    #[serde(default = "default_dpi")]
    pub dpi: f64,
}

/// Page geometry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FigureConfig {
    #[serde(default = "default_width")]
    pub width_in: f64,

    #[serde(default = "default_height")]
    pub height_in: f64,

    #[serde(default = "default_grid_dim")]
    pub rows: usize,

    #[serde(default = "default_grid_dim")]
    pub columns: usize,

    #[serde(default)]
    pub margins: Margins,

    #[serde(default = "default_background")]
    pub background: Color,
}

/// Boundary sources and colors of a panel's basemap
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasemapConfig {
    #[serde(default = "BoundarySpec::natural_earth_countries")]
    pub boundary: BoundarySpec,

    /// Coastline layer. Absent means the boundary's companion layer (the Natural
    /// Earth coastline for Natural Earth boundaries); `null` turns it off. Without
    /// a coastline layer the land polygons are outlined instead.
    #[serde(
        default,
        deserialize_with = "present_or_null",
        skip_serializing_if = "Option::is_none"
    )]
    pub coastline: Option<Option<BoundarySpec>>,

    #[serde(flatten)]
    pub style: BasemapStyle,
}

impl BasemapConfig {
    /// The coastline layer to merge into this panel's boundary geometry
    pub fn coastline_layer(&self) -> Option<BoundarySpec> {
        match &self.coastline {
            Some(explicit) => explicit.clone(),
            None => self.boundary.coastline_companion(),
        }
    }
}

// Keeps an explicit `null` apart from a missing key
fn present_or_null<'de, D>(deserializer: D) -> std::result::Result<Option<Option<BoundarySpec>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<BoundarySpec>::deserialize(deserializer).map(Some)
}

/// One panel of the figure file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelConfig {
    /// Delimited point file
    pub data: PathBuf,

    pub columns: PointColumns,

    pub style: StyleMapping,

    #[serde(default)]
    pub legend: LegendSpec,

    #[serde(default)]
    pub annotations: Vec<TextAnnotation>,

    /// Falls back to the figure-wide extent
    #[serde(default)]
    pub extent: Option<Extent>,

    #[serde(default)]
    pub basemap: BasemapConfig,

    #[serde(default)]
    pub grid: GridSpec,

    #[serde(default)]
    pub markers: MarkerAppearance,
}

/// Complete configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub figure: FigureConfig,

    #[serde(default)]
    pub fonts: FontOptions,

    /// Extent for panels that do not set their own
    #[serde(default)]
    pub extent: Option<Extent>,

    /// Defaults to cartopy's data directory
    #[serde(default)]
    pub natural_earth_dir: Option<PathBuf>,

    #[serde(default)]
    pub panels: Vec<PanelConfig>,

    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Config {
    /// Load configuration from all sources with proper precedence
    pub fn load() -> Result<Self> {
        let args = Args::parse();
        Self::from_args(args)
    }

    /// Build the configuration from already-parsed arguments
    pub fn from_args(args: Args) -> Result<Self> {
        // Start with defaults, then the figure file
        let mut config = Config::default();
        config.merge(Self::load_from_file(&args.figure)?);

        // Environment and command line (clap already layered those two)
        if let Some(output) = args.output {
            config.output.path = Some(output);
        }
        if args.format.is_some() {
            config.output.format = args.format;
        }
        if let Some(dpi) = args.dpi {
            config.output.dpi = dpi;
        }
        if let Some(extent) = args.extent {
            config.extent = Some(extent);
            for panel in &mut config.panels {
                panel.extent = Some(extent);
            }
        }
        if args.natural_earth_dir.is_some() {
            config.natural_earth_dir = args.natural_earth_dir;
        }
        if let Some(level) = args.log_level {
            config.log_level = level;
        }

        Ok(config)
    }

    /// Load a figure file; relative paths inside it resolve against its directory
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| GeoScatterError::Config {
            message: format!("Cannot read figure file {}: {}", path.display(), e),
        })?;
        let mut config: Config =
            serde_json::from_str(&content).map_err(|e| GeoScatterError::Config {
                message: format!("Invalid figure file {}: {}", path.display(), e),
            })?;

        if let Some(base) = path.parent() {
            config.resolve_paths(base);
        }
        Ok(config)
    }

    fn resolve_paths(&mut self, base: &Path) {
        let resolve = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };

        if let Some(p) = self.output.path.as_mut() {
            resolve(p);
        }
        if let Some(p) = self.natural_earth_dir.as_mut() {
            resolve(p);
        }
        for file in &mut self.fonts.files {
            resolve(file);
        }
        for panel in &mut self.panels {
            resolve(&mut panel.data);
            for spec in std::iter::once(&mut panel.basemap.boundary)
                .chain(panel.basemap.coastline.as_mut().and_then(Option::as_mut))
            {
                match spec {
                    BoundarySpec::NaturalEarth { data_dir, .. } => {
                        if let Some(p) = data_dir.as_mut() {
                            resolve(p);
                        }
                    }
                    BoundarySpec::Shapefile { path, .. } | BoundarySpec::GeoJson { path, .. } => {
                        resolve(path)
                    }
                }
            }
        }
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        if other.output.path.is_some() {
            self.output.path = other.output.path;
        }
        if other.output.format.is_some() {
            self.output.format = other.output.format;
        }
        self.output.dpi = other.output.dpi;
        self.figure = other.figure;
        self.fonts = other.fonts;
        if other.extent.is_some() {
            self.extent = other.extent;
        }
        if other.natural_earth_dir.is_some() {
            self.natural_earth_dir = other.natural_earth_dir;
        }
        self.panels = other.panels;
        self.log_level = other.log_level;
    }

    /// Natural Earth directory, falling back to cartopy's default location
    pub fn natural_earth_dir(&self) -> PathBuf {
        if let Some(dir) = &self.natural_earth_dir {
            return dir.clone();
        }
        let data_home = std::env::var_os("XDG_DATA_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".local/share")))
            .unwrap_or_else(|| PathBuf::from("."));
        data_home.join("cartopy")
    }

    /// Output format: explicit, else from the output extension, else PNG
    pub fn output_format(&self) -> OutputFormat {
        self.output
            .format
            .or_else(|| {
                self.output
                    .path
                    .as_deref()
                    .and_then(OutputFormat::from_extension)
            })
            .unwrap_or_default()
    }

    /// Output path, defaulting to `figure.<ext>` in the working directory
    pub fn output_path(&self) -> PathBuf {
        self.output
            .path
            .clone()
            .unwrap_or_else(|| PathBuf::from(format!("figure.{}", self.output_format())))
    }

    /// Extent of panel `index`
    pub fn panel_extent(&self, index: usize) -> Result<Extent> {
        self.panels
            .get(index)
            .and_then(|p| p.extent)
            .or(self.extent)
            .ok_or_else(|| GeoScatterError::Config {
                message: format!("Panel {} has no extent and no figure-wide extent is set", index),
            })
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        // Validate log level
        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(GeoScatterError::Config {
                    message: format!(
                        "Invalid log level: {}. Must be one of: trace, debug, info, warn, error",
                        self.log_level
                    ),
                });
            }
        }

        if !self.output.dpi.is_finite() || self.output.dpi <= 0.0 {
            return Err(GeoScatterError::Config {
                message: format!("DPI must be positive, got {}", self.output.dpi),
            });
        }

        let figure = &self.figure;
        if !(figure.width_in > 0.0 && figure.height_in > 0.0)
            || !figure.width_in.is_finite()
            || !figure.height_in.is_finite()
        {
            return Err(GeoScatterError::Config {
                message: format!(
                    "Figure size must be positive, got {} x {} in",
                    figure.width_in, figure.height_in
                ),
            });
        }

        if self.panels.is_empty() {
            return Err(GeoScatterError::Config {
                message: "The figure file defines no panels".to_string(),
            });
        }

        if figure.rows == 0 || figure.columns == 0 || self.panels.len() > figure.rows * figure.columns
        {
            return Err(GeoScatterError::Config {
                message: format!(
                    "{} panels do not fit a {} x {} grid",
                    self.panels.len(),
                    figure.rows,
                    figure.columns
                ),
            });
        }

        for (index, panel) in self.panels.iter().enumerate() {
            self.panel_extent(index)?.validate()?;
            if panel.style.is_empty() {
                return Err(GeoScatterError::Config {
                    message: format!("Panel {} has an empty style mapping", index),
                });
            }
            if panel.columns.category.trim().is_empty() {
                return Err(GeoScatterError::Config {
                    message: format!("Panel {} names no category column", index),
                });
            }
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output: OutputConfig::default(),
            figure: FigureConfig::default(),
            fonts: FontOptions::default(),
            extent: None,
            natural_earth_dir: None,
            panels: Vec::new(),
            log_level: default_log_level(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: None,
            format: None,
            dpi: default_dpi(),
        }
    }
}

impl Default for FigureConfig {
    fn default() -> Self {
        Self {
            width_in: default_width(),
            height_in: default_height(),
            rows: default_grid_dim(),
            columns: default_grid_dim(),
            margins: Margins::default(),
            background: default_background(),
        }
    }
}

impl Default for BasemapConfig {
    fn default() -> Self {
        Self {
            boundary: BoundarySpec::natural_earth_countries(),
            coastline: None,
            style: BasemapStyle::default(),
        }
    }
}

// Default value functions for serde
fn default_dpi() -> f64 {
    DEFAULT_DPI
}

fn default_width() -> f64 {
    DEFAULT_FIGURE_SIZE.0
}

fn default_height() -> f64 {
    DEFAULT_FIGURE_SIZE.1
}

fn default_grid_dim() -> usize {
    1
}

fn default_background() -> Color {
    Color::WHITE
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const CLUSTER_FIGURE: &str = r##"{
        "output": {"path": "Combined_cluster_map3.png", "dpi": 300},
        "figure": {"width_in": 17.4, "height_in": 23.4, "columns": 3},
        "extent": [126.0, 162.0, 26.0, 50.0],
        "panels": [
            {
                "data": "bucket.csv",
                "columns": {"category": "Cluster"},
                "legend": {"title": "Cluster", "title_size": 12, "label_size": 10},
                "style": {
                    "1": {"color": "red", "marker": "o"},
                    "7": {"color": "pink", "marker": null}
                },
                "basemap": {"region": "JPN", "boundary": {"kind": "geojson", "path": "countries.geojson"}},
                "annotations": [
                    {"text": "(a)", "x": 0.02, "y": 0.98, "size": 16, "weight": "bold", "ha": "left", "va": "top"}
                ]
            }
        ]
    }"##;

    fn parse(json: &str) -> Config {
        let mut config: Config = serde_json::from_str(json).unwrap();
        config.resolve_paths(Path::new("/figures"));
        config
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.output.dpi, 600.0);
        assert_eq!(config.figure.width_in, 10.0);
        assert_eq!(config.figure.height_in, 6.0);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.output_format(), OutputFormat::Png);
        assert_eq!(config.output_path(), PathBuf::from("figure.png"));
    }

    #[test]
    fn test_parse_figure_file() {
        let config = parse(CLUSTER_FIGURE);
        assert!(config.validate().is_ok());
        assert_eq!(config.figure.columns, 3);
        assert_eq!(config.panels[0].data, PathBuf::from("/figures/bucket.csv"));
        assert_eq!(config.panels[0].columns.longitude, "Longitude");
        assert_eq!(config.panels[0].basemap.style.region.as_deref(), Some("JPN"));
        assert_eq!(
            config.panels[0].basemap.boundary,
            BoundarySpec::GeoJson {
                path: PathBuf::from("/figures/countries.geojson"),
                code_property: "ADM0_A3".to_string(),
            }
        );
        assert_eq!(config.output_format(), OutputFormat::Png);
        assert_eq!(
            config.panel_extent(0).unwrap(),
            Extent::from([126.0, 162.0, 26.0, 50.0])
        );
    }

    #[test]
    fn test_coastline_layer_follows_boundary() {
        // Natural Earth countries come with the Natural Earth coastline
        let basemap: BasemapConfig = serde_json::from_str(r#"{"region": "JPN"}"#).unwrap();
        assert_eq!(
            basemap.coastline_layer(),
            Some(BoundarySpec::NaturalEarth {
                resolution: "10m".to_string(),
                category: "physical".to_string(),
                name: "coastline".to_string(),
                data_dir: None,
                code_attribute: "ADM0_A3".to_string(),
            })
        );
        assert_eq!(basemap.coastline_layer(), BasemapConfig::default().coastline_layer());

        let basemap: BasemapConfig = serde_json::from_str(r#"{"coastline": null}"#).unwrap();
        assert_eq!(basemap.coastline_layer(), None);

        let basemap: BasemapConfig =
            serde_json::from_str(r#"{"boundary": {"kind": "geojson", "path": "countries.geojson"}}"#)
                .unwrap();
        assert_eq!(basemap.coastline_layer(), None);

        let config = parse(
            r#"{"panels": [{
                "data": "a.csv",
                "columns": {"category": "Cluster"},
                "style": {},
                "basemap": {
                    "boundary": {"kind": "geojson", "path": "countries.geojson"},
                    "coastline": {"kind": "shapefile", "path": "coast/ne_10m_coastline.shp"}
                }
            }]}"#,
        );
        assert_eq!(
            config.panels[0].basemap.coastline_layer(),
            Some(BoundarySpec::Shapefile {
                path: PathBuf::from("/figures/coast/ne_10m_coastline.shp"),
                code_attribute: "ADM0_A3".to_string(),
            })
        );
    }

    #[test]
    fn test_config_merge() {
        let mut config1 = Config::default();
        let mut config2 = Config::default();

        config2.output.dpi = 300.0;
        config2.output.format = Some(OutputFormat::Pdf);

        config1.merge(config2);

        assert_eq!(config1.output.dpi, 300.0);
        assert_eq!(config1.output.format, Some(OutputFormat::Pdf));
    }

    #[test]
    fn test_cli_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("figure.json");
        std::fs::write(&path, CLUSTER_FIGURE).unwrap();

        let args = Args::parse_from([
            "geoscatter",
            path.to_str().unwrap(),
            "--output",
            "/tmp/out.pdf",
            "--dpi",
            "150",
            "--extent",
            "120,150,20,45",
            "--log-level",
            "debug",
        ]);
        let config = Config::from_args(args).unwrap();

        assert_eq!(config.output.dpi, 150.0);
        assert_eq!(config.output_format(), OutputFormat::Pdf);
        assert_eq!(config.log_level, "debug");
        assert_eq!(
            config.panel_extent(0).unwrap(),
            Extent::from([120.0, 150.0, 20.0, 45.0])
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        // Valid config should pass
        let config = parse(CLUSTER_FIGURE);
        assert!(config.validate().is_ok());

        // No panels
        let config = Config::default();
        assert!(config.validate().is_err());

        // Test invalid log level
        let mut config = parse(CLUSTER_FIGURE);
        config.log_level = "invalid".to_string();
        assert!(config.validate().is_err());

        // Test invalid DPI
        let mut config = parse(CLUSTER_FIGURE);
        config.output.dpi = 0.0;
        assert!(config.validate().is_err());

        // Too many panels for the grid
        let mut config = parse(CLUSTER_FIGURE);
        config.figure.columns = 1;
        config.panels.push(config.panels[0].clone());
        assert!(config.validate().is_err());

        // Missing extent
        let mut config = parse(CLUSTER_FIGURE);
        config.extent = None;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_figure_file() {
        let err = Config::load_from_file(Path::new("/no/such/figure.json")).unwrap_err();
        assert!(matches!(err, GeoScatterError::Config { .. }));
    }
}
