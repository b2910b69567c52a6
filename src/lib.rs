//! # geoscatter
//!
//! Categorical scatter maps over a coastline basemap, for publication figures.
//!
//! Points read from a delimited file are drawn over country polygons in a plate
//! carrée map, one marker style per category, with degree-labelled gridlines, a
//! category legend and free-text annotations. Figures are written as PNG, JPEG,
//! PDF or SVG.
//!
//! ## Key Features
//!
//! - **Natural Earth basemaps**: country and coastline layers from a local
//!   cartopy-style shapefile cache, or any shapefile/GeoJSON boundary file
//! - **Strict category styling**: every category in the data must have a style
//!   entry; a missing one fails the render instead of dropping points
//! - **Composite markers**: categories may use a custom path glyph instead of a
//!   built-in marker shape
//! - **Multi-panel figures**: several maps on one page, each with its own data,
//!   legend and annotations
//!
//! ## Architecture
//!
//! - **Data Layer**: `data_loader` (points) and `boundary` (basemap geometry)
//! - **Styling**: `style` maps normalized category keys to colors and glyphs
//! - **Rendering**: `render` composes the page and encodes it
//! - **Entry**: `config` and `pipeline` drive a figure from a JSON description

pub mod boundary;
pub mod config;
pub mod data_loader;
pub mod error;
pub mod geoutil;
pub mod logging;
pub mod pipeline;
pub mod render;
pub mod style;

pub use boundary::{BoundaryGeometry, BoundarySource, BoundarySpec, CountryShape};
pub use config::Config;
pub use data_loader::{load_points, PointColumns, PointRecord};
pub use error::{GeoScatterError, Result};
pub use geoutil::Extent;
pub use logging::{
    generate_render_id, init_tracing, log_boundary_load_stats, log_error, log_operation_end,
    log_operation_start, log_timed_operation,
};
pub use render::{
    Figure, GeoScatterRenderer, LegendSpec, OutputFormat, Panel, RenderOptions, TextAnnotation,
};
pub use style::{CategoryStyle, Color, MarkerStyle, NamedShape, StyleMapping};
