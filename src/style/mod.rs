//! Per-category styling for scatter markers.
//!
//! A style mapping associates each category key with a color and a marker glyph.
//! Markers are either one of the named matplotlib-style shapes or a composite path
//! built from line segments.

pub mod color;
pub mod mapping;
pub mod marker;

pub use color::Color;
pub use mapping::{normalize_category_key, sort_categories, CategoryStyle, StyleMapping};
pub use marker::{MarkerStyle, NamedShape, PathCommand};
