//! Output encoding.
//!
//! The composed SVG is parsed with `usvg`. Raster formats are rendered by `resvg`
//! into a `tiny-skia` pixmap at `dpi / 72` pixels per point and encoded with
//! `image`; PDF goes through `svg2pdf`; SVG is written as composed.

use image::{DynamicImage, RgbaImage};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Cursor, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, warn};

use super::layout::POINTS_PER_INCH;
use crate::error::{GeoScatterError, Result};

/// Refuse rasters larger than this many pixels
pub const MAX_PIXELS: u64 = 400_000_000;

/// Output file format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Png,
    #[serde(alias = "jpg")]
    Jpeg,
    Pdf,
    Svg,
}

impl OutputFormat {
    /// Guess the format from a file extension
    pub fn from_extension(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        ext.parse().ok()
    }

    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Jpeg => "jpeg",
            OutputFormat::Pdf => "pdf",
            OutputFormat::Svg => "svg",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = GeoScatterError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "png" => Ok(OutputFormat::Png),
            "jpeg" | "jpg" => Ok(OutputFormat::Jpeg),
            "pdf" => Ok(OutputFormat::Pdf),
            "svg" => Ok(OutputFormat::Svg),
            other => Err(GeoScatterError::InvalidParameter {
                param: "format".to_string(),
                message: format!(
                    "Unsupported output format: {}. Supported formats: png, jpeg, pdf, svg",
                    other
                ),
            }),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

/// Where text glyphs come from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontOptions {
    #[serde(default = "default_font_family")]
    pub family: String,

    /// Extra font files loaded on top of the system fonts
    #[serde(default)]
    pub files: Vec<PathBuf>,

    #[serde(default = "enabled")]
    pub system_fonts: bool,
}

impl Default for FontOptions {
    fn default() -> Self {
        Self {
            family: default_font_family(),
            files: Vec::new(),
            system_fonts: true,
        }
    }
}

fn default_font_family() -> String {
    "DejaVu Sans".to_string()
}

fn enabled() -> bool {
    true
}

static SYSTEM_FONTS: Lazy<Arc<usvg::fontdb::Database>> = Lazy::new(|| {
    let mut db = usvg::fontdb::Database::new();
    db.load_system_fonts();
    debug!(faces = db.len(), "Loaded system fonts");
    Arc::new(db)
});

fn font_database(fonts: &FontOptions) -> Result<Arc<usvg::fontdb::Database>> {
    let base = if fonts.system_fonts {
        Arc::clone(&SYSTEM_FONTS)
    } else {
        Arc::new(usvg::fontdb::Database::new())
    };
    if fonts.files.is_empty() {
        return Ok(base);
    }

    let mut db = (*base).clone();
    for path in &fonts.files {
        db.load_font_file(path).map_err(|e| {
            GeoScatterError::data_source(format!(
                "Failed to load font file {}: {}",
                path.display(),
                e
            ))
        })?;
    }
    Ok(Arc::new(db))
}

/// Parse a composed document into a render tree
pub fn parse_svg(svg: &str, fonts: &FontOptions) -> Result<usvg::Tree> {
    let mut options = usvg::Options {
        font_family: fonts.family.clone(),
        ..Default::default()
    };
    options.fontdb = font_database(fonts)?;
    if options.fontdb.is_empty() {
        warn!("No fonts available; text will not be drawn");
    }

    usvg::Tree::from_str(svg, &options)
        .map_err(|e| GeoScatterError::encoding(format!("Failed to parse figure SVG: {}", e)))
}

/// Render a tree to straight-alpha RGBA pixels at `dpi`
pub fn rasterize(tree: &usvg::Tree, dpi: f64) -> Result<RgbaImage> {
    let scale = (dpi / POINTS_PER_INCH) as f32;
    let size = tree.size();
    let width = (size.width() * scale).ceil() as u32;
    let height = (size.height() * scale).ceil() as u32;

    if width as u64 * height as u64 > MAX_PIXELS {
        return Err(GeoScatterError::encoding(format!(
            "A {}x{} raster exceeds the {} pixel limit; lower the DPI or the figure size",
            width, height, MAX_PIXELS
        )));
    }

    let mut pixmap = tiny_skia::Pixmap::new(width, height).ok_or_else(|| {
        GeoScatterError::encoding(format!("Cannot allocate a {}x{} raster", width, height))
    })?;
    pixmap.fill(tiny_skia::Color::WHITE);
    resvg::render(
        tree,
        tiny_skia::Transform::from_scale(scale, scale),
        &mut pixmap.as_mut(),
    );

    let mut pixels = Vec::with_capacity(pixmap.pixels().len() * 4);
    for pixel in pixmap.pixels() {
        let c = pixel.demultiply();
        pixels.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
    }

    RgbaImage::from_raw(width, height, pixels)
        .ok_or_else(|| GeoScatterError::encoding("Raster buffer size mismatch"))
}

/// Encode a composed document into the bytes of `format`
pub fn encode(svg: &str, format: OutputFormat, dpi: f64, fonts: &FontOptions) -> Result<Vec<u8>> {
    if format == OutputFormat::Svg {
        return Ok(svg.as_bytes().to_vec());
    }

    let tree = parse_svg(svg, fonts)?;

    match format {
        OutputFormat::Png => {
            let img = rasterize(&tree, dpi)?;
            let mut buffer = Cursor::new(Vec::new());
            img.write_to(&mut buffer, image::ImageFormat::Png)
                .map_err(|e| GeoScatterError::encoding(format!("Failed to encode PNG: {}", e)))?;
            Ok(buffer.into_inner())
        }
        OutputFormat::Jpeg => {
            let img = DynamicImage::ImageRgba8(rasterize(&tree, dpi)?).to_rgb8();
            let mut buffer = Cursor::new(Vec::new());
            img.write_to(&mut buffer, image::ImageFormat::Jpeg)
                .map_err(|e| GeoScatterError::encoding(format!("Failed to encode JPEG: {}", e)))?;
            Ok(buffer.into_inner())
        }
        OutputFormat::Pdf => svg2pdf::to_pdf(
            &tree,
            svg2pdf::ConversionOptions::default(),
            svg2pdf::PageOptions::default(),
        )
        .map_err(|e| GeoScatterError::encoding(format!("Failed to convert to PDF: {}", e))),
        OutputFormat::Svg => Ok(svg.as_bytes().to_vec()),
    }
}

/// Write encoded bytes to `path`; the file is flushed and closed on every path
pub fn write_output(path: &Path, bytes: &[u8]) -> Result<()> {
    let file = File::create(path).map_err(|e| {
        GeoScatterError::encoding(format!("Cannot create {}: {}", path.display(), e))
    })?;
    let mut writer = BufWriter::new(file);
    writer
        .write_all(bytes)
        .and_then(|_| writer.flush())
        .map_err(|e| GeoScatterError::encoding(format!("Cannot write {}: {}", path.display(), e)))?;

    debug!(path = %path.display(), bytes = bytes.len(), "Output written");
    Ok(())
}
