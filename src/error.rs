//! Error types for geoscatter.
//!
//! Every failure is fatal for the render in progress: errors propagate to the
//! caller, which reports the failing stage and aborts.

use thiserror::Error;

/// The main error type for geoscatter operations.
#[derive(Error, Debug)]
pub enum GeoScatterError {
    /// Boundary or point data missing, unreadable or malformed
    #[error("Data source error: {message}")]
    DataSource { message: String },

    /// A category present in the data has no entry in the style mapping
    #[error("No style defined for category '{category}'")]
    StyleLookup { category: String },

    /// The output image could not be produced or written
    #[error("Encoding error: {message}")]
    Encoding { message: String },

    /// Extent violates west < east / south < north or leaves the globe
    #[error("Invalid extent: {message}")]
    InvalidExtent { message: String },

    /// Point coordinates outside the valid longitude/latitude ranges
    #[error("Invalid coordinates: {message}")]
    InvalidCoordinates { message: String },

    /// Invalid parameter errors
    #[error("Invalid parameter: {param} - {message}")]
    InvalidParameter { param: String, message: String },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl GeoScatterError {
    /// Short name of the pipeline stage that produced this error.
    pub fn stage(&self) -> &'static str {
        match self {
            GeoScatterError::DataSource { .. } => "data_source",
            GeoScatterError::StyleLookup { .. } => "style_lookup",
            GeoScatterError::Encoding { .. } => "encoding",
            GeoScatterError::InvalidExtent { .. } | GeoScatterError::InvalidCoordinates { .. } => {
                "validation"
            }
            GeoScatterError::InvalidParameter { .. } | GeoScatterError::Config { .. } => "config",
            GeoScatterError::Io(_) => "io",
            GeoScatterError::Json(_) => "config",
        }
    }

    pub(crate) fn data_source(message: impl Into<String>) -> Self {
        GeoScatterError::DataSource {
            message: message.into(),
        }
    }

    pub(crate) fn encoding(message: impl Into<String>) -> Self {
        GeoScatterError::Encoding {
            message: message.into(),
        }
    }
}

/// Convenience type alias for Results with GeoScatterError
pub type Result<T> = std::result::Result<T, GeoScatterError>;
