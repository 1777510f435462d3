//! Error types for gridwell

use thiserror::Error;

/// Main error type for gridwell operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("No sample points provided")]
    EmptyInput,

    #[error("Invalid resolution: {value} (must be a finite value greater than zero)")]
    InvalidResolution { value: f64 },

    #[error("Malformed record {record}: unusable {field} {value:?}")]
    MalformedField {
        /// 1-based position of the record, header excluded (0 is the header)
        record: usize,
        field: String,
        value: String,
    },

    #[error("Required field '{name}' not found in point source header")]
    MissingField { name: String },

    #[error("Failed to write raster: {0}")]
    SinkWrite(String),

    #[error("Invalid raster dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    #[error("Index out of bounds: ({row}, {col}) in raster of size ({rows}, {cols})")]
    IndexOutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("Unsupported data type: {0}")]
    UnsupportedDataType(String),

    #[error("GDAL error: {0}")]
    #[cfg(feature = "gdal")]
    Gdal(String),

    #[error("Invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("{0}")]
    Other(String),
}

#[cfg(feature = "gdal")]
impl From<gdal::errors::GdalError> for Error {
    fn from(e: gdal::errors::GdalError) -> Self {
        Error::Gdal(e.to_string())
    }
}

/// Result type alias for gridwell operations
pub type Result<T> = std::result::Result<T, Error>;
