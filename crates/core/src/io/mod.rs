//! Raster output and read-back
//!
//! The interpolation pipeline hands its finished raster to a [`RasterSink`].
//! The GeoTIFF sink is native (the `tiff` crate) unless the `gdal` feature
//! is enabled.

#[cfg(feature = "gdal")]
mod gdal_io;
mod native;

use crate::error::Result;
use crate::raster::Raster;
use std::path::PathBuf;

#[cfg(feature = "gdal")]
pub use gdal_io::{read_geotiff, write_geotiff, GeoTiffOptions};

#[cfg(not(feature = "gdal"))]
pub use native::{read_geotiff, write_geotiff, Compression, GeoTiffOptions};

// Buffer-based I/O (always available, no filesystem dependency)
pub use native::{read_geotiff_from_buffer, write_geotiff_to_buffer};

/// Destination for a finished raster.
///
/// A sink receives the complete raster exactly once: dimensions, row-major
/// values, geotransform and projection text all travel in the [`Raster`].
/// Implementations must not leave partial output behind on failure.
pub trait RasterSink {
    fn write(&mut self, raster: &Raster<f64>) -> Result<()>;
}

/// Writes a single-band 64-bit float GeoTIFF
#[derive(Debug, Clone)]
pub struct GeoTiffSink {
    path: PathBuf,
    options: GeoTiffOptions,
}

impl GeoTiffSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            options: GeoTiffOptions::default(),
        }
    }
}

impl RasterSink for GeoTiffSink {
    fn write(&mut self, raster: &Raster<f64>) -> Result<()> {
        write_geotiff(raster, &self.path, Some(self.options.clone()))
    }
}

/// Keeps the raster in memory, for callers that post-process the grid
#[derive(Debug, Default)]
pub struct MemorySink {
    raster: Option<Raster<f64>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raster(&self) -> Option<&Raster<f64>> {
        self.raster.as_ref()
    }

    pub fn into_raster(self) -> Option<Raster<f64>> {
        self.raster
    }
}

impl RasterSink for MemorySink {
    fn write(&mut self, raster: &Raster<f64>) -> Result<()> {
        self.raster = Some(raster.clone());
        Ok(())
    }
}
