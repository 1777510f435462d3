//! GeoTIFF reading and writing using GDAL

use crate::crs::CRS;
use crate::error::{Error, Result};
use crate::raster::{GeoTransform, Raster, RasterElement};
use gdal::cpl::CslStringList;
use gdal::raster::{Buffer, GdalType};
use gdal::spatial_ref::SpatialRef;
use gdal::{Dataset, DriverManager};
use std::path::Path;

/// Options for writing GeoTIFF files
#[derive(Debug, Clone)]
pub struct GeoTiffOptions {
    /// Compression type: "DEFLATE", "LZW", "ZSTD", "NONE"
    pub compression: String,
    /// Tile size for tiled TIFFs (0 for strips)
    pub tile_size: usize,
    /// BigTIFF for files > 4GB
    pub bigtiff: bool,
}

impl Default for GeoTiffOptions {
    fn default() -> Self {
        Self {
            compression: "DEFLATE".to_string(),
            tile_size: 256,
            bigtiff: false,
        }
    }
}

/// Read band `band` (1-indexed, default 1) of a GDAL-readable raster
pub fn read_geotiff<T, P>(path: P, band: Option<usize>) -> Result<Raster<T>>
where
    T: RasterElement + GdalType,
    P: AsRef<Path>,
{
    let dataset = Dataset::open(path.as_ref())?;
    let rasterband = dataset.rasterband(band.unwrap_or(1))?;
    let (cols, rows) = dataset.raster_size();

    let buffer = rasterband.read_as::<T>((0, 0), (cols, rows), (cols, rows), None)?;
    let mut raster = Raster::from_vec(buffer.data().to_vec(), rows, cols)?;

    if let Ok(gt) = dataset.geo_transform() {
        raster.set_transform(GeoTransform::from_gdal(gt));
    }

    if let Ok(wkt) = dataset.spatial_ref().and_then(|srs| srs.to_wkt()) {
        raster.set_crs(Some(CRS::from_wkt(wkt)));
    }

    if let Some(nodata) = rasterband.no_data_value() {
        raster.set_nodata(Some(T::from_f64_or_nodata(nodata)));
    }

    Ok(raster)
}

/// Write a Raster to a GeoTIFF file through the GTiff driver.
///
/// GDAL writes into a temporary file next to `path`, which is renamed into
/// place after the dataset has been closed.
pub fn write_geotiff<T, P>(raster: &Raster<T>, path: P, options: Option<GeoTiffOptions>) -> Result<()>
where
    T: RasterElement + GdalType,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let opts = options.unwrap_or_default();
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let tmp = tempfile::Builder::new()
        .prefix(".gridwell-")
        .suffix(".tif")
        .tempfile_in(dir)
        .map_err(|e| Error::SinkWrite(format!("cannot create output in {}: {}", dir.display(), e)))?;

    write_dataset(raster, tmp.path(), &opts).map_err(|e| Error::SinkWrite(e.to_string()))?;

    tmp.persist(path).map_err(|e| {
        Error::SinkWrite(format!("cannot move output into place at {}: {}", path.display(), e.error))
    })?;

    Ok(())
}

fn write_dataset<T>(raster: &Raster<T>, path: &Path, opts: &GeoTiffOptions) -> Result<()>
where
    T: RasterElement + GdalType,
{
    let driver = DriverManager::get_driver_by_name("GTiff")?;
    let (rows, cols) = raster.shape();

    let mut create_options = CslStringList::new();
    create_options.set_name_value("COMPRESS", &opts.compression)?;
    if opts.tile_size > 0 {
        create_options.set_name_value("TILED", "YES")?;
        create_options.set_name_value("BLOCKXSIZE", &opts.tile_size.to_string())?;
        create_options.set_name_value("BLOCKYSIZE", &opts.tile_size.to_string())?;
    }
    if opts.bigtiff {
        create_options.set_name_value("BIGTIFF", "YES")?;
    }

    let mut dataset =
        driver.create_with_band_type_with_options::<T, _>(path, cols, rows, 1, &create_options)?;

    dataset.set_geo_transform(&raster.transform().to_gdal())?;

    if let Some(crs) = raster.crs() {
        let srs = SpatialRef::from_wkt(crs.wkt())?;
        dataset.set_spatial_ref(&srs)?;
    }

    let mut band = dataset.rasterband(1)?;
    if let Some(nodata) = raster.nodata() {
        band.set_no_data_value(Some(nodata.as_f64()))?;
    }

    let mut buffer = Buffer::new((cols, rows), raster.to_row_major());
    band.write((0, 0), (cols, rows), &mut buffer)?;

    Ok(())
}
