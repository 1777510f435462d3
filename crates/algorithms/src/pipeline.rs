//! Samples-to-raster pipeline
//!
//! Extent, grid sizing, geotransform and IDW chained into one call. Nothing
//! reaches the sink unless every stage succeeded.

use serde::Serialize;
use gridwell_core::io::RasterSink;
use gridwell_core::raster::{GeoTransform, Raster};
use gridwell_core::{Result, SamplePoint, CRS};

use crate::interpolation::{
    geotransform, idw, Extent, GridParams, GridSpec, IdwParams, DEFAULT_RESOLUTION,
};

/// User-facing settings for one surface
#[derive(Debug, Clone)]
pub struct SurfaceParams {
    /// Requested cell size in world units
    pub resolution: f64,
    /// IDW power parameter
    pub power: f64,
    /// Use at most this many nearest samples per cell
    pub max_points: Option<usize>,
    /// Ignore samples farther than this from a cell center
    pub max_radius: Option<f64>,
}

impl Default for SurfaceParams {
    fn default() -> Self {
        Self {
            resolution: DEFAULT_RESOLUTION,
            power: 2.0,
            max_points: None,
            max_radius: None,
        }
    }
}

/// What the pipeline derived on the way to the raster
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub sample_count: usize,
    pub extent: Extent,
    pub grid: GridSpec,
    pub transform: GeoTransform,
}

/// Build the interpolated surface without writing it anywhere.
///
/// The raster carries the geotransform and, when given, the projection.
pub fn interpolate_surface(
    points: &[SamplePoint],
    params: &SurfaceParams,
    crs: Option<CRS>,
) -> Result<(Raster<f64>, PipelineReport)> {
    let extent = Extent::from_points(points)?;
    let grid = GridSpec::from_extent(
        &extent,
        &GridParams {
            resolution: params.resolution,
        },
    )?;
    let transform = geotransform(&extent, &grid);

    let mut raster = idw(
        points,
        IdwParams {
            power: params.power,
            max_radius: params.max_radius,
            max_points: params.max_points,
            rows: grid.rows(),
            cols: grid.cols(),
            transform,
        },
    )?;
    raster.set_crs(crs);

    let report = PipelineReport {
        sample_count: points.len(),
        extent,
        grid,
        transform,
    };
    Ok((raster, report))
}

/// Interpolate `points` and hand the finished raster to `sink`.
pub fn run<S>(
    points: &[SamplePoint],
    params: &SurfaceParams,
    crs: Option<CRS>,
    sink: &mut S,
) -> Result<PipelineReport>
where
    S: RasterSink + ?Sized,
{
    let (raster, report) = interpolate_surface(points, params, crs)?;
    sink.write(&raster)?;
    Ok(report)
}
