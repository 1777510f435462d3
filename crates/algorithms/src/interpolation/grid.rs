//! Extent and grid sizing for scattered samples
//!
//! Derives the output raster layout from the samples themselves: the
//! bounding rectangle of all sample positions, an integer grid covering it
//! at a requested resolution, and the north-up geotransform tying cell
//! (0, 0) to the upper-left corner of the extent.

use serde::{Deserialize, Serialize};
use gridwell_core::raster::GeoTransform;
use gridwell_core::{Error, Result, SamplePoint};

/// Resolution of the well surfaces this tool was first built for, in degrees
/// (roughly 3 m at mid latitudes).
pub const DEFAULT_RESOLUTION: f64 = 2.6516228627319196e-05;

/// Axis-aligned bounding rectangle of a sample set.
///
/// Only produced from at least one sample, so `x_min <= x_max` and
/// `y_min <= y_max` always hold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl Extent {
    /// Bounding rectangle of the sample positions, in one pass.
    ///
    /// Sample values are ignored. Fails with [`Error::EmptyInput`] when there
    /// are no samples.
    pub fn from_points(points: &[SamplePoint]) -> Result<Self> {
        let (first, rest) = points.split_first().ok_or(Error::EmptyInput)?;

        let init = Self {
            x_min: first.x,
            x_max: first.x,
            y_min: first.y,
            y_max: first.y,
        };

        Ok(rest.iter().fold(init, |e, p| Self {
            x_min: e.x_min.min(p.x),
            x_max: e.x_max.max(p.x),
            y_min: e.y_min.min(p.y),
            y_max: e.y_max.max(p.y),
        }))
    }

    /// Span in X
    pub fn width(&self) -> f64 {
        (self.x_max - self.x_min).abs()
    }

    /// Span in Y
    pub fn height(&self) -> f64 {
        (self.y_max - self.y_min).abs()
    }

    /// Whether (x, y) lies inside or on the boundary
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x_min && x <= self.x_max && y >= self.y_min && y <= self.y_max
    }
}

/// Parameters for sizing the output grid
#[derive(Debug, Clone)]
pub struct GridParams {
    /// World units per pixel, shared by both axes
    pub resolution: f64,
}

impl Default for GridParams {
    fn default() -> Self {
        Self {
            resolution: DEFAULT_RESOLUTION,
        }
    }
}

/// Integer grid dimensions and the pixel size actually used.
///
/// Cells are square: `pixel_size_x == pixel_size_y`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridSpec {
    /// Number of columns, at least 1
    pub x_size: u32,
    /// Number of rows, at least 1
    pub y_size: u32,
    pub pixel_size_x: f64,
    pub pixel_size_y: f64,
}

impl GridSpec {
    /// Size a grid covering `extent` at `params.resolution`.
    ///
    /// Each axis gets `floor(span / resolution + 0.5)` cells, at least one.
    /// The shared pixel size is then recomputed from the X axis as
    /// `width / x_size`, so the grid spans the full X extent exactly. When
    /// the X span is zero the Y axis is used instead, and when both are zero
    /// (a single distinct position) the requested resolution is kept.
    pub fn from_extent(extent: &Extent, params: &GridParams) -> Result<Self> {
        let resolution = params.resolution;
        if !(resolution > 0.0 && resolution.is_finite()) {
            return Err(Error::InvalidResolution { value: resolution });
        }

        let x_size = axis_size(extent.width(), resolution)?;
        let y_size = axis_size(extent.height(), resolution)?;

        let pixel_size = if extent.width() > 0.0 {
            extent.width() / x_size as f64
        } else if extent.height() > 0.0 {
            extent.height() / y_size as f64
        } else {
            resolution
        };

        Ok(Self {
            x_size,
            y_size,
            pixel_size_x: pixel_size,
            pixel_size_y: pixel_size,
        })
    }

    /// Number of columns
    pub fn cols(&self) -> usize {
        self.x_size as usize
    }

    /// Number of rows
    pub fn rows(&self) -> usize {
        self.y_size as usize
    }

    /// Total number of cells
    pub fn cell_count(&self) -> usize {
        self.cols() * self.rows()
    }
}

/// Round-half-up cell count for one axis, clamped to at least 1
fn axis_size(span: f64, resolution: f64) -> Result<u32> {
    let cells = (span / resolution + 0.5).floor();
    if !cells.is_finite() || cells > u32::MAX as f64 {
        return Err(Error::InvalidParameter {
            name: "resolution",
            value: resolution.to_string(),
            reason: format!("a span of {} would need {} cells on one axis", span, cells),
        });
    }
    Ok((cells as u32).max(1))
}

/// North-up geotransform `(x_min, pixel, 0, y_max, 0, -pixel)`.
///
/// Row 0 is the northern edge of the extent.
pub fn geotransform(extent: &Extent, grid: &GridSpec) -> GeoTransform {
    GeoTransform::new(extent.x_min, extent.y_max, grid.pixel_size_x, -grid.pixel_size_y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn triangle() -> Vec<SamplePoint> {
        vec![
            SamplePoint::new(0.0, 0.0, 10.0),
            SamplePoint::new(10.0, 0.0, 20.0),
            SamplePoint::new(0.0, 10.0, 30.0),
        ]
    }

    fn res(resolution: f64) -> GridParams {
        GridParams { resolution }
    }

    #[test]
    fn test_extent_of_triangle() {
        let extent = Extent::from_points(&triangle()).unwrap();
        assert_eq!(
            extent,
            Extent { x_min: 0.0, x_max: 10.0, y_min: 0.0, y_max: 10.0 }
        );
    }

    #[test]
    fn test_extent_contains_every_sample() {
        let points: Vec<SamplePoint> = (0..200)
            .map(|i| {
                let x = ((i * 37 + 11) % 101) as f64 * 0.37 - 12.0;
                let y = ((i * 53 + 7) % 89) as f64 * -1.3 + 40.0;
                SamplePoint::new(x, y, i as f64)
            })
            .collect();
        let extent = Extent::from_points(&points).unwrap();

        assert!(extent.x_min <= extent.x_max && extent.y_min <= extent.y_max);
        for p in &points {
            assert!(extent.contains(p.x, p.y), "{:?} outside {:?}", p, extent);
        }
    }

    #[test]
    fn test_extent_empty() {
        assert!(matches!(Extent::from_points(&[]), Err(Error::EmptyInput)));
    }

    #[test]
    fn test_extent_single_point() {
        let extent = Extent::from_points(&[SamplePoint::new(-97.5, 35.25, 1.0)]).unwrap();
        assert_eq!(extent.width(), 0.0);
        assert_eq!(extent.height(), 0.0);
        assert_eq!(extent.x_min, -97.5);
        assert_eq!(extent.y_max, 35.25);
    }

    #[test]
    fn test_grid_for_triangle() {
        let extent = Extent::from_points(&triangle()).unwrap();
        let grid = GridSpec::from_extent(&extent, &res(1.0)).unwrap();

        assert_eq!((grid.x_size, grid.y_size), (10, 10));
        assert_eq!(grid.pixel_size_x, 1.0);
        assert_eq!(grid.pixel_size_y, 1.0);

        let gt = geotransform(&extent, &grid);
        assert_eq!(gt.to_gdal(), [0.0, 1.0, 0.0, 10.0, 0.0, -1.0]);
    }

    #[test]
    fn test_round_half_up() {
        let extent = Extent { x_min: 0.0, x_max: 10.5, y_min: 0.0, y_max: 10.4 };
        let grid = GridSpec::from_extent(&extent, &res(1.0)).unwrap();
        assert_eq!(grid.x_size, 11);
        assert_eq!(grid.y_size, 10);
        assert_relative_eq!(grid.pixel_size_x, 10.5 / 11.0);
    }

    #[test]
    fn test_pixel_size_follows_x_axis() {
        let extent = Extent { x_min: 0.0, x_max: 9.6, y_min: 0.0, y_max: 3.0 };
        let grid = GridSpec::from_extent(&extent, &res(2.0)).unwrap();

        // 4.8 -> 5 columns, 1.5 -> 2 rows
        assert_eq!((grid.x_size, grid.y_size), (5, 2));
        assert_relative_eq!(grid.pixel_size_x, 1.92, epsilon = 1e-12);
        assert_eq!(grid.pixel_size_y, grid.pixel_size_x);
    }

    #[test]
    fn test_degenerate_extents_clamp_to_one_cell() {
        let point = Extent { x_min: 5.0, x_max: 5.0, y_min: 7.0, y_max: 7.0 };
        let grid = GridSpec::from_extent(&point, &res(0.5)).unwrap();
        assert_eq!((grid.x_size, grid.y_size), (1, 1));
        assert_eq!(grid.pixel_size_x, 0.5);

        let vertical = Extent { x_min: 5.0, x_max: 5.0, y_min: 0.0, y_max: 8.0 };
        let grid = GridSpec::from_extent(&vertical, &res(2.0)).unwrap();
        assert_eq!((grid.x_size, grid.y_size), (1, 4));
        assert_eq!(grid.pixel_size_x, 2.0);

        let horizontal = Extent { x_min: 0.0, x_max: 3.0, y_min: 1.0, y_max: 1.0 };
        let grid = GridSpec::from_extent(&horizontal, &res(1.0)).unwrap();
        assert_eq!((grid.x_size, grid.y_size), (3, 1));

        let tiny = Extent { x_min: 0.0, x_max: 0.1, y_min: 0.0, y_max: 0.1 };
        let grid = GridSpec::from_extent(&tiny, &res(1.0)).unwrap();
        assert_eq!((grid.x_size, grid.y_size), (1, 1));
        assert_relative_eq!(grid.pixel_size_x, 0.1);
    }

    #[test]
    fn test_invalid_resolution() {
        let extent = Extent::from_points(&triangle()).unwrap();
        for bad in [0.0, -1.0, -1e-9, f64::NAN, f64::INFINITY] {
            let result = GridSpec::from_extent(&extent, &res(bad));
            assert!(
                matches!(result, Err(Error::InvalidResolution { .. })),
                "resolution {} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_grid_too_large() {
        let extent = Extent { x_min: 0.0, x_max: 1e12, y_min: 0.0, y_max: 1.0 };
        let result = GridSpec::from_extent(&extent, &res(1e-3));
        assert!(matches!(result, Err(Error::InvalidParameter { name: "resolution", .. })));
    }

    #[test]
    fn test_geotransform_covers_extent() {
        let extent = Extent { x_min: -98.0, x_max: -97.0, y_min: 35.0, y_max: 35.5 };
        let grid = GridSpec::from_extent(&extent, &res(0.01)).unwrap();
        let gt = geotransform(&extent, &grid);

        let (min_x, _, max_x, max_y) = gt.bounds(grid.cols(), grid.rows());
        assert_relative_eq!(min_x, -98.0, epsilon = 1e-9);
        assert_relative_eq!(max_x, -97.0, epsilon = 1e-9);
        assert_relative_eq!(max_y, 35.5, epsilon = 1e-9);
        assert!(gt.is_north_up());
    }
}
