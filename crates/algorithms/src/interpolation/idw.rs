//! Inverse Distance Weighting (IDW) interpolation
//!
//! Estimates values at unknown locations as a weighted average of sample
//! points, where weights are inversely proportional to distance raised to
//! a power parameter.
//!
//! Reference:
//! Shepard, D. (1968). A two-dimensional interpolation function for
//! irregularly-spaced data. ACM National Conference.

use crate::maybe_rayon::*;
use gridwell_core::raster::{GeoTransform, Raster};
use gridwell_core::{Algorithm, Error, Result};

use super::kdtree::KdTree;
use super::SamplePoint;

/// Parameters for IDW interpolation
#[derive(Debug, Clone)]
pub struct IdwParams {
    /// Power parameter (default: 2.0), finite and `>= 0`.
    /// Higher values give more weight to nearby points; 0 gives the plain mean.
    pub power: f64,
    /// Maximum search radius. `None` means all points are used (global IDW).
    pub max_radius: Option<f64>,
    /// Maximum number of nearest points to use. `None` means no limit.
    pub max_points: Option<usize>,
    /// Output raster rows
    pub rows: usize,
    /// Output raster columns
    pub cols: usize,
    /// Output raster geotransform; cells are evaluated at their centers
    pub transform: GeoTransform,
}

impl Default for IdwParams {
    fn default() -> Self {
        Self {
            power: 2.0,
            max_radius: None,
            max_points: None,
            rows: 100,
            cols: 100,
            transform: GeoTransform::default(),
        }
    }
}

impl IdwParams {
    fn validate(&self) -> Result<()> {
        validate_power(self.power)?;

        if let Some(r) = self.max_radius {
            if !(r > 0.0) {
                return Err(Error::InvalidParameter {
                    name: "max_radius",
                    value: r.to_string(),
                    reason: "search radius must be greater than zero".into(),
                });
            }
        }
        if self.max_points == Some(0) {
            return Err(Error::InvalidParameter {
                name: "max_points",
                value: "0".into(),
                reason: "at least one neighbor is required".into(),
            });
        }
        if self.rows == 0 || self.cols == 0 {
            return Err(Error::InvalidDimensions {
                width: self.cols,
                height: self.rows,
            });
        }
        Ok(())
    }
}

fn validate_power(power: f64) -> Result<()> {
    if power >= 0.0 && power.is_finite() {
        Ok(())
    } else {
        Err(Error::InvalidParameter {
            name: "power",
            value: power.to_string(),
            reason: "power must be finite and non-negative".into(),
        })
    }
}

/// IDW algorithm
#[derive(Debug, Clone, Default)]
pub struct Idw;

impl Algorithm for Idw {
    type Input = Vec<SamplePoint>;
    type Output = Raster<f64>;
    type Params = IdwParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "IDW"
    }

    fn description(&self) -> &'static str {
        "Interpolate scattered samples onto a grid by inverse distance weighting"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        idw(&input, params)
    }
}

/// Weighted average over `(distance_sq, value)` candidates.
///
/// A candidate at distance exactly zero decides the result outright; the
/// first one seen wins. Otherwise weights are taken relative to the nearest
/// candidate, `w = (d_min / d)^p`, so the largest weight is 1 and the sums
/// stay finite however close or far the samples are. Returns `None` when
/// there are no candidates.
fn weighted_value<I>(candidates: I, power: f64) -> Option<f64>
where
    I: IntoIterator<Item = (f64, f64)>,
    I::IntoIter: Clone,
{
    let candidates = candidates.into_iter();

    let mut nearest_sq = f64::INFINITY;
    let mut seen = false;
    for (dsq, value) in candidates.clone() {
        if dsq == 0.0 {
            return Some(value);
        }
        nearest_sq = nearest_sq.min(dsq);
        seen = true;
    }
    if !seen {
        return None;
    }

    let half_power = power / 2.0;
    let (sum_w, sum_wz) = candidates.fold((0.0, 0.0), |(sum_w, sum_wz), (dsq, value)| {
        // equal distances weigh 1 even when both overflowed to infinity
        let w = if dsq == nearest_sq {
            1.0
        } else {
            (nearest_sq / dsq).powf(half_power)
        };
        (sum_w + w, sum_wz + w * value)
    });

    Some(sum_wz / sum_w)
}

/// Interpolate a single location from all samples.
///
/// This is the per-cell kernel of [`idw`] in global mode: every sample
/// contributes, in input order.
pub fn idw_at(points: &[SamplePoint], x: f64, y: f64, power: f64) -> Result<f64> {
    if points.is_empty() {
        return Err(Error::EmptyInput);
    }
    validate_power(power)?;

    let value = weighted_value(points.iter().map(|p| (p.dist_sq(x, y), p.value)), power);
    Ok(value.unwrap_or(f64::NAN))
}

/// Which samples contribute to a cell
enum Neighborhood<'a> {
    Global(&'a [SamplePoint]),
    Nearest(KdTree, usize),
    Radius(KdTree, f64),
    NearestWithin(KdTree, usize, f64),
}

impl<'a> Neighborhood<'a> {
    fn new(points: &'a [SamplePoint], params: &IdwParams) -> Self {
        match (params.max_points, params.max_radius) {
            (None, None) => Self::Global(points),
            (Some(k), None) => Self::Nearest(KdTree::build(points), k),
            (None, Some(r)) => Self::Radius(KdTree::build(points), r),
            (Some(k), Some(r)) => Self::NearestWithin(KdTree::build(points), k, r),
        }
    }

    fn value_at(&self, x: f64, y: f64, power: f64) -> Option<f64> {
        let found = match self {
            Self::Global(points) => {
                return weighted_value(points.iter().map(|p| (p.dist_sq(x, y), p.value)), power);
            }
            Self::Nearest(tree, k) => tree.k_nearest(x, y, *k),
            Self::Radius(tree, r) => tree.within_radius(x, y, *r),
            Self::NearestWithin(tree, k, r) => {
                let mut found = tree.k_nearest(x, y, *k);
                found.retain(|n| n.distance_sq <= r * r);
                found
            }
        };
        weighted_value(found.iter().map(|n| (n.distance_sq, n.point.value)), power)
    }
}

/// Perform IDW interpolation from scattered points to a raster grid.
///
/// # Algorithm
///
/// For each output cell center (x, y):
///
/// ```text
/// z(x,y) = Σ(wi * zi) / Σ(wi)
/// where wi = 1 / d(x,y, xi,yi)^p
/// ```
///
/// A cell center that coincides with a sample takes that sample's value.
/// Rows are computed in parallel; samples are only read.
///
/// # Arguments
/// * `points` - Scattered sample points with values
/// * `params` - IDW parameters (power, neighborhood, output grid)
///
/// # Returns
/// Raster with interpolated values. With a search neighborhood, cells
/// with no points in range are NaN, which is also the raster's no-data value.
pub fn idw(points: &[SamplePoint], params: IdwParams) -> Result<Raster<f64>> {
    if points.is_empty() {
        return Err(Error::EmptyInput);
    }
    params.validate()?;

    let rows = params.rows;
    let cols = params.cols;
    let power = params.power;
    let transform = params.transform;
    let neighborhood = Neighborhood::new(points, &params);

    let data: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            (0..cols)
                .map(|col| {
                    let (cx, cy) = transform.pixel_to_geo(col, row);
                    neighborhood.value_at(cx, cy, power).unwrap_or(f64::NAN)
                })
                .collect::<Vec<f64>>()
        })
        .collect();

    let mut output = Raster::from_vec(data, rows, cols)?;
    output.set_transform(transform);
    if !matches!(neighborhood, Neighborhood::Global(_)) {
        output.set_nodata(Some(f64::NAN));
    }

    Ok(output)
}
