//! Cell value trait for gridded surfaces

use num_traits::{Float, NumCast};
use std::fmt::Debug;

/// Trait for types that can be stored in a raster cell.
///
/// Interpolated surfaces are always floating point, so only `f32` and `f64`
/// implement it. NaN is the no-data marker for both.
pub trait RasterElement:
    Float + NumCast + Debug + Default + Send + Sync + 'static
{
    /// Bits per sample when written to a raster container
    const BITS: u16;

    /// Default no-data value for this type
    fn default_nodata() -> Self {
        Self::nan()
    }

    /// Check if this value represents no-data
    fn is_nodata(&self, nodata: Option<Self>) -> bool {
        if self.is_nan() {
            return true;
        }
        match nodata {
            Some(nd) if !nd.is_nan() => {
                let tolerance = Self::epsilon() * Self::from_f64_or_nodata(100.0);
                (*self - nd).abs() < tolerance
            }
            _ => false,
        }
    }

    /// Convert from f64, falling back to no-data when out of range
    fn from_f64_or_nodata(value: f64) -> Self {
        NumCast::from(value).unwrap_or_else(Self::default_nodata)
    }

    /// Widen to f64
    fn as_f64(self) -> f64 {
        NumCast::from(self).unwrap_or(f64::NAN)
    }
}

impl RasterElement for f32 {
    const BITS: u16 = 32;
}

impl RasterElement for f64 {
    const BITS: u16 = 64;
}
