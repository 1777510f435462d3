//! Spatial interpolation of scattered samples
//!
//! - Grid: extent, grid sizing and geotransform derived from the samples
//! - IDW: Inverse Distance Weighting, global or over a search neighborhood
//! - KdTree: nearest-neighbor and radius queries backing the neighborhood

pub mod grid;
mod idw;
pub mod kdtree;

pub use gridwell_core::SamplePoint;
pub use grid::{geotransform, Extent, GridParams, GridSpec, DEFAULT_RESOLUTION};
pub use idw::{idw, idw_at, Idw, IdwParams};
pub use kdtree::{KdTree, NearestResult};
