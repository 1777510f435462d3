//! # gridwell Algorithms
//!
//! Gridding of scattered well samples.
//!
//! - **interpolation**: extent and grid sizing, IDW, k-d tree neighborhoods
//! - **pipeline**: samples in, georeferenced raster out through a sink

pub mod interpolation;
pub mod pipeline;

mod maybe_rayon;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::interpolation::{
        geotransform, idw, idw_at, Extent, GridParams, GridSpec, Idw, IdwParams, KdTree,
        DEFAULT_RESOLUTION,
    };
    pub use crate::pipeline::{interpolate_surface, run, PipelineReport, SurfaceParams};
    pub use gridwell_core::prelude::*;
}
