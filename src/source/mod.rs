//! Curve sources
//!
//! A source turns an input file into a [`Scene`]: the curves to trace plus
//! the height of the frame they are expressed in. The frame has its origin
//! at the top-left with Y growing downwards, for images and SVG alike.

pub mod raster;
pub mod vector;

use crate::error::Result;
use crate::geometry::Scene;

pub use raster::{RasterOptions, RasterSource, ThresholdMethod};
pub use vector::{SvgSource, VectorOptions};

/// Anything that can hand the pipeline a scene to trace
pub trait CurveSource {
    fn load(&self) -> Result<Scene>;
}

impl CurveSource for Scene {
    fn load(&self) -> Result<Scene> {
        Ok(self.clone())
    }
}
