//! # laser-gcode
//!
//! A Rust library for turning artwork into laser engraver toolpaths.
//!
//! ## Features
//!
//! - **Image to G-code**: threshold a raster image and trace the outline of
//!   every dark region
//! - **SVG to G-code**: flatten every path of an SVG document into polylines
//!
//! Both sources share one pipeline: scale the artwork so its longest side has
//! a requested length, optionally center it on a machine position, flip it
//! into the machine's Y-up frame and emit one laser-on/laser-off block per
//! curve.
//!
//! ## Example - Image Conversion
//!
//! ```rust,ignore
//! use laser_gcode::{ConvertOptions, RasterOptions, RasterSource, convert};
//!
//! let source = RasterSource::new("logo.png", RasterOptions::default());
//! let options = ConvertOptions {
//!     longest_side: Some(80.0),
//!     ..Default::default()
//! };
//! convert(&source, &options, "logo.gcode".as_ref()).unwrap();
//! ```
//!
//! ## Example - SVG Conversion
//!
//! ```rust,ignore
//! use laser_gcode::{ConvertOptions, SvgSource, VectorOptions, convert};
//!
//! let source = SvgSource::new("drawing.svg", VectorOptions::default());
//! convert(&source, &ConvertOptions::default(), "drawing.gcode".as_ref()).unwrap();
//! ```

pub mod config;
pub mod error;
pub mod geometry;
pub mod pipeline;
pub mod source;
pub mod toolpath;

// Re-export commonly used items
pub use config::ConvertOptions;
pub use error::{ConvertError, Result};
pub use geometry::{Bounds, Curve, Point, Scene, Transform, normalize};
pub use pipeline::{Conversion, convert, convert_scene};
pub use source::{
    CurveSource, RasterOptions, RasterSource, SvgSource, ThresholdMethod, VectorOptions,
};
pub use toolpath::{Instruction, LaserSettings, emit, serialize, write_program};
