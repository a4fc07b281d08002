//! Scale, placement and vertical flip from source frame to machine frame.
//!
//! Sources use a top-left origin with Y growing downwards; the machine uses a
//! bottom-left origin with Y growing upwards. Every point is flipped against
//! the source frame height first, then scaled uniformly and translated.

use super::{Point, Scene};
use crate::error::{ConvertError, Result};
use tracing::debug;

/// Mirror a Y coordinate inside a frame of the given height
pub fn flip_y(y: f64, frame_height: f64) -> f64 {
    frame_height - y
}

/// Uniform scale plus translation mapping a scene into machine coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub scale: f64,
    pub offset_x: f64,
    pub offset_y: f64,
    /// Subtracted from X before scaling (non-zero for vector sources)
    pub anchor_x: f64,
    /// Height of the source frame, used for the flip
    pub frame_height: f64,
}

impl Transform {
    /// Flip only, no scaling or translation
    pub fn identity(frame_height: f64) -> Self {
        Self {
            scale: 1.0,
            offset_x: 0.0,
            offset_y: 0.0,
            anchor_x: 0.0,
            frame_height,
        }
    }

    pub fn apply(&self, p: &Point) -> Point {
        Point::new(
            (p.x - self.anchor_x) * self.scale + self.offset_x,
            flip_y(p.y, self.frame_height) * self.scale + self.offset_y,
        )
    }
}

/// Compute the transform for a scene.
///
/// With `target_longest_side` the larger side of the scene extent is scaled
/// to that length; otherwise the scale is 1. With `placement` the center of
/// the scaled, flipped extent lands on that point; otherwise no offset is
/// added.
/// The scene itself is left untouched.
pub fn normalize(
    scene: &Scene,
    target_longest_side: Option<f64>,
    placement: Option<Point>,
) -> Result<Transform> {
    let bounds = scene.extent();
    let mut transform = Transform {
        anchor_x: scene.anchor_x(),
        ..Transform::identity(scene.frame_height())
    };

    if let Some(target) = target_longest_side {
        if !(target.is_finite() && target > 0.0) {
            return Err(ConvertError::invalid(
                "longest_side",
                format!("{target} is not a positive length"),
            ));
        }
        let current = bounds.longest_side();
        if current <= 0.0 {
            return Err(ConvertError::DegenerateGeometry { target });
        }
        transform.scale = target / current;
    }

    if let Some(target) = placement
        && let Some(center) = bounds.center()
    {
        let scaled_x = (center.x - transform.anchor_x) * transform.scale;
        let scaled_y = flip_y(center.y, transform.frame_height) * transform.scale;
        transform.offset_x = target.x - scaled_x;
        transform.offset_y = target.y - scaled_y;
    }

    debug!(
        scale = transform.scale,
        offset_x = transform.offset_x,
        offset_y = transform.offset_y,
        anchor_x = transform.anchor_x,
        frame_height = transform.frame_height,
        "Computed scene transform"
    );

    Ok(transform)
}
