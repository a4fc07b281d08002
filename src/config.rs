//! Conversion settings shared by every source type

use crate::error::{ConvertError, Result};
use crate::geometry::Point;
use crate::toolpath::LaserSettings;

/// Options for turning a scene into a G-code program
#[derive(Debug, Clone, Default)]
pub struct ConvertOptions {
    pub laser: LaserSettings,
    /// Length in mm of the longest side of the engraving (unscaled if None)
    pub longest_side: Option<f64>,
    /// Machine position in mm for the center of the scaled artwork
    pub placement: Option<Point>,
}

impl ConvertOptions {
    /// Check every parameter before any input is read
    pub fn validate(&self) -> Result<()> {
        self.laser.validate()?;

        if let Some(side) = self.longest_side
            && !(side.is_finite() && side > 0.0)
        {
            return Err(ConvertError::invalid(
                "longest_side",
                format!("{side} is not a positive length"),
            ));
        }

        if let Some(p) = self.placement
            && !(p.x.is_finite() && p.y.is_finite())
        {
            return Err(ConvertError::invalid(
                "center_offset",
                format!("({}, {}) is not a finite point", p.x, p.y),
            ));
        }

        Ok(())
    }
}
