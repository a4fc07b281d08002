//! Toolpath emission
//!
//! Walks a normalized scene and produces an ordered list of machine
//! [`Instruction`]s. Rendering them as text is left to a [`gcode::Dialect`].

pub mod gcode;

use crate::error::{ConvertError, Result};
use crate::geometry::{Scene, Transform};
use tracing::debug;

pub use gcode::{Dialect, Grbl, serialize, serialize_with, write_program};

/// One machine command
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Instruction {
    /// Work in millimeters
    SetUnits,
    SetAbsolutePositioning,
    /// Travel with the laser off
    RapidMove { x: f64, y: f64 },
    /// Cut or engrave along a straight line
    LinearMove { x: f64, y: f64, feed_rate: u32 },
    LaserOn { power: u32 },
    LaserOff,
}

/// Laser power and cutting speed shared by every curve
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaserSettings {
    /// Spindle/laser power (S word)
    pub power: u32,
    /// Cutting feed rate in mm/min (F word)
    pub feed_rate: u32,
}

impl Default for LaserSettings {
    fn default() -> Self {
        Self {
            power: 1000,
            feed_rate: 1000,
        }
    }
}

impl LaserSettings {
    pub fn validate(&self) -> Result<()> {
        if self.power == 0 {
            return Err(ConvertError::invalid("power", "must be greater than zero"));
        }
        if self.feed_rate == 0 {
            return Err(ConvertError::invalid(
                "feed_rate",
                "must be greater than zero",
            ));
        }
        Ok(())
    }
}

/// Program preamble: millimeters, absolute positioning, laser off
pub const SETUP: [Instruction; 3] = [
    Instruction::SetUnits,
    Instruction::SetAbsolutePositioning,
    Instruction::LaserOff,
];

/// Emit the instructions tracing every curve of `scene` in order.
///
/// Each curve becomes a rapid move to its first point, laser on, one linear
/// move per remaining point and laser off. The program ends with a rapid
/// move back to the machine origin.
pub fn emit(
    scene: &Scene,
    transform: &Transform,
    laser: &LaserSettings,
) -> Result<Vec<Instruction>> {
    laser.validate()?;

    let capacity = SETUP.len() + scene.point_count() + 3 * scene.curves().len() + 1;
    let mut program = Vec::with_capacity(capacity);
    program.extend_from_slice(&SETUP);

    for curve in scene.curves() {
        let mut points = curve.points().iter().map(|p| transform.apply(p));
        let Some(start) = points.next() else {
            continue;
        };

        program.push(Instruction::RapidMove {
            x: start.x,
            y: start.y,
        });
        program.push(Instruction::LaserOn { power: laser.power });
        program.extend(points.map(|p| Instruction::LinearMove {
            x: p.x,
            y: p.y,
            feed_rate: laser.feed_rate,
        }));
        program.push(Instruction::LaserOff);
    }

    program.push(Instruction::RapidMove { x: 0.0, y: 0.0 });

    debug!(
        curves = scene.curves().len(),
        instructions = program.len(),
        "Emitted toolpath"
    );

    Ok(program)
}
