//! Source → normalize → emit → serialize

use crate::config::ConvertOptions;
use crate::error::Result;
use crate::geometry::{Scene, Transform, normalize};
use crate::source::CurveSource;
use crate::toolpath::{Instruction, emit, serialize, write_program};
use std::path::Path;
use tracing::info;

/// Everything produced by one conversion
#[derive(Debug, Clone)]
pub struct Conversion {
    pub transform: Transform,
    pub program: Vec<Instruction>,
    pub gcode: String,
}

/// Turn a scene into a G-code program without touching the filesystem
pub fn convert_scene(scene: Scene, options: &ConvertOptions) -> Result<Conversion> {
    options.validate()?;

    let transform = normalize(&scene, options.longest_side, options.placement)?;
    let program = emit(&scene, &transform, &options.laser)?;
    let gcode = serialize(&program);

    Ok(Conversion {
        transform,
        program,
        gcode,
    })
}

/// Load `source`, convert it and write the program to `output`.
///
/// Options are checked before the source is read, and nothing is written
/// unless every earlier step succeeded.
pub fn convert(
    source: &dyn CurveSource,
    options: &ConvertOptions,
    output: &Path,
) -> Result<Conversion> {
    options.validate()?;

    let scene = source.load()?;
    info!(
        curves = scene.curves().len(),
        points = scene.point_count(),
        "Loaded scene"
    );

    let conversion = convert_scene(scene, options)?;
    write_program(&conversion.gcode, output)?;
    Ok(conversion)
}
