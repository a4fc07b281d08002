//! G-code text output
//!
//! Every [`Instruction`] maps to exactly one line. Nothing is reordered,
//! merged or dropped, so the text mirrors the emitted program line for line.

use super::Instruction;
use crate::error::{ConvertError, Result};
use std::io::{self, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::info;

/// Renders instructions in one controller's command syntax
pub trait Dialect {
    /// The single line (without newline) for `instruction`
    fn line(&self, instruction: &Instruction) -> String;
}

/// GRBL-style laser G-code (`M3`/`M5` for the laser, `G0`/`G1` for motion)
#[derive(Debug, Clone, Copy, Default)]
pub struct Grbl;

impl Dialect for Grbl {
    fn line(&self, instruction: &Instruction) -> String {
        match *instruction {
            Instruction::SetUnits => "G21".to_string(),
            Instruction::SetAbsolutePositioning => "G90".to_string(),
            Instruction::RapidMove { x, y } => format!("G0 X{} Y{}", coord(x), coord(y)),
            Instruction::LinearMove { x, y, feed_rate } => {
                format!("G1 X{} Y{} F{}", coord(x), coord(y), feed_rate)
            }
            Instruction::LaserOn { power } => format!("M3 S{}", power),
            Instruction::LaserOff => "M5".to_string(),
        }
    }
}

/// Format a coordinate with 3 decimal places, treating -0 as 0
fn coord(n: f64) -> String {
    let s = format!("{:.3}", n);
    if s == "-0.000" { "0.000".to_string() } else { s }
}

/// Render a program with the [`Grbl`] dialect
pub fn serialize(instructions: &[Instruction]) -> String {
    serialize_with(&Grbl, instructions)
}

pub fn serialize_with(dialect: &dyn Dialect, instructions: &[Instruction]) -> String {
    let mut text = String::new();
    for instruction in instructions {
        text.push_str(&dialect.line(instruction));
        text.push('\n');
    }
    text
}

/// Write program text to `destination`.
///
/// The text goes to a temporary file next to the destination which is then
/// renamed over it, so a failed write never leaves a truncated program behind.
/// A replaced file keeps its permissions; a new one gets the usual umask
/// defaults.
pub fn write_program(text: &str, destination: &Path) -> Result<()> {
    let io_err = |source: io::Error| ConvertError::IoWrite {
        path: destination.to_path_buf(),
        source,
    };

    let dir = match destination.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = staging_file(dir, destination).map_err(io_err)?;
    file.write_all(text.as_bytes()).map_err(io_err)?;
    file.as_file().sync_all().map_err(io_err)?;
    file.persist(destination).map_err(|e| io_err(e.error))?;

    info!(
        path = %destination.display(),
        bytes = text.len(),
        "Wrote G-code program"
    );
    Ok(())
}

/// Temporary file in `dir` carrying the permissions `destination` should end up with
fn staging_file(dir: &Path, destination: &Path) -> io::Result<NamedTempFile> {
    let mut builder = tempfile::Builder::new();
    builder.prefix(".laser-gcode-");
    // Temporary files default to 0600
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(std::fs::Permissions::from_mode(0o666));
    }

    let file = builder.tempfile_in(dir)?;
    if let Ok(existing) = std::fs::metadata(destination) {
        file.as_file().set_permissions(existing.permissions())?;
    }
    Ok(file)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_per_instruction() {
        let program = [
            Instruction::SetUnits,
            Instruction::SetAbsolutePositioning,
            Instruction::LaserOff,
            Instruction::RapidMove { x: 1.5, y: 2.0 },
            Instruction::LaserOn { power: 800 },
            Instruction::LinearMove {
                x: 10.0,
                y: 0.1234,
                feed_rate: 500,
            },
            Instruction::LaserOff,
            Instruction::RapidMove { x: 0.0, y: 0.0 },
        ];
        assert_eq!(
            serialize(&program),
            "G21\nG90\nM5\nG0 X1.500 Y2.000\nM3 S800\nG1 X10.000 Y0.123 F500\nM5\nG0 X0.000 Y0.000\n"
        );
    }

    #[test]
    fn test_negative_zero_is_normalized() {
        assert_eq!(coord(-0.0), "0.000");
        assert_eq!(coord(-0.0004), "0.000");
        assert_eq!(coord(-0.0005), "-0.001");
        assert_eq!(coord(-12.25), "-12.250");
    }

    #[test]
    fn test_custom_dialect() {
        struct Upper;
        impl Dialect for Upper {
            fn line(&self, instruction: &Instruction) -> String {
                format!("{:?}", instruction).to_uppercase()
            }
        }
        let text = serialize_with(&Upper, &[Instruction::LaserOff, Instruction::SetUnits]);
        assert_eq!(text, "LASEROFF\nSETUNITS\n");
    }

    #[test]
    fn test_write_program_replaces_destination() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("job.gcode");
        std::fs::write(&out, "old contents that are longer than the new ones").unwrap();

        write_program("G21\n", &out).unwrap();
        assert_eq!(std::fs::read_to_string(&out).unwrap(), "G21\n");
        // Only the destination remains, no stray temporary file
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_new_program_gets_default_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let plain = dir.path().join("plain.txt");
        std::fs::write(&plain, "").unwrap();
        let out = dir.path().join("job.gcode");

        write_program("G21\n", &out).unwrap();
        let mode = |p: &Path| std::fs::metadata(p).unwrap().permissions().mode() & 0o777;
        // Same mode as any file created under the current umask
        assert_eq!(mode(out.as_path()), mode(plain.as_path()));
    }

    #[cfg(unix)]
    #[test]
    fn test_replaced_program_keeps_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("job.gcode");
        std::fs::write(&out, "old").unwrap();
        std::fs::set_permissions(&out, std::fs::Permissions::from_mode(0o640)).unwrap();

        write_program("G21\n", &out).unwrap();
        let mode = std::fs::metadata(&out).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o640);
    }

    #[test]
    fn test_write_program_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("no/such/dir/job.gcode");
        let err = write_program("G21\n", &out).unwrap_err();
        assert!(matches!(err, ConvertError::IoWrite { .. }));
        assert!(!out.exists());
    }
}
