//! Error types for the conversion pipeline.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while converting artwork into a toolpath.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ConvertError {
    /// Input file missing, unreadable, or in an unsupported format.
    #[error("failed to load '{}': {reason}", path.display())]
    SourceLoad { path: PathBuf, reason: String },

    /// A target size was requested but the geometry has zero extent.
    #[error("cannot scale to a longest side of {target} mm: source geometry has zero extent")]
    DegenerateGeometry { target: f64 },

    /// An SVG document without `viewBox` or `height`, so there is no flip height.
    #[error("SVG height not specified in 'viewBox' or 'height' attributes")]
    MissingDimension,

    /// A conversion parameter is out of range.
    #[error("invalid value for '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    /// The output program could not be created or written.
    #[error("failed to write '{}': {source}", path.display())]
    IoWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ConvertError {
    pub(crate) fn source_load(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::SourceLoad {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ConvertError>;
