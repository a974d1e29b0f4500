//! Error taxonomy shared by the classifier and the raster I/O boundary.

use std::path::PathBuf;

use thiserror::Error;

use crate::tile::Layer;

#[derive(Debug, Error)]
pub enum WuiError {
    #[error("input grid {layer} not found at {}", path.display())]
    InputNotFound { layer: Layer, path: PathBuf },

    #[error("input grid {layer} is {}x{}, expected {}x{}", found.0, found.1, expected.0, expected.1)]
    ShapeMismatch {
        layer: Layer,
        /// (width, height) of the reference grid.
        expected: (usize, usize),
        /// (width, height) of the offending grid.
        found: (usize, usize),
    },

    #[error("invalid threshold {name} = {value}: {reason}")]
    InvalidThreshold {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },

    #[error("cannot write output {}: {source}", path.display())]
    IoWriteFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot decode {}: {message}", path.display())]
    Decode { path: PathBuf, message: String },

    #[error("unknown region '{0}' (expected one of AF, AS, EU, NA, OC, SA)")]
    InvalidRegion(String),

    #[error("malformed tile '{0}' (expected X####_Y####)")]
    InvalidTile(String),
}

pub type Result<T> = std::result::Result<T, WuiError>;
