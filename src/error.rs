//! Error type shared by every transform in the crate.
//!
//! All producing operations return [`Result`]. A failed call never hands back
//! a partially filled table or raster.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ToneError {
    /// A caller-supplied parameter was rejected before any work was done.
    #[error("invalid parameter `{name}` = {value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: &'static str,
    },

    /// The intensity distribution cannot support the requested mapping,
    /// e.g. a zero-width stretch range or an empty histogram.
    #[error("degenerate distribution: {reason}")]
    DegenerateDistribution { reason: String },

    /// Raster is not (height, width, 3) of 8-bit samples.
    #[error("unsupported raster shape {actual:?}: expected {expected} channels")]
    UnsupportedRasterShape { expected: usize, actual: Vec<usize> },

    /// Histogram or LUT table is not shaped (3, 256).
    #[error("table has shape ({rows}, {cols}), expected (3, 256)")]
    TableShape { rows: usize, cols: usize },

    #[error("invalid enhancement description: {0}")]
    Config(String),
}

impl From<serde_json::Error> for ToneError {
    fn from(err: serde_json::Error) -> Self {
        ToneError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ToneError>;
