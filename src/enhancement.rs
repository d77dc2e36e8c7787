//! Serializable description of a single tonal enhancement.
//!
//! An [`Enhancement`] names one transform and its parameters so callers can
//! keep it in a JSON settings file and run it against any raster:
//!
//! ```json
//! { "op": "linear_stretch", "percentage": 4 }
//! { "op": "quantize", "levels": 8, "mode": "igs" }
//! { "op": "histogram_match", "target": [[...256 counts...], [...], [...]] }
//! ```

use ndarray::{Array3, ArrayView3};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ToneError};
use crate::filters::histogram::{Histogram, BINS, CHANNELS};
use crate::filters::histogram_matching::matching_lut_u8;
use crate::filters::linear_stretch::linear_lut_u8;
use crate::filters::lut::{apply_lut_u8, Lut};
use crate::filters::quantize::{quantize_u8, QuantizationType};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Enhancement {
    /// Tail-clipped linear stretch; `percentage` is the total removed from
    /// both tails and must be even.
    LinearStretch { percentage: u32 },
    /// Match each channel to a target histogram given as 3 rows of 256 counts.
    HistogramMatch { target: Vec<Vec<u32>> },
    Quantize {
        levels: u32,
        mode: QuantizationType,
    },
}

impl Enhancement {
    /// Parse one enhancement from its JSON description.
    ///
    /// # Errors
    /// [`ToneError::Config`] for malformed JSON, an unknown `op` or an
    /// unknown quantization `mode`
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize to the same tagged JSON form [`Enhancement::from_json`] reads.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Build the lookup table for LUT-based enhancements.
    ///
    /// Quantization rewrites pixels directly and has no table, so it
    /// returns `Ok(None)`.
    pub fn lut(&self, input: ArrayView3<u8>) -> Result<Option<Lut>> {
        match self {
            Enhancement::LinearStretch { percentage } => {
                linear_lut_u8(input, *percentage).map(Some)
            }
            Enhancement::HistogramMatch { target } => {
                let target = target_histogram(target)?;
                matching_lut_u8(input, target.view()).map(Some)
            }
            Enhancement::Quantize { .. } => Ok(None),
        }
    }

    /// Run the enhancement and return the transformed raster.
    pub fn apply(&self, input: ArrayView3<u8>) -> Result<Array3<u8>> {
        tracing::debug!(enhancement = self.kind(), "applying enhancement");
        match self {
            Enhancement::Quantize { levels, mode } => quantize_u8(input, *levels, *mode),
            Enhancement::LinearStretch { percentage } => {
                let lut = linear_lut_u8(input, *percentage)?;
                apply_lut_u8(input, lut.view())
            }
            Enhancement::HistogramMatch { target } => {
                let target = target_histogram(target)?;
                let lut = matching_lut_u8(input, target.view())?;
                apply_lut_u8(input, lut.view())
            }
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Enhancement::LinearStretch { .. } => "linear_stretch",
            Enhancement::HistogramMatch { .. } => "histogram_match",
            Enhancement::Quantize { .. } => "quantize",
        }
    }
}

/// Convert nested rows into a (3, 256) histogram table.
fn target_histogram(rows: &[Vec<u32>]) -> Result<Histogram> {
    if rows.len() != CHANNELS {
        return Err(ToneError::TableShape {
            rows: rows.len(),
            cols: rows.first().map_or(0, Vec::len),
        });
    }
    if let Some(row) = rows.iter().find(|row| row.len() != BINS) {
        return Err(ToneError::TableShape {
            rows: rows.len(),
            cols: row.len(),
        });
    }
    Ok(Histogram::from_shape_fn((CHANNELS, BINS), |(c, v)| rows[c][v]))
}
