//! Grey-level quantization: Uniform and IGS (improved grey-scale).
//!
//! Both variants map a 3-channel u8 raster onto `levels` output values per
//! channel, writing level indices (0 to levels-1) into a new raster.
//!
//! ## Variants
//! - **Uniform** - each sample independently, `floor(v / (256 / levels))`
//! - **Igs** - sequential scan per channel carrying the division remainder
//!   into the next sample, which spreads quantization error and breaks up
//!   false contours

use std::fmt;
use std::str::FromStr;

use ndarray::{Array3, ArrayView2, ArrayView3, ArrayViewMut2, Axis, Zip};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::histogram::{check_raster, BINS};
use super::PARALLEL_THRESHOLD;
use crate::error::{Result, ToneError};

/// Quantization algorithm selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuantizationType {
    Uniform,
    Igs,
}

impl fmt::Display for QuantizationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuantizationType::Uniform => write!(f, "uniform"),
            QuantizationType::Igs => write!(f, "igs"),
        }
    }
}

impl FromStr for QuantizationType {
    type Err = ToneError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "uniform" => Ok(QuantizationType::Uniform),
            "igs" => Ok(QuantizationType::Igs),
            _ => {
                tracing::warn!(mode = s, "unsupported quantization type");
                Err(ToneError::InvalidParameter {
                    name: "quantization_type",
                    value: s.to_string(),
                    reason: "expected `uniform` or `igs`",
                })
            }
        }
    }
}

fn validate_levels(levels: u32) -> Result<()> {
    if levels == 0 || levels as usize > BINS {
        tracing::warn!(levels, "quantization levels rejected");
        return Err(ToneError::InvalidParameter {
            name: "quantization_levels",
            value: levels.to_string(),
            reason: "must be between 1 and 256",
        });
    }
    Ok(())
}

/// Uniform quantization - u8 version.
///
/// # Arguments
/// * `input` - Raster (height, width, 3)
/// * `levels` - Number of output levels per channel (1-256)
///
/// # Returns
/// Raster of level indices with the same shape as `input`
pub fn uniform_u8(input: ArrayView3<u8>, levels: u32) -> Result<Array3<u8>> {
    check_raster(&input)?;
    validate_levels(levels)?;

    let level_mult = BINS as f64 / levels as f64;
    tracing::debug!(levels, level_mult, "uniform quantization");

    let (height, width, _) = input.dim();
    let zip = Zip::from(&input);
    let quantize = |&v: &u8| (v as f64 / level_mult) as u8;

    let output = if height * width >= PARALLEL_THRESHOLD {
        zip.par_map_collect(quantize)
    } else {
        zip.map_collect(quantize)
    };
    Ok(output)
}

/// Run the IGS remainder chain over one channel plane in row-major order.
///
/// The remainder starts at zero and is carried across row boundaries.
fn igs_channel(input: ArrayView2<u8>, mut output: ArrayViewMut2<u8>, level_width: u32) {
    input
        .iter()
        .zip(output.iter_mut())
        .fold(0u32, |remainder, (&v, out)| {
            let carried = v as u32 + remainder;
            *out = (carried / level_width) as u8;
            carried % level_width
        });
}

/// Improved grey-scale (IGS) quantization - u8 version.
///
/// Each channel is scanned separately, left to right and top to bottom. The
/// remainder of `(v + carry) / level_width` from one sample is added to the
/// next; it resets to zero at the start of every channel.
///
/// # Arguments
/// * `input` - Raster (height, width, 3)
/// * `levels` - Number of output levels per channel (1-256)
///
/// # Returns
/// Raster of level indices with the same shape as `input`
pub fn igs_u8(input: ArrayView3<u8>, levels: u32) -> Result<Array3<u8>> {
    check_raster(&input)?;
    validate_levels(levels)?;

    let level_width = BINS as u32 / levels;
    tracing::debug!(levels, level_width, "igs quantization");

    let (height, width, channels) = input.dim();
    let mut output = Array3::<u8>::zeros((height, width, channels));

    // Channels are independent; samples within a channel are not
    if height * width >= PARALLEL_THRESHOLD {
        output
            .axis_iter_mut(Axis(2))
            .into_par_iter()
            .enumerate()
            .for_each(|(c, out)| igs_channel(input.index_axis(Axis(2), c), out, level_width));
    } else {
        for (c, out) in output.axis_iter_mut(Axis(2)).enumerate() {
            igs_channel(input.index_axis(Axis(2), c), out, level_width);
        }
    }

    Ok(output)
}

/// Quantize a raster with the selected algorithm.
///
/// # Errors
/// * [`ToneError::InvalidParameter`] if `levels` is outside 1-256
/// * [`ToneError::UnsupportedRasterShape`] for a non 3-channel raster
pub fn quantize_u8(
    input: ArrayView3<u8>,
    levels: u32,
    quantization_type: QuantizationType,
) -> Result<Array3<u8>> {
    tracing::debug!(mode = %quantization_type, levels, "quantize");
    match quantization_type {
        QuantizationType::Uniform => uniform_u8(input, levels),
        QuantizationType::Igs => igs_u8(input, levels),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn row_raster(channels: [[u8; 3]; 3]) -> Array3<u8> {
        // channels[c][x] -> pixel (0, x, c)
        Array3::from_shape_fn((1, 3, 3), |(_, x, c)| channels[c][x])
    }

    #[test]
    fn test_uniform_256_levels_is_identity() {
        let img = Array3::from_shape_fn((4, 64, 3), |(y, x, _)| (y * 64 + x) as u8);

        let result = uniform_u8(img.view(), 256).unwrap();

        assert_eq!(result, img);
    }

    #[test]
    fn test_uniform_two_levels_splits_at_128() {
        let img = Array3::from_shape_fn((1, 256, 3), |(_, x, _)| x as u8);

        let result = uniform_u8(img.view(), 2).unwrap();

        for x in 0..256 {
            let expected = if x < 128 { 0 } else { 1 };
            assert_eq!(result[[0, x, 1]], expected);
        }
    }

    #[test]
    fn test_uniform_uneven_levels() {
        // 256 / 3 = 85.33...
        let img = row_raster([[85, 86, 255], [170, 171, 0], [0, 0, 0]]);

        let result = uniform_u8(img.view(), 3).unwrap();

        assert_eq!(result[[0, 0, 0]], 0);
        assert_eq!(result[[0, 1, 0]], 1);
        assert_eq!(result[[0, 2, 0]], 2);
        assert_eq!(result[[0, 0, 1]], 1);
        assert_eq!(result[[0, 1, 1]], 2);
    }

    #[test]
    fn test_igs_hand_traced_row() {
        // levels 4 -> width 64
        // 10 + 0 = 10   -> 0, rem 10
        // 200 + 10 = 210 -> 3, rem 18
        // 90 + 18 = 108  -> 1, rem 44
        let img = row_raster([[10, 200, 90], [63, 1, 0], [0, 0, 0]]);

        let result = igs_u8(img.view(), 4).unwrap();

        let blue: Vec<u8> = result.index_axis(Axis(2), 0).iter().copied().collect();
        assert_eq!(blue, vec![0, 3, 1]);

        // Remainder restarts at zero on the next channel:
        // 63 -> 0 rem 63, 64 -> 1 rem 0, 0 -> 0
        let green: Vec<u8> = result.index_axis(Axis(2), 1).iter().copied().collect();
        assert_eq!(green, vec![0, 1, 0]);
    }

    #[test]
    fn test_igs_carries_across_rows() {
        let img = Array3::<u8>::from_elem((2, 2, 3), 40);

        let result = igs_u8(img.view(), 4).unwrap();

        // 40 -> 0 r40, 80 -> 1 r16 | 56 -> 0 r56, 96 -> 1 r32
        assert_eq!(result[[0, 0, 2]], 0);
        assert_eq!(result[[0, 1, 2]], 1);
        assert_eq!(result[[1, 0, 2]], 0);
        assert_eq!(result[[1, 1, 2]], 1);
    }

    #[test]
    fn test_igs_256_levels_is_identity() {
        let img = Array3::from_shape_fn((3, 100, 3), |(y, x, c)| (y * 80 + x + c) as u8);

        let result = igs_u8(img.view(), 256).unwrap();

        assert_eq!(result, img);
    }

    #[test]
    fn test_igs_parallel_matches_scan() {
        let img = Array3::from_shape_fn((320, 320, 3), |(y, x, c)| ((y * 7 + x * 13 + c * 5) % 256) as u8);

        let result = igs_u8(img.view(), 8).unwrap();

        for c in 0..3 {
            let mut remainder = 0u32;
            for y in 0..320 {
                for x in 0..320 {
                    let carried = img[[y, x, c]] as u32 + remainder;
                    assert_eq!(result[[y, x, c]] as u32, carried / 32);
                    remainder = carried % 32;
                }
            }
        }
    }

    #[test]
    fn test_levels_validated() {
        let img = Array3::<u8>::zeros((1, 1, 3));

        for levels in [0, 257] {
            let err = quantize_u8(img.view(), levels, QuantizationType::Igs).unwrap_err();
            assert!(matches!(err, ToneError::InvalidParameter { name: "quantization_levels", .. }));
        }
    }

    #[test]
    fn test_rejects_grayscale_raster() {
        let img = Array3::<u8>::zeros((2, 2, 1));
        let err = quantize_u8(img.view(), 4, QuantizationType::Uniform).unwrap_err();
        assert!(matches!(err, ToneError::UnsupportedRasterShape { .. }));
    }

    #[test]
    fn test_quantization_type_parsing() {
        assert_eq!("uniform".parse::<QuantizationType>().unwrap(), QuantizationType::Uniform);
        assert_eq!(" IGS ".parse::<QuantizationType>().unwrap(), QuantizationType::Igs);

        for mode in [QuantizationType::Uniform, QuantizationType::Igs] {
            assert_eq!(mode.to_string().parse::<QuantizationType>().unwrap(), mode);
        }
        assert_eq!(QuantizationType::Igs.to_string(), "igs");

        let err = "median_cut".parse::<QuantizationType>().unwrap_err();
        assert!(matches!(err, ToneError::InvalidParameter { name: "quantization_type", .. }));
    }

    #[test]
    fn test_deterministic() {
        let img = Array3::from_shape_fn((9, 11, 3), |(y, x, c)| (y * 29 + x * 3 + c * 71) as u8);

        for mode in [QuantizationType::Uniform, QuantizationType::Igs] {
            let a = quantize_u8(img.view(), 6, mode).unwrap();
            let b = quantize_u8(img.view(), 6, mode).unwrap();
            assert_eq!(a, b);
        }
    }
}
