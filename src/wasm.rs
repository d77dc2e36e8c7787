//! WebAssembly exports for ImageTone filters.
//!
//! These functions are exposed to JavaScript via wasm-bindgen. Images travel
//! as flat arrays of 3-channel bytes (length = width * height * 3); tables as
//! flat arrays of 3 * 256 entries, channel-major.
//!
//! Errors are thrown to JavaScript as strings.

use ndarray::{Array2, Array3};
use wasm_bindgen::prelude::*;

use crate::error::ToneError;
use crate::filters::histogram::{histogram_to_cdf, histogram_u8, BINS, CHANNELS};
use crate::filters::histogram_matching::matching_lut_u8;
use crate::filters::linear_stretch::linear_lut_u8;
use crate::filters::lut::apply_lut_u8;
use crate::filters::quantize::{quantize_u8, QuantizationType};

fn to_js(err: ToneError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn image_from_slice(data: &[u8], width: usize, height: usize) -> Result<Array3<u8>, JsValue> {
    Array3::from_shape_vec((height, width, CHANNELS), data.to_vec()).map_err(|_| {
        to_js(ToneError::InvalidParameter {
            name: "data",
            value: data.len().to_string(),
            reason: "length must equal width * height * 3",
        })
    })
}

fn table_from_slice<T: Copy>(data: &[T]) -> Result<Array2<T>, JsValue> {
    Array2::from_shape_vec((CHANNELS, BINS), data.to_vec()).map_err(|_| {
        to_js(ToneError::TableShape {
            rows: data.len() / BINS,
            cols: BINS,
        })
    })
}

// ============================================================================
// Statistics
// ============================================================================

/// Per-channel histogram, returned as 3 * 256 counts.
#[wasm_bindgen]
pub fn histogram_wasm(data: &[u8], width: usize, height: usize) -> Result<Vec<u32>, JsValue> {
    let input = image_from_slice(data, width, height)?;
    let result = histogram_u8(input.view()).map_err(to_js)?;
    Ok(result.into_raw_vec_and_offset().0)
}

/// Normalized per-channel CDF of a flat 3 * 256 histogram.
///
/// # Arguments
/// * `hist` - Flat array of 3 * 256 counts, channel-major
///
/// # Returns
/// Flat array of 3 * 256 cumulative fractions, each channel ending at 1.0
#[wasm_bindgen]
pub fn histogram_to_cdf_wasm(hist: &[u32]) -> Result<Vec<f64>, JsValue> {
    let hist = table_from_slice(hist)?;
    let result = histogram_to_cdf(hist.view()).map_err(to_js)?;
    Ok(result.into_raw_vec_and_offset().0)
}

// ============================================================================
// LUT builders
// ============================================================================

/// Linear stretch LUT, returned as 3 * 256 bytes.
///
/// # Arguments
/// * `data` - Flat array of 3-channel bytes
/// * `width` - Image width in pixels
/// * `height` - Image height in pixels
/// * `percentage` - Total percent removed from both tails (even, 0-100)
#[wasm_bindgen]
pub fn linear_lut_wasm(
    data: &[u8],
    width: usize,
    height: usize,
    percentage: u32,
) -> Result<Vec<u8>, JsValue> {
    let input = image_from_slice(data, width, height)?;
    let result = linear_lut_u8(input.view(), percentage).map_err(to_js)?;
    Ok(result.into_raw_vec_and_offset().0)
}

/// Histogram matching LUT towards a flat 3 * 256 target histogram.
#[wasm_bindgen]
pub fn matching_lut_wasm(
    data: &[u8],
    width: usize,
    height: usize,
    target: &[u32],
) -> Result<Vec<u8>, JsValue> {
    let input = image_from_slice(data, width, height)?;
    let target = table_from_slice(target)?;
    let result = matching_lut_u8(input.view(), target.view()).map_err(to_js)?;
    Ok(result.into_raw_vec_and_offset().0)
}

/// Apply a per-channel LUT to an image.
///
/// # Arguments
/// * `data` - Flat array of 3-channel bytes
/// * `width` - Image width in pixels
/// * `height` - Image height in pixels
/// * `lut` - Flat array of 3 * 256 output values, channel-major
///
/// # Returns
/// Flat array of 3-channel bytes with every sample replaced through the LUT
#[wasm_bindgen]
pub fn apply_lut_wasm(
    data: &[u8],
    width: usize,
    height: usize,
    lut: &[u8],
) -> Result<Vec<u8>, JsValue> {
    let input = image_from_slice(data, width, height)?;
    let lut = table_from_slice(lut)?;
    let result = apply_lut_u8(input.view(), lut.view()).map_err(to_js)?;
    Ok(result.into_raw_vec_and_offset().0)
}

// ============================================================================
// Quantization
// ============================================================================

/// Quantize to `levels` grey levels; `mode` is "uniform" or "igs".
#[wasm_bindgen]
pub fn quantize_wasm(
    data: &[u8],
    width: usize,
    height: usize,
    levels: u32,
    mode: &str,
) -> Result<Vec<u8>, JsValue> {
    let input = image_from_slice(data, width, height)?;
    let mode: QuantizationType = mode.parse().map_err(to_js)?;
    let result = quantize_u8(input.view(), levels, mode).map_err(to_js)?;
    Ok(result.into_raw_vec_and_offset().0)
}
