//! Histogram matching (specification).
//!
//! Remaps each channel of a raster so its cumulative distribution follows a
//! caller-supplied target histogram as closely as the 256 output levels allow.

use ndarray::{ArrayView1, ArrayView2, ArrayView3, Axis};

use super::histogram::{check_table, histogram_to_cdf, histogram_u8, BINS, CHANNELS};
use super::lut::{trace_lut, Lut};
use crate::error::Result;

/// Index of the target bin whose CDF value is closest to `p`.
///
/// Scans upward and only replaces the best match on a strictly smaller
/// difference, so ties resolve to the lowest bin.
fn nearest_bin(p: f64, target: ArrayView1<f64>) -> usize {
    let mut best = 0;
    let mut best_diff = f64::INFINITY;
    for (j, &t) in target.iter().enumerate() {
        let diff = (p - t).abs();
        if diff < best_diff {
            best_diff = diff;
            best = j;
        }
    }
    best
}

/// Build a matching LUT from two (3, 256) CDFs.
///
/// Entry `[[c, i]]` is the target bin whose CDF is nearest to the source CDF
/// at `i` on channel `c`.
pub fn matching_lut_from_cdfs(source: ArrayView2<f64>, target: ArrayView2<f64>) -> Result<Lut> {
    check_table(&source)?;
    check_table(&target)?;

    let mut lut = Lut::zeros((CHANNELS, BINS));
    for (c, mut row) in lut.axis_iter_mut(Axis(0)).enumerate() {
        let tgt = target.row(c);
        for (i, out) in row.iter_mut().enumerate() {
            *out = nearest_bin(source[[c, i]], tgt) as u8;
        }
    }
    Ok(lut)
}

/// Build a LUT that matches a raster's distribution to a target histogram.
///
/// # Arguments
/// * `input` - Raster (height, width, 3)
/// * `target` - Target histogram (3, 256), e.g. from
///   [`histogram_u8`] on a reference image
///
/// # Returns
/// (3, 256) LUT, computed independently per channel
///
/// # Errors
/// * [`crate::ToneError::UnsupportedRasterShape`] for a non 3-channel raster
/// * [`crate::ToneError::TableShape`] if `target` is not (3, 256)
/// * [`crate::ToneError::DegenerateDistribution`] if the raster is empty or a
///   target channel has no counts
pub fn matching_lut_u8(input: ArrayView3<u8>, target: ArrayView2<u32>) -> Result<Lut> {
    check_table(&target)?;

    let src_hist = histogram_u8(input)?;
    let src_cdf = histogram_to_cdf(src_hist.view())?;
    let tgt_cdf = histogram_to_cdf(target)?;

    let lut = matching_lut_from_cdfs(src_cdf.view(), tgt_cdf.view())?;

    trace_lut("matching", &lut);
    Ok(lut)
}
