//! Histogram and CDF primitives shared by the LUT builders.
//!
//! Rasters are `(height, width, 3)` arrays of `u8`. Histograms and CDFs are
//! `(3, 256)` tables indexed as `[[channel, intensity]]`.

use ndarray::{Array2, ArrayView2, ArrayView3, Axis};
use rayon::prelude::*;

use super::PARALLEL_THRESHOLD;
use crate::error::{Result, ToneError};

/// Number of colour channels every raster must carry.
pub const CHANNELS: usize = 3;

/// Number of intensity bins for 8-bit samples.
pub const BINS: usize = 256;

/// Per-channel intensity counts, shape (3, 256).
pub type Histogram = Array2<u32>;

/// Per-channel normalized cumulative distribution, shape (3, 256).
pub type Cdf = Array2<f64>;

type Counts = [[u32; BINS]; CHANNELS];

/// Reject rasters that are not exactly 3 channels deep.
pub(crate) fn check_raster(input: &ArrayView3<u8>) -> Result<()> {
    let (_, _, channels) = input.dim();
    if channels != CHANNELS {
        tracing::warn!(channels, "raster rejected");
        return Err(ToneError::UnsupportedRasterShape {
            expected: CHANNELS,
            actual: input.shape().to_vec(),
        });
    }
    Ok(())
}

/// Reject tables (histograms, LUTs) that are not shaped (3, 256).
pub(crate) fn check_table<T>(table: &ArrayView2<T>) -> Result<()> {
    let (rows, cols) = table.dim();
    if rows != CHANNELS || cols != BINS {
        return Err(ToneError::TableShape { rows, cols });
    }
    Ok(())
}

fn count_pixel(mut acc: Counts, pixel: &[u8]) -> Counts {
    for (c, &v) in pixel.iter().enumerate() {
        acc[c][v as usize] += 1;
    }
    acc
}

fn merge_counts(mut a: Counts, b: Counts) -> Counts {
    for (row_a, row_b) in a.iter_mut().zip(b.iter()) {
        for (x, y) in row_a.iter_mut().zip(row_b.iter()) {
            *x += *y;
        }
    }
    a
}

/// Compute the per-channel histogram of a 3-channel u8 raster.
///
/// Every pixel adds exactly one count per channel, so each row of the
/// result sums to `height * width`.
///
/// # Errors
/// [`ToneError::UnsupportedRasterShape`] if the raster does not have 3 channels.
pub fn histogram_u8(input: ArrayView3<u8>) -> Result<Histogram> {
    check_raster(&input)?;

    let (height, width, _) = input.dim();
    let pixels = height * width;

    let counts = match input.as_slice() {
        Some(data) if pixels >= PARALLEL_THRESHOLD => data
            .par_chunks_exact(CHANNELS)
            .fold(|| [[0u32; BINS]; CHANNELS], count_pixel)
            .reduce(|| [[0u32; BINS]; CHANNELS], merge_counts),
        _ => {
            let mut acc = [[0u32; BINS]; CHANNELS];
            for pixel in input.lanes(Axis(2)) {
                for (c, &v) in pixel.iter().enumerate() {
                    acc[c][v as usize] += 1;
                }
            }
            acc
        }
    };

    Ok(Array2::from_shape_fn((CHANNELS, BINS), |(c, v)| counts[c][v]))
}

/// Normalize a histogram into a per-channel cumulative distribution.
///
/// Entry `(c, v)` is the count of bins `0..=v` divided by the channel total,
/// so each row is non-decreasing and ends at exactly 1.0.
///
/// # Errors
/// * [`ToneError::TableShape`] if the histogram is not (3, 256)
/// * [`ToneError::DegenerateDistribution`] if a channel has no counts at all
pub fn histogram_to_cdf(hist: ArrayView2<u32>) -> Result<Cdf> {
    check_table(&hist)?;

    let mut cdf = Cdf::zeros((CHANNELS, BINS));

    for (c, row) in hist.axis_iter(Axis(0)).enumerate() {
        let total: u64 = row.iter().map(|&n| n as u64).sum();
        if total == 0 {
            tracing::warn!(channel = c, "cannot normalize empty histogram");
            return Err(ToneError::DegenerateDistribution {
                reason: format!("channel {} histogram has no counts", c),
            });
        }

        let mut running = 0u64;
        for (v, &n) in row.iter().enumerate() {
            running += n as u64;
            cdf[[c, v]] = running as f64 / total as f64;
        }
    }

    Ok(cdf)
}
