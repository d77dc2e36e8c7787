//! Per-channel lookup tables and their application to a raster.
//!
//! A [`Lut`] is a (3, 256) table: entry `[[c, v]]` is the output intensity
//! substituted for input intensity `v` on channel `c`. The LUT builders in
//! [`super::linear_stretch`] and [`super::histogram_matching`] produce one;
//! [`apply_lut_u8`] consumes it.

use ndarray::{Array2, Array3, ArrayView2, ArrayView3, Zip};

use super::histogram::{check_raster, check_table, BINS, CHANNELS};
use super::PARALLEL_THRESHOLD;
use crate::error::Result;

/// Per-channel lookup table, shape (3, 256).
pub type Lut = Array2<u8>;

/// Identity table: every channel maps `v` to `v`.
pub fn identity_lut() -> Lut {
    Lut::from_shape_fn((CHANNELS, BINS), |(_, v)| v as u8)
}

/// Apply a per-channel LUT to a 3-channel u8 raster.
///
/// Each sample is replaced independently, so the work is split across
/// threads for large rasters.
///
/// # Arguments
/// * `input` - Raster (height, width, 3)
/// * `lut` - Table (3, 256)
///
/// # Returns
/// New raster with the same shape as `input`
pub fn apply_lut_u8(input: ArrayView3<u8>, lut: ArrayView2<u8>) -> Result<Array3<u8>> {
    check_raster(&input)?;
    check_table(&lut)?;

    let (height, width, channels) = input.dim();
    let mut output = Array3::<u8>::zeros((height, width, channels));

    let zip = Zip::indexed(&mut output).and(&input);
    if height * width >= PARALLEL_THRESHOLD {
        zip.par_for_each(|(_, _, c), out, &v| *out = lut[[c, v as usize]]);
    } else {
        zip.for_each(|(_, _, c), out, &v| *out = lut[[c, v as usize]]);
    }

    Ok(output)
}

/// Log the rows of a finished table at trace level.
pub(crate) fn trace_lut(name: &str, lut: &Lut) {
    if tracing::enabled!(tracing::Level::TRACE) {
        for (c, row) in lut.outer_iter().enumerate() {
            tracing::trace!(lut = name, channel = c, values = ?row.to_vec(), "lut row");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ToneError;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_identity_lut_leaves_raster_unchanged() {
        let img = Array3::from_shape_fn((5, 7, 3), |(y, x, c)| (y * 40 + x * 3 + c) as u8);
        let lut = identity_lut();

        let result = apply_lut_u8(img.view(), lut.view()).unwrap();

        assert_eq!(result, img);
    }

    #[test]
    fn test_apply_lut_uses_channel_row() {
        let mut lut = Lut::zeros((3, 256));
        lut[[0, 100]] = 1;
        lut[[1, 100]] = 2;
        lut[[2, 100]] = 3;
        let img = Array3::<u8>::from_elem((1, 1, 3), 100);

        let result = apply_lut_u8(img.view(), lut.view()).unwrap();

        assert_eq!(result.into_raw_vec_and_offset().0, vec![1, 2, 3]);
    }

    #[test]
    fn test_apply_lut_parallel_path() {
        let img = Array3::from_shape_fn((350, 300, 3), |(y, x, c)| ((y + x + c) % 256) as u8);
        let lut = Lut::from_shape_fn((3, 256), |(c, v)| (255 - v as usize + c).min(255) as u8);

        let result = apply_lut_u8(img.view(), lut.view()).unwrap();

        for &(y, x, c) in &[(0, 0, 0), (349, 299, 2), (120, 7, 1)] {
            let v = img[[y, x, c]] as usize;
            assert_eq!(result[[y, x, c]], lut[[c, v]]);
        }
    }

    #[test]
    fn test_apply_lut_rejects_bad_table() {
        let img = Array3::<u8>::zeros((2, 2, 3));
        let lut = Array2::<u8>::zeros((1, 256));

        let err = apply_lut_u8(img.view(), lut.view()).unwrap_err();

        assert_eq!(err, ToneError::TableShape { rows: 1, cols: 256 });
    }
}
