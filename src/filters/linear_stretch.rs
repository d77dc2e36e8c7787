//! Tail-clipped linear contrast stretch.
//!
//! A fraction of the intensity distribution is discarded from both tails and
//! the remaining range is stretched linearly over 0-255. One clip pair is
//! chosen jointly across all three channels and applied to every channel, so
//! the stretch does not shift colour balance.

use ndarray::{ArrayView2, ArrayView3};

use super::histogram::{histogram_to_cdf, histogram_u8, BINS, CHANNELS};
use super::lut::{trace_lut, Lut};
use crate::error::{Result, ToneError};

/// Clip points and integer line parameters of a linear stretch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinearStretch {
    /// Intensities at or below this map to 0.
    pub clip_low: u8,
    /// Intensities at or above this map to 255.
    pub clip_high: u8,
    /// Integer slope, `255 / (clip_high - clip_low)` truncated.
    pub slope: i32,
    /// Integer intercept, `-slope * clip_low`.
    pub intercept: i32,
}

impl LinearStretch {
    /// Find the clip points for `percentage` percent of total tail removal.
    ///
    /// Half the percentage is taken from each tail. Every bin whose CDF lies
    /// below that fraction (on any channel) is a low candidate and the
    /// largest one wins; every bin whose CDF lies above one minus the fraction
    /// is a high candidate and the smallest one wins. With no candidates the
    /// clip points stay at 0 and 255.
    ///
    /// # Errors
    /// * [`ToneError::InvalidParameter`] if `percentage` is odd or above 100
    /// * [`ToneError::DegenerateDistribution`] if the clip points leave no
    ///   range to stretch
    pub fn from_cdf(cdf: ArrayView2<f64>, percentage: u32) -> Result<Self> {
        validate_percentage(percentage)?;

        let half = (percentage as f64 / 100.0) / 2.0;

        let mut clip_low = 0usize;
        let mut clip_high = BINS - 1;
        for c in 0..CHANNELS {
            for v in 0..BINS {
                let p = cdf[[c, v]];
                if p < half {
                    clip_low = clip_low.max(v);
                }
                if p > 1.0 - half {
                    clip_high = clip_high.min(v);
                }
            }
        }

        if clip_high <= clip_low {
            tracing::warn!(clip_low, clip_high, percentage, "zero-width stretch range");
            return Err(ToneError::DegenerateDistribution {
                reason: format!(
                    "clip_high ({}) must exceed clip_low ({}) at {}% tail removal",
                    clip_high, clip_low, percentage
                ),
            });
        }

        let slope = 255 / (clip_high - clip_low) as i32;
        let intercept = -slope * clip_low as i32;

        tracing::debug!(clip_low, clip_high, slope, intercept, "linear stretch");

        Ok(Self {
            clip_low: clip_low as u8,
            clip_high: clip_high as u8,
            slope,
            intercept,
        })
    }

    /// Map one intensity through the stretch.
    #[inline]
    pub fn map(&self, v: u8) -> u8 {
        if v <= self.clip_low {
            0
        } else if v >= self.clip_high {
            255
        } else {
            (self.slope * v as i32 + self.intercept).clamp(0, 255) as u8
        }
    }

    /// Build the (3, 256) table. Every channel gets the same row.
    pub fn to_lut(&self) -> Lut {
        Lut::from_shape_fn((CHANNELS, BINS), |(_, v)| self.map(v as u8))
    }
}

fn validate_percentage(percentage: u32) -> Result<()> {
    let reason = if percentage % 2 != 0 {
        "must be divisible by 2"
    } else if percentage > 100 {
        "must not exceed 100"
    } else {
        return Ok(());
    };

    tracing::warn!(percentage, reason, "percentage rejected");
    Err(ToneError::InvalidParameter {
        name: "percentage",
        value: percentage.to_string(),
        reason,
    })
}

/// Build a linear contrast-stretch LUT for a 3-channel u8 raster.
///
/// # Arguments
/// * `input` - Raster (height, width, 3)
/// * `percentage` - Total percent of the distribution to discard, split
///   evenly between both tails. Must be even and at most 100.
///
/// # Returns
/// (3, 256) LUT with the same stretch on every channel
pub fn linear_lut_u8(input: ArrayView3<u8>, percentage: u32) -> Result<Lut> {
    validate_percentage(percentage)?;

    let hist = histogram_u8(input)?;
    let cdf = histogram_to_cdf(hist.view())?;
    let lut = LinearStretch::from_cdf(cdf.view(), percentage)?.to_lut();

    trace_lut("linear", &lut);
    Ok(lut)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;
    use pretty_assertions::assert_eq;

    /// One pixel per intensity, laid out as a single row.
    fn full_ramp() -> Array3<u8> {
        Array3::from_shape_fn((1, 256, 3), |(_, x, _)| x as u8)
    }

    #[test]
    fn test_zero_percent_is_identity() {
        let lut = linear_lut_u8(full_ramp().view(), 0).unwrap();

        for c in 0..3 {
            for v in 0..256 {
                assert_eq!(lut[[c, v]], v as u8);
            }
        }
    }

    #[test]
    fn test_zero_percent_on_narrow_image_is_identity() {
        let img = Array3::from_shape_fn((4, 4, 3), |(y, x, _)| (100 + y * 4 + x) as u8);

        let lut = linear_lut_u8(img.view(), 0).unwrap();

        assert_eq!(lut, crate::filters::lut::identity_lut());
    }

    #[test]
    fn test_odd_percentage_rejected() {
        let err = linear_lut_u8(full_ramp().view(), 5).unwrap_err();

        assert_eq!(
            err,
            ToneError::InvalidParameter {
                name: "percentage",
                value: "5".to_string(),
                reason: "must be divisible by 2",
            }
        );
    }

    #[test]
    fn test_percentage_above_hundred_rejected() {
        let err = linear_lut_u8(full_ramp().view(), 102).unwrap_err();
        assert!(matches!(err, ToneError::InvalidParameter { name: "percentage", .. }));
    }

    #[test]
    fn test_clip_points_on_ramp() {
        // CDF at v is (v + 1) / 256; 50% total removal discards 25% per tail
        let hist = histogram_u8(full_ramp().view()).unwrap();
        let cdf = histogram_to_cdf(hist.view()).unwrap();

        let stretch = LinearStretch::from_cdf(cdf.view(), 50).unwrap();

        // (v + 1) / 256 < 0.25  =>  v <= 62
        assert_eq!(stretch.clip_low, 62);
        // (v + 1) / 256 > 0.75  =>  v >= 192
        assert_eq!(stretch.clip_high, 192);
        assert_eq!(stretch.slope, 255 / 130);
        assert_eq!(stretch.intercept, -62);
    }

    #[test]
    fn test_lut_shape_of_stretch() {
        let stretch = LinearStretch {
            clip_low: 50,
            clip_high: 150,
            slope: 2,
            intercept: -100,
        };
        let lut = stretch.to_lut();

        assert_eq!(lut[[0, 0]], 0);
        assert_eq!(lut[[0, 50]], 0);
        assert_eq!(lut[[1, 51]], 2);
        assert_eq!(lut[[1, 100]], 100);
        assert_eq!(lut[[2, 149]], 198);
        assert_eq!(lut[[2, 150]], 255);
        assert_eq!(lut[[2, 255]], 255);
    }

    #[test]
    fn test_clip_points_pooled_across_channels() {
        // Blue spans 0-255, green and red are confined to 100-200
        let img = Array3::from_shape_fn((1, 256, 3), |(_, x, c)| {
            if c == 0 {
                x as u8
            } else {
                (100 + x * 100 / 255) as u8
            }
        });
        let hist = histogram_u8(img.view()).unwrap();
        let cdf = histogram_to_cdf(hist.view()).unwrap();

        let stretch = LinearStretch::from_cdf(cdf.view(), 10).unwrap();
        let lut = stretch.to_lut();

        // The narrower channels dominate both clip points
        assert!(stretch.clip_low >= 100);
        assert!(stretch.clip_high <= 200);
        assert_eq!(lut.row(0), lut.row(1));
        assert_eq!(lut.row(1), lut.row(2));
    }

    #[test]
    fn test_disagreeing_channels_are_degenerate() {
        // Blue sits at 200, green and red at 50: the pooled low clip (199)
        // lands above the pooled high clip (50)
        let img = Array3::from_shape_fn((3, 3, 3), |(_, _, c)| if c == 0 { 200 } else { 50 });

        let err = linear_lut_u8(img.view(), 2).unwrap_err();

        assert!(matches!(err, ToneError::DegenerateDistribution { .. }));
    }

    #[test]
    fn test_equal_clip_points_are_degenerate() {
        // Every CDF value is 1.0: no low candidates, every bin a high
        // candidate, so both clip points sit at 0
        let img = Array3::<u8>::from_elem((4, 4, 3), 0);

        let err = linear_lut_u8(img.view(), 2).unwrap_err();

        match err {
            ToneError::DegenerateDistribution { reason } => {
                assert!(reason.contains("clip_high (0)"), "{}", reason);
                assert!(reason.contains("clip_low (0)"), "{}", reason);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_deterministic() {
        let img = Array3::from_shape_fn((8, 8, 3), |(y, x, c)| (y * 30 + x * 2 + c * 9) as u8);

        let a = linear_lut_u8(img.view(), 4).unwrap();
        let b = linear_lut_u8(img.view(), 4).unwrap();

        assert_eq!(a, b);
    }
}
