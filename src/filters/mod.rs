//! Tonal filters for 8-bit, 3-channel rasters.
//!
//! ## Supported Format
//!
//! | Format | Shape | Type | Description |
//! |--------|-------|------|-------------|
//! | BGR8 | (H, W, 3) | u8 | Three colour channels, 0-255 |
//!
//! Channel order does not matter to any filter; every channel is processed
//! the same way. Rasters with any other channel count are rejected with
//! [`crate::ToneError::UnsupportedRasterShape`].
//!
//! ## Tables
//!
//! Histograms, CDFs and LUTs are (3, 256) arrays indexed `[[channel, intensity]]`.
//!
//! ## Filter Categories
//!
//! - **Statistics**: histogram, histogram_to_cdf
//! - **LUT builders**: linear stretch, histogram matching
//! - **LUT application**: apply_lut
//! - **Quantization**: uniform, igs (write level indices directly)

pub mod histogram;
pub mod histogram_matching;
pub mod linear_stretch;
pub mod lut;
pub mod quantize;

/// Pixel count at which per-pixel work is spread across the rayon pool.
pub(crate) const PARALLEL_THRESHOLD: usize = 100_000;
