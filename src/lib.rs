//! ImageTone Rust Extensions
//!
//! Classic histogram-based enhancement and grey-level quantization for
//! 8-bit colour rasters, with optional Python bindings via PyO3 and WASM
//! bindings for JavaScript.
//!
//! ## Image Format
//! All filters take `(height, width, 3)` arrays of `u8`. Channel order is
//! conventionally blue, green, red but is not interpreted.
//!
//! ## Operations
//! - **Histogram / CDF**: per-channel intensity counts and their normalized
//!   cumulative distribution
//! - **Linear stretch**: LUT that clips a percentage of both tails and
//!   stretches the rest over 0-255
//! - **Histogram matching**: LUT that maps the raster's distribution onto a
//!   target histogram
//! - **Quantization**: uniform or IGS reduction to a number of grey levels
//!
//! LUT builders return a (3, 256) table; [`filters::lut::apply_lut_u8`]
//! applies it. Every operation returns [`Result`] and never hands back a
//! partial table or raster.

pub mod enhancement;
pub mod error;
pub mod filters;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use enhancement::Enhancement;
pub use error::{Result, ToneError};
pub use filters::histogram::{histogram_to_cdf, histogram_u8, Cdf, Histogram, BINS, CHANNELS};
pub use filters::histogram_matching::matching_lut_u8;
pub use filters::linear_stretch::{linear_lut_u8, LinearStretch};
pub use filters::lut::{apply_lut_u8, Lut};
pub use filters::quantize::{igs_u8, quantize_u8, uniform_u8, QuantizationType};

// Python bindings (only when python feature is enabled)
#[cfg(feature = "python")]
mod python {
    use numpy::{IntoPyArray, PyArray2, PyArray3, PyReadonlyArray2, PyReadonlyArray3};
    use pyo3::exceptions::PyValueError;
    use pyo3::prelude::*;

    use crate::error::ToneError;
    use crate::filters::histogram as histogram_mod;
    use crate::filters::quantize as quantize_mod;
    use crate::filters::{histogram_matching, linear_stretch, lut};

    impl From<ToneError> for PyErr {
        fn from(err: ToneError) -> Self {
            PyValueError::new_err(err.to_string())
        }
    }

    // ========================================================================
    // Statistics
    // ========================================================================

    /// Per-channel histogram of a (H, W, 3) u8 image, returned as (3, 256) u32.
    #[pyfunction]
    pub fn histogram<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
    ) -> PyResult<Bound<'py, PyArray2<u32>>> {
        let result = histogram_mod::histogram_u8(image.as_array())?;
        Ok(result.into_pyarray(py))
    }

    /// Normalized cumulative distribution of a (3, 256) histogram.
    #[pyfunction]
    pub fn histogram_to_cdf<'py>(
        py: Python<'py>,
        hist: PyReadonlyArray2<'py, u32>,
    ) -> PyResult<Bound<'py, PyArray2<f64>>> {
        let result = histogram_mod::histogram_to_cdf(hist.as_array())?;
        Ok(result.into_pyarray(py))
    }

    // ========================================================================
    // LUT builders
    // ========================================================================

    /// Linear stretch LUT discarding `percentage` percent from both tails combined.
    ///
    /// Raises ValueError if `percentage` is odd or the stretch range collapses.
    #[pyfunction]
    pub fn linear_lut<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        percentage: u32,
    ) -> PyResult<Bound<'py, PyArray2<u8>>> {
        let result = linear_stretch::linear_lut_u8(image.as_array(), percentage)?;
        Ok(result.into_pyarray(py))
    }

    /// Histogram matching LUT towards a (3, 256) target histogram.
    #[pyfunction]
    pub fn matching_lut<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        target: PyReadonlyArray2<'py, u32>,
    ) -> PyResult<Bound<'py, PyArray2<u8>>> {
        let result = histogram_matching::matching_lut_u8(image.as_array(), target.as_array())?;
        Ok(result.into_pyarray(py))
    }

    /// Apply a per-channel LUT to an image.
    ///
    /// # Arguments
    /// * `image` - (H, W, 3) u8 image
    /// * `table` - (3, 256) u8 LUT, e.g. from `linear_lut` or `matching_lut`
    ///
    /// # Returns
    /// New (H, W, 3) u8 image with every sample replaced through the LUT
    #[pyfunction]
    pub fn apply_lut<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        table: PyReadonlyArray2<'py, u8>,
    ) -> PyResult<Bound<'py, PyArray3<u8>>> {
        let result = lut::apply_lut_u8(image.as_array(), table.as_array())?;
        Ok(result.into_pyarray(py))
    }

    // ========================================================================
    // Quantization
    // ========================================================================

    /// Quantize to `levels` grey levels per channel.
    ///
    /// # Arguments
    /// * `image` - (H, W, 3) u8 image
    /// * `levels` - Number of output levels (1-256)
    /// * `mode` - "uniform" or "igs"
    #[pyfunction]
    #[pyo3(signature = (image, levels, mode="uniform"))]
    pub fn quantize<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        levels: u32,
        mode: &str,
    ) -> PyResult<Bound<'py, PyArray3<u8>>> {
        let mode: quantize_mod::QuantizationType = mode.parse()?;
        let result = quantize_mod::quantize_u8(image.as_array(), levels, mode)?;
        Ok(result.into_pyarray(py))
    }

    /// ImageTone Rust extension module
    #[pymodule]
    pub fn imagetone_rust(m: &Bound<'_, PyModule>) -> PyResult<()> {
        m.add_function(wrap_pyfunction!(histogram, m)?)?;
        m.add_function(wrap_pyfunction!(histogram_to_cdf, m)?)?;
        m.add_function(wrap_pyfunction!(linear_lut, m)?)?;
        m.add_function(wrap_pyfunction!(matching_lut, m)?)?;
        m.add_function(wrap_pyfunction!(apply_lut, m)?)?;
        m.add_function(wrap_pyfunction!(quantize, m)?)?;
        Ok(())
    }
}

#[cfg(feature = "python")]
pub use python::imagetone_rust;
