//! RegionSelect Rust Extensions
//!
//! Model-free region selection for canvas editors: pick a coherent region
//! of an RGBA image and return a 0/1 mask plus its tight bounding box.
//! Python bindings via PyO3 and WASM bindings for JavaScript are available
//! behind the `python` and `wasm` features.
//!
//! ## Algorithms
//! - **Smart Select**: grid-seeded superpixels, LAB region growing from the
//!   region center, edge rejection, morphological closing
//! - **GrabCut-lite**: diagonal Gaussian foreground/background models and an
//!   edge-aware energy, iterated a fixed number of times
//!
//! ## Image Format
//! Input is a flat RGBA u8 buffer, row-major, top-left origin, wrapped in a
//! [`PixelBuffer`] which validates `len == width * height * 4`. Output masks
//! are `width * height` bytes aligned 1:1 with the input pixels.
//!
//! ```
//! use regionselect_rust::{smart_select_region, PixelBuffer};
//!
//! let pixels = vec![200u8; 16 * 16 * 4];
//! let image = PixelBuffer::new(16, 16, &pixels).unwrap();
//! let result = smart_select_region(&image).unwrap();
//! assert_eq!(result.mask.len(), 16 * 16);
//! ```
//!
//! All calls are synchronous and stateless; independent regions can be
//! processed concurrently.

pub mod error;
pub mod filters;
pub mod image;
pub mod selection;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use error::{Result, SelectError};
pub use image::PixelBuffer;
pub use selection::{
    grab_cut_region, grab_cut_region_from_mask, grab_cut_region_with_config,
    initial_mask_from_rect, select_region, smart_select_region,
    smart_select_region_with_config, BoundingBox, GrabCutConfig, SelectionMethod,
    SelectionResult, SmartSelectConfig,
};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Python bindings (only when python feature is enabled)
#[cfg(feature = "python")]
mod python {
    use numpy::{IntoPyArray, PyArray2, PyReadonlyArray2, PyReadonlyArray3};
    use pyo3::exceptions::PyValueError;
    use pyo3::prelude::*;

    use crate::error::SelectError;
    use crate::image::PixelBuffer;
    use crate::selection::{self as sel, GrabCutConfig, SelectionResult, SmartSelectConfig};

    impl From<SelectError> for PyErr {
        fn from(err: SelectError) -> PyErr {
            PyValueError::new_err(err.to_string())
        }
    }

    type PyBounds = Option<(usize, usize, usize, usize)>;

    fn into_py<'py>(
        py: Python<'py>,
        result: SelectionResult,
    ) -> (Bound<'py, PyArray2<u8>>, PyBounds) {
        let bounds = result.bbox.map(|b| (b.x, b.y, b.width, b.height));
        (result.mask_array().into_pyarray(py), bounds)
    }

    // ========================================================================
    // Smart Select
    // ========================================================================

    /// Select the region around the image center (or `seed`).
    ///
    /// # Arguments
    /// * `image` - RGBA u8 array of shape (height, width, 4)
    /// * `seed` - Optional (x, y) pixel to grow from
    /// * `contiguous` - Only grow into cells connected to the seed
    ///
    /// # Returns
    /// Tuple of (mask (height, width) with values 0/1, bounds (x, y, w, h) or None)
    #[pyfunction]
    #[pyo3(signature = (image, seed=None, contiguous=false))]
    pub fn smart_select_region<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        seed: Option<(usize, usize)>,
        contiguous: bool,
    ) -> PyResult<(Bound<'py, PyArray2<u8>>, PyBounds)> {
        let view = image.as_array();
        let standard = view.as_standard_layout();
        let buffer = PixelBuffer::from_ndarray(standard.view())?;
        let config = SmartSelectConfig {
            seed,
            contiguous,
            ..Default::default()
        };
        let result = py.allow_threads(|| sel::smart_select_region_with_config(&buffer, &config))?;
        Ok(into_py(py, result))
    }

    // ========================================================================
    // GrabCut-lite
    // ========================================================================

    /// Segment foreground from a background frame.
    ///
    /// # Arguments
    /// * `image` - RGBA u8 array of shape (height, width, 4)
    /// * `iterations` - Fit/relabel passes (default: 5)
    /// * `border_inset` - Initial background frame width in pixels (default: 10)
    #[pyfunction]
    #[pyo3(signature = (image, iterations=5, border_inset=10))]
    pub fn grab_cut_region<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        iterations: usize,
        border_inset: usize,
    ) -> PyResult<(Bound<'py, PyArray2<u8>>, PyBounds)> {
        let view = image.as_array();
        let standard = view.as_standard_layout();
        let buffer = PixelBuffer::from_ndarray(standard.view())?;
        let config = GrabCutConfig {
            iterations,
            border_inset,
            ..Default::default()
        };
        let result = py.allow_threads(|| sel::grab_cut_region_with_config(&buffer, &config))?;
        Ok(into_py(py, result))
    }

    /// Segment starting from a caller-supplied (height, width) mask.
    #[pyfunction]
    pub fn grab_cut_region_from_mask<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        mask: PyReadonlyArray2<'py, u8>,
    ) -> PyResult<(Bound<'py, PyArray2<u8>>, PyBounds)> {
        let view = image.as_array();
        let standard = view.as_standard_layout();
        let buffer = PixelBuffer::from_ndarray(standard.view())?;
        let initial: Vec<u8> = mask.as_array().iter().copied().collect();
        let config = GrabCutConfig::default();
        let result = py.allow_threads(|| {
            sel::grab_cut_region_from_mask(&buffer, &initial, &config)
        })?;
        Ok(into_py(py, result))
    }

    /// RegionSelect Rust extension module
    #[pymodule]
    pub fn regionselect_rust(m: &Bound<'_, PyModule>) -> PyResult<()> {
        m.add("__version__", crate::VERSION)?;

        // Selection
        m.add_function(wrap_pyfunction!(smart_select_region, m)?)?;
        m.add_function(wrap_pyfunction!(grab_cut_region, m)?)?;
        m.add_function(wrap_pyfunction!(grab_cut_region_from_mask, m)?)?;

        Ok(())
    }
}

#[cfg(feature = "python")]
pub use python::regionselect_rust;
