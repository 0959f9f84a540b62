//! Borrowed RGBA pixel buffer used as input by every selection algorithm.
//!
//! The buffer is row-major with a top-left origin and 4 bytes per pixel
//! (R, G, B, A). Dimensions are validated once at construction so the
//! algorithms can index without further checks.

use ndarray::ArrayView3;

use crate::error::{Result, SelectError};
use crate::selection::BoundingBox;

/// Immutable view of `width * height` RGBA pixels.
#[derive(Debug, Clone, Copy)]
pub struct PixelBuffer<'a> {
    width: usize,
    height: usize,
    data: &'a [u8],
}

/// Byte length of a `width x height` RGBA buffer, or an error for
/// zero-sized or overflowing dimensions.
fn rgba_len(width: usize, height: usize) -> Result<usize> {
    if width == 0 || height == 0 {
        return Err(SelectError::InvalidDimensions { width, height });
    }
    width
        .checked_mul(height)
        .and_then(|n| n.checked_mul(4))
        .ok_or(SelectError::InvalidDimensions { width, height })
}

impl<'a> PixelBuffer<'a> {
    /// Wrap a flat RGBA byte slice.
    ///
    /// # Errors
    /// * `InvalidDimensions` if either dimension is zero
    /// * `BufferLength` if `data.len() != width * height * 4`
    pub fn new(width: usize, height: usize, data: &'a [u8]) -> Result<Self> {
        let expected = rgba_len(width, height)?;
        if data.len() != expected {
            return Err(SelectError::BufferLength {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self { width, height, data })
    }

    /// Wrap an ndarray view of shape (height, width, 4).
    ///
    /// The view must be in standard (C-contiguous) layout.
    pub fn from_ndarray(view: ArrayView3<'a, u8>) -> Result<Self> {
        let (height, width, channels) = view.dim();
        if channels != 4 {
            return Err(SelectError::InvalidConfig(format!(
                "expected 4 channels (RGBA), got {channels}"
            )));
        }
        let data = view.to_slice().ok_or_else(|| {
            SelectError::InvalidConfig("pixel array must be contiguous".to_string())
        })?;
        Self::new(width, height, data)
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of pixels.
    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }

    /// Raw RGBA bytes.
    #[inline]
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// RGB channels of the pixel at flat index `idx` (`y * width + x`).
    #[inline]
    pub fn rgb(&self, idx: usize) -> [u8; 3] {
        let i = idx * 4;
        [self.data[i], self.data[i + 1], self.data[i + 2]]
    }

    /// RGB channels of the pixel at flat index `idx` as floats (0-255).
    #[inline]
    pub fn rgb_f32(&self, idx: usize) -> [f32; 3] {
        let [r, g, b] = self.rgb(idx);
        [r as f32, g as f32, b as f32]
    }

    /// Copy a sub-rectangle into a new RGBA buffer.
    ///
    /// Used to cut a marquee region out of a larger canvas before running a
    /// selection on it. The result can be wrapped with [`PixelBuffer::new`]
    /// using `rect.width` and `rect.height`.
    pub fn extract_region(&self, rect: BoundingBox) -> Result<Vec<u8>> {
        let out_of_bounds = SelectError::RegionOutOfBounds {
            x: rect.x,
            y: rect.y,
            width: rect.width,
            height: rect.height,
        };
        let fits_x = rect.x.checked_add(rect.width).is_some_and(|r| r <= self.width);
        let fits_y = rect.y.checked_add(rect.height).is_some_and(|b| b <= self.height);
        if rect.width == 0 || rect.height == 0 || !fits_x || !fits_y {
            return Err(out_of_bounds);
        }

        let row_bytes = rect.width * 4;
        let mut out = Vec::with_capacity(row_bytes * rect.height);
        for y in rect.y..rect.y + rect.height {
            let start = (y * self.width + rect.x) * 4;
            out.extend_from_slice(&self.data[start..start + row_bytes]);
        }
        Ok(out)
    }
}
