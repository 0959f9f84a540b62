//! Region selection algorithms.
//!
//! Two independent ways to pick a coherent region out of an RGBA buffer
//! without a trained model:
//! - **Smart Select**: superpixel clustering plus LAB region growing from the
//!   region center (or a chosen seed point)
//! - **GrabCut-lite**: Gaussian foreground/background color models refined
//!   by an edge-aware energy, starting from an inset rectangle
//!
//! Both return a 0/1 mask aligned with the input pixels and the tight
//! bounding box of the selection.

use std::fmt;
use std::str::FromStr;

use ndarray::Array2;

use crate::error::{Result, SelectError};
use crate::image::PixelBuffer;

pub mod bounds;
pub mod grabcut;
pub mod smart_select;
pub mod superpixel;

pub use bounds::bounding_box;
pub use grabcut::{
    grab_cut_region, grab_cut_region_from_mask, grab_cut_region_with_config,
    initial_mask_from_rect, GrabCutConfig,
};
pub use smart_select::{smart_select_region, smart_select_region_with_config, SmartSelectConfig};

/// Axis-aligned rectangle in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoundingBox {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl BoundingBox {
    pub fn area(&self) -> usize {
        self.width * self.height
    }

    /// True if (x, y) lies inside the rectangle.
    pub fn contains(&self, x: usize, y: usize) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }

    /// Shift by an offset, e.g. to map a region-relative box back onto the
    /// canvas the region was cut from. `None` on overflow.
    pub fn translate(&self, dx: usize, dy: usize) -> Option<BoundingBox> {
        Some(BoundingBox {
            x: self.x.checked_add(dx)?,
            y: self.y.checked_add(dy)?,
            ..*self
        })
    }
}

/// Output of a selection run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionResult {
    /// One entry per pixel, 1 = selected, 0 = not selected.
    pub mask: Vec<u8>,
    pub width: usize,
    pub height: usize,
    /// Tight bounds of the selection, `None` if nothing is selected.
    pub bbox: Option<BoundingBox>,
}

impl SelectionResult {
    /// Wrap a finished mask and compute its bounding box.
    pub fn from_mask(mask: Vec<u8>, width: usize, height: usize) -> Self {
        let bbox = bounding_box(&mask, width, height);
        Self {
            mask,
            width,
            height,
            bbox,
        }
    }

    /// Number of selected pixels.
    pub fn pixel_count(&self) -> usize {
        self.mask.iter().filter(|&&v| v == 1).count()
    }

    pub fn is_empty(&self) -> bool {
        self.bbox.is_none()
    }

    /// Mask scaled to 0/255, the alpha convention used for overlays.
    pub fn to_alpha(&self) -> Vec<u8> {
        self.mask.iter().map(|&v| v * 255).collect()
    }

    /// Mask as a (height, width) array.
    pub fn mask_array(&self) -> Array2<u8> {
        Array2::from_shape_fn((self.height, self.width), |(y, x)| {
            self.mask[y * self.width + x]
        })
    }
}

/// Which algorithm to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionMethod {
    #[default]
    SmartSelect,
    GrabCut,
}

impl fmt::Display for SelectionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionMethod::SmartSelect => write!(f, "smart"),
            SelectionMethod::GrabCut => write!(f, "grabcut"),
        }
    }
}

impl FromStr for SelectionMethod {
    type Err = SelectError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "smart" | "smart_select" | "smartselect" => Ok(SelectionMethod::SmartSelect),
            "grabcut" | "grab_cut" => Ok(SelectionMethod::GrabCut),
            other => Err(SelectError::InvalidConfig(format!(
                "unknown selection method '{other}'"
            ))),
        }
    }
}

/// Run `method` with its default settings.
pub fn select_region(method: SelectionMethod, image: &PixelBuffer) -> Result<SelectionResult> {
    match method {
        SelectionMethod::SmartSelect => smart_select_region(image),
        SelectionMethod::GrabCut => grab_cut_region(image),
    }
}
