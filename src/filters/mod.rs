//! Pixel-level building blocks shared by the selection algorithms.
//!
//! - **Edge**: BT.709 luminance and Sobel gradient magnitude
//! - **Color science**: sRGB to CIE-LAB and delta E
//! - **Morphology**: 3x3 binary dilate, erode and closing on 0/1 masks
//!
//! All maps and masks are flat vectors indexed by `y * width + x`.

pub mod color_science;
pub mod edge;
pub mod morphology;
