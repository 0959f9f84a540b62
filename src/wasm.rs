//! WebAssembly exports for RegionSelect.
//!
//! These functions are exposed to JavaScript via wasm-bindgen. Input is the
//! flat RGBA byte array of an `ImageData` (length = width * height * 4).
//! Invalid input is reported as a thrown JS `Error`.

use wasm_bindgen::prelude::*;

use crate::image::PixelBuffer;
use crate::selection::{
    grab_cut_region, grab_cut_region_from_mask, smart_select_region_with_config, GrabCutConfig,
    SelectionResult, SmartSelectConfig,
};

/// Selection result handed back to JavaScript.
#[wasm_bindgen]
pub struct WasmSelection {
    mask: Vec<u8>,
    width: usize,
    height: usize,
    bbox: Vec<u32>,
}

#[wasm_bindgen]
impl WasmSelection {
    /// Mask bytes, 1 = selected, row-major.
    #[wasm_bindgen(getter)]
    pub fn mask(&self) -> Vec<u8> {
        self.mask.clone()
    }

    /// Mask scaled to 0/255 for use as an alpha channel.
    #[wasm_bindgen(getter)]
    pub fn alpha(&self) -> Vec<u8> {
        self.mask.iter().map(|&v| v * 255).collect()
    }

    #[wasm_bindgen(getter)]
    pub fn width(&self) -> usize {
        self.width
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> usize {
        self.height
    }

    /// `[x, y, width, height]`, or an empty array when nothing is selected.
    #[wasm_bindgen(getter)]
    pub fn bbox(&self) -> Vec<u32> {
        self.bbox.clone()
    }

    #[wasm_bindgen(getter, js_name = isEmpty)]
    pub fn is_empty(&self) -> bool {
        self.bbox.is_empty()
    }
}

impl From<SelectionResult> for WasmSelection {
    fn from(result: SelectionResult) -> Self {
        let bbox = result
            .bbox
            .map(|b| vec![b.x as u32, b.y as u32, b.width as u32, b.height as u32])
            .unwrap_or_default();
        WasmSelection {
            mask: result.mask,
            width: result.width,
            height: result.height,
            bbox,
        }
    }
}

fn to_js(err: crate::error::SelectError) -> JsError {
    JsError::new(&err.to_string())
}

// ============================================================================
// Smart Select
// ============================================================================

/// Select the region around the center of an RGBA buffer.
///
/// # Arguments
/// * `data` - Flat array of RGBA bytes (length = width * height * 4)
/// * `width` - Image width in pixels
/// * `height` - Image height in pixels
#[wasm_bindgen]
pub fn smart_select_region_wasm(
    data: &[u8],
    width: usize,
    height: usize,
) -> Result<WasmSelection, JsError> {
    let image = PixelBuffer::new(width, height, data).map_err(to_js)?;
    smart_select_region_with_config(&image, &SmartSelectConfig::default())
        .map(WasmSelection::from)
        .map_err(to_js)
}

/// Select the region around a clicked pixel.
///
/// # Arguments
/// * `seed_x`, `seed_y` - Pixel to grow from
/// * `contiguous` - Only grow into cells connected to the seed
#[wasm_bindgen]
pub fn smart_select_at_wasm(
    data: &[u8],
    width: usize,
    height: usize,
    seed_x: usize,
    seed_y: usize,
    contiguous: bool,
) -> Result<WasmSelection, JsError> {
    let image = PixelBuffer::new(width, height, data).map_err(to_js)?;
    let config = SmartSelectConfig::default()
        .with_seed(seed_x, seed_y)
        .contiguous(contiguous);
    smart_select_region_with_config(&image, &config)
        .map(WasmSelection::from)
        .map_err(to_js)
}

// ============================================================================
// GrabCut-lite
// ============================================================================

/// Segment the foreground of an RGBA buffer.
#[wasm_bindgen]
pub fn grab_cut_region_wasm(
    data: &[u8],
    width: usize,
    height: usize,
) -> Result<WasmSelection, JsError> {
    let image = PixelBuffer::new(width, height, data).map_err(to_js)?;
    grab_cut_region(&image)
        .map(WasmSelection::from)
        .map_err(to_js)
}

/// Refine a selection mask (length = width * height) with GrabCut.
#[wasm_bindgen]
pub fn grab_cut_refine_wasm(
    data: &[u8],
    width: usize,
    height: usize,
    mask: &[u8],
) -> Result<WasmSelection, JsError> {
    let image = PixelBuffer::new(width, height, data).map_err(to_js)?;
    grab_cut_region_from_mask(&image, mask, &GrabCutConfig::default())
        .map(WasmSelection::from)
        .map_err(to_js)
}
