//! Binary morphology on 0/1 selection masks.
//!
//! Closing (dilate then erode) with a 3x3 square structuring element
//! removes isolated speckles and fills one-pixel holes. Only interior
//! pixels are processed; the border ring keeps its input value.

/// Dilate a 0/1 mask with a 3x3 window, interior pixels only.
pub fn dilate_3x3(mask: &[u8], width: usize, height: usize) -> Vec<u8> {
    let mut output = mask.to_vec();
    for y in 1..height.saturating_sub(1) {
        for x in 1..width.saturating_sub(1) {
            output[y * width + x] = window_any(mask, width, x, y) as u8;
        }
    }
    output
}

/// Erode a 0/1 mask with a 3x3 window, interior pixels only.
pub fn erode_3x3(mask: &[u8], width: usize, height: usize) -> Vec<u8> {
    let mut output = mask.to_vec();
    for y in 1..height.saturating_sub(1) {
        for x in 1..width.saturating_sub(1) {
            output[y * width + x] = window_all(mask, width, x, y) as u8;
        }
    }
    output
}

/// Morphological closing of a 0/1 mask.
///
/// The border ring of the result equals the border ring of `mask`.
pub fn close_3x3(mask: &[u8], width: usize, height: usize) -> Vec<u8> {
    let dilated = dilate_3x3(mask, width, height);
    let mut closed = mask.to_vec();
    for y in 1..height.saturating_sub(1) {
        for x in 1..width.saturating_sub(1) {
            closed[y * width + x] = window_all(&dilated, width, x, y) as u8;
        }
    }
    closed
}

#[inline]
fn window_any(mask: &[u8], width: usize, x: usize, y: usize) -> bool {
    (y - 1..=y + 1).any(|sy| mask[sy * width + x - 1..=sy * width + x + 1].contains(&1))
}

#[inline]
fn window_all(mask: &[u8], width: usize, x: usize, y: usize) -> bool {
    (y - 1..=y + 1).all(|sy| mask[sy * width + x - 1..=sy * width + x + 1].iter().all(|&v| v == 1))
}
