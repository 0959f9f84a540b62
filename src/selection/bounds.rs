//! Tight bounding box of a selection mask.

use super::BoundingBox;

/// Smallest rectangle containing every pixel with mask value 1.
///
/// Returns `None` when nothing is selected.
pub fn bounding_box(mask: &[u8], width: usize, height: usize) -> Option<BoundingBox> {
    let mut min_x = width;
    let mut min_y = height;
    let mut max_x = 0;
    let mut max_y = 0;
    let mut any = false;

    for (idx, &v) in mask.iter().enumerate() {
        if v != 1 {
            continue;
        }
        let x = idx % width;
        let y = idx / width;
        min_x = min_x.min(x);
        min_y = min_y.min(y);
        max_x = max_x.max(x);
        max_y = max_y.max(y);
        any = true;
    }

    any.then(|| BoundingBox {
        x: min_x,
        y: min_y,
        width: max_x - min_x + 1,
        height: max_y - min_y + 1,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_mask() {
        assert_eq!(bounding_box(&[0u8; 12], 4, 3), None);
    }

    #[test]
    fn test_single_pixel() {
        let mut mask = vec![0u8; 12];
        mask[2 * 4 + 3] = 1;
        assert_eq!(
            bounding_box(&mask, 4, 3),
            Some(BoundingBox { x: 3, y: 2, width: 1, height: 1 })
        );
    }

    #[test]
    fn test_scattered_pixels() {
        let (w, h) = (10, 8);
        let mut mask = vec![0u8; w * h];
        mask[w + 7] = 1;
        mask[5 * w + 2] = 1;
        mask[6 * w + 4] = 1;
        assert_eq!(
            bounding_box(&mask, w, h),
            Some(BoundingBox { x: 2, y: 1, width: 6, height: 6 })
        );
    }
}
