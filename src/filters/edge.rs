//! Luminance and Sobel gradient magnitude.
//!
//! Both selection algorithms use the gradient magnitude as an edge map:
//! Smart Select rejects pixels on strong edges, GrabCut adds an edge-aware
//! term to its labelling energy.
//!
//! Maps are flat `Vec<f32>` indexed by `y * width + x`.

use rayon::prelude::*;

use crate::image::PixelBuffer;

// BT.709 luminosity coefficients
const LUMA_R: f32 = 0.2126;
const LUMA_G: f32 = 0.7152;
const LUMA_B: f32 = 0.0722;

/// Compute per-pixel luminance (0.0-255.0).
pub fn luminance(image: &PixelBuffer) -> Vec<f32> {
    (0..image.pixel_count())
        .into_par_iter()
        .map(|idx| {
            let [r, g, b] = image.rgb_f32(idx);
            LUMA_R * r + LUMA_G * g + LUMA_B * b
        })
        .collect()
}

/// Sobel gradient magnitude of a luminance map.
///
/// Only interior pixels are computed; the one-pixel border ring stays 0
/// (no padding or wraparound). Images narrower or shorter than 3 pixels
/// produce an all-zero map.
pub fn sobel_magnitude(luma: &[f32], width: usize, height: usize) -> Vec<f32> {
    let mut output = vec![0.0f32; width * height];
    if width < 3 || height < 3 {
        return output;
    }

    output
        .par_chunks_mut(width)
        .enumerate()
        .skip(1)
        .take(height - 2)
        .for_each(|(y, row)| {
            let up = &luma[(y - 1) * width..y * width];
            let mid = &luma[y * width..(y + 1) * width];
            let down = &luma[(y + 1) * width..(y + 2) * width];

            for x in 1..width - 1 {
                let gx = (up[x + 1] + 2.0 * mid[x + 1] + down[x + 1])
                    - (up[x - 1] + 2.0 * mid[x - 1] + down[x - 1]);
                let gy = (down[x - 1] + 2.0 * down[x] + down[x + 1])
                    - (up[x - 1] + 2.0 * up[x] + up[x + 1]);
                row[x] = gx.hypot(gy);
            }
        });

    output
}

/// Luminance followed by Sobel magnitude.
pub fn edge_map(image: &PixelBuffer) -> Vec<f32> {
    let luma = luminance(image);
    sobel_magnitude(&luma, image.width(), image.height())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(width: usize, height: usize, rgb: [u8; 3]) -> Vec<u8> {
        let mut data = Vec::with_capacity(width * height * 4);
        for _ in 0..width * height {
            data.extend_from_slice(&[rgb[0], rgb[1], rgb[2], 255]);
        }
        data
    }

    #[test]
    fn test_luminance_bt709() {
        let data = solid(1, 1, [255, 255, 255]);
        let image = PixelBuffer::new(1, 1, &data).unwrap();
        let luma = luminance(&image);
        assert!((luma[0] - 255.0).abs() < 0.01);

        let data = solid(1, 1, [0, 255, 0]);
        let image = PixelBuffer::new(1, 1, &data).unwrap();
        assert!((luminance(&image)[0] - 0.7152 * 255.0).abs() < 0.01);
    }

    #[test]
    fn test_sobel_flat_is_zero() {
        let luma = vec![100.0f32; 5 * 5];
        let edges = sobel_magnitude(&luma, 5, 5);
        assert!(edges.iter().all(|&e| e == 0.0));
    }

    #[test]
    fn test_sobel_vertical_step() {
        // Left two columns dark, right three bright
        let (w, h) = (5, 5);
        let mut luma = vec![0.0f32; w * h];
        for y in 0..h {
            for x in 2..w {
                luma[y * w + x] = 100.0;
            }
        }
        let edges = sobel_magnitude(&luma, w, h);

        // Pixels straddling the step see |Gx| = 4 * 100
        assert!((edges[2 * w + 1] - 400.0).abs() < 1e-3);
        assert!((edges[2 * w + 2] - 400.0).abs() < 1e-3);
        // Flat interior on the right
        assert_eq!(edges[2 * w + 3], 0.0);
    }

    #[test]
    fn test_sobel_border_untouched() {
        let (w, h) = (4, 4);
        let luma: Vec<f32> = (0..w * h).map(|i| (i * 17 % 255) as f32).collect();
        let edges = sobel_magnitude(&luma, w, h);
        for x in 0..w {
            assert_eq!(edges[x], 0.0);
            assert_eq!(edges[(h - 1) * w + x], 0.0);
        }
        for y in 0..h {
            assert_eq!(edges[y * w], 0.0);
            assert_eq!(edges[y * w + w - 1], 0.0);
        }
    }

    #[test]
    fn test_sobel_tiny_image() {
        let luma = vec![0.0, 255.0, 0.0, 255.0];
        assert_eq!(sobel_magnitude(&luma, 2, 2), vec![0.0; 4]);
    }
}
