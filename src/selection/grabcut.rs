//! GrabCut-lite: iterative foreground/background relabelling.
//!
//! Each iteration fits one diagonal-covariance Gaussian per class to the
//! current labelling, then relabels every interior pixel to the class with
//! the lower energy:
//!
//! ```text
//! E_fg = 0.5 * sum((c - mean_fg)^2 / var_fg) + lambda / (1 + edge)
//! E_bg = 0.5 * sum((c - mean_bg)^2 / var_bg) + lambda * edge
//! ```
//!
//! The iteration count is fixed; there is no convergence test. The border
//! ring keeps its initial label.

use log::{debug, trace};
use rayon::prelude::*;

use crate::error::{Result, SelectError};
use crate::filters::edge::edge_map;
use crate::filters::morphology::close_3x3;
use crate::image::PixelBuffer;

use super::{BoundingBox, SelectionResult};

/// Tuning parameters for GrabCut-lite.
#[derive(Debug, Clone, PartialEq)]
pub struct GrabCutConfig {
    /// Number of fit/relabel passes.
    pub iterations: usize,
    /// Weight of the edge term.
    pub lambda: f32,
    /// Width of the initial background frame in pixels.
    pub border_inset: usize,
}

impl Default for GrabCutConfig {
    fn default() -> Self {
        Self {
            iterations: 5,
            lambda: 0.15,
            border_inset: 10,
        }
    }
}

impl GrabCutConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.lambda.is_finite() || self.lambda < 0.0 {
            return Err(SelectError::InvalidConfig(format!(
                "lambda must be a non-negative number, got {}",
                self.lambda
            )));
        }
        Ok(())
    }
}

/// Diagonal Gaussian color model for one class.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaussianColorModel {
    pub mean: [f32; 3],
    pub variance: [f32; 3],
}

impl GaussianColorModel {
    /// Fit to the pixels whose mask value equals `class`.
    ///
    /// Counts are floored at 1 and variances at 1, so an empty class yields
    /// a zero mean with unit variance.
    pub fn fit(image: &PixelBuffer, mask: &[u8], class: u8) -> Self {
        let mut sum = [0.0f64; 3];
        let mut sum_sq = [0.0f64; 3];
        let mut count = 0usize;

        for (idx, _) in mask.iter().enumerate().filter(|(_, &m)| m == class) {
            let rgb = image.rgb_f32(idx);
            for c in 0..3 {
                let v = rgb[c] as f64;
                sum[c] += v;
                sum_sq[c] += v * v;
            }
            count += 1;
        }

        let n = count.max(1) as f64;
        let mut mean = [0.0f32; 3];
        let mut variance = [0.0f32; 3];
        for c in 0..3 {
            let m = sum[c] / n;
            mean[c] = m as f32;
            variance[c] = ((sum_sq[c] / n - m * m) as f32).max(1.0);
        }

        Self { mean, variance }
    }

    /// Negative log-likelihood up to a constant: `0.5 * sum((c - mean)^2 / var)`.
    #[inline]
    pub fn energy(&self, rgb: [f32; 3]) -> f32 {
        let mut e = 0.0f32;
        for c in 0..3 {
            let d = rgb[c] - self.mean[c];
            e += d * d / self.variance[c];
        }
        0.5 * e
    }
}

/// Initial mask: foreground inside a frame of `inset` pixels, background on it.
pub fn initial_mask_inset(width: usize, height: usize, inset: usize) -> Vec<u8> {
    let mut mask = vec![0u8; width * height];
    let x_end = width.saturating_sub(inset);
    let y_end = height.saturating_sub(inset);
    if inset >= x_end {
        return mask;
    }
    for y in inset..y_end {
        mask[y * width + inset..y * width + x_end].fill(1);
    }
    mask
}

/// Initial mask: foreground inside `rect`, clipped to the image.
pub fn initial_mask_from_rect(width: usize, height: usize, rect: BoundingBox) -> Vec<u8> {
    let mut mask = vec![0u8; width * height];
    let x_end = rect.x.saturating_add(rect.width).min(width);
    let y_end = rect.y.saturating_add(rect.height).min(height);
    for y in rect.y.min(height)..y_end {
        if rect.x < x_end {
            mask[y * width + rect.x..y * width + x_end].fill(1);
        }
    }
    mask
}

/// Segment `image` with default settings and the inset-frame initial mask.
pub fn grab_cut_region(image: &PixelBuffer) -> Result<SelectionResult> {
    grab_cut_region_with_config(image, &GrabCutConfig::default())
}

/// Segment with explicit settings, starting from the inset-frame mask.
pub fn grab_cut_region_with_config(
    image: &PixelBuffer,
    config: &GrabCutConfig,
) -> Result<SelectionResult> {
    config.validate()?;
    let mask = initial_mask_inset(image.width(), image.height(), config.border_inset);
    run(image, mask, config)
}

/// Segment starting from a caller-supplied 0/1 mask.
///
/// Any non-zero entry counts as foreground. `config.border_inset` is
/// ignored.
pub fn grab_cut_region_from_mask(
    image: &PixelBuffer,
    initial: &[u8],
    config: &GrabCutConfig,
) -> Result<SelectionResult> {
    config.validate()?;
    if initial.len() != image.pixel_count() {
        return Err(SelectError::MaskLength {
            expected: image.pixel_count(),
            actual: initial.len(),
        });
    }
    let mask = initial.iter().map(|&v| (v != 0) as u8).collect();
    run(image, mask, config)
}

fn run(image: &PixelBuffer, mut mask: Vec<u8>, config: &GrabCutConfig) -> Result<SelectionResult> {
    let (width, height) = (image.width(), image.height());
    let edges = edge_map(image);
    debug!(
        "grabcut: {}x{} iterations {} lambda {}",
        width, height, config.iterations, config.lambda
    );

    for pass in 0..config.iterations {
        relabel(image, &edges, &mut mask, config.lambda);
        trace!(
            "grabcut pass {}: {} foreground pixels",
            pass + 1,
            mask.iter().filter(|&&m| m == 1).count()
        );
    }

    let closed = close_3x3(&mask, width, height);
    let result = SelectionResult::from_mask(closed, width, height);
    debug!(
        "grabcut: {} pixels selected, bbox {:?}",
        result.pixel_count(),
        result.bbox
    );
    Ok(result)
}

/// One fit + relabel pass over the interior pixels.
fn relabel(image: &PixelBuffer, edges: &[f32], mask: &mut [u8], lambda: f32) {
    let (width, height) = (image.width(), image.height());
    if width < 3 || height < 3 {
        return;
    }

    let fg = GaussianColorModel::fit(image, mask, 1);
    let bg = GaussianColorModel::fit(image, mask, 0);

    mask.par_chunks_mut(width)
        .enumerate()
        .skip(1)
        .take(height - 2)
        .for_each(|(y, row)| {
            for x in 1..width - 1 {
                let idx = y * width + x;
                let rgb = image.rgb_f32(idx);
                let edge = edges[idx];
                let e_fg = fg.energy(rgb) + lambda / (1.0 + edge);
                let e_bg = bg.energy(rgb) + lambda * edge;
                row[x] = (e_fg < e_bg) as u8;
            }
        });
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
    fn test_initial_mask_inset() {
        let mask = initial_mask_inset(30, 25, 10);
        let fg: usize = mask.iter().map(|&v| v as usize).sum();
        assert_eq!(fg, 10 * 5);
        assert_eq!(mask[10 * 30 + 10], 1);
        assert_eq!(mask[10 * 30 + 9], 0);
        assert_eq!(mask[15 * 30 + 10], 0);
    }

    #[test]
    fn test_initial_mask_inset_too_small() {
        let mask = initial_mask_inset(15, 15, 10);
        assert!(mask.iter().all(|&v| v == 0));
    }

    #[test]
    fn test_initial_mask_inset_narrow() {
        // Rows span the inset but columns do not, and vice versa
        assert!(initial_mask_inset(15, 100, 10).iter().all(|&v| v == 0));
        assert!(initial_mask_inset(100, 15, 10).iter().all(|&v| v == 0));
    }

    #[test]
    fn test_narrow_regions_complete() {
        for (w, h) in [(15, 100), (100, 15), (20, 60), (3, 40)] {
            let data = solid(w, h, [128, 128, 128]);
            let image = PixelBuffer::new(w, h, &data).unwrap();
            let result = grab_cut_region(&image).unwrap();
            assert_eq!(result.mask.len(), w * h);
            assert!(result.is_empty(), "{w}x{h}");
        }
    }

    #[test]
    fn test_initial_mask_from_rect_clips() {
        let rect = BoundingBox { x: 2, y: 3, width: 10, height: 10 };
        let mask = initial_mask_from_rect(5, 5, rect);
        let fg: usize = mask.iter().map(|&v| v as usize).sum();
        assert_eq!(fg, 3 * 2);
    }

    #[test]
    fn test_gaussian_fit_floors() {
        let data = solid(2, 2, [100, 50, 25]);
        let image = PixelBuffer::new(2, 2, &data).unwrap();

        let model = GaussianColorModel::fit(&image, &[1, 1, 1, 1], 1);
        assert_eq!(model.mean, [100.0, 50.0, 25.0]);
        assert_eq!(model.variance, [1.0, 1.0, 1.0]);

        // Empty class
        let empty = GaussianColorModel::fit(&image, &[1, 1, 1, 1], 0);
        assert_eq!(empty.mean, [0.0, 0.0, 0.0]);
        assert_eq!(empty.variance, [1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_gaussian_energy() {
        let model = GaussianColorModel {
            mean: [10.0, 10.0, 10.0],
            variance: [4.0, 1.0, 1.0],
        };
        // 0.5 * (16/4 + 0 + 4/1)
        assert!((model.energy([14.0, 10.0, 12.0]) - 4.0).abs() < 1e-6);
    }

    #[test]
    fn test_uniform_image_goes_to_background() {
        let data = solid(40, 40, [120, 180, 60]);
        let image = PixelBuffer::new(40, 40, &data).unwrap();
        let result = grab_cut_region(&image).unwrap();
        assert!(result.is_empty());
        assert!(result.bbox.is_none());
    }

    #[test]
    fn test_object_inside_frame() {
        // Dark blue disc-ish square on a light background
        let (w, h) = (60, 60);
        let mut data = solid(w, h, [235, 230, 220]);
        for y in 18..42 {
            for x in 18..42 {
                let i = (y * w + x) * 4;
                data[i..i + 3].copy_from_slice(&[30, 40, 120]);
            }
        }
        let image = PixelBuffer::new(w, h, &data).unwrap();
        let result = grab_cut_region(&image).unwrap();

        let bbox = result.bbox.unwrap();
        assert!(bbox.x >= 16 && bbox.x <= 20, "{bbox:?}");
        assert!(bbox.y >= 16 && bbox.y <= 20, "{bbox:?}");
        assert!(bbox.x + bbox.width >= 40 && bbox.x + bbox.width <= 44, "{bbox:?}");
        assert_eq!(result.mask[30 * w + 30], 1);
        assert_eq!(result.mask[12 * w + 12], 0);
    }

    #[test]
    fn test_from_mask_length_mismatch() {
        let data = solid(8, 8, [0, 0, 0]);
        let image = PixelBuffer::new(8, 8, &data).unwrap();
        assert!(matches!(
            grab_cut_region_from_mask(&image, &[1u8; 10], &GrabCutConfig::default()),
            Err(SelectError::MaskLength { expected: 64, actual: 10 })
        ));
    }

    #[test]
    fn test_invalid_lambda() {
        let data = solid(8, 8, [0, 0, 0]);
        let image = PixelBuffer::new(8, 8, &data).unwrap();
        let config = GrabCutConfig { lambda: f32::NAN, ..Default::default() };
        assert!(matches!(
            grab_cut_region_with_config(&image, &config),
            Err(SelectError::InvalidConfig(_))
        ));
    }
}
