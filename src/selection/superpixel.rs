//! Grid-seeded superpixel clustering (simplified SLIC).
//!
//! Seeds start on a regular grid and are refined by a fixed number of
//! k-means passes over a combined color + position distance. There is no
//! connectivity enforcement, so a cell may contain small disconnected
//! fragments.

use log::trace;
use rayon::prelude::*;

use crate::image::PixelBuffer;

/// Smallest allowed grid step in pixels.
pub const MIN_GRID_STEP: usize = 8;

/// Cluster center: centroid position and mean RGB color.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Seed {
    pub x: f32,
    pub y: f32,
    pub color: [f32; 3],
    /// Number of pixels assigned in the last pass.
    pub count: usize,
}

/// Result of clustering: one cell id per pixel plus the final seeds.
#[derive(Debug, Clone)]
pub struct Superpixels {
    pub width: usize,
    pub height: usize,
    /// Grid step used to place the seeds.
    pub step: usize,
    /// Cell id per pixel, indexed `y * width + x`.
    pub labels: Vec<u32>,
    pub seeds: Vec<Seed>,
}

impl Superpixels {
    /// Cell id of the pixel at (x, y).
    #[inline]
    pub fn label_at(&self, x: usize, y: usize) -> usize {
        self.labels[y * self.width + x] as usize
    }

    pub fn cell_count(&self) -> usize {
        self.seeds.len()
    }
}

/// Grid step for a region: `max(min_step, floor(sqrt(area / target_count)))`.
pub fn grid_step(width: usize, height: usize, target_count: usize, min_step: usize) -> usize {
    let area = (width * height) as f64;
    let step = (area / target_count.max(1) as f64).sqrt().floor() as usize;
    step.max(min_step).max(1)
}

/// Seed coordinates along one axis: `step/2, step/2 + step, ...` inside
/// `0..len`, or the midpoint when the axis is shorter than `step/2`.
fn grid_positions(len: usize, step: usize) -> Vec<usize> {
    let positions: Vec<usize> = (step / 2..len).step_by(step).collect();
    if positions.is_empty() {
        vec![len / 2]
    } else {
        positions
    }
}

/// Cluster `image` into roughly `target_count` cells.
///
/// # Arguments
/// * `target_count` - Desired number of cells
/// * `min_step` - Lower bound for the grid step
/// * `iterations` - Number of assign/update passes
/// * `compactness` - Weight of squared position distance relative to squared RGB distance
pub fn slic(
    image: &PixelBuffer,
    target_count: usize,
    min_step: usize,
    iterations: usize,
    compactness: f32,
) -> Superpixels {
    let (width, height) = (image.width(), image.height());
    let step = grid_step(width, height, target_count, min_step);

    let mut seeds: Vec<Seed> = Vec::new();
    for &gy in &grid_positions(height, step) {
        for &gx in &grid_positions(width, step) {
            seeds.push(Seed {
                x: gx as f32,
                y: gy as f32,
                color: image.rgb_f32(gy * width + gx),
                count: 0,
            });
        }
    }
    trace!("slic: {}x{} step {} seeds {}", width, height, step, seeds.len());

    let mut labels = vec![0u32; width * height];
    for pass in 0..iterations {
        assign_pixels(image, &seeds, compactness, &mut labels);
        update_seeds(image, &labels, &mut seeds);
        trace!("slic pass {} done", pass + 1);
    }

    Superpixels {
        width,
        height,
        step,
        labels,
        seeds,
    }
}

/// Label every pixel with its nearest seed over all seeds.
///
/// Ties resolve to the lower seed index.
fn assign_pixels(image: &PixelBuffer, seeds: &[Seed], compactness: f32, labels: &mut [u32]) {
    let width = image.width();

    labels
        .par_chunks_mut(width)
        .enumerate()
        .for_each(|(y, row)| {
            let py = y as f32;
            for (x, label) in row.iter_mut().enumerate() {
                let px = x as f32;
                let color = image.rgb_f32(y * width + x);

                let distance = |seed: &Seed| {
                    let dr = color[0] - seed.color[0];
                    let dg = color[1] - seed.color[1];
                    let db = color[2] - seed.color[2];
                    let dx = px - seed.x;
                    let dy = py - seed.y;
                    dr * dr + dg * dg + db * db + compactness * (dx * dx + dy * dy)
                };

                let mut best: Option<(usize, f32)> = None;
                for (k, seed) in seeds.iter().enumerate() {
                    consider(&mut best, k, distance(seed));
                }
                *label = best.map_or(0, |(k, _)| k as u32);
            }
        });
}

/// Keep `(k, d)` if it is strictly closer than the current best.
#[inline]
fn consider(best: &mut Option<(usize, f32)>, k: usize, d: f32) {
    match *best {
        Some((_, bd)) if d >= bd => {}
        _ => *best = Some((k, d)),
    }
}

/// Move each seed to the centroid and mean color of its pixels.
///
/// Sums are divided by `max(1, count)`, so a seed that received no pixels
/// moves to the origin with a black color.
fn update_seeds(image: &PixelBuffer, labels: &[u32], seeds: &mut [Seed]) {
    let width = image.width();
    let mut sums = vec![[0.0f64; 5]; seeds.len()];
    let mut counts = vec![0usize; seeds.len()];

    for (idx, &label) in labels.iter().enumerate() {
        let k = label as usize;
        let [r, g, b] = image.rgb_f32(idx);
        let s = &mut sums[k];
        s[0] += (idx % width) as f64;
        s[1] += (idx / width) as f64;
        s[2] += r as f64;
        s[3] += g as f64;
        s[4] += b as f64;
        counts[k] += 1;
    }

    for ((seed, s), &count) in seeds.iter_mut().zip(&sums).zip(&counts) {
        seed.count = count;
        let n = count.max(1) as f64;
        seed.x = (s[0] / n) as f32;
        seed.y = (s[1] / n) as f32;
        seed.color = [(s[2] / n) as f32, (s[3] / n) as f32, (s[4] / n) as f32];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_tone(width: usize, height: usize, split_x: usize) -> Vec<u8> {
        let mut data = vec![0u8; width * height * 4];
        for y in 0..height {
            for x in 0..width {
                let i = (y * width + x) * 4;
                let v = if x < split_x { 20 } else { 230 };
                data[i..i + 4].copy_from_slice(&[v, v, v, 255]);
            }
        }
        data
    }

    #[test]
    fn test_grid_step() {
        // sqrt(10000 / 300) = 5.77 -> clamped to 8
        assert_eq!(grid_step(100, 100, 300, MIN_GRID_STEP), 8);
        // sqrt(640000 / 100) = 80
        assert_eq!(grid_step(800, 800, 100, MIN_GRID_STEP), 80);
    }

    #[test]
    fn test_grid_positions() {
        assert_eq!(grid_positions(20, 8), vec![4, 12]);
        assert_eq!(grid_positions(3, 8), vec![1]);
    }

    #[test]
    fn test_seed_count_on_grid() {
        let data = two_tone(32, 16, 16);
        let image = PixelBuffer::new(32, 16, &data).unwrap();
        let sp = slic(&image, 300, MIN_GRID_STEP, 3, 0.25);
        assert_eq!(sp.step, 8);
        assert_eq!(sp.cell_count(), 4 * 2);
        assert_eq!(sp.labels.len(), 32 * 16);
    }

    #[test]
    fn test_cells_respect_color_boundary() {
        let data = two_tone(32, 32, 13);
        let image = PixelBuffer::new(32, 32, &data).unwrap();
        let sp = slic(&image, 300, MIN_GRID_STEP, 3, 0.25);

        // Every cell must be single-toned
        for y in 0..32 {
            for x in 0..32 {
                let seed = &sp.seeds[sp.label_at(x, y)];
                let expected = if x < 13 { 20.0 } else { 230.0 };
                assert!((seed.color[0] - expected).abs() < 1e-3);
            }
        }
    }

    #[test]
    fn test_nearest_seed_is_global() {
        // Red at both ends, blue in between; the red pixels on the right are
        // far from the red seed but still closer than any blue seed
        let (w, h) = (48, 8);
        let mut data = vec![0u8; w * h * 4];
        for y in 0..h {
            for x in 0..w {
                let i = (y * w + x) * 4;
                let rgb = if x < 8 || x >= 46 { [255, 0, 0] } else { [0, 0, 255] };
                data[i..i + 3].copy_from_slice(&rgb);
                data[i + 3] = 255;
            }
        }
        let image = PixelBuffer::new(w, h, &data).unwrap();
        let sp = slic(&image, 300, MIN_GRID_STEP, 1, 0.25);

        // Labels of a single pass come from the initial grid seeds
        let initial: Vec<(usize, usize)> = grid_positions(w, 8).into_iter().map(|gx| (gx, 4)).collect();
        for y in 0..h {
            for x in 0..w {
                let color = image.rgb_f32(y * w + x);
                let mut best = (0, f32::MAX);
                for (k, &(sx, sy)) in initial.iter().enumerate() {
                    let sc = image.rgb_f32(sy * w + sx);
                    let dc: f32 = (0..3).map(|c| (color[c] - sc[c]).powi(2)).sum();
                    let dx = x as f32 - sx as f32;
                    let dy = y as f32 - sy as f32;
                    let d = dc + 0.25 * (dx * dx + dy * dy);
                    if d < best.1 {
                        best = (k, d);
                    }
                }
                assert_eq!(sp.label_at(x, y), best.0, "pixel ({x}, {y})");
            }
        }
        assert_eq!(sp.label_at(46, 0), 0);
        assert_eq!(sp.label_at(47, 7), 0);
    }

    #[test]
    fn test_empty_seed_moves_to_origin() {
        let data = vec![200u8; 4 * 4 * 4];
        let image = PixelBuffer::new(4, 4, &data).unwrap();
        let seed = Seed { x: 2.0, y: 2.0, color: [200.0; 3], count: 0 };
        let mut seeds = vec![seed, Seed { x: 3.0, y: 1.0, ..seed }];
        let labels = vec![0u32; 16];

        update_seeds(&image, &labels, &mut seeds);

        assert_eq!(seeds[0].count, 16);
        assert_eq!((seeds[0].x, seeds[0].y), (1.5, 1.5));
        assert_eq!(seeds[0].color, [200.0; 3]);
        assert_eq!(seeds[1].count, 0);
        assert_eq!((seeds[1].x, seeds[1].y), (0.0, 0.0));
        assert_eq!(seeds[1].color, [0.0; 3]);
    }

    #[test]
    fn test_tiny_image_single_cell() {
        let data = vec![50u8; 3 * 2 * 4];
        let image = PixelBuffer::new(3, 2, &data).unwrap();
        let sp = slic(&image, 300, MIN_GRID_STEP, 3, 0.25);
        assert_eq!(sp.cell_count(), 1);
        assert!(sp.labels.iter().all(|&l| l == 0));
        assert_eq!(sp.seeds[0].count, 6);
    }

    #[test]
    fn test_counts_cover_all_pixels() {
        let data = two_tone(40, 24, 17);
        let image = PixelBuffer::new(40, 24, &data).unwrap();
        let sp = slic(&image, 300, MIN_GRID_STEP, 3, 0.25);
        let total: usize = sp.seeds.iter().map(|s| s.count).sum();
        assert_eq!(total, 40 * 24);
    }
}
