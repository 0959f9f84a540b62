//! Smart Select: superpixel region growing guided by LAB color and edges.
//!
//! Pipeline:
//! 1. Sobel edge map of the region's luminance
//! 2. Superpixel clustering (see [`super::superpixel`])
//! 3. Region growing over cells from the seed cell, absorbing cells whose
//!    mean LAB color is within tolerance of the seed cell's
//! 4. Pixels of absorbed cells are selected unless they sit on a strong edge
//! 5. 3x3 morphological closing, then bounding box

use std::collections::VecDeque;

use log::debug;

use crate::error::{Result, SelectError};
use crate::filters::color_science::{lab_distance, rgb_to_lab, Lab};
use crate::filters::edge::edge_map;
use crate::filters::morphology::close_3x3;
use crate::image::PixelBuffer;

use super::superpixel::{slic, Superpixels, MIN_GRID_STEP};
use super::SelectionResult;

/// Tuning parameters for Smart Select.
#[derive(Debug, Clone, PartialEq)]
pub struct SmartSelectConfig {
    /// Desired number of superpixel cells.
    pub target_count: usize,
    /// Lower bound for the superpixel grid step.
    pub min_step: usize,
    /// Superpixel refinement passes.
    pub iterations: usize,
    /// Weight of squared position distance in the clustering metric.
    pub compactness: f32,
    /// Maximum LAB distance between a cell and the seed cell.
    pub lab_tolerance: f32,
    /// Pixels with Sobel magnitude at or above this are never selected.
    pub edge_threshold: f32,
    /// Only grow into cells touching already absorbed cells.
    ///
    /// When false, every similar cell in the region is absorbed, even if
    /// it is not connected to the seed.
    pub contiguous: bool,
    /// Pixel to grow from. Defaults to the region center.
    pub seed: Option<(usize, usize)>,
}

impl Default for SmartSelectConfig {
    fn default() -> Self {
        Self {
            target_count: 300,
            min_step: MIN_GRID_STEP,
            iterations: 3,
            compactness: 0.25,
            lab_tolerance: 18.0,
            edge_threshold: 35.0,
            contiguous: false,
            seed: None,
        }
    }
}

impl SmartSelectConfig {
    /// Grow from a specific pixel instead of the region center.
    pub fn with_seed(mut self, x: usize, y: usize) -> Self {
        self.seed = Some((x, y));
        self
    }

    /// Restrict growth to spatially connected cells.
    pub fn contiguous(mut self, contiguous: bool) -> Self {
        self.contiguous = contiguous;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.target_count == 0 {
            return Err(SelectError::InvalidConfig("target_count must be at least 1".into()));
        }
        if self.min_step == 0 {
            return Err(SelectError::InvalidConfig("min_step must be at least 1".into()));
        }
        if self.iterations == 0 {
            return Err(SelectError::InvalidConfig("iterations must be at least 1".into()));
        }
        if !self.compactness.is_finite() || self.compactness < 0.0 {
            return Err(SelectError::InvalidConfig(format!(
                "compactness must be a non-negative number, got {}",
                self.compactness
            )));
        }
        if !self.lab_tolerance.is_finite() || self.lab_tolerance < 0.0 {
            return Err(SelectError::InvalidConfig(format!(
                "lab_tolerance must be a non-negative number, got {}",
                self.lab_tolerance
            )));
        }
        if self.edge_threshold.is_nan() {
            return Err(SelectError::InvalidConfig("edge_threshold must not be NaN".into()));
        }
        Ok(())
    }

    /// Seed pixel for an image, checked against its bounds.
    fn seed_for(&self, image: &PixelBuffer) -> Result<(usize, usize)> {
        let (width, height) = (image.width(), image.height());
        match self.seed {
            Some((x, y)) if x >= width || y >= height => Err(SelectError::SeedOutOfBounds {
                x,
                y,
                width,
                height,
            }),
            Some(point) => Ok(point),
            None => Ok((width / 2, height / 2)),
        }
    }
}

/// Select the region around the center of `image` with default settings.
pub fn smart_select_region(image: &PixelBuffer) -> Result<SelectionResult> {
    smart_select_region_with_config(image, &SmartSelectConfig::default())
}

/// Select a region with explicit settings.
pub fn smart_select_region_with_config(
    image: &PixelBuffer,
    config: &SmartSelectConfig,
) -> Result<SelectionResult> {
    config.validate()?;
    let seed = config.seed_for(image)?;
    let (width, height) = (image.width(), image.height());

    let edges = edge_map(image);
    let superpixels = slic(
        image,
        config.target_count,
        config.min_step,
        config.iterations,
        config.compactness,
    );
    debug!(
        "smart select: {}x{} step {} cells {} seed {:?}",
        width,
        height,
        superpixels.step,
        superpixels.cell_count(),
        seed
    );

    let raw = grow_region(&superpixels, &edges, seed, config);
    let closed = close_3x3(&raw, width, height);
    let result = SelectionResult::from_mask(closed, width, height);
    debug!(
        "smart select: {} pixels selected, bbox {:?}",
        result.pixel_count(),
        result.bbox
    );
    Ok(result)
}

/// LAB color of each cell's mean RGB; `None` for cells without pixels.
///
/// This converts the averaged RGB once per cell rather than averaging
/// per-pixel LAB values.
fn cell_lab_colors(superpixels: &Superpixels) -> Vec<Option<Lab>> {
    superpixels
        .seeds
        .iter()
        .map(|seed| {
            (seed.count > 0).then(|| rgb_to_lab(seed.color[0], seed.color[1], seed.color[2]))
        })
        .collect()
}

/// Cells sharing a 4-connected pixel boundary, sorted per cell.
fn cell_adjacency(superpixels: &Superpixels) -> Vec<Vec<usize>> {
    let (width, height) = (superpixels.width, superpixels.height);
    let labels = &superpixels.labels;
    let mut adjacency = vec![Vec::new(); superpixels.cell_count()];

    for y in 0..height {
        for x in 0..width {
            let a = labels[y * width + x] as usize;
            if x + 1 < width {
                let b = labels[y * width + x + 1] as usize;
                if a != b {
                    adjacency[a].push(b);
                    adjacency[b].push(a);
                }
            }
            if y + 1 < height {
                let b = labels[(y + 1) * width + x] as usize;
                if a != b {
                    adjacency[a].push(b);
                    adjacency[b].push(a);
                }
            }
        }
    }

    for neighbors in adjacency.iter_mut() {
        neighbors.sort_unstable();
        neighbors.dedup();
    }
    adjacency
}

/// Grow a raw 0/1 mask from the cell containing `seed`.
///
/// Before morphological cleanup. Pixels with an edge magnitude at or above
/// `config.edge_threshold` are left unselected even inside absorbed cells.
pub fn grow_region(
    superpixels: &Superpixels,
    edges: &[f32],
    seed: (usize, usize),
    config: &SmartSelectConfig,
) -> Vec<u8> {
    let cell_count = superpixels.cell_count();
    let colors = cell_lab_colors(superpixels);
    let seed_cell = superpixels.label_at(seed.0, seed.1);
    let reference = colors[seed_cell].unwrap_or_default();

    let similar = |cell: usize| {
        colors[cell].is_some_and(|lab| lab_distance(lab, reference) <= config.lab_tolerance)
    };

    let adjacency = config.contiguous.then(|| cell_adjacency(superpixels));
    let all_cells: Vec<usize> = (0..cell_count).collect();

    let mut absorbed = vec![false; cell_count];
    let mut queue = VecDeque::new();
    absorbed[seed_cell] = true;
    queue.push_back(seed_cell);

    while let Some(cell) = queue.pop_front() {
        let neighbors = match &adjacency {
            Some(adjacency) => &adjacency[cell],
            None => &all_cells,
        };
        for &next in neighbors {
            if !absorbed[next] && similar(next) {
                absorbed[next] = true;
                queue.push_back(next);
            }
        }
    }

    let absorbed_count = absorbed.iter().filter(|&&a| a).count();
    debug!("smart select: absorbed {} of {} cells", absorbed_count, cell_count);

    superpixels
        .labels
        .iter()
        .zip(edges)
        .map(|(&label, &edge)| (absorbed[label as usize] && edge < config.edge_threshold) as u8)
        .collect()
}
