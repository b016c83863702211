use noise::{NoiseFn, Perlin};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::coords::Cell;
use crate::grid::TerrainGrid;
use crate::tiles::{TerrainCategory, TileCatalog, TileId, TilePools};

/// A cell is replaced when at least this many neighbours agree on a category.
pub const MAJORITY_THRESHOLD: u8 = 4;

/// 2D coherent noise sampled in `[0, 1]`.
pub trait NoiseField {
    fn sample(&self, x: f64, y: f64) -> f64;
}

/// Perlin noise remapped from `[-1, 1]` to `[0, 1]`.
#[derive(Debug, Clone)]
pub struct PerlinField {
    perlin: Perlin,
}

impl PerlinField {
    pub fn new(seed: u32) -> Self {
        PerlinField {
            perlin: Perlin::new(seed),
        }
    }
}

impl NoiseField for PerlinField {
    fn sample(&self, x: f64, y: f64) -> f64 {
        (self.perlin.get([x, y]) * 0.5 + 0.5).clamp(0.0, 1.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSettings {
    pub noise_scale: f64,     // sample spacing between neighbouring cells
    pub stone_threshold: f64, // noise above this becomes stone
    pub smoothing_passes: u32,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        GenerationSettings {
            noise_scale: 0.05,
            stone_threshold: 0.8,
            smoothing_passes: 2,
        }
    }
}

/// Counts from one [`TerrainGenerator::generate`] run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SynthesisReport {
    pub placed: usize,
    pub stone: usize,
    /// Cells left empty because no pool could supply a tile.
    pub skipped: usize,
}

pub struct TerrainGenerator<N = PerlinField> {
    noise: N,
    settings: GenerationSettings,
}

impl TerrainGenerator<PerlinField> {
    pub fn new(seed: u32) -> Self {
        Self::new_with_settings(seed, GenerationSettings::default())
    }

    pub fn new_with_settings(seed: u32, settings: GenerationSettings) -> Self {
        Self::with_noise(PerlinField::new(seed), settings)
    }
}

impl<N: NoiseField> TerrainGenerator<N> {
    pub fn with_noise(noise: N, settings: GenerationSettings) -> Self {
        TerrainGenerator { noise, settings }
    }

    pub fn settings(&self) -> &GenerationSettings {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: GenerationSettings) {
        self.settings = settings;
    }

    /// Noise value for the `(x, y)`-th cell counted from the bounds' lowest
    /// corner.
    pub fn noise_at(&self, x: u32, y: u32) -> f64 {
        let scale = self.settings.noise_scale;
        self.noise.sample(x as f64 * scale, y as f64 * scale)
    }

    /// Writes the base layer for every cell inside the grid's bounds.
    ///
    /// Noise above the stone threshold draws from the stone pool, everything
    /// else from the grass pool. An empty stone pool falls back to grass; with
    /// an empty grass pool too the cell stays unset.
    pub fn generate<R: Rng + ?Sized>(
        &self,
        grid: &mut TerrainGrid,
        pools: &TilePools,
        rng: &mut R,
    ) -> SynthesisReport {
        let bounds = grid.bounds();
        let min = bounds.min();
        let mut report = SynthesisReport::default();

        if pools.stone.is_empty() {
            warn!("stone pool is empty, high ground will use grass tiles");
        }
        if pools.grass.is_empty() {
            warn!("grass pool is empty, low ground will stay unset");
        }

        for x in 0..bounds.width {
            for y in 0..bounds.height {
                let cell = min.offset(x as i32, y as i32);
                let value = self.noise_at(x, y);
                match self.tile_for_noise(value, pools, rng) {
                    Some((tile, is_stone)) => {
                        grid.set_base(cell, tile);
                        report.placed += 1;
                        if is_stone {
                            report.stone += 1;
                        }
                    }
                    None => report.skipped += 1,
                }
            }
        }

        debug!(
            placed = report.placed,
            stone = report.stone,
            skipped = report.skipped,
            "base terrain synthesised"
        );
        report
    }

    fn tile_for_noise<R: Rng + ?Sized>(
        &self,
        value: f64,
        pools: &TilePools,
        rng: &mut R,
    ) -> Option<(TileId, bool)> {
        if value > self.settings.stone_threshold {
            if let Some(tile) = pools.pick(TerrainCategory::Stone, rng) {
                return Some((tile, true));
            }
        }
        pools
            .pick(TerrainCategory::Grass, rng)
            .map(|tile| (tile, false))
    }

    /// Runs the configured number of smoothing passes. Returns the total
    /// number of replaced cells.
    pub fn smooth<R: Rng + ?Sized>(
        &self,
        grid: &mut TerrainGrid,
        catalog: &TileCatalog,
        pools: &TilePools,
        rng: &mut R,
    ) -> usize {
        let mut total = 0;
        for pass in 0..self.settings.smoothing_passes {
            let changed = smooth_pass(grid, catalog, pools, rng);
            debug!(pass, changed, "smoothing pass");
            total += changed;
        }
        total
    }
}

/// Most common category among the eight neighbours of `cell`, with its count.
///
/// Ties go to the category listed first in [`TerrainCategory::ALL`]. `None`
/// when no neighbour holds a known tile.
pub fn majority_category(
    grid: &TerrainGrid,
    catalog: &TileCatalog,
    cell: Cell,
) -> Option<(TerrainCategory, u8)> {
    let mut counts = [0u8; TerrainCategory::ALL.len()];
    for neighbor in cell.all_neighbors() {
        if let Some(category) = grid.base_tile(neighbor).and_then(|id| catalog.category_of(id)) {
            counts[category.index()] += 1;
        }
    }

    let mut best: Option<(TerrainCategory, u8)> = None;
    for category in TerrainCategory::ALL {
        let count = counts[category.index()];
        if count > best.map_or(0, |(_, c)| c) {
            best = Some((category, count));
        }
    }
    best
}

/// One cellular smoothing step over the grid's bounds.
///
/// Every decision reads the grid as it was before the pass; replacements are
/// collected first and written once the whole pass has been evaluated.
pub fn smooth_pass<R: Rng + ?Sized>(
    grid: &mut TerrainGrid,
    catalog: &TileCatalog,
    pools: &TilePools,
    rng: &mut R,
) -> usize {
    let mut replacements: Vec<(Cell, TileId)> = Vec::new();

    for cell in grid.bounds().cells() {
        let current = grid.base_tile(cell).and_then(|id| catalog.category_of(id));
        let Some((majority, count)) = majority_category(grid, catalog, cell) else {
            continue;
        };
        if count < MAJORITY_THRESHOLD || Some(majority) == current {
            continue;
        }

        // Categories without a pool of their own fall back to grass.
        let replacement = pools
            .pick(majority, rng)
            .or_else(|| pools.pick(TerrainCategory::Grass, rng));
        let Some(tile) = replacement else {
            continue;
        };
        if catalog.category_of(tile) == current {
            continue;
        }
        replacements.push((cell, tile));
    }

    let changed = replacements.len();
    for (cell, tile) in replacements {
        grid.set_base(cell, tile);
    }
    changed
}
