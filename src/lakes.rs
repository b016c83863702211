//! Stochastic lake carving on the water layer.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::coords::Cell;
use crate::error::{TerrainError, TerrainResult};
use crate::grid::TerrainGrid;
use crate::tiles::{TilePools, WaterTileId};

/// Largest lake radius a level may ask for.
pub const MAX_LAKE_SIZE: u32 = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LakeSettings {
    pub enabled: bool,
    pub count: u32,
    pub min_size: u32,
    pub max_size: u32,
}

impl Default for LakeSettings {
    fn default() -> Self {
        LakeSettings {
            enabled: true,
            count: 2,
            min_size: 3,
            max_size: 8,
        }
    }
}

impl LakeSettings {
    pub fn validate(&self) -> TerrainResult<()> {
        if self.min_size > self.max_size {
            return Err(TerrainError::InvalidConfig(format!(
                "lake min_size {} exceeds max_size {}",
                self.min_size, self.max_size
            )));
        }
        if self.max_size > MAX_LAKE_SIZE {
            return Err(TerrainError::InvalidConfig(format!(
                "lake max_size {} exceeds the limit of {MAX_LAKE_SIZE}",
                self.max_size
            )));
        }
        Ok(())
    }
}

/// What one carved lake ended up as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LakeReport {
    pub center: Cell,
    pub radius: u32,
    pub tile: WaterTileId,
    /// In-bounds cells written, including ones already holding water.
    pub placed: usize,
}

/// Chance that a cell at distance `distance` from a lake's center joins a lake
/// of radius `radius`: 1.0 at the center, 0.5 on the rim.
pub fn inclusion_probability(distance: f32, radius: f32) -> f32 {
    if radius <= 0.0 {
        return if distance <= 0.0 { 1.0 } else { 0.0 };
    }
    if distance > radius {
        return 0.0;
    }
    1.0 - 0.5 * (distance / radius)
}

#[derive(Debug, Clone, Copy)]
pub struct LakeCarver {
    settings: LakeSettings,
}

impl LakeCarver {
    pub fn new(settings: LakeSettings) -> Self {
        LakeCarver { settings }
    }

    pub fn settings(&self) -> &LakeSettings {
        &self.settings
    }

    /// Stamps `count` lakes inside the grid's bounds. Later lakes overwrite and
    /// merge with earlier ones. Only the water layer is touched.
    ///
    /// Fails without writing anything when the water pool is empty or the size
    /// range is inverted.
    pub fn carve_lakes<R: Rng + ?Sized>(
        &self,
        grid: &mut TerrainGrid,
        pools: &TilePools,
        rng: &mut R,
    ) -> TerrainResult<Vec<LakeReport>> {
        if pools.water.is_empty() {
            return Err(TerrainError::MissingTilePool { pool: "water" });
        }
        self.settings.validate()?;

        let bounds = grid.bounds();
        if bounds.is_empty() {
            return Ok(Vec::new());
        }
        let min = bounds.min();
        let max = bounds.max_exclusive();

        let mut reports = Vec::with_capacity(self.settings.count as usize);
        for i in 0..self.settings.count {
            let center = Cell::new(rng.gen_range(min.x..max.x), rng.gen_range(min.y..max.y));
            let radius = rng.gen_range(self.settings.min_size..=self.settings.max_size);
            let Some(tile) = pools.pick_water(rng) else {
                break;
            };
            let placed = carve_lake(grid, center, radius, tile, rng);
            debug!(lake = i, ?center, radius, placed, "carved lake");
            reports.push(LakeReport {
                center,
                radius,
                tile,
                placed,
            });
        }
        Ok(reports)
    }
}

/// Writes one organic blob of `tile` around `center`, clipped to the grid's
/// bounds. Returns the number of cells written.
pub fn carve_lake<R: Rng + ?Sized>(
    grid: &mut TerrainGrid,
    center: Cell,
    radius: u32,
    tile: WaterTileId,
    rng: &mut R,
) -> usize {
    let bounds = grid.bounds();
    let r = i64::from(radius);
    let mut placed = 0;

    for dx in -r..=r {
        for dy in -r..=r {
            let distance = ((dx * dx + dy * dy) as f64).sqrt() as f32;
            if distance > radius as f32 {
                continue;
            }
            let p = inclusion_probability(distance, radius as f32);
            if rng.gen::<f32>() >= p {
                continue;
            }
            let (Some(x), Some(y)) = (
                i32::try_from(i64::from(center.x) + dx).ok(),
                i32::try_from(i64::from(center.y) + dy).ok(),
            ) else {
                continue;
            };
            let cell = Cell::new(x, y);
            if bounds.contains(cell) {
                grid.set_water(cell, tile);
                placed += 1;
            }
        }
    }
    placed
}
