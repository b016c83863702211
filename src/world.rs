//! A generated fishing ground: configuration, layers, query cache and zones
//! owned together.
//!
//! Mutating entry points take `&mut self`, and [`FishingGround::index`]
//! borrows `&self`, so no query view can outlive a regeneration. Every
//! mutating path clears the tile-info cache and rebuilds the zones before it
//! returns.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tracing::info;

use crate::coords::{Cell, CellMapper, GridMapper, WorldPoint};
use crate::error::{TerrainError, TerrainResult};
use crate::grid::TerrainGrid;
use crate::lakes::{LakeCarver, LakeReport};
use crate::level::LevelConfig;
use crate::terrain_generator::{PerlinField, SynthesisReport, TerrainGenerator};
use crate::tile_index::{SpatialTileIndex, TileInfoCache};
use crate::tiles::{TileCatalog, TilePools, TileTransform};
use crate::water_zones::{WaterZone, WaterZoneGrouper};

/// Speed factor applied while standing on an unwalkable cell.
pub const STRANDED_SPEED: f32 = 0.5;

/// Summary of one [`FishingGround::regenerate_all`] run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RegenerationReport {
    pub synthesis: SynthesisReport,
    pub lakes: Vec<LakeReport>,
    pub smoothed: usize,
    pub water_cells: usize,
    pub zones: usize,
}

pub struct FishingGround {
    config: LevelConfig,
    catalog: TileCatalog,
    pools: TilePools,
    mapper: GridMapper,
    grid: TerrainGrid,
    cache: TileInfoCache,
    zones: Vec<WaterZone>,
    rng: ChaCha8Rng,
    generator: TerrainGenerator<PerlinField>,
}

impl FishingGround {
    /// Validates the level and catalog and resolves the tile pools. The layers
    /// start empty; call [`FishingGround::regenerate_all`] to fill them.
    pub fn new(config: LevelConfig, catalog: TileCatalog) -> TerrainResult<Self> {
        config.validate()?;
        catalog.validate()?;
        let pools = config.resolve_pools(&catalog)?;
        let grid = TerrainGrid::new(config.bounds());
        let mapper = config.grid.mapper();
        let generator = TerrainGenerator::new_with_settings(config.seed as u32, config.terrain);
        let rng = ChaCha8Rng::seed_from_u64(config.seed);

        Ok(FishingGround {
            config,
            catalog,
            pools,
            mapper,
            grid,
            cache: TileInfoCache::new(),
            zones: Vec::new(),
            rng,
            generator,
        })
    }

    /// Builds and immediately generates a level.
    pub fn generate(config: LevelConfig, catalog: TileCatalog) -> TerrainResult<Self> {
        let mut ground = Self::new(config, catalog)?;
        ground.regenerate_all()?;
        Ok(ground)
    }

    /// Rebuilds everything: clear, synthesise, carve lakes, smooth, drop the
    /// query cache and regroup the zones.
    ///
    /// A missing water pool with lakes enabled is reported before anything is
    /// cleared, leaving the previous terrain intact.
    pub fn regenerate_all(&mut self) -> TerrainResult<RegenerationReport> {
        let lakes = self.config.lakes;
        let carving = lakes.enabled && lakes.count > 0;
        if carving {
            if self.pools.water.is_empty() {
                return Err(TerrainError::MissingTilePool { pool: "water" });
            }
            lakes.validate()?;
        }

        self.grid.clear();
        let synthesis = self.generator.generate(&mut self.grid, &self.pools, &mut self.rng);
        let lake_reports = if carving {
            LakeCarver::new(lakes).carve_lakes(&mut self.grid, &self.pools, &mut self.rng)?
        } else {
            Vec::new()
        };
        let smoothed = self
            .generator
            .smooth(&mut self.grid, &self.catalog, &self.pools, &mut self.rng);
        self.cache.invalidate_all();
        self.refresh_zones();

        let report = RegenerationReport {
            synthesis,
            lakes: lake_reports,
            smoothed,
            water_cells: self.grid.water_len(),
            zones: self.zones.len(),
        };
        info!(
            level_name = %self.config.name,
            placed = report.synthesis.placed,
            lakes = report.lakes.len(),
            smoothed = report.smoothed,
            water_cells = report.water_cells,
            zones = report.zones,
            "fishing ground regenerated"
        );
        Ok(report)
    }

    /// Rebuilds the zone set from the current water layer.
    pub fn refresh_zones(&mut self) -> &[WaterZone] {
        self.zones = WaterZoneGrouper::new(&self.grid, &self.catalog, &self.mapper)
            .with_policy(self.config.zones)
            .regroup();
        &self.zones
    }

    /// Empties both layers and the zone set.
    pub fn clear_terrain(&mut self) {
        self.grid.clear();
        self.cache.invalidate_all();
        self.zones.clear();
    }

    /// Applies a manual change to the layers, then invalidates the cache and
    /// regroups.
    pub fn edit<F>(&mut self, f: F)
    where
        F: FnOnce(&mut TerrainGrid),
    {
        f(&mut self.grid);
        self.cache.invalidate_all();
        self.refresh_zones();
    }

    /// Restarts both the noise and the generation RNG from `seed`. Takes effect
    /// on the next regeneration.
    pub fn reseed(&mut self, seed: u64) {
        self.config.seed = seed;
        self.generator = TerrainGenerator::new_with_settings(seed as u32, self.config.terrain);
        self.rng = ChaCha8Rng::seed_from_u64(seed);
    }

    pub fn index(&self) -> SpatialTileIndex<'_, GridMapper> {
        SpatialTileIndex::new(&self.grid, &self.catalog, &self.mapper, &self.cache)
    }

    pub fn zones(&self) -> &[WaterZone] {
        &self.zones
    }

    pub fn zone_containing(&self, cell: Cell) -> Option<&WaterZone> {
        self.zones.iter().find(|z| z.contains(cell))
    }

    pub fn zone_at(&self, point: WorldPoint) -> Option<&WaterZone> {
        self.zone_containing(self.mapper.world_to_cell(point))
    }

    /// Every in-bounds cell the player cannot enter, in bounds order.
    pub fn blocked_cells(&self) -> Vec<Cell> {
        let index = self.index();
        self.grid
            .bounds()
            .cells()
            .filter(|cell| !index.is_walkable(*cell))
            .collect()
    }

    /// Moves `position` by one step of raw `input` scaled by `distance` and the
    /// speed of the tile underfoot. The step is refused, returning `position`,
    /// when it would end on an unwalkable cell.
    pub fn step(&self, position: WorldPoint, input: WorldPoint, distance: f32) -> WorldPoint {
        let index = self.index();
        let here = index.tile_info_at(position);
        let speed = if here.is_walkable {
            here.speed_modifier
        } else {
            STRANDED_SPEED
        };
        let direction = self.config.grid.grid_type.convert_input(input);
        let target = WorldPoint::new(
            position.x + direction.x * distance * speed,
            position.y + direction.y * distance * speed,
        );
        if index.is_walkable_at(target) {
            target
        } else {
            position
        }
    }

    /// Visual transform of the base tile at `cell`, if there is one.
    pub fn tile_transform(&self, cell: Cell) -> Option<TileTransform> {
        self.grid
            .base_tile(cell)
            .map(|tile| self.catalog.tile_transform(tile, cell))
    }

    /// World position of the level's start cell.
    pub fn start_point(&self) -> WorldPoint {
        self.mapper.cell_to_world(self.config.start_position)
    }

    pub fn config(&self) -> &LevelConfig {
        &self.config
    }

    pub fn catalog(&self) -> &TileCatalog {
        &self.catalog
    }

    pub fn pools(&self) -> &TilePools {
        &self.pools
    }

    pub fn mapper(&self) -> &GridMapper {
        &self.mapper
    }

    pub fn grid(&self) -> &TerrainGrid {
        &self.grid
    }
}
