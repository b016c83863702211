//! Cached per-cell queries over the terrain and water layers. The index does
//! not notice layer edits on its own; invalidate the cache after any change.

use serde::Serialize;
use std::cell::RefCell;
use std::collections::HashMap;

use crate::coords::{Cell, CellMapper, WorldPoint};
use crate::grid::TerrainGrid;
use crate::tiles::{TerrainCategory, TileCatalog, WaterCategory};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TileInfo {
    pub is_walkable: bool,
    pub is_water: bool,
    pub terrain_category: TerrainCategory,
    pub water_category: Option<WaterCategory>, // water layer only
    pub speed_modifier: f32,
    pub fishing_modifier: f32,
}

impl TileInfo {
    /// Result for a cell with no tiles at all: open, walkable ground.
    pub const VOID: TileInfo = TileInfo {
        is_walkable: true,
        is_water: false,
        terrain_category: TerrainCategory::Grass,
        water_category: None,
        speed_modifier: 1.0,
        fishing_modifier: 1.0,
    };
}

impl Default for TileInfo {
    fn default() -> Self {
        TileInfo::VOID
    }
}

#[derive(Debug, Default)]
pub struct TileInfoCache {
    entries: RefCell<HashMap<Cell, TileInfo>>,
}

impl TileInfoCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    pub fn invalidate_all(&self) {
        self.entries.borrow_mut().clear();
    }

    fn get_or_insert_with(&self, cell: Cell, resolve: impl FnOnce() -> TileInfo) -> TileInfo {
        if let Some(info) = self.entries.borrow().get(&cell) {
            return *info;
        }
        let info = resolve();
        self.entries.borrow_mut().insert(cell, info);
        info
    }
}

pub struct SpatialTileIndex<'a, M: CellMapper> {
    grid: &'a TerrainGrid,
    catalog: &'a TileCatalog,
    mapper: &'a M,
    cache: &'a TileInfoCache,
}

impl<'a, M: CellMapper> SpatialTileIndex<'a, M> {
    pub fn new(
        grid: &'a TerrainGrid,
        catalog: &'a TileCatalog,
        mapper: &'a M,
        cache: &'a TileInfoCache,
    ) -> Self {
        SpatialTileIndex {
            grid,
            catalog,
            mapper,
            cache,
        }
    }

    pub fn cell_at(&self, point: WorldPoint) -> Cell {
        self.mapper.world_to_cell(point)
    }

    /// Resolved info for `cell`. Cells outside the grid's bounds read as void
    /// and are not cached.
    pub fn tile_info(&self, cell: Cell) -> TileInfo {
        if !self.grid.bounds().contains(cell) {
            return TileInfo::VOID;
        }
        self.cache.get_or_insert_with(cell, || self.resolve(cell))
    }

    pub fn tile_info_at(&self, point: WorldPoint) -> TileInfo {
        self.tile_info(self.cell_at(point))
    }

    pub fn is_walkable(&self, cell: Cell) -> bool {
        self.tile_info(cell).is_walkable
    }

    pub fn is_walkable_at(&self, point: WorldPoint) -> bool {
        self.tile_info_at(point).is_walkable
    }

    pub fn is_water(&self, cell: Cell) -> bool {
        self.tile_info(cell).is_water
    }

    pub fn is_water_at(&self, point: WorldPoint) -> bool {
        self.tile_info_at(point).is_water
    }

    pub fn water_category(&self, point: WorldPoint) -> Option<WaterCategory> {
        self.tile_info_at(point).water_category
    }

    pub fn speed_modifier(&self, point: WorldPoint) -> f32 {
        self.tile_info_at(point).speed_modifier
    }

    pub fn fishing_modifier(&self, point: WorldPoint) -> f32 {
        self.tile_info_at(point).fishing_modifier
    }

    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }

    // Water overrides terrain: a water tile makes the cell unwalkable water
    // with no walking speed, whatever lies underneath.
    fn resolve(&self, cell: Cell) -> TileInfo {
        let mut info = TileInfo::VOID;

        if let Some(kind) = self.grid.base_tile(cell).and_then(|id| self.catalog.terrain(id)) {
            info.is_walkable = kind.walkable;
            info.is_water = kind.is_water;
            info.terrain_category = kind.terrain_category;
            info.speed_modifier = kind.speed_modifier;
        }

        if let Some(water) = self.grid.water_tile(cell).and_then(|id| self.catalog.water(id)) {
            info.is_water = true;
            info.is_walkable = water.walkable();
            info.terrain_category = water.terrain_category();
            info.water_category = Some(water.water_category);
            info.fishing_modifier = water.fishing_modifier;
            info.speed_modifier = water.speed_modifier();
        }

        info
    }
}
