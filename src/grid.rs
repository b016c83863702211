use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::coords::Cell;
use crate::tiles::{TileId, WaterTileId};

/// Rectangle of cells centred on `center`.
///
/// Covers `[center - size/2, center - size/2 + size)` on each axis, so an
/// even-sized map spans `-size/2 .. size/2` around its center.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bounds {
    pub center: Cell,
    pub width: u32,
    pub height: u32,
}

impl Bounds {
    pub fn new(center: Cell, width: u32, height: u32) -> Self {
        Bounds { center, width, height }
    }

    pub fn from_min(min: Cell, width: u32, height: u32) -> Self {
        Bounds {
            center: min.offset((width / 2) as i32, (height / 2) as i32),
            width,
            height,
        }
    }

    pub fn min(&self) -> Cell {
        self.center
            .offset(-((self.width / 2) as i32), -((self.height / 2) as i32))
    }

    pub fn max_exclusive(&self) -> Cell {
        self.min().offset(self.width as i32, self.height as i32)
    }

    pub fn contains(&self, cell: Cell) -> bool {
        let min = self.min();
        let max = self.max_exclusive();
        cell.x >= min.x && cell.x < max.x && cell.y >= min.y && cell.y < max.y
    }

    pub fn area(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Every cell, column by column (x outer, y inner).
    pub fn cells(&self) -> impl Iterator<Item = Cell> {
        let min = self.min();
        let (w, h) = (self.width as i32, self.height as i32);
        (0..w).flat_map(move |x| (0..h).map(move |y| min.offset(x, y)))
    }
}

// Unset cells hold no tile. Nothing here enforces bounds; generators clip to
// `bounds` themselves.
#[derive(Debug, Clone)]
pub struct TerrainGrid {
    bounds: Bounds,
    base: HashMap<Cell, TileId>,
    water: HashMap<Cell, WaterTileId>,
}

impl TerrainGrid {
    pub fn new(bounds: Bounds) -> Self {
        TerrainGrid {
            bounds,
            base: HashMap::with_capacity(bounds.area()),
            water: HashMap::new(),
        }
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn base_tile(&self, cell: Cell) -> Option<TileId> {
        self.base.get(&cell).copied()
    }

    pub fn water_tile(&self, cell: Cell) -> Option<WaterTileId> {
        self.water.get(&cell).copied()
    }

    pub fn set_base(&mut self, cell: Cell, tile: TileId) -> Option<TileId> {
        self.base.insert(cell, tile)
    }

    pub fn set_water(&mut self, cell: Cell, tile: WaterTileId) -> Option<WaterTileId> {
        self.water.insert(cell, tile)
    }

    pub fn remove_base(&mut self, cell: Cell) -> Option<TileId> {
        self.base.remove(&cell)
    }

    pub fn remove_water(&mut self, cell: Cell) -> Option<WaterTileId> {
        self.water.remove(&cell)
    }

    pub fn base_len(&self) -> usize {
        self.base.len()
    }

    pub fn water_len(&self) -> usize {
        self.water.len()
    }

    pub fn base_cells(&self) -> impl Iterator<Item = (Cell, TileId)> + '_ {
        self.base.iter().map(|(c, t)| (*c, *t))
    }

    pub fn water_cells(&self) -> impl Iterator<Item = (Cell, WaterTileId)> + '_ {
        self.water.iter().map(|(c, t)| (*c, *t))
    }

    pub fn clear(&mut self) {
        self.base.clear();
        self.water.clear();
    }

    pub fn clear_water(&mut self) {
        self.water.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn even_bounds_span_half_each_side() {
        let b = Bounds::new(Cell::ZERO, 50, 50);
        assert_eq!(b.min(), Cell::new(-25, -25));
        assert_eq!(b.max_exclusive(), Cell::new(25, 25));
        assert!(b.contains(Cell::new(-25, 24)));
        assert!(!b.contains(Cell::new(25, 0)));
    }

    #[test]
    fn odd_bounds_keep_every_column() {
        let b = Bounds::new(Cell::new(10, 0), 5, 3);
        assert_eq!(b.cells().count(), 15);
        assert_eq!(b.min(), Cell::new(8, -1));
        assert!(b.contains(Cell::new(12, 1)));
    }

    #[test]
    fn from_min_round_trips() {
        let b = Bounds::from_min(Cell::ZERO, 6, 4);
        assert_eq!(b.min(), Cell::ZERO);
        assert_eq!(b.max_exclusive(), Cell::new(6, 4));
    }

    #[test]
    fn cells_iterate_column_major() {
        let b = Bounds::from_min(Cell::ZERO, 2, 2);
        let cells: Vec<_> = b.cells().collect();
        assert_eq!(
            cells,
            vec![Cell::new(0, 0), Cell::new(0, 1), Cell::new(1, 0), Cell::new(1, 1)]
        );
    }

    #[test]
    fn layers_are_independent() {
        let mut grid = TerrainGrid::new(Bounds::new(Cell::ZERO, 4, 4));
        let c = Cell::new(1, 1);
        grid.set_base(c, TileId(0));
        grid.set_water(c, WaterTileId(2));
        assert_eq!(grid.base_tile(c), Some(TileId(0)));
        assert_eq!(grid.water_tile(c), Some(WaterTileId(2)));
        grid.clear_water();
        assert_eq!(grid.base_tile(c), Some(TileId(0)));
        assert_eq!(grid.water_tile(c), None);
        assert_eq!(grid.set_base(c, TileId(3)), Some(TileId(0)));
        grid.clear();
        assert_eq!(grid.base_len(), 0);
    }
}
