//! Water zone detection.
//!
//! Connected water cells become one fishing zone. Zones are rebuilt from
//! scratch on every call; there is no incremental update path.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use tracing::{debug, warn};

use crate::coords::{Cell, CellMapper, WorldPoint, WorldRect};
use crate::grid::TerrainGrid;
use crate::tiles::{TileCatalog, WaterCategory};

/// Identifier of a zone, stable for one generation of a given water layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ZoneId(pub u32);

/// A connected region of zone-generating water.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WaterZone {
    pub id: ZoneId,
    pub cells: BTreeSet<Cell>,
    /// Mean world position of the member cells.
    pub centroid: WorldPoint,
    pub bounds_min: Cell,
    pub bounds_max: Cell,
    /// Category of the cell the flood fill started from.
    pub dominant_category: WaterCategory,
    /// World-space box spanning the cell bounding box.
    pub world_rect: WorldRect,
}

impl WaterZone {
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn contains(&self, cell: Cell) -> bool {
        self.cells.contains(&cell)
    }
}

/// Minimum component size kept as a zone. The default keeps everything,
/// single cells included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoneSizePolicy {
    pub min_cells: usize,
}

impl Default for ZoneSizePolicy {
    fn default() -> Self {
        ZoneSizePolicy { min_cells: 1 }
    }
}

pub struct WaterZoneGrouper<'a, M: CellMapper> {
    grid: &'a TerrainGrid,
    catalog: &'a TileCatalog,
    mapper: &'a M,
    policy: ZoneSizePolicy,
}

impl<'a, M: CellMapper> WaterZoneGrouper<'a, M> {
    pub fn new(grid: &'a TerrainGrid, catalog: &'a TileCatalog, mapper: &'a M) -> Self {
        WaterZoneGrouper {
            grid,
            catalog,
            mapper,
            policy: ZoneSizePolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: ZoneSizePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Water cells whose tile generates zones, in ascending `(x, y)` order.
    pub fn eligible_cells(&self) -> BTreeSet<Cell> {
        self.grid
            .water_cells()
            .filter(|(_, id)| self.catalog.water(*id).is_some_and(|w| w.generates_zone))
            .map(|(cell, _)| cell)
            .collect()
    }

    /// Partitions the eligible water cells into 4-connected zones.
    pub fn regroup(&self) -> Vec<WaterZone> {
        let eligible = self.eligible_cells();
        let mut visited: HashSet<Cell> = HashSet::with_capacity(eligible.len());
        let mut zones = Vec::new();
        let mut dropped = 0usize;

        for &start in &eligible {
            if visited.contains(&start) {
                continue;
            }
            let members = flood_fill(start, &eligible, &mut visited);
            if members.len() < self.policy.min_cells {
                dropped += 1;
                continue;
            }
            let id = ZoneId(zones.len() as u32);
            zones.push(self.build_zone(id, start, members));
        }

        if dropped > 0 {
            warn!(
                dropped,
                min_cells = self.policy.min_cells,
                "water groups below minimum zone size were skipped"
            );
        }
        debug!(cells = eligible.len(), zones = zones.len(), "water zones regrouped");
        zones
    }

    fn build_zone(&self, id: ZoneId, start: Cell, members: Vec<Cell>) -> WaterZone {
        let mut sum_x = 0.0f64;
        let mut sum_y = 0.0f64;
        let mut min = start;
        let mut max = start;
        for cell in &members {
            let world = self.mapper.cell_to_world(*cell);
            sum_x += world.x as f64;
            sum_y += world.y as f64;
            min = Cell::new(min.x.min(cell.x), min.y.min(cell.y));
            max = Cell::new(max.x.max(cell.x), max.y.max(cell.y));
        }
        let n = members.len() as f64;
        let centroid = WorldPoint::new((sum_x / n) as f32, (sum_y / n) as f32);

        let dominant_category = self
            .grid
            .water_tile(start)
            .and_then(|id| self.catalog.water(id))
            .map(|w| w.water_category)
            .unwrap_or_default();

        let world_rect = WorldRect::from_corners(
            self.mapper.cell_to_world(min),
            self.mapper.cell_to_world(max.offset(1, 1)),
        );

        WaterZone {
            id,
            cells: members.into_iter().collect(),
            centroid,
            bounds_min: min,
            bounds_max: max,
            dominant_category,
            world_rect,
        }
    }
}

// Iterative fill over orthogonal neighbours; diagonal contact does not join
// cells. `start` is always the first member.
fn flood_fill(start: Cell, eligible: &BTreeSet<Cell>, visited: &mut HashSet<Cell>) -> Vec<Cell> {
    let mut members = Vec::new();
    let mut stack = vec![start];

    while let Some(cell) = stack.pop() {
        if !visited.insert(cell) {
            continue;
        }
        members.push(cell);
        for neighbor in cell.orthogonal_neighbors() {
            if eligible.contains(&neighbor) && !visited.contains(&neighbor) {
                stack.push(neighbor);
            }
        }
    }
    members
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::RectangularMapper;
    use crate::grid::Bounds;
    use crate::tiles::{WaterTileId, WaterTileKind};

    struct Fixture {
        grid: TerrainGrid,
        catalog: TileCatalog,
        mapper: RectangularMapper,
        pond: WaterTileId,
        ocean: WaterTileId,
        decor: WaterTileId,
    }

    fn fixture() -> Fixture {
        let mut catalog = TileCatalog::new();
        let pond = catalog.add_water(WaterTileKind::new("pond", WaterCategory::Pond, 1.0));
        let ocean = catalog.add_water(WaterTileKind::new("ocean", WaterCategory::Ocean, 1.2));
        let mut puddle = WaterTileKind::new("puddle", WaterCategory::Pond, 0.0);
        puddle.generates_zone = false;
        let decor = catalog.add_water(puddle);
        Fixture {
            grid: TerrainGrid::new(Bounds::new(Cell::ZERO, 20, 20)),
            catalog,
            mapper: RectangularMapper {
                cell_size: [1.0, 1.0],
                origin: WorldPoint::default(),
            },
            pond,
            ocean,
            decor,
        }
    }

    fn regroup(f: &Fixture) -> Vec<WaterZone> {
        WaterZoneGrouper::new(&f.grid, &f.catalog, &f.mapper).regroup()
    }

    #[test]
    fn square_block_forms_one_zone() {
        let mut f = fixture();
        for (x, y) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
            f.grid.set_water(Cell::new(x, y), f.pond);
        }

        let zones = regroup(&f);

        assert_eq!(zones.len(), 1);
        let zone = &zones[0];
        assert_eq!(zone.len(), 4);
        assert_eq!(zone.bounds_min, Cell::new(0, 0));
        assert_eq!(zone.bounds_max, Cell::new(1, 1));
        assert_eq!(zone.centroid, WorldPoint::new(0.5, 0.5));
        assert_eq!(zone.world_rect.min, WorldPoint::new(0.0, 0.0));
        assert_eq!(zone.world_rect.max, WorldPoint::new(2.0, 2.0));
    }

    #[test]
    fn separated_cells_form_single_cell_zones() {
        let mut f = fixture();
        f.grid.set_water(Cell::new(0, 0), f.pond);
        f.grid.set_water(Cell::new(5, 5), f.pond);

        let zones = regroup(&f);

        assert_eq!(zones.len(), 2);
        assert!(zones.iter().all(|z| z.len() == 1));
        assert!(zones[0].contains(Cell::new(0, 0)));
        assert!(zones[1].contains(Cell::new(5, 5)));
    }

    #[test]
    fn diagonal_contact_does_not_merge() {
        let mut f = fixture();
        f.grid.set_water(Cell::new(0, 0), f.pond);
        f.grid.set_water(Cell::new(1, 1), f.pond);

        let zones = regroup(&f);

        assert_eq!(zones.len(), 2);
        let a = zones.iter().find(|z| z.contains(Cell::new(0, 0))).unwrap();
        assert!(!a.contains(Cell::new(1, 1)));
    }

    #[test]
    fn no_water_means_no_zones() {
        let f = fixture();
        assert!(regroup(&f).is_empty());
    }

    #[test]
    fn non_generating_tiles_are_excluded() {
        let mut f = fixture();
        f.grid.set_water(Cell::new(0, 0), f.pond);
        f.grid.set_water(Cell::new(1, 0), f.decor);
        f.grid.set_water(Cell::new(2, 0), f.pond);

        let zones = regroup(&f);

        // The puddle in the middle splits the row.
        assert_eq!(zones.len(), 2);
        assert_eq!(zones.iter().map(WaterZone::len).sum::<usize>(), 2);
    }

    #[test]
    fn dominant_category_comes_from_first_visited_cell() {
        let mut f = fixture();
        f.grid.set_water(Cell::new(-3, 2), f.ocean);
        f.grid.set_water(Cell::new(-2, 2), f.pond);
        f.grid.set_water(Cell::new(-1, 2), f.pond);

        let zones = regroup(&f);

        assert_eq!(zones.len(), 1);
        // Lowest (x, y) seeds the fill.
        assert_eq!(zones[0].dominant_category, WaterCategory::Ocean);
    }

    #[test]
    fn regroup_is_idempotent() {
        let mut f = fixture();
        let cells = [(0, 0), (0, 1), (1, 1), (4, 4), (5, 4), (-6, -6), (7, -2), (7, -1)];
        for (x, y) in cells {
            f.grid.set_water(Cell::new(x, y), f.pond);
        }

        let first = regroup(&f);
        let second = regroup(&f);

        assert_eq!(first.len(), second.len());
        let total = |zones: &[WaterZone]| zones.iter().map(WaterZone::len).sum::<usize>();
        assert_eq!(total(&first), total(&second));
        for zone in &first {
            let twin = second
                .iter()
                .find(|z| z.cells == zone.cells)
                .expect("matching zone");
            assert_eq!(twin.centroid, zone.centroid);
            assert_eq!(twin.bounds_min, zone.bounds_min);
            assert_eq!(twin.bounds_max, zone.bounds_max);
        }
    }

    #[test]
    fn every_eligible_cell_lands_in_exactly_one_zone() {
        let mut f = fixture();
        for x in -5..5 {
            for y in -5..5 {
                if (x * 7 + y * 3) % 4 != 0 {
                    f.grid.set_water(Cell::new(x, y), f.pond);
                }
            }
        }
        let grouper = WaterZoneGrouper::new(&f.grid, &f.catalog, &f.mapper);
        let eligible = grouper.eligible_cells();
        let zones = grouper.regroup();

        let mut seen = HashSet::new();
        for zone in &zones {
            for cell in &zone.cells {
                assert!(seen.insert(*cell), "{cell:?} in two zones");
            }
        }
        assert_eq!(seen.len(), eligible.len());
    }

    #[test]
    fn size_policy_drops_small_groups() {
        let mut f = fixture();
        f.grid.set_water(Cell::new(0, 0), f.pond);
        for x in 3..6 {
            f.grid.set_water(Cell::new(x, 3), f.pond);
        }

        let zones = WaterZoneGrouper::new(&f.grid, &f.catalog, &f.mapper)
            .with_policy(ZoneSizePolicy { min_cells: 2 })
            .regroup();

        assert_eq!(zones.len(), 1);
        assert_eq!(zones[0].len(), 3);
        assert_eq!(zones[0].id, ZoneId(0));
    }
}
