//! Cell coordinates and the mapping between cells and world space.
//!
//! The terrain core never assumes a projection. Anything that needs world
//! positions goes through a [`CellMapper`], and [`GridMapper`] provides the two
//! layouts the game ships with.

use serde::{Deserialize, Serialize};

// Keeps a world point sitting exactly on a cell corner inside that cell when
// float rounding lands just below the integer.
const SNAP_EPSILON: f32 = 1e-4;

/// Integer tile-grid coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub const ZERO: Cell = Cell { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Cell { x, y }
    }

    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Cell::new(self.x + dx, self.y + dy)
    }

    /// Up, down, left, right.
    pub fn orthogonal_neighbors(self) -> [Cell; 4] {
        [
            self.offset(0, 1),
            self.offset(0, -1),
            self.offset(-1, 0),
            self.offset(1, 0),
        ]
    }

    /// The four orthogonal neighbours followed by the four diagonals.
    pub fn all_neighbors(self) -> [Cell; 8] {
        [
            self.offset(0, 1),
            self.offset(0, -1),
            self.offset(-1, 0),
            self.offset(1, 0),
            self.offset(-1, 1),
            self.offset(1, 1),
            self.offset(-1, -1),
            self.offset(1, -1),
        ]
    }
}

/// Continuous world-space position.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WorldPoint {
    pub x: f32,
    pub y: f32,
}

impl WorldPoint {
    pub const fn new(x: f32, y: f32) -> Self {
        WorldPoint { x, y }
    }
}

/// Axis-aligned world-space rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldRect {
    pub min: WorldPoint,
    pub max: WorldPoint,
}

impl WorldRect {
    /// Builds a rectangle spanning both corners in any order.
    pub fn from_corners(a: WorldPoint, b: WorldPoint) -> Self {
        WorldRect {
            min: WorldPoint::new(a.x.min(b.x), a.y.min(b.y)),
            max: WorldPoint::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    pub fn contains(&self, p: WorldPoint) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }
}

/// Converts between world positions and cells.
///
/// `cell_to_world` returns the cell's anchor corner, and
/// `world_to_cell(cell_to_world(c)) == c` must hold for every cell.
pub trait CellMapper {
    fn world_to_cell(&self, point: WorldPoint) -> Cell;
    fn cell_to_world(&self, cell: Cell) -> WorldPoint;
}

/// Axis-aligned square/rectangular cells.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RectangularMapper {
    pub cell_size: [f32; 2],
    pub origin: WorldPoint,
}

impl CellMapper for RectangularMapper {
    fn world_to_cell(&self, point: WorldPoint) -> Cell {
        let fx = (point.x - self.origin.x) / self.cell_size[0];
        let fy = (point.y - self.origin.y) / self.cell_size[1];
        Cell::new((fx + SNAP_EPSILON).floor() as i32, (fy + SNAP_EPSILON).floor() as i32)
    }

    fn cell_to_world(&self, cell: Cell) -> WorldPoint {
        WorldPoint::new(
            self.origin.x + cell.x as f32 * self.cell_size[0],
            self.origin.y + cell.y as f32 * self.cell_size[1],
        )
    }
}

/// Diamond-shaped isometric cells; the anchor is the bottom vertex.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IsometricMapper {
    pub cell_size: [f32; 2],
    pub origin: WorldPoint,
}

impl CellMapper for IsometricMapper {
    fn world_to_cell(&self, point: WorldPoint) -> Cell {
        let u = (point.x - self.origin.x) / self.cell_size[0];
        let v = (point.y - self.origin.y) / self.cell_size[1];
        Cell::new(
            (u + v + SNAP_EPSILON).floor() as i32,
            (v - u + SNAP_EPSILON).floor() as i32,
        )
    }

    fn cell_to_world(&self, cell: Cell) -> WorldPoint {
        WorldPoint::new(
            self.origin.x + (cell.x - cell.y) as f32 * self.cell_size[0] * 0.5,
            self.origin.y + (cell.x + cell.y) as f32 * self.cell_size[1] * 0.5,
        )
    }
}

/// Cell layout of a level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GridType {
    #[default]
    Isometric,
    Rectangular,
}

impl GridType {
    /// Maps a raw 2D movement input onto the grid's axes, keeping its length.
    pub fn convert_input(self, input: WorldPoint) -> WorldPoint {
        match self {
            GridType::Rectangular => input,
            GridType::Isometric => {
                let magnitude = (input.x * input.x + input.y * input.y).sqrt();
                let dx = (input.x - input.y) * 0.5;
                let dy = (input.x + input.y) * 0.5;
                let len = (dx * dx + dy * dy).sqrt();
                if len <= f32::EPSILON {
                    return WorldPoint::default();
                }
                WorldPoint::new(dx / len * magnitude, dy / len * magnitude)
            }
        }
    }
}

/// Grid layout settings of a level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub grid_type: GridType,
    pub cell_size: [f32; 2],
    pub origin: WorldPoint,
}

impl Default for GridConfig {
    fn default() -> Self {
        GridConfig {
            grid_type: GridType::Isometric,
            cell_size: [1.0, 1.0],
            origin: WorldPoint::default(),
        }
    }
}

impl GridConfig {
    pub fn mapper(&self) -> GridMapper {
        match self.grid_type {
            GridType::Rectangular => GridMapper::Rectangular(RectangularMapper {
                cell_size: self.cell_size,
                origin: self.origin,
            }),
            GridType::Isometric => GridMapper::Isometric(IsometricMapper {
                cell_size: self.cell_size,
                origin: self.origin,
            }),
        }
    }
}

/// Mapper selected from a [`GridConfig`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GridMapper {
    Rectangular(RectangularMapper),
    Isometric(IsometricMapper),
}

impl CellMapper for GridMapper {
    fn world_to_cell(&self, point: WorldPoint) -> Cell {
        match self {
            GridMapper::Rectangular(m) => m.world_to_cell(point),
            GridMapper::Isometric(m) => m.world_to_cell(point),
        }
    }

    fn cell_to_world(&self, cell: Cell) -> WorldPoint {
        match self {
            GridMapper::Rectangular(m) => m.cell_to_world(cell),
            GridMapper::Isometric(m) => m.cell_to_world(cell),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect() -> RectangularMapper {
        RectangularMapper {
            cell_size: [1.0, 1.0],
            origin: WorldPoint::default(),
        }
    }

    fn iso() -> IsometricMapper {
        IsometricMapper {
            cell_size: [1.0, 0.5],
            origin: WorldPoint::default(),
        }
    }

    #[test]
    fn rectangular_round_trips_cells() {
        let m = rect();
        for &(x, y) in &[(0, 0), (3, -2), (-7, 11), (25, 25)] {
            let cell = Cell::new(x, y);
            assert_eq!(m.world_to_cell(m.cell_to_world(cell)), cell);
        }
    }

    #[test]
    fn rectangular_floors_negative_positions() {
        let m = rect();
        assert_eq!(m.world_to_cell(WorldPoint::new(-0.5, 0.5)), Cell::new(-1, 0));
        assert_eq!(m.world_to_cell(WorldPoint::new(2.9, -3.1)), Cell::new(2, -4));
    }

    #[test]
    fn isometric_round_trips_cells() {
        let m = iso();
        for &(x, y) in &[(0, 0), (3, -2), (-7, 11), (4, 4)] {
            let cell = Cell::new(x, y);
            assert_eq!(m.world_to_cell(m.cell_to_world(cell)), cell);
        }
    }

    #[test]
    fn isometric_point_inside_diamond_maps_to_cell() {
        let m = iso();
        // Halfway between the bottom and top vertices of cell (0, 0).
        assert_eq!(m.world_to_cell(WorldPoint::new(0.0, 0.25)), Cell::ZERO);
    }

    #[test]
    fn isometric_input_keeps_magnitude() {
        let moved = GridType::Isometric.convert_input(WorldPoint::new(1.0, 0.0));
        let len = (moved.x * moved.x + moved.y * moved.y).sqrt();
        assert!((len - 1.0).abs() < 1e-5);
        assert!((moved.x - moved.y).abs() < 1e-5);
        assert_eq!(
            GridType::Isometric.convert_input(WorldPoint::default()),
            WorldPoint::default()
        );
    }

    #[test]
    fn world_rect_normalises_corners() {
        let r = WorldRect::from_corners(WorldPoint::new(2.0, -1.0), WorldPoint::new(-1.0, 3.0));
        assert_eq!(r.min, WorldPoint::new(-1.0, -1.0));
        assert_eq!(r.max, WorldPoint::new(2.0, 3.0));
        assert!(r.contains(WorldPoint::new(0.0, 0.0)));
        assert!(!r.contains(WorldPoint::new(5.0, 0.0)));
    }

    #[test]
    fn neighbors_start_with_orthogonals() {
        let c = Cell::new(1, 1);
        assert_eq!(&c.all_neighbors()[..4], &c.orthogonal_neighbors()[..]);
    }
}
