//! Terrain and water core for a fishing game: noise terrain, lakes, cached
//! tile queries and fishing zones.

pub mod coords;
pub mod error;
pub mod grid;
pub mod lakes;
pub mod level;
pub mod terrain_generator;
pub mod tile_index;
pub mod tiles;
pub mod water_zones;
pub mod world;

pub use coords::{Cell, CellMapper, GridConfig, GridMapper, GridType, WorldPoint, WorldRect};
pub use error::{TerrainError, TerrainResult};
pub use grid::{Bounds, TerrainGrid};
pub use lakes::{LakeCarver, LakeReport, LakeSettings};
pub use level::{LevelConfig, PoolNames};
pub use terrain_generator::{GenerationSettings, NoiseField, PerlinField, TerrainGenerator};
pub use tile_index::{SpatialTileIndex, TileInfo, TileInfoCache};
pub use tiles::{
    TerrainCategory, TileCatalog, TileId, TileKind, TilePools, TileTransform, WaterCategory,
    WaterTileId, WaterTileKind,
};
pub use water_zones::{WaterZone, WaterZoneGrouper, ZoneId, ZoneSizePolicy};
pub use world::{FishingGround, RegenerationReport};
