//! Level configuration loaded from JSON.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::coords::{Cell, GridConfig};
use crate::error::{TerrainError, TerrainResult};
use crate::grid::Bounds;
use crate::lakes::LakeSettings;
use crate::terrain_generator::GenerationSettings;
use crate::tiles::{TileCatalog, TilePools};
use crate::water_zones::ZoneSizePolicy;

/// Tile names making up each generation pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolNames {
    pub grass: Vec<String>,
    pub stone: Vec<String>,
    pub sand: Vec<String>,
    pub water: Vec<String>,
}

impl Default for PoolNames {
    fn default() -> Self {
        let names = |list: &[&str]| list.iter().map(|s| s.to_string()).collect();
        PoolNames {
            grass: names(&["grass", "grass_tall"]),
            stone: names(&["stone", "boulder"]),
            sand: names(&["sand"]),
            water: names(&["pond", "lake"]),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelConfig {
    pub name: String,
    pub description: String,
    pub grid: GridConfig,
    pub width: u32,
    pub height: u32,
    pub start_position: Cell,
    pub seed: u64,
    pub terrain: GenerationSettings,
    pub lakes: LakeSettings,
    pub tiles: PoolNames,
    pub zones: ZoneSizePolicy,
}

impl Default for LevelConfig {
    fn default() -> Self {
        LevelConfig {
            name: "New Level".to_string(),
            description: String::new(),
            grid: GridConfig::default(),
            width: 50,
            height: 50,
            start_position: Cell::ZERO,
            seed: 0,
            terrain: GenerationSettings::default(),
            lakes: LakeSettings::default(),
            tiles: PoolNames::default(),
            zones: ZoneSizePolicy::default(),
        }
    }
}

impl LevelConfig {
    /// Parses and validates a level. Missing fields take their defaults.
    pub fn from_json_str(data: &str) -> TerrainResult<Self> {
        let config: LevelConfig = serde_json::from_str(data)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: &Path) -> TerrainResult<Self> {
        let data = std::fs::read_to_string(path)?;
        Self::from_json_str(&data)
    }

    pub fn to_json(&self) -> TerrainResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> TerrainResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(TerrainError::InvalidConfig(format!(
                "map size {}x{} is empty",
                self.width, self.height
            )));
        }
        let scale = self.terrain.noise_scale;
        if !scale.is_finite() || scale <= 0.0 {
            return Err(TerrainError::InvalidConfig(format!(
                "noise_scale must be positive, got {scale}"
            )));
        }
        let [w, h] = self.grid.cell_size;
        if !(w.is_finite() && h.is_finite()) || w <= 0.0 || h <= 0.0 {
            return Err(TerrainError::InvalidConfig(format!(
                "cell_size must be positive, got [{w}, {h}]"
            )));
        }
        self.lakes.validate()?;
        let side = self.width.max(self.height);
        if self.lakes.enabled && self.lakes.max_size > side {
            return Err(TerrainError::InvalidConfig(format!(
                "lake max_size {} is larger than the {side}-cell map",
                self.lakes.max_size
            )));
        }
        Ok(())
    }

    /// Map bounds centred on the start position.
    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.start_position, self.width, self.height)
    }

    pub fn resolve_pools(&self, catalog: &TileCatalog) -> TerrainResult<TilePools> {
        TilePools::from_names(
            catalog,
            &self.tiles.grass,
            &self.tiles.stone,
            &self.tiles.sand,
            &self.tiles.water,
        )
    }
}
