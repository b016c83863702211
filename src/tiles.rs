use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::coords::Cell;
use crate::error::{TerrainError, TerrainResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TerrainCategory {
    Grass,
    Stone,
    Sand,
    Dirt,
    Wood,
    Water,
}

impl TerrainCategory {
    /// Enumeration order; smoothing ties resolve to the earliest entry.
    pub const ALL: [TerrainCategory; 6] = [
        TerrainCategory::Grass,
        TerrainCategory::Stone,
        TerrainCategory::Sand,
        TerrainCategory::Dirt,
        TerrainCategory::Wood,
        TerrainCategory::Water,
    ];

    pub fn index(self) -> usize {
        match self {
            TerrainCategory::Grass => 0,
            TerrainCategory::Stone => 1,
            TerrainCategory::Sand => 2,
            TerrainCategory::Dirt => 3,
            TerrainCategory::Wood => 4,
            TerrainCategory::Water => 5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum WaterCategory {
    #[default]
    Pond,
    River,
    Lake,
    Ocean,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileId(pub u16);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WaterTileId(pub u16);

fn default_speed() -> f32 {
    1.0
}

fn default_true() -> bool {
    true
}

/// A terrain tile kind. Several named kinds may share the same gameplay
/// attributes and differ only visually.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileKind {
    pub name: String,
    #[serde(default = "default_true")]
    pub walkable: bool,
    #[serde(default)]
    pub is_water: bool, // shallows: reads as water but keeps its own walkability
    pub terrain_category: TerrainCategory,
    #[serde(default = "default_speed")]
    pub speed_modifier: f32,
    #[serde(default)]
    pub random_rotation: bool,
    #[serde(default)]
    pub random_flip: bool,
}

impl TileKind {
    pub fn new(name: &str, terrain_category: TerrainCategory, speed_modifier: f32) -> Self {
        TileKind {
            name: name.to_string(),
            walkable: true,
            is_water: false,
            terrain_category,
            speed_modifier,
            random_rotation: false,
            random_flip: false,
        }
    }

    pub fn blocking(mut self) -> Self {
        self.walkable = false;
        self
    }
}

/// A water tile kind. Water is never walkable and always reports
/// [`TerrainCategory::Water`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaterTileKind {
    pub name: String,
    pub water_category: WaterCategory,
    #[serde(default = "default_speed")]
    pub fishing_modifier: f32,
    #[serde(default = "default_true")]
    pub generates_zone: bool,
}

impl WaterTileKind {
    pub fn new(name: &str, water_category: WaterCategory, fishing_modifier: f32) -> Self {
        WaterTileKind {
            name: name.to_string(),
            water_category,
            fishing_modifier,
            generates_zone: true,
        }
    }

    pub fn walkable(&self) -> bool {
        false
    }

    pub fn is_water(&self) -> bool {
        true
    }

    pub fn terrain_category(&self) -> TerrainCategory {
        TerrainCategory::Water
    }

    pub fn speed_modifier(&self) -> f32 {
        0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct TileTransform {
    pub quarter_turns: u8,
    pub flip_x: bool,
    pub flip_y: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TileCatalog {
    #[serde(default)]
    terrain: Vec<TileKind>,
    #[serde(default)]
    water: Vec<WaterTileKind>,
}

impl TileCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn standard() -> Self {
        let mut catalog = TileCatalog::new();
        let mut grass = TileKind::new("grass", TerrainCategory::Grass, 1.0);
        grass.random_flip = true;
        let mut grass_tall = TileKind::new("grass_tall", TerrainCategory::Grass, 0.9);
        grass_tall.random_flip = true;
        let mut stone = TileKind::new("stone", TerrainCategory::Stone, 0.8);
        stone.random_rotation = true;
        catalog.add_terrain(grass);
        catalog.add_terrain(grass_tall);
        catalog.add_terrain(stone);
        catalog.add_terrain(TileKind::new("boulder", TerrainCategory::Stone, 1.0).blocking());
        catalog.add_terrain(TileKind::new("sand", TerrainCategory::Sand, 0.85));
        catalog.add_terrain(TileKind::new("dirt", TerrainCategory::Dirt, 1.0));
        catalog.add_terrain(TileKind::new("boardwalk", TerrainCategory::Wood, 1.2));
        catalog.add_water(WaterTileKind::new("pond", WaterCategory::Pond, 1.0));
        catalog.add_water(WaterTileKind::new("lake", WaterCategory::Lake, 1.1));
        catalog.add_water(WaterTileKind::new("river", WaterCategory::River, 0.9));
        catalog.add_water(WaterTileKind::new("ocean", WaterCategory::Ocean, 1.3));
        catalog
    }

    pub fn from_json_str(data: &str) -> TerrainResult<Self> {
        let catalog: TileCatalog = serde_json::from_str(data)?;
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn from_json_file(path: &std::path::Path) -> TerrainResult<Self> {
        let data = std::fs::read_to_string(path)?;
        Self::from_json_str(&data)
    }

    /// Names must be unique across both kinds and speeds positive.
    pub fn validate(&self) -> TerrainResult<()> {
        let mut seen = HashSet::new();
        let names = self
            .terrain
            .iter()
            .map(|t| t.name.as_str())
            .chain(self.water.iter().map(|w| w.name.as_str()));
        for name in names {
            if !seen.insert(name) {
                return Err(TerrainError::InvalidConfig(format!(
                    "duplicate tile name `{name}`"
                )));
            }
        }
        let bad_speed = |t: &&TileKind| t.speed_modifier.is_nan() || t.speed_modifier <= 0.0;
        if let Some(bad) = self.terrain.iter().find(bad_speed) {
            return Err(TerrainError::InvalidConfig(format!(
                "tile `{}` has non-positive speed modifier {}",
                bad.name, bad.speed_modifier
            )));
        }
        Ok(())
    }

    pub fn add_terrain(&mut self, kind: TileKind) -> TileId {
        self.terrain.push(kind);
        TileId((self.terrain.len() - 1) as u16)
    }

    pub fn add_water(&mut self, kind: WaterTileKind) -> WaterTileId {
        self.water.push(kind);
        WaterTileId((self.water.len() - 1) as u16)
    }

    pub fn terrain(&self, id: TileId) -> Option<&TileKind> {
        self.terrain.get(id.0 as usize)
    }

    pub fn water(&self, id: WaterTileId) -> Option<&WaterTileKind> {
        self.water.get(id.0 as usize)
    }

    pub fn terrain_id(&self, name: &str) -> Option<TileId> {
        self.terrain
            .iter()
            .position(|t| t.name == name)
            .map(|i| TileId(i as u16))
    }

    pub fn water_id(&self, name: &str) -> Option<WaterTileId> {
        self.water
            .iter()
            .position(|w| w.name == name)
            .map(|i| WaterTileId(i as u16))
    }

    pub fn terrain_kinds(&self) -> impl Iterator<Item = (TileId, &TileKind)> {
        self.terrain
            .iter()
            .enumerate()
            .map(|(i, t)| (TileId(i as u16), t))
    }

    pub fn water_kinds(&self) -> impl Iterator<Item = (WaterTileId, &WaterTileKind)> {
        self.water
            .iter()
            .enumerate()
            .map(|(i, w)| (WaterTileId(i as u16), w))
    }

    pub fn category_of(&self, id: TileId) -> Option<TerrainCategory> {
        self.terrain(id).map(|t| t.terrain_category)
    }

    /// Deterministic per-cell rotation/flip for tiles that ask for it. Seeded
    /// from the cell position, never from the generation RNG.
    pub fn tile_transform(&self, id: TileId, cell: Cell) -> TileTransform {
        let Some(kind) = self.terrain(id) else {
            return TileTransform::default();
        };
        let seed = cell.x as i64 + cell.y as i64 * 1000;
        let mut transform = TileTransform::default();
        if kind.random_rotation {
            let mut rng = ChaCha8Rng::seed_from_u64(seed as u64);
            transform.quarter_turns = rng.gen_range(0..4);
        }
        if kind.random_flip {
            let mut rng = ChaCha8Rng::seed_from_u64((seed + 12345) as u64);
            transform.flip_x = rng.gen::<f32>() > 0.5;
            transform.flip_y = rng.gen::<f32>() > 0.5;
        }
        transform
    }
}

/// Tiles generation may place, grouped by band.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TilePools {
    pub grass: Vec<TileId>,
    pub stone: Vec<TileId>,
    pub sand: Vec<TileId>,
    pub water: Vec<WaterTileId>,
}

impl TilePools {
    pub fn from_names(
        catalog: &TileCatalog,
        grass: &[String],
        stone: &[String],
        sand: &[String],
        water: &[String],
    ) -> TerrainResult<Self> {
        let terrain = |names: &[String]| -> TerrainResult<Vec<TileId>> {
            names
                .iter()
                .map(|n| {
                    catalog
                        .terrain_id(n)
                        .ok_or_else(|| TerrainError::UnknownTile(n.clone()))
                })
                .collect()
        };
        let water = water
            .iter()
            .map(|n| {
                catalog
                    .water_id(n)
                    .ok_or_else(|| TerrainError::UnknownTile(n.clone()))
            })
            .collect::<TerrainResult<Vec<_>>>()?;
        Ok(TilePools {
            grass: terrain(grass)?,
            stone: terrain(stone)?,
            sand: terrain(sand)?,
            water,
        })
    }

    /// Pool for a terrain category. Categories without a band are empty.
    pub fn for_category(&self, category: TerrainCategory) -> &[TileId] {
        match category {
            TerrainCategory::Grass => &self.grass,
            TerrainCategory::Stone => &self.stone,
            TerrainCategory::Sand => &self.sand,
            _ => &[],
        }
    }

    pub fn pick<R: Rng + ?Sized>(&self, category: TerrainCategory, rng: &mut R) -> Option<TileId> {
        pick_from(self.for_category(category), rng)
    }

    pub fn pick_water<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<WaterTileId> {
        pick_from(&self.water, rng)
    }
}

fn pick_from<T: Copy, R: Rng + ?Sized>(pool: &[T], rng: &mut R) -> Option<T> {
    if pool.is_empty() {
        return None;
    }
    Some(pool[rng.gen_range(0..pool.len())])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_catalog_resolves_names() {
        let catalog = TileCatalog::standard();
        let stone = catalog.terrain_id("stone").expect("stone");
        assert_eq!(catalog.category_of(stone), Some(TerrainCategory::Stone));
        let lake = catalog.water_id("lake").expect("lake");
        assert_eq!(catalog.water(lake).unwrap().water_category, WaterCategory::Lake);
        assert!(catalog.terrain_id("lava").is_none());
    }

    #[test]
    fn water_kind_is_never_walkable() {
        let kind = WaterTileKind::new("pond", WaterCategory::Pond, 1.0);
        assert!(!kind.walkable());
        assert!(kind.is_water());
        assert_eq!(kind.terrain_category(), TerrainCategory::Water);
    }

    #[test]
    fn category_order_is_stable() {
        for (i, cat) in TerrainCategory::ALL.iter().enumerate() {
            assert_eq!(cat.index(), i);
        }
    }

    #[test]
    fn unknown_pool_name_is_reported() {
        let catalog = TileCatalog::standard();
        let err = TilePools::from_names(&catalog, &["moss".to_string()], &[], &[], &[])
            .unwrap_err();
        assert!(matches!(err, TerrainError::UnknownTile(ref n) if n == "moss"));
    }

    #[test]
    fn empty_pool_picks_nothing() {
        let pools = TilePools::default();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(pools.pick(TerrainCategory::Grass, &mut rng), None);
        assert_eq!(pools.pick_water(&mut rng), None);
    }

    #[test]
    fn catalog_json_rejects_duplicates() {
        let json = r#"{
            "terrain": [
                {"name": "g", "terrain_category": "Grass"},
                {"name": "g", "terrain_category": "Stone"}
            ]
        }"#;
        assert!(matches!(
            TileCatalog::from_json_str(json),
            Err(TerrainError::InvalidConfig(_))
        ));
    }

    #[test]
    fn catalog_json_applies_defaults() {
        let json = r#"{
            "terrain": [{"name": "g", "terrain_category": "Grass"}],
            "water": [{"name": "w", "water_category": "River"}]
        }"#;
        let catalog = TileCatalog::from_json_str(json).expect("catalog");
        let g = catalog.terrain(TileId(0)).unwrap();
        assert!(g.walkable);
        assert_eq!(g.speed_modifier, 1.0);
        let w = catalog.water(WaterTileId(0)).unwrap();
        assert!(w.generates_zone);
    }

    #[test]
    fn tile_transform_is_deterministic_per_cell() {
        let catalog = TileCatalog::standard();
        let stone = catalog.terrain_id("stone").unwrap();
        let a = catalog.tile_transform(stone, Cell::new(4, -9));
        let b = catalog.tile_transform(stone, Cell::new(4, -9));
        assert_eq!(a, b);
        assert!(a.quarter_turns < 4);
        // Stone only rotates.
        assert!(!a.flip_x && !a.flip_y);
        let sand = catalog.terrain_id("sand").unwrap();
        assert_eq!(catalog.tile_transform(sand, Cell::new(4, -9)), TileTransform::default());
    }
}
