use angler_terrain::{
    Cell, FishingGround, LevelConfig, RegenerationReport, TerrainCategory, TerrainResult,
    TileCatalog, TileTransform, WaterCategory,
};
use clap::Parser;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "angler-terrain")]
#[command(about = "Generate and inspect fishing-ground terrain")]
struct Args {
    /// Level configuration (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Tile catalog (JSON); the built-in catalog is used otherwise
    #[arg(long)]
    tiles: Option<PathBuf>,

    /// Random seed (overrides the level)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Map width in cells
    #[arg(short = 'W', long)]
    width: Option<u32>,

    /// Map height in cells
    #[arg(short = 'H', long)]
    height: Option<u32>,

    /// Number of lakes to carve
    #[arg(short, long)]
    lakes: Option<u32>,

    /// Print the map as coloured ASCII
    #[arg(long)]
    ascii: bool,

    /// Emit the generation summary as JSON instead of text
    #[arg(long)]
    json: bool,

    /// Include every placed tile with its transform in the JSON output
    #[arg(long, requires = "json")]
    layers: bool,
}

#[derive(Serialize)]
struct CellRecord {
    cell: Cell,
    tile: Option<String>,
    water: Option<String>,
    transform: TileTransform,
}

#[derive(Serialize)]
struct ZoneSummary {
    id: u32,
    cells: usize,
    category: WaterCategory,
    centroid: [f32; 2],
    bounds_min: Cell,
    bounds_max: Cell,
}

#[derive(Serialize)]
struct Summary<'a> {
    level: &'a str,
    seed: u64,
    width: u32,
    height: u32,
    report: &'a RegenerationReport,
    blocked_cells: usize,
    zones: Vec<ZoneSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    layers: Option<Vec<CellRecord>>,
}

fn load_config(args: &Args) -> TerrainResult<LevelConfig> {
    let mut config = match &args.config {
        Some(path) => LevelConfig::from_json_file(path)?,
        None => LevelConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(width) = args.width {
        config.width = width;
    }
    if let Some(height) = args.height {
        config.height = height;
    }
    if let Some(lakes) = args.lakes {
        config.lakes.count = lakes;
        config.lakes.enabled = lakes > 0;
    }
    config.validate()?;
    Ok(config)
}

fn load_catalog(args: &Args) -> TerrainResult<TileCatalog> {
    match &args.tiles {
        Some(path) => TileCatalog::from_json_file(path),
        None => Ok(TileCatalog::standard()),
    }
}

fn print_ground_ascii(ground: &FishingGround) {
    let index = ground.index();
    let bounds = ground.grid().bounds();
    let min = bounds.min();

    // Highest row first so +y points up on screen.
    for dy in (0..bounds.height as i32).rev() {
        for dx in 0..bounds.width as i32 {
            let info = index.tile_info(min.offset(dx, dy));
            let (color_code, ch) = if info.is_water {
                match info.water_category {
                    Some(WaterCategory::Ocean) => ("\x1b[34m", '≈'),
                    Some(WaterCategory::River) => ("\x1b[36m", '~'),
                    _ => ("\x1b[94m", '~'),
                }
            } else if !info.is_walkable {
                ("\x1b[90m", '▲')
            } else {
                match info.terrain_category {
                    TerrainCategory::Grass => ("\x1b[92m", ','),
                    TerrainCategory::Stone => ("\x1b[37m", '^'),
                    TerrainCategory::Sand => ("\x1b[93m", '.'),
                    TerrainCategory::Dirt => ("\x1b[33m", '#'),
                    TerrainCategory::Wood => ("\x1b[35m", '='),
                    TerrainCategory::Water => ("\x1b[94m", '~'),
                }
            };
            print!("{}{}\x1b[0m", color_code, ch);
        }
        println!();
    }
}

fn print_summary(ground: &FishingGround, report: &RegenerationReport) {
    let config = ground.config();
    println!("\n\x1b[1m{}\x1b[0m (seed {})", config.name, config.seed);
    println!("═══════════════════════════════\n");

    let index = ground.index();
    let bounds = ground.grid().bounds();
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for cell in bounds.cells() {
        let info = index.tile_info(cell);
        let key = match info.water_category {
            Some(category) => format!("{:?} water", category),
            None => format!("{:?}", info.terrain_category),
        };
        *counts.entry(key).or_insert(0) += 1;
    }

    println!("\x1b[1mTerrain Distribution:\x1b[0m");
    let total = bounds.area().max(1);
    for (kind, count) in &counts {
        let percentage = (*count as f64 / total as f64) * 100.0;
        println!("  {} - {:.1}%", kind, percentage);
    }

    println!("\n\x1b[1mLakes:\x1b[0m {} carved", report.lakes.len());
    for lake in &report.lakes {
        println!(
            "  • at ({}, {}) radius {} - {} cells",
            lake.center.x, lake.center.y, lake.radius, lake.placed
        );
    }
    println!("\n\x1b[1mSmoothing:\x1b[0m {} cells replaced", report.smoothed);
    println!("\x1b[1mBlocked cells:\x1b[0m {}", ground.blocked_cells().len());

    println!("\n\x1b[1mFishing Zones:\x1b[0m {}", ground.zones().len());
    for zone in ground.zones() {
        println!(
            "  • #{} {:?} - {} cells, centre ({:.2}, {:.2})",
            zone.id.0,
            zone.dominant_category,
            zone.len(),
            zone.centroid.x,
            zone.centroid.y
        );
    }
}

fn cell_records(ground: &FishingGround) -> Vec<CellRecord> {
    let grid = ground.grid();
    let catalog = ground.catalog();
    grid.bounds()
        .cells()
        .filter_map(|cell| {
            let tile = grid.base_tile(cell).and_then(|id| catalog.terrain(id));
            let water = grid.water_tile(cell).and_then(|id| catalog.water(id));
            if tile.is_none() && water.is_none() {
                return None;
            }
            Some(CellRecord {
                cell,
                tile: tile.map(|t| t.name.clone()),
                water: water.map(|w| w.name.clone()),
                transform: ground.tile_transform(cell).unwrap_or_default(),
            })
        })
        .collect()
}

fn summary<'a>(
    ground: &'a FishingGround,
    report: &'a RegenerationReport,
    with_layers: bool,
) -> Summary<'a> {
    let config = ground.config();
    Summary {
        level: &config.name,
        seed: config.seed,
        width: config.width,
        height: config.height,
        report,
        blocked_cells: ground.blocked_cells().len(),
        zones: ground
            .zones()
            .iter()
            .map(|z| ZoneSummary {
                id: z.id.0,
                cells: z.len(),
                category: z.dominant_category,
                centroid: [z.centroid.x, z.centroid.y],
                bounds_min: z.bounds_min,
                bounds_max: z.bounds_max,
            })
            .collect(),
        layers: with_layers.then(|| cell_records(ground)),
    }
}

fn run(args: &Args) -> TerrainResult<()> {
    let config = load_config(args)?;
    let catalog = load_catalog(args)?;
    let mut ground = FishingGround::new(config, catalog)?;
    let report = ground.regenerate_all()?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary(&ground, &report, args.layers))?);
        return Ok(());
    }
    if args.ascii {
        print_ground_ascii(&ground);
    }
    print_summary(&ground, &report);
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(%err, "generation failed");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
