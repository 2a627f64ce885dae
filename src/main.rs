//! Mulberry CLI - Command-line tool for inspecting mul/idx game data sets.
//!
//! This is the main entry point for the Mulberry command-line application.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use mulberry::formats::StaticTileInfo;
use mulberry::prelude::*;
use mulberry::{is_mirrored, DIRECTIONS};

/// Mulberry - mul/idx game data inspection tool
#[derive(Parser)]
#[command(name = "mulberry")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Asset configuration file
    #[arg(short, long, env = "MULBERRY_CONFIG", global = true, default_value = "assets.xml")]
    config: PathBuf,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarize what the configuration loads
    Info,

    /// Show tile data for an item
    Tile {
        /// Item art id
        id: u32,
    },

    /// Show the terrain and statics of a map block
    MapBlock {
        /// Map plane index
        plane: usize,
        /// Block x
        bx: u32,
        /// Block y
        by: u32,
    },

    /// Show the eight facings of a creature animation
    Anim {
        /// Body id
        body: u32,
        /// Action id
        action: u32,
    },

    /// Show which file a logical name resolves to
    Resolve {
        /// Logical file name, e.g. map0.mul
        name: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Commands::Resolve { name } = &cli.command {
        return cmd_resolve(&cli, name);
    }

    let start = Instant::now();
    let config = AssetConfig::load(&cli.config)
        .with_context(|| format!("Failed to load configuration {}", cli.config.display()))?;
    let assets = AssetManager::create(&config).context("Failed to load assets")?;
    tracing::info!("Assets loaded in {:?}", start.elapsed());

    match cli.command {
        Commands::Info => cmd_info(&assets, cli.json),
        Commands::Tile { id } => cmd_tile(&assets, id, cli.json),
        Commands::MapBlock { plane, bx, by } => cmd_map_block(&assets, plane, bx, by, cli.json),
        Commands::Anim { body, action } => cmd_anim(&assets, body, action, cli.json),
        Commands::Resolve { .. } => Ok(()),
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[derive(Serialize)]
struct InfoReport {
    version: &'static str,
    files: usize,
    land_tiles: usize,
    static_tiles: usize,
    hues: usize,
    anim_data_entries: usize,
    maps: Vec<PlaneReport>,
    anims: Vec<usize>,
    fonts: Vec<usize>,
    mob_types: usize,
    body_defs: usize,
    body_conversions: usize,
}

#[derive(Serialize)]
struct PlaneReport {
    index: usize,
    width: u32,
    height: u32,
    patched_blocks: usize,
}

fn cmd_info(assets: &AssetManager, json: bool) -> Result<()> {
    let report = InfoReport {
        version: mulberry::VERSION,
        files: assets.catalog().len(),
        land_tiles: assets.tile_data().land_count(),
        static_tiles: assets.tile_data().static_count(),
        hues: assets.hues().len(),
        anim_data_entries: assets.anim_data().len(),
        maps: assets
            .maps()
            .loaded()
            .map(|index| -> Result<PlaneReport> {
                let map = assets.map_loader(index)?;
                Ok(PlaneReport {
                    index,
                    width: map.block_width(),
                    height: map.block_height(),
                    patched_blocks: map.patched_block_count(),
                })
            })
            .collect::<Result<_>>()?,
        anims: assets.anims().loaded().collect(),
        fonts: assets.fonts().loaded().collect(),
        mob_types: assets.mob_types().len(),
        body_defs: assets.body_defs().len(),
        body_conversions: assets.body_conversions().len(),
    };

    if json {
        return print_json(&report);
    }

    println!("Mulberry {}", report.version);
    println!("Files:        {}", report.files);
    println!("Tiles:        {} land, {} static", report.land_tiles, report.static_tiles);
    println!("Hues:         {}", report.hues);
    println!("Anim data:    {}", report.anim_data_entries);
    for plane in &report.maps {
        println!(
            "Map {}:        {}x{} blocks, {} patched",
            plane.index, plane.width, plane.height, plane.patched_blocks
        );
    }
    println!("Anim files:   {:?}", report.anims);
    println!("Fonts:        {:?}", report.fonts);
    println!("Mob types:    {}", report.mob_types);
    println!(
        "Body defs:    {} ({} conversions)",
        report.body_defs, report.body_conversions
    );

    Ok(())
}

#[derive(Serialize)]
struct TileReport<'a> {
    id: u32,
    info: Option<&'a StaticTileInfo>,
    texture: TextureProvider,
    frames: Vec<u32>,
}

fn cmd_tile(assets: &AssetManager, id: u32, json: bool) -> Result<()> {
    let texture = assets.item_texture_provider(id);
    let report = TileReport {
        id,
        info: assets.tile_data().static_tile_info(id),
        texture,
        frames: texture.frame_art_ids(assets.anim_data()),
    };

    if json {
        return print_json(&report);
    }

    let Some(info) = report.info else {
        anyhow::bail!("No tile data for item {}", id);
    };
    println!("Item {:#06x} \"{}\"", id, info.name);
    println!("  flags:    {:?}", info.flags);
    println!("  weight:   {}", info.weight);
    println!("  height:   {}", info.height);
    println!("  anim id:  {}", info.anim_id);
    match report.texture {
        TextureProvider::Static(_) => println!("  texture:  static"),
        TextureProvider::Animated(_) => println!("  texture:  animated, frames {:?}", report.frames),
    }

    Ok(())
}

#[derive(Serialize)]
struct BlockReport {
    plane: usize,
    bx: u32,
    by: u32,
    cells: Vec<MapCell>,
    statics: Vec<StaticItem>,
}

fn cmd_map_block(assets: &AssetManager, plane: usize, bx: u32, by: u32, json: bool) -> Result<()> {
    let block = assets.map_loader(plane)?.block(bx, by);
    let report = BlockReport {
        plane,
        bx,
        by,
        cells: block.cells().to_vec(),
        statics: assets.statics_loader(plane)?.block(bx, by),
    };

    if json {
        return print_json(&report);
    }

    println!("Map {} block ({}, {})", plane, bx, by);
    for row in report.cells.chunks(8) {
        let line: Vec<String> = row
            .iter()
            .map(|c| format!("{:04x}@{:<4}", c.tile_id, c.z))
            .collect();
        println!("  {}", line.join(" "));
    }
    println!("{} statics", report.statics.len());
    for item in &report.statics {
        println!(
            "  {:#06x} at ({}, {}, {}) hue {}",
            item.art_id, item.x, item.y, item.z, item.hue
        );
    }

    Ok(())
}

#[derive(Serialize)]
struct FacingReport {
    direction: usize,
    mirrored: bool,
    frames: usize,
    sizes: Vec<(u16, u16)>,
}

fn cmd_anim(assets: &AssetManager, body: u32, action: u32, json: bool) -> Result<()> {
    let facings = assets.get_anim(body, action);
    let report: Vec<FacingReport> = facings
        .iter()
        .enumerate()
        .map(|(direction, animation)| FacingReport {
            direction,
            mirrored: is_mirrored(direction),
            frames: animation.frames().len(),
            sizes: animation
                .frames()
                .iter()
                .map(|f| (f.width, f.height))
                .collect(),
        })
        .collect();

    if json {
        return print_json(&report);
    }

    println!(
        "Body {} action {} ({}, {} facings)",
        body,
        action,
        assets.mob_type(body),
        DIRECTIONS
    );
    for facing in &report {
        println!(
            "  {} {:>3} frames{}",
            facing.direction,
            facing.frames,
            if facing.mirrored { " (mirrored)" } else { "" }
        );
    }

    Ok(())
}

fn cmd_resolve(cli: &Cli, name: &str) -> Result<()> {
    let path = resolve_path(&cli.config, name)?;
    if cli.json {
        return print_json(&path);
    }

    match path {
        Some(path) => println!("{}", path.display()),
        None => anyhow::bail!("{} is not in the configured directories", name),
    }

    Ok(())
}

fn resolve_path(config: &Path, name: &str) -> Result<Option<PathBuf>> {
    let config = AssetConfig::load(config)
        .with_context(|| format!("Failed to load configuration {}", config.display()))?;
    let directories = &config.directories;
    let catalog = FileCatalog::build(&directories.base, directories.shard.as_deref())
        .context("Failed to scan data directories")?;
    Ok(catalog.resolve(name).map(Path::to_path_buf))
}
