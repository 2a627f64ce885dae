//! Mulberry - asset access for mul/idx game data sets.
//!
//! This crate ties the Mulberry crates together behind a single
//! [`AssetManager`], built once per session from an [`AssetConfig`].
//!
//! # Crates
//!
//! - [`mulberry_common`] - Binary reading, memory-mapped files, images
//! - [`mulberry_index`] - File catalog, idx/mul record stores, dif patches
//! - [`mulberry_formats`] - Loaders for every asset family
//!
//! # Example
//!
//! ```no_run
//! use mulberry::prelude::*;
//!
//! let config = AssetConfig::load("assets.xml")?;
//! let assets = AssetManager::create(&config)?;
//!
//! let cell = assets.map_loader(0)?.cell(1400, 1600);
//! println!("tile {} at z {}", cell.tile_id, cell.z);
//!
//! let walk = assets.get_anim(400, 0);
//! println!("{} frames facing down", walk[3].frames().len());
//! # Ok::<(), mulberry::Error>(())
//! ```

mod config;
mod error;
mod manager;
mod texture;
mod variants;

pub use mulberry_common as common;
pub use mulberry_formats as formats;
pub use mulberry_index as index;

pub use config::{AnimConfig, AssetConfig, Directories, MapConfig, ANIM_SLOTS, MAP_SLOTS};
pub use error::{Error, ErrorKind, Result};
pub use manager::{anim_file_stem, font_file_name, is_mirrored, AssetManager, DIRECTIONS, FONT_SLOTS};
pub use texture::TextureProvider;
pub use variants::Variants;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::{AssetConfig, AssetManager, Error, ErrorKind, TextureProvider};
    pub use mulberry_common::Image;
    pub use mulberry_formats::{
        Animation, BodyConvDef, BodyDef, MapBlock, MapCell, MobType, StaticItem, TileFlags,
    };
    pub use mulberry_index::{FileCatalog, RecordSource};
}

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
