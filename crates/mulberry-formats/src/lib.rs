//! Loaders for every asset family of a mul/idx data set.
//!
//! Each loader is opened once and then only read. Construction is the only
//! fallible step: lookups of absent, out-of-range or corrupt records return
//! `None`, an empty value or a default block and log a warning.
//!
//! ## Binary tables
//!
//! - [`TileDataLoader`] - Land and item tile metadata with [`TileFlags`]
//! - [`HuesLoader`] - Color ramps applied to grayscale art
//! - [`AnimDataLoader`] - Frame sequences of animated items
//!
//! ## Indexed images
//!
//! - [`ArtLoader`] - Land diamonds and run-length item art
//! - [`GumpArtLoader`] - UI images
//! - [`MapTexLoader`] - Stretched terrain textures
//! - [`AnimLoader`] - Creature animations, decoded lazily per frame
//! - [`UniFontLoader`] - Unicode bitmap fonts
//!
//! ## World planes
//!
//! - [`MapLoader`] - Terrain blocks with optional dif patches
//! - [`StaticsLoader`] - Static object blocks with their own dif patches
//!
//! ## Text tables
//!
//! - [`MobTypesLoader`] - Creature classes
//! - [`DefFileLoader`] - Generic keyed definition tables such as
//!   [`BodyDef`] and [`BodyConvDef`]

mod anim;
mod animdata;
mod art;
mod deffile;
mod error;
mod gumpart;
mod hues;
mod map;
mod maptex;
mod mobtypes;
mod statics;
mod tiledata;
mod unifont;

pub use anim::{
    AnimLoader, Animation, AnimationFrame, Palette, HIGH_DETAIL_ACTIONS, LOW_DETAIL_ACTIONS,
    PEOPLE_ACTIONS, STORED_DIRECTIONS,
};
pub use animdata::{AnimDataInfo, AnimDataLoader};
pub use art::{decode_item, decode_land, ArtLoader, ITEM_ART_BASE, LAND_TILE_SIZE};
pub use deffile::{unbrace, BodyConvDef, BodyDef, DefFileLoader, DefRecord};
pub use error::{Error, Result};
pub use gumpart::{decode_gump, GumpArtLoader};
pub use hues::{Hue, HuesLoader};
pub use map::{MapBlock, MapCell, MapLoader, BLOCK_EDGE, CELLS_PER_BLOCK, MAP_BLOCK_SIZE};
pub use maptex::MapTexLoader;
pub use mobtypes::{MobType, MobTypeEntry, MobTypesLoader};
pub use statics::{StaticItem, StaticsLoader, STATIC_ENTRY_SIZE};
pub use tiledata::{LandTileInfo, StaticTileInfo, TileDataLoader, TileFlags};
pub use unifont::{Glyph, UniFontLoader, GLYPH_TABLE_LEN};

