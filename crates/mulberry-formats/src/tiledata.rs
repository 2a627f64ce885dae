//! Tile metadata (`tiledata.mul`).
//!
//! The file holds 512 groups of 32 land tiles, followed by groups of 32
//! static (item) tiles until the end of the file. Every group starts with a
//! 4-byte header that carries no information.

use std::path::Path;

use bitflags::bitflags;
use mulberry_common::{fixed_name, BinaryReader, MappedFile};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::Result;

/// Number of land tile groups.
pub const LAND_GROUP_COUNT: usize = 512;
/// Tiles per group.
pub const TILES_PER_GROUP: usize = 32;
/// Number of land tiles.
pub const LAND_TILE_COUNT: usize = LAND_GROUP_COUNT * TILES_PER_GROUP;

const GROUP_HEADER_SIZE: usize = 4;
const LAND_GROUP_SIZE: usize = GROUP_HEADER_SIZE + TILES_PER_GROUP * std::mem::size_of::<LandTileRaw>();
const STATIC_GROUP_SIZE: usize =
    GROUP_HEADER_SIZE + TILES_PER_GROUP * std::mem::size_of::<StaticTileRaw>();

bitflags! {
    /// Tile property flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize))]
    pub struct TileFlags: u32 {
        const BACKGROUND = 0x0000_0001;
        const WEAPON = 0x0000_0002;
        const TRANSPARENT = 0x0000_0004;
        const TRANSLUCENT = 0x0000_0008;
        const WALL = 0x0000_0010;
        const DAMAGING = 0x0000_0020;
        const IMPASSABLE = 0x0000_0040;
        const WET = 0x0000_0080;
        const SURFACE = 0x0000_0200;
        const BRIDGE = 0x0000_0400;
        const GENERIC = 0x0000_0800;
        const WINDOW = 0x0000_1000;
        const NO_SHOOT = 0x0000_2000;
        const ARTICLE_A = 0x0000_4000;
        const ARTICLE_AN = 0x0000_8000;
        const INTERNAL = 0x0001_0000;
        const FOLIAGE = 0x0002_0000;
        const PARTIAL_HUE = 0x0004_0000;
        const MAP = 0x0010_0000;
        const CONTAINER = 0x0020_0000;
        const WEARABLE = 0x0040_0000;
        const LIGHT_SOURCE = 0x0080_0000;
        const ANIMATION = 0x0100_0000;
        const HOVER_OVER = 0x0200_0000;
        const ARMOR = 0x0800_0000;
        const ROOF = 0x1000_0000;
        const DOOR = 0x2000_0000;
        const STAIR_BACK = 0x4000_0000;
        const STAIR_RIGHT = 0x8000_0000;

        // Undocumented bits are preserved.
        const _ = !0;
    }
}

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
struct LandTileRaw {
    flags: u32,
    texture: u16,
    name: [u8; 20],
}

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
struct StaticTileRaw {
    flags: u32,
    weight: u8,
    quality: u8,
    unknown: u16,
    unknown1: u8,
    quantity: u8,
    anim_id: u16,
    unknown2: u8,
    hue: u8,
    unknown3: u16,
    height: u8,
    name: [u8; 20],
}

/// Metadata for a land (terrain) tile.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct LandTileInfo {
    /// Behavior flags
    pub flags: TileFlags,
    /// Map texture drawn when the tile is stretched
    pub texture_id: u16,
    /// Display name
    pub name: String,
}

/// Metadata for a static (item) tile.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct StaticTileInfo {
    /// Behavior flags
    pub flags: TileFlags,
    /// Weight in stones, `255` when immovable
    pub weight: u8,
    /// Layer for wearables, light id for light sources
    pub quality: u8,
    /// Stack amount, or armor/weapon class
    pub quantity: u8,
    /// Gump/body animation for wearables
    pub anim_id: u16,
    /// Hue id
    pub hue: u8,
    /// Height in z units
    pub height: u8,
    /// Display name
    pub name: String,
}

impl StaticTileInfo {
    /// Whether the item has an animdata frame sequence.
    #[inline]
    pub fn animation(&self) -> bool {
        self.flags.contains(TileFlags::ANIMATION)
    }
}

impl From<LandTileRaw> for LandTileInfo {
    fn from(raw: LandTileRaw) -> Self {
        Self {
            flags: TileFlags::from_bits_retain(raw.flags),
            texture_id: raw.texture,
            name: fixed_name(&raw.name),
        }
    }
}

impl From<StaticTileRaw> for StaticTileInfo {
    fn from(raw: StaticTileRaw) -> Self {
        Self {
            flags: TileFlags::from_bits_retain(raw.flags),
            weight: raw.weight,
            quality: raw.quality,
            quantity: raw.quantity,
            anim_id: raw.anim_id,
            hue: raw.hue,
            height: raw.height,
            name: fixed_name(&raw.name),
        }
    }
}

/// Decoded `tiledata.mul`.
#[derive(Debug, Clone, Default)]
pub struct TileDataLoader {
    land: Vec<LandTileInfo>,
    statics: Vec<StaticTileInfo>,
}

impl TileDataLoader {
    /// Load and decode the whole file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = MappedFile::open(path)?;
        let loader = Self::parse(file.bytes());

        if loader.land.len() < LAND_TILE_COUNT {
            tracing::warn!(
                "{} is truncated: only {} of {} land tiles present",
                file.path().display(),
                loader.land.len(),
                LAND_TILE_COUNT
            );
        }

        Ok(loader)
    }

    /// Decode tile data from bytes. Incomplete trailing groups are dropped.
    pub fn parse(data: &[u8]) -> Self {
        let mut reader = BinaryReader::new(data);

        let mut land = Vec::with_capacity(LAND_TILE_COUNT);
        for _ in 0..LAND_GROUP_COUNT {
            if reader.remaining() < LAND_GROUP_SIZE {
                break;
            }
            reader.advance(GROUP_HEADER_SIZE);
            for _ in 0..TILES_PER_GROUP {
                match reader.read_struct::<LandTileRaw>() {
                    Ok(raw) => land.push(raw.into()),
                    Err(_) => break,
                }
            }
        }

        let mut statics = Vec::with_capacity(reader.remaining() / STATIC_GROUP_SIZE * TILES_PER_GROUP);
        while reader.remaining() >= STATIC_GROUP_SIZE {
            reader.advance(GROUP_HEADER_SIZE);
            for _ in 0..TILES_PER_GROUP {
                match reader.read_struct::<StaticTileRaw>() {
                    Ok(raw) => statics.push(raw.into()),
                    Err(_) => break,
                }
            }
        }

        Self { land, statics }
    }

    /// Land tile metadata by land id.
    #[inline]
    pub fn land_tile_info(&self, id: u32) -> Option<&LandTileInfo> {
        self.land.get(id as usize)
    }

    /// Static tile metadata by art id.
    #[inline]
    pub fn static_tile_info(&self, id: u32) -> Option<&StaticTileInfo> {
        self.statics.get(id as usize)
    }

    /// Number of land tiles.
    #[inline]
    pub fn land_count(&self) -> usize {
        self.land.len()
    }

    /// Number of static tiles.
    #[inline]
    pub fn static_count(&self) -> usize {
        self.statics.len()
    }
}
