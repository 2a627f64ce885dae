//! Static objects placed on a plane (`staidx#.mul` + `statics#.mul`).
//!
//! Records follow the same column-major block numbering as the terrain
//! plane. Patches come as a `stadifl#` block list with a `stadifi#`/`stadif#`
//! index and data pair.

use std::path::Path;

use mulberry_common::BinaryReader;
use mulberry_index::{IndexedRecordStore, PatchOverlay, RecordSource};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::map::check_grid;
use crate::Result;

/// Size of one static entry.
pub const STATIC_ENTRY_SIZE: usize = 7;

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
struct StaticRaw {
    art_id: u16,
    x: u8,
    y: u8,
    z: i8,
    hue: u16,
}

/// A static object inside a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct StaticItem {
    /// Item art id
    pub art_id: u16,
    /// Block-local x in `0..8`
    pub x: u8,
    /// Block-local y in `0..8`
    pub y: u8,
    /// Altitude
    pub z: i8,
    /// Hue id, `0` for the item's own colors
    pub hue: u16,
}

impl From<StaticRaw> for StaticItem {
    fn from(raw: StaticRaw) -> Self {
        Self {
            art_id: raw.art_id,
            x: raw.x,
            y: raw.y,
            z: raw.z,
            hue: raw.hue,
        }
    }
}

/// Statics of one plane.
#[derive(Debug)]
pub struct StaticsLoader {
    blocks: PatchOverlay<IndexedRecordStore>,
    block_width: u32,
    block_height: u32,
}

impl StaticsLoader {
    /// Open unpatched statics for a `block_width` x `block_height` plane.
    pub fn open<P, Q>(index: P, data: Q, block_width: u32, block_height: u32) -> Result<Self>
    where
        P: AsRef<Path>,
        Q: AsRef<Path>,
    {
        check_grid(block_width, block_height)?;
        let base = IndexedRecordStore::open(index, data)?;
        Ok(Self {
            blocks: PatchOverlay::passthrough(base),
            block_width,
            block_height,
        })
    }

    /// Open statics with their `stadifl`/`stadifi`/`stadif` patch set.
    pub fn open_patched<P, Q>(
        index: P,
        data: Q,
        dif_list: &Path,
        dif_index: &Path,
        dif_data: &Path,
        block_width: u32,
        block_height: u32,
    ) -> Result<Self>
    where
        P: AsRef<Path>,
        Q: AsRef<Path>,
    {
        check_grid(block_width, block_height)?;
        let base = IndexedRecordStore::open(index, data)?;
        let records = IndexedRecordStore::open(dif_index, dif_data)?;
        Ok(Self {
            blocks: PatchOverlay::with_patch(
                base,
                dif_list,
                records,
                block_width * block_height,
            )?,
            block_width,
            block_height,
        })
    }

    /// Total configured blocks.
    #[inline]
    pub fn block_count(&self) -> u32 {
        self.block_width * self.block_height
    }

    /// Number of blocks replaced by patches.
    #[inline]
    pub fn patched_block_count(&self) -> usize {
        self.blocks.patched_block_count()
    }

    /// Static objects of block `(bx, by)`. Empty when the block has none,
    /// lies outside the plane, or a patch removed them.
    pub fn block(&self, bx: u32, by: u32) -> Vec<StaticItem> {
        if bx >= self.block_width || by >= self.block_height {
            tracing::warn!(
                "Statics block ({}, {}) outside {}x{} grid",
                bx,
                by,
                self.block_width,
                self.block_height
            );
            return Vec::new();
        }

        let id = bx * self.block_height + by;
        let Some(bytes) = self.blocks.read_bytes(id) else {
            return Vec::new();
        };

        if bytes.len() % STATIC_ENTRY_SIZE != 0 {
            tracing::warn!(
                "Statics block {} has {} trailing bytes",
                id,
                bytes.len() % STATIC_ENTRY_SIZE
            );
        }

        let mut reader = BinaryReader::new(bytes);
        let mut items = Vec::with_capacity(bytes.len() / STATIC_ENTRY_SIZE);
        while let Ok(raw) = reader.read_struct::<StaticRaw>() {
            items.push(raw.into());
        }
        items
    }
}
