//! Terrain planes (`map#.mul`, optionally patched by `mapdifl#`/`mapdif#`).
//!
//! A plane is a grid of 8x8-cell blocks stored column-major: block
//! `(bx, by)` is record `bx * block_height + by`. Each 196-byte record is a
//! 4-byte header followed by 64 `(tile id, z)` cells in row-major order.

use std::path::Path;

use mulberry_common::BinaryReader;
use mulberry_index::{FixedRecordStore, PatchOverlay, RecordSource};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::{Error, Result};

/// Cells along one edge of a block.
pub const BLOCK_EDGE: u32 = 8;
/// Cells per block.
pub const CELLS_PER_BLOCK: usize = (BLOCK_EDGE * BLOCK_EDGE) as usize;
/// Size of one map block record.
pub const MAP_BLOCK_SIZE: u32 = 4 + CELLS_PER_BLOCK as u32 * 3;

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
struct MapCellRaw {
    tile_id: u16,
    z: i8,
}

/// One terrain cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct MapCell {
    /// Land tile id
    pub tile_id: u16,
    /// Height
    pub z: i8,
}

/// An 8x8 block of terrain cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapBlock {
    cells: [MapCell; CELLS_PER_BLOCK],
}

impl Default for MapBlock {
    fn default() -> Self {
        Self {
            cells: [MapCell::default(); CELLS_PER_BLOCK],
        }
    }
}

impl MapBlock {
    /// Decode a block record. Returns `None` if the record is too short.
    pub fn parse(bytes: &[u8]) -> Option<Self> {
        let mut reader = BinaryReader::new(bytes);
        reader.advance(4); // header

        let mut block = Self::default();
        for cell in block.cells.iter_mut() {
            let raw: MapCellRaw = reader.read_struct().ok()?;
            *cell = MapCell {
                tile_id: raw.tile_id,
                z: raw.z,
            };
        }
        Some(block)
    }

    /// Cell at block-local `(x, y)`, both in `0..8`.
    #[inline]
    pub fn cell(&self, x: u32, y: u32) -> Option<MapCell> {
        if x >= BLOCK_EDGE || y >= BLOCK_EDGE {
            return None;
        }
        Some(self.cells[(y * BLOCK_EDGE + x) as usize])
    }

    /// All cells in row-major order.
    #[inline]
    pub fn cells(&self) -> &[MapCell; CELLS_PER_BLOCK] {
        &self.cells
    }
}

/// One terrain plane.
#[derive(Debug)]
pub struct MapLoader {
    blocks: PatchOverlay<FixedRecordStore>,
    block_width: u32,
    block_height: u32,
}

impl MapLoader {
    /// Open an unpatched plane of `block_width` x `block_height` blocks.
    pub fn open<P: AsRef<Path>>(path: P, block_width: u32, block_height: u32) -> Result<Self> {
        check_grid(block_width, block_height)?;
        let base = FixedRecordStore::open(path, MAP_BLOCK_SIZE)?;
        Ok(Self::with_overlay(
            PatchOverlay::passthrough(base),
            block_width,
            block_height,
        ))
    }

    /// Open a plane with its `mapdifl`/`mapdif` patch pair.
    pub fn open_patched<P, L, D>(
        path: P,
        dif_list: L,
        dif: D,
        block_width: u32,
        block_height: u32,
    ) -> Result<Self>
    where
        P: AsRef<Path>,
        L: AsRef<Path>,
        D: AsRef<Path>,
    {
        check_grid(block_width, block_height)?;
        let base = FixedRecordStore::open(path, MAP_BLOCK_SIZE)?;
        let records = FixedRecordStore::open(dif, MAP_BLOCK_SIZE)?;
        let overlay =
            PatchOverlay::with_patch(base, dif_list, records, block_width * block_height)?;
        Ok(Self::with_overlay(overlay, block_width, block_height))
    }

    fn with_overlay(
        blocks: PatchOverlay<FixedRecordStore>,
        block_width: u32,
        block_height: u32,
    ) -> Self {
        let expected = block_width as u64 * block_height as u64;
        if (blocks.base().record_count() as u64) < expected {
            tracing::warn!(
                "Map {} holds {} blocks, configured grid needs {}",
                blocks.base().data().path().display(),
                blocks.base().record_count(),
                expected
            );
        }
        Self {
            blocks,
            block_width,
            block_height,
        }
    }

    /// Blocks along the x axis.
    #[inline]
    pub fn block_width(&self) -> u32 {
        self.block_width
    }

    /// Blocks along the y axis.
    #[inline]
    pub fn block_height(&self) -> u32 {
        self.block_height
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

    /// Decode block `(bx, by)`. Absent or corrupt blocks decode to the
    /// default (all-zero) block.
    pub fn block(&self, bx: u32, by: u32) -> MapBlock {
        if bx >= self.block_width || by >= self.block_height {
            tracing::warn!(
                "Map block ({}, {}) outside {}x{} grid",
                bx,
                by,
                self.block_width,
                self.block_height
            );
            return MapBlock::default();
        }

        let id = bx * self.block_height + by;
        match self.blocks.read_bytes(id) {
            Some(bytes) => MapBlock::parse(bytes).unwrap_or_else(|| {
                tracing::warn!("Map block {} is truncated ({} bytes)", id, bytes.len());
                MapBlock::default()
            }),
            None => MapBlock::default(),
        }
    }

    /// Terrain cell at world coordinates.
    pub fn cell(&self, x: u32, y: u32) -> MapCell {
        self.block(x / BLOCK_EDGE, y / BLOCK_EDGE)
            .cell(x % BLOCK_EDGE, y % BLOCK_EDGE)
            .unwrap_or_default()
    }
}

pub(crate) fn check_grid(width: u32, height: u32) -> Result<()> {
    if width == 0 || height == 0 || width.checked_mul(height).is_none() {
        return Err(Error::InvalidGrid { width, height });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use byteorder::{LittleEndian, WriteBytesExt};

    use super::*;

    /// A block whose cells all carry `tile` and height `z`.
    fn block_bytes(tile: u16, z: i8) -> Vec<u8> {
        let mut out = Vec::new();
        out.write_u32::<LittleEndian>(0).unwrap();
        for i in 0..CELLS_PER_BLOCK {
            out.write_u16::<LittleEndian>(tile + i as u16).unwrap();
            out.write_i8(z).unwrap();
        }
        out
    }

    #[test]
    fn test_block_size() {
        assert_eq!(MAP_BLOCK_SIZE, 196);
        assert_eq!(block_bytes(0, 0).len(), 196);
    }

    #[test]
    fn test_column_major_blocks() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("map0.mul");
        // 2x3 grid: block (bx, by) gets tile base 1000 * id.
        let mut data = Vec::new();
        for id in 0..6u16 {
            data.extend(block_bytes(id * 1000, id as i8));
        }
        fs::write(&path, data).unwrap();

        let map = MapLoader::open(&path, 2, 3).unwrap();

        assert_eq!(map.block_count(), 6);
        // (1, 2) -> id 1 * 3 + 2 = 5
        let block = map.block(1, 2);
        assert_eq!(block.cell(0, 0), Some(MapCell { tile_id: 5000, z: 5 }));
        assert_eq!(block.cell(1, 1).unwrap().tile_id, 5009);
        assert_eq!(block.cell(8, 0), None);

        // World (9, 17) -> block (1, 2), local (1, 1)
        assert_eq!(map.cell(9, 17).tile_id, 5009);
    }

    #[test]
    fn test_absent_blocks_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("map0.mul");
        fs::write(&path, block_bytes(7, 1)).unwrap();

        // Grid claims 4 blocks but only one is present.
        let map = MapLoader::open(&path, 2, 2).unwrap();

        assert_eq!(map.block(0, 0).cell(0, 0).unwrap().tile_id, 7);
        assert_eq!(map.block(1, 1), MapBlock::default());
        assert_eq!(map.block(5, 5), MapBlock::default());
        assert_eq!(map.cell(1000, 1000), MapCell::default());
    }

    #[test]
    fn test_patched_blocks() {
        let dir = tempfile::tempdir().unwrap();
        let map = dir.path().join("map1.mul");
        let difl = dir.path().join("mapdifl1.mul");
        let dif = dir.path().join("mapdif1.mul");

        let mut data = block_bytes(1, 0);
        data.extend(block_bytes(2, 0));
        fs::write(&map, data).unwrap();
        let mut list = Vec::new();
        list.write_u32::<LittleEndian>(1).unwrap();
        fs::write(&difl, list).unwrap();
        fs::write(&dif, block_bytes(99, -5)).unwrap();

        let loader = MapLoader::open_patched(&map, &difl, &dif, 1, 2).unwrap();

        assert_eq!(loader.patched_block_count(), 1);
        assert_eq!(loader.block(0, 0).cell(0, 0).unwrap().tile_id, 1);
        assert_eq!(
            loader.block(0, 1).cell(0, 0),
            Some(MapCell { tile_id: 99, z: -5 })
        );
    }

    #[test]
    fn test_invalid_grid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("map0.mul");
        fs::write(&path, b"").unwrap();

        assert!(matches!(
            MapLoader::open(&path, 0, 10),
            Err(Error::InvalidGrid { .. })
        ));
    }
}
