//! Land and item art (`artidx.mul` + `art.mul`).
//!
//! Ids below [`ITEM_ART_BASE`] are 44x44 land diamonds stored as raw pixel
//! rows; ids at or above it are run-length encoded item images.

use mulberry_common::{BinaryReader, Image};
use mulberry_index::{FileCatalog, IndexedRecordStore, RecordSource};

use crate::Result;

/// First record id of item art.
pub const ITEM_ART_BASE: u32 = 0x4000;
/// Width and height of a land tile.
pub const LAND_TILE_SIZE: u32 = 44;

const MAX_ITEM_DIMENSION: u16 = 1024;

/// Art record access and decoding.
#[derive(Debug)]
pub struct ArtLoader {
    store: IndexedRecordStore,
}

impl ArtLoader {
    /// Wrap an opened art store.
    pub fn new(store: IndexedRecordStore) -> Self {
        Self { store }
    }

    /// Open `artidx.mul`/`art.mul` from the catalog.
    pub fn from_catalog(catalog: &FileCatalog) -> Result<Self> {
        Ok(Self::new(IndexedRecordStore::from_catalog(
            catalog,
            "artidx.mul",
            "art.mul",
        )?))
    }

    /// The underlying record store.
    pub fn store(&self) -> &IndexedRecordStore {
        &self.store
    }

    /// Decode a land tile diamond.
    pub fn land_tile(&self, id: u32) -> Option<Image> {
        if id >= ITEM_ART_BASE {
            return None;
        }
        let bytes = self.store.read_bytes(id)?;
        let image = decode_land(bytes);
        if image.is_none() {
            tracing::warn!("Land art {} is truncated ({} bytes)", id, bytes.len());
        }
        image
    }

    /// Decode an item image by item art id (without the `0x4000` base).
    pub fn item(&self, art_id: u32) -> Option<Image> {
        let id = art_id.checked_add(ITEM_ART_BASE)?;
        let bytes = self.store.read_bytes(id)?;
        let image = decode_item(bytes);
        if image.is_none() {
            tracing::warn!("Item art {} is corrupt ({} bytes)", art_id, bytes.len());
        }
        image
    }
}

/// Decode a 44x44 land diamond.
///
/// Row widths grow by two pixels per row to the middle, then shrink.
pub fn decode_land(bytes: &[u8]) -> Option<Image> {
    let mut image = Image::new(LAND_TILE_SIZE, LAND_TILE_SIZE);
    let mut reader = BinaryReader::new(bytes);

    let half = LAND_TILE_SIZE / 2;
    for y in 0..LAND_TILE_SIZE {
        let (x_start, width) = if y < half {
            (half - 1 - y, (y + 1) * 2)
        } else {
            (y - half, (LAND_TILE_SIZE - y) * 2)
        };
        for x in x_start..x_start + width {
            image.set_opaque(x, y, reader.read_u16().ok()?);
        }
    }

    Some(image)
}

/// Decode a run-length encoded item image.
pub fn decode_item(bytes: &[u8]) -> Option<Image> {
    let mut reader = BinaryReader::new(bytes);
    reader.advance(4); // header
    let width = reader.read_u16().ok()?;
    let height = reader.read_u16().ok()?;

    if width == 0 || height == 0 || width > MAX_ITEM_DIMENSION || height > MAX_ITEM_DIMENSION {
        return None;
    }

    let lookup = reader.read_bytes(height as usize * 2).ok()?;
    let data_start = reader.position();
    let mut image = Image::new(width as u32, height as u32);

    for (y, row) in lookup.chunks_exact(2).enumerate() {
        let row_offset = u16::from_le_bytes([row[0], row[1]]) as usize * 2;
        reader.seek(data_start + row_offset);

        let mut x = 0u32;
        loop {
            let x_offset = reader.read_u16().ok()?;
            let run = reader.read_u16().ok()?;
            if x_offset == 0 && run == 0 {
                break;
            }
            x += x_offset as u32;
            for _ in 0..run {
                image.set_opaque(x, y as u32, reader.read_u16().ok()?);
                x += 1;
            }
        }
    }

    Some(image)
}

#[cfg(test)]
mod tests {
    use byteorder::{LittleEndian, WriteBytesExt};

    use super::*;

    #[test]
    fn test_decode_land_shape() {
        let bytes = vec![0u8; 1012 * 2];
        let image = decode_land(&bytes).unwrap();

        // Top row covers only the two middle pixels.
        assert_eq!(image.pixel(20, 0), Some(0));
        assert_eq!(image.pixel(21, 0), Some(0x8000));
        assert_eq!(image.pixel(22, 0), Some(0x8000));
        assert_eq!(image.pixel(23, 0), Some(0));
        // Widest rows span the full tile.
        assert_eq!(image.pixel(0, 21), Some(0x8000));
        assert_eq!(image.pixel(43, 22), Some(0x8000));
        assert_eq!(image.pixel(21, 43), Some(0x8000));
        assert_eq!(image.pixel(20, 43), Some(0));

        assert!(decode_land(&bytes[..2000]).is_none());
    }

    #[test]
    fn test_decode_item() {
        let mut bytes = Vec::new();
        bytes.write_u32::<LittleEndian>(0).unwrap();
        bytes.write_u16::<LittleEndian>(4).unwrap(); // width
        bytes.write_u16::<LittleEndian>(2).unwrap(); // height
        bytes.write_u16::<LittleEndian>(0).unwrap(); // row 0 at word 0
        bytes.write_u16::<LittleEndian>(6).unwrap(); // row 1 at word 6
        // Row 0: skip 1, draw 2 pixels, end.
        // Row 1: skip 3, draw 1 pixel, end.
        for v in [1u16, 2, 0x1111, 0x2222, 0, 0, 3, 1, 0x3333, 0, 0] {
            bytes.write_u16::<LittleEndian>(v).unwrap();
        }

        let image = decode_item(&bytes).unwrap();
        assert_eq!(image.width(), 4);
        assert_eq!(image.height(), 2);
        assert_eq!(image.pixel(0, 0), Some(0));
        assert_eq!(image.pixel(1, 0), Some(0x9111));
        assert_eq!(image.pixel(2, 0), Some(0xA222));
        assert_eq!(image.pixel(3, 1), Some(0xB333));
    }

    #[test]
    fn test_decode_item_rejects_bad_dimensions() {
        let mut bytes = Vec::new();
        bytes.write_u32::<LittleEndian>(0).unwrap();
        bytes.write_u16::<LittleEndian>(0).unwrap();
        bytes.write_u16::<LittleEndian>(10).unwrap();
        assert!(decode_item(&bytes).is_none());
        assert!(decode_item(&[1, 2, 3]).is_none());
    }
}
