//! Stretched terrain textures (`texidx.mul` + `texmaps.mul`).

use mulberry_common::{BinaryReader, Image};
use mulberry_index::{FileCatalog, IndexedRecordStore, RecordSource};

use crate::Result;

const SMALL_TEXTURE_BYTES: u32 = 64 * 64 * 2;

/// Map texture access and decoding.
#[derive(Debug)]
pub struct MapTexLoader {
    store: IndexedRecordStore,
}

impl MapTexLoader {
    /// Wrap an opened texture store.
    pub fn new(store: IndexedRecordStore) -> Self {
        Self { store }
    }

    /// Open `texidx.mul`/`texmaps.mul` from the catalog.
    pub fn from_catalog(catalog: &FileCatalog) -> Result<Self> {
        Ok(Self::new(IndexedRecordStore::from_catalog(
            catalog,
            "texidx.mul",
            "texmaps.mul",
        )?))
    }

    /// Decode a texture: 64x64 for small records, 128x128 otherwise.
    pub fn get(&self, id: u32) -> Option<Image> {
        let bytes = self.store.read_bytes(id)?;
        let size = if bytes.len() as u32 == SMALL_TEXTURE_BYTES { 64 } else { 128 };

        let mut image = Image::new(size, size);
        let mut reader = BinaryReader::new(bytes);
        for y in 0..size {
            for x in 0..size {
                let Ok(color) = reader.read_u16() else {
                    tracing::warn!("Map texture {} is truncated ({} bytes)", id, bytes.len());
                    return None;
                };
                image.set_opaque(x, y, color);
            }
        }
        Some(image)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use byteorder::{LittleEndian, WriteBytesExt};

    use super::*;

    #[test]
    fn test_texture_sizes() {
        let dir = tempfile::tempdir().unwrap();
        let small = vec![0x11u8; SMALL_TEXTURE_BYTES as usize];
        let large = vec![0x22u8; 128 * 128 * 2];
        let mut idx = Vec::new();
        for (offset, length) in [(0, small.len()), (small.len(), large.len()), (0, 100)] {
            idx.write_i32::<LittleEndian>(offset as i32).unwrap();
            idx.write_i32::<LittleEndian>(length as i32).unwrap();
            idx.write_i32::<LittleEndian>(0).unwrap();
        }
        fs::write(dir.path().join("texidx.mul"), idx).unwrap();
        fs::write(dir.path().join("texmaps.mul"), [small, large].concat()).unwrap();

        let catalog = FileCatalog::build(dir.path(), None).unwrap();
        let textures = MapTexLoader::from_catalog(&catalog).unwrap();

        let image = textures.get(0).unwrap();
        assert_eq!((image.width(), image.height()), (64, 64));
        assert_eq!(image.pixel(63, 63), Some(0x9111));
        assert_eq!(textures.get(1).unwrap().width(), 128);
        // Too short for a 128x128 texture.
        assert!(textures.get(2).is_none());
        assert!(textures.get(3).is_none());
    }
}
