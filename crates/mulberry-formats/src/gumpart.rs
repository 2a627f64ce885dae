//! Gump (UI) art (`gumpidx.mul` + `gumpart.mul`).
//!
//! The index slot's extra value carries the image size as
//! `width << 16 | height`. Each record starts with one `u32` word offset per
//! row, followed by `(color, run)` pairs; color `0` is transparent.

use mulberry_common::{BinaryReader, Image};
use mulberry_index::{FileCatalog, IndexedRecordStore, RecordSource};

use crate::Result;

/// Largest gump edge accepted from an index slot. Anything bigger is a
/// corrupt slot, not a real image.
const MAX_GUMP_DIMENSION: u32 = 4096;

/// Gump record access and decoding.
#[derive(Debug)]
pub struct GumpArtLoader {
    store: IndexedRecordStore,
}

impl GumpArtLoader {
    /// Wrap an opened gump store.
    pub fn new(store: IndexedRecordStore) -> Self {
        Self { store }
    }

    /// Open `gumpidx.mul`/`gumpart.mul` from the catalog.
    pub fn from_catalog(catalog: &FileCatalog) -> Result<Self> {
        Ok(Self::new(IndexedRecordStore::from_catalog(
            catalog,
            "gumpidx.mul",
            "gumpart.mul",
        )?))
    }

    /// Size of a gump without decoding it. `None` when the slot is unused
    /// or its size is out of range.
    pub fn dimensions(&self, id: u32) -> Option<(u32, u32)> {
        let location = self.store.locate(id)?;
        let extra = location.extra as u32;
        let (width, height) = (extra >> 16, extra & 0xFFFF);
        if !valid_dimensions(width, height) {
            tracing::warn!("Gump {} has corrupt size {}x{}", id, width, height);
            return None;
        }
        Some((width, height))
    }

    /// Decode a gump image.
    pub fn get(&self, id: u32) -> Option<Image> {
        let (width, height) = self.dimensions(id)?;
        let bytes = self.store.read_bytes(id)?;
        let image = decode_gump(bytes, width, height);
        if image.is_none() {
            tracing::warn!("Gump {} is corrupt ({}x{}, {} bytes)", id, width, height, bytes.len());
        }
        image
    }
}

/// Decode a gump record of known size.
pub fn decode_gump(bytes: &[u8], width: u32, height: u32) -> Option<Image> {
    if !valid_dimensions(width, height) {
        return None;
    }

    let mut reader = BinaryReader::new(bytes);
    let lookup = reader.read_bytes(height as usize * 4).ok()?;
    let mut image = Image::new(width, height);

    for (y, row) in lookup.chunks_exact(4).enumerate() {
        let start = u32::from_le_bytes([row[0], row[1], row[2], row[3]]) as usize * 4;
        reader.seek(start);

        let mut x = 0u32;
        while x < width {
            let color = reader.read_u16().ok()?;
            let run = reader.read_u16().ok()? as u32;
            if run == 0 {
                return None;
            }
            if color != 0 {
                for i in x..(x + run).min(width) {
                    image.set_opaque(i, y as u32, color);
                }
            }
            x += run;
        }
    }

    Some(image)
}

#[inline]
fn valid_dimensions(width: u32, height: u32) -> bool {
    (1..=MAX_GUMP_DIMENSION).contains(&width) && (1..=MAX_GUMP_DIMENSION).contains(&height)
}
