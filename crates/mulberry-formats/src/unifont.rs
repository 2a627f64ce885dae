//! Unicode bitmap fonts (`unifont#.mul`).
//!
//! The file starts with a `u32` offset per code point of the basic
//! multilingual plane. Glyphs are decoded lazily from the mapped file.

use std::path::Path;

use mulberry_common::{BinaryReader, MappedFile};

use crate::Result;

/// Code points covered by one font file.
pub const GLYPH_TABLE_LEN: usize = 0x10000;

/// One decoded glyph: a 1-bit mask with its placement offsets.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Glyph {
    /// Horizontal offset from the pen position
    pub x_offset: i8,
    /// Vertical offset from the top of the line
    pub y_offset: i8,
    /// Width in pixels
    pub width: u8,
    /// Height in pixels
    pub height: u8,
    /// `ceil(width / 8)` bytes per row, most significant bit first
    rows: Vec<u8>,
}

impl Glyph {
    fn parse(reader: &mut BinaryReader<'_>) -> Option<Self> {
        let x_offset = reader.read_i8().ok()?;
        let y_offset = reader.read_i8().ok()?;
        let width = reader.read_u8().ok()?;
        let height = reader.read_u8().ok()?;
        let len = (width as usize).div_ceil(8) * height as usize;
        let rows = reader.read_bytes(len).ok()?.to_vec();
        Some(Self {
            x_offset,
            y_offset,
            width,
            height,
            rows,
        })
    }

    #[inline]
    fn stride(&self) -> usize {
        (self.width as usize).div_ceil(8)
    }

    /// Whether the pixel at `(x, y)` is set.
    pub fn is_set(&self, x: u32, y: u32) -> bool {
        if x >= self.width as u32 || y >= self.height as u32 {
            return false;
        }
        let byte = self.rows[y as usize * self.stride() + x as usize / 8];
        byte & (0x80 >> (x % 8)) != 0
    }

    /// Raw bit rows.
    #[inline]
    pub fn rows(&self) -> &[u8] {
        &self.rows
    }
}

/// One font file.
#[derive(Debug)]
pub struct UniFontLoader {
    file: MappedFile,
}

impl UniFontLoader {
    /// Map a font file. A file shorter than the glyph table is accepted with a
    /// warning; code points past its end have no glyph.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = MappedFile::open(path)?;
        if (file.len() as usize) < GLYPH_TABLE_LEN * 4 {
            tracing::warn!(
                "Font {} is shorter than its glyph table ({} bytes)",
                file.path().display(),
                file.len()
            );
        }
        Ok(Self { file })
    }

    /// Decode the glyph for `ch`. Characters outside the font, and glyphs
    /// whose data runs past the end of the file, have no glyph.
    pub fn glyph(&self, ch: char) -> Option<Glyph> {
        let code = ch as usize;
        if code >= GLYPH_TABLE_LEN {
            return None;
        }

        let bytes = self.file.bytes();
        let offset = BinaryReader::new_at(bytes, code * 4).read_u32().ok()?;
        if offset == 0 || offset == u32::MAX {
            return None;
        }

        let glyph = Glyph::parse(&mut BinaryReader::new_at(bytes, offset as usize));

        if glyph.is_none() {
            tracing::warn!(
                "Glyph U+{:04X} in {} is truncated",
                code,
                self.file.path().display()
            );
        }
        glyph
    }

    /// Width in pixels of `text` as laid out by consecutive glyphs.
    pub fn text_width(&self, text: &str) -> u32 {
        text.chars()
            .filter_map(|ch| self.glyph(ch))
            .map(|g| (g.x_offset as i32 + g.width as i32).max(0) as u32)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use byteorder::{LittleEndian, WriteBytesExt};

    use super::*;

    fn font_bytes() -> Vec<u8> {
        let table = GLYPH_TABLE_LEN * 4;
        let mut out = vec![0u8; table];
        let glyph_at = table as u32;
        out[b'A' as usize * 4..b'A' as usize * 4 + 4].copy_from_slice(&glyph_at.to_le_bytes());
        out[b'B' as usize * 4..b'B' as usize * 4 + 4].copy_from_slice(&u32::MAX.to_le_bytes());
        // 'C' points at a glyph whose rows are cut off.
        let truncated = glyph_at + 4 + 4;
        out[b'C' as usize * 4..b'C' as usize * 4 + 4].copy_from_slice(&truncated.to_le_bytes());

        // 'A': 10x2 at (1, -2).
        out.write_i8(1).unwrap();
        out.write_i8(-2).unwrap();
        out.write_u8(10).unwrap();
        out.write_u8(2).unwrap();
        out.write_u16::<LittleEndian>(0x4080).unwrap(); // row 0: 0x80, 0x40
        out.write_u16::<LittleEndian>(0x0001).unwrap(); // row 1: 0x01, 0x00
        // 'C' header only.
        out.extend_from_slice(&[0, 0, 8, 8]);
        out
    }

    #[test]
    fn test_glyphs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("unifont.mul");
        fs::write(&path, font_bytes()).unwrap();

        let font = UniFontLoader::open(&path).unwrap();

        let a = font.glyph('A').unwrap();
        assert_eq!((a.x_offset, a.y_offset, a.width, a.height), (1, -2, 10, 2));
        assert!(a.is_set(0, 0));
        assert!(!a.is_set(1, 0));
        assert!(a.is_set(9, 0));
        assert!(a.is_set(7, 1));
        assert!(!a.is_set(10, 0));

        assert!(font.glyph('B').is_none());
        assert!(font.glyph('C').is_none());
        assert!(font.glyph('D').is_none());
        assert!(font.glyph('\u{1F600}').is_none());
        assert_eq!(font.text_width("AAB"), 22);
    }
}
