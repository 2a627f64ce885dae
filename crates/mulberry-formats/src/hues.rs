//! Hue palettes (`hues.mul`).
//!
//! Groups of eight hues, each group preceded by a 4-byte header. Hue id `0`
//! means "unhued" in the game protocol, so hue `n` is stored at index `n - 1`.

use std::path::Path;

use mulberry_common::{fixed_name, BinaryReader, MappedFile};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::Result;

const HUES_PER_GROUP: usize = 8;
const GROUP_HEADER_SIZE: usize = 4;
const GROUP_SIZE: usize = GROUP_HEADER_SIZE + HUES_PER_GROUP * std::mem::size_of::<HueRaw>();

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
struct HueRaw {
    colors: [u16; 32],
    table_start: u16,
    table_end: u16,
    name: [u8; 20],
}

/// A 32-step color ramp.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Hue {
    /// ARGB1555 colors from darkest to brightest
    pub colors: [u16; 32],
    /// First color of the hue's gradient table
    pub table_start: u16,
    /// Last color of the hue's gradient table
    pub table_end: u16,
    /// Display name
    pub name: String,
}

impl Hue {
    /// Recolor a gray-scale ARGB1555 pixel with this hue.
    ///
    /// The red channel (5 bits) selects the ramp entry; alpha is kept.
    #[inline]
    pub fn apply(&self, pixel: u16) -> u16 {
        let step = ((pixel >> 10) & 0x1F) as usize;
        (self.colors[step] & 0x7FFF) | (pixel & 0x8000)
    }
}

impl From<HueRaw> for Hue {
    fn from(raw: HueRaw) -> Self {
        Self {
            colors: raw.colors,
            table_start: raw.table_start,
            table_end: raw.table_end,
            name: fixed_name(&raw.name),
        }
    }
}

/// Decoded `hues.mul`.
#[derive(Debug, Clone, Default)]
pub struct HuesLoader {
    hues: Vec<Hue>,
}

impl HuesLoader {
    /// Load and decode the whole file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = MappedFile::open(path)?;
        Ok(Self::parse(file.bytes()))
    }

    /// Decode hues from bytes. Incomplete trailing groups are dropped.
    pub fn parse(data: &[u8]) -> Self {
        let mut reader = BinaryReader::new(data);
        let mut hues = Vec::with_capacity(data.len() / GROUP_SIZE * HUES_PER_GROUP);

        while reader.remaining() >= GROUP_SIZE {
            reader.advance(GROUP_HEADER_SIZE);
            for _ in 0..HUES_PER_GROUP {
                match reader.read_struct::<HueRaw>() {
                    Ok(raw) => hues.push(raw.into()),
                    Err(_) => break,
                }
            }
        }

        Self { hues }
    }

    /// Hue by protocol id (1-based). Id `0` is "no hue" and returns `None`.
    #[inline]
    pub fn hue(&self, id: u32) -> Option<&Hue> {
        let index = id.checked_sub(1)?;
        self.hues.get(index as usize)
    }

    /// Number of hues.
    #[inline]
    pub fn len(&self) -> usize {
        self.hues.len()
    }

    /// Whether the file contained no complete group.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.hues.is_empty()
    }
}
