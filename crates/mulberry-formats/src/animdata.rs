//! Item animation sequences (`animdata.mul`).
//!
//! Each animated item (tile flag `ANIMATION`) has an entry listing art id
//! offsets to cycle through. Entries come in groups of eight with a 4-byte
//! group header; art id `n` lives in group `n / 8`, slot `n % 8`.

use std::path::Path;

use mulberry_common::{BinaryReader, MappedFile};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::Result;

const ENTRIES_PER_GROUP: usize = 8;
const GROUP_HEADER_SIZE: usize = 4;
const GROUP_SIZE: usize =
    GROUP_HEADER_SIZE + ENTRIES_PER_GROUP * std::mem::size_of::<AnimDataRaw>();

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
struct AnimDataRaw {
    frames: [i8; 64],
    unknown: u8,
    frame_count: u8,
    frame_interval: u8,
    start_interval: u8,
}

/// An item's frame sequence.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct AnimDataInfo {
    /// Art id offsets relative to the base item, one per frame
    pub frames: Vec<i8>,
    /// Frame delay in 100ms ticks
    pub frame_interval: u8,
    /// Delay before the first frame, in 100ms ticks
    pub start_interval: u8,
}

impl AnimDataInfo {
    /// Art ids of every frame for the item `base_art_id`.
    pub fn frame_art_ids(&self, base_art_id: u32) -> impl Iterator<Item = u32> + '_ {
        self.frames
            .iter()
            .map(move |&offset| base_art_id.wrapping_add_signed(offset as i32))
    }
}

impl From<AnimDataRaw> for AnimDataInfo {
    fn from(raw: AnimDataRaw) -> Self {
        let count = (raw.frame_count as usize).min(raw.frames.len());
        Self {
            frames: raw.frames[..count].to_vec(),
            frame_interval: raw.frame_interval,
            start_interval: raw.start_interval,
        }
    }
}

/// Decoded `animdata.mul`.
#[derive(Debug, Clone, Default)]
pub struct AnimDataLoader {
    entries: Vec<AnimDataInfo>,
}

impl AnimDataLoader {
    /// Load and decode the whole file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = MappedFile::open(path)?;
        Ok(Self::parse(file.bytes()))
    }

    /// Decode entries from bytes. Incomplete trailing groups are dropped.
    pub fn parse(data: &[u8]) -> Self {
        let mut reader = BinaryReader::new(data);
        let mut entries = Vec::with_capacity(data.len() / GROUP_SIZE * ENTRIES_PER_GROUP);

        while reader.remaining() >= GROUP_SIZE {
            reader.advance(GROUP_HEADER_SIZE);
            for _ in 0..ENTRIES_PER_GROUP {
                match reader.read_struct::<AnimDataRaw>() {
                    Ok(raw) => entries.push(raw.into()),
                    Err(_) => break,
                }
            }
        }

        Self { entries }
    }

    /// Frame sequence for an art id.
    #[inline]
    pub fn get(&self, art_id: u32) -> Option<&AnimDataInfo> {
        self.entries.get(art_id as usize)
    }

    /// Number of entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the file held no complete group.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!(GROUP_SIZE, 548);

        let mut data = vec![0u8; GROUP_SIZE * 2];
        // Art id 9: group 1, slot 1.
        let entry = GROUP_SIZE + GROUP_HEADER_SIZE + 68;
        data[entry] = 0;
        data[entry + 1] = 1;
        data[entry + 2] = 0xFF; // -1
        data[entry + 65] = 3; // frame count
        data[entry + 66] = 2; // interval
        data[entry + 67] = 1;
        // Trailing partial group is ignored.
        data.extend_from_slice(&[0u8; 100]);

        let anim = AnimDataLoader::parse(&data);

        assert_eq!(anim.len(), 16);
        let info = anim.get(9).unwrap();
        assert_eq!(info.frames, vec![0, 1, -1]);
        assert_eq!(info.frame_interval, 2);
        assert_eq!(info.start_interval, 1);
        assert_eq!(info.frame_art_ids(100).collect::<Vec<_>>(), vec![100, 101, 99]);
        assert!(anim.get(0).unwrap().frames.is_empty());
        assert!(anim.get(16).is_none());
    }
}
