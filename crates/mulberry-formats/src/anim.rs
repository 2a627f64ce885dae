//! Creature sprite animations (`anim#.idx` + `anim#.mul`).
//!
//! Bodies are laid out in three detail classes. The first `high_detail`
//! bodies own 22 actions each, the next `low_detail` bodies 13, and every
//! later body 35. Each action stores five facings; the remaining three are
//! mirrored by the consumer.
//!
//! A record is a 256-entry ARGB1555 palette, a frame count, one offset per
//! frame (relative to the end of the palette) and the frames themselves.

use std::path::Path;
use std::sync::Arc;

use mulberry_common::{BinaryReader, Image};
use mulberry_index::{IndexedRecordStore, RecordSource};

use crate::Result;

/// Facings stored per action.
pub const STORED_DIRECTIONS: u32 = 5;
/// Actions of a high-detail body.
pub const HIGH_DETAIL_ACTIONS: u32 = 22;
/// Actions of a low-detail body.
pub const LOW_DETAIL_ACTIONS: u32 = 13;
/// Actions of a people/equipment body.
pub const PEOPLE_ACTIONS: u32 = 35;

const PALETTE_SIZE: usize = 256;
const RUN_TERMINATOR: u32 = 0x7FFF_7FFF;
const RUN_BIAS: i32 = 0x200;

/// Colors referenced by an animation's frames.
pub type Palette = [u16; PALETTE_SIZE];

/// One encoded frame. Pixels are decoded on demand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnimationFrame {
    /// Horizontal anchor offset added to every run
    pub center_x: i16,
    /// Vertical anchor offset added to every run
    pub center_y: i16,
    /// Width in pixels
    pub width: u16,
    /// Height in pixels
    pub height: u16,
    runs: Vec<u8>,
}

impl AnimationFrame {
    fn parse(reader: &mut BinaryReader<'_>) -> Option<Self> {
        let center_x = reader.read_i16().ok()?;
        let center_y = reader.read_i16().ok()?;
        let width = reader.read_u16().ok()?;
        let height = reader.read_u16().ok()?;

        // Walk the runs once so a frame is only kept when it is complete.
        let start = reader.position();
        loop {
            let header = reader.read_u32().ok()?;
            if header == RUN_TERMINATOR {
                break;
            }
            reader.advance((header & 0xFFF) as usize);
            if reader.position() > reader.len() {
                return None;
            }
        }
        let end = reader.position();
        reader.seek(start);
        let runs = reader.read_bytes(end - start).ok()?.to_vec();

        Some(Self {
            center_x,
            center_y,
            width,
            height,
            runs,
        })
    }

    /// Decode the frame into an image using the animation's palette.
    ///
    /// Runs that fall outside the frame bounds are clipped.
    pub fn decode_pixels(&self, palette: &Palette) -> Image {
        let mut image = Image::new(self.width as u32, self.height as u32);
        let x_base = self.center_x as i32 - RUN_BIAS;
        let y_base = self.center_y as i32 + self.height as i32 - RUN_BIAS;

        let mut reader = BinaryReader::new(&self.runs);
        while let Ok(header) = reader.read_u32() {
            if header == RUN_TERMINATOR {
                break;
            }
            let run = (header & 0xFFF) as usize;
            // 10-bit signed coordinates with the sign bit flipped.
            let y = ((header >> 12) & 0x3FF) as i32 + y_base;
            let x = ((header >> 22) & 0x3FF) as i32 + x_base;
            let Ok(indices) = reader.read_bytes(run) else {
                break;
            };
            if y < 0 {
                continue;
            }
            for (i, &index) in indices.iter().enumerate() {
                let px = x + i as i32;
                if px >= 0 {
                    image.set_opaque(px as u32, y as u32, palette[index as usize]);
                }
            }
        }

        image
    }
}

/// A decoded animation sequence for one body, action and facing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Animation {
    palette: Box<Palette>,
    frames: Vec<AnimationFrame>,
}

impl Default for Animation {
    fn default() -> Self {
        Self {
            palette: Box::new([0; PALETTE_SIZE]),
            frames: Vec::new(),
        }
    }
}

impl Animation {
    /// Decode an animation record. Frames that are truncated or point
    /// outside the record are dropped.
    pub fn parse(bytes: &[u8]) -> Option<Self> {
        let mut reader = BinaryReader::new(bytes);
        let mut palette = Box::new([0u16; PALETTE_SIZE]);
        for color in palette.iter_mut() {
            *color = reader.read_u16().ok()?;
        }

        let frames_start = reader.position();
        let count = reader.read_u32().ok()? as usize;
        let offsets = reader.read_bytes(count.checked_mul(4)?).ok()?;

        let mut frames = Vec::with_capacity(count);
        for (i, offset) in offsets.chunks_exact(4).enumerate() {
            let offset = u32::from_le_bytes([offset[0], offset[1], offset[2], offset[3]]) as usize;
            let mut frame_reader = BinaryReader::new_at(bytes, frames_start + offset);
            match AnimationFrame::parse(&mut frame_reader) {
                Some(frame) => frames.push(frame),
                None => tracing::warn!("Animation frame {} at +{} is corrupt", i, offset),
            }
        }

        Some(Self { palette, frames })
    }

    #[inline]
    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    #[inline]
    pub fn frames(&self) -> &[AnimationFrame] {
        &self.frames
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Decode frame `index`.
    pub fn frame_image(&self, index: usize) -> Option<Image> {
        self.frames
            .get(index)
            .map(|frame| frame.decode_pixels(&self.palette))
    }
}

/// One animation file.
#[derive(Debug)]
pub struct AnimLoader {
    store: IndexedRecordStore,
    high_detail: u32,
    low_detail: u32,
}

impl AnimLoader {
    /// Open an animation file with its detail class sizes.
    pub fn open<P, Q>(index: P, data: Q, high_detail: u32, low_detail: u32) -> Result<Self>
    where
        P: AsRef<Path>,
        Q: AsRef<Path>,
    {
        Ok(Self::new(
            IndexedRecordStore::open(index, data)?,
            high_detail,
            low_detail,
        ))
    }

    /// Wrap an opened store. `high_detail` and `low_detail` are the sizes of
    /// the first two body classes; every later body is a people body.
    pub fn new(store: IndexedRecordStore, high_detail: u32, low_detail: u32) -> Self {
        Self {
            store,
            high_detail,
            low_detail,
        }
    }

    #[inline]
    pub fn high_detail(&self) -> u32 {
        self.high_detail
    }

    #[inline]
    pub fn low_detail(&self) -> u32 {
        self.low_detail
    }

    /// Number of actions stored for a body.
    pub fn action_count(&self, body: u32) -> u32 {
        if body < self.high_detail {
            HIGH_DETAIL_ACTIONS
        } else if body - self.high_detail < self.low_detail {
            LOW_DETAIL_ACTIONS
        } else {
            PEOPLE_ACTIONS
        }
    }

    /// Record id of `(body, action, direction)`, if the action and facing
    /// exist for that body.
    pub fn record_id(&self, body: u32, action: u32, direction: u32) -> Option<u32> {
        if direction >= STORED_DIRECTIONS || action >= self.action_count(body) {
            return None;
        }

        let high_slots = self.high_detail as u64 * (HIGH_DETAIL_ACTIONS * STORED_DIRECTIONS) as u64;
        let low_slots = self.low_detail as u64 * (LOW_DETAIL_ACTIONS * STORED_DIRECTIONS) as u64;
        let body = body as u64;
        let high = self.high_detail as u64;
        let low = self.low_detail as u64;

        let base = if body < high {
            body * (HIGH_DETAIL_ACTIONS * STORED_DIRECTIONS) as u64
        } else if body - high < low {
            high_slots + (body - high) * (LOW_DETAIL_ACTIONS * STORED_DIRECTIONS) as u64
        } else {
            high_slots + low_slots + (body - high - low) * (PEOPLE_ACTIONS * STORED_DIRECTIONS) as u64
        };

        let id = base + action as u64 * STORED_DIRECTIONS as u64 + direction as u64;
        u32::try_from(id).ok()
    }

    /// Load the sequence for `(body, action, direction)`.
    ///
    /// Never fails: unknown combinations, absent records and corrupt
    /// records all yield an empty animation.
    pub fn get_animation(&self, body: u32, action: u32, direction: u32) -> Arc<Animation> {
        let Some(id) = self.record_id(body, action, direction) else {
            tracing::warn!(
                "No animation slot for body {} action {} direction {}",
                body,
                action,
                direction
            );
            return Arc::default();
        };

        let Some(bytes) = self.store.read_bytes(id) else {
            return Arc::default();
        };

        match Animation::parse(bytes) {
            Some(animation) => Arc::new(animation),
            None => {
                tracing::warn!("Animation record {} is corrupt ({} bytes)", id, bytes.len());
                Arc::default()
            }
        }
    }
}
