//! Texture source selection for item art.

use mulberry_formats::AnimDataLoader;
use serde::Serialize;

/// Where the renderer should take an item's image from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "art_id", rename_all = "lowercase")]
pub enum TextureProvider {
    /// A single item image.
    Static(u32),
    /// A frame sequence described by `animdata.mul`.
    Animated(u32),
}

impl TextureProvider {
    /// Item art id this provider draws.
    #[inline]
    pub fn art_id(&self) -> u32 {
        match *self {
            Self::Static(id) | Self::Animated(id) => id,
        }
    }

    #[inline]
    pub fn is_animated(&self) -> bool {
        matches!(self, Self::Animated(_))
    }

    /// Art ids to cycle through. Animated items without a frame sequence
    /// show their base image.
    pub fn frame_art_ids(&self, anim_data: &AnimDataLoader) -> Vec<u32> {
        match *self {
            Self::Static(id) => vec![id],
            Self::Animated(id) => match anim_data.get(id) {
                Some(info) if !info.frames.is_empty() => info.frame_art_ids(id).collect(),
                _ => vec![id],
            },
        }
    }
}
