//! Decoded 16-bit images.

/// A decoded image in the games' native ARGB1555 pixel format.
///
/// Pixel value `0` is fully transparent. Opaque pixels have bit 15 set.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Image {
    width: u32,
    height: u32,
    pixels: Vec<u16>,
}

impl Image {
    /// Create a fully transparent image.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize],
        }
    }

    /// Width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Row-major pixel data.
    #[inline]
    pub fn pixels(&self) -> &[u16] {
        &self.pixels
    }

    /// Pixel at `(x, y)`, or `None` outside the image.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> Option<u16> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels.get((y * self.width + x) as usize).copied()
    }

    /// Set a pixel. Writes outside the image are dropped.
    #[inline]
    pub fn set_pixel(&mut self, x: u32, y: u32, color: u16) {
        if x < self.width && y < self.height {
            self.pixels[(y * self.width + x) as usize] = color;
        }
    }

    /// Set a pixel from a raw file color, marking it opaque.
    ///
    /// Stored colors carry no alpha bit; a stored `0` is black, not a hole.
    #[inline]
    pub fn set_opaque(&mut self, x: u32, y: u32, color: u16) {
        self.set_pixel(x, y, color | 0x8000);
    }
}
