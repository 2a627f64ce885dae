//! Little-endian cursor over borrowed record bytes.
//!
//! Every mul/idx format is little-endian with no alignment padding, so
//! [`BinaryReader`] reads fields one after another from a borrowed slice and
//! never copies more than the value it returns.

use zerocopy::FromBytes;

use crate::{Error, Result};

/// A cursor over one record's bytes.
///
/// A failed read leaves the cursor where it was, so callers can stop at the
/// first short read and keep what they decoded so far.
///
/// # Example
///
/// ```
/// use mulberry_common::BinaryReader;
///
/// let data = [0x01, 0x02, 0x03, 0x04, 0xFF];
/// let mut reader = BinaryReader::new(&data);
///
/// assert_eq!(reader.read_u32().unwrap(), 0x04030201);
/// assert_eq!(reader.read_i8().unwrap(), -1);
/// assert!(reader.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct BinaryReader<'a> {
    data: &'a [u8],
    position: usize,
}

macro_rules! le_reads {
    ($($name:ident => $ty:ty),* $(,)?) => {
        $(
            #[doc = concat!("Read a `", stringify!($ty), "`.")]
            #[inline]
            pub fn $name(&mut self) -> Result<$ty> {
                let bytes = self.take(std::mem::size_of::<$ty>())?;
                let mut raw = [0u8; std::mem::size_of::<$ty>()];
                raw.copy_from_slice(bytes);
                Ok(<$ty>::from_le_bytes(raw))
            }
        )*
    };
}

impl<'a> BinaryReader<'a> {
    #[inline]
    pub const fn new(data: &'a [u8]) -> Self {
        Self::new_at(data, 0)
    }

    /// A reader whose cursor starts at `position`. Positions past the end
    /// are allowed; every read from them fails.
    #[inline]
    pub const fn new_at(data: &'a [u8], position: usize) -> Self {
        Self { data, position }
    }

    #[inline]
    pub const fn position(&self) -> usize {
        self.position
    }

    /// Size of the whole record, independent of the cursor.
    #[inline]
    pub const fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub const fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.position)
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Move the cursor to an absolute offset within the record.
    #[inline]
    pub fn seek(&mut self, position: usize) {
        self.position = position;
    }

    /// Skip `count` bytes without checking them.
    #[inline]
    pub fn advance(&mut self, count: usize) {
        self.position = self.position.saturating_add(count);
    }

    fn take(&mut self, count: usize) -> Result<&'a [u8]> {
        let available = self.remaining();
        if available < count {
            return Err(Error::UnexpectedEof {
                needed: count,
                available,
            });
        }
        let bytes = &self.data[self.position..self.position + count];
        self.position += count;
        Ok(bytes)
    }

    /// Borrow the next `count` bytes.
    #[inline]
    pub fn read_bytes(&mut self, count: usize) -> Result<&'a [u8]> {
        self.take(count)
    }

    le_reads! {
        read_u8 => u8,
        read_i8 => i8,
        read_u16 => u16,
        read_i16 => i16,
        read_u32 => u32,
    }

    /// Read a NUL-padded name field `width` bytes wide.
    pub fn read_fixed_name(&mut self, width: usize) -> Result<String> {
        self.take(width).map(fixed_name)
    }

    /// Read a packed on-disk struct.
    #[inline]
    pub fn read_struct<T: FromBytes>(&mut self) -> Result<T> {
        let size = std::mem::size_of::<T>();
        let bytes = self.take(size)?;
        T::read_from_bytes(bytes).map_err(|_| Error::UnexpectedEof {
            needed: size,
            available: bytes.len(),
        })
    }
}

/// Decode a fixed-width name field.
///
/// Names are stored as single-byte characters padded with NULs; anything
/// after the first NUL is garbage left over by the authoring tools.
pub fn fixed_name(bytes: &[u8]) -> String {
    let end = memchr::memchr(0, bytes).unwrap_or(bytes.len());
    bytes[..end].iter().map(|&b| b as char).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mixed_fields() {
        // A map cell followed by a static entry's art id.
        let data = [0x34u8, 0x12, 0xF6, 0x01, 0x02, 0x03, 0x04];
        let mut reader = BinaryReader::new(&data);

        assert_eq!(reader.read_u16().unwrap(), 0x1234);
        assert_eq!(reader.read_i8().unwrap(), -10);
        assert_eq!(reader.read_u32().unwrap(), 0x04030201);
        assert!(reader.is_empty());
    }

    #[test]
    fn test_fixed_name_stops_at_nul() {
        let mut field = [0u8; 20];
        field[..5].copy_from_slice(b"grass");
        field[6..9].copy_from_slice(b"xyz");

        let mut reader = BinaryReader::new(&field);
        assert_eq!(reader.read_fixed_name(20).unwrap(), "grass");
        assert!(reader.is_empty());
        assert_eq!(fixed_name(b"abcd"), "abcd");
    }

    #[test]
    fn test_short_read_keeps_position() {
        let data = [0x01, 0x02, 0x03];
        let mut reader = BinaryReader::new_at(&data, 1);

        assert!(matches!(
            reader.read_u32(),
            Err(Error::UnexpectedEof {
                needed: 4,
                available: 2
            })
        ));
        assert_eq!(reader.position(), 1);
        assert_eq!(reader.read_i16().unwrap(), 0x0302);

        reader.seek(10);
        assert!(reader.is_empty());
        assert!(reader.read_u8().is_err());
    }
}
