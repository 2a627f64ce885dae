//! idx/mul record stores.

use std::path::Path;

use mulberry_common::MappedFile;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::{Error, FileCatalog, Result};

/// Size of one slot in an index file.
pub const INDEX_ENTRY_SIZE: usize = std::mem::size_of::<IndexEntry>();

/// One raw slot of an index file.
///
/// Unused slots carry an offset of `-1` or a non-positive length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct IndexEntry {
    /// Byte offset into the data file
    pub offset: i32,
    /// Record length in bytes
    pub length: i32,
    /// Format-specific extra value (e.g. gump dimensions)
    pub extra: i32,
}

impl IndexEntry {
    /// Whether this slot points at a record.
    #[inline]
    pub fn is_used(&self) -> bool {
        let (offset, length) = (self.offset, self.length);
        offset != -1 && length > 0
    }
}

/// A validated byte range inside a data file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordLocation {
    /// Byte offset into the data file
    pub offset: u64,
    /// Record length in bytes
    pub length: u32,
    /// Format-specific extra value
    pub extra: i32,
}

/// Anything that maps a record id to bytes.
pub trait RecordSource {
    /// Number of addressable record ids.
    fn record_count(&self) -> u32;

    /// Locate a record, or `None` if it is absent or corrupt.
    fn locate(&self, id: u32) -> Option<RecordLocation>;

    /// The bytes of a record, or `None` if it is absent or corrupt.
    fn read_bytes(&self, id: u32) -> Option<&[u8]>;
}

/// An index file paired with its data file.
///
/// Both files are mapped once and owned for the store's lifetime; lookups
/// are bounds-checked slicing of the mappings.
#[derive(Debug)]
pub struct IndexedRecordStore {
    index: MappedFile,
    data: MappedFile,
}

impl IndexedRecordStore {
    /// Open an index/data pair by path.
    pub fn open<P: AsRef<Path>, Q: AsRef<Path>>(index_path: P, data_path: Q) -> Result<Self> {
        let index = MappedFile::open(index_path)?;
        let data = MappedFile::open(data_path)?;

        if index.len() % INDEX_ENTRY_SIZE as u64 != 0 {
            tracing::warn!(
                "Index {} has {} trailing bytes, ignoring them",
                index.path().display(),
                index.len() % INDEX_ENTRY_SIZE as u64
            );
        }

        Ok(Self { index, data })
    }

    /// Open an index/data pair by logical name.
    pub fn from_catalog(catalog: &FileCatalog, index_name: &str, data_name: &str) -> Result<Self> {
        let index_path = catalog.require(index_name)?;
        let data_path = catalog.require(data_name)?;
        Self::open(index_path, data_path)
    }

    /// The raw index slot for `id`.
    #[inline]
    pub fn entry(&self, id: u32) -> Option<IndexEntry> {
        let start = id as u64 * INDEX_ENTRY_SIZE as u64;
        let bytes = self.index.slice(start, INDEX_ENTRY_SIZE as u64)?;
        IndexEntry::read_from_bytes(bytes).ok()
    }

    /// The mapped data file.
    #[inline]
    pub fn data(&self) -> &MappedFile {
        &self.data
    }

    /// The mapped index file.
    #[inline]
    pub fn index(&self) -> &MappedFile {
        &self.index
    }
}

impl RecordSource for IndexedRecordStore {
    #[inline]
    fn record_count(&self) -> u32 {
        (self.index.len() / INDEX_ENTRY_SIZE as u64).min(u32::MAX as u64) as u32
    }

    fn locate(&self, id: u32) -> Option<RecordLocation> {
        let entry = self.entry(id)?;
        if !entry.is_used() {
            return None;
        }

        let location = RecordLocation {
            offset: entry.offset as u32 as u64,
            length: entry.length as u32,
            extra: entry.extra,
        };

        if location.offset + location.length as u64 > self.data.len() {
            tracing::warn!(
                "Corrupt record {} in {}: range {}+{} exceeds data size {}",
                id,
                self.index.path().display(),
                location.offset,
                location.length,
                self.data.len()
            );
            return None;
        }

        Some(location)
    }

    #[inline]
    fn read_bytes(&self, id: u32) -> Option<&[u8]> {
        let location = self.locate(id)?;
        self.data.slice(location.offset, location.length as u64)
    }
}

/// A data file of back-to-back fixed-size records with no index.
///
/// Used for map planes and their dif files, where record `n` starts at
/// `n * stride`.
#[derive(Debug)]
pub struct FixedRecordStore {
    data: MappedFile,
    stride: u32,
}

impl FixedRecordStore {
    /// Open a fixed-stride data file.
    pub fn open<P: AsRef<Path>>(path: P, stride: u32) -> Result<Self> {
        if stride == 0 {
            return Err(Error::ZeroStride);
        }
        let data = MappedFile::open(path)?;
        Ok(Self { data, stride })
    }

    /// Size of one record.
    #[inline]
    pub fn stride(&self) -> u32 {
        self.stride
    }

    /// The mapped data file.
    #[inline]
    pub fn data(&self) -> &MappedFile {
        &self.data
    }
}

impl RecordSource for FixedRecordStore {
    #[inline]
    fn record_count(&self) -> u32 {
        (self.data.len() / self.stride as u64).min(u32::MAX as u64) as u32
    }

    #[inline]
    fn locate(&self, id: u32) -> Option<RecordLocation> {
        if id >= self.record_count() {
            return None;
        }
        Some(RecordLocation {
            offset: id as u64 * self.stride as u64,
            length: self.stride,
            extra: 0,
        })
    }

    #[inline]
    fn read_bytes(&self, id: u32) -> Option<&[u8]> {
        let location = self.locate(id)?;
        self.data.slice(location.offset, location.length as u64)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::io::Write;

    use byteorder::{LittleEndian, WriteBytesExt};

    use super::*;

    fn write_index(path: &Path, entries: &[(i32, i32, i32)]) {
        let mut file = fs::File::create(path).unwrap();
        for &(offset, length, extra) in entries {
            file.write_i32::<LittleEndian>(offset).unwrap();
            file.write_i32::<LittleEndian>(length).unwrap();
            file.write_i32::<LittleEndian>(extra).unwrap();
        }
    }

    #[test]
    fn test_single_record_at_id_three() {
        let dir = tempfile::tempdir().unwrap();
        let idx = dir.path().join("test.idx");
        let mul = dir.path().join("test.mul");

        write_index(
            &idx,
            &[(-1, -1, 0), (-1, -1, 0), (-1, 0, 0), (4, 5, 7), (-1, -1, 0)],
        );
        let mut data = fs::File::create(&mul).unwrap();
        data.write_all(&[0xEE; 4]).unwrap();
        data.write_all(b"hello").unwrap();
        drop(data);

        let store = IndexedRecordStore::open(&idx, &mul).unwrap();

        assert_eq!(store.record_count(), 5);
        assert_eq!(store.read_bytes(3), Some(&b"hello"[..]));
        assert_eq!(
            store.locate(3),
            Some(RecordLocation {
                offset: 4,
                length: 5,
                extra: 7
            })
        );
        for id in [0, 1, 2, 4, 5, 100, u32::MAX] {
            assert_eq!(store.read_bytes(id), None, "id {id}");
        }
    }

    #[test]
    fn test_out_of_range_ids() {
        let dir = tempfile::tempdir().unwrap();
        let idx = dir.path().join("test.idx");
        let mul = dir.path().join("test.mul");
        write_index(&idx, &[(0, 1, 0), (1, 1, 0)]);
        fs::write(&mul, [1u8, 2]).unwrap();

        let store = IndexedRecordStore::open(&idx, &mul).unwrap();

        assert!(store.locate(0).is_some());
        assert!(store.locate(1).is_some());
        for id in 2..64 {
            assert!(store.locate(id).is_none());
        }
    }

    #[test]
    fn test_record_past_end_is_absent() {
        let dir = tempfile::tempdir().unwrap();
        let idx = dir.path().join("test.idx");
        let mul = dir.path().join("test.mul");
        // Start is inside the file, end is not.
        write_index(&idx, &[(2, 10, 0), (100, 1, 0)]);
        fs::write(&mul, [0u8; 8]).unwrap();

        let store = IndexedRecordStore::open(&idx, &mul).unwrap();

        assert_eq!(store.locate(0), None);
        assert_eq!(store.read_bytes(0), None);
        assert_eq!(store.locate(1), None);
    }

    #[test]
    fn test_trailing_partial_slot_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let idx = dir.path().join("test.idx");
        let mul = dir.path().join("test.mul");
        write_index(&idx, &[(0, 2, 0)]);
        fs::OpenOptions::new()
            .append(true)
            .open(&idx)
            .unwrap()
            .write_all(&[0, 0, 0, 0, 2, 0])
            .unwrap();
        fs::write(&mul, [9u8, 9]).unwrap();

        let store = IndexedRecordStore::open(&idx, &mul).unwrap();

        assert_eq!(store.record_count(), 1);
        assert_eq!(store.locate(1), None);
    }

    #[test]
    fn test_fixed_store() {
        let dir = tempfile::tempdir().unwrap();
        let mul = dir.path().join("fixed.mul");
        fs::write(&mul, [0u8, 0, 1, 1, 2, 2, 3]).unwrap();

        let store = FixedRecordStore::open(&mul, 2).unwrap();

        assert_eq!(store.record_count(), 3);
        assert_eq!(store.read_bytes(2), Some(&[2u8, 2][..]));
        assert_eq!(store.read_bytes(3), None);
        assert!(matches!(
            FixedRecordStore::open(&mul, 0),
            Err(Error::ZeroStride)
        ));
    }
}
