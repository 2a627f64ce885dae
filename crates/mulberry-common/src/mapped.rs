//! Read-only memory-mapped files.

use std::fs::File;
use std::path::{Path, PathBuf};

use memmap2::Mmap;

use crate::{Error, Result};

/// A data file mapped into memory for the lifetime of the session.
///
/// Record lookups become offset arithmetic over the mapping; nothing is
/// opened or closed per query. Empty files are valid and simply have no
/// bytes to hand out.
pub struct MappedFile {
    path: PathBuf,
    mmap: Option<Mmap>,
}

impl MappedFile {
    /// Open and map a file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| Error::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let len = file
            .metadata()
            .map_err(|source| Error::Open {
                path: path.to_path_buf(),
                source,
            })?
            .len();

        let mmap = if len == 0 {
            None
        } else {
            // SAFETY: game data files are opened read-only and are not
            // modified while a session is running.
            let mmap = unsafe { Mmap::map(&file) }.map_err(|source| Error::Open {
                path: path.to_path_buf(),
                source,
            })?;
            Some(mmap)
        };

        Ok(Self {
            path: path.to_path_buf(),
            mmap,
        })
    }

    /// Path this file was opened from.
    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Size of the file in bytes.
    #[inline]
    pub fn len(&self) -> u64 {
        self.bytes().len() as u64
    }

    /// Whether the file is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes().is_empty()
    }

    /// All bytes of the file.
    #[inline]
    pub fn bytes(&self) -> &[u8] {
        self.mmap.as_deref().unwrap_or(&[])
    }

    /// Bytes in `[offset, offset + length)`, or `None` if the range is not
    /// entirely inside the file.
    #[inline]
    pub fn slice(&self, offset: u64, length: u64) -> Option<&[u8]> {
        let end = offset.checked_add(length)?;
        if end > self.len() {
            return None;
        }
        Some(&self.bytes()[offset as usize..end as usize])
    }
}

impl std::fmt::Debug for MappedFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MappedFile")
            .field("path", &self.path)
            .field("len", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slice_bounds() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.mul");
        std::fs::write(&path, [1u8, 2, 3, 4, 5]).unwrap();

        let file = MappedFile::open(&path).unwrap();
        assert_eq!(file.len(), 5);
        assert_eq!(file.slice(1, 3), Some(&[2u8, 3, 4][..]));
        assert_eq!(file.slice(3, 2), Some(&[4u8, 5][..]));
        assert_eq!(file.slice(3, 3), None);
        assert_eq!(file.slice(u64::MAX, 2), None);
    }

    #[test]
    fn test_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.mul");
        std::fs::write(&path, b"").unwrap();

        let file = MappedFile::open(&path).unwrap();
        assert!(file.is_empty());
        assert_eq!(file.slice(0, 0), Some(&[][..]));
        assert_eq!(file.slice(0, 1), None);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = MappedFile::open(dir.path().join("nope.mul")).unwrap_err();
        assert!(matches!(err, Error::Open { .. }));
    }
}
