//! Logical file name resolution across the base and shard directories.

use std::fs;
use std::path::{Path, PathBuf};

use hashbrown::HashMap as FastHashMap;
use rustc_hash::FxHasher;

use crate::{Error, Result};

type FxHashMap<K, V> = FastHashMap<K, V, std::hash::BuildHasherDefault<FxHasher>>;

/// Maps lowercase file names to the path that provides them.
///
/// The base distribution directory is scanned first, then the optional shard
/// override directory; a shard file replaces a base file of the same name.
/// Only the top level of each directory is scanned. After construction the
/// catalog never touches the filesystem again.
#[derive(Debug, Clone, Default)]
pub struct FileCatalog {
    entries: FxHashMap<String, PathBuf>,
}

impl FileCatalog {
    /// Build a catalog from a base directory and an optional override.
    ///
    /// The base directory must exist. A missing override directory is
    /// skipped, since most deployments ship no shard data at all.
    pub fn build<P: AsRef<Path>>(base: P, shard: Option<&Path>) -> Result<Self> {
        let base = base.as_ref();
        if !base.is_dir() {
            return Err(Error::InvalidDirectory(base.to_path_buf()));
        }

        let mut catalog = Self::default();
        catalog.add_directory(base)?;

        if let Some(shard) = shard {
            if shard.is_dir() {
                catalog.add_directory(shard)?;
            } else {
                tracing::debug!("Shard data directory {} not present, skipping", shard.display());
            }
        }

        for (name, path) in &catalog.entries {
            tracing::debug!("Path for \"{}\" is {}", name, path.display());
        }

        Ok(catalog)
    }

    fn add_directory(&mut self, directory: &Path) -> Result<()> {
        let read_dir = fs::read_dir(directory).map_err(|source| Error::ReadDirectory {
            path: directory.to_path_buf(),
            source,
        })?;

        for entry in read_dir {
            let entry = entry.map_err(|source| Error::ReadDirectory {
                path: directory.to_path_buf(),
                source,
            })?;
            let path = entry.path();

            // No subdirectories
            if path.is_dir() {
                continue;
            }

            let name = entry.file_name().to_string_lossy().to_lowercase();
            self.entries.insert(name, path);
        }

        Ok(())
    }

    /// Resolve a logical file name (case-insensitive).
    #[inline]
    pub fn resolve(&self, name: &str) -> Option<&Path> {
        if let Some(path) = self.entries.get(name) {
            return Some(path.as_path());
        }
        self.entries.get(&name.to_lowercase()).map(PathBuf::as_path)
    }

    /// Whether a file with this name is available.
    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.resolve(name).is_some()
    }

    /// Resolve a file that must exist.
    pub fn require(&self, name: &str) -> Result<&Path> {
        self.resolve(name).ok_or_else(|| {
            tracing::error!("Required file {} was not found", name);
            Error::MissingFile(name.to_string())
        })
    }

    /// Number of catalogued files.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the catalog is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(name, path)` pairs in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Path)> + '_ {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_path()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_override_wins() {
        let base = tempfile::tempdir().unwrap();
        let shard = tempfile::tempdir().unwrap();
        fs::write(base.path().join("x.mul"), b"base").unwrap();
        fs::write(base.path().join("only_base.mul"), b"base").unwrap();
        fs::write(shard.path().join("x.mul"), b"shard").unwrap();

        let catalog = FileCatalog::build(base.path(), Some(shard.path())).unwrap();

        assert_eq!(catalog.resolve("x.mul"), Some(shard.path().join("x.mul").as_path()));
        assert_eq!(
            catalog.resolve("only_base.mul"),
            Some(base.path().join("only_base.mul").as_path())
        );
        assert_eq!(catalog.len(), 2);
    }

    #[test]
    fn test_case_insensitive() {
        let base = tempfile::tempdir().unwrap();
        fs::write(base.path().join("TileData.MUL"), b"").unwrap();

        let catalog = FileCatalog::build(base.path(), None).unwrap();

        assert!(catalog.contains("tiledata.mul"));
        assert!(catalog.contains("TILEDATA.mul"));
    }

    #[test]
    fn test_subdirectories_skipped() {
        let base = tempfile::tempdir().unwrap();
        fs::create_dir(base.path().join("sub")).unwrap();
        fs::write(base.path().join("sub").join("hidden.mul"), b"").unwrap();

        let catalog = FileCatalog::build(base.path(), None).unwrap();

        assert!(catalog.is_empty());
        assert!(!catalog.contains("hidden.mul"));
        assert!(!catalog.contains("sub"));
    }

    #[test]
    fn test_missing_shard_is_not_an_error() {
        let base = tempfile::tempdir().unwrap();
        let missing = base.path().join("does-not-exist");

        assert!(FileCatalog::build(base.path(), Some(&missing)).is_ok());
    }

    #[test]
    fn test_invalid_base_is_fatal() {
        let base = tempfile::tempdir().unwrap();
        let missing = base.path().join("does-not-exist");

        let err = FileCatalog::build(&missing, None).unwrap_err();
        assert!(matches!(err, Error::InvalidDirectory(_)));
    }

    #[test]
    fn test_require_reports_name() {
        let base = tempfile::tempdir().unwrap();
        let catalog = FileCatalog::build(base.path(), None).unwrap();

        match catalog.require("hues.mul") {
            Err(Error::MissingFile(name)) => assert_eq!(name, "hues.mul"),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
