//! Error types for the index crate.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while building catalogs and opening record stores.
#[derive(Debug, Error)]
pub enum Error {
    /// Common library error (file open/map failures).
    #[error("{0}")]
    Common(#[from] mulberry_common::Error),

    /// A data directory does not exist or is not a directory.
    #[error("invalid data directory: {}", .0.display())]
    InvalidDirectory(PathBuf),

    /// A directory could not be listed.
    #[error("failed to read directory {}: {source}", path.display())]
    ReadDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A required file is not present in either data directory.
    #[error("required file {0} was not found")]
    MissingFile(String),

    /// A fixed-stride store was configured with a zero record size.
    #[error("record size must be non-zero")]
    ZeroStride,
}

/// Result type for index operations.
pub type Result<T> = std::result::Result<T, Error>;
