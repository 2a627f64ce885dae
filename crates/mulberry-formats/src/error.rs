//! Error types for format loaders.

use thiserror::Error;

/// Errors that can occur while opening a format loader.
///
/// Only construction can fail. Once a loader exists, lookups of absent or
/// corrupt records return `None` or an empty value instead.
#[derive(Debug, Error)]
pub enum Error {
    /// Common library error.
    #[error("{0}")]
    Common(#[from] mulberry_common::Error),

    /// Record store error.
    #[error("{0}")]
    Index(#[from] mulberry_index::Error),

    /// A plane was configured with zero blocks in one dimension.
    #[error("invalid block grid {width}x{height}")]
    InvalidGrid { width: u32, height: u32 },
}

/// Result type for format operations.
pub type Result<T> = std::result::Result<T, Error>;
