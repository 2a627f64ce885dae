//! Error types for the asset manager.

use thiserror::Error;

/// Broad classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Bad directories or configuration values.
    ConfigInvalid,
    /// A required file is absent or cannot be opened.
    MissingAsset,
    /// File contents are inconsistent with their format.
    CorruptRecord,
}

/// Errors raised while building an [`AssetManager`](crate::AssetManager).
///
/// Queries on a built manager fall back and log instead, except loader
/// lookups on an empty family, which return [`Error::NoVariant`].
#[derive(Debug, Error)]
pub enum Error {
    /// The configuration document could not be read.
    #[error("failed to read configuration: {0}")]
    ConfigRead(#[source] mulberry_common::Error),

    /// The configuration document is not valid XML for the expected layout.
    #[error("failed to parse configuration: {0}")]
    ConfigParse(#[from] quick_xml::DeError),

    /// A configuration value is out of range or inconsistent.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A loader was requested from a multi-variant family with nothing loaded.
    #[error("no {0} variant is enabled")]
    NoVariant(&'static str),

    /// Catalog or record store error.
    #[error("{0}")]
    Index(#[from] mulberry_index::Error),

    /// Format loader error.
    #[error("{0}")]
    Format(#[from] mulberry_formats::Error),
}

impl Error {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ConfigRead(_) | Self::ConfigParse(_) | Self::InvalidConfig(_) | Self::NoVariant(_) => {
                ErrorKind::ConfigInvalid
            }
            Self::Index(e) => index_kind(e),
            Self::Format(mulberry_formats::Error::Index(e)) => index_kind(e),
            Self::Format(mulberry_formats::Error::Common(e)) => common_kind(e),
            Self::Format(mulberry_formats::Error::InvalidGrid { .. }) => ErrorKind::ConfigInvalid,
        }
    }
}

fn index_kind(error: &mulberry_index::Error) -> ErrorKind {
    use mulberry_index::Error as E;

    match error {
        E::InvalidDirectory(_) | E::ReadDirectory { .. } | E::ZeroStride => ErrorKind::ConfigInvalid,
        E::MissingFile(_) => ErrorKind::MissingAsset,
        E::Common(e) => common_kind(e),
    }
}

fn common_kind(error: &mulberry_common::Error) -> ErrorKind {
    match error {
        mulberry_common::Error::UnexpectedEof { .. } => ErrorKind::CorruptRecord,
        mulberry_common::Error::Open { .. } | mulberry_common::Error::Io(_) => ErrorKind::MissingAsset,
    }
}

/// Result type for manager operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        let missing = Error::from(mulberry_index::Error::MissingFile("hues.mul".into()));
        assert_eq!(missing.kind(), ErrorKind::MissingAsset);
        assert!(missing.to_string().contains("hues.mul"));

        let grid = Error::from(mulberry_formats::Error::InvalidGrid {
            width: 0,
            height: 1,
        });
        assert_eq!(grid.kind(), ErrorKind::ConfigInvalid);

        let eof = Error::from(mulberry_formats::Error::Common(
            mulberry_common::Error::UnexpectedEof {
                needed: 4,
                available: 1,
            },
        ));
        assert_eq!(eof.kind(), ErrorKind::CorruptRecord);

        assert_eq!(Error::NoVariant("map").kind(), ErrorKind::ConfigInvalid);
    }
}
