//! Record access for mul/idx game data.
//!
//! Nearly every asset family is stored as an index file of fixed 12-byte
//! slots pointing into a data file, optionally with a sparse "dif" patch set
//! layered on top. This crate provides the three pieces every format loader
//! is built from:
//!
//! - [`FileCatalog`] - Resolves logical file names across the base and
//!   shard directories, with shard files taking priority
//! - [`IndexedRecordStore`] / [`FixedRecordStore`] - Map a numeric record id
//!   to a byte range of a data file
//! - [`PatchOverlay`] - Redirects patched blocks to the dif files and
//!   passes everything else through to the base store
//!
//! # Example
//!
//! ```no_run
//! use mulberry_index::{FileCatalog, IndexedRecordStore, RecordSource};
//!
//! let catalog = FileCatalog::build("/games/uo", Some("shards/test/data".as_ref()))?;
//! let art = IndexedRecordStore::from_catalog(&catalog, "artidx.mul", "art.mul")?;
//!
//! if let Some(bytes) = art.read_bytes(0x4000) {
//!     println!("first static art record: {} bytes", bytes.len());
//! }
//! # Ok::<(), mulberry_index::Error>(())
//! ```

mod catalog;
mod error;
mod patch;
mod store;

pub use catalog::FileCatalog;
pub use error::{Error, Result};
pub use patch::{PatchOverlay, Resolved};
pub use store::{
    FixedRecordStore, IndexEntry, IndexedRecordStore, RecordLocation, RecordSource,
    INDEX_ENTRY_SIZE,
};
