//! Common utilities for Mulberry.
//!
//! This crate provides the foundational types shared by all Mulberry crates:
//!
//! - [`BinaryReader`] - Zero-copy little-endian reading from byte slices
//! - [`MappedFile`] - Read-only memory-mapped file held for the session
//! - [`Image`] - Decoded 16-bit (ARGB1555) pixel buffers
//! - [`fixed_name`] - Decoding of fixed-width, NUL-padded name fields

mod error;
mod image;
mod mapped;
mod reader;

pub use error::{Error, Result};
pub use image::Image;
pub use mapped::MappedFile;
pub use reader::{fixed_name, BinaryReader};

/// Re-export zerocopy traits for convenience
pub use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};
