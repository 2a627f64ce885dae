//! Sparse "dif" patch overlays.
//!
//! A patch set is three files:
//!
//! - a block list (`*difl*.mul`): one `u32` block id per patch slot,
//! - the patch records, either indexed (`stadifi` + `stadif`) or fixed-size
//!   (`mapdif`), addressed by the slot's position in the block list,
//! - nothing else; the base files are never modified.
//!
//! The block list is expanded once into a table indexed directly by block
//! id, so resolving a block is two array reads regardless of patch count.

use std::path::Path;

use mulberry_common::{BinaryReader, MappedFile};

use crate::store::{RecordLocation, RecordSource};
use crate::Result;

const NOT_PATCHED: u32 = u32::MAX;

/// Where a block's bytes come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolved {
    /// The block is not patched; this is the base store's answer.
    Base(Option<RecordLocation>),
    /// The block is patched. `None` means the patch deliberately empties it.
    Patched(Option<RecordLocation>),
}

impl Resolved {
    /// The location, regardless of which file holds it.
    #[inline]
    pub fn location(&self) -> Option<RecordLocation> {
        match *self {
            Resolved::Base(location) | Resolved::Patched(location) => location,
        }
    }

    /// Whether the patch set handled this block.
    #[inline]
    pub fn is_patched(&self) -> bool {
        matches!(self, Resolved::Patched(_))
    }
}

#[derive(Debug)]
struct PatchTable<S> {
    /// Patch slot per block id, or `NOT_PATCHED`.
    slots: Vec<u32>,
    records: S,
    patched_blocks: usize,
}

/// A base record store with an optional patch set on top.
#[derive(Debug)]
pub struct PatchOverlay<S> {
    base: S,
    patch: Option<PatchTable<S>>,
}

impl<S: RecordSource> PatchOverlay<S> {
    /// Wrap a base store with no patches.
    pub fn passthrough(base: S) -> Self {
        Self { base, patch: None }
    }

    /// Wrap a base store with a patch set.
    ///
    /// `block_list` is the path of the difl file, `records` the already
    /// opened patch records and `block_count` the number of addressable
    /// blocks of the plane. Block ids outside the plane and list entries
    /// without a matching patch record are ignored, so those blocks keep
    /// their base data.
    pub fn with_patch<P: AsRef<Path>>(
        base: S,
        block_list: P,
        records: S,
        block_count: u32,
    ) -> Result<Self> {
        let list = MappedFile::open(block_list)?;
        let table = Self::build_table(&list, records, block_count);
        Ok(Self {
            base,
            patch: Some(table),
        })
    }

    fn build_table(list: &MappedFile, records: S, block_count: u32) -> PatchTable<S> {
        let mut slots = vec![NOT_PATCHED; block_count as usize];
        let mut patched_blocks = 0;

        if list.len() % 4 != 0 {
            tracing::warn!(
                "Patch list {} has {} trailing bytes, ignoring them",
                list.path().display(),
                list.len() % 4
            );
        }

        let available = records.record_count();
        let mut reader = BinaryReader::new(list.bytes());
        let mut position = 0u32;

        while let Ok(block) = reader.read_u32() {
            let slot = position;
            position += 1;

            if block >= block_count {
                tracing::warn!(
                    "Patch list {} entry {} names block {} outside the plane ({} blocks)",
                    list.path().display(),
                    slot,
                    block,
                    block_count
                );
                continue;
            }

            if slot >= available {
                tracing::warn!(
                    "Patch list {} entry {} for block {} has no patch record, keeping base data",
                    list.path().display(),
                    slot,
                    block
                );
                continue;
            }

            // Later entries for the same block replace earlier ones.
            if slots[block as usize] == NOT_PATCHED {
                patched_blocks += 1;
            }
            slots[block as usize] = slot;
        }

        tracing::debug!(
            "Patch list {}: {} entries, {} patched blocks",
            list.path().display(),
            position,
            patched_blocks
        );

        PatchTable {
            slots,
            records,
            patched_blocks,
        }
    }

    /// The base store.
    #[inline]
    pub fn base(&self) -> &S {
        &self.base
    }

    /// Whether a patch set is attached.
    #[inline]
    pub fn has_patches(&self) -> bool {
        self.patch.is_some()
    }

    /// Number of distinct blocks the patch set replaces.
    #[inline]
    pub fn patched_block_count(&self) -> usize {
        self.patch.as_ref().map_or(0, |p| p.patched_blocks)
    }

    #[inline]
    fn patch_slot(&self, block: u32) -> Option<(&PatchTable<S>, u32)> {
        let patch = self.patch.as_ref()?;
        match patch.slots.get(block as usize) {
            Some(&slot) if slot != NOT_PATCHED => Some((patch, slot)),
            _ => None,
        }
    }

    /// Resolve a block to the file and range holding its bytes.
    #[inline]
    pub fn resolve(&self, block: u32) -> Resolved {
        match self.patch_slot(block) {
            Some((patch, slot)) => Resolved::Patched(patch.records.locate(slot)),
            None => Resolved::Base(self.base.locate(block)),
        }
    }
}

impl<S: RecordSource> RecordSource for PatchOverlay<S> {
    #[inline]
    fn record_count(&self) -> u32 {
        self.base.record_count()
    }

    /// Locate a block. The location is relative to whichever file holds it;
    /// use [`PatchOverlay::resolve`] to tell the two apart.
    #[inline]
    fn locate(&self, id: u32) -> Option<RecordLocation> {
        self.resolve(id).location()
    }

    #[inline]
    fn read_bytes(&self, id: u32) -> Option<&[u8]> {
        match self.patch_slot(id) {
            Some((patch, slot)) => patch.records.read_bytes(slot),
            None => self.base.read_bytes(id),
        }
    }
}
