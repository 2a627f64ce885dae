//! Fixed slot arrays for multi-variant asset families.

use std::sync::Arc;

use crate::{Error, Result};

/// Up to `N` loaders of one family, indexed by variant id, with a fallback.
///
/// The fallback is the lowest-numbered loaded slot. A family with no
/// loaded slot is valid to build; every lookup on it then fails with
/// [`Error::NoVariant`].
#[derive(Debug)]
pub struct Variants<T, const N: usize> {
    family: &'static str,
    slots: [Option<Arc<T>>; N],
    fallback: Option<(usize, Arc<T>)>,
}

impl<T, const N: usize> Variants<T, N> {
    /// Collect loaded slots.
    pub fn new(family: &'static str, slots: [Option<T>; N]) -> Self {
        let slots = slots.map(|slot| slot.map(Arc::new));
        let fallback = slots
            .iter()
            .enumerate()
            .find_map(|(i, slot)| slot.clone().map(|loader| (i, loader)));
        if fallback.is_none() {
            tracing::warn!("No {} variant is enabled", family);
        }
        Self {
            family,
            slots,
            fallback,
        }
    }

    /// Loader for variant `index`.
    ///
    /// Indices past the last slot are clamped to 0. A slot that was never
    /// loaded yields the fallback. Both cases log a warning. Fails only
    /// when the family has no loaded slot at all.
    pub fn get(&self, index: usize) -> Result<&Arc<T>> {
        let index = if index >= N {
            tracing::warn!("Trying to access {} loader with index {}", self.family, index);
            0
        } else {
            index
        };

        if let Some(loader) = &self.slots[index] {
            return Ok(loader);
        }

        match &self.fallback {
            Some((fallback_index, loader)) => {
                tracing::warn!(
                    "Trying to access uninitialized {} loader with index {}, using {}",
                    self.family,
                    index,
                    fallback_index
                );
                Ok(loader)
            }
            None => {
                tracing::error!(
                    "Requested {} loader {} but no {} variant was loaded",
                    self.family,
                    index,
                    self.family
                );
                Err(Error::NoVariant(self.family))
            }
        }
    }

    /// Index of the fallback slot.
    #[inline]
    pub fn fallback_index(&self) -> Option<usize> {
        self.fallback.as_ref().map(|(index, _)| *index)
    }

    /// Loaded slot indices in ascending order.
    pub fn loaded(&self) -> impl Iterator<Item = usize> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|_| i))
    }

    /// Whether slot `index` itself was loaded.
    #[inline]
    pub fn is_loaded(&self, index: usize) -> bool {
        matches!(self.slots.get(index), Some(Some(_)))
    }

    /// Whether no slot was loaded.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.fallback.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn test_empty_family() {
        let variants = Variants::<u32, 3>::new("test", [None, None, None]);

        assert!(variants.is_empty());
        assert_eq!(variants.fallback_index(), None);
        for index in [0, 2, 9] {
            let err = variants.get(index).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::ConfigInvalid);
            assert!(err.to_string().contains("test"));
        }
    }

    #[test]
    fn test_clamp_and_fallback() {
        let variants = Variants::new("test", [None, Some(10u32), Some(20)]);

        assert_eq!(variants.fallback_index(), Some(1));
        assert_eq!(**variants.get(2).unwrap(), 20);
        // Unloaded slot 0 falls back to slot 1.
        assert!(Arc::ptr_eq(variants.get(0).unwrap(), variants.get(1).unwrap()));
        // Out of range clamps to 0, which falls back as well.
        assert!(Arc::ptr_eq(variants.get(9).unwrap(), variants.get(0).unwrap()));
        assert_eq!(variants.loaded().collect::<Vec<_>>(), vec![1, 2]);
        assert!(!variants.is_loaded(0));
        assert!(!variants.is_loaded(7));
    }
}
