//! Creature classification table (`mobtypes.txt`).
//!
//! Each line is `body TYPE flags`, with `#` starting a comment. Flags are
//! hexadecimal.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use hashbrown::HashMap as FastHashMap;
use rustc_hash::FxHasher;

use crate::Result;

type FxHashMap<K, V> = FastHashMap<K, V, std::hash::BuildHasherDefault<FxHasher>>;

/// Animation class of a body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum MobType {
    #[default]
    Monster,
    SeaMonster,
    Animal,
    Human,
    Equipment,
}

impl FromStr for MobType {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "MONSTER" => Ok(Self::Monster),
            "SEA_MONSTER" => Ok(Self::SeaMonster),
            "ANIMAL" => Ok(Self::Animal),
            "HUMAN" => Ok(Self::Human),
            "EQUIPMENT" => Ok(Self::Equipment),
            _ => Err(()),
        }
    }
}

impl fmt::Display for MobType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Monster => "MONSTER",
            Self::SeaMonster => "SEA_MONSTER",
            Self::Animal => "ANIMAL",
            Self::Human => "HUMAN",
            Self::Equipment => "EQUIPMENT",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct MobTypeEntry {
    /// Creature class
    pub kind: MobType,
    /// Behavior flags, parsed from hex
    pub flags: u32,
}

/// Parsed `mobtypes.txt`.
#[derive(Debug, Clone, Default)]
pub struct MobTypesLoader {
    entries: FxHashMap<u32, MobTypeEntry>,
}

impl MobTypesLoader {
    /// Read and parse `mobtypes.txt`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| mulberry_common::Error::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::parse(&text))
    }

    /// Parse the table. Malformed lines are skipped with a warning.
    pub fn parse(text: &str) -> Self {
        let mut entries = FxHashMap::default();

        for (number, line) in text.lines().enumerate() {
            let line = line.split('#').next().unwrap_or_default().trim();
            if line.is_empty() {
                continue;
            }

            let mut fields = line.split_whitespace();
            let body = fields.next().and_then(|f| f.parse::<u32>().ok());
            let kind = fields.next().and_then(|f| f.parse::<MobType>().ok());
            let flags = match fields.next() {
                Some(f) => u32::from_str_radix(f, 16).ok(),
                None => Some(0),
            };

            match (body, kind, flags) {
                (Some(body), Some(kind), Some(flags)) => {
                    entries.insert(body, MobTypeEntry { kind, flags });
                }
                _ => tracing::warn!("mobtypes.txt line {}: cannot parse {:?}", number + 1, line),
            }
        }

        Self { entries }
    }

    #[inline]
    pub fn get(&self, body: u32) -> Option<&MobTypeEntry> {
        self.entries.get(&body)
    }

    /// Class of `body`, [`MobType::Monster`] when unlisted.
    #[inline]
    pub fn mob_type(&self, body: u32) -> MobType {
        self.get(body).map(|e| e.kind).unwrap_or_default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        let table = MobTypesLoader::parse(
            "# body type flags\n\
             400  HUMAN      0\n\
             \n\
             200\tANIMAL 10   # horse\n\
             150 SEA_MONSTER\n\
             77 DRAGON 0\n\
             abc MONSTER 0\n",
        );

        assert_eq!(table.len(), 3);
        assert_eq!(table.mob_type(400), MobType::Human);
        assert_eq!(
            table.get(200),
            Some(&MobTypeEntry {
                kind: MobType::Animal,
                flags: 0x10
            })
        );
        assert_eq!(table.get(150).unwrap().flags, 0);
        assert_eq!(table.mob_type(77), MobType::Monster);
        assert!(table.get(77).is_none());
    }

    #[test]
    fn test_display_round_trip() {
        for kind in [MobType::SeaMonster, MobType::Equipment] {
            assert_eq!(kind.to_string().parse::<MobType>(), Ok(kind));
        }
    }
}
