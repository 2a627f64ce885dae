//! Text definition tables (`body.def`, `bodyconv.def`, ...).
//!
//! Each non-comment line starts with a key followed by whitespace separated
//! fields. A `{...}` group counts as a single field. Keys may be a single
//! id, a comma list (`1,2,3` or `{1,2,3}`) or an inclusive range (`10-20`),
//! and are expanded into one entry per id. When the same id is defined more
//! than once the last definition wins.

use std::path::Path;

use hashbrown::HashMap as FastHashMap;
use rustc_hash::FxHasher;

use crate::Result;

type FxHashMap<K, V> = FastHashMap<K, V, std::hash::BuildHasherDefault<FxHasher>>;

/// Largest number of ids a single key may expand to.
const MAX_KEY_EXPANSION: usize = 0x10000;

/// A record type that can be decoded from one definition line.
pub trait DefRecord: Clone + Default {
    /// Decode the fields following the key for one expanded `id`.
    fn parse(id: u32, fields: &[&str]) -> Option<Self>;
}

/// A definition table keyed by numeric id.
#[derive(Debug, Clone)]
pub struct DefFileLoader<T> {
    entries: FxHashMap<u32, T>,
}

impl<T> Default for DefFileLoader<T> {
    fn default() -> Self {
        Self {
            entries: FxHashMap::default(),
        }
    }
}

impl<T: DefRecord> DefFileLoader<T> {
    /// Read and parse a definition file. Only a missing or unreadable file
    /// is an error; bad lines are skipped.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| mulberry_common::Error::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let table = Self::parse(&text);
        tracing::debug!("{}: {} definitions", path.display(), table.len());
        Ok(table)
    }

    /// Parse a whole table. Lines that fail to parse are skipped with a
    /// warning.
    pub fn parse(text: &str) -> Self {
        let mut entries = FxHashMap::default();

        for (number, line) in text.lines().enumerate() {
            let line = strip_comment(line).trim();
            if line.is_empty() {
                continue;
            }

            let tokens = tokenize(line);
            let Some((key, fields)) = tokens.split_first() else {
                continue;
            };

            let Some(ids) = expand_key(key) else {
                tracing::warn!("Definition line {}: invalid key {:?}", number + 1, key);
                continue;
            };

            for id in ids {
                match T::parse(id, fields) {
                    Some(record) => {
                        entries.insert(id, record);
                    }
                    None => {
                        tracing::warn!("Definition line {}: cannot parse {:?}", number + 1, line);
                        break;
                    }
                }
            }
        }

        Self { entries }
    }

    /// The entry for `id`, or the default record when there is none.
    pub fn get(&self, id: u32) -> T {
        self.entries.get(&id).cloned().unwrap_or_default()
    }

    #[inline]
    pub fn lookup(&self, id: u32) -> Option<&T> {
        self.entries.get(&id)
    }

    #[inline]
    pub fn has_value(&self, id: u32) -> bool {
        self.entries.contains_key(&id)
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

fn strip_comment(line: &str) -> &str {
    match memchr::memchr(b'#', line.as_bytes()) {
        Some(pos) => &line[..pos],
        None => line,
    }
}

/// Split a line on whitespace, keeping `{...}` groups together.
fn tokenize(line: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut start = None;
    let mut depth = 0u32;

    for (i, c) in line.char_indices() {
        match c {
            '{' => {
                depth += 1;
                start.get_or_insert(i);
            }
            '}' => depth = depth.saturating_sub(1),
            c if c.is_whitespace() && depth == 0 => {
                if let Some(s) = start.take() {
                    tokens.push(&line[s..i]);
                }
            }
            _ => {
                start.get_or_insert(i);
            }
        }
    }
    if let Some(s) = start {
        tokens.push(&line[s..]);
    }

    tokens
}

/// Strip one level of braces from a field.
pub fn unbrace(field: &str) -> &str {
    field
        .strip_prefix('{')
        .and_then(|f| f.strip_suffix('}'))
        .unwrap_or(field)
        .trim()
}

/// Expand a key into the ids it names.
fn expand_key(key: &str) -> Option<Vec<u32>> {
    let mut ids = Vec::new();

    for part in unbrace(key).split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }

        let (low, high): (u32, u32) = match part.split_once('-') {
            Some((low, high)) => (low.trim().parse().ok()?, high.trim().parse().ok()?),
            None => {
                let id: u32 = part.parse().ok()?;
                (id, id)
            }
        };
        if low > high {
            return None;
        }
        let span = u64::from(high - low) + 1;
        if ids.len() as u64 + span > MAX_KEY_EXPANSION as u64 {
            return None;
        }
        ids.extend(low..=high);
    }

    (!ids.is_empty()).then_some(ids)
}

/// `body.def`: a body replaced by another body with an optional hue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct BodyDef {
    /// Body being replaced, `0` for the default record
    pub orig_body: u32,
    /// Body drawn instead
    pub new_body: u32,
    /// Hue applied to the replacement, `0` for none
    pub hue: u32,
}

impl DefRecord for BodyDef {
    fn parse(id: u32, fields: &[&str]) -> Option<Self> {
        let targets = fields.first()?;
        // Alternatives are listed in braces; the first one is used.
        let new_body = unbrace(targets).split(',').next()?.trim().parse().ok()?;
        let hue = match fields.get(1) {
            Some(h) => h.parse().ok()?,
            None => 0,
        };
        Some(Self {
            orig_body: id,
            new_body,
            hue,
        })
    }
}

/// `bodyconv.def`: where a body's animation lives in the extra animation
/// files. Columns hold the in-file index for `anim2` to `anim5`, `-1` when
/// the body is not in that file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct BodyConvDef {
    /// `0` for the default record
    pub body_id: u32,
    /// Body index in `anim2`
    pub anim2: i32,
    /// Body index in `anim3`
    pub anim3: i32,
    /// Body index in `anim4`
    pub anim4: i32,
    /// Body index in `anim5`
    pub anim5: i32,
}

impl Default for BodyConvDef {
    fn default() -> Self {
        Self {
            body_id: 0,
            anim2: -1,
            anim3: -1,
            anim4: -1,
            anim5: -1,
        }
    }
}

impl BodyConvDef {
    /// Animation file slot and in-file body index this entry points to.
    ///
    /// `None` when the record is the default or names no file, in which
    /// case the body is read from the first file under its own id.
    pub fn redirect(&self) -> Option<(usize, u32)> {
        if self.body_id == 0 {
            return None;
        }
        [self.anim2, self.anim3, self.anim4, self.anim5]
            .into_iter()
            .enumerate()
            .find_map(|(i, index)| u32::try_from(index).ok().map(|index| (i + 1, index)))
    }
}

impl DefRecord for BodyConvDef {
    fn parse(id: u32, fields: &[&str]) -> Option<Self> {
        let mut columns = [-1i32; 4];
        for (column, field) in columns.iter_mut().zip(fields) {
            *column = field.parse().ok()?;
        }
        Some(Self {
            body_id: id,
            anim2: columns[0],
            anim3: columns[1],
            anim4: columns[2],
            anim5: columns[3],
        })
    }
}
