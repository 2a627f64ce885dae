//! Asset configuration.
//!
//! Read from an XML document:
//!
//! ```xml
//! <assets>
//!   <directories base="/games/uo" shard="shards/test/data"/>
//!   <map index="0" enabled="true" width="768" height="512" difs-enabled="true"/>
//!   <anim index="0" enabled="true" highdetail="200" lowdetail="200"/>
//! </assets>
//! ```
//!
//! Map planes and animation files that are not listed are disabled.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::{Error, Result};

/// Number of map (and statics) plane slots.
pub const MAP_SLOTS: usize = 6;
/// Number of animation file slots.
pub const ANIM_SLOTS: usize = 6;

/// Base and shard data directories.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Directories {
    #[serde(rename = "@base", default)]
    pub base: PathBuf,
    /// Optional override directory
    #[serde(rename = "@shard", default)]
    pub shard: Option<PathBuf>,
}

/// One map plane and its statics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct MapConfig {
    #[serde(rename = "@index")]
    pub index: usize,
    #[serde(rename = "@enabled", default = "enabled_by_default")]
    pub enabled: bool,
    /// Width in blocks
    #[serde(rename = "@width", default)]
    pub width: u32,
    /// Height in blocks
    #[serde(rename = "@height", default)]
    pub height: u32,
    /// Apply the plane's dif patch files
    #[serde(rename = "@difs-enabled", default)]
    pub difs_enabled: bool,
}

/// One animation file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct AnimConfig {
    #[serde(rename = "@index")]
    pub index: usize,
    #[serde(rename = "@enabled", default = "enabled_by_default")]
    pub enabled: bool,
    /// Number of high-detail bodies at the start of the file
    #[serde(rename = "@highdetail", default)]
    pub high_detail: u32,
    /// Number of low-detail bodies after them
    #[serde(rename = "@lowdetail", default)]
    pub low_detail: u32,
}

fn enabled_by_default() -> bool {
    true
}

/// Everything needed to build an [`AssetManager`](crate::AssetManager).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename = "assets")]
pub struct AssetConfig {
    #[serde(default)]
    pub directories: Directories,
    #[serde(rename = "map", default)]
    pub maps: Vec<MapConfig>,
    #[serde(rename = "anim", default)]
    pub anims: Vec<AnimConfig>,
}

impl AssetConfig {
    /// A configuration reading from `base` with nothing enabled yet.
    pub fn new<P: Into<PathBuf>>(base: P) -> Self {
        Self {
            directories: Directories {
                base: base.into(),
                shard: None,
            },
            ..Self::default()
        }
    }

    /// Use `shard` as the override directory.
    pub fn with_shard<P: Into<PathBuf>>(mut self, shard: P) -> Self {
        self.directories.shard = Some(shard.into());
        self
    }

    /// Enable map plane `index` (and its statics) with a block grid size.
    pub fn with_map(mut self, index: usize, width: u32, height: u32, difs_enabled: bool) -> Self {
        self.maps.retain(|m| m.index != index);
        self.maps.push(MapConfig {
            index,
            enabled: true,
            width,
            height,
            difs_enabled,
        });
        self
    }

    /// Enable animation file `index` with its detail class sizes.
    pub fn with_anim(mut self, index: usize, high_detail: u32, low_detail: u32) -> Self {
        self.anims.retain(|a| a.index != index);
        self.anims.push(AnimConfig {
            index,
            enabled: true,
            high_detail,
            low_detail,
        });
        self
    }

    /// Parse and validate an XML document.
    pub fn from_xml_str(xml: &str) -> Result<Self> {
        let config: Self = quick_xml::de::from_str(xml)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a configuration file. Relative directories are resolved
    /// against the file's own directory.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let xml = std::fs::read_to_string(path).map_err(|source| {
            Error::ConfigRead(mulberry_common::Error::Open {
                path: path.to_path_buf(),
                source,
            })
        })?;

        let mut config = Self::from_xml_str(&xml)?;
        if let Some(parent) = path.parent() {
            config.directories.base = parent.join(&config.directories.base);
            config.directories.shard = config.directories.shard.map(|s| parent.join(s));
        }
        Ok(config)
    }

    /// Check ranges and required values.
    pub fn validate(&self) -> Result<()> {
        if self.directories.base.as_os_str().is_empty() {
            return Err(Error::InvalidConfig("base directory is not set".into()));
        }

        let mut seen = [false; MAP_SLOTS];
        for map in &self.maps {
            let Some(slot) = seen.get_mut(map.index) else {
                return Err(Error::InvalidConfig(format!(
                    "map index {} is outside 0..{}",
                    map.index, MAP_SLOTS
                )));
            };
            if std::mem::replace(slot, true) {
                return Err(Error::InvalidConfig(format!("map {} is listed twice", map.index)));
            }
            if map.enabled && (map.width == 0 || map.height == 0) {
                return Err(Error::InvalidConfig(format!(
                    "map {} is enabled with a {}x{} block grid",
                    map.index, map.width, map.height
                )));
            }
        }

        let mut seen = [false; ANIM_SLOTS];
        for anim in &self.anims {
            let Some(slot) = seen.get_mut(anim.index) else {
                return Err(Error::InvalidConfig(format!(
                    "anim index {} is outside 0..{}",
                    anim.index, ANIM_SLOTS
                )));
            };
            if std::mem::replace(slot, true) {
                return Err(Error::InvalidConfig(format!("anim {} is listed twice", anim.index)));
            }
        }

        Ok(())
    }

    /// Configuration of map plane `index`, if it is enabled.
    pub fn map(&self, index: usize) -> Option<&MapConfig> {
        self.maps.iter().find(|m| m.index == index && m.enabled)
    }

    /// Configuration of animation file `index`, if it is enabled.
    pub fn anim(&self, index: usize) -> Option<&AnimConfig> {
        self.anims.iter().find(|a| a.index == index && a.enabled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn test_from_xml() {
        let config = AssetConfig::from_xml_str(
            r#"<assets>
                <directories base="/games/uo" shard="shards/test/data"/>
                <map index="0" enabled="true" width="768" height="512" difs-enabled="true"/>
                <map index="2" enabled="false"/>
                <anim index="0" highdetail="200" lowdetail="200"/>
            </assets>"#,
        )
        .unwrap();

        assert_eq!(config.directories.base, PathBuf::from("/games/uo"));
        assert_eq!(config.directories.shard, Some(PathBuf::from("shards/test/data")));
        let map = config.map(0).unwrap();
        assert_eq!((map.width, map.height, map.difs_enabled), (768, 512, true));
        assert!(config.map(1).is_none());
        assert!(config.map(2).is_none());
        assert_eq!(config.anim(0).unwrap().high_detail, 200);
    }

    #[test]
    fn test_builder_matches_xml() {
        let built = AssetConfig::new("/uo").with_map(1, 8, 8, false).with_anim(0, 1, 2);
        let parsed = AssetConfig::from_xml_str(
            r#"<assets>
                <directories base="/uo"/>
                <map index="1" enabled="true" width="8" height="8" difs-enabled="false"/>
                <anim index="0" enabled="true" highdetail="1" lowdetail="2"/>
            </assets>"#,
        )
        .unwrap();
        assert_eq!(built, parsed);
    }

    #[test]
    fn test_validation() {
        let cases = [
            AssetConfig::default(),
            AssetConfig::new("/uo").with_map(6, 8, 8, false),
            AssetConfig::new("/uo").with_map(0, 0, 8, false),
            AssetConfig::new("/uo").with_anim(9, 0, 0),
        ];
        for config in cases {
            assert_eq!(config.validate().unwrap_err().kind(), ErrorKind::ConfigInvalid);
        }

        let duplicate = r#"<assets><directories base="/uo"/>
            <anim index="1"/><anim index="1"/></assets>"#;
        assert!(AssetConfig::from_xml_str(duplicate).is_err());
        assert_eq!(
            AssetConfig::from_xml_str("<assets><map").unwrap_err().kind(),
            ErrorKind::ConfigInvalid
        );
    }

    #[test]
    fn test_load_resolves_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("assets.xml");
        std::fs::write(
            &path,
            r#"<assets><directories base="mul" shard="shard"/></assets>"#,
        )
        .unwrap();

        let config = AssetConfig::load(&path).unwrap();
        assert_eq!(config.directories.base, dir.path().join("mul"));
        assert_eq!(config.directories.shard, Some(dir.path().join("shard")));

        let missing = AssetConfig::load(dir.path().join("nope.xml")).unwrap_err();
        assert_eq!(missing.kind(), ErrorKind::ConfigInvalid);
    }
}
