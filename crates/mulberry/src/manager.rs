//! The asset facade.

use std::sync::Arc;

use mulberry_formats::{
    AnimDataLoader, AnimLoader, Animation, ArtLoader, BodyConvDef, BodyDef, DefFileLoader,
    GumpArtLoader, HuesLoader, MapLoader, MapTexLoader, MobType, MobTypesLoader, StaticsLoader,
    TileDataLoader, UniFontLoader,
};
use mulberry_index::FileCatalog;

use crate::config::{AnimConfig, AssetConfig, MapConfig, ANIM_SLOTS, MAP_SLOTS};
use crate::variants::Variants;
use crate::{Error, Result, TextureProvider};

/// Number of unicode font slots.
pub const FONT_SLOTS: usize = 13;

/// Facings returned by [`AssetManager::get_anim`].
pub const DIRECTIONS: usize = 8;

/// Whether entry `direction` of [`AssetManager::get_anim`] must be drawn
/// mirrored. The first three entries reuse the stored left-facing
/// sequences for the right-facing directions.
#[inline]
pub fn is_mirrored(direction: usize) -> bool {
    direction < 3
}

/// Every loader of one data set, built once and then only queried.
///
/// Construction fails on the first missing required file or invalid
/// setting. A multi-variant family with nothing enabled is not an error at
/// construction time. After that, out-of-range variant indices are clamped,
/// unloaded variants fall back to the first loaded one and absent records
/// produce empty values, each with a logged warning. The only query errors
/// are loader lookups on a family with no loaded variant at all.
#[derive(Debug)]
pub struct AssetManager {
    catalog: FileCatalog,
    tile_data: TileDataLoader,
    hues: HuesLoader,
    map_textures: MapTexLoader,
    art: ArtLoader,
    gump_art: GumpArtLoader,
    anim_data: AnimDataLoader,
    maps: Variants<MapLoader, MAP_SLOTS>,
    statics: Variants<StaticsLoader, MAP_SLOTS>,
    anims: Variants<AnimLoader, ANIM_SLOTS>,
    fonts: Variants<UniFontLoader, FONT_SLOTS>,
    mob_types: MobTypesLoader,
    body_defs: DefFileLoader<BodyDef>,
    body_conversions: DefFileLoader<BodyConvDef>,
}

impl AssetManager {
    /// Build every loader the configuration asks for.
    pub fn create(config: &AssetConfig) -> Result<Self> {
        config.validate()?;

        let directories = &config.directories;
        let catalog = FileCatalog::build(&directories.base, directories.shard.as_deref())?;
        tracing::info!(
            "Catalogued {} files from {} (shard {:?})",
            catalog.len(),
            directories.base.display(),
            directories.shard
        );

        let path = catalog.require("tiledata.mul")?;
        tracing::info!("Opening tiledata from mul={}", path.display());
        let tile_data = TileDataLoader::open(path)?;

        let path = catalog.require("hues.mul")?;
        tracing::info!("Opening hues from mul={}", path.display());
        let hues = HuesLoader::open(path)?;

        tracing::info!("Opening maptex from texidx.mul/texmaps.mul");
        let map_textures = MapTexLoader::from_catalog(&catalog)?;

        tracing::info!("Opening art from artidx.mul/art.mul");
        let art = ArtLoader::from_catalog(&catalog)?;

        tracing::info!("Opening gump art from gumpidx.mul/gumpart.mul");
        let gump_art = GumpArtLoader::from_catalog(&catalog)?;

        let path = catalog.require("animdata.mul")?;
        tracing::info!("Opening animdata from mul={}", path.display());
        let anim_data = AnimDataLoader::open(path)?;

        let mut map_slots: [Option<MapLoader>; MAP_SLOTS] = Default::default();
        let mut statics_slots: [Option<StaticsLoader>; MAP_SLOTS] = Default::default();
        for index in 0..MAP_SLOTS {
            let Some(map) = config.map(index) else {
                continue;
            };
            map_slots[index] = Some(open_map(&catalog, map)?);
            statics_slots[index] = Some(open_statics(&catalog, map)?);
        }
        let maps = Variants::new("map", map_slots);
        let statics = Variants::new("statics", statics_slots);

        let mut anim_slots: [Option<AnimLoader>; ANIM_SLOTS] = Default::default();
        for index in 0..ANIM_SLOTS {
            if let Some(anim) = config.anim(index) {
                anim_slots[index] = Some(open_anim(&catalog, anim)?);
            }
        }
        let anims = Variants::new("anim", anim_slots);

        let path = catalog.require("mobtypes.txt")?;
        tracing::info!("Opening mobtypes.txt from path={}", path.display());
        let mob_types = MobTypesLoader::open(path)?;

        let mut font_slots: [Option<UniFontLoader>; FONT_SLOTS] = Default::default();
        for (index, slot) in font_slots.iter_mut().enumerate() {
            let name = font_file_name(index);
            let Some(path) = catalog.resolve(&name) else {
                tracing::warn!("Unable to find {}", name);
                continue;
            };
            tracing::info!("Opening {} from path={}", name, path.display());
            match UniFontLoader::open(path) {
                Ok(font) => *slot = Some(font),
                Err(e) => tracing::warn!("Skipping {}: {}", name, e),
            }
        }
        let fonts = Variants::new("unifont", font_slots);

        let path = catalog.require("body.def")?;
        tracing::info!("Opening body.def from path={}", path.display());
        let body_defs = DefFileLoader::open(path)?;

        let path = catalog.require("bodyconv.def")?;
        tracing::info!("Opening bodyconv.def from path={}", path.display());
        let body_conversions = DefFileLoader::open(path)?;

        Ok(Self {
            catalog,
            tile_data,
            hues,
            map_textures,
            art,
            gump_art,
            anim_data,
            maps,
            statics,
            anims,
            fonts,
            mob_types,
            body_defs,
            body_conversions,
        })
    }

    #[inline]
    pub fn catalog(&self) -> &FileCatalog {
        &self.catalog
    }

    #[inline]
    pub fn tile_data(&self) -> &TileDataLoader {
        &self.tile_data
    }

    #[inline]
    pub fn hues(&self) -> &HuesLoader {
        &self.hues
    }

    #[inline]
    pub fn map_textures(&self) -> &MapTexLoader {
        &self.map_textures
    }

    #[inline]
    pub fn art(&self) -> &ArtLoader {
        &self.art
    }

    #[inline]
    pub fn gump_art(&self) -> &GumpArtLoader {
        &self.gump_art
    }

    #[inline]
    pub fn anim_data(&self) -> &AnimDataLoader {
        &self.anim_data
    }

    #[inline]
    pub fn mob_types(&self) -> &MobTypesLoader {
        &self.mob_types
    }

    #[inline]
    pub fn body_defs(&self) -> &DefFileLoader<BodyDef> {
        &self.body_defs
    }

    #[inline]
    pub fn body_conversions(&self) -> &DefFileLoader<BodyConvDef> {
        &self.body_conversions
    }

    /// Map plane slots, for enumerating what was loaded.
    #[inline]
    pub fn maps(&self) -> &Variants<MapLoader, MAP_SLOTS> {
        &self.maps
    }

    #[inline]
    pub fn anims(&self) -> &Variants<AnimLoader, ANIM_SLOTS> {
        &self.anims
    }

    /// Font slots.
    #[inline]
    pub fn fonts(&self) -> &Variants<UniFontLoader, FONT_SLOTS> {
        &self.fonts
    }

    /// Terrain of plane `index`. Fails with [`Error::NoVariant`] only when
    /// no plane is enabled.
    #[inline]
    pub fn map_loader(&self, index: usize) -> Result<&Arc<MapLoader>> {
        self.maps.get(index)
    }

    /// Statics of plane `index`. Fails like [`AssetManager::map_loader`].
    #[inline]
    pub fn statics_loader(&self, index: usize) -> Result<&Arc<StaticsLoader>> {
        self.statics.get(index)
    }

    /// Animation file `index`. Fails with [`Error::NoVariant`] only when no
    /// animation file is enabled.
    #[inline]
    pub fn anim_loader(&self, index: usize) -> Result<&Arc<AnimLoader>> {
        self.anims.get(index)
    }

    /// Unicode font `index`. Fails with [`Error::NoVariant`] only when the
    /// data set has no usable font file.
    #[inline]
    pub fn unifont_loader(&self, index: usize) -> Result<&Arc<UniFontLoader>> {
        self.fonts.get(index)
    }

    /// The eight facings of `action` for `body`.
    ///
    /// Bodies listed in `bodyconv.def` are read from the animation file and
    /// index it names; all others from file 0 under their own id. The
    /// stored facings are `[down, down-left, left, up-left, up]`; the result
    /// is `[up-left, left, down-left, down, down-left, left, up-left, up]`,
    /// where the first three entries are drawn mirrored (see
    /// [`is_mirrored`]). With no animation file loaded every facing is
    /// empty.
    pub fn get_anim(&self, body: u32, action: u32) -> [Arc<Animation>; DIRECTIONS] {
        let redirect = self
            .body_conversions
            .lookup(body)
            .and_then(BodyConvDef::redirect);

        let (file, index) = match redirect {
            Some((file, index)) => {
                tracing::debug!(
                    "Redirecting anim body={} fileIdx={} idx in file={}",
                    body,
                    file,
                    index
                );
                (file, index)
            }
            None => (0, body),
        };
        let Ok(loader) = self.anims.get(file) else {
            return Default::default();
        };

        let [down, down_left, left, up_left, up] =
            [0, 1, 2, 3, 4].map(|direction| loader.get_animation(index, action, direction));

        [
            up_left.clone(),
            left.clone(),
            down_left.clone(),
            down,
            down_left,
            left,
            up_left,
            up,
        ]
    }

    /// Body definition of `body`.
    ///
    /// `bodyconv.def` supersedes `body.def`: a body with a conversion entry
    /// gets the default definition.
    pub fn body_def(&self, body: u32) -> BodyDef {
        if self.body_conversions.has_value(body) {
            return BodyDef::default();
        }
        self.body_defs.get(body)
    }

    /// Creature class of `body`.
    #[inline]
    pub fn mob_type(&self, body: u32) -> MobType {
        self.mob_types.mob_type(body)
    }

    /// How to draw item `art_id`, chosen by its tile animation flag.
    pub fn item_texture_provider(&self, art_id: u32) -> TextureProvider {
        match self.tile_data.static_tile_info(art_id) {
            Some(info) if info.animation() => TextureProvider::Animated(art_id),
            Some(_) => TextureProvider::Static(art_id),
            None => {
                tracing::warn!("No tile data for item {}", art_id);
                TextureProvider::Static(art_id)
            }
        }
    }
}

fn open_map(catalog: &FileCatalog, map: &MapConfig) -> Result<MapLoader> {
    let index = map.index;
    let path = catalog.require(&format!("map{index}.mul"))?;

    let loader = if map.difs_enabled {
        let dif_list = catalog.require(&format!("mapdifl{index}.mul"))?;
        let dif = catalog.require(&format!("mapdif{index}.mul"))?;
        tracing::info!(
            "Opening map{} from mul={}, dif-offsets={}, dif={}, blockCountX={}, blockCountY={}",
            index,
            path.display(),
            dif_list.display(),
            dif.display(),
            map.width,
            map.height
        );
        MapLoader::open_patched(path, dif_list, dif, map.width, map.height)?
    } else {
        tracing::info!(
            "Opening map{} from mul={}, difs disabled, blockCountX={}, blockCountY={}",
            index,
            path.display(),
            map.width,
            map.height
        );
        MapLoader::open(path, map.width, map.height)?
    };

    Ok(loader)
}

fn open_statics(catalog: &FileCatalog, map: &MapConfig) -> Result<StaticsLoader> {
    let index = map.index;
    let index_path = catalog.require(&format!("staidx{index}.mul"))?;
    let path = catalog.require(&format!("statics{index}.mul"))?;

    let loader = if map.difs_enabled {
        let dif_list = catalog.require(&format!("stadifl{index}.mul"))?;
        let dif_index = catalog.require(&format!("stadifi{index}.mul"))?;
        let dif = catalog.require(&format!("stadif{index}.mul"))?;
        tracing::info!(
            "Opening statics{} from idx={}, mul={}, dif-offsets={}, dif-idx={}, dif={}",
            index,
            index_path.display(),
            path.display(),
            dif_list.display(),
            dif_index.display(),
            dif.display()
        );
        StaticsLoader::open_patched(
            index_path, path, dif_list, dif_index, dif, map.width, map.height,
        )?
    } else {
        tracing::info!(
            "Opening statics{} from idx={}, mul={}, difs disabled",
            index,
            index_path.display(),
            path.display()
        );
        StaticsLoader::open(index_path, path, map.width, map.height)?
    };

    Ok(loader)
}

fn open_anim(catalog: &FileCatalog, anim: &AnimConfig) -> Result<AnimLoader> {
    let stem = anim_file_stem(anim.index);
    let index_path = catalog.require(&format!("{stem}.idx"))?;
    let path = catalog.require(&format!("{stem}.mul"))?;
    tracing::info!(
        "Opening {} from idx={}, mul={}, high-detail={}, low-detail={}",
        stem,
        index_path.display(),
        path.display(),
        anim.high_detail,
        anim.low_detail
    );
    Ok(AnimLoader::open(
        index_path,
        path,
        anim.high_detail,
        anim.low_detail,
    )?)
}

/// `anim` for slot 0, `anim2` for slot 1 and so on.
pub fn anim_file_stem(index: usize) -> String {
    if index == 0 {
        "anim".to_string()
    } else {
        format!("anim{}", index + 1)
    }
}

/// `unifont.mul` for slot 0, `unifont1.mul` for slot 1 and so on.
pub fn font_file_name(index: usize) -> String {
    if index == 0 {
        "unifont.mul".to_string()
    } else {
        format!("unifont{index}.mul")
    }
}
