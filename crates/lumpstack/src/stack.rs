//! Ordered stacks of resource locations.
//!
//! A stack is what a map editor loads for one project: the game's IWAD, then
//! any number of mods on top. Later locations override earlier ones, so every
//! category is folded from the last engine to the first with first-wins
//! semantics. Text lumps are concatenated in stack order for consumers that
//! apply "later extends earlier".

use crate::cache::ParserCache;
use crate::engine::{EngineOptions, ResourceEngine};
use crate::error::{Error, Result};
use crate::image::{ImageMap, ImageRecord};
use crate::location::ResourceLocation;
use crate::lumps::{ColorMap, Palette, PatchNames};
use crate::text::{GameType, ScriptType, TextResourceData};
use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Stack file contents (`lumpstack.toml` or a JSON equivalent).
///
/// ```toml
/// game = "doom"
/// long_texture_names = false
///
/// [[locations]]
/// kind = "archive"
/// path = "iwads/DOOM2.WAD"
///
/// [[locations]]
/// kind = "directory"
/// path = "mymod"
/// root_textures = true
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StackConfig {
    #[serde(default)]
    pub game: GameType,

    #[serde(default)]
    pub long_texture_names: bool,

    #[serde(default)]
    pub read_only: bool,

    #[serde(default)]
    pub locations: Vec<ResourceLocation>,
}

impl StackConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Load a stack file. `.json` files are read as JSON, anything else as
    /// TOML. Relative location paths are resolved against the file's directory.
    pub fn load(path: &Utf8Path) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_std_path())?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let mut config = if is_json {
            Self::from_json_str(&content)?
        } else {
            Self::from_toml_str(&content)?
        };

        if let Some(base) = path.parent() {
            config.resolve_paths(base);
        }
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::InvalidConfig(e.to_string()))
    }

    /// Make relative location paths relative to `base`.
    pub fn resolve_paths(&mut self, base: &Utf8Path) {
        for location in &mut self.locations {
            if location.path.is_relative() {
                location.path = base.join(&location.path);
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        for location in &self.locations {
            if location.path.as_str().is_empty() {
                return Err(Error::InvalidConfig("location with an empty path".into()));
            }
        }
        Ok(())
    }

    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            long_texture_names: self.long_texture_names,
            read_only: self.read_only,
        }
    }
}

/// One engine per configured location, queried as a single resource space.
#[derive(Debug)]
pub struct ResourceStack {
    game: GameType,
    engines: Vec<ResourceEngine>,
}

impl ResourceStack {
    /// Open every location of `config`, in order.
    ///
    /// A location that cannot be opened is logged and left out of the stack.
    pub fn open(config: &StackConfig) -> Result<Self> {
        config.validate()?;
        let options = config.engine_options();
        let mut engines = Vec::with_capacity(config.locations.len());

        for location in &config.locations {
            match ResourceEngine::open(location.clone(), options) {
                Ok(engine) => {
                    tracing::info!(
                        "Opened '{}' ({} embedded archives)",
                        engine.display_name(),
                        engine.sub_readers().len()
                    );
                    engines.push(engine);
                }
                Err(e) => tracing::error!("Unable to open '{}': {}", location.path, e),
            }
        }

        Ok(Self::from_engines(config.game, engines))
    }

    /// Load and open a stack file.
    pub fn load(path: &Utf8Path) -> Result<Self> {
        Self::open(&StackConfig::load(path)?)
    }

    pub fn from_engines(game: GameType, engines: Vec<ResourceEngine>) -> Self {
        Self { game, engines }
    }

    pub fn game(&self) -> GameType {
        self.game
    }

    pub fn engines(&self) -> &[ResourceEngine] {
        &self.engines
    }

    pub fn len(&self) -> usize {
        self.engines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.engines.is_empty()
    }

    pub fn locations(&self) -> Vec<Utf8PathBuf> {
        self.engines.iter().map(|e| e.location().path.clone()).collect()
    }

    pub fn suspend(&mut self) -> Result<()> {
        self.engines.iter_mut().try_for_each(ResourceEngine::suspend)
    }

    pub fn resume(&mut self) -> Result<()> {
        self.engines.iter_mut().try_for_each(ResourceEngine::resume)
    }

    pub fn dispose(&mut self) {
        for engine in &mut self.engines {
            engine.dispose();
        }
    }

    fn last_found<T>(
        &mut self,
        mut load: impl FnMut(&mut ResourceEngine) -> Result<Option<T>>,
    ) -> Result<Option<T>> {
        for engine in self.engines.iter_mut().rev() {
            if let Some(found) = load(engine)? {
                return Ok(Some(found));
            }
        }
        Ok(None)
    }

    fn merged(
        &mut self,
        mut load: impl FnMut(&mut ResourceEngine) -> Result<Vec<ImageRecord>>,
    ) -> Result<Vec<ImageRecord>> {
        let mut images = ImageMap::new();
        for engine in self.engines.iter_mut().rev() {
            images.fold(load(engine)?);
        }
        Ok(images.into_vec())
    }

    fn concatenated(
        &mut self,
        mut load: impl FnMut(&mut ResourceEngine) -> Result<Vec<TextResourceData>>,
    ) -> Result<Vec<TextResourceData>> {
        let mut result = Vec::new();
        for engine in &mut self.engines {
            result.extend(load(engine)?);
        }
        Ok(result)
    }

    pub fn load_palette(&mut self) -> Result<Option<Palette>> {
        self.last_found(ResourceEngine::load_palette)
    }

    pub fn load_main_colormap(&mut self) -> Result<Option<ColorMap>> {
        self.last_found(ResourceEngine::load_main_colormap)
    }

    pub fn load_patch_names(&mut self) -> Result<Option<PatchNames>> {
        self.last_found(ResourceEngine::load_patch_names)
    }

    /// Textures of the whole stack.
    ///
    /// `PNAMES` is a running table: locations are visited bottom to top and a
    /// location with its own `PNAMES` replaces the table for itself and every
    /// location above it. The per-location results are then merged with the
    /// topmost location winning.
    pub fn load_textures(&mut self, cache: &mut ParserCache) -> Result<Vec<ImageRecord>> {
        let mut pnames = PatchNames::default();
        let mut per_location = Vec::with_capacity(self.engines.len());
        for engine in &mut self.engines {
            if let Some(own) = engine.load_patch_names()?.filter(|p| !p.is_empty()) {
                pnames = own;
            }
            per_location.push(engine.load_textures(&pnames, cache)?);
        }

        let mut images = ImageMap::new();
        for records in per_location.into_iter().rev() {
            images.fold(records);
        }
        Ok(images.into_vec())
    }

    pub fn load_flats(&mut self, cache: &mut ParserCache) -> Result<Vec<ImageRecord>> {
        self.merged(|engine| engine.load_flats(cache))
    }

    pub fn load_sprites(&mut self, cache: &mut ParserCache) -> Result<Vec<ImageRecord>> {
        self.merged(|engine| engine.load_sprites(cache))
    }

    pub fn load_hires_textures(&mut self) -> Result<Vec<ImageRecord>> {
        self.merged(ResourceEngine::load_hires_textures)
    }

    pub fn load_colormaps(&mut self) -> Result<Vec<ImageRecord>> {
        self.merged(ResourceEngine::load_colormaps)
    }

    pub fn sprite_names(&mut self) -> Result<BTreeSet<String>> {
        let mut names = BTreeSet::new();
        for engine in &mut self.engines {
            names.extend(engine.sprite_names()?);
        }
        Ok(names)
    }

    pub fn voxel_names(&mut self) -> Result<BTreeSet<String>> {
        let mut names = BTreeSet::new();
        for engine in &mut self.engines {
            names.extend(engine.voxel_names()?);
        }
        Ok(names)
    }

    pub fn decorate_data(&mut self, name: &str) -> Result<Vec<TextResourceData>> {
        self.concatenated(|engine| engine.decorate_data(name))
    }

    pub fn zscript_data(&mut self, name: &str) -> Result<Vec<TextResourceData>> {
        self.concatenated(|engine| engine.zscript_data(name))
    }

    pub fn modeldef_data(&mut self, name: &str) -> Result<Vec<TextResourceData>> {
        self.concatenated(|engine| engine.modeldef_data(name))
    }

    pub fn mapinfo_data(&mut self) -> Result<Vec<TextResourceData>> {
        self.concatenated(ResourceEngine::mapinfo_data)
    }

    /// GLDEFS lumps for the stack's configured game.
    pub fn gldefs_data(&mut self) -> Result<Vec<TextResourceData>> {
        let game = self.game;
        self.concatenated(|engine| engine.gldefs_data(game))
    }

    pub fn dehacked_data(&mut self) -> Result<Vec<TextResourceData>> {
        self.concatenated(ResourceEngine::dehacked_data)
    }

    pub fn iwadinfo_data(&mut self) -> Result<Vec<TextResourceData>> {
        self.concatenated(ResourceEngine::iwadinfo_data)
    }

    pub fn text_lump_data(
        &mut self,
        script_type: ScriptType,
        singular: bool,
        partial: bool,
    ) -> Result<Vec<TextResourceData>> {
        self.concatenated(|engine| engine.text_lump_data(script_type, singular, partial))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::LocationKind;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_parse_toml() {
        let config = StackConfig::from_toml_str(
            r#"
            game = "hexen"

            [[locations]]
            kind = "archive"
            path = "iwads/HEXEN.WAD"

            [[locations]]
            kind = "directory"
            path = "/mods/mymod"
            display_name = "My Mod"
            root_textures = true
            "#,
        )
        .unwrap();

        assert_eq!(config.game, GameType::Hexen);
        assert!(!config.long_texture_names);
        assert_eq!(config.locations.len(), 2);
        assert_eq!(config.locations[0].kind, LocationKind::Archive);
        assert!(config.locations[1].root_textures);
        assert_eq!(config.locations[1].display_name(), "My Mod");
    }

    #[test]
    fn test_parse_json() {
        let config = StackConfig::from_json_str(
            r#"{ "long_texture_names": true, "locations": [ { "kind": "directory", "path": "res" } ] }"#,
        )
        .unwrap();
        assert_eq!(config.game, GameType::Unknown);
        assert_eq!(
            config.engine_options(),
            EngineOptions {
                long_texture_names: true,
                read_only: false,
            }
        );
    }

    #[test]
    fn test_bad_kind_is_rejected() {
        let result = StackConfig::from_toml_str(
            r#"
            [[locations]]
            kind = "floppy"
            path = "a"
            "#,
        );
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_load_resolves_relative_paths() {
        let dir = tempdir().unwrap();
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
        fs::create_dir(root.join("res").as_std_path()).unwrap();
        fs::write(
            root.join("lumpstack.toml").as_std_path(),
            "[[locations]]\nkind = \"directory\"\npath = \"res\"\n",
        )
        .unwrap();

        let config = StackConfig::load(&root.join("lumpstack.toml")).unwrap();
        assert_eq!(config.locations[0].path, root.join("res"));

        let stack = ResourceStack::open(&config).unwrap();
        assert_eq!(stack.len(), 1);
    }

    #[test]
    fn test_missing_location_is_skipped() {
        let config = StackConfig {
            locations: vec![ResourceLocation::directory("/definitely/not/here")],
            ..Default::default()
        };
        let stack = ResourceStack::open(&config).unwrap();
        assert!(stack.is_empty());
    }

    #[test]
    fn test_round_trip_toml() {
        let config = StackConfig {
            game: GameType::Doom,
            locations: vec![ResourceLocation::archive("DOOM2.WAD")],
            ..Default::default()
        };
        let text = config.to_toml_string().unwrap();
        assert_eq!(StackConfig::from_toml_str(&text).unwrap(), config);
    }
}
