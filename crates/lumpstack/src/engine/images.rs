//! Image category loads: textures, flats, sprites, hi-res and colormap images.

use super::ResourceEngine;
use crate::backend::file_title;
use crate::cache::ParserCache;
use crate::error::Result;
use crate::image::{ImageFormat, ImageKind, ImageMap, ImageRecord, ImageSource, LongName};
use crate::lumps::{decode_texture_table, PatchNames};
use crate::names::{is_valid_sprite_name, is_valid_voxel_name};
use crate::text::TextResourceData;
use crate::textures::{TextureDefinition, TexturesParseResult};
use std::collections::BTreeSet;
use std::sync::Arc;

const TEXTURES_DIR: &str = "textures";
const FLATS_DIR: &str = "flats";
const SPRITES_DIR: &str = "sprites";
const HIRES_DIR: &str = "hires";
const COLORMAPS_DIR: &str = "colormaps";
const VOXELS_DIR: &str = "voxels";

/// Title prefix of the structured-text definition lumps.
const TEXTURES_LUMP: &str = "TEXTURES";
const TEXTURE_TABLES: [&str; 2] = ["TEXTURE1", "TEXTURE2"];

impl ResourceEngine {
    /// All textures visible through this container.
    ///
    /// Sources, in precedence order:
    ///
    /// 1. sub-readers, last-discovered first, each with its own `PNAMES` or
    ///    `pnames` when it has none
    /// 2. root images, when the location opts into root textures
    /// 3. `TEXTURE1` then `TEXTURE2`, decoded with `pnames`
    /// 4. every root `TEXTURES*` lump, textures and wall textures
    /// 5. the `textures/` directory
    ///
    /// so a `TEXTURES` definition of `DOOR1` hides `textures/DOOR1.png`.
    pub fn load_textures(
        &mut self,
        pnames: &PatchNames,
        cache: &mut ParserCache,
    ) -> Result<Vec<ImageRecord>> {
        self.ensure_readable()?;
        let mut images = ImageMap::new();

        for sub in self.sub_readers.iter_mut().rev() {
            let own = sub.load_patch_names()?.filter(|p| !p.is_empty());
            images.fold(sub.load_textures(own.as_ref().unwrap_or(pnames), cache)?);
        }

        if self.location.root_textures {
            let root = self.directory_images("", ImageKind::Texture, false)?;
            images.fold(root);
        }

        let mut table_set = Vec::new();
        for lump in TEXTURE_TABLES {
            let Some((path, data)) = self.read_root_lump(lump)? else {
                continue;
            };
            match decode_texture_table(lump, &data, pnames) {
                Ok(definitions) => table_set.extend(
                    definitions
                        .into_iter()
                        .map(|d| self.composite(&path, d, ImageKind::Texture)),
                ),
                Err(e) => tracing::warn!("Invalid texture table in '{}': {}", self.display_name(), e),
            }
        }
        images.fold(table_set);

        let mut defined = Vec::new();
        for (path, result) in self.definition_lumps(cache)? {
            for definition in result.textures.iter().chain(&result.walltextures) {
                defined.push(self.composite(&path, definition.clone(), ImageKind::Texture));
            }
        }
        images.fold(defined);

        let directory = self.directory_images(TEXTURES_DIR, ImageKind::Texture, true)?;
        images.fold(directory);

        for record in images.iter() {
            self.texture_set.add_texture(record.clone());
        }
        tracing::info!("Loaded {} textures from '{}'", images.len(), self.display_name());
        Ok(images.into_vec())
    }

    /// Hi-res replacement images from `hires/`.
    pub fn load_hires_textures(&mut self) -> Result<Vec<ImageRecord>> {
        self.ensure_readable()?;
        let images = self.directory_images(HIRES_DIR, ImageKind::HiRes, true)?;
        tracing::debug!("Found {} hi-res images in '{}'", images.len(), self.display_name());
        Ok(images)
    }

    /// All flats visible through this container.
    ///
    /// Sub-readers (last first), root images when the location opts into root
    /// flats, the `flats/` directory, then the flats of `TEXTURES*` lumps.
    pub fn load_flats(&mut self, cache: &mut ParserCache) -> Result<Vec<ImageRecord>> {
        self.ensure_readable()?;
        let mut images = ImageMap::new();

        for sub in self.sub_readers.iter_mut().rev() {
            images.fold(sub.load_flats(cache)?);
        }

        if self.location.root_flats {
            let root = self.directory_images("", ImageKind::Flat, false)?;
            images.fold(root);
        }

        let directory = self.directory_images(FLATS_DIR, ImageKind::Flat, true)?;
        images.fold(directory);

        let mut defined = Vec::new();
        for (path, result) in self.definition_lumps(cache)? {
            for definition in &result.flats {
                defined.push(self.composite(&path, definition.clone(), ImageKind::Flat));
            }
        }
        images.fold(defined);

        for record in images.iter() {
            self.texture_set.add_flat(record.clone());
        }
        tracing::info!("Loaded {} flats from '{}'", images.len(), self.display_name());
        Ok(images.into_vec())
    }

    /// Raw bytes of a flat.
    ///
    /// Short names are looked up in sub-readers (last first) before `flats/`.
    /// Long names are paths relative to this container and never live in an
    /// embedded archive.
    pub fn flat_data(&mut self, name: &str, long_name: bool) -> Result<Option<Vec<u8>>> {
        self.ensure_readable()?;

        if !long_name {
            for sub in self.sub_readers.iter_mut().rev() {
                if let Some(data) = sub.flat_data(name, false)? {
                    return Ok(Some(data));
                }
            }
        }

        let found = if long_name {
            self.backend.file_exists(name).then(|| name.to_string())
        } else {
            self.backend
                .list_files_with_title(FLATS_DIR, name, true)?
                .into_iter()
                .next()
        };
        Ok(found.and_then(|path| self.read_or_warn(&path)))
    }

    /// All sprites visible through this container.
    ///
    /// Sub-readers (last first), the sprites of `TEXTURES*` lumps, then the
    /// `sprites/` directory.
    pub fn load_sprites(&mut self, cache: &mut ParserCache) -> Result<Vec<ImageRecord>> {
        self.ensure_readable()?;
        let mut images = ImageMap::new();

        for sub in self.sub_readers.iter_mut().rev() {
            images.fold(sub.load_sprites(cache)?);
        }

        let mut defined = Vec::new();
        for (path, result) in self.definition_lumps(cache)? {
            for definition in &result.sprites {
                defined.push(self.composite(&path, definition.clone(), ImageKind::Sprite));
            }
        }
        images.fold(defined);

        let directory = self.directory_images(SPRITES_DIR, ImageKind::Sprite, true)?;
        images.fold(directory);

        tracing::info!("Loaded {} sprites from '{}'", images.len(), self.display_name());
        Ok(images.into_vec())
    }

    /// Uppercased names of every valid sprite lump, including sub-readers'.
    pub fn sprite_names(&mut self) -> Result<BTreeSet<String>> {
        self.ensure_readable()?;
        let mut names = BTreeSet::new();

        for sub in self.sub_readers.iter_mut().rev() {
            names.extend(sub.sprite_names()?);
        }

        let files = self.backend.list_files(SPRITES_DIR, true)?;
        names.extend(valid_titles(&files, is_valid_sprite_name));
        Ok(names)
    }

    /// Uppercased names of every valid voxel in `voxels/`, including sub-readers'.
    pub fn voxel_names(&mut self) -> Result<BTreeSet<String>> {
        self.ensure_readable()?;
        let mut names = BTreeSet::new();

        for sub in self.sub_readers.iter_mut().rev() {
            names.extend(sub.voxel_names()?);
        }

        let files = self.backend.list_files(VOXELS_DIR, false)?;
        names.extend(valid_titles(&files, is_valid_voxel_name));
        Ok(names)
    }

    /// Colormap images from sub-readers (last first) and `colormaps/`.
    /// They are registered as flats.
    pub fn load_colormaps(&mut self) -> Result<Vec<ImageRecord>> {
        self.ensure_readable()?;
        let mut images = ImageMap::new();

        for sub in self.sub_readers.iter_mut().rev() {
            images.fold(sub.load_colormaps()?);
        }

        let directory = self.directory_images(COLORMAPS_DIR, ImageKind::Colormap, true)?;
        images.fold(directory);

        for record in images.iter() {
            self.texture_set.add_flat(record.clone());
        }
        Ok(images.into_vec())
    }

    /// File-backed images under `path`. Files without a title cannot be
    /// addressed and are reported as errors.
    fn directory_images(
        &self,
        path: &str,
        kind: ImageKind,
        recursive: bool,
    ) -> Result<Vec<ImageRecord>> {
        let files = self.backend.list_files(path, recursive)?;
        let mut images = Vec::with_capacity(files.len());

        for file in files {
            if file_title(&file).is_empty() {
                tracing::error!(
                    "Cannot load an unnamed {:?} image from '{}/{}'; give the file a name",
                    kind,
                    self.display_name(),
                    if path.is_empty() { "<root>" } else { path }
                );
                continue;
            }

            let long_name = if self.options.long_texture_names && kind.supports_long_names() {
                LongName::long(&file)
            } else {
                LongName::from_title(&file)
            };
            images.push(ImageRecord {
                name: file.clone(),
                long_name,
                kind,
                source: ImageSource::File {
                    reader: self.id,
                    path: file,
                    format: image_format(kind),
                },
                reader_name: self.display_name().to_string(),
            });
        }

        Ok(images)
    }

    fn composite(&self, lump: &str, definition: TextureDefinition, kind: ImageKind) -> ImageRecord {
        let long_name = if self.options.long_texture_names && definition.name.contains('/') {
            LongName::long(&definition.name)
        } else {
            LongName::short(&definition.name)
        };
        ImageRecord {
            name: definition.name.clone(),
            long_name,
            kind,
            source: ImageSource::Composite {
                lump: lump.to_string(),
                definition,
            },
            reader_name: self.display_name().to_string(),
        }
    }

    /// Parse results of every root `TEXTURES*` lump, in discovery order.
    ///
    /// Each lump is parsed at most once per cache, keyed by its absolute path.
    /// Lumps that cannot be read are logged and skipped.
    fn definition_lumps(
        &mut self,
        cache: &mut ParserCache,
    ) -> Result<Vec<(String, Arc<TexturesParseResult>)>> {
        let files = self
            .backend
            .list_files_with_title_prefix("", TEXTURES_LUMP, false)?;
        let mut results = Vec::with_capacity(files.len());

        for file in files {
            let absolute = self.backend.absolute_path(&file);
            let reader = self.id;
            let reader_name = self.display_name().to_string();
            let backend = &mut self.backend;

            let parsed = cache.get_or_parse(&absolute, || {
                Ok(TextResourceData {
                    data: backend.read_file(&file)?,
                    reader,
                    reader_name,
                    path: file.clone(),
                    script: true,
                })
            });
            match parsed {
                Ok(result) => results.push((file, result)),
                Err(e) => tracing::warn!("Unable to load '{}' from '{}': {}", file, self.display_name(), e),
            }
        }

        Ok(results)
    }
}

fn image_format(kind: ImageKind) -> ImageFormat {
    match kind {
        ImageKind::Texture | ImageKind::Sprite => ImageFormat::DoomPicture,
        ImageKind::Flat => ImageFormat::DoomFlat,
        ImageKind::Colormap => ImageFormat::DoomColormap,
        ImageKind::HiRes => ImageFormat::HiRes,
    }
}

fn valid_titles<'a>(
    files: &'a [String],
    is_valid: fn(&str) -> bool,
) -> impl Iterator<Item = String> + 'a {
    files
        .iter()
        .map(|f| file_title(f).to_ascii_uppercase())
        .filter(move |name| is_valid(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::DiagnosticLog;
    use crate::engine::EngineOptions;
    use crate::location::ResourceLocation;
    use camino::Utf8PathBuf;
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;
    use tracing_subscriber::layer::SubscriberExt;

    fn write(root: &Path, rel: &str, data: &[u8]) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, data).unwrap();
    }

    fn open(dir: &tempfile::TempDir, options: EngineOptions) -> ResourceEngine {
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
        ResourceEngine::open(ResourceLocation::directory(root), options).unwrap()
    }

    #[test]
    fn test_textures_definition_beats_directory() {
        let dir = tempdir().unwrap();
        write(dir.path(), "textures/DOOR1.png", b"png");
        write(dir.path(), "textures/STEP1.png", b"png");
        write(
            dir.path(),
            "TEXTURES.txt",
            b"Texture \"DOOR1\", 64, 72 { Patch \"DOOR2_1\", 0, 0 }",
        );
        let mut engine = open(&dir, EngineOptions::default());
        let mut cache = ParserCache::new();

        let textures = engine.load_textures(&PatchNames::default(), &mut cache).unwrap();
        assert_eq!(textures.len(), 2);
        let door = textures.iter().find(|t| t.long_name.as_str() == "DOOR1").unwrap();
        assert!(door.is_composite());
        assert!(engine.texture_set().texture("STEP1").is_some());
    }

    #[test]
    fn test_long_texture_names_keep_paths_apart() {
        let dir = tempdir().unwrap();
        write(dir.path(), "textures/a/WALL.png", b"png");
        write(dir.path(), "textures/b/WALL.png", b"png");

        let mut short = open(&dir, EngineOptions::default());
        let loaded = short.load_textures(&PatchNames::default(), &mut ParserCache::new());
        assert_eq!(loaded.unwrap().len(), 1);

        let options = EngineOptions {
            long_texture_names: true,
            ..Default::default()
        };
        let mut long = open(&dir, options);
        let loaded = long.load_textures(&PatchNames::default(), &mut ParserCache::new());
        let names: Vec<_> = loaded
            .unwrap()
            .into_iter()
            .map(|r| r.long_name.to_string())
            .collect();
        assert_eq!(names, vec!["TEXTURES/A/WALL.PNG", "TEXTURES/B/WALL.PNG"]);
    }

    #[test]
    fn test_root_flats_opt_in() {
        let dir = tempdir().unwrap();
        write(dir.path(), "FLOOR0_1.lmp", &[0u8; 4096]);
        write(dir.path(), "flats/FLOOR4_8.lmp", &[0u8; 4096]);

        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
        let location = ResourceLocation::directory(root).with_root_flats(true);
        let mut with_root = ResourceEngine::open(location, EngineOptions::default()).unwrap();
        let mut without = open(&dir, EngineOptions::default());

        assert_eq!(with_root.load_flats(&mut ParserCache::new()).unwrap().len(), 2);
        assert_eq!(without.load_flats(&mut ParserCache::new()).unwrap().len(), 1);
        assert_eq!(
            without.flat_data("floor4_8", false).unwrap().map(|d| d.len()),
            Some(4096)
        );
        assert!(without.flat_data("NOPE", false).unwrap().is_none());
    }

    #[test]
    fn test_unnamed_images_are_rejected() {
        let dir = tempdir().unwrap();
        write(dir.path(), "hires/.png", b"png");
        write(dir.path(), "hires/TITLEPIC.png", b"png");
        let mut engine = open(&dir, EngineOptions::default());

        let log = DiagnosticLog::new();
        let subscriber = tracing_subscriber::registry().with(log.clone());
        let hires = tracing::subscriber::with_default(subscriber, || {
            engine.load_hires_textures().unwrap()
        });
        assert_eq!(hires.len(), 1);
        assert_eq!(hires[0].long_name.as_str(), "TITLEPIC");
        assert_eq!(log.error_count(), 1);
        assert_eq!(log.warning_count(), 0);
    }

    #[test]
    fn test_sprite_and_voxel_names() {
        let dir = tempdir().unwrap();
        write(dir.path(), "sprites/trooa1.png", b"png");
        write(dir.path(), "sprites/monsters/SARGB2B8.png", b"png");
        write(dir.path(), "sprites/readme.txt", b"text");
        write(dir.path(), "sprites/BAD NAME.png", b"png");
        write(dir.path(), "voxels/BARREL.kvx", b"kvx");
        write(dir.path(), "voxels/nested/NESTED.kvx", b"kvx");
        write(dir.path(), "voxels/TOOLONGNAME.kvx", b"kvx");
        let mut engine = open(&dir, EngineOptions::default());

        let sprites: Vec<_> = engine.sprite_names().unwrap().into_iter().collect();
        assert_eq!(sprites, vec!["README", "SARGB2B8", "TROOA1"]);

        let voxels: Vec<_> = engine.voxel_names().unwrap().into_iter().collect();
        assert_eq!(voxels, vec!["BARREL"]);
    }

    #[test]
    fn test_colormaps_register_as_flats() {
        let dir = tempdir().unwrap();
        write(dir.path(), "colormaps/FOGMAP.lmp", &[0u8; 8704]);
        let mut engine = open(&dir, EngineOptions::default());

        let colormaps = engine.load_colormaps().unwrap();
        assert_eq!(colormaps.len(), 1);
        assert_eq!(colormaps[0].kind, ImageKind::Colormap);
        assert!(engine.texture_set().flat("FOGMAP").is_some());
    }
}
