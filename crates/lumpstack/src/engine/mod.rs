//! The resource aggregation engine.
//!
//! A [`ResourceEngine`] wraps one [`ContainerBackend`] plus the embedded
//! sub-readers built from the lump archives at its root. Every category load
//! follows the same shape:
//!
//! 1. visit sub-readers last-discovered first and fold their results,
//! 2. fold the backend's own files for the category,
//! 3. fold what the legacy tables and `TEXTURES` lumps define,
//!
//! into an [`ImageMap`](crate::ImageMap) where the first record under a long
//! name wins. The visiting order is what encodes precedence.

mod images;
mod text;

use crate::backend::{open_backend, ContainerBackend};
use crate::embedded;
use crate::error::{Error, Result};
use crate::image::TextureSet;
use crate::location::{LocationKind, ResourceLocation};
use crate::lumps::{ColorMap, Palette, PatchNames};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use tempfile::NamedTempFile;

/// Identity of an engine instance, used for non-owning back-references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ReaderId(u64);

impl ReaderId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ReaderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Options fixed at construction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineOptions {
    /// Key textures and flats by their full relative path instead of their
    /// eight-character title.
    pub long_texture_names: bool,

    /// Open the container as read-only. Embedded archives inherit this.
    pub read_only: bool,
}

/// Override-aware view over one container and the archives embedded in it.
///
/// # Lifecycle
///
/// [`open`](Self::open) builds the engine and its sub-readers together.
/// [`suspend`](Self::suspend) releases OS handles (while keeping listings and
/// temp copies) and makes every read fail with [`Error::Suspended`] until
/// [`resume`](Self::resume). [`dispose`](Self::dispose) drops the sub-readers and
/// their temp files; it is idempotent and every read afterwards fails with
/// [`Error::Disposed`].
pub struct ResourceEngine {
    id: ReaderId,
    parent: Option<ReaderId>,
    location: ResourceLocation,
    options: EngineOptions,
    read_only: bool,
    backend: Box<dyn ContainerBackend>,
    sub_readers: Vec<ResourceEngine>,
    texture_set: TextureSet,
    suspended: bool,
    disposed: bool,
    /// Extracted copy of the archive when this engine is an embedded sub-reader.
    temp_file: Option<NamedTempFile>,
}

impl ResourceEngine {
    /// Open the container at `location` and mount the archives at its root.
    pub fn open(location: ResourceLocation, options: EngineOptions) -> Result<Self> {
        let read_only = options.read_only;
        let backend = open_backend(&location, read_only)?;
        let mut engine = Self::with_backend(location, options, backend, read_only);
        engine.initialize()?;
        Ok(engine)
    }

    /// Build an engine over an already opened backend. Call
    /// [`initialize`](Self::initialize) to mount embedded archives.
    pub fn with_backend(
        location: ResourceLocation,
        options: EngineOptions,
        backend: Box<dyn ContainerBackend>,
        read_only: bool,
    ) -> Self {
        Self {
            id: ReaderId::next(),
            parent: None,
            location,
            options,
            read_only,
            backend,
            sub_readers: Vec::new(),
            texture_set: TextureSet::default(),
            suspended: false,
            disposed: false,
            temp_file: None,
        }
    }

    pub(crate) fn embedded(
        location: ResourceLocation,
        options: EngineOptions,
        read_only: bool,
        parent: ReaderId,
        temp_file: NamedTempFile,
    ) -> Result<Self> {
        let backend = open_backend(&location, read_only)?;
        let mut engine = Self::with_backend(location, options, backend, read_only);
        engine.parent = Some(parent);
        engine.temp_file = Some(temp_file);
        engine.initialize()?;
        Ok(engine)
    }

    /// (Re)build the sub-reader list from the archives at the container root.
    ///
    /// Existing sub-readers are disposed first.
    pub fn initialize(&mut self) -> Result<()> {
        self.ensure_not_disposed()?;
        for sub in &mut self.sub_readers {
            sub.dispose();
        }
        self.sub_readers.clear();

        let mount_read_only = self.read_only || self.location.kind != LocationKind::Directory;
        self.sub_readers = embedded::load_embedded(
            self.id,
            &self.location.display_name(),
            self.backend.as_mut(),
            mount_read_only,
            self.options,
        )?;

        if !self.sub_readers.is_empty() {
            tracing::debug!(
                "'{}' mounted {} embedded archive(s)",
                self.display_name(),
                self.sub_readers.len()
            );
        }
        Ok(())
    }

    pub fn id(&self) -> ReaderId {
        self.id
    }

    /// The engine that mounted this one, for embedded sub-readers.
    pub fn parent(&self) -> Option<ReaderId> {
        self.parent
    }

    pub fn location(&self) -> &ResourceLocation {
        &self.location
    }

    pub fn options(&self) -> EngineOptions {
        self.options
    }

    pub fn display_name(&self) -> &str {
        self.backend.display_name()
    }

    pub fn read_only(&self) -> bool {
        self.read_only
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Embedded sub-readers in discovery order.
    pub fn sub_readers(&self) -> &[ResourceEngine] {
        &self.sub_readers
    }

    /// Textures and flats registered by the last loads.
    pub fn texture_set(&self) -> &TextureSet {
        &self.texture_set
    }

    /// Path of the extracted temp copy, for embedded sub-readers.
    pub fn temp_path(&self) -> Option<&std::path::Path> {
        self.temp_file.as_ref().map(|f| f.path())
    }

    pub fn suspend(&mut self) -> Result<()> {
        self.ensure_not_disposed()?;
        for sub in &mut self.sub_readers {
            sub.suspend()?;
        }
        self.backend.suspend()?;
        self.suspended = true;
        tracing::debug!("Suspended '{}'", self.display_name());
        Ok(())
    }

    pub fn resume(&mut self) -> Result<()> {
        self.ensure_not_disposed()?;
        for sub in &mut self.sub_readers {
            sub.resume()?;
        }
        self.backend.resume()?;
        self.suspended = false;
        tracing::debug!("Resumed '{}'", self.display_name());
        Ok(())
    }

    /// Drop every sub-reader (removing their temp copies) and release the
    /// backend. Safe to call more than once; never fails.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        for sub in &mut self.sub_readers {
            sub.dispose();
        }
        self.sub_readers.clear();
        self.texture_set.clear();
        if let Err(e) = self.backend.suspend() {
            tracing::debug!("Releasing '{}' failed: {}", self.display_name(), e);
        }
        if let Some(temp) = self.temp_file.take() {
            if let Err(e) = temp.close() {
                tracing::debug!("Removing temp copy of '{}' failed: {}", self.display_name(), e);
            }
        }
        self.disposed = true;
    }

    fn ensure_not_disposed(&self) -> Result<()> {
        if self.disposed {
            return Err(Error::Disposed(self.display_name().to_string()));
        }
        Ok(())
    }

    /// Reads are only valid on a live, resumed engine.
    fn ensure_readable(&self) -> Result<()> {
        self.ensure_not_disposed()?;
        if self.suspended {
            return Err(Error::Suspended(self.display_name().to_string()));
        }
        Ok(())
    }

    /// Read a file and log a warning instead of failing when it cannot be read.
    fn read_or_warn(&mut self, name: &str) -> Option<Vec<u8>> {
        match self.backend.read_file(name) {
            Ok(data) => Some(data),
            Err(e) => {
                tracing::warn!("Unable to read '{}' from '{}': {}", name, self.display_name(), e);
                None
            }
        }
    }

    /// The first root file titled `title`, if it can be read.
    fn read_root_lump(&mut self, title: &str) -> Result<Option<(String, Vec<u8>)>> {
        let Some(path) = self.backend.find_first_file(title, false)? else {
            return Ok(None);
        };
        if !self.backend.file_exists(&path) {
            return Ok(None);
        }
        Ok(self.read_or_warn(&path).map(|data| (path, data)))
    }

    /// The palette, preferring any embedded archive's over the root `PLAYPAL`.
    ///
    /// Sub-readers are asked in discovery order and the first one that has a
    /// palette wins. A root lump shorter than [`Palette::MIN_LEN`] logs a
    /// warning and yields no palette.
    pub fn load_palette(&mut self) -> Result<Option<Palette>> {
        self.ensure_readable()?;

        for sub in &mut self.sub_readers {
            if let Some(palette) = sub.load_palette()? {
                return Ok(Some(palette));
            }
        }

        let Some((path, data)) = self.read_root_lump(Palette::LUMP_NAME)? else {
            return Ok(None);
        };
        match Palette::decode(&data) {
            Ok(palette) => {
                tracing::debug!("Palette loaded from '{}/{}'", self.display_name(), path);
                Ok(Some(palette))
            }
            Err(e) => {
                tracing::warn!("Invalid palette '{}' in '{}': {}", path, self.display_name(), e);
                Ok(None)
            }
        }
    }

    /// The main `COLORMAP`, resolved like [`load_palette`](Self::load_palette).
    pub fn load_main_colormap(&mut self) -> Result<Option<ColorMap>> {
        self.ensure_readable()?;

        for sub in &mut self.sub_readers {
            if let Some(colormap) = sub.load_main_colormap()? {
                return Ok(Some(colormap));
            }
        }

        let Some((path, data)) = self.read_root_lump(ColorMap::LUMP_NAME)? else {
            return Ok(None);
        };
        match ColorMap::decode(&data) {
            Ok(colormap) => Ok(Some(colormap)),
            Err(e) => {
                tracing::warn!("Invalid colormap '{}' in '{}': {}", path, self.display_name(), e);
                Ok(None)
            }
        }
    }

    /// The `PNAMES` table: the last-discovered sub-reader that has one, else
    /// the container's own root lump.
    pub fn load_patch_names(&mut self) -> Result<Option<PatchNames>> {
        self.ensure_readable()?;

        for sub in self.sub_readers.iter_mut().rev() {
            if let Some(pnames) = sub.load_patch_names()? {
                return Ok(Some(pnames));
            }
        }

        let Some((path, data)) = self.read_root_lump(PatchNames::LUMP_NAME)? else {
            return Ok(None);
        };
        match PatchNames::decode(&data) {
            Ok(pnames) => Ok(Some(pnames)),
            Err(e) => {
                tracing::warn!("Invalid patch names '{}' in '{}': {}", path, self.display_name(), e);
                Ok(None)
            }
        }
    }
}

impl Drop for ResourceEngine {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl fmt::Debug for ResourceEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceEngine")
            .field("id", &self.id)
            .field("parent", &self.parent)
            .field("display_name", &self.display_name())
            .field("kind", &self.location.kind)
            .field("sub_readers", &self.sub_readers)
            .field("suspended", &self.suspended)
            .field("disposed", &self.disposed)
            .finish()
    }
}
