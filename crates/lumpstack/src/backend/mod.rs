//! Container backend abstraction.
//!
//! This module defines the [`ContainerBackend`] trait that decouples the resource
//! engine from any particular storage format. Implementations provide:
//!
//! - File enumeration under a path (optionally recursive)
//! - Lookup by exact file title or by title prefix
//! - Raw byte access to a named entry
//! - The list of lump archives stored at the container root
//!
//! The crate ships three backends: [`DirectoryBackend`] for on-disk trees,
//! [`Pk3Backend`] for zip containers and [`WadBackend`] for lump archives.
//!
//! # Naming
//!
//! Entry names are `/`-separated paths relative to the container root, e.g.
//! `textures/walls/DOOR1.png`. A *title* is the file name without its last
//! extension (`DOOR1`). Title and path matching is ASCII case-insensitive, as
//! in the engines that read these containers.

mod directory;
mod file_list;
mod pk3;
mod wad;

pub use directory::DirectoryBackend;
pub use file_list::{file_title, FileList};
pub use pk3::Pk3Backend;
pub use wad::{WadBackend, WadLump};

use crate::error::{Error, Result};
use crate::location::{LocationKind, ResourceLocation};
use camino::Utf8PathBuf;

/// Extension of lump archives that get mounted as embedded sub-readers.
pub const EMBEDDED_ARCHIVE_EXT: &str = "wad";

/// Abstracts how container content is accessed by the resource engine.
///
/// Implementations must be [`Send`] so an engine can be moved to a worker thread.
/// Reading takes `&mut self` to allow stateful readers (seeking within an
/// archive, lazily reopened file handles).
pub trait ContainerBackend: Send {
    /// Human-readable name used in diagnostics.
    fn display_name(&self) -> &str;

    /// Whether the container can be written to by the host application.
    fn read_only(&self) -> bool;

    /// All files in `path` (`""` is the root), optionally including subdirectories.
    fn list_files(&self, path: &str, recursive: bool) -> Result<Vec<String>>;

    /// Files in `path` whose title equals `title`.
    fn list_files_with_title(&self, path: &str, title: &str, recursive: bool)
        -> Result<Vec<String>>;

    /// Files in `path` whose title starts with `prefix`.
    fn list_files_with_title_prefix(
        &self,
        path: &str,
        prefix: &str,
        recursive: bool,
    ) -> Result<Vec<String>>;

    /// Whether an entry with this exact relative name exists.
    fn file_exists(&self, name: &str) -> bool;

    /// Read the full contents of an entry.
    fn read_file(&mut self, name: &str) -> Result<Vec<u8>>;

    /// Lump archives stored at the container root.
    fn list_root_archive_files(&self) -> Result<Vec<String>>;

    /// The first root file (or any file, when `recursive`) whose title equals `title`,
    /// regardless of extension.
    fn find_first_file(&self, title: &str, recursive: bool) -> Result<Option<String>>;

    /// Absolute identity of an entry, used as the parser cache key.
    fn absolute_path(&self, name: &str) -> Utf8PathBuf;

    /// Release OS handles. Listing state is kept.
    fn suspend(&mut self) -> Result<()> {
        Ok(())
    }

    /// Re-acquire the handles released by [`suspend`](Self::suspend).
    fn resume(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Open the backend matching a location's kind and path.
///
/// Directories get a [`DirectoryBackend`]; archives are opened as a
/// [`WadBackend`] when the file has a `.wad` extension and as a [`Pk3Backend`]
/// otherwise.
pub fn open_backend(
    location: &ResourceLocation,
    read_only: bool,
) -> Result<Box<dyn ContainerBackend>> {
    let display_name = location.display_name();
    match location.kind {
        LocationKind::Directory => {
            if !location.path.as_std_path().is_dir() {
                return Err(Error::InvalidLocation(location.path.clone()));
            }
            Ok(Box::new(DirectoryBackend::open(
                location.path.clone(),
                display_name,
                read_only,
            )?))
        }
        LocationKind::Archive | LocationKind::EmbeddedArchive => {
            if !location.path.as_std_path().is_file() {
                return Err(Error::InvalidLocation(location.path.clone()));
            }
            if ResourceLocation::is_wad_path(&location.path)
                || location.kind == LocationKind::EmbeddedArchive
            {
                Ok(Box::new(WadBackend::open(
                    location.path.clone(),
                    display_name,
                    read_only,
                )?))
            } else {
                Ok(Box::new(Pk3Backend::open(
                    location.path.clone(),
                    display_name,
                    read_only,
                )?))
            }
        }
    }
}
