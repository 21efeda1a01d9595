//! Resource location descriptors.
//!
//! A [`ResourceLocation`] names one container the engine reads from. Locations
//! come from the stack configuration file (see [`StackConfig`](crate::StackConfig))
//! or are synthesized by the embedded-container loader for archives found inside
//! another container.

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};

/// The kind of container behind a location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LocationKind {
    /// A plain directory tree on disk.
    Directory,
    /// A packed container on disk (`.pk3`/`.pk7`/`.zip` or a `.wad`).
    Archive,
    /// A lump archive copied out of another container's root.
    EmbeddedArchive,
}

/// Identifies one container backend.
///
/// Immutable once an engine has been built from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceLocation {
    pub kind: LocationKind,

    /// Physical path of the directory or archive file.
    pub path: Utf8PathBuf,

    /// Name shown in logs and diagnostics. Defaults to the file name of `path`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    /// Treat images in the container root as textures.
    #[serde(default)]
    pub root_textures: bool,

    /// Treat images in the container root as flats.
    #[serde(default)]
    pub root_flats: bool,
}

impl ResourceLocation {
    pub fn new(kind: LocationKind, path: impl Into<Utf8PathBuf>) -> Self {
        Self {
            kind,
            path: path.into(),
            display_name: None,
            root_textures: false,
            root_flats: false,
        }
    }

    pub fn directory(path: impl Into<Utf8PathBuf>) -> Self {
        Self::new(LocationKind::Directory, path)
    }

    pub fn archive(path: impl Into<Utf8PathBuf>) -> Self {
        Self::new(LocationKind::Archive, path)
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    pub fn with_root_textures(mut self, enabled: bool) -> Self {
        self.root_textures = enabled;
        self
    }

    pub fn with_root_flats(mut self, enabled: bool) -> Self {
        self.root_flats = enabled;
        self
    }

    /// The display name, falling back to the last path component.
    pub fn display_name(&self) -> String {
        if let Some(name) = &self.display_name {
            return name.clone();
        }
        self.path
            .file_name()
            .map(str::to_string)
            .unwrap_or_else(|| self.path.to_string())
    }

    /// Whether the path looks like a lump archive rather than a zip container.
    pub fn is_wad_path(path: &Utf8Path) -> bool {
        path.extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("wad"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_fallback() {
        let loc = ResourceLocation::directory("/games/doom/mymod");
        assert_eq!(loc.display_name(), "mymod");

        let named = loc.with_display_name("My Mod");
        assert_eq!(named.display_name(), "My Mod");
    }

    #[test]
    fn test_kind_serialization() {
        let json = serde_json::to_string(&LocationKind::EmbeddedArchive).unwrap();
        assert_eq!(json, "\"embedded-archive\"");
    }

    #[test]
    fn test_is_wad_path() {
        assert!(ResourceLocation::is_wad_path(Utf8Path::new("maps/E1M1.WAD")));
        assert!(!ResourceLocation::is_wad_path(Utf8Path::new("gzdoom.pk3")));
    }
}
