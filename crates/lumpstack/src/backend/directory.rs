//! Filesystem-backed container.

use super::file_list::FileList;
use super::{ContainerBackend, EMBEDDED_ARCHIVE_EXT};
use crate::error::{Error, Result};
use camino::{Utf8Path, Utf8PathBuf};

/// Reads resources from a directory tree on disk:
///
/// ```text
/// mymod/
///   DECORATE.txt
///   TEXTURES.txt
///   PLAYPAL.lmp
///   extras.wad            # mounted as an embedded sub-reader
///   textures/
///     DOOR1.png
///   flats/
///   sprites/
///   hires/
///   colormaps/
///   voxels/
/// ```
///
/// The tree is scanned once when opened and again on [`resume`](ContainerBackend::resume),
/// so files changed while the reader was suspended are picked up.
pub struct DirectoryBackend {
    root: Utf8PathBuf,
    display_name: String,
    read_only: bool,
    files: FileList,
}

impl DirectoryBackend {
    pub fn open(root: Utf8PathBuf, display_name: String, read_only: bool) -> Result<Self> {
        let files = scan_directory(&root)?;
        tracing::debug!("Directory '{}' indexed: {} files", root, files.len());
        Ok(Self {
            root,
            display_name,
            read_only,
            files,
        })
    }

    pub fn root(&self) -> &Utf8Path {
        &self.root
    }
}

fn scan_directory(root: &Utf8Path) -> Result<FileList> {
    let mut files = FileList::new();
    for entry in walkdir::WalkDir::new(root.as_std_path())
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| Error::Other(format!("Failed to walk directory: {}", e)))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let rel = match entry.path().strip_prefix(root.as_std_path()) {
            Ok(rel) => rel,
            Err(_) => continue,
        };
        let Some(rel) = rel.to_str() else {
            tracing::warn!("Skipping non-UTF-8 path: {}", entry.path().display());
            continue;
        };
        files.push(rel);
    }
    Ok(files)
}

impl ContainerBackend for DirectoryBackend {
    fn display_name(&self) -> &str {
        &self.display_name
    }

    fn read_only(&self) -> bool {
        self.read_only
    }

    fn list_files(&self, path: &str, recursive: bool) -> Result<Vec<String>> {
        Ok(self.files.files(path, recursive))
    }

    fn list_files_with_title(
        &self,
        path: &str,
        title: &str,
        recursive: bool,
    ) -> Result<Vec<String>> {
        Ok(self.files.files_with_title(path, title, recursive))
    }

    fn list_files_with_title_prefix(
        &self,
        path: &str,
        prefix: &str,
        recursive: bool,
    ) -> Result<Vec<String>> {
        Ok(self.files.files_with_title_prefix(path, prefix, recursive))
    }

    fn file_exists(&self, name: &str) -> bool {
        self.files.contains(name)
    }

    fn read_file(&mut self, name: &str) -> Result<Vec<u8>> {
        let stored = self
            .files
            .resolve(name)
            .ok_or_else(|| Error::FileNotFound(name.to_string()))?;
        Ok(std::fs::read(self.root.join(stored).as_std_path())?)
    }

    fn list_root_archive_files(&self) -> Result<Vec<String>> {
        Ok(self.files.files_with_ext("", EMBEDDED_ARCHIVE_EXT, false))
    }

    fn find_first_file(&self, title: &str, recursive: bool) -> Result<Option<String>> {
        Ok(self.files.first_with_title(title, recursive))
    }

    fn absolute_path(&self, name: &str) -> Utf8PathBuf {
        let stored = self.files.resolve(name).unwrap_or(name);
        self.root.join(stored)
    }

    fn resume(&mut self) -> Result<()> {
        self.files = scan_directory(&self.root)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn create_test_dir() -> tempfile::TempDir {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("DECORATE.txt"), b"actor Foo {}").unwrap();
        fs::write(dir.path().join("extras.wad"), b"PWAD").unwrap();
        fs::create_dir_all(dir.path().join("textures/walls")).unwrap();
        fs::write(dir.path().join("textures/DOOR1.png"), b"png").unwrap();
        fs::write(dir.path().join("textures/walls/BRICK.png"), b"png").unwrap();
        dir
    }

    fn open(dir: &tempfile::TempDir) -> DirectoryBackend {
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
        DirectoryBackend::open(root, "test".to_string(), false).unwrap()
    }

    #[test]
    fn test_list_and_read() {
        let dir = create_test_dir();
        let mut backend = open(&dir);

        assert_eq!(
            backend.list_files("textures", true).unwrap(),
            vec!["textures/DOOR1.png", "textures/walls/BRICK.png"]
        );
        assert!(backend.file_exists("decorate.TXT"));
        assert_eq!(backend.read_file("decorate.txt").unwrap(), b"actor Foo {}");
    }

    #[test]
    fn test_root_archives() {
        let dir = create_test_dir();
        let backend = open(&dir);
        assert_eq!(backend.list_root_archive_files().unwrap(), vec!["extras.wad"]);
    }

    #[test]
    fn test_missing_file() {
        let dir = create_test_dir();
        let mut backend = open(&dir);
        assert!(matches!(
            backend.read_file("nope.txt"),
            Err(Error::FileNotFound(_))
        ));
    }

    #[test]
    fn test_resume_rescans() {
        let dir = create_test_dir();
        let mut backend = open(&dir);
        assert!(!backend.file_exists("ZSCRIPT.txt"));

        backend.suspend().unwrap();
        fs::write(dir.path().join("ZSCRIPT.txt"), b"version \"4.0\"").unwrap();
        backend.resume().unwrap();

        assert!(backend.file_exists("ZSCRIPT.txt"));
    }
}
