//! Mounting of lump archives stored at a container's root.
//!
//! Each archive is copied out to a temp file so it can be opened as an
//! independent [`WadBackend`](crate::backend::WadBackend). The resulting
//! sub-reader owns that temp file and removes it when it is disposed.

use crate::backend::ContainerBackend;
use crate::engine::{EngineOptions, ReaderId, ResourceEngine};
use crate::error::{Error, Result};
use crate::location::{LocationKind, ResourceLocation};
use camino::{Utf8Path, Utf8PathBuf};
use std::io::Write;
use tempfile::NamedTempFile;

/// Build one sub-reader per root archive of `backend`, in listing order.
///
/// Archives that cannot be read or opened are logged and skipped; a container
/// without any yields an empty list.
pub(crate) fn load_embedded(
    owner: ReaderId,
    owner_name: &str,
    backend: &mut dyn ContainerBackend,
    read_only: bool,
    options: EngineOptions,
) -> Result<Vec<ResourceEngine>> {
    let archives = backend.list_root_archive_files()?;
    let mut sub_readers = Vec::with_capacity(archives.len());

    for archive in archives {
        let file_name = Utf8Path::new(&archive)
            .file_name()
            .unwrap_or(&archive)
            .to_string();
        let display_name = format!("{}/{}", owner_name, file_name);

        let temp_file = match extract(backend, &archive) {
            Ok(temp_file) => temp_file,
            Err(e) => {
                tracing::error!("Failed to extract '{}': {}", display_name, e);
                continue;
            }
        };
        let temp_path = match Utf8PathBuf::from_path_buf(temp_file.path().to_path_buf()) {
            Ok(path) => path,
            Err(path) => {
                tracing::error!("Temp path for '{}' is not UTF-8: {}", display_name, path.display());
                continue;
            }
        };

        let location = ResourceLocation::new(LocationKind::EmbeddedArchive, temp_path)
            .with_display_name(display_name.clone());
        match ResourceEngine::embedded(location, options, read_only, owner, temp_file) {
            Ok(engine) => {
                tracing::debug!("Mounted embedded archive '{}'", display_name);
                sub_readers.push(engine);
            }
            Err(e) => tracing::error!("Unable to open embedded archive '{}': {}", display_name, e),
        }
    }

    Ok(sub_readers)
}

fn extract(backend: &mut dyn ContainerBackend, name: &str) -> Result<NamedTempFile> {
    let data = backend.read_file(name)?;
    if data.is_empty() {
        return Err(Error::Other(format!("'{}' is empty", name)));
    }
    let mut temp_file = tempfile::Builder::new()
        .prefix("lumpstack-")
        .suffix(".wad")
        .tempfile()?;
    temp_file.write_all(&data)?;
    temp_file.flush()?;
    Ok(temp_file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::DirectoryBackend;
    use std::fs;
    use tempfile::tempdir;

    fn minimal_wad() -> Vec<u8> {
        let mut data = b"PWAD".to_vec();
        data.extend_from_slice(&0i32.to_le_bytes());
        data.extend_from_slice(&12i32.to_le_bytes());
        data
    }

    fn backend(dir: &tempfile::TempDir) -> DirectoryBackend {
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
        DirectoryBackend::open(root, "mymod".to_string(), false).unwrap()
    }

    #[test]
    fn test_mounts_root_archives() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.wad"), minimal_wad()).unwrap();
        fs::write(dir.path().join("b.wad"), minimal_wad()).unwrap();
        let mut backend = backend(&dir);

        let owner = ReaderId::from_raw(99);
        let subs =
            load_embedded(owner, "mymod", &mut backend, true, EngineOptions::default()).unwrap();

        assert_eq!(subs.len(), 2);
        assert_eq!(subs[0].display_name(), "mymod/a.wad");
        assert_eq!(subs[1].display_name(), "mymod/b.wad");
        assert_eq!(subs[0].parent(), Some(owner));
        assert!(subs[0].read_only());
        assert_eq!(subs[0].location().kind, LocationKind::EmbeddedArchive);
        assert!(subs[0].temp_path().unwrap().exists());
    }

    #[test]
    fn test_broken_archive_is_skipped() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("broken.wad"), b"not a wad at all").unwrap();
        fs::write(dir.path().join("good.wad"), minimal_wad()).unwrap();
        let mut backend = backend(&dir);

        let subs = load_embedded(
            ReaderId::from_raw(1),
            "mymod",
            &mut backend,
            false,
            EngineOptions::default(),
        )
        .unwrap();

        assert_eq!(subs.len(), 1);
        assert_eq!(subs[0].display_name(), "mymod/good.wad");
    }

    #[test]
    fn test_no_archives() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("DECORATE.txt"), b"").unwrap();
        let mut backend = backend(&dir);

        let subs = load_embedded(
            ReaderId::from_raw(1),
            "mymod",
            &mut backend,
            false,
            EngineOptions::default(),
        )
        .unwrap();
        assert!(subs.is_empty());
    }

    #[test]
    fn test_dispose_removes_temp_copy() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.wad"), minimal_wad()).unwrap();
        let mut backend = backend(&dir);

        let mut subs = load_embedded(
            ReaderId::from_raw(1),
            "mymod",
            &mut backend,
            false,
            EngineOptions::default(),
        )
        .unwrap();
        let temp = subs[0].temp_path().unwrap().to_path_buf();
        assert!(temp.exists());

        subs[0].dispose();
        assert!(!temp.exists());
    }
}
