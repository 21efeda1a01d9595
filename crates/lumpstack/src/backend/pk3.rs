//! Zip-backed container (`.pk3`, `.pk7`, `.zip`).

use super::file_list::FileList;
use super::{ContainerBackend, EMBEDDED_ARCHIVE_EXT};
use crate::error::{Error, Result};
use camino::Utf8PathBuf;
use std::fs::File;
use std::io::{BufReader, Read};
use zip::ZipArchive;

/// Container that reads directly from a zip archive.
///
/// The archive layout is the same as a [`DirectoryBackend`](super::DirectoryBackend)
/// tree. Directory entries are ignored; only files are listed.
///
/// The zip handle is dropped on [`suspend`](ContainerBackend::suspend) and
/// reopened on [`resume`](ContainerBackend::resume); the listing survives both.
pub struct Pk3Backend {
    path: Utf8PathBuf,
    display_name: String,
    read_only: bool,
    archive: Option<ZipArchive<BufReader<File>>>,
    files: FileList,
    /// Zip entry index of each listed file, in listing order. Entry names are
    /// normalized for listing, so reads go by index rather than by name.
    entries: Vec<usize>,
}

impl Pk3Backend {
    pub fn open(path: Utf8PathBuf, display_name: String, read_only: bool) -> Result<Self> {
        let mut archive = open_zip(&path)?;

        let mut files = FileList::new();
        let mut entries = Vec::new();
        for i in 0..archive.len() {
            let entry = archive.by_index(i)?;
            if entry.is_dir() {
                continue;
            }
            files.push(entry.name());
            entries.push(i);
        }

        tracing::debug!("Archive '{}' indexed: {} entries", path, files.len());

        Ok(Self {
            path,
            display_name,
            read_only,
            archive: Some(archive),
            files,
            entries,
        })
    }
}

fn open_zip(path: &Utf8PathBuf) -> Result<ZipArchive<BufReader<File>>> {
    let file = File::open(path.as_std_path())?;
    Ok(ZipArchive::new(BufReader::new(file))?)
}

impl ContainerBackend for Pk3Backend {
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
        let index = self
            .files
            .position(name)
            .map(|i| self.entries[i])
            .ok_or_else(|| Error::FileNotFound(name.to_string()))?;
        let archive = self
            .archive
            .as_mut()
            .ok_or_else(|| Error::Suspended(self.display_name.clone()))?;

        let mut entry = archive.by_index(index)?;
        let mut bytes = Vec::with_capacity(entry.size() as usize);
        entry.read_to_end(&mut bytes)?;
        Ok(bytes)
    }

    fn list_root_archive_files(&self) -> Result<Vec<String>> {
        Ok(self.files.files_with_ext("", EMBEDDED_ARCHIVE_EXT, false))
    }

    fn find_first_file(&self, title: &str, recursive: bool) -> Result<Option<String>> {
        Ok(self.files.first_with_title(title, recursive))
    }

    fn absolute_path(&self, name: &str) -> Utf8PathBuf {
        let stored = self.files.resolve(name).unwrap_or(name);
        self.path.join(stored)
    }

    fn suspend(&mut self) -> Result<()> {
        self.archive = None;
        Ok(())
    }

    fn resume(&mut self) -> Result<()> {
        if self.archive.is_none() {
            self.archive = Some(open_zip(&self.path)?);
        }
        Ok(())
    }
}
