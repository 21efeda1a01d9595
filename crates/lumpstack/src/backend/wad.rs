//! Lump-table archive container (`IWAD`/`PWAD`).

use super::file_list::FileList;
use super::ContainerBackend;
use crate::error::{Error, Result};
use binrw::{binrw, BinRead};
use camino::Utf8PathBuf;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};

#[binrw]
#[brw(little)]
#[derive(Debug, Clone, Copy)]
struct WadHeader {
    magic: [u8; 4],
    lump_count: i32,
    directory_offset: i32,
}

#[binrw]
#[brw(little)]
#[derive(Debug, Clone, Copy)]
struct WadDirectoryEntry {
    offset: i32,
    size: i32,
    name: [u8; 8],
}

impl WadDirectoryEntry {
    const SIZE: u64 = 16;
}

/// One lump as presented by a [`WadBackend`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WadLump {
    /// Lump name as stored in the directory (up to 8 characters).
    pub name: String,
    /// Presented path, e.g. `flats/FLOOR4_8` or `DECORATE.1` for a second `DECORATE`.
    pub path: String,
    pub offset: u64,
    pub size: u64,
}

/// Marker families that delimit a namespace, and the virtual directory they map to.
const NAMESPACES: &[(&[&str], &str)] = &[
    (&["S", "SS"], "sprites"),
    (&["F", "FF"], "flats"),
    (&["P", "PP"], "patches"),
    (&["TX"], "textures"),
    (&["HI"], "hires"),
    (&["C"], "colormaps"),
    (&["VX"], "voxels"),
];

/// Sub-markers that appear inside an outer namespace and carry no meaning here.
const SUB_MARKERS: &[&str] = &["F1", "F2", "F3", "P1", "P2", "P3", "S1", "S2", "S3"];

enum Marker {
    Start(&'static str),
    End,
    Ignored,
}

fn classify_marker(name: &str) -> Option<Marker> {
    let (family, is_start) = if let Some(f) = name.strip_suffix("_START") {
        (f, true)
    } else if let Some(f) = name.strip_suffix("_END") {
        (f, false)
    } else {
        return None;
    };

    if SUB_MARKERS.contains(&family) {
        return Some(Marker::Ignored);
    }

    NAMESPACES
        .iter()
        .find(|(families, _)| families.contains(&family))
        .map(|(_, dir)| if is_start { Marker::Start(dir) } else { Marker::End })
}

/// Container that reads lumps from a WAD file.
///
/// Namespace markers are presented as virtual subdirectories so the resource
/// engine can treat a WAD like any other container:
///
/// | markers                 | directory    |
/// |-------------------------|--------------|
/// | `S_START` .. `S_END`    | `sprites/`   |
/// | `F_START` .. `F_END`    | `flats/`     |
/// | `P_START` .. `P_END`    | `patches/`   |
/// | `TX_START` .. `TX_END`  | `textures/`  |
/// | `HI_START` .. `HI_END`  | `hires/`     |
/// | `C_START` .. `C_END`    | `colormaps/` |
/// | `VX_START` .. `VX_END`  | `voxels/`    |
///
/// Everything else sits at the root. Lump names may repeat inside a WAD; the
/// n-th repeat of a name in the same directory is presented as `NAME.n`, which
/// keeps its title (`NAME`) intact. Lumps are listed in directory order.
///
/// A WAD never reports nested archives.
pub struct WadBackend {
    path: Utf8PathBuf,
    display_name: String,
    read_only: bool,
    file: Option<BufReader<File>>,
    lumps: Vec<WadLump>,
    by_path: HashMap<String, usize>,
    files: FileList,
}

impl WadBackend {
    pub fn open(path: Utf8PathBuf, display_name: String, read_only: bool) -> Result<Self> {
        let mut reader = BufReader::new(File::open(path.as_std_path())?);
        let file_len = reader.seek(SeekFrom::End(0))?;
        reader.seek(SeekFrom::Start(0))?;

        let invalid = |reason: String| Error::InvalidWad {
            path: path.clone(),
            reason,
        };

        let header = WadHeader::read(&mut reader).map_err(|e| invalid(e.to_string()))?;
        if &header.magic != b"IWAD" && &header.magic != b"PWAD" {
            return Err(invalid(format!("bad magic {:?}", header.magic)));
        }
        if header.lump_count < 0 || header.directory_offset < 0 {
            return Err(invalid("negative directory fields".to_string()));
        }
        let directory_end = header.directory_offset as u64
            + header.lump_count as u64 * WadDirectoryEntry::SIZE;
        if directory_end > file_len {
            return Err(invalid(format!(
                "directory ends at {} but file is {} bytes",
                directory_end, file_len
            )));
        }

        reader.seek(SeekFrom::Start(header.directory_offset as u64))?;

        let mut lumps = Vec::with_capacity(header.lump_count as usize);
        let mut by_path = HashMap::new();
        let mut files = FileList::new();
        let mut seen: HashMap<String, usize> = HashMap::new();
        let mut namespace: Option<&'static str> = None;

        for _ in 0..header.lump_count {
            let entry = WadDirectoryEntry::read(&mut reader)?;
            let name = lump_name(&entry.name);

            match classify_marker(&name) {
                Some(Marker::Start(dir)) => {
                    namespace = Some(dir);
                    continue;
                }
                Some(Marker::End) => {
                    namespace = None;
                    continue;
                }
                Some(Marker::Ignored) => continue,
                None => {}
            }

            let (offset, size) = (entry.offset.max(0) as u64, entry.size.max(0) as u64);
            if offset + size > file_len {
                tracing::warn!(
                    "Skipping lump '{}' in '{}': data runs past end of file",
                    name,
                    display_name
                );
                continue;
            }

            let base = match namespace {
                Some(dir) => format!("{}/{}", dir, name),
                None => name.clone(),
            };
            let repeat = seen.entry(base.to_ascii_lowercase()).or_insert(0);
            let lump_path = if *repeat == 0 {
                base
            } else {
                format!("{}.{}", base, repeat)
            };
            *repeat += 1;

            by_path.insert(lump_path.to_ascii_lowercase(), lumps.len());
            files.push_lump(&lump_path);
            lumps.push(WadLump {
                name,
                path: lump_path,
                offset,
                size,
            });
        }

        tracing::debug!("WAD '{}' indexed: {} lumps", display_name, lumps.len());

        Ok(Self {
            path,
            display_name,
            read_only,
            file: Some(reader),
            lumps,
            by_path,
            files,
        })
    }

    /// All lumps in directory order, markers excluded.
    pub fn lumps(&self) -> &[WadLump] {
        &self.lumps
    }

    pub fn path(&self) -> &Utf8PathBuf {
        &self.path
    }
}

fn lump_name(raw: &[u8; 8]) -> String {
    let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
    String::from_utf8_lossy(&raw[..end]).to_ascii_uppercase()
}

impl ContainerBackend for WadBackend {
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
        self.by_path.contains_key(&name.to_ascii_lowercase())
    }

    fn read_file(&mut self, name: &str) -> Result<Vec<u8>> {
        let index = *self
            .by_path
            .get(&name.to_ascii_lowercase())
            .ok_or_else(|| Error::FileNotFound(name.to_string()))?;
        let lump = &self.lumps[index];
        let reader = self
            .file
            .as_mut()
            .ok_or_else(|| Error::Suspended(self.display_name.clone()))?;

        reader.seek(SeekFrom::Start(lump.offset))?;
        let mut bytes = vec![0u8; lump.size as usize];
        reader.read_exact(&mut bytes)?;
        Ok(bytes)
    }

    fn list_root_archive_files(&self) -> Result<Vec<String>> {
        Ok(Vec::new())
    }

    fn find_first_file(&self, title: &str, recursive: bool) -> Result<Option<String>> {
        Ok(self.files.first_with_title(title, recursive))
    }

    fn absolute_path(&self, name: &str) -> Utf8PathBuf {
        let stored = self
            .by_path
            .get(&name.to_ascii_lowercase())
            .map(|&i| self.lumps[i].path.as_str())
            .unwrap_or(name);
        self.path.join(stored)
    }

    fn suspend(&mut self) -> Result<()> {
        self.file = None;
        Ok(())
    }

    fn resume(&mut self) -> Result<()> {
        if self.file.is_none() {
            self.file = Some(BufReader::new(File::open(self.path.as_std_path())?));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    /// Assemble a PWAD with lumps laid out back to back after the header.
    fn build_wad(lumps: &[(&str, &[u8])]) -> Vec<u8> {
        let mut data = Vec::new();
        let mut directory = Vec::new();
        let mut offset = 12u32;
        for (name, bytes) in lumps {
            directory.push((offset, bytes.len() as u32, *name));
            data.extend_from_slice(bytes);
            offset += bytes.len() as u32;
        }

        let mut out = Vec::new();
        out.extend_from_slice(b"PWAD");
        out.extend_from_slice(&(lumps.len() as i32).to_le_bytes());
        out.extend_from_slice(&(offset as i32).to_le_bytes());
        out.extend_from_slice(&data);
        for (offset, size, name) in directory {
            out.extend_from_slice(&offset.to_le_bytes());
            out.extend_from_slice(&size.to_le_bytes());
            let mut raw = [0u8; 8];
            raw[..name.len()].copy_from_slice(name.as_bytes());
            out.extend_from_slice(&raw);
        }
        out
    }

    fn open(dir: &tempfile::TempDir, lumps: &[(&str, &[u8])]) -> WadBackend {
        let path = dir.path().join("test.wad");
        std::fs::write(&path, build_wad(lumps)).unwrap();
        let path = Utf8PathBuf::from_path_buf(path).unwrap();
        WadBackend::open(path, "test.wad".to_string(), true).unwrap()
    }

    #[test]
    fn test_namespaces_become_directories() {
        let dir = tempdir().unwrap();
        let backend = open(
            &dir,
            &[
                ("PLAYPAL", b"pal"),
                ("F_START", b""),
                ("F1_START", b""),
                ("FLOOR4_8", b"flat"),
                ("F1_END", b""),
                ("F_END", b""),
                ("S_START", b""),
                ("TROOA1", b"spr"),
                ("S_END", b""),
                ("DECORATE", b"a"),
            ],
        );

        assert_eq!(
            backend.list_files("", true).unwrap(),
            vec!["PLAYPAL", "flats/FLOOR4_8", "sprites/TROOA1", "DECORATE"]
        );
        assert_eq!(backend.list_files("flats", false).unwrap(), vec!["flats/FLOOR4_8"]);
        assert!(backend.list_root_archive_files().unwrap().is_empty());
    }

    #[test]
    fn test_duplicate_lumps_keep_title() {
        let dir = tempdir().unwrap();
        let mut backend = open(&dir, &[("DECORATE", b"first"), ("DECORATE", b"second")]);

        let found = backend.list_files_with_title("", "decorate", false).unwrap();
        assert_eq!(found, vec!["DECORATE", "DECORATE.1"]);
        assert_eq!(backend.read_file("DECORATE.1").unwrap(), b"second");
        assert_eq!(backend.read_file("decorate").unwrap(), b"first");
    }

    #[test]
    fn test_backslash_is_part_of_lump_name() {
        let dir = tempdir().unwrap();
        let mut backend = open(
            &dir,
            &[
                ("S_START", b""),
                ("VILE\\1", b"frame"),
                ("TROOA1", b"spr"),
                ("S_END", b""),
            ],
        );

        assert_eq!(
            backend.list_files("sprites", false).unwrap(),
            vec!["sprites/VILE\\1", "sprites/TROOA1"]
        );
        assert_eq!(
            backend.list_files_with_title("sprites", "VILE\\1", false).unwrap(),
            vec!["sprites/VILE\\1"]
        );
        assert!(backend.file_exists("sprites/VILE\\1"));
        assert_eq!(backend.read_file("sprites/VILE\\1").unwrap(), b"frame");
    }

    #[test]
    fn test_rejects_bad_magic() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.wad");
        std::fs::write(&path, b"JUNKJUNKJUNK").unwrap();
        let path = Utf8PathBuf::from_path_buf(path).unwrap();

        let result = WadBackend::open(path, "bad.wad".to_string(), true);
        assert!(matches!(result, Err(Error::InvalidWad { .. })));
    }

    #[test]
    fn test_rejects_truncated_directory() {
        let dir = tempdir().unwrap();
        let mut bytes = build_wad(&[("PLAYPAL", b"pal")]);
        bytes.truncate(bytes.len() - 4);
        let path = dir.path().join("short.wad");
        std::fs::write(&path, bytes).unwrap();
        let path = Utf8PathBuf::from_path_buf(path).unwrap();

        assert!(WadBackend::open(path, "short.wad".to_string(), true).is_err());
    }

    #[test]
    fn test_suspend_and_resume() {
        let dir = tempdir().unwrap();
        let mut backend = open(&dir, &[("COLORMAP", &[7u8; 256])]);

        backend.suspend().unwrap();
        assert!(matches!(
            backend.read_file("COLORMAP"),
            Err(Error::Suspended(_))
        ));
        backend.resume().unwrap();
        assert_eq!(backend.read_file("COLORMAP").unwrap().len(), 256);
    }
}
