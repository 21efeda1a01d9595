//! Image records and the first-wins merge map.

use crate::backend::file_title;
use crate::engine::ReaderId;
use crate::textures::TextureDefinition;
use std::collections::HashMap;
use std::fmt;

/// Longest key produced for a long-name-capable category.
pub const MAX_LONG_NAME_LEN: usize = 255;
/// Longest key produced from a file title.
pub const MAX_SHORT_NAME_LEN: usize = 8;

/// Canonical deduplication key of an image.
///
/// Short names are the uppercased file title cut to eight characters, the way
/// the engines address lumps. Long names are the uppercased relative path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LongName(String);

impl LongName {
    /// Key from a lump or definition name.
    pub fn short(name: &str) -> Self {
        let upper = name.to_ascii_uppercase();
        Self(truncate(&upper, MAX_SHORT_NAME_LEN).to_string())
    }

    /// Key from a file path, using its title.
    pub fn from_title(path: &str) -> Self {
        Self::short(file_title(path))
    }

    /// Key from the full relative path of a file.
    pub fn long(path: &str) -> Self {
        let normalized = path.replace('\\', "/").to_ascii_uppercase();
        Self(truncate(normalized.trim_start_matches('/'), MAX_LONG_NAME_LEN).to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn truncate(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

impl fmt::Display for LongName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageKind {
    Texture,
    Flat,
    Sprite,
    HiRes,
    Colormap,
}

impl ImageKind {
    /// Categories that key by full path when long texture names are enabled.
    pub fn supports_long_names(self) -> bool {
        matches!(self, Self::Texture | Self::Flat)
    }
}

/// How the bytes of a file-backed image should be interpreted downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    /// Column-based picture (textures, sprites, patches).
    DoomPicture,
    /// Raw 64x64 flat.
    DoomFlat,
    /// Colormap rendered as an image.
    DoomColormap,
    /// PNG/JPEG/etc. hi-res replacement.
    HiRes,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ImageSource {
    /// A file stored in a container.
    File {
        reader: ReaderId,
        path: String,
        format: ImageFormat,
    },
    /// A texture assembled from patches by a definition lump.
    Composite {
        /// The lump that defined it (`TEXTURE1`, `TEXTURES.txt`, ...).
        lump: String,
        definition: TextureDefinition,
    },
}

/// One image of a category result set. Pixel data is never decoded here.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageRecord {
    /// Relative path for files, definition name for composites.
    pub name: String,
    pub long_name: LongName,
    pub kind: ImageKind,
    pub source: ImageSource,
    /// Display name of the container the image came from.
    pub reader_name: String,
}

impl ImageRecord {
    pub fn is_composite(&self) -> bool {
        matches!(self.source, ImageSource::Composite { .. })
    }
}

/// Insertion-ordered image set where the first record under a long name wins.
#[derive(Debug, Clone, Default)]
pub struct ImageMap {
    index: HashMap<LongName, usize>,
    records: Vec<ImageRecord>,
}

impl ImageMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `record` unless its long name is already present. Returns
    /// whether it was inserted.
    pub fn insert(&mut self, record: ImageRecord) -> bool {
        if self.index.contains_key(&record.long_name) {
            return false;
        }
        self.index.insert(record.long_name.clone(), self.records.len());
        self.records.push(record);
        true
    }

    /// Fold a batch of records, keeping existing keys.
    pub fn fold(&mut self, records: impl IntoIterator<Item = ImageRecord>) {
        for record in records {
            self.insert(record);
        }
    }

    pub fn get(&self, long_name: &LongName) -> Option<&ImageRecord> {
        self.index.get(long_name).map(|&i| &self.records[i])
    }

    pub fn contains(&self, long_name: &LongName) -> bool {
        self.index.contains_key(long_name)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ImageRecord> {
        self.records.iter()
    }

    pub fn into_vec(self) -> Vec<ImageRecord> {
        self.records
    }
}

/// Container-wide index of the textures and flats an engine produced.
///
/// Refreshed by every texture, flat and colormap load. Later registrations
/// replace earlier ones under the same key, so reloading a category never
/// grows the set.
#[derive(Debug, Clone, Default)]
pub struct TextureSet {
    textures: HashMap<LongName, ImageRecord>,
    flats: HashMap<LongName, ImageRecord>,
}

impl TextureSet {
    pub fn add_texture(&mut self, record: ImageRecord) {
        self.textures.insert(record.long_name.clone(), record);
    }

    pub fn add_flat(&mut self, record: ImageRecord) {
        self.flats.insert(record.long_name.clone(), record);
    }

    pub fn texture(&self, name: &str) -> Option<&ImageRecord> {
        self.textures
            .get(&LongName::short(name))
            .or_else(|| self.textures.get(&LongName::long(name)))
    }

    pub fn flat(&self, name: &str) -> Option<&ImageRecord> {
        self.flats
            .get(&LongName::short(name))
            .or_else(|| self.flats.get(&LongName::long(name)))
    }

    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    pub fn flat_count(&self) -> usize {
        self.flats.len()
    }

    pub fn clear(&mut self) {
        self.textures.clear();
        self.flats.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file_record(path: &str, reader: u64) -> ImageRecord {
        ImageRecord {
            name: path.to_string(),
            long_name: LongName::from_title(path),
            kind: ImageKind::Texture,
            source: ImageSource::File {
                reader: ReaderId::from_raw(reader),
                path: path.to_string(),
                format: ImageFormat::DoomPicture,
            },
            reader_name: format!("reader{}", reader),
        }
    }

    #[test]
    fn test_long_name_forms() {
        assert_eq!(LongName::from_title("textures/door1.png").as_str(), "DOOR1");
        assert_eq!(LongName::from_title("textures/VERYLONGNAME.png").as_str(), "VERYLONG");
        assert_eq!(
            LongName::long("textures\\walls/Door1.png").as_str(),
            "TEXTURES/WALLS/DOOR1.PNG"
        );
        assert_eq!(LongName::long(&"a".repeat(300)).as_str().len(), MAX_LONG_NAME_LEN);
    }

    #[test]
    fn test_first_insert_wins() {
        let mut map = ImageMap::new();
        assert!(map.insert(file_record("textures/DOOR1.png", 1)));
        assert!(!map.insert(file_record("flats/door1.lmp", 2)));

        assert_eq!(map.len(), 1);
        let kept = map.get(&LongName::short("DOOR1")).unwrap();
        assert_eq!(kept.reader_name, "reader1");
        assert_eq!(kept.name, "textures/DOOR1.png");
    }

    #[test]
    fn test_insertion_order_is_kept() {
        let mut map = ImageMap::new();
        map.fold(vec![
            file_record("textures/B.png", 1),
            file_record("textures/A.png", 1),
            file_record("textures/C.png", 1),
        ]);
        let names: Vec<_> = map.iter().map(|r| r.long_name.as_str()).collect();
        assert_eq!(names, vec!["B", "A", "C"]);
    }

    #[test]
    fn test_texture_set_replaces() {
        let mut set = TextureSet::default();
        set.add_texture(file_record("textures/DOOR1.png", 1));
        set.add_texture(file_record("textures/DOOR1.png", 2));
        assert_eq!(set.texture_count(), 1);
        assert_eq!(set.texture("door1").unwrap().reader_name, "reader2");
        assert!(set.flat("door1").is_none());
    }
}
