//! Parse-once cache for structured-text definition lumps.

use crate::error::Result;
use crate::text::TextResourceData;
use crate::textures::{DefinitionParser, TexturesParseResult, TexturesParser};
use camino::{Utf8Path, Utf8PathBuf};
use std::collections::HashMap;
use std::sync::Arc;

/// Maps the absolute path of a `TEXTURES` lump to its parse result.
///
/// One cache is meant to live for one load cycle: create it, pass it to every
/// category load, then drop it. A lump that defines textures, flats and sprites
/// is parsed by whichever category reaches it first; the others reuse the same
/// [`Arc`].
pub struct ParserCache {
    parser: Box<dyn DefinitionParser>,
    entries: HashMap<Utf8PathBuf, Arc<TexturesParseResult>>,
}

impl Default for ParserCache {
    fn default() -> Self {
        Self::new()
    }
}

impl ParserCache {
    /// A cache backed by the built-in [`TexturesParser`].
    pub fn new() -> Self {
        Self::with_parser(TexturesParser)
    }

    pub fn with_parser(parser: impl DefinitionParser + 'static) -> Self {
        Self {
            parser: Box::new(parser),
            entries: HashMap::new(),
        }
    }

    /// The cached result for `path`, or parse the data produced by `load`.
    ///
    /// `load` only runs on a miss. If it fails nothing is cached and the error
    /// is returned.
    pub fn get_or_parse<F>(&mut self, path: &Utf8Path, load: F) -> Result<Arc<TexturesParseResult>>
    where
        F: FnOnce() -> Result<TextResourceData>,
    {
        if let Some(result) = self.entries.get(path) {
            tracing::trace!("Parser cache hit: {}", path);
            return Ok(Arc::clone(result));
        }

        let data = load()?;
        let result = Arc::new(self.parser.parse(&data));
        self.entries.insert(path.to_path_buf(), Arc::clone(&result));
        Ok(result)
    }

    pub fn get(&self, path: &Utf8Path) -> Option<Arc<TexturesParseResult>> {
        self.entries.get(path).cloned()
    }

    pub fn contains(&self, path: &Utf8Path) -> bool {
        self.entries.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn paths(&self) -> impl Iterator<Item = &Utf8Path> {
        self.entries.keys().map(|p| p.as_path())
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ReaderId;
    use crate::error::Error;
    use std::cell::Cell;
    use std::rc::Rc;

    struct CountingParser(Rc<Cell<usize>>);

    impl DefinitionParser for CountingParser {
        fn parse(&self, data: &TextResourceData) -> TexturesParseResult {
            self.0.set(self.0.get() + 1);
            TexturesParser.parse(data)
        }
    }

    fn lump() -> Result<TextResourceData> {
        Ok(TextResourceData {
            data: b"Texture \"DOOR1\", 64, 72 { Patch \"DOOR2_1\", 0, 0 }".to_vec(),
            reader: ReaderId::from_raw(1),
            reader_name: "test".into(),
            path: "TEXTURES".into(),
            script: true,
        })
    }

    #[test]
    fn test_same_path_parses_once() {
        let calls = Rc::new(Cell::new(0));
        let mut cache = ParserCache::with_parser(CountingParser(Rc::clone(&calls)));
        let path = Utf8Path::new("/mods/res/TEXTURES");

        let first = cache.get_or_parse(path, lump).unwrap();
        let second = cache.get_or_parse(path, lump).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(calls.get(), 1);
        assert_eq!(first.textures[0].name, "DOOR1");
    }

    #[test]
    fn test_distinct_paths_parse_separately() {
        let calls = Rc::new(Cell::new(0));
        let mut cache = ParserCache::with_parser(CountingParser(Rc::clone(&calls)));

        cache.get_or_parse(Utf8Path::new("/a/TEXTURES"), lump).unwrap();
        cache.get_or_parse(Utf8Path::new("/b/TEXTURES"), lump).unwrap();

        assert_eq!(calls.get(), 2);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_failed_load_is_not_cached() {
        let mut cache = ParserCache::new();
        let path = Utf8Path::new("/a/TEXTURES");

        let result = cache.get_or_parse(path, || Err(Error::FileNotFound("TEXTURES".into())));
        assert!(result.is_err());
        assert!(!cache.contains(path));
    }
}
