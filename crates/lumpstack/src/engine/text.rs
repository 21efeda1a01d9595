//! Text lump discovery.
//!
//! Results from this container come first, followed by each sub-reader's
//! results (last-discovered sub-reader first). Consumers apply "later entries
//! extend or override earlier ones" when they process the list.

use super::ResourceEngine;
use crate::error::Result;
use crate::text::{GameType, ScriptType, TextResourceData};

impl ResourceEngine {
    /// DECORATE lumps. See [`script_data`](Self::script_data) for how `name`
    /// is resolved.
    pub fn decorate_data(&mut self, name: &str) -> Result<Vec<TextResourceData>> {
        self.script_data(name, "DECORATE")
    }

    pub fn zscript_data(&mut self, name: &str) -> Result<Vec<TextResourceData>> {
        self.script_data(name, "ZSCRIPT")
    }

    pub fn modeldef_data(&mut self, name: &str) -> Result<Vec<TextResourceData>> {
        self.script_data(name, "MODELDEF")
    }

    /// Find script lumps by `name`.
    ///
    /// A name with an extension (`actors/monsters.txt`) is an exact path: the
    /// one file, or a warning and nothing. A bare name (`DECORATE`,
    /// `actors/DECORATE`) matches every file with that title in its directory.
    fn script_data(&mut self, name: &str, family: &str) -> Result<Vec<TextResourceData>> {
        self.ensure_readable()?;

        let name = name.replace('\\', "/");
        let (dir, file_name) = match name.rfind('/') {
            Some(idx) => (&name[..idx], &name[idx + 1..]),
            None => ("", name.as_str()),
        };

        let exact_path = file_name.contains('.');
        let files = if exact_path {
            if self.backend.file_exists(&name) {
                vec![name.clone()]
            } else {
                tracing::warn!(
                    "Unable to load {} file '{}' from '{}'",
                    family,
                    name,
                    self.display_name()
                );
                Vec::new()
            }
        } else {
            self.backend.list_files_with_title(dir, file_name, false)?
        };

        let mut result = self.text_resources(files);
        // Embedded archives hold bare lumps, never paths.
        if !exact_path {
            for sub in self.sub_readers.iter_mut().rev() {
                result.extend(sub.script_data(&name, family)?);
            }
        }
        Ok(result)
    }

    /// `ZMAPINFO` lumps, or `MAPINFO` when there is no `ZMAPINFO` at all.
    pub fn mapinfo_data(&mut self) -> Result<Vec<TextResourceData>> {
        self.ensure_readable()?;

        let mut files = self.backend.list_files_with_title("", "ZMAPINFO", false)?;
        if files.is_empty() {
            files = self.backend.list_files_with_title("", "MAPINFO", false)?;
        }

        let mut result = self.text_resources(files);
        for sub in self.sub_readers.iter_mut().rev() {
            result.extend(sub.mapinfo_data()?);
        }
        Ok(result)
    }

    /// GLDEFS lumps, with the game-specific lump (`DOOMDEFS`, ...) first when
    /// `game` is known.
    pub fn gldefs_data(&mut self, game: GameType) -> Result<Vec<TextResourceData>> {
        self.ensure_readable()?;

        let mut files = Vec::new();
        if let Some(lump) = game.gldefs_lump() {
            files.extend(self.backend.list_files_with_title_prefix("", lump, false)?);
        }
        files.extend(self.backend.list_files_with_title_prefix("", "GLDEFS", false)?);

        let mut result = self.text_resources(files);
        for sub in self.sub_readers.iter_mut().rev() {
            result.extend(sub.gldefs_data(game)?);
        }
        Ok(result)
    }

    pub fn dehacked_data(&mut self) -> Result<Vec<TextResourceData>> {
        self.prefixed_root_lumps(ScriptType::Dehacked)
    }

    pub fn iwadinfo_data(&mut self) -> Result<Vec<TextResourceData>> {
        self.prefixed_root_lumps(ScriptType::Iwadinfo)
    }

    fn prefixed_root_lumps(&mut self, script_type: ScriptType) -> Result<Vec<TextResourceData>> {
        self.ensure_readable()?;

        let files = self
            .backend
            .list_files_with_title_prefix("", script_type.lump_name(), false)?;

        let mut result = self.text_resources(files);
        for sub in self.sub_readers.iter_mut().rev() {
            result.extend(sub.prefixed_root_lumps(script_type)?);
        }
        Ok(result)
    }

    /// Generic text lumps of one family from the container root.
    ///
    /// `singular` takes only the first file titled after the family (any
    /// extension). Otherwise every file matches whose title equals the lump
    /// name, or starts with it when `partial` is set.
    pub fn text_lump_data(
        &mut self,
        script_type: ScriptType,
        singular: bool,
        partial: bool,
    ) -> Result<Vec<TextResourceData>> {
        self.ensure_readable()?;

        let lump = script_type.lump_name();
        let files = if singular {
            self.backend.find_first_file(lump, false)?.into_iter().collect()
        } else if partial {
            self.backend.list_files_with_title_prefix("", lump, false)?
        } else {
            self.backend.list_files_with_title("", lump, false)?
        };

        let mut result = self.text_resources(files);
        for sub in self.sub_readers.iter_mut().rev() {
            result.extend(sub.text_lump_data(script_type, singular, partial)?);
        }
        Ok(result)
    }

    fn text_resources(&mut self, files: Vec<String>) -> Vec<TextResourceData> {
        let mut result = Vec::with_capacity(files.len());
        for path in files {
            if let Some(data) = self.read_or_warn(&path) {
                result.push(TextResourceData {
                    data,
                    reader: self.id,
                    reader_name: self.display_name().to_string(),
                    path,
                    script: true,
                });
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::DiagnosticLog;
    use crate::engine::EngineOptions;
    use crate::location::ResourceLocation;
    use camino::Utf8PathBuf;
    use std::fs;
    use tempfile::tempdir;
    use tracing_subscriber::layer::SubscriberExt;

    fn open(files: &[(&str, &str)]) -> (tempfile::TempDir, ResourceEngine) {
        let dir = tempdir().unwrap();
        for (rel, text) in files {
            let path = dir.path().join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, text).unwrap();
        }
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
        let engine =
            ResourceEngine::open(ResourceLocation::directory(root), EngineOptions::default())
                .unwrap();
        (dir, engine)
    }

    fn paths(data: &[TextResourceData]) -> Vec<&str> {
        data.iter().map(|d| d.path.as_str()).collect()
    }

    #[test]
    fn test_decorate_by_title_and_path() {
        let (_dir, mut engine) = open(&[
            ("DECORATE.txt", "actor A {}"),
            ("DECORATE.dec", "actor B {}"),
            ("actors/monsters.txt", "actor C {}"),
        ]);

        let by_title = engine.decorate_data("DECORATE").unwrap();
        assert_eq!(paths(&by_title), vec!["DECORATE.dec", "DECORATE.txt"]);
        assert!(by_title.iter().all(|d| d.script));

        let by_path = engine.decorate_data("actors/monsters.txt").unwrap();
        assert_eq!(paths(&by_path), vec!["actors/monsters.txt"]);
        assert_eq!(by_path[0].text(), "actor C {}");

        let log = DiagnosticLog::new();
        let subscriber = tracing_subscriber::registry().with(log.clone());
        tracing::subscriber::with_default(subscriber, || {
            assert!(engine.decorate_data("actors/missing.txt").unwrap().is_empty());
        });
        assert_eq!(log.warning_count(), 1);
        assert!(log.entries()[0].message.contains("actors/missing.txt"));
    }

    #[test]
    fn test_zmapinfo_preferred() {
        let (_dir, mut engine) = open(&[("MAPINFO.txt", "old"), ("ZMAPINFO.txt", "new")]);
        assert_eq!(paths(&engine.mapinfo_data().unwrap()), vec!["ZMAPINFO.txt"]);

        let (_dir, mut engine) = open(&[("MAPINFO.txt", "old")]);
        assert_eq!(paths(&engine.mapinfo_data().unwrap()), vec!["MAPINFO.txt"]);
    }

    #[test]
    fn test_gldefs_game_lump_first() {
        let (_dir, mut engine) = open(&[("GLDEFS.txt", "generic"), ("DOOMDEFS.txt", "doom")]);

        let doom = engine.gldefs_data(GameType::Doom).unwrap();
        assert_eq!(paths(&doom), vec!["DOOMDEFS.txt", "GLDEFS.txt"]);

        let unknown = engine.gldefs_data(GameType::Unknown).unwrap();
        assert_eq!(paths(&unknown), vec!["GLDEFS.txt"]);
    }

    #[test]
    fn test_prefixed_lumps() {
        let (_dir, mut engine) = open(&[
            ("DEHACKED.deh", "Patch File"),
            ("DEHACKED_extra.deh", "Patch File"),
            ("IWADINFO.txt", "IWad {}"),
        ]);

        assert_eq!(engine.dehacked_data().unwrap().len(), 2);
        assert_eq!(paths(&engine.iwadinfo_data().unwrap()), vec!["IWADINFO.txt"]);
    }

    #[test]
    fn test_generic_text_lumps() {
        let (_dir, mut engine) = open(&[
            ("SNDINFO.txt", "a"),
            ("SNDINFO.lmp", "b"),
            ("SNDINFOX.txt", "c"),
        ]);

        let singular = engine.text_lump_data(ScriptType::Sndinfo, true, false).unwrap();
        assert_eq!(singular.len(), 1);

        let exact = engine.text_lump_data(ScriptType::Sndinfo, false, false).unwrap();
        assert_eq!(exact.len(), 2);

        let partial = engine.text_lump_data(ScriptType::Sndinfo, false, true).unwrap();
        assert_eq!(partial.len(), 3);
    }
}
