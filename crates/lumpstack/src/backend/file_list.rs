//! Case-insensitive listing index shared by the backends.

/// The file name of `path` without its last extension.
///
/// `textures/DOOR1.png` -> `DOOR1`, `DECORATE` -> `DECORATE`, `.png` -> `""`.
pub fn file_title(path: &str) -> &str {
    let name = path.rsplit('/').next().unwrap_or(path);
    match name.rfind('.') {
        Some(idx) => &name[..idx],
        None => name,
    }
}

#[derive(Debug, Clone)]
struct Entry {
    /// Relative path as stored in the container.
    path: String,
    /// Lowercased parent directory (`""` for the root).
    dir: String,
    /// Lowercased title.
    title: String,
    /// Lowercased extension without the dot.
    ext: String,
}

/// Insertion-ordered list of container entries with case-insensitive lookups.
///
/// Every backend builds one of these when it is opened; the listing methods of
/// [`ContainerBackend`](super::ContainerBackend) are thin wrappers over it.
#[derive(Debug, Clone, Default)]
pub struct FileList {
    entries: Vec<Entry>,
}

impl FileList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry. Backslashes are normalized to `/`.
    pub fn push(&mut self, path: &str) {
        let path = path.replace('\\', "/");
        self.insert(path.trim_start_matches('/').to_string());
    }

    /// Add a lump archive entry exactly as named.
    ///
    /// Lump names may legally contain `\` (`VILE\1`), which is part of the
    /// name rather than a separator. Only `/` separates the virtual directory.
    pub fn push_lump(&mut self, path: &str) {
        self.insert(path.to_string());
    }

    fn insert(&mut self, path: String) {
        let lower = path.to_ascii_lowercase();
        let (dir, name) = match lower.rfind('/') {
            Some(idx) => (lower[..idx].to_string(), &lower[idx + 1..]),
            None => (String::new(), lower.as_str()),
        };
        let title = file_title(name).to_string();
        let ext = match name.rfind('.') {
            Some(idx) => name[idx + 1..].to_string(),
            None => String::new(),
        };
        self.entries.push(Entry {
            path,
            dir,
            title,
            ext,
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn in_dir<'a>(&'a self, path: &str, recursive: bool) -> impl Iterator<Item = &'a Entry> {
        let dir = path.trim_matches('/').to_ascii_lowercase();
        self.entries.iter().filter(move |e| {
            if e.dir == dir {
                return true;
            }
            recursive
                && (dir.is_empty()
                    || (e.dir.len() > dir.len()
                        && e.dir.starts_with(&dir)
                        && e.dir.as_bytes()[dir.len()] == b'/'))
        })
    }

    pub fn files(&self, path: &str, recursive: bool) -> Vec<String> {
        self.in_dir(path, recursive).map(|e| e.path.clone()).collect()
    }

    pub fn files_with_title(&self, path: &str, title: &str, recursive: bool) -> Vec<String> {
        let title = title.to_ascii_lowercase();
        self.in_dir(path, recursive)
            .filter(|e| e.title == title)
            .map(|e| e.path.clone())
            .collect()
    }

    pub fn files_with_title_prefix(&self, path: &str, prefix: &str, recursive: bool) -> Vec<String> {
        let prefix = prefix.to_ascii_lowercase();
        self.in_dir(path, recursive)
            .filter(|e| e.title.starts_with(&prefix))
            .map(|e| e.path.clone())
            .collect()
    }

    pub fn files_with_ext(&self, path: &str, ext: &str, recursive: bool) -> Vec<String> {
        let ext = ext.to_ascii_lowercase();
        self.in_dir(path, recursive)
            .filter(|e| e.ext == ext)
            .map(|e| e.path.clone())
            .collect()
    }

    pub fn first_with_title(&self, title: &str, recursive: bool) -> Option<String> {
        let title = title.to_ascii_lowercase();
        self.in_dir("", recursive)
            .find(|e| e.title == title)
            .map(|e| e.path.clone())
    }

    /// The stored spelling of `name`, matched case-insensitively, first as
    /// given and then with `\` read as a separator.
    pub fn resolve(&self, name: &str) -> Option<&str> {
        self.position(name).map(|i| self.entries[i].path.as_str())
    }

    /// Insertion index of `name`, matched like [`resolve`](Self::resolve).
    pub fn position(&self, name: &str) -> Option<usize> {
        let exact = name.trim_start_matches('/');
        if let Some(i) = self.entries.iter().position(|e| e.path.eq_ignore_ascii_case(exact)) {
            return Some(i);
        }
        let normalized = name.replace('\\', "/");
        let normalized = normalized.trim_start_matches('/');
        self.entries
            .iter()
            .position(|e| e.path.eq_ignore_ascii_case(normalized))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.resolve(name).is_some()
    }
}
