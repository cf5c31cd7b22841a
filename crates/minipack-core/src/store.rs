use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Content-by-identifier lookup backing the build.
///
/// Identifiers are canonical `./`-prefixed relative paths; how they map to
/// actual bytes is the store's concern.
pub trait BackingStore {
    fn read(&self, identifier: &str) -> io::Result<String>;
}

/// Backing store rooted at a project directory on disk.
pub struct DirStore {
    root: PathBuf,
}

impl DirStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        DirStore { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl BackingStore for DirStore {
    fn read(&self, identifier: &str) -> io::Result<String> {
        let relative = identifier.strip_prefix("./").unwrap_or(identifier);
        std::fs::read_to_string(self.root.join(relative))
    }
}

/// In-memory backing store for tests.
///
/// Tracks how many times each identifier was read so tests can assert the
/// single-visit property of the graph builder.
#[derive(Default)]
pub struct MemoryStore {
    files: HashMap<String, String>,
    read_counts: Mutex<HashMap<String, usize>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, identifier: impl Into<String>, content: impl Into<String>) {
        self.files.insert(identifier.into(), content.into());
    }

    /// Builder-style insert for test fixtures
    pub fn with(mut self, identifier: impl Into<String>, content: impl Into<String>) -> Self {
        self.insert(identifier, content);
        self
    }

    pub fn read_count(&self, identifier: &str) -> usize {
        self.read_counts
            .lock()
            .unwrap()
            .get(identifier)
            .copied()
            .unwrap_or(0)
    }
}

impl BackingStore for MemoryStore {
    fn read(&self, identifier: &str) -> io::Result<String> {
        *self
            .read_counts
            .lock()
            .unwrap()
            .entry(identifier.to_string())
            .or_insert(0) += 1;

        self.files.get(identifier).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("no such module: {identifier}"),
            )
        })
    }
}
