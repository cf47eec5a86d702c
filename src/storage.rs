use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::debug;

pub const HTML_CONTENT_TYPE: &str = "text/html";
pub const CSV_CONTENT_TYPE: &str = "text/csv";

/// Container/key object storage. Writes are last-write-wins per key.
pub trait ObjectStore {
    fn put(&self, container: &str, key: &str, body: &[u8], content_type: &str) -> Result<()>;
    fn get(&self, container: &str, key: &str) -> Result<Vec<u8>>;
}

/// Stores every container as a directory under `root`.
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn object_path(&self, container: &str, key: &str) -> Result<PathBuf> {
        let mut path = self.root.clone();
        for part in [container, key] {
            let relative = Path::new(part);
            if part.is_empty() || !relative.components().all(|c| matches!(c, Component::Normal(_))) {
                anyhow::bail!("Invalid storage path segment: {:?}", part);
            }
            path.push(relative);
        }
        Ok(path)
    }
}

impl ObjectStore for FsStore {
    fn put(&self, container: &str, key: &str, body: &[u8], content_type: &str) -> Result<()> {
        let path = self.object_path(container, key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        fs::write(&path, body)
            .with_context(|| format!("Failed to write object: {}", path.display()))?;
        debug!("Stored {} bytes ({}) at {}", body.len(), content_type, path.display());
        Ok(())
    }

    fn get(&self, container: &str, key: &str) -> Result<Vec<u8>> {
        let path = self.object_path(container, key)?;
        fs::read(&path).with_context(|| format!("Failed to read object: {}", path.display()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub body: Vec<u8>,
    pub content_type: String,
}

/// In-process store for tests and dry runs.
#[derive(Default)]
pub struct MemoryStore {
    objects: Mutex<BTreeMap<(String, String), StoredObject>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn object(&self, container: &str, key: &str) -> Option<StoredObject> {
        self.lock()
            .get(&(container.to_string(), key.to_string()))
            .cloned()
    }

    /// Keys in `container`, sorted.
    pub fn keys(&self, container: &str) -> Vec<String> {
        self.lock()
            .keys()
            .filter(|(c, _)| c == container)
            .map(|(_, k)| k.clone())
            .collect()
    }

    // Every write is a single insert, so the map is consistent even after a
    // panic elsewhere poisoned the lock.
    fn lock(&self) -> MutexGuard<'_, BTreeMap<(String, String), StoredObject>> {
        self.objects.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ObjectStore for MemoryStore {
    fn put(&self, container: &str, key: &str, body: &[u8], content_type: &str) -> Result<()> {
        self.lock().insert(
            (container.to_string(), key.to_string()),
            StoredObject {
                body: body.to_vec(),
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }

    fn get(&self, container: &str, key: &str) -> Result<Vec<u8>> {
        self.lock()
            .get(&(container.to_string(), key.to_string()))
            .map(|object| object.body.clone())
            .with_context(|| format!("Object not found: {}/{}", container, key))
    }
}
