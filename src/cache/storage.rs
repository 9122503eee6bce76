use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::foundation::error::{EmoteError, EmoteResult};

/// Flat key/value blob store. Keys are `/`-separated relative paths such as
/// `artifacts/<fingerprint>`.
pub trait Storage: Send + Sync {
    fn exists(&self, key: &str) -> EmoteResult<bool>;

    /// Fails with [`EmoteError::NotFound`] when `key` was never written.
    fn get(&self, key: &str) -> EmoteResult<Vec<u8>>;

    /// Readers never observe a partially written value.
    fn put(&self, key: &str, bytes: &[u8]) -> EmoteResult<()>;
}

/// Normalize a storage key: `/` separators, no empty or `.` segments, no absolute paths and no
/// `..` traversal.
pub(crate) fn normalize_key(key: &str) -> EmoteResult<String> {
    let s = key.replace('\\', "/");
    if s.starts_with('/') {
        return Err(EmoteError::invalid_argument(format!(
            "storage key '{key}' must be relative"
        )));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(EmoteError::invalid_argument(format!(
                "storage key '{key}' must not contain '..'"
            )));
        }
        out.push(part);
    }

    if out.is_empty() {
        return Err(EmoteError::invalid_argument("storage key must be non-empty"));
    }
    Ok(out.join("/"))
}

/// Blobs as files under a root directory, one file per key.
#[derive(Debug, Clone)]
pub struct FsStorage {
    root: PathBuf,
}

impl FsStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> EmoteResult<(String, PathBuf)> {
        let norm = normalize_key(key)?;
        let path = self.root.join(&norm);
        Ok((norm, path))
    }
}

impl Storage for FsStorage {
    fn exists(&self, key: &str) -> EmoteResult<bool> {
        let (_, path) = self.path_for(key)?;
        Ok(path.is_file())
    }

    fn get(&self, key: &str) -> EmoteResult<Vec<u8>> {
        let (norm, path) = self.path_for(key)?;
        match std::fs::read(&path) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(EmoteError::NotFound(norm)),
            Err(e) => Err(EmoteError::io(norm, e)),
        }
    }

    fn put(&self, key: &str, bytes: &[u8]) -> EmoteResult<()> {
        let (norm, path) = self.path_for(key)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| EmoteError::io(&norm, e))?;
        }

        // Write-then-rename: readers see nothing or the whole blob.
        let tmp = path.with_extension(format!(
            "tmp-{}-{:?}",
            std::process::id(),
            std::thread::current().id()
        ));
        let write = || -> std::io::Result<()> {
            let mut f = std::fs::File::create(&tmp)?;
            f.write_all(bytes)?;
            f.sync_all()?;
            std::fs::rename(&tmp, &path)
        };
        write().map_err(|e| {
            std::fs::remove_file(&tmp).ok();
            EmoteError::io(&norm, e)
        })?;

        tracing::trace!(key = %norm, bytes = bytes.len(), "stored blob");
        Ok(())
    }
}

/// In-process storage, used by tests and one-shot evaluations.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    blobs: Mutex<BTreeMap<String, Vec<u8>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn keys(&self) -> Vec<String> {
        self.lock().keys().cloned().collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, Vec<u8>>> {
        self.blobs.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Storage for MemoryStorage {
    fn exists(&self, key: &str) -> EmoteResult<bool> {
        let norm = normalize_key(key)?;
        Ok(self.lock().contains_key(&norm))
    }

    fn get(&self, key: &str) -> EmoteResult<Vec<u8>> {
        let norm = normalize_key(key)?;
        self.lock()
            .get(&norm)
            .cloned()
            .ok_or(EmoteError::NotFound(norm))
    }

    fn put(&self, key: &str, bytes: &[u8]) -> EmoteResult<()> {
        let norm = normalize_key(key)?;
        self.lock().insert(norm, bytes.to_vec());
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/cache/storage.rs"]
mod tests;
