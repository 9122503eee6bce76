use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::cache::storage::Storage;
use crate::foundation::error::{EmoteError, EmoteResult};

pub fn artifact_key(fingerprint: &str) -> String {
    format!("artifacts/{fingerprint}")
}

pub fn source_key(id: &str) -> String {
    format!("sources/{id}")
}

/// Outcome of [`ArtifactCache::get_or_create`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lookup {
    /// Already stored; the producer was not called.
    Hit,
    /// Produced by this call and stored.
    Created,
}

/// Content-addressed, additive store of encoded artifacts and fetched source bytes, in front of
/// a [`Storage`].
///
/// Producers for the same key never run concurrently within one cache: a per-key lock is held
/// while checking for existence and producing, so a late arrival finds the value present.
pub struct ArtifactCache {
    storage: Arc<dyn Storage>,
    inflight: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl std::fmt::Debug for ArtifactCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArtifactCache")
            .field("inflight", &lock(&self.inflight).len())
            .finish_non_exhaustive()
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}

impl ArtifactCache {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            storage,
            inflight: Mutex::new(HashMap::new()),
        }
    }

    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    pub fn contains(&self, fingerprint: &str) -> EmoteResult<bool> {
        self.storage.exists(&artifact_key(fingerprint))
    }

    pub fn load(&self, fingerprint: &str) -> EmoteResult<Vec<u8>> {
        self.storage.get(&artifact_key(fingerprint))
    }

    pub fn store(&self, fingerprint: &str, bytes: &[u8]) -> EmoteResult<()> {
        self.storage.put(&artifact_key(fingerprint), bytes)
    }

    /// Ensure `artifacts/<fingerprint>` exists, calling `produce` only if it does not.
    pub fn get_or_create<F>(&self, fingerprint: &str, produce: F) -> EmoteResult<Lookup>
    where
        F: FnOnce() -> EmoteResult<Vec<u8>>,
    {
        let key = artifact_key(fingerprint);
        self.single_flight(&key, || {
            if self.storage.exists(&key)? {
                return Ok(Lookup::Hit);
            }
            let bytes = produce()?;
            self.storage.put(&key, &bytes)?;
            Ok(Lookup::Created)
        })
    }

    /// Bytes of source emote `id`: from storage when previously fetched, otherwise from `fetch`,
    /// persisted under `sources/<id>` before returning.
    pub fn source_bytes<F>(&self, id: &str, fetch: F) -> EmoteResult<Vec<u8>>
    where
        F: FnOnce() -> EmoteResult<Vec<u8>>,
    {
        let key = source_key(id);
        self.single_flight(&key, || match self.storage.get(&key) {
            Ok(bytes) => {
                tracing::debug!(id, "source cache hit");
                Ok(bytes)
            }
            Err(EmoteError::NotFound(_)) => {
                let bytes = fetch()?;
                self.storage.put(&key, &bytes)?;
                tracing::debug!(id, bytes = bytes.len(), "source fetched");
                Ok(bytes)
            }
            Err(e) => Err(e),
        })
    }

    fn single_flight<T>(&self, key: &str, f: impl FnOnce() -> EmoteResult<T>) -> EmoteResult<T> {
        let slot = Arc::clone(
            lock(&self.inflight)
                .entry(key.to_owned())
                .or_insert_with(|| Arc::new(Mutex::new(()))),
        );

        let out = {
            let _guard = lock(&slot);
            f()
        };

        // Slots are cloned and released only under the registry lock; a count of 1 left in the
        // map means nobody else holds this key.
        let mut inflight = lock(&self.inflight);
        drop(slot);
        if inflight.get(key).is_some_and(|s| Arc::strong_count(s) == 1) {
            inflight.remove(key);
        }
        out
    }

    #[cfg(test)]
    fn inflight_len(&self) -> usize {
        lock(&self.inflight).len()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/cache/artifact.rs"]
mod tests;
