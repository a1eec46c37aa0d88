use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::Context;
use axum::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

/// Flat key namespace shared with the original browser dashboard, so an
/// exported localStorage dump maps one-to-one onto a store file.
pub mod keys {
    pub const SESSION: &str = "derma_session";
    pub const FAILED_ATTEMPTS: &str = "derma_failed_attempts";
    pub const LOCK_UNTIL: &str = "derma_lock_until";
    pub const SETTINGS: &str = "derma_settings";
    pub const SERVICES: &str = "derma_services";
    pub const DOCTORS: &str = "derma_doctors";
    pub const BOOKINGS: &str = "derma_bookings";
    pub const WORKING_HOURS: &str = "derma_hours";
}

/// Key-value blob store. Values are opaque JSON strings; there are no
/// transactions and no cross-key atomicity, matching the localStorage
/// contract this replaces.
#[async_trait]
pub trait KvStore: Send + Sync {
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>>;
    async fn put(&self, key: &str, value: String) -> anyhow::Result<()>;
    async fn remove(&self, key: &str) -> anyhow::Result<()>;
}

/// Loads and deserializes a value, falling back to `default` when the key is
/// absent, unreadable, or holds malformed JSON. Corruption fails closed.
pub async fn load_or<T, F>(store: &dyn KvStore, key: &str, default: F) -> T
where
    T: DeserializeOwned,
    F: FnOnce() -> T,
{
    let raw = match store.get(key).await {
        Ok(Some(raw)) => raw,
        Ok(None) => return default(),
        Err(e) => {
            warn!(error = %e, key, "store read failed, using default");
            return default();
        }
    };
    match serde_json::from_str(&raw) {
        Ok(value) => value,
        Err(e) => {
            warn!(error = %e, key, "malformed blob, using default");
            default()
        }
    }
}

pub async fn load<T>(store: &dyn KvStore, key: &str) -> T
where
    T: DeserializeOwned + Default,
{
    load_or(store, key, T::default).await
}

pub async fn save<T: Serialize>(store: &dyn KvStore, key: &str, value: &T) -> anyhow::Result<()> {
    let raw = serde_json::to_string(value).with_context(|| format!("serialize {key}"))?;
    store.put(key, raw).await
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KvStore for MemoryStore {
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        let map = self.inner.lock().map_err(|_| anyhow::anyhow!("store lock poisoned"))?;
        Ok(map.get(key).cloned())
    }

    async fn put(&self, key: &str, value: String) -> anyhow::Result<()> {
        let mut map = self.inner.lock().map_err(|_| anyhow::anyhow!("store lock poisoned"))?;
        map.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> anyhow::Result<()> {
        let mut map = self.inner.lock().map_err(|_| anyhow::anyhow!("store lock poisoned"))?;
        map.remove(key);
        Ok(())
    }
}

/// Single JSON document on disk holding the whole namespace. Every write
/// rewrites the file; last writer wins.
pub struct FileStore {
    path: PathBuf,
    inner: Mutex<HashMap<String, String>>,
}

impl FileStore {
    pub fn open(path: PathBuf) -> Self {
        let map = match std::fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(map) => map,
                Err(e) => {
                    warn!(error = %e, path = %path.display(), "corrupt store file, starting empty");
                    HashMap::new()
                }
            },
            Err(_) => HashMap::new(),
        };
        Self {
            path,
            inner: Mutex::new(map),
        }
    }

    fn persist(&self, map: &HashMap<String, String>) -> anyhow::Result<()> {
        let raw = serde_json::to_string_pretty(map).context("serialize store file")?;
        std::fs::write(&self.path, raw)
            .with_context(|| format!("write {}", self.path.display()))
    }
}

#[async_trait]
impl KvStore for FileStore {
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        let map = self.inner.lock().map_err(|_| anyhow::anyhow!("store lock poisoned"))?;
        Ok(map.get(key).cloned())
    }

    async fn put(&self, key: &str, value: String) -> anyhow::Result<()> {
        let mut map = self.inner.lock().map_err(|_| anyhow::anyhow!("store lock poisoned"))?;
        map.insert(key.to_string(), value);
        self.persist(&map)
    }

    async fn remove(&self, key: &str) -> anyhow::Result<()> {
        let mut map = self.inner.lock().map_err(|_| anyhow::anyhow!("store lock poisoned"))?;
        map.remove(key);
        self.persist(&map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_roundtrip() {
        let store = MemoryStore::new();
        store.put("k", "[1,2,3]".into()).await.unwrap();
        let loaded: Vec<u32> = load(&store, "k").await;
        assert_eq!(loaded, vec![1, 2, 3]);
        store.remove("k").await.unwrap();
        assert!(store.get("k").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn malformed_blob_falls_back_to_default() {
        let store = MemoryStore::new();
        store.put("k", "{not json".into()).await.unwrap();
        let loaded: Vec<u32> = load(&store, "k").await;
        assert!(loaded.is_empty());

        let seeded: Vec<u32> = load_or(&store, "k", || vec![7]).await;
        assert_eq!(seeded, vec![7]);
    }

    #[tokio::test]
    async fn absent_key_uses_seed() {
        let store = MemoryStore::new();
        let seeded: Vec<u32> = load_or(&store, "missing", || vec![1]).await;
        assert_eq!(seeded, vec![1]);
    }

    #[tokio::test]
    async fn file_store_persists_across_reopen() {
        let path = std::env::temp_dir().join(format!(
            "dermacare-store-test-{}.json",
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);

        {
            let store = FileStore::open(path.clone());
            save(&store, "k", &vec![5u32]).await.unwrap();
        }
        let reopened = FileStore::open(path.clone());
        let loaded: Vec<u32> = load(&reopened, "k").await;
        assert_eq!(loaded, vec![5]);

        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn corrupt_file_starts_empty() {
        let path = std::env::temp_dir().join(format!(
            "dermacare-store-corrupt-{}.json",
            std::process::id()
        ));
        std::fs::write(&path, "][").unwrap();

        let store = FileStore::open(path.clone());
        assert!(store.get("anything").await.unwrap().is_none());

        let _ = std::fs::remove_file(&path);
    }
}
