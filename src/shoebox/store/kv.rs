use crate::error::KvError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use tokio::fs;
use uuid::Uuid;

/// Durable key-value storage. Writes are atomic per key; nothing spans keys.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Returns `None` when the key has never been written.
    async fn get(&self, key: &str) -> Result<Option<String>, KvError>;

    async fn set(&self, key: &str, value: String) -> Result<(), KvError>;
}

/// One file per key under a directory: `<root>/<key>.json`.
pub struct FsKeyValueStore {
    root: PathBuf,
}

impl FsKeyValueStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn key_path(&self, key: &str) -> Result<PathBuf, KvError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(KvError::Backend(format!("Invalid key: {:?}", key)));
        }
        Ok(self.root.join(format!("{}.json", key)))
    }
}

#[async_trait]
impl KeyValueStore for FsKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, KvError> {
        let path = self.key_path(key)?;
        match fs::read_to_string(&path).await {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(KvError::Io(err)),
        }
    }

    async fn set(&self, key: &str, value: String) -> Result<(), KvError> {
        let path = self.key_path(key)?;
        fs::create_dir_all(&self.root).await?;

        // Atomic write: tmp then rename
        let tmp = self.root.join(format!(".{}-{}.tmp", key, Uuid::new_v4()));
        fs::write(&tmp, value).await?;
        if let Err(err) = fs::rename(&tmp, &path).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(KvError::Io(err));
        }
        Ok(())
    }
}

/// In-memory store for tests, with switchable write failures.
#[derive(Default)]
pub struct MemKeyValueStore {
    values: Mutex<HashMap<String, String>>,
    simulate_write_error: AtomicBool,
}

impl MemKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable write error simulation for testing error handling.
    pub fn set_simulate_write_error(&self, simulate: bool) {
        self.simulate_write_error.store(simulate, Ordering::SeqCst);
    }

    /// Test helper to plant a raw value, bypassing the failure switch.
    pub fn insert_raw(&self, key: &str, value: &str) {
        if let Ok(mut values) = self.values.lock() {
            values.insert(key.to_string(), value.to_string());
        }
    }
}

#[async_trait]
impl KeyValueStore for MemKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, KvError> {
        let values = self
            .values
            .lock()
            .map_err(|_| KvError::Backend("Poisoned lock".to_string()))?;
        Ok(values.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> Result<(), KvError> {
        if self.simulate_write_error.load(Ordering::SeqCst) {
            return Err(KvError::Backend("Simulated write error".to_string()));
        }
        let mut values = self
            .values
            .lock()
            .map_err(|_| KvError::Backend("Poisoned lock".to_string()))?;
        values.insert(key.to_string(), value);
        Ok(())
    }
}
