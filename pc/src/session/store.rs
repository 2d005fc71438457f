//! Session id persistence
//!
//! A [`SessionStore`] keeps string values under a key, each with an expiry.
//! Expired values read as absent.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};
use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Key/value persistence with expiry
pub trait SessionStore: Send + Sync {
    /// Read a value; expired values read as absent
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store a value that expires after `ttl`
    fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()>;

    /// Forget a value; returns whether a live value was removed
    fn remove(&self, key: &str) -> Result<bool>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredValue {
    value: String,
    expires_at: DateTime<Utc>,
}

impl StoredValue {
    fn new(value: &str, ttl: Duration) -> Self {
        Self {
            value: value.to_string(),
            expires_at: Utc::now() + ttl,
        }
    }

    fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }
}

/// JSON file store, one object of `{key: {value, expires_at}}`
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        debug!(?path, "FileSessionStore::new: called");
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load entries; a missing file is empty, a corrupt one is logged and treated as empty
    fn load(&self) -> Result<HashMap<String, StoredValue>> {
        if !self.path.exists() {
            debug!(path = ?self.path, "FileSessionStore::load: no file");
            return Ok(HashMap::new());
        }

        let content = fs::read_to_string(&self.path).context("Failed to read session file")?;
        match serde_json::from_str(&content) {
            Ok(entries) => Ok(entries),
            Err(e) => {
                warn!(path = ?self.path, error = %e, "Session file is corrupt, ignoring it");
                Ok(HashMap::new())
            }
        }
    }

    /// Write entries atomically, dropping expired ones
    fn save(&self, mut entries: HashMap<String, StoredValue>) -> Result<()> {
        let now = Utc::now();
        entries.retain(|_, v| v.is_live(now));

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).context("Failed to create session directory")?;
        }

        let content = serde_json::to_string_pretty(&entries).context("Failed to serialize session file")?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, content).context("Failed to write session file")?;
        fs::rename(&tmp, &self.path).context("Failed to replace session file")?;
        Ok(())
    }
}

impl SessionStore for FileSessionStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self.load()?;
        Ok(entries
            .get(key)
            .filter(|v| v.is_live(Utc::now()))
            .map(|v| v.value.clone()))
    }

    fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        debug!(%key, ?ttl, "FileSessionStore::set: called");
        let mut entries = self.load()?;
        entries.insert(key.to_string(), StoredValue::new(value, ttl));
        self.save(entries)
    }

    fn remove(&self, key: &str) -> Result<bool> {
        debug!(%key, "FileSessionStore::remove: called");
        let mut entries = self.load()?;
        let removed = entries.remove(key).is_some_and(|v| v.is_live(Utc::now()));
        self.save(entries)?;
        Ok(removed)
    }
}

/// In-memory store for tests and throwaway sessions
#[derive(Default)]
pub struct MemorySessionStore {
    entries: Mutex<HashMap<String, StoredValue>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, StoredValue>>> {
        self.entries
            .lock()
            .map_err(|_| eyre::eyre!("Session store lock poisoned"))
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self
            .lock()?
            .get(key)
            .filter(|v| v.is_live(Utc::now()))
            .map(|v| v.value.clone()))
    }

    fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        self.lock()?.insert(key.to_string(), StoredValue::new(value, ttl));
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool> {
        Ok(self.lock()?.remove(key).is_some_and(|v| v.is_live(Utc::now())))
    }
}
