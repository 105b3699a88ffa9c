//! Session flag store
//!
//! Persistent key/value storage for the logged-in operator. Entries are flat
//! strings, mirroring what a browser keeps in local storage, so the file can
//! be inspected or cleared by hand.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use fitfuel_common::types::{
    Session, GUARD_KEYS, KEY_IS_ADMIN, KEY_USER_EMAIL, KEY_USER_ID, KEY_USER_NAME,
};
use fitfuel_common::{ConsoleError, Result};
use tracing::{debug, warn};

pub trait SessionStore {
    fn read(&self, key: &str) -> Result<Option<String>>;

    fn write(&self, key: &str, value: &str) -> Result<()>;

    fn remove(&self, key: &str) -> Result<()>;

    /// Drop the logged-in entries and the admin marker
    fn clear(&self) -> Result<()> {
        for key in GUARD_KEYS {
            self.remove(key)?;
        }
        self.remove(KEY_IS_ADMIN)
    }

    /// Write all four session entries. If any write fails, whatever landed
    /// is cleared again so the guard never sees half a session.
    fn save_session(&self, session: &Session) -> Result<()> {
        let written = session
            .entries()
            .iter()
            .try_for_each(|(key, value)| self.write(key, value));

        if let Err(e) = written {
            warn!("Session write failed, rolling back: {}", e);
            if let Err(clear_err) = self.clear() {
                warn!("Failed to roll back partial session: {}", clear_err);
            }
            return Err(e);
        }
        Ok(())
    }

    /// The stored session, if a user identifier is present
    fn load_session(&self) -> Result<Option<Session>> {
        let Some(user_id) = self.read(KEY_USER_ID)? else {
            return Ok(None);
        };

        Ok(Some(Session {
            user_id,
            user_name: self.read(KEY_USER_NAME)?.unwrap_or_default(),
            user_email: self.read(KEY_USER_EMAIL)?.unwrap_or_default(),
            is_admin: self.read(KEY_IS_ADMIN)?.as_deref() == Some("true"),
        }))
    }
}

/// In-memory store, used for `--ephemeral` runs and tests
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    entries: RwLock<BTreeMap<String, String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SessionStore for MemorySessionStore {
    fn read(&self, key: &str) -> Result<Option<String>> {
        let entries = self
            .entries
            .read()
            .map_err(|_| ConsoleError::storage("session lock poisoned"))?;
        Ok(entries.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| ConsoleError::storage("session lock poisoned"))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| ConsoleError::storage("session lock poisoned"))?;
        entries.remove(key);
        Ok(())
    }
}

/// Store backed by a JSON object of string entries on disk
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }

        let content = std::fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        serde_json::from_str(&content).map_err(|e| {
            ConsoleError::storage(format!(
                "session file {} is corrupt: {}",
                self.path.display(),
                e
            ))
        })
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(entries)?;
        std::fs::write(&self.path, content)?;
        debug!("Session written to {}", self.path.display());
        Ok(())
    }
}

impl SessionStore for FileSessionStore {
    fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.load()?.remove(key))
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.load()?;
        entries.insert(key.to_string(), value.to_string());
        self.persist(&entries)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.load()?;
        if entries.remove(key).is_some() {
            self.persist(&entries)?;
        }
        Ok(())
    }

    /// One read and one write, so the file holds all of the session or none
    fn save_session(&self, session: &Session) -> Result<()> {
        let mut entries = self.load()?;
        for (key, value) in session.entries() {
            entries.insert(key.to_string(), value);
        }
        self.persist(&entries)
    }
}

/// Either backend, picked at startup from configuration
#[derive(Debug)]
pub enum AnySessionStore {
    File(FileSessionStore),
    Memory(MemorySessionStore),
}

impl SessionStore for AnySessionStore {
    fn read(&self, key: &str) -> Result<Option<String>> {
        match self {
            Self::File(store) => store.read(key),
            Self::Memory(store) => store.read(key),
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        match self {
            Self::File(store) => store.write(key, value),
            Self::Memory(store) => store.write(key, value),
        }
    }

    fn remove(&self, key: &str) -> Result<()> {
        match self {
            Self::File(store) => store.remove(key),
            Self::Memory(store) => store.remove(key),
        }
    }

    fn save_session(&self, session: &Session) -> Result<()> {
        match self {
            Self::File(store) => store.save_session(session),
            Self::Memory(store) => store.save_session(session),
        }
    }
}
