//! Key-value local store for unsynced drafts.
//!
//! DESIGN
//! ======
//! The editor only needs string values under string keys that survive a
//! reload. `MemoryStore` backs tests and embedded hosts; `FileStore` keeps one
//! JSON file per key in a directory, written via a temp file and rename so a
//! crash mid-write never leaves a truncated value behind.

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("local store I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("local store value could not be encoded: {0}")]
    Encode(#[from] serde_json::Error),
}

impl StoreError {
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Io(_) => "E_STORE_IO",
            Self::Encode(_) => "E_STORE_ENCODE",
        }
    }
}

/// String key-value storage that persists across editor sessions.
pub trait LocalStore {
    /// Read the value under `key`, or `None` if absent.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Write `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the backend cannot be written.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Delete `key`. Deleting an absent key succeeds.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the backend cannot be written.
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;

    /// All keys currently stored, sorted.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the backend cannot be listed.
    fn keys(&self) -> Result<Vec<String>, StoreError>;
}

// =============================================================================
// MEMORY
// =============================================================================

/// Process-local store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl LocalStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.entries.keys().cloned().collect())
    }
}

// =============================================================================
// FILE
// =============================================================================

const FILE_EXT: &str = "json";

/// Directory-backed store: one file per key.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Open (creating if needed) a store rooted at `root`.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the directory cannot be created.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.{FILE_EXT}", encode_key(key)))
    }
}

impl LocalStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.path_for(key);
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        let mut keys = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            if path.extension().is_none_or(|e| e != FILE_EXT) {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if let Some(key) = decode_key(stem) {
                keys.push(key);
            }
        }
        keys.sort();
        Ok(keys)
    }
}

/// Escape everything outside `[A-Za-z0-9_-]` as `%XX` so any key maps to a
/// portable file name and back.
fn encode_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for b in key.bytes() {
        if b.is_ascii_alphanumeric() || b == b'-' || b == b'_' {
            out.push(char::from(b));
        } else {
            out.push_str(&format!("%{b:02X}"));
        }
    }
    out
}

fn decode_key(name: &str) -> Option<String> {
    let bytes = name.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = name.get(i + 1..i + 3)?;
            let Ok(b) = u8::from_str_radix(hex, 16) else {
                return None;
            };
            out.push(b);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    let Ok(key) = String::from_utf8(out) else {
        return None;
    };
    Some(key)
}
