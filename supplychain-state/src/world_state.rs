//! File-backed world state.
//!
//! # Storage layout
//!
//! ```text
//! ~/.supplychain/
//!   state/
//!     <hex(key)>.json   (one value per key: mode 0600)
//! ```
//!
//! Hex-encoding the key keeps arbitrary keys filesystem-safe and preserves
//! byte-lexicographic order, so a directory listing sorted by decoded key is
//! the range-scan order.
//!
//! Writes use the same atomic `.tmp` + rename pattern as every other file this
//! workspace persists.

use std::path::{Path, PathBuf};

use supplychain_core::stub::{in_range, KeyValue};

use crate::error::{io_err, StateError};

/// Longest key accepted; its hex form plus extension must fit a file name.
pub const MAX_KEY_BYTES: usize = 120;

const VALUE_EXT: &str = "json";

// ---------------------------------------------------------------------------
// 1. Path helpers
// ---------------------------------------------------------------------------

/// `<home>/.supplychain/`
pub fn root_at(home: &Path) -> PathBuf {
    home.join(".supplychain")
}

/// `<home>/.supplychain/state/`: pure, no I/O.
pub fn state_dir_at(home: &Path) -> PathBuf {
    root_at(home).join("state")
}

/// Home directory of the current user.
pub fn home() -> Result<PathBuf, StateError> {
    dirs::home_dir().ok_or(StateError::HomeNotFound)
}

// ---------------------------------------------------------------------------
// 2. Store
// ---------------------------------------------------------------------------

/// Committed key/value state rooted at one directory.
#[derive(Debug, Clone)]
pub struct FileWorldState {
    dir: PathBuf,
}

impl FileWorldState {
    /// Open (creating if needed, mode `0700`) the state under `home`.
    pub fn open_at(home: &Path) -> Result<Self, StateError> {
        let dir = state_dir_at(home);
        if !dir.exists() {
            std::fs::create_dir_all(&dir).map_err(|e| io_err(&dir, e))?;
            set_dir_permissions(&dir)?;
        }
        Ok(Self { dir })
    }

    /// `open_at` convenience wrapper.
    pub fn open() -> Result<Self, StateError> {
        Self::open_at(&home()?)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// `<state>/<hex(key)>.json`: pure, no I/O.
    pub fn key_path(&self, key: &str) -> PathBuf {
        self.dir
            .join(format!("{}.{VALUE_EXT}", hex::encode(key.as_bytes())))
    }

    /// `Ok(None)` if the key was never written.
    ///
    /// Keys too long for [`put`](Self::put) can never have been written, so
    /// they read as absent without touching the filesystem.
    pub fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StateError> {
        if key.len() > MAX_KEY_BYTES {
            return Ok(None);
        }
        let path = self.key_path(key);
        match std::fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(io_err(path, err)),
        }
    }

    /// Atomically replace the value under `key`.
    ///
    /// Write flow: `.json.tmp` sibling → `chmod 0600` → `rename`.
    pub fn put(&self, key: &str, value: &[u8]) -> Result<(), StateError> {
        validate_key(key)?;
        let path = self.key_path(key);
        let tmp = path.with_extension(format!("{VALUE_EXT}.tmp"));
        std::fs::write(&tmp, value).map_err(|e| io_err(&tmp, e))?;
        set_file_permissions(&tmp)?;
        std::fs::rename(&tmp, &path).map_err(|e| io_err(&path, e))?;
        Ok(())
    }

    /// Entries with `start <= key < end` (empty bound = open), sorted by key.
    ///
    /// Orphaned `.tmp` files from an interrupted write are ignored.
    pub fn range(&self, start: &str, end: &str) -> Result<Vec<KeyValue>, StateError> {
        let mut entries = Vec::new();
        for (key, path) in self.list_entries()? {
            if !in_range(&key, start, end) {
                continue;
            }
            let value = std::fs::read(&path).map_err(|e| io_err(&path, e))?;
            entries.push(KeyValue { key, value });
        }
        entries.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(entries)
    }

    /// Number of stored keys.
    pub fn len(&self) -> Result<usize, StateError> {
        Ok(self.list_entries()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, StateError> {
        Ok(self.len()? == 0)
    }

    fn list_entries(&self) -> Result<Vec<(String, PathBuf)>, StateError> {
        if !self.dir.exists() {
            return Ok(vec![]);
        }
        let mut entries = Vec::new();
        let read_dir = std::fs::read_dir(&self.dir).map_err(|e| io_err(&self.dir, e))?;
        for entry in read_dir {
            let entry = entry.map_err(|e| io_err(&self.dir, e))?;
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(VALUE_EXT) {
                continue;
            }
            let key = decode_key(&path).ok_or_else(|| StateError::CorruptEntry {
                path: path.clone(),
            })?;
            entries.push((key, path));
        }
        Ok(entries)
    }
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

pub(crate) fn validate_key(key: &str) -> Result<(), StateError> {
    if key.is_empty() {
        return Err(StateError::InvalidKey {
            key: key.to_string(),
            reason: "key must not be empty",
        });
    }
    if key.len() > MAX_KEY_BYTES {
        return Err(StateError::InvalidKey {
            key: key.to_string(),
            reason: "key is longer than 120 bytes",
        });
    }
    Ok(())
}

fn decode_key(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    let bytes = hex::decode(stem).ok()?;
    String::from_utf8(bytes).ok()
}

#[cfg(unix)]
fn set_dir_permissions(path: &Path) -> Result<(), StateError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o700))
        .map_err(|e| io_err(path, e))
}
#[cfg(not(unix))]
fn set_dir_permissions(_path: &Path) -> Result<(), StateError> {
    Ok(())
}

#[cfg(unix)]
fn set_file_permissions(path: &Path) -> Result<(), StateError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
        .map_err(|e| io_err(path, e))
}
#[cfg(not(unix))]
fn set_file_permissions(_path: &Path) -> Result<(), StateError> {
    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
