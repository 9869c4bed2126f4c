//! Durable key-value storage for credentials.
//!
//! The session keeps exactly two string entries, [`ACCESS_TOKEN_KEY`] and
//! [`REFRESH_TOKEN_KEY`]. Stores are synchronous: a read or write never
//! suspends the caller.

use directories::ProjectDirs;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Storage key of the access token.
pub const ACCESS_TOKEN_KEY: &str = "access_token";

/// Storage key of the refresh token.
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing file failed.
    #[error("Storage I/O error: {0}")]
    Io(#[from] io::Error),

    /// The backing file is not a JSON object of strings.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<StorageError> for alphadesk_core::ClientError {
    fn from(err: StorageError) -> Self {
        Self::Storage(err.to_string())
    }
}

/// String key-value store for credentials.
pub trait TokenStore: Send + Sync + fmt::Debug {
    /// Read a value.
    fn get(&self, key: &str) -> Option<String>;

    /// Write a value.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete a value. Deleting a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// In-memory store.
///
/// Suitable for tests and for embedders that persist credentials elsewhere.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryTokenStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.read().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries
            .write()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries.write().remove(key);
        Ok(())
    }
}

/// Store backed by a JSON object in a single file.
///
/// Every change is written through: the map is serialized to a sibling
/// temporary file which then replaces the original.
#[derive(Debug)]
pub struct FileTokenStore {
    path: PathBuf,
    entries: RwLock<HashMap<String, String>>,
}

impl FileTokenStore {
    /// Open a store at `path`. A missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(text) if text.trim().is_empty() => HashMap::new(),
            Ok(text) => serde_json::from_str(&text)?,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "Credential file not found, starting empty");
                HashMap::new()
            }
            Err(err) => return Err(err.into()),
        };

        Ok(Self {
            path,
            entries: RwLock::new(entries),
        })
    }

    /// Open the store in the platform data directory.
    pub fn open_default() -> Result<Self, StorageError> {
        Self::open(Self::default_path())
    }

    /// `<data dir>/credentials.json`, or `./credentials.json` when the
    /// platform directories cannot be determined.
    pub fn default_path() -> PathBuf {
        match ProjectDirs::from("io", "Alphadesk", "alphadesk") {
            Some(dirs) => dirs.data_dir().join("credentials.json"),
            None => {
                warn!("Failed to determine platform-specific directories, using current directory");
                PathBuf::from("credentials.json")
            }
        }
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, entries: &HashMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let tmp = self.path.with_extension("json.tmp");
        let mut file = create_private(&tmp)?;
        file.write_all(&serde_json::to_vec_pretty(entries)?)?;
        file.sync_all()?;
        drop(file);
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    /// Apply `change` to a copy of the entries, write it, then commit it.
    ///
    /// Memory is left untouched when the write fails.
    fn update<F>(&self, change: F) -> Result<(), StorageError>
    where
        F: FnOnce(&mut HashMap<String, String>) -> bool,
    {
        let mut entries = self.entries.write();
        let mut next = entries.clone();
        if change(&mut next) {
            self.persist(&next)?;
            *entries = next;
        }
        Ok(())
    }
}

/// Create (or truncate) `path` readable by the owner only.
fn create_private(path: &Path) -> io::Result<fs::File> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
        options.mode(0o600);
        let file = options.open(path)?;
        // mode only applies on creation; a leftover temp file keeps its own
        file.set_permissions(fs::Permissions::from_mode(0o600))?;
        Ok(file)
    }

    #[cfg(not(unix))]
    {
        options.open(path)
    }
}

impl TokenStore for FileTokenStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.read().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.update(|entries| {
            entries.insert(key.to_string(), value.to_string());
            true
        })
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.update(|entries| entries.remove(key).is_some())
    }
}
