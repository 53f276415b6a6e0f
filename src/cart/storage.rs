//! Cart Storage
//!
//! A single durable slot holding the serialized cart, keyed by a fixed name.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use thiserror::Error;

/// Key the cart blob is stored under unless configured otherwise.
pub const DEFAULT_CART_KEY: &str = "athfal-cart";

/// Errors accessing the durable cart slot.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem access failed.
    #[error("failed to access cart storage at {}", path.display())]
    Io {
        /// Location of the slot
        path: PathBuf,

        /// Underlying IO error
        #[source]
        source: io::Error,
    },
}

/// Durable key-value slot for the serialized cart.
pub trait CartStorage {
    /// Read the stored blob, `None` when nothing has been stored yet.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the slot exists but cannot be read.
    fn load(&self) -> Result<Option<String>, StorageError>;

    /// Replace the stored blob.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the blob cannot be written.
    fn save(&mut self, blob: &str) -> Result<(), StorageError>;
}

/// In-process storage, used by tests and callers without a durable medium.
#[derive(Debug, Clone, Default)]
pub struct MemoryCartStorage {
    slot: Option<String>,
}

impl MemoryCartStorage {
    /// Create empty storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create storage pre-populated with a blob.
    pub fn with_blob(blob: impl Into<String>) -> Self {
        Self {
            slot: Some(blob.into()),
        }
    }

    /// Currently stored blob.
    pub fn blob(&self) -> Option<&str> {
        self.slot.as_deref()
    }
}

impl CartStorage for MemoryCartStorage {
    fn load(&self) -> Result<Option<String>, StorageError> {
        Ok(self.slot.clone())
    }

    fn save(&mut self, blob: &str) -> Result<(), StorageError> {
        self.slot = Some(blob.to_string());

        Ok(())
    }
}

/// File-backed storage: one JSON file named after the key inside a directory.
#[derive(Debug, Clone)]
pub struct FileCartStorage {
    path: PathBuf,
}

impl FileCartStorage {
    /// Storage for `key` inside `dir`.
    pub fn new(dir: impl AsRef<Path>, key: &str) -> Self {
        Self {
            path: dir.as_ref().join(format!("{key}.json")),
        }
    }

    /// Storage under [`DEFAULT_CART_KEY`] inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir, DEFAULT_CART_KEY)
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: io::Error) -> StorageError {
        StorageError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl CartStorage for FileCartStorage {
    fn load(&self) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(blob) => Ok(Some(blob)),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(error) => Err(self.io_error(error)),
        }
    }

    fn save(&mut self, blob: &str) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|error| self.io_error(error))?;
        }

        // Write then rename so a crash never leaves a half-written slot.
        let staging = self.path.with_extension("json.tmp");

        fs::write(&staging, blob).map_err(|error| self.io_error(error))?;
        fs::rename(&staging, &self.path).map_err(|error| self.io_error(error))
    }
}
