//! Durable key-value storage backing the token store.
//!
//! This module provides:
//! - `KeyValueStore`: the string-keyed storage trait
//! - `FileStore`: a JSON file in the platform data directory
//! - `KeyringStore`: OS-level secure storage via keyring
//! - `MemoryStore`: an in-process map for tests and throwaway sessions

pub mod file;
pub mod keyring;
pub mod memory;

use thiserror::Error;
use tracing::warn;

pub use file::FileStore;
pub use self::keyring::KeyringStore;
pub use memory::MemoryStore;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage file is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("Keychain error: {0}")]
    Keyring(#[from] ::keyring::Error),

    #[error("Storage lock poisoned")]
    Poisoned,
}

/// String-keyed, string-valued storage that survives process restarts.
///
/// Implementations only need the three single-key operations. Backends that can
/// write several keys in one step override `set_entries` and `remove_entries`;
/// the defaults apply keys one at a time.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Remove a key. Removing a key that is not present is not an error.
    fn remove(&self, key: &str) -> Result<(), StoreError>;

    /// Write every entry or none of them.
    ///
    /// When a write fails, every key of the batch is removed again before the
    /// error is returned, so a partial batch never stays behind.
    fn set_entries(&self, entries: &[(&str, &str)]) -> Result<(), StoreError> {
        for (key, value) in entries {
            if let Err(e) = self.set(key, value) {
                for (written, _) in entries {
                    if let Err(undo) = self.remove(written) {
                        warn!(key = %written, error = %undo, "Failed to roll back partial write");
                    }
                }
                return Err(e);
            }
        }
        Ok(())
    }

    fn remove_entries(&self, keys: &[&str]) -> Result<(), StoreError> {
        for key in keys {
            self.remove(key)?;
        }
        Ok(())
    }
}
