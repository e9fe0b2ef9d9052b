//! Progress persistence
//!
//! Gameplay never touches storage directly. A `KeyValueStore` port is
//! injected into the session; `ProgressStore` turns it into typed progress
//! records encoded as JSON strings.

#[cfg(target_arch = "wasm32")]
mod local_storage;
mod progress;

use std::collections::BTreeMap;
use std::fmt;

#[cfg(target_arch = "wasm32")]
pub use local_storage::LocalStorage;
pub use progress::ProgressStore;

/// Storage failures reported by a store backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Backend missing or refused access
    Unavailable,
    /// Backend is full
    QuotaExceeded,
    /// A value could not be encoded
    Encode,
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Unavailable => write!(f, "storage unavailable"),
            StoreError::QuotaExceeded => write!(f, "storage quota exceeded"),
            StoreError::Encode => write!(f, "value could not be encoded"),
        }
    }
}

impl std::error::Error for StoreError {}

// Port for string key/value storage used by progress persistence.
pub trait KeyValueStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove_item(&mut self, key: &str) -> Result<(), StoreError>;
}

/// In-memory store for native runs and tests
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    items: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<(), StoreError> {
        self.items.remove(key);
        Ok(())
    }
}

/// Storage keys
pub mod keys {
    pub const CURRENT_LEVEL: &str = "pinbound_current_level";
    pub const MAX_UNLOCKED_LEVEL: &str = "pinbound_max_unlocked_level";
    pub const TOTAL_COINS: &str = "pinbound_total_coins";

    pub fn walls(level: u32) -> String {
        format!("pinbound_walls_level_{}", level)
    }

    pub fn star_positions(level: u32) -> String {
        format!("pinbound_star_positions_level_{}", level)
    }

    pub fn best_stars(level: u32) -> String {
        format!("pinbound_stars_level_{}", level)
    }
}
