//! Typed progress records over a key/value store
//!
//! Failures are logged and swallowed: a broken store costs the player their
//! progress, never the current attempt.

use glam::Vec2;
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::{KeyValueStore, StoreError, keys};
use crate::levels::WallSpec;

/// Player progress backed by a key/value store
#[derive(Debug, Clone, Default)]
pub struct ProgressStore<S> {
    store: S,
}

impl<S: KeyValueStore> ProgressStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_inner(self) -> S {
        self.store
    }

    /// First-run setup; returns the level to start on
    ///
    /// Unlocks level 1 if nothing is unlocked and stores level 1 as the
    /// current level if none is stored.
    pub fn load_progress(&mut self) -> u32 {
        if self.read::<u32>(keys::MAX_UNLOCKED_LEVEL).unwrap_or(0) == 0 {
            log::info!("First run, unlocking level 1");
            self.write(keys::MAX_UNLOCKED_LEVEL, &1u32);
        }
        match self.read::<u32>(keys::CURRENT_LEVEL) {
            Some(level) if level > 0 => level,
            _ => {
                self.write(keys::CURRENT_LEVEL, &1u32);
                1
            }
        }
    }

    /// Saved walls and star positions, None when no walls were saved
    pub fn load_layout(&self, level: u32) -> Option<(Vec<WallSpec>, Vec<Vec2>)> {
        let walls: Vec<WallSpec> = self.read(&keys::walls(level))?;
        if walls.is_empty() {
            return None;
        }
        let stars: Vec<Vec2> = self.read(&keys::star_positions(level)).unwrap_or_default();
        log::debug!(
            "Loaded saved layout for level {}: {} walls, {} stars",
            level,
            walls.len(),
            stars.len()
        );
        Some((walls, stars))
    }

    pub fn save_layout(&mut self, level: u32, walls: &[WallSpec], stars: &[Vec2]) {
        self.write(&keys::walls(level), &walls);
        self.write(&keys::star_positions(level), &stars);
    }

    /// Best star count recorded for a level
    pub fn best_stars(&self, level: u32) -> u8 {
        self.read(&keys::best_stars(level)).unwrap_or(0)
    }

    /// Record a star count if it beats the stored best; returns whether it did
    pub fn record_stars(&mut self, level: u32, stars: u8) -> bool {
        if stars <= self.best_stars(level) {
            return false;
        }
        self.write(&keys::best_stars(level), &stars);
        log::info!("New best for level {}: {} stars", level, stars);
        true
    }

    pub fn current_level(&self) -> u32 {
        match self.read::<u32>(keys::CURRENT_LEVEL) {
            Some(level) if level > 0 => level,
            _ => 1,
        }
    }

    pub fn set_current_level(&mut self, level: u32) {
        self.write(keys::CURRENT_LEVEL, &level);
    }

    pub fn max_unlocked_level(&self) -> u32 {
        self.read(keys::MAX_UNLOCKED_LEVEL).unwrap_or(0)
    }

    /// Raise the unlocked level; never lowers it
    pub fn unlock_level(&mut self, level: u32) {
        if level > self.max_unlocked_level() {
            self.write(keys::MAX_UNLOCKED_LEVEL, &level);
            log::info!("Unlocked level {}", level);
        }
    }

    pub fn is_level_unlocked(&self, level: u32) -> bool {
        level <= self.max_unlocked_level()
    }

    pub fn coins(&self) -> u32 {
        self.read(keys::TOTAL_COINS).unwrap_or(0)
    }

    /// Add to the coin balance; returns the new total
    pub fn add_coins(&mut self, amount: u32) -> u32 {
        let total = self.coins().saturating_add(amount);
        self.write(keys::TOTAL_COINS, &total);
        total
    }

    fn read<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let json = match self.store.get_item(key) {
            Ok(Some(json)) => json,
            Ok(None) => return None,
            Err(err) => {
                log::warn!("Failed to read {}: {}", key, err);
                return None;
            }
        };
        match serde_json::from_str(&json) {
            Ok(value) => Some(value),
            Err(err) => {
                log::warn!("Ignoring corrupt value for {}: {}", key, err);
                None
            }
        }
    }

    fn write<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) {
        let result = serde_json::to_string(value)
            .map_err(|_| StoreError::Encode)
            .and_then(|json| self.store.set_item(key, &json));
        if let Err(err) = result {
            log::warn!("Failed to save {}: {}", key, err);
        }
    }
}
