//! Game session
//!
//! Owns the current level attempt and the progress store. Forwards input to
//! the simulation and turns its events into progress updates.

use glam::Vec2;

use crate::Playfield;
use crate::consts::SIM_DT;
use crate::levels::{LevelCatalog, MAX_LEVEL};
use crate::persistence::{KeyValueStore, ProgressStore};
use crate::sim::{GameEvent, LevelState, Outcome, TickInput, tick};
use crate::tuning::ShotTuning;

pub struct GameSession<S> {
    progress: ProgressStore<S>,
    catalog: LevelCatalog,
    tuning: ShotTuning,
    level: LevelState,
}

impl<S: KeyValueStore> GameSession<S> {
    /// Open a session on the saved current level
    pub fn new(store: S, tuning: ShotTuning, playfield: Playfield) -> Self {
        let mut progress = ProgressStore::new(store);
        let catalog = LevelCatalog::new(playfield);
        let start = progress.load_progress();
        let level = build_level(&mut progress, &catalog, &tuning, start);
        log::info!(
            "Session started on level {} ({} coins)",
            start,
            progress.coins()
        );
        Self {
            progress,
            catalog,
            tuning,
            level,
        }
    }

    pub fn level(&self) -> &LevelState {
        &self.level
    }

    pub fn level_id(&self) -> u32 {
        self.level.level_id()
    }

    pub fn progress(&self) -> &ProgressStore<S> {
        &self.progress
    }

    pub fn coins(&self) -> u32 {
        self.progress.coins()
    }

    pub fn is_level_unlocked(&self, level: u32) -> bool {
        self.progress.is_level_unlocked(level)
    }

    /// Start a fresh attempt at a level; locked levels are refused
    pub fn start_level(&mut self, level: u32) -> bool {
        if !self.is_level_unlocked(level) {
            log::warn!("Level {} is locked", level);
            return false;
        }
        self.level = build_level(&mut self.progress, &self.catalog, &self.tuning, level);
        true
    }

    pub fn drag_begin(&mut self, point: Vec2) -> bool {
        self.level.drag_begin(point)
    }

    pub fn drag_move(&mut self, point: Vec2) {
        self.level.drag_move(point);
    }

    /// Release the drag; events from the launch show up on the next `step`
    pub fn drag_end(&mut self, point: Vec2) -> bool {
        self.level.drag_end(point)
    }

    pub fn toggle_pause(&mut self) {
        self.level.toggle_pause();
    }

    pub fn restart(&mut self) {
        self.level.restart();
    }

    /// Run one fixed tick and apply progress side effects
    pub fn step(&mut self, input: &TickInput) -> Vec<GameEvent> {
        tick(&mut self.level, input, SIM_DT);
        let events = self.level.take_events();
        for event in &events {
            self.apply(event);
        }
        events
    }

    fn apply(&mut self, event: &GameEvent) {
        let id = self.level.level_id();
        match *event {
            GameEvent::StarCollected { .. } => {
                self.progress.record_stars(id, self.level.stars.collected());
            }
            GameEvent::LevelComplete { stars, coins } => {
                self.progress.set_current_level(id.min(MAX_LEVEL));
                self.progress.save_layout(
                    id,
                    &self.level.registry.wall_specs(),
                    &self.level.registry.star_positions(),
                );
                self.progress.record_stars(id, stars);
                let total = self.progress.add_coins(coins);
                log::info!(
                    "Level {} complete: {} stars, +{} coins ({} total)",
                    id,
                    stars,
                    coins,
                    total
                );
            }
            GameEvent::GameOver => log::info!("Level {} failed", id),
            GameEvent::ShotFired { .. } | GameEvent::Impact | GameEvent::BallReset => {}
        }
    }

    /// Move on from a completed level
    ///
    /// Unlocks and starts the next level. Returns false on the last level
    /// (back to the menu) or when the level is not complete.
    pub fn proceed_to_next_level(&mut self) -> bool {
        if !matches!(self.level.outcome(), Some(Outcome::LevelComplete { .. })) {
            return false;
        }
        let current = self.level.level_id();
        if current >= MAX_LEVEL {
            log::info!("Last level complete, back to the menu");
            return false;
        }

        let next = current + 1;
        self.progress.set_current_level(next);
        self.progress.unlock_level(next);
        self.level = build_level(&mut self.progress, &self.catalog, &self.tuning, next);
        true
    }
}

/// Level attempt from the saved layout, or from the catalog on first play
fn build_level<S: KeyValueStore>(
    progress: &mut ProgressStore<S>,
    catalog: &LevelCatalog,
    tuning: &ShotTuning,
    level: u32,
) -> LevelState {
    let definition = catalog.definition_for(level);
    let definition = match progress.load_layout(level) {
        Some((walls, stars)) => definition.with_saved_layout(walls, stars),
        None => {
            progress.save_layout(level, &definition.walls, &definition.stars);
            definition
        }
    };
    LevelState::new(definition, catalog.playfield(), tuning.clone())
}
