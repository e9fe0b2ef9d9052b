//! Pinbound - slingshot ball physics core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (obstacles, trajectory preview, shots, level state)
//! - `levels`: Data-driven level catalog
//! - `tuning`: Data-driven shot and ball tuning
//! - `persistence`: Key/value store port and typed progress records
//! - `session`: Wires a level attempt to persistence and collaborators
//! - `cues`: Sound cues for the audio collaborator

pub mod cues;
pub mod levels;
pub mod persistence;
pub mod session;
pub mod sim;
pub mod tuning;

pub use cues::{CueMixer, SoundCue};
pub use levels::{LevelCatalog, LevelDefinition, WallSpec};
pub use persistence::{KeyValueStore, MemoryStore, ProgressStore, StoreError};
pub use session::GameSession;
pub use tuning::ShotTuning;

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (120 Hz)
    pub const SIM_DT: f32 = 1.0 / 120.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Gravity is authored in m/s², positions are in points
    pub const POINTS_PER_METER: f32 = 150.0;
    /// Standard gravity (m/s², y up)
    pub const STANDARD_GRAVITY: f32 = -9.8;

    /// Default playfield (portrait phone, points)
    pub const PLAYFIELD_WIDTH: f32 = 393.0;
    pub const PLAYFIELD_HEIGHT: f32 = 852.0;

    /// Ground strip along the bottom edge
    pub const GROUND_HEIGHT: f32 = 100.0;
    /// Launch platform
    pub const PLATFORM_WIDTH: f32 = 60.0;
    pub const PLATFORM_HEIGHT: f32 = 20.0;
    /// Finish line strip along the right edge
    pub const FINISH_LINE_WIDTH: f32 = 30.0;
    /// Star pickup radius
    pub const STAR_RADIUS: f32 = 12.5;

    /// Fallback wall for malformed layout records
    pub const DEFAULT_WALL_WIDTH: f32 = 30.0;
    pub const DEFAULT_WALL_HEIGHT: f32 = 100.0;

    /// Stars placed in every authored level
    pub const STARS_PER_LEVEL: u8 = 3;
}

/// Visible play area, origin at the bottom-left corner, y up
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Playfield {
    pub width: f32,
    pub height: f32,
}

impl Default for Playfield {
    fn default() -> Self {
        Self {
            width: consts::PLAYFIELD_WIDTH,
            height: consts::PLAYFIELD_HEIGHT,
        }
    }
}

impl Playfield {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn mid_x(&self) -> f32 {
        self.width / 2.0
    }

    /// Top edge of the ground strip
    #[inline]
    pub fn ground_top(&self) -> f32 {
        consts::GROUND_HEIGHT
    }

    /// Height between the ground and the top edge
    #[inline]
    pub fn height_above_ground(&self) -> f32 {
        self.height - self.ground_top()
    }

    /// Whether a point lies inside the visible area
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= 0.0 && point.x <= self.width && point.y >= 0.0 && point.y <= self.height
    }
}

/// Convert an authored gravity (m/s²) to points/s²
#[inline]
pub fn gravity_to_points(gravity: Vec2) -> Vec2 {
    gravity * consts::POINTS_PER_METER
}
