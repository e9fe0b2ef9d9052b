//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Stable iteration order (registry build order)
//! - No rendering, audio or storage dependencies

pub mod collision;
pub mod obstacles;
pub mod state;
pub mod tick;
pub mod timer;
pub mod trajectory;

pub use collision::{CollisionResult, bounce_velocity};
pub use obstacles::{Category, Obstacle, ObstacleRegistry, Shape};
pub use state::{
    Ball, BallState, GameEvent, LevelState, Outcome, Overlay, Phase, ShotState, StarCollection,
};
pub use tick::{DragEvent, TickInput, launch, launch_at, tick};
pub use timer::{CheckPoll, CheckSlot};
pub use trajectory::{Aim, Trajectory, predict};
