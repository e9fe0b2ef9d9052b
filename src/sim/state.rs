//! Level state and core simulation types
//!
//! Everything one attempt at a level needs lives here: the ball, the shot
//! and star counters, the phase machine and the outgoing event queue.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::obstacles::ObstacleRegistry;
use super::timer::CheckSlot;
use super::trajectory::{Aim, predict};
use crate::Playfield;
use crate::levels::LevelDefinition;
use crate::tuning::ShotTuning;

/// Phase of the current attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Waiting for a touch-down
    Idle,
    /// Drag in progress, preview live
    Aiming,
    /// Ball in flight after a release
    Flying,
    /// Attempt ended; only a restart leaves this phase
    Resolved(Outcome),
}

/// Terminal result of an attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    LevelComplete { stars: u8, coins: u32 },
    GameOver,
}

/// Overlay the UI collaborator should show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Overlay {
    None,
    Paused,
    LevelComplete,
    GameOver,
}

/// Events for the UI, audio and persistence collaborators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// A shot was launched
    ShotFired { shots_remaining: u32 },
    /// A star was picked up (index in the level's star list)
    StarCollected { index: usize },
    /// The ball started touching a wall, the ground or a screen edge
    Impact,
    /// The ball fell out and was put back on the platform
    BallReset,
    LevelComplete { stars: u8, coins: u32 },
    GameOver,
}

/// Ball body state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BallState {
    /// No dynamic body: on the platform or settled where it stopped
    Resting,
    /// Simulated
    Free,
}

/// The ball
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ball {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    /// Orientation (radians), cosmetic
    pub rotation: f32,
    pub angular_vel: f32,
    pub radius: f32,
    pub mass: f32,
    pub restitution: f32,
    pub friction: f32,
    pub linear_damping: f32,
    pub angular_damping: f32,
    pub state: BallState,
    /// Obstacle ids touched during the last tick
    #[serde(default)]
    pub contacts: Vec<u32>,
    /// Seconds spent supported below the settle speed
    #[serde(default)]
    pub still_time: f32,
}

impl Ball {
    pub fn new(id: u32, pos: Vec2, tuning: &ShotTuning) -> Self {
        Self {
            id,
            pos,
            vel: Vec2::ZERO,
            rotation: 0.0,
            angular_vel: 0.0,
            radius: tuning.ball_radius,
            mass: tuning.ball_mass,
            restitution: tuning.restitution,
            friction: tuning.friction,
            linear_damping: tuning.linear_damping,
            angular_damping: tuning.angular_damping,
            state: BallState::Resting,
            contacts: Vec::new(),
            still_time: 0.0,
        }
    }

    #[inline]
    pub fn diameter(&self) -> f32 {
        self.radius * 2.0
    }

    pub fn is_free(&self) -> bool {
        self.state == BallState::Free
    }

    /// Give the ball a fresh dynamic body and apply an impulse
    pub fn launch(&mut self, impulse: Vec2) {
        let mass = if self.mass > 0.0 { self.mass } else { 1.0 };
        self.vel = impulse / mass;
        self.angular_vel = 0.0;
        self.still_time = 0.0;
        self.contacts.clear();
        self.state = BallState::Free;
    }

    /// Drop the dynamic body where the ball lies
    pub fn settle(&mut self) {
        self.vel = Vec2::ZERO;
        self.angular_vel = 0.0;
        self.still_time = 0.0;
        self.state = BallState::Resting;
    }
}

/// Shot budget and aiming gesture
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShotState {
    pub shots_remaining: u32,
    pub is_aiming: bool,
    pub drag_start: Vec2,
    pub drag_current: Vec2,
}

impl ShotState {
    pub fn new(budget: u32) -> Self {
        Self {
            shots_remaining: budget,
            is_aiming: false,
            drag_start: Vec2::ZERO,
            drag_current: Vec2::ZERO,
        }
    }

    /// Slingshot drag vector (start minus current)
    pub fn drag_vector(&self) -> Vec2 {
        self.drag_start - self.drag_current
    }

    /// Spend one shot; false when none are left
    pub fn consume(&mut self) -> bool {
        match self.shots_remaining.checked_sub(1) {
            Some(left) => {
                self.shots_remaining = left;
                true
            }
            None => false,
        }
    }
}

/// Stars still on the field and how many were taken
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StarCollection {
    total: u8,
    remaining: Vec<usize>,
}

impl StarCollection {
    pub fn new(total: usize) -> Self {
        let total = total.min(u8::MAX as usize);
        Self {
            total: total as u8,
            remaining: (0..total).collect(),
        }
    }

    pub fn total(&self) -> u8 {
        self.total
    }

    pub fn collected(&self) -> u8 {
        self.total - self.remaining.len() as u8
    }

    pub fn remaining(&self) -> &[usize] {
        &self.remaining
    }

    pub fn is_present(&self, index: usize) -> bool {
        self.remaining.contains(&index)
    }

    /// Take a star; false if it was already taken
    pub fn collect(&mut self, index: usize) -> bool {
        match self.remaining.iter().position(|&i| i == index) {
            Some(pos) => {
                self.remaining.remove(pos);
                true
            }
            None => false,
        }
    }
}

/// Complete state of one level attempt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelState {
    pub definition: LevelDefinition,
    pub playfield: Playfield,
    pub tuning: ShotTuning,
    pub registry: ObstacleRegistry,
    pub ball: Ball,
    pub shots: ShotState,
    pub stars: StarCollection,
    pub phase: Phase,
    pub paused: bool,
    /// Incremented on every restart
    pub attempt: u32,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Simulated seconds, advanced by each tick's timestep
    pub time: f32,
    /// Pending last-shot check
    pub last_shot_check: CheckSlot,
    /// Preview dots while aiming
    #[serde(skip)]
    pub preview: Vec<Vec2>,
    #[serde(skip)]
    events: Vec<GameEvent>,
    next_ball_id: u32,
}

impl LevelState {
    pub fn new(definition: LevelDefinition, playfield: Playfield, tuning: ShotTuning) -> Self {
        let registry = ObstacleRegistry::build(&definition, playfield);
        let spawn = definition.ball_spawn(tuning.ball_radius);
        let stars = StarCollection::new(registry.star_count());
        let shots = ShotState::new(definition.shot_budget);
        log::info!(
            "Level {} ready: {} shots, {} stars",
            definition.id,
            definition.shot_budget,
            stars.total()
        );

        Self {
            ball: Ball::new(1, spawn, &tuning),
            definition,
            playfield,
            tuning,
            registry,
            shots,
            stars,
            phase: Phase::Idle,
            paused: false,
            attempt: 1,
            time_ticks: 0,
            time: 0.0,
            last_shot_check: CheckSlot::default(),
            preview: Vec::new(),
            events: Vec::new(),
            next_ball_id: 2,
        }
    }

    pub fn level_id(&self) -> u32 {
        self.definition.id
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self.phase, Phase::Resolved(_))
    }

    pub fn outcome(&self) -> Option<Outcome> {
        match self.phase {
            Phase::Resolved(outcome) => Some(outcome),
            _ => None,
        }
    }

    pub fn is_ball_moving(&self) -> bool {
        self.ball.is_free()
    }

    /// Typed overlay for the UI
    pub fn overlay(&self) -> Overlay {
        match self.phase {
            Phase::Resolved(Outcome::LevelComplete { .. }) => Overlay::LevelComplete,
            Phase::Resolved(Outcome::GameOver) => Overlay::GameOver,
            _ if self.paused => Overlay::Paused,
            _ => Overlay::None,
        }
    }

    pub(crate) fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Drain queued events
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Enter the terminal phase; false if an outcome is already active
    pub fn resolve(&mut self, outcome: Outcome) -> bool {
        if let Phase::Resolved(active) = self.phase {
            log::debug!("Ignoring {:?}, attempt already ended with {:?}", outcome, active);
            return false;
        }

        log::info!("Level {} attempt {} ended: {:?}", self.level_id(), self.attempt, outcome);
        self.phase = Phase::Resolved(outcome);
        self.shots.is_aiming = false;
        self.preview.clear();
        self.last_shot_check.cancel();
        self.push_event(match outcome {
            Outcome::LevelComplete { stars, coins } => GameEvent::LevelComplete { stars, coins },
            Outcome::GameOver => GameEvent::GameOver,
        });
        true
    }

    /// Replace the ball with a fresh one on the platform
    pub fn reset_ball(&mut self) {
        let spawn = self.definition.ball_spawn(self.tuning.ball_radius);
        self.ball = Ball::new(self.next_ball_id, spawn, &self.tuning);
        self.next_ball_id += 1;
        if self.phase == Phase::Flying {
            self.phase = Phase::Idle;
        }
    }

    /// Start a new attempt at the same level
    pub fn restart(&mut self) {
        self.attempt += 1;
        self.registry = ObstacleRegistry::build(&self.definition, self.playfield);
        self.stars = StarCollection::new(self.registry.star_count());
        self.shots = ShotState::new(self.definition.shot_budget);
        self.phase = Phase::Idle;
        self.paused = false;
        self.last_shot_check.cancel();
        self.preview.clear();
        self.reset_ball();
        log::info!("Level {} restarted (attempt {})", self.level_id(), self.attempt);
    }

    /// Toggle the pause overlay; ignored once the attempt ended
    pub fn toggle_pause(&mut self) {
        if self.is_resolved() {
            return;
        }
        self.paused = !self.paused;
        if self.paused {
            self.shots.is_aiming = false;
            self.preview.clear();
            if self.phase == Phase::Aiming {
                self.phase = self.resting_phase();
            }
        }
    }

    fn resting_phase(&self) -> Phase {
        if self.ball.is_free() {
            Phase::Flying
        } else {
            Phase::Idle
        }
    }

    /// Touch-down: start aiming
    ///
    /// Allowed while the ball is still moving as long as shots remain; the
    /// next shot launches from wherever the ball is.
    pub fn drag_begin(&mut self, point: Vec2) -> bool {
        if self.paused || self.is_resolved() {
            return false;
        }
        if self.shots.shots_remaining == 0 {
            log::debug!("Touch ignored, no shots left");
            return false;
        }
        if !self.playfield.contains(point) {
            return false;
        }

        self.shots.is_aiming = true;
        self.shots.drag_start = point;
        self.shots.drag_current = point;
        self.preview.clear();
        self.phase = Phase::Aiming;
        true
    }

    /// Drag: refresh the preview
    pub fn drag_move(&mut self, point: Vec2) {
        if !self.shots.is_aiming {
            return;
        }
        self.shots.drag_current = point;
        self.preview = predict(self.shots.drag_vector(), self.ball.pos, &self.tuning).collect();
    }

    /// Release: launch; returns whether a shot was fired
    pub fn drag_end(&mut self, point: Vec2) -> bool {
        if !self.shots.is_aiming {
            return false;
        }
        self.shots.drag_current = point;
        self.shots.is_aiming = false;
        self.preview.clear();

        let aim = Aim::from_drag(self.shots.drag_vector(), &self.tuning);
        let fired = super::tick::launch(self, aim);
        if !fired {
            self.phase = self.resting_phase();
        }
        fired
    }
}
