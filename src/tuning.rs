//! Shot and ball tuning
//!
//! Every hand-tuned number of the shot model in one serializable struct.
//! Missing fields in a tuning file fall back to the defaults below.

use serde::{Deserialize, Serialize};

/// Shot, preview and ball parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShotTuning {
    // === Aiming ===
    /// Drag length (points) at which power saturates
    pub max_power: f32,
    /// Impulse per point of drag power
    pub power_multiplier: f32,
    /// Power fraction above which the vertical boost kicks in
    pub boost_threshold: f32,
    /// Vertical boost at the threshold
    pub boost_base: f32,
    /// Boost growth per unit of power fraction above the threshold
    pub boost_slope: f32,

    // === Preview ===
    /// Preview step scale below the boost threshold
    pub preview_scale: f32,
    /// Preview step scale above the boost threshold (denser dots)
    pub preview_scale_boosted: f32,
    /// Preview dot count below the boost threshold
    pub preview_points: usize,
    /// Preview dot count above the boost threshold
    pub preview_points_boosted: usize,
    /// Gravity used for the preview (m/s², y up)
    pub preview_gravity: f32,

    // === Ball body ===
    pub ball_radius: f32,
    pub ball_mass: f32,
    pub restitution: f32,
    pub friction: f32,
    pub linear_damping: f32,
    pub angular_damping: f32,

    // === Screen edges ===
    /// Fraction of speed kept when bouncing off a screen edge
    pub edge_bounce: f32,

    // === Timing ===
    /// Delay after the final shot before an unresolved attempt fails
    pub last_shot_timeout_secs: f32,
    /// Speed (points/s) below which a supported ball counts as still
    pub settle_speed: f32,
    /// How long a ball must stay still before it settles
    pub settle_secs: f32,
    /// Impacts slower than this (points/s) do not bounce
    pub rest_bounce_speed: f32,
}

impl Default for ShotTuning {
    fn default() -> Self {
        Self {
            max_power: 100.0,
            power_multiplier: 4.0,
            boost_threshold: 0.8,
            boost_base: 1.5,
            boost_slope: 2.5,

            preview_scale: 0.04,
            preview_scale_boosted: 0.02,
            preview_points: 25,
            preview_points_boosted: 18,
            preview_gravity: crate::consts::STANDARD_GRAVITY,

            ball_radius: 15.0,
            ball_mass: 0.7,
            restitution: 0.9,
            friction: 0.001,
            linear_damping: 0.0001,
            angular_damping: 0.0001,

            edge_bounce: 0.5,

            last_shot_timeout_secs: 2.0,
            settle_speed: 6.0,
            settle_secs: 0.5,
            rest_bounce_speed: 40.0,
        }
    }
}

impl ShotTuning {
    /// Parse tuning from JSON
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Parse tuning from JSON, falling back to defaults on malformed input
    pub fn from_json_or_default(json: &str) -> Self {
        match Self::from_json(json) {
            Ok(tuning) => {
                log::info!("Loaded shot tuning");
                tuning
            }
            Err(e) => {
                log::warn!("Malformed shot tuning ({}), using defaults", e);
                Self::default()
            }
        }
    }

    /// Whether a power fraction is in the boosted band
    #[inline]
    pub fn is_boosted(&self, power_percent: f32) -> bool {
        power_percent > self.boost_threshold
    }

    /// Vertical multiplier for a power fraction (1.0 below the threshold)
    pub fn vertical_boost(&self, power_percent: f32) -> f32 {
        if self.is_boosted(power_percent) {
            self.boost_base + (power_percent - self.boost_threshold) * self.boost_slope
        } else {
            1.0
        }
    }

    /// Preview step scale and dot count for a power fraction
    pub fn preview_density(&self, power_percent: f32) -> (f32, usize) {
        if self.is_boosted(power_percent) {
            (self.preview_scale_boosted, self.preview_points_boosted)
        } else {
            (self.preview_scale, self.preview_points)
        }
    }
}
