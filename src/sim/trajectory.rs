//! Aim math and trajectory preview
//!
//! The preview is a free-flight approximation with no collision. It steps in
//! compressed "dot" units (`scale`) so the dots stay close together on
//! screen; it is an aiming hint, not a forecast of the real flight.

use glam::Vec2;

use crate::tuning::ShotTuning;

/// Angle and clamped power derived from a drag
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aim {
    /// Launch direction (radians)
    pub angle: f32,
    /// Drag length clamped to `max_power`
    pub power: f32,
    /// `power / max_power` in [0, 1]
    pub power_percent: f32,
}

impl Aim {
    /// Slingshot aim: `drag` is drag start minus drag end, so pulling back
    /// aims forward
    pub fn from_drag(drag: Vec2, tuning: &ShotTuning) -> Self {
        let power = drag.length().min(tuning.max_power);
        Self {
            angle: drag.y.atan2(drag.x),
            power,
            power_percent: if tuning.max_power > 0.0 {
                power / tuning.max_power
            } else {
                0.0
            },
        }
    }

    /// Aim from already-split angle and power (power is clamped)
    pub fn new(angle: f32, power: f32, tuning: &ShotTuning) -> Self {
        let power = power.clamp(0.0, tuning.max_power);
        Self {
            angle,
            power,
            power_percent: if tuning.max_power > 0.0 {
                power / tuning.max_power
            } else {
                0.0
            },
        }
    }

    pub fn vertical_boost(&self, tuning: &ShotTuning) -> f32 {
        tuning.vertical_boost(self.power_percent)
    }

    /// Launch impulse, shared by the preview (times its scale) and the shot
    pub fn impulse(&self, tuning: &ShotTuning) -> Vec2 {
        let magnitude = self.power * tuning.power_multiplier;
        Vec2::new(
            self.angle.cos() * magnitude,
            self.angle.sin() * magnitude * self.vertical_boost(tuning),
        )
    }
}

/// Preview point sequence; clone it to iterate again
#[derive(Debug, Clone)]
pub struct Trajectory {
    position: Vec2,
    velocity: Vec2,
    gravity_step: f32,
    remaining: usize,
}

impl Iterator for Trajectory {
    type Item = Vec2;

    fn next(&mut self) -> Option<Vec2> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let point = self.position;
        self.position += self.velocity;
        self.velocity.y += self.gravity_step;
        Some(point)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Trajectory {}

/// Predict preview dots for a drag from the ball's current position
pub fn predict(drag: Vec2, start: Vec2, tuning: &ShotTuning) -> Trajectory {
    let aim = Aim::from_drag(drag, tuning);
    let (scale, points) = tuning.preview_density(aim.power_percent);
    Trajectory {
        position: start,
        velocity: aim.impulse(tuning) * scale,
        gravity_step: tuning.preview_gravity * scale,
        remaining: points,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_aim_is_slingshot() {
        let tuning = ShotTuning::default();
        // Dragged down-left from the start point: aim up-right
        let aim = Aim::from_drag(Vec2::new(30.0, 40.0), &tuning);
        assert!((aim.power - 50.0).abs() < 1e-4);
        assert!((aim.power_percent - 0.5).abs() < 1e-6);
        assert!(aim.angle > 0.0 && aim.angle < std::f32::consts::FRAC_PI_2);
    }

    #[test]
    fn test_full_power_boost_is_two() {
        let tuning = ShotTuning::default();
        let aim = Aim::from_drag(Vec2::new(0.0, 100.0), &tuning);
        assert!((aim.power_percent - 1.0).abs() < 1e-6);
        assert!((aim.vertical_boost(&tuning) - 2.0).abs() < 1e-5);
        let impulse = aim.impulse(&tuning);
        assert!((impulse.y - 800.0).abs() < 1e-2);
    }

    #[test]
    fn test_point_counts() {
        let tuning = ShotTuning::default();
        let start = Vec2::new(40.0, 255.0);
        assert_eq!(predict(Vec2::new(50.0, 0.0), start, &tuning).count(), 25);
        assert_eq!(predict(Vec2::new(90.0, 0.0), start, &tuning).count(), 18);
    }

    #[test]
    fn test_first_point_is_start_and_steps() {
        let tuning = ShotTuning::default();
        let start = Vec2::new(40.0, 255.0);
        let points: Vec<Vec2> = predict(Vec2::new(50.0, 0.0), start, &tuning).collect();
        assert_eq!(points[0], start);
        // Horizontal step: 50 * 4 * 0.04 = 8 points per dot
        assert!((points[1].x - 48.0).abs() < 1e-3);
        assert!((points[1].y - 255.0).abs() < 1e-3);
        // Gravity bends the path down after the first step
        assert!(points[2].y < points[1].y);
    }

    #[test]
    fn test_restartable() {
        let tuning = ShotTuning::default();
        let trajectory = predict(Vec2::new(20.0, 60.0), Vec2::ZERO, &tuning);
        let first: Vec<Vec2> = trajectory.clone().collect();
        let second: Vec<Vec2> = trajectory.collect();
        assert_eq!(first, second);
    }

    proptest! {
        #[test]
        fn prop_power_clamped(dx in -1000.0f32..1000.0, dy in -1000.0f32..1000.0) {
            let tuning = ShotTuning::default();
            let aim = Aim::from_drag(Vec2::new(dx, dy), &tuning);
            prop_assert!(aim.power <= tuning.max_power + 1e-4);
            prop_assert!(aim.power_percent <= 1.0 + 1e-6);
            if Vec2::new(dx, dy).length() > tuning.max_power {
                prop_assert!((aim.power - tuning.max_power).abs() < 1e-4);
            }
        }

        #[test]
        fn prop_boost_in_range(dx in -300.0f32..300.0, dy in -300.0f32..300.0) {
            let tuning = ShotTuning::default();
            let aim = Aim::from_drag(Vec2::new(dx, dy), &tuning);
            let boost = aim.vertical_boost(&tuning);
            if aim.power_percent > tuning.boost_threshold {
                prop_assert!((1.5..=2.0 + 1e-5).contains(&boost));
            } else {
                prop_assert_eq!(boost, 1.0);
            }
        }
    }
}
