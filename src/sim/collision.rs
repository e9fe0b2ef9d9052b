//! Contact tests and response for axis-aligned geometry
//!
//! The ball is a circle; obstacles are axis-aligned rectangles or circles.
//! Contact normals point from the obstacle toward the ball center.

use glam::Vec2;

/// Result of a contact check
#[derive(Debug, Clone)]
pub struct CollisionResult {
    /// Whether a contact occurred
    pub hit: bool,
    /// Contact point on the obstacle surface (if hit)
    pub point: Vec2,
    /// Surface normal at the contact, pointing toward the ball center
    pub normal: Vec2,
    /// Penetration depth (for position correction)
    pub penetration: f32,
}

impl CollisionResult {
    pub fn miss() -> Self {
        Self {
            hit: false,
            point: Vec2::ZERO,
            normal: Vec2::ZERO,
            penetration: 0.0,
        }
    }
}

/// Check a ball against an axis-aligned rectangle
///
/// When the ball center is inside the rectangle (fast ball, thin wall) the
/// normal points out through the nearest face.
pub fn ball_rect_collision(
    ball_pos: Vec2,
    ball_radius: f32,
    center: Vec2,
    half_extents: Vec2,
) -> CollisionResult {
    let local = ball_pos - center;
    let clamped = local.clamp(-half_extents, half_extents);

    if clamped == local {
        // Center inside: push out through the closest face
        let dist_x = half_extents.x - local.x.abs();
        let dist_y = half_extents.y - local.y.abs();
        let (normal, depth) = if dist_x < dist_y {
            (Vec2::new(local.x.signum(), 0.0), dist_x)
        } else {
            (Vec2::new(0.0, local.y.signum()), dist_y)
        };
        let point = center + local + normal * depth;
        return CollisionResult {
            hit: true,
            point,
            normal,
            penetration: depth + ball_radius,
        };
    }

    let offset = local - clamped;
    let dist_sq = offset.length_squared();
    if dist_sq >= ball_radius * ball_radius {
        return CollisionResult::miss();
    }

    let dist = dist_sq.sqrt();
    CollisionResult {
        hit: true,
        point: center + clamped,
        normal: offset / dist,
        penetration: ball_radius - dist,
    }
}

/// Check a ball against a circle
pub fn ball_circle_collision(
    ball_pos: Vec2,
    ball_radius: f32,
    center: Vec2,
    radius: f32,
) -> CollisionResult {
    let offset = ball_pos - center;
    let reach = ball_radius + radius;
    let dist_sq = offset.length_squared();
    if dist_sq >= reach * reach {
        return CollisionResult::miss();
    }

    let dist = dist_sq.sqrt();
    let normal = if dist > 1e-4 { offset / dist } else { Vec2::Y };
    CollisionResult {
        hit: true,
        point: center + normal * radius,
        normal,
        penetration: reach - dist,
    }
}

/// Bounce off a surface with restitution and tangential friction
///
/// Only the approaching normal component is reflected. Approach speeds below
/// `rest_speed` are absorbed so resting contact does not jitter.
pub fn bounce_velocity(
    velocity: Vec2,
    normal: Vec2,
    restitution: f32,
    friction: f32,
    rest_speed: f32,
) -> Vec2 {
    let vn = velocity.dot(normal);
    if vn >= 0.0 {
        return velocity;
    }

    let normal_part = normal * vn;
    let tangent_part = (velocity - normal_part) * (1.0 - friction).clamp(0.0, 1.0);
    let bounce = if -vn < rest_speed { 0.0 } else { restitution };
    tangent_part - normal_part * bounce
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ball_rect_collision_side() {
        // Wall 30x100 centered at (100, 100), ball approaching from the left
        let result = ball_rect_collision(
            Vec2::new(75.0, 100.0),
            15.0,
            Vec2::new(100.0, 100.0),
            Vec2::new(15.0, 50.0),
        );
        assert!(result.hit);
        assert!((result.normal - Vec2::new(-1.0, 0.0)).length() < 1e-5);
        assert!((result.penetration - 5.0).abs() < 1e-4);
    }

    #[test]
    fn test_ball_rect_collision_miss() {
        let result = ball_rect_collision(
            Vec2::new(60.0, 100.0),
            15.0,
            Vec2::new(100.0, 100.0),
            Vec2::new(15.0, 50.0),
        );
        assert!(!result.hit);
    }

    #[test]
    fn test_ball_rect_collision_corner() {
        let result = ball_rect_collision(
            Vec2::new(120.0, 160.0),
            15.0,
            Vec2::new(100.0, 100.0),
            Vec2::new(15.0, 50.0),
        );
        assert!(result.hit);
        assert!(result.normal.x > 0.0 && result.normal.y > 0.0);
    }

    #[test]
    fn test_ball_center_inside_rect() {
        // Ground: ball center slightly below the top face
        let result = ball_rect_collision(
            Vec2::new(200.0, 95.0),
            15.0,
            Vec2::new(200.0, 50.0),
            Vec2::new(200.0, 50.0),
        );
        assert!(result.hit);
        assert!((result.normal - Vec2::Y).length() < 1e-5);
        assert!((result.penetration - 20.0).abs() < 1e-4);
    }

    #[test]
    fn test_ball_circle_collision() {
        assert!(ball_circle_collision(Vec2::new(20.0, 0.0), 15.0, Vec2::ZERO, 12.5).hit);
        assert!(!ball_circle_collision(Vec2::new(30.0, 0.0), 15.0, Vec2::ZERO, 12.5).hit);
    }

    #[test]
    fn test_bounce_off_wall_full_restitution() {
        // Ball moving right, hits vertical wall (normal pointing left)
        let v = bounce_velocity(Vec2::new(100.0, 0.0), Vec2::new(-1.0, 0.0), 1.0, 0.0, 40.0);
        assert!((v.x - (-100.0)).abs() < 0.001);
        assert!(v.y.abs() < 0.001);
    }

    #[test]
    fn test_bounce_with_restitution() {
        let v = bounce_velocity(Vec2::new(50.0, -200.0), Vec2::Y, 0.9, 0.0, 40.0);
        assert!((v.y - 180.0).abs() < 1e-3);
        assert!((v.x - 50.0).abs() < 1e-3);
    }

    #[test]
    fn test_slow_impact_is_absorbed() {
        let v = bounce_velocity(Vec2::new(50.0, -10.0), Vec2::Y, 0.9, 0.0, 40.0);
        assert_eq!(v.y, 0.0);
    }

    #[test]
    fn test_separating_velocity_untouched() {
        let v = Vec2::new(10.0, 30.0);
        assert_eq!(bounce_velocity(v, Vec2::Y, 0.9, 0.5, 40.0), v);
    }
}
