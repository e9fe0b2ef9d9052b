//! Static level geometry
//!
//! Built once per attempt from a level definition and never mutated. Only
//! the ball moves; collected stars are tracked by the level state, not
//! removed from here.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{CollisionResult, ball_circle_collision, ball_rect_collision};
use crate::Playfield;
use crate::consts::*;
use crate::levels::LevelDefinition;

/// Physics category of a body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Wall,
    LethalWall,
    Ground,
    FinishLine,
    Star,
}

/// Obstacle geometry
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Rect { center: Vec2, half_extents: Vec2 },
    Circle { center: Vec2, radius: f32 },
}

impl Shape {
    pub fn rect(center: Vec2, size: Vec2) -> Self {
        Shape::Rect {
            center,
            half_extents: size / 2.0,
        }
    }

    pub fn center(&self) -> Vec2 {
        match *self {
            Shape::Rect { center, .. } | Shape::Circle { center, .. } => center,
        }
    }

    pub fn contains_point(&self, point: Vec2) -> bool {
        match *self {
            Shape::Rect {
                center,
                half_extents,
            } => {
                let d = (point - center).abs();
                d.x <= half_extents.x && d.y <= half_extents.y
            }
            Shape::Circle { center, radius } => point.distance_squared(center) <= radius * radius,
        }
    }

    /// Contact test against the ball
    pub fn collide(&self, ball_pos: Vec2, ball_radius: f32) -> CollisionResult {
        match *self {
            Shape::Rect {
                center,
                half_extents,
            } => ball_rect_collision(ball_pos, ball_radius, center, half_extents),
            Shape::Circle { center, radius } => {
                ball_circle_collision(ball_pos, ball_radius, center, radius)
            }
        }
    }
}

/// A static obstacle
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: u32,
    pub shape: Shape,
    pub category: Category,
    /// Ordinal within the category (a star's index in the level)
    pub index: usize,
}

impl Obstacle {
    /// Wall record for persistence, None for non-wall obstacles
    pub fn as_wall_spec(&self) -> Option<crate::levels::WallSpec> {
        let lethal = match self.category {
            Category::Wall => false,
            Category::LethalWall => true,
            _ => return None,
        };
        match self.shape {
            Shape::Rect {
                center,
                half_extents,
            } => Some(crate::levels::WallSpec::new(center, half_extents * 2.0, lethal)),
            Shape::Circle { .. } => None,
        }
    }
}

/// Every static obstacle of a level, in build order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ObstacleRegistry {
    obstacles: Vec<Obstacle>,
}

impl ObstacleRegistry {
    /// Build the obstacle set: ground, stars, walls, finish line
    ///
    /// Contacts resolve in this order, so a star touched in the same tick
    /// as a terminal sensor still counts.
    pub fn build(def: &LevelDefinition, field: Playfield) -> Self {
        let mut registry = Self::default();

        registry.push(
            Shape::rect(
                Vec2::new(field.mid_x(), GROUND_HEIGHT / 2.0),
                Vec2::new(field.width, GROUND_HEIGHT),
            ),
            Category::Ground,
            0,
        );

        for (index, &center) in def.stars.iter().enumerate() {
            registry.push(
                Shape::Circle {
                    center,
                    radius: STAR_RADIUS,
                },
                Category::Star,
                index,
            );
        }

        let mut safe = 0;
        let mut deadly = 0;
        for spec in &def.walls {
            let (center, size) = spec.resolve();
            let (category, index) = if spec.lethal {
                deadly += 1;
                (Category::LethalWall, deadly - 1)
            } else {
                safe += 1;
                (Category::Wall, safe - 1)
            };
            registry.push(Shape::rect(center, size), category, index);
        }

        let finish_height = field.height_above_ground();
        registry.push(
            Shape::rect(
                Vec2::new(
                    field.width - FINISH_LINE_WIDTH / 2.0,
                    field.ground_top() + finish_height / 2.0,
                ),
                Vec2::new(FINISH_LINE_WIDTH, finish_height),
            ),
            Category::FinishLine,
            0,
        );

        log::debug!(
            "Level {} obstacles: {} walls, {} lethal, {} stars",
            def.id,
            safe,
            deadly,
            def.stars.len()
        );
        registry
    }

    fn push(&mut self, shape: Shape, category: Category, index: usize) {
        let id = self.obstacles.len() as u32 + 1;
        self.obstacles.push(Obstacle {
            id,
            shape,
            category,
            index,
        });
    }

    pub fn iter(&self) -> impl Iterator<Item = &Obstacle> {
        self.obstacles.iter()
    }

    pub fn len(&self) -> usize {
        self.obstacles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty()
    }

    pub fn get(&self, id: u32) -> Option<&Obstacle> {
        self.obstacles.iter().find(|o| o.id == id)
    }

    /// Category of an obstacle by id
    pub fn classify(&self, id: u32) -> Option<Category> {
        self.get(id).map(|o| o.category)
    }

    /// Category of the first obstacle containing a point
    pub fn classify_point(&self, point: Vec2) -> Option<Category> {
        self.obstacles
            .iter()
            .find(|o| o.shape.contains_point(point))
            .map(|o| o.category)
    }

    /// Star obstacle by star index
    pub fn star(&self, index: usize) -> Option<&Obstacle> {
        self.obstacles
            .iter()
            .find(|o| o.category == Category::Star && o.index == index)
    }

    pub fn star_count(&self) -> usize {
        self.obstacles
            .iter()
            .filter(|o| o.category == Category::Star)
            .count()
    }

    /// Wall records in build order, for layout persistence
    pub fn wall_specs(&self) -> Vec<crate::levels::WallSpec> {
        self.obstacles.iter().filter_map(Obstacle::as_wall_spec).collect()
    }

    /// Star centers in index order, for layout persistence
    pub fn star_positions(&self) -> Vec<Vec2> {
        self.obstacles
            .iter()
            .filter(|o| o.category == Category::Star)
            .map(|o| o.shape.center())
            .collect()
    }
}
