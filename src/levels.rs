//! Level catalog
//!
//! One table entry per authored level. Positions are anchored to the
//! playfield so the same layout adapts to any screen size; a definition is
//! resolved to concrete points for one playfield.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::Playfield;
use crate::consts::*;

/// Last level in the progression
pub const MAX_LEVEL: u32 = 4;

/// A wall record as authored or persisted
///
/// Fields are optional so partially written records still load; missing
/// geometry is replaced by the default wall.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WallSpec {
    /// Center position
    pub position: Option<Vec2>,
    /// Full width and height
    pub size: Option<Vec2>,
    /// Touching this wall ends the attempt
    #[serde(alias = "isDead")]
    pub lethal: bool,
}

impl WallSpec {
    pub fn new(position: Vec2, size: Vec2, lethal: bool) -> Self {
        Self {
            position: Some(position),
            size: Some(size),
            lethal,
        }
    }

    /// Center and size, substituting the default wall for missing fields
    pub fn resolve(&self) -> (Vec2, Vec2) {
        let position = self.position.unwrap_or_else(|| {
            log::warn!("Wall record without position, placing it at the origin");
            Vec2::ZERO
        });
        let size = match self.size {
            Some(size) if size.x > 0.0 && size.y > 0.0 => size,
            other => {
                log::warn!(
                    "Wall record with invalid size {:?}, using {}x{}",
                    other,
                    DEFAULT_WALL_WIDTH,
                    DEFAULT_WALL_HEIGHT
                );
                Vec2::new(DEFAULT_WALL_WIDTH, DEFAULT_WALL_HEIGHT)
            }
        };
        (position, size)
    }
}

/// Immutable description of one level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelDefinition {
    pub id: u32,
    /// Gravity in m/s² (y up)
    pub gravity: Vec2,
    /// Launch platform center
    pub platform: Vec2,
    /// Walls in authoring order
    pub walls: Vec<WallSpec>,
    /// Star positions in authoring order (index = star index)
    pub stars: Vec<Vec2>,
    /// Launches allowed per attempt
    pub shot_budget: u32,
    /// Currency awarded on completion
    pub coin_reward: u32,
}

impl LevelDefinition {
    /// Replace walls and stars with a previously persisted layout
    ///
    /// An empty wall list means nothing was saved and the authored layout
    /// stays. Saved stars replace authored stars even when empty.
    pub fn with_saved_layout(mut self, walls: Vec<WallSpec>, stars: Vec<Vec2>) -> Self {
        if walls.is_empty() {
            return self;
        }
        self.walls = walls;
        self.stars = stars;
        self
    }

    /// Ball spawn point resting on top of the platform
    pub fn ball_spawn(&self, ball_radius: f32) -> Vec2 {
        self.platform + Vec2::new(0.0, PLATFORM_HEIGHT / 2.0 + ball_radius)
    }
}

/// Vertical placement relative to the playfield
#[derive(Debug, Clone, Copy)]
enum Anchor {
    /// Offset above the ground top
    AboveGround(f32),
    /// Offset below the top edge
    BelowTop(f32),
    /// Fraction of the height above the ground, measured from the bottom edge
    Fraction(f32),
}

impl Anchor {
    fn resolve(self, field: &Playfield) -> f32 {
        match self {
            Anchor::AboveGround(dy) => field.ground_top() + dy,
            Anchor::BelowTop(dy) => field.height - dy,
            Anchor::Fraction(f) => field.height_above_ground() * f,
        }
    }
}

struct WallEntry {
    /// Fraction of the playfield width
    x: f32,
    y: Anchor,
    w: f32,
    h: f32,
    lethal: bool,
}

struct LevelEntry {
    id: u32,
    /// Platform x (points) and height of its center above the ground
    platform: (f32, f32),
    walls: &'static [WallEntry],
    stars: &'static [(f32, Anchor)],
}

const fn wall(x: f32, y: Anchor, w: f32, h: f32) -> WallEntry {
    WallEntry { x, y, w, h, lethal: false }
}

const fn lethal(x: f32, y: Anchor, w: f32, h: f32) -> WallEntry {
    WallEntry { x, y, w, h, lethal: true }
}

const PLATFORM_LIFT: f32 = PLATFORM_HEIGHT / 2.0;

/// Platform used by levels without an authored layout
const OPEN_FIELD_PLATFORM: (f32, f32) = (40.0, PLATFORM_LIFT + 120.0);

static LEVELS: &[LevelEntry] = &[
    LevelEntry {
        id: 1,
        platform: (40.0, PLATFORM_LIFT + 120.0),
        walls: &[
            wall(0.2, Anchor::BelowTop(120.0), 30.0, 240.0),
            wall(0.5, Anchor::BelowTop(80.0), 30.0, 160.0),
            wall(0.8, Anchor::BelowTop(120.0), 30.0, 240.0),
            wall(0.25, Anchor::AboveGround(80.0), 30.0, 160.0),
            wall(0.75, Anchor::AboveGround(80.0), 30.0, 160.0),
            lethal(0.5, Anchor::AboveGround(120.0), 30.0, 240.0),
        ],
        stars: &[
            (0.5, Anchor::BelowTop(250.0)),
            (0.25, Anchor::Fraction(0.5)),
            (0.75, Anchor::Fraction(0.5)),
        ],
    },
    LevelEntry {
        id: 2,
        platform: (60.0, PLATFORM_LIFT + 100.0),
        walls: &[
            wall(0.5, Anchor::AboveGround(220.0), 40.0, 440.0),
            wall(0.7, Anchor::BelowTop(100.0), 40.0, 200.0),
            wall(0.85, Anchor::BelowTop(150.0), 40.0, 300.0),
            lethal(0.3, Anchor::AboveGround(150.0), 40.0, 300.0),
            wall(0.7, Anchor::AboveGround(80.0), 40.0, 160.0),
            lethal(0.85, Anchor::AboveGround(80.0), 40.0, 160.0),
        ],
        stars: &[
            (0.3, Anchor::Fraction(0.7)),
            (0.5, Anchor::BelowTop(100.0)),
            (0.77, Anchor::Fraction(0.5)),
        ],
    },
    LevelEntry {
        id: 3,
        platform: (60.0, PLATFORM_LIFT + 100.0),
        walls: &[
            wall(0.5, Anchor::AboveGround(220.0), 40.0, 440.0),
            wall(0.7, Anchor::BelowTop(100.0), 40.0, 200.0),
            wall(0.85, Anchor::BelowTop(150.0), 40.0, 300.0),
            wall(0.7, Anchor::AboveGround(80.0), 40.0, 160.0),
            lethal(0.85, Anchor::AboveGround(80.0), 40.0, 160.0),
            wall(0.15, Anchor::BelowTop(120.0), 40.0, 240.0),
        ],
        stars: &[
            (0.3, Anchor::Fraction(0.6)),
            (0.5, Anchor::BelowTop(100.0)),
            (0.77, Anchor::Fraction(0.5)),
        ],
    },
    LevelEntry {
        id: 4,
        platform: (50.0, PLATFORM_LIFT + 90.0),
        walls: &[
            wall(0.5, Anchor::AboveGround(220.0), 40.0, 440.0),
            wall(0.8, Anchor::AboveGround(220.0), 40.0, 440.0),
            lethal(0.65, Anchor::AboveGround(120.0), 40.0, 240.0),
        ],
        stars: &[
            (0.2, Anchor::AboveGround(300.0)),
            (0.65, Anchor::BelowTop(150.0)),
            (0.75, Anchor::BelowTop(80.0)),
        ],
    },
];

/// Gravity for a level (m/s²)
pub fn gravity_for(level: u32) -> Vec2 {
    let g = match level {
        2 => -8.5,
        3 => -10.5,
        _ => STANDARD_GRAVITY,
    };
    Vec2::new(0.0, g)
}

/// Launches allowed per attempt
pub fn shot_budget_for(level: u32) -> u32 {
    if level == 1 { 3 } else { level + 2 }
}

/// Currency awarded for completing a level
pub fn coin_reward_for(level: u32) -> u32 {
    match level {
        2 | 3 => 100,
        4 => 150,
        _ => 50,
    }
}

/// Lookup of level definitions for one playfield
#[derive(Debug, Clone)]
pub struct LevelCatalog {
    playfield: Playfield,
}

impl LevelCatalog {
    pub fn new(playfield: Playfield) -> Self {
        Self { playfield }
    }

    pub fn playfield(&self) -> Playfield {
        self.playfield
    }

    /// Whether the level has an authored layout
    pub fn is_authored(&self, level: u32) -> bool {
        LEVELS.iter().any(|entry| entry.id == level)
    }

    /// Resolve the definition of a level
    ///
    /// Levels without an authored layout get an open field (ground and
    /// finish line only) launched from the level 1 platform.
    pub fn definition_for(&self, level: u32) -> LevelDefinition {
        let field = &self.playfield;
        let authored = LEVELS.iter().find(|entry| entry.id == level);
        if authored.is_none() {
            log::debug!("Level {} has no authored layout, using an open field", level);
        }

        let (platform_x, platform_lift) = authored.map_or(OPEN_FIELD_PLATFORM, |e| e.platform);
        let walls = authored
            .map(|entry| {
                entry
                    .walls
                    .iter()
                    .map(|w| {
                        WallSpec::new(
                            Vec2::new(field.width * w.x, w.y.resolve(field)),
                            Vec2::new(w.w, w.h),
                            w.lethal,
                        )
                    })
                    .collect()
            })
            .unwrap_or_default();
        let stars = authored
            .map(|entry| {
                entry
                    .stars
                    .iter()
                    .map(|&(x, y)| Vec2::new(field.width * x, y.resolve(field)))
                    .collect()
            })
            .unwrap_or_default();

        LevelDefinition {
            id: level,
            gravity: gravity_for(level),
            platform: Vec2::new(platform_x, field.ground_top() + platform_lift),
            walls,
            stars,
            shot_budget: shot_budget_for(level),
            coin_reward: coin_reward_for(level),
        }
    }
}
