//! Entity records: player, enemies, obstacles and collectibles

use std::collections::VecDeque;

use glam::{IVec2, Vec2};
use serde::{Deserialize, Serialize};

use super::geometry::{Aabb, Direction};

/// What an entity is, for rendering and collision routing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityKind {
    Player,
    Enemy,
    Obstacle,
    Collectible,
}

/// Per-kind behavior and state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Behavior {
    /// The controlled entity
    Player {
        /// Current grid heading (`None` = standing still)
        heading: Option<Direction>,
        /// Standing on a platform (platformer only)
        grounded: bool,
        /// Body segments behind the head, nearest first (snake only)
        tail: VecDeque<IVec2>,
        /// Segments still to be added as the snake moves
        pending_growth: u32,
    },
    /// Grid enemy walking along a heading, re-rolled on wall hits
    Wanderer { heading: Direction },
    /// Platformer hazard pacing between two x limits
    Patrol { min_x: f32, max_x: f32, speed: f32 },
    /// Motionless hazard
    Static,
    Collectible {
        points: u32,
        power: bool,
        collected: bool,
    },
}

/// A positioned, sized thing in the world
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: u32,
    pub kind: EntityKind,
    /// Cell space for grid games, pixel space for the platformer
    pub bounds: Aabb,
    /// Pixels per second (platformer only)
    pub vel: Vec2,
    pub behavior: Behavior,
    /// Sprite set tag supplied by the avatar palette
    #[serde(default)]
    pub sprite: String,
}

impl Entity {
    /// Grid player standing on `cell`
    pub fn grid_player(id: u32, cell: IVec2) -> Self {
        Self {
            id,
            kind: EntityKind::Player,
            bounds: Aabb::cell(cell),
            vel: Vec2::ZERO,
            behavior: Behavior::Player {
                heading: None,
                grounded: false,
                tail: VecDeque::new(),
                pending_growth: 0,
            },
            sprite: String::new(),
        }
    }

    /// Platformer player with its top-left at `pos`
    pub fn platform_player(id: u32, pos: Vec2, size: Vec2) -> Self {
        Self {
            id,
            kind: EntityKind::Player,
            bounds: Aabb::new(pos.x, pos.y, size.x, size.y),
            vel: Vec2::ZERO,
            behavior: Behavior::Player {
                heading: None,
                grounded: false,
                tail: VecDeque::new(),
                pending_growth: 0,
            },
            sprite: String::new(),
        }
    }

    pub fn wanderer(id: u32, cell: IVec2, heading: Direction, sprite: &str) -> Self {
        Self {
            id,
            kind: EntityKind::Enemy,
            bounds: Aabb::cell(cell),
            vel: Vec2::ZERO,
            behavior: Behavior::Wanderer { heading },
            sprite: sprite.to_string(),
        }
    }

    pub fn hazard(id: u32, bounds: Aabb, behavior: Behavior) -> Self {
        Self {
            id,
            kind: EntityKind::Obstacle,
            bounds,
            vel: Vec2::ZERO,
            behavior,
            sprite: String::new(),
        }
    }

    pub fn collectible(id: u32, bounds: Aabb, points: u32, power: bool) -> Self {
        Self {
            id,
            kind: EntityKind::Collectible,
            bounds,
            vel: Vec2::ZERO,
            behavior: Behavior::Collectible {
                points,
                power,
                collected: false,
            },
            sprite: String::new(),
        }
    }

    pub fn with_sprite(mut self, sprite: &str) -> Self {
        self.sprite = sprite.to_string();
        self
    }

    /// Grid cell of the entity (cell-space entities)
    #[inline]
    pub fn cell(&self) -> IVec2 {
        self.bounds.cell_pos()
    }

    pub fn set_cell(&mut self, cell: IVec2) {
        self.bounds = self.bounds.with_min(cell.as_vec2());
    }

    pub fn is_collected(&self) -> bool {
        matches!(
            self.behavior,
            Behavior::Collectible {
                collected: true,
                ..
            }
        )
    }

    /// Player heading (None for non-players)
    pub fn heading(&self) -> Option<Direction> {
        match &self.behavior {
            Behavior::Player { heading, .. } => *heading,
            Behavior::Wanderer { heading } => Some(*heading),
            _ => None,
        }
    }

    pub fn is_grounded(&self) -> bool {
        matches!(self.behavior, Behavior::Player { grounded: true, .. })
    }

    /// Snake body behind the head (empty for other entities)
    pub fn tail(&self) -> impl Iterator<Item = IVec2> + '_ {
        let tail = match &self.behavior {
            Behavior::Player { tail, .. } => Some(tail),
            _ => None,
        };
        tail.into_iter().flatten().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_player_cell() {
        let mut p = Entity::grid_player(1, IVec2::new(3, 4));
        assert_eq!(p.cell(), IVec2::new(3, 4));
        p.set_cell(IVec2::new(5, 1));
        assert_eq!(p.cell(), IVec2::new(5, 1));
        assert_eq!(p.bounds.w, 1.0);
    }

    #[test]
    fn test_collectible_flag() {
        let mut c = Entity::collectible(2, Aabb::cell(IVec2::ONE), 10, false);
        assert!(!c.is_collected());
        if let Behavior::Collectible { collected, .. } = &mut c.behavior {
            *collected = true;
        }
        assert!(c.is_collected());
    }

    #[test]
    fn test_tail_of_non_player_is_empty() {
        let e = Entity::wanderer(3, IVec2::ZERO, Direction::Up, "ghost");
        assert_eq!(e.tail().count(), 0);
        assert_eq!(e.heading(), Some(Direction::Up));
    }
}
