//! Error types surfaced by the engine
//!
//! Only the blocked start reaches the UI. Level errors are invariant
//! violations: the generators retry on them and tests assert they never occur
//! for shipped levels.

use thiserror::Error;

/// Why a session could not start
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StartError {
    #[error("not enough tokens to play (costs {cost})")]
    InsufficientTokens { cost: u32 },
}

/// Structural problem with a level
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LevelError {
    #[error("spawn at ({x}, {y}) is inside a wall or platform")]
    SpawnBlocked { x: f32, y: f32 },

    #[error("spawn is not standing on any platform")]
    SpawnNotSupported,

    #[error("obstacle {id} overlaps the spawn")]
    SpawnOccupied { id: u32 },

    #[error("obstacle {id} is inside a wall")]
    ObstacleInWall { id: u32 },

    #[error("level has no collectibles")]
    NoCollectibles,

    #[error("no collectible is reachable from spawn")]
    NoReachableCollectible,

    #[error("collectible {id} cannot be reached from spawn")]
    UnreachableCollectible { id: u32 },

    #[error("goal at x={goal_x} cannot be reached from spawn")]
    GoalUnreachable { goal_x: f32 },
}
