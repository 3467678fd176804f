//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (level order for collectibles and enemies)
//! - No rendering or platform dependencies

pub mod entity;
pub mod generate;
pub mod geometry;
pub mod grid;
pub mod level;
pub mod physics;
pub mod platforms;
pub mod state;
pub mod tick;

pub use entity::{Behavior, Entity, EntityKind};
pub use geometry::{Aabb, Direction, intersects};
pub use grid::OccupancyGrid;
pub use level::{Goal, Level, Terrain};
pub use state::{GameEvent, GameKind, GamePhase, Outcome, Ruleset, SimulationState};
pub use tick::{Intent, StepReport, TickInput, accepts_turn, step};
