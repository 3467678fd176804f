//! Arcade Engine - simulation core for the arcade mini-games
//!
//! Core modules:
//! - `sim`: Deterministic simulation (levels, entities, collisions, step)
//! - `engine`: Game state machine owning the live session
//! - `host`: Contracts with the surrounding app (avatar, tokens, results)
//! - `platform`: Browser/native input adapters
//! - `settings`: Data-driven game balance

pub mod engine;
pub mod error;
pub mod highscores;
pub mod host;
pub mod palette;
pub mod platform;
pub mod settings;
pub mod sim;

pub use engine::{Arcade, Snapshot, TickToken};
pub use error::{LevelError, StartError};
pub use highscores::HighScores;
pub use host::{ArcadeHost, AvatarId, LocalHost, SessionResult, TokenWallet};
pub use settings::{ArcadeSettings, Difficulty};

use glam::{IVec2, Vec2};

/// Game configuration constants
pub mod consts {
    /// Pixel size of one grid cell (render space for the grid games)
    pub const CELL_SIZE: f32 = 24.0;

    /// Platformer simulation period in whole milliseconds (62.5 Hz)
    pub const PHYSICS_TICK_MS: u32 = 16;
    /// Platformer simulation timestep, exactly one `PHYSICS_TICK_MS`
    pub const PHYSICS_DT: f32 = PHYSICS_TICK_MS as f32 / 1000.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Frame deltas above this are treated as a stall (tab hidden etc.)
    pub const MAX_FRAME_DT: f32 = 0.25;

    /// Snake tick period
    pub const SNAKE_TICK_MS: u32 = 120;
    /// Maze-chase tick period
    pub const MAZE_TICK_MS: u32 = 150;
    /// Maze enemies move once every this many ticks
    pub const MAZE_ENEMY_EVERY: u32 = 2;

    /// Lives at session start
    pub const STARTING_LIVES: u8 = 3;
    /// Invulnerability granted after losing a life
    pub const HIT_INVULNERABILITY_MS: u64 = 2_000;
    /// Invulnerability granted by a power collectible
    pub const POWER_DURATION_MS: u64 = 5_000;

    /// Maze dimensions (must be odd)
    pub const MAZE_WIDTH: i32 = 21;
    pub const MAZE_HEIGHT: i32 = 15;
    /// Chance of opening a right/down connection from a carved cell
    pub const MAZE_OPEN_PROBABILITY: f64 = 0.7;
    /// Chance that an open cell holds a collectible
    pub const COLLECTIBLE_PROBABILITY: f64 = 0.3;
    /// Chance that a placed collectible is a power collectible
    pub const POWER_PROBABILITY: f64 = 0.1;
    /// Points for a standard / power collectible
    pub const COLLECTIBLE_POINTS: u32 = 10;
    pub const POWER_POINTS: u32 = 50;
    /// One maze enemy per this many open cells
    pub const OPEN_CELLS_PER_ENEMY: usize = 40;
    pub const MAX_MAZE_ENEMIES: usize = 6;
    /// Bounded regeneration before falling back to the static maze
    pub const MAX_GENERATION_ATTEMPTS: u32 = 16;

    /// Snake arena dimensions
    pub const SNAKE_WIDTH: i32 = 20;
    pub const SNAKE_HEIGHT: i32 = 20;
    pub const SNAKE_START_LENGTH: usize = 3;
    pub const FOOD_POINTS: u32 = 10;

    /// Platformer player size
    pub const PLAYER_WIDTH: f32 = 24.0;
    pub const PLAYER_HEIGHT: f32 = 32.0;
    /// Horizontal acceleration while a direction is held (px/s²)
    pub const RUN_ACCEL: f32 = 2_000.0;
    /// Maximum horizontal speed (px/s)
    pub const MAX_RUN_SPEED: f32 = 260.0;
    /// Per-step multiplicative damping when no direction is held
    pub const RUN_DAMPING: f32 = 0.8;
    /// Gravity (px/s², +y is down)
    pub const GRAVITY: f32 = 1_800.0;
    /// Initial upward speed of a jump (px/s)
    pub const JUMP_VELOCITY: f32 = 620.0;
    /// Terminal fall speed (px/s)
    pub const MAX_FALL_SPEED: f32 = 900.0;
    /// Tolerance for "feet on platform top"
    pub const LANDING_EPSILON: f32 = 0.5;
    /// Visible width of the platformer viewport
    pub const VIEWPORT_WIDTH: f32 = 800.0;
}

/// Top-left pixel of a grid cell
#[inline]
pub fn cell_to_pixel(cell: IVec2) -> Vec2 {
    cell.as_vec2() * consts::CELL_SIZE
}

/// Grid cell containing a pixel position
#[inline]
pub fn pixel_to_cell(pos: Vec2) -> IVec2 {
    (pos / consts::CELL_SIZE).floor().as_ivec2()
}
