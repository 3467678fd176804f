//! Game state and core simulation types
//!
//! `SimulationState` is everything the step mutates. It is owned by the
//! engine and only ever changed through `tick::step`.

use glam::{IVec2, Vec2};
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::entity::{Behavior, Entity};
use super::generate::{self, IdCounter};
use super::level::Level;
use super::platforms;
use crate::consts::*;
use crate::palette::{DEFAULT_PALETTE, Palette};
use crate::settings::ArcadeSettings;

/// Lifecycle phase of the arcade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// No session; waiting for start
    Idle,
    /// Simulation advancing
    Playing,
    /// Simulation frozen
    Paused,
    /// Session lost
    GameOver,
    /// Session won
    Victory,
}

impl GamePhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, GamePhase::GameOver | GamePhase::Victory)
    }
}

/// Which mini-game is being played
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameKind {
    Snake,
    Maze,
    Platformer,
}

impl GameKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameKind::Snake => "snake",
            GameKind::Maze => "maze",
            GameKind::Platformer => "platformer",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "snake" => Some(GameKind::Snake),
            "maze" | "maze-chase" => Some(GameKind::Maze),
            "platformer" | "platform" => Some(GameKind::Platformer),
            _ => None,
        }
    }

    /// Rules the step runs this game with
    pub fn ruleset(&self, settings: &ArcadeSettings) -> Ruleset {
        match self {
            GameKind::Snake => Ruleset::Grid(GridRules {
                blocked: BlockedMove::Hold,
                has_body: true,
                enemy_every: 0,
            }),
            GameKind::Maze => Ruleset::Grid(GridRules {
                blocked: BlockedMove::Stop,
                has_body: false,
                enemy_every: settings.maze_enemy_every,
            }),
            GameKind::Platformer => Ruleset::Physics(PhysicsRules::default()),
        }
    }

    /// Fixed simulation period in milliseconds
    pub fn tick_ms(&self, settings: &ArcadeSettings) -> u32 {
        match self {
            GameKind::Snake => settings.snake_tick_ms.max(1),
            GameKind::Maze => settings.maze_tick_ms.max(1),
            GameKind::Platformer => PHYSICS_TICK_MS,
        }
    }

    /// Produce the opening level for a session
    pub fn generate_level(
        &self,
        rng: &mut Pcg32,
        settings: &ArcadeSettings,
        palette: &Palette,
    ) -> Level {
        match self {
            GameKind::Snake => generate::generate_snake_arena(rng, settings),
            GameKind::Maze => generate::generate_maze(rng, settings, palette),
            GameKind::Platformer => platforms::first(palette),
        }
    }
}

/// What happens when a grid move runs into a wall
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockedMove {
    /// Move is dropped, heading kept
    Hold,
    /// Move is dropped and the entity stops
    Stop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridRules {
    pub blocked: BlockedMove,
    /// Snake body that follows the head and kills on contact
    pub has_body: bool,
    /// Enemies move every N ticks (0 = never)
    pub enemy_every: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicsRules {
    pub run_accel: f32,
    pub max_run_speed: f32,
    pub damping: f32,
    pub gravity: f32,
    pub jump_velocity: f32,
    pub max_fall_speed: f32,
    pub viewport_width: f32,
}

impl Default for PhysicsRules {
    fn default() -> Self {
        Self {
            run_accel: RUN_ACCEL,
            max_run_speed: MAX_RUN_SPEED,
            damping: RUN_DAMPING,
            gravity: GRAVITY,
            jump_velocity: JUMP_VELOCITY,
            max_fall_speed: MAX_FALL_SPEED,
            viewport_width: VIEWPORT_WIDTH,
        }
    }
}

/// Grid-bounded or continuous-physics rules
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Ruleset {
    Grid(GridRules),
    Physics(PhysicsRules),
}

/// Durations that differ by difficulty
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timings {
    pub hit_invulnerability_ms: u64,
    pub power_duration_ms: u64,
}

/// Terminal result of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Victory,
    GameOver,
}

/// Things that happened during one step (for audio/effects adapters)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Collected { id: u32, points: u32 },
    PowerUp { until_ms: u64 },
    FoodEaten { length: usize },
    LifeLost { lives_left: u8 },
    HitAbsorbed,
    SelfCollision,
    FellOut,
    LevelAdvanced { index: usize },
}

/// Complete simulation state for one session
#[derive(Debug, Clone, Serialize)]
pub struct SimulationState {
    pub kind: GameKind,
    pub ruleset: Ruleset,
    pub timings: Timings,
    pub level: Level,
    /// Position in the platformer level sequence
    pub level_index: usize,
    pub player: Entity,
    pub enemies: Vec<Entity>,
    pub score: u64,
    pub lives: u8,
    /// Simulation time (ms) until which hits are ignored
    pub invulnerable_until: Option<u64>,
    /// Horizontal scroll of the viewport (platformer)
    pub camera_offset: f32,
    /// Simulation clock
    pub time_ms: u64,
    pub time_ticks: u64,
    pub seed: u64,
    #[serde(skip)]
    pub(crate) rng: Pcg32,
    #[serde(skip)]
    pub(crate) ids: IdCounter,
    /// Sprite set for levels loaded mid-session
    #[serde(skip)]
    pub(crate) palette: &'static Palette,
}

impl SimulationState {
    /// Fresh session state on `level`
    pub fn new(kind: GameKind, level: Level, settings: &ArcadeSettings, seed: u64) -> Self {
        let next_id = level
            .collectibles
            .iter()
            .chain(&level.obstacles)
            .map(|e| e.id + 1)
            .max()
            .unwrap_or(1);

        let mut state = Self {
            kind,
            ruleset: kind.ruleset(settings),
            timings: Timings {
                hit_invulnerability_ms: settings.hit_invulnerability_ms,
                power_duration_ms: settings.power_duration_ms,
            },
            player: Entity::grid_player(0, IVec2::ZERO),
            enemies: level.obstacles.clone(),
            level,
            level_index: 0,
            score: 0,
            lives: settings.starting_lives.max(1),
            invulnerable_until: None,
            camera_offset: 0.0,
            time_ms: 0,
            time_ticks: 0,
            seed,
            rng: Pcg32::seed_from_u64(seed),
            ids: IdCounter::starting_at(next_id),
            palette: &DEFAULT_PALETTE,
        };
        state.player = state.spawn_player();
        state
    }

    /// Player entity placed at the level's spawn
    fn spawn_player(&self) -> Entity {
        match self.kind {
            GameKind::Snake => {
                let head = self.level.spawn_cell();
                let mut player = Entity::grid_player(0, head);
                if let Behavior::Player { heading, tail, .. } = &mut player.behavior {
                    *heading = Some(super::geometry::Direction::Right);
                    *tail = generate::initial_snake(head, SNAKE_START_LENGTH);
                }
                player
            }
            GameKind::Maze => Entity::grid_player(0, self.level.spawn_cell()),
            GameKind::Platformer => {
                let mut player = Entity::platform_player(
                    0,
                    self.level.spawn,
                    Vec2::new(PLAYER_WIDTH, PLAYER_HEIGHT),
                );
                let grounded =
                    platforms::support_of(self.level.platforms(), &player.bounds).is_some();
                if let Behavior::Player { grounded: g, .. } = &mut player.behavior {
                    *g = grounded;
                }
                player
            }
        }
    }

    /// Palette used when the platformer loads its next level
    pub fn with_palette(mut self, palette: &'static Palette) -> Self {
        self.palette = palette;
        self
    }

    /// Put the player back on the level's safe anchor
    pub fn respawn_player(&mut self) {
        self.player = self.spawn_player();
    }

    /// Swap in the next level of a sequence, keeping score and lives
    pub fn load_level(&mut self, level: Level, index: usize) {
        self.enemies = level.obstacles.clone();
        self.level = level;
        self.level_index = index;
        self.camera_offset = 0.0;
        self.respawn_player();
    }

    pub fn is_invulnerable(&self) -> bool {
        self.invulnerable_until.is_some_and(|t| t > self.time_ms)
    }

    /// Allocate an id for an entity spawned mid-session
    pub fn next_entity_id(&mut self) -> u32 {
        self.ids.allocate()
    }
}
