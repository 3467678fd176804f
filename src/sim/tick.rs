//! Fixed timestep simulation step
//!
//! One call advances the world by one tick: apply input, move the player,
//! resolve static collisions, pick up collectibles, move enemies, run one
//! consolidated hazard pass, then evaluate win/loss. The step is total for
//! any legal state and never decrements more than one life per tick.

use glam::IVec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::entity::{Behavior, Entity};
use super::generate;
use super::geometry::{Aabb, Direction, intersects};
use super::level::{Goal, Terrain};
use super::physics;
use super::platforms;
use super::state::{
    BlockedMove, GameEvent, GridRules, Outcome, PhysicsRules, Ruleset, SimulationState,
};
use crate::consts::FOOD_POINTS;

/// A single discrete player intent from the input adapter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Intent {
    Move(Direction),
    Jump,
    PauseToggle,
}

/// Input commands for a single tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    pub direction: Option<Direction>,
    pub jump: bool,
}

impl TickInput {
    /// Input record for a pending intent (pause is handled by the engine)
    pub fn from_intent(intent: Option<Intent>) -> Self {
        match intent {
            Some(Intent::Move(direction)) => Self {
                direction: Some(direction),
                jump: false,
            },
            Some(Intent::Jump) => Self {
                direction: None,
                jump: true,
            },
            Some(Intent::PauseToggle) | None => Self::default(),
        }
    }
}

/// What one step produced
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepReport {
    pub events: Vec<GameEvent>,
    /// Set when the step ended the session
    pub outcome: Option<Outcome>,
}

/// A grid turn is legal unless it reverses the current heading
pub fn accepts_turn(heading: Option<Direction>, turn: Direction) -> bool {
    heading.is_none_or(|h| turn != h.opposite())
}

/// Advance the simulation by one fixed timestep of `dt_ms`
pub fn step(state: &mut SimulationState, input: &TickInput, dt_ms: u32) -> StepReport {
    let mut report = StepReport::default();
    state.time_ticks += 1;
    state.time_ms += u64::from(dt_ms);

    match state.ruleset {
        Ruleset::Grid(rules) => step_grid(state, rules, input, &mut report),
        Ruleset::Physics(rules) => {
            step_physics(state, rules, input, dt_ms as f32 / 1000.0, &mut report)
        }
    }
    report
}

fn step_grid(state: &mut SimulationState, rules: GridRules, input: &TickInput, report: &mut StepReport) {
    let Terrain::Grid(grid) = &state.level.terrain else {
        return;
    };

    // Input + integration + static collision
    let from = state.player.cell();
    let mut moved_to = None;
    if let Behavior::Player {
        heading,
        tail,
        pending_growth,
        ..
    } = &mut state.player.behavior
    {
        if let Some(turn) = input.direction {
            if accepts_turn(*heading, turn) {
                *heading = Some(turn);
            }
        }
        if let Some(dir) = *heading {
            let dest = from + dir.delta();
            if grid.is_open(dest) {
                if rules.has_body {
                    tail.push_front(from);
                    if *pending_growth > 0 {
                        *pending_growth -= 1;
                    } else {
                        tail.pop_back();
                    }
                }
                moved_to = Some(dest);
            } else if rules.blocked == BlockedMove::Stop {
                *heading = None;
            }
        }
    }
    if let Some(dest) = moved_to {
        state.player.set_cell(dest);
    }

    // Running into your own body is instant death, lives untouched
    if rules.has_body && moved_to.is_some() {
        let head = state.player.cell();
        if state.player.tail().any(|c| c == head) {
            log::debug!("Snake hit itself at {:?}", head);
            report.events.push(GameEvent::SelfCollision);
            report.outcome = Some(Outcome::GameOver);
            return;
        }
    }

    let eaten = collect_overlapping(state, report);
    if rules.has_body && eaten > 0 {
        if let Some(outcome) = feed_snake(state, eaten, report) {
            report.outcome = Some(outcome);
            return;
        }
    }

    let enemy_moves = if rules.enemy_every > 0 && state.time_ticks % u64::from(rules.enemy_every) == 0 {
        move_wanderers(state)
    } else {
        state.enemies.iter().map(|e| (e.cell(), e.cell())).collect()
    };

    // Same cell after moving, or walked through each other
    let now_at = state.player.cell();
    let hit = enemy_moves
        .iter()
        .any(|&(before, after)| after == now_at || (after == from && before == now_at));
    if hit {
        register_hit(state, report);
    }

    if report.outcome.is_none()
        && state.level.goal == Goal::CollectAll
        && state.level.remaining_collectibles() == 0
    {
        report.outcome = Some(Outcome::Victory);
    }
}

/// Grow the snake and respawn food; a full board wins
fn feed_snake(state: &mut SimulationState, eaten: u32, report: &mut StepReport) -> Option<Outcome> {
    if let Behavior::Player { pending_growth, .. } = &mut state.player.behavior {
        *pending_growth += eaten;
    }
    state.level.collectibles.retain(|c| !c.is_collected());

    let mut occupied: Vec<IVec2> = state.player.tail().collect();
    occupied.push(state.player.cell());
    report.events.push(GameEvent::FoodEaten {
        length: occupied.len(),
    });

    let Terrain::Grid(grid) = &state.level.terrain else {
        return None;
    };
    match generate::place_food(&mut state.rng, grid, &occupied) {
        Some(cell) => {
            let id = state.next_entity_id();
            state
                .level
                .collectibles
                .push(Entity::collectible(id, Aabb::cell(cell), FOOD_POINTS, false));
            None
        }
        None if state.level.goal == Goal::FillBoard => Some(Outcome::Victory),
        None => None,
    }
}

/// Step every wanderer; returns (before, after) cells per enemy
fn move_wanderers(state: &mut SimulationState) -> Vec<(IVec2, IVec2)> {
    let Terrain::Grid(grid) = &state.level.terrain else {
        return Vec::new();
    };
    let mut moves = Vec::with_capacity(state.enemies.len());
    for enemy in &mut state.enemies {
        let before = enemy.cell();
        if let Behavior::Wanderer { heading } = &mut enemy.behavior {
            let dest = before + heading.delta();
            if grid.is_open(dest) {
                enemy.bounds = Aabb::cell(dest);
            } else {
                // Bounce in a random direction rather than mirroring
                *heading = Direction::ALL[state.rng.random_range(0..Direction::ALL.len())];
            }
        }
        moves.push((before, enemy.cell()));
    }
    moves
}

fn step_physics(
    state: &mut SimulationState,
    rules: PhysicsRules,
    input: &TickInput,
    dt: f32,
    report: &mut StepReport,
) {
    // Input + integration
    let (vel, grounded) = physics::apply_input(
        state.player.vel,
        state.player.is_grounded(),
        input,
        &rules,
        dt,
    );
    let vel = physics::apply_gravity(vel, grounded, &rules, dt);

    // Static collision
    let motion = physics::move_and_land(
        state.player.bounds,
        vel,
        state.level.platforms(),
        &state.level.bounds,
        dt,
    );
    state.player.bounds = motion.bounds;
    state.player.vel = motion.vel;
    if let Behavior::Player { grounded, heading, .. } = &mut state.player.behavior {
        *grounded = motion.grounded;
        *heading = input.direction.filter(|d| d.horizontal() != 0.0);
    }

    collect_overlapping(state, report);

    for enemy in &mut state.enemies {
        physics::step_patrol(enemy, dt);
    }

    let player = state.player.bounds;
    if state.enemies.iter().any(|e| intersects(&e.bounds, &player)) {
        register_hit(state, report);
    }

    if report.outcome.is_none() {
        if state.player.bounds.y > state.level.bounds.bottom() {
            log::info!("Player fell out of the world");
            report.events.push(GameEvent::FellOut);
            report.outcome = Some(Outcome::GameOver);
        } else if let Goal::ReachX(goal_x) = state.level.goal {
            if state.player.bounds.x >= goal_x {
                let next = state.level_index + 1;
                match platforms::load(next, state.palette) {
                    Some(level) => {
                        log::info!("Level {} cleared, loading '{}'", state.level_index, level.name);
                        state.load_level(level, next);
                        report.events.push(GameEvent::LevelAdvanced { index: next });
                    }
                    None => report.outcome = Some(Outcome::Victory),
                }
            }
        }
    }

    state.camera_offset = physics::camera_offset(
        &state.player.bounds,
        state.level.bounds.w,
        rules.viewport_width,
    );
}

/// Pick up every uncollected collectible the player overlaps; returns count
fn collect_overlapping(state: &mut SimulationState, report: &mut StepReport) -> u32 {
    let player = state.player.bounds;
    let now = state.time_ms;
    let mut count = 0;

    for c in &mut state.level.collectibles {
        let Behavior::Collectible {
            points,
            power,
            collected,
        } = &mut c.behavior
        else {
            continue;
        };
        if *collected || !intersects(&c.bounds, &player) {
            continue;
        }

        *collected = true;
        count += 1;
        state.score += u64::from(*points);
        report.events.push(GameEvent::Collected {
            id: c.id,
            points: *points,
        });
        if *power {
            let until = now + state.timings.power_duration_ms;
            state.invulnerable_until = Some(state.invulnerable_until.map_or(until, |t| t.max(until)));
            report.events.push(GameEvent::PowerUp { until_ms: until });
        }
    }
    count
}

/// Lose a life unless invulnerable; respawn with a grace window
fn register_hit(state: &mut SimulationState, report: &mut StepReport) {
    if state.is_invulnerable() {
        report.events.push(GameEvent::HitAbsorbed);
        return;
    }

    state.lives = state.lives.saturating_sub(1);
    report.events.push(GameEvent::LifeLost {
        lives_left: state.lives,
    });
    log::info!("Life lost, {} remaining", state.lives);

    if state.lives == 0 {
        report.outcome = Some(Outcome::GameOver);
        return;
    }
    state.invulnerable_until = Some(state.time_ms + state.timings.hit_invulnerability_ms);
    state.respawn_player();
}
