//! Authored platformer levels and their static validation
//!
//! Platformer levels are literal data, played in order. Validation checks that
//! the spawn rests on a platform clear of hazards and that the goal can be
//! reached by hopping between platforms within the jump envelope.

use std::collections::VecDeque;

use glam::Vec2;

use super::entity::{Behavior, Entity};
use super::generate::IdCounter;
use super::geometry::{Aabb, intersects};
use super::level::{Goal, Level, Terrain};
use crate::consts::*;
use crate::error::LevelError;
use crate::palette::Palette;

/// World height shared by every platformer level; falling past it is fatal
pub const WORLD_HEIGHT: f32 = 600.0;

const COIN_SIZE: f32 = 16.0;
const COIN_POINTS: u32 = 10;
const GEM_POINTS: u32 = 50;
const SPIKE_SPRITE: &str = "spikes";

/// Apex height of a full jump
pub fn jump_height() -> f32 {
    JUMP_VELOCITY * JUMP_VELOCITY / (2.0 * GRAVITY)
}

/// Highest step up that validation accepts between platforms
pub fn max_rise() -> f32 {
    jump_height() * 0.8
}

/// Widest horizontal gap that validation accepts between platforms
pub fn max_gap() -> f32 {
    let airtime = 2.0 * JUMP_VELOCITY / GRAVITY;
    MAX_RUN_SPEED * airtime * 0.6
}

struct LevelSpec {
    name: &'static str,
    width: f32,
    goal_x: f32,
    platforms: &'static [(f32, f32, f32, f32)],
    /// (x, y, gem)
    coins: &'static [(f32, f32, bool)],
    /// (x, y, w, h)
    spikes: &'static [(f32, f32, f32, f32)],
    /// (x, y, min_x, max_x, speed)
    patrols: &'static [(f32, f32, f32, f32, f32)],
}

const LEVELS: [LevelSpec; 3] = [
    LevelSpec {
        name: "meadow",
        width: 2000.0,
        goal_x: 1900.0,
        platforms: &[
            (0.0, 520.0, 600.0, 80.0),
            (700.0, 520.0, 500.0, 80.0),
            (900.0, 440.0, 160.0, 16.0),
            (1300.0, 520.0, 700.0, 80.0),
        ],
        coins: &[
            (300.0, 480.0, false),
            (960.0, 410.0, false),
            (1100.0, 480.0, false),
            (1500.0, 480.0, false),
            (1700.0, 470.0, true),
        ],
        spikes: &[(1150.0, 504.0, 32.0, 16.0)],
        patrols: &[(1400.0, 496.0, 1350.0, 1800.0, 80.0)],
    },
    LevelSpec {
        name: "canyon",
        width: 2400.0,
        goal_x: 2300.0,
        platforms: &[
            (0.0, 520.0, 400.0, 80.0),
            (500.0, 460.0, 120.0, 16.0),
            (700.0, 390.0, 120.0, 16.0),
            (900.0, 460.0, 160.0, 16.0),
            (1160.0, 520.0, 400.0, 80.0),
            (1640.0, 450.0, 120.0, 16.0),
            (1860.0, 520.0, 540.0, 80.0),
        ],
        coins: &[
            (550.0, 420.0, false),
            (750.0, 350.0, true),
            (970.0, 420.0, false),
            (1400.0, 480.0, false),
            (1690.0, 410.0, false),
            (2100.0, 480.0, false),
        ],
        spikes: &[(2000.0, 504.0, 32.0, 16.0)],
        patrols: &[(1300.0, 496.0, 1180.0, 1530.0, 100.0)],
    },
    LevelSpec {
        name: "summit",
        width: 2800.0,
        goal_x: 2700.0,
        platforms: &[
            (0.0, 520.0, 300.0, 80.0),
            (380.0, 450.0, 100.0, 16.0),
            (560.0, 380.0, 100.0, 16.0),
            (740.0, 310.0, 100.0, 16.0),
            (920.0, 380.0, 200.0, 16.0),
            (1200.0, 450.0, 200.0, 16.0),
            (1480.0, 520.0, 500.0, 80.0),
            (2080.0, 450.0, 120.0, 16.0),
            (2280.0, 520.0, 520.0, 80.0),
        ],
        coins: &[
            (420.0, 410.0, false),
            (600.0, 340.0, false),
            (780.0, 270.0, true),
            (1280.0, 410.0, false),
            (1700.0, 480.0, false),
            (2130.0, 410.0, false),
            (2500.0, 480.0, false),
        ],
        spikes: &[(2400.0, 504.0, 32.0, 16.0)],
        patrols: &[
            (1600.0, 496.0, 1500.0, 1950.0, 140.0),
            (960.0, 356.0, 930.0, 1100.0, 60.0),
        ],
    },
];

/// Number of levels in the platformer sequence
pub fn level_count() -> usize {
    LEVELS.len()
}

/// Opening level of the sequence
pub fn first(palette: &Palette) -> Level {
    build(&LEVELS[0], palette)
}

/// Build the level at `index` in the sequence
pub fn load(index: usize, palette: &Palette) -> Option<Level> {
    LEVELS.get(index).map(|spec| build(spec, palette))
}

fn build(spec: &LevelSpec, palette: &Palette) -> Level {
    let mut ids = IdCounter::new();
    let platforms: Vec<Aabb> = spec
        .platforms
        .iter()
        .map(|&(x, y, w, h)| Aabb::new(x, y, w, h))
        .collect();

    let collectibles = spec
        .coins
        .iter()
        .map(|&(x, y, gem)| {
            let points = if gem { GEM_POINTS } else { COIN_POINTS };
            Entity::collectible(
                ids.allocate(),
                Aabb::new(x, y, COIN_SIZE, COIN_SIZE),
                points,
                gem,
            )
        })
        .collect();

    let mut obstacles: Vec<Entity> = spec
        .spikes
        .iter()
        .map(|&(x, y, w, h)| {
            Entity::hazard(ids.allocate(), Aabb::new(x, y, w, h), Behavior::Static)
                .with_sprite(SPIKE_SPRITE)
        })
        .collect();
    // Patrols cycle through the avatar's enemy set in authored order
    obstacles.extend(spec.patrols.iter().enumerate().map(
        |(i, &(x, y, min_x, max_x, speed))| {
            Entity::hazard(
                ids.allocate(),
                Aabb::new(x, y, 24.0, 24.0),
                Behavior::Patrol {
                    min_x,
                    max_x,
                    speed,
                },
            )
            .with_sprite(palette.nth(i))
        },
    ));

    // Spawn on the left end of the first platform
    let first = platforms.first().copied().unwrap_or_default();
    let spawn = Vec2::new(first.x + 40.0, first.y - PLAYER_HEIGHT);

    Level {
        name: spec.name.into(),
        terrain: Terrain::Platforms(platforms),
        collectibles,
        obstacles,
        goal: Goal::ReachX(spec.goal_x),
        spawn,
        bounds: Aabb::new(0.0, 0.0, spec.width, WORLD_HEIGHT),
    }
}

/// Player box at the level spawn
pub fn spawn_box(level: &Level) -> Aabb {
    Aabb::new(level.spawn.x, level.spawn.y, PLAYER_WIDTH, PLAYER_HEIGHT)
}

/// Platform the box is standing on, if any
pub fn support_of<'a>(platforms: &'a [Aabb], body: &Aabb) -> Option<&'a Aabb> {
    platforms
        .iter()
        .find(|p| body.overlaps_x(p) && (body.bottom() - p.y).abs() <= LANDING_EPSILON)
}

fn can_hop(from: &Aabb, to: &Aabb) -> bool {
    let gap = (to.x - from.right()).max(from.x - to.right()).max(0.0);
    let rise = from.y - to.y;
    gap <= max_gap() && rise <= max_rise()
}

/// Validate a platformer level: supported spawn, clear spawn, reachable goal
pub fn validate(level: &Level) -> Result<(), LevelError> {
    let platforms = level.platforms();
    let spawn = spawn_box(level);

    if platforms.iter().any(|p| intersects(p, &spawn)) {
        return Err(LevelError::SpawnBlocked {
            x: spawn.x,
            y: spawn.y,
        });
    }
    let start = platforms
        .iter()
        .position(|p| support_of(std::slice::from_ref(p), &spawn).is_some())
        .ok_or(LevelError::SpawnNotSupported)?;
    if let Some(o) = level.obstacles.iter().find(|o| intersects(&o.bounds, &spawn)) {
        return Err(LevelError::SpawnOccupied { id: o.id });
    }
    if level.collectibles.is_empty() {
        return Err(LevelError::NoCollectibles);
    }

    let Goal::ReachX(goal_x) = level.goal else {
        return Ok(());
    };

    // Breadth-first over the hop graph
    let mut seen = vec![false; platforms.len()];
    let mut queue = VecDeque::from([start]);
    seen[start] = true;
    while let Some(i) = queue.pop_front() {
        if platforms[i].right() >= goal_x {
            return Ok(());
        }
        for (j, next) in platforms.iter().enumerate() {
            if !seen[j] && can_hop(&platforms[i], next) {
                seen[j] = true;
                queue.push_back(j);
            }
        }
    }
    Err(LevelError::GoalUnreachable { goal_x })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::AvatarId;
    use crate::palette::{DEFAULT_PALETTE, palette_for};

    #[test]
    fn test_all_levels_validate() {
        for i in 0..level_count() {
            let level = load(i, &DEFAULT_PALETTE).expect("level exists");
            assert_eq!(level.validate(), Ok(()), "level {} ({})", i, level.name);
        }
    }

    #[test]
    fn test_goal_inside_world() {
        for i in 0..level_count() {
            let level = load(i, &DEFAULT_PALETTE).unwrap();
            let Goal::ReachX(goal_x) = level.goal else {
                panic!("platformer levels use ReachX");
            };
            assert!(goal_x < level.bounds.right());
        }
    }

    #[test]
    fn test_load_out_of_range() {
        assert!(load(level_count(), &DEFAULT_PALETTE).is_none());
    }

    #[test]
    fn test_wide_gap_is_unreachable() {
        let mut level = load(0, &DEFAULT_PALETTE).unwrap();
        level.terrain = Terrain::Platforms(vec![
            Aabb::new(0.0, 520.0, 300.0, 80.0),
            Aabb::new(300.0 + max_gap() + 50.0, 520.0, 2000.0, 80.0),
        ]);
        assert!(matches!(
            level.validate(),
            Err(LevelError::GoalUnreachable { .. })
        ));
    }

    #[test]
    fn test_floating_spawn_rejected() {
        let mut level = load(0, &DEFAULT_PALETTE).unwrap();
        level.spawn.y -= 100.0;
        assert_eq!(level.validate(), Err(LevelError::SpawnNotSupported));
    }

    #[test]
    fn test_patrols_use_avatar_palette() {
        let palette = palette_for(Some(&AvatarId::from("wizard")));
        for i in 0..level_count() {
            let level = load(i, palette).unwrap();
            for o in &level.obstacles {
                match o.behavior {
                    Behavior::Patrol { .. } => {
                        assert!(palette.enemies.iter().any(|e| *e == o.sprite))
                    }
                    _ => assert_eq!(o.sprite, SPIKE_SPRITE),
                }
            }
        }
    }

    #[test]
    fn test_jump_envelope_is_sane() {
        assert!(jump_height() > 100.0);
        assert!(max_rise() < jump_height());
        assert!(max_gap() > 100.0);
    }
}
