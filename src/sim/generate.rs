//! Procedural level generation for the grid games
//!
//! Mazes are carved on a stride of 2 with random right/down openings, which
//! alone does not guarantee connectivity. Every candidate is therefore
//! validated (spawn reaches at least one collectible, every kept collectible
//! reachable) and regenerated a bounded number of times before falling back to
//! a known-good static maze.

use std::collections::VecDeque;

use glam::IVec2;
use rand::Rng;
use rand::seq::SliceRandom;
use rand_pcg::Pcg32;

use super::entity::Entity;
use super::geometry::{Aabb, Direction};
use super::grid::OccupancyGrid;
use super::level::{Goal, Level, Terrain};
use crate::consts::*;
use crate::error::LevelError;
use crate::palette::Palette;
use crate::settings::ArcadeSettings;

/// Sequential entity id source for one level
#[derive(Debug, Clone)]
pub struct IdCounter(u32);

impl IdCounter {
    /// Ids start at 1; 0 is the player
    pub fn new() -> Self {
        Self(1)
    }

    pub fn starting_at(next: u32) -> Self {
        Self(next.max(1))
    }

    pub fn allocate(&mut self) -> u32 {
        let id = self.0;
        self.0 += 1;
        id
    }
}

impl Default for IdCounter {
    fn default() -> Self {
        Self::new()
    }
}

/// Generate a maze-chase level, retrying until it validates
pub fn generate_maze(rng: &mut Pcg32, settings: &ArcadeSettings, palette: &Palette) -> Level {
    for attempt in 1..=MAX_GENERATION_ATTEMPTS {
        match try_generate_maze(rng, settings, palette) {
            Ok(level) => {
                log::info!(
                    "Maze generated on attempt {}: {} collectibles, {} enemies",
                    attempt,
                    level.collectibles.len(),
                    level.obstacles.len()
                );
                return level;
            }
            Err(err) => log::debug!("Maze attempt {} rejected: {}", attempt, err),
        }
    }

    log::warn!(
        "Maze generation failed {} times, using fallback level",
        MAX_GENERATION_ATTEMPTS
    );
    fallback_maze(palette)
}

/// One generation attempt; the result is already validated
pub fn try_generate_maze(
    rng: &mut Pcg32,
    settings: &ArcadeSettings,
    palette: &Palette,
) -> Result<Level, LevelError> {
    let width = odd_at_least(settings.maze_width, 5);
    let height = odd_at_least(settings.maze_height, 5);
    let grid = carve_maze(rng, width, height, settings.open_probability);
    let spawn = IVec2::new(1, 1);

    let mut ids = IdCounter::new();
    let collectibles = place_collectibles(rng, &grid, spawn, settings, &mut ids);
    if collectibles.is_empty() {
        return Err(LevelError::NoCollectibles);
    }
    let obstacles = place_obstacles(rng, &grid, spawn, palette, &mut ids);

    let level = Level {
        name: "maze".into(),
        bounds: Aabb::new(0.0, 0.0, width as f32, height as f32),
        terrain: Terrain::Grid(grid),
        collectibles,
        obstacles,
        goal: Goal::CollectAll,
        spawn: spawn.as_vec2(),
    };
    level.validate()?;
    Ok(level)
}

fn odd_at_least(n: i32, min: i32) -> i32 {
    let n = n.max(min);
    if n % 2 == 0 { n + 1 } else { n }
}

/// Carve passages: open every odd cell, then link right/down with `p`
pub fn carve_maze(rng: &mut Pcg32, width: i32, height: i32, p: f64) -> OccupancyGrid {
    let mut grid = OccupancyGrid::filled(width, height, true);
    let p = p.clamp(0.0, 1.0);

    for y in (1..height - 1).step_by(2) {
        for x in (1..width - 1).step_by(2) {
            grid.set_wall(IVec2::new(x, y), false);
            if x + 2 < width - 1 && rng.random_bool(p) {
                grid.set_wall(IVec2::new(x + 1, y), false);
            }
            if y + 2 < height - 1 && rng.random_bool(p) {
                grid.set_wall(IVec2::new(x, y + 1), false);
            }
        }
    }

    // Start and end region always open
    grid.set_wall(IVec2::new(1, 1), false);
    grid.set_wall(IVec2::new(width - 2, height - 2), false);
    grid
}

/// Scatter collectibles over open cells, keeping only reachable ones
pub fn place_collectibles(
    rng: &mut Pcg32,
    grid: &OccupancyGrid,
    spawn: IVec2,
    settings: &ArcadeSettings,
    ids: &mut IdCounter,
) -> Vec<Entity> {
    let reachable = grid.reachable_set(spawn);
    let mut placed = Vec::new();

    for cell in grid.open_cells() {
        if cell == spawn || !rng.random_bool(settings.collectible_probability.clamp(0.0, 1.0)) {
            continue;
        }
        let power = rng.random_bool(settings.power_probability.clamp(0.0, 1.0));
        // Collect-all must stay winnable, so pockets cut off from spawn stay empty
        if !reachable.contains(cell) {
            continue;
        }
        let points = if power { POWER_POINTS } else { COLLECTIBLE_POINTS };
        placed.push(Entity::collectible(ids.allocate(), Aabb::cell(cell), points, power));
    }
    placed
}

/// Place wandering enemies on reachable cells away from spawn
pub fn place_obstacles(
    rng: &mut Pcg32,
    grid: &OccupancyGrid,
    spawn: IVec2,
    palette: &Palette,
    ids: &mut IdCounter,
) -> Vec<Entity> {
    let reachable = grid.reachable_set(spawn);
    let open = grid.open_cells();
    let count = (open.len() / OPEN_CELLS_PER_ENEMY).clamp(1, MAX_MAZE_ENEMIES);

    let mut candidates: Vec<IVec2> = open
        .into_iter()
        .filter(|c| reachable.contains(*c) && (*c - spawn).abs().element_sum() >= 3)
        .collect();
    candidates.shuffle(rng);

    candidates
        .into_iter()
        .take(count)
        .map(|cell| {
            let heading = random_open_heading(rng, grid, cell);
            Entity::wanderer(ids.allocate(), cell, heading, palette.pick(rng))
        })
        .collect()
}

/// Random direction, preferring ones that lead into an open cell
pub fn random_open_heading(rng: &mut Pcg32, grid: &OccupancyGrid, cell: IVec2) -> Direction {
    let open: Vec<Direction> = Direction::ALL
        .into_iter()
        .filter(|d| grid.is_open(cell + d.delta()))
        .collect();
    if open.is_empty() {
        Direction::ALL[rng.random_range(0..Direction::ALL.len())]
    } else {
        open[rng.random_range(0..open.len())]
    }
}

const FALLBACK_MAZE: [&str; 11] = [
    "###############",
    "#S....#.....o.#",
    "#.###.#.###.#.#",
    "#.#o..E...#.#.#",
    "#.#.#####.#.#.#",
    "#...#*..#...#.#",
    "###.#.#.#####.#",
    "#o..#.#...E...#",
    "#.###.###.###.#",
    "#...o...#....*#",
    "###############",
];

/// Hand-authored maze used when generation keeps failing
pub fn fallback_maze(palette: &Palette) -> Level {
    let grid = OccupancyGrid::from_rows(&FALLBACK_MAZE);
    let mut ids = IdCounter::new();
    let mut collectibles = Vec::new();
    let mut obstacles = Vec::new();
    let mut spawn = IVec2::ONE;

    for (y, row) in FALLBACK_MAZE.iter().enumerate() {
        for (x, ch) in row.chars().enumerate() {
            let cell = IVec2::new(x as i32, y as i32);
            match ch {
                'S' => spawn = cell,
                'o' => collectibles.push(Entity::collectible(
                    ids.allocate(),
                    Aabb::cell(cell),
                    COLLECTIBLE_POINTS,
                    false,
                )),
                '*' => collectibles.push(Entity::collectible(
                    ids.allocate(),
                    Aabb::cell(cell),
                    POWER_POINTS,
                    true,
                )),
                'E' => obstacles.push(Entity::wanderer(
                    ids.allocate(),
                    cell,
                    Direction::Left,
                    palette.enemies[0],
                )),
                _ => {}
            }
        }
    }

    Level {
        name: "maze-fallback".into(),
        bounds: Aabb::new(0.0, 0.0, grid.width as f32, grid.height as f32),
        terrain: Terrain::Grid(grid),
        collectibles,
        obstacles,
        goal: Goal::CollectAll,
        spawn: spawn.as_vec2(),
    }
}

/// Head cell and tail (nearest first) of a freshly spawned snake facing right
pub fn initial_snake(head: IVec2, length: usize) -> VecDeque<IVec2> {
    (1..length.max(1) as i32)
        .map(|i| head - IVec2::new(i, 0))
        .collect()
}

/// Open arena for the snake game with its first food placed
pub fn generate_snake_arena(rng: &mut Pcg32, settings: &ArcadeSettings) -> Level {
    let width = settings.snake_width.max(SNAKE_START_LENGTH as i32 + 2);
    let height = settings.snake_height.max(3);
    let grid = OccupancyGrid::filled(width, height, false);
    let spawn = IVec2::new(width / 2, height / 2);

    let mut occupied: Vec<IVec2> = initial_snake(spawn, SNAKE_START_LENGTH).into();
    occupied.push(spawn);

    let mut ids = IdCounter::new();
    let collectibles = place_food(rng, &grid, &occupied)
        .map(|cell| Entity::collectible(ids.allocate(), Aabb::cell(cell), FOOD_POINTS, false))
        .into_iter()
        .collect();

    log::info!("Snake arena generated: {}x{}", width, height);
    Level {
        name: "snake".into(),
        bounds: Aabb::new(0.0, 0.0, width as f32, height as f32),
        terrain: Terrain::Grid(grid),
        collectibles,
        obstacles: Vec::new(),
        goal: Goal::FillBoard,
        spawn: spawn.as_vec2(),
    }
}

/// Random open cell not in `occupied` (`None` when the board is full)
pub fn place_food(rng: &mut Pcg32, grid: &OccupancyGrid, occupied: &[IVec2]) -> Option<IVec2> {
    let free: Vec<IVec2> = grid
        .open_cells()
        .into_iter()
        .filter(|c| !occupied.contains(c))
        .collect();
    if free.is_empty() {
        None
    } else {
        Some(free[rng.random_range(0..free.len())])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::DEFAULT_PALETTE;
    use rand::SeedableRng;

    #[test]
    fn test_id_counter_allocates_in_order() {
        let mut ids = IdCounter::new();
        assert_eq!(ids.allocate(), 1);
        assert_eq!(ids.allocate(), 2);
        // 0 stays reserved for the player
        let mut ids = IdCounter::starting_at(0);
        assert_eq!(ids.allocate(), 1);
    }

    #[test]
    fn test_carve_keeps_border_walls() {
        let mut rng = Pcg32::seed_from_u64(7);
        let grid = carve_maze(&mut rng, 21, 15, 0.7);
        for x in 0..21 {
            assert!(grid.is_wall(IVec2::new(x, 0)));
            assert!(grid.is_wall(IVec2::new(x, 14)));
        }
        for y in 0..15 {
            assert!(grid.is_wall(IVec2::new(0, y)));
            assert!(grid.is_wall(IVec2::new(20, y)));
        }
        assert!(grid.is_open(IVec2::new(1, 1)));
        assert!(grid.is_open(IVec2::new(19, 13)));
    }

    #[test]
    fn test_full_probability_is_connected() {
        let mut rng = Pcg32::seed_from_u64(1);
        let grid = carve_maze(&mut rng, 11, 11, 1.0);
        assert!(grid.is_reachable(IVec2::new(1, 1), IVec2::new(9, 9)));
    }

    #[test]
    fn test_fallback_maze_is_valid() {
        let level = fallback_maze(&DEFAULT_PALETTE);
        assert_eq!(level.validate(), Ok(()));
        assert_eq!(level.spawn_cell(), IVec2::new(1, 1));
        assert!(level.collectibles.iter().any(|c| matches!(
            c.behavior,
            crate::sim::Behavior::Collectible { power: true, .. }
        )));
        assert_eq!(level.obstacles.len(), 2);
    }

    #[test]
    fn test_zero_collectible_probability_falls_back() {
        let settings = ArcadeSettings {
            collectible_probability: 0.0,
            ..Default::default()
        };
        let mut rng = Pcg32::seed_from_u64(3);
        assert_eq!(
            try_generate_maze(&mut rng, &settings, &DEFAULT_PALETTE),
            Err(LevelError::NoCollectibles)
        );
        let level = generate_maze(&mut rng, &settings, &DEFAULT_PALETTE);
        assert_eq!(level.name, "maze-fallback");
    }

    #[test]
    fn test_obstacles_keep_distance_from_spawn() {
        let settings = ArcadeSettings::default();
        let mut rng = Pcg32::seed_from_u64(11);
        let level = generate_maze(&mut rng, &settings, &DEFAULT_PALETTE);
        let spawn = level.spawn_cell();
        for o in &level.obstacles {
            assert!((o.cell() - spawn).abs().element_sum() >= 3);
        }
    }

    #[test]
    fn test_snake_arena_food_avoids_body() {
        let settings = ArcadeSettings::default();
        let mut rng = Pcg32::seed_from_u64(5);
        let level = generate_snake_arena(&mut rng, &settings);
        let spawn = level.spawn_cell();
        let body = initial_snake(spawn, SNAKE_START_LENGTH);
        assert_eq!(level.collectibles.len(), 1);
        let food = level.collectibles[0].cell();
        assert_ne!(food, spawn);
        assert!(!body.contains(&food));
        assert_eq!(level.validate(), Ok(()));
    }

    #[test]
    fn test_place_food_on_full_board() {
        let mut rng = Pcg32::seed_from_u64(0);
        let grid = OccupancyGrid::filled(2, 1, false);
        let occupied = [IVec2::new(0, 0), IVec2::new(1, 0)];
        assert_eq!(place_food(&mut rng, &grid, &occupied), None);
    }

    #[test]
    fn test_initial_snake_extends_left() {
        let tail = initial_snake(IVec2::new(10, 10), 3);
        assert_eq!(
            tail,
            VecDeque::from(vec![IVec2::new(9, 10), IVec2::new(8, 10)])
        );
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(64))]

            #[test]
            fn generated_mazes_reach_a_collectible(seed in 0u64..10_000) {
                let settings = ArcadeSettings::default();
                let mut rng = Pcg32::seed_from_u64(seed);
                let level = generate_maze(&mut rng, &settings, &DEFAULT_PALETTE);
                let grid = level.grid().expect("grid terrain");
                let spawn = level.spawn_cell();

                prop_assert!(grid.is_open(spawn));
                prop_assert!(!level.collectibles.is_empty());
                prop_assert!(level
                    .collectibles
                    .iter()
                    .any(|c| grid.is_reachable(spawn, c.cell())));
                for c in &level.collectibles {
                    prop_assert!(grid.is_reachable(spawn, c.cell()));
                }
            }
        }
    }
}
