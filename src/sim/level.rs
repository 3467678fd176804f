//! Static description of a playable area
//!
//! A level is produced once per session (or per "next level") and is then
//! immutable apart from collectible `collected` flags.

use glam::{IVec2, Vec2};
use serde::{Deserialize, Serialize};

use super::entity::Entity;
use super::geometry::Aabb;
use super::grid::OccupancyGrid;
use super::platforms;
use crate::error::LevelError;

/// Solid geometry of a level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Terrain {
    /// Wall map for the grid games (cell space)
    Grid(OccupancyGrid),
    /// One-way platforms for the platformer (pixel space)
    Platforms(Vec<Aabb>),
}

/// Win condition of a level
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Goal {
    /// Every collectible picked up
    CollectAll,
    /// Player's x reaches this coordinate
    ReachX(f32),
    /// No free cell left to place food on
    FillBoard,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level {
    pub name: String,
    pub terrain: Terrain,
    pub collectibles: Vec<Entity>,
    /// Enemy/obstacle spawn templates, copied into the live state
    pub obstacles: Vec<Entity>,
    pub goal: Goal,
    /// Player spawn (top-left, in the level's coordinate space)
    pub spawn: Vec2,
    pub bounds: Aabb,
}

impl Level {
    pub fn grid(&self) -> Option<&OccupancyGrid> {
        match &self.terrain {
            Terrain::Grid(grid) => Some(grid),
            Terrain::Platforms(_) => None,
        }
    }

    pub fn platforms(&self) -> &[Aabb] {
        match &self.terrain {
            Terrain::Platforms(platforms) => platforms,
            Terrain::Grid(_) => &[],
        }
    }

    pub fn spawn_cell(&self) -> IVec2 {
        self.spawn.floor().as_ivec2()
    }

    pub fn remaining_collectibles(&self) -> usize {
        self.collectibles.iter().filter(|c| !c.is_collected()).count()
    }

    /// Check the structural invariants a playable level must hold
    pub fn validate(&self) -> Result<(), LevelError> {
        match &self.terrain {
            Terrain::Grid(grid) => self.validate_grid(grid),
            Terrain::Platforms(_) => platforms::validate(self),
        }
    }

    fn validate_grid(&self, grid: &OccupancyGrid) -> Result<(), LevelError> {
        let spawn = self.spawn_cell();
        if grid.is_wall(spawn) {
            return Err(LevelError::SpawnBlocked {
                x: spawn.x as f32,
                y: spawn.y as f32,
            });
        }

        for obstacle in &self.obstacles {
            if grid.is_wall(obstacle.cell()) {
                return Err(LevelError::ObstacleInWall { id: obstacle.id });
            }
            if obstacle.cell() == spawn {
                return Err(LevelError::SpawnOccupied { id: obstacle.id });
            }
        }

        if self.goal == Goal::FillBoard {
            return Ok(());
        }
        if self.collectibles.is_empty() {
            return Err(LevelError::NoCollectibles);
        }

        let reachable = grid.reachable_set(spawn);
        if !self
            .collectibles
            .iter()
            .any(|c| reachable.contains(c.cell()))
        {
            return Err(LevelError::NoReachableCollectible);
        }
        if self.goal == Goal::CollectAll {
            if let Some(c) = self
                .collectibles
                .iter()
                .find(|c| !reachable.contains(c.cell()))
            {
                return Err(LevelError::UnreachableCollectible { id: c.id });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny_maze(collectible_at: IVec2) -> Level {
        let grid = OccupancyGrid::from_rows(&[
            "#####", //
            "#...#", //
            "###.#", //
            "#...#", //
            "#####",
        ]);
        Level {
            name: "tiny".into(),
            bounds: Aabb::new(0.0, 0.0, grid.width as f32, grid.height as f32),
            terrain: Terrain::Grid(grid),
            collectibles: vec![Entity::collectible(
                1,
                Aabb::cell(collectible_at),
                10,
                false,
            )],
            obstacles: vec![],
            goal: Goal::CollectAll,
            spawn: Vec2::new(1.0, 1.0),
        }
    }

    #[test]
    fn test_valid_grid_level() {
        assert_eq!(tiny_maze(IVec2::new(1, 3)).validate(), Ok(()));
    }

    #[test]
    fn test_collectible_in_wall_is_unreachable() {
        let level = tiny_maze(IVec2::new(1, 2));
        assert_eq!(level.validate(), Err(LevelError::NoReachableCollectible));
    }

    #[test]
    fn test_spawn_in_wall_rejected() {
        let mut level = tiny_maze(IVec2::new(1, 3));
        level.spawn = Vec2::ZERO;
        assert!(matches!(
            level.validate(),
            Err(LevelError::SpawnBlocked { .. })
        ));
    }

    #[test]
    fn test_empty_level_rejected() {
        let mut level = tiny_maze(IVec2::new(1, 3));
        level.collectibles.clear();
        assert_eq!(level.validate(), Err(LevelError::NoCollectibles));
    }
}
