//! Occupancy grid for the grid games
//!
//! A row-major wall map plus the graph queries the generators and tests need.

use std::collections::VecDeque;

use glam::IVec2;
use serde::{Deserialize, Serialize};

use super::geometry::Direction;

/// Row-major wall map (`true` = wall)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OccupancyGrid {
    pub width: i32,
    pub height: i32,
    walls: Vec<bool>,
}

impl OccupancyGrid {
    /// Grid with every cell set to `wall`
    pub fn filled(width: i32, height: i32, wall: bool) -> Self {
        let len = (width.max(0) * height.max(0)) as usize;
        Self {
            width,
            height,
            walls: vec![wall; len],
        }
    }

    /// Parse an ASCII map (`#` = wall, anything else open)
    pub fn from_rows(rows: &[&str]) -> Self {
        let height = rows.len() as i32;
        let width = rows.iter().map(|r| r.len()).max().unwrap_or(0) as i32;
        let mut grid = Self::filled(width, height, true);
        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.chars().enumerate() {
                grid.set_wall(IVec2::new(x as i32, y as i32), ch == '#');
            }
        }
        grid
    }

    #[inline]
    pub fn in_bounds(&self, cell: IVec2) -> bool {
        cell.x >= 0 && cell.y >= 0 && cell.x < self.width && cell.y < self.height
    }

    #[inline]
    fn index(&self, cell: IVec2) -> usize {
        (cell.y * self.width + cell.x) as usize
    }

    /// Out-of-bounds cells count as walls
    pub fn is_wall(&self, cell: IVec2) -> bool {
        !self.in_bounds(cell) || self.walls[self.index(cell)]
    }

    #[inline]
    pub fn is_open(&self, cell: IVec2) -> bool {
        !self.is_wall(cell)
    }

    /// Ignored for out-of-bounds cells
    pub fn set_wall(&mut self, cell: IVec2, wall: bool) {
        if self.in_bounds(cell) {
            let i = self.index(cell);
            self.walls[i] = wall;
        }
    }

    /// Open cells in row-major order
    pub fn open_cells(&self) -> Vec<IVec2> {
        let mut cells = Vec::new();
        for y in 0..self.height {
            for x in 0..self.width {
                let cell = IVec2::new(x, y);
                if self.is_open(cell) {
                    cells.push(cell);
                }
            }
        }
        cells
    }

    pub fn open_neighbors(&self, cell: IVec2) -> impl Iterator<Item = IVec2> + '_ {
        Direction::ALL
            .into_iter()
            .map(move |d| cell + d.delta())
            .filter(|n| self.is_open(*n))
    }

    /// Breadth-first distance map from `start` (`None` = unreachable)
    pub fn distances_from(&self, start: IVec2) -> Vec<Option<u32>> {
        let mut dist = vec![None; self.walls.len()];
        if self.is_wall(start) {
            return dist;
        }
        let mut queue = VecDeque::new();
        dist[self.index(start)] = Some(0);
        queue.push_back(start);

        while let Some(cell) = queue.pop_front() {
            let d = dist[self.index(cell)].unwrap_or(0);
            for next in self.open_neighbors(cell) {
                let i = self.index(next);
                if dist[i].is_none() {
                    dist[i] = Some(d + 1);
                    queue.push_back(next);
                }
            }
        }
        dist
    }

    /// Whether `to` can be reached from `from` through open cells
    pub fn is_reachable(&self, from: IVec2, to: IVec2) -> bool {
        self.in_bounds(to) && self.distances_from(from)[self.index(to)].is_some()
    }

    /// Reachability predicate for many queries against one BFS
    pub fn reachable_set(&self, from: IVec2) -> ReachableSet {
        ReachableSet {
            width: self.width,
            height: self.height,
            dist: self.distances_from(from),
        }
    }

    /// Shortest path of moves from `from` to `to`, if any
    pub fn path(&self, from: IVec2, to: IVec2) -> Option<Vec<Direction>> {
        if !self.in_bounds(from) || !self.in_bounds(to) {
            return None;
        }
        let dist = self.distances_from(to);
        dist[self.index(from)]?;

        // Walk downhill on the distance field from `to`
        let mut moves = Vec::new();
        let mut cell = from;
        while cell != to {
            let here = dist[self.index(cell)]?;
            let next = self
                .open_neighbors(cell)
                .find(|n| dist[self.index(*n)] == Some(here.saturating_sub(1)))?;
            moves.push(Direction::between(cell, next)?);
            cell = next;
        }
        Some(moves)
    }
}

/// Result of one BFS, queryable per cell
#[derive(Debug, Clone)]
pub struct ReachableSet {
    width: i32,
    height: i32,
    dist: Vec<Option<u32>>,
}

impl ReachableSet {
    pub fn contains(&self, cell: IVec2) -> bool {
        cell.x >= 0
            && cell.y >= 0
            && cell.x < self.width
            && cell.y < self.height
            && self.dist[(cell.y * self.width + cell.x) as usize].is_some()
    }

    pub fn distance(&self, cell: IVec2) -> Option<u32> {
        if self.contains(cell) {
            self.dist[(cell.y * self.width + cell.x) as usize]
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> OccupancyGrid {
        OccupancyGrid::from_rows(&[
            "#######", //
            "#..#..#", //
            "#..#..#", //
            "#.....#", //
            "###.###", //
            "#.#...#", //
            "#######",
        ])
    }

    #[test]
    fn test_out_of_bounds_is_wall() {
        let grid = sample();
        assert!(grid.is_wall(IVec2::new(-1, 0)));
        assert!(grid.is_wall(IVec2::new(7, 3)));
        assert!(grid.is_open(IVec2::new(1, 1)));
    }

    #[test]
    fn test_reachability() {
        let grid = sample();
        assert!(grid.is_reachable(IVec2::new(1, 1), IVec2::new(5, 5)));
        // (1,5) is walled in
        assert!(!grid.is_reachable(IVec2::new(1, 1), IVec2::new(1, 5)));
    }

    #[test]
    fn test_path_is_shortest_and_valid() {
        let grid = sample();
        let from = IVec2::new(1, 1);
        let to = IVec2::new(5, 1);
        let path = grid.path(from, to).expect("path exists");
        assert_eq!(path.len() as u32, grid.reachable_set(from).distance(to).unwrap());

        let mut cell = from;
        for d in path {
            cell += d.delta();
            assert!(grid.is_open(cell));
        }
        assert_eq!(cell, to);
    }

    #[test]
    fn test_path_none_when_blocked() {
        let grid = sample();
        assert!(grid.path(IVec2::new(1, 1), IVec2::new(1, 5)).is_none());
        assert_eq!(grid.path(IVec2::new(1, 1), IVec2::new(1, 1)), Some(vec![]));
    }
}
