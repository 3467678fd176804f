//! Axis-aligned geometry for collision tests
//!
//! Everything here is pure and total. Grid games use unit-sized boxes in cell
//! space, the platformer uses pixel-space boxes; the same overlap test serves
//! both.

use glam::{IVec2, Vec2};
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box (top-left origin, +y down)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Aabb {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Aabb {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Unit box covering a grid cell (cell-space coordinates)
    pub fn cell(cell: IVec2) -> Self {
        Self::new(cell.x as f32, cell.y as f32, 1.0, 1.0)
    }

    #[inline]
    pub fn min(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.w, self.h)
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    pub fn center(&self) -> Vec2 {
        self.min() + self.size() * 0.5
    }

    /// Cell holding the top-left corner (meaningful for cell-space boxes)
    pub fn cell_pos(&self) -> IVec2 {
        self.min().floor().as_ivec2()
    }

    pub fn translated(&self, delta: Vec2) -> Self {
        Self::new(self.x + delta.x, self.y + delta.y, self.w, self.h)
    }

    pub fn with_min(&self, min: Vec2) -> Self {
        Self::new(min.x, min.y, self.w, self.h)
    }

    /// Strict horizontal overlap (touching edges do not count)
    #[inline]
    pub fn overlaps_x(&self, other: &Aabb) -> bool {
        self.x < other.right() && self.right() > other.x
    }
}

/// Separating-axis overlap test; touching edges do not intersect
#[inline]
pub fn intersects(a: &Aabb, b: &Aabb) -> bool {
    a.x < b.x + b.w && a.x + a.w > b.x && a.y < b.y + b.h && a.y + a.h > b.y
}

/// Cardinal movement direction on the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Unit step in cell space (+y is down)
    pub fn delta(self) -> IVec2 {
        match self {
            Direction::Up => IVec2::new(0, -1),
            Direction::Down => IVec2::new(0, 1),
            Direction::Left => IVec2::new(-1, 0),
            Direction::Right => IVec2::new(1, 0),
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    /// Horizontal sign for the platformer (-1, 0 or 1)
    pub fn horizontal(self) -> f32 {
        match self {
            Direction::Left => -1.0,
            Direction::Right => 1.0,
            Direction::Up | Direction::Down => 0.0,
        }
    }

    /// Direction from one cell to an orthogonally adjacent cell
    pub fn between(from: IVec2, to: IVec2) -> Option<Self> {
        Self::ALL.into_iter().find(|d| from + d.delta() == to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intersects_overlap_and_touching() {
        let a = Aabb::new(0.0, 0.0, 10.0, 10.0);
        let b = Aabb::new(5.0, 5.0, 10.0, 10.0);
        assert!(intersects(&a, &b));

        // Sharing an edge is not an intersection
        let c = Aabb::new(10.0, 0.0, 10.0, 10.0);
        assert!(!intersects(&a, &c));
    }

    #[test]
    fn test_cells_intersect_only_when_equal() {
        let a = Aabb::cell(IVec2::new(2, 3));
        assert!(intersects(&a, &Aabb::cell(IVec2::new(2, 3))));
        assert!(!intersects(&a, &Aabb::cell(IVec2::new(3, 3))));
        assert!(!intersects(&a, &Aabb::cell(IVec2::new(2, 4))));
    }

    #[test]
    fn test_direction_opposites() {
        for d in Direction::ALL {
            assert_eq!(d.opposite().opposite(), d);
            assert_eq!(d.delta() + d.opposite().delta(), IVec2::ZERO);
        }
    }

    #[test]
    fn test_direction_between() {
        let from = IVec2::new(4, 4);
        assert_eq!(
            Direction::between(from, IVec2::new(4, 3)),
            Some(Direction::Up)
        );
        assert_eq!(Direction::between(from, IVec2::new(6, 4)), None);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn aabb() -> impl Strategy<Value = Aabb> {
            (
                -500.0f32..500.0,
                -500.0f32..500.0,
                0.5f32..200.0,
                0.5f32..200.0,
            )
                .prop_map(|(x, y, w, h)| Aabb::new(x, y, w, h))
        }

        proptest! {
            #[test]
            fn intersects_is_symmetric(a in aabb(), b in aabb()) {
                prop_assert_eq!(intersects(&a, &b), intersects(&b, &a));
            }

            #[test]
            fn intersects_is_reflexive(a in aabb()) {
                prop_assert!(intersects(&a, &a));
            }
        }
    }
}
