//! Integer voxel positions and face directions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the six axis-aligned faces of a voxel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Face {
    /// Negative Y.
    Down,
    /// Positive Y.
    Up,
    /// Negative Z.
    North,
    /// Positive Z.
    South,
    /// Negative X.
    West,
    /// Positive X.
    East,
}

impl Face {
    /// All faces in a fixed order (down, up, north, south, west, east).
    pub const ALL: [Face; 6] = [
        Face::Down,
        Face::Up,
        Face::North,
        Face::South,
        Face::West,
        Face::East,
    ];

    /// Unit offset for this face.
    pub const fn delta(self) -> (i32, i32, i32) {
        match self {
            Face::Down => (0, -1, 0),
            Face::Up => (0, 1, 0),
            Face::North => (0, 0, -1),
            Face::South => (0, 0, 1),
            Face::West => (-1, 0, 0),
            Face::East => (1, 0, 0),
        }
    }
}

/// Absolute voxel coordinate.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct BlockPos {
    /// X coordinate.
    pub x: i32,
    /// Y coordinate.
    pub y: i32,
    /// Z coordinate.
    pub z: i32,
}

impl BlockPos {
    /// Construct a position.
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Voxel containing the given world-space point.
    pub fn from_world(x: f64, y: f64, z: f64) -> Self {
        Self::new(x.floor() as i32, y.floor() as i32, z.floor() as i32)
    }

    /// Translate by the given deltas.
    pub const fn add(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.z + dz)
    }

    /// Adjacent position across `face`.
    pub const fn offset(self, face: Face) -> Self {
        let (dx, dy, dz) = face.delta();
        self.add(dx, dy, dz)
    }

    /// The six face neighbours, in [`Face::ALL`] order.
    pub fn neighbors(self) -> [BlockPos; 6] {
        Face::ALL.map(|face| self.offset(face))
    }

    /// Manhattan (taxicab) distance between two positions.
    pub fn manhattan_distance(self, other: BlockPos) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y) + self.z.abs_diff(other.z)
    }
}

impl fmt::Display for BlockPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_world_floors_negative_coordinates() {
        assert_eq!(
            BlockPos::from_world(-0.5, 64.9, 3.0),
            BlockPos::new(-1, 64, 3)
        );
    }

    #[test]
    fn neighbors_are_at_distance_one() {
        let center = BlockPos::new(4, 70, -2);
        let neighbors = center.neighbors();
        assert_eq!(neighbors[0], BlockPos::new(4, 69, -2));
        for neighbor in neighbors {
            assert_eq!(center.manhattan_distance(neighbor), 1);
        }
    }

    #[test]
    fn manhattan_distance_sums_axes() {
        let a = BlockPos::new(1, 2, 3);
        let b = BlockPos::new(-2, 4, 3);
        assert_eq!(a.manhattan_distance(b), 5);
        assert_eq!(b.manhattan_distance(a), 5);
    }

    #[test]
    fn display_formats_triple() {
        assert_eq!(BlockPos::new(5, -3, 0).to_string(), "(5, -3, 0)");
    }
}
