//! Discrete lattice addressing shared by extraction, the navigation graph and
//! chunk rebasing.

use std::{
    fmt,
    ops::{Add, Mul},
};

use cgmath::Point3;
use serde::{Deserialize, Serialize};

/// A discrete index into a sampling lattice.
///
/// Inside a chunk the components run from -1 (padding) to the resolution; once
/// a chunk graph is merged into the world graph they are rebased by
/// `chunk_coordinate * resolution` and address the global lattice.
///
/// Ordering is lexicographic on (x, y, z), which keeps every map keyed by
/// coordinates iterating in a stable order.
#[derive(
    Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct LatticeCoordinate {
    /// X component
    pub x: i32,
    /// Y component
    pub y: i32,
    /// Z component
    pub z: i32,
}

impl LatticeCoordinate {
    /// Unit step along X.
    pub const X: LatticeCoordinate = LatticeCoordinate::new(1, 0, 0);
    /// Unit step along Y.
    pub const Y: LatticeCoordinate = LatticeCoordinate::new(0, 1, 0);
    /// Unit step along Z.
    pub const Z: LatticeCoordinate = LatticeCoordinate::new(0, 0, 1);

    /// Creates a coordinate from its components.
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Position of this lattice point in chunk-local space, where `resolution`
    /// cells span the unit cube.
    pub fn to_local(self, resolution: u32) -> Point3<f32> {
        let step = 1.0 / resolution as f32;
        Point3::new(
            self.x as f32 * step,
            self.y as f32 * step,
            self.z as f32 * step,
        )
    }
}

impl Add for LatticeCoordinate {
    type Output = LatticeCoordinate;

    fn add(self, rhs: LatticeCoordinate) -> LatticeCoordinate {
        LatticeCoordinate::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Mul<i32> for LatticeCoordinate {
    type Output = LatticeCoordinate;

    fn mul(self, rhs: i32) -> LatticeCoordinate {
        LatticeCoordinate::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl From<Point3<i32>> for LatticeCoordinate {
    fn from(p: Point3<i32>) -> Self {
        LatticeCoordinate::new(p.x, p.y, p.z)
    }
}

impl From<LatticeCoordinate> for Point3<i32> {
    fn from(c: LatticeCoordinate) -> Self {
        Point3::new(c.x, c.y, c.z)
    }
}

impl fmt::Display for LatticeCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}, {}]", self.x, self.y, self.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn rebasing_adds_scaled_chunk_offset() {
        let chunk = LatticeCoordinate::new(1, 0, 2);
        let local = LatticeCoordinate::new(3, 4, 0);
        assert_eq!(local + chunk * 4, LatticeCoordinate::new(7, 4, 8));
    }

    #[test]
    fn to_local_scales_by_resolution() {
        let p = LatticeCoordinate::new(-1, 2, 4).to_local(4);
        assert_eq!(p, Point3::new(-0.25, 0.5, 1.0));
    }

    #[test]
    fn equal_coordinates_hash_together() {
        let set: HashSet<_> = [
            LatticeCoordinate::new(1, 2, 3),
            LatticeCoordinate::X + LatticeCoordinate::new(0, 2, 3),
        ]
        .into_iter()
        .collect();
        assert_eq!(set.len(), 1);
    }
}
