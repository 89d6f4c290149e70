//! Math type re-exports and bounding boxes.

pub use glam::{DVec3, Vec3};

use std::fmt;

/// 3D bounding box with double precision (Alembic `Box3d`).
#[derive(Clone, Copy, PartialEq)]
pub struct BBox3d {
    pub min: DVec3,
    pub max: DVec3,
}

impl BBox3d {
    /// Empty bounding box (inverted, will expand on first point).
    pub const EMPTY: Self = Self {
        min: DVec3::splat(f64::INFINITY),
        max: DVec3::splat(f64::NEG_INFINITY),
    };

    /// Bounds of a set of single precision points.
    ///
    /// An empty slice yields a zero box, which is what the Alembic writer
    /// stores for meshes without points.
    pub fn from_points(points: &[Vec3]) -> Self {
        if points.is_empty() {
            return Self { min: DVec3::ZERO, max: DVec3::ZERO };
        }
        let mut b = Self::EMPTY;
        for p in points {
            b.expand_by_point(p.as_dvec3());
        }
        b
    }

    /// Check if this box is empty (has no volume).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Expand this box to include a point.
    #[inline]
    pub fn expand_by_point(&mut self, p: DVec3) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    /// Storage layout of `.selfBnds`: min xyz followed by max xyz.
    pub fn to_array(&self) -> [f64; 6] {
        [self.min.x, self.min.y, self.min.z, self.max.x, self.max.y, self.max.z]
    }
}

impl Default for BBox3d {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl fmt::Debug for BBox3d {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BBox3d({:?} - {:?})", self.min, self.max)
    }
}

/// Chrono type - time value (seconds).
pub type Chrono = f64;
