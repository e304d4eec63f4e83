//! Axis-aligned bounding boxes for broad-phase queries and bounce normals

use crate::foundation::math::{Mat4, Point3, Vec3};

/// Axis-Aligned Bounding Box with its eight corner points
///
/// `min <= max` holds on every axis; constructors sort their inputs and the
/// corners are recomputed whenever the extents change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    min: Vec3,
    max: Vec3,
    corners: [Vec3; 8],
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::new(Vec3::zeros(), Vec3::zeros())
    }
}

impl BoundingBox {
    /// Create a new box from two opposite corners
    pub fn new(a: Vec3, b: Vec3) -> Self {
        let min = a.inf(&b);
        let max = a.sup(&b);
        Self {
            min,
            max,
            corners: Self::compute_corners(&min, &max),
        }
    }

    /// Create a box centered at a point with given half extents
    pub fn from_center_extents(center: Vec3, half_extents: Vec3) -> Self {
        let half = half_extents.abs();
        Self::new(center - half, center + half)
    }

    /// Smallest box enclosing every point, `None` for an empty iterator
    pub fn enclosing<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Vec3>,
    {
        let mut points = points.into_iter();
        let first = points.next()?;
        let (min, max) = points.fold((first, first), |(min, max), p| (min.inf(&p), max.sup(&p)));
        Some(Self::new(min, max))
    }

    fn compute_corners(min: &Vec3, max: &Vec3) -> [Vec3; 8] {
        // Bit 0 selects x, bit 1 selects y, bit 2 selects z (0 = min, 1 = max)
        std::array::from_fn(|i| {
            Vec3::new(
                if i & 1 == 0 { min.x } else { max.x },
                if i & 2 == 0 { min.y } else { max.y },
                if i & 4 == 0 { min.z } else { max.z },
            )
        })
    }

    /// Minimum corner
    pub fn min(&self) -> Vec3 {
        self.min
    }

    /// Maximum corner
    pub fn max(&self) -> Vec3 {
        self.max
    }

    /// All eight corner points
    pub fn corners(&self) -> &[Vec3; 8] {
        &self.corners
    }

    /// Get the center of the box
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Full size of the box along each axis
    pub fn extent(&self) -> Vec3 {
        self.max - self.min
    }

    /// Smallest box containing both boxes
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox::new(self.min.inf(&other.min), self.max.sup(&other.max))
    }

    /// Check if this box contains a point (bounds inclusive)
    pub fn contains_point(&self, point: &Vec3) -> bool {
        point.x >= self.min.x && point.x <= self.max.x &&
        point.y >= self.min.y && point.y <= self.max.y &&
        point.z >= self.min.z && point.z <= self.max.z
    }

    /// True if every corner of `other` lies inside this box
    pub fn contains_box(&self, other: &BoundingBox) -> bool {
        other.corners.iter().all(|corner| self.contains_point(corner))
    }

    /// Check if this box overlaps another box
    ///
    /// Overlap is strict: boxes that only share a face, edge or corner do
    /// not intersect.
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.min.x < other.max.x && other.min.x < self.max.x &&
        self.min.y < other.max.y && other.min.y < self.max.y &&
        self.min.z < other.max.z && other.min.z < self.max.z
    }

    /// Like [`intersects`](Self::intersects) but touching boxes count
    pub fn touches(&self, other: &BoundingBox) -> bool {
        self.min.x <= other.max.x && other.min.x <= self.max.x &&
        self.min.y <= other.max.y && other.min.y <= self.max.y &&
        self.min.z <= other.max.z && other.min.z <= self.max.z
    }

    /// Outward normal of the face of `self` that `other` has hit
    ///
    /// On each axis the penetration depth is how far `other` would have to
    /// move to leave through the nearer of the two faces:
    /// `min(self.max - other.min, other.max - self.min)`. The axis with the
    /// smallest depth wins, equal depths resolve in axis order x, y, z, and
    /// the normal is that nearer face's. When both faces are equally near
    /// the positive face is returned. For disjoint boxes the separating
    /// axis has negative depth and is picked.
    pub fn calc_refl_normal(&self, other: &BoundingBox) -> Vec3 {
        let through_max = self.max - other.min;
        let through_min = other.max - self.min;

        let depth = |axis: usize| through_max[axis].min(through_min[axis]);
        let mut axis = 0;
        for candidate in 1..3 {
            if depth(candidate) < depth(axis) {
                axis = candidate;
            }
        }

        let mut normal = Vec3::zeros();
        normal[axis] = if through_max[axis] <= through_min[axis] { 1.0 } else { -1.0 };
        normal
    }

    /// This box carried through `matrix` and re-enclosed on the world axes
    pub fn transformed(&self, matrix: &Mat4) -> BoundingBox {
        let mut min = Vec3::repeat(f32::MAX);
        let mut max = Vec3::repeat(f32::MIN);
        for corner in &self.corners {
            let p = matrix.transform_point(&Point3::from(*corner)).coords;
            min = min.inf(&p);
            max = max.sup(&p);
        }
        BoundingBox::new(min, max)
    }

    /// Recompute this box from a model-space box and a new world transform
    pub fn update(&mut self, shape: &BoundingBox, matrix: &Mat4) {
        *self = shape.transformed(matrix);
    }
}
