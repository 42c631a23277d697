//! Axis-aligned bounding box

use crate::bounds::Sphere;
use crate::math::{Matrix4, Vector3};

/// An axis-aligned box given by its minimum and maximum corners.
///
/// The empty box has `min = +inf` and `max = -inf` componentwise, so
/// expanding an empty box by a point yields the degenerate box at that
/// point and every containment test on it is false.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Box3 {
    /// Minimum corner
    pub min: Vector3,
    /// Maximum corner
    pub max: Vector3,
}

impl Default for Box3 {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl Box3 {
    /// The empty box.
    pub const EMPTY: Self = Self {
        min: Vector3::splat(f64::INFINITY),
        max: Vector3::splat(f64::NEG_INFINITY),
    };

    /// Create from corners.
    #[must_use]
    pub const fn new(min: Vector3, max: Vector3) -> Self {
        Self { min, max }
    }

    /// Smallest box covering all `points`.
    #[must_use]
    pub fn from_points(points: &[Vector3]) -> Self {
        let mut b = Self::EMPTY;
        for p in points {
            b.expand_by_point(p);
        }
        b
    }

    /// Box centered at `center` with the given half-size per axis.
    #[must_use]
    pub fn from_center_and_extents(center: Vector3, extents: Vector3) -> Self {
        Self::new(center - extents, center + extents)
    }

    /// True when `max < min` on any axis.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.max.x < self.min.x || self.max.y < self.min.y || self.max.z < self.min.z
    }

    /// Grow to cover `point`.
    pub fn expand_by_point(&mut self, point: &Vector3) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    /// Grow by `amount` on every side.
    pub fn expand_by_scalar(&mut self, amount: f64) {
        self.min -= Vector3::splat(amount);
        self.max += Vector3::splat(amount);
    }

    /// Center point. The empty box reports the origin.
    #[must_use]
    pub fn center(&self) -> Vector3 {
        if self.is_empty() {
            Vector3::ZERO
        } else {
            (self.min + self.max) * 0.5
        }
    }

    /// Edge lengths. The empty box reports zero.
    #[must_use]
    pub fn size(&self) -> Vector3 {
        if self.is_empty() {
            Vector3::ZERO
        } else {
            self.max - self.min
        }
    }

    /// True when `point` is inside or on the box.
    #[must_use]
    pub fn contains_point(&self, point: &Vector3) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
            && point.z >= self.min.z
            && point.z <= self.max.z
    }

    /// True when `other` lies entirely inside this box.
    #[must_use]
    pub fn contains_box(&self, other: &Self) -> bool {
        self.min.x <= other.min.x
            && other.max.x <= self.max.x
            && self.min.y <= other.min.y
            && other.max.y <= self.max.y
            && self.min.z <= other.min.z
            && other.max.z <= self.max.z
    }

    /// True when the boxes overlap (touching counts).
    #[must_use]
    pub fn intersects_box(&self, other: &Self) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }

    /// True when the box overlaps a sphere, via the closest-point test.
    #[must_use]
    pub fn intersects_sphere(&self, sphere: &Sphere) -> bool {
        let closest = self.clamp_point(&sphere.center);
        closest.distance_squared_to(&sphere.center) <= sphere.radius * sphere.radius
    }

    /// `point` clamped into the box.
    #[must_use]
    pub fn clamp_point(&self, point: &Vector3) -> Vector3 {
        point.clamp(&self.min, &self.max)
    }

    /// Distance from `point` to the box surface; zero inside.
    #[must_use]
    pub fn distance_to_point(&self, point: &Vector3) -> f64 {
        self.clamp_point(point).distance_to(point)
    }

    /// Smallest box covering both boxes.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self::new(self.min.min(&other.min), self.max.max(&other.max))
    }

    /// Translate both corners.
    #[must_use]
    pub fn translate(&self, offset: &Vector3) -> Self {
        Self::new(self.min + *offset, self.max + *offset)
    }

    /// Axis-aligned box covering this box transformed by `m`, built by
    /// transforming all eight corners. Empty boxes stay empty.
    #[must_use]
    pub fn apply_matrix4(&self, m: &Matrix4) -> Self {
        if self.is_empty() {
            return *self;
        }
        let mut out = Self::EMPTY;
        for &x in &[self.min.x, self.max.x] {
            for &y in &[self.min.y, self.max.y] {
                for &z in &[self.min.z, self.max.z] {
                    out.expand_by_point(&Vector3::new(x, y, z).apply_matrix4(m));
                }
            }
        }
        out
    }
}
