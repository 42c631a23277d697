//! Bounding sphere

use crate::bounds::Box3;
use crate::math::{Matrix4, Vector3};

/// A sphere given by center and radius.
///
/// The empty sphere is encoded with a negative radius, mirroring the empty
/// [`Box3`] convention.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Sphere {
    /// Center point
    pub center: Vector3,
    /// Radius; negative marks the empty sphere
    pub radius: f64,
}

impl Default for Sphere {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl Sphere {
    /// The empty sphere.
    pub const EMPTY: Self = Self {
        center: Vector3::ZERO,
        radius: -1.0,
    };

    /// Create from center and radius.
    #[must_use]
    pub const fn new(center: Vector3, radius: f64) -> Self {
        Self { center, radius }
    }

    /// Smallest sphere around `center` covering all `points`. With no
    /// points the result is the empty sphere at `center`.
    #[must_use]
    pub fn from_points(points: &[Vector3], center: Option<Vector3>) -> Self {
        let center = center.unwrap_or_else(|| Box3::from_points(points).center());
        let mut radius_sq: f64 = 0.0;
        for p in points {
            radius_sq = radius_sq.max(center.distance_squared_to(p));
        }
        if points.is_empty() {
            Self::new(center, -1.0)
        } else {
            Self::new(center, radius_sq.sqrt())
        }
    }

    /// True when the sphere contains no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.radius < 0.0
    }

    /// True when `point` lies inside or on the sphere.
    #[must_use]
    pub fn contains_point(&self, point: &Vector3) -> bool {
        point.distance_squared_to(&self.center) <= self.radius * self.radius
    }

    /// Signed distance from `point` to the surface (negative inside).
    #[must_use]
    pub fn distance_to_point(&self, point: &Vector3) -> f64 {
        point.distance_to(&self.center) - self.radius
    }

    /// True when the two spheres overlap.
    #[must_use]
    pub fn intersects_sphere(&self, other: &Self) -> bool {
        let radius_sum = self.radius + other.radius;
        self.center.distance_squared_to(&other.center) <= radius_sum * radius_sum
    }

    /// True when the sphere overlaps an axis-aligned box.
    #[must_use]
    pub fn intersects_box(&self, b: &Box3) -> bool {
        b.intersects_sphere(self)
    }

    /// Grow to cover `point`.
    pub fn expand_by_point(&mut self, point: &Vector3) {
        if self.is_empty() {
            self.center = *point;
            self.radius = 0.0;
            return;
        }
        let delta_sq = self.center.distance_squared_to(point);
        if delta_sq > self.radius * self.radius {
            let delta = delta_sq.sqrt();
            let half_way = (delta - self.radius) * 0.5;
            self.center += (*point - self.center) * (half_way / delta);
            self.radius += half_way;
        }
    }

    /// Transform by an affine matrix: the center moves as a point, the
    /// radius scales by the matrix's largest per-axis scale so the result
    /// stays conservative under non-uniform scaling.
    #[must_use]
    pub fn apply_matrix4(&self, m: &Matrix4) -> Self {
        Self::new(
            self.center.apply_matrix4(m),
            self.radius * m.max_scale_on_axis(),
        )
    }

    /// Smallest sphere covering both spheres.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        let mut out = *self;
        let to_other = (other.center - self.center).normalize();
        out.expand_by_point(&(other.center + to_other * other.radius));
        out.expand_by_point(&(other.center - to_other * other.radius));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_contains_point() {
        let s = Sphere::new(Vector3::new(1.0, 0.0, 0.0), 2.0);
        assert!(s.contains_point(&Vector3::new(2.5, 0.0, 0.0)));
        assert!(!s.contains_point(&Vector3::new(3.5, 0.0, 0.0)));
    }

    #[test]
    fn test_apply_matrix4_uses_max_axis_scale() {
        let s = Sphere::new(Vector3::ZERO, 1.0);
        let m = Matrix4::from_scale(&Vector3::new(2.0, 0.5, 1.0));
        let t = s.apply_matrix4(&m);
        assert_relative_eq!(t.radius, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_from_points() {
        let points = [
            Vector3::new(-1.0, 0.0, 0.0),
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(0.0, 1.0, 0.0),
        ];
        let s = Sphere::from_points(&points, None);
        for p in &points {
            assert!(s.contains_point(p));
        }
        assert!(Sphere::from_points(&[], None).is_empty());
    }

    #[test]
    fn test_expand_by_point() {
        let mut s = Sphere::new(Vector3::ZERO, 1.0);
        s.expand_by_point(&Vector3::new(3.0, 0.0, 0.0));
        assert!(s.contains_point(&Vector3::new(3.0, 0.0, 0.0)));
        assert!(s.contains_point(&Vector3::new(-1.0, 0.0, 0.0)));
    }
}
