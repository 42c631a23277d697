//! Infinite plane

use crate::bounds::{Box3, Sphere};
use crate::math::Vector3;

/// A plane in constant-normal form: `normal . p + constant = 0`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Plane {
    /// Unit normal (callers keep it normalized; [`Plane::normalize`]
    /// restores the invariant after building from raw components).
    pub normal: Vector3,
    /// Signed offset from the origin along the normal.
    pub constant: f64,
}

impl Default for Plane {
    fn default() -> Self {
        Self::new(Vector3::X, 0.0)
    }
}

impl Plane {
    /// Create from a unit normal and constant.
    #[must_use]
    pub const fn new(normal: Vector3, constant: f64) -> Self {
        Self { normal, constant }
    }

    /// Plane through `point` with the given normal.
    #[must_use]
    pub fn from_normal_and_coplanar_point(normal: Vector3, point: &Vector3) -> Self {
        Self::new(normal, -point.dot(&normal))
    }

    /// Plane through three points, wound counter-clockwise.
    #[must_use]
    pub fn from_coplanar_points(a: &Vector3, b: &Vector3, c: &Vector3) -> Self {
        let normal = (*c - *b).cross(&(*a - *b)).normalize();
        Self::from_normal_and_coplanar_point(normal, a)
    }

    /// Plane from raw `(a, b, c, d)` coefficients, not yet normalized.
    #[must_use]
    pub fn from_components(a: f64, b: f64, c: f64, d: f64) -> Self {
        Self::new(Vector3::new(a, b, c), d)
    }

    /// Rescale so the normal has unit length.
    #[must_use]
    pub fn normalize(&self) -> Self {
        let inv_len = 1.0 / self.normal.length();
        Self::new(self.normal * inv_len, self.constant * inv_len)
    }

    /// Signed distance to a point (positive on the normal side).
    #[must_use]
    pub fn distance_to_point(&self, point: &Vector3) -> f64 {
        self.normal.dot(point) + self.constant
    }

    /// Signed distance to a sphere's surface.
    #[must_use]
    pub fn distance_to_sphere(&self, sphere: &Sphere) -> f64 {
        self.distance_to_point(&sphere.center) - sphere.radius
    }

    /// Orthogonal projection of `point` onto the plane.
    #[must_use]
    pub fn project_point(&self, point: &Vector3) -> Vector3 {
        *point - self.normal * self.distance_to_point(point)
    }

    /// True when the sphere reaches the plane.
    #[must_use]
    pub fn intersects_sphere(&self, sphere: &Sphere) -> bool {
        self.distance_to_point(&sphere.center).abs() <= sphere.radius
    }

    /// True when the box straddles or touches the plane.
    #[must_use]
    pub fn intersects_box(&self, b: &Box3) -> bool {
        // Corner furthest against the normal vs. corner furthest along it.
        let p_min = Vector3::new(
            if self.normal.x >= 0.0 { b.min.x } else { b.max.x },
            if self.normal.y >= 0.0 { b.min.y } else { b.max.y },
            if self.normal.z >= 0.0 { b.min.z } else { b.max.z },
        );
        let p_max = Vector3::new(
            if self.normal.x >= 0.0 { b.max.x } else { b.min.x },
            if self.normal.y >= 0.0 { b.max.y } else { b.min.y },
            if self.normal.z >= 0.0 { b.max.z } else { b.min.z },
        );
        self.distance_to_point(&p_min) <= 0.0 && self.distance_to_point(&p_max) >= 0.0
    }
}
