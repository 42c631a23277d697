//! View frustum

use crate::bounds::{Box3, Plane, Sphere};
use crate::math::{Matrix4, Vector3};

/// Six planes bounding a camera's visible volume, normals pointing inward.
///
/// Order: left, right, bottom, top, near, far.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Frustum {
    /// The bounding planes, inward-facing.
    pub planes: [Plane; 6],
}

impl Frustum {
    /// Create from six inward-facing planes.
    #[must_use]
    pub const fn new(planes: [Plane; 6]) -> Self {
        Self { planes }
    }

    /// Extract the planes of a combined projection * view matrix using the
    /// Gribb-Hartmann row sums.
    #[must_use]
    pub fn from_projection_matrix(m: &Matrix4) -> Self {
        let e = &m.elements;
        let row = |i: usize| (e[i], e[i + 4], e[i + 8], e[i + 12]);
        let (x0, y0, z0, w0) = row(0);
        let (x1, y1, z1, w1) = row(1);
        let (x2, y2, z2, w2) = row(2);
        let (x3, y3, z3, w3) = row(3);

        Self::new([
            Plane::from_components(x3 + x0, y3 + y0, z3 + z0, w3 + w0).normalize(),
            Plane::from_components(x3 - x0, y3 - y0, z3 - z0, w3 - w0).normalize(),
            Plane::from_components(x3 + x1, y3 + y1, z3 + z1, w3 + w1).normalize(),
            Plane::from_components(x3 - x1, y3 - y1, z3 - z1, w3 - w1).normalize(),
            Plane::from_components(x3 + x2, y3 + y2, z3 + z2, w3 + w2).normalize(),
            Plane::from_components(x3 - x2, y3 - y2, z3 - z2, w3 - w2).normalize(),
        ])
    }

    /// True when `point` is inside every plane.
    #[must_use]
    pub fn contains_point(&self, point: &Vector3) -> bool {
        self.planes
            .iter()
            .all(|p| p.distance_to_point(point) >= 0.0)
    }

    /// True when the sphere is at least partly inside.
    #[must_use]
    pub fn intersects_sphere(&self, sphere: &Sphere) -> bool {
        self.planes
            .iter()
            .all(|p| p.distance_to_point(&sphere.center) >= -sphere.radius)
    }

    /// True when the box is at least partly inside, via the p-vertex test:
    /// only the corner furthest along each plane normal needs checking.
    #[must_use]
    pub fn intersects_box(&self, b: &Box3) -> bool {
        for plane in &self.planes {
            let p = Vector3::new(
                if plane.normal.x >= 0.0 { b.max.x } else { b.min.x },
                if plane.normal.y >= 0.0 { b.max.y } else { b.min.y },
                if plane.normal.z >= 0.0 { b.max.z } else { b.min.z },
            );
            if plane.distance_to_point(&p) < 0.0 {
                return false;
            }
        }
        true
    }
}
