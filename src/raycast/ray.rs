//! Parametric ray and primitive intersection tests

use crate::bounds::{Box3, Plane, Sphere};
use crate::math::{Matrix4, Vector3};

/// Which triangle faces a cast may hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Side {
    /// Only counter-clockwise (front) faces.
    #[default]
    Front,
    /// Only clockwise (back) faces.
    Back,
    /// Both windings.
    Double,
}

/// A ray: `origin + t * direction` for `t >= 0`.
///
/// `direction` is expected to be unit length; the distance-flavoured
/// queries (`distance_to_point`, `intersect_sphere`, ...) return values in
/// multiples of it.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Ray {
    /// Start point.
    pub origin: Vector3,
    /// Travel direction, unit length.
    pub direction: Vector3,
}

impl Ray {
    /// Ray from an origin along a direction. The direction is normalized;
    /// a zero direction is kept as-is.
    #[must_use]
    pub fn new(origin: Vector3, direction: Vector3) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    /// The point at parameter `t`.
    #[must_use]
    pub fn at(&self, t: f64) -> Vector3 {
        self.origin + self.direction * t
    }

    /// Move the origin forward along the ray to parameter `t`.
    pub fn recast(&mut self, t: f64) {
        self.origin = self.at(t);
    }

    /// The point on the ray closest to `point`. Points behind the origin
    /// clamp to the origin.
    #[must_use]
    pub fn closest_point_to_point(&self, point: &Vector3) -> Vector3 {
        let along = (*point - self.origin).dot(&self.direction);
        if along < 0.0 {
            self.origin
        } else {
            self.at(along)
        }
    }

    /// Squared distance from the ray to `point`.
    #[must_use]
    pub fn distance_sq_to_point(&self, point: &Vector3) -> f64 {
        let along = (*point - self.origin).dot(&self.direction);
        if along < 0.0 {
            return self.origin.distance_squared_to(point);
        }
        self.at(along).distance_squared_to(point)
    }

    /// Distance from the ray to `point`.
    #[must_use]
    pub fn distance_to_point(&self, point: &Vector3) -> f64 {
        self.distance_sq_to_point(point).sqrt()
    }

    /// Squared distance between the ray and the segment `v0..v1`, plus the
    /// closest points on each.
    ///
    /// Closest-approach between a half-line and a segment: minimize the
    /// quadratic in (ray parameter `s0`, segment parameter `s1`) over the
    /// region `s0 >= 0`, `|s1| <= half length`, clamping to the region edge
    /// the unconstrained minimum falls outside of.
    #[must_use]
    pub fn distance_sq_to_segment(&self, v0: &Vector3, v1: &Vector3) -> (f64, Vector3, Vector3) {
        let seg_center = (*v0 + *v1) * 0.5;
        let seg_dir = (*v1 - *v0).normalize();
        let seg_extent = v0.distance_to(v1) * 0.5;

        let diff = self.origin - seg_center;
        let a01 = -self.direction.dot(&seg_dir);
        let b0 = diff.dot(&self.direction);
        let b1 = -diff.dot(&seg_dir);
        let c = diff.length_squared();
        let det = (1.0 - a01 * a01).abs();

        let s0;
        let s1;
        let sq_dist;
        if det > 0.0 {
            // Ray and segment are not parallel.
            let mut t0 = a01 * b1 - b0;
            let mut t1 = a01 * b0 - b1;
            let ext_det = seg_extent * det;
            if t0 >= 0.0 {
                if t1 >= -ext_det {
                    if t1 <= ext_det {
                        // Interior minimum.
                        let inv_det = 1.0 / det;
                        t0 *= inv_det;
                        t1 *= inv_det;
                        sq_dist = t0 * (t0 + a01 * t1 + 2.0 * b0)
                            + t1 * (a01 * t0 + t1 + 2.0 * b1)
                            + c;
                    } else {
                        t1 = seg_extent;
                        t0 = (-(a01 * t1 + b0)).max(0.0);
                        sq_dist = -t0 * t0 + t1 * (t1 + 2.0 * b1) + c;
                    }
                } else {
                    t1 = -seg_extent;
                    t0 = (-(a01 * t1 + b0)).max(0.0);
                    sq_dist = -t0 * t0 + t1 * (t1 + 2.0 * b1) + c;
                }
            } else if t1 <= -ext_det {
                t0 = (-(-a01 * seg_extent + b0)).max(0.0);
                t1 = if t0 > 0.0 {
                    -seg_extent
                } else {
                    (-b1).clamp(-seg_extent, seg_extent)
                };
                sq_dist = -t0 * t0 + t1 * (t1 + 2.0 * b1) + c;
            } else if t1 <= ext_det {
                t0 = 0.0;
                t1 = (-b1).clamp(-seg_extent, seg_extent);
                sq_dist = t1 * (t1 + 2.0 * b1) + c;
            } else {
                t0 = (-(a01 * seg_extent + b0)).max(0.0);
                t1 = if t0 > 0.0 {
                    seg_extent
                } else {
                    (-b1).clamp(-seg_extent, seg_extent)
                };
                sq_dist = -t0 * t0 + t1 * (t1 + 2.0 * b1) + c;
            }
            s0 = t0;
            s1 = t1;
        } else {
            // Parallel: pick the segment end nearer the origin side.
            s1 = if a01 > 0.0 { -seg_extent } else { seg_extent };
            s0 = (-(a01 * s1 + b0)).max(0.0);
            sq_dist = -s0 * s0 + s1 * (s1 + 2.0 * b1) + c;
        }

        let point_on_ray = self.at(s0);
        let point_on_segment = seg_center + seg_dir * s1;
        (sq_dist, point_on_ray, point_on_segment)
    }

    /// Whether the ray touches or enters the sphere.
    #[must_use]
    pub fn intersects_sphere(&self, sphere: &Sphere) -> bool {
        self.distance_sq_to_point(&sphere.center) <= sphere.radius * sphere.radius
    }

    /// Nearest intersection point with the sphere, or `None` when the ray
    /// misses it or the sphere lies entirely behind the origin. An origin
    /// inside the sphere hits the far surface.
    #[must_use]
    pub fn intersect_sphere(&self, sphere: &Sphere) -> Option<Vector3> {
        let to_center = sphere.center - self.origin;
        let tca = to_center.dot(&self.direction);
        let d2 = to_center.length_squared() - tca * tca;
        let radius2 = sphere.radius * sphere.radius;
        if d2 > radius2 {
            return None;
        }

        let thc = (radius2 - d2).sqrt();
        let t0 = tca - thc;
        let t1 = tca + thc;
        if t1 < 0.0 {
            return None;
        }
        if t0 < 0.0 {
            return Some(self.at(t1));
        }
        Some(self.at(t0))
    }

    /// Signed parameter where the ray crosses the plane, or `None` when the
    /// ray is parallel off the plane or the crossing lies behind the origin.
    /// A ray lying in the plane reports `t = 0`.
    #[must_use]
    pub fn distance_to_plane(&self, plane: &Plane) -> Option<f64> {
        let denominator = plane.normal.dot(&self.direction);
        if denominator == 0.0 {
            if plane.distance_to_point(&self.origin) == 0.0 {
                return Some(0.0);
            }
            return None;
        }

        let t = -(self.origin.dot(&plane.normal) + plane.constant) / denominator;
        (t >= 0.0).then_some(t)
    }

    /// Intersection point with the plane, if any.
    #[must_use]
    pub fn intersect_plane(&self, plane: &Plane) -> Option<Vector3> {
        self.distance_to_plane(plane).map(|t| self.at(t))
    }

    /// Entry point into the box via the slab method, or `None` on a miss.
    /// An origin inside the box reports the exit point.
    ///
    /// The comparisons are arranged so that the NaNs produced by
    /// `0 * infinity` (a zero direction component with the origin exactly on
    /// a slab plane) fall through harmlessly instead of poisoning the
    /// interval.
    #[must_use]
    pub fn intersect_box(&self, b: &Box3) -> Option<Vector3> {
        let invdirx = 1.0 / self.direction.x;
        let invdiry = 1.0 / self.direction.y;
        let invdirz = 1.0 / self.direction.z;

        let (mut tmin, mut tmax) = if invdirx >= 0.0 {
            ((b.min.x - self.origin.x) * invdirx, (b.max.x - self.origin.x) * invdirx)
        } else {
            ((b.max.x - self.origin.x) * invdirx, (b.min.x - self.origin.x) * invdirx)
        };

        let (tymin, tymax) = if invdiry >= 0.0 {
            ((b.min.y - self.origin.y) * invdiry, (b.max.y - self.origin.y) * invdiry)
        } else {
            ((b.max.y - self.origin.y) * invdiry, (b.min.y - self.origin.y) * invdiry)
        };

        if tmin > tymax || tymin > tmax {
            return None;
        }
        if tymin > tmin || tmin.is_nan() {
            tmin = tymin;
        }
        if tymax < tmax || tmax.is_nan() {
            tmax = tymax;
        }

        let (tzmin, tzmax) = if invdirz >= 0.0 {
            ((b.min.z - self.origin.z) * invdirz, (b.max.z - self.origin.z) * invdirz)
        } else {
            ((b.max.z - self.origin.z) * invdirz, (b.min.z - self.origin.z) * invdirz)
        };

        if tmin > tzmax || tzmin > tmax {
            return None;
        }
        if tzmin > tmin || tmin.is_nan() {
            tmin = tzmin;
        }
        if tzmax < tmax || tmax.is_nan() {
            tmax = tzmax;
        }

        // Whole interval behind the origin.
        if tmax < 0.0 {
            return None;
        }

        Some(self.at(if tmin >= 0.0 { tmin } else { tmax }))
    }

    /// Whether the ray touches or enters the box.
    #[must_use]
    pub fn intersects_box(&self, b: &Box3) -> bool {
        self.intersect_box(b).is_some()
    }

    /// Intersection point with the triangle `a, b, c`, honoring the winding
    /// filter, or `None` on a miss.
    ///
    /// Signed-volume formulation: the sign of `direction . (edge1 x edge2)`
    /// classifies front against back, and the two scaled barycentric
    /// coordinates plus their sum reject points outside the triangle without
    /// any division until the final parameter.
    #[must_use]
    pub fn intersect_triangle(
        &self,
        a: &Vector3,
        b: &Vector3,
        c: &Vector3,
        side: Side,
    ) -> Option<Vector3> {
        let edge1 = *b - *a;
        let edge2 = *c - *a;
        let normal = edge1.cross(&edge2);

        let mut d_dot_n = self.direction.dot(&normal);
        let sign;
        if d_dot_n > 0.0 {
            // Ray hits the back face.
            if side == Side::Front {
                return None;
            }
            sign = 1.0;
        } else if d_dot_n < 0.0 {
            if side == Side::Back {
                return None;
            }
            sign = -1.0;
            d_dot_n = -d_dot_n;
        } else {
            // Parallel or degenerate triangle.
            return None;
        }

        let diff = self.origin - *a;
        let d_dot_qxe2 = sign * self.direction.dot(&diff.cross(&edge2));
        if d_dot_qxe2 < 0.0 {
            return None;
        }

        let d_dot_e1xq = sign * self.direction.dot(&edge1.cross(&diff));
        if d_dot_e1xq < 0.0 {
            return None;
        }

        if d_dot_qxe2 + d_dot_e1xq > d_dot_n {
            return None;
        }

        // Line meets the triangle plane behind the origin.
        let q_dot_n = -sign * diff.dot(&normal);
        if q_dot_n < 0.0 {
            return None;
        }

        Some(self.at(q_dot_n / d_dot_n))
    }

    /// Transform the ray; the direction is re-normalized, so parameters are
    /// not comparable across the transform.
    #[must_use]
    pub fn apply_matrix4(&self, m: &Matrix4) -> Self {
        Self {
            origin: self.origin.apply_matrix4(m),
            direction: self.direction.transform_direction(m),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit_box() -> Box3 {
        Box3::new(Vector3::splat(-1.0), Vector3::splat(1.0))
    }

    #[test]
    fn test_at_and_recast() {
        let mut ray = Ray::new(Vector3::new(1.0, 0.0, 0.0), Vector3::X);
        assert_relative_eq!(ray.at(2.0), Vector3::new(3.0, 0.0, 0.0));
        ray.recast(2.0);
        assert_relative_eq!(ray.origin, Vector3::new(3.0, 0.0, 0.0));
    }

    #[test]
    fn test_closest_point_clamps_behind_origin() {
        let ray = Ray::new(Vector3::ZERO, Vector3::X);
        let behind = Vector3::new(-3.0, 1.0, 0.0);
        assert_relative_eq!(ray.closest_point_to_point(&behind), Vector3::ZERO);
        assert_relative_eq!(ray.distance_to_point(&behind), behind.length());

        let ahead = Vector3::new(4.0, 2.0, 0.0);
        assert_relative_eq!(
            ray.closest_point_to_point(&ahead),
            Vector3::new(4.0, 0.0, 0.0)
        );
        assert_relative_eq!(ray.distance_to_point(&ahead), 2.0);
    }

    #[test]
    fn test_sphere_hit_and_inside() {
        let ray = Ray::new(Vector3::new(0.0, 0.0, 5.0), Vector3::new(0.0, 0.0, -1.0));
        let sphere = Sphere::new(Vector3::ZERO, 1.0);
        assert!(ray.intersects_sphere(&sphere));
        let hit = ray.intersect_sphere(&sphere).unwrap();
        assert_relative_eq!(hit, Vector3::new(0.0, 0.0, 1.0), epsilon = 1e-12);

        // Inside the sphere: far surface.
        let inside = Ray::new(Vector3::ZERO, Vector3::new(0.0, 0.0, -1.0));
        let hit = inside.intersect_sphere(&sphere).unwrap();
        assert_relative_eq!(hit, Vector3::new(0.0, 0.0, -1.0), epsilon = 1e-12);

        // Entirely behind.
        let behind = Ray::new(Vector3::new(0.0, 0.0, 5.0), Vector3::new(0.0, 0.0, 1.0));
        assert!(behind.intersect_sphere(&sphere).is_none());
    }

    #[test]
    fn test_box_entry_exit_and_miss() {
        let b = unit_box();
        let ray = Ray::new(Vector3::new(0.0, 0.0, 5.0), Vector3::new(0.0, 0.0, -1.0));
        let hit = ray.intersect_box(&b).unwrap();
        assert_relative_eq!(hit, Vector3::new(0.0, 0.0, 1.0), epsilon = 1e-12);

        // Inside: exit point.
        let inside = Ray::new(Vector3::ZERO, Vector3::new(0.0, 0.0, -1.0));
        let hit = inside.intersect_box(&b).unwrap();
        assert_relative_eq!(hit, Vector3::new(0.0, 0.0, -1.0), epsilon = 1e-12);

        // Behind.
        let behind = Ray::new(Vector3::new(0.0, 0.0, 5.0), Vector3::new(0.0, 0.0, 1.0));
        assert!(behind.intersect_box(&b).is_none());

        // Off to the side.
        let miss = Ray::new(Vector3::new(5.0, 0.0, 5.0), Vector3::new(0.0, 0.0, -1.0));
        assert!(miss.intersect_box(&b).is_none());
    }

    #[test]
    fn test_box_axis_aligned_grazing() {
        // Direction has a zero component and the origin sits on the slab
        // plane; the 0 * inf NaN must not reject the hit.
        let b = unit_box();
        let ray = Ray::new(Vector3::new(1.0, 0.0, 5.0), Vector3::new(0.0, 0.0, -1.0));
        assert!(ray.intersects_box(&b));
    }

    #[test]
    fn test_plane_crossing() {
        let plane = Plane::new(Vector3::Z, -1.0); // z = 1
        let ray = Ray::new(Vector3::new(0.0, 0.0, 5.0), Vector3::new(0.0, 0.0, -1.0));
        assert_relative_eq!(ray.distance_to_plane(&plane).unwrap(), 4.0);
        assert_relative_eq!(
            ray.intersect_plane(&plane).unwrap(),
            Vector3::new(0.0, 0.0, 1.0)
        );

        // Parallel off the plane.
        let parallel = Ray::new(Vector3::ZERO, Vector3::X);
        assert!(parallel.distance_to_plane(&plane).is_none());

        // Coplanar.
        let coplanar = Ray::new(Vector3::new(0.0, 0.0, 1.0), Vector3::X);
        assert_eq!(coplanar.distance_to_plane(&plane), Some(0.0));
    }

    #[test]
    fn test_triangle_winding_filter() {
        // CCW when seen from +z.
        let a = Vector3::new(-1.0, -1.0, 0.0);
        let b = Vector3::new(1.0, -1.0, 0.0);
        let c = Vector3::new(0.0, 1.0, 0.0);

        let front = Ray::new(Vector3::new(0.0, 0.0, 5.0), Vector3::new(0.0, 0.0, -1.0));
        let hit = front.intersect_triangle(&a, &b, &c, Side::Front).unwrap();
        assert_relative_eq!(hit, Vector3::ZERO, epsilon = 1e-12);
        assert!(front.intersect_triangle(&a, &b, &c, Side::Back).is_none());

        let back = Ray::new(Vector3::new(0.0, 0.0, -5.0), Vector3::new(0.0, 0.0, 1.0));
        assert!(back.intersect_triangle(&a, &b, &c, Side::Front).is_none());
        assert!(back.intersect_triangle(&a, &b, &c, Side::Back).is_some());
        assert!(back.intersect_triangle(&a, &b, &c, Side::Double).is_some());
    }

    #[test]
    fn test_triangle_edge_rejection() {
        let a = Vector3::new(-1.0, -1.0, 0.0);
        let b = Vector3::new(1.0, -1.0, 0.0);
        let c = Vector3::new(0.0, 1.0, 0.0);

        let outside = Ray::new(Vector3::new(2.0, 2.0, 5.0), Vector3::new(0.0, 0.0, -1.0));
        assert!(outside.intersect_triangle(&a, &b, &c, Side::Double).is_none());

        // Plane crossing behind the origin.
        let behind = Ray::new(Vector3::new(0.0, 0.0, -5.0), Vector3::new(0.0, 0.0, -1.0));
        assert!(behind.intersect_triangle(&a, &b, &c, Side::Double).is_none());

        // Degenerate triangle.
        let ray = Ray::new(Vector3::new(0.0, 0.0, 5.0), Vector3::new(0.0, 0.0, -1.0));
        assert!(ray.intersect_triangle(&a, &a, &a, Side::Double).is_none());
    }

    #[test]
    fn test_segment_distance_cases() {
        let ray = Ray::new(Vector3::ZERO, Vector3::X);

        // Perpendicular segment crossing above the ray.
        let (sq, on_ray, on_seg) = ray.distance_sq_to_segment(
            &Vector3::new(3.0, 1.0, -1.0),
            &Vector3::new(3.0, 1.0, 1.0),
        );
        assert_relative_eq!(sq, 1.0, epsilon = 1e-12);
        assert_relative_eq!(on_ray, Vector3::new(3.0, 0.0, 0.0), epsilon = 1e-12);
        assert_relative_eq!(on_seg, Vector3::new(3.0, 1.0, 0.0), epsilon = 1e-12);

        // Segment entirely behind the origin clamps to the origin.
        let (sq, on_ray, _) = ray.distance_sq_to_segment(
            &Vector3::new(-3.0, 0.0, -1.0),
            &Vector3::new(-3.0, 0.0, 1.0),
        );
        assert_relative_eq!(sq, 9.0, epsilon = 1e-12);
        assert_relative_eq!(on_ray, Vector3::ZERO, epsilon = 1e-12);

        // Parallel segment.
        let (sq, _, _) = ray.distance_sq_to_segment(
            &Vector3::new(1.0, 2.0, 0.0),
            &Vector3::new(4.0, 2.0, 0.0),
        );
        assert_relative_eq!(sq, 4.0, epsilon = 1e-12);
    }

    #[test]
    fn test_apply_matrix4_renormalizes() {
        let ray = Ray::new(Vector3::ZERO, Vector3::X);
        let m = Matrix4::from_translation(&Vector3::new(0.0, 1.0, 0.0))
            * Matrix4::from_scale(&Vector3::splat(3.0));
        let moved = ray.apply_matrix4(&m);
        assert_relative_eq!(moved.origin, Vector3::new(0.0, 1.0, 0.0), epsilon = 1e-12);
        assert_relative_eq!(moved.direction.length(), 1.0, epsilon = 1e-12);
    }
}
