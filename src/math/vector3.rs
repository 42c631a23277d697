//! 3D vector type

use std::ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub, SubAssign};

use approx::{AbsDiffEq, RelativeEq};

use crate::error::Error;
use crate::math::{Matrix3, Matrix4, Quaternion};
use crate::scene::Camera;

/// A 3-component vector of `f64`.
///
/// The workhorse value type: positions, directions, scale factors, and
/// surface points are all `Vector3`. Copy semantics; operators return new
/// values, the `*_mut` methods mutate in place.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vector3 {
    /// X component
    pub x: f64,
    /// Y component
    pub y: f64,
    /// Z component
    pub z: f64,
}

impl Vector3 {
    /// The zero vector.
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);
    /// All components one.
    pub const ONE: Self = Self::new(1.0, 1.0, 1.0);
    /// Unit X axis.
    pub const X: Self = Self::new(1.0, 0.0, 0.0);
    /// Unit Y axis.
    pub const Y: Self = Self::new(0.0, 1.0, 0.0);
    /// Unit Z axis.
    pub const Z: Self = Self::new(0.0, 0.0, 1.0);

    /// Create a vector from components.
    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// All components set to `v`.
    #[must_use]
    pub const fn splat(v: f64) -> Self {
        Self::new(v, v, v)
    }

    /// Dot product.
    #[must_use]
    pub fn dot(&self, other: &Self) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Right-handed cross product.
    #[must_use]
    pub fn cross(&self, other: &Self) -> Self {
        Self::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    /// Euclidean length.
    #[must_use]
    pub fn length(&self) -> f64 {
        self.length_squared().sqrt()
    }

    /// Squared length.
    #[must_use]
    pub fn length_squared(&self) -> f64 {
        self.x * self.x + self.y * self.y + self.z * self.z
    }

    /// Unit-length copy. The zero vector normalizes to itself.
    #[must_use]
    pub fn normalize(&self) -> Self {
        let len = self.length();
        if len > 0.0 {
            *self * (1.0 / len)
        } else {
            *self
        }
    }

    /// Normalize in place.
    pub fn normalize_mut(&mut self) -> &mut Self {
        *self = self.normalize();
        self
    }

    /// Linear interpolation toward `other` by factor `t`.
    #[must_use]
    pub fn lerp(&self, other: &Self, t: f64) -> Self {
        Self::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
            self.z + (other.z - self.z) * t,
        )
    }

    /// Distance to another point.
    #[must_use]
    pub fn distance_to(&self, other: &Self) -> f64 {
        self.distance_squared_to(other).sqrt()
    }

    /// Squared distance to another point.
    #[must_use]
    pub fn distance_squared_to(&self, other: &Self) -> f64 {
        (*self - *other).length_squared()
    }

    /// Componentwise product.
    #[must_use]
    pub fn component_mul(&self, other: &Self) -> Self {
        Self::new(self.x * other.x, self.y * other.y, self.z * other.z)
    }

    /// Componentwise minimum.
    #[must_use]
    pub fn min(&self, other: &Self) -> Self {
        Self::new(
            self.x.min(other.x),
            self.y.min(other.y),
            self.z.min(other.z),
        )
    }

    /// Componentwise maximum.
    #[must_use]
    pub fn max(&self, other: &Self) -> Self {
        Self::new(
            self.x.max(other.x),
            self.y.max(other.y),
            self.z.max(other.z),
        )
    }

    /// Componentwise clamp between `min` and `max`.
    #[must_use]
    pub fn clamp(&self, min: &Self, max: &Self) -> Self {
        self.max(min).min(max)
    }

    /// Component by index (0 = x, 1 = y, 2 = z).
    ///
    /// # Errors
    /// [`Error::ComponentOutOfRange`] for indices past 2.
    pub fn component(&self, index: usize) -> Result<f64, Error> {
        match index {
            0 => Ok(self.x),
            1 => Ok(self.y),
            2 => Ok(self.z),
            _ => Err(Error::ComponentOutOfRange {
                index,
                dimensions: 3,
            }),
        }
    }

    /// Set a component by index (0 = x, 1 = y, 2 = z).
    ///
    /// # Errors
    /// [`Error::ComponentOutOfRange`] for indices past 2.
    pub fn set_component(&mut self, index: usize, value: f64) -> Result<(), Error> {
        match index {
            0 => self.x = value,
            1 => self.y = value,
            2 => self.z = value,
            _ => {
                return Err(Error::ComponentOutOfRange {
                    index,
                    dimensions: 3,
                })
            }
        }
        Ok(())
    }

    /// Apply a 3x3 matrix.
    #[must_use]
    pub fn apply_matrix3(&self, m: &Matrix3) -> Self {
        let e = &m.elements;
        Self::new(
            e[0] * self.x + e[3] * self.y + e[6] * self.z,
            e[1] * self.x + e[4] * self.y + e[7] * self.z,
            e[2] * self.x + e[5] * self.y + e[8] * self.z,
        )
    }

    /// Apply a 4x4 matrix as a point, including the perspective divide.
    ///
    /// For affine matrices the divide is by 1 and has no effect; for
    /// projection matrices this performs the full homogeneous projection.
    #[must_use]
    pub fn apply_matrix4(&self, m: &Matrix4) -> Self {
        let e = &m.elements;
        let w = e[3] * self.x + e[7] * self.y + e[11] * self.z + e[15];
        let inv_w = if w != 0.0 { 1.0 / w } else { 1.0 };
        Self::new(
            (e[0] * self.x + e[4] * self.y + e[8] * self.z + e[12]) * inv_w,
            (e[1] * self.x + e[5] * self.y + e[9] * self.z + e[13]) * inv_w,
            (e[2] * self.x + e[6] * self.y + e[10] * self.z + e[14]) * inv_w,
        )
    }

    /// Apply only the rotational part of a 4x4 matrix (the upper 3x3 block)
    /// and renormalize. Suitable for transforming directions.
    #[must_use]
    pub fn transform_direction(&self, m: &Matrix4) -> Self {
        let e = &m.elements;
        Self::new(
            e[0] * self.x + e[4] * self.y + e[8] * self.z,
            e[1] * self.x + e[5] * self.y + e[9] * self.z,
            e[2] * self.x + e[6] * self.y + e[10] * self.z,
        )
        .normalize()
    }

    /// Carry this point from normalized device coordinates (clip-space
    /// depth in `z`) back into world space through the camera's inverse
    /// projection and world placement.
    #[must_use]
    pub fn unproject(&self, camera: &Camera) -> Self {
        camera.unproject_point(self)
    }

    /// Rotate by a quaternion: `q * v * q^-1` in vector form.
    #[must_use]
    pub fn apply_quaternion(&self, q: &Quaternion) -> Self {
        // t = 2 (q.xyz x v); v' = v + q.w t + q.xyz x t
        let qv = Self::new(q.x, q.y, q.z);
        let t = qv.cross(self) * 2.0;
        *self + t * q.w + qv.cross(&t)
    }

    /// Translation column of a 4x4 matrix.
    #[must_use]
    pub fn from_matrix_position(m: &Matrix4) -> Self {
        Self::new(m.elements[12], m.elements[13], m.elements[14])
    }

    /// A basis column of a 4x4 matrix (0 = x axis, 1 = y axis, 2 = z axis).
    ///
    /// # Errors
    /// [`Error::ComponentOutOfRange`] for columns past 2.
    pub fn from_matrix_column(m: &Matrix4, column: usize) -> Result<Self, Error> {
        if column > 2 {
            return Err(Error::ComponentOutOfRange {
                index: column,
                dimensions: 3,
            });
        }
        let base = column * 4;
        Ok(Self::new(
            m.elements[base],
            m.elements[base + 1],
            m.elements[base + 2],
        ))
    }
}

impl Add for Vector3 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl AddAssign for Vector3 {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
        self.z += rhs.z;
    }
}

impl Sub for Vector3 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl SubAssign for Vector3 {
    fn sub_assign(&mut self, rhs: Self) {
        self.x -= rhs.x;
        self.y -= rhs.y;
        self.z -= rhs.z;
    }
}

impl Mul<f64> for Vector3 {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl MulAssign<f64> for Vector3 {
    fn mul_assign(&mut self, rhs: f64) {
        self.x *= rhs;
        self.y *= rhs;
        self.z *= rhs;
    }
}

impl Neg for Vector3 {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }
}

impl AbsDiffEq for Vector3 {
    type Epsilon = f64;

    fn default_epsilon() -> f64 {
        f64::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: f64) -> bool {
        self.x.abs_diff_eq(&other.x, epsilon)
            && self.y.abs_diff_eq(&other.y, epsilon)
            && self.z.abs_diff_eq(&other.z, epsilon)
    }
}

impl RelativeEq for Vector3 {
    fn default_max_relative() -> f64 {
        f64::default_max_relative()
    }

    fn relative_eq(&self, other: &Self, epsilon: f64, max_relative: f64) -> bool {
        self.x.relative_eq(&other.x, epsilon, max_relative)
            && self.y.relative_eq(&other.y, epsilon, max_relative)
            && self.z.relative_eq(&other.z, epsilon, max_relative)
    }
}
