//! 4D vector type

use std::ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub, SubAssign};

use approx::{AbsDiffEq, RelativeEq};

use crate::error::Error;
use crate::math::Matrix4;

/// A 4-component vector of `f64`, the homogeneous companion to
/// [`Vector3`](crate::math::Vector3).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vector4 {
    /// X component
    pub x: f64,
    /// Y component
    pub y: f64,
    /// Z component
    pub z: f64,
    /// W component
    pub w: f64,
}

impl Default for Vector4 {
    fn default() -> Self {
        Self::new(0.0, 0.0, 0.0, 1.0)
    }
}

impl Vector4 {
    /// Create a vector from components.
    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64, w: f64) -> Self {
        Self { x, y, z, w }
    }

    /// Dot product.
    #[must_use]
    pub fn dot(&self, other: &Self) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z + self.w * other.w
    }

    /// Euclidean length.
    #[must_use]
    pub fn length(&self) -> f64 {
        self.length_squared().sqrt()
    }

    /// Squared length.
    #[must_use]
    pub fn length_squared(&self) -> f64 {
        self.dot(self)
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

    /// Linear interpolation toward `other` by factor `t`.
    #[must_use]
    pub fn lerp(&self, other: &Self, t: f64) -> Self {
        Self::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
            self.z + (other.z - self.z) * t,
            self.w + (other.w - self.w) * t,
        )
    }

    /// Apply a 4x4 matrix without any divide.
    #[must_use]
    pub fn apply_matrix4(&self, m: &Matrix4) -> Self {
        let e = &m.elements;
        Self::new(
            e[0] * self.x + e[4] * self.y + e[8] * self.z + e[12] * self.w,
            e[1] * self.x + e[5] * self.y + e[9] * self.z + e[13] * self.w,
            e[2] * self.x + e[6] * self.y + e[10] * self.z + e[14] * self.w,
            e[3] * self.x + e[7] * self.y + e[11] * self.z + e[15] * self.w,
        )
    }

    /// Component by index (0 = x, 1 = y, 2 = z, 3 = w).
    ///
    /// # Errors
    /// [`Error::ComponentOutOfRange`] for indices past 3.
    pub fn component(&self, index: usize) -> Result<f64, Error> {
        match index {
            0 => Ok(self.x),
            1 => Ok(self.y),
            2 => Ok(self.z),
            3 => Ok(self.w),
            _ => Err(Error::ComponentOutOfRange {
                index,
                dimensions: 4,
            }),
        }
    }

    /// Set a component by index (0 = x, 1 = y, 2 = z, 3 = w).
    ///
    /// # Errors
    /// [`Error::ComponentOutOfRange`] for indices past 3.
    pub fn set_component(&mut self, index: usize, value: f64) -> Result<(), Error> {
        match index {
            0 => self.x = value,
            1 => self.y = value,
            2 => self.z = value,
            3 => self.w = value,
            _ => {
                return Err(Error::ComponentOutOfRange {
                    index,
                    dimensions: 4,
                })
            }
        }
        Ok(())
    }
}

impl Add for Vector4 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(
            self.x + rhs.x,
            self.y + rhs.y,
            self.z + rhs.z,
            self.w + rhs.w,
        )
    }
}

impl AddAssign for Vector4 {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for Vector4 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(
            self.x - rhs.x,
            self.y - rhs.y,
            self.z - rhs.z,
            self.w - rhs.w,
        )
    }
}

impl SubAssign for Vector4 {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl Mul<f64> for Vector4 {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs, self.w * rhs)
    }
}

impl MulAssign<f64> for Vector4 {
    fn mul_assign(&mut self, rhs: f64) {
        *self = *self * rhs;
    }
}

impl Neg for Vector4 {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z, -self.w)
    }
}

impl AbsDiffEq for Vector4 {
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

impl RelativeEq for Vector4 {
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
