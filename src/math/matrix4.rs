//! Column-major 4x4 transform matrix

use std::ops::Mul;

use approx::{AbsDiffEq, RelativeEq};

use crate::math::{Quaternion, Vector3};

/// A 4x4 matrix of `f64`, stored column-major.
///
/// Element `i` of column `c`, row `r` lives at `elements[c * 4 + r]`. Any
/// matrix built by [`Matrix4::compose`] is affine: `elements[3]`,
/// `elements[7]`, `elements[11]` are zero and `elements[15]` is one.
/// Projection matrices built by [`Matrix4::perspective`] intentionally break
/// that shape.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Matrix4 {
    /// Column-major element storage.
    pub elements: [f64; 16],
}

impl Default for Matrix4 {
    fn default() -> Self {
        Self::identity()
    }
}

impl Matrix4 {
    /// The identity matrix.
    #[must_use]
    pub const fn identity() -> Self {
        Self {
            elements: [
                1.0, 0.0, 0.0, 0.0, //
                0.0, 1.0, 0.0, 0.0, //
                0.0, 0.0, 1.0, 0.0, //
                0.0, 0.0, 0.0, 1.0,
            ],
        }
    }

    /// Build from column-major elements.
    #[must_use]
    pub const fn from_elements(elements: [f64; 16]) -> Self {
        Self { elements }
    }

    /// Translation matrix.
    #[must_use]
    pub fn from_translation(v: &Vector3) -> Self {
        let mut m = Self::identity();
        m.elements[12] = v.x;
        m.elements[13] = v.y;
        m.elements[14] = v.z;
        m
    }

    /// Non-uniform scale matrix.
    #[must_use]
    pub fn from_scale(v: &Vector3) -> Self {
        let mut m = Self::identity();
        m.elements[0] = v.x;
        m.elements[5] = v.y;
        m.elements[10] = v.z;
        m
    }

    /// Rotation about the X axis by `theta` radians.
    #[must_use]
    pub fn from_rotation_x(theta: f64) -> Self {
        let (s, c) = theta.sin_cos();
        Self::from_elements([
            1.0, 0.0, 0.0, 0.0, //
            0.0, c, s, 0.0, //
            0.0, -s, c, 0.0, //
            0.0, 0.0, 0.0, 1.0,
        ])
    }

    /// Rotation about the Y axis by `theta` radians.
    #[must_use]
    pub fn from_rotation_y(theta: f64) -> Self {
        let (s, c) = theta.sin_cos();
        Self::from_elements([
            c, 0.0, -s, 0.0, //
            0.0, 1.0, 0.0, 0.0, //
            s, 0.0, c, 0.0, //
            0.0, 0.0, 0.0, 1.0,
        ])
    }

    /// Rotation about the Z axis by `theta` radians.
    #[must_use]
    pub fn from_rotation_z(theta: f64) -> Self {
        let (s, c) = theta.sin_cos();
        Self::from_elements([
            c, s, 0.0, 0.0, //
            -s, c, 0.0, 0.0, //
            0.0, 0.0, 1.0, 0.0, //
            0.0, 0.0, 0.0, 1.0,
        ])
    }

    /// Rotation about an arbitrary unit axis by `angle` radians.
    #[must_use]
    pub fn from_axis_angle(axis: &Vector3, angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        let t = 1.0 - c;
        let (x, y, z) = (axis.x, axis.y, axis.z);
        let (tx, ty) = (t * x, t * y);
        Self::from_elements([
            tx * x + c,
            tx * y + s * z,
            tx * z - s * y,
            0.0,
            tx * y - s * z,
            ty * y + c,
            ty * z + s * x,
            0.0,
            tx * z + s * y,
            ty * z - s * x,
            t * z * z + c,
            0.0,
            0.0,
            0.0,
            0.0,
            1.0,
        ])
    }

    /// Pure rotation matrix from a unit quaternion.
    #[must_use]
    pub fn from_quaternion(q: &Quaternion) -> Self {
        Self::compose(&Vector3::ZERO, q, &Vector3::ONE)
    }

    /// Canonical TRS composition: upper 3x3 is rotation times per-column
    /// scale, translation column is `position`.
    ///
    /// This is the only sanctioned way to build a node's local matrix.
    #[must_use]
    pub fn compose(position: &Vector3, quaternion: &Quaternion, scale: &Vector3) -> Self {
        let (x, y, z, w) = (quaternion.x, quaternion.y, quaternion.z, quaternion.w);
        let (x2, y2, z2) = (x + x, y + y, z + z);
        let (xx, xy, xz) = (x * x2, x * y2, x * z2);
        let (yy, yz, zz) = (y * y2, y * z2, z * z2);
        let (wx, wy, wz) = (w * x2, w * y2, w * z2);
        let (sx, sy, sz) = (scale.x, scale.y, scale.z);

        Self::from_elements([
            (1.0 - (yy + zz)) * sx,
            (xy + wz) * sx,
            (xz - wy) * sx,
            0.0,
            (xy - wz) * sy,
            (1.0 - (xx + zz)) * sy,
            (yz + wx) * sy,
            0.0,
            (xz + wy) * sz,
            (yz - wx) * sz,
            (1.0 - (xx + yy)) * sz,
            0.0,
            position.x,
            position.y,
            position.z,
            1.0,
        ])
    }

    /// Split an affine TRS matrix back into its components.
    ///
    /// A negative determinant is absorbed by negating the X scale.
    #[must_use]
    pub fn decompose(&self) -> (Vector3, Quaternion, Vector3) {
        let e = &self.elements;
        let mut sx = Vector3::new(e[0], e[1], e[2]).length();
        let sy = Vector3::new(e[4], e[5], e[6]).length();
        let sz = Vector3::new(e[8], e[9], e[10]).length();

        if self.determinant() < 0.0 {
            sx = -sx;
        }

        let position = Vector3::new(e[12], e[13], e[14]);

        let mut rotation = *self;
        let inv_sx = 1.0 / sx;
        let inv_sy = 1.0 / sy;
        let inv_sz = 1.0 / sz;
        rotation.elements[0] *= inv_sx;
        rotation.elements[1] *= inv_sx;
        rotation.elements[2] *= inv_sx;
        rotation.elements[4] *= inv_sy;
        rotation.elements[5] *= inv_sy;
        rotation.elements[6] *= inv_sy;
        rotation.elements[8] *= inv_sz;
        rotation.elements[9] *= inv_sz;
        rotation.elements[10] *= inv_sz;

        let quaternion = Quaternion::from_rotation_matrix(&rotation);
        (position, quaternion, Vector3::new(sx, sy, sz))
    }

    /// Matrix product `self * other`.
    #[must_use]
    pub fn multiply(&self, other: &Self) -> Self {
        let a = &self.elements;
        let b = &other.elements;
        let mut out = [0.0; 16];
        for col in 0..4 {
            for row in 0..4 {
                let mut sum = 0.0;
                for k in 0..4 {
                    sum += a[k * 4 + row] * b[col * 4 + k];
                }
                out[col * 4 + row] = sum;
            }
        }
        Self::from_elements(out)
    }

    /// Matrix product `other * self`.
    #[must_use]
    pub fn premultiply(&self, other: &Self) -> Self {
        other.multiply(self)
    }

    /// Transposed copy.
    #[must_use]
    pub fn transpose(&self) -> Self {
        let e = &self.elements;
        Self::from_elements([
            e[0], e[4], e[8], e[12], //
            e[1], e[5], e[9], e[13], //
            e[2], e[6], e[10], e[14], //
            e[3], e[7], e[11], e[15],
        ])
    }

    /// Determinant via cofactor expansion down the first column.
    #[must_use]
    pub fn determinant(&self) -> f64 {
        let (t11, t12, t13, t14) = self.first_column_cofactors();
        let e = &self.elements;
        e[0] * t11 + e[1] * t12 + e[2] * t13 + e[3] * t14
    }

    /// General inverse via cofactor expansion.
    ///
    /// A zero determinant means the transform is degenerate and cannot be
    /// inverted; the result is the identity matrix and a diagnostic is
    /// logged. Callers must treat that as "proceed with a neutral
    /// transform", not as a meaningful inverse.
    #[must_use]
    pub fn invert(&self) -> Self {
        let e = &self.elements;
        let (n11, n21, n31, n41) = (e[0], e[1], e[2], e[3]);
        let (n12, n22, n32, n42) = (e[4], e[5], e[6], e[7]);
        let (n13, n23, n33, n43) = (e[8], e[9], e[10], e[11]);
        let (n14, n24, n34, n44) = (e[12], e[13], e[14], e[15]);

        let (t11, t12, t13, t14) = self.first_column_cofactors();
        let det = n11 * t11 + n21 * t12 + n31 * t13 + n41 * t14;
        if det == 0.0 {
            log::warn!("Matrix4::invert: determinant is zero, returning identity");
            return Self::identity();
        }
        let det_inv = 1.0 / det;

        Self::from_elements([
            t11 * det_inv,
            (n24 * n33 * n41 - n23 * n34 * n41 - n24 * n31 * n43 + n21 * n34 * n43
                + n23 * n31 * n44
                - n21 * n33 * n44)
                * det_inv,
            (n22 * n34 * n41 - n24 * n32 * n41 + n24 * n31 * n42 - n21 * n34 * n42
                - n22 * n31 * n44
                + n21 * n32 * n44)
                * det_inv,
            (n23 * n32 * n41 - n22 * n33 * n41 - n23 * n31 * n42
                + n21 * n33 * n42
                + n22 * n31 * n43
                - n21 * n32 * n43)
                * det_inv,
            t12 * det_inv,
            (n13 * n34 * n41 - n14 * n33 * n41 + n14 * n31 * n43 - n11 * n34 * n43
                - n13 * n31 * n44
                + n11 * n33 * n44)
                * det_inv,
            (n14 * n32 * n41 - n12 * n34 * n41 - n14 * n31 * n42
                + n11 * n34 * n42
                + n12 * n31 * n44
                - n11 * n32 * n44)
                * det_inv,
            (n12 * n33 * n41 - n13 * n32 * n41 + n13 * n31 * n42 - n11 * n33 * n42
                - n12 * n31 * n43
                + n11 * n32 * n43)
                * det_inv,
            t13 * det_inv,
            (n14 * n23 * n41 - n13 * n24 * n41 - n14 * n21 * n43
                + n11 * n24 * n43
                + n13 * n21 * n44
                - n11 * n23 * n44)
                * det_inv,
            (n12 * n24 * n41 - n14 * n22 * n41 + n14 * n21 * n42 - n11 * n24 * n42
                - n12 * n21 * n44
                + n11 * n22 * n44)
                * det_inv,
            (n13 * n22 * n41 - n12 * n23 * n41 - n13 * n21 * n42
                + n11 * n23 * n42
                + n12 * n21 * n43
                - n11 * n22 * n43)
                * det_inv,
            t14 * det_inv,
            (n13 * n24 * n31 - n14 * n23 * n31 + n14 * n21 * n33 - n11 * n24 * n33
                - n13 * n21 * n34
                + n11 * n23 * n34)
                * det_inv,
            (n14 * n22 * n31 - n12 * n24 * n31 - n14 * n21 * n32
                + n11 * n24 * n32
                + n12 * n21 * n34
                - n11 * n22 * n34)
                * det_inv,
            (n12 * n23 * n31 - n13 * n22 * n31 + n13 * n21 * n32 - n11 * n23 * n32
                - n12 * n21 * n33
                + n11 * n22 * n33)
                * det_inv,
        ])
    }

    /// Rotation-only look matrix: orients -Z toward `target` from `eye`
    /// with the given `up` hint. Translation is left at zero.
    #[must_use]
    pub fn look_at(eye: &Vector3, target: &Vector3, up: &Vector3) -> Self {
        let mut z = *eye - *target;
        if z.length_squared() == 0.0 {
            // eye and target coincide
            z.z = 1.0;
        }
        z.normalize_mut();

        let mut x = up.cross(&z);
        if x.length_squared() == 0.0 {
            // up is parallel to the view direction, nudge and retry
            if up.z.abs() == 1.0 {
                z.x += 1e-4;
            } else {
                z.z += 1e-4;
            }
            z.normalize_mut();
            x = up.cross(&z);
        }
        x.normalize_mut();
        let y = z.cross(&x);

        let mut m = Self::identity();
        m.elements[0] = x.x;
        m.elements[1] = x.y;
        m.elements[2] = x.z;
        m.elements[4] = y.x;
        m.elements[5] = y.y;
        m.elements[6] = y.z;
        m.elements[8] = z.x;
        m.elements[9] = z.y;
        m.elements[10] = z.z;
        m
    }

    /// Right-handed perspective projection with OpenGL clip depth.
    ///
    /// `fov_y` is the vertical field of view in radians. The result is not
    /// affine: the bottom row carries the perspective divide.
    #[must_use]
    pub fn perspective(fov_y: f64, aspect: f64, near: f64, far: f64) -> Self {
        let f = 1.0 / (fov_y * 0.5).tan();
        let mut m = Self::from_elements([0.0; 16]);
        m.elements[0] = f / aspect;
        m.elements[5] = f;
        m.elements[10] = (far + near) / (near - far);
        m.elements[11] = -1.0;
        m.elements[14] = 2.0 * far * near / (near - far);
        m
    }

    /// Right-handed orthographic projection with OpenGL clip depth.
    #[must_use]
    pub fn orthographic(
        left: f64,
        right: f64,
        top: f64,
        bottom: f64,
        near: f64,
        far: f64,
    ) -> Self {
        let w = 1.0 / (right - left);
        let h = 1.0 / (top - bottom);
        let p = 1.0 / (far - near);

        let mut m = Self::identity();
        m.elements[0] = 2.0 * w;
        m.elements[5] = 2.0 * h;
        m.elements[10] = -2.0 * p;
        m.elements[12] = -(right + left) * w;
        m.elements[13] = -(top + bottom) * h;
        m.elements[14] = -(far + near) * p;
        m
    }

    /// Copy of this matrix with scale stripped from its rotational block
    /// and translation cleared.
    #[must_use]
    pub fn extract_rotation(&self) -> Self {
        let e = &self.elements;
        let inv_sx = 1.0 / Vector3::new(e[0], e[1], e[2]).length();
        let inv_sy = 1.0 / Vector3::new(e[4], e[5], e[6]).length();
        let inv_sz = 1.0 / Vector3::new(e[8], e[9], e[10]).length();

        Self::from_elements([
            e[0] * inv_sx,
            e[1] * inv_sx,
            e[2] * inv_sx,
            0.0,
            e[4] * inv_sy,
            e[5] * inv_sy,
            e[6] * inv_sy,
            0.0,
            e[8] * inv_sz,
            e[9] * inv_sz,
            e[10] * inv_sz,
            0.0,
            0.0,
            0.0,
            0.0,
            1.0,
        ])
    }

    /// Largest scale factor this matrix applies along any basis axis.
    /// Used to transform bounding-sphere radii conservatively.
    #[must_use]
    pub fn max_scale_on_axis(&self) -> f64 {
        let e = &self.elements;
        let sx = e[0] * e[0] + e[1] * e[1] + e[2] * e[2];
        let sy = e[4] * e[4] + e[5] * e[5] + e[6] * e[6];
        let sz = e[8] * e[8] + e[9] * e[9] + e[10] * e[10];
        sx.max(sy).max(sz).sqrt()
    }

    /// Overwrite the translation column.
    pub fn set_position(&mut self, v: &Vector3) -> &mut Self {
        self.elements[12] = v.x;
        self.elements[13] = v.y;
        self.elements[14] = v.z;
        self
    }

    /// Translation column as a vector.
    #[must_use]
    pub fn position(&self) -> Vector3 {
        Vector3::from_matrix_position(self)
    }

    /// Copy only the translation column from `other`, leaving rotation and
    /// scale untouched.
    pub fn copy_position(&mut self, other: &Self) -> &mut Self {
        self.elements[12] = other.elements[12];
        self.elements[13] = other.elements[13];
        self.elements[14] = other.elements[14];
        self
    }

    // Cofactors of the first column, shared by determinant and inverse.
    fn first_column_cofactors(&self) -> (f64, f64, f64, f64) {
        let e = &self.elements;
        let (n22, n32, n42) = (e[5], e[6], e[7]);
        let (n12, n13, n23, n33, n43) = (e[4], e[8], e[9], e[10], e[11]);
        let (n14, n24, n34, n44) = (e[12], e[13], e[14], e[15]);

        let t11 = n23 * n34 * n42 - n24 * n33 * n42 + n24 * n32 * n43
            - n22 * n34 * n43
            - n23 * n32 * n44
            + n22 * n33 * n44;
        let t12 = n14 * n33 * n42 - n13 * n34 * n42 - n14 * n32 * n43
            + n12 * n34 * n43
            + n13 * n32 * n44
            - n12 * n33 * n44;
        let t13 = n13 * n24 * n42 - n14 * n23 * n42 + n14 * n22 * n43
            - n12 * n24 * n43
            - n13 * n22 * n44
            + n12 * n23 * n44;
        let t14 = n14 * n23 * n32 - n13 * n24 * n32 - n14 * n22 * n33
            + n12 * n24 * n33
            + n13 * n22 * n34
            - n12 * n23 * n34;
        (t11, t12, t13, t14)
    }
}

impl Mul for Matrix4 {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        self.multiply(&rhs)
    }
}

impl AbsDiffEq for Matrix4 {
    type Epsilon = f64;

    fn default_epsilon() -> f64 {
        f64::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: f64) -> bool {
        self.elements
            .iter()
            .zip(other.elements.iter())
            .all(|(a, b)| a.abs_diff_eq(b, epsilon))
    }
}

impl RelativeEq for Matrix4 {
    fn default_max_relative() -> f64 {
        f64::default_max_relative()
    }

    fn relative_eq(&self, other: &Self, epsilon: f64, max_relative: f64) -> bool {
        self.elements
            .iter()
            .zip(other.elements.iter())
            .all(|(a, b)| a.relative_eq(b, epsilon, max_relative))
    }
}
