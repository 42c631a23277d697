//! Column-major 3x3 matrix

use approx::{AbsDiffEq, RelativeEq};

use crate::math::Matrix4;

/// A 3x3 matrix of `f64`, stored column-major.
///
/// Mostly a helper for normal matrices and for working with the rotational
/// block of a [`Matrix4`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Matrix3 {
    /// Column-major element storage.
    pub elements: [f64; 9],
}

impl Default for Matrix3 {
    fn default() -> Self {
        Self::identity()
    }
}

impl Matrix3 {
    /// The identity matrix.
    #[must_use]
    pub const fn identity() -> Self {
        Self {
            elements: [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0],
        }
    }

    /// Build from column-major elements.
    #[must_use]
    pub const fn from_elements(elements: [f64; 9]) -> Self {
        Self { elements }
    }

    /// The upper-left 3x3 block of a 4x4 matrix.
    #[must_use]
    pub fn from_matrix4(m: &Matrix4) -> Self {
        let e = &m.elements;
        Self::from_elements([e[0], e[1], e[2], e[4], e[5], e[6], e[8], e[9], e[10]])
    }

    /// Matrix product `self * other`.
    #[must_use]
    pub fn multiply(&self, other: &Self) -> Self {
        let a = &self.elements;
        let b = &other.elements;
        let mut out = [0.0; 9];
        for col in 0..3 {
            for row in 0..3 {
                let mut sum = 0.0;
                for k in 0..3 {
                    sum += a[k * 3 + row] * b[col * 3 + k];
                }
                out[col * 3 + row] = sum;
            }
        }
        Self::from_elements(out)
    }

    /// Transposed copy.
    #[must_use]
    pub fn transpose(&self) -> Self {
        let e = &self.elements;
        Self::from_elements([e[0], e[3], e[6], e[1], e[4], e[7], e[2], e[5], e[8]])
    }

    /// Determinant.
    #[must_use]
    pub fn determinant(&self) -> f64 {
        let e = &self.elements;
        let (a, b, c) = (e[0], e[1], e[2]);
        let (d, ee, f) = (e[3], e[4], e[5]);
        let (g, h, i) = (e[6], e[7], e[8]);
        a * (ee * i - f * h) - d * (b * i - c * h) + g * (b * f - c * ee)
    }

    /// Inverse via the adjugate.
    ///
    /// A singular matrix cannot be inverted; the result is the identity and
    /// a diagnostic is logged, matching [`Matrix4::invert`].
    #[must_use]
    pub fn invert(&self) -> Self {
        let e = &self.elements;
        let (n11, n21, n31) = (e[0], e[1], e[2]);
        let (n12, n22, n32) = (e[3], e[4], e[5]);
        let (n13, n23, n33) = (e[6], e[7], e[8]);

        let t11 = n33 * n22 - n32 * n23;
        let t12 = n32 * n13 - n33 * n12;
        let t13 = n23 * n12 - n22 * n13;

        let det = n11 * t11 + n21 * t12 + n31 * t13;
        if det == 0.0 {
            log::warn!("Matrix3::invert: determinant is zero, returning identity");
            return Self::identity();
        }
        let det_inv = 1.0 / det;

        Self::from_elements([
            t11 * det_inv,
            (n31 * n23 - n33 * n21) * det_inv,
            (n32 * n21 - n31 * n22) * det_inv,
            t12 * det_inv,
            (n33 * n11 - n31 * n13) * det_inv,
            (n31 * n12 - n32 * n11) * det_inv,
            t13 * det_inv,
            (n21 * n13 - n23 * n11) * det_inv,
            (n22 * n11 - n21 * n12) * det_inv,
        ])
    }

    /// Normal matrix of a 4x4 transform: inverse-transpose of its upper
    /// 3x3 block. Correct for transforming normals under non-uniform scale.
    #[must_use]
    pub fn normal_matrix(m: &Matrix4) -> Self {
        Self::from_matrix4(m).invert().transpose()
    }
}

impl AbsDiffEq for Matrix3 {
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

impl RelativeEq for Matrix3 {
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
