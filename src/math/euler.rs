//! Euler angle triple with explicit axis order

use std::fmt;
use std::str::FromStr;

use crate::error::Error;
use crate::math::{Matrix4, Quaternion};

/// The six intrinsic rotation orders.
///
/// The order names the sequence the component rotations are applied in and
/// therefore the multiplication sequence used by every conversion. The set
/// is closed; strings parse via [`FromStr`] and unknown names fail fast
/// with [`Error::UnknownEulerOrder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EulerOrder {
    /// X, then Y, then Z (the default)
    #[default]
    Xyz,
    /// Y, then X, then Z
    Yxz,
    /// Z, then X, then Y
    Zxy,
    /// Z, then Y, then X
    Zyx,
    /// Y, then Z, then X
    Yzx,
    /// X, then Z, then Y
    Xzy,
}

impl fmt::Display for EulerOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Xyz => "XYZ",
            Self::Yxz => "YXZ",
            Self::Zxy => "ZXY",
            Self::Zyx => "ZYX",
            Self::Yzx => "YZX",
            Self::Xzy => "XZY",
        };
        f.write_str(name)
    }
}

impl FromStr for EulerOrder {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s {
            "XYZ" => Ok(Self::Xyz),
            "YXZ" => Ok(Self::Yxz),
            "ZXY" => Ok(Self::Zxy),
            "ZYX" => Ok(Self::Zyx),
            "YZX" => Ok(Self::Yzx),
            "XZY" => Ok(Self::Xzy),
            other => Err(Error::UnknownEulerOrder(other.to_owned())),
        }
    }
}

/// Euler angles in radians with their rotation order.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Euler {
    /// Rotation about X, radians
    pub x: f64,
    /// Rotation about Y, radians
    pub y: f64,
    /// Rotation about Z, radians
    pub z: f64,
    /// Axis order the rotations apply in
    pub order: EulerOrder,
}

impl Euler {
    /// Create from angles and an order.
    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64, order: EulerOrder) -> Self {
        Self { x, y, z, order }
    }

    /// Extract Euler angles from a pure (unscaled) rotation matrix.
    ///
    /// Each order reads its own set of matrix terms; near the gimbal-lock
    /// pole (middle-axis sine within `1 - 1e-7` of a unit) the remaining two
    /// angles are not independent and one of them is pinned to zero.
    #[must_use]
    pub fn from_rotation_matrix(m: &Matrix4, order: EulerOrder) -> Self {
        let e = &m.elements;
        let (m11, m12, m13) = (e[0], e[4], e[8]);
        let (m21, m22, m23) = (e[1], e[5], e[9]);
        let (m31, m32, m33) = (e[2], e[6], e[10]);

        const LOCK: f64 = 1.0 - 1e-7;
        let (x, y, z);
        match order {
            EulerOrder::Xyz => {
                y = m13.clamp(-1.0, 1.0).asin();
                if m13.abs() < LOCK {
                    x = (-m23).atan2(m33);
                    z = (-m12).atan2(m11);
                } else {
                    x = m32.atan2(m22);
                    z = 0.0;
                }
            }
            EulerOrder::Yxz => {
                x = (-m23.clamp(-1.0, 1.0)).asin();
                if m23.abs() < LOCK {
                    y = m13.atan2(m33);
                    z = m21.atan2(m22);
                } else {
                    y = (-m31).atan2(m11);
                    z = 0.0;
                }
            }
            EulerOrder::Zxy => {
                x = m32.clamp(-1.0, 1.0).asin();
                if m32.abs() < LOCK {
                    y = (-m31).atan2(m33);
                    z = (-m12).atan2(m22);
                } else {
                    y = 0.0;
                    z = m21.atan2(m11);
                }
            }
            EulerOrder::Zyx => {
                y = (-m31.clamp(-1.0, 1.0)).asin();
                if m31.abs() < LOCK {
                    x = m32.atan2(m33);
                    z = m21.atan2(m11);
                } else {
                    x = 0.0;
                    z = (-m12).atan2(m22);
                }
            }
            EulerOrder::Yzx => {
                z = m21.clamp(-1.0, 1.0).asin();
                if m21.abs() < LOCK {
                    x = (-m23).atan2(m22);
                    y = (-m31).atan2(m11);
                } else {
                    x = 0.0;
                    y = m13.atan2(m33);
                }
            }
            EulerOrder::Xzy => {
                z = (-m12.clamp(-1.0, 1.0)).asin();
                if m12.abs() < LOCK {
                    x = m32.atan2(m22);
                    y = m13.atan2(m11);
                } else {
                    x = (-m23).atan2(m33);
                    y = 0.0;
                }
            }
        }

        Self::new(x, y, z, order)
    }

    /// Extract Euler angles from a quaternion, via its rotation matrix.
    #[must_use]
    pub fn from_quaternion(q: &Quaternion, order: EulerOrder) -> Self {
        Self::from_rotation_matrix(&Matrix4::from_quaternion(q), order)
    }
}
