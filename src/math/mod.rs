//! Math types for 3D transforms
//!
//! Fixed-size vectors, column-major matrices, and the two rotation
//! representations (quaternion, Euler angles). All scalars are `f64`.
//!
//! The value types are `Copy` and expose both pure operators and in-place
//! `*_mut` variants; call sites pick whichever reads better. Nothing here
//! allocates.

pub mod euler;
pub mod matrix3;
pub mod matrix4;
pub mod quaternion;
pub mod vector2;
pub mod vector3;
pub mod vector4;

pub use euler::{Euler, EulerOrder};
pub use matrix3::Matrix3;
pub use matrix4::Matrix4;
pub use quaternion::Quaternion;
pub use vector2::Vector2;
pub use vector3::Vector3;
pub use vector4::Vector4;

/// Tolerance used when deciding a quantity is numerically zero.
pub const EPSILON: f64 = 1e-12;
