//! Bounding volumes
//!
//! Derived spatial bounds used for coarse rejection before the exact
//! per-primitive intersection tests run: spheres, axis-aligned boxes,
//! planes, and the six-plane view frustum.

pub mod box3;
pub mod frustum;
pub mod plane;
pub mod sphere;

pub use box3::Box3;
pub use frustum::Frustum;
pub use plane::Plane;
pub use sphere::Sphere;
