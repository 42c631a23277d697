//! Ray intersection engine
//!
//! A parametric ray, per-primitive intersection tests (sphere, box via the
//! slab method, triangle via signed volumes, segment closest-approach), and
//! the raycaster that walks scene subtrees and collects distance-ordered
//! hits.

pub mod geometry;
pub mod ray;
pub mod raycaster;

pub use geometry::{LineMode, LineSegments, RaycastContext, RaycastGeometry, TriangleMesh};
pub use ray::{Ray, Side};
pub use raycaster::{Intersection, RaycastParams, Raycaster};
