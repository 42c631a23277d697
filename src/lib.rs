//! # scene3d
//!
//! A 3D scene-description and spatial-query kernel: a hierarchical
//! transform graph with lazily recomputed world matrices, and a ray
//! intersection engine for picking against the geometry the nodes carry.
//!
//! ## Features
//!
//! - **Math layer**: `f64` vectors, column-major matrices, quaternions,
//!   and Euler angles in all six rotation orders
//! - **Bounding volumes**: spheres, axis-aligned boxes, planes, and
//!   frustums with the usual overlap tests
//! - **Scene graph**: arena-backed transform tree with dirty-flag lazy
//!   world-matrix updates, lights, and cameras
//! - **Raycasting**: distance-ordered picking against triangle meshes and
//!   polylines, driven from a camera or a free ray
//!
//! ## Quick Start
//!
//! ```rust
//! use scene3d::prelude::*;
//!
//! let mut graph = SceneGraph::new();
//! let mesh = TriangleMesh::new(vec![
//!     Vector3::new(-1.0, -1.0, 0.0),
//!     Vector3::new(1.0, -1.0, 0.0),
//!     Vector3::new(0.0, 1.0, 0.0),
//! ]);
//! let node = graph.insert(Node::new().with_geometry(Box::new(mesh)));
//! graph.update_world_matrix(node, false);
//!
//! let caster = Raycaster::new(Vector3::new(0.0, 0.0, 5.0), Vector3::new(0.0, 0.0, -1.0));
//! let hits = caster.intersect_node(&graph, node, true, true);
//! assert_eq!(hits.len(), 1);
//! ```

pub mod bounds;
pub mod math;
pub mod raycast;
pub mod scene;

mod error;

pub use error::Error;

/// Common imports for library users
pub mod prelude {
    pub use crate::{
        bounds::{Box3, Frustum, Plane, Sphere},
        math::{Euler, EulerOrder, Matrix3, Matrix4, Quaternion, Vector2, Vector3, Vector4},
        raycast::{
            Intersection, LineMode, LineSegments, Ray, RaycastGeometry, Raycaster, Side,
            TriangleMesh,
        },
        scene::{Camera, Light, Node, NodeKey, Projection, SceneGraph},
        Error,
    };
}
