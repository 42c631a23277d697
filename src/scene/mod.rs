//! Scene graph
//!
//! An arena-backed tree of transform nodes. Each node carries local TRS
//! state and lazily recomputed local/world matrices driven by explicit
//! dirty flags; traversal is cycle-safe by construction of a per-call
//! visited set.

pub mod camera;
pub mod graph;
pub mod light;
pub mod node;

pub use camera::{Camera, Projection};
pub use graph::{NodeKey, SceneGraph};
pub use light::Light;
pub use node::Node;
