//! Scene node

use crate::math::{Matrix4, Quaternion, Vector3};
use crate::raycast::geometry::RaycastGeometry;
use crate::scene::graph::NodeKey;
use crate::scene::Light;

/// A single transform node.
///
/// Owns local TRS state plus the derived local and world matrices. The
/// matrices are lazily recomputed: TRS setters on
/// [`SceneGraph`](crate::scene::SceneGraph) only mark dirty bits, and the
/// update passes rebuild whatever is stale. `local_matrix` is always
/// derived from `(position, quaternion, scale)`, never an independent
/// source of truth.
#[derive(Debug)]
pub struct Node {
    /// Optional diagnostic name.
    pub name: Option<String>,
    /// Invisible nodes are skipped by ray casts.
    pub visible: bool,
    /// Up hint for [`SceneGraph::look_at`](crate::scene::SceneGraph::look_at).
    pub up: Vector3,

    pub(crate) position: Vector3,
    pub(crate) quaternion: Quaternion,
    pub(crate) scale: Vector3,

    pub(crate) local_matrix: Matrix4,
    pub(crate) world_matrix: Matrix4,
    pub(crate) local_needs_update: bool,
    pub(crate) world_needs_update: bool,

    pub(crate) parent: Option<NodeKey>,
    pub(crate) children: Vec<NodeKey>,

    pub(crate) geometry: Option<Box<dyn RaycastGeometry>>,
    pub(crate) light: Option<Light>,
}

impl Default for Node {
    fn default() -> Self {
        Self::new()
    }
}

impl Node {
    /// Create an identity node with no parent, children, or geometry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            name: None,
            visible: true,
            up: Vector3::Y,
            position: Vector3::ZERO,
            quaternion: Quaternion::IDENTITY,
            scale: Vector3::ONE,
            local_matrix: Matrix4::identity(),
            world_matrix: Matrix4::identity(),
            local_needs_update: false,
            world_needs_update: false,
            parent: None,
            children: Vec::new(),
            geometry: None,
            light: None,
        }
    }

    /// Builder: set the name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Builder: set the position.
    #[must_use]
    pub fn with_position(mut self, position: Vector3) -> Self {
        self.position = position;
        self.local_needs_update = true;
        self
    }

    /// Builder: set the rotation.
    #[must_use]
    pub fn with_quaternion(mut self, quaternion: Quaternion) -> Self {
        self.quaternion = quaternion;
        self.local_needs_update = true;
        self
    }

    /// Builder: set the scale.
    #[must_use]
    pub fn with_scale(mut self, scale: Vector3) -> Self {
        self.scale = scale;
        self.local_needs_update = true;
        self
    }

    /// Builder: attach raycastable geometry.
    #[must_use]
    pub fn with_geometry(mut self, geometry: Box<dyn RaycastGeometry>) -> Self {
        self.geometry = Some(geometry);
        self
    }

    /// Builder: attach a light.
    #[must_use]
    pub fn with_light(mut self, light: Light) -> Self {
        self.light = Some(light);
        self
    }

    /// Local translation.
    #[must_use]
    pub fn position(&self) -> Vector3 {
        self.position
    }

    /// Local rotation.
    #[must_use]
    pub fn quaternion(&self) -> Quaternion {
        self.quaternion
    }

    /// Local scale.
    #[must_use]
    pub fn scale(&self) -> Vector3 {
        self.scale
    }

    /// Local matrix as of the last update pass.
    #[must_use]
    pub fn local_matrix(&self) -> &Matrix4 {
        &self.local_matrix
    }

    /// World matrix as of the last update pass. Only current when the
    /// node and its ancestors have been updated since their last mutation.
    #[must_use]
    pub fn world_matrix(&self) -> &Matrix4 {
        &self.world_matrix
    }

    /// True when the world matrix is stale.
    #[must_use]
    pub fn world_needs_update(&self) -> bool {
        self.world_needs_update || self.local_needs_update
    }

    /// Parent key, if attached.
    #[must_use]
    pub fn parent(&self) -> Option<NodeKey> {
        self.parent
    }

    /// Child keys in insertion order.
    #[must_use]
    pub fn children(&self) -> &[NodeKey] {
        &self.children
    }

    /// Attached geometry, if any.
    #[must_use]
    pub fn geometry(&self) -> Option<&dyn RaycastGeometry> {
        self.geometry.as_deref()
    }

    /// Attached light, if any.
    #[must_use]
    pub fn light(&self) -> Option<&Light> {
        self.light.as_ref()
    }
}
