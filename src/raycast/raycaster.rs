//! Scene-walking ray caster

use std::cmp::Ordering;

use crate::math::{Vector2, Vector3};
use crate::raycast::geometry::RaycastContext;
use crate::raycast::ray::Ray;
use crate::scene::{Camera, NodeKey, Projection, SceneGraph};

/// Tunable cast parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RaycastParams {
    /// World-space pick radius for line geometry.
    pub line_threshold: f64,
}

impl Default for RaycastParams {
    fn default() -> Self {
        Self {
            line_threshold: 1.0,
        }
    }
}

/// One ray/geometry hit, in world coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intersection {
    /// World distance from the ray origin.
    pub distance: f64,
    /// World-space hit point.
    pub point: Vector3,
    /// The node that was hit.
    pub node: NodeKey,
    /// Triangle index within the mesh, for mesh hits.
    pub face_index: Option<usize>,
    /// The triangle's three vertex indices, for mesh hits.
    pub face: Option<[usize; 3]>,
    /// Interpolated texture coordinates, when the mesh carries them.
    pub uv: Option<Vector2>,
    /// First vertex index of the picked segment, for line hits.
    pub index: Option<usize>,
}

/// Casts a world-space ray through a scene graph and collects hits.
#[derive(Debug, Clone, PartialEq)]
pub struct Raycaster {
    /// The cast ray; `set_from_camera` rewrites it.
    pub ray: Ray,
    /// Minimum accepted world distance.
    pub near: f64,
    /// Maximum accepted world distance.
    pub far: f64,
    /// Cast parameters.
    pub params: RaycastParams,
}

impl Default for Raycaster {
    fn default() -> Self {
        Self::new(Vector3::ZERO, Vector3::new(0.0, 0.0, -1.0))
    }
}

impl Raycaster {
    /// Caster along `origin + t * direction` with an unbounded clip range.
    /// The direction is normalized.
    #[must_use]
    pub fn new(origin: Vector3, direction: Vector3) -> Self {
        Self {
            ray: Ray::new(origin, direction),
            near: 0.0,
            far: f64::INFINITY,
            params: RaycastParams::default(),
        }
    }

    /// Replace the ray. The direction is normalized.
    pub fn set(&mut self, origin: Vector3, direction: Vector3) {
        self.ray = Ray::new(origin, direction);
    }

    /// Aim the ray through a point on the camera's image plane, given in
    /// normalized device coordinates (`-1..=1` on both axes).
    ///
    /// Perspective cameras cast from the camera position; orthographic
    /// cameras cast parallel rays from the camera plane along the view
    /// direction.
    pub fn set_from_camera(&mut self, ndc: Vector2, camera: &Camera) {
        match *camera.projection() {
            Projection::Perspective { .. } => {
                let origin = camera.position();
                let direction =
                    (camera.unproject_point(&Vector3::new(ndc.x, ndc.y, 0.5)) - origin).normalize();
                self.ray = Ray { origin, direction };
            }
            Projection::Orthographic { near, far, .. } => {
                let origin = camera.unproject_point(&Vector3::new(
                    ndc.x,
                    ndc.y,
                    (near + far) / (near - far),
                ));
                let direction =
                    Vector3::new(0.0, 0.0, -1.0).transform_direction(camera.matrix_world());
                self.ray = Ray { origin, direction };
            }
        }
    }

    /// Cast against one node, and its whole subtree when `recursive`.
    ///
    /// World matrices are read as stored; call
    /// [`SceneGraph::update_world_matrix`] first if the graph has pending
    /// mutations. Hits sort by ascending distance when `sort` is set.
    #[must_use]
    pub fn intersect_node(
        &self,
        graph: &SceneGraph,
        key: NodeKey,
        recursive: bool,
        sort: bool,
    ) -> Vec<Intersection> {
        let mut hits = Vec::new();
        self.collect(graph, key, recursive, &mut hits);
        if sort {
            sort_by_distance(&mut hits);
        }
        hits
    }

    /// Cast against several subtrees at once, merging the hit lists.
    #[must_use]
    pub fn intersect_nodes(
        &self,
        graph: &SceneGraph,
        keys: &[NodeKey],
        recursive: bool,
        sort: bool,
    ) -> Vec<Intersection> {
        let mut hits = Vec::new();
        for &key in keys {
            self.collect(graph, key, recursive, &mut hits);
        }
        if sort {
            sort_by_distance(&mut hits);
        }
        hits
    }

    fn collect(
        &self,
        graph: &SceneGraph,
        key: NodeKey,
        recursive: bool,
        hits: &mut Vec<Intersection>,
    ) {
        if recursive {
            graph.traverse(key, &mut |k, node| {
                self.test_single(k, node, hits);
            });
        } else if let Some(node) = graph.node(key) {
            self.test_single(key, node, hits);
        }
    }

    fn test_single(&self, key: NodeKey, node: &crate::scene::Node, hits: &mut Vec<Intersection>) {
        if !node.visible {
            return;
        }
        let Some(geometry) = node.geometry() else {
            return;
        };
        let ctx = RaycastContext {
            ray: &self.ray,
            world_matrix: node.world_matrix(),
            near: self.near,
            far: self.far,
            line_threshold: self.params.line_threshold,
        };
        geometry.raycast(&ctx, key, hits);
    }
}

fn sort_by_distance(hits: &mut [Intersection]) {
    hits.sort_by(|a, b| {
        a.distance
            .partial_cmp(&b.distance)
            .unwrap_or(Ordering::Equal)
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raycast::geometry::TriangleMesh;
    use crate::scene::Node;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    fn tri_at(z: f64) -> TriangleMesh {
        TriangleMesh::new(vec![
            Vector3::new(-1.0, -1.0, z),
            Vector3::new(1.0, -1.0, z),
            Vector3::new(0.0, 1.0, z),
        ])
    }

    #[test]
    fn test_hits_sorted_by_distance() {
        let mut graph = SceneGraph::new();
        let root = graph.insert(Node::new());
        let far = graph.insert(Node::new().with_geometry(Box::new(tri_at(-1.0))));
        let close = graph.insert(Node::new().with_geometry(Box::new(tri_at(1.0))));
        graph.attach(root, far);
        graph.attach(root, close);
        graph.update_world_matrix(root, false);

        let caster = Raycaster::new(Vector3::new(0.0, 0.0, 5.0), Vector3::new(0.0, 0.0, -1.0));
        let hits = caster.intersect_node(&graph, root, true, true);

        assert_eq!(hits.len(), 2);
        assert_relative_eq!(hits[0].distance, 4.0, epsilon = 1e-12);
        assert_relative_eq!(hits[1].distance, 6.0, epsilon = 1e-12);
        assert_eq!(hits[0].node, close);
        assert_eq!(hits[1].node, far);
    }

    #[test]
    fn test_invisible_nodes_skipped() {
        let mut graph = SceneGraph::new();
        let node = graph.insert(
            Node::new()
                .with_geometry(Box::new(tri_at(0.0)))
                .with_name("hidden"),
        );
        graph.update_world_matrix(node, false);
        if let Some(n) = graph.node_mut(node) {
            n.visible = false;
        }

        let caster = Raycaster::new(Vector3::new(0.0, 0.0, 5.0), Vector3::new(0.0, 0.0, -1.0));
        assert!(caster.intersect_node(&graph, node, false, true).is_empty());
    }

    #[test]
    fn test_near_far_window() {
        let mut graph = SceneGraph::new();
        let node = graph.insert(Node::new().with_geometry(Box::new(tri_at(0.0))));
        graph.update_world_matrix(node, false);

        let mut caster =
            Raycaster::new(Vector3::new(0.0, 0.0, 0.5), Vector3::new(0.0, 0.0, -1.0));
        assert_eq!(caster.intersect_node(&graph, node, false, true).len(), 1);

        caster.near = 1.0;
        assert!(caster.intersect_node(&graph, node, false, true).is_empty());

        caster.near = 0.0;
        caster.far = 0.25;
        assert!(caster.intersect_node(&graph, node, false, true).is_empty());
    }

    #[test]
    fn test_set_from_perspective_camera() {
        let mut camera = Camera::perspective(FRAC_PI_2, 1.0, 0.1, 100.0);
        camera.look_at_from(&Vector3::new(0.0, 0.0, 5.0), &Vector3::ZERO, &Vector3::Y);

        let mut caster = Raycaster::default();
        caster.set_from_camera(Vector2::new(0.0, 0.0), &camera);
        assert_relative_eq!(caster.ray.origin, Vector3::new(0.0, 0.0, 5.0), epsilon = 1e-9);
        assert_relative_eq!(
            caster.ray.direction,
            Vector3::new(0.0, 0.0, -1.0),
            epsilon = 1e-9
        );

        // fov 90: the top edge of the frustum leans 45 degrees up.
        caster.set_from_camera(Vector2::new(0.0, 1.0), &camera);
        assert_relative_eq!(caster.ray.direction.y, (0.5_f64).sqrt(), epsilon = 1e-9);
    }

    #[test]
    fn test_set_from_orthographic_camera() {
        let mut camera = Camera::orthographic(-2.0, 2.0, 2.0, -2.0, 1.0, 10.0);
        camera.look_at_from(&Vector3::new(0.0, 0.0, 5.0), &Vector3::ZERO, &Vector3::Y);

        let mut caster = Raycaster::default();
        caster.set_from_camera(Vector2::new(0.5, 0.0), &camera);

        // Parallel rays from the camera plane.
        assert_relative_eq!(
            caster.ray.direction,
            Vector3::new(0.0, 0.0, -1.0),
            epsilon = 1e-9
        );
        assert_relative_eq!(caster.ray.origin.x, 1.0, epsilon = 1e-9);
        assert_relative_eq!(caster.ray.origin.z, 5.0, epsilon = 1e-9);
    }

    #[test]
    fn test_intersect_nodes_merges() {
        let mut graph = SceneGraph::new();
        let a = graph.insert(Node::new().with_geometry(Box::new(tri_at(1.0))));
        let b = graph.insert(Node::new().with_geometry(Box::new(tri_at(-1.0))));
        graph.update_world_matrix(a, false);
        graph.update_world_matrix(b, false);

        let caster = Raycaster::new(Vector3::new(0.0, 0.0, 5.0), Vector3::new(0.0, 0.0, -1.0));
        let hits = caster.intersect_nodes(&graph, &[a, b], false, true);
        assert_eq!(hits.len(), 2);
        assert!(hits[0].distance <= hits[1].distance);
    }
}
