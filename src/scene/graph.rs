//! Arena-backed scene graph

use slotmap::{new_key_type, SecondaryMap, SlotMap};

use crate::math::{Euler, Matrix4, Quaternion, Vector3};
use crate::scene::Node;

new_key_type! {
    /// Stable identity of a node: its slot in the arena.
    pub struct NodeKey;
}

/// A tree of transform nodes owned by a single arena.
///
/// Parents hold their children's keys; a child holds a non-owning key back
/// to its parent, used only for world-matrix composition and the
/// parent-rotation correction in [`SceneGraph::look_at`]. Mutation passes
/// take `&mut self` and read passes take `&self`, so a caller cannot
/// interleave TRS edits with a ray cast over the same graph.
#[derive(Debug, Default)]
pub struct SceneGraph {
    nodes: SlotMap<NodeKey, Node>,
}

impl SceneGraph {
    /// Create an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when the arena holds no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// True when `key` names a live node.
    #[must_use]
    pub fn contains(&self, key: NodeKey) -> bool {
        self.nodes.contains_key(key)
    }

    /// Insert a node with no parent and return its key.
    pub fn insert(&mut self, node: Node) -> NodeKey {
        self.nodes.insert(node)
    }

    /// Borrow a node.
    #[must_use]
    pub fn node(&self, key: NodeKey) -> Option<&Node> {
        self.nodes.get(key)
    }

    /// Mutably borrow a node, for its public fields (`name`, `visible`,
    /// `up`). Transform state is edited through the graph's setters so the
    /// dirty flags stay honest.
    #[must_use]
    pub fn node_mut(&mut self, key: NodeKey) -> Option<&mut Node> {
        self.nodes.get_mut(key)
    }

    /// Iterate over all live `(key, node)` pairs in arena order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeKey, &Node)> {
        self.nodes.iter()
    }

    /// Attach `child` under `parent`, detaching it from any prior parent
    /// first. Reparenting takes the normal dirty path: the child's world
    /// matrix goes stale and is rebuilt on the next update pass.
    ///
    /// Returns `false` (and leaves the graph unchanged) when the edge would
    /// close a cycle or either key is dead.
    pub fn attach(&mut self, parent: NodeKey, child: NodeKey) -> bool {
        if parent == child || !self.nodes.contains_key(parent) || !self.nodes.contains_key(child) {
            log::warn!("SceneGraph::attach: refusing edge {parent:?} -> {child:?}");
            return false;
        }
        // Refuse an edge from a node to its own ancestor.
        let mut cursor = self.nodes[parent].parent;
        while let Some(ancestor) = cursor {
            if ancestor == child {
                log::warn!("SceneGraph::attach: {child:?} is an ancestor of {parent:?}");
                return false;
            }
            cursor = self.nodes.get(ancestor).and_then(|n| n.parent);
        }

        self.detach(child);
        self.nodes[child].parent = Some(parent);
        self.nodes[child].world_needs_update = true;
        self.nodes[parent].children.push(child);
        true
    }

    /// Detach `child` from its parent, making it a root.
    pub fn detach(&mut self, child: NodeKey) {
        let Some(parent) = self.nodes.get(child).and_then(|n| n.parent) else {
            return;
        };
        if let Some(parent_node) = self.nodes.get_mut(parent) {
            parent_node.children.retain(|&c| c != child);
        }
        let node = &mut self.nodes[child];
        node.parent = None;
        node.world_needs_update = true;
    }

    /// Remove a node and its whole subtree from the arena.
    pub fn remove(&mut self, key: NodeKey) {
        let mut doomed = Vec::new();
        self.traverse(key, &mut |k, _| doomed.push(k));
        self.detach(key);
        for k in doomed {
            self.nodes.remove(k);
        }
    }

    /// Set the local position and mark the local matrix stale.
    pub fn set_position(&mut self, key: NodeKey, position: Vector3) {
        if let Some(node) = self.nodes.get_mut(key) {
            node.position = position;
            node.local_needs_update = true;
        }
    }

    /// Add `delta` to the local position and mark the local matrix stale.
    pub fn translate(&mut self, key: NodeKey, delta: Vector3) {
        if let Some(node) = self.nodes.get_mut(key) {
            node.position += delta;
            node.local_needs_update = true;
        }
    }

    /// Set the local rotation and mark the local matrix stale.
    pub fn set_quaternion(&mut self, key: NodeKey, quaternion: Quaternion) {
        if let Some(node) = self.nodes.get_mut(key) {
            node.quaternion = quaternion;
            node.local_needs_update = true;
        }
    }

    /// Set the local rotation from Euler angles and mark the local matrix
    /// stale.
    pub fn set_rotation(&mut self, key: NodeKey, euler: &Euler) {
        self.set_quaternion(key, Quaternion::from_euler(euler));
    }

    /// Set the local scale and mark the local matrix stale.
    pub fn set_scale(&mut self, key: NodeKey, scale: Vector3) {
        if let Some(node) = self.nodes.get_mut(key) {
            node.scale = scale;
            node.local_needs_update = true;
        }
    }

    /// Rebuild `local_matrix` from the node's TRS state and flag the world
    /// matrix stale. Idempotent; called automatically by the update pass
    /// for nodes whose TRS changed.
    pub fn update_matrix(&mut self, key: NodeKey) {
        if let Some(node) = self.nodes.get_mut(key) {
            node.local_matrix = Matrix4::compose(&node.position, &node.quaternion, &node.scale);
            node.local_needs_update = false;
            node.world_needs_update = true;
        }
    }

    /// Recompute world matrices across the subtree rooted at `key`.
    ///
    /// A node recomputes when its own flag is set or when `force` is — and
    /// once any node recomputes, the recursion forces every descendant,
    /// because a dirty ancestor invalidates descendant world matrices even
    /// though their local matrices are unaffected. Traversal is guarded
    /// against malformed (cyclic) graphs.
    pub fn update_world_matrix(&mut self, key: NodeKey, force: bool) {
        let mut visited = SecondaryMap::new();
        self.update_world_recursive(key, force, &mut visited);
    }

    fn update_world_recursive(
        &mut self,
        key: NodeKey,
        mut force: bool,
        visited: &mut SecondaryMap<NodeKey, ()>,
    ) {
        if visited.insert(key, ()).is_some() {
            log::debug!("SceneGraph::update_world_matrix: cycle at {key:?}, stopping");
            return;
        }
        let Some(node) = self.nodes.get(key) else {
            return;
        };
        let parent = node.parent;

        if node.local_needs_update {
            self.update_matrix(key);
        }

        if self.nodes[key].world_needs_update || force {
            let parent_world = parent.and_then(|p| self.nodes.get(p)).map(|n| n.world_matrix);
            let node = &mut self.nodes[key];
            node.world_matrix = match parent_world {
                Some(parent_world) => parent_world.multiply(&node.local_matrix),
                None => node.local_matrix,
            };
            node.world_needs_update = false;
            force = true;
        }

        let children = self.nodes[key].children.clone();
        for child in children {
            self.update_world_recursive(child, force, visited);
        }
    }

    /// Depth-first visit of the subtree rooted at `key`, children in
    /// insertion order. Each node is visited at most once per call even if
    /// a malformed graph contains a cycle.
    pub fn traverse(&self, key: NodeKey, visitor: &mut dyn FnMut(NodeKey, &Node)) {
        let mut visited: SecondaryMap<NodeKey, ()> = SecondaryMap::new();
        let mut stack = vec![key];
        while let Some(current) = stack.pop() {
            if visited.insert(current, ()).is_some() {
                log::debug!("SceneGraph::traverse: cycle at {current:?}, skipping");
                continue;
            }
            let Some(node) = self.nodes.get(current) else {
                continue;
            };
            visitor(current, node);
            // Reverse push keeps children visited in insertion order.
            for &child in node.children.iter().rev() {
                stack.push(child);
            }
        }
    }

    /// Depth-first visit of the visible part of the subtree rooted at
    /// `key`: an invisible node is skipped together with its whole subtree,
    /// which is what a renderer would draw. Ray casts are more permissive
    /// and skip invisible nodes individually (see
    /// [`Raycaster`](crate::raycast::Raycaster)).
    pub fn traverse_visible(&self, key: NodeKey, visitor: &mut dyn FnMut(NodeKey, &Node)) {
        let mut visited: SecondaryMap<NodeKey, ()> = SecondaryMap::new();
        let mut stack = vec![key];
        while let Some(current) = stack.pop() {
            if visited.insert(current, ()).is_some() {
                log::debug!("SceneGraph::traverse_visible: cycle at {current:?}, skipping");
                continue;
            }
            let Some(node) = self.nodes.get(current) else {
                continue;
            };
            if !node.visible {
                continue;
            }
            visitor(current, node);
            for &child in node.children.iter().rev() {
                stack.push(child);
            }
        }
    }

    /// World-space position of a node, from its last updated world matrix.
    #[must_use]
    pub fn world_position(&self, key: NodeKey) -> Option<Vector3> {
        self.nodes.get(key).map(|n| n.world_matrix.position())
    }

    /// Inverse of a node's world matrix, used to carry world-space rays
    /// into node-local space. Degenerate transforms fall back to identity
    /// (see [`Matrix4::invert`]).
    #[must_use]
    pub fn inverse_world_matrix(&self, key: NodeKey) -> Option<Matrix4> {
        self.nodes.get(key).map(|n| n.world_matrix.invert())
    }

    /// Rotate a node so its -Z axis points at the world-space `target`.
    ///
    /// The node's and its ancestors' world matrices are refreshed first;
    /// the look rotation is computed in world space and, for a parented
    /// node, corrected by the inverse of the parent's world rotation so the
    /// *local* quaternion recomposes to the intended world-space facing.
    /// Not supported under a non-uniformly scaled parent chain.
    pub fn look_at(&mut self, key: NodeKey, target: &Vector3) {
        if !self.nodes.contains_key(key) {
            return;
        }
        self.refresh_world_chain(key);

        let node = &self.nodes[key];
        let eye = node.world_matrix.position();
        let look = Matrix4::look_at(&eye, target, &node.up);
        let mut quaternion = Quaternion::from_rotation_matrix(&look);

        if let Some(parent) = node.parent {
            if let Some(parent_node) = self.nodes.get(parent) {
                let parent_rotation =
                    Quaternion::from_rotation_matrix(&parent_node.world_matrix.extract_rotation());
                quaternion = quaternion.premultiply(&parent_rotation.invert());
            }
        }

        let node = &mut self.nodes[key];
        node.quaternion = quaternion;
        node.local_needs_update = true;
    }

    // Recompute world matrices along the root..=key chain only, so a read
    // of `key`'s world state is current without touching siblings.
    fn refresh_world_chain(&mut self, key: NodeKey) {
        let mut chain = vec![key];
        let mut guard: SecondaryMap<NodeKey, ()> = SecondaryMap::new();
        guard.insert(key, ());
        let mut cursor = self.nodes[key].parent;
        while let Some(ancestor) = cursor {
            if guard.insert(ancestor, ()).is_some() {
                break;
            }
            chain.push(ancestor);
            cursor = self.nodes.get(ancestor).and_then(|n| n.parent);
        }

        for &k in chain.iter().rev() {
            if self.nodes.get(k).is_some_and(|n| n.local_needs_update) {
                self.update_matrix(k);
            }
            let parent_world = self.nodes[k]
                .parent
                .and_then(|p| self.nodes.get(p))
                .map(|n| n.world_matrix);
            let node = &mut self.nodes[k];
            node.world_matrix = match parent_world {
                Some(parent_world) => parent_world.multiply(&node.local_matrix),
                None => node.local_matrix,
            };
            node.world_needs_update = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    fn chain(graph: &mut SceneGraph) -> (NodeKey, NodeKey, NodeKey) {
        let root = graph.insert(Node::new().with_name("root"));
        let child = graph.insert(Node::new().with_name("child"));
        let grandchild = graph.insert(Node::new().with_name("grandchild"));
        assert!(graph.attach(root, child));
        assert!(graph.attach(child, grandchild));
        (root, child, grandchild)
    }

    #[test]
    fn test_world_matrix_composition_over_chain() {
        let mut graph = SceneGraph::new();
        let (root, child, grandchild) = chain(&mut graph);

        graph.set_position(root, Vector3::new(1.0, 0.0, 0.0));
        graph.set_quaternion(child, Quaternion::from_axis_angle(&Vector3::Y, FRAC_PI_2));
        graph.set_scale(child, Vector3::new(2.0, 2.0, 2.0));
        graph.set_position(grandchild, Vector3::new(0.0, 3.0, 0.0));

        graph.update_world_matrix(root, false);

        let expected = graph.node(root).unwrap().local_matrix
            * *graph.node(child).unwrap().local_matrix()
            * *graph.node(grandchild).unwrap().local_matrix();
        assert_relative_eq!(
            *graph.node(grandchild).unwrap().world_matrix(),
            expected,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_dirty_ancestor_invalidates_descendants() {
        let mut graph = SceneGraph::new();
        let (root, _, grandchild) = chain(&mut graph);

        graph.set_position(grandchild, Vector3::new(0.0, 0.0, 1.0));
        graph.update_world_matrix(root, false);
        assert_relative_eq!(
            graph.world_position(grandchild).unwrap(),
            Vector3::new(0.0, 0.0, 1.0)
        );

        // Only the root moves; the grandchild's own flags are untouched.
        graph.set_position(root, Vector3::new(5.0, 0.0, 0.0));
        graph.update_world_matrix(root, false);
        assert_relative_eq!(
            graph.world_position(grandchild).unwrap(),
            Vector3::new(5.0, 0.0, 1.0)
        );
    }

    #[test]
    fn test_reparent_goes_stale_until_updated() {
        let mut graph = SceneGraph::new();
        let a = graph.insert(Node::new().with_position(Vector3::new(10.0, 0.0, 0.0)));
        let b = graph.insert(Node::new().with_position(Vector3::new(-10.0, 0.0, 0.0)));
        let child = graph.insert(Node::new().with_position(Vector3::new(0.0, 1.0, 0.0)));

        graph.attach(a, child);
        graph.update_world_matrix(a, false);
        assert_relative_eq!(
            graph.world_position(child).unwrap(),
            Vector3::new(10.0, 1.0, 0.0)
        );

        graph.attach(b, child);
        assert!(graph.node(child).unwrap().world_needs_update());
        graph.update_world_matrix(b, false);
        assert_relative_eq!(
            graph.world_position(child).unwrap(),
            Vector3::new(-10.0, 1.0, 0.0)
        );
    }

    #[test]
    fn test_attach_refuses_cycles() {
        let mut graph = SceneGraph::new();
        let (root, child, grandchild) = chain(&mut graph);
        assert!(!graph.attach(grandchild, root));
        assert!(!graph.attach(child, child));
        assert_eq!(graph.node(root).unwrap().parent(), None);
    }

    #[test]
    fn test_traverse_visits_in_insertion_order() {
        let mut graph = SceneGraph::new();
        let root = graph.insert(Node::new().with_name("root"));
        for name in ["a", "b", "c"] {
            let k = graph.insert(Node::new().with_name(name));
            graph.attach(root, k);
        }
        let mut names = Vec::new();
        graph.traverse(root, &mut |_, node| {
            names.push(node.name.clone().unwrap_or_default());
        });
        assert_eq!(names, ["root", "a", "b", "c"]);
    }

    #[test]
    fn test_traverse_survives_forced_back_edge() {
        let mut graph = SceneGraph::new();
        let (root, _, grandchild) = chain(&mut graph);
        // Forge the cycle directly; attach() would refuse it.
        graph.nodes[grandchild].children.push(root);

        let mut count = 0;
        graph.traverse(root, &mut |_, _| count += 1);
        assert_eq!(count, 3);

        // The matrix pass survives the same malformed graph.
        graph.set_position(root, Vector3::new(1.0, 0.0, 0.0));
        graph.update_world_matrix(root, false);
        assert_relative_eq!(
            graph.world_position(grandchild).unwrap(),
            Vector3::new(1.0, 0.0, 0.0)
        );
    }

    #[test]
    fn test_traverse_visible_prunes_hidden_subtrees() {
        let mut graph = SceneGraph::new();
        let root = graph.insert(Node::new().with_name("root"));
        let shown = graph.insert(Node::new().with_name("shown"));
        let shown_child = graph.insert(Node::new().with_name("shown_child"));
        let hidden = graph.insert(Node::new().with_name("hidden"));
        let under_hidden = graph.insert(Node::new().with_name("under_hidden"));
        assert!(graph.attach(root, shown));
        assert!(graph.attach(shown, shown_child));
        assert!(graph.attach(root, hidden));
        assert!(graph.attach(hidden, under_hidden));

        // under_hidden stays visible itself, but its parent hides the
        // whole branch.
        graph.node_mut(hidden).unwrap().visible = false;

        let mut names = Vec::new();
        graph.traverse_visible(root, &mut |_, node| {
            names.push(node.name.clone().unwrap_or_default());
        });
        assert_eq!(names, ["root", "shown", "shown_child"]);

        // The plain traversal still reaches everything.
        let mut count = 0;
        graph.traverse(root, &mut |_, _| count += 1);
        assert_eq!(count, 5);
    }

    #[test]
    fn test_remove_drops_subtree() {
        let mut graph = SceneGraph::new();
        let (root, child, grandchild) = chain(&mut graph);
        graph.remove(child);
        assert!(graph.contains(root));
        assert!(!graph.contains(child));
        assert!(!graph.contains(grandchild));
        assert!(graph.node(root).unwrap().children().is_empty());
    }

    #[test]
    fn test_look_at_points_negative_z_at_target() {
        let mut graph = SceneGraph::new();
        let key = graph.insert(Node::new().with_position(Vector3::new(0.0, 0.0, 5.0)));
        graph.look_at(key, &Vector3::ZERO);
        graph.update_world_matrix(key, false);

        let forward =
            Vector3::new(0.0, 0.0, -1.0).apply_quaternion(&graph.node(key).unwrap().quaternion());
        assert_relative_eq!(forward, Vector3::new(0.0, 0.0, -1.0), epsilon = 1e-12);
    }

    #[test]
    fn test_look_at_corrects_for_rotated_parent() {
        let mut graph = SceneGraph::new();
        let parent = graph.insert(
            Node::new().with_quaternion(Quaternion::from_axis_angle(&Vector3::Y, FRAC_PI_2)),
        );
        let child = graph.insert(Node::new().with_position(Vector3::new(0.0, 0.0, 5.0)));
        graph.attach(parent, child);

        let target = Vector3::new(3.0, 0.0, -2.0);
        graph.look_at(child, &target);
        graph.update_world_matrix(parent, false);

        let child_node = graph.node(child).unwrap();
        let eye = child_node.world_matrix().position();
        let forward = Vector3::new(0.0, 0.0, -1.0).transform_direction(child_node.world_matrix());
        let expected = (target - eye).normalize();
        assert_relative_eq!(forward, expected, epsilon = 1e-9);
    }
}
