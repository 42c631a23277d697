//! End-to-end picking tests
//!
//! Build a small scene graph, update world matrices through the dirty-flag
//! path, and cast rays at it the way an application would.

use approx::assert_relative_eq;
use scene3d::prelude::*;
use std::f64::consts::{FRAC_PI_2, PI};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn quad() -> TriangleMesh {
    TriangleMesh::new(vec![
        Vector3::new(-1.0, -1.0, 0.0),
        Vector3::new(1.0, -1.0, 0.0),
        Vector3::new(1.0, 1.0, 0.0),
        Vector3::new(-1.0, 1.0, 0.0),
    ])
    .with_indices(vec![[0, 1, 2], [0, 2, 3]])
    .with_uvs(vec![
        Vector2::new(0.0, 0.0),
        Vector2::new(1.0, 0.0),
        Vector2::new(1.0, 1.0),
        Vector2::new(0.0, 1.0),
    ])
}

#[test]
fn test_pick_through_transform_hierarchy() {
    init_logging();
    let mut graph = SceneGraph::new();
    let root = graph.insert(Node::new().with_name("root"));
    let pivot = graph.insert(Node::new());
    let panel = graph.insert(Node::new().with_geometry(Box::new(quad())));
    assert!(graph.attach(root, pivot));
    assert!(graph.attach(pivot, panel));

    // The pivot yaws +90 degrees: the panel lands at (-3, 0, 0) with its
    // front face turned toward +x.
    graph.set_quaternion(pivot, Quaternion::from_axis_angle(&Vector3::Y, FRAC_PI_2));
    graph.set_position(panel, Vector3::new(0.0, 0.0, -3.0));
    graph.update_world_matrix(root, false);

    let caster = Raycaster::new(Vector3::new(10.0, 0.0, 0.0), Vector3::new(-1.0, 0.0, 0.0));
    let hits = caster.intersect_node(&graph, root, true, true);

    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].node, panel);
    assert_relative_eq!(hits[0].distance, 13.0, epsilon = 1e-9);
    assert_relative_eq!(hits[0].point, Vector3::new(-3.0, 0.0, 0.0), epsilon = 1e-9);
}

#[test]
fn test_hits_ordered_across_nodes() {
    init_logging();
    let mut graph = SceneGraph::new();
    let root = graph.insert(Node::new());
    let mut panels = Vec::new();
    for z in [-4.0, 2.0, -1.0] {
        let k = graph.insert(
            Node::new()
                .with_position(Vector3::new(0.0, 0.0, z))
                .with_geometry(Box::new(quad())),
        );
        graph.attach(root, k);
        panels.push(k);
    }
    graph.update_world_matrix(root, false);

    let caster = Raycaster::new(Vector3::new(0.0, 0.0, 10.0), Vector3::new(0.0, 0.0, -1.0));
    let hits = caster.intersect_node(&graph, root, true, true);

    assert_eq!(hits.len(), 3);
    let order: Vec<_> = hits.iter().map(|h| h.node).collect();
    assert_eq!(order, [panels[1], panels[2], panels[0]]);
    assert_relative_eq!(hits[0].distance, 8.0, epsilon = 1e-12);
    assert_relative_eq!(hits[2].distance, 14.0, epsilon = 1e-12);
}

#[test]
fn test_stale_matrices_pick_at_old_position_until_updated() {
    init_logging();
    let mut graph = SceneGraph::new();
    let panel = graph.insert(Node::new().with_geometry(Box::new(quad())));
    graph.update_world_matrix(panel, false);

    let caster = Raycaster::new(Vector3::new(0.0, 0.0, 5.0), Vector3::new(0.0, 0.0, -1.0));
    assert_eq!(caster.intersect_node(&graph, panel, false, true).len(), 1);

    // Move it aside; the cast still reads the stored (stale) world matrix.
    graph.set_position(panel, Vector3::new(100.0, 0.0, 0.0));
    assert!(graph.node(panel).unwrap().world_needs_update());
    assert_eq!(caster.intersect_node(&graph, panel, false, true).len(), 1);

    graph.update_world_matrix(panel, false);
    assert!(caster.intersect_node(&graph, panel, false, true).is_empty());
}

#[test]
fn test_camera_driven_pick_with_uv() {
    init_logging();
    let mut graph = SceneGraph::new();
    let panel = graph.insert(Node::new().with_geometry(Box::new(quad())));
    graph.update_world_matrix(panel, false);

    let mut camera = Camera::perspective(FRAC_PI_2, 1.0, 0.1, 100.0);
    camera.look_at_from(&Vector3::new(0.0, 0.0, 5.0), &Vector3::ZERO, &Vector3::Y);

    // ndc (0.1, 0) aims at world (0.5, 0, 0), inside the first triangle
    // only (the quad's diagonal passes through the center).
    let mut caster = Raycaster::default();
    caster.set_from_camera(Vector2::new(0.1, 0.0), &camera);
    let hits = caster.intersect_node(&graph, panel, false, true);

    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].face_index, Some(0));
    assert_relative_eq!(hits[0].point, Vector3::new(0.5, 0.0, 0.0), epsilon = 1e-9);
    let uv = hits[0].uv.unwrap();
    assert_relative_eq!(uv, Vector2::new(0.75, 0.5), epsilon = 1e-9);
}

#[test]
fn test_scaled_node_line_threshold() {
    init_logging();
    let mut graph = SceneGraph::new();
    let line = LineSegments::new(
        vec![Vector3::new(-1.0, 0.0, 0.0), Vector3::new(1.0, 0.0, 0.0)],
        LineMode::Strip,
    );
    let key = graph.insert(Node::new().with_geometry(Box::new(line)));
    graph.set_scale(key, Vector3::splat(10.0));
    graph.update_world_matrix(key, false);

    // 3 world units above a line whose world extent is -10..10.
    let caster = Raycaster::new(Vector3::new(0.0, 3.0, 5.0), Vector3::new(0.0, 0.0, -1.0));
    assert!(caster.intersect_node(&graph, key, false, true).is_empty());

    let mut wide = caster.clone();
    wide.params.line_threshold = 4.0;
    let hits = wide.intersect_node(&graph, key, false, true);
    assert_eq!(hits.len(), 1);
    assert_relative_eq!(hits[0].point, Vector3::ZERO, epsilon = 1e-9);
}

#[test]
fn test_invisible_subtree_still_traversed_selectively() {
    init_logging();
    let mut graph = SceneGraph::new();
    let root = graph.insert(Node::new());
    let hidden = graph.insert(Node::new().with_geometry(Box::new(quad())));
    let shown = graph.insert(
        Node::new()
            .with_position(Vector3::new(0.0, 0.0, -2.0))
            .with_geometry(Box::new(quad())),
    );
    graph.attach(root, hidden);
    graph.attach(hidden, shown);
    graph.update_world_matrix(root, false);
    graph.node_mut(hidden).unwrap().visible = false;

    // The hidden node is skipped but its child is still reachable.
    let caster = Raycaster::new(Vector3::new(0.0, 0.0, 5.0), Vector3::new(0.0, 0.0, -1.0));
    let hits = caster.intersect_node(&graph, root, true, true);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].node, shown);
}

#[test]
fn test_look_at_then_pick_along_facing() {
    init_logging();
    let mut graph = SceneGraph::new();
    let target = Vector3::new(0.0, 0.0, -8.0);
    let panel = graph.insert(
        Node::new()
            .with_position(target)
            .with_geometry(Box::new(quad().with_side(Side::Double))),
    );
    let eye_key = graph.insert(Node::new().with_position(Vector3::new(4.0, 0.0, 4.0)));
    graph.look_at(eye_key, &target);
    graph.update_world_matrix(panel, false);
    graph.update_world_matrix(eye_key, false);

    let eye_node = graph.node(eye_key).unwrap();
    let origin = eye_node.world_matrix().position();
    let direction = Vector3::new(0.0, 0.0, -1.0).transform_direction(eye_node.world_matrix());

    let caster = Raycaster::new(origin, direction);
    let hits = caster.intersect_node(&graph, panel, false, true);
    assert_eq!(hits.len(), 1);
    assert_relative_eq!(hits[0].point, target, epsilon = 1e-9);
    assert_relative_eq!(hits[0].distance, (target - origin).length(), epsilon = 1e-9);
}

#[test]
fn test_euler_driven_rotation_matches_quaternion_path() {
    init_logging();
    let mut graph = SceneGraph::new();
    let a = graph.insert(Node::new().with_geometry(Box::new(quad())));
    let b = graph.insert(Node::new().with_geometry(Box::new(quad())));

    graph.set_rotation(a, &Euler::new(0.0, PI / 3.0, 0.0, EulerOrder::Xyz));
    graph.set_quaternion(b, Quaternion::from_axis_angle(&Vector3::Y, PI / 3.0));
    graph.update_world_matrix(a, false);
    graph.update_world_matrix(b, false);

    assert_relative_eq!(
        *graph.node(a).unwrap().world_matrix(),
        *graph.node(b).unwrap().world_matrix(),
        epsilon = 1e-12
    );
}
