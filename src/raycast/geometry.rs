//! Raycastable geometry attached to scene nodes
//!
//! The caster hands each geometry a world-space ray plus the owning node's
//! world matrix; the geometry transforms the ray into its own local space,
//! rejects against its precomputed bounds, and reports hits back in world
//! coordinates so distances from different nodes stay comparable.

use crate::bounds::{Box3, Sphere};
use crate::math::{Matrix4, Vector2, Vector3};
use crate::raycast::ray::{Ray, Side};
use crate::raycast::raycaster::Intersection;
use crate::scene::NodeKey;

/// Per-cast state handed to [`RaycastGeometry::raycast`].
#[derive(Debug)]
pub struct RaycastContext<'a> {
    /// World-space ray, unit direction.
    pub ray: &'a Ray,
    /// World matrix of the node being tested.
    pub world_matrix: &'a Matrix4,
    /// Minimum accepted world distance.
    pub near: f64,
    /// Maximum accepted world distance.
    pub far: f64,
    /// World-space pick radius for line geometry.
    pub line_threshold: f64,
}

/// Anything a node can carry that a ray can hit.
///
/// Implementations append to `hits` only; they never sort or clear it.
/// Reported distances are world-space and already filtered against
/// `ctx.near..=ctx.far`.
pub trait RaycastGeometry: std::fmt::Debug {
    /// Test the world-space ray against this geometry and append any hits.
    fn raycast(&self, ctx: &RaycastContext<'_>, node: NodeKey, hits: &mut Vec<Intersection>);
}

/// Barycentric coordinates of `p` in the triangle `(a, b, c)`, as weights
/// for `(a, b, c)`. Degenerate triangles report an outside point.
fn barycoord(p: &Vector3, a: &Vector3, b: &Vector3, c: &Vector3) -> Vector3 {
    let v0 = *c - *a;
    let v1 = *b - *a;
    let v2 = *p - *a;

    let dot00 = v0.dot(&v0);
    let dot01 = v0.dot(&v1);
    let dot02 = v0.dot(&v2);
    let dot11 = v1.dot(&v1);
    let dot12 = v1.dot(&v2);

    let denom = dot00 * dot11 - dot01 * dot01;
    if denom == 0.0 {
        return Vector3::new(-2.0, -1.0, -1.0);
    }

    let inv_denom = 1.0 / denom;
    let u = (dot11 * dot02 - dot01 * dot12) * inv_denom;
    let v = (dot00 * dot12 - dot01 * dot02) * inv_denom;
    Vector3::new(1.0 - u - v, v, u)
}

/// Indexed (or soup) triangle geometry.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TriangleMesh {
    positions: Vec<Vector3>,
    indices: Option<Vec<[usize; 3]>>,
    uvs: Option<Vec<Vector2>>,
    side: Side,
    bounding_box: Box3,
    bounding_sphere: Sphere,
}

impl TriangleMesh {
    /// Mesh from a vertex soup: every three consecutive positions form a
    /// triangle. Bounds are computed once here.
    #[must_use]
    pub fn new(positions: Vec<Vector3>) -> Self {
        let bounding_box = Box3::from_points(&positions);
        let bounding_sphere = Sphere::from_points(&positions, Some(bounding_box.center()));
        Self {
            positions,
            indices: None,
            uvs: None,
            side: Side::Front,
            bounding_box,
            bounding_sphere,
        }
    }

    /// Indexed mesh; each entry names the three vertices of one triangle.
    #[must_use]
    pub fn with_indices(mut self, indices: Vec<[usize; 3]>) -> Self {
        self.indices = Some(indices);
        self
    }

    /// Per-vertex texture coordinates, interpolated into hit records.
    #[must_use]
    pub fn with_uvs(mut self, uvs: Vec<Vector2>) -> Self {
        self.uvs = Some(uvs);
        self
    }

    /// Which triangle faces the cast may hit. Defaults to front only.
    #[must_use]
    pub fn with_side(mut self, side: Side) -> Self {
        self.side = side;
        self
    }

    /// Vertex positions.
    #[must_use]
    pub fn positions(&self) -> &[Vector3] {
        &self.positions
    }

    /// Number of triangles.
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices
            .as_ref()
            .map_or(self.positions.len() / 3, Vec::len)
    }

    /// Local-space bounding box.
    #[must_use]
    pub fn bounding_box(&self) -> &Box3 {
        &self.bounding_box
    }

    /// Local-space bounding sphere.
    #[must_use]
    pub fn bounding_sphere(&self) -> &Sphere {
        &self.bounding_sphere
    }

    fn triangle(&self, i: usize) -> [usize; 3] {
        self.indices
            .as_ref()
            .map_or([3 * i, 3 * i + 1, 3 * i + 2], |idx| idx[i])
    }
}

impl RaycastGeometry for TriangleMesh {
    fn raycast(&self, ctx: &RaycastContext<'_>, node: NodeKey, hits: &mut Vec<Intersection>) {
        if self.bounding_sphere.is_empty() {
            return;
        }

        // Sphere reject in world space, where the ray direction is unit.
        let world_sphere = self.bounding_sphere.apply_matrix4(ctx.world_matrix);
        if !ctx.ray.intersects_sphere(&world_sphere) {
            return;
        }

        let inverse = ctx.world_matrix.invert();
        let local_ray = ctx.ray.apply_matrix4(&inverse);
        if !local_ray.intersects_box(&self.bounding_box) {
            return;
        }

        for i in 0..self.triangle_count() {
            let [ia, ib, ic] = self.triangle(i);
            let a = &self.positions[ia];
            let b = &self.positions[ib];
            let c = &self.positions[ic];

            let Some(local_point) = local_ray.intersect_triangle(a, b, c, self.side) else {
                continue;
            };

            let point = local_point.apply_matrix4(ctx.world_matrix);
            let distance = ctx.ray.origin.distance_to(&point);
            if distance < ctx.near || distance > ctx.far {
                continue;
            }

            let uv = self.uvs.as_ref().map(|uvs| {
                let w = barycoord(&local_point, a, b, c);
                uvs[ia] * w.x + uvs[ib] * w.y + uvs[ic] * w.z
            });

            hits.push(Intersection {
                distance,
                point,
                node,
                face_index: Some(i),
                face: Some([ia, ib, ic]),
                uv,
                index: None,
            });
        }
    }
}

/// How line vertices pair into segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LineMode {
    /// Consecutive vertices chain: `0-1, 1-2, 2-3, ...`
    #[default]
    Strip,
    /// Disjoint pairs: `0-1, 2-3, ...`
    Pairs,
}

/// Polyline geometry picked within a distance threshold.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LineSegments {
    positions: Vec<Vector3>,
    mode: LineMode,
    bounding_sphere: Sphere,
}

impl LineSegments {
    /// Line geometry from vertices, joined according to `mode`.
    #[must_use]
    pub fn new(positions: Vec<Vector3>, mode: LineMode) -> Self {
        let bounding_sphere = Sphere::from_points(&positions, None);
        Self {
            positions,
            mode,
            bounding_sphere,
        }
    }

    /// Vertex positions.
    #[must_use]
    pub fn positions(&self) -> &[Vector3] {
        &self.positions
    }

    /// Segment pairing mode.
    #[must_use]
    pub fn mode(&self) -> LineMode {
        self.mode
    }
}

impl RaycastGeometry for LineSegments {
    fn raycast(&self, ctx: &RaycastContext<'_>, node: NodeKey, hits: &mut Vec<Intersection>) {
        if self.positions.len() < 2 || self.bounding_sphere.is_empty() {
            return;
        }

        // The threshold is specified in world units; scale it into local
        // space by the average axis scale. Exact only for uniform scale.
        let e = &ctx.world_matrix.elements;
        let scale_x = Vector3::new(e[0], e[1], e[2]).length();
        let scale_y = Vector3::new(e[4], e[5], e[6]).length();
        let scale_z = Vector3::new(e[8], e[9], e[10]).length();
        let average_scale = (scale_x + scale_y + scale_z) / 3.0;
        let local_threshold = ctx.line_threshold / average_scale;
        let local_threshold_sq = local_threshold * local_threshold;

        let mut padded_sphere = self.bounding_sphere;
        padded_sphere.radius += local_threshold;
        let world_sphere = padded_sphere.apply_matrix4(ctx.world_matrix);
        if !ctx.ray.intersects_sphere(&world_sphere) {
            return;
        }

        let inverse = ctx.world_matrix.invert();
        let local_ray = ctx.ray.apply_matrix4(&inverse);

        let step = match self.mode {
            LineMode::Strip => 1,
            LineMode::Pairs => 2,
        };

        for i in (0..self.positions.len() - 1).step_by(step) {
            let (sq_dist, on_ray, on_segment) =
                local_ray.distance_sq_to_segment(&self.positions[i], &self.positions[i + 1]);
            if sq_dist > local_threshold_sq {
                continue;
            }

            // Distance is measured to the ray point, the pick point is the
            // segment point.
            let world_on_ray = on_ray.apply_matrix4(ctx.world_matrix);
            let distance = ctx.ray.origin.distance_to(&world_on_ray);
            if distance < ctx.near || distance > ctx.far {
                continue;
            }

            hits.push(Intersection {
                distance,
                point: on_segment.apply_matrix4(ctx.world_matrix),
                node,
                face_index: None,
                face: None,
                uv: None,
                index: Some(i),
            });
        }
    }
}
