//! Camera collaborator
//!
//! The ray caster only needs a camera's world matrix, its inverses, and
//! its clip range; this type owns exactly that. There is no viewport or
//! render-target state here.

use crate::math::{Matrix4, Vector3};

/// The two projection kinds.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Projection {
    /// Perspective frustum.
    Perspective {
        /// Vertical field of view, radians
        fov_y: f64,
        /// Width over height
        aspect: f64,
        /// Near clip distance
        near: f64,
        /// Far clip distance
        far: f64,
    },
    /// Orthographic volume.
    Orthographic {
        /// Left clip plane
        left: f64,
        /// Right clip plane
        right: f64,
        /// Top clip plane
        top: f64,
        /// Bottom clip plane
        bottom: f64,
        /// Near clip distance
        near: f64,
        /// Far clip distance
        far: f64,
    },
}

/// A camera: a projection plus a world placement, with cached inverses.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    projection: Projection,
    projection_matrix: Matrix4,
    projection_matrix_inverse: Matrix4,
    matrix_world: Matrix4,
    matrix_world_inverse: Matrix4,
}

impl Camera {
    /// Perspective camera at the origin looking down -Z.
    #[must_use]
    pub fn perspective(fov_y: f64, aspect: f64, near: f64, far: f64) -> Self {
        Self::from_projection(Projection::Perspective {
            fov_y,
            aspect,
            near,
            far,
        })
    }

    /// Orthographic camera at the origin looking down -Z.
    #[must_use]
    pub fn orthographic(left: f64, right: f64, top: f64, bottom: f64, near: f64, far: f64) -> Self {
        Self::from_projection(Projection::Orthographic {
            left,
            right,
            top,
            bottom,
            near,
            far,
        })
    }

    /// Camera from an explicit projection.
    #[must_use]
    pub fn from_projection(projection: Projection) -> Self {
        let mut camera = Self {
            projection,
            projection_matrix: Matrix4::identity(),
            projection_matrix_inverse: Matrix4::identity(),
            matrix_world: Matrix4::identity(),
            matrix_world_inverse: Matrix4::identity(),
        };
        camera.update_projection_matrix();
        camera
    }

    /// The projection parameters.
    #[must_use]
    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    /// Replace the projection parameters and rebuild the matrices.
    pub fn set_projection(&mut self, projection: Projection) {
        self.projection = projection;
        self.update_projection_matrix();
    }

    /// Rebuild `projection_matrix` and its inverse from the parameters.
    /// Call after mutating the projection through [`Camera::set_projection`].
    pub fn update_projection_matrix(&mut self) {
        self.projection_matrix = match self.projection {
            Projection::Perspective {
                fov_y,
                aspect,
                near,
                far,
            } => Matrix4::perspective(fov_y, aspect, near, far),
            Projection::Orthographic {
                left,
                right,
                top,
                bottom,
                near,
                far,
            } => Matrix4::orthographic(left, right, top, bottom, near, far),
        };
        self.projection_matrix_inverse = self.projection_matrix.invert();
    }

    /// Near clip distance.
    #[must_use]
    pub fn near(&self) -> f64 {
        match self.projection {
            Projection::Perspective { near, .. } | Projection::Orthographic { near, .. } => near,
        }
    }

    /// Far clip distance.
    #[must_use]
    pub fn far(&self) -> f64 {
        match self.projection {
            Projection::Perspective { far, .. } | Projection::Orthographic { far, .. } => far,
        }
    }

    /// Place the camera in the world; the view matrix (the inverse) is
    /// cached immediately.
    pub fn set_matrix_world(&mut self, matrix_world: Matrix4) {
        self.matrix_world = matrix_world;
        self.matrix_world_inverse = matrix_world.invert();
    }

    /// Place the camera at `eye` looking at `target`.
    pub fn look_at_from(&mut self, eye: &Vector3, target: &Vector3, up: &Vector3) {
        let mut m = Matrix4::look_at(eye, target, up);
        m.set_position(eye);
        self.set_matrix_world(m);
    }

    /// World placement matrix.
    #[must_use]
    pub fn matrix_world(&self) -> &Matrix4 {
        &self.matrix_world
    }

    /// View matrix (inverse world placement).
    #[must_use]
    pub fn matrix_world_inverse(&self) -> &Matrix4 {
        &self.matrix_world_inverse
    }

    /// Projection matrix.
    #[must_use]
    pub fn projection_matrix(&self) -> &Matrix4 {
        &self.projection_matrix
    }

    /// Inverse projection matrix.
    #[must_use]
    pub fn projection_matrix_inverse(&self) -> &Matrix4 {
        &self.projection_matrix_inverse
    }

    /// World position of the camera.
    #[must_use]
    pub fn position(&self) -> Vector3 {
        self.matrix_world.position()
    }

    /// Carry a point from normalized device coordinates (with clip-space
    /// depth in `z`) back into world space.
    #[must_use]
    pub fn unproject_point(&self, ndc: &Vector3) -> Vector3 {
        ndc.apply_matrix4(&self.projection_matrix_inverse)
            .apply_matrix4(&self.matrix_world)
    }

    /// Carry a world-space point into normalized device coordinates.
    #[must_use]
    pub fn project_point(&self, world: &Vector3) -> Vector3 {
        world
            .apply_matrix4(&self.matrix_world_inverse)
            .apply_matrix4(&self.projection_matrix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_project_unproject_round_trip() {
        let mut camera = Camera::perspective(FRAC_PI_2, 1.0, 0.1, 100.0);
        camera.look_at_from(&Vector3::new(0.0, 2.0, 5.0), &Vector3::ZERO, &Vector3::Y);

        let world = Vector3::new(0.3, -0.8, -4.0);
        let ndc = camera.project_point(&world);
        let back = camera.unproject_point(&ndc);
        assert_relative_eq!(back, world, epsilon = 1e-9);
    }

    #[test]
    fn test_orthographic_center_ray_depth() {
        let camera = Camera::orthographic(-1.0, 1.0, 1.0, -1.0, 1.0, 10.0);
        // NDC z = -1 lands on the near plane.
        let near_point = camera.unproject_point(&Vector3::new(0.0, 0.0, -1.0));
        assert_relative_eq!(near_point, Vector3::new(0.0, 0.0, -1.0), epsilon = 1e-12);
    }

    #[test]
    fn test_clip_range_accessors() {
        let camera = Camera::perspective(1.0, 1.5, 0.25, 80.0);
        assert_eq!(camera.near(), 0.25);
        assert_eq!(camera.far(), 80.0);
    }
}
