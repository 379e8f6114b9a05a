/// Camera — eye, orientation and projection with derived matrices.
///
/// Setters recompute the view, projection and view-projection matrices and
/// the culling frustum immediately, so getters are plain field reads. The
/// same type serves the caller's view camera and each light's shadow camera.

use glam::{Mat4, Vec3};
use crate::scene::AABB;
use super::frustum::Frustum;

/// Projection parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    /// Perspective projection, vertical field of view in degrees
    Perspective {
        fov_degrees: f32,
        aspect: f32,
        near: f32,
        far: f32,
    },
    /// Orthographic projection box in view space
    Orthographic {
        left: f32,
        right: f32,
        bottom: f32,
        top: f32,
        near: f32,
        far: f32,
    },
}

impl Projection {
    fn matrix(&self) -> Mat4 {
        match *self {
            Projection::Perspective { fov_degrees, aspect, near, far } => {
                Mat4::perspective_rh_gl(fov_degrees.to_radians(), aspect, near, far)
            }
            Projection::Orthographic { left, right, bottom, top, near, far } => {
                Mat4::orthographic_rh_gl(left, right, bottom, top, near, far)
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct Camera {
    eye: Vec3,
    center: Vec3,
    up: Vec3,
    projection: Projection,
    view_matrix: Mat4,
    projection_matrix: Mat4,
    view_projection_matrix: Mat4,
    frustum: Frustum,
}

impl Camera {
    /// Perspective camera at `eye` looking at `center`.
    pub fn perspective(
        eye: Vec3,
        center: Vec3,
        up: Vec3,
        fov_degrees: f32,
        aspect: f32,
        near: f32,
        far: f32,
    ) -> Self {
        let mut camera = Self {
            eye,
            center,
            up,
            projection: Projection::Perspective { fov_degrees, aspect, near, far },
            view_matrix: Mat4::IDENTITY,
            projection_matrix: Mat4::IDENTITY,
            view_projection_matrix: Mat4::IDENTITY,
            frustum: Frustum::from_view_projection(&Mat4::IDENTITY),
        };
        camera.update_matrices();
        camera
    }

    // ===== CONFIGURATION =====

    pub fn look_at(&mut self, eye: Vec3, center: Vec3, up: Vec3) {
        self.eye = eye;
        self.center = center;
        self.up = up;
        self.update_matrices();
    }

    pub fn set_perspective(&mut self, fov_degrees: f32, aspect: f32, near: f32, far: f32) {
        self.projection = Projection::Perspective { fov_degrees, aspect, near, far };
        self.update_matrices();
    }

    pub fn set_orthographic(
        &mut self,
        left: f32,
        right: f32,
        bottom: f32,
        top: f32,
        near: f32,
        far: f32,
    ) {
        self.projection = Projection::Orthographic { left, right, bottom, top, near, far };
        self.update_matrices();
    }

    /// Change the aspect ratio of a perspective camera (no-op for orthographic).
    pub fn set_aspect_ratio(&mut self, aspect: f32) {
        if let Projection::Perspective { fov_degrees, near, far, .. } = self.projection {
            self.set_perspective(fov_degrees, aspect, near, far);
        }
    }

    fn update_matrices(&mut self) {
        self.view_matrix = Mat4::look_at_rh(self.eye, self.center, self.up);
        self.projection_matrix = self.projection.matrix();
        self.view_projection_matrix = self.projection_matrix * self.view_matrix;
        self.frustum = Frustum::from_view_projection(&self.view_projection_matrix);
    }

    // ===== GETTERS =====

    pub fn eye(&self) -> Vec3 {
        self.eye
    }

    pub fn center(&self) -> Vec3 {
        self.center
    }

    pub fn up(&self) -> Vec3 {
        self.up
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    pub fn view_matrix(&self) -> &Mat4 {
        &self.view_matrix
    }

    pub fn projection_matrix(&self) -> &Mat4 {
        &self.projection_matrix
    }

    /// Combined view-projection matrix (projection * view).
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.view_projection_matrix
    }

    /// Inverse view-projection, for world-position reconstruction from depth.
    pub fn inverse_view_projection_matrix(&self) -> Mat4 {
        self.view_projection_matrix.inverse()
    }

    pub fn near(&self) -> f32 {
        match self.projection {
            Projection::Perspective { near, .. } | Projection::Orthographic { near, .. } => near,
        }
    }

    pub fn far(&self) -> f32 {
        match self.projection {
            Projection::Perspective { far, .. } | Projection::Orthographic { far, .. } => far,
        }
    }

    pub fn frustum(&self) -> &Frustum {
        &self.frustum
    }

    // ===== VISIBILITY =====

    /// Whether a world-space box is (potentially) visible.
    pub fn test_box_in_frustum(&self, aabb: &AABB) -> bool {
        self.frustum.intersects_aabb(aabb)
    }

    /// Whether a world-space sphere is (potentially) visible.
    pub fn test_sphere_in_frustum(&self, center: Vec3, radius: f32) -> bool {
        self.frustum.intersects_sphere(center, radius)
    }

    /// Distance from the eye to a world-space point.
    pub fn distance_to(&self, point: Vec3) -> f32 {
        self.eye.distance(point)
    }
}

impl Default for Camera {
    /// 45° perspective camera at (0, 0, 10) looking at the origin.
    fn default() -> Self {
        Self::perspective(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO, Vec3::Y, 45.0, 1.0, 0.1, 1000.0)
    }
}

#[cfg(test)]
#[path = "camera_tests.rs"]
mod tests;
