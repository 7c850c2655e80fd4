//! Pick-ray construction from normalized device coordinates.
//!
//! The render collaborator owns the real camera; this module keeps only the
//! pieces the sketch pipeline needs: a world position and an unprojection
//! matrix that turns an NDC point into a camera-origin ray.

use glam::{Mat4, Vec2, Vec3};

use crate::raycast::Ray;

/// Camera state captured at input-event time for screen-to-world projection
#[derive(Debug, Clone, Copy)]
pub struct SketchCamera {
    position: Vec3,
    view_proj: Mat4,
    view_proj_inv: Mat4,
}

impl SketchCamera {
    /// Create a perspective camera at `eye` looking at `target` with +Y up.
    ///
    /// `fov_y` is the vertical field of view in radians.
    pub fn look_at(eye: Vec3, target: Vec3, fov_y: f32, aspect: f32, near: f32, far: f32) -> Self {
        let view = Mat4::look_at_rh(eye, target, Vec3::Y);
        let proj = Mat4::perspective_rh(fov_y, aspect, near, far);
        Self::from_view_proj(eye, proj * view)
    }

    /// Create a camera from a precomputed view-projection matrix
    pub fn from_view_proj(position: Vec3, view_proj: Mat4) -> Self {
        Self {
            position,
            view_proj,
            view_proj_inv: view_proj.inverse(),
        }
    }

    /// World position of the camera
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Construct a ray from the camera position through the given
    /// normalized-device-coordinate point, with x and y in [-1, 1].
    pub fn pick_ray(&self, ndc: Vec2) -> Ray {
        // Unproject a point on the near plane (depth 0 in wgpu convention)
        // and aim the ray through it
        let near_point = self
            .view_proj_inv
            .project_point3(Vec3::new(ndc.x, ndc.y, 0.0));

        Ray::new(self.position, near_point - self.position)
    }

    /// Project a world point back to normalized device coordinates.
    ///
    /// The z component carries the projected depth; points behind the
    /// camera produce an unusable result and are the caller's problem.
    pub fn world_to_ndc(&self, world: Vec3) -> Vec3 {
        self.view_proj.project_point3(world)
    }
}
