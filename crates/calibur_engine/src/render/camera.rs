//! # Camera data for scene rendering
//!
//! [`Camera`] only holds a projection; where the camera sits is supplied per
//! frame through [`SceneRenderCamera`], which is what the scene renderer
//! consumes between `begin_scene` and `end_scene`.
//!
//! ## Depth convention
//! Projections use the standard, non-reversed convention: `near < far`,
//! near maps to NDC z = -1 and far to +1. Nothing in the renderer assumes
//! reversed-Z.

use crate::foundation::math::{Mat4, Point3, Vec3};

/// Projection part of a camera
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    projection: Mat4,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Mat4::identity())
    }
}

impl Camera {
    /// Wrap an arbitrary projection matrix
    pub fn new(projection: Mat4) -> Self {
        Self { projection }
    }

    /// Perspective projection; `fov_y` is in radians
    pub fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self::new(Mat4::new_perspective(aspect, fov_y, near, far))
    }

    /// Projection matrix
    pub fn projection(&self) -> &Mat4 {
        &self.projection
    }
}

/// Camera snapshot for one frame
#[derive(Debug, Clone, PartialEq)]
pub struct SceneRenderCamera {
    /// Projection
    pub camera: Camera,
    /// World-to-view transform
    pub view_matrix: Mat4,
    /// Eye position in world space
    pub position: Vec3,
    /// Vertical field of view in radians
    pub fov: f32,
    /// Near plane distance (non-reversed, `near < far`)
    pub near: f32,
    /// Far plane distance
    pub far: f32,
    /// Viewport width over height
    pub aspect_ratio: f32,
}

impl SceneRenderCamera {
    /// Perspective camera at `position` looking at `target`
    ///
    /// # Arguments
    /// * `fov` - Vertical field of view in radians
    /// * `aspect_ratio` - Viewport width over height
    /// * `near` - Near plane distance (must be > 0)
    /// * `far` - Far plane distance (must be > near)
    pub fn look_at(
        position: Vec3,
        target: Vec3,
        fov: f32,
        aspect_ratio: f32,
        near: f32,
        far: f32,
    ) -> Self {
        let view_matrix = Mat4::look_at_rh(
            &Point3::from(position),
            &Point3::from(target),
            &crate::foundation::math::stable_up(&(target - position)),
        );
        Self {
            camera: Camera::perspective(fov, aspect_ratio, near, far),
            view_matrix,
            position,
            fov,
            near,
            far,
            aspect_ratio,
        }
    }

    /// Projection times view
    pub fn view_projection(&self) -> Mat4 {
        self.camera.projection() * self.view_matrix
    }

    /// Projection restricted to `[near, far]`, same fov and aspect
    pub fn sub_frustum_projection(&self, near: f32, far: f32) -> Mat4 {
        Mat4::new_perspective(self.aspect_ratio, self.fov, near, far)
    }

    /// Check the parameters describe a usable perspective camera
    pub fn validate(&self) -> Result<(), String> {
        if !(self.near > 0.0) {
            return Err(format!("near plane must be positive, got {}", self.near));
        }
        if !(self.far > self.near) {
            return Err(format!(
                "far plane ({}) must be beyond near plane ({})",
                self.far, self.near
            ));
        }
        if !(self.aspect_ratio > 0.0) || !self.aspect_ratio.is_finite() {
            return Err(format!("aspect ratio must be positive, got {}", self.aspect_ratio));
        }
        if !(self.fov > 0.0 && self.fov < std::f32::consts::PI) {
            return Err(format!("field of view must be in (0, pi), got {}", self.fov));
        }
        Ok(())
    }
}
