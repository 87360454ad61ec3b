//! Pointer-to-world projection for hit-actions
//!
//! Pointer coordinates are normalized device coordinates: x and y in [-1, 1],
//! y pointing up, (0, 0) at the screen center.

use glam::{Mat4, Vec2, Vec3, Vec4Swizzles};

use crate::tuning::CameraTuning;

/// A half-line in world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Unit direction
    pub dir: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, dir: Vec3) -> Self {
        Self {
            origin,
            dir: dir.normalize_or_zero(),
        }
    }

    /// Point at distance `t` along the ray
    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.dir * t
    }
}

/// Perspective camera looking at the play area
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Vec3,
    view_proj: Mat4,
    inv_view_proj: Mat4,
}

impl Camera {
    pub fn new(tuning: &CameraTuning) -> Self {
        let proj = Mat4::perspective_rh_gl(
            tuning.fov_deg.to_radians(),
            tuning.aspect,
            tuning.near,
            tuning.far,
        );
        let view = Mat4::look_at_rh(tuning.position, tuning.look_at, Vec3::Y);
        let view_proj = proj * view;
        Self {
            position: tuning.position,
            view_proj,
            inv_view_proj: view_proj.inverse(),
        }
    }

    /// Ray through a pointer position, starting on the near plane
    pub fn ray(&self, pointer: Vec2) -> Ray {
        let near = self
            .inv_view_proj
            .project_point3(Vec3::new(pointer.x, pointer.y, -1.0));
        let far = self
            .inv_view_proj
            .project_point3(Vec3::new(pointer.x, pointer.y, 1.0));
        Ray::new(near, far - near)
    }

    /// Pointer position of a world point, or `None` if it is behind the camera
    pub fn project(&self, world: Vec3) -> Option<Vec2> {
        let clip = self.view_proj * world.extend(1.0);
        if clip.w <= f32::EPSILON {
            return None;
        }
        let ndc = clip.xyz() / clip.w;
        Some(ndc.truncate())
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(&CameraTuning::default())
    }
}
