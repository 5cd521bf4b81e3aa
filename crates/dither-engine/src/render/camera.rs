use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec2, Vec3};

use crate::coords::PixelExtent;

/// Camera matrix as uploaded to shaders (column-major).
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
}

impl CameraUniform {
    #[inline]
    pub fn from_matrix(m: Mat4) -> Self {
        Self {
            view_proj: m.to_cols_array_2d(),
        }
    }
}

/// Orthographic camera used for the offscreen child scene.
///
/// The vertical extent is fixed at `[-1, 1]`; the horizontal extent is `±aspect` of the
/// buffer it renders into, so one world unit is the same number of pixels on both axes.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct OrthoCamera {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vec3,
}

impl OrthoCamera {
    pub const NEAR: f32 = 0.1;
    pub const FAR: f32 = 1000.0;

    /// Camera framing a buffer of `extent`, one unit in front of the origin.
    pub fn for_extent(extent: PixelExtent) -> Self {
        let aspect = extent.aspect();
        Self {
            left: -aspect,
            right: aspect,
            top: 1.0,
            bottom: -1.0,
            near: Self::NEAR,
            far: Self::FAR,
            position: Vec3::new(0.0, 0.0, 1.0),
        }
    }

    /// Recomputes the horizontal extent after the buffer's aspect changed.
    pub fn set_aspect(&mut self, aspect: f32) {
        self.left = -aspect;
        self.right = aspect;
    }

    #[inline]
    pub fn aspect(&self) -> f32 {
        self.right
    }

    /// World-space size of the visible area.
    #[inline]
    pub fn view_size(&self) -> Vec2 {
        Vec2::new(self.right - self.left, self.top - self.bottom)
    }

    pub fn view_projection(&self) -> Mat4 {
        let proj = Mat4::orthographic_rh(self.left, self.right, self.bottom, self.top, self.near, self.far);
        let view = Mat4::look_at_rh(self.position, Vec3::ZERO, Vec3::Y);
        proj * view
    }
}

/// Perspective camera of the primary scene.
///
/// Matches the host canvas default: 75° vertical field of view, six units back from the
/// origin. The bridge quad is sized with [`world_viewport`](Self::world_viewport) so it
/// covers the frame exactly at that distance.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PerspectiveCamera {
    pub fov_y_degrees: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vec3,
}

impl PerspectiveCamera {
    pub fn new(aspect: f32) -> Self {
        Self {
            fov_y_degrees: 75.0,
            aspect,
            near: 0.1,
            far: 1000.0,
            position: Vec3::new(0.0, 0.0, 6.0),
        }
    }

    /// Width/height of the view frustum's cross-section at the origin plane.
    pub fn world_viewport(&self) -> Vec2 {
        let distance = self.position.length();
        let height = 2.0 * (self.fov_y_degrees.to_radians() * 0.5).tan() * distance;
        Vec2::new(height * self.aspect, height)
    }

    pub fn view_projection(&self) -> Mat4 {
        let proj = Mat4::perspective_rh(self.fov_y_degrees.to_radians(), self.aspect, self.near, self.far);
        let view = Mat4::look_at_rh(self.position, Vec3::ZERO, Vec3::Y);
        proj * view
    }
}
