use glam::Vec2;

use super::Viewport;

/// Integer texture size in device pixels.
///
/// Invariant: both axes are at least 1. Constructors clamp rather than fail, so a
/// minimized window or a zero-area layout still yields an allocatable size.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct PixelExtent {
    pub width: u32,
    pub height: u32,
}

impl PixelExtent {
    #[inline]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
        }
    }

    /// `floor(dim * scale_factor)` per axis, clamped to 1px.
    ///
    /// Products within [`SNAP_EPSILON`] of a whole pixel count as that pixel, so a
    /// logical size derived from a physical one maps back to it exactly. Negative and
    /// NaN products saturate to 0 in the float-to-int cast and are then lifted to the
    /// 1px floor.
    pub fn from_viewport(viewport: Viewport, scale_factor: f64) -> Self {
        Self::new(
            device_pixels(viewport.width, scale_factor),
            device_pixels(viewport.height, scale_factor),
        )
    }

    #[inline]
    pub fn aspect(self) -> f32 {
        self.width as f32 / self.height as f32
    }

    /// Resolution as a float vector, the form shaders consume.
    #[inline]
    pub fn resolution(self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }

    #[inline]
    pub fn fits_within(self, max_dimension: u32) -> bool {
        self.width <= max_dimension && self.height <= max_dimension
    }

    #[inline]
    pub fn to_wgpu(self) -> wgpu::Extent3d {
        wgpu::Extent3d {
            width: self.width,
            height: self.height,
            depth_or_array_layers: 1,
        }
    }
}

/// Largest distance below a whole pixel still treated as rounding noise.
const SNAP_EPSILON: f64 = 1e-6;

fn device_pixels(logical: f64, scale_factor: f64) -> u32 {
    let product = logical * scale_factor;
    let nearest = product.round();
    if (product - nearest).abs() < SNAP_EPSILON {
        nearest as u32
    } else {
        product.floor() as u32
    }
}

impl std::fmt::Display for PixelExtent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}
