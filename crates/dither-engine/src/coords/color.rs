/// Linear straight-alpha RGBA color.
///
/// The dither stage quantizes `rgb` independently and passes `a` through, so colors
/// are kept straight (not premultiplied) throughout the pipeline.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct ColorRgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl ColorRgba {
    #[inline]
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque gray with all three channels set to `v`.
    #[inline]
    pub const fn gray(v: f32) -> Self {
        Self::new(v, v, v, 1.0)
    }

    #[inline]
    pub const fn black() -> Self {
        Self::new(0.0, 0.0, 0.0, 1.0)
    }

    #[inline]
    pub const fn white() -> Self {
        Self::new(1.0, 1.0, 1.0, 1.0)
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.r.is_finite() && self.g.is_finite() && self.b.is_finite() && self.a.is_finite()
    }

    /// Applies `f` to each color channel, leaving alpha untouched.
    #[inline]
    pub fn map_rgb(self, mut f: impl FnMut(f32) -> f32) -> Self {
        Self::new(f(self.r), f(self.g), f(self.b), self.a)
    }

    #[inline]
    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    #[inline]
    pub fn to_wgpu(self) -> wgpu::Color {
        wgpu::Color {
            r: self.r as f64,
            g: self.g as f64,
            b: self.b as f64,
            a: self.a as f64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_rgb_leaves_alpha_alone() {
        let c = ColorRgba::new(0.2, 0.4, 0.6, 0.5).map_rgb(|v| v * 2.0);
        assert_eq!(c, ColorRgba::new(0.4, 0.8, 1.2, 0.5));
    }

    #[test]
    fn gray_is_opaque() {
        assert_eq!(ColorRgba::gray(0.6).a, 1.0);
    }
}
