use super::PixelExtent;

/// Viewport size in logical pixels.
///
/// Kept in `f64`, as winit reports it, so converting back to device pixels does not
/// lose the pixel an `f32` round trip can drop at fractional scale factors.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    #[inline]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// A viewport measurement together with the device pixel ratio it was taken at.
///
/// This is the unit the resolution synchronizer tracks: any change to either field
/// means the offscreen buffer must be reallocated.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ViewportMetrics {
    pub viewport: Viewport,
    pub scale_factor: f64,
}

impl ViewportMetrics {
    #[inline]
    pub const fn new(viewport: Viewport, scale_factor: f64) -> Self {
        Self { viewport, scale_factor }
    }

    /// Metrics of a surface measured in physical pixels.
    pub fn from_physical(width: u32, height: u32, scale_factor: f64) -> Self {
        Self::new(
            Viewport::new(f64::from(width) / scale_factor, f64::from(height) / scale_factor),
            scale_factor,
        )
    }

    /// Device-pixel size of a buffer covering this viewport.
    #[inline]
    pub fn pixel_extent(self) -> PixelExtent {
        PixelExtent::from_viewport(self.viewport, self.scale_factor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn physical_size_survives_fractional_scale_factors() {
        let mut mismatches = Vec::new();
        for scale in [1.25, 1.5, 1.75, 2.25] {
            for w in 200..2200u32 {
                let extent = ViewportMetrics::from_physical(w, w / 2 + 1, scale).pixel_extent();
                if extent != PixelExtent::new(w, w / 2 + 1) {
                    mismatches.push((scale, w, extent));
                }
            }
        }
        assert!(
            mismatches.is_empty(),
            "{} mismatches, e.g. {:?}",
            mismatches.len(),
            &mismatches[..mismatches.len().min(4)]
        );
    }

    #[test]
    fn physical_to_logical_divides_by_scale() {
        let m = ViewportMetrics::from_physical(1600, 1200, 2.0);
        assert_eq!(m.viewport, Viewport::new(800.0, 600.0));
        assert_eq!(m.scale_factor, 2.0);
    }
}
