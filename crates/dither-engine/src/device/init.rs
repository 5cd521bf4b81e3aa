/// Initialization parameters for the GPU layer.
#[derive(Debug, Clone)]
pub struct GpuInit {
    /// Prefer an sRGB surface format when available.
    ///
    /// The dither stage writes already-quantized levels; an sRGB surface encodes them
    /// on store so the palette steps land evenly on screen.
    pub prefer_srgb: bool,

    /// Present mode (swap behavior). FIFO is the portable choice.
    pub present_mode: wgpu::PresentMode,

    /// Optional alpha mode preference for the surface.
    ///
    /// If provided but unsupported on the current surface, a supported mode is selected.
    pub alpha_mode: Option<wgpu::CompositeAlphaMode>,

    /// Required wgpu features. The pipeline needs none.
    pub required_features: wgpu::Features,

    /// Limits requested from the adapter/device.
    ///
    /// `max_texture_dimension_2d` bounds the offscreen buffers; requests above it are
    /// reported as allocation failures instead of reaching wgpu validation.
    pub required_limits: wgpu::Limits,

    /// Desired maximum frame latency for the surface (hint).
    pub desired_maximum_frame_latency: u32,
}

impl Default for GpuInit {
    fn default() -> Self {
        Self {
            prefer_srgb: true,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: None,
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            desired_maximum_frame_latency: 2,
        }
    }
}
