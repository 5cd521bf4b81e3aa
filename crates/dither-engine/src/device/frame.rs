/// A single acquired swapchain frame.
///
/// Short-lived: holding the surface texture blocks acquisition of the next one, so
/// the frame is recorded and handed back to [`Gpu::submit`](super::Gpu::submit) within
/// the same redraw callback.
pub struct GpuFrame {
    pub surface_texture: wgpu::SurfaceTexture,
    pub view: wgpu::TextureView,
    pub encoder: wgpu::CommandEncoder,
}
