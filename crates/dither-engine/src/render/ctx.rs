use crate::coords::{PixelExtent, Viewport, ViewportMetrics};

use super::target::OffscreenTarget;

/// Renderer-facing context for one frame.
pub struct RenderCtx<'a> {
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    pub surface_format: wgpu::TextureFormat,
    /// Swapchain size in physical pixels.
    pub surface_extent: PixelExtent,
    pub viewport: Viewport, // logical px
    pub scale_factor: f64,
    /// Largest texture edge `device` accepts, checked before every allocation.
    pub max_texture_dimension: u32,
}

impl<'a> RenderCtx<'a> {
    #[inline]
    pub fn new(
        device: &'a wgpu::Device,
        queue: &'a wgpu::Queue,
        surface_format: wgpu::TextureFormat,
        surface_extent: PixelExtent,
        metrics: ViewportMetrics,
        max_texture_dimension: u32,
    ) -> Self {
        Self {
            device,
            queue,
            surface_format,
            surface_extent,
            viewport: metrics.viewport,
            scale_factor: metrics.scale_factor,
            max_texture_dimension,
        }
    }

    #[inline]
    pub fn metrics(&self) -> ViewportMetrics {
        ViewportMetrics::new(self.viewport, self.scale_factor)
    }
}

/// The active render destination: an encoder plus the color view passes draw into.
///
/// Passes never assume the destination is the swapchain. Rendering into an offscreen
/// buffer goes through [`redirect`](Self::redirect), which scopes the new destination
/// to a closure so the previous one is back in place when it returns.
pub struct RenderTarget<'a> {
    pub encoder: &'a mut wgpu::CommandEncoder,
    pub color_view: &'a wgpu::TextureView,
    color_format: wgpu::TextureFormat,
    depth: u32,
}

impl<'a> RenderTarget<'a> {
    #[inline]
    pub fn new(
        encoder: &'a mut wgpu::CommandEncoder,
        color_view: &'a wgpu::TextureView,
        color_format: wgpu::TextureFormat,
    ) -> Self {
        Self {
            encoder,
            color_view,
            color_format,
            depth: 0,
        }
    }

    /// Format of the active destination; pipelines drawing here must target it.
    #[inline]
    pub fn format(&self) -> wgpu::TextureFormat {
        self.color_format
    }

    /// Number of redirects enclosing this target; `0` is the frame's own destination.
    #[inline]
    pub fn redirect_depth(&self) -> u32 {
        self.depth
    }

    /// Runs `f` with `buffer` as the active destination, sharing this target's encoder.
    ///
    /// The current destination is saved for the duration of the call and is the
    /// active one again afterwards, whatever it was (swapchain or another buffer).
    pub fn redirect<R>(
        &mut self,
        buffer: &OffscreenTarget,
        f: impl FnOnce(&mut RenderTarget<'_>) -> R,
    ) -> R {
        let mut inner = RenderTarget {
            encoder: &mut *self.encoder,
            color_view: buffer.view(),
            color_format: buffer.format(),
            depth: self.depth + 1,
        };
        f(&mut inner)
    }

    /// Begins a single-attachment pass on the active destination.
    pub fn begin_pass(&mut self, label: &str, load: wgpu::LoadOp<wgpu::Color>) -> wgpu::RenderPass<'_> {
        self.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(label),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: self.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        })
    }
}
