use crate::coords::{PixelExtent, ViewportMetrics};
use crate::render::{AllocError, OffscreenTarget, OrthoCamera, RenderCtx, RenderTarget};

use super::scene::{ChildScene, FrameInput, SceneView};

/// The offscreen buffer, its child scene and the camera that frames it, owned together.
///
/// Nothing here is visible to the primary scene. The buffer only reaches the display
/// through the bridge, which samples it as a texture.
pub struct OffscreenCompositor {
    scene: ChildScene,
    framed: Framed<OffscreenTarget>,
}

impl OffscreenCompositor {
    /// Color format of the child buffer.
    pub const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;

    pub fn new(scene: ChildScene) -> Self {
        Self {
            scene,
            framed: Framed::new(),
        }
    }

    /// Allocates the buffer at `floor(viewport * dpr)` and frames it with a fresh camera.
    ///
    /// Replaces any existing buffer. Zero-area viewports clamp to 1px.
    pub fn initialize(
        &mut self,
        ctx: &RenderCtx<'_>,
        metrics: ViewportMetrics,
    ) -> Result<(&OffscreenTarget, &OrthoCamera), AllocError> {
        self.framed
            .initialize(metrics.pixel_extent(), |extent| Self::allocate(ctx, extent))
    }

    /// Brings the buffer to `floor(viewport * dpr)`, initializing it if needed.
    ///
    /// Returns `Ok(true)` when a new texture was allocated. On error the previous buffer
    /// and camera stay in place.
    pub fn resize(&mut self, ctx: &RenderCtx<'_>, metrics: ViewportMetrics) -> Result<bool, AllocError> {
        self.framed.resize(
            metrics.pixel_extent(),
            |extent| Self::allocate(ctx, extent),
            |buffer, extent| buffer.resize(ctx.device, extent, ctx.max_texture_dimension),
        )
    }

    fn allocate(ctx: &RenderCtx<'_>, extent: PixelExtent) -> Result<OffscreenTarget, AllocError> {
        OffscreenTarget::new(
            ctx.device,
            "child buffer",
            Self::FORMAT,
            extent,
            ctx.max_texture_dimension,
        )
    }

    /// Renders the child scene into the buffer.
    ///
    /// The destination is redirected for the duration of the pass only; whatever
    /// `target` pointed at before is active again on return. Returns `false` when no
    /// buffer has been allocated yet.
    pub fn render_frame(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        frame: &FrameInput,
    ) -> bool {
        let Some(buffer) = self.framed.buffer.as_ref() else {
            return false;
        };
        let camera = &self.framed.camera;

        let view = SceneView {
            camera,
            view_proj: camera.view_projection(),
            extent: buffer.extent(),
            format: buffer.format(),
            frame,
        };
        self.scene.prepare(ctx, &view);

        let clear = self.scene.clear_color().to_wgpu();
        let scene = &self.scene;
        target.redirect(buffer, |offscreen| {
            let mut pass = offscreen.begin_pass("child scene pass", wgpu::LoadOp::Clear(clear));
            scene.draw(&mut pass);
        });
        true
    }

    #[inline]
    pub fn buffer(&self) -> Option<&OffscreenTarget> {
        self.framed.buffer.as_ref()
    }

    #[inline]
    pub fn camera(&self) -> &OrthoCamera {
        &self.framed.camera
    }

    #[inline]
    pub fn scene(&self) -> &ChildScene {
        &self.scene
    }

    #[inline]
    pub fn scene_mut(&mut self) -> &mut ChildScene {
        &mut self.scene
    }
}

/// A buffer and the ortho camera framing it, kept in step.
///
/// Generic over the buffer so the reallocation bookkeeping does not need a device.
struct Framed<B> {
    buffer: Option<B>,
    camera: OrthoCamera,
}

impl<B> Framed<B> {
    fn new() -> Self {
        Self {
            buffer: None,
            camera: OrthoCamera::for_extent(PixelExtent::new(1, 1)),
        }
    }

    fn initialize<A>(&mut self, extent: PixelExtent, allocate: A) -> Result<(&B, &OrthoCamera), AllocError>
    where
        A: FnOnce(PixelExtent) -> Result<B, AllocError>,
    {
        let buffer = allocate(extent)?;
        self.camera = OrthoCamera::for_extent(extent);
        let buffer: &B = self.buffer.insert(buffer);
        Ok((buffer, &self.camera))
    }

    fn resize<A, R>(&mut self, extent: PixelExtent, allocate: A, reallocate: R) -> Result<bool, AllocError>
    where
        A: FnOnce(PixelExtent) -> Result<B, AllocError>,
        R: FnOnce(&mut B, PixelExtent) -> Result<bool, AllocError>,
    {
        let Some(buffer) = self.buffer.as_mut() else {
            self.initialize(extent, allocate)?;
            return Ok(true);
        };

        let reallocated = reallocate(buffer, extent)?;
        if reallocated {
            self.camera.set_aspect(extent.aspect());
        }
        Ok(reallocated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Stands in for a texture: only its size matters to the bookkeeping.
    #[derive(Debug, PartialEq)]
    struct FakeBuffer(PixelExtent);

    fn alloc(extent: PixelExtent) -> Result<FakeBuffer, AllocError> {
        Ok(FakeBuffer(extent))
    }

    fn realloc(buffer: &mut FakeBuffer, extent: PixelExtent) -> Result<bool, AllocError> {
        if buffer.0 == extent {
            return Ok(false);
        }
        buffer.0 = extent;
        Ok(true)
    }

    fn out_of_memory(extent: PixelExtent) -> AllocError {
        AllocError::OutOfMemory {
            requested: extent,
            reason: "Out of Memory".to_string(),
        }
    }

    #[test]
    fn first_resize_initializes() {
        let mut framed = Framed::new();
        let extent = PixelExtent::new(1600, 1200);

        let allocated = framed.resize(extent, alloc, |_: &mut FakeBuffer, _| unreachable!()).unwrap();

        assert!(allocated);
        assert_eq!(framed.buffer, Some(FakeBuffer(extent)));
        assert_eq!(framed.camera, OrthoCamera::for_extent(extent));
    }

    #[test]
    fn camera_follows_new_aspect_after_resize() {
        let mut framed = Framed::new();
        framed.initialize(PixelExtent::new(800, 800), alloc).unwrap();
        assert!((framed.camera.aspect() - 1.0).abs() < 1e-6);

        let wide = PixelExtent::new(1600, 800);
        assert!(framed.resize(wide, alloc, realloc).unwrap());
        assert!((framed.camera.aspect() - 2.0).abs() < 1e-6);
        assert_eq!(framed.buffer, Some(FakeBuffer(wide)));
    }

    #[test]
    fn unchanged_extent_keeps_camera() {
        let mut framed = Framed::new();
        let extent = PixelExtent::new(640, 480);
        framed.initialize(extent, alloc).unwrap();
        let before = framed.camera;

        assert!(!framed.resize(extent, alloc, realloc).unwrap());
        assert_eq!(framed.camera, before);
    }

    #[test]
    fn failed_resize_keeps_buffer_and_camera() {
        let mut framed = Framed::new();
        let extent = PixelExtent::new(800, 600);
        framed.initialize(extent, alloc).unwrap();
        let before = framed.camera;

        let huge = PixelExtent::new(4000, 1000);
        let err = framed
            .resize(huge, alloc, |_, e| Err(out_of_memory(e)))
            .unwrap_err();

        assert_eq!(err.requested(), huge);
        assert_eq!(framed.buffer, Some(FakeBuffer(extent)));
        assert_eq!(framed.camera, before);
    }

    #[test]
    fn failed_initialize_leaves_nothing_allocated() {
        let mut framed: Framed<FakeBuffer> = Framed::new();
        let extent = PixelExtent::new(320, 200);

        assert!(framed.initialize(extent, |e| Err(out_of_memory(e))).is_err());
        assert!(framed.buffer.is_none());
    }

    #[test]
    fn initialize_replaces_existing_buffer() {
        let mut framed = Framed::new();
        framed.initialize(PixelExtent::new(100, 100), alloc).unwrap();

        let (buffer, camera) = framed.initialize(PixelExtent::new(300, 100), alloc).unwrap();

        assert_eq!(buffer, &FakeBuffer(PixelExtent::new(300, 100)));
        assert!((camera.aspect() - 3.0).abs() < 1e-6);
    }
}
