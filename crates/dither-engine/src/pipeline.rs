//! Frame pipeline: child buffer, bridge into the frame buffer, dither onto the display.

use std::fmt;

use crate::compositor::{
    ContentSource, DisplayBridge, FrameInput, OffscreenCompositor, ResolutionSync, WaveControls,
};
use crate::coords::{ColorRgba, ViewportMetrics};
use crate::dither::{ConfigError, DitherParameters, DitherPass, DitherProps};
use crate::render::{AllocError, OffscreenTarget, RenderCtx, RenderTarget};

// ── stages ────────────────────────────────────────────────────────────────

/// One step of a frame. A frame runs every stage exactly once, in [`Stage::ORDER`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Stage {
    /// Child content into the offscreen buffer.
    Offscreen,
    /// Offscreen buffer onto the frame buffer, through the primary scene.
    Bridge,
    /// Frame buffer onto the display, quantized.
    Dither,
}

impl Stage {
    pub const ORDER: [Stage; 3] = [Stage::Offscreen, Stage::Bridge, Stage::Dither];

    pub fn name(self) -> &'static str {
        match self {
            Stage::Offscreen => "offscreen",
            Stage::Bridge => "bridge",
            Stage::Dither => "dither",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A stage was started out of [`Stage::ORDER`].
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct OrderViolation {
    /// `None` when every stage of the frame already ran.
    pub expected: Option<Stage>,
    pub got: Stage,
}

impl fmt::Display for OrderViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.expected {
            Some(expected) => write!(f, "stage '{}' started before '{}'", self.got, expected),
            None => write!(f, "stage '{}' started after the frame completed", self.got),
        }
    }
}

impl std::error::Error for OrderViolation {}

/// Position within [`Stage::ORDER`] for the frame being recorded.
#[derive(Debug, Default, Clone)]
pub struct StageCursor {
    next: usize,
}

impl StageCursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `stage` as started, rejecting anything but the next stage in order.
    pub fn begin(&mut self, stage: Stage) -> Result<(), OrderViolation> {
        let expected = Stage::ORDER.get(self.next).copied();
        if expected != Some(stage) {
            return Err(OrderViolation { expected, got: stage });
        }
        self.next += 1;
        Ok(())
    }

    #[inline]
    pub fn is_complete(&self) -> bool {
        self.next == Stage::ORDER.len()
    }
}

// ── errors ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum RenderError {
    Config(ConfigError),
    Allocation(AllocError),
    Order(OrderViolation),
    /// A stage ran before the buffer it reads existed.
    MissingBuffer(Stage),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::Config(e) => write!(f, "invalid dither configuration: {e}"),
            RenderError::Allocation(e) => write!(f, "buffer allocation failed: {e}"),
            RenderError::Order(e) => write!(f, "{e}"),
            RenderError::MissingBuffer(stage) => write!(f, "stage '{stage}' has no buffer to work with"),
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RenderError::Config(e) => Some(e),
            RenderError::Allocation(e) => Some(e),
            RenderError::Order(e) => Some(e),
            RenderError::MissingBuffer(_) => None,
        }
    }
}

impl From<ConfigError> for RenderError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<AllocError> for RenderError {
    fn from(e: AllocError) -> Self {
        Self::Allocation(e)
    }
}

impl From<OrderViolation> for RenderError {
    fn from(e: OrderViolation) -> Self {
        Self::Order(e)
    }
}

// ── pipeline ──────────────────────────────────────────────────────────────

/// The whole effect: owns every buffer and pass, and records one frame at a time.
///
/// Viewport changes are queued with [`observe_viewport`](Self::observe_viewport) and
/// applied at the start of the next frame, before any stage runs.
pub struct DitherPipeline {
    params: DitherParameters,
    sync: ResolutionSync,
    compositor: OffscreenCompositor,
    bridge: DisplayBridge,
    frame_buffer: Option<OffscreenTarget>,
    dither: DitherPass,
    wave: Option<WaveControls>,
    skipped_frames: u64,
}

impl DitherPipeline {
    /// Format of the composited frame buffer the dither stage reads.
    pub const FRAME_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;

    pub fn new(content: ContentSource, params: DitherParameters) -> Self {
        let resolved = content.resolve();
        Self {
            params,
            sync: ResolutionSync::new(),
            compositor: OffscreenCompositor::new(resolved.scene),
            bridge: DisplayBridge::new(),
            frame_buffer: None,
            dither: DitherPass::new(),
            wave: resolved.wave,
            skipped_frames: 0,
        }
    }

    #[inline]
    pub fn params(&self) -> DitherParameters {
        self.params
    }

    /// Validates and applies new props. Invalid props leave the current ones in place.
    pub fn set_props(&mut self, props: DitherProps) -> Result<(), RenderError> {
        self.params = props.validate()?;
        log::debug!(
            "pipeline: color_num={} pixel_size={}",
            self.params.palette_size(),
            self.params.pixel_block_size()
        );
        Ok(())
    }

    pub fn set_clear_color(&mut self, color: ColorRgba) {
        self.bridge.set_clear_color(color.to_wgpu());
    }

    /// Queues a viewport/DPR change for the next frame.
    pub fn observe_viewport(&mut self, metrics: ViewportMetrics) {
        self.sync.observe(metrics);
    }

    /// Controls of the generated wave content, if that is what the pipeline renders.
    pub fn wave_controls(&self) -> Option<&WaveControls> {
        self.wave.as_ref()
    }

    #[inline]
    pub fn compositor(&self) -> &OffscreenCompositor {
        &self.compositor
    }

    #[inline]
    pub fn sync(&self) -> &ResolutionSync {
        &self.sync
    }

    /// Frames skipped so far because a buffer could not be allocated.
    #[inline]
    pub fn skipped_frames(&self) -> u64 {
        self.skipped_frames
    }

    /// Records a frame, logging and skipping it on failure.
    ///
    /// A skipped frame leaves the destination as the caller cleared it; pending
    /// resizes stay queued and are retried on the next call.
    pub fn render_or_skip(&mut self, ctx: &RenderCtx<'_>, target: &mut RenderTarget<'_>, frame: &FrameInput) {
        match self.render(ctx, target, frame) {
            Ok(()) => {
                if self.skipped_frames > 0 {
                    log::info!("pipeline: recovered after {} skipped frame(s)", self.skipped_frames);
                    self.skipped_frames = 0;
                }
            }
            Err(e) => {
                if self.skipped_frames == 0 {
                    log::warn!("pipeline: skipping frame: {e}");
                } else {
                    log::debug!("pipeline: skipping frame: {e}");
                }
                self.skipped_frames += 1;
            }
        }
    }

    /// Records all stages of one frame into `target`'s encoder.
    pub fn render(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        frame: &FrameInput,
    ) -> Result<(), RenderError> {
        let compositor = &mut self.compositor;
        if let Some(extent) = self.sync.converge(|m| compositor.resize(ctx, m).map(|_| ()))? {
            log::debug!("pipeline: child buffer synchronized to {extent}");
        }
        self.ensure_frame_buffer(ctx)?;

        let mut cursor = StageCursor::new();
        for stage in Stage::ORDER {
            cursor.begin(stage)?;
            self.run_stage(stage, ctx, target, frame)?;
        }
        debug_assert!(cursor.is_complete());
        Ok(())
    }

    fn run_stage(
        &mut self,
        stage: Stage,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        frame: &FrameInput,
    ) -> Result<(), RenderError> {
        match stage {
            Stage::Offscreen => {
                if !self.compositor.render_frame(ctx, target, frame) {
                    return Err(RenderError::MissingBuffer(stage));
                }
            }
            Stage::Bridge => {
                let (Some(child), Some(frame_buffer)) = (self.compositor.buffer(), self.frame_buffer.as_ref()) else {
                    return Err(RenderError::MissingBuffer(stage));
                };
                let bridge = &mut self.bridge;
                bridge.set_aspect(frame_buffer.extent().aspect());
                target.redirect(frame_buffer, |composited| bridge.render(ctx, composited, child));
            }
            Stage::Dither => {
                let Some(frame_buffer) = self.frame_buffer.as_ref() else {
                    return Err(RenderError::MissingBuffer(stage));
                };
                debug_assert_eq!(target.redirect_depth(), 0, "dither writes the frame's own destination");
                self.dither.render(ctx, target, frame_buffer, &self.params);
            }
        }
        Ok(())
    }

    /// Keeps the composited frame buffer at the surface size.
    fn ensure_frame_buffer(&mut self, ctx: &RenderCtx<'_>) -> Result<(), AllocError> {
        let extent = ctx.surface_extent;
        match self.frame_buffer.as_mut() {
            Some(buffer) => {
                buffer.resize(ctx.device, extent, ctx.max_texture_dimension)?;
            }
            None => {
                self.frame_buffer = Some(OffscreenTarget::new(
                    ctx.device,
                    "frame buffer",
                    Self::FRAME_FORMAT,
                    extent,
                    ctx.max_texture_dimension,
                )?);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::{PixelExtent, Viewport};

    #[test]
    fn stages_run_in_declared_order() {
        let mut cursor = StageCursor::new();
        for stage in Stage::ORDER {
            assert!(cursor.begin(stage).is_ok());
        }
        assert!(cursor.is_complete());
    }

    #[test]
    fn dither_before_bridge_is_rejected() {
        let mut cursor = StageCursor::new();
        cursor.begin(Stage::Offscreen).unwrap();
        let err = cursor.begin(Stage::Dither).unwrap_err();
        assert_eq!(err, OrderViolation { expected: Some(Stage::Bridge), got: Stage::Dither });
        assert_eq!(err.to_string(), "stage 'dither' started before 'bridge'");

        // The cursor does not advance on a rejected stage.
        assert!(cursor.begin(Stage::Bridge).is_ok());
    }

    #[test]
    fn stages_cannot_repeat_or_run_after_completion() {
        let mut cursor = StageCursor::new();
        cursor.begin(Stage::Offscreen).unwrap();
        assert!(cursor.begin(Stage::Offscreen).is_err());

        cursor.begin(Stage::Bridge).unwrap();
        cursor.begin(Stage::Dither).unwrap();
        let err = cursor.begin(Stage::Offscreen).unwrap_err();
        assert_eq!(err.expected, None);
        assert_eq!(err.to_string(), "stage 'offscreen' started after the frame completed");
    }

    #[test]
    fn offscreen_comes_first_and_dither_last() {
        assert_eq!(Stage::ORDER.first(), Some(&Stage::Offscreen));
        assert_eq!(Stage::ORDER.last(), Some(&Stage::Dither));
    }

    #[test]
    fn invalid_props_keep_current_params() {
        let mut pipeline = DitherPipeline::new(ContentSource::default(), DitherParameters::default());

        let err = pipeline
            .set_props(DitherProps { color_num: 1.0, pixel_size: 2.0 })
            .unwrap_err();
        assert!(matches!(err, RenderError::Config(ConfigError::PaletteTooSmall(_))));
        assert_eq!(pipeline.params(), DitherParameters::default());

        pipeline.set_props(DitherProps { color_num: 8.0, pixel_size: 3.0 }).unwrap();
        assert_eq!(pipeline.params().palette_size(), 8.0);
        assert_eq!(pipeline.params().pixel_block_size(), 3.0);
    }

    #[test]
    fn viewport_changes_wait_for_next_frame() {
        let mut pipeline = DitherPipeline::new(ContentSource::default(), DitherParameters::default());
        let metrics = ViewportMetrics::new(Viewport::new(800.0, 600.0), 2.0);
        pipeline.observe_viewport(metrics);

        assert_eq!(pipeline.sync().pending(), Some(metrics));
        assert_eq!(metrics.pixel_extent(), PixelExtent::new(1600, 1200));
        assert!(pipeline.compositor().buffer().is_none());
    }

    #[test]
    fn generated_content_keeps_wave_controls() {
        let pipeline = DitherPipeline::new(ContentSource::default(), DitherParameters::default());
        assert!(pipeline.wave_controls().is_some());
        assert_eq!(pipeline.skipped_frames(), 0);
    }

    #[test]
    fn allocation_error_message_is_wrapped() {
        let e = RenderError::from(AllocError::ExceedsLimit {
            requested: PixelExtent::new(20000, 10),
            max_dimension: 8192,
        });
        assert_eq!(
            e.to_string(),
            "buffer allocation failed: offscreen buffer 20000x10 exceeds device limit of 8192px per axis"
        );
    }
}
