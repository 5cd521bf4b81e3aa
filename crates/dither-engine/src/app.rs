//! High-level entry point: a window showing dithered content.
//!
//! ```rust,ignore
//! DitherApp::new()
//!     .title("dither")
//!     .color_num(4.0)
//!     .pixel_size(2.0)
//!     .content(ContentSource::Generated(WaveParams::default()))
//!     .run()?;
//! ```

use anyhow::Result;
use winit::dpi::LogicalSize;

use crate::compositor::{ContentSource, FrameInput};
use crate::coords::{ColorRgba, ViewportMetrics};
use crate::core::{App as EngineApp, AppControl, FrameCtx};
use crate::device::GpuInit;
use crate::dither::DitherProps;
use crate::input::InputFrame;
use crate::pipeline::DitherPipeline;
use crate::window::{Runtime, RuntimeConfig};

type InputHook = Box<dyn FnMut(&InputFrame, &mut DitherPipeline) -> AppControl>;

/// Builder for a single-window dither application.
///
/// Props are clamped into range before the pipeline sees them; use
/// [`DitherPipeline::set_props`] from an input hook for validated runtime changes.
pub struct DitherApp {
    title: String,
    width: f64,
    height: f64,
    props: DitherProps,
    content: ContentSource,
    clear_color: ColorRgba,
    gpu_init: GpuInit,
    on_input: Option<InputHook>,
}

impl DitherApp {
    pub fn new() -> Self {
        Self {
            title: "dither".to_string(),
            width: 1280.0,
            height: 720.0,
            props: DitherProps::default(),
            content: ContentSource::default(),
            clear_color: ColorRgba::black(),
            gpu_init: GpuInit::default(),
            on_input: None,
        }
    }

    /// Set the window title.
    pub fn title(mut self, t: impl Into<String>) -> Self {
        self.title = t.into();
        self
    }

    /// Set the initial window size in logical pixels.
    pub fn size(mut self, width: f64, height: f64) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Levels per color channel.
    pub fn color_num(mut self, n: f32) -> Self {
        self.props.color_num = n;
        self
    }

    /// Edge of a dither block in device pixels.
    pub fn pixel_size(mut self, px: f32) -> Self {
        self.props.pixel_size = px;
        self
    }

    pub fn props(mut self, props: DitherProps) -> Self {
        self.props = props;
        self
    }

    pub fn content(mut self, content: impl Into<ContentSource>) -> Self {
        self.content = content.into();
        self
    }

    /// Color shown when a frame has to be skipped.
    pub fn clear_color(mut self, color: ColorRgba) -> Self {
        self.clear_color = color;
        self
    }

    pub fn gpu_init(mut self, init: GpuInit) -> Self {
        self.gpu_init = init;
        self
    }

    /// Called at the start of every frame with that frame's input deltas.
    pub fn on_input<F>(mut self, f: F) -> Self
    where
        F: FnMut(&InputFrame, &mut DitherPipeline) -> AppControl + 'static,
    {
        self.on_input = Some(Box::new(f));
        self
    }

    /// Opens the window and runs until it is closed or a hook asks to exit.
    pub fn run(self) -> Result<()> {
        let config = RuntimeConfig {
            title: self.title.clone(),
            initial_size: LogicalSize::new(self.width, self.height),
        };
        let gpu_init = self.gpu_init.clone();
        Runtime::run(config, gpu_init, DitherHost::new(self))
    }
}

impl Default for DitherApp {
    fn default() -> Self {
        Self::new()
    }
}

// ── DitherHost ────────────────────────────────────────────────────────────

/// Internal state implementing `core::App`. User code never sees this type.
struct DitherHost {
    pipeline: DitherPipeline,
    clear_color: ColorRgba,
    on_input: Option<InputHook>,
}

impl DitherHost {
    fn new(app: DitherApp) -> Self {
        if let Err(e) = app.props.validate() {
            log::warn!("dither props out of range ({e}); clamping");
        }
        let params = app.props.clamped();
        log::info!(
            "dither: color_num={} pixel_size={}",
            params.palette_size(),
            params.pixel_block_size()
        );

        let mut pipeline = DitherPipeline::new(app.content, params);
        pipeline.set_clear_color(app.clear_color);

        Self {
            pipeline,
            clear_color: app.clear_color,
            on_input: app.on_input,
        }
    }
}

impl EngineApp for DitherHost {
    fn on_viewport_changed(&mut self, metrics: ViewportMetrics) {
        self.pipeline.observe_viewport(metrics);
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        if let Some(hook) = self.on_input.as_mut() {
            if hook(ctx.input_frame, &mut self.pipeline) == AppControl::Exit {
                return AppControl::Exit;
            }
        }

        let scale_factor = ctx.window.window.scale_factor() as f32;
        let frame = FrameInput {
            dt: ctx.time.dt,
            elapsed: ctx.time.elapsed,
            pointer: ctx.input.pointer_physical(scale_factor),
        };

        let pipeline = &mut self.pipeline;
        ctx.render(self.clear_color, |rctx, target| {
            pipeline.render_or_skip(rctx, target, &frame);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::PixelExtent;

    #[test]
    fn viewport_changes_reach_the_pipeline() {
        let mut host = DitherHost::new(DitherApp::new());
        assert_eq!(host.pipeline.sync().pending(), None);

        let mounted = ViewportMetrics::from_physical(1280, 720, 1.0);
        host.on_viewport_changed(mounted);
        assert_eq!(host.pipeline.sync().pending(), Some(mounted));

        // A scale change arriving before the next frame replaces the pending one.
        let rescaled = ViewportMetrics::from_physical(1281, 721, 1.75);
        host.on_viewport_changed(rescaled);
        assert_eq!(host.pipeline.sync().pending(), Some(rescaled));
        assert_eq!(rescaled.pixel_extent(), PixelExtent::new(1281, 721));
    }

    #[test]
    fn out_of_range_props_are_clamped_at_startup() {
        let host = DitherHost::new(DitherApp::new().color_num(0.0).pixel_size(-3.0));
        let params = host.pipeline.params();
        assert_eq!(params.palette_size(), 2.0);
        assert_eq!(params.pixel_block_size(), 1.0);
    }
}
