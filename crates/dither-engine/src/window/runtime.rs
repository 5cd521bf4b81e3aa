use anyhow::{Context, Result};
use ouroboros::self_referencing;

use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::core::{window_metrics, App as CoreApp, AppControl, FrameCtx, WindowCtx};
use crate::device::{Gpu, GpuInit};
use crate::input::{translate_window_event, InputFrame, InputState};
use crate::time::{FrameClock, FrameTime};

/// Window/runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "dither".to_string(),
            initial_size: LogicalSize::new(1280.0, 720.0),
        }
    }
}

/// Entry point for the runtime.
///
/// Drives exactly one window. Closing it ends the event loop.
pub struct Runtime;

impl Runtime {
    pub fn run<A>(config: RuntimeConfig, gpu_init: GpuInit, app: A) -> Result<()>
    where
        A: 'static + CoreApp,
    {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut host = Host::new(config, gpu_init, app);

        event_loop
            .run_app(&mut host)
            .context("winit event loop terminated with error")?;

        match host.failure.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

#[self_referencing]
struct WindowEntry {
    input_state: InputState,
    input_frame: InputFrame,
    clock: FrameClock,

    window: Window,

    #[borrows(window)]
    #[covariant]
    gpu: Gpu<'this>,
}

impl WindowEntry {
    fn id(&self) -> WindowId {
        self.with_window(|w| w.id())
    }

    fn request_redraw(&self) {
        self.with_window(|w| w.request_redraw());
    }
}

struct Host<A>
where
    A: CoreApp + 'static,
{
    config: RuntimeConfig,
    gpu_init: GpuInit,
    app: A,

    /// `None` before the first `resumed` and after the window closed.
    entry: Option<WindowEntry>,
    /// Set when the window could not be mounted; returned from [`Runtime::run`].
    failure: Option<anyhow::Error>,
}

impl<A> Host<A>
where
    A: CoreApp + 'static,
{
    fn new(config: RuntimeConfig, gpu_init: GpuInit, app: A) -> Self {
        Self {
            config,
            gpu_init,
            app,
            entry: None,
            failure: None,
        }
    }

    /// Creates the window and its GPU context, then reports the initial viewport.
    fn mount(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size);

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        let gpu_init = self.gpu_init.clone();
        let entry = WindowEntryTryBuilder {
            input_state: InputState::default(),
            input_frame: InputFrame::default(),
            clock: FrameClock::default(),
            window,
            gpu_builder: |w| pollster::block_on(Gpu::new(w, gpu_init)),
        }
        .try_build()
        .context("GPU initialization failed for window")?;

        // The pipeline learns the viewport before the first frame.
        let metrics = entry.with_window(|w| window_metrics(w));
        log::info!(
            "window mounted: viewport {}x{} @ {}",
            metrics.viewport.width,
            metrics.viewport.height,
            metrics.scale_factor
        );
        self.app.on_viewport_changed(metrics);

        entry.request_redraw();
        self.entry = Some(entry);
        Ok(())
    }

    /// Drops the GPU context before the window it borrows, then stops the loop.
    fn unmount(&mut self, event_loop: &ActiveEventLoop) {
        self.entry = None;
        event_loop.exit();
    }

    fn remeasure(&mut self) {
        let Some(entry) = self.entry.as_mut() else {
            return;
        };
        let (size, metrics) = entry.with_window(|w| (w.inner_size(), window_metrics(w)));
        entry.with_gpu_mut(|gpu| gpu.resize(size));
        log::debug!(
            "viewport {}x{} @ {}",
            metrics.viewport.width,
            metrics.viewport.height,
            metrics.scale_factor
        );
        self.app.on_viewport_changed(metrics);
        entry.request_redraw();
    }

    fn draw_frame(&mut self) -> AppControl {
        let Some(entry) = self.entry.as_mut() else {
            return AppControl::Continue;
        };
        let app = &mut self.app;

        entry.with_mut(|fields| {
            let time: FrameTime = fields.clock.tick();
            let control = {
                let mut ctx = FrameCtx {
                    window: WindowCtx { window: fields.window },
                    gpu: fields.gpu,
                    input: fields.input_state,
                    input_frame: fields.input_frame,
                    time,
                };
                app.on_frame(&mut ctx)
            };

            // Per-frame deltas are consumed once the frame has seen them.
            fields.input_frame.clear();
            control
        })
    }
}

impl<A> ApplicationHandler for Host<A>
where
    A: CoreApp + 'static,
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.entry.is_some() {
            return;
        }

        if let Err(e) = self.mount(event_loop) {
            log::error!("failed to create window: {e:#}");
            self.failure = Some(e);
            event_loop.exit();
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        event_loop.set_control_flow(ControlFlow::Wait);

        // Continuous redraw: the effect animates every frame.
        if let Some(entry) = self.entry.as_ref() {
            entry.request_redraw();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(entry) = self.entry.as_mut() else {
            return;
        };
        if entry.id() != window_id {
            return;
        }

        entry.with_mut(|fields| {
            if let Some(ev) = translate_window_event(fields.window, &event) {
                fields.input_state.apply_event(fields.input_frame, ev);
            }
        });

        if self.app.on_window_event(&event) == AppControl::Exit {
            self.unmount(event_loop);
            return;
        }

        match event {
            WindowEvent::CloseRequested => self.unmount(event_loop),
            WindowEvent::Resized(_) | WindowEvent::ScaleFactorChanged { .. } => self.remeasure(),
            WindowEvent::RedrawRequested => {
                if self.draw_frame() == AppControl::Exit {
                    self.unmount(event_loop);
                }
            }
            _ => {}
        }
    }
}
