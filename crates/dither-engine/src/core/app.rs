use winit::event::WindowEvent;

use crate::coords::ViewportMetrics;

use super::ctx::FrameCtx;

/// Control directive returned by app callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Application contract implemented by higher layers.
pub trait App {
    /// Called for every event of the window, after input state has seen it.
    fn on_window_event(&mut self, event: &WindowEvent) -> AppControl {
        let _ = event;
        AppControl::Continue
    }

    /// Called when the window is mounted and whenever its logical size or scale factor
    /// changes. Frames rendered afterwards see the new metrics.
    fn on_viewport_changed(&mut self, metrics: ViewportMetrics) {
        let _ = metrics;
    }

    /// Called once per rendered frame.
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl;
}
