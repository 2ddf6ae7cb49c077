use winit::event::WindowEvent;

use super::ctx::{FrameCtx, SetupCtx};

/// Control directive returned by app callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Application contract implemented by higher layers.
///
/// Hook order for one window: `on_context_created` once after the GPU context
/// exists, then `on_resize` with the initial drawable size, then any mix of
/// `on_window_event`, `on_resize` and `on_frame`, and finally `on_exit`.
pub trait App {
    /// Called once, right after the GPU context for the window is created.
    fn on_context_created(&mut self, ctx: &mut SetupCtx<'_, '_>) -> AppControl {
        let _ = ctx;
        AppControl::Continue
    }

    /// Drawable size changed, in physical pixels. Never called with a zero dimension.
    fn on_resize(&mut self, width: u32, height: u32) {
        let _ = (width, height);
    }

    /// Called for window events before the runtime handles them.
    fn on_window_event(&mut self, event: &WindowEvent) -> AppControl {
        let _ = event;
        AppControl::Continue
    }

    /// Called once per redraw.
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl;

    /// Called once when the event loop is shutting down.
    fn on_exit(&mut self) {}
}
