//! Input subsystem.
//!
//! Public API is platform-agnostic and does not expose winit types.
//! Runtime code translates platform events into `InputEvent`s.

mod frame;
mod platform;
mod state;
mod types;

pub use frame::InputFrame;
pub use state::InputState;
pub use types::{InputEvent, Key, KeyState, PointerMoveEvent};

pub(crate) use platform::translate_window_event;
