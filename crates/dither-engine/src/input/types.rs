/// Keyboard key identifier.
///
/// Only keys the runtime's hosts react to get a variant; everything else maps to
/// `Key::Unknown` with the platform key code.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Key {
    Escape,
    Enter,
    Space,

    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,

    M,
    R,

    /// Platform-dependent key not represented here.
    Unknown(u32),
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum KeyState {
    Pressed,
    Released,
}

/// Pointer movement, in logical pixels relative to the window's top-left corner.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PointerMoveEvent {
    pub x: f32,
    pub y: f32,
}

/// Platform-agnostic input event.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    Focused(bool),
    PointerMoved(PointerMoveEvent),
    PointerLeft,
    Key {
        key: Key,
        state: KeyState,
        repeat: bool,
    },
}
