use std::collections::HashSet;

use glam::Vec2;

use super::frame::InputFrame;
use super::types::{InputEvent, Key, KeyState, PointerMoveEvent};

/// Current input state for a single window.
///
/// Holds "is down" information and current pointer position.
/// Per-frame transitions are recorded into an `InputFrame`.
#[derive(Debug, Default)]
pub struct InputState {
    /// Whether the window is focused.
    pub focused: bool,

    /// Pointer position in logical pixels; `None` while outside the window.
    pub pointer_pos: Option<Vec2>,

    /// Set of currently held keys.
    pub keys_down: HashSet<Key>,
}

impl InputState {
    /// Applies a platform-agnostic input event to the current state and writes deltas to `frame`.
    pub fn apply_event(&mut self, frame: &mut InputFrame, ev: InputEvent) {
        match &ev {
            InputEvent::Focused(f) => {
                self.focused = *f;
                if !*f {
                    // Avoid stuck keys when focus changes mid-press.
                    self.keys_down.clear();
                }
            }

            InputEvent::PointerMoved(PointerMoveEvent { x, y }) => {
                self.pointer_pos = Some(Vec2::new(*x, *y));
            }

            InputEvent::PointerLeft => {
                self.pointer_pos = None;
            }

            InputEvent::Key { key, state, .. } => match state {
                KeyState::Pressed => {
                    if self.keys_down.insert(*key) {
                        frame.keys_pressed.insert(*key);
                    }
                }
                KeyState::Released => {
                    if self.keys_down.remove(key) {
                        frame.keys_released.insert(*key);
                    }
                }
            },
        }

        frame.push_event(ev);
    }

    pub fn key_down(&self, key: Key) -> bool {
        self.keys_down.contains(&key)
    }

    /// Pointer position in physical pixels for a window at `scale_factor`.
    pub fn pointer_physical(&self, scale_factor: f32) -> Option<Vec2> {
        self.pointer_pos.map(|p| p * scale_factor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(key: Key, state: KeyState, repeat: bool) -> InputEvent {
        InputEvent::Key { key, state, repeat }
    }

    #[test]
    fn press_is_reported_once_while_held() {
        let mut state = InputState::default();
        let mut frame = InputFrame::default();

        state.apply_event(&mut frame, key(Key::Space, KeyState::Pressed, false));
        assert!(frame.pressed(Key::Space));
        frame.clear();

        state.apply_event(&mut frame, key(Key::Space, KeyState::Pressed, true));
        assert!(!frame.pressed(Key::Space));
        assert!(state.key_down(Key::Space));

        state.apply_event(&mut frame, key(Key::Space, KeyState::Released, false));
        assert!(frame.keys_released.contains(&Key::Space));
        assert!(!state.key_down(Key::Space));
    }

    #[test]
    fn focus_loss_releases_held_keys() {
        let mut state = InputState::default();
        let mut frame = InputFrame::default();
        state.apply_event(&mut frame, key(Key::ArrowUp, KeyState::Pressed, false));
        state.apply_event(&mut frame, InputEvent::Focused(false));
        assert!(state.keys_down.is_empty());
        assert!(!state.focused);
    }

    #[test]
    fn pointer_tracks_moves_and_leaves() {
        let mut state = InputState::default();
        let mut frame = InputFrame::default();

        state.apply_event(&mut frame, InputEvent::PointerMoved(PointerMoveEvent { x: 10.0, y: 20.5 }));
        assert_eq!(state.pointer_physical(2.0), Some(Vec2::new(20.0, 41.0)));

        state.apply_event(&mut frame, InputEvent::PointerLeft);
        assert_eq!(state.pointer_pos, None);
        assert_eq!(frame.events.len(), 2);
    }
}
