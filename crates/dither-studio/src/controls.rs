//! Keyboard controls for live tuning.

use dither_engine::compositor::WaveControls;
use dither_engine::core::AppControl;
use dither_engine::dither::DitherProps;
use dither_engine::input::{InputFrame, Key};
use dither_engine::pipeline::DitherPipeline;

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Action {
    ColorNum(f32),
    PixelSize(f32),
    ToggleAnimation,
    ToggleMouse,
    Reset,
    Exit,
}

pub fn action_for(key: Key) -> Option<Action> {
    match key {
        Key::ArrowUp => Some(Action::ColorNum(1.0)),
        Key::ArrowDown => Some(Action::ColorNum(-1.0)),
        Key::ArrowRight => Some(Action::PixelSize(1.0)),
        Key::ArrowLeft => Some(Action::PixelSize(-1.0)),
        Key::Space => Some(Action::ToggleAnimation),
        Key::M => Some(Action::ToggleMouse),
        Key::R => Some(Action::Reset),
        Key::Escape => Some(Action::Exit),
        _ => None,
    }
}

/// Props after `action`, kept inside the valid range.
pub fn step_props(props: DitherProps, action: Action) -> DitherProps {
    match action {
        Action::ColorNum(d) => DitherProps {
            color_num: (props.color_num + d).max(2.0),
            ..props
        },
        Action::PixelSize(d) => DitherProps {
            pixel_size: (props.pixel_size + d).max(1.0),
            ..props
        },
        Action::Reset => DitherProps::default(),
        _ => props,
    }
}

/// Applies this frame's key presses to the pipeline.
pub fn handle_input(input: &InputFrame, pipeline: &mut DitherPipeline) -> AppControl {
    for key in &input.keys_pressed {
        let Some(action) = action_for(*key) else { continue };

        match action {
            Action::Exit => return AppControl::Exit,
            Action::ToggleAnimation => toggle(pipeline.wave_controls(), "animation", WaveControls::toggle_animation),
            Action::ToggleMouse => {
                toggle(pipeline.wave_controls(), "mouse interaction", WaveControls::toggle_mouse_interaction)
            }
            _ => {
                let props = step_props(pipeline.params().into(), action);
                match pipeline.set_props(props) {
                    Ok(()) => log::info!("color_num={} pixel_size={}", props.color_num, props.pixel_size),
                    Err(e) => log::warn!("{e}"),
                }
            }
        }
    }
    AppControl::Continue
}

fn toggle(controls: Option<&WaveControls>, what: &str, flip: fn(&WaveControls) -> bool) {
    match controls {
        Some(c) => log::info!("{what}: {}", if flip(c) { "on" } else { "off" }),
        None => log::info!("{what}: no generated content"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arrows_step_and_clamp() {
        let p = DitherProps::default();
        let up = step_props(p, Action::ColorNum(1.0));
        assert_eq!(up.color_num, 5.0);

        let mut low = p;
        for _ in 0..5 {
            low = step_props(low, Action::ColorNum(-1.0));
        }
        assert_eq!(low.color_num, 2.0);

        let small = step_props(step_props(p, Action::PixelSize(-1.0)), Action::PixelSize(-1.0));
        assert_eq!(small.pixel_size, 1.0);
        assert!(small.validate().is_ok());
    }

    #[test]
    fn reset_restores_defaults() {
        let p = DitherProps { color_num: 9.0, pixel_size: 5.0 };
        assert_eq!(step_props(p, Action::Reset), DitherProps::default());
    }

    #[test]
    fn escape_exits() {
        assert_eq!(action_for(Key::Escape), Some(Action::Exit));
        assert_eq!(action_for(Key::Enter), None);
    }
}
