mod controls;

use anyhow::Result;
use glam::Vec2;

use dither_engine::compositor::{ChildScene, ContentSource, QuadNode, WaveParams};
use dither_engine::coords::ColorRgba;
use dither_engine::logging::{init_logging, LoggingConfig};
use dither_engine::DitherApp;

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    log::info!("arrows: color_num / pixel_size   space: animation   m: mouse   r: reset   esc: quit");

    DitherApp::new()
        .title("dither studio")
        .size(1280.0, 720.0)
        .color_num(4.0)
        .pixel_size(2.0)
        .content(content_from_args())
        .clear_color(ColorRgba::black())
        .on_input(controls::handle_input)
        .run()
}

/// `dither-studio quads` shows a composited scene; anything else the wave field.
fn content_from_args() -> ContentSource {
    match std::env::args().nth(1).as_deref() {
        Some("quads") => ContentSource::Composited(quad_scene()),
        _ => ContentSource::Generated(WaveParams::default()),
    }
}

fn quad_scene() -> ChildScene {
    ChildScene::new()
        .with_clear_color(ColorRgba::gray(0.1))
        .with(QuadNode::new(Vec2::new(-0.6, 0.0), Vec2::splat(0.9), ColorRgba::new(0.9, 0.3, 0.2, 1.0)).with_spin(0.6))
        .with(QuadNode::new(Vec2::new(0.6, 0.0), Vec2::splat(0.9), ColorRgba::new(0.2, 0.5, 0.9, 1.0)).with_spin(-0.4))
        .with(QuadNode::new(Vec2::new(0.0, -0.7), Vec2::new(2.4, 0.2), ColorRgba::gray(0.75)))
}
