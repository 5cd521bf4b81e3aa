//! Ordered-dither render engine.
//!
//! Child content is rendered into an offscreen buffer, presented as a textured quad in
//! a primary scene, and the composited frame is quantized with an 8x8 Bayer matrix on
//! its way to the display.
//!
//! Layers, bottom-up:
//! - `coords`, `device`, `window`, `input`, `time`, `core`, `logging`: platform runtime
//! - `render`: offscreen targets, cameras, shared GPU helpers
//! - `dither`: the quantization algorithm (CPU kernel and GPU pass)
//! - `compositor`: child scene, offscreen bundle, resolution sync, display bridge
//! - `pipeline`: the ordered stages of a frame
//! - `app`: single-window builder

pub mod device;
pub mod window;
pub mod input;
pub mod time;
pub mod core;

pub mod logging;
pub mod coords;
pub mod render;
pub mod dither;
pub mod compositor;
pub mod pipeline;
pub mod app;

pub use app::DitherApp;
