//! Ordered-dither post-process.
//!
//! - `bayer`: the fixed 8x8 threshold table
//! - `params`: validated palette / block-size parameters and the props they come from
//! - `kernel`: the per-pixel transform on the CPU, arithmetic-identical to the shader
//! - `pass`: the GPU pass running that transform over a composited frame

mod bayer;
mod kernel;
mod params;
mod pass;

pub use bayer::{bayer_index, bayer_value, BAYER_8X8};
pub use kernel::{
    block_uv, dither_buffer, dither_channel, dither_color, dither_pixel, quantize,
    source_texel, threshold, DARKEN_BIAS, THRESHOLD_CENTER,
};
pub use params::{ConfigError, DitherParameters, DitherProps};
pub use pass::DitherPass;
