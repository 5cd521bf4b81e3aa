//! Size, resolution and color types shared across the compositor and the dither stage.
//!
//! Two spaces are in play:
//! - logical pixels (what the window system reports, DPI-independent)
//! - device pixels (`floor(logical * scale_factor)`, what textures are sized in)
//!
//! Vector math uses `glam`; this module only adds the types glam has no opinion on.

mod color;
mod extent;
mod viewport;

pub use color::ColorRgba;
pub use extent::PixelExtent;
pub use viewport::{Viewport, ViewportMetrics};
