//! GPU rendering primitives shared by the compositor, the bridge and the dither pass.
//!
//! Each pass owns its own GPU resources (pipelines, buffers, bind groups) and builds
//! them lazily against the [`RenderCtx`] it is first handed, following the same
//! `ensure_*` pattern throughout.
//!
//! Convention:
//! - scene geometry is in world units, projected by a camera uniform
//! - full-frame passes draw a single oversized triangle and work in UV space

mod binding;
mod camera;
mod common;
mod ctx;
mod target;

pub use camera::{CameraUniform, OrthoCamera, PerspectiveCamera};
pub use ctx::{RenderCtx, RenderTarget};
pub use target::{AllocError, OffscreenTarget};

pub(crate) use binding::GenerationSlot;
pub(crate) use common::{
    nearest_sampler, shader_module, uniform_binding_size, QuadVertex, QUAD_INDICES,
    QUAD_VERTICES,
};
