//! Offscreen composition: child content rendered into its own buffer, then presented
//! in the primary scene.
//!
//! - [`OffscreenCompositor`] owns the buffer, the child scene and its orthographic camera
//! - [`ResolutionSync`] keeps the buffer at `floor(viewport * dpr)`
//! - [`DisplayBridge`] draws the buffer as a textured quad in the primary scene

mod bridge;
mod content;
mod offscreen;
mod quad;
mod scene;
mod sync;
mod wave;

pub use bridge::DisplayBridge;
pub use content::{ContentSource, ResolvedContent};
pub use offscreen::OffscreenCompositor;
pub use quad::QuadNode;
pub use scene::{ChildScene, FrameInput, SceneNode, SceneView};
pub use sync::ResolutionSync;
pub use wave::{WaveControls, WaveNode, WaveParams};
