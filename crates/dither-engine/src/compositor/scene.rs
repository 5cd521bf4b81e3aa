use glam::{Mat4, Vec2};

use crate::coords::{ColorRgba, PixelExtent};
use crate::render::{OrthoCamera, RenderCtx};

/// Per-frame inputs shared by every node of a child scene.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct FrameInput {
    /// Seconds since the previous frame (clamped by the frame clock).
    pub dt: f32,
    /// Seconds since the first frame.
    pub elapsed: f32,
    /// Pointer position in physical pixels, origin top-left. `None` outside the window.
    pub pointer: Option<Vec2>,
}

/// What a node sees while preparing a frame of the offscreen buffer.
pub struct SceneView<'a> {
    pub camera: &'a OrthoCamera,
    pub view_proj: Mat4,
    /// Size of the buffer being rendered into.
    pub extent: PixelExtent,
    pub format: wgpu::TextureFormat,
    pub frame: &'a FrameInput,
}

/// A renderable element of a child scene.
///
/// `prepare` runs once per frame outside of any render pass and is where GPU resources
/// are created and uniforms uploaded; `draw` records into the compositor's pass.
pub trait SceneNode {
    fn prepare(&mut self, ctx: &RenderCtx<'_>, view: &SceneView<'_>);
    fn draw(&self, pass: &mut wgpu::RenderPass<'_>);
}

/// Ordered list of nodes rendered into the offscreen buffer.
///
/// Owned by the compositor; nothing here is shared with the primary scene.
pub struct ChildScene {
    nodes: Vec<Box<dyn SceneNode>>,
    clear_color: ColorRgba,
}

impl ChildScene {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            clear_color: ColorRgba::black(),
        }
    }

    /// Builder form of [`push`](Self::push).
    pub fn with(mut self, node: impl SceneNode + 'static) -> Self {
        self.push(node);
        self
    }

    pub fn with_clear_color(mut self, color: ColorRgba) -> Self {
        self.clear_color = color;
        self
    }

    pub fn push(&mut self, node: impl SceneNode + 'static) {
        self.nodes.push(Box::new(node));
    }

    #[inline]
    pub fn clear_color(&self) -> ColorRgba {
        self.clear_color
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub(crate) fn prepare(&mut self, ctx: &RenderCtx<'_>, view: &SceneView<'_>) {
        for node in &mut self.nodes {
            node.prepare(ctx, view);
        }
    }

    pub(crate) fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        for node in &self.nodes {
            node.draw(pass);
        }
    }
}

impl Default for ChildScene {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Noop;

    impl SceneNode for Noop {
        fn prepare(&mut self, _ctx: &RenderCtx<'_>, _view: &SceneView<'_>) {}
        fn draw(&self, _pass: &mut wgpu::RenderPass<'_>) {}
    }

    #[test]
    fn builder_keeps_insertion_order_and_count() {
        let scene = ChildScene::new().with(Noop).with(Noop);
        assert_eq!(scene.len(), 2);
        assert!(!scene.is_empty());
        assert!(ChildScene::default().is_empty());
    }

    #[test]
    fn clear_color_defaults_to_black() {
        assert_eq!(ChildScene::new().clear_color(), ColorRgba::black());
        let gray = ChildScene::new().with_clear_color(ColorRgba::gray(0.5));
        assert_eq!(gray.clear_color(), ColorRgba::gray(0.5));
    }
}
