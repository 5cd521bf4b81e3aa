//! Generated content: an animated fractal-noise wave field.

use std::cell::Cell;
use std::rc::Rc;

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use crate::coords::ColorRgba;
use crate::render::{
    shader_module, uniform_binding_size, QuadVertex, RenderCtx, QUAD_INDICES, QUAD_VERTICES,
};

use super::scene::{SceneNode, SceneView};

/// Appearance and behavior of the generated wave field.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct WaveParams {
    pub wave_color: ColorRgba,
    /// Time-warp speed of the noise domain.
    pub wave_speed: f32,
    /// Frequency multiplier between octaves.
    pub wave_frequency: f32,
    /// Amplitude multiplier between octaves.
    pub wave_amplitude: f32,
    /// When false the field freezes at its current time.
    pub animate: bool,
    pub mouse_interaction: bool,
    /// Darkening radius around the pointer, in centered UV units.
    pub mouse_radius: f32,
}

impl Default for WaveParams {
    fn default() -> Self {
        Self {
            wave_color: ColorRgba::gray(0.5),
            wave_speed: 0.05,
            wave_frequency: 3.0,
            wave_amplitude: 0.3,
            animate: true,
            mouse_interaction: true,
            mouse_radius: 0.3,
        }
    }
}

/// Shared handle to a [`WaveNode`]'s parameters.
///
/// The node lives inside the compositor's scene; the host keeps this handle to change
/// the field at runtime. Changes take effect on the next frame.
#[derive(Debug, Clone)]
pub struct WaveControls(Rc<Cell<WaveParams>>);

impl WaveControls {
    #[inline]
    pub fn get(&self) -> WaveParams {
        self.0.get()
    }

    #[inline]
    pub fn set(&self, params: WaveParams) {
        self.0.set(params);
    }

    pub fn update(&self, f: impl FnOnce(&mut WaveParams)) {
        let mut params = self.0.get();
        f(&mut params);
        self.0.set(params);
    }

    /// Flips `animate`, returning the new value.
    pub fn toggle_animation(&self) -> bool {
        self.update(|p| p.animate = !p.animate);
        self.get().animate
    }

    /// Flips `mouse_interaction`, returning the new value.
    pub fn toggle_mouse_interaction(&self) -> bool {
        self.update(|p| p.mouse_interaction = !p.mouse_interaction);
        self.get().mouse_interaction
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct WaveUniform {
    view_proj: [[f32; 4]; 4],
    view_size: [f32; 2],
    resolution: [f32; 2],
    time: f32,
    wave_speed: f32,
    wave_frequency: f32,
    wave_amplitude: f32,
    wave_color: [f32; 4],
    mouse_pos: [f32; 2],
    mouse_enabled: f32,
    mouse_radius: f32,
}

/// Full-view quad shaded with domain-warped fbm noise.
pub struct WaveNode {
    controls: WaveControls,
    time: f32,

    pipeline_format: Option<wgpu::TextureFormat>,
    pipeline: Option<wgpu::RenderPipeline>,
    bind_group_layout: Option<wgpu::BindGroupLayout>,
    bind_group: Option<wgpu::BindGroup>,
    uniform_buffer: Option<wgpu::Buffer>,
    quad_vbo: Option<wgpu::Buffer>,
    quad_ibo: Option<wgpu::Buffer>,
}

impl WaveNode {
    pub fn new(params: WaveParams) -> Self {
        Self {
            controls: WaveControls(Rc::new(Cell::new(params))),
            time: 0.0,
            pipeline_format: None,
            pipeline: None,
            bind_group_layout: None,
            bind_group: None,
            uniform_buffer: None,
            quad_vbo: None,
            quad_ibo: None,
        }
    }

    pub fn controls(&self) -> WaveControls {
        self.controls.clone()
    }

    /// Animation time in seconds; only advances while `animate` is set.
    #[inline]
    pub fn time(&self) -> f32 {
        self.time
    }

    fn advance(&mut self, dt: f32) {
        if self.controls.get().animate {
            self.time += dt;
        }
    }

    fn write_uniform(&self, ctx: &RenderCtx<'_>, view: &SceneView<'_>) {
        let Some(ubo) = self.uniform_buffer.as_ref() else { return };
        let p = self.controls.get();
        let mouse_pos = view.frame.pointer.map_or([-1.0, -1.0], |m| m.to_array());

        let u = WaveUniform {
            view_proj: view.view_proj.to_cols_array_2d(),
            view_size: view.camera.view_size().to_array(),
            resolution: view.extent.resolution().to_array(),
            time: self.time,
            wave_speed: p.wave_speed,
            wave_frequency: p.wave_frequency,
            wave_amplitude: p.wave_amplitude,
            wave_color: p.wave_color.to_array(),
            mouse_pos,
            mouse_enabled: if p.mouse_interaction { 1.0 } else { 0.0 },
            mouse_radius: p.mouse_radius,
        };
        ctx.queue.write_buffer(ubo, 0, bytemuck::bytes_of(&u));
    }

    fn ensure_buffers(&mut self, ctx: &RenderCtx<'_>) {
        if self.quad_vbo.is_none() {
            self.quad_vbo = Some(ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("wave quad vbo"),
                contents: bytemuck::cast_slice(&QUAD_VERTICES),
                usage: wgpu::BufferUsages::VERTEX,
            }));
        }
        if self.quad_ibo.is_none() {
            self.quad_ibo = Some(ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("wave quad ibo"),
                contents: bytemuck::cast_slice(&QUAD_INDICES),
                usage: wgpu::BufferUsages::INDEX,
            }));
        }
        if self.uniform_buffer.is_none() {
            self.uniform_buffer = Some(ctx.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("wave ubo"),
                size: std::mem::size_of::<WaveUniform>() as u64,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            }));
            self.bind_group = None;
        }
    }

    fn ensure_bind_group(&mut self, ctx: &RenderCtx<'_>) {
        if self.bind_group.is_some() {
            return;
        }
        let (Some(bgl), Some(ubo)) = (self.bind_group_layout.as_ref(), self.uniform_buffer.as_ref()) else {
            return;
        };
        self.bind_group = Some(ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("wave bind group"),
            layout: bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: ubo.as_entire_binding(),
            }],
        }));
    }

    fn ensure_pipeline(&mut self, ctx: &RenderCtx<'_>, format: wgpu::TextureFormat) {
        if self.pipeline_format == Some(format) && self.pipeline.is_some() {
            return;
        }

        let shader = shader_module(ctx.device, "wave shader", include_str!("shaders/wave.wgsl"));

        let bgl = ctx
            .device
            .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("wave bgl"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: uniform_binding_size::<WaveUniform>(),
                    },
                    count: None,
                }],
            });

        let pipeline_layout = ctx
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("wave pipeline layout"),
                bind_group_layouts: &[&bgl],
                immediate_size: 0,
            });

        let pipeline = ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("wave pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[QuadVertex::layout()],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        self.pipeline_format = Some(format);
        self.pipeline = Some(pipeline);
        self.bind_group_layout = Some(bgl);
        self.bind_group = None;
    }
}

impl SceneNode for WaveNode {
    fn prepare(&mut self, ctx: &RenderCtx<'_>, view: &SceneView<'_>) {
        self.advance(view.frame.dt);
        self.ensure_pipeline(ctx, view.format);
        self.ensure_buffers(ctx);
        self.ensure_bind_group(ctx);
        self.write_uniform(ctx, view);
    }

    fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        let (Some(pipeline), Some(bind_group), Some(vb), Some(ib)) = (
            self.pipeline.as_ref(),
            self.bind_group.as_ref(),
            self.quad_vbo.as_ref(),
            self.quad_ibo.as_ref(),
        ) else {
            return;
        };

        pass.set_pipeline(pipeline);
        pass.set_bind_group(0, bind_group, &[]);
        pass.set_vertex_buffer(0, vb.slice(..));
        pass.set_index_buffer(ib.slice(..), wgpu::IndexFormat::Uint16);
        pass.draw_indexed(0..QUAD_INDICES.len() as u32, 0, 0..1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_demo_host() {
        let p = WaveParams::default();
        assert_eq!(p.wave_color, ColorRgba::gray(0.5));
        assert_eq!(p.wave_speed, 0.05);
        assert_eq!(p.wave_frequency, 3.0);
        assert_eq!(p.wave_amplitude, 0.3);
        assert!(p.animate);
        assert!(p.mouse_interaction);
        assert_eq!(p.mouse_radius, 0.3);
    }

    #[test]
    fn time_freezes_when_animation_is_off() {
        let mut node = WaveNode::new(WaveParams::default());
        node.advance(0.5);
        assert_eq!(node.time(), 0.5);

        let controls = node.controls();
        assert!(!controls.toggle_animation());
        node.advance(0.5);
        assert_eq!(node.time(), 0.5);

        assert!(controls.toggle_animation());
        node.advance(0.25);
        assert_eq!(node.time(), 0.75);
    }

    #[test]
    fn controls_share_state_with_node() {
        let node = WaveNode::new(WaveParams::default());
        let a = node.controls();
        let b = node.controls();
        assert!(!a.toggle_mouse_interaction());
        assert!(!b.get().mouse_interaction);
        b.update(|p| p.wave_speed = 0.2);
        assert_eq!(node.controls().get().wave_speed, 0.2);
    }

    #[test]
    fn uniform_layout_matches_shader() {
        assert_eq!(std::mem::size_of::<WaveUniform>(), 128);
    }
}
