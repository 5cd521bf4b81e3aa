use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Quat, Vec2};
use wgpu::util::DeviceExt;

use crate::coords::ColorRgba;
use crate::render::{
    shader_module, uniform_binding_size, QuadVertex, RenderCtx, QUAD_INDICES, QUAD_VERTICES,
};

use super::scene::{SceneNode, SceneView};

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct QuadUniform {
    mvp: [[f32; 4]; 4],
    color: [f32; 4],
}

/// Flat-colored rectangle in child-scene world units.
///
/// The child camera spans `[-1, 1]` vertically, so a `size` of `(2, 2)` at the origin
/// covers the full buffer height.
pub struct QuadNode {
    pub center: Vec2,
    pub size: Vec2,
    pub color: ColorRgba,
    /// Rotation about the view axis, radians per second.
    pub spin: f32,
    angle: f32,

    pipeline_format: Option<wgpu::TextureFormat>,
    pipeline: Option<wgpu::RenderPipeline>,
    bind_group: Option<wgpu::BindGroup>,
    uniform_buffer: Option<wgpu::Buffer>,
    quad_vbo: Option<wgpu::Buffer>,
    quad_ibo: Option<wgpu::Buffer>,
}

impl QuadNode {
    pub fn new(center: Vec2, size: Vec2, color: ColorRgba) -> Self {
        Self {
            center,
            size,
            color,
            spin: 0.0,
            angle: 0.0,
            pipeline_format: None,
            pipeline: None,
            bind_group: None,
            uniform_buffer: None,
            quad_vbo: None,
            quad_ibo: None,
        }
    }

    pub fn with_spin(mut self, radians_per_second: f32) -> Self {
        self.spin = radians_per_second;
        self
    }

    fn model(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            self.size.extend(1.0),
            Quat::from_rotation_z(self.angle),
            self.center.extend(0.0),
        )
    }

    fn ensure_resources(&mut self, ctx: &RenderCtx<'_>, format: wgpu::TextureFormat) {
        if self.quad_vbo.is_none() {
            self.quad_vbo = Some(ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("quad node vbo"),
                contents: bytemuck::cast_slice(&QUAD_VERTICES),
                usage: wgpu::BufferUsages::VERTEX,
            }));
            self.quad_ibo = Some(ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("quad node ibo"),
                contents: bytemuck::cast_slice(&QUAD_INDICES),
                usage: wgpu::BufferUsages::INDEX,
            }));
        }

        if self.pipeline_format == Some(format) && self.pipeline.is_some() {
            return;
        }

        let ubo = self.uniform_buffer.get_or_insert_with(|| {
            ctx.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("quad node ubo"),
                size: std::mem::size_of::<QuadUniform>() as u64,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            })
        });

        let shader = shader_module(ctx.device, "quad node shader", include_str!("shaders/quad.wgsl"));

        let bgl = ctx
            .device
            .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("quad node bgl"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: uniform_binding_size::<QuadUniform>(),
                    },
                    count: None,
                }],
            });

        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("quad node bind group"),
            layout: &bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: ubo.as_entire_binding(),
            }],
        });

        let pipeline_layout = ctx
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("quad node pipeline layout"),
                bind_group_layouts: &[&bgl],
                immediate_size: 0,
            });

        let pipeline = ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("quad node pipeline"),
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
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
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
        self.bind_group = Some(bind_group);
    }
}

impl SceneNode for QuadNode {
    fn prepare(&mut self, ctx: &RenderCtx<'_>, view: &SceneView<'_>) {
        self.angle = (self.angle + self.spin * view.frame.dt) % std::f32::consts::TAU;
        self.ensure_resources(ctx, view.format);

        let Some(ubo) = self.uniform_buffer.as_ref() else { return };
        let u = QuadUniform {
            mvp: (view.view_proj * self.model()).to_cols_array_2d(),
            color: self.color.to_array(),
        };
        ctx.queue.write_buffer(ubo, 0, bytemuck::bytes_of(&u));
    }

    fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        let (Some(pipeline), Some(bind_group), Some(vbo), Some(ibo)) = (
            self.pipeline.as_ref(),
            self.bind_group.as_ref(),
            self.quad_vbo.as_ref(),
            self.quad_ibo.as_ref(),
        ) else {
            return;
        };

        pass.set_pipeline(pipeline);
        pass.set_bind_group(0, bind_group, &[]);
        pass.set_vertex_buffer(0, vbo.slice(..));
        pass.set_index_buffer(ibo.slice(..), wgpu::IndexFormat::Uint16);
        pass.draw_indexed(0..QUAD_INDICES.len() as u32, 0, 0..1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn model_places_unit_quad_corners() {
        let quad = QuadNode::new(Vec2::new(0.5, -0.25), Vec2::new(2.0, 1.0), ColorRgba::white());
        let corner = quad.model().transform_point3(Vec3::new(0.5, 0.5, 0.0));
        assert!((corner - Vec3::new(1.5, 0.25, 0.0)).length() < 1e-6);
    }

    #[test]
    fn spin_is_off_by_default() {
        let quad = QuadNode::new(Vec2::ZERO, Vec2::ONE, ColorRgba::white());
        assert_eq!(quad.spin, 0.0);
        assert_eq!(quad.with_spin(1.5).spin, 1.5);
    }
}
