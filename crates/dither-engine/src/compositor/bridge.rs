use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec2};
use wgpu::util::DeviceExt;

use crate::render::{
    nearest_sampler, shader_module, uniform_binding_size, CameraUniform, GenerationSlot,
    OffscreenTarget, PerspectiveCamera, QuadVertex, RenderCtx, RenderTarget, QUAD_INDICES,
    QUAD_VERTICES,
};

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct BridgeUniform {
    mvp: CameraUniform,
}

/// Presents the child buffer in the primary scene.
///
/// The primary scene is a single unit quad seen through a [`PerspectiveCamera`], scaled
/// to the camera's world-space viewport so it covers the frame edge to edge. The quad
/// samples the buffer with nearest filtering and no lighting.
pub struct DisplayBridge {
    camera: PerspectiveCamera,
    clear_color: wgpu::Color,

    pipeline_format: Option<wgpu::TextureFormat>,
    pipeline: Option<wgpu::RenderPipeline>,
    bind_group_layout: Option<wgpu::BindGroupLayout>,
    sampler: Option<wgpu::Sampler>,
    uniform_buffer: Option<wgpu::Buffer>,
    quad_vbo: Option<wgpu::Buffer>,
    quad_ibo: Option<wgpu::Buffer>,
    binding: GenerationSlot<wgpu::BindGroup>,
}

impl DisplayBridge {
    pub fn new() -> Self {
        Self {
            camera: PerspectiveCamera::new(1.0),
            clear_color: wgpu::Color::BLACK,
            pipeline_format: None,
            pipeline: None,
            bind_group_layout: None,
            sampler: None,
            uniform_buffer: None,
            quad_vbo: None,
            quad_ibo: None,
            binding: GenerationSlot::new(),
        }
    }

    /// Background of the primary scene, visible only if the quad does not cover it.
    pub fn set_clear_color(&mut self, color: wgpu::Color) {
        self.clear_color = color;
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        self.camera.aspect = aspect;
    }

    #[inline]
    pub fn camera(&self) -> &PerspectiveCamera {
        &self.camera
    }

    /// World-space size the unit quad is scaled to.
    #[inline]
    pub fn quad_scale(&self) -> Vec2 {
        self.camera.world_viewport()
    }

    /// Generation of the buffer the bridge is currently bound to (`0` = none).
    #[inline]
    pub fn bound_generation(&self) -> u64 {
        self.binding.generation()
    }

    fn mvp(&self) -> Mat4 {
        self.camera.view_projection() * Mat4::from_scale(self.quad_scale().extend(1.0))
    }

    /// Draws the buffer into the active destination, clearing it first.
    pub fn render(&mut self, ctx: &RenderCtx<'_>, target: &mut RenderTarget<'_>, source: &OffscreenTarget) {
        self.ensure_pipeline(ctx, target.format());
        self.ensure_buffers(ctx);

        if let Some(ubo) = self.uniform_buffer.as_ref() {
            let u = BridgeUniform {
                mvp: CameraUniform::from_matrix(self.mvp()),
            };
            ctx.queue.write_buffer(ubo, 0, bytemuck::bytes_of(&u));
        }

        let (Some(pipeline), Some(bgl), Some(sampler), Some(ubo), Some(vbo), Some(ibo)) = (
            self.pipeline.as_ref(),
            self.bind_group_layout.as_ref(),
            self.sampler.as_ref(),
            self.uniform_buffer.as_ref(),
            self.quad_vbo.as_ref(),
            self.quad_ibo.as_ref(),
        ) else {
            return;
        };

        self.binding.get_or_rebuild(source.generation(), || {
            log::debug!("bridge: binding child buffer {} (gen {})", source.extent(), source.generation());
            ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("bridge bind group"),
                layout: bgl,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: ubo.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::TextureView(source.view()),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: wgpu::BindingResource::Sampler(sampler),
                    },
                ],
            })
        });

        let bind_group = self.binding.get(source.generation());
        debug_assert!(bind_group.is_some(), "bridge bind group is stale");
        let Some(bind_group) = bind_group else { return };

        let mut pass = target.begin_pass("bridge pass", wgpu::LoadOp::Clear(self.clear_color));
        pass.set_pipeline(pipeline);
        pass.set_bind_group(0, bind_group, &[]);
        pass.set_vertex_buffer(0, vbo.slice(..));
        pass.set_index_buffer(ibo.slice(..), wgpu::IndexFormat::Uint16);
        pass.draw_indexed(0..QUAD_INDICES.len() as u32, 0, 0..1);
    }

    fn ensure_buffers(&mut self, ctx: &RenderCtx<'_>) {
        if self.quad_vbo.is_none() {
            self.quad_vbo = Some(ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("bridge quad vbo"),
                contents: bytemuck::cast_slice(&QUAD_VERTICES),
                usage: wgpu::BufferUsages::VERTEX,
            }));
        }
        if self.quad_ibo.is_none() {
            self.quad_ibo = Some(ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("bridge quad ibo"),
                contents: bytemuck::cast_slice(&QUAD_INDICES),
                usage: wgpu::BufferUsages::INDEX,
            }));
        }
        if self.uniform_buffer.is_none() {
            self.uniform_buffer = Some(ctx.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("bridge ubo"),
                size: std::mem::size_of::<BridgeUniform>() as u64,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            }));
            self.binding.clear();
        }
        if self.sampler.is_none() {
            self.sampler = Some(nearest_sampler(ctx.device, "bridge sampler"));
            self.binding.clear();
        }
    }

    fn ensure_pipeline(&mut self, ctx: &RenderCtx<'_>, format: wgpu::TextureFormat) {
        if self.pipeline_format == Some(format) && self.pipeline.is_some() {
            return;
        }

        let shader = shader_module(ctx.device, "bridge shader", include_str!("shaders/passthrough.wgsl"));

        let bgl = ctx
            .device
            .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("bridge bgl"),
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::VERTEX,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: false,
                            min_binding_size: uniform_binding_size::<BridgeUniform>(),
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            sample_type: wgpu::TextureSampleType::Float { filterable: true },
                            view_dimension: wgpu::TextureViewDimension::D2,
                            multisampled: false,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 2,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                        count: None,
                    },
                ],
            });

        let pipeline_layout = ctx
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("bridge pipeline layout"),
                bind_group_layouts: &[&bgl],
                immediate_size: 0,
            });

        let pipeline = ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("bridge pipeline"),
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
        self.binding.clear();
    }
}

impl Default for DisplayBridge {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;

    fn corner_ndc(bridge: &DisplayBridge, x: f32, y: f32) -> Vec2 {
        let c = bridge.mvp() * Vec4::new(x, y, 0.0, 1.0);
        Vec2::new(c.x / c.w, c.y / c.w)
    }

    #[test]
    fn quad_covers_frame_exactly() {
        let mut bridge = DisplayBridge::new();
        bridge.set_aspect(1600.0 / 1200.0);

        for (x, y) in [(-0.5, -0.5), (0.5, -0.5), (0.5, 0.5), (-0.5, 0.5)] {
            let ndc = corner_ndc(&bridge, x, y);
            assert!((ndc - Vec2::new(2.0 * x, 2.0 * y)).length() < 1e-4, "{ndc:?}");
        }
    }

    #[test]
    fn quad_scale_follows_aspect() {
        let mut bridge = DisplayBridge::new();
        bridge.set_aspect(2.0);
        let s = bridge.quad_scale();
        assert!((s.x - 2.0 * s.y).abs() < 1e-5);
    }

    #[test]
    fn nothing_bound_before_first_frame() {
        assert_eq!(DisplayBridge::new().bound_generation(), 0);
    }
}
