use bytemuck::{Pod, Zeroable};

use crate::render::{
    shader_module, uniform_binding_size, GenerationSlot, OffscreenTarget, RenderCtx, RenderTarget,
};

use super::bayer::BAYER_8X8;
use super::params::DitherParameters;

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct DitherUniform {
    resolution: [f32; 2],
    color_num: f32,
    pixel_size: f32,
    // 16-byte array stride in uniform space, hence vec4 rows.
    bayer: [[f32; 4]; 16],
}

/// Full-frame ordered-dither pass.
///
/// Reads a composited frame from an [`OffscreenTarget`] and writes the quantized
/// result to the active destination, replacing its contents. The Bayer table is
/// uploaded from [`BAYER_8X8`] so shader and CPU kernel share one source.
#[derive(Default)]
pub struct DitherPass {
    pipeline_format: Option<wgpu::TextureFormat>,
    pipeline: Option<wgpu::RenderPipeline>,
    bind_group_layout: Option<wgpu::BindGroupLayout>,
    uniform_buffer: Option<wgpu::Buffer>,
    bind_group: GenerationSlot<wgpu::BindGroup>,
}

impl DitherPass {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generation of the frame buffer the pass is currently bound to (`0` = none).
    pub fn bound_generation(&self) -> u64 {
        self.bind_group.generation()
    }

    pub fn render(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        source: &OffscreenTarget,
        params: &DitherParameters,
    ) {
        self.ensure_pipeline(ctx, target.format());
        self.ensure_uniform_buffer(ctx);
        self.write_uniform(ctx, source, params);

        let (Some(pipeline), Some(bgl), Some(ubo)) = (
            self.pipeline.as_ref(),
            self.bind_group_layout.as_ref(),
            self.uniform_buffer.as_ref(),
        ) else {
            return;
        };

        let bind_group = self.bind_group.get_or_rebuild(source.generation(), || {
            log::debug!("dither pass: binding frame buffer {}", source.extent());
            ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("dither bind group"),
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
                ],
            })
        });

        let mut rpass = target.begin_pass("dither pass", wgpu::LoadOp::Clear(wgpu::Color::BLACK));
        rpass.set_pipeline(pipeline);
        rpass.set_bind_group(0, bind_group, &[]);
        rpass.draw(0..3, 0..1);
    }

    fn write_uniform(&self, ctx: &RenderCtx<'_>, source: &OffscreenTarget, params: &DitherParameters) {
        let Some(ubo) = self.uniform_buffer.as_ref() else { return };
        let u = DitherUniform {
            resolution: source.extent().resolution().to_array(),
            color_num: params.palette_size(),
            pixel_size: params.pixel_block_size(),
            bayer: bytemuck::cast(BAYER_8X8),
        };
        ctx.queue.write_buffer(ubo, 0, bytemuck::bytes_of(&u));
    }

    fn ensure_uniform_buffer(&mut self, ctx: &RenderCtx<'_>) {
        if self.uniform_buffer.is_some() {
            return;
        }
        self.uniform_buffer = Some(ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("dither ubo"),
            size: std::mem::size_of::<DitherUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        }));
        self.bind_group.clear();
    }

    fn ensure_pipeline(&mut self, ctx: &RenderCtx<'_>, format: wgpu::TextureFormat) {
        if self.pipeline_format == Some(format) && self.pipeline.is_some() {
            return;
        }

        let shader = shader_module(ctx.device, "dither shader", include_str!("shaders/dither.wgsl"));

        let bgl = ctx
            .device
            .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("dither bgl"),
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: false,
                            min_binding_size: uniform_binding_size::<DitherUniform>(),
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            sample_type: wgpu::TextureSampleType::Float { filterable: false },
                            view_dimension: wgpu::TextureViewDimension::D2,
                            multisampled: false,
                        },
                        count: None,
                    },
                ],
            });

        let pipeline_layout = ctx
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("dither pipeline layout"),
                bind_group_layouts: &[&bgl],
                immediate_size: 0,
            });

        let pipeline = ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("dither pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[],
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
        self.bind_group.clear();
    }
}
