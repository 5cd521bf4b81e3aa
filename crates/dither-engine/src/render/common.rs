//! Shared GPU types and helpers used by every pass.

use bytemuck::{Pod, Zeroable};

// ── quad vertex ───────────────────────────────────────────────────────────

/// Unit quad vertex centered on the origin, with a texture coordinate.
///
/// `uv` follows wgpu texture space (origin top-left, +V down), so the top edge of the
/// quad samples row 0 of whatever is bound.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(crate) struct QuadVertex {
    pub pos: [f32; 2], // -0.5..0.5
    pub uv: [f32; 2],
}

impl QuadVertex {
    const ATTRS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        0 => Float32x2, // pos
        1 => Float32x2  // uv
    ];

    pub(crate) fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<QuadVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

pub(crate) const QUAD_VERTICES: [QuadVertex; 4] = [
    QuadVertex { pos: [-0.5, -0.5], uv: [0.0, 1.0] },
    QuadVertex { pos: [0.5, -0.5], uv: [1.0, 1.0] },
    QuadVertex { pos: [0.5, 0.5], uv: [1.0, 0.0] },
    QuadVertex { pos: [-0.5, 0.5], uv: [0.0, 0.0] },
];

pub(crate) const QUAD_INDICES: [u16; 6] = [0, 1, 2, 0, 2, 3];

// ── uniform binding size ──────────────────────────────────────────────────

/// Returns the `wgpu` minimum binding size for a uniform block of type `T`.
///
/// Every uniform struct in this crate has at least one field, so the size is
/// non-zero; the zero case maps to "no minimum" instead of panicking.
pub(crate) fn uniform_binding_size<T: Pod>() -> Option<std::num::NonZeroU64> {
    std::num::NonZeroU64::new(std::mem::size_of::<T>() as u64)
}

// ── shared objects ────────────────────────────────────────────────────────

pub(crate) fn shader_module(device: &wgpu::Device, label: &str, src: &str) -> wgpu::ShaderModule {
    device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Wgsl(src.into()),
    })
}

/// Point sampler with clamped edges.
///
/// Passthrough and block sampling both read exact texels; linear filtering would
/// smear block edges when the pixel size is not a divisor of the resolution.
pub(crate) fn nearest_sampler(device: &wgpu::Device, label: &str) -> wgpu::Sampler {
    device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some(label),
        address_mode_u: wgpu::AddressMode::ClampToEdge,
        address_mode_v: wgpu::AddressMode::ClampToEdge,
        address_mode_w: wgpu::AddressMode::ClampToEdge,
        mag_filter: wgpu::FilterMode::Nearest,
        min_filter: wgpu::FilterMode::Nearest,
        mipmap_filter: wgpu::MipmapFilterMode::Nearest,
        ..Default::default()
    })
}
