use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::coords::PixelExtent;

/// Failure to allocate an offscreen buffer.
///
/// Either variant leaves the caller free to skip the frame and retry later: limit
/// violations are caught before wgpu sees the request, out-of-memory conditions are
/// captured in an error scope instead of reaching the device's uncaptured handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllocError {
    ExceedsLimit { requested: PixelExtent, max_dimension: u32 },
    OutOfMemory { requested: PixelExtent, reason: String },
}

impl AllocError {
    pub fn requested(&self) -> PixelExtent {
        match self {
            AllocError::ExceedsLimit { requested, .. } | AllocError::OutOfMemory { requested, .. } => *requested,
        }
    }
}

impl fmt::Display for AllocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AllocError::ExceedsLimit { requested, max_dimension } => write!(
                f,
                "offscreen buffer {requested} exceeds device limit of {max_dimension}px per axis"
            ),
            AllocError::OutOfMemory { requested, reason } => {
                write!(f, "offscreen buffer {requested}: out of GPU memory ({reason})")
            }
        }
    }
}

impl std::error::Error for AllocError {}

/// Offscreen color buffer (render target + sampled texture).
///
/// Owns its texture exclusively and destroys it on drop, so releasing the buffer
/// is tied to ownership rather than left to refcount timing.
///
/// wgpu textures are immutable in size: [`resize`](Self::resize) releases the old
/// texture and allocates a new one. Every allocation draws a process-unique generation
/// number so consumers holding bind groups can tell their view is out of date, even
/// across a target being dropped and recreated.
pub struct OffscreenTarget {
    label: &'static str,
    format: wgpu::TextureFormat,
    extent: PixelExtent,
    generation: u64,
    texture: wgpu::Texture,
    view: wgpu::TextureView,
}

impl OffscreenTarget {
    pub fn new(
        device: &wgpu::Device,
        label: &'static str,
        format: wgpu::TextureFormat,
        extent: PixelExtent,
        max_dimension: u32,
    ) -> Result<Self, AllocError> {
        let (texture, view) = allocate(device, label, format, extent, max_dimension)?;
        log::debug!("{label}: allocated {extent} ({format:?})");
        Ok(Self {
            label,
            format,
            extent,
            generation: next_generation(),
            texture,
            view,
        })
    }

    /// Reallocates at `extent`. Returns `Ok(false)` when the size is unchanged.
    ///
    /// On failure the current texture is kept, still valid at its old size.
    pub fn resize(
        &mut self,
        device: &wgpu::Device,
        extent: PixelExtent,
        max_dimension: u32,
    ) -> Result<bool, AllocError> {
        if extent == self.extent {
            return Ok(false);
        }

        let (texture, view) = allocate(device, self.label, self.format, extent, max_dimension)?;
        let old = std::mem::replace(&mut self.texture, texture);
        old.destroy();

        log::debug!("{}: reallocated {} -> {}", self.label, self.extent, extent);
        self.view = view;
        self.extent = extent;
        self.generation = next_generation();
        Ok(true)
    }

    #[inline]
    pub fn extent(&self) -> PixelExtent {
        self.extent
    }

    #[inline]
    pub fn format(&self) -> wgpu::TextureFormat {
        self.format
    }

    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[inline]
    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }
}

impl Drop for OffscreenTarget {
    fn drop(&mut self) {
        log::debug!("{}: released {}", self.label, self.extent);
        self.texture.destroy();
    }
}

static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

/// Generation `0` is never handed out; consumers use it as "nothing bound yet".
fn next_generation() -> u64 {
    NEXT_GENERATION.fetch_add(1, Ordering::Relaxed)
}

fn allocate(
    device: &wgpu::Device,
    label: &'static str,
    format: wgpu::TextureFormat,
    extent: PixelExtent,
    max_dimension: u32,
) -> Result<(wgpu::Texture, wgpu::TextureView), AllocError> {
    if !extent.fits_within(max_dimension) {
        return Err(AllocError::ExceedsLimit {
            requested: extent,
            max_dimension,
        });
    }

    let scope = device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: extent.to_wgpu(),
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
        view_formats: &[],
    });
    // Popped before the view is created: a view of an invalid texture would raise a
    // validation error outside this scope.
    check_scope(extent, pollster::block_on(scope.pop()))?;

    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    Ok((texture, view))
}

/// Maps whatever the allocation's error scope captured to an [`AllocError`].
fn check_scope(requested: PixelExtent, captured: Option<wgpu::Error>) -> Result<(), AllocError> {
    match captured {
        None => Ok(()),
        Some(err) => Err(AllocError::OutOfMemory {
            requested,
            reason: err.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generations_are_unique_and_nonzero() {
        let a = next_generation();
        let b = next_generation();
        assert_ne!(a, 0);
        assert!(b > a);
    }

    #[test]
    fn alloc_error_names_size_and_limit() {
        let err = AllocError::ExceedsLimit {
            requested: PixelExtent::new(20000, 10),
            max_dimension: 8192,
        };
        assert_eq!(
            err.to_string(),
            "offscreen buffer 20000x10 exceeds device limit of 8192px per axis"
        );
        assert_eq!(err.requested(), PixelExtent::new(20000, 10));
    }

    #[test]
    fn clean_scope_allocates() {
        assert_eq!(check_scope(PixelExtent::new(64, 64), None), Ok(()));
    }

    #[test]
    fn out_of_memory_becomes_alloc_error() {
        let captured = wgpu::Error::OutOfMemory {
            source: Box::new(std::io::Error::other("heap exhausted")),
        };
        let err = check_scope(PixelExtent::new(4096, 4096), Some(captured)).unwrap_err();
        assert_eq!(
            err,
            AllocError::OutOfMemory {
                requested: PixelExtent::new(4096, 4096),
                reason: "Out of Memory".to_string(),
            }
        );
        assert_eq!(err.to_string(), "offscreen buffer 4096x4096: out of GPU memory (Out of Memory)");
    }
}
