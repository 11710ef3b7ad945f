/// Plain data types shared between the core and GPU backends

use bitflags::bitflags;

/// Pixel formats used by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(non_camel_case_types)]
pub enum Format {
    R8G8B8A8_SRGB,
    R8G8B8A8_UNORM,
    B8G8R8A8_SRGB,
    B8G8R8A8_UNORM,
    D32_SFLOAT,
}

impl Format {
    /// Size of one texel in bytes
    pub fn bytes_per_pixel(self) -> u32 {
        match self {
            Format::R8G8B8A8_SRGB
            | Format::R8G8B8A8_UNORM
            | Format::B8G8R8A8_SRGB
            | Format::B8G8R8A8_UNORM
            | Format::D32_SFLOAT => 4,
        }
    }

    pub fn is_depth(self) -> bool {
        matches!(self, Format::D32_SFLOAT)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Extent2D {
    pub width: u32,
    pub height: u32,
}

impl Extent2D {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// A zero-area extent (minimized window) cannot back a swapchain
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Extent3D {
    pub width: u32,
    pub height: u32,
    pub depth: u32,
}

impl Extent3D {
    pub fn new(width: u32, height: u32, depth: u32) -> Self {
        Self { width, height, depth }
    }

    /// 2D image extent (depth 1)
    pub fn flat(width: u32, height: u32) -> Self {
        Self { width, height, depth: 1 }
    }

    pub fn texel_count(&self) -> u64 {
        self.width as u64 * self.height as u64 * self.depth as u64
    }
}

impl From<Extent2D> for Extent3D {
    fn from(extent: Extent2D) -> Self {
        Self::flat(extent.width, extent.height)
    }
}

bitflags! {
    /// Buffer usage flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct BufferUsage: u32 {
        const TRANSFER_SRC = 1 << 0;
        const TRANSFER_DST = 1 << 1;
        const UNIFORM = 1 << 2;
        const STORAGE = 1 << 3;
        const INDEX = 1 << 4;
        const VERTEX = 1 << 5;
    }
}

bitflags! {
    /// Image usage flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ImageUsage: u32 {
        const TRANSFER_SRC = 1 << 0;
        const TRANSFER_DST = 1 << 1;
        const SAMPLED = 1 << 2;
        const COLOR_ATTACHMENT = 1 << 3;
        const DEPTH_STENCIL_ATTACHMENT = 1 << 4;
    }
}

bitflags! {
    /// Shader stages visible to push constants and descriptor bindings
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ShaderStages: u32 {
        const VERTEX = 1 << 0;
        const FRAGMENT = 1 << 1;
    }
}

/// Where a buffer's memory lives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryLocation {
    /// Host-visible, persistently mapped (staging, uniforms)
    CpuToGpu,
    /// Device-local, only reachable through transfers
    GpuOnly,
    /// Host-visible readback target
    GpuToCpu,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DescriptorType {
    UniformBuffer,
    CombinedImageSampler,
    StorageBuffer,
}

/// Per-type capacity of a descriptor pool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DescriptorPoolSize {
    pub ty: DescriptorType,
    pub count: u32,
}

/// Fixed quotas every pool of an allocator is created with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptorPoolQuotas {
    pub max_sets: u32,
    pub sizes: Vec<DescriptorPoolSize>,
}

impl DescriptorPoolQuotas {
    pub fn new(max_sets: u32, sizes: &[(DescriptorType, u32)]) -> Self {
        Self {
            max_sets,
            sizes: sizes
                .iter()
                .map(|&(ty, count)| DescriptorPoolSize { ty, count })
                .collect(),
        }
    }

    /// Descriptors of type `ty` one pool can hand out
    pub fn capacity(&self, ty: DescriptorType) -> u32 {
        self.sizes.iter().filter(|s| s.ty == ty).map(|s| s.count).sum()
    }
}

/// One binding slot of a descriptor set layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DescriptorBinding {
    pub binding: u32,
    pub ty: DescriptorType,
    pub stages: ShaderStages,
}

/// Resource written into a descriptor set binding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescriptorWrite {
    UniformBuffer {
        binding: u32,
        buffer: super::BufferHandle,
        range: u64,
    },
    CombinedImageSampler {
        binding: u32,
        view: super::ImageViewHandle,
        sampler: super::SamplerHandle,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Filter {
    Nearest,
    Linear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexType {
    U16,
    U32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub min_depth: f32,
    pub max_depth: f32,
}

impl Viewport {
    /// Full-extent viewport with the standard [0, 1] depth range
    pub fn from_extent(extent: Extent2D) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: extent.width as f32,
            height: extent.height as f32,
            min_depth: 0.0,
            max_depth: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect2D {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect2D {
    pub fn from_extent(extent: Extent2D) -> Self {
        Self { x: 0, y: 0, width: extent.width, height: extent.height }
    }
}
