/// Resource descriptors and the resource records the core hands around

use std::path::PathBuf;
use super::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferDesc {
    pub size: u64,
    pub usage: BufferUsage,
    pub location: MemoryLocation,
}

/// A buffer and its allocation
///
/// The backend keeps the allocation (and mapped pointer for host-visible
/// memory) keyed by `handle`. Owned by whoever created it; destroy it only
/// once the GPU no longer references it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GpuBuffer {
    pub handle: BufferHandle,
    pub size: u64,
    pub usage: BufferUsage,
    pub location: MemoryLocation,
    /// Persistently mapped (CpuToGpu / GpuToCpu memory)
    pub mapped: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageDesc {
    pub extent: Extent3D,
    pub format: Format,
    pub usage: ImageUsage,
    pub mip_levels: u32,
}

/// An image, its default view and its allocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GpuImage {
    pub handle: ImageHandle,
    pub view: ImageViewHandle,
    pub format: Format,
    pub extent: Extent3D,
    pub mip_levels: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplerDesc {
    pub filter: Filter,
    /// Highest mip level the sampler may read
    pub max_lod: f32,
}

/// Vertex attribute formats accepted by pipelines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VertexFormat {
    Float2,
    Float3,
    Float4,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexAttribute {
    pub location: u32,
    pub offset: u32,
    pub format: VertexFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PushConstantRange {
    pub stages: ShaderStages,
    pub offset: u32,
    pub size: u32,
}

/// Everything needed to build one graphics pipeline for dynamic rendering
#[derive(Debug, Clone)]
pub struct GraphicsPipelineDesc {
    pub vertex_code: Vec<u32>,
    pub fragment_code: Vec<u32>,
    /// Where the bytecode came from, for diagnostics
    pub vertex_path: PathBuf,
    pub fragment_path: PathBuf,
    pub vertex_stride: u32,
    pub vertex_attributes: Vec<VertexAttribute>,
    /// Set layouts in set-index order
    pub set_layouts: Vec<DescriptorSetLayoutHandle>,
    pub push_constants: Vec<PushConstantRange>,
    pub color_format: Format,
    pub depth_format: Format,
}

/// Attachments and clear values for one dynamic rendering scope
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderingInfo {
    pub color_view: ImageViewHandle,
    pub depth_view: ImageViewHandle,
    pub extent: Extent2D,
    pub clear_color: [f32; 4],
    pub clear_depth: f32,
}

/// Linear/nearest blit between two mip levels of the same image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MipBlit {
    pub image: ImageHandle,
    pub src_level: u32,
    pub src_extent: Extent3D,
    pub dst_level: u32,
    pub dst_extent: Extent3D,
    pub filter: Filter,
}
