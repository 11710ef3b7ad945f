/// Image layouts, access masks, pipeline stages and barriers
///
/// These mirror the synchronization2 model: every barrier names both the
/// access that must be made available and the access that will consume it,
/// together with the stages doing each.

use bitflags::bitflags;
use super::{CommandBufferHandle, FenceHandle, ImageHandle, SemaphoreHandle};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageLayout {
    Undefined,
    TransferSrc,
    TransferDst,
    ShaderReadOnly,
    ColorAttachment,
    DepthAttachment,
    PresentSrc,
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct AccessFlags: u32 {
        const TRANSFER_READ = 1 << 0;
        const TRANSFER_WRITE = 1 << 1;
        const SHADER_READ = 1 << 2;
        const COLOR_ATTACHMENT_WRITE = 1 << 3;
        const DEPTH_STENCIL_ATTACHMENT_READ = 1 << 4;
        const DEPTH_STENCIL_ATTACHMENT_WRITE = 1 << 5;
        const HOST_READ = 1 << 6;
        const MEMORY_READ = 1 << 7;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct PipelineStages: u32 {
        const TOP_OF_PIPE = 1 << 0;
        const TRANSFER = 1 << 1;
        const FRAGMENT_SHADER = 1 << 2;
        const EARLY_FRAGMENT_TESTS = 1 << 3;
        const LATE_FRAGMENT_TESTS = 1 << 4;
        const COLOR_ATTACHMENT_OUTPUT = 1 << 5;
        const BOTTOM_OF_PIPE = 1 << 6;
        const HOST = 1 << 7;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageAspect {
    Color,
    Depth,
}

/// Range of mip levels an operation touches (single array layer)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubresourceRange {
    pub aspect: ImageAspect,
    pub base_mip_level: u32,
    pub level_count: u32,
}

impl SubresourceRange {
    pub fn color_level(level: u32) -> Self {
        Self { aspect: ImageAspect::Color, base_mip_level: level, level_count: 1 }
    }

    pub fn color_levels(level_count: u32) -> Self {
        Self { aspect: ImageAspect::Color, base_mip_level: 0, level_count }
    }

    pub fn depth() -> Self {
        Self { aspect: ImageAspect::Depth, base_mip_level: 0, level_count: 1 }
    }
}

/// Layout transition with explicit source/destination scopes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageBarrier {
    pub image: ImageHandle,
    pub range: SubresourceRange,
    pub old_layout: ImageLayout,
    pub new_layout: ImageLayout,
    pub src_stages: PipelineStages,
    pub src_access: AccessFlags,
    pub dst_stages: PipelineStages,
    pub dst_access: AccessFlags,
}

impl ImageBarrier {
    pub fn new(image: ImageHandle, range: SubresourceRange) -> Self {
        Self {
            image,
            range,
            old_layout: ImageLayout::Undefined,
            new_layout: ImageLayout::Undefined,
            src_stages: PipelineStages::TOP_OF_PIPE,
            src_access: AccessFlags::empty(),
            dst_stages: PipelineStages::BOTTOM_OF_PIPE,
            dst_access: AccessFlags::empty(),
        }
    }

    pub fn layouts(mut self, old: ImageLayout, new: ImageLayout) -> Self {
        self.old_layout = old;
        self.new_layout = new;
        self
    }

    pub fn src(mut self, stages: PipelineStages, access: AccessFlags) -> Self {
        self.src_stages = stages;
        self.src_access = access;
        self
    }

    pub fn dst(mut self, stages: PipelineStages, access: AccessFlags) -> Self {
        self.dst_stages = stages;
        self.dst_access = access;
        self
    }
}

/// One queue submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitInfo {
    pub command_buffer: CommandBufferHandle,
    /// Semaphore to wait on and the stages that wait for it
    pub wait: Option<(SemaphoreHandle, PipelineStages)>,
    pub signal: Option<SemaphoreHandle>,
    pub fence: FenceHandle,
}
