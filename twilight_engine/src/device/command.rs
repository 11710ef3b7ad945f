/// Command recording trait
///
/// Every call appends to the command buffer named by `cmd`. Recording errors
/// that a backend can detect (for example an unknown handle) are reported
/// through `Result`; the Vulkan entry points used here cannot fail once the
/// buffer is in the recording state.

use crate::error::Result;
use super::*;

pub trait CommandRecorder {
    // ===== LIFECYCLE =====

    /// Put a reset command buffer into the recording state
    fn begin_commands(&mut self, cmd: CommandBufferHandle) -> Result<()>;

    fn end_commands(&mut self, cmd: CommandBufferHandle) -> Result<()>;

    /// Return the command buffer to the initial state
    ///
    /// Callers must have observed the fence of its last submission signaled.
    fn reset_commands(&mut self, cmd: CommandBufferHandle) -> Result<()>;

    // ===== TRANSFER =====

    fn pipeline_barrier(&mut self, cmd: CommandBufferHandle, barriers: &[ImageBarrier]);

    fn copy_buffer(
        &mut self,
        cmd: CommandBufferHandle,
        src: BufferHandle,
        dst: BufferHandle,
        size: u64,
    );

    /// Copy tightly packed texels into mip level 0 (image in TransferDst)
    fn copy_buffer_to_image(
        &mut self,
        cmd: CommandBufferHandle,
        src: BufferHandle,
        dst: ImageHandle,
        extent: Extent3D,
    );

    /// Blit one mip level into another (src in TransferSrc, dst in TransferDst)
    fn blit_mip(&mut self, cmd: CommandBufferHandle, blit: &MipBlit);

    // ===== RENDERING =====

    fn begin_rendering(&mut self, cmd: CommandBufferHandle, info: &RenderingInfo);

    fn end_rendering(&mut self, cmd: CommandBufferHandle);

    fn bind_pipeline(&mut self, cmd: CommandBufferHandle, pipeline: PipelineHandle);

    fn set_viewport(&mut self, cmd: CommandBufferHandle, viewport: Viewport);

    fn set_scissor(&mut self, cmd: CommandBufferHandle, scissor: Rect2D);

    fn bind_descriptor_sets(
        &mut self,
        cmd: CommandBufferHandle,
        layout: PipelineLayoutHandle,
        first_set: u32,
        sets: &[DescriptorSetHandle],
    );

    fn push_constants(
        &mut self,
        cmd: CommandBufferHandle,
        layout: PipelineLayoutHandle,
        stages: ShaderStages,
        offset: u32,
        data: &[u8],
    );

    fn bind_vertex_buffer(&mut self, cmd: CommandBufferHandle, buffer: BufferHandle, offset: u64);

    fn bind_index_buffer(
        &mut self,
        cmd: CommandBufferHandle,
        buffer: BufferHandle,
        offset: u64,
        index_type: IndexType,
    );

    fn draw_indexed(
        &mut self,
        cmd: CommandBufferHandle,
        index_count: u32,
        instance_count: u32,
        first_index: u32,
        vertex_offset: i32,
        first_instance: u32,
    );
}
