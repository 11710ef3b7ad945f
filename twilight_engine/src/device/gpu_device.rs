/// GPU device trait - resource factory, synchronization and submission
///
/// Implemented once per backend (the Vulkan backend in practice, a mock in
/// tests). All objects are addressed by opaque handles; every failure of the
/// underlying API is fatal and comes back as `Err`, except the conditions
/// documented per method.

use crate::error::Result;
use super::*;

pub trait GpuDevice: CommandRecorder {
    // ===== BUFFERS =====

    /// Create a buffer and bind fresh memory to it
    fn create_buffer(&mut self, desc: &BufferDesc) -> Result<GpuBuffer>;

    /// Free the buffer's memory and destroy it
    fn destroy_buffer(&mut self, buffer: &GpuBuffer);

    /// Copy `data` into a mapped buffer at `offset`
    fn write_buffer(&mut self, buffer: &GpuBuffer, offset: u64, data: &[u8]) -> Result<()>;

    /// Copy `out.len()` bytes from a mapped buffer at `offset`
    fn read_buffer(&self, buffer: &GpuBuffer, offset: u64, out: &mut [u8]) -> Result<()>;

    // ===== IMAGES =====

    /// Create an image in the Undefined layout plus a view over all its mips
    fn create_image(&mut self, desc: &ImageDesc) -> Result<GpuImage>;

    fn destroy_image(&mut self, image: &GpuImage);

    fn create_sampler(&mut self, desc: &SamplerDesc) -> Result<SamplerHandle>;

    fn destroy_sampler(&mut self, sampler: SamplerHandle);

    // ===== DESCRIPTORS =====

    fn create_descriptor_set_layout(
        &mut self,
        bindings: &[DescriptorBinding],
    ) -> Result<DescriptorSetLayoutHandle>;

    fn destroy_descriptor_set_layout(&mut self, layout: DescriptorSetLayoutHandle);

    fn create_descriptor_pool(&mut self, quotas: &DescriptorPoolQuotas) -> Result<DescriptorPoolHandle>;

    /// Allocate one set from `pool`
    ///
    /// Returns `Error::DescriptorPoolExhausted` when the pool is out of sets or
    /// descriptors (`ERROR_OUT_OF_POOL_MEMORY` / `ERROR_FRAGMENTED_POOL`).
    fn allocate_descriptor_set(
        &mut self,
        pool: DescriptorPoolHandle,
        layout: DescriptorSetLayoutHandle,
    ) -> Result<DescriptorSetHandle>;

    /// Return every set of `pool` to it at once
    fn reset_descriptor_pool(&mut self, pool: DescriptorPoolHandle) -> Result<()>;

    fn destroy_descriptor_pool(&mut self, pool: DescriptorPoolHandle);

    fn write_descriptor_set(&mut self, set: DescriptorSetHandle, writes: &[DescriptorWrite]);

    // ===== PIPELINES =====

    fn create_graphics_pipeline(
        &mut self,
        desc: &GraphicsPipelineDesc,
    ) -> Result<(PipelineHandle, PipelineLayoutHandle)>;

    fn destroy_pipeline(&mut self, pipeline: PipelineHandle, layout: PipelineLayoutHandle);

    // ===== COMMANDS & SYNCHRONIZATION =====

    /// Allocate a primary, individually resettable command buffer
    fn allocate_command_buffer(&mut self) -> Result<CommandBufferHandle>;

    fn free_command_buffer(&mut self, cmd: CommandBufferHandle);

    fn create_fence(&mut self, signaled: bool) -> Result<FenceHandle>;

    /// Block until `fence` is signaled
    fn wait_for_fence(&mut self, fence: FenceHandle) -> Result<()>;

    fn reset_fence(&mut self, fence: FenceHandle) -> Result<()>;

    fn destroy_fence(&mut self, fence: FenceHandle);

    fn create_semaphore(&mut self) -> Result<SemaphoreHandle>;

    fn destroy_semaphore(&mut self, semaphore: SemaphoreHandle);

    /// Submit to the graphics queue
    fn submit(&mut self, info: &SubmitInfo) -> Result<()>;

    /// Block until the device has finished all submitted work
    fn wait_idle(&mut self) -> Result<()>;
}
