/// VulkanBackend - Vulkan implementation of the `GpuDevice` trait
///
/// Resource factory, synchronization and queue submission. Buffer and image
/// memory comes from gpu-allocator; the allocations are kept here keyed by
/// the raw Vulkan handle, so the engine only ever sees the opaque handles.
/// Host-visible buffers stay persistently mapped for their whole lifetime.
///
/// Command recording lives in `vulkan_commands`, presentation in
/// `vulkan_swapchain`, pipeline creation in `vulkan_pipeline`.

use ash::vk;
use ash::vk::Handle;
use gpu_allocator::vulkan::{Allocation, AllocationCreateDesc, AllocationScheme, Allocator, AllocatorCreateDesc};
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use rustc_hash::FxHashMap;
use std::mem::ManuallyDrop;
use twilight_engine::twilight::device::*;
use twilight_engine::twilight::{Error, RendererConfig, Result};
use twilight_engine::{engine_debug, engine_err, engine_error, engine_info, engine_warn};

use crate::vulkan_context::VulkanContext;
use crate::vulkan_format::{
    buffer_usage_to_vk, descriptor_type_to_vk, filter_to_vk, format_to_vk, image_usage_to_vk,
    memory_location_to_vk, mipmap_mode_to_vk, shader_stages_to_vk, stages_to_vk,
};
use crate::vulkan_pipeline;
use crate::vulkan_swapchain::Swapchain;

/// Byte range `offset..offset + len` of a `size`-byte mapped buffer
pub(crate) fn mapped_range(op: &str, offset: u64, len: usize, size: u64) -> Result<std::ops::Range<usize>> {
    match offset.checked_add(len as u64) {
        Some(end) if end <= size => Ok(offset as usize..end as usize),
        _ => Err(Error::InvalidResource(format!(
            "{}: {} bytes at offset {} overflow a {} byte buffer",
            op, len, offset, size
        ))),
    }
}

struct BufferAllocation {
    buffer: vk::Buffer,
    allocation: Allocation,
}

struct ImageAllocation {
    image: vk::Image,
    view: vk::ImageView,
    allocation: Allocation,
}

pub struct VulkanBackend {
    pub(crate) context: VulkanContext,

    /// Dropped by hand before the device is destroyed
    allocator: ManuallyDrop<Allocator>,

    pub(crate) swapchain: Swapchain,

    /// Pool of the resettable primary command buffers
    command_pool: vk::CommandPool,

    buffers: FxHashMap<u64, BufferAllocation>,
    images: FxHashMap<u64, ImageAllocation>,
}

impl VulkanBackend {
    /// Create the device for `window` and a swapchain of `width` x `height`
    ///
    /// The swapchain follows the surface's own extent where the platform
    /// defines one.
    pub fn new<W: HasDisplayHandle + HasWindowHandle>(
        window: &W,
        width: u32,
        height: u32,
        config: &RendererConfig,
    ) -> Result<Self> {
        let context = VulkanContext::new(window, config)?;

        let allocator = Allocator::new(&AllocatorCreateDesc {
            instance: context.instance.clone(),
            device: context.device.clone(),
            physical_device: context.physical_device,
            debug_settings: Default::default(),
            buffer_device_address: false,
            allocation_sizes: Default::default(),
        })
        .map_err(|e| {
            engine_error!("twilight::vulkan", "Failed to create GPU allocator: {:?}", e);
            Error::InitializationFailed(format!("Failed to create allocator: {:?}", e))
        })?;

        let pool_info = vk::CommandPoolCreateInfo::default()
            .flags(vk::CommandPoolCreateFlags::RESET_COMMAND_BUFFER)
            .queue_family_index(context.queue_family);
        let command_pool = unsafe { context.device.create_command_pool(&pool_info, None) }.map_err(|e| {
            engine_error!("twilight::vulkan", "vkCreateCommandPool failed: {:?}", e);
            Error::InitializationFailed(format!("Failed to create command pool: {:?}", e))
        })?;

        let swapchain = Swapchain::new(&context, Extent2D::new(width, height))?;

        let backend = Self {
            context,
            allocator: ManuallyDrop::new(allocator),
            swapchain,
            command_pool,
            buffers: FxHashMap::default(),
            images: FxHashMap::default(),
        };

        let extent = backend.swapchain_extent();
        engine_info!(
            "twilight::vulkan",
            "Vulkan backend ready on '{}' ({}x{}, {} swapchain images)",
            backend.context.device_name(),
            extent.width,
            extent.height,
            backend.swapchain.image_count()
        );
        Ok(backend)
    }

    pub(crate) fn device(&self) -> &ash::Device {
        &self.context.device
    }

    /// Name of the GPU the backend runs on
    pub fn device_name(&self) -> String {
        self.context.device_name()
    }

    /// Number of live buffers and images created through this backend
    pub fn live_allocations(&self) -> usize {
        self.buffers.len() + self.images.len()
    }

    fn allocate_memory(
        &mut self,
        name: &str,
        requirements: vk::MemoryRequirements,
        location: gpu_allocator::MemoryLocation,
        linear: bool,
    ) -> Result<Allocation> {
        self.allocator
            .allocate(&AllocationCreateDesc {
                name,
                requirements,
                location,
                linear,
                allocation_scheme: AllocationScheme::GpuAllocatorManaged,
            })
            .map_err(|e| {
                let size_mb = requirements.size as f64 / (1024.0 * 1024.0);
                engine_error!(
                    "twilight::vulkan",
                    "Out of GPU memory for {} (required: {:.2} MB): {:?}",
                    name,
                    size_mb,
                    e
                );
                Error::OutOfMemory
            })
    }

    fn free_memory(&mut self, allocation: Allocation) {
        if let Err(e) = self.allocator.free(allocation) {
            engine_warn!("twilight::vulkan", "Failed to free GPU allocation: {:?}", e);
        }
    }
}

impl GpuDevice for VulkanBackend {
    // ===== BUFFERS =====

    fn create_buffer(&mut self, desc: &BufferDesc) -> Result<GpuBuffer> {
        if desc.size == 0 {
            return Err(Error::InvalidResource("buffer size must be non-zero".to_string()));
        }

        let create_info = vk::BufferCreateInfo::default()
            .size(desc.size)
            .usage(buffer_usage_to_vk(desc.usage))
            .sharing_mode(vk::SharingMode::EXCLUSIVE);
        let buffer = unsafe { self.device().create_buffer(&create_info, None) }
            .map_err(|e| engine_err!("twilight::vulkan", "vkCreateBuffer ({} bytes) failed: {:?}", desc.size, e))?;

        let requirements = unsafe { self.device().get_buffer_memory_requirements(buffer) };
        let allocation = match self.allocate_memory("buffer", requirements, memory_location_to_vk(desc.location), true) {
            Ok(allocation) => allocation,
            Err(e) => {
                unsafe { self.device().destroy_buffer(buffer, None) };
                return Err(e);
            }
        };

        let bound = unsafe {
            self.device().bind_buffer_memory(buffer, allocation.memory(), allocation.offset())
        };
        if let Err(e) = bound {
            unsafe { self.device().destroy_buffer(buffer, None) };
            self.free_memory(allocation);
            return Err(engine_err!("twilight::vulkan", "vkBindBufferMemory failed: {:?}", e));
        }

        let mapped = allocation.mapped_ptr().is_some();
        self.buffers.insert(buffer.as_raw(), BufferAllocation { buffer, allocation });

        Ok(GpuBuffer {
            handle: BufferHandle(buffer.as_raw()),
            size: desc.size,
            usage: desc.usage,
            location: desc.location,
            mapped,
        })
    }

    fn destroy_buffer(&mut self, buffer: &GpuBuffer) {
        let Some(entry) = self.buffers.remove(&buffer.handle.0) else {
            engine_warn!("twilight::vulkan", "destroy_buffer: unknown buffer {:#x}", buffer.handle.0);
            return;
        };
        unsafe { self.device().destroy_buffer(entry.buffer, None) };
        self.free_memory(entry.allocation);
    }

    fn write_buffer(&mut self, buffer: &GpuBuffer, offset: u64, data: &[u8]) -> Result<()> {
        let entry = self.buffers.get_mut(&buffer.handle.0).ok_or_else(|| {
            Error::InvalidResource(format!("write_buffer: unknown buffer {:#x}", buffer.handle.0))
        })?;
        let range = mapped_range("write_buffer", offset, data.len(), buffer.size)?;
        let mapped = entry.allocation.mapped_slice_mut().ok_or_else(|| {
            Error::InvalidResource("write_buffer: buffer memory is not host-visible".to_string())
        })?;
        mapped[range].copy_from_slice(data);
        Ok(())
    }

    fn read_buffer(&self, buffer: &GpuBuffer, offset: u64, out: &mut [u8]) -> Result<()> {
        let entry = self.buffers.get(&buffer.handle.0).ok_or_else(|| {
            Error::InvalidResource(format!("read_buffer: unknown buffer {:#x}", buffer.handle.0))
        })?;
        let range = mapped_range("read_buffer", offset, out.len(), buffer.size)?;
        let mapped = entry.allocation.mapped_slice().ok_or_else(|| {
            Error::InvalidResource("read_buffer: buffer memory is not host-visible".to_string())
        })?;
        out.copy_from_slice(&mapped[range]);
        Ok(())
    }

    // ===== IMAGES =====

    fn create_image(&mut self, desc: &ImageDesc) -> Result<GpuImage> {
        let format = format_to_vk(desc.format);
        let create_info = vk::ImageCreateInfo::default()
            .image_type(vk::ImageType::TYPE_2D)
            .format(format)
            .extent(vk::Extent3D {
                width: desc.extent.width,
                height: desc.extent.height,
                depth: desc.extent.depth,
            })
            .mip_levels(desc.mip_levels)
            .array_layers(1)
            .samples(vk::SampleCountFlags::TYPE_1)
            .tiling(vk::ImageTiling::OPTIMAL)
            .usage(image_usage_to_vk(desc.usage))
            .sharing_mode(vk::SharingMode::EXCLUSIVE)
            .initial_layout(vk::ImageLayout::UNDEFINED);

        let image = unsafe { self.device().create_image(&create_info, None) }.map_err(|e| {
            engine_err!(
                "twilight::vulkan",
                "vkCreateImage ({}x{}, {:?}, {} mips) failed: {:?}",
                desc.extent.width,
                desc.extent.height,
                desc.format,
                desc.mip_levels,
                e
            )
        })?;

        let requirements = unsafe { self.device().get_image_memory_requirements(image) };
        let allocation = match self.allocate_memory("image", requirements, gpu_allocator::MemoryLocation::GpuOnly, false) {
            Ok(allocation) => allocation,
            Err(e) => {
                unsafe { self.device().destroy_image(image, None) };
                return Err(e);
            }
        };

        let bound = unsafe {
            self.device().bind_image_memory(image, allocation.memory(), allocation.offset())
        };
        if let Err(e) = bound {
            unsafe { self.device().destroy_image(image, None) };
            self.free_memory(allocation);
            return Err(engine_err!("twilight::vulkan", "vkBindImageMemory failed: {:?}", e));
        }

        let aspect = if desc.format.is_depth() {
            vk::ImageAspectFlags::DEPTH
        } else {
            vk::ImageAspectFlags::COLOR
        };
        let view_info = vk::ImageViewCreateInfo::default()
            .image(image)
            .view_type(vk::ImageViewType::TYPE_2D)
            .format(format)
            .subresource_range(vk::ImageSubresourceRange {
                aspect_mask: aspect,
                base_mip_level: 0,
                level_count: desc.mip_levels,
                base_array_layer: 0,
                layer_count: 1,
            });
        let view = match unsafe { self.device().create_image_view(&view_info, None) } {
            Ok(view) => view,
            Err(e) => {
                unsafe { self.device().destroy_image(image, None) };
                self.free_memory(allocation);
                return Err(engine_err!("twilight::vulkan", "vkCreateImageView failed: {:?}", e));
            }
        };

        self.images.insert(image.as_raw(), ImageAllocation { image, view, allocation });

        Ok(GpuImage {
            handle: ImageHandle(image.as_raw()),
            view: ImageViewHandle(view.as_raw()),
            format: desc.format,
            extent: desc.extent,
            mip_levels: desc.mip_levels,
        })
    }

    fn destroy_image(&mut self, image: &GpuImage) {
        let Some(entry) = self.images.remove(&image.handle.0) else {
            engine_warn!("twilight::vulkan", "destroy_image: unknown image {:#x}", image.handle.0);
            return;
        };
        unsafe {
            self.device().destroy_image_view(entry.view, None);
            self.device().destroy_image(entry.image, None);
        }
        self.free_memory(entry.allocation);
    }

    fn create_sampler(&mut self, desc: &SamplerDesc) -> Result<SamplerHandle> {
        let filter = filter_to_vk(desc.filter);
        let create_info = vk::SamplerCreateInfo::default()
            .mag_filter(filter)
            .min_filter(filter)
            .mipmap_mode(mipmap_mode_to_vk(desc.filter))
            .address_mode_u(vk::SamplerAddressMode::REPEAT)
            .address_mode_v(vk::SamplerAddressMode::REPEAT)
            .address_mode_w(vk::SamplerAddressMode::REPEAT)
            .anisotropy_enable(false)
            .compare_enable(false)
            .min_lod(0.0)
            .max_lod(desc.max_lod)
            .border_color(vk::BorderColor::INT_OPAQUE_BLACK)
            .unnormalized_coordinates(false);

        let sampler = unsafe { self.device().create_sampler(&create_info, None) }
            .map_err(|e| engine_err!("twilight::vulkan", "vkCreateSampler failed: {:?}", e))?;
        Ok(SamplerHandle(sampler.as_raw()))
    }

    fn destroy_sampler(&mut self, sampler: SamplerHandle) {
        unsafe { self.device().destroy_sampler(vk::Sampler::from_raw(sampler.0), None) };
    }

    // ===== DESCRIPTORS =====

    fn create_descriptor_set_layout(
        &mut self,
        bindings: &[DescriptorBinding],
    ) -> Result<DescriptorSetLayoutHandle> {
        let vk_bindings: Vec<vk::DescriptorSetLayoutBinding> = bindings
            .iter()
            .map(|binding| {
                vk::DescriptorSetLayoutBinding::default()
                    .binding(binding.binding)
                    .descriptor_type(descriptor_type_to_vk(binding.ty))
                    .descriptor_count(1)
                    .stage_flags(shader_stages_to_vk(binding.stages))
            })
            .collect();
        let create_info = vk::DescriptorSetLayoutCreateInfo::default().bindings(&vk_bindings);

        let layout = unsafe { self.device().create_descriptor_set_layout(&create_info, None) }
            .map_err(|e| engine_err!("twilight::vulkan", "vkCreateDescriptorSetLayout failed: {:?}", e))?;
        Ok(DescriptorSetLayoutHandle(layout.as_raw()))
    }

    fn destroy_descriptor_set_layout(&mut self, layout: DescriptorSetLayoutHandle) {
        unsafe {
            self.device()
                .destroy_descriptor_set_layout(vk::DescriptorSetLayout::from_raw(layout.0), None)
        };
    }

    fn create_descriptor_pool(&mut self, quotas: &DescriptorPoolQuotas) -> Result<DescriptorPoolHandle> {
        // Zero-sized entries are invalid in VkDescriptorPoolSize
        let pool_sizes: Vec<vk::DescriptorPoolSize> = quotas
            .sizes
            .iter()
            .filter(|size| size.count > 0)
            .map(|size| vk::DescriptorPoolSize {
                ty: descriptor_type_to_vk(size.ty),
                descriptor_count: size.count,
            })
            .collect();
        let create_info = vk::DescriptorPoolCreateInfo::default()
            .pool_sizes(&pool_sizes)
            .max_sets(quotas.max_sets);

        let pool = unsafe { self.device().create_descriptor_pool(&create_info, None) }
            .map_err(|e| engine_err!("twilight::vulkan", "vkCreateDescriptorPool failed: {:?}", e))?;
        engine_debug!("twilight::vulkan", "Descriptor pool created ({} sets)", quotas.max_sets);
        Ok(DescriptorPoolHandle(pool.as_raw()))
    }

    fn allocate_descriptor_set(
        &mut self,
        pool: DescriptorPoolHandle,
        layout: DescriptorSetLayoutHandle,
    ) -> Result<DescriptorSetHandle> {
        let set_layouts = [vk::DescriptorSetLayout::from_raw(layout.0)];
        let allocate_info = vk::DescriptorSetAllocateInfo::default()
            .descriptor_pool(vk::DescriptorPool::from_raw(pool.0))
            .set_layouts(&set_layouts);

        match unsafe { self.device().allocate_descriptor_sets(&allocate_info) } {
            Ok(sets) => sets
                .first()
                .map(|set| DescriptorSetHandle(set.as_raw()))
                .ok_or_else(|| engine_err!("twilight::vulkan", "vkAllocateDescriptorSets returned no set")),
            Err(vk::Result::ERROR_OUT_OF_POOL_MEMORY) | Err(vk::Result::ERROR_FRAGMENTED_POOL) => {
                Err(Error::DescriptorPoolExhausted)
            }
            Err(e) => Err(engine_err!("twilight::vulkan", "vkAllocateDescriptorSets failed: {:?}", e)),
        }
    }

    fn reset_descriptor_pool(&mut self, pool: DescriptorPoolHandle) -> Result<()> {
        unsafe {
            self.device().reset_descriptor_pool(
                vk::DescriptorPool::from_raw(pool.0),
                vk::DescriptorPoolResetFlags::empty(),
            )
        }
        .map_err(|e| engine_err!("twilight::vulkan", "vkResetDescriptorPool failed: {:?}", e))
    }

    fn destroy_descriptor_pool(&mut self, pool: DescriptorPoolHandle) {
        unsafe {
            self.device()
                .destroy_descriptor_pool(vk::DescriptorPool::from_raw(pool.0), None)
        };
    }

    fn write_descriptor_set(&mut self, set: DescriptorSetHandle, writes: &[DescriptorWrite]) {
        // Info structs must outlive the write array that points into them
        let buffer_infos: Vec<Option<vk::DescriptorBufferInfo>> = writes
            .iter()
            .map(|write| match *write {
                DescriptorWrite::UniformBuffer { buffer, range, .. } => Some(
                    vk::DescriptorBufferInfo::default()
                        .buffer(vk::Buffer::from_raw(buffer.0))
                        .offset(0)
                        .range(range),
                ),
                DescriptorWrite::CombinedImageSampler { .. } => None,
            })
            .collect();
        let image_infos: Vec<Option<vk::DescriptorImageInfo>> = writes
            .iter()
            .map(|write| match *write {
                DescriptorWrite::CombinedImageSampler { view, sampler, .. } => Some(
                    vk::DescriptorImageInfo::default()
                        .image_view(vk::ImageView::from_raw(view.0))
                        .sampler(vk::Sampler::from_raw(sampler.0))
                        .image_layout(vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL),
                ),
                DescriptorWrite::UniformBuffer { .. } => None,
            })
            .collect();

        let dst_set = vk::DescriptorSet::from_raw(set.0);
        let vk_writes: Vec<vk::WriteDescriptorSet> = writes
            .iter()
            .enumerate()
            .map(|(i, write)| {
                let base = vk::WriteDescriptorSet::default().dst_set(dst_set).dst_array_element(0);
                match *write {
                    DescriptorWrite::UniformBuffer { binding, .. } => base
                        .dst_binding(binding)
                        .descriptor_type(vk::DescriptorType::UNIFORM_BUFFER)
                        .buffer_info(buffer_infos[i].as_slice()),
                    DescriptorWrite::CombinedImageSampler { binding, .. } => base
                        .dst_binding(binding)
                        .descriptor_type(vk::DescriptorType::COMBINED_IMAGE_SAMPLER)
                        .image_info(image_infos[i].as_slice()),
                }
            })
            .collect();

        unsafe { self.device().update_descriptor_sets(&vk_writes, &[]) };
    }

    // ===== PIPELINES =====

    fn create_graphics_pipeline(
        &mut self,
        desc: &GraphicsPipelineDesc,
    ) -> Result<(PipelineHandle, PipelineLayoutHandle)> {
        vulkan_pipeline::create_graphics_pipeline(self.device(), desc)
    }

    fn destroy_pipeline(&mut self, pipeline: PipelineHandle, layout: PipelineLayoutHandle) {
        unsafe {
            self.device().destroy_pipeline(vk::Pipeline::from_raw(pipeline.0), None);
            self.device()
                .destroy_pipeline_layout(vk::PipelineLayout::from_raw(layout.0), None);
        }
    }

    // ===== COMMANDS & SYNCHRONIZATION =====

    fn allocate_command_buffer(&mut self) -> Result<CommandBufferHandle> {
        let allocate_info = vk::CommandBufferAllocateInfo::default()
            .command_pool(self.command_pool)
            .level(vk::CommandBufferLevel::PRIMARY)
            .command_buffer_count(1);
        let buffers = unsafe { self.device().allocate_command_buffers(&allocate_info) }
            .map_err(|e| engine_err!("twilight::vulkan", "vkAllocateCommandBuffers failed: {:?}", e))?;
        buffers
            .first()
            .map(|cmd| CommandBufferHandle(cmd.as_raw()))
            .ok_or_else(|| engine_err!("twilight::vulkan", "vkAllocateCommandBuffers returned no buffer"))
    }

    fn free_command_buffer(&mut self, cmd: CommandBufferHandle) {
        unsafe {
            self.device()
                .free_command_buffers(self.command_pool, &[vk::CommandBuffer::from_raw(cmd.0)])
        };
    }

    fn create_fence(&mut self, signaled: bool) -> Result<FenceHandle> {
        let flags = if signaled {
            vk::FenceCreateFlags::SIGNALED
        } else {
            vk::FenceCreateFlags::empty()
        };
        let fence = unsafe { self.device().create_fence(&vk::FenceCreateInfo::default().flags(flags), None) }
            .map_err(|e| engine_err!("twilight::vulkan", "vkCreateFence failed: {:?}", e))?;
        Ok(FenceHandle(fence.as_raw()))
    }

    fn wait_for_fence(&mut self, fence: FenceHandle) -> Result<()> {
        unsafe {
            self.device()
                .wait_for_fences(&[vk::Fence::from_raw(fence.0)], true, u64::MAX)
        }
        .map_err(|e| engine_err!("twilight::vulkan", "vkWaitForFences failed: {:?}", e))
    }

    fn reset_fence(&mut self, fence: FenceHandle) -> Result<()> {
        unsafe { self.device().reset_fences(&[vk::Fence::from_raw(fence.0)]) }
            .map_err(|e| engine_err!("twilight::vulkan", "vkResetFences failed: {:?}", e))
    }

    fn destroy_fence(&mut self, fence: FenceHandle) {
        unsafe { self.device().destroy_fence(vk::Fence::from_raw(fence.0), None) };
    }

    fn create_semaphore(&mut self) -> Result<SemaphoreHandle> {
        let semaphore = unsafe {
            self.device()
                .create_semaphore(&vk::SemaphoreCreateInfo::default(), None)
        }
        .map_err(|e| engine_err!("twilight::vulkan", "vkCreateSemaphore failed: {:?}", e))?;
        Ok(SemaphoreHandle(semaphore.as_raw()))
    }

    fn destroy_semaphore(&mut self, semaphore: SemaphoreHandle) {
        unsafe {
            self.device()
                .destroy_semaphore(vk::Semaphore::from_raw(semaphore.0), None)
        };
    }

    fn submit(&mut self, info: &SubmitInfo) -> Result<()> {
        let command_buffer_infos = [vk::CommandBufferSubmitInfo::default()
            .command_buffer(vk::CommandBuffer::from_raw(info.command_buffer.0))];
        let wait_infos: Vec<vk::SemaphoreSubmitInfo> = info
            .wait
            .iter()
            .map(|&(semaphore, stages)| {
                vk::SemaphoreSubmitInfo::default()
                    .semaphore(vk::Semaphore::from_raw(semaphore.0))
                    .stage_mask(stages_to_vk(stages))
            })
            .collect();
        let signal_infos: Vec<vk::SemaphoreSubmitInfo> = info
            .signal
            .iter()
            .map(|semaphore| {
                vk::SemaphoreSubmitInfo::default()
                    .semaphore(vk::Semaphore::from_raw(semaphore.0))
                    .stage_mask(vk::PipelineStageFlags2::ALL_COMMANDS)
            })
            .collect();

        let submit_info = vk::SubmitInfo2::default()
            .wait_semaphore_infos(&wait_infos)
            .command_buffer_infos(&command_buffer_infos)
            .signal_semaphore_infos(&signal_infos);

        unsafe {
            self.device().queue_submit2(
                self.context.queue,
                &[submit_info],
                vk::Fence::from_raw(info.fence.0),
            )
        }
        .map_err(|e| engine_err!("twilight::vulkan", "vkQueueSubmit2 failed: {:?}", e))
    }

    fn wait_idle(&mut self) -> Result<()> {
        unsafe { self.device().device_wait_idle() }
            .map_err(|e| engine_err!("twilight::vulkan", "vkDeviceWaitIdle failed: {:?}", e))
    }
}

impl Drop for VulkanBackend {
    fn drop(&mut self) {
        unsafe {
            if let Err(e) = self.context.device.device_wait_idle() {
                engine_warn!("twilight::vulkan", "vkDeviceWaitIdle failed during shutdown: {:?}", e);
            }
        }

        let leaked = self.live_allocations();
        if leaked > 0 {
            engine_warn!(
                "twilight::vulkan",
                "{} buffer(s)/image(s) still alive at shutdown, releasing them",
                leaked
            );
        }
        for (_, entry) in std::mem::take(&mut self.buffers) {
            unsafe { self.context.device.destroy_buffer(entry.buffer, None) };
            self.free_memory(entry.allocation);
        }
        for (_, entry) in std::mem::take(&mut self.images) {
            unsafe {
                self.context.device.destroy_image_view(entry.view, None);
                self.context.device.destroy_image(entry.image, None);
            }
            self.free_memory(entry.allocation);
        }

        self.swapchain.destroy(&self.context.device);
        unsafe {
            self.context.device.destroy_command_pool(self.command_pool, None);
            // Allocator memory must go before the device
            ManuallyDrop::drop(&mut self.allocator);
        }
        self.context.destroy();
    }
}
