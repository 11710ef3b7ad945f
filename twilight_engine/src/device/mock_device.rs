/// Mock GPU device for unit tests (no GPU required)
///
/// Implements `GpuDevice`, `CommandRecorder` and `Presenter` in memory:
/// - buffers own byte vectors and `copy_buffer` really copies at submit time,
/// - descriptor pools enforce their quotas,
/// - fences move Unsignaled -> Pending (submitted) -> Signaled (waited),
/// - the swapchain can be told to report out-of-date.
///
/// Misuse that would be undefined behaviour on a real GPU (resetting an
/// in-flight command buffer, beginning a recording twice, recreating the
/// swapchain with work in flight, ...) is collected in `violations`.

use std::collections::VecDeque;
use rustc_hash::FxHashMap;
use crate::device::*;
use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq)]
pub enum MockCommand {
    Barrier(ImageBarrier),
    CopyBuffer { src: BufferHandle, dst: BufferHandle, size: u64 },
    CopyBufferToImage { src: BufferHandle, dst: ImageHandle, extent: Extent3D },
    Blit(MipBlit),
    BeginRendering(RenderingInfo),
    EndRendering,
    BindPipeline(PipelineHandle),
    SetViewport(Viewport),
    SetScissor(Rect2D),
    BindDescriptorSets { first_set: u32, sets: Vec<DescriptorSetHandle> },
    PushConstants { offset: u32, size: u32 },
    BindVertexBuffer(BufferHandle),
    BindIndexBuffer(BufferHandle, IndexType),
    DrawIndexed { index_count: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockFenceState {
    Unsignaled,
    /// Submitted, GPU "executing" until someone waits on it
    Pending,
    Signaled,
}

#[derive(Debug)]
pub struct MockBuffer {
    pub desc: BufferDesc,
    pub data: Vec<u8>,
}

#[derive(Debug)]
pub struct MockPool {
    pub quotas: DescriptorPoolQuotas,
    pub sets: u32,
    pub used: FxHashMap<DescriptorType, u32>,
    pub resets: u32,
}

#[derive(Debug, Default)]
pub struct MockCommandBuffer {
    pub recording: bool,
    pub commands: Vec<MockCommand>,
    /// Fence of the last submission until it is observed signaled
    pub in_flight: Option<FenceHandle>,
}

pub struct MockDevice {
    next_handle: u64,
    pub calls: Vec<String>,
    pub violations: Vec<String>,

    pub buffers: FxHashMap<BufferHandle, MockBuffer>,
    pub images: FxHashMap<ImageHandle, ImageDesc>,
    pub samplers: FxHashMap<SamplerHandle, SamplerDesc>,
    pub set_layouts: FxHashMap<DescriptorSetLayoutHandle, Vec<DescriptorBinding>>,
    pub pools: FxHashMap<DescriptorPoolHandle, MockPool>,
    /// Live descriptor sets and the pool they came from
    pub sets: FxHashMap<DescriptorSetHandle, DescriptorPoolHandle>,
    pub set_writes: FxHashMap<DescriptorSetHandle, Vec<DescriptorWrite>>,
    pub pipelines: FxHashMap<PipelineHandle, PipelineLayoutHandle>,
    pub command_buffers: FxHashMap<CommandBufferHandle, MockCommandBuffer>,
    pub fences: FxHashMap<FenceHandle, MockFenceState>,
    pub semaphores: FxHashMap<SemaphoreHandle, ()>,

    /// Command lists in submission order
    pub submitted: Vec<(SubmitInfo, Vec<MockCommand>)>,
    /// Pipeline bound by the most recently executed submission
    pub last_bound_pipeline: Option<PipelineHandle>,

    // ===== SWAPCHAIN =====
    pub extent: Extent2D,
    /// Extent the "surface" reports on the next recreation
    pub surface_extent: Extent2D,
    pub swapchain_images: Vec<(ImageHandle, ImageViewHandle)>,
    pub next_image: u32,
    pub out_of_date_acquires: u32,
    pub out_of_date_presents: u32,
    pub swapchain_recreations: u32,
    pub presented: Vec<u32>,
    pub failing_fence_waits: VecDeque<Error>,
    /// One-shot reset failures, consumed by the first reset of that pool
    pub failing_pool_resets: FxHashMap<DescriptorPoolHandle, Error>,
}

impl MockDevice {
    pub fn new(width: u32, height: u32) -> Self {
        let mut device = Self {
            next_handle: 1,
            calls: Vec::new(),
            violations: Vec::new(),
            buffers: FxHashMap::default(),
            images: FxHashMap::default(),
            samplers: FxHashMap::default(),
            set_layouts: FxHashMap::default(),
            pools: FxHashMap::default(),
            sets: FxHashMap::default(),
            set_writes: FxHashMap::default(),
            pipelines: FxHashMap::default(),
            command_buffers: FxHashMap::default(),
            fences: FxHashMap::default(),
            semaphores: FxHashMap::default(),
            submitted: Vec::new(),
            last_bound_pipeline: None,
            extent: Extent2D::new(width, height),
            surface_extent: Extent2D::new(width, height),
            swapchain_images: Vec::new(),
            next_image: 0,
            out_of_date_acquires: 0,
            out_of_date_presents: 0,
            swapchain_recreations: 0,
            presented: Vec::new(),
            failing_fence_waits: VecDeque::new(),
            failing_pool_resets: FxHashMap::default(),
        };
        device.build_swapchain_images();
        device
    }

    fn handle(&mut self) -> u64 {
        let id = self.next_handle;
        self.next_handle += 1;
        id
    }

    fn build_swapchain_images(&mut self) {
        self.swapchain_images = (0..3)
            .map(|_| (ImageHandle(self.handle()), ImageViewHandle(self.handle())))
            .collect();
    }

    fn record(&mut self, cmd: CommandBufferHandle, command: MockCommand) {
        match self.command_buffers.get_mut(&cmd) {
            Some(state) if state.recording => state.commands.push(command),
            _ => self.violations.push(format!("{:?} recorded outside recording state", command)),
        }
    }

    fn gpu_busy(&self) -> bool {
        self.fences.values().any(|&s| s == MockFenceState::Pending)
    }

    fn complete_fence(&mut self, fence: FenceHandle) {
        self.fences.insert(fence, MockFenceState::Signaled);
        for state in self.command_buffers.values_mut() {
            if state.in_flight == Some(fence) {
                state.in_flight = None;
            }
        }
    }

    /// Count of recorded calls with the given name
    pub fn call_count(&self, name: &str) -> usize {
        self.calls.iter().filter(|c| c.as_str() == name).count()
    }

    /// All commands of every submission, flattened
    pub fn submitted_commands(&self) -> Vec<MockCommand> {
        self.submitted.iter().flat_map(|(_, cmds)| cmds.iter().cloned()).collect()
    }

    /// Number of live GPU objects (0 after a clean shutdown)
    pub fn live_objects(&self) -> usize {
        self.buffers.len()
            + self.images.len()
            + self.samplers.len()
            + self.set_layouts.len()
            + self.pools.len()
            + self.pipelines.len()
            + self.command_buffers.len()
            + self.fences.len()
            + self.semaphores.len()
    }
}

// ============================================================================
// CommandRecorder
// ============================================================================

impl CommandRecorder for MockDevice {
    fn begin_commands(&mut self, cmd: CommandBufferHandle) -> Result<()> {
        self.calls.push("begin_commands".to_string());
        let state = self
            .command_buffers
            .get_mut(&cmd)
            .ok_or_else(|| Error::InvalidResource(format!("unknown command buffer {:?}", cmd)))?;
        if state.recording {
            self.violations.push(format!("{:?} begun while already recording", cmd));
        }
        if state.in_flight.is_some() {
            self.violations.push(format!("{:?} begun while in flight", cmd));
        }
        state.recording = true;
        state.commands.clear();
        Ok(())
    }

    fn end_commands(&mut self, cmd: CommandBufferHandle) -> Result<()> {
        self.calls.push("end_commands".to_string());
        let state = self
            .command_buffers
            .get_mut(&cmd)
            .ok_or_else(|| Error::InvalidResource(format!("unknown command buffer {:?}", cmd)))?;
        state.recording = false;
        Ok(())
    }

    fn reset_commands(&mut self, cmd: CommandBufferHandle) -> Result<()> {
        self.calls.push("reset_commands".to_string());
        let state = self
            .command_buffers
            .get_mut(&cmd)
            .ok_or_else(|| Error::InvalidResource(format!("unknown command buffer {:?}", cmd)))?;
        if state.in_flight.is_some() {
            self.violations.push(format!("{:?} reset while its submission is in flight", cmd));
        }
        state.recording = false;
        state.commands.clear();
        Ok(())
    }

    fn pipeline_barrier(&mut self, cmd: CommandBufferHandle, barriers: &[ImageBarrier]) {
        for barrier in barriers {
            self.record(cmd, MockCommand::Barrier(*barrier));
        }
    }

    fn copy_buffer(&mut self, cmd: CommandBufferHandle, src: BufferHandle, dst: BufferHandle, size: u64) {
        self.record(cmd, MockCommand::CopyBuffer { src, dst, size });
    }

    fn copy_buffer_to_image(
        &mut self,
        cmd: CommandBufferHandle,
        src: BufferHandle,
        dst: ImageHandle,
        extent: Extent3D,
    ) {
        self.record(cmd, MockCommand::CopyBufferToImage { src, dst, extent });
    }

    fn blit_mip(&mut self, cmd: CommandBufferHandle, blit: &MipBlit) {
        self.record(cmd, MockCommand::Blit(*blit));
    }

    fn begin_rendering(&mut self, cmd: CommandBufferHandle, info: &RenderingInfo) {
        self.record(cmd, MockCommand::BeginRendering(*info));
    }

    fn end_rendering(&mut self, cmd: CommandBufferHandle) {
        self.record(cmd, MockCommand::EndRendering);
    }

    fn bind_pipeline(&mut self, cmd: CommandBufferHandle, pipeline: PipelineHandle) {
        self.calls.push("bind_pipeline".to_string());
        self.record(cmd, MockCommand::BindPipeline(pipeline));
    }

    fn set_viewport(&mut self, cmd: CommandBufferHandle, viewport: Viewport) {
        self.record(cmd, MockCommand::SetViewport(viewport));
    }

    fn set_scissor(&mut self, cmd: CommandBufferHandle, scissor: Rect2D) {
        self.record(cmd, MockCommand::SetScissor(scissor));
    }

    fn bind_descriptor_sets(
        &mut self,
        cmd: CommandBufferHandle,
        _layout: PipelineLayoutHandle,
        first_set: u32,
        sets: &[DescriptorSetHandle],
    ) {
        self.calls.push("bind_descriptor_sets".to_string());
        for set in sets {
            if !self.sets.contains_key(set) {
                self.violations.push(format!("bound invalid descriptor set {:?}", set));
            }
        }
        self.record(cmd, MockCommand::BindDescriptorSets { first_set, sets: sets.to_vec() });
    }

    fn push_constants(
        &mut self,
        cmd: CommandBufferHandle,
        _layout: PipelineLayoutHandle,
        _stages: ShaderStages,
        offset: u32,
        data: &[u8],
    ) {
        self.record(cmd, MockCommand::PushConstants { offset, size: data.len() as u32 });
    }

    fn bind_vertex_buffer(&mut self, cmd: CommandBufferHandle, buffer: BufferHandle, _offset: u64) {
        self.record(cmd, MockCommand::BindVertexBuffer(buffer));
    }

    fn bind_index_buffer(
        &mut self,
        cmd: CommandBufferHandle,
        buffer: BufferHandle,
        _offset: u64,
        index_type: IndexType,
    ) {
        self.record(cmd, MockCommand::BindIndexBuffer(buffer, index_type));
    }

    fn draw_indexed(
        &mut self,
        cmd: CommandBufferHandle,
        index_count: u32,
        _instance_count: u32,
        _first_index: u32,
        _vertex_offset: i32,
        _first_instance: u32,
    ) {
        self.calls.push("draw_indexed".to_string());
        self.record(cmd, MockCommand::DrawIndexed { index_count });
    }
}

// ============================================================================
// GpuDevice
// ============================================================================

impl GpuDevice for MockDevice {
    fn create_buffer(&mut self, desc: &BufferDesc) -> Result<GpuBuffer> {
        self.calls.push("create_buffer".to_string());
        if desc.size == 0 {
            return Err(Error::InvalidResource("zero-sized buffer".to_string()));
        }
        let handle = BufferHandle(self.handle());
        self.buffers.insert(handle, MockBuffer { desc: *desc, data: vec![0; desc.size as usize] });
        Ok(GpuBuffer {
            handle,
            size: desc.size,
            usage: desc.usage,
            location: desc.location,
            mapped: desc.location != MemoryLocation::GpuOnly,
        })
    }

    fn destroy_buffer(&mut self, buffer: &GpuBuffer) {
        self.calls.push("destroy_buffer".to_string());
        if self.buffers.remove(&buffer.handle).is_none() {
            self.violations.push(format!("double destroy of {:?}", buffer.handle));
        }
    }

    fn write_buffer(&mut self, buffer: &GpuBuffer, offset: u64, data: &[u8]) -> Result<()> {
        let state = self
            .buffers
            .get_mut(&buffer.handle)
            .ok_or_else(|| Error::InvalidResource(format!("unknown buffer {:?}", buffer.handle)))?;
        if state.desc.location == MemoryLocation::GpuOnly {
            return Err(Error::InvalidResource("write to unmapped buffer".to_string()));
        }
        let start = offset as usize;
        state.data[start..start + data.len()].copy_from_slice(data);
        Ok(())
    }

    fn read_buffer(&self, buffer: &GpuBuffer, offset: u64, out: &mut [u8]) -> Result<()> {
        let state = self
            .buffers
            .get(&buffer.handle)
            .ok_or_else(|| Error::InvalidResource(format!("unknown buffer {:?}", buffer.handle)))?;
        if state.desc.location == MemoryLocation::GpuOnly {
            return Err(Error::InvalidResource("read from unmapped buffer".to_string()));
        }
        let start = offset as usize;
        out.copy_from_slice(&state.data[start..start + out.len()]);
        Ok(())
    }

    fn create_image(&mut self, desc: &ImageDesc) -> Result<GpuImage> {
        self.calls.push("create_image".to_string());
        let handle = ImageHandle(self.handle());
        let view = ImageViewHandle(self.handle());
        self.images.insert(handle, *desc);
        Ok(GpuImage {
            handle,
            view,
            format: desc.format,
            extent: desc.extent,
            mip_levels: desc.mip_levels,
        })
    }

    fn destroy_image(&mut self, image: &GpuImage) {
        self.calls.push("destroy_image".to_string());
        if self.images.remove(&image.handle).is_none() {
            self.violations.push(format!("double destroy of {:?}", image.handle));
        }
    }

    fn create_sampler(&mut self, desc: &SamplerDesc) -> Result<SamplerHandle> {
        let handle = SamplerHandle(self.handle());
        self.samplers.insert(handle, *desc);
        Ok(handle)
    }

    fn destroy_sampler(&mut self, sampler: SamplerHandle) {
        self.samplers.remove(&sampler);
    }

    fn create_descriptor_set_layout(
        &mut self,
        bindings: &[DescriptorBinding],
    ) -> Result<DescriptorSetLayoutHandle> {
        let handle = DescriptorSetLayoutHandle(self.handle());
        self.set_layouts.insert(handle, bindings.to_vec());
        Ok(handle)
    }

    fn destroy_descriptor_set_layout(&mut self, layout: DescriptorSetLayoutHandle) {
        self.set_layouts.remove(&layout);
    }

    fn create_descriptor_pool(&mut self, quotas: &DescriptorPoolQuotas) -> Result<DescriptorPoolHandle> {
        self.calls.push("create_descriptor_pool".to_string());
        let handle = DescriptorPoolHandle(self.handle());
        self.pools.insert(
            handle,
            MockPool { quotas: quotas.clone(), sets: 0, used: FxHashMap::default(), resets: 0 },
        );
        Ok(handle)
    }

    fn allocate_descriptor_set(
        &mut self,
        pool: DescriptorPoolHandle,
        layout: DescriptorSetLayoutHandle,
    ) -> Result<DescriptorSetHandle> {
        self.calls.push("allocate_descriptor_set".to_string());
        let bindings = self
            .set_layouts
            .get(&layout)
            .ok_or_else(|| Error::InvalidResource(format!("unknown set layout {:?}", layout)))?
            .clone();
        let state = self
            .pools
            .get_mut(&pool)
            .ok_or_else(|| Error::InvalidResource(format!("unknown pool {:?}", pool)))?;

        if state.sets >= state.quotas.max_sets {
            return Err(Error::DescriptorPoolExhausted);
        }
        let mut needed: FxHashMap<DescriptorType, u32> = FxHashMap::default();
        for binding in &bindings {
            *needed.entry(binding.ty).or_insert(0) += 1;
        }
        for (&ty, &count) in &needed {
            let used = state.used.get(&ty).copied().unwrap_or(0);
            if used + count > state.quotas.capacity(ty) {
                return Err(Error::DescriptorPoolExhausted);
            }
        }

        state.sets += 1;
        for (ty, count) in needed {
            *state.used.entry(ty).or_insert(0) += count;
        }
        let set = DescriptorSetHandle(self.handle());
        self.sets.insert(set, pool);
        Ok(set)
    }

    fn reset_descriptor_pool(&mut self, pool: DescriptorPoolHandle) -> Result<()> {
        self.calls.push("reset_descriptor_pool".to_string());
        if let Some(err) = self.failing_pool_resets.remove(&pool) {
            return Err(err);
        }
        let state = self
            .pools
            .get_mut(&pool)
            .ok_or_else(|| Error::InvalidResource(format!("unknown pool {:?}", pool)))?;
        state.sets = 0;
        state.used.clear();
        state.resets += 1;
        self.sets.retain(|_, owner| *owner != pool);
        Ok(())
    }

    fn destroy_descriptor_pool(&mut self, pool: DescriptorPoolHandle) {
        self.calls.push("destroy_descriptor_pool".to_string());
        self.pools.remove(&pool);
        self.sets.retain(|_, owner| *owner != pool);
    }

    fn write_descriptor_set(&mut self, set: DescriptorSetHandle, writes: &[DescriptorWrite]) {
        if !self.sets.contains_key(&set) {
            self.violations.push(format!("write to invalid descriptor set {:?}", set));
        }
        self.set_writes.entry(set).or_default().extend_from_slice(writes);
    }

    fn create_graphics_pipeline(
        &mut self,
        desc: &GraphicsPipelineDesc,
    ) -> Result<(PipelineHandle, PipelineLayoutHandle)> {
        self.calls.push("create_graphics_pipeline".to_string());
        if desc.vertex_code.is_empty() || desc.fragment_code.is_empty() {
            return Err(Error::InvalidResource("empty shader code".to_string()));
        }
        let pipeline = PipelineHandle(self.handle());
        let layout = PipelineLayoutHandle(self.handle());
        self.pipelines.insert(pipeline, layout);
        Ok((pipeline, layout))
    }

    fn destroy_pipeline(&mut self, pipeline: PipelineHandle, _layout: PipelineLayoutHandle) {
        self.pipelines.remove(&pipeline);
    }

    fn allocate_command_buffer(&mut self) -> Result<CommandBufferHandle> {
        let handle = CommandBufferHandle(self.handle());
        self.command_buffers.insert(handle, MockCommandBuffer::default());
        Ok(handle)
    }

    fn free_command_buffer(&mut self, cmd: CommandBufferHandle) {
        self.command_buffers.remove(&cmd);
    }

    fn create_fence(&mut self, signaled: bool) -> Result<FenceHandle> {
        let handle = FenceHandle(self.handle());
        let state = if signaled { MockFenceState::Signaled } else { MockFenceState::Unsignaled };
        self.fences.insert(handle, state);
        Ok(handle)
    }

    fn wait_for_fence(&mut self, fence: FenceHandle) -> Result<()> {
        self.calls.push("wait_for_fence".to_string());
        if let Some(err) = self.failing_fence_waits.pop_front() {
            return Err(err);
        }
        let state = self.fences.get(&fence).copied();
        match state {
            Some(MockFenceState::Pending) | Some(MockFenceState::Signaled) => {
                self.complete_fence(fence);
                Ok(())
            }
            Some(MockFenceState::Unsignaled) => Err(Error::BackendError(format!(
                "wait on {:?} which was never submitted (deadlock)",
                fence
            ))),
            None => Err(Error::InvalidResource(format!("unknown fence {:?}", fence))),
        }
    }

    fn reset_fence(&mut self, fence: FenceHandle) -> Result<()> {
        self.calls.push("reset_fence".to_string());
        let state = self.fences.get(&fence).copied();
        match state {
            Some(MockFenceState::Pending) => {
                self.violations.push(format!("{:?} reset while pending", fence));
            }
            None => return Err(Error::InvalidResource(format!("unknown fence {:?}", fence))),
            _ => {}
        }
        self.fences.insert(fence, MockFenceState::Unsignaled);
        Ok(())
    }

    fn destroy_fence(&mut self, fence: FenceHandle) {
        self.fences.remove(&fence);
    }

    fn create_semaphore(&mut self) -> Result<SemaphoreHandle> {
        let handle = SemaphoreHandle(self.handle());
        self.semaphores.insert(handle, ());
        Ok(handle)
    }

    fn destroy_semaphore(&mut self, semaphore: SemaphoreHandle) {
        self.semaphores.remove(&semaphore);
    }

    fn submit(&mut self, info: &SubmitInfo) -> Result<()> {
        self.calls.push("submit".to_string());
        let fence_state = self.fences.get(&info.fence).copied();
        match fence_state {
            Some(MockFenceState::Unsignaled) => {}
            other => self.violations.push(format!("submit with fence in state {:?}", other)),
        }
        let commands = {
            let state = self.command_buffers.get_mut(&info.command_buffer).ok_or_else(|| {
                Error::InvalidResource(format!("unknown command buffer {:?}", info.command_buffer))
            })?;
            if state.recording {
                self.violations.push("submitted a command buffer still recording".to_string());
            }
            state.in_flight = Some(info.fence);
            state.commands.clone()
        };

        // Execute what the mock can observe
        for command in &commands {
            match command {
                MockCommand::CopyBuffer { src, dst, size } => {
                    let bytes = self.buffers.get(src).map(|b| b.data[..*size as usize].to_vec());
                    match (bytes, self.buffers.get_mut(dst)) {
                        (Some(bytes), Some(dst)) => dst.data[..bytes.len()].copy_from_slice(&bytes),
                        _ => self.violations.push("copy between unknown buffers".to_string()),
                    }
                }
                MockCommand::BindPipeline(pipeline) => self.last_bound_pipeline = Some(*pipeline),
                _ => {}
            }
        }

        self.fences.insert(info.fence, MockFenceState::Pending);
        self.submitted.push((*info, commands));
        Ok(())
    }

    fn wait_idle(&mut self) -> Result<()> {
        self.calls.push("wait_idle".to_string());
        let pending: Vec<FenceHandle> = self
            .fences
            .iter()
            .filter(|(_, s)| **s == MockFenceState::Pending)
            .map(|(&f, _)| f)
            .collect();
        for fence in pending {
            self.complete_fence(fence);
        }
        Ok(())
    }
}

// ============================================================================
// Presenter
// ============================================================================

impl Presenter for MockDevice {
    fn acquire_next_image(&mut self, _signal: SemaphoreHandle) -> Result<AcquireOutcome> {
        self.calls.push("acquire_next_image".to_string());
        if self.out_of_date_acquires > 0 {
            self.out_of_date_acquires -= 1;
            return Ok(AcquireOutcome::OutOfDate);
        }
        let index = self.next_image;
        self.next_image = (self.next_image + 1) % self.swapchain_images.len() as u32;
        Ok(AcquireOutcome::Acquired(index))
    }

    fn present(&mut self, image_index: u32, _wait: SemaphoreHandle) -> Result<PresentOutcome> {
        self.calls.push("present".to_string());
        if self.out_of_date_presents > 0 {
            self.out_of_date_presents -= 1;
            return Ok(PresentOutcome::OutOfDate);
        }
        self.presented.push(image_index);
        Ok(PresentOutcome::Presented)
    }

    fn recreate_swapchain(&mut self, _requested: Extent2D) -> Result<Extent2D> {
        self.calls.push("recreate_swapchain".to_string());
        if self.gpu_busy() {
            self.violations.push("swapchain recreated while GPU work is pending".to_string());
        }
        self.swapchain_recreations += 1;
        self.extent = self.surface_extent;
        self.next_image = 0;
        self.build_swapchain_images();
        Ok(self.extent)
    }

    fn swapchain_extent(&self) -> Extent2D {
        self.extent
    }

    fn swapchain_format(&self) -> Format {
        Format::B8G8R8A8_SRGB
    }

    fn swapchain_image(&self, index: u32) -> ImageHandle {
        self.swapchain_images[index as usize].0
    }

    fn swapchain_image_view(&self, index: u32) -> ImageViewHandle {
        self.swapchain_images[index as usize].1
    }
}
