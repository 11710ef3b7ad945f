/// Double-buffered frame scheduler
///
/// Drives the acquire -> record -> submit -> present cycle over
/// `FRAME_FLIGHT_COUNT` slots. `begin_frame` is the only place the CPU blocks:
/// it waits on the slot's fence, which bounds how far the CPU can run ahead of
/// the GPU. An out-of-date surface is the one runtime failure recovered here:
/// the device is idled, the swapchain and depth image are rebuilt at the new
/// size, and the loop resumes.

use crate::config::RendererConfig;
use crate::device::{
    AccessFlags, AcquireOutcome, CommandBufferHandle, Extent2D, Format, GpuDevice, GpuImage,
    ImageBarrier, ImageDesc, ImageLayout, ImageUsage, PipelineStages, PresentOutcome, Presenter,
    RenderingInfo, SubmitInfo, SubresourceRange,
};
use crate::error::{Error, Result};
use crate::{engine_bail, engine_info};
use super::frame_slot::{FrameSlot, FrameState, FRAME_FLIGHT_COUNT};

/// What `begin_frame` hands to the code recording draws
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameContext {
    pub command_buffer: CommandBufferHandle,
    pub image_index: u32,
    pub extent: Extent2D,
    pub slot: usize,
}

/// How a frame ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    Presented,
    /// The swapchain was rebuilt at this extent during the frame (out-of-date
    /// acquire or present, or a pending resize)
    Recreated(Extent2D),
    /// Nothing rendered (zero-sized window)
    Skipped,
}

pub struct FrameScheduler {
    slots: Vec<FrameSlot>,
    index: usize,
    depth: GpuImage,
    depth_format: Format,
    clear_color: [f32; 4],
    clear_depth: f32,
    extent: Extent2D,
    requested_extent: Extent2D,
    resize_pending: bool,
    /// Set when the acquire of the current frame had to rebuild the swapchain
    recreated_at_acquire: bool,
    recreations: u32,
}

impl FrameScheduler {
    /// Create the frame slots and the depth image matching the swapchain
    pub fn new<B: GpuDevice + Presenter + ?Sized>(
        backend: &mut B,
        config: &RendererConfig,
    ) -> Result<Self> {
        let extent = backend.swapchain_extent();
        let slots = (0..FRAME_FLIGHT_COUNT)
            .map(|_| FrameSlot::new(backend))
            .collect::<Result<Vec<_>>>()?;
        let depth = create_depth_image(backend, extent, config.depth_format)?;

        Ok(Self {
            slots,
            index: 0,
            depth,
            depth_format: config.depth_format,
            clear_color: config.clear_color,
            clear_depth: config.clear_depth,
            extent,
            requested_extent: extent,
            resize_pending: false,
            recreated_at_acquire: false,
            recreations: 0,
        })
    }

    /// Wait for the slot, open its command buffer and start rendering
    ///
    /// # Errors
    ///
    /// `InvalidResource` if the current slot is already recording (a frame was
    /// begun twice without `end_frame`); backend failures are fatal.
    pub fn begin_frame<B: GpuDevice + Presenter + ?Sized>(
        &mut self,
        backend: &mut B,
    ) -> Result<FrameContext> {
        let index = self.index;
        let (cmd, fence, acquire) = {
            let slot = &self.slots[index];
            if matches!(slot.state, FrameState::Acquiring | FrameState::Recording) {
                return Err(Error::InvalidResource(format!(
                    "frame slot {} is already recording",
                    index
                )));
            }
            (slot.command_buffer, slot.fence, slot.acquire_semaphore)
        };

        // Backpressure: the GPU must be done with this slot's last submission
        backend.wait_for_fence(fence)?;
        self.slots[index].state = FrameState::Idle;
        backend.reset_fence(fence)?;
        backend.reset_commands(cmd)?;
        backend.begin_commands(cmd)?;
        self.slots[index].state = FrameState::Acquiring;
        self.recreated_at_acquire = false;

        let image_index = match backend.acquire_next_image(acquire)? {
            AcquireOutcome::Acquired(i) => i,
            AcquireOutcome::OutOfDate => {
                self.recreate(backend)?;
                self.recreated_at_acquire = true;
                match backend.acquire_next_image(acquire)? {
                    AcquireOutcome::Acquired(i) => i,
                    AcquireOutcome::OutOfDate => engine_bail!(
                        "twilight::FrameScheduler",
                        "vkAcquireNextImageKHR still out of date after recreating the swapchain"
                    ),
                }
            }
        };

        let color_image = backend.swapchain_image(image_index);
        backend.pipeline_barrier(
            cmd,
            &[
                ImageBarrier::new(color_image, SubresourceRange::color_level(0))
                    .layouts(ImageLayout::Undefined, ImageLayout::ColorAttachment)
                    .src(PipelineStages::COLOR_ATTACHMENT_OUTPUT, AccessFlags::empty())
                    .dst(PipelineStages::COLOR_ATTACHMENT_OUTPUT, AccessFlags::COLOR_ATTACHMENT_WRITE),
                ImageBarrier::new(self.depth.handle, SubresourceRange::depth())
                    .layouts(ImageLayout::Undefined, ImageLayout::DepthAttachment)
                    .src(
                        PipelineStages::EARLY_FRAGMENT_TESTS | PipelineStages::LATE_FRAGMENT_TESTS,
                        AccessFlags::DEPTH_STENCIL_ATTACHMENT_WRITE,
                    )
                    .dst(
                        PipelineStages::EARLY_FRAGMENT_TESTS | PipelineStages::LATE_FRAGMENT_TESTS,
                        AccessFlags::DEPTH_STENCIL_ATTACHMENT_READ
                            | AccessFlags::DEPTH_STENCIL_ATTACHMENT_WRITE,
                    ),
            ],
        );
        backend.begin_rendering(
            cmd,
            &RenderingInfo {
                color_view: backend.swapchain_image_view(image_index),
                depth_view: self.depth.view,
                extent: self.extent,
                clear_color: self.clear_color,
                clear_depth: self.clear_depth,
            },
        );

        let slot = &mut self.slots[index];
        slot.image_index = image_index;
        slot.state = FrameState::Recording;

        Ok(FrameContext { command_buffer: cmd, image_index, extent: self.extent, slot: index })
    }

    /// Finish recording, submit, present and advance to the next slot
    pub fn end_frame<B: GpuDevice + Presenter + ?Sized>(
        &mut self,
        backend: &mut B,
    ) -> Result<FrameOutcome> {
        let index = self.index;
        let slot = &self.slots[index];
        if slot.state != FrameState::Recording {
            return Err(Error::InvalidResource(format!(
                "end_frame on slot {} in state {:?}",
                index, slot.state
            )));
        }
        let (cmd, image_index) = (slot.command_buffer, slot.image_index);
        let (acquire, render, fence) = (slot.acquire_semaphore, slot.render_semaphore, slot.fence);

        backend.end_rendering(cmd);
        backend.pipeline_barrier(
            cmd,
            &[ImageBarrier::new(backend.swapchain_image(image_index), SubresourceRange::color_level(0))
                .layouts(ImageLayout::ColorAttachment, ImageLayout::PresentSrc)
                .src(PipelineStages::COLOR_ATTACHMENT_OUTPUT, AccessFlags::COLOR_ATTACHMENT_WRITE)
                .dst(PipelineStages::BOTTOM_OF_PIPE, AccessFlags::empty())],
        );
        backend.end_commands(cmd)?;

        backend.submit(&SubmitInfo {
            command_buffer: cmd,
            wait: Some((acquire, PipelineStages::COLOR_ATTACHMENT_OUTPUT)),
            signal: Some(render),
            fence,
        })?;
        self.slots[index].state = FrameState::Submitted;

        let presented = backend.present(image_index, render)?;
        self.index = (self.index + 1) % FRAME_FLIGHT_COUNT;

        let recreated_at_acquire = std::mem::take(&mut self.recreated_at_acquire);
        if presented == PresentOutcome::OutOfDate || self.resize_pending {
            self.recreate(backend)?;
            return Ok(FrameOutcome::Recreated(self.extent));
        }
        if recreated_at_acquire {
            return Ok(FrameOutcome::Recreated(self.extent));
        }
        Ok(FrameOutcome::Presented)
    }

    /// Request a new swapchain size, applied after the next present
    pub fn resize(&mut self, width: u32, height: u32) {
        let requested = Extent2D::new(width, height);
        if requested != self.requested_extent {
            self.requested_extent = requested;
            self.resize_pending = requested != self.extent;
        }
    }

    /// Idle the device, then rebuild the swapchain and the depth image
    fn recreate<B: GpuDevice + Presenter + ?Sized>(&mut self, backend: &mut B) -> Result<()> {
        backend.wait_idle()?;
        let extent = backend.recreate_swapchain(self.requested_extent)?;

        backend.destroy_image(&self.depth);
        self.depth = create_depth_image(backend, extent, self.depth_format)?;

        self.extent = extent;
        self.requested_extent = extent;
        self.resize_pending = false;
        self.recreations += 1;

        engine_info!(
            "twilight::FrameScheduler",
            "Swapchain recreated at {}x{}",
            extent.width,
            extent.height
        );
        Ok(())
    }

    /// Destroy slots and depth image (the device must be idle)
    pub fn destroy<B: GpuDevice + Presenter + ?Sized>(&mut self, backend: &mut B) {
        for slot in &mut self.slots {
            slot.destroy(backend);
        }
        self.slots.clear();
        backend.destroy_image(&self.depth);
    }

    /// Command buffer of the frame being recorded, if any
    pub fn current_command_buffer(&self) -> Option<CommandBufferHandle> {
        let slot = self.slots.get(self.index)?;
        (slot.state == FrameState::Recording).then_some(slot.command_buffer)
    }

    pub fn frame_index(&self) -> usize {
        self.index
    }

    pub fn slot_state(&self, slot: usize) -> Option<FrameState> {
        self.slots.get(slot).map(|s| s.state)
    }

    pub fn extent(&self) -> Extent2D {
        self.extent
    }

    /// Size the next frame will target (differs from `extent` while a resize is pending)
    pub fn requested_extent(&self) -> Extent2D {
        self.requested_extent
    }

    pub fn swapchain_recreations(&self) -> u32 {
        self.recreations
    }

    pub fn depth_image(&self) -> &GpuImage {
        &self.depth
    }
}

fn create_depth_image<D: GpuDevice + ?Sized>(
    device: &mut D,
    extent: Extent2D,
    format: Format,
) -> Result<GpuImage> {
    device.create_image(&ImageDesc {
        extent: extent.into(),
        format,
        usage: ImageUsage::DEPTH_STENCIL_ATTACHMENT,
        mip_levels: 1,
    })
}

#[cfg(test)]
#[path = "frame_scheduler_tests.rs"]
mod tests;
