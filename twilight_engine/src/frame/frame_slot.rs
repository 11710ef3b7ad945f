/// One frame-in-flight slot

use crate::device::{CommandBufferHandle, FenceHandle, GpuDevice, SemaphoreHandle};
use crate::error::Result;

/// Number of frames the CPU may record ahead of the GPU
pub const FRAME_FLIGHT_COUNT: usize = 2;

/// Lifecycle of a slot
///
/// `Idle -> Acquiring -> Recording -> Submitted`, and back to `Idle` only
/// when the slot comes around again and its fence has been waited on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameState {
    /// Fence signaled, safe to reuse
    Idle,
    /// Command buffer open, waiting for a swapchain image
    Acquiring,
    /// Command buffer open, rendering active
    Recording,
    /// Fence unsignaled, GPU executing
    Submitted,
}

#[derive(Debug)]
pub struct FrameSlot {
    pub command_buffer: CommandBufferHandle,
    /// Signaled by the presentation engine when the image is usable
    pub acquire_semaphore: SemaphoreHandle,
    /// Signaled by the queue when rendering is done, waited on by present
    pub render_semaphore: SemaphoreHandle,
    pub fence: FenceHandle,
    pub image_index: u32,
    pub state: FrameState,
}

impl FrameSlot {
    /// Fences start signaled so the first `begin_frame` does not block
    pub fn new<D: GpuDevice + ?Sized>(device: &mut D) -> Result<Self> {
        Ok(Self {
            command_buffer: device.allocate_command_buffer()?,
            acquire_semaphore: device.create_semaphore()?,
            render_semaphore: device.create_semaphore()?,
            fence: device.create_fence(true)?,
            image_index: 0,
            state: FrameState::Idle,
        })
    }

    pub fn destroy<D: GpuDevice + ?Sized>(&mut self, device: &mut D) {
        device.free_command_buffer(self.command_buffer);
        device.destroy_semaphore(self.acquire_semaphore);
        device.destroy_semaphore(self.render_semaphore);
        device.destroy_fence(self.fence);
    }
}
