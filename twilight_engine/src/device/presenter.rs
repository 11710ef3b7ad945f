/// Swapchain presentation trait

use crate::error::Result;
use super::*;

/// Result of acquiring a swapchain image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquireOutcome {
    Acquired(u32),
    /// The surface changed; recreate before acquiring again
    OutOfDate,
}

/// Result of queueing an image for presentation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresentOutcome {
    /// Presented (a suboptimal swapchain still counts)
    Presented,
    OutOfDate,
}

pub trait Presenter {
    /// Acquire the next image, signaling `signal` once it is usable
    fn acquire_next_image(&mut self, signal: SemaphoreHandle) -> Result<AcquireOutcome>;

    /// Present `image_index` after `wait` is signaled
    fn present(&mut self, image_index: u32, wait: SemaphoreHandle) -> Result<PresentOutcome>;

    /// Destroy and rebuild the swapchain for `requested` (clamped to the
    /// surface limits). Returns the extent actually used.
    fn recreate_swapchain(&mut self, requested: Extent2D) -> Result<Extent2D>;

    fn swapchain_extent(&self) -> Extent2D;

    fn swapchain_format(&self) -> Format;

    fn swapchain_image(&self, index: u32) -> ImageHandle;

    fn swapchain_image_view(&self, index: u32) -> ImageViewHandle;
}

/// Everything the renderer needs from a backend
pub trait RenderBackend: GpuDevice + Presenter {}

impl<T: GpuDevice + Presenter> RenderBackend for T {}
