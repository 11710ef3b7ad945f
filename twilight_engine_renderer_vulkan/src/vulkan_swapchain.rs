/// Swapchain - Vulkan implementation of the `Presenter` trait
///
/// Owns the `VkSwapchainKHR`, its images and one view per image. The surface
/// itself belongs to the context. Recreation builds the new swapchain with
/// the old one as `oldSwapchain` and then destroys the old one; the frame
/// scheduler idles the device first, so nothing still references it.

use ash::vk;
use ash::vk::Handle;
use twilight_engine::twilight::device::{
    AcquireOutcome, Extent2D, Format, ImageHandle, ImageViewHandle, PresentOutcome, Presenter,
    SemaphoreHandle,
};
use twilight_engine::twilight::{Error, Result};
use twilight_engine::{engine_err, engine_error, engine_warn};

use crate::vulkan_backend::VulkanBackend;
use crate::vulkan_context::VulkanContext;
use crate::vulkan_format::format_from_vk;

pub(crate) struct Swapchain {
    loader: ash::khr::swapchain::Device,
    swapchain: vk::SwapchainKHR,
    images: Vec<vk::Image>,
    views: Vec<vk::ImageView>,
    format: Format,
    extent: vk::Extent2D,
}

impl Swapchain {
    pub(crate) fn new(context: &VulkanContext, requested: Extent2D) -> Result<Self> {
        let loader = ash::khr::swapchain::Device::new(&context.instance, &context.device);
        let mut swapchain = Self {
            loader,
            swapchain: vk::SwapchainKHR::null(),
            images: Vec::new(),
            views: Vec::new(),
            format: Format::B8G8R8A8_SRGB,
            extent: vk::Extent2D::default(),
        };
        swapchain.build(context, requested)?;
        Ok(swapchain)
    }

    /// (Re)create the swapchain for `requested`, retiring the current one
    fn build(&mut self, context: &VulkanContext, requested: Extent2D) -> Result<()> {
        let capabilities = unsafe {
            context
                .surface_loader
                .get_physical_device_surface_capabilities(context.physical_device, context.surface)
        }
        .map_err(|e| {
            engine_error!("twilight::vulkan", "Failed to get surface capabilities: {:?}", e);
            Error::InitializationFailed(format!("Failed to get surface capabilities: {:?}", e))
        })?;

        let formats = unsafe {
            context
                .surface_loader
                .get_physical_device_surface_formats(context.physical_device, context.surface)
        }
        .map_err(|e| {
            engine_error!("twilight::vulkan", "Failed to query surface formats: {:?}", e);
            Error::InitializationFailed(format!("Failed to get surface formats: {:?}", e))
        })?;

        let (surface_format, format) = choose_surface_format(&formats).ok_or_else(|| {
            engine_error!("twilight::vulkan", "Surface offers no 8-bit RGBA/BGRA format");
            Error::InitializationFailed("No supported surface format".to_string())
        })?;
        let extent = choose_extent(&capabilities, requested);

        let create_info = vk::SwapchainCreateInfoKHR::default()
            .surface(context.surface)
            .min_image_count(choose_image_count(&capabilities))
            .image_format(surface_format.format)
            .image_color_space(surface_format.color_space)
            .image_extent(extent)
            .image_array_layers(1)
            .image_usage(vk::ImageUsageFlags::COLOR_ATTACHMENT | vk::ImageUsageFlags::TRANSFER_DST)
            .image_sharing_mode(vk::SharingMode::EXCLUSIVE)
            .pre_transform(capabilities.current_transform)
            .composite_alpha(vk::CompositeAlphaFlagsKHR::OPAQUE)
            .present_mode(vk::PresentModeKHR::FIFO)
            .clipped(true)
            .old_swapchain(self.swapchain);

        let swapchain = unsafe { self.loader.create_swapchain(&create_info, None) }.map_err(|e| {
            engine_error!("twilight::vulkan", "vkCreateSwapchainKHR failed: {:?}", e);
            Error::InitializationFailed(format!("Failed to create swapchain: {:?}", e))
        })?;

        // The old swapchain is retired by the create call; release it now
        self.destroy_views_and_swapchain(&context.device);
        self.swapchain = swapchain;

        self.images = unsafe { self.loader.get_swapchain_images(swapchain) }.map_err(|e| {
            engine_error!("twilight::vulkan", "vkGetSwapchainImagesKHR failed: {:?}", e);
            Error::InitializationFailed(format!("Failed to get swapchain images: {:?}", e))
        })?;

        for &image in &self.images {
            let view_info = vk::ImageViewCreateInfo::default()
                .image(image)
                .view_type(vk::ImageViewType::TYPE_2D)
                .format(surface_format.format)
                .components(vk::ComponentMapping::default())
                .subresource_range(vk::ImageSubresourceRange {
                    aspect_mask: vk::ImageAspectFlags::COLOR,
                    base_mip_level: 0,
                    level_count: 1,
                    base_array_layer: 0,
                    layer_count: 1,
                });
            let view = unsafe { context.device.create_image_view(&view_info, None) }.map_err(|e| {
                engine_error!("twilight::vulkan", "Failed to create swapchain image view: {:?}", e);
                Error::InitializationFailed(format!("Failed to create image views: {:?}", e))
            })?;
            self.views.push(view);
        }

        self.format = format;
        self.extent = extent;
        Ok(())
    }

    fn destroy_views_and_swapchain(&mut self, device: &ash::Device) {
        unsafe {
            for view in self.views.drain(..) {
                device.destroy_image_view(view, None);
            }
            if self.swapchain != vk::SwapchainKHR::null() {
                self.loader.destroy_swapchain(self.swapchain, None);
            }
        }
        self.images.clear();
        self.swapchain = vk::SwapchainKHR::null();
    }

    pub(crate) fn destroy(&mut self, device: &ash::Device) {
        self.destroy_views_and_swapchain(device);
    }

    pub(crate) fn image_count(&self) -> usize {
        self.images.len()
    }
}

/// sRGB BGRA if offered, then sRGB RGBA, then any format the engine knows
pub(crate) fn choose_surface_format(
    formats: &[vk::SurfaceFormatKHR],
) -> Option<(vk::SurfaceFormatKHR, Format)> {
    let preferred = [vk::Format::B8G8R8A8_SRGB, vk::Format::R8G8B8A8_SRGB];
    preferred
        .iter()
        .find_map(|wanted| {
            formats.iter().find(|f| {
                f.format == *wanted && f.color_space == vk::ColorSpaceKHR::SRGB_NONLINEAR
            })
        })
        .or_else(|| formats.iter().find(|f| format_from_vk(f.format).is_some()))
        .and_then(|f| format_from_vk(f.format).map(|format| (*f, format)))
}

/// The surface's current extent when it has one, else `requested` clamped to
/// the surface limits (never zero)
pub(crate) fn choose_extent(
    capabilities: &vk::SurfaceCapabilitiesKHR,
    requested: Extent2D,
) -> vk::Extent2D {
    let current = capabilities.current_extent;
    if current.width != u32::MAX && current.width > 0 && current.height > 0 {
        return current;
    }
    let (min, max) = (capabilities.min_image_extent, capabilities.max_image_extent);
    vk::Extent2D {
        width: requested.width.clamp(min.width, max.width.max(min.width)).max(1),
        height: requested.height.clamp(min.height, max.height.max(min.height)).max(1),
    }
}

/// One image more than the minimum, within the maximum (0 means unbounded)
pub(crate) fn choose_image_count(capabilities: &vk::SurfaceCapabilitiesKHR) -> u32 {
    let wanted = capabilities.min_image_count + 1;
    if capabilities.max_image_count == 0 {
        wanted
    } else {
        wanted.min(capabilities.max_image_count)
    }
}

impl Presenter for VulkanBackend {
    fn acquire_next_image(&mut self, signal: SemaphoreHandle) -> Result<AcquireOutcome> {
        let result = unsafe {
            self.swapchain.loader.acquire_next_image(
                self.swapchain.swapchain,
                u64::MAX,
                vk::Semaphore::from_raw(signal.0),
                vk::Fence::null(),
            )
        };
        match result {
            // A suboptimal image is still usable; present will report it
            Ok((index, _suboptimal)) => Ok(AcquireOutcome::Acquired(index)),
            Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => {
                engine_warn!("twilight::vulkan", "Swapchain out of date during acquire");
                Ok(AcquireOutcome::OutOfDate)
            }
            Err(e) => Err(engine_err!("twilight::vulkan", "vkAcquireNextImageKHR failed: {:?}", e)),
        }
    }

    fn present(&mut self, image_index: u32, wait: SemaphoreHandle) -> Result<PresentOutcome> {
        let wait_semaphores = [vk::Semaphore::from_raw(wait.0)];
        let swapchains = [self.swapchain.swapchain];
        let image_indices = [image_index];
        let present_info = vk::PresentInfoKHR::default()
            .wait_semaphores(&wait_semaphores)
            .swapchains(&swapchains)
            .image_indices(&image_indices);

        let result = unsafe {
            self.swapchain.loader.queue_present(self.context.queue, &present_info)
        };
        match result {
            Ok(_suboptimal) => Ok(PresentOutcome::Presented),
            Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => Ok(PresentOutcome::OutOfDate),
            Err(e) => Err(engine_err!("twilight::vulkan", "vkQueuePresentKHR failed: {:?}", e)),
        }
    }

    fn recreate_swapchain(&mut self, requested: Extent2D) -> Result<Extent2D> {
        self.swapchain.build(&self.context, requested)?;
        Ok(self.swapchain_extent())
    }

    fn swapchain_extent(&self) -> Extent2D {
        Extent2D::new(self.swapchain.extent.width, self.swapchain.extent.height)
    }

    fn swapchain_format(&self) -> Format {
        self.swapchain.format
    }

    fn swapchain_image(&self, index: u32) -> ImageHandle {
        self.swapchain
            .images
            .get(index as usize)
            .map_or(ImageHandle::NULL, |image| ImageHandle(image.as_raw()))
    }

    fn swapchain_image_view(&self, index: u32) -> ImageViewHandle {
        self.swapchain
            .views
            .get(index as usize)
            .map_or(ImageViewHandle::NULL, |view| ImageViewHandle(view.as_raw()))
    }
}

#[cfg(test)]
#[path = "vulkan_swapchain_tests.rs"]
mod tests;
