/*!
# Twilight Engine - Vulkan Renderer Backend

Vulkan 1.3 implementation of the Twilight device traits.

This crate implements `GpuDevice`, `CommandRecorder` and `Presenter` over
[ash](https://docs.rs/ash) (dynamic rendering + synchronization2), with
gpu-allocator for memory management and ash-window for surface creation.
Shaders are reflected with spirq at pipeline creation.

Validation layers are compiled in with the `vulkan-validation` feature and
switched on by `RendererConfig::enable_validation`; their messages go through
the engine logger.

# Example

```no_run
use twilight_engine::twilight::RendererConfig;
use twilight_engine_renderer_vulkan::init_renderer;
# fn run(window: &winit::window::Window) -> twilight_engine::twilight::Result<()> {
let size = window.inner_size();
let mut renderer = init_renderer(window, size.width, size.height, RendererConfig::default())?;
renderer.present()?;
# Ok(())
# }
```
*/

mod vulkan_format;
mod vulkan_debug;
mod vulkan_context;
mod vulkan_backend;
mod vulkan_commands;
mod vulkan_pipeline;
mod vulkan_swapchain;

use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use twilight_engine::twilight::{Renderer, RendererConfig, Result};

pub use vulkan_backend::VulkanBackend;
pub use vulkan_debug::{print_validation_stats_report, validation_stats, ValidationStats};

/// Build the Vulkan backend for `window` and initialize a renderer on it
///
/// `width` and `height` are the window's inner size in physical pixels.
pub fn init_renderer<W: HasDisplayHandle + HasWindowHandle>(
    window: &W,
    width: u32,
    height: u32,
    config: RendererConfig,
) -> Result<Renderer<VulkanBackend>> {
    let backend = VulkanBackend::new(window, width, height, &config)?;
    Renderer::init(backend, config)
}

pub mod twilight {
    pub use crate::init_renderer;
    pub use crate::vulkan_backend::VulkanBackend;
    pub use crate::vulkan_debug::{print_validation_stats_report, validation_stats, ValidationStats};
}
