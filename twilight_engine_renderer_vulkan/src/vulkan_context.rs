/// VulkanContext - instance, surface, physical/logical device and the queue
///
/// The engine drives everything from one thread through one queue family that
/// supports both graphics and presentation to the window surface. The device
/// is created with the Vulkan 1.3 `dynamicRendering` and `synchronization2`
/// features, which the command recorder relies on.

use ash::vk;
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use std::ffi::{c_char, CStr, CString};
use twilight_engine::twilight::{Error, RendererConfig, Result};
use twilight_engine::{engine_error, engine_info, engine_warn};

use crate::vulkan_debug::DebugMessenger;

pub struct VulkanContext {
    /// Loaded Vulkan library (must outlive the instance)
    _entry: ash::Entry,
    pub instance: ash::Instance,
    debug: Option<DebugMessenger>,

    pub surface_loader: ash::khr::surface::Instance,
    pub surface: vk::SurfaceKHR,

    pub physical_device: vk::PhysicalDevice,
    pub device: ash::Device,

    /// Graphics + present queue
    pub queue: vk::Queue,
    pub queue_family: u32,
}

impl VulkanContext {
    /// Create the instance, the window surface and a device able to present to it
    pub fn new<W: HasDisplayHandle + HasWindowHandle>(
        window: &W,
        config: &RendererConfig,
    ) -> Result<Self> {
        let entry = unsafe { ash::Entry::load() }.map_err(|e| {
            engine_error!("twilight::vulkan", "Failed to load Vulkan library: {:?}", e);
            Error::InitializationFailed(format!("Failed to load Vulkan library: {:?}", e))
        })?;

        let display_handle = window.display_handle().map_err(|e| {
            engine_error!("twilight::vulkan", "Failed to get display handle: {}", e);
            Error::InitializationFailed(format!("Failed to get display handle: {}", e))
        })?;
        let window_handle = window.window_handle().map_err(|e| {
            engine_error!("twilight::vulkan", "Failed to get window handle: {}", e);
            Error::InitializationFailed(format!("Failed to get window handle: {}", e))
        })?;

        let validation = cfg!(feature = "vulkan-validation") && config.enable_validation;
        let instance = Self::create_instance(&entry, display_handle.as_raw(), config, validation)?;

        let debug = if validation {
            Some(DebugMessenger::new(&entry, &instance)?)
        } else {
            None
        };

        let surface = unsafe {
            ash_window::create_surface(
                &entry,
                &instance,
                display_handle.as_raw(),
                window_handle.as_raw(),
                None,
            )
        }
        .map_err(|e| {
            engine_error!("twilight::vulkan", "Failed to create surface: {:?}", e);
            Error::InitializationFailed(format!("Failed to create surface: {:?}", e))
        })?;
        let surface_loader = ash::khr::surface::Instance::new(&entry, &instance);

        let (physical_device, queue_family) =
            Self::pick_physical_device(&instance, &surface_loader, surface)?;

        let device = Self::create_device(&instance, physical_device, queue_family)?;
        let queue = unsafe { device.get_device_queue(queue_family, 0) };

        Ok(Self {
            _entry: entry,
            instance,
            debug,
            surface_loader,
            surface,
            physical_device,
            device,
            queue,
            queue_family,
        })
    }

    fn create_instance(
        entry: &ash::Entry,
        display_handle: raw_window_handle::RawDisplayHandle,
        config: &RendererConfig,
        validation: bool,
    ) -> Result<ash::Instance> {
        // Interior NULs cannot come from a sane app name; fall back rather than fail
        let app_name = CString::new(config.app_name.as_str())
            .unwrap_or_else(|_| CString::from(c"Twilight Application"));
        let (major, minor, patch) = config.app_version;

        let app_info = vk::ApplicationInfo::default()
            .application_name(&app_name)
            .application_version(vk::make_api_version(0, major, minor, patch))
            .engine_name(c"Twilight")
            .engine_version(vk::make_api_version(0, 0, 1, 0))
            .api_version(vk::API_VERSION_1_3);

        let mut extension_names = ash_window::enumerate_required_extensions(display_handle)
            .map_err(|e| {
                engine_error!("twilight::vulkan", "Failed to get required extensions: {}", e);
                Error::InitializationFailed(format!("Failed to get required extensions: {}", e))
            })?
            .to_vec();

        let mut layer_names: Vec<*const c_char> = Vec::new();
        if validation {
            extension_names.push(ash::ext::debug_utils::NAME.as_ptr());
            layer_names.push(c"VK_LAYER_KHRONOS_validation".as_ptr());
        }

        let create_info = vk::InstanceCreateInfo::default()
            .application_info(&app_info)
            .enabled_layer_names(&layer_names)
            .enabled_extension_names(&extension_names);

        unsafe { entry.create_instance(&create_info, None) }.map_err(|e| {
            engine_error!("twilight::vulkan", "vkCreateInstance failed: {:?}", e);
            Error::InitializationFailed(format!("Failed to create instance: {:?}", e))
        })
    }

    /// First Vulkan 1.3 device with a queue family that can both draw and present,
    /// discrete GPUs first
    fn pick_physical_device(
        instance: &ash::Instance,
        surface_loader: &ash::khr::surface::Instance,
        surface: vk::SurfaceKHR,
    ) -> Result<(vk::PhysicalDevice, u32)> {
        let physical_devices = unsafe { instance.enumerate_physical_devices() }.map_err(|e| {
            engine_error!("twilight::vulkan", "vkEnumeratePhysicalDevices failed: {:?}", e);
            Error::InitializationFailed(format!("Failed to enumerate physical devices: {:?}", e))
        })?;

        let mut candidates: Vec<(vk::PhysicalDevice, u32, vk::PhysicalDeviceProperties)> =
            Vec::new();
        for physical_device in physical_devices {
            let properties = unsafe { instance.get_physical_device_properties(physical_device) };
            if properties.api_version < vk::API_VERSION_1_3 {
                continue;
            }

            let families = unsafe {
                instance.get_physical_device_queue_family_properties(physical_device)
            };
            let family = families.iter().enumerate().find_map(|(index, family)| {
                let index = index as u32;
                let presents = unsafe {
                    surface_loader.get_physical_device_surface_support(physical_device, index, surface)
                }
                .unwrap_or(false);
                (family.queue_flags.contains(vk::QueueFlags::GRAPHICS) && presents).then_some(index)
            });

            if let Some(family) = family {
                candidates.push((physical_device, family, properties));
            }
        }

        candidates.sort_by_key(|(_, _, properties)| {
            properties.device_type != vk::PhysicalDeviceType::DISCRETE_GPU
        });

        let (physical_device, family, properties) =
            candidates.into_iter().next().ok_or_else(|| {
                engine_error!(
                    "twilight::vulkan",
                    "No Vulkan 1.3 GPU with a graphics + present queue found"
                );
                Error::InitializationFailed("No suitable Vulkan-capable GPU found".to_string())
            })?;

        let name = properties
            .device_name_as_c_str()
            .ok()
            .and_then(|name| name.to_str().ok())
            .unwrap_or("<unnamed>");
        engine_info!("twilight::vulkan", "Using GPU '{}' (queue family {})", name, family);

        Ok((physical_device, family))
    }

    fn create_device(
        instance: &ash::Instance,
        physical_device: vk::PhysicalDevice,
        queue_family: u32,
    ) -> Result<ash::Device> {
        let queue_priorities = [1.0];
        let queue_create_infos = [vk::DeviceQueueCreateInfo::default()
            .queue_family_index(queue_family)
            .queue_priorities(&queue_priorities)];

        let device_extension_names = [ash::khr::swapchain::NAME.as_ptr()];

        let mut vulkan13_features = vk::PhysicalDeviceVulkan13Features::default()
            .dynamic_rendering(true)
            .synchronization2(true);

        let device_create_info = vk::DeviceCreateInfo::default()
            .queue_create_infos(&queue_create_infos)
            .enabled_extension_names(&device_extension_names)
            .push_next(&mut vulkan13_features);

        unsafe { instance.create_device(physical_device, &device_create_info, None) }.map_err(|e| {
            engine_error!("twilight::vulkan", "vkCreateDevice failed: {:?}", e);
            Error::InitializationFailed(format!("Failed to create device: {:?}", e))
        })
    }

    /// Destroy device, surface, messenger and instance, in that order
    ///
    /// Every object created from the device (and all allocator memory) must
    /// already be gone.
    pub fn destroy(&mut self) {
        unsafe {
            if let Err(e) = self.device.device_wait_idle() {
                engine_warn!("twilight::vulkan", "vkDeviceWaitIdle failed during shutdown: {:?}", e);
            }
            self.device.destroy_device(None);
            self.surface_loader.destroy_surface(self.surface, None);
            if let Some(debug) = self.debug.take() {
                debug.destroy();
            }
            self.instance.destroy_instance(None);
        }
    }

    /// Human-readable GPU name
    pub fn device_name(&self) -> String {
        let properties = unsafe { self.instance.get_physical_device_properties(self.physical_device) };
        properties
            .device_name_as_c_str()
            .ok()
            .and_then(|name: &CStr| name.to_str().ok())
            .unwrap_or("<unnamed>")
            .to_string()
    }
}
