/// GpuContext - Shared GPU state for all Vulkan objects
///
/// Contains everything needed for GPU operations:
/// - Instance, physical device and logical device
/// - Allocator for memory management
/// - Graphics and present queues
/// - Window surface and the surface/swapchain loaders
/// - Debug messenger (feature `vulkan-validation`)

use ash::vk;
use aurora_engine::aurora::log::SharedLogger;
use gpu_allocator::vulkan::Allocator;
use std::mem::ManuallyDrop;
use std::sync::Mutex;

#[cfg(feature = "vulkan-validation")]
use crate::vulkan_debug::DebugMessenger;

/// Shared GPU context for all Vulkan resources.
///
/// Every Vulkan object (fence, buffer, swapchain, ...) keeps an `Arc<GpuContext>`,
/// so the device and instance are destroyed only after the last object using
/// them has been dropped.
pub struct GpuContext {
    /// Vulkan logical device
    pub device: ash::Device,

    /// GPU memory allocator (requires mutex for thread safety)
    /// Wrapped in ManuallyDrop to ensure it's dropped BEFORE the device is destroyed
    pub allocator: ManuallyDrop<Mutex<Allocator>>,

    /// Physical device the logical device was created on
    pub physical_device: vk::PhysicalDevice,

    /// Graphics queue for command submission
    pub graphics_queue: vk::Queue,

    /// Graphics queue family index
    pub graphics_queue_family: u32,

    /// Present queue (may be the same queue as graphics)
    pub present_queue: vk::Queue,

    /// Present queue family index
    pub present_queue_family: u32,

    /// Window surface the swapchain presents to
    pub surface: vk::SurfaceKHR,

    /// VK_KHR_surface instance functions
    pub surface_loader: ash::khr::surface::Instance,

    /// VK_KHR_swapchain device functions
    pub swapchain_loader: ash::khr::swapchain::Device,

    /// Logger every Vulkan object reports through
    pub logger: SharedLogger,

    #[cfg(feature = "vulkan-validation")]
    pub(crate) debug_messenger: Option<DebugMessenger>,

    instance: ash::Instance,

    // Keeps the Vulkan library loaded
    _entry: ash::Entry,
}

impl GpuContext {
    /// Assemble a context from freshly created objects
    ///
    /// Takes ownership: everything is destroyed when the context drops.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        entry: ash::Entry,
        instance: ash::Instance,
        physical_device: vk::PhysicalDevice,
        device: ash::Device,
        allocator: Allocator,
        graphics: (u32, vk::Queue),
        present: (u32, vk::Queue),
        surface: vk::SurfaceKHR,
        surface_loader: ash::khr::surface::Instance,
        logger: SharedLogger,
        #[cfg(feature = "vulkan-validation")] debug_messenger: Option<DebugMessenger>,
    ) -> Self {
        let swapchain_loader = ash::khr::swapchain::Device::new(&instance, &device);
        Self {
            device,
            allocator: ManuallyDrop::new(Mutex::new(allocator)),
            physical_device,
            graphics_queue: graphics.1,
            graphics_queue_family: graphics.0,
            present_queue: present.1,
            present_queue_family: present.0,
            surface,
            surface_loader,
            swapchain_loader,
            logger,
            #[cfg(feature = "vulkan-validation")]
            debug_messenger,
            instance,
            _entry: entry,
        }
    }

    /// Vulkan instance
    pub fn instance(&self) -> &ash::Instance {
        &self.instance
    }
}

impl Drop for GpuContext {
    fn drop(&mut self) {
        unsafe {
            self.device.device_wait_idle().ok();

            // 1. Free VkDeviceMemory pages BEFORE destroying the device
            ManuallyDrop::drop(&mut self.allocator);

            // 2. Device, then the surface
            self.device.destroy_device(None);
            self.surface_loader.destroy_surface(self.surface, None);

            // 3. Debug messenger BEFORE the instance
            #[cfg(feature = "vulkan-validation")]
            drop(self.debug_messenger.take());

            self.instance.destroy_instance(None);
        }
    }
}
