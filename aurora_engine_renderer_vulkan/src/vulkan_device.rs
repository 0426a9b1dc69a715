/// VulkanDevice - Vulkan implementation of the GraphicsDevice trait
///
/// Creates the instance, picks a physical device with graphics and present
/// support, and bundles everything in a shared `GpuContext`. Also provides the
/// Vulkan-only factories the application needs to assemble a render system
/// (swapchain, render pass, depth-stencil, layouts, samplers).

use aurora_engine::aurora::device::{
    Backend, BufferDesc, Extent2D, FrameLayouts, GraphicsDevice, QueueFamily, Surface, TextureFormat,
};
use aurora_engine::aurora::log::SharedLogger;
use aurora_engine::aurora::{Config, Error, Result};
use aurora_engine::{engine_err, engine_error, engine_info, engine_warn};
use ash::vk;
use gpu_allocator::vulkan::{Allocator, AllocatorCreateDesc};
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use std::ffi::{CStr, CString};
use std::sync::Arc;

use crate::vulkan_buffer::Buffer;
use crate::vulkan_command_list::CommandList;
use crate::vulkan_context::GpuContext;
use crate::vulkan_depth_stencil::DepthStencil;
use crate::vulkan_descriptor::{create_frame_layouts, DescriptorPool, DescriptorSet, DescriptorSetLayout};
use crate::vulkan_format::format_to_vk;
use crate::vulkan_frame_buffer::{Framebuffer, ImageView};
use crate::vulkan_pipeline::Pipeline;
use crate::vulkan_render_pass::RenderPass;
use crate::vulkan_sampler::{Sampler, SamplerKind};
use crate::vulkan_swapchain::Swapchain;
use crate::vulkan_sync::{Fence, Semaphore};

#[cfg(feature = "vulkan-validation")]
use crate::vulkan_debug::{DebugMessenger, ValidationStats};

const VALIDATION_LAYER: &CStr = c"VK_LAYER_KHRONOS_validation";

/// Vulkan type family
pub struct VulkanBackend;

impl Backend for VulkanBackend {
    type Device = VulkanDevice;
    type Swapchain = Swapchain;
    type Fence = Fence;
    type Semaphore = Semaphore;
    type CommandList = CommandList;
    type Buffer = Buffer;
    type DescriptorPool = DescriptorPool;
    type DescriptorSet = DescriptorSet;
    type DescriptorSetLayout = DescriptorSetLayout;
    type RenderPass = RenderPass;
    type ImageView = ImageView;
    type Sampler = Sampler;
    type Framebuffer = Framebuffer;
    type Pipeline = Pipeline;
    type DepthStencil = DepthStencil;
    type Queue = vk::Queue;
}

/// Preference of a physical device type (higher is better)
pub fn device_type_score(device_type: vk::PhysicalDeviceType) -> u32 {
    match device_type {
        vk::PhysicalDeviceType::DISCRETE_GPU => 4,
        vk::PhysicalDeviceType::INTEGRATED_GPU => 3,
        vk::PhysicalDeviceType::VIRTUAL_GPU => 2,
        vk::PhysicalDeviceType::CPU => 1,
        _ => 0,
    }
}

/// Physical device and the queue families chosen on it
#[derive(Debug, Clone, Copy)]
struct DeviceCandidate {
    physical_device: vk::PhysicalDevice,
    graphics_family: u32,
    present_family: u32,
    score: u32,
}

/// Vulkan logical device
pub struct VulkanDevice {
    ctx: Arc<GpuContext>,
    /// Device anisotropy limit (0 when the feature is unsupported)
    max_sampler_anisotropy: f32,
}

impl VulkanDevice {
    /// Create a Vulkan device presenting to `window`
    ///
    /// # Arguments
    ///
    /// * `window` - Window for surface creation (kept for the device's lifetime)
    /// * `config` - Application info and validation settings
    /// * `logger` - Logger every Vulkan object reports through
    pub fn new<W: HasDisplayHandle + HasWindowHandle>(
        window: &W,
        config: &Config,
        logger: SharedLogger,
    ) -> Result<Self> {
        config.validate()?;

        let entry = unsafe { ash::Entry::load() }.map_err(|e| {
            engine_error!(logger, "aurora::vulkan", "Failed to load Vulkan library: {:?}", e);
            Error::InitializationFailed(format!("Failed to load Vulkan library: {:?}", e))
        })?;

        let display_handle = window.display_handle().map_err(|e| {
            engine_error!(logger, "aurora::vulkan", "Failed to get display handle: {}", e);
            Error::InitializationFailed(format!("Failed to get display handle: {}", e))
        })?;
        let window_handle = window.window_handle().map_err(|e| {
            engine_error!(logger, "aurora::vulkan", "Failed to get window handle: {}", e);
            Error::InitializationFailed(format!("Failed to get window handle: {}", e))
        })?;

        let validation = Self::validation_requested(&entry, config, &logger);

        // ===== INSTANCE =====

        let app_name = CString::new(config.app_name.as_str()).map_err(|_| {
            Error::InitializationFailed(format!("Application name {:?} contains a NUL byte", config.app_name))
        })?;
        let (major, minor, patch) = config.app_version;
        let app_info = vk::ApplicationInfo::default()
            .application_name(&app_name)
            .application_version(vk::make_api_version(0, major, minor, patch))
            .engine_name(c"Aurora")
            .engine_version(vk::make_api_version(0, 0, 1, 0))
            .api_version(vk::API_VERSION_1_3);

        let mut extension_names = ash_window::enumerate_required_extensions(display_handle.as_raw())
            .map_err(|e| {
                engine_error!(logger, "aurora::vulkan", "Failed to get required extensions: {}", e);
                Error::InitializationFailed(format!("Failed to get required extensions: {}", e))
            })?
            .to_vec();
        if validation {
            extension_names.push(ash::ext::debug_utils::NAME.as_ptr());
        }

        let layer_names = if validation {
            vec![VALIDATION_LAYER.as_ptr()]
        } else {
            vec![]
        };

        let create_info = vk::InstanceCreateInfo::default()
            .application_info(&app_info)
            .enabled_layer_names(&layer_names)
            .enabled_extension_names(&extension_names);

        let instance = unsafe { entry.create_instance(&create_info, None) }.map_err(|e| {
            engine_error!(logger, "aurora::vulkan", "Failed to create Vulkan instance: {:?}", e);
            Error::InitializationFailed(format!("Failed to create instance: {:?}", e))
        })?;

        #[cfg(feature = "vulkan-validation")]
        let debug_messenger = if validation {
            Some(DebugMessenger::new(&entry, &instance, config.debug_severity, Arc::clone(&logger))?)
        } else {
            None
        };

        // ===== SURFACE =====

        let surface = unsafe {
            ash_window::create_surface(&entry, &instance, display_handle.as_raw(), window_handle.as_raw(), None)
        }
        .map_err(|e| {
            engine_error!(logger, "aurora::vulkan", "Failed to create surface: {:?}", e);
            Error::InitializationFailed(format!("Failed to create surface: {:?}", e))
        })?;
        let surface_loader = ash::khr::surface::Instance::new(&entry, &instance);

        // ===== PHYSICAL DEVICE =====

        let candidate = Self::pick_physical_device(&instance, &surface_loader, surface, &logger)?;
        let physical_device = candidate.physical_device;

        let properties = unsafe { instance.get_physical_device_properties(physical_device) };
        let features = unsafe { instance.get_physical_device_features(physical_device) };
        let anisotropy_supported = features.sampler_anisotropy == vk::TRUE;
        let device_name = properties
            .device_name_as_c_str()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|_| "<unnamed>".to_string());

        // ===== LOGICAL DEVICE =====

        let queue_priorities = [1.0];
        let mut queue_create_infos = vec![vk::DeviceQueueCreateInfo::default()
            .queue_family_index(candidate.graphics_family)
            .queue_priorities(&queue_priorities)];
        if candidate.present_family != candidate.graphics_family {
            queue_create_infos.push(
                vk::DeviceQueueCreateInfo::default()
                    .queue_family_index(candidate.present_family)
                    .queue_priorities(&queue_priorities),
            );
        }

        let device_extension_names = [ash::khr::swapchain::NAME.as_ptr()];
        let device_features = vk::PhysicalDeviceFeatures::default().sampler_anisotropy(anisotropy_supported);

        let device_create_info = vk::DeviceCreateInfo::default()
            .queue_create_infos(&queue_create_infos)
            .enabled_extension_names(&device_extension_names)
            .enabled_features(&device_features);

        let device = unsafe { instance.create_device(physical_device, &device_create_info, None) }
            .map_err(|e| {
                engine_error!(logger, "aurora::vulkan", "Failed to create logical device: {:?}", e);
                Error::InitializationFailed(format!("Failed to create device: {:?}", e))
            })?;

        let graphics_queue = unsafe { device.get_device_queue(candidate.graphics_family, 0) };
        let present_queue = unsafe { device.get_device_queue(candidate.present_family, 0) };

        // ===== ALLOCATOR =====

        let allocator = Allocator::new(&AllocatorCreateDesc {
            instance: instance.clone(),
            device: device.clone(),
            physical_device,
            debug_settings: Default::default(),
            buffer_device_address: false,
            allocation_sizes: Default::default(),
        })
        .map_err(|e| {
            engine_error!(logger, "aurora::vulkan", "Failed to create GPU allocator: {:?}", e);
            Error::InitializationFailed(format!("Failed to create allocator: {:?}", e))
        })?;

        engine_info!(logger, "aurora::vulkan",
            "Vulkan device created: {} (graphics family {}, present family {}, validation {})",
            device_name, candidate.graphics_family, candidate.present_family,
            if validation { "on" } else { "off" });

        let ctx = Arc::new(GpuContext::new(
            entry,
            instance,
            physical_device,
            device,
            allocator,
            (candidate.graphics_family, graphics_queue),
            (candidate.present_family, present_queue),
            surface,
            surface_loader,
            logger,
            #[cfg(feature = "vulkan-validation")]
            debug_messenger,
        ));

        Ok(Self {
            ctx,
            max_sampler_anisotropy: if anisotropy_supported {
                properties.limits.max_sampler_anisotropy
            } else {
                0.0
            },
        })
    }

    /// Whether the validation layer is requested, compiled in and installed
    fn validation_requested(entry: &ash::Entry, config: &Config, logger: &SharedLogger) -> bool {
        if !config.enable_validation {
            return false;
        }
        if !cfg!(feature = "vulkan-validation") {
            engine_warn!(logger, "aurora::vulkan",
                "Validation requested but the `vulkan-validation` feature is disabled");
            return false;
        }

        let layers = unsafe { entry.enumerate_instance_layer_properties() }.unwrap_or_default();
        let available = layers
            .iter()
            .any(|layer| layer.layer_name_as_c_str().map(|name| name == VALIDATION_LAYER).unwrap_or(false));
        if !available {
            engine_warn!(logger, "aurora::vulkan",
                "{:?} is not installed, continuing without validation", VALIDATION_LAYER);
        }
        available
    }

    /// Best-scored device offering graphics, presentation to `surface` and the swapchain extension
    fn pick_physical_device(
        instance: &ash::Instance,
        surface_loader: &ash::khr::surface::Instance,
        surface: vk::SurfaceKHR,
        logger: &SharedLogger,
    ) -> Result<DeviceCandidate> {
        let physical_devices = unsafe { instance.enumerate_physical_devices() }.map_err(|e| {
            engine_error!(logger, "aurora::vulkan", "Failed to enumerate physical devices: {:?}", e);
            Error::InitializationFailed(format!("Failed to enumerate physical devices: {:?}", e))
        })?;

        physical_devices
            .into_iter()
            .filter_map(|physical_device| {
                let has_swapchain = unsafe { instance.enumerate_device_extension_properties(physical_device) }
                    .unwrap_or_default()
                    .iter()
                    .any(|ext| ext.extension_name_as_c_str().map(|n| n == ash::khr::swapchain::NAME).unwrap_or(false));
                if !has_swapchain {
                    return None;
                }

                let queue_families =
                    unsafe { instance.get_physical_device_queue_family_properties(physical_device) };
                let graphics_family = queue_families
                    .iter()
                    .position(|qf| qf.queue_flags.contains(vk::QueueFlags::GRAPHICS))? as u32;
                let supports_present = |family: u32| unsafe {
                    surface_loader
                        .get_physical_device_surface_support(physical_device, family, surface)
                        .unwrap_or(false)
                };
                // Same family for both when possible
                let present_family = if supports_present(graphics_family) {
                    graphics_family
                } else {
                    (0..queue_families.len() as u32).find(|&family| supports_present(family))?
                };

                let properties = unsafe { instance.get_physical_device_properties(physical_device) };
                Some(DeviceCandidate {
                    physical_device,
                    graphics_family,
                    present_family,
                    score: device_type_score(properties.device_type),
                })
            })
            .max_by_key(|candidate| candidate.score)
            .ok_or_else(|| {
                engine_error!(logger, "aurora::vulkan", "No Vulkan GPU can present to this window");
                Error::InitializationFailed("No suitable Vulkan GPU found".to_string())
            })
    }

    // ===== ACCESSORS =====

    /// Shared GPU context (for collaborators creating their own Vulkan objects)
    pub fn context(&self) -> &Arc<GpuContext> {
        &self.ctx
    }

    /// Validation messages counted so far (None when validation is off)
    #[cfg(feature = "vulkan-validation")]
    pub fn validation_stats(&self) -> Option<ValidationStats> {
        self.ctx.debug_messenger.as_ref().map(|messenger| messenger.stats())
    }

    // ===== FACTORIES =====

    /// Swapchain sized to the surface's current framebuffer
    pub fn create_swapchain(&self, surface: &dyn Surface) -> Result<Swapchain> {
        let size = surface.framebuffer_size();
        Swapchain::new(Arc::clone(&self.ctx), size.width, size.height)
    }

    /// Render pass with one color and one depth attachment
    pub fn create_render_pass(&self, color: TextureFormat, depth: TextureFormat) -> Result<RenderPass> {
        RenderPass::new(Arc::clone(&self.ctx), format_to_vk(color), format_to_vk(depth))
    }

    pub fn create_depth_stencil(&self, format: TextureFormat, extent: Extent2D) -> Result<DepthStencil> {
        DepthStencil::new(Arc::clone(&self.ctx), format, extent)
    }

    /// Global, material and entity set layouts
    pub fn create_frame_layouts(&self) -> Result<FrameLayouts<VulkanBackend>> {
        create_frame_layouts(&self.ctx)
    }

    pub fn create_sampler(&self, kind: SamplerKind) -> Result<Sampler> {
        Sampler::new(Arc::clone(&self.ctx), kind, self.max_sampler_anisotropy)
    }

    /// Pipeline layout with the three frame sets at indices 0, 1 and 2
    ///
    /// The caller builds its pipeline with this layout and hands both to
    /// `Pipeline::from_raw`, which takes over their destruction.
    pub fn create_pipeline_layout(&self, layouts: &FrameLayouts<VulkanBackend>) -> Result<vk::PipelineLayout> {
        let set_layouts = [layouts.global.layout, layouts.material.layout, layouts.entity.layout];
        let create_info = vk::PipelineLayoutCreateInfo::default().set_layouts(&set_layouts);
        unsafe { self.ctx.device.create_pipeline_layout(&create_info, None) }
            .map_err(|e| engine_err!(self.ctx.logger, "aurora::vulkan", "Failed to create pipeline layout: {:?}", e))
    }
}

impl GraphicsDevice<VulkanBackend> for VulkanDevice {
    fn wait_idle(&self) -> Result<()> {
        unsafe { self.ctx.device.device_wait_idle() }
            .map_err(|e| engine_err!(self.ctx.logger, "aurora::vulkan", "Failed to wait idle: {:?}", e))
    }

    fn queues(&self, family: QueueFamily) -> Vec<vk::Queue> {
        match family {
            QueueFamily::Graphics => vec![self.ctx.graphics_queue],
            QueueFamily::Present => vec![self.ctx.present_queue],
        }
    }

    fn create_fence(&self, signaled: bool) -> Result<Fence> {
        Fence::new(Arc::clone(&self.ctx), signaled)
    }

    fn create_semaphore(&self) -> Result<Semaphore> {
        Semaphore::new(Arc::clone(&self.ctx))
    }

    fn create_command_list(&self) -> Result<CommandList> {
        CommandList::new(Arc::clone(&self.ctx))
    }

    fn create_descriptor_pool(&self, max_sets: u32) -> Result<DescriptorPool> {
        DescriptorPool::new(Arc::clone(&self.ctx), max_sets)
    }

    fn create_buffer(&self, desc: &BufferDesc) -> Result<Buffer> {
        Buffer::new(Arc::clone(&self.ctx), desc)
    }

    fn create_framebuffer(
        &self,
        render_pass: &RenderPass,
        color_view: &ImageView,
        depth_view: &ImageView,
        extent: Extent2D,
    ) -> Result<Framebuffer> {
        Framebuffer::new(
            Arc::clone(&self.ctx),
            render_pass.render_pass,
            &[color_view.view, depth_view.view],
            extent,
        )
    }

    fn submit(
        &self,
        queue: vk::Queue,
        command_list: &CommandList,
        wait_semaphore: &Semaphore,
        signal_semaphore: &Semaphore,
        fence: &Fence,
    ) -> Result<()> {
        let wait_semaphores = [wait_semaphore.semaphore];
        let wait_stages = [vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT];
        let command_buffers = [command_list.command_buffer];
        let signal_semaphores = [signal_semaphore.semaphore];

        let submit_info = vk::SubmitInfo::default()
            .wait_semaphores(&wait_semaphores)
            .wait_dst_stage_mask(&wait_stages)
            .command_buffers(&command_buffers)
            .signal_semaphores(&signal_semaphores);

        unsafe { self.ctx.device.queue_submit(queue, &[submit_info], fence.fence) }
            .map_err(|e| engine_err!(self.ctx.logger, "aurora::vulkan", "Failed to submit commands to GPU queue: {:?}", e))
    }
}

#[cfg(test)]
#[path = "vulkan_device_tests.rs"]
mod tests;
