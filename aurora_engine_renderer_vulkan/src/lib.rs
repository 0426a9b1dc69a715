/*!
# Aurora Engine - Vulkan Backend

Vulkan implementation of the `aurora_engine` backend seam, built on Ash for
the Vulkan bindings and gpu-allocator for memory management.

`VulkanBackend` plugs into the generic frame core:

```no_run
use std::sync::Arc;
use aurora_engine::aurora::{Config, log::DefaultLogger, log::SharedLogger};
use aurora_engine::aurora::device::{DepthStencil as _, Swapchain as _, TextureFormat};
use aurora_engine_renderer_vulkan::{VulkanDevice, WindowSurface};

# fn run(window: Arc<winit::window::Window>) -> aurora_engine::aurora::Result<()> {
let logger: SharedLogger = Arc::new(DefaultLogger);
let config = Config::default();
let device = VulkanDevice::new(window.as_ref(), &config, Arc::clone(&logger))?;
let surface = Arc::new(WindowSurface::new(window));
let swapchain = device.create_swapchain(surface.as_ref())?;
let depth = device.create_depth_stencil(TextureFormat::D32_SFLOAT, swapchain.extent())?;
let render_pass = device.create_render_pass(swapchain.format(), depth.format())?;
# Ok(())
# }
```
*/

mod vulkan_buffer;
mod vulkan_command_list;
mod vulkan_context;
#[cfg(feature = "vulkan-validation")]
mod vulkan_debug;
mod vulkan_depth_stencil;
mod vulkan_descriptor;
mod vulkan_device;
mod vulkan_format;
mod vulkan_frame_buffer;
mod vulkan_pipeline;
mod vulkan_render_pass;
mod vulkan_result;
mod vulkan_sampler;
mod vulkan_surface;
mod vulkan_swapchain;
mod vulkan_sync;

pub use vulkan_buffer::Buffer;
pub use vulkan_command_list::CommandList;
pub use vulkan_context::GpuContext;
pub use vulkan_depth_stencil::DepthStencil;
pub use vulkan_descriptor::{DescriptorPool, DescriptorSet, DescriptorSetLayout, LayoutKind};
pub use vulkan_device::{VulkanBackend, VulkanDevice};
pub use vulkan_format::{format_to_vk, vk_to_format};
pub use vulkan_frame_buffer::{Framebuffer, ImageView};
pub use vulkan_pipeline::Pipeline;
pub use vulkan_render_pass::RenderPass;
pub use vulkan_result::{describe_result, vk_error};
pub use vulkan_sampler::{Sampler, SamplerKind};
pub use vulkan_surface::WindowSurface;
pub use vulkan_swapchain::Swapchain;
pub use vulkan_sync::{Fence, Semaphore};

#[cfg(feature = "vulkan-validation")]
pub use vulkan_debug::ValidationStats;

/// Re-exported so callers building pipelines use the same Ash version
pub use ash;
