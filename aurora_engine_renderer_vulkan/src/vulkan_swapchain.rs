/// Swapchain - Vulkan implementation of the Swapchain trait
///
/// Owns only the image chain. Semaphores belong to the conceptual frames and
/// color views to the swapchain frames, so recreating the chain never touches
/// synchronization state.

use aurora_engine::aurora::device::{
    AcquireOutcome, Extent2D, PresentOutcome, Swapchain as EngineSwapchain, TextureFormat,
};
use aurora_engine::aurora::{Error, Result};
use aurora_engine::{engine_debug, engine_err, engine_error, engine_warn};
use ash::vk;
use std::sync::Arc;
use std::time::Duration;

use crate::vulkan_context::GpuContext;
use crate::vulkan_device::VulkanBackend;
use crate::vulkan_format::vk_to_format;
use crate::vulkan_frame_buffer::ImageView;
use crate::vulkan_sync::{timeout_nanos, Semaphore};

/// Pick the surface format: B8G8R8A8_SRGB with SRGB_NONLINEAR if offered,
/// otherwise the first reported one
pub fn choose_surface_format(formats: &[vk::SurfaceFormatKHR]) -> Option<vk::SurfaceFormatKHR> {
    formats
        .iter()
        .find(|f| f.format == vk::Format::B8G8R8A8_SRGB && f.color_space == vk::ColorSpaceKHR::SRGB_NONLINEAR)
        .or_else(|| formats.first())
        .copied()
}

/// Image extent for a surface
///
/// The surface's current extent wins unless it is the `u32::MAX` sentinel, in
/// which case the window size is clamped to the supported range.
pub fn choose_extent(caps: &vk::SurfaceCapabilitiesKHR, width: u32, height: u32) -> vk::Extent2D {
    if caps.current_extent.width != u32::MAX {
        caps.current_extent
    } else {
        vk::Extent2D {
            width: width.clamp(caps.min_image_extent.width, caps.max_image_extent.width),
            height: height.clamp(caps.min_image_extent.height, caps.max_image_extent.height),
        }
    }
}

/// One image more than the minimum, capped by the maximum (0 = no maximum)
pub fn choose_image_count(caps: &vk::SurfaceCapabilitiesKHR) -> u32 {
    let image_count = caps.min_image_count + 1;
    if caps.max_image_count > 0 {
        image_count.min(caps.max_image_count)
    } else {
        image_count
    }
}

/// Vulkan swapchain implementation
pub struct Swapchain {
    ctx: Arc<GpuContext>,
    swapchain: vk::SwapchainKHR,
    images: Vec<vk::Image>,
    surface_format: vk::SurfaceFormatKHR,
    extent: vk::Extent2D,
    generation: u64,
}

impl Swapchain {
    /// Create the image chain for a window of `width` x `height` pixels
    pub(crate) fn new(ctx: Arc<GpuContext>, width: u32, height: u32) -> Result<Self> {
        let surface_formats = unsafe {
            ctx.surface_loader
                .get_physical_device_surface_formats(ctx.physical_device, ctx.surface)
        }
        .map_err(|e| {
            engine_error!(ctx.logger, "aurora::vulkan", "Failed to query surface formats: {:?}", e);
            Error::InitializationFailed(format!("Failed to get surface formats: {:?}", e))
        })?;

        let surface_format = choose_surface_format(&surface_formats).ok_or_else(|| {
            engine_error!(ctx.logger, "aurora::vulkan", "Surface reports no formats");
            Error::InitializationFailed("Surface reports no formats".to_string())
        })?;

        let mut swapchain = Self {
            ctx,
            swapchain: vk::SwapchainKHR::null(),
            images: Vec::new(),
            surface_format,
            extent: vk::Extent2D { width: 0, height: 0 },
            generation: 0,
        };
        swapchain.create_chain(width, height)?;
        Ok(swapchain)
    }

    /// (Re)create the chain, retiring the current one
    fn create_chain(&mut self, width: u32, height: u32) -> Result<()> {
        let ctx = Arc::clone(&self.ctx);
        let surface_capabilities = unsafe {
            ctx.surface_loader
                .get_physical_device_surface_capabilities(ctx.physical_device, ctx.surface)
        }
        .map_err(|e| {
            engine_error!(ctx.logger, "aurora::vulkan", "Failed to get surface capabilities: {:?}", e);
            Error::InitializationFailed(format!("Failed to get surface capabilities: {:?}", e))
        })?;

        let extent = choose_extent(&surface_capabilities, width, height);
        if extent.width == 0 || extent.height == 0 {
            return Err(engine_err!(ctx.logger, "aurora::vulkan",
                "Cannot create a {}x{} swapchain", extent.width, extent.height));
        }

        // Graphics and present may live in different families
        let queue_families = [ctx.graphics_queue_family, ctx.present_queue_family];
        let old_swapchain = self.swapchain;
        let mut create_info = vk::SwapchainCreateInfoKHR::default()
            .surface(ctx.surface)
            .min_image_count(choose_image_count(&surface_capabilities))
            .image_format(self.surface_format.format)
            .image_color_space(self.surface_format.color_space)
            .image_extent(extent)
            .image_array_layers(1)
            .image_usage(vk::ImageUsageFlags::COLOR_ATTACHMENT)
            .pre_transform(surface_capabilities.current_transform)
            .composite_alpha(vk::CompositeAlphaFlagsKHR::OPAQUE)
            .present_mode(vk::PresentModeKHR::FIFO)
            .clipped(true)
            .old_swapchain(old_swapchain);
        create_info = if ctx.graphics_queue_family != ctx.present_queue_family {
            create_info
                .image_sharing_mode(vk::SharingMode::CONCURRENT)
                .queue_family_indices(&queue_families)
        } else {
            create_info.image_sharing_mode(vk::SharingMode::EXCLUSIVE)
        };

        let swapchain = unsafe { ctx.swapchain_loader.create_swapchain(&create_info, None) }
            .map_err(|e| {
                engine_error!(ctx.logger, "aurora::vulkan", "Failed to create swapchain: {:?}", e);
                Error::InitializationFailed(format!("Failed to create swapchain: {:?}", e))
            })?;

        if old_swapchain != vk::SwapchainKHR::null() {
            unsafe { ctx.swapchain_loader.destroy_swapchain(old_swapchain, None) };
        }
        self.swapchain = swapchain;

        // The driver may hand out more images than requested
        self.images = unsafe { ctx.swapchain_loader.get_swapchain_images(swapchain) }
            .map_err(|e| {
                engine_error!(ctx.logger, "aurora::vulkan", "Failed to get swapchain images: {:?}", e);
                Error::InitializationFailed(format!("Failed to get swapchain images: {:?}", e))
            })?;
        self.extent = extent;

        engine_debug!(ctx.logger, "aurora::vulkan", "Swapchain created: {}x{}, {} images, {:?}",
            extent.width, extent.height, self.images.len(), self.surface_format.format);
        Ok(())
    }

    pub fn handle(&self) -> vk::SwapchainKHR {
        self.swapchain
    }
}

impl EngineSwapchain<VulkanBackend> for Swapchain {
    fn image_count(&self) -> usize {
        self.images.len()
    }

    fn extent(&self) -> Extent2D {
        Extent2D::new(self.extent.width, self.extent.height)
    }

    fn format(&self) -> TextureFormat {
        vk_to_format(self.surface_format.format)
    }

    fn generation(&self) -> u64 {
        self.generation
    }

    fn acquire_next_image(&mut self, semaphore: &Semaphore, timeout: Duration) -> Result<AcquireOutcome> {
        let result = unsafe {
            self.ctx.swapchain_loader.acquire_next_image(
                self.swapchain,
                timeout_nanos(timeout),
                semaphore.semaphore,
                vk::Fence::null(),
            )
        };
        match result {
            Ok((image_index, false)) => Ok(AcquireOutcome::Acquired(image_index)),
            Ok((image_index, true)) => Ok(AcquireOutcome::Suboptimal(image_index)),
            Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => Ok(AcquireOutcome::OutOfDate),
            Err(vk::Result::TIMEOUT) | Err(vk::Result::NOT_READY) => {
                engine_warn!(self.ctx.logger, "aurora::vulkan", "No swapchain image available within {:?}", timeout);
                Ok(AcquireOutcome::NotReady)
            }
            Err(e) => Err(engine_err!(self.ctx.logger, "aurora::vulkan",
                "Failed to acquire next swapchain image: {:?}", e)),
        }
    }

    fn present(&mut self, queue: vk::Queue, image_index: u32, wait_semaphore: &Semaphore) -> Result<PresentOutcome> {
        if image_index as usize >= self.images.len() {
            return Err(Error::ContractViolation(format!(
                "present: image_index {} out of range (count: {})",
                image_index,
                self.images.len()
            )));
        }

        let swapchains = [self.swapchain];
        let image_indices = [image_index];
        let wait_semaphores = [wait_semaphore.semaphore];
        let present_info = vk::PresentInfoKHR::default()
            .wait_semaphores(&wait_semaphores)
            .swapchains(&swapchains)
            .image_indices(&image_indices);

        match unsafe { self.ctx.swapchain_loader.queue_present(queue, &present_info) } {
            Ok(false) => Ok(PresentOutcome::Presented),
            Ok(true) => Ok(PresentOutcome::Suboptimal),
            Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => Ok(PresentOutcome::OutOfDate),
            Err(e) => Err(engine_err!(self.ctx.logger, "aurora::vulkan",
                "Failed to present swapchain image: {:?}", e)),
        }
    }

    fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        self.create_chain(width, height)?;
        self.generation += 1;
        Ok(())
    }

    fn create_color_view(&self, image_index: usize) -> Result<ImageView> {
        let image = self.images.get(image_index).copied().ok_or_else(|| {
            Error::ContractViolation(format!(
                "create_color_view: image_index {} out of range (count: {})",
                image_index,
                self.images.len()
            ))
        })?;
        ImageView::new(Arc::clone(&self.ctx), image, self.surface_format.format)
    }
}

impl Drop for Swapchain {
    fn drop(&mut self) {
        unsafe {
            self.ctx.swapchain_loader.destroy_swapchain(self.swapchain, None);
        }
    }
}

#[cfg(test)]
#[path = "vulkan_swapchain_tests.rs"]
mod tests;
