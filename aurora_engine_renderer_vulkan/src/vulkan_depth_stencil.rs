/// DepthStencil - shared depth attachment of the swapchain framebuffers

use aurora_engine::aurora::device::{DepthStencil as EngineDepthStencil, Extent2D, TextureFormat};
use aurora_engine::aurora::{Error, Result};
use aurora_engine::{engine_err, engine_error};
use ash::vk;
use gpu_allocator::vulkan::{Allocation, AllocationCreateDesc, AllocationScheme};
use std::mem::ManuallyDrop;
use std::sync::Arc;

use crate::vulkan_device::VulkanBackend;
use crate::vulkan_context::GpuContext;
use crate::vulkan_format::{format_to_vk, vk_to_format};
use crate::vulkan_frame_buffer::ImageView;

/// Image, memory and view of one depth attachment
///
/// The view is dropped by hand so it always goes before the image.
struct DepthImage {
    image: vk::Image,
    allocation: Option<Allocation>,
    view: ManuallyDrop<ImageView>,
}

/// Depth-stencil attachment
///
/// Read-only shared by every swapchain framebuffer. `resize()` recreates the
/// image; the device must be idle and the framebuffers dropped beforehand.
pub struct DepthStencil {
    ctx: Arc<GpuContext>,
    format: vk::Format,
    extent: Extent2D,
    depth: DepthImage,
}

impl DepthStencil {
    pub(crate) fn new(ctx: Arc<GpuContext>, format: TextureFormat, extent: Extent2D) -> Result<Self> {
        if !format.is_depth() {
            return Err(Error::InvalidResource(format!("{:?} is not a depth format", format)));
        }
        let format = format_to_vk(format);
        let depth = create_depth_image(&ctx, format, extent)?;
        Ok(Self { ctx, format, extent, depth })
    }

    fn destroy_image(ctx: &GpuContext, image: vk::Image, allocation: Option<Allocation>) {
        unsafe {
            if let Some(allocation) = allocation {
                if let Ok(mut allocator) = ctx.allocator.lock() {
                    allocator.free(allocation).ok();
                }
            }
            ctx.device.destroy_image(image, None);
        }
    }
}

fn create_depth_image(ctx: &Arc<GpuContext>, format: vk::Format, extent: Extent2D) -> Result<DepthImage> {
    unsafe {
        let create_info = vk::ImageCreateInfo::default()
            .image_type(vk::ImageType::TYPE_2D)
            .format(format)
            .extent(vk::Extent3D { width: extent.width, height: extent.height, depth: 1 })
            .mip_levels(1)
            .array_layers(1)
            .samples(vk::SampleCountFlags::TYPE_1)
            .tiling(vk::ImageTiling::OPTIMAL)
            .usage(vk::ImageUsageFlags::DEPTH_STENCIL_ATTACHMENT)
            .sharing_mode(vk::SharingMode::EXCLUSIVE)
            .initial_layout(vk::ImageLayout::UNDEFINED);

        let image = ctx.device.create_image(&create_info, None)
            .map_err(|e| engine_err!(ctx.logger, "aurora::vulkan",
                "Failed to create {}x{} depth image: {:?}", extent.width, extent.height, e))?;

        let requirements = ctx.device.get_image_memory_requirements(image);
        let allocated = match ctx.allocator.lock() {
            Ok(mut allocator) => allocator
                .allocate(&AllocationCreateDesc {
                    name: "depth_stencil",
                    requirements,
                    location: gpu_allocator::MemoryLocation::GpuOnly,
                    linear: false,
                    allocation_scheme: AllocationScheme::GpuAllocatorManaged,
                })
                .map_err(|_| Error::OutOfMemory),
            Err(_) => Err(Error::BackendError("GPU allocator lock poisoned".to_string())),
        };
        let allocation = match allocated {
            Ok(allocation) => allocation,
            Err(e) => {
                ctx.device.destroy_image(image, None);
                engine_error!(ctx.logger, "aurora::vulkan", "Failed to allocate depth image memory: {}", e);
                return Err(e);
            }
        };

        if let Err(e) = ctx.device.bind_image_memory(image, allocation.memory(), allocation.offset()) {
            DepthStencil::destroy_image(ctx, image, Some(allocation));
            return Err(engine_err!(ctx.logger, "aurora::vulkan", "Failed to bind depth image memory: {:?}", e));
        }

        match ImageView::new(Arc::clone(ctx), image, format) {
            Ok(view) => Ok(DepthImage { image, allocation: Some(allocation), view: ManuallyDrop::new(view) }),
            Err(e) => {
                DepthStencil::destroy_image(ctx, image, Some(allocation));
                Err(e)
            }
        }
    }
}

impl EngineDepthStencil<VulkanBackend> for DepthStencil {
    fn view(&self) -> &ImageView {
        &self.depth.view
    }

    fn extent(&self) -> Extent2D {
        self.extent
    }

    fn format(&self) -> TextureFormat {
        vk_to_format(self.format)
    }

    fn resize(&mut self, extent: Extent2D) -> Result<()> {
        let depth = create_depth_image(&self.ctx, self.format, extent)?;
        let old = std::mem::replace(&mut self.depth, depth);
        drop(ManuallyDrop::into_inner(old.view));
        Self::destroy_image(&self.ctx, old.image, old.allocation);
        self.extent = extent;
        Ok(())
    }
}

impl Drop for DepthStencil {
    fn drop(&mut self) {
        unsafe {
            ManuallyDrop::drop(&mut self.depth.view);
        }
        Self::destroy_image(&self.ctx, self.depth.image, self.depth.allocation.take());
    }
}
