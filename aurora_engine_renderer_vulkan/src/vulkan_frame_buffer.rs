/// ImageView and Framebuffer - Vulkan attachment wrappers
///
/// A framebuffer groups one swapchain color view with the shared depth view.
/// Created once per swapchain image by `Swapchain::get_frames()`, reused each frame.

use aurora_engine::aurora::device::Extent2D;
use aurora_engine::aurora::Result;
use aurora_engine::engine_err;
use ash::vk;
use std::sync::Arc;

use crate::vulkan_context::GpuContext;
use crate::vulkan_format::aspect_of;

/// Vulkan image view
///
/// Destroys the view (never the image) when dropped.
pub struct ImageView {
    ctx: Arc<GpuContext>,
    pub(crate) view: vk::ImageView,
}

impl ImageView {
    /// Create a 2D single-mip view of `image`
    pub(crate) fn new(ctx: Arc<GpuContext>, image: vk::Image, format: vk::Format) -> Result<Self> {
        let create_info = vk::ImageViewCreateInfo::default()
            .image(image)
            .view_type(vk::ImageViewType::TYPE_2D)
            .format(format)
            .components(vk::ComponentMapping {
                r: vk::ComponentSwizzle::IDENTITY,
                g: vk::ComponentSwizzle::IDENTITY,
                b: vk::ComponentSwizzle::IDENTITY,
                a: vk::ComponentSwizzle::IDENTITY,
            })
            .subresource_range(vk::ImageSubresourceRange {
                aspect_mask: aspect_of(format),
                base_mip_level: 0,
                level_count: 1,
                base_array_layer: 0,
                layer_count: 1,
            });

        let view = unsafe { ctx.device.create_image_view(&create_info, None) }
            .map_err(|e| engine_err!(ctx.logger, "aurora::vulkan", "Failed to create image view: {:?}", e))?;
        Ok(Self { ctx, view })
    }

    /// Wrap a view created elsewhere (e.g. of a texture); destroyed on drop
    pub fn from_raw(ctx: Arc<GpuContext>, view: vk::ImageView) -> Self {
        Self { ctx, view }
    }

    pub fn handle(&self) -> vk::ImageView {
        self.view
    }
}

impl Drop for ImageView {
    fn drop(&mut self) {
        unsafe {
            self.ctx.device.destroy_image_view(self.view, None);
        }
    }
}

/// Vulkan framebuffer implementation
///
/// Wraps a VkFramebuffer. Destroyed when dropped.
pub struct Framebuffer {
    ctx: Arc<GpuContext>,
    /// Vulkan framebuffer handle
    pub(crate) framebuffer: vk::Framebuffer,
    extent: Extent2D,
}

impl Framebuffer {
    pub(crate) fn new(
        ctx: Arc<GpuContext>,
        render_pass: vk::RenderPass,
        attachments: &[vk::ImageView],
        extent: Extent2D,
    ) -> Result<Self> {
        let create_info = vk::FramebufferCreateInfo::default()
            .render_pass(render_pass)
            .attachments(attachments)
            .width(extent.width)
            .height(extent.height)
            .layers(1);

        let framebuffer = unsafe { ctx.device.create_framebuffer(&create_info, None) }
            .map_err(|e| engine_err!(ctx.logger, "aurora::vulkan",
                "Failed to create {}x{} framebuffer: {:?}", extent.width, extent.height, e))?;
        Ok(Self { ctx, framebuffer, extent })
    }

    pub fn extent(&self) -> Extent2D {
        self.extent
    }
}

impl Drop for Framebuffer {
    fn drop(&mut self) {
        unsafe {
            self.ctx.device.destroy_framebuffer(self.framebuffer, None);
        }
    }
}
