/// Pipeline - graphics pipeline adopted from the pipeline builder

use ash::vk;
use std::sync::Arc;

use crate::vulkan_context::GpuContext;

/// Vulkan pipeline implementation
///
/// Shader modules and fixed-function state are the pipeline builder's
/// business: it hands over a finished pipeline and the layout it was built
/// with (see `VulkanDevice::create_pipeline_layout`). Both are destroyed on drop.
pub struct Pipeline {
    ctx: Arc<GpuContext>,
    /// Vulkan graphics pipeline
    pub(crate) pipeline: vk::Pipeline,
    /// Pipeline layout (accessed internally for descriptor set binding)
    pub(crate) pipeline_layout: vk::PipelineLayout,
}

impl Pipeline {
    /// Take ownership of a pipeline and its layout
    ///
    /// # Safety
    ///
    /// Both handles must have been created on `ctx.device` and must not be
    /// destroyed by anyone else.
    pub unsafe fn from_raw(ctx: Arc<GpuContext>, pipeline: vk::Pipeline, pipeline_layout: vk::PipelineLayout) -> Self {
        Self { ctx, pipeline, pipeline_layout }
    }

    pub fn handle(&self) -> vk::Pipeline {
        self.pipeline
    }

    pub fn layout(&self) -> vk::PipelineLayout {
        self.pipeline_layout
    }
}

impl Drop for Pipeline {
    fn drop(&mut self) {
        unsafe {
            self.ctx.device.destroy_pipeline(self.pipeline, None);
            self.ctx.device.destroy_pipeline_layout(self.pipeline_layout, None);
        }
    }
}
