/// CommandList - Vulkan implementation of the CommandList trait

use aurora_engine::aurora::device::{ClearValues, CommandList as EngineCommandList, Extent2D, IndexType};
use aurora_engine::aurora::{Error, Result};
use aurora_engine::engine_err;
use ash::vk;
use std::sync::Arc;

use crate::vulkan_buffer::Buffer;
use crate::vulkan_context::GpuContext;
use crate::vulkan_descriptor::DescriptorSet;
use crate::vulkan_device::VulkanBackend;
use crate::vulkan_format::index_type_to_vk;
use crate::vulkan_frame_buffer::Framebuffer;
use crate::vulkan_pipeline::Pipeline;
use crate::vulkan_render_pass::RenderPass;

/// Vulkan command list implementation
///
/// One primary command buffer allocated from its own pool, so a conceptual
/// frame can reset it without touching the other frames' buffers.
pub struct CommandList {
    ctx: Arc<GpuContext>,
    /// Command pool for allocating command buffers
    command_pool: vk::CommandPool,
    /// Command buffer for recording
    pub(crate) command_buffer: vk::CommandBuffer,
    /// Whether the command list is currently recording
    is_recording: bool,
    /// Extent of the current render pass (None outside a render pass)
    render_extent: Option<vk::Extent2D>,
    /// Layout of the bound pipeline (descriptor sets bind against it)
    bound_pipeline_layout: Option<vk::PipelineLayout>,
}

impl CommandList {
    pub(crate) fn new(ctx: Arc<GpuContext>) -> Result<Self> {
        let command_pool_create_info = vk::CommandPoolCreateInfo::default()
            .queue_family_index(ctx.graphics_queue_family)
            .flags(vk::CommandPoolCreateFlags::RESET_COMMAND_BUFFER);

        let command_pool = unsafe { ctx.device.create_command_pool(&command_pool_create_info, None) }
            .map_err(|e| engine_err!(ctx.logger, "aurora::vulkan", "Failed to create command pool: {:?}", e))?;

        let command_buffer_allocate_info = vk::CommandBufferAllocateInfo::default()
            .command_pool(command_pool)
            .level(vk::CommandBufferLevel::PRIMARY)
            .command_buffer_count(1);

        let command_buffer = match unsafe { ctx.device.allocate_command_buffers(&command_buffer_allocate_info) } {
            Ok(buffers) if !buffers.is_empty() => buffers[0],
            result => {
                unsafe { ctx.device.destroy_command_pool(command_pool, None) };
                return Err(engine_err!(ctx.logger, "aurora::vulkan",
                    "Failed to allocate command buffer: {:?}", result.err()));
            }
        };

        Ok(Self {
            ctx,
            command_pool,
            command_buffer,
            is_recording: false,
            render_extent: None,
            bound_pipeline_layout: None,
        })
    }

    /// Get the underlying Vulkan command buffer
    pub fn command_buffer(&self) -> vk::CommandBuffer {
        self.command_buffer
    }

    fn ensure_recording(&self) -> Result<()> {
        if !self.is_recording {
            return Err(Error::BackendError("Command list not recording".to_string()));
        }
        Ok(())
    }

    fn ensure_in_render_pass(&self) -> Result<vk::Extent2D> {
        self.ensure_recording()?;
        self.render_extent
            .ok_or_else(|| Error::BackendError("Not inside a render pass".to_string()))
    }
}

impl EngineCommandList<VulkanBackend> for CommandList {
    /// Return the list to the initial state, abandoning any recording in progress
    fn reset(&mut self) -> Result<()> {
        unsafe {
            self.ctx.device.reset_command_buffer(self.command_buffer, vk::CommandBufferResetFlags::empty())
        }
        .map_err(|e| engine_err!(self.ctx.logger, "aurora::vulkan", "Failed to reset command buffer: {:?}", e))?;

        self.is_recording = false;
        self.render_extent = None;
        self.bound_pipeline_layout = None;
        Ok(())
    }

    fn begin(&mut self) -> Result<()> {
        if self.is_recording {
            return Err(Error::BackendError("Command list already recording".to_string()));
        }

        let begin_info = vk::CommandBufferBeginInfo::default()
            .flags(vk::CommandBufferUsageFlags::ONE_TIME_SUBMIT);

        unsafe { self.ctx.device.begin_command_buffer(self.command_buffer, &begin_info) }
            .map_err(|e| engine_err!(self.ctx.logger, "aurora::vulkan", "Failed to begin command buffer: {:?}", e))?;

        self.is_recording = true;
        self.render_extent = None;
        self.bound_pipeline_layout = None;
        Ok(())
    }

    fn end(&mut self) -> Result<()> {
        self.ensure_recording()?;
        if self.render_extent.is_some() {
            return Err(Error::BackendError("Render pass not ended before ending command list".to_string()));
        }

        unsafe { self.ctx.device.end_command_buffer(self.command_buffer) }
            .map_err(|e| engine_err!(self.ctx.logger, "aurora::vulkan", "Failed to end command buffer: {:?}", e))?;

        self.is_recording = false;
        Ok(())
    }

    fn copy_buffer(&mut self, src: &Buffer, src_offset: u64, dst: &Buffer, size: u64) -> Result<()> {
        self.ensure_recording()?;
        if self.render_extent.is_some() {
            return Err(Error::BackendError("Buffer copies must be recorded outside a render pass".to_string()));
        }

        let region = vk::BufferCopy {
            src_offset,
            dst_offset: 0,
            size,
        };

        // Uniform reads of the following draws must see the copied bytes
        let barrier = vk::BufferMemoryBarrier::default()
            .src_access_mask(vk::AccessFlags::TRANSFER_WRITE)
            .dst_access_mask(vk::AccessFlags::UNIFORM_READ)
            .src_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
            .dst_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
            .buffer(dst.buffer)
            .offset(0)
            .size(size);

        unsafe {
            self.ctx.device.cmd_copy_buffer(self.command_buffer, src.buffer, dst.buffer, &[region]);
            self.ctx.device.cmd_pipeline_barrier(
                self.command_buffer,
                vk::PipelineStageFlags::TRANSFER,
                vk::PipelineStageFlags::VERTEX_SHADER | vk::PipelineStageFlags::FRAGMENT_SHADER,
                vk::DependencyFlags::empty(),
                &[],
                &[barrier],
                &[],
            );
        }
        Ok(())
    }

    fn begin_render_pass(
        &mut self,
        render_pass: &RenderPass,
        framebuffer: &Framebuffer,
        extent: Extent2D,
        clear: &ClearValues,
    ) -> Result<()> {
        self.ensure_recording()?;
        if self.render_extent.is_some() {
            return Err(Error::BackendError("Already inside a render pass".to_string()));
        }

        let clear_values = [
            vk::ClearValue {
                color: vk::ClearColorValue { float32: clear.color },
            },
            vk::ClearValue {
                depth_stencil: vk::ClearDepthStencilValue {
                    depth: clear.depth,
                    stencil: clear.stencil,
                },
            },
        ];

        let vk_extent = vk::Extent2D { width: extent.width, height: extent.height };
        let render_pass_info = vk::RenderPassBeginInfo::default()
            .render_pass(render_pass.render_pass)
            .framebuffer(framebuffer.framebuffer)
            .render_area(vk::Rect2D {
                offset: vk::Offset2D { x: 0, y: 0 },
                extent: vk_extent,
            })
            .clear_values(&clear_values);

        unsafe {
            self.ctx.device.cmd_begin_render_pass(
                self.command_buffer,
                &render_pass_info,
                vk::SubpassContents::INLINE,
            );
        }

        self.render_extent = Some(vk_extent);
        Ok(())
    }

    fn end_render_pass(&mut self) -> Result<()> {
        self.ensure_in_render_pass()?;

        unsafe {
            self.ctx.device.cmd_end_render_pass(self.command_buffer);
        }
        self.render_extent = None;
        Ok(())
    }

    fn bind_pipeline(&mut self, pipeline: &Pipeline) -> Result<()> {
        let extent = self.ensure_in_render_pass()?;

        // Pipelines declare viewport and scissor as dynamic state
        let viewport = vk::Viewport::default()
            .x(0.0)
            .y(0.0)
            .width(extent.width as f32)
            .height(extent.height as f32)
            .min_depth(0.0)
            .max_depth(1.0);
        let scissor = vk::Rect2D::default()
            .offset(vk::Offset2D { x: 0, y: 0 })
            .extent(extent);

        unsafe {
            self.ctx.device.cmd_bind_pipeline(
                self.command_buffer,
                vk::PipelineBindPoint::GRAPHICS,
                pipeline.pipeline,
            );
            self.ctx.device.cmd_set_viewport(self.command_buffer, 0, &[viewport]);
            self.ctx.device.cmd_set_scissor(self.command_buffer, 0, &[scissor]);
        }

        self.bound_pipeline_layout = Some(pipeline.pipeline_layout);
        Ok(())
    }

    fn bind_descriptor_set(&mut self, set_index: u32, set: &DescriptorSet) -> Result<()> {
        self.ensure_recording()?;
        let layout = self.bound_pipeline_layout.ok_or_else(|| {
            Error::BackendError("No pipeline bound for descriptor set binding".to_string())
        })?;

        unsafe {
            self.ctx.device.cmd_bind_descriptor_sets(
                self.command_buffer,
                vk::PipelineBindPoint::GRAPHICS,
                layout,
                set_index,
                &[set.set],
                &[], // dynamic_offsets
            );
        }
        Ok(())
    }

    fn bind_vertex_buffer(&mut self, buffer: &Buffer, offset: u64) -> Result<()> {
        self.ensure_recording()?;

        unsafe {
            self.ctx.device.cmd_bind_vertex_buffers(self.command_buffer, 0, &[buffer.buffer], &[offset]);
        }
        Ok(())
    }

    fn bind_index_buffer(&mut self, buffer: &Buffer, offset: u64, index_type: IndexType) -> Result<()> {
        self.ensure_recording()?;

        unsafe {
            self.ctx.device.cmd_bind_index_buffer(
                self.command_buffer,
                buffer.buffer,
                offset,
                index_type_to_vk(index_type),
            );
        }
        Ok(())
    }

    fn draw_indexed(&mut self, index_count: u32, first_index: u32, vertex_offset: i32) -> Result<()> {
        self.ensure_in_render_pass()?;

        unsafe {
            self.ctx.device.cmd_draw_indexed(
                self.command_buffer,
                index_count,
                1, // instance_count
                first_index,
                vertex_offset,
                0, // first_instance
            );
        }
        Ok(())
    }
}

impl Drop for CommandList {
    fn drop(&mut self) {
        unsafe {
            // Frees the command buffer with it
            self.ctx.device.destroy_command_pool(self.command_pool, None);
        }
    }
}
