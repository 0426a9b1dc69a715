/// DescriptorPool, DescriptorSet and DescriptorSetLayout - Vulkan descriptors
///
/// Set layouts follow the frame contract: set 0 (global) and set 2 (entity)
/// hold one uniform buffer at binding 0; set 1 (material) adds two combined
/// image samplers at bindings 1 and 2.

use aurora_engine::aurora::device::{
    DescriptorPool as EngineDescriptorPool, FrameLayouts, FIRST_TEXTURE_BINDING, LAST_TEXTURE_BINDING,
    UNIFORM_BINDING,
};
use aurora_engine::aurora::{Error, Result};
use aurora_engine::{engine_err, engine_error};
use ash::vk;
use std::sync::Arc;

use crate::vulkan_buffer::Buffer;
use crate::vulkan_context::GpuContext;
use crate::vulkan_device::VulkanBackend;
use crate::vulkan_frame_buffer::ImageView;
use crate::vulkan_result::vk_error;
use crate::vulkan_sampler::Sampler;

/// Which of the three frame layouts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutKind {
    Global,
    Material,
    Entity,
}

/// Bindings of a frame layout
pub fn layout_bindings(kind: LayoutKind) -> Vec<vk::DescriptorSetLayoutBinding<'static>> {
    let uniform_stages = match kind {
        LayoutKind::Global => vk::ShaderStageFlags::VERTEX | vk::ShaderStageFlags::FRAGMENT,
        LayoutKind::Material => vk::ShaderStageFlags::FRAGMENT,
        LayoutKind::Entity => vk::ShaderStageFlags::VERTEX,
    };
    let mut bindings = vec![vk::DescriptorSetLayoutBinding::default()
        .binding(UNIFORM_BINDING)
        .descriptor_type(vk::DescriptorType::UNIFORM_BUFFER)
        .descriptor_count(1)
        .stage_flags(uniform_stages)];

    if kind == LayoutKind::Material {
        for binding in FIRST_TEXTURE_BINDING..=LAST_TEXTURE_BINDING {
            bindings.push(
                vk::DescriptorSetLayoutBinding::default()
                    .binding(binding)
                    .descriptor_type(vk::DescriptorType::COMBINED_IMAGE_SAMPLER)
                    .descriptor_count(1)
                    .stage_flags(vk::ShaderStageFlags::FRAGMENT),
            );
        }
    }
    bindings
}

/// Pool sizes for `max_sets` sets of any frame layout
pub fn pool_sizes(max_sets: u32) -> [vk::DescriptorPoolSize; 2] {
    let textures_per_set = LAST_TEXTURE_BINDING - FIRST_TEXTURE_BINDING + 1;
    [
        vk::DescriptorPoolSize {
            ty: vk::DescriptorType::UNIFORM_BUFFER,
            descriptor_count: max_sets,
        },
        vk::DescriptorPoolSize {
            ty: vk::DescriptorType::COMBINED_IMAGE_SAMPLER,
            descriptor_count: max_sets * textures_per_set,
        },
    ]
}

// ============================================================================
// DescriptorSetLayout
// ============================================================================

/// Vulkan descriptor set layout
pub struct DescriptorSetLayout {
    ctx: Arc<GpuContext>,
    pub(crate) layout: vk::DescriptorSetLayout,
    kind: LayoutKind,
}

impl DescriptorSetLayout {
    pub(crate) fn new(ctx: Arc<GpuContext>, kind: LayoutKind) -> Result<Self> {
        let bindings = layout_bindings(kind);
        let create_info = vk::DescriptorSetLayoutCreateInfo::default().bindings(&bindings);
        let layout = unsafe { ctx.device.create_descriptor_set_layout(&create_info, None) }
            .map_err(|e| engine_err!(ctx.logger, "aurora::vulkan",
                "Failed to create {:?} descriptor set layout: {:?}", kind, e))?;
        Ok(Self { ctx, layout, kind })
    }

    pub fn kind(&self) -> LayoutKind {
        self.kind
    }

    pub fn handle(&self) -> vk::DescriptorSetLayout {
        self.layout
    }
}

impl Drop for DescriptorSetLayout {
    fn drop(&mut self) {
        unsafe {
            self.ctx.device.destroy_descriptor_set_layout(self.layout, None);
        }
    }
}

/// Create the global, material and entity layouts
pub fn create_frame_layouts(ctx: &Arc<GpuContext>) -> Result<FrameLayouts<VulkanBackend>> {
    Ok(FrameLayouts {
        global: DescriptorSetLayout::new(Arc::clone(ctx), LayoutKind::Global)?,
        material: DescriptorSetLayout::new(Arc::clone(ctx), LayoutKind::Material)?,
        entity: DescriptorSetLayout::new(Arc::clone(ctx), LayoutKind::Entity)?,
    })
}

// ============================================================================
// DescriptorSet / DescriptorPool
// ============================================================================

/// Descriptor set allocated from a `DescriptorPool`
///
/// Freed implicitly when its pool is reset or destroyed.
pub struct DescriptorSet {
    pub(crate) set: vk::DescriptorSet,
}

/// Vulkan descriptor pool
pub struct DescriptorPool {
    ctx: Arc<GpuContext>,
    pool: vk::DescriptorPool,
    capacity: u32,
}

impl DescriptorPool {
    pub(crate) fn new(ctx: Arc<GpuContext>, max_sets: u32) -> Result<Self> {
        if max_sets == 0 {
            return Err(Error::InvalidResource("descriptor pool needs at least one set".to_string()));
        }
        let sizes = pool_sizes(max_sets);
        let create_info = vk::DescriptorPoolCreateInfo::default()
            .pool_sizes(&sizes)
            .max_sets(max_sets);
        let pool = unsafe { ctx.device.create_descriptor_pool(&create_info, None) }
            .map_err(|e| {
                engine_error!(ctx.logger, "aurora::vulkan", "Failed to create descriptor pool ({} sets): {:?}", max_sets, e);
                vk_error("vkCreateDescriptorPool", e)
            })?;
        Ok(Self { ctx, pool, capacity: max_sets })
    }
}

impl EngineDescriptorPool<VulkanBackend> for DescriptorPool {
    fn capacity(&self) -> u32 {
        self.capacity
    }

    fn reset(&mut self) -> Result<()> {
        unsafe { self.ctx.device.reset_descriptor_pool(self.pool, vk::DescriptorPoolResetFlags::empty()) }
            .map_err(|e| engine_err!(self.ctx.logger, "aurora::vulkan", "Failed to reset descriptor pool: {:?}", e))
    }

    fn allocate(&mut self, layout: &DescriptorSetLayout) -> Result<DescriptorSet> {
        let layouts = [layout.layout];
        let allocate_info = vk::DescriptorSetAllocateInfo::default()
            .descriptor_pool(self.pool)
            .set_layouts(&layouts);
        let sets = unsafe { self.ctx.device.allocate_descriptor_sets(&allocate_info) }
            // Exhaustion is reported as OutOfMemory; the frame grows its pool
            .map_err(|e| vk_error("vkAllocateDescriptorSets", e))?;
        sets.first()
            .map(|&set| DescriptorSet { set })
            .ok_or_else(|| Error::BackendError("vkAllocateDescriptorSets returned no set".to_string()))
    }

    fn write_uniform_buffer(&self, set: &DescriptorSet, binding: u32, buffer: &Buffer) -> Result<()> {
        let buffer_info = [vk::DescriptorBufferInfo::default()
            .buffer(buffer.buffer)
            .offset(0)
            .range(vk::WHOLE_SIZE)];
        let write = vk::WriteDescriptorSet::default()
            .dst_set(set.set)
            .dst_binding(binding)
            .descriptor_type(vk::DescriptorType::UNIFORM_BUFFER)
            .buffer_info(&buffer_info);
        unsafe {
            self.ctx.device.update_descriptor_sets(std::slice::from_ref(&write), &[]);
        }
        Ok(())
    }

    fn write_image_sampler(
        &self,
        set: &DescriptorSet,
        binding: u32,
        view: &ImageView,
        sampler: &Sampler,
    ) -> Result<()> {
        let image_info = [vk::DescriptorImageInfo::default()
            .sampler(sampler.sampler)
            .image_view(view.view)
            .image_layout(vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL)];
        let write = vk::WriteDescriptorSet::default()
            .dst_set(set.set)
            .dst_binding(binding)
            .descriptor_type(vk::DescriptorType::COMBINED_IMAGE_SAMPLER)
            .image_info(&image_info);
        unsafe {
            self.ctx.device.update_descriptor_sets(std::slice::from_ref(&write), &[]);
        }
        Ok(())
    }
}

impl Drop for DescriptorPool {
    fn drop(&mut self) {
        unsafe {
            self.ctx.device.destroy_descriptor_pool(self.pool, None);
        }
    }
}

#[cfg(test)]
#[path = "vulkan_descriptor_tests.rs"]
mod tests;
