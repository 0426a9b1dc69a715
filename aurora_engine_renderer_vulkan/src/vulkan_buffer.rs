/// Buffer - Vulkan implementation of the engine Buffer trait

use aurora_engine::aurora::device::{Buffer as EngineBuffer, BufferDesc, BufferUsage, MemoryLocation};
use aurora_engine::aurora::{Error, Result};
use aurora_engine::{engine_err, engine_error};
use ash::vk;
use gpu_allocator::vulkan::{Allocation, AllocationCreateDesc, AllocationScheme};
use std::sync::Arc;

use crate::vulkan_context::GpuContext;

/// Engine buffer usage to Vulkan usage flags
pub fn usage_to_vk(usage: BufferUsage) -> vk::BufferUsageFlags {
    let mut flags = vk::BufferUsageFlags::empty();
    if usage.contains(BufferUsage::VERTEX) {
        flags |= vk::BufferUsageFlags::VERTEX_BUFFER;
    }
    if usage.contains(BufferUsage::INDEX) {
        flags |= vk::BufferUsageFlags::INDEX_BUFFER;
    }
    if usage.contains(BufferUsage::UNIFORM) {
        flags |= vk::BufferUsageFlags::UNIFORM_BUFFER;
    }
    if usage.contains(BufferUsage::TRANSFER_SRC) {
        flags |= vk::BufferUsageFlags::TRANSFER_SRC;
    }
    if usage.contains(BufferUsage::TRANSFER_DST) {
        flags |= vk::BufferUsageFlags::TRANSFER_DST;
    }
    flags
}

/// Engine memory location to gpu-allocator location
pub fn location_to_allocator(location: MemoryLocation) -> gpu_allocator::MemoryLocation {
    match location {
        MemoryLocation::GpuOnly => gpu_allocator::MemoryLocation::GpuOnly,
        MemoryLocation::CpuToGpu => gpu_allocator::MemoryLocation::CpuToGpu,
    }
}

/// Vulkan buffer implementation
pub struct Buffer {
    /// Shared GPU context (device, allocator)
    ctx: Arc<GpuContext>,
    /// Vulkan buffer
    pub(crate) buffer: vk::Buffer,
    /// GPU memory allocation
    allocation: Option<Allocation>,
    /// Buffer size
    size: u64,
}

impl Buffer {
    /// Create a buffer and bind freshly allocated memory to it
    pub(crate) fn new(ctx: Arc<GpuContext>, desc: &BufferDesc) -> Result<Self> {
        if desc.size == 0 {
            return Err(Error::InvalidResource(format!("buffer '{}' has zero size", desc.name)));
        }

        unsafe {
            let create_info = vk::BufferCreateInfo::default()
                .size(desc.size)
                .usage(usage_to_vk(desc.usage))
                .sharing_mode(vk::SharingMode::EXCLUSIVE);

            let buffer = ctx.device.create_buffer(&create_info, None)
                .map_err(|e| engine_err!(ctx.logger, "aurora::vulkan",
                    "Failed to create buffer '{}' of size {} bytes: {:?}", desc.name, desc.size, e))?;

            let requirements = ctx.device.get_buffer_memory_requirements(buffer);
            let allocated = match ctx.allocator.lock() {
                Ok(mut allocator) => allocator.allocate(&AllocationCreateDesc {
                    name: &desc.name,
                    requirements,
                    location: location_to_allocator(desc.location),
                    linear: true,
                    allocation_scheme: AllocationScheme::GpuAllocatorManaged,
                }),
                Err(_) => {
                    ctx.device.destroy_buffer(buffer, None);
                    return Err(Error::BackendError("GPU allocator lock poisoned".to_string()));
                }
            };
            let allocation = match allocated {
                Ok(allocation) => allocation,
                Err(_) => {
                    ctx.device.destroy_buffer(buffer, None);
                    let size_mb = requirements.size as f64 / (1024.0 * 1024.0);
                    engine_error!(ctx.logger, "aurora::vulkan",
                        "Out of GPU memory for buffer '{}' (required: {:.2} MB)", desc.name, size_mb);
                    return Err(Error::OutOfMemory);
                }
            };

            // From here on Drop frees the allocation and the buffer
            let this = Self {
                ctx,
                buffer,
                allocation: Some(allocation),
                size: desc.size,
            };
            if let Some(allocation) = &this.allocation {
                this.ctx.device.bind_buffer_memory(buffer, allocation.memory(), allocation.offset())
                    .map_err(|e| engine_err!(this.ctx.logger, "aurora::vulkan", "Failed to bind buffer memory: {:?}", e))?;
            }
            Ok(this)
        }
    }
}

impl EngineBuffer for Buffer {
    fn size(&self) -> u64 {
        self.size
    }

    fn write(&self, offset: u64, data: &[u8]) -> Result<()> {
        let end = offset.checked_add(data.len() as u64);
        if end.map_or(true, |end| end > self.size) {
            return Err(Error::InvalidResource(format!(
                "write of {} bytes at offset {} exceeds buffer size {}",
                data.len(), offset, self.size
            )));
        }

        let allocation = self.allocation.as_ref()
            .ok_or_else(|| Error::BackendError("Buffer has no allocation".to_string()))?;
        let mapped_ptr = allocation
            .mapped_ptr()
            .ok_or_else(|| Error::InvalidResource("Buffer is not CPU-accessible".to_string()))?
            .as_ptr() as *mut u8;

        unsafe {
            std::ptr::copy_nonoverlapping(data.as_ptr(), mapped_ptr.add(offset as usize), data.len());
        }
        Ok(())
    }
}

impl Drop for Buffer {
    fn drop(&mut self) {
        unsafe {
            // Free GPU memory
            if let Some(allocation) = self.allocation.take() {
                // Don't panic if lock fails - we still need to destroy the buffer
                if let Ok(mut allocator) = self.ctx.allocator.lock() {
                    allocator.free(allocation).ok();
                }
            }

            self.ctx.device.destroy_buffer(self.buffer, None);
        }
    }
}

#[cfg(test)]
#[path = "vulkan_buffer_tests.rs"]
mod tests;
