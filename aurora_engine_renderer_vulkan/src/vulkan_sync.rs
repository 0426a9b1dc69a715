/// Fence and Semaphore - Vulkan synchronization primitives

use aurora_engine::aurora::device::{Fence as EngineFence, FenceStatus};
use aurora_engine::aurora::Result;
use aurora_engine::engine_err;
use ash::vk;
use std::sync::Arc;
use std::time::Duration;

use crate::vulkan_context::GpuContext;

/// Convert a wait duration to Vulkan nanoseconds (`Duration::MAX` waits forever)
pub fn timeout_nanos(timeout: Duration) -> u64 {
    u64::try_from(timeout.as_nanos()).unwrap_or(u64::MAX)
}

/// Vulkan fence
pub struct Fence {
    ctx: Arc<GpuContext>,
    pub(crate) fence: vk::Fence,
}

impl Fence {
    pub(crate) fn new(ctx: Arc<GpuContext>, signaled: bool) -> Result<Self> {
        let flags = if signaled {
            vk::FenceCreateFlags::SIGNALED
        } else {
            vk::FenceCreateFlags::empty()
        };
        let create_info = vk::FenceCreateInfo::default().flags(flags);
        let fence = unsafe { ctx.device.create_fence(&create_info, None) }
            .map_err(|e| engine_err!(ctx.logger, "aurora::vulkan", "Failed to create fence: {:?}", e))?;
        Ok(Self { ctx, fence })
    }
}

impl EngineFence for Fence {
    fn wait(&self, timeout: Duration) -> Result<FenceStatus> {
        match unsafe { self.ctx.device.wait_for_fences(&[self.fence], true, timeout_nanos(timeout)) } {
            Ok(()) => Ok(FenceStatus::Signaled),
            Err(vk::Result::TIMEOUT) => Ok(FenceStatus::TimedOut),
            Err(e) => Err(engine_err!(self.ctx.logger, "aurora::vulkan", "Failed to wait for fence: {:?}", e)),
        }
    }

    fn reset(&self) -> Result<()> {
        unsafe { self.ctx.device.reset_fences(&[self.fence]) }
            .map_err(|e| engine_err!(self.ctx.logger, "aurora::vulkan", "Failed to reset fence: {:?}", e))
    }

    fn is_signaled(&self) -> Result<bool> {
        unsafe { self.ctx.device.get_fence_status(self.fence) }
            .map_err(|e| engine_err!(self.ctx.logger, "aurora::vulkan", "Failed to query fence status: {:?}", e))
    }
}

impl Drop for Fence {
    fn drop(&mut self) {
        unsafe {
            self.ctx.device.destroy_fence(self.fence, None);
        }
    }
}

/// Vulkan binary semaphore
pub struct Semaphore {
    ctx: Arc<GpuContext>,
    pub(crate) semaphore: vk::Semaphore,
}

impl Semaphore {
    pub(crate) fn new(ctx: Arc<GpuContext>) -> Result<Self> {
        let create_info = vk::SemaphoreCreateInfo::default();
        let semaphore = unsafe { ctx.device.create_semaphore(&create_info, None) }
            .map_err(|e| engine_err!(ctx.logger, "aurora::vulkan", "Failed to create semaphore: {:?}", e))?;
        Ok(Self { ctx, semaphore })
    }
}

impl Drop for Semaphore {
    fn drop(&mut self) {
        unsafe {
            self.ctx.device.destroy_semaphore(self.semaphore, None);
        }
    }
}

#[cfg(test)]
#[path = "vulkan_sync_tests.rs"]
mod tests;
