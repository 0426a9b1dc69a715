/// FrameManager - pairs conceptual frames with swapchain images
///
/// Owns the swapchain, one `SwapchainFrame` per presentable image and
/// `max_frames_in_flight` conceptual frames used round robin. Guarantees that
/// a conceptual frame is never re-recorded before its fence signals and that
/// no two conceptual frames write the same image concurrently.

use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::frame::conceptual_frame::{ConceptualFrame, RecordingState, UniformSizes};
use crate::frame::swapchain_frame::{ImageRef, SwapchainFrame};
use crate::frame::sync::{wait_for_fence, FenceWaitPolicy};
use crate::graphics_device::{
    AcquireOutcome, Backend, ClearValues, DepthStencil, FrameLayouts, GraphicsDevice, QueueFamily,
    Surface, Swapchain,
};
use crate::log::SharedLogger;
use crate::{engine_bail, engine_contract, engine_debug, engine_error, engine_info, engine_warn};

/// Ticket for the frame returned by `FrameManager::get_frame()`
///
/// Valid until the matching `present_frame()` or the next swapchain rebuild.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHandle {
    slot: usize,
    image: ImageRef,
}

impl FrameHandle {
    /// Conceptual frame slot
    pub fn slot(&self) -> usize {
        self.slot
    }

    /// Swapchain image the frame renders to
    pub fn image(&self) -> ImageRef {
        self.image
    }

    pub fn image_index(&self) -> u32 {
        self.image.index
    }
}

/// A conceptual frame together with the swapchain frame it is bound to
pub struct ActiveFrame<'a, B: Backend> {
    frame: &'a mut ConceptualFrame<B>,
    target: &'a SwapchainFrame<B>,
}

impl<'a, B: Backend> ActiveFrame<'a, B> {
    /// Swapchain frame being rendered to
    pub fn target(&self) -> &SwapchainFrame<B> {
        self.target
    }

    /// Begin the render pass on the bound image
    pub fn schedule_start(&mut self, render_pass: &B::RenderPass, clear: &ClearValues) -> Result<()> {
        self.frame.schedule_start(render_pass, self.target, clear)
    }
}

impl<'a, B: Backend> Deref for ActiveFrame<'a, B> {
    type Target = ConceptualFrame<B>;

    fn deref(&self) -> &ConceptualFrame<B> {
        self.frame
    }
}

impl<'a, B: Backend> DerefMut for ActiveFrame<'a, B> {
    fn deref_mut(&mut self) -> &mut ConceptualFrame<B> {
        self.frame
    }
}

pub struct FrameManager<B: Backend> {
    logger: SharedLogger,
    policy: FenceWaitPolicy,
    surface: Arc<dyn Surface>,
    // Swapchain frames go before the swapchain whose images they view
    swapchain_frames: Vec<SwapchainFrame<B>>,
    swapchain: B::Swapchain,
    frames: Vec<ConceptualFrame<B>>,
    current: usize,
    graphics_queue: B::Queue,
    present_queue: B::Queue,
}

impl<B: Backend> FrameManager<B> {
    /// Create the conceptual frames and the swapchain frames
    ///
    /// # Arguments
    ///
    /// * `device` - Device the frame resources are created on
    /// * `swapchain` - Swapchain to present to (taken over)
    /// * `surface` - Window the swapchain presents to
    /// * `render_pass` - Render pass the framebuffers must be compatible with
    /// * `depth_view` - Shared depth view of every framebuffer
    /// * `layouts` - Global, material and entity set layouts
    /// * `sizes` - Uniform block sizes
    /// * `config` - Frames in flight and fence wait policy
    /// * `logger` - Logger
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        device: &B::Device,
        swapchain: B::Swapchain,
        surface: Arc<dyn Surface>,
        render_pass: &B::RenderPass,
        depth_view: &B::ImageView,
        layouts: Arc<FrameLayouts<B>>,
        sizes: UniformSizes,
        config: &Config,
        logger: SharedLogger,
    ) -> Result<Self> {
        config.validate()?;

        let graphics_queue = first_queue::<B>(device, QueueFamily::Graphics)?;
        let present_queue = first_queue::<B>(device, QueueFamily::Present)?;

        let frames = (0..config.max_frames_in_flight)
            .map(|slot| ConceptualFrame::new(device, slot, Arc::clone(&layouts), sizes, Arc::clone(&logger)))
            .collect::<Result<Vec<_>>>()?;
        let swapchain_frames = swapchain.get_frames(device, render_pass, depth_view)?;

        let policy = FenceWaitPolicy::from_config(config);
        engine_info!(logger, "aurora::frame",
            "Frame manager created: {} frames in flight, {} swapchain images ({}x{})",
            frames.len(), swapchain_frames.len(), swapchain.extent().width, swapchain.extent().height);
        match policy.deadline() {
            Some(deadline) => engine_debug!(logger, "aurora::frame", "Fence waits give up after {:?}", deadline),
            None => engine_debug!(logger, "aurora::frame", "Fence waits are unbounded"),
        }

        Ok(Self {
            logger,
            policy,
            surface,
            swapchain_frames,
            swapchain,
            frames,
            current: 0,
            graphics_queue,
            present_queue,
        })
    }

    // ===== ACCESSORS =====

    pub fn frames_in_flight(&self) -> usize {
        self.frames.len()
    }

    /// Slot the next `get_frame()` will use
    pub fn current_slot(&self) -> usize {
        self.current
    }

    pub fn conceptual_frame(&self, slot: usize) -> Option<&ConceptualFrame<B>> {
        self.frames.get(slot)
    }

    pub fn swapchain_frames(&self) -> &[SwapchainFrame<B>] {
        &self.swapchain_frames
    }

    pub fn swapchain(&self) -> &B::Swapchain {
        &self.swapchain
    }

    pub fn surface(&self) -> &Arc<dyn Surface> {
        &self.surface
    }

    pub fn graphics_queue(&self) -> B::Queue {
        self.graphics_queue
    }

    pub fn fence_policy(&self) -> FenceWaitPolicy {
        self.policy
    }

    // ===== FRAME PROTOCOL =====

    /// Acquire the next image and pair it with the next conceptual frame
    ///
    /// Returns `Ok(None)` when the swapchain is out of date or suboptimal; the
    /// caller must rebuild the swapchain before trying again. Nothing is
    /// claimed and the round robin does not advance in that case.
    pub fn get_frame(&mut self) -> Result<Option<FrameHandle>> {
        let slot = self.current;
        self.frames[slot].wait_for_completion(&self.policy)?;

        let image_index = match self.acquire(slot)? {
            AcquireOutcome::Acquired(index) => index,
            AcquireOutcome::Suboptimal(index) => {
                // The image-ready semaphore will be signaled although nothing waits on it
                self.frames[slot].retire_image_ready()?;
                engine_debug!(self.logger, "aurora::frame",
                    "Acquire of image {} suboptimal, frame {} dropped", index, slot);
                return Ok(None);
            }
            AcquireOutcome::OutOfDate => {
                engine_debug!(self.logger, "aurora::frame", "Swapchain out of date, frame {} dropped", slot);
                return Ok(None);
            }
            AcquireOutcome::NotReady => {
                return Err(Error::BackendError("acquire returned NotReady after waiting".to_string()));
            }
        };

        let index = image_index as usize;
        if index >= self.swapchain_frames.len() {
            engine_bail!(self.logger, "aurora::frame",
                "Acquired image {} but only {} swapchain frames exist", index, self.swapchain_frames.len());
        }

        // At most one writer per image: wait for whoever rendered to it last
        if let Some(claimant) = self.swapchain_frames[index].claimed_by() {
            if claimant != slot && self.frames[claimant].is_in_flight() {
                wait_for_fence(
                    self.frames[claimant].fence(),
                    &self.policy,
                    &self.logger,
                    &format!("frame {} (previous writer of image {})", claimant, index),
                )?;
            }
            self.swapchain_frames[index].release();
        }

        let image = self.swapchain_frames[index].image_ref();
        self.swapchain_frames[index].claim(slot);
        self.frames[slot].bind(image);
        self.current = (slot + 1) % self.frames.len();

        Ok(Some(FrameHandle { slot, image }))
    }

    /// Acquire with the frame's image-ready semaphore, retrying `NotReady`
    /// under the fence wait policy
    fn acquire(&mut self, slot: usize) -> Result<AcquireOutcome> {
        let timeout = self.policy.timeout;
        let mut stalls = 0u32;
        loop {
            let outcome = self.swapchain.acquire_next_image(self.frames[slot].image_ready(), timeout)?;
            if outcome != AcquireOutcome::NotReady {
                return Ok(outcome);
            }
            stalls += 1;
            engine_warn!(self.logger, "aurora::frame",
                "No swapchain image available after {:?} (stall {})", timeout, stalls);
            if self.policy.max_stalls != 0 && stalls >= self.policy.max_stalls {
                let message = format!("no swapchain image available after {} stalls of {:?}", stalls, timeout);
                engine_error!(self.logger, "aurora::frame", "{}", message);
                return Err(Error::Timeout(message));
            }
        }
    }

    /// The frame behind a handle, with the swapchain frame it renders to
    pub fn frame(&mut self, handle: FrameHandle) -> Result<ActiveFrame<'_, B>> {
        self.check_handle(handle)?;
        let index = handle.image.index as usize;
        Ok(ActiveFrame {
            frame: &mut self.frames[handle.slot],
            target: &self.swapchain_frames[index],
        })
    }

    /// Present the frame's image once its rendering is done
    ///
    /// Returns `true` when the swapchain must be rebuilt: present reported
    /// out-of-date or suboptimal, or the surface has a pending resize. Never
    /// rebuilds by itself. The frame's image binding is cleared on return.
    pub fn present_frame(&mut self, handle: FrameHandle) -> Result<bool> {
        self.check_handle(handle)?;
        let frame = &mut self.frames[handle.slot];
        if frame.state() != RecordingState::InFlight {
            engine_contract!(self.logger, "aurora::frame",
                "Frame {} presented before submit (state {:?})", handle.slot, frame.state());
        }

        let result = self.swapchain.present(self.present_queue, handle.image.index, frame.render_ready());
        frame.unbind();
        let outcome = result?;

        let needs_resize = outcome.needs_resize() || self.surface.needs_resize();
        if needs_resize {
            engine_debug!(self.logger, "aurora::frame",
                "Present of image {}: {:?}, resize requested", handle.image.index, outcome);
        }
        Ok(needs_resize)
    }

    fn check_handle(&self, handle: FrameHandle) -> Result<()> {
        let bound = self.frames.get(handle.slot).and_then(|frame| frame.bound_image());
        let current = self
            .swapchain_frames
            .get(handle.image.index as usize)
            .map_or(false, |target| target.matches(handle.image));
        if bound != Some(handle.image) || !current {
            engine_contract!(self.logger, "aurora::frame",
                "Stale frame handle (slot {}, image {:?})", handle.slot, handle.image);
        }
        Ok(())
    }

    // ===== RESIZE =====

    /// Recreate the swapchain and every swapchain frame for the surface's size
    ///
    /// Waits for the device to go idle, drops the swapchain frames, resizes the
    /// swapchain then the depth-stencil to the new extent, rebuilds the frames
    /// and acknowledges the surface. Returns `false` (and changes nothing) while
    /// the surface is zero-sized.
    pub fn resize_swapchain(
        &mut self,
        device: &B::Device,
        render_pass: &B::RenderPass,
        depth_stencil: &mut B::DepthStencil,
    ) -> Result<bool> {
        let size = self.surface.framebuffer_size();
        if size.is_empty() {
            engine_debug!(self.logger, "aurora::frame", "Surface is zero-sized, resize deferred");
            return Ok(false);
        }

        device.wait_idle()?;
        self.swapchain_frames.clear();
        self.swapchain.resize_to_surface(self.surface.as_ref())?;
        depth_stencil.resize(self.swapchain.extent())?;
        self.rebuild_swapchain_frames(device, render_pass, depth_stencil.view())?;
        self.surface.acknowledge_resize();

        let extent = self.swapchain.extent();
        engine_info!(self.logger, "aurora::frame",
            "Swapchain rebuilt: {}x{}, {} images (generation {})",
            extent.width, extent.height, self.swapchain_frames.len(), self.swapchain.generation());
        Ok(true)
    }

    /// Rebuild the swapchain frames after the swapchain was resized
    ///
    /// The device must be idle. Clears every conceptual frame's binding and
    /// recycles semaphores retired by suboptimal acquires.
    pub fn rebuild_swapchain_frames(
        &mut self,
        device: &B::Device,
        render_pass: &B::RenderPass,
        depth_view: &B::ImageView,
    ) -> Result<()> {
        self.swapchain_frames.clear();
        self.swapchain_frames = self.swapchain.get_frames(device, render_pass, depth_view)?;
        for frame in &mut self.frames {
            frame.on_swapchain_rebuilt(device)?;
        }
        Ok(())
    }

    /// Block until every conceptual frame's last submission has completed
    pub fn wait_all(&mut self) -> Result<()> {
        for frame in &mut self.frames {
            if frame.is_in_flight() {
                frame.wait_for_completion(&self.policy)?;
            }
        }
        Ok(())
    }

    /// Swap the fence wait policy (e.g. `FenceWaitPolicy::unbounded()`)
    pub fn set_fence_policy(&mut self, policy: FenceWaitPolicy) {
        self.policy = policy;
    }
}

fn first_queue<B: Backend>(device: &B::Device, family: QueueFamily) -> Result<B::Queue> {
    device
        .queues(family)
        .first()
        .copied()
        .ok_or_else(|| Error::InitializationFailed(format!("device exposes no {:?} queue", family)))
}

#[cfg(test)]
#[path = "frame_manager_tests.rs"]
mod tests;
