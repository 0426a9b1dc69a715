/// Swapchain trait - for window presentation

use std::time::Duration;

use crate::error::Result;
use crate::frame::SwapchainFrame;
use crate::graphics_device::{Backend, Extent2D, GraphicsDevice, TextureFormat};

/// Result of acquiring a presentable image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquireOutcome {
    /// Image acquired; the semaphore will be signaled when it is ready
    Acquired(u32),
    /// Image acquired but the surface no longer matches; the semaphore is still signaled
    Suboptimal(u32),
    /// Surface changed, nothing acquired; the swapchain must be recreated
    OutOfDate,
    /// No image became available within the timeout
    NotReady,
}

/// Result of presenting an image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresentOutcome {
    Presented,
    Suboptimal,
    OutOfDate,
}

impl PresentOutcome {
    /// Whether the caller has to recreate the swapchain before the next frame
    pub fn needs_resize(&self) -> bool {
        !matches!(self, PresentOutcome::Presented)
    }
}

/// Swapchain for presenting rendered images to a window
///
/// Owns the presentable images. Their number is chosen by the driver and may
/// change on every `resize()`; every resize also bumps `generation()`, which
/// invalidates all `SwapchainFrame`s created before it.
pub trait Swapchain<B: Backend> {
    /// Number of presentable images (authoritative, queried after creation)
    fn image_count(&self) -> usize;

    /// Current image extent
    fn extent(&self) -> Extent2D;

    /// Pixel format of the images
    fn format(&self) -> TextureFormat;

    /// Incremented by every successful `resize()`
    fn generation(&self) -> u64;

    /// Acquire the next image, signaling `semaphore` when it is ready for writing
    fn acquire_next_image(&mut self, semaphore: &B::Semaphore, timeout: Duration) -> Result<AcquireOutcome>;

    /// Queue the image for presentation after `wait_semaphore` is signaled
    fn present(&mut self, queue: B::Queue, image_index: u32, wait_semaphore: &B::Semaphore) -> Result<PresentOutcome>;

    /// Destroy the image chain and recreate it for the new window size
    ///
    /// Every `SwapchainFrame` must be dropped before this call and rebuilt with
    /// `get_frames()` after it. The device must be idle.
    fn resize(&mut self, width: u32, height: u32) -> Result<()>;

    /// Create a color view of one presentable image
    fn create_color_view(&self, image_index: usize) -> Result<B::ImageView>;

    /// Resize to the surface's current framebuffer size
    fn resize_to_surface(&mut self, surface: &dyn Surface) -> Result<()> {
        let size = surface.framebuffer_size();
        self.resize(size.width, size.height)
    }

    /// One `SwapchainFrame` per image: a fresh color view plus a framebuffer
    /// combining it with the shared depth view
    fn get_frames(
        &self,
        device: &B::Device,
        render_pass: &B::RenderPass,
        depth_view: &B::ImageView,
    ) -> Result<Vec<SwapchainFrame<B>>> {
        let extent = self.extent();
        let generation = self.generation();
        (0..self.image_count())
            .map(|index| {
                let color_view = self.create_color_view(index)?;
                let framebuffer = device.create_framebuffer(render_pass, &color_view, depth_view, extent)?;
                Ok(SwapchainFrame::new(index as u32, generation, extent, color_view, framebuffer))
            })
            .collect()
    }
}

/// Window collaborator
pub trait Surface {
    /// Current framebuffer size in pixels (zero while minimized)
    fn framebuffer_size(&self) -> Extent2D;

    /// Whether the window reported a size change since the last acknowledgement
    fn needs_resize(&self) -> bool;

    /// Clear the pending resize request once the swapchain has been recreated
    fn acknowledge_resize(&self);
}

/// Depth-stencil attachment shared read-only by all swapchain framebuffers
pub trait DepthStencil<B: Backend> {
    /// View referenced by every swapchain framebuffer
    fn view(&self) -> &B::ImageView;

    /// Current extent
    fn extent(&self) -> Extent2D;

    /// Depth format
    fn format(&self) -> TextureFormat;

    /// Recreate the image at a new extent
    ///
    /// Must run before the swapchain frames are rebuilt.
    fn resize(&mut self, extent: Extent2D) -> Result<()>;
}
