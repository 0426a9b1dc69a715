/// SwapchainFrame - one presentable image wrapped with its views and framebuffer

use crate::graphics_device::{Backend, Extent2D};

/// Generation-checked reference to a swapchain image
///
/// Held by a `ConceptualFrame` while it renders to the image. It stops matching
/// any `SwapchainFrame` once the swapchain is resized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageRef {
    pub index: u32,
    pub generation: u64,
}

/// Claim state of a presentable image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSlotState {
    /// No conceptual frame has rendered to the image since the last rebuild
    Free,
    /// The conceptual frame in this slot was the last to submit work writing the
    /// image; its in-flight fence guards the next reuse
    Claimed(usize),
}

/// One per presentable image
///
/// Owns its framebuffer and the color view it wraps; borrows the depth view
/// only through the framebuffer. Created by `Swapchain::get_frames()` and
/// dropped wholesale before every swapchain resize.
pub struct SwapchainFrame<B: Backend> {
    index: u32,
    generation: u64,
    extent: Extent2D,
    // Field order is drop order: the framebuffer goes before the view it references
    framebuffer: B::Framebuffer,
    color_view: B::ImageView,
    claimed_by: Option<usize>,
}

impl<B: Backend> SwapchainFrame<B> {
    pub fn new(
        index: u32,
        generation: u64,
        extent: Extent2D,
        color_view: B::ImageView,
        framebuffer: B::Framebuffer,
    ) -> Self {
        Self {
            index,
            generation,
            extent,
            framebuffer,
            color_view,
            claimed_by: None,
        }
    }

    /// Swapchain image index
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Swapchain generation the frame was built for
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn extent(&self) -> Extent2D {
        self.extent
    }

    pub fn framebuffer(&self) -> &B::Framebuffer {
        &self.framebuffer
    }

    pub fn color_view(&self) -> &B::ImageView {
        &self.color_view
    }

    pub fn image_ref(&self) -> ImageRef {
        ImageRef {
            index: self.index,
            generation: self.generation,
        }
    }

    /// Whether `image` designates this frame (same index, same generation)
    pub fn matches(&self, image: ImageRef) -> bool {
        self.image_ref() == image
    }

    pub fn state(&self) -> ImageSlotState {
        match self.claimed_by {
            Some(slot) => ImageSlotState::Claimed(slot),
            None => ImageSlotState::Free,
        }
    }

    /// Conceptual frame slot whose fence currently guards the image
    pub fn claimed_by(&self) -> Option<usize> {
        self.claimed_by
    }

    /// Record `slot` as the image's claimant, returning the previous one
    pub fn claim(&mut self, slot: usize) -> Option<usize> {
        self.claimed_by.replace(slot)
    }

    /// Forget the claimant (its fence has been waited on)
    pub fn release(&mut self) {
        self.claimed_by = None;
    }
}

#[cfg(test)]
#[path = "swapchain_frame_tests.rs"]
mod tests;
