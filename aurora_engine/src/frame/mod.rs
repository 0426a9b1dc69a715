//! Frame module - swapchain frames, conceptual frames and the frame manager.
//!
//! The synchronization core of the engine: which conceptual frame records
//! next, which swapchain image it renders to, and which fences and
//! semaphores order the CPU, the GPU and the presentation engine.

mod conceptual_frame;
mod frame_manager;
mod swapchain_frame;
mod sync;

pub use conceptual_frame::{
    ConceptualFrame, EntityId, MaterialId, RecordingState, UniformSizes,
    MIN_DESCRIPTOR_SETS, STAGING_ALIGNMENT,
};
pub use frame_manager::{ActiveFrame, FrameHandle, FrameManager};
pub use swapchain_frame::{ImageRef, ImageSlotState, SwapchainFrame};
pub use sync::{wait_for_fence, FenceWaitPolicy};
