/// Backend and GraphicsDevice traits - the seam between the frame core and a GPU API

use crate::error::Result;
use crate::graphics_device::{
    Buffer, BufferDesc, CommandList, DepthStencil, DescriptorPool, Extent2D, Fence, QueueFamily,
    Swapchain,
};

/// Type family of one GPU backend
///
/// The frame core is generic over a `Backend`, so the Vulkan implementation and
/// the test mock plug into the same synchronization code. Every GPU-owning
/// associated type is move-only: nothing in the core duplicates a GPU object.
pub trait Backend: Sized + 'static {
    /// Logical device and queues
    type Device: GraphicsDevice<Self>;
    /// Presentable image chain
    type Swapchain: Swapchain<Self>;
    /// CPU-observable completion signal
    type Fence: Fence;
    /// GPU-only ordering signal
    type Semaphore;
    /// Recordable command buffer
    type CommandList: CommandList<Self>;
    /// GPU buffer
    type Buffer: Buffer;
    /// Pool the per-frame descriptor sets are allocated from
    type DescriptorPool: DescriptorPool<Self>;
    /// Allocated descriptor set (freed by resetting its pool)
    type DescriptorSet;
    /// Layout of a descriptor set
    type DescriptorSetLayout;
    /// Render pass the swapchain framebuffers are compatible with
    type RenderPass;
    /// Image view (color views of swapchain images, depth view)
    type ImageView;
    /// Texture sampler
    type Sampler;
    /// Framebuffer (color view + depth view)
    type Framebuffer;
    /// Graphics pipeline (built by the pipeline collaborator)
    type Pipeline;
    /// Shared depth-stencil attachment
    type DepthStencil: DepthStencil<Self>;
    /// Queue handle
    type Queue: Copy + std::fmt::Debug;
}

/// Logical device of a backend
///
/// Owns the device and its queues; creates the objects the frame core needs.
pub trait GraphicsDevice<B: Backend> {
    /// Block until every queue of the device is idle
    fn wait_idle(&self) -> Result<()>;

    /// Queues of a family (at least one for `Graphics` and `Present`)
    fn queues(&self, family: QueueFamily) -> Vec<B::Queue>;

    /// Create a fence, optionally already signaled
    fn create_fence(&self, signaled: bool) -> Result<B::Fence>;

    /// Create a binary semaphore (unsignaled)
    fn create_semaphore(&self) -> Result<B::Semaphore>;

    /// Create a primary command list with its own resettable pool
    fn create_command_list(&self) -> Result<B::CommandList>;

    /// Create a descriptor pool able to hold `max_sets` sets of the frame layouts
    fn create_descriptor_pool(&self, max_sets: u32) -> Result<B::DescriptorPool>;

    /// Create a buffer
    fn create_buffer(&self, desc: &BufferDesc) -> Result<B::Buffer>;

    /// Create a framebuffer combining a color view and the shared depth view
    fn create_framebuffer(
        &self,
        render_pass: &B::RenderPass,
        color_view: &B::ImageView,
        depth_view: &B::ImageView,
        extent: Extent2D,
    ) -> Result<B::Framebuffer>;

    /// Submit a recorded command list
    ///
    /// The submission waits on `wait_semaphore` at the color-attachment-output
    /// stage, signals `signal_semaphore` and, once all of its work is done,
    /// `fence`. The fence must be unsignaled.
    fn submit(
        &self,
        queue: B::Queue,
        command_list: &B::CommandList,
        wait_semaphore: &B::Semaphore,
        signal_semaphore: &B::Semaphore,
        fence: &B::Fence,
    ) -> Result<()>;
}
