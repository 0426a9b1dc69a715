/// CommandList trait - records GPU commands for one submission

use crate::error::Result;
use crate::graphics_device::{Backend, ClearValues, Extent2D, IndexType};

/// Recordable primary command buffer
///
/// The frame core records, in order: copies from the staging buffer, the
/// render pass, pipeline and descriptor binds, vertex/index binds and draws.
pub trait CommandList<B: Backend> {
    /// Discard previous contents (the previous submission must have completed)
    fn reset(&mut self) -> Result<()>;

    /// Start recording
    fn begin(&mut self) -> Result<()>;

    /// Stop recording
    fn end(&mut self) -> Result<()>;

    /// Copy `size` bytes from `src` at `src_offset` to the start of `dst`
    ///
    /// Outside a render pass. The copy is made visible to uniform reads of
    /// later vertex/fragment work in the same submission.
    fn copy_buffer(&mut self, src: &B::Buffer, src_offset: u64, dst: &B::Buffer, size: u64) -> Result<()>;

    /// Begin the render pass on a framebuffer
    fn begin_render_pass(
        &mut self,
        render_pass: &B::RenderPass,
        framebuffer: &B::Framebuffer,
        extent: Extent2D,
        clear: &ClearValues,
    ) -> Result<()>;

    /// End the current render pass
    fn end_render_pass(&mut self) -> Result<()>;

    /// Bind a graphics pipeline; later descriptor binds use its layout
    fn bind_pipeline(&mut self, pipeline: &B::Pipeline) -> Result<()>;

    /// Bind a descriptor set at `set_index` of the bound pipeline's layout
    fn bind_descriptor_set(&mut self, set_index: u32, set: &B::DescriptorSet) -> Result<()>;

    /// Bind a vertex buffer at binding 0
    fn bind_vertex_buffer(&mut self, buffer: &B::Buffer, offset: u64) -> Result<()>;

    /// Bind an index buffer
    fn bind_index_buffer(&mut self, buffer: &B::Buffer, offset: u64, index_type: IndexType) -> Result<()>;

    /// Indexed draw of one instance
    fn draw_indexed(&mut self, index_count: u32, first_index: u32, vertex_offset: i32) -> Result<()>;
}
