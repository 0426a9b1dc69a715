/// DescriptorPool trait and the three frame layouts

use crate::error::Result;
use crate::graphics_device::Backend;

/// Pool that per-frame descriptor sets are allocated from
///
/// The frame core never frees individual sets: it resets the whole pool once per
/// frame and re-allocates every set it needs.
pub trait DescriptorPool<B: Backend> {
    /// Maximum number of sets the pool can hold
    fn capacity(&self) -> u32;

    /// Free every set allocated from the pool
    fn reset(&mut self) -> Result<()>;

    /// Allocate one set with the given layout
    fn allocate(&mut self, layout: &B::DescriptorSetLayout) -> Result<B::DescriptorSet>;

    /// Point `binding` of `set` at a whole uniform buffer
    fn write_uniform_buffer(&self, set: &B::DescriptorSet, binding: u32, buffer: &B::Buffer) -> Result<()>;

    /// Point `binding` of `set` at a combined image sampler
    fn write_image_sampler(
        &self,
        set: &B::DescriptorSet,
        binding: u32,
        view: &B::ImageView,
        sampler: &B::Sampler,
    ) -> Result<()>;
}

/// The global (set 0), material (set 1) and entity (set 2) layouts
///
/// Owned by the pipeline-layout collaborator and shared by all conceptual frames.
pub struct FrameLayouts<B: Backend> {
    pub global: B::DescriptorSetLayout,
    pub material: B::DescriptorSetLayout,
    pub entity: B::DescriptorSetLayout,
}
