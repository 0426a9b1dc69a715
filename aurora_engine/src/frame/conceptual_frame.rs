/// ConceptualFrame - the GPU resources of one frame-in-flight slot
///
/// A conceptual frame owns everything one frame needs to record and submit:
/// a command list, a descriptor pool, a staging buffer, the camera, material
/// and entity uniform buffers, two semaphores and the in-flight fence. It is
/// reused every `max_frames_in_flight` frames, always after its fence has been
/// waited on.
///
/// Per frame, the caller drives it through a fixed protocol:
///
/// ```text
/// prepare_render(n_materials, n_objects)
/// upload_camera_data / upload_material_data / upload_entity_data
/// schedule_start -> schedule_pipeline -> schedule_global
///     (schedule_material -> schedule_entity -> schedule_vertex_buffer -> schedule_draw)*
/// schedule_stop -> submit
/// ```
///
/// Calls out of this order fail with `Error::ContractViolation`.

use std::sync::Arc;

use bytemuck::Pod;
use rustc_hash::FxHashMap;

use crate::engine_contract;
use crate::engine_debug;
use crate::error::{Error, Result};
use crate::frame::swapchain_frame::{ImageRef, SwapchainFrame};
use crate::frame::sync::{wait_for_fence, FenceWaitPolicy};
use crate::graphics_device::{
    Backend, Buffer, BufferDesc, ClearValues, CommandList, DescriptorPool, Fence, FrameLayouts,
    GraphicsDevice, IndexType, ENTITY_SET, FIRST_TEXTURE_BINDING, GLOBAL_SET, LAST_TEXTURE_BINDING,
    MATERIAL_SET, UNIFORM_BINDING,
};
use crate::log::SharedLogger;

slotmap::new_key_type! {
    /// Identity of a material, stable across frames
    pub struct MaterialId;
    /// Identity of a drawable entity, stable across frames
    pub struct EntityId;
}

/// Alignment of every upload inside the staging buffer
pub const STAGING_ALIGNMENT: u64 = 256;

/// Smallest descriptor pool a frame creates
pub const MIN_DESCRIPTOR_SETS: u32 = 16;

fn align_up(value: u64, alignment: u64) -> u64 {
    value.div_ceil(alignment) * alignment
}

// ============================================================================
// Uniform sizes and staging layout
// ============================================================================

/// Byte sizes of the camera, material and entity uniform blocks
///
/// The staging buffer is a linear arena holding one frame's uploads:
///
/// ```text
/// [camera][material 0][material 1]...[entity 0][entity 1]...
/// ```
///
/// every block starting on a `STAGING_ALIGNMENT` boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UniformSizes {
    pub camera: u64,
    pub material: u64,
    pub entity: u64,
}

impl UniformSizes {
    pub fn new(camera: u64, material: u64, entity: u64) -> Self {
        Self { camera, material, entity }
    }

    /// Sizes of three `Pod` uniform structs
    pub fn of<C: Pod, M: Pod, E: Pod>() -> Self {
        Self::new(
            std::mem::size_of::<C>() as u64,
            std::mem::size_of::<M>() as u64,
            std::mem::size_of::<E>() as u64,
        )
    }

    fn camera_stride(&self) -> u64 {
        align_up(self.camera, STAGING_ALIGNMENT)
    }

    fn material_stride(&self) -> u64 {
        align_up(self.material, STAGING_ALIGNMENT)
    }

    fn entity_stride(&self) -> u64 {
        align_up(self.entity, STAGING_ALIGNMENT)
    }

    /// Staging bytes needed for one frame with the given counts
    pub fn staging_size(&self, n_materials: usize, n_entities: usize) -> u64 {
        self.camera_stride()
            + n_materials as u64 * self.material_stride()
            + n_entities as u64 * self.entity_stride()
    }

    /// Staging offset of material `index`
    pub fn material_offset(&self, index: usize) -> u64 {
        self.camera_stride() + index as u64 * self.material_stride()
    }

    /// Staging offset of entity `index`, given the frame's material count
    pub fn entity_offset(&self, n_materials: usize, index: usize) -> u64 {
        self.staging_size(n_materials, 0) + index as u64 * self.entity_stride()
    }
}

// ============================================================================
// Recording state
// ============================================================================

/// Where a conceptual frame is in its per-frame protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordingState {
    /// Fence waited on, not bound to an image
    Idle,
    /// Bound to an acquired swapchain image
    Acquired,
    /// `prepare_render` done; uploads allowed
    Recording,
    /// Between `schedule_start` and `schedule_stop`
    InRenderPass,
    /// Command list ended, ready to submit
    Recorded,
    /// Submitted; the fence guards every resource of the frame
    InFlight,
}

// ============================================================================
// ConceptualFrame
// ============================================================================

pub struct ConceptualFrame<B: Backend> {
    slot: usize,
    logger: SharedLogger,
    layouts: Arc<FrameLayouts<B>>,
    sizes: UniformSizes,

    state: RecordingState,
    pipeline_bound: bool,
    bound_image: Option<ImageRef>,

    // Byte size of the copy recorded for each block this frame
    camera_copy: Option<u64>,
    material_copies: Vec<u64>,
    entity_copies: Vec<u64>,

    material_indices: FxHashMap<MaterialId, usize>,
    entity_indices: FxHashMap<EntityId, usize>,

    // Sets are freed by the pool reset; they go before the pool
    global_set: Option<B::DescriptorSet>,
    material_sets: Vec<B::DescriptorSet>,
    entity_sets: Vec<B::DescriptorSet>,
    descriptor_pool: B::DescriptorPool,

    staging_buffer: B::Buffer,
    camera_buffer: B::Buffer,
    material_buffers: Vec<B::Buffer>,
    entity_buffers: Vec<B::Buffer>,
    command_list: B::CommandList,

    image_ready: B::Semaphore,
    spare_image_ready: Option<B::Semaphore>,
    retired_semaphores: Vec<B::Semaphore>,
    render_ready: B::Semaphore,
    in_flight: B::Fence,
}

impl<B: Backend> ConceptualFrame<B> {
    /// Create the resources of frame slot `slot`
    ///
    /// The in-flight fence starts signaled so the first wait returns at once.
    pub fn new(
        device: &B::Device,
        slot: usize,
        layouts: Arc<FrameLayouts<B>>,
        sizes: UniformSizes,
        logger: SharedLogger,
    ) -> Result<Self> {
        if sizes.camera == 0 || sizes.material == 0 || sizes.entity == 0 {
            return Err(Error::InitializationFailed(format!(
                "uniform sizes must be non-zero (camera {}, material {}, entity {})",
                sizes.camera, sizes.material, sizes.entity
            )));
        }

        let frame = Self {
            slot,
            layouts,
            sizes,
            state: RecordingState::Idle,
            pipeline_bound: false,
            bound_image: None,
            camera_copy: None,
            material_copies: Vec::new(),
            entity_copies: Vec::new(),
            material_indices: FxHashMap::default(),
            entity_indices: FxHashMap::default(),
            global_set: None,
            material_sets: Vec::new(),
            entity_sets: Vec::new(),
            descriptor_pool: device.create_descriptor_pool(MIN_DESCRIPTOR_SETS)?,
            staging_buffer: device.create_buffer(&BufferDesc::staging(
                format!("frame{}_staging", slot),
                sizes.staging_size(0, 0),
            ))?,
            camera_buffer: device.create_buffer(&BufferDesc::uniform(
                format!("frame{}_camera", slot),
                sizes.camera,
            ))?,
            material_buffers: Vec::new(),
            entity_buffers: Vec::new(),
            command_list: device.create_command_list()?,
            image_ready: device.create_semaphore()?,
            spare_image_ready: Some(device.create_semaphore()?),
            retired_semaphores: Vec::new(),
            render_ready: device.create_semaphore()?,
            in_flight: device.create_fence(true)?,
            logger,
        };

        engine_debug!(frame.logger, "aurora::frame", "Conceptual frame {} created", slot);
        Ok(frame)
    }

    // ===== ACCESSORS =====

    pub fn slot(&self) -> usize {
        self.slot
    }

    pub fn state(&self) -> RecordingState {
        self.state
    }

    /// Swapchain image the frame renders to (set on acquire, cleared after present)
    pub fn bound_image(&self) -> Option<ImageRef> {
        self.bound_image
    }

    pub fn material_index(&self, id: MaterialId) -> Option<usize> {
        self.material_indices.get(&id).copied()
    }

    pub fn entity_index(&self, id: EntityId) -> Option<usize> {
        self.entity_indices.get(&id).copied()
    }

    pub fn material_buffer_count(&self) -> usize {
        self.material_buffers.len()
    }

    pub fn entity_buffer_count(&self) -> usize {
        self.entity_buffers.len()
    }

    pub fn material_set_count(&self) -> usize {
        self.material_sets.len()
    }

    pub fn entity_set_count(&self) -> usize {
        self.entity_sets.len()
    }

    pub fn has_global_set(&self) -> bool {
        self.global_set.is_some()
    }

    pub fn descriptor_capacity(&self) -> u32 {
        self.descriptor_pool.capacity()
    }

    pub fn staging_size(&self) -> u64 {
        self.staging_buffer.size()
    }

    pub fn staging_buffer(&self) -> &B::Buffer {
        &self.staging_buffer
    }

    pub fn command_list(&self) -> &B::CommandList {
        &self.command_list
    }

    pub fn fence(&self) -> &B::Fence {
        &self.in_flight
    }

    pub fn image_ready(&self) -> &B::Semaphore {
        &self.image_ready
    }

    pub fn render_ready(&self) -> &B::Semaphore {
        &self.render_ready
    }

    // ===== FRAME MANAGER HOOKS =====

    /// Wait until the GPU has finished the frame's previous submission
    pub(crate) fn wait_for_completion(&mut self, policy: &FenceWaitPolicy) -> Result<()> {
        match self.state {
            RecordingState::Idle => Ok(()),
            RecordingState::InFlight => {
                wait_for_fence(&self.in_flight, policy, &self.logger, &format!("frame {}", self.slot))?;
                self.state = RecordingState::Idle;
                Ok(())
            }
            state => {
                engine_contract!(self.logger, "aurora::frame",
                    "Frame {} was handed out but never submitted (state {:?})", self.slot, state)
            }
        }
    }

    /// Whether the frame's last submission may still be executing
    pub(crate) fn is_in_flight(&self) -> bool {
        self.state == RecordingState::InFlight
    }

    pub(crate) fn bind(&mut self, image: ImageRef) {
        self.bound_image = Some(image);
        self.state = RecordingState::Acquired;
    }

    pub(crate) fn unbind(&mut self) {
        self.bound_image = None;
    }

    /// Swap the image-ready semaphore left signaled by a suboptimal acquire
    /// for the spare one
    ///
    /// The signaled semaphore is kept until `on_swapchain_rebuilt` runs after a
    /// device-idle wait.
    pub(crate) fn retire_image_ready(&mut self) -> Result<()> {
        let spare = match self.spare_image_ready.take() {
            Some(spare) => spare,
            None => {
                engine_contract!(self.logger, "aurora::frame",
                    "Frame {} acquired suboptimally twice without a swapchain rebuild", self.slot)
            }
        };
        let stale = std::mem::replace(&mut self.image_ready, spare);
        self.retired_semaphores.push(stale);
        engine_debug!(self.logger, "aurora::frame",
            "Frame {}: image-ready semaphore retired after suboptimal acquire", self.slot);
        Ok(())
    }

    pub(crate) fn has_retired_semaphores(&self) -> bool {
        !self.retired_semaphores.is_empty()
    }

    /// Reset the frame after a swapchain rebuild (device idle)
    ///
    /// Drops the image binding, abandons any unsubmitted recording, destroys
    /// retired semaphores and replenishes the spare.
    pub(crate) fn on_swapchain_rebuilt(&mut self, device: &B::Device) -> Result<()> {
        self.bound_image = None;
        if self.state != RecordingState::InFlight {
            self.state = RecordingState::Idle;
        }
        self.retired_semaphores.clear();
        if self.spare_image_ready.is_none() {
            self.spare_image_ready = Some(device.create_semaphore()?);
        }
        Ok(())
    }

    fn require_state(&self, expected: RecordingState, operation: &str) -> Result<()> {
        if self.state != expected {
            engine_contract!(self.logger, "aurora::frame",
                "Frame {}: {} requires state {:?}, frame is {:?}", self.slot, operation, expected, self.state);
        }
        Ok(())
    }

    fn require_pipeline(&self, operation: &str) -> Result<()> {
        self.require_state(RecordingState::InRenderPass, operation)?;
        if !self.pipeline_bound {
            engine_contract!(self.logger, "aurora::frame",
                "Frame {}: {} called before schedule_pipeline", self.slot, operation);
        }
        Ok(())
    }

    // ===== PREPARE =====

    /// Reset the frame for a new recording with `n_materials` materials and
    /// `n_objects` entities
    ///
    /// Clears the index maps, resizes the material and entity buffer arrays to
    /// exactly the requested counts, resets the descriptor pool (recreating it
    /// when too small) and allocates one global set, `n_materials` material
    /// sets and `n_objects` entity sets, then resets and begins the command list.
    pub fn prepare_render(&mut self, device: &B::Device, n_materials: usize, n_objects: usize) -> Result<()> {
        match self.state {
            RecordingState::Acquired | RecordingState::Recording | RecordingState::Recorded => {}
            state => {
                engine_contract!(self.logger, "aurora::frame",
                    "Frame {}: prepare_render on a frame in state {:?}", self.slot, state)
            }
        }

        self.material_indices.clear();
        self.entity_indices.clear();
        self.camera_copy = None;
        self.material_copies.clear();
        self.entity_copies.clear();
        self.pipeline_bound = false;

        // Uniform buffers
        let slot = self.slot;
        resize_uniform_buffers::<B>(device, &mut self.material_buffers, n_materials, self.sizes.material,
            |i| format!("frame{}_material{}", slot, i))?;
        resize_uniform_buffers::<B>(device, &mut self.entity_buffers, n_objects, self.sizes.entity,
            |i| format!("frame{}_entity{}", slot, i))?;

        // Staging arena
        let staging_needed = self.sizes.staging_size(n_materials, n_objects);
        if self.staging_buffer.size() < staging_needed {
            let size = staging_needed.next_power_of_two();
            self.staging_buffer = device.create_buffer(&BufferDesc::staging(format!("frame{}_staging", slot), size))?;
            engine_debug!(self.logger, "aurora::frame", "Frame {}: staging buffer grown to {} bytes", slot, size);
        }

        // Descriptor sets
        self.global_set = None;
        self.material_sets.clear();
        self.entity_sets.clear();

        let sets_needed = 1 + n_materials + n_objects;
        let sets_needed = u32::try_from(sets_needed).map_err(|_| {
            Error::InvalidResource(format!("{} descriptor sets exceed the pool limit", sets_needed))
        })?;
        if self.descriptor_pool.capacity() < sets_needed {
            let capacity = sets_needed.next_power_of_two().max(MIN_DESCRIPTOR_SETS);
            self.descriptor_pool = device.create_descriptor_pool(capacity)?;
            engine_debug!(self.logger, "aurora::frame",
                "Frame {}: descriptor pool recreated with {} sets", slot, capacity);
        } else {
            self.descriptor_pool.reset()?;
        }

        self.global_set = Some(self.descriptor_pool.allocate(&self.layouts.global)?);
        for _ in 0..n_materials {
            let set = self.descriptor_pool.allocate(&self.layouts.material)?;
            self.material_sets.push(set);
        }
        for _ in 0..n_objects {
            let set = self.descriptor_pool.allocate(&self.layouts.entity)?;
            self.entity_sets.push(set);
        }

        // Command list
        self.command_list.reset()?;
        self.command_list.begin()?;

        self.state = RecordingState::Recording;
        Ok(())
    }

    // ===== UPLOADS =====

    /// Stage the camera block and bind it to the global set
    pub fn upload_camera_data<T: Pod>(&mut self, data: &T) -> Result<()> {
        self.require_state(RecordingState::Recording, "upload_camera_data")?;
        let bytes = bytemuck::bytes_of(data);
        self.check_size("camera", bytes.len(), self.sizes.camera)?;

        let set = match &self.global_set {
            Some(set) => set,
            None => engine_contract!(self.logger, "aurora::frame", "Frame {}: global set missing", self.slot),
        };
        self.check_repeat("camera", bytes.len(), self.camera_copy)?;
        stage_upload::<B>(&self.staging_buffer, &mut self.command_list, 0, bytes, &self.camera_buffer,
            self.camera_copy.is_none())?;
        self.descriptor_pool.write_uniform_buffer(set, UNIFORM_BINDING, &self.camera_buffer)?;

        if self.camera_copy.is_none() {
            self.camera_copy = Some(bytes.len() as u64);
        }
        Ok(())
    }

    /// Stage a material block and bind it, plus up to two textures, to the
    /// material's set
    ///
    /// Returns the material's dense index for this frame. Uploading the same
    /// material again reuses its index and only rewrites the staged bytes.
    ///
    /// Texture bindings left over by a material with a single texture are
    /// filled with that texture. A material without textures leaves both
    /// bindings unwritten, so its pipeline must not sample them.
    pub fn upload_material_data<T: Pod>(
        &mut self,
        id: MaterialId,
        data: &T,
        textures: &[(&B::ImageView, &B::Sampler)],
    ) -> Result<usize> {
        self.require_state(RecordingState::Recording, "upload_material_data")?;
        let bytes = bytemuck::bytes_of(data);
        self.check_size("material", bytes.len(), self.sizes.material)?;

        let max_textures = (LAST_TEXTURE_BINDING - FIRST_TEXTURE_BINDING + 1) as usize;
        if textures.len() > max_textures {
            engine_contract!(self.logger, "aurora::frame",
                "Frame {}: material has {} textures, at most {} are supported", self.slot, textures.len(), max_textures);
        }

        let (index, recorded) = match self.material_indices.get(&id) {
            Some(&index) => (index, Some(self.material_copies[index])),
            None => {
                let index = self.material_indices.len();
                if index >= self.material_buffers.len() {
                    engine_contract!(self.logger, "aurora::frame",
                        "Frame {}: material {} exceeds the {} prepared materials",
                        self.slot, index, self.material_buffers.len());
                }
                (index, None)
            }
        };
        self.check_repeat("material", bytes.len(), recorded)?;

        let offset = self.sizes.material_offset(index);
        let buffer = &self.material_buffers[index];
        let set = &self.material_sets[index];
        stage_upload::<B>(&self.staging_buffer, &mut self.command_list, offset, bytes, buffer, recorded.is_none())?;
        self.descriptor_pool.write_uniform_buffer(set, UNIFORM_BINDING, buffer)?;
        if let Some(&last) = textures.last() {
            let padding = std::iter::repeat(last).take(max_textures - textures.len());
            for (binding, (view, sampler)) in (FIRST_TEXTURE_BINDING..).zip(textures.iter().copied().chain(padding)) {
                self.descriptor_pool.write_image_sampler(set, binding, view, sampler)?;
            }
        }

        if recorded.is_none() {
            self.material_indices.insert(id, index);
            self.material_copies.push(bytes.len() as u64);
        }
        Ok(index)
    }

    /// Stage an entity block and bind it to the entity's set
    ///
    /// Returns the entity's dense index for this frame.
    pub fn upload_entity_data<T: Pod>(&mut self, id: EntityId, data: &T) -> Result<usize> {
        self.require_state(RecordingState::Recording, "upload_entity_data")?;
        let bytes = bytemuck::bytes_of(data);
        self.check_size("entity", bytes.len(), self.sizes.entity)?;

        let (index, recorded) = match self.entity_indices.get(&id) {
            Some(&index) => (index, Some(self.entity_copies[index])),
            None => {
                let index = self.entity_indices.len();
                if index >= self.entity_buffers.len() {
                    engine_contract!(self.logger, "aurora::frame",
                        "Frame {}: entity {} exceeds the {} prepared entities",
                        self.slot, index, self.entity_buffers.len());
                }
                (index, None)
            }
        };
        self.check_repeat("entity", bytes.len(), recorded)?;

        let offset = self.sizes.entity_offset(self.material_buffers.len(), index);
        let buffer = &self.entity_buffers[index];
        stage_upload::<B>(&self.staging_buffer, &mut self.command_list, offset, bytes, buffer, recorded.is_none())?;
        self.descriptor_pool.write_uniform_buffer(&self.entity_sets[index], UNIFORM_BINDING, buffer)?;

        if recorded.is_none() {
            self.entity_indices.insert(id, index);
            self.entity_copies.push(bytes.len() as u64);
        }
        Ok(index)
    }

    /// A repeated upload reuses the copy already recorded, which must cover
    /// the new bytes
    fn check_repeat(&self, kind: &str, actual: usize, recorded: Option<u64>) -> Result<()> {
        if let Some(recorded) = recorded {
            if actual as u64 > recorded {
                engine_contract!(self.logger, "aurora::frame",
                    "Frame {}: {} re-uploaded with {} bytes, first upload this frame was {}",
                    self.slot, kind, actual, recorded);
            }
        }
        Ok(())
    }

    fn check_size(&self, kind: &str, actual: usize, capacity: u64) -> Result<()> {
        if actual as u64 > capacity {
            engine_contract!(self.logger, "aurora::frame",
                "Frame {}: {} data is {} bytes, its uniform buffer holds {}", self.slot, kind, actual, capacity);
        }
        Ok(())
    }

    // ===== SCHEDULING =====

    /// Begin the render pass on the bound swapchain image
    pub fn schedule_start(
        &mut self,
        render_pass: &B::RenderPass,
        target: &SwapchainFrame<B>,
        clear: &ClearValues,
    ) -> Result<()> {
        self.require_state(RecordingState::Recording, "schedule_start")?;
        if self.bound_image != Some(target.image_ref()) {
            engine_contract!(self.logger, "aurora::frame",
                "Frame {}: schedule_start on image {:?}, frame is bound to {:?}",
                self.slot, target.image_ref(), self.bound_image);
        }
        self.command_list.begin_render_pass(render_pass, target.framebuffer(), target.extent(), clear)?;
        self.state = RecordingState::InRenderPass;
        Ok(())
    }

    pub fn schedule_pipeline(&mut self, pipeline: &B::Pipeline) -> Result<()> {
        self.require_state(RecordingState::InRenderPass, "schedule_pipeline")?;
        self.command_list.bind_pipeline(pipeline)?;
        self.pipeline_bound = true;
        Ok(())
    }

    /// Bind the global set (set 0)
    pub fn schedule_global(&mut self) -> Result<()> {
        self.require_pipeline("schedule_global")?;
        if self.camera_copy.is_none() {
            engine_contract!(self.logger, "aurora::frame",
                "Frame {}: schedule_global before upload_camera_data", self.slot);
        }
        if let Some(set) = &self.global_set {
            self.command_list.bind_descriptor_set(GLOBAL_SET, set)?;
        }
        Ok(())
    }

    /// Bind a material uploaded this frame (set 1)
    pub fn schedule_material(&mut self, id: MaterialId) -> Result<()> {
        self.require_pipeline("schedule_material")?;
        let index = match self.material_indices.get(&id) {
            Some(&index) => index,
            None => engine_contract!(self.logger, "aurora::frame",
                "Frame {}: material {:?} scheduled but not uploaded this frame", self.slot, id),
        };
        self.command_list.bind_descriptor_set(MATERIAL_SET, &self.material_sets[index])
    }

    /// Bind an entity uploaded this frame (set 2)
    pub fn schedule_entity(&mut self, id: EntityId) -> Result<()> {
        self.require_pipeline("schedule_entity")?;
        let index = match self.entity_indices.get(&id) {
            Some(&index) => index,
            None => engine_contract!(self.logger, "aurora::frame",
                "Frame {}: entity {:?} scheduled but not uploaded this frame", self.slot, id),
        };
        self.command_list.bind_descriptor_set(ENTITY_SET, &self.entity_sets[index])
    }

    pub fn schedule_vertex_buffer(
        &mut self,
        vertex_buffer: &B::Buffer,
        index_buffer: &B::Buffer,
        index_type: IndexType,
    ) -> Result<()> {
        self.require_state(RecordingState::InRenderPass, "schedule_vertex_buffer")?;
        self.command_list.bind_vertex_buffer(vertex_buffer, 0)?;
        self.command_list.bind_index_buffer(index_buffer, 0, index_type)
    }

    pub fn schedule_draw(&mut self, index_count: u32, first_index: u32, vertex_offset: i32) -> Result<()> {
        self.require_pipeline("schedule_draw")?;
        self.command_list.draw_indexed(index_count, first_index, vertex_offset)
    }

    /// End the render pass and the command list
    pub fn schedule_stop(&mut self) -> Result<()> {
        self.require_state(RecordingState::InRenderPass, "schedule_stop")?;
        self.command_list.end_render_pass()?;
        self.command_list.end()?;
        self.pipeline_bound = false;
        self.state = RecordingState::Recorded;
        Ok(())
    }

    // ===== SUBMIT =====

    /// Reset the in-flight fence and submit the recorded command list
    ///
    /// The submission waits on image-ready at the color-attachment-output
    /// stage and signals render-ready and the fence.
    pub fn submit(&mut self, device: &B::Device, queue: B::Queue) -> Result<()> {
        self.require_state(RecordingState::Recorded, "submit")?;
        self.in_flight.reset()?;
        device.submit(queue, &self.command_list, &self.image_ready, &self.render_ready, &self.in_flight)?;
        self.state = RecordingState::InFlight;
        Ok(())
    }
}

/// Grow or shrink `buffers` to exactly `count` uniform buffers of `size` bytes
fn resize_uniform_buffers<B: Backend>(
    device: &B::Device,
    buffers: &mut Vec<B::Buffer>,
    count: usize,
    size: u64,
    name: impl Fn(usize) -> String,
) -> Result<()> {
    buffers.truncate(count);
    while buffers.len() < count {
        let buffer = device.create_buffer(&BufferDesc::uniform(name(buffers.len()), size))?;
        buffers.push(buffer);
    }
    Ok(())
}

/// Write `bytes` into the staging arena and record the copy into `dst`
/// Write `bytes` to the staging arena at `offset`, recording the copy into
/// `dst` when `record_copy` is set
///
/// A block copied once per frame needs no transfer-to-transfer barrier: the
/// recorded copy reads whatever the staging arena holds at execution time.
fn stage_upload<B: Backend>(
    staging: &B::Buffer,
    command_list: &mut B::CommandList,
    offset: u64,
    bytes: &[u8],
    dst: &B::Buffer,
    record_copy: bool,
) -> Result<()> {
    staging.write(offset, bytes)?;
    if record_copy {
        command_list.copy_buffer(staging, offset, dst, bytes.len() as u64)?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "conceptual_frame_tests.rs"]
mod tests;
