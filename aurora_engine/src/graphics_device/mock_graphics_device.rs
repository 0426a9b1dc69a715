/// Mock backend for unit tests (no GPU required)
///
/// Every operation the frame core performs is appended to a shared event log
/// (`MockRecorder`), so tests can assert on ordering (fence waits before
/// command-list resets, claimant waits before image reuse, ...). Acquire and
/// present outcomes can be scripted to simulate out-of-date surfaces.
///
/// GPU completion model: a submitted fence completes the first time it is
/// waited on, unless the recorder simulates a GPU hang.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::error::{Error, Result};
use crate::graphics_device::{
    AcquireOutcome, Backend, Buffer, BufferDesc, ClearValues, CommandList, DepthStencil,
    DescriptorPool, Extent2D, Fence, FenceStatus, FrameLayouts, GraphicsDevice, IndexType,
    MemoryLocation, PresentOutcome, QueueFamily, Surface, Swapchain, TextureFormat,
};

/// Queue handle of the graphics family
pub const MOCK_GRAPHICS_QUEUE: u32 = 0;
/// Queue handle of the present family
pub const MOCK_PRESENT_QUEUE: u32 = 1;

// ============================================================================
// Event log
// ============================================================================

/// One recorded backend operation
#[derive(Debug, Clone, PartialEq)]
pub enum MockEvent {
    FenceWait { fence: u32, status: FenceStatus },
    FenceReset { fence: u32 },
    SemaphoreCreated { semaphore: u32 },
    CommandListReset { list: u32 },
    CommandListBegin { list: u32 },
    CommandListEnd { list: u32 },
    CopyBuffer { list: u32, src: u32, src_offset: u64, dst: u32, size: u64 },
    BeginRenderPass { list: u32, framebuffer: u32 },
    EndRenderPass { list: u32 },
    BindPipeline { list: u32, pipeline: u32 },
    BindDescriptorSet { list: u32, set_index: u32, set: u32 },
    BindVertexBuffer { list: u32, buffer: u32 },
    BindIndexBuffer { list: u32, buffer: u32 },
    DrawIndexed { list: u32, index_count: u32 },
    Submit { queue: u32, list: u32, wait_semaphore: u32, signal_semaphore: u32, fence: u32 },
    Acquire { semaphore: u32, outcome: AcquireOutcome },
    Present { image_index: u32, wait_semaphore: u32, outcome: PresentOutcome },
    DescriptorPoolCreated { pool: u32, capacity: u32 },
    DescriptorPoolReset { pool: u32 },
    DescriptorSetAllocated { pool: u32, set: u32, layout: &'static str },
    DescriptorWrite { set: u32, binding: u32 },
    BufferCreated { buffer: u32, name: String, size: u64 },
    WaitIdle,
    SwapchainResized { width: u32, height: u32, image_count: usize },
    DepthResized { width: u32, height: u32 },
}

#[derive(Default)]
struct MockState {
    events: Vec<MockEvent>,
    next_id: u32,
    acquire_script: VecDeque<AcquireOutcome>,
    present_script: VecDeque<PresentOutcome>,
    gpu_hang: bool,
    image_count_after_resize: Option<usize>,
}

/// Shared event log and script of a mock device
#[derive(Clone, Default)]
pub struct MockRecorder {
    state: Arc<Mutex<MockState>>,
}

impl MockRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&self) -> u32 {
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        state.next_id
    }

    fn record(&self, event: MockEvent) {
        self.state.lock().unwrap().events.push(event);
    }

    /// Snapshot of every recorded event
    pub fn events(&self) -> Vec<MockEvent> {
        self.state.lock().unwrap().events.clone()
    }

    /// Forget the recorded events (scripts are kept)
    pub fn clear_events(&self) {
        self.state.lock().unwrap().events.clear();
    }

    /// Number of recorded events matching a predicate
    pub fn count(&self, predicate: impl Fn(&MockEvent) -> bool) -> usize {
        self.state.lock().unwrap().events.iter().filter(|e| predicate(e)).count()
    }

    /// Queue the outcome of a future acquire (consumed in order)
    pub fn script_acquire(&self, outcome: AcquireOutcome) {
        self.state.lock().unwrap().acquire_script.push_back(outcome);
    }

    /// Queue the outcome of a future present (consumed in order)
    pub fn script_present(&self, outcome: PresentOutcome) {
        self.state.lock().unwrap().present_script.push_back(outcome);
    }

    /// While set, submitted fences never signal
    pub fn set_gpu_hang(&self, hang: bool) {
        self.state.lock().unwrap().gpu_hang = hang;
    }

    /// Image count the swapchain reports after its next resize
    pub fn set_image_count_after_resize(&self, count: usize) {
        self.state.lock().unwrap().image_count_after_resize = Some(count);
    }

    fn gpu_hang(&self) -> bool {
        self.state.lock().unwrap().gpu_hang
    }
}

// ============================================================================
// Backend
// ============================================================================

/// Type family of the mock backend
pub struct MockBackend;

impl Backend for MockBackend {
    type Device = MockDevice;
    type Swapchain = MockSwapchain;
    type Fence = MockFence;
    type Semaphore = MockSemaphore;
    type CommandList = MockCommandList;
    type Buffer = MockBuffer;
    type DescriptorPool = MockDescriptorPool;
    type DescriptorSet = MockDescriptorSet;
    type DescriptorSetLayout = MockDescriptorSetLayout;
    type RenderPass = MockRenderPass;
    type ImageView = MockImageView;
    type Sampler = MockSampler;
    type Framebuffer = MockFramebuffer;
    type Pipeline = MockPipeline;
    type DepthStencil = MockDepthStencil;
    type Queue = u32;
}

// ============================================================================
// Plain handles
// ============================================================================

#[derive(Debug)]
pub struct MockSemaphore {
    pub id: u32,
}

#[derive(Debug)]
pub struct MockDescriptorSet {
    pub id: u32,
    pub layout: &'static str,
}

#[derive(Debug)]
pub struct MockDescriptorSetLayout {
    pub name: &'static str,
}

#[derive(Debug)]
pub struct MockRenderPass {
    pub id: u32,
}

#[derive(Debug)]
pub struct MockImageView {
    pub id: u32,
    /// Swapchain image the view was created from (None for depth/texture views)
    pub image_index: Option<usize>,
}

#[derive(Debug)]
pub struct MockSampler {
    pub id: u32,
}

#[derive(Debug)]
pub struct MockFramebuffer {
    pub id: u32,
    pub color_view: u32,
    pub depth_view: u32,
    pub extent: Extent2D,
}

#[derive(Debug)]
pub struct MockPipeline {
    pub id: u32,
}

// ============================================================================
// Mock Fence
// ============================================================================

pub struct MockFence {
    pub id: u32,
    signaled: AtomicBool,
    pending: AtomicBool,
    recorder: MockRecorder,
}

impl MockFence {
    /// Whether a submission carrying this fence has not completed yet
    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::SeqCst)
    }
}

impl Fence for MockFence {
    fn wait(&self, _timeout: Duration) -> Result<FenceStatus> {
        let status = if self.signaled.load(Ordering::SeqCst) {
            FenceStatus::Signaled
        } else if self.pending.load(Ordering::SeqCst) && !self.recorder.gpu_hang() {
            self.pending.store(false, Ordering::SeqCst);
            self.signaled.store(true, Ordering::SeqCst);
            FenceStatus::Signaled
        } else {
            FenceStatus::TimedOut
        };
        self.recorder.record(MockEvent::FenceWait { fence: self.id, status });
        Ok(status)
    }

    fn reset(&self) -> Result<()> {
        self.signaled.store(false, Ordering::SeqCst);
        self.recorder.record(MockEvent::FenceReset { fence: self.id });
        Ok(())
    }

    fn is_signaled(&self) -> Result<bool> {
        Ok(self.signaled.load(Ordering::SeqCst))
    }
}

// ============================================================================
// Mock Buffer
// ============================================================================

pub struct MockBuffer {
    pub id: u32,
    pub name: String,
    pub location: MemoryLocation,
    data: Mutex<Vec<u8>>,
}

impl MockBuffer {
    /// Copy of the host-visible contents
    pub fn contents(&self) -> Vec<u8> {
        self.data.lock().unwrap().clone()
    }
}

impl Buffer for MockBuffer {
    fn size(&self) -> u64 {
        self.data.lock().unwrap().len() as u64
    }

    fn write(&self, offset: u64, data: &[u8]) -> Result<()> {
        if self.location != MemoryLocation::CpuToGpu {
            return Err(Error::InvalidResource(format!("buffer '{}' is not host visible", self.name)));
        }
        let mut contents = self.data.lock().unwrap();
        let start = offset as usize;
        let end = start + data.len();
        if end > contents.len() {
            return Err(Error::InvalidResource(format!(
                "write of {} bytes at offset {} exceeds buffer '{}' ({} bytes)",
                data.len(), offset, self.name, contents.len()
            )));
        }
        contents[start..end].copy_from_slice(data);
        Ok(())
    }
}

// ============================================================================
// Mock CommandList
// ============================================================================

pub struct MockCommandList {
    pub id: u32,
    recorder: MockRecorder,
    recording: bool,
    in_render_pass: bool,
    pipeline_bound: bool,
}

impl MockCommandList {
    /// Whether the list has begun and not yet ended
    pub fn is_recording(&self) -> bool {
        self.recording
    }

    // Same recording rules as the Vulkan command list
    fn ensure_recording(&self) -> Result<()> {
        if !self.recording {
            return Err(Error::BackendError(format!("command list {} not recording", self.id)));
        }
        Ok(())
    }

    fn ensure_outside_render_pass(&self) -> Result<()> {
        self.ensure_recording()?;
        if self.in_render_pass {
            return Err(Error::BackendError(format!("command list {} is inside a render pass", self.id)));
        }
        Ok(())
    }

    fn ensure_in_render_pass(&self) -> Result<()> {
        self.ensure_recording()?;
        if !self.in_render_pass {
            return Err(Error::BackendError(format!("command list {} not inside a render pass", self.id)));
        }
        Ok(())
    }
}

impl CommandList<MockBackend> for MockCommandList {
    fn reset(&mut self) -> Result<()> {
        self.recording = false;
        self.in_render_pass = false;
        self.pipeline_bound = false;
        self.recorder.record(MockEvent::CommandListReset { list: self.id });
        Ok(())
    }

    fn begin(&mut self) -> Result<()> {
        if self.recording {
            return Err(Error::BackendError(format!("command list {} already recording", self.id)));
        }
        self.recording = true;
        self.in_render_pass = false;
        self.pipeline_bound = false;
        self.recorder.record(MockEvent::CommandListBegin { list: self.id });
        Ok(())
    }

    fn end(&mut self) -> Result<()> {
        self.ensure_outside_render_pass()?;
        self.recording = false;
        self.recorder.record(MockEvent::CommandListEnd { list: self.id });
        Ok(())
    }

    fn copy_buffer(&mut self, src: &MockBuffer, src_offset: u64, dst: &MockBuffer, size: u64) -> Result<()> {
        self.ensure_outside_render_pass()?;
        self.recorder.record(MockEvent::CopyBuffer {
            list: self.id,
            src: src.id,
            src_offset,
            dst: dst.id,
            size,
        });
        Ok(())
    }

    fn begin_render_pass(
        &mut self,
        _render_pass: &MockRenderPass,
        framebuffer: &MockFramebuffer,
        _extent: Extent2D,
        _clear: &ClearValues,
    ) -> Result<()> {
        self.ensure_outside_render_pass()?;
        self.in_render_pass = true;
        self.recorder.record(MockEvent::BeginRenderPass { list: self.id, framebuffer: framebuffer.id });
        Ok(())
    }

    fn end_render_pass(&mut self) -> Result<()> {
        self.ensure_in_render_pass()?;
        self.in_render_pass = false;
        self.recorder.record(MockEvent::EndRenderPass { list: self.id });
        Ok(())
    }

    fn bind_pipeline(&mut self, pipeline: &MockPipeline) -> Result<()> {
        self.ensure_in_render_pass()?;
        self.pipeline_bound = true;
        self.recorder.record(MockEvent::BindPipeline { list: self.id, pipeline: pipeline.id });
        Ok(())
    }

    fn bind_descriptor_set(&mut self, set_index: u32, set: &MockDescriptorSet) -> Result<()> {
        self.ensure_recording()?;
        if !self.pipeline_bound {
            return Err(Error::BackendError(format!("command list {} has no pipeline bound", self.id)));
        }
        self.recorder.record(MockEvent::BindDescriptorSet { list: self.id, set_index, set: set.id });
        Ok(())
    }

    fn bind_vertex_buffer(&mut self, buffer: &MockBuffer, _offset: u64) -> Result<()> {
        self.ensure_recording()?;
        self.recorder.record(MockEvent::BindVertexBuffer { list: self.id, buffer: buffer.id });
        Ok(())
    }

    fn bind_index_buffer(&mut self, buffer: &MockBuffer, _offset: u64, _index_type: IndexType) -> Result<()> {
        self.ensure_recording()?;
        self.recorder.record(MockEvent::BindIndexBuffer { list: self.id, buffer: buffer.id });
        Ok(())
    }

    fn draw_indexed(&mut self, index_count: u32, _first_index: u32, _vertex_offset: i32) -> Result<()> {
        self.ensure_in_render_pass()?;
        self.recorder.record(MockEvent::DrawIndexed { list: self.id, index_count });
        Ok(())
    }
}

// ============================================================================
// Mock DescriptorPool
// ============================================================================

pub struct MockDescriptorPool {
    pub id: u32,
    capacity: u32,
    allocated: u32,
    recorder: MockRecorder,
}

impl MockDescriptorPool {
    /// Sets allocated since the last reset
    pub fn allocated(&self) -> u32 {
        self.allocated
    }
}

impl DescriptorPool<MockBackend> for MockDescriptorPool {
    fn capacity(&self) -> u32 {
        self.capacity
    }

    fn reset(&mut self) -> Result<()> {
        self.allocated = 0;
        self.recorder.record(MockEvent::DescriptorPoolReset { pool: self.id });
        Ok(())
    }

    fn allocate(&mut self, layout: &MockDescriptorSetLayout) -> Result<MockDescriptorSet> {
        if self.allocated >= self.capacity {
            return Err(Error::OutOfMemory);
        }
        self.allocated += 1;
        let set = MockDescriptorSet { id: self.recorder.next_id(), layout: layout.name };
        self.recorder.record(MockEvent::DescriptorSetAllocated {
            pool: self.id,
            set: set.id,
            layout: layout.name,
        });
        Ok(set)
    }

    fn write_uniform_buffer(&self, set: &MockDescriptorSet, binding: u32, _buffer: &MockBuffer) -> Result<()> {
        self.recorder.record(MockEvent::DescriptorWrite { set: set.id, binding });
        Ok(())
    }

    fn write_image_sampler(
        &self,
        set: &MockDescriptorSet,
        binding: u32,
        _view: &MockImageView,
        _sampler: &MockSampler,
    ) -> Result<()> {
        self.recorder.record(MockEvent::DescriptorWrite { set: set.id, binding });
        Ok(())
    }
}

// ============================================================================
// Mock Swapchain
// ============================================================================

pub struct MockSwapchain {
    recorder: MockRecorder,
    image_count: usize,
    extent: Extent2D,
    generation: u64,
    next_image: u32,
}

impl Swapchain<MockBackend> for MockSwapchain {
    fn image_count(&self) -> usize {
        self.image_count
    }

    fn extent(&self) -> Extent2D {
        self.extent
    }

    fn format(&self) -> TextureFormat {
        TextureFormat::B8G8R8A8_SRGB
    }

    fn generation(&self) -> u64 {
        self.generation
    }

    fn acquire_next_image(&mut self, semaphore: &MockSemaphore, _timeout: Duration) -> Result<AcquireOutcome> {
        let scripted = self.recorder.state.lock().unwrap().acquire_script.pop_front();
        let outcome = match scripted {
            Some(outcome) => outcome,
            None => {
                let index = self.next_image;
                self.next_image = (self.next_image + 1) % self.image_count as u32;
                AcquireOutcome::Acquired(index)
            }
        };
        self.recorder.record(MockEvent::Acquire { semaphore: semaphore.id, outcome });
        Ok(outcome)
    }

    fn present(&mut self, _queue: u32, image_index: u32, wait_semaphore: &MockSemaphore) -> Result<PresentOutcome> {
        let scripted = self.recorder.state.lock().unwrap().present_script.pop_front();
        let outcome = scripted.unwrap_or(PresentOutcome::Presented);
        self.recorder.record(MockEvent::Present {
            image_index,
            wait_semaphore: wait_semaphore.id,
            outcome,
        });
        Ok(outcome)
    }

    fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        if let Some(count) = self.recorder.state.lock().unwrap().image_count_after_resize.take() {
            self.image_count = count;
        }
        self.extent = Extent2D::new(width, height);
        self.generation += 1;
        self.next_image = 0;
        self.recorder.record(MockEvent::SwapchainResized {
            width,
            height,
            image_count: self.image_count,
        });
        Ok(())
    }

    fn create_color_view(&self, image_index: usize) -> Result<MockImageView> {
        if image_index >= self.image_count {
            return Err(Error::InvalidResource(format!("swapchain image {} does not exist", image_index)));
        }
        Ok(MockImageView { id: self.recorder.next_id(), image_index: Some(image_index) })
    }
}

// ============================================================================
// Mock DepthStencil
// ============================================================================

pub struct MockDepthStencil {
    view: MockImageView,
    extent: Extent2D,
    recorder: MockRecorder,
}

impl DepthStencil<MockBackend> for MockDepthStencil {
    fn view(&self) -> &MockImageView {
        &self.view
    }

    fn extent(&self) -> Extent2D {
        self.extent
    }

    fn format(&self) -> TextureFormat {
        TextureFormat::D32_SFLOAT
    }

    fn resize(&mut self, extent: Extent2D) -> Result<()> {
        self.extent = extent;
        self.view = MockImageView { id: self.recorder.next_id(), image_index: None };
        self.recorder.record(MockEvent::DepthResized { width: extent.width, height: extent.height });
        Ok(())
    }
}

// ============================================================================
// Mock Surface
// ============================================================================

pub struct MockSurface {
    size: Mutex<Extent2D>,
    resize_requested: AtomicBool,
}

impl MockSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            size: Mutex::new(Extent2D::new(width, height)),
            resize_requested: AtomicBool::new(false),
        }
    }

    /// Simulate the window being resized by the user
    pub fn set_size(&self, width: u32, height: u32) {
        *self.size.lock().unwrap() = Extent2D::new(width, height);
        self.resize_requested.store(true, Ordering::SeqCst);
    }
}

impl Surface for MockSurface {
    fn framebuffer_size(&self) -> Extent2D {
        *self.size.lock().unwrap()
    }

    fn needs_resize(&self) -> bool {
        self.resize_requested.load(Ordering::SeqCst)
    }

    fn acknowledge_resize(&self) {
        self.resize_requested.store(false, Ordering::SeqCst);
    }
}

// ============================================================================
// Mock Device
// ============================================================================

pub struct MockDevice {
    recorder: MockRecorder,
}

impl MockDevice {
    pub fn new() -> Self {
        Self { recorder: MockRecorder::new() }
    }

    /// Handle on the shared event log
    pub fn recorder(&self) -> MockRecorder {
        self.recorder.clone()
    }

    pub fn create_swapchain(&self, image_count: usize, extent: Extent2D) -> MockSwapchain {
        MockSwapchain {
            recorder: self.recorder.clone(),
            image_count,
            extent,
            generation: 0,
            next_image: 0,
        }
    }

    pub fn create_depth_stencil(&self, extent: Extent2D) -> MockDepthStencil {
        MockDepthStencil {
            view: self.create_image_view(),
            extent,
            recorder: self.recorder.clone(),
        }
    }

    pub fn create_render_pass(&self) -> MockRenderPass {
        MockRenderPass { id: self.recorder.next_id() }
    }

    pub fn create_pipeline(&self) -> MockPipeline {
        MockPipeline { id: self.recorder.next_id() }
    }

    pub fn create_sampler(&self) -> MockSampler {
        MockSampler { id: self.recorder.next_id() }
    }

    pub fn create_image_view(&self) -> MockImageView {
        MockImageView { id: self.recorder.next_id(), image_index: None }
    }

    pub fn create_frame_layouts(&self) -> FrameLayouts<MockBackend> {
        FrameLayouts {
            global: MockDescriptorSetLayout { name: "global" },
            material: MockDescriptorSetLayout { name: "material" },
            entity: MockDescriptorSetLayout { name: "entity" },
        }
    }
}

impl GraphicsDevice<MockBackend> for MockDevice {
    fn wait_idle(&self) -> Result<()> {
        self.recorder.record(MockEvent::WaitIdle);
        Ok(())
    }

    fn queues(&self, family: QueueFamily) -> Vec<u32> {
        match family {
            QueueFamily::Graphics => vec![MOCK_GRAPHICS_QUEUE],
            QueueFamily::Present => vec![MOCK_PRESENT_QUEUE],
        }
    }

    fn create_fence(&self, signaled: bool) -> Result<MockFence> {
        Ok(MockFence {
            id: self.recorder.next_id(),
            signaled: AtomicBool::new(signaled),
            pending: AtomicBool::new(false),
            recorder: self.recorder.clone(),
        })
    }

    fn create_semaphore(&self) -> Result<MockSemaphore> {
        let semaphore = MockSemaphore { id: self.recorder.next_id() };
        self.recorder.record(MockEvent::SemaphoreCreated { semaphore: semaphore.id });
        Ok(semaphore)
    }

    fn create_command_list(&self) -> Result<MockCommandList> {
        Ok(MockCommandList {
            id: self.recorder.next_id(),
            recorder: self.recorder.clone(),
            recording: false,
            in_render_pass: false,
            pipeline_bound: false,
        })
    }

    fn create_descriptor_pool(&self, max_sets: u32) -> Result<MockDescriptorPool> {
        let pool = MockDescriptorPool {
            id: self.recorder.next_id(),
            capacity: max_sets,
            allocated: 0,
            recorder: self.recorder.clone(),
        };
        self.recorder.record(MockEvent::DescriptorPoolCreated { pool: pool.id, capacity: max_sets });
        Ok(pool)
    }

    fn create_buffer(&self, desc: &BufferDesc) -> Result<MockBuffer> {
        let buffer = MockBuffer {
            id: self.recorder.next_id(),
            name: desc.name.clone(),
            location: desc.location,
            data: Mutex::new(vec![0; desc.size as usize]),
        };
        self.recorder.record(MockEvent::BufferCreated {
            buffer: buffer.id,
            name: desc.name.clone(),
            size: desc.size,
        });
        Ok(buffer)
    }

    fn create_framebuffer(
        &self,
        _render_pass: &MockRenderPass,
        color_view: &MockImageView,
        depth_view: &MockImageView,
        extent: Extent2D,
    ) -> Result<MockFramebuffer> {
        Ok(MockFramebuffer {
            id: self.recorder.next_id(),
            color_view: color_view.id,
            depth_view: depth_view.id,
            extent,
        })
    }

    fn submit(
        &self,
        queue: u32,
        command_list: &MockCommandList,
        wait_semaphore: &MockSemaphore,
        signal_semaphore: &MockSemaphore,
        fence: &MockFence,
    ) -> Result<()> {
        if fence.signaled.load(Ordering::SeqCst) {
            return Err(Error::ContractViolation(format!("fence {} submitted while signaled", fence.id)));
        }
        fence.pending.store(true, Ordering::SeqCst);
        self.recorder.record(MockEvent::Submit {
            queue,
            list: command_list.id,
            wait_semaphore: wait_semaphore.id,
            signal_semaphore: signal_semaphore.id,
            fence: fence.id,
        });
        Ok(())
    }
}

#[cfg(test)]
#[path = "mock_graphics_device_tests.rs"]
mod tests;
