/// RenderSystem - top-level driver of the frame loop
///
/// Once per loop iteration `render()` asks the frame manager for a frame,
/// uploads the scene's camera, materials and entities, records the draw
/// calls, submits, presents and rebuilds the swapchain when required.

use std::sync::Arc;

use glam::Mat4;

use crate::camera::Camera;
use crate::config::Config;
use crate::error::Result;
use crate::frame::{EntityId, FrameHandle, FrameManager, MaterialId, UniformSizes};
use crate::graphics_device::{
    Backend, ClearValues, DepthStencil, FrameLayouts, GraphicsDevice, IndexType, Surface,
};
use crate::log::SharedLogger;
use crate::render_system::{CameraUniform, EntityUniform, MaterialUniform};
use crate::{engine_debug, engine_error, engine_info};

// ============================================================================
// Scene description
// ============================================================================

/// A material used by the frame
pub struct SceneMaterial<'a, B: Backend> {
    pub id: MaterialId,
    pub uniform: MaterialUniform,
    /// Bound to bindings 1 and 2 of the material set
    pub textures: Vec<(&'a B::ImageView, &'a B::Sampler)>,
}

/// One indexed draw of an entity
pub struct DrawItem<'a, B: Backend> {
    pub entity: EntityId,
    pub material: MaterialId,
    pub transform: Mat4,
    pub vertex_buffer: &'a B::Buffer,
    pub index_buffer: &'a B::Buffer,
    pub index_type: IndexType,
    pub index_count: u32,
}

/// Everything one frame draws
pub struct RenderScene<'a, B: Backend> {
    pub camera: &'a Camera,
    pub materials: Vec<SceneMaterial<'a, B>>,
    pub draws: Vec<DrawItem<'a, B>>,
}

impl<'a, B: Backend> RenderScene<'a, B> {
    pub fn new(camera: &'a Camera) -> Self {
        Self {
            camera,
            materials: Vec::new(),
            draws: Vec::new(),
        }
    }
}

// ============================================================================
// Statistics
// ============================================================================

/// What a call to `render()` did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Rendered and presented
    Presented,
    /// Rendered and presented, then the swapchain was rebuilt
    PresentedAndResized,
    /// Acquire reported an out-of-date swapchain; rebuilt, nothing rendered
    Skipped,
    /// The surface is zero-sized; nothing rendered
    Minimized,
}

/// Frame counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub frames_rendered: u64,
    pub frames_skipped: u64,
    pub resizes: u64,
    /// Draw calls of the last rendered frame
    pub draw_calls: u32,
    /// Triangles of the last rendered frame
    pub triangles: u64,
}

// ============================================================================
// RenderSystem
// ============================================================================

pub struct RenderSystem<B: Backend> {
    logger: SharedLogger,
    clear: ClearValues,
    stats: RenderStats,
    // Declaration order is drop order: the device goes last
    frame_manager: FrameManager<B>,
    pipeline: B::Pipeline,
    depth_stencil: B::DepthStencil,
    render_pass: B::RenderPass,
    layouts: Arc<FrameLayouts<B>>,
    device: B::Device,
}

impl<B: Backend> RenderSystem<B> {
    /// Take over the device and the collaborators and create the frame manager
    ///
    /// # Arguments
    ///
    /// * `device` - GPU device
    /// * `swapchain` - Swapchain created for `surface`
    /// * `surface` - Window
    /// * `render_pass` - Main render pass (color + depth)
    /// * `depth_stencil` - Depth attachment matching the swapchain extent
    /// * `layouts` - Set layouts of the pipeline layout
    /// * `pipeline` - Graphics pipeline drawing every item
    /// * `config` - Engine configuration
    /// * `logger` - Logger
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        device: B::Device,
        swapchain: B::Swapchain,
        surface: Arc<dyn Surface>,
        render_pass: B::RenderPass,
        depth_stencil: B::DepthStencil,
        layouts: FrameLayouts<B>,
        pipeline: B::Pipeline,
        config: &Config,
        logger: SharedLogger,
    ) -> Result<Self> {
        let layouts = Arc::new(layouts);
        let frame_manager = FrameManager::new(
            &device,
            swapchain,
            surface,
            &render_pass,
            depth_stencil.view(),
            Arc::clone(&layouts),
            UniformSizes::of::<CameraUniform, MaterialUniform, EntityUniform>(),
            config,
            Arc::clone(&logger),
        )?;

        engine_info!(logger, "aurora::render_system", "Render system ready");

        Ok(Self {
            clear: ClearValues {
                color: config.clear_color,
                depth: config.clear_depth,
                stencil: 0,
            },
            stats: RenderStats::default(),
            frame_manager,
            pipeline,
            depth_stencil,
            render_pass,
            layouts,
            device,
            logger,
        })
    }

    // ===== ACCESSORS =====

    pub fn device(&self) -> &B::Device {
        &self.device
    }

    pub fn frame_manager(&self) -> &FrameManager<B> {
        &self.frame_manager
    }

    pub fn frame_manager_mut(&mut self) -> &mut FrameManager<B> {
        &mut self.frame_manager
    }

    pub fn layouts(&self) -> &FrameLayouts<B> {
        &self.layouts
    }

    pub fn stats(&self) -> RenderStats {
        self.stats
    }

    // ===== FRAME LOOP =====

    /// Render and present one frame of `scene`
    pub fn render(&mut self, scene: &RenderScene<'_, B>) -> Result<FrameOutcome> {
        if self.frame_manager.surface().framebuffer_size().is_empty() {
            self.stats.frames_skipped += 1;
            return Ok(FrameOutcome::Minimized);
        }

        let handle = match self.frame_manager.get_frame()? {
            Some(handle) => handle,
            None => {
                self.resize()?;
                self.stats.frames_skipped += 1;
                return Ok(FrameOutcome::Skipped);
            }
        };

        self.record(handle, scene)?;
        let needs_resize = self.frame_manager.present_frame(handle)?;
        self.stats.frames_rendered += 1;

        if needs_resize {
            self.resize()?;
            return Ok(FrameOutcome::PresentedAndResized);
        }
        Ok(FrameOutcome::Presented)
    }

    fn record(&mut self, handle: FrameHandle, scene: &RenderScene<'_, B>) -> Result<()> {
        let queue = self.frame_manager.graphics_queue();
        let mut frame = self.frame_manager.frame(handle)?;

        frame.prepare_render(&self.device, scene.materials.len(), scene.draws.len())?;

        frame.upload_camera_data(&scene.camera.uniform())?;
        for material in &scene.materials {
            frame.upload_material_data(material.id, &material.uniform, &material.textures)?;
        }
        for draw in &scene.draws {
            frame.upload_entity_data(draw.entity, &EntityUniform::from_model(draw.transform))?;
        }

        frame.schedule_start(&self.render_pass, &self.clear)?;
        frame.schedule_pipeline(&self.pipeline)?;
        frame.schedule_global()?;

        let mut triangles = 0u64;
        for draw in &scene.draws {
            frame.schedule_material(draw.material)?;
            frame.schedule_entity(draw.entity)?;
            frame.schedule_vertex_buffer(draw.vertex_buffer, draw.index_buffer, draw.index_type)?;
            frame.schedule_draw(draw.index_count, 0, 0)?;
            triangles += u64::from(draw.index_count / 3);
        }

        frame.schedule_stop()?;
        frame.submit(&self.device, queue)?;

        self.stats.draw_calls = draw_call_count(scene.draws.len());
        self.stats.triangles = triangles;
        Ok(())
    }

    /// Rebuild the swapchain for the surface's current size
    ///
    /// Returns `false` when the surface is zero-sized and the rebuild was deferred.
    pub fn resize(&mut self) -> Result<bool> {
        let resized = self
            .frame_manager
            .resize_swapchain(&self.device, &self.render_pass, &mut self.depth_stencil)?;
        if resized {
            self.stats.resizes += 1;
            engine_debug!(self.logger, "aurora::render_system",
                "Resize #{}: depth {}x{}", self.stats.resizes,
                self.depth_stencil.extent().width, self.depth_stencil.extent().height);
        }
        Ok(resized)
    }

    /// Block until the GPU has finished every submitted frame
    pub fn wait_idle(&mut self) -> Result<()> {
        self.device.wait_idle()?;
        self.frame_manager.wait_all()
    }
}

/// Draw count for the stats, saturating at `u32::MAX`
fn draw_call_count(draws: usize) -> u32 {
    u32::try_from(draws).unwrap_or(u32::MAX)
}

impl<B: Backend> Drop for RenderSystem<B> {
    fn drop(&mut self) {
        // Nothing may be destroyed while the GPU still uses it
        if let Err(e) = self.device.wait_idle() {
            engine_error!(self.logger, "aurora::render_system", "wait_idle failed during shutdown: {}", e);
        }
    }
}

#[cfg(test)]
#[path = "render_system_tests.rs"]
mod tests;
