/// WindowSurface - winit window as the render system's Surface collaborator
///
/// The application forwards `WindowEvent::Resized` through `notify_resized()`;
/// the render system reads the flag and acknowledges it once the swapchain
/// has been rebuilt.

use aurora_engine::aurora::device::{Extent2D, Surface};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use winit::window::Window;

pub struct WindowSurface {
    window: Arc<Window>,
    resize_requested: AtomicBool,
}

impl WindowSurface {
    pub fn new(window: Arc<Window>) -> Self {
        Self {
            window,
            resize_requested: AtomicBool::new(false),
        }
    }

    /// Record a window size change (call from the `Resized` event handler)
    pub fn notify_resized(&self) {
        self.resize_requested.store(true, Ordering::Release);
    }

    pub fn window(&self) -> &Arc<Window> {
        &self.window
    }
}

impl Surface for WindowSurface {
    fn framebuffer_size(&self) -> Extent2D {
        let size = self.window.inner_size();
        Extent2D::new(size.width, size.height)
    }

    fn needs_resize(&self) -> bool {
        self.resize_requested.load(Ordering::Acquire)
    }

    fn acknowledge_resize(&self) {
        self.resize_requested.store(false, Ordering::Release);
    }
}
