/*!
# Aurora Engine

Frame synchronization core of the Aurora rendering engine.

This crate owns the per-frame protocol between the CPU, the GPU and the
presentation engine. It is generic over a `Backend` (Vulkan lives in
`aurora_engine_renderer_vulkan`), so every guarantee can be tested without a GPU.

## Architecture

- **GraphicsDevice**: Backend seam (fences, semaphores, buffers, command lists,
  descriptor pools, swapchain, surface)
- **SwapchainFrame**: One presentable image with its view and framebuffer
- **ConceptualFrame**: One CPU-side frame in flight (sync objects, command list,
  uniform buffers, descriptor sets)
- **FrameManager**: Pairs conceptual frames with swapchain images and rebuilds
  the swapchain on resize
- **RenderSystem**: Drives one frame per loop iteration from a `RenderScene`
*/

pub mod error;
pub mod log;
pub mod config;
pub mod graphics_device;
pub mod frame;
pub mod camera;
pub mod render_system;

// Main aurora namespace module
pub mod aurora {
    // Error types
    pub use crate::error::{Error, Result};

    // Configuration
    pub use crate::config::Config;

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{
            DefaultLogger, FilteredLogger, LogEntry, LogSeverity, Logger, NullLogger, SharedLogger,
        };
    }

    // Backend seam
    pub mod device {
        pub use crate::graphics_device::*;
    }

    // Frame protocol
    pub mod frame {
        pub use crate::frame::*;
    }

    // Frame loop
    pub mod render {
        pub use crate::camera::Camera;
        pub use crate::render_system::*;
    }
}

// Re-export math library at crate root
pub use glam;
