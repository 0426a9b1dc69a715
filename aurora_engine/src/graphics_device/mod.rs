/// Graphics device module - the backend seam of the frame core

// Module declarations
pub mod graphics_device;
pub mod types;
pub mod sync;
pub mod buffer;
pub mod command_list;
pub mod descriptor;
pub mod swapchain;

// Re-export everything from graphics_device.rs
pub use graphics_device::*;

// Re-export from other modules
pub use types::*;
pub use sync::*;
pub use buffer::*;
pub use command_list::*;
pub use descriptor::*;
pub use swapchain::*;

// Mock graphics device for tests (no GPU required)
#[cfg(test)]
pub mod mock_graphics_device;
