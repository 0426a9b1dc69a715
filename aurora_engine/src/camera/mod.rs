//! Camera module - low-level camera.
//!
//! The engine does NOT store or manage cameras. They are passive values
//! owned and driven by the caller, turned into a uniform block each frame.

mod camera;

pub use camera::Camera;
