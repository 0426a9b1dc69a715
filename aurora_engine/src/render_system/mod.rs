//! Render system - drives the frame loop on top of the frame manager.

mod render_system;
mod uniforms;

pub use render_system::{
    DrawItem, FrameOutcome, RenderScene, RenderStats, RenderSystem, SceneMaterial,
};
pub use uniforms::{CameraUniform, EntityUniform, MaterialUniform};
