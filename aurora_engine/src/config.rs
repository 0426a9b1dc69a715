/// Engine configuration

use std::time::Duration;

use crate::error::{Error, Result};
use crate::log::LogSeverity;

/// Engine configuration
///
/// Passed to the backend device at creation and to the render system.
#[derive(Debug, Clone)]
pub struct Config {
    /// Application name (reported to the driver)
    pub app_name: String,
    /// Application version (major, minor, patch)
    pub app_version: (u32, u32, u32),
    /// Enable validation/debug layers
    pub enable_validation: bool,
    /// Minimum severity of validation messages forwarded to the logger
    pub debug_severity: LogSeverity,
    /// Number of conceptual frames recorded while the GPU works on earlier ones
    pub max_frames_in_flight: usize,
    /// Length of one fence wait slice before it counts as a stall
    pub fence_timeout: Duration,
    /// Consecutive stalls tolerated before a wait fails with `Error::Timeout`
    /// (0 = wait forever)
    pub max_fence_stalls: u32,
    /// Clear color of the main render pass (linear RGBA)
    pub clear_color: [f32; 4],
    /// Depth clear value of the main render pass
    pub clear_depth: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_name: "Aurora Application".to_string(),
            app_version: (1, 0, 0),
            enable_validation: cfg!(debug_assertions),
            debug_severity: LogSeverity::Warn,
            max_frames_in_flight: 2,
            fence_timeout: Duration::from_secs(1),
            max_fence_stalls: 10,
            clear_color: [0.0, 0.0, 0.0, 1.0],
            clear_depth: 1.0,
        }
    }
}

impl Config {
    /// Reject configurations the frame protocol cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.max_frames_in_flight == 0 {
            return Err(Error::InitializationFailed(
                "max_frames_in_flight must be at least 1".to_string(),
            ));
        }
        if self.fence_timeout.is_zero() {
            return Err(Error::InitializationFailed(
                "fence_timeout must be non-zero".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.clear_depth) {
            return Err(Error::InitializationFailed(format!(
                "clear_depth {} outside [0, 1]",
                self.clear_depth
            )));
        }
        Ok(())
    }
}
