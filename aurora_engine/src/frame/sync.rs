/// Bounded fence waits with stall diagnostics

use std::time::Duration;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::graphics_device::{Fence, FenceStatus};
use crate::log::SharedLogger;
use crate::{engine_error, engine_info, engine_warn};

/// How long the render thread may block on a fence
///
/// A wait is split into `timeout` slices. Each slice that elapses without the
/// fence signaling is a stall and is logged; after `max_stalls` consecutive
/// stalls the wait fails with `Error::Timeout`. `max_stalls == 0` never gives up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FenceWaitPolicy {
    pub timeout: Duration,
    pub max_stalls: u32,
}

impl FenceWaitPolicy {
    pub fn new(timeout: Duration, max_stalls: u32) -> Self {
        Self { timeout, max_stalls }
    }

    /// A single wait with no timeout (a hung GPU hangs the caller)
    pub fn unbounded() -> Self {
        Self {
            timeout: Duration::MAX,
            max_stalls: 0,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.fence_timeout, config.max_fence_stalls)
    }

    /// Total time a wait may take before failing, if bounded
    pub fn deadline(&self) -> Option<Duration> {
        if self.max_stalls == 0 || self.timeout == Duration::MAX {
            return None;
        }
        self.timeout.checked_mul(self.max_stalls)
    }
}

impl Default for FenceWaitPolicy {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Block until `fence` signals, following `policy`
///
/// `what` names the waited work in diagnostics (e.g. "frame 1").
pub fn wait_for_fence<F: Fence + ?Sized>(
    fence: &F,
    policy: &FenceWaitPolicy,
    logger: &SharedLogger,
    what: &str,
) -> Result<()> {
    let mut stalls = 0u32;
    loop {
        match fence.wait(policy.timeout)? {
            FenceStatus::Signaled => {
                if stalls > 0 {
                    engine_info!(logger, "aurora::frame::sync",
                        "{} completed after {} stall(s)", what, stalls);
                }
                return Ok(());
            }
            FenceStatus::TimedOut => {
                stalls += 1;
                engine_warn!(logger, "aurora::frame::sync",
                    "GPU stall: {} not complete after {:?} (stall {})", what, policy.timeout, stalls);

                if policy.max_stalls != 0 && stalls >= policy.max_stalls {
                    let message = format!(
                        "{} not complete after {} stalls of {:?}; the GPU appears hung",
                        what, stalls, policy.timeout
                    );
                    engine_error!(logger, "aurora::frame::sync", "{}", message);
                    return Err(Error::Timeout(message));
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "sync_tests.rs"]
mod tests;
