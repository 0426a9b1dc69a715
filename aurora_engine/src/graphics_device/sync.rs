/// Fence trait - GPU-to-CPU completion signal
///
/// Semaphores have no host-side operations and therefore no trait: the
/// backend's semaphore type is only handed back to submission and
/// presentation calls.

use std::time::Duration;

use crate::error::Result;

/// Result of a bounded fence wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FenceStatus {
    /// All work of the submission that carried the fence has completed
    Signaled,
    /// The timeout elapsed first
    TimedOut,
}

/// CPU-observable GPU completion signal
///
/// Created signaled or unsignaled. A submission attaches exactly one fence,
/// which becomes signaled once all work of that submission is done. The fence
/// must be reset before it is attached to a new submission.
pub trait Fence {
    /// Block the calling thread until the fence is signaled or `timeout` elapses
    ///
    /// `Duration::MAX` waits forever.
    fn wait(&self, timeout: Duration) -> Result<FenceStatus>;

    /// Return the fence to the unsignaled state
    fn reset(&self) -> Result<()>;

    /// Non-blocking status query
    fn is_signaled(&self) -> Result<bool>;
}
