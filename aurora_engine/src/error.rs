//! Error types for the Aurora engine
//!
//! This module defines the error types used throughout the engine,
//! including backend failures, initialization, frame protocol contract
//! violations and stalled GPU waits.
//!
//! Retryable swapchain conditions (out-of-date, suboptimal) are NOT errors:
//! they are reported through `AcquireOutcome` / `PresentOutcome` and the
//! frame manager's return values.

use std::fmt;

/// Result type for Aurora engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Aurora engine errors
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Backend-specific error (Vulkan, mock, etc.)
    BackendError(String),

    /// Out of GPU memory
    OutOfMemory,

    /// Invalid resource (buffer, descriptor set, stale frame handle, etc.)
    InvalidResource(String),

    /// Initialization failed (device, swapchain, sync objects, etc.)
    InitializationFailed(String),

    /// Caller broke the frame protocol (unknown material/entity, calls out of order,
    /// index beyond the capacity prepared for this frame)
    ContractViolation(String),

    /// A bounded GPU wait gave up after repeated stalls
    Timeout(String),
}

impl Error {
    /// Whether this error should terminate the render loop.
    ///
    /// Every variant is fatal except `Timeout`, which leaves the frame in a
    /// consistent state and can be retried by the caller.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Error::Timeout(_))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::OutOfMemory => write!(f, "Out of GPU memory"),
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
            Error::ContractViolation(msg) => write!(f, "Contract violation: {}", msg),
            Error::Timeout(msg) => write!(f, "Timeout: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

// ===== ERROR MACROS =====

/// Log an ERROR message and build an `Error::BackendError` with the same text
///
/// # Example
///
/// ```no_run
/// # use aurora_engine::{engine_err, aurora::log::NullLogger};
/// # let logger = std::sync::Arc::new(NullLogger);
/// let err = engine_err!(logger, "aurora::vulkan", "Failed to submit: {}", 42);
/// ```
#[macro_export]
macro_rules! engine_err {
    ($logger:expr, $source:expr, $($arg:tt)*) => {{
        let message = format!($($arg)*);
        $crate::log::log_detailed(
            &$logger,
            $crate::log::LogSeverity::Error,
            $source,
            message.clone(),
            file!(),
            line!(),
        );
        $crate::error::Error::BackendError(message)
    }};
}

/// Log an ERROR message and return early with `Err(Error::BackendError(..))`
#[macro_export]
macro_rules! engine_bail {
    ($logger:expr, $source:expr, $($arg:tt)*) => {
        return Err($crate::engine_err!($logger, $source, $($arg)*))
    };
}

/// Log an ERROR message and return early with `Err(Error::ContractViolation(..))`
///
/// Used for caller bugs: recording calls out of order, scheduling a material or
/// entity that was never uploaded this frame, stale frame handles.
#[macro_export]
macro_rules! engine_contract {
    ($logger:expr, $source:expr, $($arg:tt)*) => {{
        let message = format!($($arg)*);
        $crate::log::log_detailed(
            &$logger,
            $crate::log::LogSeverity::Error,
            $source,
            message.clone(),
            file!(),
            line!(),
        );
        return Err($crate::error::Error::ContractViolation(message));
    }};
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
