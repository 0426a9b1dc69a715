//! Unit tests for sync.rs
//!
//! Uses a scripted fence that times out a fixed number of times before
//! signaling.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::frame::sync::{wait_for_fence, FenceWaitPolicy};
use crate::graphics_device::{Fence, FenceStatus};
use crate::log::{LogEntry, LogSeverity, Logger, SharedLogger};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Default)]
struct CaptureLogger {
    entries: Mutex<Vec<LogEntry>>,
}

impl CaptureLogger {
    fn count(&self, severity: LogSeverity) -> usize {
        self.entries.lock().unwrap().iter().filter(|e| e.severity == severity).count()
    }
}

impl Logger for CaptureLogger {
    fn log(&self, entry: &LogEntry) {
        self.entries.lock().unwrap().push(entry.clone());
    }
}

/// Times out `stalls` times, then signals (u32::MAX = never signals)
struct ScriptedFence {
    stalls: u32,
    waits: AtomicU32,
}

impl ScriptedFence {
    fn new(stalls: u32) -> Self {
        Self { stalls, waits: AtomicU32::new(0) }
    }
}

impl Fence for ScriptedFence {
    fn wait(&self, _timeout: Duration) -> Result<FenceStatus> {
        let n = self.waits.fetch_add(1, Ordering::SeqCst);
        if n < self.stalls {
            Ok(FenceStatus::TimedOut)
        } else {
            Ok(FenceStatus::Signaled)
        }
    }

    fn reset(&self) -> Result<()> {
        Ok(())
    }

    fn is_signaled(&self) -> Result<bool> {
        Ok(self.waits.load(Ordering::SeqCst) > self.stalls)
    }
}

fn setup() -> (Arc<CaptureLogger>, SharedLogger) {
    let capture = Arc::new(CaptureLogger::default());
    let shared: SharedLogger = capture.clone();
    (capture, shared)
}

// ============================================================================
// POLICY TESTS
// ============================================================================

#[test]
fn test_policy_from_default_config() {
    let policy = FenceWaitPolicy::from_config(&Config::default());
    assert_eq!(policy.timeout, Duration::from_secs(1));
    assert_eq!(policy.max_stalls, 10);
    assert_eq!(policy.deadline(), Some(Duration::from_secs(10)));
}

#[test]
fn test_unbounded_policy_has_no_deadline() {
    let policy = FenceWaitPolicy::unbounded();
    assert_eq!(policy.timeout, Duration::MAX);
    assert_eq!(policy.deadline(), None);
}

#[test]
fn test_zero_stalls_has_no_deadline() {
    let policy = FenceWaitPolicy::new(Duration::from_millis(5), 0);
    assert_eq!(policy.deadline(), None);
}

// ============================================================================
// WAIT TESTS
// ============================================================================

#[test]
fn test_wait_signaled_immediately_logs_nothing() {
    let (capture, logger) = setup();
    let fence = ScriptedFence::new(0);

    wait_for_fence(&fence, &FenceWaitPolicy::default(), &logger, "frame 0").unwrap();

    assert!(capture.entries.lock().unwrap().is_empty());
    assert_eq!(fence.waits.load(Ordering::SeqCst), 1);
}

#[test]
fn test_wait_recovers_after_stalls() {
    let (capture, logger) = setup();
    let fence = ScriptedFence::new(3);
    let policy = FenceWaitPolicy::new(Duration::from_millis(1), 5);

    wait_for_fence(&fence, &policy, &logger, "frame 1").unwrap();

    assert_eq!(capture.count(LogSeverity::Warn), 3);
    assert_eq!(capture.count(LogSeverity::Info), 1);
    assert_eq!(capture.count(LogSeverity::Error), 0);
}

#[test]
fn test_wait_fails_after_max_stalls() {
    let (capture, logger) = setup();
    let fence = ScriptedFence::new(u32::MAX);
    let policy = FenceWaitPolicy::new(Duration::from_millis(1), 4);

    let result = wait_for_fence(&fence, &policy, &logger, "frame 0");

    match result {
        Err(Error::Timeout(message)) => assert!(message.contains("frame 0")),
        other => panic!("expected timeout, got {:?}", other),
    }
    assert_eq!(fence.waits.load(Ordering::SeqCst), 4);
    assert_eq!(capture.count(LogSeverity::Warn), 4);
    assert_eq!(capture.count(LogSeverity::Error), 1);
}

#[test]
fn test_zero_max_stalls_keeps_waiting() {
    let (capture, logger) = setup();
    let fence = ScriptedFence::new(50);
    let policy = FenceWaitPolicy::new(Duration::from_millis(1), 0);

    wait_for_fence(&fence, &policy, &logger, "image 2").unwrap();

    assert_eq!(capture.count(LogSeverity::Warn), 50);
}
