//! Unit tests for log.rs
//!
//! Tests Logger trait, LogEntry, LogSeverity, DefaultLogger, FilteredLogger
//! and the logging macros with an injected logger.

use crate::log::{
    DefaultLogger, FilteredLogger, LogEntry, LogSeverity, Logger, NullLogger, SharedLogger,
};
use std::sync::{Arc, Mutex};
use std::time::SystemTime;

/// Test logger that captures log entries for verification
#[derive(Default)]
struct CaptureLogger {
    entries: Mutex<Vec<LogEntry>>,
}

impl CaptureLogger {
    fn severities(&self) -> Vec<LogSeverity> {
        self.entries.lock().unwrap().iter().map(|e| e.severity).collect()
    }
}

impl Logger for CaptureLogger {
    fn log(&self, entry: &LogEntry) {
        self.entries.lock().unwrap().push(entry.clone());
    }
}

fn entry(severity: LogSeverity, file: Option<&'static str>, line: Option<u32>) -> LogEntry {
    LogEntry {
        severity,
        timestamp: SystemTime::now(),
        source: "aurora::test".to_string(),
        message: "hello".to_string(),
        file,
        line,
    }
}

// ============================================================================
// LOG SEVERITY TESTS
// ============================================================================

#[test]
fn test_log_severity_ordering() {
    assert!(LogSeverity::Trace < LogSeverity::Debug);
    assert!(LogSeverity::Debug < LogSeverity::Info);
    assert!(LogSeverity::Info < LogSeverity::Warn);
    assert!(LogSeverity::Warn < LogSeverity::Error);
}

#[test]
fn test_log_severity_labels_are_fixed_width() {
    for severity in [
        LogSeverity::Trace,
        LogSeverity::Debug,
        LogSeverity::Info,
        LogSeverity::Warn,
        LogSeverity::Error,
    ] {
        assert_eq!(severity.label().len(), 5);
    }
}

// ============================================================================
// DEFAULT LOGGER
// ============================================================================

#[test]
fn test_format_plain_without_location() {
    let text = DefaultLogger::format_plain(&entry(LogSeverity::Info, None, None));
    assert!(text.contains("[INFO ]"));
    assert!(text.contains("[aurora::test] hello"));
    assert!(!text.contains("("));
}

#[test]
fn test_format_plain_with_location() {
    let text = DefaultLogger::format_plain(&entry(LogSeverity::Error, Some("frame.rs"), Some(42)));
    assert!(text.contains("[ERROR]"));
    assert!(text.ends_with("(frame.rs:42)"));
}

#[test]
fn test_default_logger_does_not_panic() {
    DefaultLogger.log(&entry(LogSeverity::Warn, None, None));
    DefaultLogger.log(&entry(LogSeverity::Error, Some("x.rs"), Some(1)));
}

// ============================================================================
// FILTERED / NULL LOGGERS
// ============================================================================

#[test]
fn test_filtered_logger_drops_low_severity() {
    let capture = Arc::new(CaptureLogger::default());
    let filtered = FilteredLogger::new(Arc::clone(&capture), LogSeverity::Warn);

    filtered.log(&entry(LogSeverity::Debug, None, None));
    filtered.log(&entry(LogSeverity::Info, None, None));
    filtered.log(&entry(LogSeverity::Warn, None, None));
    filtered.log(&entry(LogSeverity::Error, None, None));

    assert_eq!(filtered.min_severity(), LogSeverity::Warn);
    assert_eq!(capture.severities(), vec![LogSeverity::Warn, LogSeverity::Error]);
}

#[test]
fn test_null_logger_accepts_everything() {
    let logger: SharedLogger = Arc::new(NullLogger);
    crate::engine_error!(logger, "aurora::test", "ignored {}", 1);
}

// ============================================================================
// MACROS
// ============================================================================

#[test]
fn test_macros_route_to_injected_logger() {
    let capture = Arc::new(CaptureLogger::default());
    let logger: SharedLogger = capture.clone();

    crate::engine_trace!(logger, "aurora::test", "t");
    crate::engine_debug!(logger, "aurora::test", "d {}", 1);
    crate::engine_info!(logger, "aurora::test", "i");
    crate::engine_warn!(logger, "aurora::test", "w");
    crate::engine_error!(logger, "aurora::test", "e");

    assert_eq!(
        capture.severities(),
        vec![
            LogSeverity::Trace,
            LogSeverity::Debug,
            LogSeverity::Info,
            LogSeverity::Warn,
            LogSeverity::Error,
        ]
    );

    let entries = capture.entries.lock().unwrap();
    assert_eq!(entries[1].message, "d 1");
    // Only ERROR carries file:line
    assert!(entries[3].file.is_none());
    assert!(entries[4].file.is_some());
    assert!(entries[4].line.is_some());
}

#[test]
fn test_two_components_keep_separate_loggers() {
    let first = Arc::new(CaptureLogger::default());
    let second = Arc::new(CaptureLogger::default());

    crate::engine_info!(first, "aurora::a", "one");
    crate::engine_info!(second, "aurora::b", "two");
    crate::engine_info!(second, "aurora::b", "three");

    assert_eq!(first.entries.lock().unwrap().len(), 1);
    assert_eq!(second.entries.lock().unwrap().len(), 2);
}
