//! Unit tests for vulkan_debug.rs
//!
//! Severity mapping only, no GPU required.

use super::*;

type Flags = vk::DebugUtilsMessageSeverityFlagsEXT;

#[test]
fn test_severity_flags_errors_only() {
    assert_eq!(severity_flags(LogSeverity::Error), Flags::ERROR);
}

#[test]
fn test_severity_flags_warn() {
    assert_eq!(severity_flags(LogSeverity::Warn), Flags::ERROR | Flags::WARNING);
}

#[test]
fn test_severity_flags_debug_includes_info() {
    assert_eq!(
        severity_flags(LogSeverity::Debug),
        Flags::ERROR | Flags::WARNING | Flags::INFO
    );
}

#[test]
fn test_severity_flags_trace_includes_everything() {
    assert_eq!(
        severity_flags(LogSeverity::Trace),
        Flags::ERROR | Flags::WARNING | Flags::INFO | Flags::VERBOSE
    );
}

#[test]
fn test_log_severity_mapping() {
    assert_eq!(log_severity(Flags::ERROR), LogSeverity::Error);
    assert_eq!(log_severity(Flags::WARNING), LogSeverity::Warn);
    assert_eq!(log_severity(Flags::INFO), LogSeverity::Info);
    assert_eq!(log_severity(Flags::VERBOSE), LogSeverity::Trace);
}

#[test]
fn test_validation_stats_total() {
    let stats = ValidationStats { errors: 1, warnings: 2, info: 3, verbose: 4 };

    assert_eq!(stats.total(), 10);
    assert_eq!(ValidationStats::default().total(), 0);
}
