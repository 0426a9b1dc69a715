/// Vulkan debug messenger - routes validation layer messages into the engine logger
///
/// Compiled only with the `vulkan-validation` feature. The callback receives a
/// pointer to a boxed `DebugState` as user data, so there is no global state:
/// each device forwards to its own logger and keeps its own counters.

use std::ffi::{c_void, CStr};
use std::sync::atomic::{AtomicU32, Ordering};

use ash::vk;
use aurora_engine::aurora::log::{LogSeverity, SharedLogger};
use aurora_engine::aurora::{Error, Result};
use aurora_engine::engine_error;

/// Validation message counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidationStats {
    pub errors: u32,
    pub warnings: u32,
    pub info: u32,
    pub verbose: u32,
}

impl ValidationStats {
    pub fn total(&self) -> u32 {
        self.errors + self.warnings + self.info + self.verbose
    }
}

struct DebugState {
    logger: SharedLogger,
    errors: AtomicU32,
    warnings: AtomicU32,
    info: AtomicU32,
    verbose: AtomicU32,
}

impl DebugState {
    fn count(&self, severity: vk::DebugUtilsMessageSeverityFlagsEXT) {
        let counter = if severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::ERROR) {
            &self.errors
        } else if severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::WARNING) {
            &self.warnings
        } else if severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::INFO) {
            &self.info
        } else {
            &self.verbose
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

/// Installed debug messenger
///
/// Must be destroyed (dropped) before the instance.
pub(crate) struct DebugMessenger {
    loader: ash::ext::debug_utils::Instance,
    messenger: vk::DebugUtilsMessengerEXT,
    // Read by the callback through a raw pointer; boxed so its address is stable
    state: Box<DebugState>,
}

impl DebugMessenger {
    pub(crate) fn new(
        entry: &ash::Entry,
        instance: &ash::Instance,
        min_severity: LogSeverity,
        logger: SharedLogger,
    ) -> Result<Self> {
        let loader = ash::ext::debug_utils::Instance::new(entry, instance);
        let state = Box::new(DebugState {
            logger,
            errors: AtomicU32::new(0),
            warnings: AtomicU32::new(0),
            info: AtomicU32::new(0),
            verbose: AtomicU32::new(0),
        });

        let create_info = vk::DebugUtilsMessengerCreateInfoEXT::default()
            .message_severity(severity_flags(min_severity))
            .message_type(
                vk::DebugUtilsMessageTypeFlagsEXT::GENERAL
                    | vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION
                    | vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE,
            )
            .pfn_user_callback(Some(vulkan_debug_callback))
            .user_data(state.as_ref() as *const DebugState as *mut c_void);

        let messenger = unsafe { loader.create_debug_utils_messenger(&create_info, None) }
            .map_err(|e| {
                engine_error!(state.logger, "aurora::vulkan", "Failed to create debug messenger: {:?}", e);
                Error::InitializationFailed(format!("Failed to create debug messenger: {:?}", e))
            })?;

        Ok(Self { loader, messenger, state })
    }

    pub(crate) fn stats(&self) -> ValidationStats {
        ValidationStats {
            errors: self.state.errors.load(Ordering::Relaxed),
            warnings: self.state.warnings.load(Ordering::Relaxed),
            info: self.state.info.load(Ordering::Relaxed),
            verbose: self.state.verbose.load(Ordering::Relaxed),
        }
    }
}

impl Drop for DebugMessenger {
    fn drop(&mut self) {
        unsafe {
            self.loader.destroy_debug_utils_messenger(self.messenger, None);
        }
    }
}

/// Message severities delivered for a minimum engine severity
pub fn severity_flags(min_severity: LogSeverity) -> vk::DebugUtilsMessageSeverityFlagsEXT {
    let mut flags = vk::DebugUtilsMessageSeverityFlagsEXT::ERROR;
    if min_severity <= LogSeverity::Warn {
        flags |= vk::DebugUtilsMessageSeverityFlagsEXT::WARNING;
    }
    if min_severity <= LogSeverity::Info {
        flags |= vk::DebugUtilsMessageSeverityFlagsEXT::INFO;
    }
    if min_severity <= LogSeverity::Trace {
        flags |= vk::DebugUtilsMessageSeverityFlagsEXT::VERBOSE;
    }
    flags
}

/// Engine severity of a validation message
pub fn log_severity(severity: vk::DebugUtilsMessageSeverityFlagsEXT) -> LogSeverity {
    if severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::ERROR) {
        LogSeverity::Error
    } else if severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::WARNING) {
        LogSeverity::Warn
    } else if severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::INFO) {
        LogSeverity::Info
    } else {
        LogSeverity::Trace
    }
}

fn message_type_name(message_type: vk::DebugUtilsMessageTypeFlagsEXT) -> &'static str {
    if message_type.contains(vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION) {
        "Validation"
    } else if message_type.contains(vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE) {
        "Performance"
    } else {
        "General"
    }
}

unsafe fn c_str_or<'a>(ptr: *const std::os::raw::c_char, fallback: &'a str) -> std::borrow::Cow<'a, str> {
    if ptr.is_null() {
        std::borrow::Cow::Borrowed(fallback)
    } else {
        CStr::from_ptr(ptr).to_string_lossy()
    }
}

unsafe extern "system" fn vulkan_debug_callback(
    message_severity: vk::DebugUtilsMessageSeverityFlagsEXT,
    message_type: vk::DebugUtilsMessageTypeFlagsEXT,
    p_callback_data: *const vk::DebugUtilsMessengerCallbackDataEXT<'_>,
    p_user_data: *mut c_void,
) -> vk::Bool32 {
    if p_user_data.is_null() || p_callback_data.is_null() {
        return vk::FALSE;
    }
    let state = &*(p_user_data as *const DebugState);
    let data = &*p_callback_data;

    state.count(message_severity);

    let message_id = c_str_or(data.p_message_id_name, "Unknown");
    let message = c_str_or(data.p_message, "No message");
    aurora_engine::log::log(
        &state.logger,
        log_severity(message_severity),
        "aurora::vulkan::validation",
        format!("[{}] {}: {}", message_type_name(message_type), message_id, message),
    );

    // Never abort the Vulkan call that triggered the message
    vk::FALSE
}

#[cfg(test)]
#[path = "vulkan_debug_tests.rs"]
mod tests;
