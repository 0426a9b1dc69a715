/// Vulkan result codes - readable descriptions and engine error mapping

use aurora_engine::aurora::Error;
use ash::vk;

/// Human-readable description of a `vk::Result`
pub fn describe_result(result: vk::Result) -> &'static str {
    match result {
        vk::Result::SUCCESS => "success",
        vk::Result::NOT_READY => "a fence or query has not yet completed",
        vk::Result::TIMEOUT => "a wait operation has not completed in the specified time",
        vk::Result::EVENT_SET => "an event is signaled",
        vk::Result::EVENT_RESET => "an event is unsignaled",
        vk::Result::INCOMPLETE => "a return array was too small for the result",
        vk::Result::SUBOPTIMAL_KHR => "the swapchain no longer matches the surface properties exactly",
        vk::Result::ERROR_OUT_OF_HOST_MEMORY => "a host memory allocation has failed",
        vk::Result::ERROR_OUT_OF_DEVICE_MEMORY => "a device memory allocation has failed",
        vk::Result::ERROR_INITIALIZATION_FAILED => "initialization of an object could not be completed",
        vk::Result::ERROR_DEVICE_LOST => "the logical or physical device has been lost",
        vk::Result::ERROR_MEMORY_MAP_FAILED => "mapping of a memory object has failed",
        vk::Result::ERROR_LAYER_NOT_PRESENT => "a requested layer is not present or could not be loaded",
        vk::Result::ERROR_EXTENSION_NOT_PRESENT => "a requested extension is not supported",
        vk::Result::ERROR_FEATURE_NOT_PRESENT => "a requested feature is not supported",
        vk::Result::ERROR_INCOMPATIBLE_DRIVER => "the requested Vulkan version is not supported by the driver",
        vk::Result::ERROR_TOO_MANY_OBJECTS => "too many objects of the type have already been created",
        vk::Result::ERROR_FORMAT_NOT_SUPPORTED => "a requested format is not supported on this device",
        vk::Result::ERROR_FRAGMENTED_POOL => "a pool allocation has failed due to fragmentation",
        vk::Result::ERROR_OUT_OF_POOL_MEMORY => "a pool memory allocation has failed",
        vk::Result::ERROR_SURFACE_LOST_KHR => "the surface is no longer available",
        vk::Result::ERROR_NATIVE_WINDOW_IN_USE_KHR => "the native window is already in use",
        vk::Result::ERROR_OUT_OF_DATE_KHR => "the surface has changed and the swapchain must be recreated",
        vk::Result::ERROR_VALIDATION_FAILED_EXT => "a command failed validation",
        _ => "unknown Vulkan result",
    }
}

/// Map a failed `vk::Result` onto an engine error
///
/// Memory exhaustion becomes `Error::OutOfMemory`; everything else is a
/// `BackendError` naming the operation.
pub fn vk_error(what: &str, result: vk::Result) -> Error {
    match result {
        vk::Result::ERROR_OUT_OF_HOST_MEMORY
        | vk::Result::ERROR_OUT_OF_DEVICE_MEMORY
        | vk::Result::ERROR_OUT_OF_POOL_MEMORY
        | vk::Result::ERROR_FRAGMENTED_POOL => Error::OutOfMemory,
        _ => Error::BackendError(format!("{} failed: {:?} ({})", what, result, describe_result(result))),
    }
}

#[cfg(test)]
#[path = "vulkan_result_tests.rs"]
mod tests;
