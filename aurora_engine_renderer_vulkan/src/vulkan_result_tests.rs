//! Unit tests for vulkan_result.rs
//!
//! Pure lookups, no GPU required.

use super::*;

#[test]
fn test_describe_swapchain_results() {
    assert_eq!(
        describe_result(vk::Result::ERROR_OUT_OF_DATE_KHR),
        "the surface has changed and the swapchain must be recreated"
    );
    assert_eq!(
        describe_result(vk::Result::SUBOPTIMAL_KHR),
        "the swapchain no longer matches the surface properties exactly"
    );
}

#[test]
fn test_describe_unknown_result() {
    assert_eq!(describe_result(vk::Result::from_raw(-123_456)), "unknown Vulkan result");
}

#[test]
fn test_vk_error_memory_exhaustion() {
    assert_eq!(vk_error("vkAllocateDescriptorSets", vk::Result::ERROR_OUT_OF_POOL_MEMORY), Error::OutOfMemory);
    assert_eq!(vk_error("vkCreateBuffer", vk::Result::ERROR_OUT_OF_DEVICE_MEMORY), Error::OutOfMemory);
}

#[test]
fn test_vk_error_names_operation() {
    let error = vk_error("vkQueueSubmit", vk::Result::ERROR_DEVICE_LOST);

    match error {
        Error::BackendError(message) => {
            assert!(message.starts_with("vkQueueSubmit failed"));
            assert!(message.contains("device has been lost"));
        }
        other => panic!("unexpected error {:?}", other),
    }
}
