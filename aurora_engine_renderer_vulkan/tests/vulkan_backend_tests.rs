//! Integration tests for the Vulkan backend
//!
//! These tests drive the real device, swapchain and frame protocol.
//! All tests require a GPU and a display and are marked with #[ignore].
//!
//! Run with: cargo test --test vulkan_backend_tests -- --ignored

use std::sync::Arc;
use std::time::Duration;

use aurora_engine::aurora::device::{
    Buffer as _, BufferDesc, BufferUsage, ClearValues, DepthStencil as _, Extent2D, Fence as _,
    FenceStatus, GraphicsDevice, MemoryLocation, Swapchain as _, TextureFormat,
};
use aurora_engine::aurora::frame::{FrameManager, UniformSizes};
use aurora_engine::aurora::log::{NullLogger, SharedLogger};
use aurora_engine::aurora::render::{Camera, CameraUniform, EntityUniform, MaterialUniform};
use aurora_engine::aurora::{Config, Error};
use aurora_engine::glam::Vec3;
use aurora_engine_renderer_vulkan::{SamplerKind, VulkanBackend, VulkanDevice, WindowSurface};
use winit::event_loop::EventLoop;
use winit::window::Window;

/// Helper to create a hidden test window for Vulkan
#[allow(deprecated)]
fn create_test_window() -> (Arc<Window>, EventLoop<()>) {
    let event_loop = EventLoop::new().unwrap();
    let window_attrs = Window::default_attributes()
        .with_title("Aurora Vulkan Test")
        .with_inner_size(winit::dpi::PhysicalSize::new(800, 600))
        .with_visible(false);
    let window = event_loop.create_window(window_attrs).unwrap();
    (Arc::new(window), event_loop)
}

fn create_device(window: &Window) -> VulkanDevice {
    let logger: SharedLogger = Arc::new(NullLogger);
    VulkanDevice::new(window, &Config::default(), logger).unwrap()
}

// ============================================================================
// DEVICE / SYNC
// ============================================================================

#[test]
#[ignore] // Requires GPU
fn test_vulkan_fence_states() {
    let (window, _event_loop) = create_test_window();
    let device = create_device(&window);

    let signaled = device.create_fence(true).unwrap();
    assert_eq!(signaled.wait(Duration::from_secs(1)).unwrap(), FenceStatus::Signaled);
    assert!(signaled.is_signaled().unwrap());

    signaled.reset().unwrap();
    assert!(!signaled.is_signaled().unwrap());
    assert_eq!(signaled.wait(Duration::from_millis(10)).unwrap(), FenceStatus::TimedOut);
}

#[test]
#[ignore] // Requires GPU
fn test_vulkan_staging_buffer_bounds() {
    let (window, _event_loop) = create_test_window();
    let device = create_device(&window);

    let staging = device.create_buffer(&BufferDesc::staging("test_staging", 64)).unwrap();
    let data: [f32; 4] = [1.0, 2.0, 3.0, 4.0];

    staging.write(0, bytemuck::cast_slice(&data)).unwrap();
    staging.write(48, bytemuck::cast_slice(&data)).unwrap();
    assert!(staging.write(56, bytemuck::cast_slice(&data)).is_err());
}

#[test]
#[ignore] // Requires GPU
fn test_vulkan_zero_size_buffer_rejected() {
    let (window, _event_loop) = create_test_window();
    let device = create_device(&window);

    let result = device.create_buffer(&BufferDesc {
        name: "empty".to_string(),
        size: 0,
        usage: BufferUsage::VERTEX,
        location: MemoryLocation::GpuOnly,
    });
    assert!(matches!(result, Err(Error::InvalidResource(_))));
}

#[test]
#[ignore] // Requires GPU
fn test_vulkan_samplers() {
    let (window, _event_loop) = create_test_window();
    let device = create_device(&window);

    for kind in [
        SamplerKind::LinearRepeat,
        SamplerKind::LinearClamp,
        SamplerKind::NearestRepeat,
        SamplerKind::NearestClamp,
    ] {
        assert_eq!(device.create_sampler(kind).unwrap().kind(), kind);
    }
}

// ============================================================================
// SWAPCHAIN
// ============================================================================

#[test]
#[ignore] // Requires GPU
fn test_vulkan_swapchain_creation() {
    let (window, _event_loop) = create_test_window();
    let device = create_device(&window);
    let surface = WindowSurface::new(Arc::clone(&window));

    let swapchain = device.create_swapchain(&surface).unwrap();

    assert!(swapchain.image_count() >= 2);
    assert!(!swapchain.extent().is_empty());
    assert_eq!(swapchain.generation(), 0);
}

#[test]
#[ignore] // Requires GPU
fn test_vulkan_swapchain_resize_bumps_generation() {
    let (window, _event_loop) = create_test_window();
    let device = create_device(&window);
    let surface = WindowSurface::new(Arc::clone(&window));
    let mut swapchain = device.create_swapchain(&surface).unwrap();

    device.wait_idle().unwrap();
    swapchain.resize_to_surface(&surface).unwrap();

    assert_eq!(swapchain.generation(), 1);
    assert!(swapchain.image_count() >= 2);
}

#[test]
#[ignore] // Requires GPU
fn test_vulkan_depth_stencil_resize() {
    let (window, _event_loop) = create_test_window();
    let device = create_device(&window);
    let mut depth = device
        .create_depth_stencil(TextureFormat::D32_SFLOAT, Extent2D::new(800, 600))
        .unwrap();

    depth.resize(Extent2D::new(1024, 768)).unwrap();

    assert_eq!(depth.extent().width, 1024);
    assert_eq!(depth.format(), TextureFormat::D32_SFLOAT);
}

#[test]
#[ignore] // Requires GPU
fn test_vulkan_depth_stencil_rejects_color_format() {
    let (window, _event_loop) = create_test_window();
    let device = create_device(&window);

    let result = device.create_depth_stencil(
        TextureFormat::R8G8B8A8_UNORM,
        Extent2D::new(800, 600),
    );
    assert!(result.is_err());
}

// ============================================================================
// FRAME PROTOCOL
// ============================================================================

#[test]
#[ignore] // Requires GPU
fn test_vulkan_clear_frames_through_frame_manager() {
    let (window, _event_loop) = create_test_window();
    let device = create_device(&window);
    let surface = Arc::new(WindowSurface::new(Arc::clone(&window)));
    let config = Config::default();

    let swapchain = device.create_swapchain(surface.as_ref()).unwrap();
    let depth = device.create_depth_stencil(TextureFormat::D32_SFLOAT, swapchain.extent()).unwrap();
    let render_pass = device.create_render_pass(swapchain.format(), depth.format()).unwrap();
    let layouts = Arc::new(device.create_frame_layouts().unwrap());

    let mut frames = FrameManager::<VulkanBackend>::new(
        &device,
        swapchain,
        surface,
        &render_pass,
        depth.view(),
        layouts,
        UniformSizes::of::<CameraUniform, MaterialUniform, EntityUniform>(),
        &config,
        Arc::new(NullLogger),
    )
    .unwrap();

    let camera = Camera::look_at(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, 1.0, 4.0 / 3.0, 0.1, 100.0);
    let clear = ClearValues {
        color: [0.1, 0.2, 0.3, 1.0],
        depth: 1.0,
        stencil: 0,
    };

    let queue = frames.graphics_queue();
    let mut presented = 0;
    for _ in 0..8 {
        let Some(handle) = frames.get_frame().unwrap() else {
            continue;
        };
        {
            let mut frame = frames.frame(handle).unwrap();
            frame.prepare_render(&device, 0, 0).unwrap();
            frame.upload_camera_data(&camera.uniform()).unwrap();
            frame.schedule_start(&render_pass, &clear).unwrap();
            frame.schedule_stop().unwrap();
            frame.submit(&device, queue).unwrap();
        }
        frames.present_frame(handle).unwrap();
        presented += 1;
    }

    frames.wait_all().unwrap();
    device.wait_idle().unwrap();
    assert!(presented > 0);
}

#[test]
#[ignore] // Requires GPU
fn test_vulkan_prepare_twice_restarts_recording() {
    let (window, _event_loop) = create_test_window();
    let device = create_device(&window);
    let surface = Arc::new(WindowSurface::new(Arc::clone(&window)));

    let swapchain = device.create_swapchain(surface.as_ref()).unwrap();
    let depth = device.create_depth_stencil(TextureFormat::D32_SFLOAT, swapchain.extent()).unwrap();
    let render_pass = device.create_render_pass(swapchain.format(), depth.format()).unwrap();
    let layouts = Arc::new(device.create_frame_layouts().unwrap());

    let mut frames = FrameManager::<VulkanBackend>::new(
        &device,
        swapchain,
        surface,
        &render_pass,
        depth.view(),
        layouts,
        UniformSizes::of::<CameraUniform, MaterialUniform, EntityUniform>(),
        &Config::default(),
        Arc::new(NullLogger),
    )
    .unwrap();

    let camera = Camera::look_at(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, 1.0, 4.0 / 3.0, 0.1, 100.0);
    let queue = frames.graphics_queue();
    let handle = frames.get_frame().unwrap().expect("first acquire");
    {
        let mut frame = frames.frame(handle).unwrap();
        frame.prepare_render(&device, 2, 5).unwrap();
        frame.upload_camera_data(&camera.uniform()).unwrap();

        // The command buffer is still recording; preparing again resets it
        frame.prepare_render(&device, 1, 3).unwrap();
        frame.upload_camera_data(&camera.uniform()).unwrap();
        frame.schedule_start(&render_pass, &ClearValues::default()).unwrap();
        frame.schedule_stop().unwrap();
        frame.submit(&device, queue).unwrap();
    }
    frames.present_frame(handle).unwrap();
    frames.wait_all().unwrap();
}
