//! Integration tests for VulkanBackend
//!
//! These tests check that VulkanBackend implements the device traits the
//! engine core relies on. All of them need a GPU and are marked #[ignore].
//!
//! Run with: cargo test --test vulkan_backend_tests -- --ignored


use gpu_test_utils::get_test_backend;
use twilight_engine::twilight::device::*;
use twilight_engine::twilight::render::{mip_level_count, DescriptorPoolAllocator, StagedUploadEngine};
use twilight_engine::twilight::Error;

// ============================================================================
// BUFFER TESTS
// ============================================================================

#[test]
#[ignore] // Requires GPU
fn test_vulkan_mapped_buffer_write_read() {
    let backend = get_test_backend();
    let mut backend = backend.lock().unwrap();

    let buffer = backend
        .create_buffer(&BufferDesc {
            size: 64,
            usage: BufferUsage::UNIFORM,
            location: MemoryLocation::CpuToGpu,
        })
        .unwrap();
    assert!(buffer.mapped);

    let data: Vec<u8> = (0..64).collect();
    backend.write_buffer(&buffer, 0, &data).unwrap();

    let mut out = vec![0u8; 16];
    backend.read_buffer(&buffer, 16, &mut out).unwrap();
    assert_eq!(out, data[16..32]);

    backend.destroy_buffer(&buffer);
}

#[test]
#[ignore] // Requires GPU
fn test_vulkan_write_past_end_rejected() {
    let backend = get_test_backend();
    let mut backend = backend.lock().unwrap();

    let buffer = backend
        .create_buffer(&BufferDesc {
            size: 16,
            usage: BufferUsage::UNIFORM,
            location: MemoryLocation::CpuToGpu,
        })
        .unwrap();

    let result = backend.write_buffer(&buffer, 8, &[0u8; 16]);
    assert!(matches!(result, Err(Error::InvalidResource(_))));

    // offset + len wraps around u64
    let result = backend.write_buffer(&buffer, u64::MAX, &[0u8; 4]);
    assert!(matches!(result, Err(Error::InvalidResource(_))));
    let mut out = [0u8; 4];
    let result = backend.read_buffer(&buffer, u64::MAX - 1, &mut out);
    assert!(matches!(result, Err(Error::InvalidResource(_))));

    backend.destroy_buffer(&buffer);
}

#[test]
#[ignore] // Requires GPU
fn test_vulkan_staged_upload_read_back() {
    let backend = get_test_backend();
    let mut backend = backend.lock().unwrap();
    let backend = &mut *backend;

    let mut uploads = StagedUploadEngine::new(backend).unwrap();
    let data: Vec<u8> = (0..=255).cycle().take(4096).collect();

    let buffer = uploads.create_buffer(backend, &data, BufferUsage::VERTEX).unwrap();
    assert!(!buffer.mapped);
    assert_eq!(buffer.size, 4096);

    let read = uploads.read_buffer(backend, &buffer).unwrap();
    assert_eq!(read, data);

    backend.destroy_buffer(&buffer);
    uploads.destroy(backend);
}

#[test]
#[ignore] // Requires GPU
fn test_vulkan_destroy_releases_allocations() {
    let backend = get_test_backend();
    let mut backend = backend.lock().unwrap();
    let baseline = backend.live_allocations();

    let buffer = backend
        .create_buffer(&BufferDesc {
            size: 256,
            usage: BufferUsage::VERTEX,
            location: MemoryLocation::GpuOnly,
        })
        .unwrap();
    let image = backend
        .create_image(&ImageDesc {
            extent: Extent3D::flat(4, 4),
            format: Format::R8G8B8A8_UNORM,
            usage: ImageUsage::SAMPLED,
            mip_levels: 1,
        })
        .unwrap();
    assert_eq!(backend.live_allocations(), baseline + 2);

    backend.destroy_buffer(&buffer);
    backend.destroy_image(&image);
    assert_eq!(backend.live_allocations(), baseline);
}

// ============================================================================
// IMAGE TESTS
// ============================================================================

#[test]
#[ignore] // Requires GPU
fn test_vulkan_mipmapped_image_upload() {
    let backend = get_test_backend();
    let mut backend = backend.lock().unwrap();
    let backend = &mut *backend;

    let mut uploads = StagedUploadEngine::new(backend).unwrap();
    let pixels = vec![0xffu8; 256 * 128 * 4];

    let image = uploads
        .create_image(
            backend,
            &pixels,
            Extent3D::flat(256, 128),
            Format::R8G8B8A8_SRGB,
            ImageUsage::SAMPLED,
            true,
        )
        .unwrap();

    assert_eq!(image.mip_levels, mip_level_count(256, 128));
    assert_eq!(image.mip_levels, 9);
    assert!(!image.view.is_null());

    backend.destroy_image(&image);
    uploads.destroy(backend);
}

#[test]
#[ignore] // Requires GPU
fn test_vulkan_depth_image() {
    let backend = get_test_backend();
    let mut backend = backend.lock().unwrap();

    let image = backend
        .create_image(&ImageDesc {
            extent: Extent3D::flat(800, 600),
            format: Format::D32_SFLOAT,
            usage: ImageUsage::DEPTH_STENCIL_ATTACHMENT,
            mip_levels: 1,
        })
        .unwrap();

    assert_eq!(image.format, Format::D32_SFLOAT);
    assert!(!image.handle.is_null());

    backend.destroy_image(&image);
}

// ============================================================================
// DESCRIPTOR TESTS
// ============================================================================

#[test]
#[ignore] // Requires GPU
fn test_vulkan_pool_exhaustion_reported() {
    let backend = get_test_backend();
    let mut backend = backend.lock().unwrap();

    let layout = backend
        .create_descriptor_set_layout(&[DescriptorBinding {
            binding: 0,
            ty: DescriptorType::UniformBuffer,
            stages: ShaderStages::VERTEX,
        }])
        .unwrap();
    let pool = backend
        .create_descriptor_pool(&DescriptorPoolQuotas::new(2, &[(DescriptorType::UniformBuffer, 2)]))
        .unwrap();

    backend.allocate_descriptor_set(pool, layout).unwrap();
    backend.allocate_descriptor_set(pool, layout).unwrap();
    let third = backend.allocate_descriptor_set(pool, layout);
    assert!(matches!(third, Err(Error::DescriptorPoolExhausted)));

    backend.reset_descriptor_pool(pool).unwrap();
    assert!(backend.allocate_descriptor_set(pool, layout).is_ok());

    backend.destroy_descriptor_pool(pool);
    backend.destroy_descriptor_set_layout(layout);
}

#[test]
#[ignore] // Requires GPU
fn test_vulkan_allocator_grows_past_quota() {
    let backend = get_test_backend();
    let mut backend = backend.lock().unwrap();
    let backend = &mut *backend;

    let layout = backend
        .create_descriptor_set_layout(&[DescriptorBinding {
            binding: 0,
            ty: DescriptorType::UniformBuffer,
            stages: ShaderStages::FRAGMENT,
        }])
        .unwrap();
    let mut allocator = DescriptorPoolAllocator::init(
        backend,
        "test",
        DescriptorPoolQuotas::new(4, &[(DescriptorType::UniformBuffer, 4)]),
    )
    .unwrap();

    let sets: Vec<_> = (0..10).map(|_| allocator.allocate(backend, layout).unwrap()).collect();
    assert_eq!(sets.len(), 10);
    assert_eq!(allocator.pool_count(), 3);

    allocator.destroy(backend);
    backend.destroy_descriptor_set_layout(layout);
}

// ============================================================================
// SYNCHRONIZATION TESTS
// ============================================================================

#[test]
#[ignore] // Requires GPU
fn test_vulkan_signaled_fence_does_not_block() {
    let backend = get_test_backend();
    let mut backend = backend.lock().unwrap();

    let fence = backend.create_fence(true).unwrap();
    backend.wait_for_fence(fence).unwrap();
    backend.reset_fence(fence).unwrap();
    backend.destroy_fence(fence);
}

#[test]
#[ignore] // Requires GPU
fn test_vulkan_empty_submit_signals_fence() {
    let backend = get_test_backend();
    let mut backend = backend.lock().unwrap();

    let cmd = backend.allocate_command_buffer().unwrap();
    let fence = backend.create_fence(false).unwrap();

    backend.begin_commands(cmd).unwrap();
    backend.end_commands(cmd).unwrap();
    backend
        .submit(&SubmitInfo { command_buffer: cmd, wait: None, signal: None, fence })
        .unwrap();
    backend.wait_for_fence(fence).unwrap();

    backend.reset_commands(cmd).unwrap();
    backend.destroy_fence(fence);
    backend.free_command_buffer(cmd);
}

// ============================================================================
// PRESENTATION TESTS
// ============================================================================

#[test]
#[ignore] // Requires GPU
fn test_vulkan_swapchain_properties() {
    let backend = get_test_backend();
    let backend = backend.lock().unwrap();

    let extent = backend.swapchain_extent();
    assert!(!extent.is_empty());
    assert!(matches!(
        backend.swapchain_format(),
        Format::B8G8R8A8_SRGB | Format::R8G8B8A8_SRGB | Format::B8G8R8A8_UNORM | Format::R8G8B8A8_UNORM
    ));
    assert!(!backend.swapchain_image(0).is_null());
    assert!(!backend.swapchain_image_view(0).is_null());
    assert!(backend.swapchain_image(u32::MAX).is_null());
}

#[test]
#[ignore] // Requires GPU
fn test_vulkan_recreate_swapchain_keeps_images() {
    let backend = get_test_backend();
    let mut backend = backend.lock().unwrap();

    backend.wait_idle().unwrap();
    let extent = backend.recreate_swapchain(Extent2D::new(640, 480)).unwrap();

    assert!(!extent.is_empty());
    assert_eq!(backend.swapchain_extent(), extent);
    assert!(!backend.swapchain_image(0).is_null());
}
