//! Unit tests for error.rs
//!
//! Tests Display strings, trait impls and the engine_err!/engine_bail! macros.

use crate::error::{Error, Result};

// ============================================================================
// ERROR DISPLAY TESTS
// ============================================================================

#[test]
fn test_backend_error_display() {
    let err = Error::BackendError("vkQueueSubmit failed: ERROR_DEVICE_LOST".to_string());
    let display = format!("{}", err);
    assert!(display.contains("Backend error"));
    assert!(display.contains("ERROR_DEVICE_LOST"));
}

#[test]
fn test_out_of_memory_display() {
    assert_eq!(format!("{}", Error::OutOfMemory), "Out of GPU memory");
}

#[test]
fn test_recoverable_conditions_display() {
    assert_eq!(format!("{}", Error::DescriptorPoolExhausted), "Descriptor pool exhausted");
    assert_eq!(format!("{}", Error::SwapchainOutOfDate), "Swapchain out of date");
}

#[test]
fn test_asset_load_failed_display() {
    let err = Error::AssetLoadFailed("shaders/missing.spv".to_string());
    assert_eq!(format!("{}", err), "Asset load failed: shaders/missing.spv");
}

#[test]
fn test_invalid_resource_display() {
    let err = Error::InvalidResource("pixel data size mismatch".to_string());
    let display = format!("{}", err);
    assert!(display.starts_with("Invalid resource"));
}

// ============================================================================
// TRAIT IMPLEMENTATIONS
// ============================================================================

#[test]
fn test_error_is_std_error() {
    let err = Error::OutOfMemory;
    let _: &dyn std::error::Error = &err;
}

#[test]
fn test_error_clone_and_eq() {
    let err = Error::InitializationFailed("no queue".to_string());
    assert_eq!(err.clone(), err);
    assert_ne!(Error::DescriptorPoolExhausted, Error::SwapchainOutOfDate);
}

// ============================================================================
// MACROS
// ============================================================================

fn failing_call() -> Result<u32> {
    crate::engine_bail!("twilight::test", "vkAllocateDescriptorSets failed: {}", -1000069000);
}

#[test]
fn test_engine_bail_returns_backend_error() {
    let err = failing_call().unwrap_err();
    assert_eq!(
        err,
        Error::BackendError("vkAllocateDescriptorSets failed: -1000069000".to_string())
    );
}

#[test]
fn test_engine_err_builds_backend_error() {
    let err = crate::engine_err!("twilight::test", "code {}", 7);
    assert!(matches!(err, Error::BackendError(ref msg) if msg == "code 7"));
}
