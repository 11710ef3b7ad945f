//! Error types for the Twilight engine
//!
//! Fatal GPU failures, the two recoverable conditions (descriptor pool
//! exhaustion, out-of-date swapchain) and soft asset failures all share
//! this enum so they can flow through `?`.

use std::fmt;

/// Result type for Twilight engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Twilight engine errors
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Backend-specific error (failed Vulkan call, with its result code)
    BackendError(String),

    /// Out of GPU memory
    OutOfMemory,

    /// Invalid resource (bad handle, size mismatch, wrong state)
    InvalidResource(String),

    /// Initialization failed (device, swapchain, pipelines)
    InitializationFailed(String),

    /// The current descriptor pool cannot satisfy another allocation
    DescriptorPoolExhausted,

    /// The surface changed and the swapchain must be recreated
    SwapchainOutOfDate,

    /// An external asset (shader file, pixel data) could not be loaded
    AssetLoadFailed(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::OutOfMemory => write!(f, "Out of GPU memory"),
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
            Error::DescriptorPoolExhausted => write!(f, "Descriptor pool exhausted"),
            Error::SwapchainOutOfDate => write!(f, "Swapchain out of date"),
            Error::AssetLoadFailed(msg) => write!(f, "Asset load failed: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

/// Log an error with file:line and build an `Error::BackendError` from it
///
/// # Example
///
/// ```ignore
/// let fence = device.create_fence(&info, None)
///     .map_err(|e| engine_err!("twilight::vulkan", "vkCreateFence failed: {:?}", e))?;
/// ```
#[macro_export]
macro_rules! engine_err {
    ($source:expr, $($arg:tt)*) => {{
        let message = format!($($arg)*);
        $crate::twilight::Engine::log_detailed(
            $crate::twilight::log::LogSeverity::Error,
            $source,
            message.clone(),
            file!(),
            line!()
        );
        $crate::twilight::Error::BackendError(message)
    }};
}

/// Log an error with file:line and return it from the enclosing function
#[macro_export]
macro_rules! engine_bail {
    ($source:expr, $($arg:tt)*) => {
        return Err($crate::engine_err!($source, $($arg)*))
    };
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
