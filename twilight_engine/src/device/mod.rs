//! GPU device abstraction
//!
//! The core drives the GPU exclusively through [`GpuDevice`],
//! [`CommandRecorder`] and [`Presenter`]. Backends implement them over a real
//! API; `mock_device` implements them in memory for unit tests.

mod handles;
mod types;
mod sync;
mod resources;
mod command;
mod gpu_device;
mod presenter;

pub use handles::*;
pub use types::*;
pub use sync::*;
pub use resources::*;
pub use command::CommandRecorder;
pub use gpu_device::GpuDevice;
pub use presenter::{AcquireOutcome, PresentOutcome, Presenter, RenderBackend};

// Mock device for tests (no GPU required)
#[cfg(test)]
pub mod mock_device;
