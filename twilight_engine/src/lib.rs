/*!
# Twilight Engine

Backend-agnostic core of the Twilight real-time renderer.

The core owns the GPU resource lifecycle and frame synchronization, and talks
to the GPU only through the traits of the [`device`](twilight::device) module,
so every piece of it runs against an in-memory mock in unit tests. The Vulkan
implementation lives in `twilight_engine_renderer_vulkan`.

## Architecture

- **DescriptorPoolAllocator**: descriptor sets from pools that grow on exhaustion
- **StagedUploadEngine**: blocking staged uploads of buffers and mipmapped images
- **FrameScheduler**: double-buffered acquire / record / submit / present loop
- **MaterialBindingCache**: pipeline rebinds only on material archetype changes
- **DrawListAccumulator**: per-frame draw commands flattened from the scene graph
- **Renderer**: facade tying the above together
*/

// Internal modules
mod error;
mod engine;
pub mod log;
pub mod config;
pub mod device;
pub mod descriptor;
pub mod upload;
pub mod frame;
pub mod material;
pub mod scene;
pub mod renderer;

// Main twilight namespace module
pub mod twilight {
    // Error types
    pub use crate::error::{Error, Result};

    // Engine singleton (global logger)
    pub use crate::engine::Engine;

    // Renderer facade
    pub use crate::renderer::{Renderer, RendererStats};

    pub use crate::config::{CameraConfig, RendererConfig};

    // Logging sub-module (types only, macros are exported at the crate root)
    pub mod log {
        pub use crate::log::{format_entry, DefaultLogger, LogEntry, LogSeverity, Logger};
    }

    // Device traits and plain GPU types, for backend implementations
    pub mod device {
        pub use crate::device::*;
    }

    pub mod render {
        pub use crate::descriptor::*;
        pub use crate::frame::*;
        pub use crate::material::*;
        pub use crate::renderer::*;
        pub use crate::upload::*;
    }

    pub mod scene {
        pub use crate::scene::*;
    }
}

// Re-export math library at crate root
pub use glam;
