//! Renderer configuration
//!
//! Plain data with sensible defaults. Construct with `RendererConfig::default()`
//! and override fields as needed.

use std::path::PathBuf;
use glam::Vec3;
use crate::device::{DescriptorPoolQuotas, DescriptorType, Format};

/// Initial camera used for the global uniform buffer
#[derive(Debug, Clone, PartialEq)]
pub struct CameraConfig {
    /// Vertical field of view in degrees
    pub fov_y_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_y_degrees: 45.0,
            near: 0.1,
            far: 100.0,
            eye: Vec3::new(0.0, 0.0, 5.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
        }
    }
}

/// Renderer configuration
#[derive(Debug, Clone)]
pub struct RendererConfig {
    pub app_name: String,

    /// Application version (major, minor, patch)
    pub app_version: (u32, u32, u32),

    /// Enable validation layers (needs the `vulkan-validation` feature)
    pub enable_validation: bool,

    /// SPIR-V for the default material archetype
    pub vertex_shader_path: PathBuf,
    pub fragment_shader_path: PathBuf,

    pub clear_color: [f32; 4],
    pub clear_depth: f32,
    pub depth_format: Format,

    /// Quotas of each material descriptor pool
    pub material_pool: DescriptorPoolQuotas,

    /// Quotas of each pool for engine-wide sets (global uniforms)
    pub general_pool: DescriptorPoolQuotas,

    pub camera: CameraConfig,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            app_name: "Twilight Application".to_string(),
            app_version: (1, 0, 0),
            enable_validation: cfg!(debug_assertions),
            vertex_shader_path: PathBuf::from("shaders/default.vert.spv"),
            fragment_shader_path: PathBuf::from("shaders/default.frag.spv"),
            clear_color: [0.1, 0.1, 0.1, 1.0],
            clear_depth: 1.0,
            depth_format: Format::D32_SFLOAT,
            material_pool: DescriptorPoolQuotas::new(
                20,
                &[
                    (DescriptorType::UniformBuffer, 20),
                    (DescriptorType::CombinedImageSampler, 80),
                ],
            ),
            general_pool: DescriptorPoolQuotas::new(20, &[(DescriptorType::UniformBuffer, 20)]),
            camera: CameraConfig::default(),
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
