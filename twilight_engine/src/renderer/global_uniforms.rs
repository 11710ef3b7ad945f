/// GPU-visible per-frame and per-draw data
///
/// `GlobalUniforms` backs set 0 binding 0 (one buffer per frame slot);
/// `PushConstants` is pushed before every draw.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use crate::config::CameraConfig;
use crate::device::Extent2D;

pub const MAX_LIGHTS: usize = 4;

/// A point light
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    pub position: Vec3,
    pub color: Vec3,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct LightData {
    /// xyz, w unused
    pub position: [f32; 4],
    pub color: [f32; 4],
}

impl From<Light> for LightData {
    fn from(light: Light) -> Self {
        Self {
            position: light.position.extend(1.0).to_array(),
            color: light.color.extend(1.0).to_array(),
        }
    }
}

/// std140-compatible global uniform block
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct GlobalUniforms {
    pub projection: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub lights: [LightData; MAX_LIGHTS],
    pub light_count: u32,
    pub _pad: [u32; 3],
}

impl GlobalUniforms {
    pub fn from_camera(camera: &CameraConfig, extent: Extent2D) -> Self {
        Self {
            projection: projection(camera, extent).to_cols_array_2d(),
            view: Mat4::look_at_rh(camera.eye, camera.target, camera.up).to_cols_array_2d(),
            lights: [LightData::default(); MAX_LIGHTS],
            light_count: 0,
            _pad: [0; 3],
        }
    }

    /// Store `light` in the next free slot; `false` when all slots are taken
    pub fn push_light(&mut self, light: Light) -> bool {
        let index = self.light_count as usize;
        if index >= MAX_LIGHTS {
            return false;
        }
        self.lights[index] = light.into();
        self.light_count += 1;
        true
    }
}

/// Right-handed perspective with a [0, 1] depth range and Y pointing up in
/// clip space (Vulkan's framebuffer Y points down)
pub fn projection(camera: &CameraConfig, extent: Extent2D) -> Mat4 {
    let aspect = if extent.is_empty() { 1.0 } else { extent.width as f32 / extent.height as f32 };
    let mut projection = Mat4::perspective_rh(
        camera.fov_y_degrees.to_radians(),
        aspect,
        camera.near,
        camera.far,
    );
    projection.y_axis.y *= -1.0;
    projection
}

/// Per-draw vertex-stage constants (128 bytes)
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct PushConstants {
    pub model: [[f32; 4]; 4],
    /// Inverse transpose of `model`, for normals under non-uniform scale
    pub normal: [[f32; 4]; 4],
}

impl PushConstants {
    pub const SIZE: u32 = std::mem::size_of::<PushConstants>() as u32;

    pub fn new(model: Mat4) -> Self {
        let normal = if model.determinant().abs() > f32::EPSILON {
            model.inverse().transpose()
        } else {
            Mat4::IDENTITY
        };
        Self { model: model.to_cols_array_2d(), normal: normal.to_cols_array_2d() }
    }
}

#[cfg(test)]
#[path = "global_uniforms_tests.rs"]
mod tests;
