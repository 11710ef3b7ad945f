/// Material types
///
/// A material is one descriptor set (set 1) bound against the pipeline of its
/// archetype. Binding 0 holds the constants uniform buffer; bindings 1 to 4
/// hold the textures in `MaterialTextureType` order.

use bytemuck::{Pod, Zeroable};
use glam::Vec4;
use crate::device::{DescriptorSetHandle, GpuBuffer, GpuImage, PipelineHandle, PipelineLayoutHandle};
use super::pipeline_registry::ArchetypeId;

/// Index of a material in the renderer's material table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MaterialId(pub u32);

impl MaterialId {
    /// Magenta placeholder, returned when a material cannot be built
    pub const DEFAULT: MaterialId = MaterialId(0);
}

/// Texture slots of the lit textured archetype
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaterialTextureType {
    BaseColor,
    Normal,
    Metallic,
    AmbientOcclusion,
}

impl MaterialTextureType {
    pub const ALL: [MaterialTextureType; 4] = [
        MaterialTextureType::BaseColor,
        MaterialTextureType::Normal,
        MaterialTextureType::Metallic,
        MaterialTextureType::AmbientOcclusion,
    ];

    /// Binding index inside the material set
    pub fn binding(self) -> u32 {
        match self {
            MaterialTextureType::BaseColor => 1,
            MaterialTextureType::Normal => 2,
            MaterialTextureType::Metallic => 3,
            MaterialTextureType::AmbientOcclusion => 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaterialConstantType {
    Albedo,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterialConstantBinding {
    pub ty: MaterialConstantType,
    pub value: Vec4,
}

/// A texture handed to `load_material`
///
/// Ownership moves into the material (or the texture is destroyed when the
/// material is rejected).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterialTextureBinding {
    pub ty: MaterialTextureType,
    pub image: GpuImage,
}

/// Layout of the constants uniform buffer (binding 0)
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct MaterialConstants {
    pub albedo: [f32; 4],
}

impl Default for MaterialConstants {
    fn default() -> Self {
        Self { albedo: [1.0; 4] }
    }
}

impl MaterialConstants {
    pub fn from_bindings(bindings: &[MaterialConstantBinding]) -> Self {
        let mut constants = Self::default();
        for binding in bindings {
            match binding.ty {
                MaterialConstantType::Albedo => constants.albedo = binding.value.to_array(),
            }
        }
        constants
    }
}

/// A loaded material
#[derive(Debug)]
pub struct Material {
    pub archetype: ArchetypeId,
    /// Owned by the pipeline registry
    pub pipeline: PipelineHandle,
    pub layout: PipelineLayoutHandle,
    pub descriptor_set: DescriptorSetHandle,
    /// Textures owned by this material
    pub images: Vec<GpuImage>,
    pub constants: GpuBuffer,
}

#[cfg(test)]
#[path = "material_tests.rs"]
mod tests;
