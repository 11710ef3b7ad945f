/// Mesh geometry uploaded to GPU-only buffers

use bytemuck::{Pod, Zeroable};
use slotmap::new_key_type;
use crate::device::{GpuBuffer, VertexAttribute, VertexFormat};
use crate::material::MaterialId;

new_key_type! {
    /// Stable key of a mesh owned by the renderer
    pub struct MeshKey;
}

/// Vertex layout shared by every archetype
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex {
    pub const STRIDE: u32 = std::mem::size_of::<Vertex>() as u32;

    pub fn new(position: [f32; 3], normal: [f32; 3], uv: [f32; 2]) -> Self {
        Self { position, normal, uv }
    }

    /// Attribute locations 0 (position), 1 (normal), 2 (uv)
    pub fn attributes() -> Vec<VertexAttribute> {
        vec![
            VertexAttribute { location: 0, offset: 0, format: VertexFormat::Float3 },
            VertexAttribute { location: 1, offset: 12, format: VertexFormat::Float3 },
            VertexAttribute { location: 2, offset: 24, format: VertexFormat::Float2 },
        ]
    }
}

/// Vertex and index buffers of one drawable, plus its material
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mesh {
    pub vertex_buffer: GpuBuffer,
    pub index_buffer: GpuBuffer,
    /// Number of `u32` indices
    pub index_count: u32,
    pub material: MaterialId,
}

impl Mesh {
    pub fn triangle_count(&self) -> u32 {
        self.index_count / 3
    }
}

#[cfg(test)]
#[path = "mesh_tests.rs"]
mod tests;
