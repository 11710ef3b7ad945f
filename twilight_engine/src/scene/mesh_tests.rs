//! Unit tests for mesh types

use crate::device::VertexFormat;
use crate::scene::Vertex;

#[test]
fn test_vertex_stride_is_32_bytes() {
    assert_eq!(Vertex::STRIDE, 32);
    assert_eq!(bytemuck::cast_slice::<Vertex, u8>(&[Vertex::default(); 3]).len(), 96);
}

#[test]
fn test_attributes_cover_the_vertex() {
    let attributes = Vertex::attributes();

    assert_eq!(attributes.len(), 3);
    assert_eq!(attributes[1].offset, 12);
    assert_eq!(attributes[2].offset, 24);
    assert_eq!(attributes[2].format, VertexFormat::Float2);
}

#[test]
fn test_vertex_bytes_layout() {
    let vertex = Vertex::new([1.0, 2.0, 3.0], [0.0, 0.0, 1.0], [0.5, 0.5]);
    let floats: &[f32] = bytemuck::cast_slice(bytemuck::bytes_of(&vertex));

    assert_eq!(floats, &[1.0, 2.0, 3.0, 0.0, 0.0, 1.0, 0.5, 0.5]);
}
