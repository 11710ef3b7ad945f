//! Scene graph, meshes and the per-frame draw list

mod draw_list;
mod mesh;
mod scene_graph;

pub use draw_list::{DrawCommand, DrawListAccumulator};
pub use mesh::{Mesh, MeshKey, Vertex};
pub use scene_graph::{NodeId, SceneGraph, SceneNode};
