/// Per-frame draw list
///
/// `draw` flattens a subtree into one command per (node, mesh) pair; `flush`
/// hands them to the frame recorder. The list never survives a frame: `flush`
/// empties it whether or not recording succeeded.

use glam::Mat4;
use crate::engine_warn;
use crate::error::Result;
use super::mesh::MeshKey;
use super::scene_graph::{NodeId, SceneGraph};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawCommand {
    /// Not owning; the mesh may be destroyed before the flush
    pub mesh: MeshKey,
    pub transform: Mat4,
}

#[derive(Debug, Default)]
pub struct DrawListAccumulator {
    commands: Vec<DrawCommand>,
}

impl DrawListAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append every mesh of `node` and its descendants (pre-order, children in
    /// insertion order) with each node's world transform
    pub fn draw(&mut self, graph: &SceneGraph, node: NodeId) {
        if graph.node(node).is_none() {
            engine_warn!("twilight::DrawList", "draw() on unknown scene node {}", node.0);
            return;
        }

        let mut worklist = vec![node];
        while let Some(id) = worklist.pop() {
            let Some(scene_node) = graph.node(id) else { continue };
            self.commands.extend(
                scene_node
                    .meshes
                    .iter()
                    .map(|&mesh| DrawCommand { mesh, transform: scene_node.world }),
            );
            // Reversed so the first child is visited first
            worklist.extend(scene_node.children.iter().rev().copied());
        }
    }

    /// Issue every command once, then clear (also when `issue` fails)
    pub fn flush<F>(&mut self, mut issue: F) -> Result<()>
    where
        F: FnMut(&DrawCommand) -> Result<()>,
    {
        let result = self.commands.iter().try_for_each(&mut issue);
        self.commands.clear();
        result
    }

    /// Drop pending commands without issuing them
    pub fn clear(&mut self) {
        self.commands.clear();
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

#[cfg(test)]
#[path = "draw_list_tests.rs"]
mod tests;
