/// Scene graph arena
///
/// Nodes live in a flat vector addressed by `NodeId`. Every node caches its
/// world matrix (`parent.world * local`); any change to a local transform or to
/// the hierarchy re-propagates world matrices through the affected subtree
/// with an explicit stack.

use glam::Mat4;
use crate::error::{Error, Result};
use super::mesh::MeshKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    pub local: Mat4,
    pub world: Mat4,
    pub meshes: Vec<MeshKey>,
    pub parent: Option<NodeId>,
    /// In insertion order
    pub children: Vec<NodeId>,
}

#[derive(Debug, Default)]
pub struct SceneGraph {
    nodes: Vec<SceneNode>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a detached node (its world matrix equals `local`)
    pub fn create_node(&mut self, local: Mat4) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(SceneNode {
            local,
            world: local,
            meshes: Vec::new(),
            parent: None,
            children: Vec::new(),
        });
        id
    }

    pub fn node(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(id.0 as usize)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn world_transform(&self, id: NodeId) -> Option<Mat4> {
        self.node(id).map(|n| n.world)
    }

    /// Make `child` the last child of `parent`, detaching it from its previous parent
    ///
    /// # Errors
    ///
    /// `InvalidResource` for unknown ids, or when the move would create a
    /// cycle (`child` is `parent` or one of its ancestors).
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.check(parent)?;
        self.check(child)?;
        if self.is_ancestor_or_self(child, parent) {
            return Err(Error::InvalidResource(format!(
                "node {} cannot become a child of its descendant {}",
                child.0, parent.0
            )));
        }

        if let Some(old_parent) = self.nodes[child.0 as usize].parent {
            self.nodes[old_parent.0 as usize].children.retain(|&c| c != child);
        }
        self.nodes[parent.0 as usize].children.push(child);
        self.nodes[child.0 as usize].parent = Some(parent);

        self.propagate(child);
        Ok(())
    }

    /// Give `node` the same parent as `sibling` (appended after the existing children)
    pub fn append_sibling(&mut self, sibling: NodeId, node: NodeId) -> Result<()> {
        self.check(sibling)?;
        let parent = self.nodes[sibling.0 as usize].parent.ok_or_else(|| {
            Error::InvalidResource(format!("node {} has no parent to share", sibling.0))
        })?;
        self.append_child(parent, node)
    }

    /// Replace the local transform and refresh the subtree's world matrices
    pub fn set_transform(&mut self, id: NodeId, local: Mat4) -> Result<()> {
        self.check(id)?;
        self.nodes[id.0 as usize].local = local;
        self.propagate(id);
        Ok(())
    }

    pub fn attach_mesh(&mut self, id: NodeId, mesh: MeshKey) -> Result<()> {
        self.check(id)?;
        self.nodes[id.0 as usize].meshes.push(mesh);
        Ok(())
    }

    fn check(&self, id: NodeId) -> Result<()> {
        if (id.0 as usize) < self.nodes.len() {
            Ok(())
        } else {
            Err(Error::InvalidResource(format!("unknown scene node {}", id.0)))
        }
    }

    fn is_ancestor_or_self(&self, candidate: NodeId, mut node: NodeId) -> bool {
        loop {
            if node == candidate {
                return true;
            }
            match self.nodes[node.0 as usize].parent {
                Some(parent) => node = parent,
                None => return false,
            }
        }
    }

    /// Recompute `world` for `root` and all of its descendants
    fn propagate(&mut self, root: NodeId) {
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let parent_world = self.nodes[id.0 as usize]
                .parent
                .map_or(Mat4::IDENTITY, |p| self.nodes[p.0 as usize].world);
            let node = &mut self.nodes[id.0 as usize];
            node.world = parent_world * node.local;
            stack.extend(node.children.iter().copied());
        }
    }
}

#[cfg(test)]
#[path = "scene_graph_tests.rs"]
mod tests;
