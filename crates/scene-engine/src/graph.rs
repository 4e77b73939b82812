use slotmap::SlotMap;
use tracing::debug;

use scene_kernel::Mesh;

use crate::types::{GroupId, GroupNode, SceneGraph, TransformStep};

/// Errors from scene graph construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SceneError {
    #[error("group {0:?} does not exist")]
    GroupNotFound(GroupId),
}

impl SceneGraph {
    /// Create a graph holding a single empty root group.
    pub fn new() -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(GroupNode::default());
        Self { nodes, root }
    }

    pub fn root(&self) -> GroupId {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn group(&self, id: GroupId) -> Option<&GroupNode> {
        self.nodes.get(id)
    }

    pub fn group_mut(&mut self, id: GroupId) -> Option<&mut GroupNode> {
        self.nodes.get_mut(id)
    }

    /// Append a new empty child group under `parent`.
    pub fn add_group(&mut self, parent: GroupId) -> Result<GroupId, SceneError> {
        if !self.nodes.contains_key(parent) {
            return Err(SceneError::GroupNotFound(parent));
        }
        let child = self.nodes.insert(GroupNode::default());
        self.nodes[parent].children.push(child);
        debug!(?parent, ?child, "added scene group");
        Ok(child)
    }

    /// Append a transform operation to the group's ordered list.
    pub fn push_transform(&mut self, id: GroupId, step: TransformStep) -> Result<(), SceneError> {
        let node = self.nodes.get_mut(id).ok_or(SceneError::GroupNotFound(id))?;
        node.transforms.push(step);
        Ok(())
    }

    /// Give the group ownership of a mesh.
    pub fn push_mesh(&mut self, id: GroupId, mesh: Mesh) -> Result<(), SceneError> {
        let node = self.nodes.get_mut(id).ok_or(SceneError::GroupNotFound(id))?;
        node.meshes.push(mesh);
        Ok(())
    }

    /// Total meshes in the subtree rooted at the graph root.
    pub fn count_meshes(&self) -> usize {
        self.count_in(self.root)
    }

    fn count_in(&self, id: GroupId) -> usize {
        let Some(node) = self.nodes.get(id) else {
            return 0;
        };
        node.meshes.len()
            + node
                .children
                .iter()
                .map(|&child| self.count_in(child))
                .sum::<usize>()
    }
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}
