use crate::components::{Light, Mesh};
use crate::entity::NodeId;
use foundation::ids::IdAllocator;

#[derive(Debug, Clone, PartialEq)]
pub enum SceneNode {
    Light(Light),
    Mesh(Mesh),
}

/// Append-only list of lights and meshes for one overlay lifetime.
///
/// The overlay builds a new graph (with a new epoch) every time it is added
/// to a map. Backends mirror the graph incrementally: a changed epoch means
/// "throw everything away", otherwise only nodes past the last one seen are
/// new.
#[derive(Debug, Default)]
pub struct SceneGraph {
    epoch: u64,
    ids: IdAllocator,
    nodes: Vec<(NodeId, SceneNode)>,
}

impl SceneGraph {
    pub fn new(epoch: u64) -> Self {
        Self {
            epoch,
            ..Self::default()
        }
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn add_light(&mut self, light: Light) -> NodeId {
        self.push(SceneNode::Light(light))
    }

    pub fn add_mesh(&mut self, mesh: Mesh) -> NodeId {
        self.push(SceneNode::Mesh(mesh))
    }

    fn push(&mut self, node: SceneNode) -> NodeId {
        let id = NodeId(self.ids.next_id());
        self.nodes.push((id, node));
        id
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[(NodeId, SceneNode)] {
        &self.nodes
    }

    /// Nodes added after `last_seen`, or every node when `last_seen` is `None`.
    pub fn nodes_after(&self, last_seen: Option<NodeId>) -> &[(NodeId, SceneNode)] {
        let Some(last_seen) = last_seen else {
            return &self.nodes;
        };
        let start = self.nodes.partition_point(|(id, _)| *id <= last_seen);
        &self.nodes[start..]
    }

    pub fn lights(&self) -> impl Iterator<Item = &Light> {
        self.nodes.iter().filter_map(|(_, node)| match node {
            SceneNode::Light(light) => Some(light),
            SceneNode::Mesh(_) => None,
        })
    }

    pub fn meshes(&self) -> impl Iterator<Item = &Mesh> {
        self.nodes.iter().filter_map(|(_, node)| match node {
            SceneNode::Mesh(mesh) => Some(mesh),
            SceneNode::Light(_) => None,
        })
    }
}
