//! Node arena

use std::collections::HashMap;
use std::ops::Index;

use super::builtins::BuiltinType;
use super::{NodeId, TypeNode};

/// Arena owning every node built during a run
#[derive(Debug, Clone, Default)]
pub struct TypeGraph {
    nodes: Vec<TypeNode>,
    /// Shared built-in nodes, by local name
    builtins: HashMap<String, NodeId>,
}

impl TypeGraph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve a slot to be filled later
    ///
    /// The slot holds [`TypeNode::Pending`] until [`TypeGraph::fill`] is
    /// called, so a declaration can hand out its id before it is built.
    pub fn reserve(&mut self) -> NodeId {
        self.push(TypeNode::Pending)
    }

    /// Store the built node in a reserved slot
    pub fn fill(&mut self, id: NodeId, node: TypeNode) {
        if let Some(slot) = self.nodes.get_mut(id.index()) {
            *slot = node;
        }
    }

    /// Append a node
    pub fn push(&mut self, node: TypeNode) -> NodeId {
        let id = NodeId::new(self.nodes.len());
        self.nodes.push(node);
        id
    }

    /// Shared node for an XSD built-in datatype
    pub fn builtin(&mut self, local_name: &str) -> NodeId {
        if let Some(&id) = self.builtins.get(local_name) {
            return id;
        }
        let id = self.push(TypeNode::Builtin(BuiltinType::new(local_name)));
        self.builtins.insert(local_name.to_string(), id);
        id
    }

    /// Id of a built-in node, if one was created
    pub fn builtin_id(&self, local_name: &str) -> Option<NodeId> {
        self.builtins.get(local_name).copied()
    }

    /// Get a node
    pub fn get(&self, id: NodeId) -> Option<&TypeNode> {
        self.nodes.get(id.index())
    }

    /// Get a node mutably
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut TypeNode> {
        self.nodes.get_mut(id.index())
    }

    /// Number of nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the arena is empty
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterate over nodes with their ids
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &TypeNode)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (NodeId::new(i), node))
    }
}

impl Index<NodeId> for TypeGraph {
    type Output = TypeNode;

    fn index(&self, id: NodeId) -> &TypeNode {
        &self.nodes[id.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ModelType, XsdGroup};
    use crate::namespaces::QName;

    #[test]
    fn test_reserve_then_fill() {
        let mut graph = TypeGraph::new();
        let id = graph.reserve();
        assert_eq!(graph.get(id), Some(&TypeNode::Pending));

        let group = XsdGroup::named(QName::local("G"), ModelType::Sequence);
        graph.fill(id, TypeNode::Group(group));
        assert_eq!(graph[id].name(), Some("G"));
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn test_builtins_are_shared() {
        let mut graph = TypeGraph::new();
        let a = graph.builtin("string");
        let b = graph.builtin("string");
        let c = graph.builtin("int");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(graph.len(), 2);
    }

    #[test]
    fn test_iter_yields_ids_in_order() {
        let mut graph = TypeGraph::new();
        graph.builtin("string");
        graph.reserve();
        let ids: Vec<_> = graph.iter().map(|(id, _)| id.index()).collect();
        assert_eq!(ids, vec![0, 1]);
    }
}
