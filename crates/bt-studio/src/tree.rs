// crates/bt-studio/src/tree.rs

//! The abstract behavior tree.
//!
//! An [`AbsBehaviorTree`] is the in-memory hierarchy of node *instances*
//! owned by the presentation layer for the lifetime of an open document.
//! Nodes are addressed by index; child order is meaningful. The XML layer
//! only borrows this structure during a single build call and never retains
//! a reference.

use crate::model::NodeModel;
use std::collections::BTreeMap;

/// Distinguishes a plain node instance from a sub-tree reference.
///
/// Sub-tree references carry an `expanded` flag: a collapsed reference is
/// serialized as an opaque leaf, its body written once under its own
/// `<BehaviorTree>` section instead of being inlined at every use site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Node,
    SubTree { expanded: bool },
}

/// One node instance inside an [`AbsBehaviorTree`].
#[derive(Debug, Clone)]
pub struct AbsNode {
    /// The definition this instance was created from. `None` marks an
    /// unresolved instance; serializing such a node is a contract violation
    /// on the side of the owning front-end, not a recoverable parse error.
    pub model: Option<NodeModel>,
    /// Instance label. Defaults to the registration ID; a distinct value is
    /// written out as the `name` attribute.
    pub instance_name: String,
    /// Current literal value of each port, keyed by port name.
    pub port_values: BTreeMap<String, String>,
    pub kind: NodeKind,
    /// Indices of the children, in order, into the owning tree.
    pub children: Vec<usize>,
}

impl AbsNode {
    pub fn new(model: NodeModel) -> Self {
        AbsNode {
            instance_name: model.registration_id.clone(),
            model: Some(model),
            port_values: BTreeMap::new(),
            kind: NodeKind::Node,
            children: Vec::new(),
        }
    }

    pub fn subtree(model: NodeModel, expanded: bool) -> Self {
        let mut node = AbsNode::new(model);
        node.kind = NodeKind::SubTree { expanded };
        node
    }

    /// Capability query used by the XML builder: `false` means the node is
    /// a collapsed sub-tree reference whose body must not be descended into.
    pub fn is_expanded(&self) -> bool {
        match self.kind {
            NodeKind::Node => true,
            NodeKind::SubTree { expanded } => expanded,
        }
    }

    pub fn registration_id(&self) -> Option<&str> {
        self.model.as_ref().map(|m| m.registration_id.as_str())
    }
}

/// Index-addressed tree of node instances.
#[derive(Debug, Clone, Default)]
pub struct AbsBehaviorTree {
    nodes: Vec<AbsNode>,
    root: Option<usize>,
}

impl AbsBehaviorTree {
    pub fn new() -> Self {
        AbsBehaviorTree::default()
    }

    /// Appends a node. With `parent == None` the node becomes the root
    /// (valid only once, on an empty tree); otherwise it is linked as the
    /// last child of `parent`.
    pub fn add_node(&mut self, parent: Option<usize>, node: AbsNode) -> usize {
        let index = self.nodes.len();
        self.nodes.push(node);
        match parent {
            Some(p) => self.nodes[p].children.push(index),
            None => self.root = Some(index),
        }
        index
    }

    pub fn node(&self, index: usize) -> Option<&AbsNode> {
        self.nodes.get(index)
    }

    pub fn node_mut(&mut self, index: usize) -> Option<&mut AbsNode> {
        self.nodes.get_mut(index)
    }

    pub fn root_index(&self) -> Option<usize> {
        self.root
    }

    /// The root to serialize from: a synthetic "Root" wrapper with a single
    /// child is skipped, everything else is returned as-is.
    pub fn effective_root_index(&self) -> Option<usize> {
        let root = self.root?;
        let node = &self.nodes[root];
        if node.children.len() == 1 && node.registration_id() == Some("Root") {
            return Some(node.children[0]);
        }
        Some(root)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &AbsNode> {
        self.nodes.iter()
    }
}
