//! Deterministic pre-order flattening and root-to-node paths

use crate::tree::{FieldDescriptor, Node};

/// Position of a node in the pre-order sequence of its tree.
pub type NodeId = usize;

/// One flattened node with its link to the parent.
#[derive(Debug, Clone, Copy)]
pub struct FlatNode<'a> {
    pub id: NodeId,
    pub node: &'a Node,
    pub parent: Option<NodeId>,
    /// Field (and index) of the parent holding this node.
    pub slot: Option<(&'static FieldDescriptor, Option<usize>)>,
    pub depth: usize,
}

/// One step on the way from the root to a node.
///
/// `field` is absent only for the terminal entry; `index` is present only
/// when `field` is a sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AstPathEntry {
    pub node: NodeId,
    pub field: Option<&'static FieldDescriptor>,
    pub index: Option<usize>,
}

pub type AstPath = Vec<AstPathEntry>;

/// Every node of a tree in pre-order, ids assigned in visiting order.
#[derive(Debug, Clone)]
pub struct FlatTree<'a> {
    nodes: Vec<FlatNode<'a>>,
}

impl<'a> FlatTree<'a> {
    pub fn new(root: &'a Node) -> Self {
        let mut nodes = Vec::new();
        Self::visit(root, None, None, 0, &mut nodes);
        Self { nodes }
    }

    fn visit(
        node: &'a Node,
        parent: Option<NodeId>,
        slot: Option<(&'static FieldDescriptor, Option<usize>)>,
        depth: usize,
        nodes: &mut Vec<FlatNode<'a>>,
    ) {
        let id = nodes.len();
        nodes.push(FlatNode {
            id,
            node,
            parent,
            slot,
            depth,
        });
        for (descriptor, index, child) in node.children() {
            Self::visit(child, Some(id), Some((descriptor, index)), depth + 1, nodes);
        }
    }

    pub fn root(&self) -> &FlatNode<'a> {
        &self.nodes[0]
    }

    pub fn get(&self, id: NodeId) -> Option<&FlatNode<'a>> {
        self.nodes.get(id)
    }

    pub fn nodes(&self) -> &[FlatNode<'a>] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes that carry a span of their own.
    pub fn localizable(&self) -> impl Iterator<Item = &FlatNode<'a>> {
        self.nodes.iter().filter(|flat| flat.node.scope.is_some())
    }

    pub fn trivia_count(&self) -> usize {
        self.nodes.iter().filter(|flat| flat.node.is_trivia()).count()
    }

    /// True when `ancestor` is `node` itself or lies above it.
    pub fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.nodes.get(id).and_then(|flat| flat.parent);
        }
        false
    }

    /// Path from the root to `id`, terminal entry included.
    pub fn path_to(&self, id: NodeId) -> AstPath {
        let mut path = vec![AstPathEntry {
            node: id,
            field: None,
            index: None,
        }];
        let mut current = self.nodes.get(id);
        while let Some(flat) = current {
            let (Some(parent), Some((field, index))) = (flat.parent, flat.slot) else {
                break;
            };
            path.push(AstPathEntry {
                node: parent,
                field: Some(field),
                index,
            });
            current = self.nodes.get(parent);
        }
        path.reverse();
        path
    }
}

/// Pre-order list of nodes, optionally only those carrying a span.
pub fn flatten(root: &Node, only_localizable: bool) -> Vec<&Node> {
    FlatTree::new(root)
        .nodes()
        .iter()
        .filter(|flat| !only_localizable || flat.node.scope.is_some())
        .map(|flat| flat.node)
        .collect()
}
