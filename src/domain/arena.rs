//! Arena-backed syntax tree.
//!
//! Nodes live in a generational arena and reference each other by [`NodeId`].
//! The same id keys the layout map and the scene map, so tree, layout and scene
//! stay separate typed structures.

use std::fmt;

use generational_arena::{Arena, Index};
use tracing::instrument;

/// Stable identifier of a tree node, shared by tree, layout and scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(Index);

impl NodeId {
    /// Arena slot of this node, used for markup attributes.
    pub fn slot(&self) -> usize {
        self.0.into_raw_parts().0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.slot())
    }
}

/// Tree node in the arena. Immutable once the builder returns the arena.
#[derive(Debug, Clone)]
pub struct TreeNode {
    /// Display text
    pub label: String,
    /// True iff the node was built from a leaf literal
    pub is_leaf: bool,
    /// Child ids, left to right
    pub children: Vec<NodeId>,
    /// In-order leaf labels of this subtree
    pub summary: Vec<String>,
    /// Parent id, None for the root
    pub parent: Option<NodeId>,
    /// Distance from the root (root = 0)
    pub depth: usize,
}

impl TreeNode {
    /// A node with at least one child. Zero-child nodes are never interactive.
    pub fn is_internal(&self) -> bool {
        !self.children.is_empty()
    }

    /// Summary text as shown when the subtree is collapsed.
    pub fn summary_text(&self) -> String {
        self.summary.join(" ")
    }
}

/// Arena-based syntax tree.
#[derive(Debug, Clone)]
pub struct TreeArena {
    arena: Arena<TreeNode>,
    root: Option<NodeId>,
}

impl Default for TreeArena {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeArena {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            root: None,
        }
    }

    #[instrument(level = "trace", skip(self))]
    pub(crate) fn insert_node(
        &mut self,
        label: String,
        is_leaf: bool,
        parent: Option<NodeId>,
    ) -> NodeId {
        let depth = parent
            .and_then(|p| self.get_node(p))
            .map(|p| p.depth + 1)
            .unwrap_or(0);
        let summary = if is_leaf { vec![label.clone()] } else { Vec::new() };
        let node = TreeNode {
            label,
            is_leaf,
            children: Vec::new(),
            summary,
            parent,
            depth,
        };
        let node_id = NodeId(self.arena.insert(node));

        if let Some(parent_id) = parent {
            if let Some(parent) = self.arena.get_mut(parent_id.0) {
                parent.children.push(node_id);
            }
        } else {
            self.root = Some(node_id);
        }

        node_id
    }

    /// Append a finished child's summary to its parent's summary.
    pub(crate) fn extend_summary(&mut self, node_id: NodeId, labels: &[String]) {
        if let Some(node) = self.arena.get_mut(node_id.0) {
            node.summary.extend_from_slice(labels);
        }
    }

    pub fn get_node(&self, id: NodeId) -> Option<&TreeNode> {
        self.arena.get(id.0)
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Pre-order, left-to-right traversal.
    pub fn iter(&self) -> TreeIterator<'_> {
        TreeIterator::new(self)
    }

    /// Post-order, left-to-right traversal.
    pub fn iter_postorder(&self) -> PostOrderIterator<'_> {
        PostOrderIterator::new(self)
    }

    /// Number of levels; an empty tree has depth 0.
    #[instrument(level = "debug", skip(self))]
    pub fn depth(&self) -> usize {
        self.iter().map(|(_, node)| node.depth + 1).max().unwrap_or(0)
    }

    /// Labels of all leaves in left-to-right order.
    ///
    /// Zero-child internal nodes are not leaves and contribute nothing.
    pub fn leaf_labels(&self) -> Vec<String> {
        self.iter()
            .filter(|(_, node)| node.is_leaf)
            .map(|(_, node)| node.label.clone())
            .collect()
    }

    /// All nodes carrying `label`, in pre-order.
    pub fn find_by_label(&self, label: &str) -> Vec<NodeId> {
        self.iter()
            .filter(|(_, node)| node.label == label)
            .map(|(id, _)| id)
            .collect()
    }
}

pub struct TreeIterator<'a> {
    tree: &'a TreeArena,
    stack: Vec<NodeId>,
}

impl<'a> TreeIterator<'a> {
    fn new(tree: &'a TreeArena) -> Self {
        let mut stack = Vec::new();
        if let Some(root) = tree.root() {
            stack.push(root);
        }
        Self { tree, stack }
    }
}

impl<'a> Iterator for TreeIterator<'a> {
    type Item = (NodeId, &'a TreeNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current) = self.stack.pop() {
            if let Some(node) = self.tree.get_node(current) {
                // Push children in reverse order for left-to-right traversal
                for &child in node.children.iter().rev() {
                    self.stack.push(child);
                }
                return Some((current, node));
            }
        }
        None
    }
}

pub struct PostOrderIterator<'a> {
    tree: &'a TreeArena,
    stack: Vec<(NodeId, bool)>,
}

impl<'a> PostOrderIterator<'a> {
    fn new(tree: &'a TreeArena) -> Self {
        let mut stack = Vec::new();
        if let Some(root) = tree.root() {
            stack.push((root, false));
        }
        Self { tree, stack }
    }
}

impl<'a> Iterator for PostOrderIterator<'a> {
    type Item = (NodeId, &'a TreeNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((current, visited)) = self.stack.pop() {
            if let Some(node) = self.tree.get_node(current) {
                if !visited {
                    self.stack.push((current, true));
                    for &child in node.children.iter().rev() {
                        self.stack.push((child, false));
                    }
                } else {
                    return Some((current, node));
                }
            }
        }
        None
    }
}
