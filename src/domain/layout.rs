//! Layout pass: maps tree structure to pixel coordinates.
//!
//! Children are placed left to right with a fixed gap; a parent is centered over the
//! span of its children. The only external input is a text measurement function,
//! which makes the pass pure for a deterministic measure.

use std::collections::HashMap;

use tracing::{debug, instrument, trace};

use crate::domain::arena::{NodeId, TreeArena};

/// Geometry parameters of the layout pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutConfig {
    /// Horizontal gap between sibling subtrees
    pub spacing: f64,
    /// Vertical distance between tree levels
    pub vertical_gap: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            spacing: 15.0,
            vertical_gap: 40.0,
        }
    }
}

/// Computed geometry of one node.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutNode {
    pub x: f64,
    pub y: f64,
    /// Measured width of this node's own label
    pub head_width: f64,
    /// Width spanned by the whole subtree
    pub total_width: f64,
    /// Horizontal midpoint of `[x, x + total_width]`
    pub node_center: f64,
    /// `node_center` of each child, in child order
    pub child_centers: Vec<f64>,
    /// Child ids, in child order; their layouts live in the same [`TreeLayout`]
    pub children: Vec<NodeId>,
}

/// Layout of a whole tree, keyed by the tree's node ids.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TreeLayout {
    nodes: HashMap<NodeId, LayoutNode>,
    root: Option<NodeId>,
}

impl TreeLayout {
    pub fn get(&self, id: NodeId) -> Option<&LayoutNode> {
        self.nodes.get(&id)
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Layouts of the children of `id`, in child order.
    pub fn child_layouts(&self, id: NodeId) -> impl Iterator<Item = &LayoutNode> + '_ {
        self.nodes
            .get(&id)
            .into_iter()
            .flat_map(move |node| node.children.iter().filter_map(move |c| self.nodes.get(c)))
    }

    /// Bounding box `(width, height)` of the laid-out tree, measured from the origin.
    ///
    /// Height covers the label row of the deepest node plus `row_height`.
    pub fn extent(&self, row_height: f64) -> (f64, f64) {
        let width = self
            .nodes
            .values()
            .map(|n| n.x + n.total_width)
            .fold(0.0, f64::max);
        let height = self
            .nodes
            .values()
            .map(|n| n.y + row_height)
            .fold(0.0, f64::max);
        (width, height)
    }
}

/// Lay out `tree` starting at `(origin_x, origin_y)`.
///
/// `measure` returns the rendered pixel width of a label. Width is derived from the
/// child count, never from the `is_leaf` flag: a zero-child node is laid out like a leaf.
#[instrument(level = "debug", skip(tree, config, measure))]
pub fn layout<F>(
    tree: &TreeArena,
    origin_x: f64,
    origin_y: f64,
    config: &LayoutConfig,
    mut measure: F,
) -> TreeLayout
where
    F: FnMut(&str) -> f64,
{
    let mut result = TreeLayout {
        nodes: HashMap::with_capacity(tree.len()),
        root: tree.root(),
    };
    if let Some(root) = tree.root() {
        layout_node(tree, root, origin_x, origin_y, config, &mut measure, &mut result);
    }
    debug!("laid out {} nodes", result.len());
    result
}

fn layout_node<F>(
    tree: &TreeArena,
    id: NodeId,
    x: f64,
    y: f64,
    config: &LayoutConfig,
    measure: &mut F,
    out: &mut TreeLayout,
) -> (f64, f64)
where
    F: FnMut(&str) -> f64,
{
    let Some(node) = tree.get_node(id) else {
        return (0.0, x);
    };

    let head_width = measure(&node.label);

    let mut child_centers = Vec::with_capacity(node.children.len());
    let mut child_x = x;
    for &child in &node.children {
        let (child_width, child_center) =
            layout_node(tree, child, child_x, y + config.vertical_gap, config, measure, out);
        child_centers.push(child_center);
        child_x += child_width + config.spacing;
    }

    let (total_width, node_center) = if node.children.is_empty() {
        (head_width, x + head_width / 2.0)
    } else {
        let total = child_x - x - config.spacing;
        (total, x + total / 2.0)
    };

    trace!(
        "{} '{}': x={} y={} head={} total={}",
        id,
        node.label,
        x,
        y,
        head_width,
        total_width
    );

    out.nodes.insert(
        id,
        LayoutNode {
            x,
            y,
            head_width,
            total_width,
            node_center,
            child_centers,
            children: node.children.clone(),
        },
    );
    (total_width, node_center)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{TreeBuilder, TreeLiteral};

    #[test]
    fn given_single_leaf_when_laying_out_then_width_is_head_width() {
        let tree = TreeBuilder::new().build(&"word".into()).unwrap();
        let result = layout(&tree, 5.0, 0.0, &LayoutConfig::default(), |l: &str| {
            l.len() as f64
        });
        let root = result.get(tree.root().unwrap()).unwrap();
        assert_eq!(root.total_width, 4.0);
        assert_eq!(root.node_center, 7.0);
    }

    #[test]
    fn given_zero_child_node_when_laying_out_then_treated_as_leaf_shaped() {
        let tree = TreeBuilder::new()
            .build(&TreeLiteral::Node(vec!["X".into()]))
            .unwrap();
        let result = layout(&tree, 0.0, 0.0, &LayoutConfig::default(), |_: &str| 12.0);
        let root = result.get(tree.root().unwrap()).unwrap();
        assert_eq!(root.total_width, 12.0);
        assert_eq!(root.node_center, 6.0);
        assert!(root.child_centers.is_empty());
    }

    #[test]
    fn given_tree_when_computing_extent_then_covers_all_rows() {
        let tree = TreeBuilder::new()
            .build(&TreeLiteral::node("S", ["a".into(), "b".into()]))
            .unwrap();
        let result = layout(&tree, 0.0, 0.0, &LayoutConfig::default(), |_: &str| 10.0);
        assert_eq!(result.extent(20.0), (35.0, 60.0));
    }
}
