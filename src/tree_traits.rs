/*
Rendering a tree as text needs a conversion into termtree's `Tree`, which is defined
outside this crate, so the conversion lives on a local trait.
 */
use termtree::Tree;
use tracing::instrument;

use crate::domain::{NodeId, TreeArena, TreeLayout};

pub trait TreeNodeConvert {
    fn to_tree_string(&self) -> Tree<String>;
}

// Internal nodes are annotated with their summary: `VP  [saw you]`
impl TreeNodeConvert for TreeArena {
    #[instrument(level = "debug", skip(self))]
    fn to_tree_string(&self) -> Tree<String> {
        fn build_tree(arena: &TreeArena, id: NodeId) -> Tree<String> {
            let Some(node) = arena.get_node(id) else {
                return Tree::new(String::new());
            };
            let text = if node.is_internal() {
                format!("{}  [{}]", node.label, node.summary_text())
            } else {
                node.label.clone()
            };
            let leaves: Vec<_> = node.children.iter().map(|&c| build_tree(arena, c)).collect();
            Tree::new(text).with_leaves(leaves)
        }

        match self.root() {
            Some(root) => build_tree(self, root),
            None => Tree::new("Empty tree".to_string()),
        }
    }
}

/// A laid-out tree: labels annotated with their computed geometry.
pub struct LayoutView<'a> {
    pub tree: &'a TreeArena,
    pub layout: &'a TreeLayout,
}

impl TreeNodeConvert for LayoutView<'_> {
    fn to_tree_string(&self) -> Tree<String> {
        fn build_tree(view: &LayoutView<'_>, id: NodeId) -> Tree<String> {
            let label = view
                .tree
                .get_node(id)
                .map(|n| n.label.as_str())
                .unwrap_or_default();
            let text = match view.layout.get(id) {
                Some(l) => format!(
                    "{} x={} y={} center={} head={} total={}",
                    label, l.x, l.y, l.node_center, l.head_width, l.total_width
                ),
                None => label.to_string(),
            };
            let leaves: Vec<_> = view
                .tree
                .get_node(id)
                .map(|n| n.children.iter().map(|&c| build_tree(view, c)).collect())
                .unwrap_or_default();
            Tree::new(text).with_leaves(leaves)
        }

        match self.tree.root() {
            Some(root) => build_tree(self, root),
            None => Tree::new("Empty tree".to_string()),
        }
    }
}
