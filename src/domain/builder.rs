//! Tree builder: converts a [`TreeLiteral`] into an immutable [`TreeArena`].

use tracing::{debug, instrument};

use crate::domain::arena::{NodeId, TreeArena};
use crate::domain::entities::TreeLiteral;
use crate::domain::error::{DomainError, DomainResult};

/// Constructs arena trees from tree literals.
///
/// The whole tree is validated and built before anything is drawn, so a malformed
/// literal never leaves partial drawing state behind.
#[derive(Debug, Default)]
pub struct TreeBuilder {
    max_depth: Option<usize>,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject literals nested deeper than `max_depth` levels.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = Some(max_depth);
        self
    }

    /// Build a tree from a literal.
    ///
    /// A string becomes a leaf. A sequence's first element is the label and every
    /// further element is a child, appended in order. Summaries are filled bottom-up.
    ///
    /// # Errors
    /// `InvalidTreeShape` for an empty sequence, a sequence whose first element is not
    /// a string, or nesting beyond the configured maximum depth.
    #[instrument(level = "debug", skip(self, literal))]
    pub fn build(&self, literal: &TreeLiteral) -> DomainResult<TreeArena> {
        let mut tree = TreeArena::new();
        let mut stack: Vec<(&TreeLiteral, Option<NodeId>, Vec<usize>)> =
            vec![(literal, None, Vec::new())];

        while let Some((current, parent, path)) = stack.pop() {
            if let Some(max) = self.max_depth {
                if path.len() >= max {
                    return Err(DomainError::invalid_shape(
                        &path,
                        format!("nesting exceeds maximum depth {}", max),
                    ));
                }
            }

            match current {
                TreeLiteral::Leaf(label) => {
                    tree.insert_node(label.clone(), true, parent);
                }
                TreeLiteral::Node(items) => {
                    let (head, rest) = items.split_first().ok_or_else(|| {
                        DomainError::invalid_shape(&path, "sequence must have at least one element")
                    })?;
                    let TreeLiteral::Leaf(label) = head else {
                        return Err(DomainError::invalid_shape(
                            &path,
                            "first element of a sequence must be a string label",
                        ));
                    };

                    let node_id = tree.insert_node(label.clone(), false, parent);

                    // Reverse push so siblings are inserted left to right
                    for (idx, child) in rest.iter().enumerate().rev() {
                        let mut child_path = path.clone();
                        child_path.push(idx);
                        stack.push((child, Some(node_id), child_path));
                    }
                }
            }
        }

        Self::fill_summaries(&mut tree);
        debug!("built tree with {} nodes", tree.len());
        Ok(tree)
    }

    /// Parse JSON text and build the tree in one step.
    pub fn build_from_json(&self, input: &str) -> DomainResult<TreeArena> {
        let literal = TreeLiteral::from_json(input).map_err(|e| DomainError::InvalidTreeShape {
            path: "root".to_string(),
            reason: e.to_string(),
        })?;
        self.build(&literal)
    }

    fn fill_summaries(tree: &mut TreeArena) {
        let order: Vec<NodeId> = tree.iter_postorder().map(|(id, _)| id).collect();
        for id in order {
            let child_summaries: Vec<String> = match tree.get_node(id) {
                Some(node) if !node.is_leaf => node
                    .children
                    .iter()
                    .filter_map(|&c| tree.get_node(c))
                    .flat_map(|c| c.summary.iter().cloned())
                    .collect(),
                _ => continue,
            };
            tree.extend_summary(id, &child_summaries);
        }
    }
}
