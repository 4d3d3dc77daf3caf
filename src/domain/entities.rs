//! Domain entities: the raw tree literal accepted as input

use std::fmt;

use serde::{Deserialize, Serialize};

/// A tree literal: either a leaf string, or a sequence whose first element is the
/// node label and whose remaining elements are child literals.
///
/// Deserializes from JSON without tags:
/// `["S", ["NP", "I"], ["VP", "saw", ["NP", "you"]]]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeLiteral {
    Leaf(String),
    Node(Vec<TreeLiteral>),
}

impl TreeLiteral {
    /// Parse a literal from JSON text.
    pub fn from_json(input: &str) -> serde_json::Result<Self> {
        serde_json::from_str(input)
    }

    /// Shorthand for a leaf literal.
    pub fn leaf(label: impl Into<String>) -> Self {
        Self::Leaf(label.into())
    }

    /// Shorthand for an internal literal with a label and children.
    pub fn node(label: impl Into<String>, children: impl IntoIterator<Item = TreeLiteral>) -> Self {
        let mut items = vec![Self::Leaf(label.into())];
        items.extend(children);
        Self::Node(items)
    }
}

impl From<&str> for TreeLiteral {
    fn from(value: &str) -> Self {
        Self::Leaf(value.to_string())
    }
}

impl fmt::Display for TreeLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::to_string(self) {
            Ok(s) => write!(f, "{}", s),
            Err(_) => write!(f, "<unprintable tree literal>"),
        }
    }
}
