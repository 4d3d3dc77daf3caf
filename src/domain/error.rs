//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent violations of the tree literal shape.
/// These are independent of rendering and I/O concerns.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// `path` walks 0-based child indices from the root, e.g. `root/1/0`.
    #[error("invalid tree shape at {path}: {reason}")]
    InvalidTreeShape { path: String, reason: String },
}

impl DomainError {
    /// Create an `InvalidTreeShape` error for the node at `path`.
    ///
    /// `path` holds 0-based child indices, not literal indices: the label occupies
    /// literal index 0, so child `i` is literal element `i + 1`. In
    /// `["S", "a", []]` the empty sequence is reported at `root/1`.
    pub fn invalid_shape(path: &[usize], reason: impl Into<String>) -> Self {
        Self::InvalidTreeShape {
            path: format_path(path),
            reason: reason.into(),
        }
    }
}

/// Render a child-index path as `root/1/0` (second child, then its first child).
fn format_path(path: &[usize]) -> String {
    let mut out = String::from("root");
    for idx in path {
        out.push('/');
        out.push_str(&idx.to_string());
    }
    out
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_nested_path_when_formatting_error_then_shows_slash_separated_indices() {
        let err = DomainError::invalid_shape(&[1, 0], "empty sequence");
        assert_eq!(
            err.to_string(),
            "invalid tree shape at root/1/0: empty sequence"
        );
    }
}
