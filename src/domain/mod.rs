//! Domain layer: tree model, builder and layout pass
//!
//! This layer is independent of external concerns (no I/O, no drawing, no config loading).

pub mod arena;
pub mod builder;
pub mod entities;
pub mod error;
pub mod layout;

pub use arena::{NodeId, TreeArena, TreeNode};
pub use builder::TreeBuilder;
pub use entities::TreeLiteral;
pub use error::{DomainError, DomainResult};
pub use layout::{layout, LayoutConfig, LayoutNode, TreeLayout};
