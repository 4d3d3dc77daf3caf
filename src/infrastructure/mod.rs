//! Infrastructure layer: collaborator implementations and DI container
//!
//! This layer implements the drawing and animation boundary traits and wires up services.

pub mod animation;
pub mod di;
pub mod error;
pub mod html;
pub mod svg;
pub mod traits;

pub use error::{InfraError, InfraResult};
