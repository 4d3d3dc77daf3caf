//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on collaborator traits (Renderer, Animator)
//! but are themselves concrete structs, not traits.

mod draw;

pub use draw::{Diagram, DrawService};
