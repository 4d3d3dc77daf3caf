//! Application layer: scene construction, interaction and drawing services
//!
//! This layer orchestrates domain logic and depends only on the collaborator traits.

pub mod controller;
pub mod error;
pub mod error_ext;
pub mod scene;
pub mod services;

pub use controller::{Command, Controller, Timing, ToggleOutcome};
pub use error::{ApplicationError, ApplicationResult, DrawWarning};
pub use error_ext::IoResultExt;
pub use scene::{Scene, SceneBuilder, SceneGroup, ToggleState};
