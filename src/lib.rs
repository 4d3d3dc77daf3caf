//! syntree: render nested-bracket syntax trees as collapsible SVG diagrams
//!
//! Pipeline: JSON literal -> [`domain::TreeBuilder`] -> [`domain::layout`] ->
//! [`application::SceneBuilder`] -> [`application::Controller`] for collapse/expand.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod tree_traits;
pub mod util;
