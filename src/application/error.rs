//! Application-level errors (wraps domain errors)

use std::fmt;

use thiserror::Error;

use crate::domain::DomainError;

/// Application errors wrap domain errors and add drawing-level context.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("container not found: {0}")]
    ContainerNotFound(String),

    #[error("a rendering collaborator is required to draw")]
    MissingRenderingCollaborator,

    #[error("config error: {message}")]
    Config { message: String },

    #[error("invalid input: {context}")]
    Input {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("operation failed: {context}")]
    OperationFailed {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Non-fatal conditions reported by a draw call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawWarning {
    /// No animator was injected; toggles are instantaneous.
    MissingAnimationCollaborator,
}

impl fmt::Display for DrawWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DrawWarning::MissingAnimationCollaborator => {
                write!(f, "no animation collaborator, toggles are not animated")
            }
        }
    }
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
