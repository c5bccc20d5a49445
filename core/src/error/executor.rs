use thiserror::Error;

use super::{ActionError, ErrorKind};

/// Errors raised while building the task graph or running a request.
#[derive(Error, Debug)]
pub enum ExecutorError {
    #[error("Duplicate task name: {0}")]
    DuplicateTask(String),

    #[error("Unknown task: {0}")]
    UnknownTask(String),

    #[error("Dependency not found: task '{task}' depends on '{missing_dep}'")]
    DependencyNotFound { task: String, missing_dep: String },

    #[error("Circular dependency detected: {0}")]
    CircularDependency(String),

    #[error("Task '{task}' requires a positional argument '{name}'")]
    MissingArgument { task: String, name: String },

    #[error("Task '{task}': invalid value '{value}' for parameter '{name}' (valid choices: {})", choices.join(", "))]
    InvalidArgument {
        task: String,
        name: String,
        value: String,
        choices: Vec<String>,
    },

    #[error("Task '{task}' failed at action {index}: {source}")]
    TaskFailed {
        task: String,
        index: usize,
        source: ActionError,
    },
}

impl ExecutorError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::DuplicateTask(_)
            | Self::UnknownTask(_)
            | Self::DependencyNotFound { .. }
            | Self::CircularDependency(_) => ErrorKind::Configuration,
            Self::MissingArgument { .. } | Self::InvalidArgument { .. } => {
                ErrorKind::MissingArgument
            }
            Self::TaskFailed { source, .. } => source.kind(),
        }
    }

    /// Name of the task the error is attributed to, if any.
    pub fn task(&self) -> Option<&str> {
        match self {
            Self::MissingArgument { task, .. }
            | Self::InvalidArgument { task, .. }
            | Self::TaskFailed { task, .. } => Some(task),
            Self::DependencyNotFound { task, .. } => Some(task),
            _ => None,
        }
    }
}
