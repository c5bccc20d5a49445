use std::path::PathBuf;

use thiserror::Error;

use super::ErrorKind;

/// Failure of a single action inside a task.
#[derive(Error, Debug)]
pub enum ActionError {
    #[error("command `{command}` exited with status {code}")]
    ExternalProcess {
        command: String,
        code: i32,
        /// Tail of the stderr the command wrote, bounded by the capture size.
        stderr_tail: String,
    },

    #[error("failed to spawn `{program}`: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    #[error("no `{prefix}*` output directory in {}: {hint}", project.display())]
    UpstreamNotReady {
        project: PathBuf,
        prefix: String,
        hint: String,
    },

    #[error("missing required argument '{name}'")]
    MissingArgument { name: String },

    #[error("invalid value '{value}' for '{name}' (valid choices: {})", choices.join(", "))]
    InvalidArgument {
        name: String,
        value: String,
        choices: Vec<String>,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Failed(String),
}

impl ActionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ExternalProcess { .. } | Self::Spawn { .. } => ErrorKind::ExternalProcess,
            Self::UpstreamNotReady { .. } => ErrorKind::UpstreamNotReady,
            Self::MissingArgument { .. } | Self::InvalidArgument { .. } => {
                ErrorKind::MissingArgument
            }
            Self::Io(_) | Self::Failed(_) => ErrorKind::Action,
        }
    }
}

impl From<anyhow::Error> for ActionError {
    fn from(err: anyhow::Error) -> Self {
        Self::Failed(format!("{err:#}"))
    }
}
