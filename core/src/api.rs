//! Stable re-exports for consumers (`cli`, `plugins`, and external crates).
//!
//! Prefer importing from `finnctl_core::api` instead of reaching into internal modules.

pub use crate::config::{
    load_default, load_from_path, CommandPrefix, DriverConfig, EnvironmentConfig, FinnConfig,
    GeneralConfig, LoggingConfig, PipelineConfig, DEFAULT_CONFIG_FILE,
};
pub use crate::context::{AppContext, SINGULARITY_ENV, WORKDIR_ENV};
pub use crate::error::{ActionError, CliError, ConfigError, ErrorKind, ExecutorError};
pub use crate::executor::traits::{OutputRenderer, RenderEvent};
pub use crate::executor::{
    Action, ActionContext, BoundParams, CliArgs, CommandAction, CommandSpec, ExecutionEngine,
    ExecutionOpts, ExecutionResult, FnAction, ParameterSpec, RunRequest, Task, TaskGraph,
    TaskResult, TaskStatus, Verbosity,
};
pub use crate::layout::{
    derive_project_name, ProjectLayout, ProjectName, RetentionPolicy, BUILD_SCRIPT_NAME,
};
