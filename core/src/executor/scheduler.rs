use std::path::Path;
use std::time::SystemTime;

use crate::context::AppContext;
use crate::error::ExecutorError;

use super::graph::TaskGraph;
use super::params::CliArgs;
use super::types::Task;

/// Tasks requested for one run plus the command-line values that go with them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunRequest {
    pub tasks: Vec<String>,
    pub args: CliArgs,
}

impl RunRequest {
    pub fn new<I, S>(tasks: I, args: CliArgs) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tasks: tasks.into_iter().map(Into::into).collect(),
            args,
        }
    }

    /// Split free-form tokens into task names and positional arguments.
    ///
    /// Tokens are task names until one names a task that consumes positional
    /// arguments; everything after it belongs to that task. No tokens means
    /// `default_task`.
    pub fn parse(
        graph: &TaskGraph<Task>,
        tokens: &[String],
        args: CliArgs,
        default_task: &str,
    ) -> Result<Self, ExecutorError> {
        if tokens.is_empty() {
            return Ok(Self::new([default_task], args));
        }

        let mut tasks = Vec::new();
        let mut rest = tokens.iter();
        while let Some(token) = rest.next() {
            let Some(task) = graph.get(token) else {
                return Err(ExecutorError::UnknownTask(token.clone()));
            };
            tasks.push(token.clone());
            if task.consumes_positional() {
                break;
            }
        }

        let args = args.with_positional(rest.cloned());
        Ok(Self { tasks, args })
    }
}

/// Dependency closure of the request, in execution order.
pub fn plan(graph: &TaskGraph<Task>, request: &RunRequest) -> Result<Vec<String>, ExecutorError> {
    let closure = graph.closure(&request.tasks)?;
    let order = graph.order(&closure)?;
    tracing::debug!(requested = ?request.tasks, order = ?order, "execution plan");
    Ok(order)
}

/// A task is up to date when it declares targets, every target exists, and no
/// declared input is newer than the oldest target.
pub fn is_up_to_date(task: &Task, ctx: &AppContext) -> bool {
    if task.targets.is_empty() {
        return false;
    }

    let mut oldest_target: Option<SystemTime> = None;
    for target in &task.targets {
        let path = ctx.resolve(target);
        let Ok(meta) = std::fs::metadata(&path) else {
            tracing::debug!(task = %task.name, target = %path.display(), "target missing");
            return false;
        };
        if let Ok(modified) = meta.modified() {
            oldest_target = Some(match oldest_target {
                Some(current) => current.min(modified),
                None => modified,
            });
        }
    }

    if task.file_deps.is_empty() {
        return true;
    }
    let Some(oldest_target) = oldest_target else {
        return false;
    };

    task.file_deps.iter().all(|dep| {
        let path = ctx.resolve(dep);
        match modified(&path) {
            Some(mtime) => mtime <= oldest_target,
            None => {
                tracing::debug!(task = %task.name, input = %path.display(), "input missing");
                false
            }
        }
    })
}

fn modified(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}
