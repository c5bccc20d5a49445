use std::path::PathBuf;

use async_trait::async_trait;
use finnctl_core::api::{Action, ActionContext, ActionError, CommandAction, CommandSpec};
use finnctl_core::executor::action::run_command;

type UrlFn = dyn Fn(&ActionContext<'_>) -> Result<String, ActionError> + Send + Sync;

/// `git clone <url>` in the base directory, skipped when `dir` already exists.
pub struct CloneIfMissing {
    dir: PathBuf,
    url: Box<UrlFn>,
}

impl CloneIfMissing {
    pub fn new<F>(dir: impl Into<PathBuf>, url: F) -> Self
    where
        F: Fn(&ActionContext<'_>) -> Result<String, ActionError> + Send + Sync + 'static,
    {
        Self {
            dir: dir.into(),
            url: Box::new(url),
        }
    }
}

#[async_trait]
impl Action for CloneIfMissing {
    fn describe(&self) -> String {
        format!("git clone (unless {} exists)", self.dir.display())
    }

    async fn run(&self, ctx: &ActionContext<'_>) -> Result<(), ActionError> {
        if ctx.app.resolve(&self.dir).is_dir() {
            tracing::info!(dir = %self.dir.display(), "already cloned");
            return Ok(());
        }
        let url = (self.url)(ctx)?;
        run_command(&CommandSpec::new("git").args(["clone", url.as_str()]), ctx).await
    }
}

pub fn git<I, S>(dir: &str, args: I) -> CommandAction
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    CommandAction::new(CommandSpec::new("git").args(args).cwd(dir))
}

/// `git checkout {branch}` in `dir`; the branch comes from the bound parameter.
pub fn checkout_branch(dir: &str) -> CommandAction {
    git(dir, ["checkout", "{branch}"])
}

pub fn init_submodules(dir: &str) -> Vec<CommandAction> {
    vec![
        git(dir, ["submodule", "init"]),
        git(dir, ["submodule", "update"]),
    ]
}

/// Discard local changes and pull from origin.
pub fn forced_update(dir: &str) -> Vec<CommandAction> {
    vec![
        git(dir, ["pull"]),
        git(dir, ["reset", "--hard"]),
        git(dir, ["pull"]),
    ]
}
