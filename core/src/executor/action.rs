use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::process::Command;

use crate::context::AppContext;
use crate::error::ActionError;
use crate::util::{display_argv, RingBytes};

use super::params::BoundParams;
use super::types::Verbosity;

/// Everything an action may read while it runs.
pub struct ActionContext<'a> {
    pub task: &'a str,
    pub params: &'a BoundParams,
    pub app: &'a AppContext,
    pub verbosity: Verbosity,
    pub capture_bytes: usize,
}

/// One executable step of a task.
#[async_trait]
pub trait Action: Send + Sync {
    /// Short human-readable label used in logs and `list` output.
    fn describe(&self) -> String;

    async fn run(&self, ctx: &ActionContext<'_>) -> Result<(), ActionError>;
}

type ActionFn = dyn Fn(&ActionContext<'_>) -> Result<(), ActionError> + Send + Sync;
type CommandFn = dyn Fn(&ActionContext<'_>) -> Result<CommandSpec, ActionError> + Send + Sync;

/// In-process action backed by a closure.
pub struct FnAction {
    label: String,
    f: Box<ActionFn>,
}

impl FnAction {
    pub fn new<F>(label: impl Into<String>, f: F) -> Self
    where
        F: Fn(&ActionContext<'_>) -> Result<(), ActionError> + Send + Sync + 'static,
    {
        Self {
            label: label.into(),
            f: Box::new(f),
        }
    }
}

#[async_trait]
impl Action for FnAction {
    fn describe(&self) -> String {
        self.label.clone()
    }

    async fn run(&self, ctx: &ActionContext<'_>) -> Result<(), ActionError> {
        (self.f)(ctx)
    }
}

/// A fully resolved external invocation: program, argument vector, directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    /// Working directory relative to the base directory; `None` means the base.
    pub cwd: Option<PathBuf>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
        }
    }

    /// Build from an argument vector whose first element is the program.
    pub fn from_argv(argv: Vec<String>) -> Option<Self> {
        let mut iter = argv.into_iter();
        let program = iter.next()?;
        Some(Self {
            program,
            args: iter.collect(),
            cwd: None,
        })
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    /// Put `prefix` (e.g. a job launcher) in front of this command.
    pub fn with_prefix(self, prefix: &[String]) -> Self {
        let Some((program, rest)) = prefix.split_first() else {
            return self;
        };
        let mut args = rest.to_vec();
        args.push(self.program);
        args.extend(self.args);
        Self {
            program: program.clone(),
            args,
            cwd: self.cwd,
        }
    }

    pub fn display(&self) -> String {
        display_argv(&self.program, &self.args)
    }
}

enum CommandSource {
    /// Program and arguments with `{param}` placeholders.
    Template(CommandSpec),
    /// Built from the context when the action runs.
    Dynamic { label: String, build: Box<CommandFn> },
}

/// External-process action. Never goes through a shell.
pub struct CommandAction {
    source: CommandSource,
}

impl CommandAction {
    pub fn new(spec: CommandSpec) -> Self {
        Self {
            source: CommandSource::Template(spec),
        }
    }

    pub fn dynamic<F>(label: impl Into<String>, build: F) -> Self
    where
        F: Fn(&ActionContext<'_>) -> Result<CommandSpec, ActionError> + Send + Sync + 'static,
    {
        Self {
            source: CommandSource::Dynamic {
                label: label.into(),
                build: Box::new(build),
            },
        }
    }

    fn resolve(&self, ctx: &ActionContext<'_>) -> Result<CommandSpec, ActionError> {
        match &self.source {
            CommandSource::Template(spec) => Ok(CommandSpec {
                program: ctx.params.render(&spec.program),
                args: spec.args.iter().map(|a| ctx.params.render(a)).collect(),
                cwd: spec
                    .cwd
                    .as_ref()
                    .map(|c| PathBuf::from(ctx.params.render(&c.to_string_lossy()))),
            }),
            CommandSource::Dynamic { build, .. } => build(ctx),
        }
    }
}

#[async_trait]
impl Action for CommandAction {
    fn describe(&self) -> String {
        match &self.source {
            CommandSource::Template(spec) => spec.display(),
            CommandSource::Dynamic { label, .. } => label.clone(),
        }
    }

    async fn run(&self, ctx: &ActionContext<'_>) -> Result<(), ActionError> {
        let spec = self.resolve(ctx)?;
        run_command(&spec, ctx).await
    }
}

/// Resolve a relative program path such as `./build.sh` against the command's
/// working directory. Bare names are left for `PATH` lookup.
fn resolve_program(program: &str, cwd: &Path) -> PathBuf {
    let path = Path::new(program);
    if path.is_relative() && path.components().count() > 1 {
        cwd.join(path)
    } else {
        path.to_path_buf()
    }
}

/// Spawn `spec` and wait for it. Non-zero exit is an error; output is never parsed.
///
/// Both pipes are pumped chunk by chunk into rings of `capture_bytes`, so memory
/// stays bounded however much the child writes. In `Stream` mode every chunk is
/// also copied to the terminal.
pub async fn run_command(spec: &CommandSpec, ctx: &ActionContext<'_>) -> Result<(), ActionError> {
    let cwd = match &spec.cwd {
        Some(dir) => ctx.app.resolve(dir),
        None => ctx.app.workdir().to_path_buf(),
    };
    let shown = spec.display();
    tracing::info!(task = %ctx.task, cwd = %cwd.display(), "running {}", shown);

    let program = resolve_program(&spec.program, &cwd);
    let mut cmd = Command::new(&program);
    cmd.args(&spec.args)
        .current_dir(&cwd)
        .envs(ctx.app.exported_env())
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let spawn_err = |source: std::io::Error| ActionError::Spawn {
        program: spec.program.clone(),
        source,
    };

    let mut child = cmd.spawn().map_err(spawn_err)?;
    let (Some(out), Some(err)) = (child.stdout.take(), child.stderr.take()) else {
        return Err(ActionError::Failed(format!("`{shown}`: output pipes unavailable")));
    };

    let echo = ctx.verbosity == Verbosity::Stream;
    let (stdout, stderr) = tokio::join!(
        pump(out, echo.then(tokio::io::stdout), ctx.capture_bytes),
        pump(err, echo.then(tokio::io::stderr), ctx.capture_bytes),
    );
    let status = child.wait().await.map_err(spawn_err)?;
    let (stdout, stderr) = (stdout?, stderr?);

    if !echo {
        if !stdout.is_empty() {
            tracing::debug!(task = %ctx.task, "stdout tail:\n{}", stdout.tail_string());
        }
        if !stderr.is_empty() {
            tracing::debug!(task = %ctx.task, "stderr tail:\n{}", stderr.tail_string());
        }
    }
    check_status(status, shown, stderr.tail_string())
}

/// Drain `rd` into a ring of `cap` bytes, copying each chunk to `wr` if given.
async fn pump<R, W>(mut rd: R, mut wr: Option<W>, cap: usize) -> Result<RingBytes, ActionError>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut ring = RingBytes::new(cap);
    let mut buf = vec![0u8; 16 * 1024];
    loop {
        let n = rd.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        ring.push(&buf[..n]);
        if let Some(wr) = wr.as_mut() {
            wr.write_all(&buf[..n]).await?;
            wr.flush().await?;
        }
    }
    Ok(ring)
}

fn check_status(status: ExitStatus, command: String, stderr_tail: String) -> Result<(), ActionError> {
    if status.success() {
        return Ok(());
    }
    Err(ActionError::ExternalProcess {
        command,
        code: status.code().unwrap_or(-1),
        stderr_tail,
    })
}

/// Run `actions` in order, stopping at the first failure.
///
/// Returns the number of actions completed, or the failing index and cause.
pub async fn execute_actions(
    actions: &[Box<dyn Action>],
    ctx: &ActionContext<'_>,
) -> Result<usize, (usize, ActionError)> {
    for (index, action) in actions.iter().enumerate() {
        tracing::debug!(task = %ctx.task, index, "action: {}", action.describe());
        action.run(ctx).await.map_err(|e| (index, e))?;
    }
    Ok(actions.len())
}
