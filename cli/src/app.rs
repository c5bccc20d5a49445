//! Command handlers: turn parsed arguments into an engine run or a task listing.
use std::fmt::Write as _;

use finnctl_core::api as core_api;
use finnctl_core::api::{CliError, Task, Verbosity};
use finnctl_plugins::factory;
use finnctl_plugins::tasks::DEFAULT_TASK;

use crate::commands::cli::{Args, RunArgs};

/// Named options from the command line, keyed by the flag they were given under.
pub fn collect_cli_args(run_args: &RunArgs) -> Result<core_api::CliArgs, CliError> {
    let mut cli = core_api::CliArgs::new();
    for (key, value) in [
        ("branch", &run_args.branch),
        ("source", &run_args.source),
        ("mode", &run_args.mode),
    ] {
        if let Some(value) = value {
            cli.set_option(key, value.clone());
        }
    }
    for raw in &run_args.params {
        let (key, value) = core_api::CliArgs::parse_pair(raw)
            .ok_or_else(|| CliError::Command(format!("invalid --param '{raw}', expected KEY=VALUE")))?;
        cli.set_option(key, value);
    }
    Ok(cli)
}

#[tracing::instrument(name = "cli.run_tasks", skip(args, run_args, ctx))]
pub async fn run_tasks(
    args: &Args,
    run_args: RunArgs,
    ctx: &core_api::AppContext,
) -> Result<i32, CliError> {
    let graph = factory::build_task_graph(ctx)?;
    let cli = collect_cli_args(&run_args)?;
    let request = core_api::RunRequest::parse(&graph, &run_args.tokens, cli, DEFAULT_TASK)?;
    tracing::debug!(tasks = ?request.tasks, "run request");

    let opts = core_api::ExecutionOpts {
        force: run_args.force,
        progress_bar: args.progress,
        verbosity: run_args.verbose.then_some(Verbosity::Stream),
        capture_bytes: args.capture_bytes,
    };
    let renderer = factory::build_renderer(args.format.as_str(), run_args.summary);

    let result = core_api::ExecutionEngine::builder(ctx, &opts)
        .renderer(renderer)
        .build()
        .run(&graph, &request)
        .await?;

    tracing::info!(
        executed = result.executed().len(),
        duration_ms = result.duration_ms,
        "run finished"
    );
    Ok(0)
}

pub fn list_tasks(ctx: &core_api::AppContext) -> Result<i32, CliError> {
    let graph = factory::build_task_graph(ctx)?;
    let width = graph.tasks().map(|t| t.name.len()).max().unwrap_or(0);
    for task in graph.tasks() {
        print!("{}", format_task(task, width));
    }
    Ok(0)
}

/// One `list` entry: name and doc, then dependencies and parameters if any.
pub fn format_task(task: &Task, width: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{:<width$}  {}", task.name, task.doc);
    let indent = " ".repeat(width + 2);

    if !task.dependencies.is_empty() {
        let _ = writeln!(out, "{indent}deps: {}", task.dependencies.join(", "));
    }
    for param in &task.params {
        let mut line = format!("--{}", param.long);
        if let Some(short) = param.short {
            let _ = write!(line, "/-{short}");
        }
        let _ = write!(line, " (default: {})", param.default);
        if let Some(choices) = &param.choices {
            let _ = write!(line, " [choices: {}]", choices.join(", "));
        }
        let _ = writeln!(out, "{indent}param: {line}");
    }
    if let Some(positional) = &task.positional {
        let _ = writeln!(out, "{indent}args: <{positional}>...");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_api::ParameterSpec;

    #[test]
    fn test_collect_cli_args() {
        let run_args = RunArgs {
            branch: Some("feature".to_string()),
            params: vec!["s=eki".to_string()],
            ..Default::default()
        };
        let cli = collect_cli_args(&run_args).unwrap();
        assert_eq!(cli.option("branch"), Some("feature"));
        assert_eq!(cli.option("s"), Some("eki"));
        assert_eq!(cli.option("mode"), None);
    }

    #[test]
    fn test_collect_cli_args_rejects_bad_pair() {
        let run_args = RunArgs {
            params: vec!["nokey".to_string()],
            ..Default::default()
        };
        let err = collect_cli_args(&run_args).unwrap_err();
        assert!(matches!(err, CliError::Command(_)));
    }

    #[test]
    fn test_format_task() {
        let task = Task::new("getfinn")
            .doc("Clone finn")
            .depends_on("setup")
            .param(ParameterSpec::new("source", "main").short('s').choices(["main", "eki"]));
        let text = format_task(&task, 8);
        assert_eq!(
            text,
            "getfinn   Clone finn\n          deps: setup\n          param: --source/-s (default: main) [choices: main, eki]\n"
        );
    }
}
