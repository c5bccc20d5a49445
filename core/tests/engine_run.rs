mod common;

use std::sync::Arc;

use common::{
    context_in, entries, failing, new_log, record, set_age, touch, TraceRenderer,
};
use finnctl_core::api::{
    ActionError, CliArgs, CommandAction, CommandSpec, ErrorKind, ExecutionEngine, ExecutionOpts,
    ExecutorError, ParameterSpec, RunRequest, Task, TaskGraph, TaskStatus, WORKDIR_ENV,
};
use pretty_assertions::assert_eq;

fn request(tasks: &[&str]) -> RunRequest {
    RunRequest::new(tasks.iter().copied(), CliArgs::new())
}

#[tokio::test]
async fn chain_runs_dependencies_first_exactly_once() {
    let tmp = tempfile::tempdir().unwrap();
    let ctx = context_in(tmp.path());
    let log = new_log();
    let graph = TaskGraph::from_tasks(vec![
        Task::new("a").depends_on("b").action(record(&log, "a")),
        Task::new("b").depends_on("c").action(record(&log, "b")),
        Task::new("c").action(record(&log, "c")),
        Task::new("unrelated").action(record(&log, "unrelated")),
    ])
    .unwrap();

    let opts = ExecutionOpts::default();
    let result = ExecutionEngine::new(&ctx, &opts)
        .run(&graph, &request(&["a"]))
        .await
        .unwrap();

    assert_eq!(entries(&log), vec!["c", "b", "a"]);
    assert_eq!(result.order, vec!["c", "b", "a"]);
    assert_eq!(result.executed(), vec!["c", "b", "a"]);
    assert!(result.success());
}

#[tokio::test]
async fn requesting_a_task_twice_runs_it_once() {
    let tmp = tempfile::tempdir().unwrap();
    let ctx = context_in(tmp.path());
    let log = new_log();
    let graph = TaskGraph::from_tasks(vec![
        Task::new("base").action(record(&log, "base")),
        Task::new("left").depends_on("base").action(record(&log, "left")),
        Task::new("right").depends_on("base").action(record(&log, "right")),
    ])
    .unwrap();

    let opts = ExecutionOpts::default();
    ExecutionEngine::new(&ctx, &opts)
        .run(&graph, &request(&["right", "left", "right"]))
        .await
        .unwrap();

    assert_eq!(entries(&log), vec!["base", "left", "right"]);
}

#[test]
fn cycle_is_a_configuration_error() {
    let log = new_log();
    let err = TaskGraph::from_tasks(vec![
        Task::new("a").depends_on("b").action(record(&log, "a")),
        Task::new("b").depends_on("a").action(record(&log, "b")),
    ])
    .unwrap_err();

    assert!(matches!(err, ExecutorError::CircularDependency(_)));
    assert_eq!(err.kind(), ErrorKind::Configuration);
    assert_eq!(err.kind().exit_code(), 11);
    assert!(entries(&log).is_empty());
}

#[tokio::test]
async fn existing_target_skips_actions() {
    let tmp = tempfile::tempdir().unwrap();
    let ctx = context_in(tmp.path());
    let log = new_log();
    touch(&tmp.path().join("finn-cpp-driver/buildDependencies.sh"));

    let graph = TaskGraph::from_tasks(vec![
        Task::new("getfinndriver")
            .target("finn-cpp-driver/buildDependencies.sh")
            .action(record(&log, "getfinndriver")),
        Task::new("dmkbuildfolder").action(record(&log, "dmkbuildfolder")),
    ])
    .unwrap();

    let opts = ExecutionOpts::default();
    let engine = ExecutionEngine::new(&ctx, &opts);
    for _ in 0..2 {
        let result = engine
            .run(&graph, &request(&["getfinndriver", "dmkbuildfolder"]))
            .await
            .unwrap();
        assert_eq!(result.count(TaskStatus::UpToDate), 1);
    }

    // The task without targets runs every time; the satisfied one never does.
    assert_eq!(entries(&log), vec!["dmkbuildfolder", "dmkbuildfolder"]);
}

#[tokio::test]
async fn target_produced_by_first_run_is_up_to_date_on_second() {
    let tmp = tempfile::tempdir().unwrap();
    let ctx = context_in(tmp.path());
    let log = new_log();
    let log_for_action = log.clone();

    let graph = TaskGraph::from_tasks(vec![Task::new("dcompile")
        .target("build/finn")
        .action(finnctl_core::api::FnAction::new("produce", move |ctx| {
            log_for_action.lock().unwrap().push("dcompile".to_string());
            touch(&ctx.app.resolve("build/finn"));
            Ok(())
        }))])
    .unwrap();

    let opts = ExecutionOpts::default();
    let engine = ExecutionEngine::new(&ctx, &opts);
    engine.run(&graph, &request(&["dcompile"])).await.unwrap();
    let second = engine.run(&graph, &request(&["dcompile"])).await.unwrap();

    assert_eq!(entries(&log), vec!["dcompile"]);
    assert_eq!(second.task_results[0].status, TaskStatus::UpToDate);
}

#[tokio::test]
async fn newer_input_makes_task_stale() {
    let tmp = tempfile::tempdir().unwrap();
    let ctx = context_in(tmp.path());
    let log = new_log();
    let target = tmp.path().join("out.bin");
    let input = tmp.path().join("in.txt");
    touch(&target);
    touch(&input);
    set_age(&target, 600);
    set_age(&input, 60);

    let graph = TaskGraph::from_tasks(vec![Task::new("convert")
        .target("out.bin")
        .file_dep("in.txt")
        .action(record(&log, "convert"))])
    .unwrap();

    let opts = ExecutionOpts::default();
    ExecutionEngine::new(&ctx, &opts)
        .run(&graph, &request(&["convert"]))
        .await
        .unwrap();
    assert_eq!(entries(&log), vec!["convert"]);

    set_age(&input, 1200);
    ExecutionEngine::new(&ctx, &opts)
        .run(&graph, &request(&["convert"]))
        .await
        .unwrap();
    assert_eq!(entries(&log), vec!["convert"]);
}

#[tokio::test]
async fn force_ignores_up_to_date_status() {
    let tmp = tempfile::tempdir().unwrap();
    let ctx = context_in(tmp.path());
    let log = new_log();
    touch(&tmp.path().join("done"));

    let graph = TaskGraph::from_tasks(vec![Task::new("once")
        .target("done")
        .action(record(&log, "once"))])
    .unwrap();

    let opts = ExecutionOpts {
        force: true,
        ..Default::default()
    };
    ExecutionEngine::new(&ctx, &opts)
        .run(&graph, &request(&["once"]))
        .await
        .unwrap();
    assert_eq!(entries(&log), vec!["once"]);
}

#[tokio::test]
async fn failure_short_circuits_remaining_actions_and_dependents() {
    let tmp = tempfile::tempdir().unwrap();
    let ctx = context_in(tmp.path());
    let log = new_log();
    let graph = TaskGraph::from_tasks(vec![
        Task::new("build")
            .action(record(&log, "first"))
            .action(failing("second"))
            .action(record(&log, "third")),
        Task::new("deploy")
            .depends_on("build")
            .action(record(&log, "deploy")),
    ])
    .unwrap();

    let renderer = Arc::new(TraceRenderer::default());
    let opts = ExecutionOpts::default();
    let err = ExecutionEngine::builder(&ctx, &opts)
        .renderer(renderer.clone())
        .build()
        .run(&graph, &request(&["deploy"]))
        .await
        .unwrap_err();

    assert_eq!(entries(&log), vec!["first"]);
    match &err {
        ExecutorError::TaskFailed { task, index, source } => {
            assert_eq!(task, "build");
            assert_eq!(*index, 1);
            assert!(matches!(source, ActionError::Failed(_)));
        }
        other => panic!("expected TaskFailed, got {other:?}"),
    }
    assert_eq!(err.task(), Some("build"));
    assert_eq!(err.kind(), ErrorKind::Action);
    assert_eq!(
        renderer.trace(),
        vec![
            "start deploy",
            "plan build,deploy",
            "run build",
            "done build failed",
            "end false",
        ]
    );
}

#[tokio::test]
async fn missing_positional_argument_is_reported() {
    let tmp = tempfile::tempdir().unwrap();
    let ctx = context_in(tmp.path());
    let log = new_log();
    let graph = TaskGraph::from_tasks(vec![Task::new("fmkproject")
        .positional("name")
        .action(record(&log, "fmkproject"))])
    .unwrap();

    let opts = ExecutionOpts::default();
    let err = ExecutionEngine::new(&ctx, &opts)
        .run(&graph, &request(&["fmkproject"]))
        .await
        .unwrap_err();

    assert!(matches!(err, ExecutorError::MissingArgument { ref task, .. } if task == "fmkproject"));
    assert_eq!(err.kind().exit_code(), 12);
    assert!(entries(&log).is_empty());
}

#[tokio::test]
async fn non_zero_exit_is_an_external_process_error() {
    let tmp = tempfile::tempdir().unwrap();
    let ctx = context_in(tmp.path());
    let graph = TaskGraph::from_tasks(vec![Task::new("broken").action(CommandAction::new(
        CommandSpec::new("sh").args(["-c", "echo boom >&2; exit 3"]),
    ))])
    .unwrap();

    let opts = ExecutionOpts::default();
    let err = ExecutionEngine::new(&ctx, &opts)
        .run(&graph, &request(&["broken"]))
        .await
        .unwrap_err();

    match &err {
        ExecutorError::TaskFailed {
            source:
                ActionError::ExternalProcess {
                    code, stderr_tail, ..
                },
            ..
        } => {
            assert_eq!(*code, 3);
            assert_eq!(stderr_tail, "boom");
        }
        other => panic!("expected ExternalProcess, got {other:?}"),
    }
    assert_eq!(err.kind(), ErrorKind::ExternalProcess);
    assert_eq!(err.kind().exit_code(), 20);
}

#[tokio::test]
async fn spawned_commands_see_exported_workdir() {
    let tmp = tempfile::tempdir().unwrap();
    let ctx = context_in(tmp.path());
    let graph = TaskGraph::from_tasks(vec![Task::new("probe").action(CommandAction::new(
        CommandSpec::new("sh").args(["-c", "printf %s \"$FINN_WORKDIR\" > workdir.txt"]),
    ))])
    .unwrap();

    let opts = ExecutionOpts::default();
    ExecutionEngine::new(&ctx, &opts)
        .run(&graph, &request(&["probe"]))
        .await
        .unwrap();

    let seen = std::fs::read_to_string(tmp.path().join("workdir.txt")).unwrap();
    assert_eq!(seen, ctx.workdir().to_string_lossy());
    assert_eq!(
        ctx.exported_env().get(WORKDIR_ENV).map(String::as_str),
        Some(seen.as_str())
    );
}

#[tokio::test]
async fn named_parameters_reach_command_templates() {
    let tmp = tempfile::tempdir().unwrap();
    std::fs::create_dir(tmp.path().join("build")).unwrap();
    let ctx = context_in(tmp.path());
    let graph = TaskGraph::from_tasks(vec![Task::new("dcompile")
        .param(ParameterSpec::new("mode", "Release").short('m'))
        .action(CommandAction::new(
            CommandSpec::new("sh")
                .args(["-c", "printf %s {mode} > mode.txt"])
                .cwd("build"),
        ))])
    .unwrap();

    let opts = ExecutionOpts::default();
    let engine = ExecutionEngine::new(&ctx, &opts);
    engine
        .run(&graph, &request(&["dcompile"]))
        .await
        .unwrap();
    let mode = std::fs::read_to_string(tmp.path().join("build/mode.txt")).unwrap();
    assert_eq!(mode, "Release");

    let args = CliArgs::new().with_option("m", "Debug");
    engine
        .run(&graph, &RunRequest::new(["dcompile"], args))
        .await
        .unwrap();
    let mode = std::fs::read_to_string(tmp.path().join("build/mode.txt")).unwrap();
    assert_eq!(mode, "Debug");
}

#[tokio::test]
async fn up_to_date_tasks_are_reported_to_renderer() {
    let tmp = tempfile::tempdir().unwrap();
    let ctx = context_in(tmp.path());
    let log = new_log();
    touch(&tmp.path().join("ready"));
    let graph = TaskGraph::from_tasks(vec![
        Task::new("prepare").target("ready").action(record(&log, "prepare")),
        Task::new("use").depends_on("prepare").action(record(&log, "use")),
    ])
    .unwrap();

    let renderer = Arc::new(TraceRenderer::default());
    let opts = ExecutionOpts::default();
    ExecutionEngine::builder(&ctx, &opts)
        .renderer(renderer.clone())
        .build()
        .run(&graph, &request(&["use"]))
        .await
        .unwrap();

    assert_eq!(
        renderer.trace(),
        vec![
            "start use",
            "plan prepare,use",
            "skip prepare",
            "run use",
            "done use executed",
            "end true",
        ]
    );
}
