use std::path::Path;

use finnctl_core::api::{
    ActionContext, ActionError, CommandAction, CommandSpec, FnAction, ProjectLayout, Task,
    Verbosity,
};
use finnctl_core::layout::locate_output_dir;

/// Prefix of the output directories a FINN build leaves in the project.
pub const BUILD_OUTPUT_PREFIX: &str = "out_";

fn artifact<'a>(ctx: &'a ActionContext<'_>) -> Result<&'a Path, ActionError> {
    ctx.params.first_positional().map(Path::new)
}

fn project_actions() -> Vec<FnAction> {
    vec![
        FnAction::new("create project folder", |ctx| {
            ProjectLayout::from_context(ctx.app).ensure_project_dir(artifact(ctx)?)?;
            Ok(())
        }),
        FnAction::new("copy artifact into project", |ctx| {
            ProjectLayout::from_context(ctx.app).copy_artifact_into_project(artifact(ctx)?)?;
            Ok(())
        }),
        FnAction::new("instantiate build script", |ctx| {
            let template = Path::new(&ctx.app.cfg().finn.build_template);
            ProjectLayout::from_context(ctx.app).instantiate_build_script(artifact(ctx)?, template)?;
            Ok(())
        }),
    ]
}

pub fn fmkproject() -> Task {
    Task::new("fmkproject")
        .doc("Create a finn project folder. Only executes the different steps, depending on whether they are needed")
        .positional("name")
        .actions(project_actions())
        .verbosity(Verbosity::Stream)
}

pub fn finn() -> Task {
    Task::new("finn")
        .doc("Execute a finn compilation and synthesis.")
        .positional("name")
        .actions(project_actions())
        .action(CommandAction::dynamic("run finn build script", |ctx| {
            let project = ProjectLayout::from_context(ctx.app).project_dir(artifact(ctx)?)?;
            let env = ctx.app.environment();
            Ok(CommandSpec::new(env.finn_build_script.clone())
                .arg(project.to_string_lossy())
                .with_prefix(&env.job_execution.to_argv()))
        }))
        .verbosity(Verbosity::Stream)
}

pub fn pythondriver() -> Task {
    Task::new("pythondriver")
        .doc("Execute the python driver of a project, print the results on screen")
        .positional("name")
        .action(CommandAction::dynamic("run python driver", |ctx| {
            let project = ProjectLayout::from_context(ctx.app).project_dir(artifact(ctx)?)?;
            let output = locate_output_dir(&project, BUILD_OUTPUT_PREFIX)?;
            let env = ctx.app.environment();
            Ok(CommandSpec::new(env.pythondriver_run_script.clone())
                .arg(output.join("deploy").join("driver").to_string_lossy())
                .with_prefix(&env.job_execution.to_argv()))
        }))
        .verbosity(Verbosity::Stream)
}
