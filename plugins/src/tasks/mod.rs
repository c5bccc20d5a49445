//! Task catalog of the FINN pipeline.
//!
//! Tasks are registered once from the loaded configuration. Their declaration
//! order is the tie-break the scheduler uses between unrelated tasks.

pub mod compiler;
pub mod driver;
pub mod git;
pub mod project;

use finnctl_core::api::{AppContext, ExecutorError, Task, TaskGraph};

/// Task run when no task is named on the command line.
pub const DEFAULT_TASK: &str = "finn-doit-setup";

/// First-time setup. Has no actions; pulls in the tasks that provision the
/// toolchain, plus the driver in developer mode.
pub fn setup(app: &AppContext) -> Task {
    let mut task = Task::new(DEFAULT_TASK)
        .doc("Does a first time setup: install finn (and finn-cpp-driver in dev mode)")
        .depends_on("getfinn");
    if app.cfg().general.dev_mode {
        task = task.depends_on("getfinndriver").depends_on("dmkbuildfolder");
    }
    task
}

pub fn build_catalog(app: &AppContext) -> Vec<Task> {
    vec![
        setup(app),
        compiler::getfinn(app),
        compiler::ffupdate(),
        project::fmkproject(),
        project::finn(),
        project::pythondriver(),
        driver::getfinndriver(app),
        driver::dmkbuildfolder(),
        driver::dfupdate(),
        driver::dbuilddeps(),
        driver::dcompile(app),
        driver::cppdriver(),
    ]
}

pub fn build_graph(app: &AppContext) -> Result<TaskGraph<Task>, ExecutorError> {
    TaskGraph::from_tasks(build_catalog(app))
}
