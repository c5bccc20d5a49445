use anyhow::Context;
use finnctl_core::api::{
    AppContext, CommandAction, CommandSpec, FnAction, ParameterSpec, ProjectLayout, Task,
    Verbosity,
};
use finnctl_core::layout::locate_output_dir;

use super::git::{checkout_branch, forced_update, init_submodules, CloneIfMissing};

pub const DRIVER_DIR: &str = "finn-cpp-driver";
pub const DRIVER_BUILD_DIR: &str = "finn-cpp-driver/build";
/// Prefix of the compiler output directories holding `driver/` and `bitfile/`.
const DRIVER_OUTPUT_PREFIX: &str = "out";
/// Only mode the driver run supports so far.
const TEST_MODE: &str = "test";

fn build_dependencies() -> CommandAction {
    CommandAction::new(CommandSpec::new("./buildDependencies.sh").cwd(DRIVER_DIR))
}

pub fn getfinndriver(app: &AppContext) -> Task {
    let driver = &app.cfg().finn_driver;
    let url = driver.default_repository.clone();

    Task::new("getfinndriver")
        .doc("Clone the finn-cpp-driver git repository and run the setup script")
        .param(ParameterSpec::new("branch", driver.default_branch.clone()).short('b'))
        .target(format!("{DRIVER_DIR}/buildDependencies.sh"))
        .action(CloneIfMissing::new(DRIVER_DIR, move |_ctx| Ok(url.clone())))
        .action(checkout_branch(DRIVER_DIR))
        .actions(init_submodules(DRIVER_DIR))
        .action(build_dependencies())
        .verbosity(Verbosity::Stream)
}

pub fn dmkbuildfolder() -> Task {
    Task::new("dmkbuildfolder")
        .doc("Delete and remake the finn-cpp-driver/build folder. Does NOT call cmake for config!")
        .action(FnAction::new("recreate driver build folder", |ctx| {
            let build = ctx.app.resolve(DRIVER_BUILD_DIR);
            if build.is_dir() {
                std::fs::remove_dir_all(&build)
                    .with_context(|| format!("failed to remove {}", build.display()))?;
            }
            std::fs::create_dir_all(&build)
                .with_context(|| format!("failed to create {}", build.display()))?;
            tracing::info!(dir = %build.display(), "recreated build folder");
            Ok(())
        }))
}

pub fn dfupdate() -> Task {
    Task::new("dfupdate")
        .doc("Driver forced-update. Overwrite all changes locally and pull from origin")
        .actions(forced_update(DRIVER_DIR))
        .verbosity(Verbosity::Stream)
}

pub fn dbuilddeps() -> Task {
    Task::new("dbuilddeps")
        .doc("Execute the buildDependencies script to build FinnBoost for the driver. Needs to be done once before compiling for the first time")
        .action(build_dependencies())
        .verbosity(Verbosity::Stream)
}

pub fn dcompile(app: &AppContext) -> Task {
    let mode = app.cfg().finn_driver.default_compile_mode.clone();

    Task::new("dcompile")
        .doc("Compile the FINN C++ driver in the given mode")
        .depends_on("dmkbuildfolder")
        .param(ParameterSpec::new("mode", mode).short('m'))
        .target(format!("{DRIVER_BUILD_DIR}/src/finn"))
        .action(CommandAction::dynamic("cmake configure", |ctx| {
            let mode = ctx.params.require("mode")?;
            Ok(CommandSpec::new("cmake")
                .arg(format!("-DCMAKE_BUILD_TYPE={mode}"))
                .arg("..")
                .cwd(DRIVER_BUILD_DIR)
                .with_prefix(&ctx.app.environment().driver_compiler_prefix_commands.to_argv()))
        }))
        .action(CommandAction::dynamic("cmake build", |ctx| {
            Ok(CommandSpec::new("cmake")
                .args(["--build", ".", "--target", "finn"])
                .cwd(DRIVER_BUILD_DIR)
                .with_prefix(&ctx.app.environment().driver_compiler_prefix_commands.to_argv()))
        }))
        .verbosity(Verbosity::Stream)
}

pub fn cppdriver() -> Task {
    Task::new("cppdriver")
        .doc("Run the driver of the finished compiled FINN project of the given name. Requires an output directory starting with \"out\" that holds bitfile/ and driver/; the most recent one is used")
        .param(ParameterSpec::new("mode", TEST_MODE).short('m').choices([TEST_MODE]))
        .positional("name")
        .action(CommandAction::dynamic("run cpp driver", |ctx| {
            let artifact = std::path::Path::new(ctx.params.first_positional()?);
            let project = ProjectLayout::from_context(ctx.app).project_dir(artifact)?;
            let output = locate_output_dir(&project, DRIVER_OUTPUT_PREFIX)?;
            let env = ctx.app.environment();
            Ok(CommandSpec::new(env.cppdriver_run_script.clone())
                .arg(output.join("driver").to_string_lossy())
                .with_prefix(&env.job_execution.to_argv()))
        }))
        .verbosity(Verbosity::Stream)
}
