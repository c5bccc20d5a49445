use anyhow::Context;
use finnctl_core::api::{
    ActionError, AppContext, FnAction, ParameterSpec, Task, Verbosity,
};

use super::git::{checkout_branch, forced_update, init_submodules, CloneIfMissing};

pub const FINN_DIR: &str = "finn";
/// Directory name produced by cloning the internal fork.
const INTERNAL_CLONE_DIR: &str = "finn-internal";

pub fn getfinn(app: &AppContext) -> Task {
    let finn = &app.cfg().finn;
    let sources: Vec<String> = finn.repositories.keys().cloned().collect();

    Task::new("getfinn")
        .doc("Clone the specified repository and switch to a given branch. Should only be executed once")
        .param(ParameterSpec::new("branch", finn.default_branch.clone()).short('b'))
        .param(
            ParameterSpec::new("source", finn.default_repository.clone())
                .short('s')
                .choices(sources),
        )
        .action(CloneIfMissing::new(FINN_DIR, |ctx| {
            let source = ctx.params.require("source")?;
            ctx.app
                .cfg()
                .finn
                .repositories
                .get(source)
                .cloned()
                .ok_or_else(|| ActionError::InvalidArgument {
                    name: "source".to_string(),
                    value: source.to_string(),
                    choices: ctx.app.cfg().finn.repositories.keys().cloned().collect(),
                })
        }))
        .action(FnAction::new("rename finn-internal to finn", |ctx| {
            let internal = ctx.app.resolve(INTERNAL_CLONE_DIR);
            if internal.is_dir() {
                std::fs::rename(&internal, ctx.app.resolve(FINN_DIR))
                    .with_context(|| format!("failed to rename {INTERNAL_CLONE_DIR} to {FINN_DIR}"))?;
                tracing::info!("renamed {} to {}", INTERNAL_CLONE_DIR, FINN_DIR);
            }
            Ok(())
        }))
        .action(checkout_branch(FINN_DIR))
        .actions(init_submodules(FINN_DIR))
}

pub fn ffupdate() -> Task {
    Task::new("ffupdate")
        .doc("FINN forced-update. Overwrite all changes locally and pull from origin")
        .actions(forced_update(FINN_DIR))
        .verbosity(Verbosity::Stream)
}
