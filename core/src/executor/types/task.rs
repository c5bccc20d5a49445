use std::path::PathBuf;

use crate::executor::action::Action;
use crate::executor::params::ParameterSpec;

/// Common task interface for executor graph handling.
pub trait TaskLike: Send + Sync {
    fn id(&self) -> &str;
    fn dependencies(&self) -> &[String];
}

/// Whether external command output reaches the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Capture output, keep a bounded tail for diagnostics.
    #[default]
    Capture,
    /// Inherit stdout/stderr from the orchestrator.
    Stream,
}

/// A named unit of work with prerequisites, parameters, actions and targets.
pub struct Task {
    pub name: String,
    pub doc: String,
    pub dependencies: Vec<String>,
    pub params: Vec<ParameterSpec>,
    /// Name of the positional argument this task consumes, if any.
    pub positional: Option<String>,
    pub actions: Vec<Box<dyn Action>>,
    /// Artifacts whose presence marks the task as satisfied.
    pub targets: Vec<PathBuf>,
    /// Inputs compared against the oldest target's modification time.
    pub file_deps: Vec<PathBuf>,
    pub verbosity: Verbosity,
}

impl Task {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            doc: String::new(),
            dependencies: Vec::new(),
            params: Vec::new(),
            positional: None,
            actions: Vec::new(),
            targets: Vec::new(),
            file_deps: Vec::new(),
            verbosity: Verbosity::default(),
        }
    }

    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = doc.into();
        self
    }

    pub fn depends_on(mut self, dep: impl Into<String>) -> Self {
        self.dependencies.push(dep.into());
        self
    }

    pub fn param(mut self, spec: ParameterSpec) -> Self {
        self.params.push(spec);
        self
    }

    pub fn positional(mut self, name: impl Into<String>) -> Self {
        self.positional = Some(name.into());
        self
    }

    pub fn action(mut self, action: impl Action + 'static) -> Self {
        self.actions.push(Box::new(action));
        self
    }

    pub fn actions<A, I>(mut self, actions: I) -> Self
    where
        A: Action + 'static,
        I: IntoIterator<Item = A>,
    {
        for action in actions {
            self.actions.push(Box::new(action));
        }
        self
    }

    pub fn target(mut self, path: impl Into<PathBuf>) -> Self {
        self.targets.push(path.into());
        self
    }

    pub fn file_dep(mut self, path: impl Into<PathBuf>) -> Self {
        self.file_deps.push(path.into());
        self
    }

    pub fn verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    pub fn consumes_positional(&self) -> bool {
        self.positional.is_some()
    }
}

impl TaskLike for Task {
    fn id(&self) -> &str {
        &self.name
    }

    fn dependencies(&self) -> &[String] {
        &self.dependencies
    }
}

impl std::fmt::Debug for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Task")
            .field("name", &self.name)
            .field("dependencies", &self.dependencies)
            .field("params", &self.params)
            .field("positional", &self.positional)
            .field(
                "actions",
                &self.actions.iter().map(|a| a.describe()).collect::<Vec<_>>(),
            )
            .field("targets", &self.targets)
            .field("verbosity", &self.verbosity)
            .finish()
    }
}
