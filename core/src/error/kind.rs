/// Coarse error categories surfaced to the operator.
///
/// The CLI maps each category to a process exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or missing config, unknown tasks, dependency cycles.
    Configuration,
    /// A required positional argument or named parameter is absent or invalid.
    MissingArgument,
    /// A prior stage has not produced the output a later stage needs.
    UpstreamNotReady,
    /// A spawned command exited non-zero or could not be started.
    ExternalProcess,
    /// Any other in-process action failure.
    Action,
}

impl ErrorKind {
    pub fn exit_code(self) -> i32 {
        match self {
            Self::Configuration => 11,
            Self::MissingArgument => 12,
            Self::UpstreamNotReady => 13,
            Self::ExternalProcess => 20,
            Self::Action => 50,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Configuration => "configuration",
            Self::MissingArgument => "missing_argument",
            Self::UpstreamNotReady => "upstream_not_ready",
            Self::ExternalProcess => "external_process",
            Self::Action => "action",
        }
    }
}
