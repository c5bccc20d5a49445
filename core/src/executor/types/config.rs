use super::task::Verbosity;

/// Default number of captured output bytes kept per stream.
pub const DEFAULT_CAPTURE_BYTES: usize = 16 * 1024;

/// Execution options for a single run.
#[derive(Debug, Clone)]
pub struct ExecutionOpts {
    /// Ignore up-to-date status and run every task in the closure
    pub force: bool,

    /// Enable visual progress bar
    pub progress_bar: bool,

    /// Overrides every task's declared verbosity when set
    pub verbosity: Option<Verbosity>,

    /// Bytes to keep from each captured output stream
    pub capture_bytes: usize,
}

impl Default for ExecutionOpts {
    fn default() -> Self {
        Self {
            force: false,
            progress_bar: false,
            verbosity: None,
            capture_bytes: DEFAULT_CAPTURE_BYTES,
        }
    }
}
