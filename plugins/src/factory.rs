use std::sync::Arc;

use finnctl_core::api::{AppContext, ExecutorError, OutputRenderer, Task, TaskGraph};

use crate::renderers::{JsonlRenderer, TextRenderer};
use crate::tasks;

pub fn build_renderer(format: &str, show_summary: bool) -> Arc<dyn OutputRenderer> {
    match format {
        "jsonl" => Arc::new(JsonlRenderer::new(false)),
        // Anything other than jsonl behaves like text.
        _ => Arc::new(TextRenderer::new(show_summary)),
    }
}

pub fn build_task_graph(ctx: &AppContext) -> Result<TaskGraph<Task>, ExecutorError> {
    tasks::build_graph(ctx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_renderer_by_format() {
        assert_eq!(build_renderer("jsonl", false).format(), "jsonl");
        assert_eq!(build_renderer("text", true).format(), "text");
        assert_eq!(build_renderer("unknown", false).format(), "text");
    }
}
