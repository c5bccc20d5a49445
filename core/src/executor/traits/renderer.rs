use crate::executor::types::{ExecutionResult, TaskResult};

/// Output renderer (controls how run progress is shown)
pub trait OutputRenderer: Send + Sync {
    fn name(&self) -> &str;
    fn format(&self) -> &str;
    fn render(&self, event: &RenderEvent);
}

/// Engine lifecycle events
#[derive(Debug, Clone)]
pub enum RenderEvent {
    RunStart {
        run_id: String,
        requested: Vec<String>,
    },
    Plan {
        run_id: String,
        order: Vec<String>,
    },
    TaskStart {
        run_id: String,
        task: String,
    },
    TaskUpToDate {
        run_id: String,
        task: String,
    },
    TaskComplete {
        run_id: String,
        result: TaskResult,
    },
    RunEnd {
        run_id: String,
        result: ExecutionResult,
    },
}
