/// Outcome of one task within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    Executed,
    UpToDate,
    Failed,
}

impl TaskStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Executed => "executed",
            Self::UpToDate => "up_to_date",
            Self::Failed => "failed",
        }
    }
}

/// Result of a single task
#[derive(Debug, Clone)]
pub struct TaskResult {
    pub task: String,

    pub status: TaskStatus,

    /// Number of actions that ran to completion
    pub actions_run: usize,

    pub duration_ms: u64,

    /// Error message (if any)
    pub error: Option<String>,
}

/// Result of executing a request
#[derive(Debug, Clone, Default)]
pub struct ExecutionResult {
    /// Tasks in the dependency closure, in execution order
    pub order: Vec<String>,

    /// Results for every task reached, in execution order
    pub task_results: Vec<TaskResult>,

    pub duration_ms: u64,
}

impl ExecutionResult {
    pub fn total_tasks(&self) -> usize {
        self.order.len()
    }

    pub fn count(&self, status: TaskStatus) -> usize {
        self.task_results
            .iter()
            .filter(|r| r.status == status)
            .count()
    }

    pub fn executed(&self) -> Vec<&str> {
        self.task_results
            .iter()
            .filter(|r| r.status == TaskStatus::Executed)
            .map(|r| r.task.as_str())
            .collect()
    }

    pub fn success(&self) -> bool {
        self.count(TaskStatus::Failed) == 0
    }
}
