use finnctl_core::api::{OutputRenderer, RenderEvent, TaskStatus};

/// doit-style progress lines: `.  task` when a task runs, `-- task` when it is up to date.
pub struct TextRenderer {
    show_summary: bool,
}

impl TextRenderer {
    pub fn new(show_summary: bool) -> Self {
        Self { show_summary }
    }

    fn format_event(&self, event: &RenderEvent) -> Option<String> {
        match event {
            RenderEvent::RunStart { .. } | RenderEvent::Plan { .. } => None,
            RenderEvent::TaskStart { task, .. } => Some(format!(".  {task}")),
            RenderEvent::TaskUpToDate { task, .. } => Some(format!("-- {task}")),
            RenderEvent::TaskComplete { result, .. } => match result.status {
                TaskStatus::Failed => Some(format!(
                    "TaskError - taskid:{}\n{}",
                    result.task,
                    result.error.as_deref().unwrap_or("failed")
                )),
                _ => None,
            },
            RenderEvent::RunEnd { result, .. } if self.show_summary => Some(format!(
                "{} executed, {} up to date, {} failed ({}ms)",
                result.count(TaskStatus::Executed),
                result.count(TaskStatus::UpToDate),
                result.count(TaskStatus::Failed),
                result.duration_ms
            )),
            RenderEvent::RunEnd { .. } => None,
        }
    }
}

impl OutputRenderer for TextRenderer {
    fn name(&self) -> &str {
        "text-renderer"
    }

    fn format(&self) -> &str {
        "text"
    }

    fn render(&self, event: &RenderEvent) {
        let Some(line) = self.format_event(event) else {
            return;
        };
        if matches!(
            event,
            RenderEvent::TaskComplete { result, .. } if result.status == TaskStatus::Failed
        ) {
            eprintln!("{line}");
        } else {
            println!("{line}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use finnctl_core::api::{ExecutionResult, TaskResult};

    fn task_result(status: TaskStatus, error: Option<&str>) -> TaskResult {
        TaskResult {
            task: "dcompile".to_string(),
            status,
            actions_run: 1,
            duration_ms: 5,
            error: error.map(str::to_string),
        }
    }

    #[test]
    fn test_doit_style_task_lines() {
        let renderer = TextRenderer::new(false);
        let start = RenderEvent::TaskStart {
            run_id: "run".to_string(),
            task: "getfinn".to_string(),
        };
        let skip = RenderEvent::TaskUpToDate {
            run_id: "run".to_string(),
            task: "getfinndriver".to_string(),
        };
        assert_eq!(renderer.format_event(&start).as_deref(), Some(".  getfinn"));
        assert_eq!(
            renderer.format_event(&skip).as_deref(),
            Some("-- getfinndriver")
        );
    }

    #[test]
    fn test_failure_line_names_task_and_cause() {
        let renderer = TextRenderer::new(false);
        let event = RenderEvent::TaskComplete {
            run_id: "run".to_string(),
            result: task_result(TaskStatus::Failed, Some("command `cmake ..` exited with status 2")),
        };
        let line = renderer.format_event(&event).unwrap();
        assert!(line.contains("taskid:dcompile"));
        assert!(line.contains("exited with status 2"));

        let ok = RenderEvent::TaskComplete {
            run_id: "run".to_string(),
            result: task_result(TaskStatus::Executed, None),
        };
        assert!(renderer.format_event(&ok).is_none());
    }

    #[test]
    fn test_summary_only_when_enabled() {
        let end = RenderEvent::RunEnd {
            run_id: "run".to_string(),
            result: ExecutionResult {
                order: vec!["dcompile".to_string()],
                task_results: vec![task_result(TaskStatus::Executed, None)],
                duration_ms: 42,
            },
        };
        assert!(TextRenderer::new(false).format_event(&end).is_none());
        assert_eq!(
            TextRenderer::new(true).format_event(&end).as_deref(),
            Some("1 executed, 0 up to date, 0 failed (42ms)")
        );
    }
}
