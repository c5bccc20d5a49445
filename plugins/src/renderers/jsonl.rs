use chrono::Local;
use finnctl_core::api::{OutputRenderer, RenderEvent, TaskStatus};
use serde_json::{json, Value};

pub struct JsonlRenderer {
    pretty_print: bool,
}

impl JsonlRenderer {
    pub fn new(pretty_print: bool) -> Self {
        Self { pretty_print }
    }

    fn event_to_json(&self, event: &RenderEvent) -> Value {
        let ts = Local::now().to_rfc3339();
        match event {
            RenderEvent::RunStart { run_id, requested } => json!({
                "v": 1,
                "event_type": "run.start",
                "ts": ts,
                "run_id": run_id,
                "metadata": {
                    "requested": requested,
                }
            }),
            RenderEvent::Plan { run_id, order } => json!({
                "v": 1,
                "event_type": "executor.plan",
                "ts": ts,
                "run_id": run_id,
                "metadata": {
                    "order": order,
                    "total_tasks": order.len(),
                }
            }),
            RenderEvent::TaskStart { run_id, task } => json!({
                "v": 1,
                "event_type": "task.start",
                "ts": ts,
                "run_id": run_id,
                "task_id": task,
            }),
            RenderEvent::TaskUpToDate { run_id, task } => json!({
                "v": 1,
                "event_type": "task.up_to_date",
                "ts": ts,
                "run_id": run_id,
                "task_id": task,
            }),
            RenderEvent::TaskComplete { run_id, result } => json!({
                "v": 1,
                "event_type": "task.end",
                "ts": ts,
                "run_id": run_id,
                "task_id": result.task,
                "status": result.status.as_str(),
                "metadata": {
                    "actions_run": result.actions_run,
                    "duration_ms": result.duration_ms,
                    "error": result.error,
                }
            }),
            RenderEvent::RunEnd { run_id, result } => json!({
                "v": 1,
                "event_type": "run.end",
                "ts": ts,
                "run_id": run_id,
                "metadata": {
                    "total_tasks": result.total_tasks(),
                    "executed": result.count(TaskStatus::Executed),
                    "up_to_date": result.count(TaskStatus::UpToDate),
                    "failed": result.count(TaskStatus::Failed),
                    "success": result.success(),
                    "duration_ms": result.duration_ms,
                }
            }),
        }
    }
}

impl OutputRenderer for JsonlRenderer {
    fn name(&self) -> &str {
        "jsonl-renderer"
    }

    fn format(&self) -> &str {
        "jsonl"
    }

    fn render(&self, event: &RenderEvent) {
        let value = self.event_to_json(event);
        if self.pretty_print {
            println!("{}", serde_json::to_string_pretty(&value).unwrap_or_else(|_| "{}".into()));
        } else {
            println!("{}", serde_json::to_string(&value).unwrap_or_else(|_| "{}".into()));
        }
    }
}
