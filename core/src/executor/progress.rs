use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use super::types::TaskStatus;

/// Visual progress monitor for a run
///
/// One bar over the tasks of the plan, with the current task as its message.
pub struct ProgressMonitor {
    overall: ProgressBar,
    enabled: bool,
}

impl ProgressMonitor {
    pub fn new(total_tasks: usize, enabled: bool) -> Self {
        if !enabled {
            return Self {
                overall: ProgressBar::hidden(),
                enabled: false,
            };
        }

        let overall = ProgressBar::new(total_tasks as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} tasks {msg}")
        {
            overall.set_style(style.progress_chars("█▓▒░  "));
        }
        overall.enable_steady_tick(Duration::from_millis(200));
        overall.set_message("Starting...");

        Self {
            overall,
            enabled: true,
        }
    }

    pub fn start_task(&self, task: &str) {
        if self.enabled {
            self.overall.set_message(task.to_string());
        }
    }

    pub fn complete_task(&self, task: &str, status: TaskStatus) {
        if !self.enabled {
            return;
        }
        if status == TaskStatus::Failed {
            self.overall.set_message(format!("{task} failed"));
        }
        self.overall.inc(1);
    }

    pub fn finish(&self, success: bool) {
        if !self.enabled {
            return;
        }
        let msg = if success {
            "All tasks completed"
        } else {
            "Execution failed"
        };
        self.overall.finish_with_message(msg);
    }
}

impl Drop for ProgressMonitor {
    fn drop(&mut self) {
        if self.enabled && !self.overall.is_finished() {
            self.overall.finish_and_clear();
        }
    }
}
