use std::sync::Arc;
use std::time::Instant;

use uuid::Uuid;

use crate::context::AppContext;
use crate::error::ExecutorError;

use super::action::{execute_actions, ActionContext};
use super::graph::TaskGraph;
use super::params::{resolve, CliArgs};
use super::progress::ProgressMonitor;
use super::scheduler::{is_up_to_date, plan, RunRequest};
use super::traits::{OutputRenderer, RenderEvent};
use super::types::{ExecutionOpts, ExecutionResult, Task, TaskResult, TaskStatus};

/// Sequential execution engine for the task graph
pub struct ExecutionEngine<'a> {
    ctx: &'a AppContext,
    opts: &'a ExecutionOpts,
    renderer: Option<Arc<dyn OutputRenderer>>,
}

pub struct ExecutionEngineBuilder<'a> {
    ctx: &'a AppContext,
    opts: &'a ExecutionOpts,
    renderer: Option<Arc<dyn OutputRenderer>>,
}

impl<'a> ExecutionEngineBuilder<'a> {
    pub fn new(ctx: &'a AppContext, opts: &'a ExecutionOpts) -> Self {
        Self {
            ctx,
            opts,
            renderer: None,
        }
    }

    pub fn renderer(mut self, renderer: Arc<dyn OutputRenderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    pub fn build(self) -> ExecutionEngine<'a> {
        ExecutionEngine {
            ctx: self.ctx,
            opts: self.opts,
            renderer: self.renderer,
        }
    }
}

impl<'a> ExecutionEngine<'a> {
    pub fn new(ctx: &'a AppContext, opts: &'a ExecutionOpts) -> Self {
        Self {
            ctx,
            opts,
            renderer: None,
        }
    }

    pub fn builder(ctx: &'a AppContext, opts: &'a ExecutionOpts) -> ExecutionEngineBuilder<'a> {
        ExecutionEngineBuilder::new(ctx, opts)
    }

    /// Run the dependency closure of `request`, one task at a time.
    ///
    /// Up-to-date tasks are skipped. The first failing task aborts the run;
    /// side effects of completed actions are left in place.
    #[tracing::instrument(name = "engine.run", skip(self, graph, request), fields(tasks = ?request.tasks))]
    pub async fn run(
        &self,
        graph: &TaskGraph<Task>,
        request: &RunRequest,
    ) -> Result<ExecutionResult, ExecutorError> {
        let run_id = Uuid::new_v4().to_string();
        let order = plan(graph, request)?;

        self.emit(RenderEvent::RunStart {
            run_id: run_id.clone(),
            requested: request.tasks.clone(),
        });
        self.emit(RenderEvent::Plan {
            run_id: run_id.clone(),
            order: order.clone(),
        });

        let start = Instant::now();
        let progress = ProgressMonitor::new(order.len(), self.opts.progress_bar);
        let mut result = ExecutionResult {
            order: order.clone(),
            ..Default::default()
        };

        for name in &order {
            let Some(task) = graph.get(name) else {
                return Err(ExecutorError::UnknownTask(name.clone()));
            };
            progress.start_task(name);

            if !self.opts.force && is_up_to_date(task, self.ctx) {
                tracing::info!(task = %name, "up to date, skipping");
                self.emit(RenderEvent::TaskUpToDate {
                    run_id: run_id.clone(),
                    task: name.clone(),
                });
                result.task_results.push(TaskResult {
                    task: name.clone(),
                    status: TaskStatus::UpToDate,
                    actions_run: 0,
                    duration_ms: 0,
                    error: None,
                });
                progress.complete_task(name, TaskStatus::UpToDate);
                continue;
            }

            self.emit(RenderEvent::TaskStart {
                run_id: run_id.clone(),
                task: name.clone(),
            });
            let task_start = Instant::now();
            let outcome = self.execute_task(task, &request.args).await;
            let duration_ms = task_start.elapsed().as_millis() as u64;

            match outcome {
                Ok(actions_run) => {
                    tracing::info!(task = %name, duration_ms, "task finished");
                    let task_result = TaskResult {
                        task: name.clone(),
                        status: TaskStatus::Executed,
                        actions_run,
                        duration_ms,
                        error: None,
                    };
                    self.emit(RenderEvent::TaskComplete {
                        run_id: run_id.clone(),
                        result: task_result.clone(),
                    });
                    result.task_results.push(task_result);
                    progress.complete_task(name, TaskStatus::Executed);
                }
                Err(err) => {
                    tracing::error!(task = %name, "task failed: {}", err);
                    let actions_run = match &err {
                        ExecutorError::TaskFailed { index, .. } => *index,
                        _ => 0,
                    };
                    let task_result = TaskResult {
                        task: name.clone(),
                        status: TaskStatus::Failed,
                        actions_run,
                        duration_ms,
                        error: Some(err.to_string()),
                    };
                    self.emit(RenderEvent::TaskComplete {
                        run_id: run_id.clone(),
                        result: task_result.clone(),
                    });
                    result.task_results.push(task_result);
                    progress.complete_task(name, TaskStatus::Failed);
                    progress.finish(false);

                    result.duration_ms = start.elapsed().as_millis() as u64;
                    self.emit(RenderEvent::RunEnd { run_id, result });
                    return Err(err);
                }
            }
        }

        progress.finish(true);
        result.duration_ms = start.elapsed().as_millis() as u64;
        self.emit(RenderEvent::RunEnd {
            run_id,
            result: result.clone(),
        });
        Ok(result)
    }

    async fn execute_task(&self, task: &Task, args: &CliArgs) -> Result<usize, ExecutorError> {
        let params = resolve(task, args)?;
        let ctx = ActionContext {
            task: &task.name,
            params: &params,
            app: self.ctx,
            verbosity: self.opts.verbosity.unwrap_or(task.verbosity),
            capture_bytes: self.opts.capture_bytes,
        };

        execute_actions(&task.actions, &ctx)
            .await
            .map_err(|(index, source)| ExecutorError::TaskFailed {
                task: task.name.clone(),
                index,
                source,
            })
    }

    fn emit(&self, event: RenderEvent) {
        if let Some(renderer) = &self.renderer {
            renderer.render(&event);
        }
    }
}
