//! Task Dependency Graph (DAG) Execution
//!
//! This module provides the engine that turns a set of requested task names
//! into an ordered, incremental run. It supports:
//! - Task graph construction and validation (duplicates, missing deps, cycles)
//! - Deterministic ordering of the dependency closure
//! - Parameter binding from command-line values
//! - Target based up-to-date checks
//! - Structured output in both text and JSONL formats
//!
//! # Architecture
//!
//! ```text
//! Vec<Task>
//!   ↓
//! TaskGraph::from_tasks() → validate()
//!   ↓
//! RunRequest::parse() → requested tasks + CliArgs
//!   ↓
//! plan() → closure() + order() → Vec<String>
//!   ↓
//! ExecutionEngine::run() → is_up_to_date() / params::resolve() / execute_actions()
//!   ↓
//! ExecutionResult
//! ```

pub mod action;
mod engine;
pub mod graph;
pub mod params;
mod progress;
pub mod scheduler;
pub mod traits;
pub mod types;

pub use action::{Action, ActionContext, CommandAction, CommandSpec, FnAction};
pub use engine::{ExecutionEngine, ExecutionEngineBuilder};
pub use graph::TaskGraph;
pub use params::{BoundParams, CliArgs, ParameterSpec};
pub use progress::ProgressMonitor;
pub use scheduler::{is_up_to_date, plan, RunRequest};
pub use types::{ExecutionOpts, ExecutionResult, Task, TaskResult, TaskStatus, Verbosity};
