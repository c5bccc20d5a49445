#![allow(dead_code)]

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime};

use finnctl_core::api::{
    ActionError, AppContext, FnAction, OutputRenderer, PipelineConfig, RenderEvent,
};

pub const SAMPLE_CONFIG: &str = r#"
[general]
used_environment = "local"
dev_mode = false
finn_singularity_gha = "ghcr.io/example/finn:latest"

[environment.local]
finn_build_script = "./run-docker.sh"
cppdriver_run_script = "./run_cpp.sh"
pythondriver_run_script = "./run_py.sh"

[finn]
repositories = { main = "https://github.com/Xilinx/finn.git" }
default_repository = "main"
default_branch = "dev"
build_template = "build_template.py"

[finn_driver]
default_repository = "https://github.com/eki-project/finn-cpp-driver.git"
default_branch = "dev"
"#;

pub fn sample_config() -> PipelineConfig {
    toml::from_str(SAMPLE_CONFIG).unwrap()
}

pub fn context_in(dir: &Path) -> AppContext {
    AppContext::with_workdir(sample_config(), dir.to_path_buf()).unwrap()
}

/// Shared, ordered log of action invocations.
pub type Log = Arc<Mutex<Vec<String>>>;

pub fn new_log() -> Log {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn entries(log: &Log) -> Vec<String> {
    log.lock().unwrap().clone()
}

pub fn record(log: &Log, label: &str) -> FnAction {
    let log = log.clone();
    let label = label.to_string();
    FnAction::new(format!("record {label}"), move |_ctx| {
        log.lock().unwrap().push(label.clone());
        Ok(())
    })
}

pub fn failing(label: &str) -> FnAction {
    let label = label.to_string();
    FnAction::new(format!("fail {label}"), move |_ctx| {
        Err(ActionError::Failed(format!("{label} failed")))
    })
}

pub fn touch(path: &Path) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, b"").unwrap();
}

pub fn set_age(path: &Path, age_secs: u64) {
    let mtime = SystemTime::now() - Duration::from_secs(age_secs);
    std::fs::File::options()
        .write(true)
        .open(path)
        .unwrap()
        .set_modified(mtime)
        .unwrap();
}

/// Renderer that keeps a compact trace of engine events.
#[derive(Default)]
pub struct TraceRenderer {
    pub events: Mutex<Vec<String>>,
}

impl TraceRenderer {
    pub fn trace(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }
}

impl OutputRenderer for TraceRenderer {
    fn name(&self) -> &str {
        "trace"
    }

    fn format(&self) -> &str {
        "trace"
    }

    fn render(&self, event: &RenderEvent) {
        let line = match event {
            RenderEvent::RunStart { requested, .. } => format!("start {}", requested.join(",")),
            RenderEvent::Plan { order, .. } => format!("plan {}", order.join(",")),
            RenderEvent::TaskStart { task, .. } => format!("run {task}"),
            RenderEvent::TaskUpToDate { task, .. } => format!("skip {task}"),
            RenderEvent::TaskComplete { result, .. } => {
                format!("done {} {}", result.task, result.status.as_str())
            }
            RenderEvent::RunEnd { result, .. } => format!("end {}", result.success()),
        };
        self.events.lock().unwrap().push(line);
    }
}
