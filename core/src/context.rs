use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::{EnvironmentConfig, PipelineConfig};
use crate::error::ConfigError;

/// Names the orchestrator's own working directory for spawned tools.
pub const WORKDIR_ENV: &str = "FINN_WORKDIR";
/// Names the toolchain image locator for spawned tools.
pub const SINGULARITY_ENV: &str = "FINN_SINGULARITY";

/// Immutable run context shared by every component.
///
/// Holds the loaded configuration, the base working directory all relative
/// paths are resolved against, and the variables exported to child processes.
#[derive(Debug, Clone)]
pub struct AppContext {
    cfg: Arc<PipelineConfig>,
    environment: EnvironmentConfig,
    workdir: PathBuf,
    exported_env: BTreeMap<String, String>,
}

impl AppContext {
    /// Build a context rooted at the current process directory.
    pub fn new(cfg: PipelineConfig) -> Result<Self, ConfigError> {
        let cwd = std::env::current_dir().map_err(|e| {
            ConfigError::Invalid(format!("cannot determine working directory: {e}"))
        })?;
        Self::with_workdir(cfg, cwd)
    }

    pub fn with_workdir(cfg: PipelineConfig, workdir: PathBuf) -> Result<Self, ConfigError> {
        cfg.validate()?;
        let environment = cfg.active_environment()?.clone();
        let workdir = std::path::absolute(&workdir).unwrap_or(workdir);

        let mut exported_env = BTreeMap::new();
        exported_env.insert(
            WORKDIR_ENV.to_string(),
            workdir.to_string_lossy().to_string(),
        );
        exported_env.insert(
            SINGULARITY_ENV.to_string(),
            cfg.general.finn_singularity_gha.clone(),
        );

        Ok(Self {
            cfg: Arc::new(cfg),
            environment,
            workdir,
            exported_env,
        })
    }

    pub fn cfg(&self) -> &PipelineConfig {
        &self.cfg
    }

    pub fn environment(&self) -> &EnvironmentConfig {
        &self.environment
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    /// Resolve `path` against the base working directory.
    pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.workdir.join(path)
        }
    }

    pub fn exported_env(&self) -> &BTreeMap<String, String> {
        &self.exported_env
    }
}
