use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Process-wide pipeline configuration, read once at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub general: GeneralConfig,

    /// Per-environment command prefixes and script paths, keyed by name.
    #[serde(default)]
    pub environment: BTreeMap<String, EnvironmentConfig>,

    pub finn: FinnConfig,

    pub finn_driver: DriverConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl PipelineConfig {
    /// The environment selected by `general.used_environment`.
    pub fn active_environment(&self) -> Result<&EnvironmentConfig, ConfigError> {
        self.environment
            .get(&self.general.used_environment)
            .ok_or_else(|| {
                ConfigError::Invalid(format!(
                    "used_environment '{}' has no [environment.{}] section (available: {})",
                    self.general.used_environment,
                    self.general.used_environment,
                    self.environment
                        .keys()
                        .cloned()
                        .collect::<Vec<_>>()
                        .join(", ")
                ))
            })
    }

    /// URL of the default compiler repository.
    pub fn default_finn_repository(&self) -> Result<&str, ConfigError> {
        self.finn
            .repositories
            .get(&self.finn.default_repository)
            .map(String::as_str)
            .ok_or_else(|| {
                ConfigError::Invalid(format!(
                    "finn.default_repository '{}' is not listed in finn.repositories",
                    self.finn.default_repository
                ))
            })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.active_environment()?;
        self.default_finn_repository()?;
        if self.finn.build_template.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "finn.build_template must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    pub used_environment: String,

    /// Developer mode also provisions the driver during setup.
    #[serde(default)]
    pub dev_mode: bool,

    /// Locator of the toolchain image, exported as `FINN_SINGULARITY`.
    #[serde(default)]
    pub finn_singularity_gha: String,

    /// Number of `out_*` builds to keep per project. 0 keeps everything.
    #[serde(default)]
    pub keep_builds: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnvironmentConfig {
    #[serde(default)]
    pub driver_compiler_prefix_commands: CommandPrefix,

    #[serde(default)]
    pub job_execution: CommandPrefix,

    pub finn_build_script: String,

    pub cppdriver_run_script: String,

    pub pythondriver_run_script: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinnConfig {
    /// Named clone sources for the compiler repository.
    pub repositories: BTreeMap<String, String>,

    pub default_repository: String,

    pub default_branch: String,

    pub build_template: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriverConfig {
    pub default_repository: String,

    pub default_branch: String,

    #[serde(default = "default_compile_mode")]
    pub default_compile_mode: String,
}

fn default_compile_mode() -> String {
    "Release".to_string()
}

/// Argument-vector prefix placed in front of an external command.
///
/// Accepts either a whitespace separated string or an explicit list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CommandPrefix {
    Line(String),
    Argv(Vec<String>),
}

impl Default for CommandPrefix {
    fn default() -> Self {
        Self::Argv(Vec::new())
    }
}

impl CommandPrefix {
    pub fn to_argv(&self) -> Vec<String> {
        match self {
            Self::Line(line) => line.split_whitespace().map(str::to_string).collect(),
            Self::Argv(argv) => argv
                .iter()
                .map(|a| a.trim())
                .filter(|a| !a.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_logging_enabled")]
    pub enabled: bool,

    /// If true, log to stderr.
    #[serde(default = "default_logging_console")]
    pub console: bool,

    /// If true, log to a file under `directory` (or OS temp dir if unset).
    #[serde(default)]
    pub file: bool,

    /// EnvFilter string, e.g. "info" or "finnctl_core=debug".
    #[serde(default = "default_logging_level")]
    pub level: String,

    #[serde(default)]
    pub directory: Option<String>,
}

fn default_logging_enabled() -> bool {
    true
}

fn default_logging_console() -> bool {
    true
}

fn default_logging_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: default_logging_enabled(),
            console: default_logging_console(),
            file: false,
            level: default_logging_level(),
            directory: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_prefix_line_splits_on_whitespace() {
        let prefix = CommandPrefix::Line("srun  -t 1:00:00 ".to_string());
        assert_eq!(prefix.to_argv(), vec!["srun", "-t", "1:00:00"]);
    }

    #[test]
    fn test_command_prefix_argv_drops_blanks() {
        let prefix = CommandPrefix::Argv(vec!["ml".into(), " ".into(), "fpga".into()]);
        assert_eq!(prefix.to_argv(), vec!["ml", "fpga"]);
        assert!(CommandPrefix::default().to_argv().is_empty());
    }
}
