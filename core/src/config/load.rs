use std::path::{Path, PathBuf};

use crate::error::ConfigError;

use super::types::PipelineConfig;

pub const DEFAULT_CONFIG_FILE: &str = "finnctl.toml";

/// Resolve the config path: explicit flag, then `FINNCTL_CONFIG`, then `./finnctl.toml`.
fn resolve_config_path(explicit: Option<&Path>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    match std::env::var("FINNCTL_CONFIG") {
        Ok(v) if !v.trim().is_empty() => PathBuf::from(expand_path(v.trim())),
        _ => PathBuf::from(DEFAULT_CONFIG_FILE),
    }
}

pub fn load_default(explicit: Option<&Path>) -> Result<PipelineConfig, ConfigError> {
    let path = resolve_config_path(explicit);
    let mut cfg = load_from_path(&path)?;

    // Environment variable overrides
    if let Ok(v) = std::env::var("FINNCTL_ENVIRONMENT") {
        if !v.trim().is_empty() {
            cfg.general.used_environment = v.trim().to_string();
        }
    }
    if let Ok(v) = std::env::var("FINNCTL_DEV_MODE") {
        match v.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" => cfg.general.dev_mode = true,
            "0" | "false" | "no" => cfg.general.dev_mode = false,
            "" => {}
            other => {
                return Err(ConfigError::Invalid(format!(
                    "FINNCTL_DEV_MODE must be true or false, got '{other}'"
                )))
            }
        }
    }

    cfg.validate()?;
    Ok(cfg)
}

/// Parse a config file without applying environment overrides.
pub fn load_from_path(path: &Path) -> Result<PipelineConfig, ConfigError> {
    let s = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let mut cfg = toml::from_str::<PipelineConfig>(&s).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    expand_paths(&mut cfg);
    Ok(cfg)
}

fn expand_paths(cfg: &mut PipelineConfig) {
    cfg.finn.build_template = expand_path(&cfg.finn.build_template);
    for env in cfg.environment.values_mut() {
        env.finn_build_script = expand_path(&env.finn_build_script);
        env.cppdriver_run_script = expand_path(&env.cppdriver_run_script);
        env.pythondriver_run_script = expand_path(&env.pythondriver_run_script);
    }
    if let Some(dir) = cfg.logging.directory.as_mut() {
        *dir = expand_path(dir);
    }
}

fn expand_path(raw: &str) -> String {
    match shellexpand::full(raw) {
        Ok(expanded) => expanded.into_owned(),
        Err(e) => {
            tracing::warn!("could not expand '{}': {}", raw, e);
            raw.to_string()
        }
    }
}
