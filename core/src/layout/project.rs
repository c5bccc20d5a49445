use std::path::{Path, PathBuf};

use crate::context::AppContext;
use crate::error::ActionError;

use super::retention::{newest_first, RetentionPolicy};

/// Canonical file name of the generated build script.
pub const BUILD_SCRIPT_NAME: &str = "build.py";
/// Token in the build template replaced by the artifact file name.
pub const TEMPLATE_PLACEHOLDER: &str = "<ONNX_INPUT_NAME>";
/// Prefix of compiler output directories the retention policy applies to.
const BUILD_OUTPUT_PREFIX: &str = "out_";

/// Project naming derived from an artifact path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectName {
    /// Relative project directory, `./<base>`.
    pub dir: PathBuf,
    /// Artifact file name without its extension.
    pub base: String,
    /// Artifact file name as copied into the project, `<base>.<ext>`.
    pub file_name: String,
}

/// `/a/b/model.onnx` -> (`./model`, `model`). Independent of the current directory.
pub fn derive_project_name(artifact: &Path) -> Result<ProjectName, ActionError> {
    let (Some(stem), Some(file_name)) = (artifact.file_stem(), artifact.file_name()) else {
        return Err(ActionError::Failed(format!(
            "cannot derive a project name from '{}'",
            artifact.display()
        )));
    };
    let base = stem.to_string_lossy().to_string();

    Ok(ProjectName {
        dir: Path::new(".").join(&base),
        base,
        file_name: file_name.to_string_lossy().to_string(),
    })
}

/// Most recent subdirectory of `project_dir` whose name starts with `prefix`.
///
/// A missing project directory or no matching subdirectory means the upstream
/// compilation has not produced output yet.
pub fn locate_output_dir(project_dir: &Path, prefix: &str) -> Result<PathBuf, ActionError> {
    let not_ready = |hint: &str| ActionError::UpstreamNotReady {
        project: project_dir.to_path_buf(),
        prefix: prefix.to_string(),
        hint: hint.to_string(),
    };

    if !project_dir.is_dir() {
        return Err(not_ready(
            "project directory does not exist, create it and run a FINN compilation first",
        ));
    }

    let found = newest_first(project_dir, prefix)?;
    match found.into_iter().next() {
        Some(dir) => {
            tracing::debug!(dir = %dir.display(), "located output directory");
            Ok(dir)
        }
        None => Err(not_ready("please finish a FINN compilation first")),
    }
}

/// Creates and fills project directories below a base directory.
#[derive(Debug, Clone)]
pub struct ProjectLayout {
    root: PathBuf,
    retention: RetentionPolicy,
}

impl ProjectLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            retention: RetentionPolicy::default(),
        }
    }

    pub fn from_context(ctx: &AppContext) -> Self {
        Self::new(ctx.workdir())
            .with_retention(RetentionPolicy::from_keep_builds(ctx.cfg().general.keep_builds))
    }

    pub fn with_retention(mut self, retention: RetentionPolicy) -> Self {
        self.retention = retention;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    fn dir_for(&self, name: &ProjectName) -> PathBuf {
        self.root.join(&name.base)
    }

    /// Absolute project directory for `artifact`.
    pub fn project_dir(&self, artifact: &Path) -> Result<PathBuf, ActionError> {
        let name = derive_project_name(artifact)?;
        Ok(self.dir_for(&name))
    }

    /// Create the project directory if absent, then apply the retention policy.
    ///
    /// An existing directory and its contents are left as they are.
    pub fn ensure_project_dir(&self, artifact: &Path) -> Result<PathBuf, ActionError> {
        let dir = self.project_dir(artifact)?;
        if !dir.is_dir() {
            std::fs::create_dir_all(&dir)?;
            tracing::info!(dir = %dir.display(), "created project folder");
        }

        let removed = self.retention.apply(&dir, BUILD_OUTPUT_PREFIX)?;
        if !removed.is_empty() {
            tracing::info!(count = removed.len(), "purged old builds");
        }
        Ok(dir)
    }

    /// Copy the artifact into its project directory unless a file of that name is already there.
    pub fn copy_artifact_into_project(&self, artifact: &Path) -> Result<PathBuf, ActionError> {
        let name = derive_project_name(artifact)?;
        let dest = self.dir_for(&name).join(&name.file_name);
        if dest.is_file() {
            tracing::debug!(dest = %dest.display(), "artifact already in project");
            return Ok(dest);
        }

        let source = self.resolve(artifact);
        std::fs::copy(&source, &dest).map_err(|e| {
            ActionError::Failed(format!(
                "failed to copy {} to {}: {e}",
                source.display(),
                dest.display()
            ))
        })?;
        tracing::info!(dest = %dest.display(), "copied artifact");
        Ok(dest)
    }

    /// Create `build.py` from `template`, substituting the artifact file name.
    ///
    /// Returns `false` without touching anything when the script already exists.
    pub fn instantiate_build_script(
        &self,
        artifact: &Path,
        template: &Path,
    ) -> Result<bool, ActionError> {
        let name = derive_project_name(artifact)?;
        let script = self.dir_for(&name).join(BUILD_SCRIPT_NAME);
        if script.exists() {
            return Ok(false);
        }

        let template = self.resolve(template);
        let text = std::fs::read_to_string(&template).map_err(|e| {
            ActionError::Failed(format!(
                "failed to read build template {}: {e}",
                template.display()
            ))
        })?;
        std::fs::write(&script, text.replace(TEMPLATE_PLACEHOLDER, &name.file_name))?;

        tracing::info!(script = %script.display(), "instantiated build script");
        eprintln!("{BUILD_SCRIPT_NAME} templated! Please edit the {BUILD_SCRIPT_NAME} to your liking.");
        Ok(true)
    }
}
