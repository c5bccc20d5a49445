use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// What happens to earlier build outputs when a project directory is reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RetentionPolicy {
    #[default]
    KeepAll,
    /// Keep the `n` most recent `out_*` directories, remove the rest.
    KeepLatest(usize),
}

impl RetentionPolicy {
    /// `0` keeps everything.
    pub fn from_keep_builds(keep: usize) -> Self {
        if keep == 0 {
            Self::KeepAll
        } else {
            Self::KeepLatest(keep)
        }
    }

    /// Remove stale output directories under `project_dir`, returning what was removed.
    pub fn apply(&self, project_dir: &Path, prefix: &str) -> std::io::Result<Vec<PathBuf>> {
        let keep = match self {
            Self::KeepAll => return Ok(Vec::new()),
            Self::KeepLatest(n) => *n,
        };

        let candidates = newest_first(project_dir, prefix)?;
        let mut removed = Vec::new();
        for path in candidates.into_iter().skip(keep) {
            tracing::info!(path = %path.display(), "removing old build output");
            std::fs::remove_dir_all(&path)?;
            removed.push(path);
        }
        Ok(removed)
    }
}

/// Subdirectories of `dir` whose name starts with `prefix`, most recent first.
///
/// Equal modification times fall back to the lexicographically smallest name.
pub(crate) fn newest_first(dir: &Path, prefix: &str) -> std::io::Result<Vec<PathBuf>> {
    let mut found: Vec<(SystemTime, String, PathBuf)> = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().to_string();
        if !name.starts_with(prefix) {
            continue;
        }
        let meta = entry.metadata()?;
        if !meta.is_dir() {
            continue;
        }
        let mtime = meta.modified().unwrap_or(SystemTime::UNIX_EPOCH);
        found.push((mtime, name, entry.path()));
    }

    found.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
    Ok(found.into_iter().map(|(_, _, path)| path).collect())
}
