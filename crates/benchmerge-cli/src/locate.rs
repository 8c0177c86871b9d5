//! Results-directory resolution over an ordered list of candidate roots.
use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::error::CliError;

/// Returns `<root>/<name>` for the first root where that path is a directory.
///
/// When no root has one, `<first root>/<name>` is created and returned. An
/// empty `roots` list behaves like `["."]`.
///
/// # Errors
///
/// Returns [`CliError`] (exit code 2) if the directory has to be created and
/// cannot be.
pub fn resolve_results_dir(roots: &[PathBuf], name: &str) -> Result<PathBuf, CliError> {
    for root in roots {
        let candidate = root.join(name);
        if candidate.is_dir() {
            debug!("results directory: {}", candidate.display());
            return Ok(candidate);
        }
        debug!("no results directory under {}", root.display());
    }

    let first = roots.first().map_or(Path::new("."), PathBuf::as_path);
    let dir = first.join(name);
    std::fs::create_dir_all(&dir).map_err(|e| CliError::WriteFailed {
        path: dir.clone(),
        detail: e.to_string(),
    })?;
    warn!("results directory missing; created {}", dir.display());
    Ok(dir)
}
