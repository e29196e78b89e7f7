//! Repository root resolution
//!
//! Turns the configured repository directory into an absolute, existing path.

use log::{error, info};
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::error::RepositoryError;

/// Resolves the configured repository directory to an absolute canonical path,
/// creating it and any missing parents on first use.
///
/// Relative paths are taken from the process working directory. Directories are
/// created with the default mode, so access follows the process umask.
pub async fn resolve_repository_root(configured: &Path) -> Result<PathBuf, RepositoryError> {
    let absolute = if configured.is_absolute() {
        configured.to_path_buf()
    } else {
        let cwd = std::env::current_dir()
            .map_err(|e| RepositoryError::RootUnavailable(configured.to_path_buf(), e))?;
        cwd.join(configured)
    };

    if let Err(e) = fs::create_dir_all(&absolute).await {
        error!(
            "Failed to create repository root {}: {}",
            absolute.display(),
            e
        );
        return Err(RepositoryError::RootUnavailable(absolute, e));
    }

    // Containment checks compare canonical paths, so the root must be canonical too
    let canonical = fs::canonicalize(&absolute)
        .await
        .map_err(|e| RepositoryError::RootUnavailable(absolute.clone(), e))?;

    info!("Repository root: {}", canonical.display());
    Ok(canonical)
}
