//! Storage operations
//!
//! The file repository: lists, opens and writes files directly under the
//! repository root. Writes land in a temporary file under `.incoming/` and are
//! renamed into place once fully flushed, so readers never see a half-written
//! file. Concurrent writes to one name are last-writer-wins.

use log::{debug, error, info, warn};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;

use crate::config::StorageSettings;
use crate::error::RepositoryError;
use crate::storage::INCOMING_DIR;
use crate::storage::results::StoredFile;
use crate::storage::root::resolve_repository_root;
use crate::storage::validation::resolve_file_path;

/// File repository rooted at one directory
#[derive(Debug, Clone)]
pub struct Repository {
    root: Arc<PathBuf>,
    upload_seq: Arc<AtomicU64>,
}

impl Repository {
    /// Resolve (and create if needed) the configured root, then open a repository on it
    pub async fn open_root(settings: &StorageSettings) -> Result<Self, RepositoryError> {
        let root = resolve_repository_root(&settings.repository_root).await?;
        Ok(Self::new(root))
    }

    /// Wrap an already resolved, canonical root directory
    pub fn new(root: PathBuf) -> Self {
        Self {
            root: Arc::new(root),
            upload_seq: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Lists regular files in the root, in directory-iteration order
    pub async fn list(&self) -> Result<Vec<StoredFile>, RepositoryError> {
        let mut entries = fs::read_dir(self.root()).await.map_err(|e| {
            error!("Failed to list {}: {}", self.root.display(), e);
            RepositoryError::Io(e)
        })?;

        let mut files = vec![];
        while let Some(entry) = entries.next_entry().await? {
            let metadata = match entry.metadata().await {
                Ok(metadata) => metadata,
                // Removed between the directory read and the stat
                Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                Err(e) => return Err(RepositoryError::Io(e)),
            };

            // Subdirectories (including .incoming) and symlinks are not stored files
            if !metadata.is_file() {
                continue;
            }

            match entry.file_name().into_string() {
                Ok(name) => files.push(StoredFile {
                    name,
                    size_bytes: metadata.len(),
                }),
                Err(raw) => warn!("Skipping non UTF-8 file name {:?}", raw),
            }
        }

        debug!("Listed {} - {} files", self.root.display(), files.len());
        Ok(files)
    }

    /// Opens a stored file for reading
    pub async fn open(&self, name: &str) -> Result<File, RepositoryError> {
        let path = self.resolve_existing(name).await?;

        File::open(&path).await.map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => RepositoryError::NotFound(name.to_string()),
            _ => RepositoryError::Io(e),
        })
    }

    /// Creates or replaces `name` with `content`.
    ///
    /// On failure the temporary file is removed and the destination keeps
    /// whatever it held before.
    pub async fn write(&self, name: &str, content: &[u8]) -> Result<(), RepositoryError> {
        let destination = resolve_file_path(self.root(), name)?;

        let incoming = self.root.join(INCOMING_DIR);
        fs::create_dir_all(&incoming)
            .await
            .map_err(|e| RepositoryError::WriteFailed(name.to_string(), e))?;

        let seq = self.upload_seq.fetch_add(1, Ordering::Relaxed);
        // Fixed-length temp name, so any valid destination name fits
        let temp_path = incoming.join(format!("upload.{}.{}", std::process::id(), seq));

        if let Err(e) = write_fully(&temp_path, content).await {
            error!("Failed to write temporary file {}: {}", temp_path.display(), e);
            let _ = fs::remove_file(&temp_path).await;
            return Err(RepositoryError::WriteFailed(name.to_string(), e));
        }

        if let Err(e) = fs::rename(&temp_path, &destination).await {
            error!(
                "Failed to rename {} to {}: {}",
                temp_path.display(),
                destination.display(),
                e
            );
            let _ = fs::remove_file(&temp_path).await;
            return Err(RepositoryError::WriteFailed(name.to_string(), e));
        }

        info!("Stored {} ({} bytes)", destination.display(), content.len());
        Ok(())
    }

    /// Resolves a name to an existing regular file that really lives under the root
    async fn resolve_existing(&self, name: &str) -> Result<PathBuf, RepositoryError> {
        let path = resolve_file_path(self.root(), name)?;

        let canonical = match fs::canonicalize(&path).await {
            Ok(canonical) => canonical,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(RepositoryError::NotFound(name.to_string()));
            }
            Err(e) => return Err(RepositoryError::Io(e)),
        };

        // A symlink pointing outside the root is an escape, not a stored file
        if !canonical.starts_with(self.root()) {
            warn!("Refusing {} which resolves outside the root", name);
            return Err(RepositoryError::InvalidName(name.to_string()));
        }

        let metadata = fs::metadata(&canonical).await?;
        if !metadata.is_file() {
            return Err(RepositoryError::NotFound(name.to_string()));
        }

        Ok(canonical)
    }
}

async fn write_fully(path: &Path, content: &[u8]) -> io::Result<()> {
    let mut file = File::create(path).await?;
    file.write_all(content).await?;
    file.flush().await?;
    Ok(())
}
