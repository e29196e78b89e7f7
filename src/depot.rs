//! Depot facade
//!
//! The three operations offered to outer layers: list stored files, preview one
//! as a table, and ingest an upload. Built once at startup from the loaded
//! configuration and cloned into every session.

use log::{debug, info};
use std::io;
use tokio::task;

use crate::config::{StorageSettings, UploadLimits};
use crate::error::{IngestError, ParseError, ParseErrorKind, PreviewError, RepositoryError};
use crate::storage::{Repository, StoredFile};
use crate::tabular::{TabularData, parse};
use crate::upload::{IngestionPipeline, UploadValidator};

#[derive(Debug, Clone)]
pub struct Depot {
    repository: Repository,
    pipeline: IngestionPipeline,
}

impl Depot {
    /// Resolves the repository root and wires the pipeline to it.
    ///
    /// Fails when the root cannot be created, which callers treat as fatal.
    pub async fn open(
        storage: &StorageSettings,
        limits: UploadLimits,
    ) -> Result<Self, RepositoryError> {
        let repository = Repository::open_root(storage).await?;
        info!("Repository root: {}", repository.root().display());
        Ok(Self::with_repository(repository, limits))
    }

    pub fn with_repository(repository: Repository, limits: UploadLimits) -> Self {
        let pipeline = IngestionPipeline::new(UploadValidator::new(limits), repository.clone());
        Self {
            repository,
            pipeline,
        }
    }

    pub fn repository(&self) -> &Repository {
        &self.repository
    }

    pub fn validator(&self) -> &UploadValidator {
        self.pipeline.validator()
    }

    pub async fn list_files(&self) -> Result<Vec<StoredFile>, RepositoryError> {
        self.repository.list().await
    }

    /// Opens a stored file and parses it afresh. Nothing is cached between calls.
    pub async fn read_preview(&self, name: &str) -> Result<TabularData, PreviewError> {
        let file = self.repository.open(name).await?.into_std().await;

        // The csv reader is synchronous
        let table = task::spawn_blocking(move || parse(file))
            .await
            .map_err(|e| ParseError::new(1, ParseErrorKind::Read(io::Error::other(e))))??;
        debug!(
            "Preview of {}: {} columns, {} rows",
            name,
            table.columns.len(),
            table.rows.len()
        );
        Ok(table)
    }

    pub async fn ingest_upload(
        &self,
        content: &[u8],
        declared_type: &str,
        file_name: &str,
    ) -> Result<(), IngestError> {
        self.pipeline
            .ingest(content, declared_type, file_name)
            .await
    }
}
