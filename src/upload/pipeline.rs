//! Ingestion pipeline
//!
//! Validate, then write. A rejected payload never reaches the repository.
//! The destination name is taken as given, so a same-named upload replaces
//! the earlier file.

use log::info;

use crate::error::IngestError;
use crate::storage::Repository;
use crate::upload::validator::UploadValidator;

#[derive(Debug, Clone)]
pub struct IngestionPipeline {
    validator: UploadValidator,
    repository: Repository,
}

impl IngestionPipeline {
    pub fn new(validator: UploadValidator, repository: Repository) -> Self {
        Self {
            validator,
            repository,
        }
    }

    pub fn validator(&self) -> &UploadValidator {
        &self.validator
    }

    /// Accepts and persists one uploaded file
    pub async fn ingest(
        &self,
        content: &[u8],
        declared_type: &str,
        file_name: &str,
    ) -> Result<(), IngestError> {
        info!(
            "Upload {}: declared type {}, {} bytes",
            file_name,
            declared_type,
            content.len()
        );

        self.validator.validate(content, declared_type)?;
        self.repository.write(file_name, content).await?;

        Ok(())
    }
}
