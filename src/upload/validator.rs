//! Upload validator
//!
//! Pure inspection of an upload payload against the configured size ceiling
//! and allowed sniffed type. Must run before anything is written.

use log::{debug, warn};

use crate::config::UploadLimits;
use crate::error::ValidationError;
use crate::upload::sniff::sniff_content_type;

#[derive(Debug, Clone)]
pub struct UploadValidator {
    limits: UploadLimits,
}

impl UploadValidator {
    pub fn new(limits: UploadLimits) -> Self {
        Self { limits }
    }

    /// Check a payload length against the ceiling
    ///
    /// Exposed separately so a transport can refuse an oversized body before reading it.
    pub fn check_size(&self, size: u64) -> Result<(), ValidationError> {
        if size > self.limits.max_upload_size_bytes {
            warn!(
                "Upload of {} bytes exceeds limit of {} bytes",
                size, self.limits.max_upload_size_bytes
            );
            return Err(ValidationError::TooLarge {
                size,
                limit: self.limits.max_upload_size_bytes,
            });
        }
        Ok(())
    }

    /// Validate a payload. `declared_type` is only logged, never trusted.
    pub fn validate(&self, content: &[u8], declared_type: &str) -> Result<(), ValidationError> {
        self.check_size(content.len() as u64)?;

        let sniffed = sniff_content_type(content);
        if sniffed != self.limits.allowed_sniffed_type {
            warn!(
                "Rejected upload sniffed as {} (declared {})",
                sniffed, declared_type
            );
            return Err(ValidationError::InvalidType {
                sniffed: sniffed.to_string(),
                declared: declared_type.to_string(),
            });
        }

        debug!(
            "Accepted {} bytes sniffed as {} (declared {})",
            content.len(),
            sniffed,
            declared_type
        );
        Ok(())
    }
}
