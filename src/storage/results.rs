//! Storage result types
//!
//! Defines result structures returned by storage operations.

/// A named, sized entry in the repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub name: String,
    pub size_bytes: u64,
}
