//! File system storage management
//!
//! Handles the repository root, file name validation, and the file repository.

pub mod operations;
pub mod results;
pub mod root;
pub mod validation;

/// Subdirectory of the root that holds uploads still being written
pub const INCOMING_DIR: &str = ".incoming";

// Re-export commonly used items
pub use operations::Repository;
pub use results::StoredFile;
pub use root::resolve_repository_root;
pub use validation::{resolve_file_path, validate_file_name};
