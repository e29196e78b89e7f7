//! Path validation
//!
//! Stored file names are single path components; anything that could reach
//! outside the repository root is refused before the filesystem is touched.

use std::path::{Component, Path, PathBuf};

use crate::error::RepositoryError;
use crate::storage::INCOMING_DIR;

/// Validate that a name is one plain file name inside the root
pub fn validate_file_name(name: &str) -> Result<(), RepositoryError> {
    if name.is_empty()
        || name.contains(['/', '\\', '\0'])
        || name == INCOMING_DIR
    {
        return Err(RepositoryError::InvalidName(name.to_string()));
    }

    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(part)), None) if part == name => Ok(()),
        _ => Err(RepositoryError::InvalidName(name.to_string())),
    }
}

/// Join a validated name onto the repository root
pub fn resolve_file_path(root: &Path, name: &str) -> Result<PathBuf, RepositoryError> {
    validate_file_name(name)?;
    Ok(root.join(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_names_pass() {
        assert!(validate_file_name("t.csv").is_ok());
        assert!(validate_file_name("report 2024.csv").is_ok());
        assert!(validate_file_name(".hidden.csv").is_ok());
        assert!(validate_file_name("..csv").is_ok());
    }

    #[test]
    fn test_traversal_is_rejected() {
        for name in ["../secret", "../../etc/passwd", "..", ".", "a/b.csv", "/etc/passwd"] {
            assert!(
                matches!(validate_file_name(name), Err(RepositoryError::InvalidName(_))),
                "{name} should be rejected"
            );
        }
    }

    #[test]
    fn test_separators_and_nul_are_rejected() {
        assert!(validate_file_name("dir\\file.csv").is_err());
        assert!(validate_file_name("bad\0name").is_err());
        assert!(validate_file_name("").is_err());
    }

    #[test]
    fn test_incoming_dir_name_is_reserved() {
        assert!(validate_file_name(INCOMING_DIR).is_err());
    }

    #[test]
    fn test_resolve_stays_under_root() {
        let root = Path::new("/srv/depot");
        let path = resolve_file_path(root, "t.csv").unwrap();
        assert_eq!(path, PathBuf::from("/srv/depot/t.csv"));
        assert!(resolve_file_path(root, "../t.csv").is_err());
    }
}
