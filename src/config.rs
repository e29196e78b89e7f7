//! Configuration management for csv-depot
//!
//! Settings come from built-in defaults, then an optional `config.toml`, then
//! `CSV_DEPOT_*` environment variables. The storage and upload modules never see
//! the whole configuration; they are handed the slice they need at construction.

use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;

pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 2122;
pub const DEFAULT_REPOSITORY_ROOT: &str = "www/data";
pub const DEFAULT_MAX_UPLOAD_SIZE_BYTES: u64 = 2_000_000;
pub const DEFAULT_ALLOWED_SNIFFED_TYPE: &str = "text/plain; charset=utf-8";
pub const DEFAULT_MAX_CLIENTS: usize = 10;
pub const DEFAULT_MAX_COMMAND_LENGTH: usize = 512;

/// Complete depot configuration as loaded at startup
#[derive(Debug, Deserialize, Clone)]
pub struct DepotConfig {
    // ═══ NETWORK ═══
    /// IP address the command listener binds to
    pub bind_address: String,

    /// Port for the command listener
    pub port: u16,

    /// Maximum concurrent client sessions
    pub max_clients: usize,

    /// Longest command line accepted, CRLF included
    pub max_command_length: usize,

    // ═══ STORAGE ═══
    /// Repository directory, relative paths resolve against the working directory
    pub repository_root: String,

    // ═══ UPLOAD LIMITS ═══
    /// Upload ceiling in bytes
    /// Environment: CSV_DEPOT_MAX_UPLOAD_SIZE_BYTES
    pub max_upload_size_bytes: u64,

    /// The only sniffed classification accepted for uploads
    pub allowed_sniffed_type: String,
}

/// Settings consumed by the storage layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageSettings {
    pub repository_root: PathBuf,
}

/// Settings consumed by the upload validator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadLimits {
    pub max_upload_size_bytes: u64,
    pub allowed_sniffed_type: String,
}

impl Default for DepotConfig {
    fn default() -> Self {
        Self {
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            port: DEFAULT_PORT,
            max_clients: DEFAULT_MAX_CLIENTS,
            max_command_length: DEFAULT_MAX_COMMAND_LENGTH,
            repository_root: DEFAULT_REPOSITORY_ROOT.to_string(),
            max_upload_size_bytes: DEFAULT_MAX_UPLOAD_SIZE_BYTES,
            allowed_sniffed_type: DEFAULT_ALLOWED_SNIFFED_TYPE.to_string(),
        }
    }
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self {
            max_upload_size_bytes: DEFAULT_MAX_UPLOAD_SIZE_BYTES,
            allowed_sniffed_type: DEFAULT_ALLOWED_SNIFFED_TYPE.to_string(),
        }
    }
}

impl DepotConfig {
    /// Load configuration from defaults, config.toml and environment overrides
    pub fn load() -> Result<Self, config::ConfigError> {
        let settings = Config::builder()
            .set_default("bind_address", DEFAULT_BIND_ADDRESS.to_string())?
            .set_default("port", i64::from(DEFAULT_PORT))?
            .set_default("max_clients", DEFAULT_MAX_CLIENTS as i64)?
            .set_default("max_command_length", DEFAULT_MAX_COMMAND_LENGTH as i64)?
            .set_default("repository_root", DEFAULT_REPOSITORY_ROOT.to_string())?
            .set_default(
                "max_upload_size_bytes",
                DEFAULT_MAX_UPLOAD_SIZE_BYTES as i64,
            )?
            .set_default(
                "allowed_sniffed_type",
                DEFAULT_ALLOWED_SNIFFED_TYPE.to_string(),
            )?
            // Docker layout first, then the local working directory
            .add_source(File::with_name("csv-depot/config").required(false))
            .add_source(File::with_name("config").required(false))
            .add_source(Environment::with_prefix("CSV_DEPOT"))
            .build()?;

        let config: DepotConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validation for all configuration values
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        if self.port == 0 {
            return Err(config::ConfigError::Message("port cannot be 0".into()));
        }

        if self.repository_root.trim().is_empty() {
            return Err(config::ConfigError::Message(
                "repository_root cannot be empty".into(),
            ));
        }

        if self.max_upload_size_bytes == 0 {
            return Err(config::ConfigError::Message(
                "max_upload_size_bytes must be greater than 0".into(),
            ));
        }

        if self.allowed_sniffed_type.trim().is_empty() {
            return Err(config::ConfigError::Message(
                "allowed_sniffed_type cannot be empty".into(),
            ));
        }

        if self.max_clients == 0 {
            return Err(config::ConfigError::Message(
                "max_clients must be greater than 0".into(),
            ));
        }

        if self.max_command_length == 0 {
            return Err(config::ConfigError::Message(
                "max_command_length must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Get bind address and port as socket address
    pub fn listen_socket(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }

    pub fn storage_settings(&self) -> StorageSettings {
        StorageSettings {
            repository_root: PathBuf::from(&self.repository_root),
        }
    }

    pub fn upload_limits(&self) -> UploadLimits {
        UploadLimits {
            max_upload_size_bytes: self.max_upload_size_bytes,
            allowed_sniffed_type: self.allowed_sniffed_type.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = DepotConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.listen_socket(), "127.0.0.1:2122");
        assert_eq!(config.max_upload_size_bytes, 2_000_000);
    }

    #[test]
    fn test_slices_carry_configured_values() {
        let config = DepotConfig {
            repository_root: "/srv/depot".into(),
            max_upload_size_bytes: 42,
            ..DepotConfig::default()
        };

        assert_eq!(
            config.storage_settings().repository_root,
            PathBuf::from("/srv/depot")
        );
        assert_eq!(config.upload_limits().max_upload_size_bytes, 42);
        assert_eq!(
            config.upload_limits().allowed_sniffed_type,
            "text/plain; charset=utf-8"
        );
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let zero_port = DepotConfig {
            port: 0,
            ..DepotConfig::default()
        };
        assert!(zero_port.validate().is_err());

        let empty_root = DepotConfig {
            repository_root: "  ".into(),
            ..DepotConfig::default()
        };
        assert!(empty_root.validate().is_err());

        let zero_ceiling = DepotConfig {
            max_upload_size_bytes: 0,
            ..DepotConfig::default()
        };
        assert!(zero_ceiling.validate().is_err());

        let no_type = DepotConfig {
            allowed_sniffed_type: String::new(),
            ..DepotConfig::default()
        };
        assert!(no_type.validate().is_err());

        let no_clients = DepotConfig {
            max_clients: 0,
            ..DepotConfig::default()
        };
        assert!(no_clients.validate().is_err());
    }
}
