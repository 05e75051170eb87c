//! Application configuration loaded from `config.toml`.
//!
//! ```toml
//! [database]
//! path = "/var/lib/registrar/registrar.db"
//!
//! [storage]
//! assets_dir = "/var/lib/registrar/assets"
//! exports_dir = "/var/lib/registrar/exports"
//!
//! [admin]
//! password = "change-me"
//! contact_identity = 123456789
//!
//! [logging]
//! level = "info"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use registrar_core::conversation::EngineSettings;
use registrar_core::error::{RegistrarError, Result};
use registrar_core::transport::SubjectId;
use serde::{Deserialize, Serialize};

use crate::paths::RegistrarPaths;

/// Environment variable that overrides `[admin] password`.
pub const ADMIN_PASSWORD_ENV: &str = "REGISTRAR_ADMIN_PASSWORD";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: RegistrarPaths::database_file(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub assets_dir: PathBuf,
    pub exports_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            assets_dir: RegistrarPaths::assets_dir(),
            exports_dir: RegistrarPaths::exports_dir(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Admin menu password. Empty disables the admin menu.
    pub password: String,
    /// Identity that receives "contact the administration" messages.
    pub contact_identity: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing-subscriber` filter directive, e.g. `info` or `registrar=debug`.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Root of `config.toml`. Every section is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistrarConfig {
    pub database: DatabaseConfig,
    pub storage: StorageConfig,
    pub admin: AdminConfig,
    pub logging: LoggingConfig,
}

impl RegistrarConfig {
    /// Loads the configuration from `path`, or from the default location.
    ///
    /// A missing or empty file yields the defaults. The admin password
    /// environment variable is applied last.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => RegistrarPaths::config_file()?,
        };

        let config = if path.exists() {
            let content = fs::read_to_string(&path).map_err(|e| {
                RegistrarError::config(format!("Failed to read {}: {}", path.display(), e))
            })?;
            Self::from_toml_str(&content)?
        } else {
            tracing::debug!("[Config] {} not found, using defaults", path.display());
            Self::default()
        };

        Ok(config.with_password_override(std::env::var(ADMIN_PASSWORD_ENV).ok()))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(toml::from_str(content)?)
    }

    /// Replaces the admin password when `password` is set and non-empty.
    pub fn with_password_override(mut self, password: Option<String>) -> Self {
        if let Some(password) = password.filter(|p| !p.is_empty()) {
            self.admin.password = password;
        }
        self
    }

    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            admin_password: self.admin.password.clone(),
            contact_identity: self.admin.contact_identity.map(SubjectId),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = RegistrarConfig::from_toml_str(
            r#"
[admin]
password = "1526"
contact_identity = 42
"#,
        )
        .unwrap();

        assert_eq!(config.admin.password, "1526");
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.database, DatabaseConfig::default());

        let settings = config.engine_settings();
        assert_eq!(settings.contact_identity, Some(SubjectId(42)));
    }

    #[test]
    fn test_load_from_explicit_path() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[database]\npath = \"/tmp/r.db\"\n[logging]\nlevel = \"debug\"").unwrap();

        let config = RegistrarConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.database.path, PathBuf::from("/tmp/r.db"));
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_missing_file_means_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = RegistrarConfig::load(Some(&dir.path().join("none.toml"))).unwrap();
        assert_eq!(config.storage, StorageConfig::default());
    }

    #[test]
    fn test_invalid_toml_is_reported() {
        let err = RegistrarConfig::from_toml_str("[admin\npassword=").unwrap_err();
        assert!(matches!(err, RegistrarError::Serialization { .. }));
    }

    #[test]
    fn test_password_override() {
        let config = RegistrarConfig::default();
        assert_eq!(
            config
                .clone()
                .with_password_override(Some("env".into()))
                .admin
                .password,
            "env"
        );
        assert_eq!(
            config.with_password_override(Some(String::new())).admin.password,
            ""
        );
    }
}
