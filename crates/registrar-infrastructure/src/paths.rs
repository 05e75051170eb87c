//! Default file locations.
//!
//! ```text
//! ~/.config/registrar/        # Config directory
//! └── config.toml             # Application configuration
//!
//! ~/.local/share/registrar/   # Data directory
//! ├── registrar.db            # SQLite database
//! ├── assets/                 # Uploaded images, one sub-folder per field
//! └── exports/                # CSV exports
//! ```

use std::path::PathBuf;

use registrar_core::error::{RegistrarError, Result};

const APP_DIR: &str = "registrar";

pub struct RegistrarPaths;

impl RegistrarPaths {
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or_else(|| RegistrarError::config("Cannot find config directory"))
    }

    pub fn config_file() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Data directory, falling back to the working directory when the
    /// platform has none.
    pub fn data_dir() -> PathBuf {
        dirs::data_dir()
            .map(|dir| dir.join(APP_DIR))
            .unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn database_file() -> PathBuf {
        Self::data_dir().join("registrar.db")
    }

    pub fn assets_dir() -> PathBuf {
        Self::data_dir().join("assets")
    }

    pub fn exports_dir() -> PathBuf {
        Self::data_dir().join("exports")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_files_share_the_data_dir() {
        let data = RegistrarPaths::data_dir();
        assert!(RegistrarPaths::database_file().starts_with(&data));
        assert!(RegistrarPaths::assets_dir().ends_with("assets"));
        assert!(RegistrarPaths::exports_dir().ends_with("exports"));
    }
}
