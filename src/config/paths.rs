//! Path management for sitecost
//!
//! ## Path Resolution Order
//!
//! 1. `SITECOST_CONFIG_DIR` environment variable (if set)
//! 2. The platform config directory from `directories`
//!    (`~/.config/sitecost` on Linux, `%APPDATA%\sitecost\config` on Windows)

use directories::ProjectDirs;
use std::path::{Path, PathBuf};

use crate::error::SiteCostError;

/// Environment variable overriding the config directory
pub const CONFIG_DIR_ENV: &str = "SITECOST_CONFIG_DIR";

/// Manages all paths used by sitecost
#[derive(Debug, Clone)]
pub struct SiteCostPaths {
    base_dir: PathBuf,
}

impl SiteCostPaths {
    /// Resolve the config directory
    ///
    /// # Errors
    ///
    /// Returns an error if no home directory can be determined.
    pub fn new() -> Result<Self, SiteCostError> {
        let base_dir = match std::env::var_os(CONFIG_DIR_ENV) {
            Some(custom) if !custom.is_empty() => PathBuf::from(custom),
            _ => ProjectDirs::from("", "", "sitecost")
                .map(|dirs| dirs.config_dir().to_path_buf())
                .ok_or_else(|| {
                    SiteCostError::Config("Could not determine a home directory".into())
                })?,
        };

        Ok(Self { base_dir })
    }

    /// Create paths rooted at a custom directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Get the path to the settings file
    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// Ensure the config directory exists
    pub fn ensure_directories(&self) -> Result<(), SiteCostError> {
        std::fs::create_dir_all(&self.base_dir)
            .map_err(|e| SiteCostError::Io(format!("Failed to create config directory: {}", e)))
    }

    /// Whether `sitecost init` has written a settings file
    pub fn is_initialized(&self) -> bool {
        self.settings_file().exists()
    }
}
