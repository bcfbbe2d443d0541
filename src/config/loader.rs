//! Configuration loading utilities
//!
//! Provides helper functions for loading configuration from various sources
//! with proper error handling and validation.

use crate::{Result, config::Settings};
use std::path::Path;
use tracing::{debug, info, warn};

/// Configuration loader with multiple source support
#[derive(Debug)]
pub struct ConfigLoader {
    /// Default settings
    defaults: Settings,
}

impl ConfigLoader {
    /// Create new configuration loader
    pub fn new() -> Self {
        Self {
            defaults: Settings::default(),
        }
    }

    /// Get the config file path from the SNOW_FEEDBACK_CONFIG environment
    /// variable or the default location
    ///
    /// Priority:
    /// 1. SNOW_FEEDBACK_CONFIG environment variable
    /// 2. ~/.config/snow-feedback/config.toml (or platform equivalent)
    pub fn get_config_path() -> Option<std::path::PathBuf> {
        if let Ok(config_path) = std::env::var("SNOW_FEEDBACK_CONFIG") {
            let path = std::path::PathBuf::from(config_path);
            if path.exists() {
                debug!("Using config file from SNOW_FEEDBACK_CONFIG: {:?}", path);
                return Some(path);
            } else {
                warn!("SNOW_FEEDBACK_CONFIG points to non-existent file: {:?}", path);
            }
        }

        if let Some(config_dir) = dirs::config_dir() {
            let default_path = config_dir.join("snow-feedback").join("config.toml");
            if default_path.exists() {
                debug!("Using default config file: {:?}", default_path);
                return Some(default_path);
            }
        }

        debug!("No config file found");
        None
    }

    /// Load configuration with precedence order:
    /// 1. Environment variables (highest priority)
    /// 2. Configuration file
    /// 3. Default values (lowest priority)
    pub fn load(&self, config_file: Option<&Path>) -> Result<Settings> {
        let mut settings = self.defaults.clone();

        if let Some(path) = config_file {
            if path.exists() {
                info!("Loading configuration from file: {:?}", path);
                settings = Settings::from_file(path)?;
            } else {
                warn!("Configuration file not found: {:?}, using defaults", path);
            }
        }

        debug!("Applying environment variable overrides");
        settings = settings.merge_with_env()?;

        settings.validate()?;

        debug!("Configuration loaded successfully");
        Ok(settings)
    }

    /// Get default configuration
    pub fn defaults(&self) -> &Settings {
        &self.defaults
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_with_no_file_uses_defaults() {
        let loader = ConfigLoader::new();
        let settings = loader.load(None).unwrap();
        assert_eq!(settings.instance.url, loader.defaults().instance.url);
    }

    #[test]
    fn test_load_with_missing_file_falls_back() {
        let loader = ConfigLoader::new();
        let settings = loader
            .load(Some(Path::new("/definitely/not/here.toml")))
            .unwrap();
        assert_eq!(settings.instance.url, "https://surf.service-now.com");
    }

    #[test]
    fn test_load_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "[instance]\nurl = \"https://qa.service-now.com\"").unwrap();

        let loader = ConfigLoader::new();
        let settings = loader.load(Some(temp_file.path())).unwrap();
        assert_eq!(settings.instance.url, "https://qa.service-now.com");
    }

    #[test]
    fn test_invalid_file_is_rejected() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "[instance]\nurl = \"not a url\"").unwrap();

        let loader = ConfigLoader::new();
        assert!(loader.load(Some(temp_file.path())).is_err());
    }
}
