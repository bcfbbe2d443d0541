//! Configuration management
//!
//! Provides configuration loading from a TOML file and environment
//! variables, with per-field defaults matching the production instance.

use crate::session::browser::BrowserKind;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// Helper functions for serde defaults
fn default_instance_url() -> String {
    "https://surf.service-now.com".to_string()
}

fn default_feedback_table() -> String {
    "x_snc_security_d_0_dsrtable".to_string()
}

fn default_headless_timeout() -> u64 {
    30
}

fn default_interactive_timeout() -> u64 {
    300
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".to_string()
}

fn default_connect_timeout() -> u64 {
    30
}

fn default_request_timeout() -> u64 {
    60
}

fn default_probe_timeout() -> u64 {
    10
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Main configuration settings for the feedback submitter
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    /// ServiceNow instance configuration
    #[serde(default)]
    pub instance: InstanceSettings,
    /// Browser login configuration
    #[serde(default)]
    pub browser: BrowserSettings,
    /// Network configuration
    #[serde(default)]
    pub network: NetworkSettings,
    /// Credential cache configuration
    #[serde(default)]
    pub cache: CacheSettings,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// ServiceNow instance configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstanceSettings {
    /// Instance base URL
    #[serde(default = "default_instance_url")]
    pub url: String,
    /// Table receiving feedback records
    #[serde(default = "default_feedback_table")]
    pub feedback_table: String,
}

/// Browser login configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserSettings {
    /// Browser engine handed to the login helper
    #[serde(default)]
    pub kind: BrowserKind,
    /// External login helper command (program plus leading arguments).
    /// Without one, automatic refresh reports failure and credentials must
    /// be imported manually.
    #[serde(default)]
    pub login_command: Option<Vec<String>>,
    /// Attempt a headless refresh before falling back to a visible browser.
    /// Off by default: the production instance sits behind Okta MFA, which
    /// headless logins cannot complete.
    #[serde(default)]
    pub headless_refresh: bool,
    /// Bound on a headless login attempt, in seconds
    #[serde(default = "default_headless_timeout")]
    pub headless_timeout_secs: u64,
    /// Bound on an interactive login attempt, in seconds. Sized for a
    /// human completing login and MFA.
    #[serde(default = "default_interactive_timeout")]
    pub interactive_timeout_secs: u64,
}

/// Network configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkSettings {
    /// User agent string
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Connection timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// Timeout for the credential probe call, in seconds
    #[serde(default = "default_probe_timeout")]
    pub probe_timeout_secs: u64,
}

/// Credential cache configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CacheSettings {
    /// Credential cache file path; defaults to the per-user location when
    /// unset
    #[serde(default)]
    pub credentials_file: Option<PathBuf>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Enable verbose logging
    #[serde(default)]
    pub verbose: bool,
}

impl Default for InstanceSettings {
    fn default() -> Self {
        Self {
            url: default_instance_url(),
            feedback_table: default_feedback_table(),
        }
    }
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            kind: BrowserKind::Chrome,
            login_command: None,
            headless_refresh: false,
            headless_timeout_secs: default_headless_timeout(),
            interactive_timeout_secs: default_interactive_timeout(),
        }
    }
}

impl Default for NetworkSettings {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            connect_timeout_secs: default_connect_timeout(),
            request_timeout_secs: default_request_timeout(),
            probe_timeout_secs: default_probe_timeout(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            verbose: false,
        }
    }
}

impl InstanceSettings {
    /// Table API endpoint for the given table
    pub fn table_api_url(&self, table: &str) -> String {
        format!("{}/api/now/table/{}", self.url.trim_end_matches('/'), table)
    }

    /// Table API endpoint of the feedback table
    pub fn feedback_api_url(&self) -> String {
        self.table_api_url(&self.feedback_table)
    }
}

impl Settings {
    /// Create new settings with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load settings from environment variables
    pub fn from_env() -> crate::Result<Self> {
        let mut settings = Self::default();

        if let Ok(url) = std::env::var("SNOW_INSTANCE_URL") {
            settings.instance.url = url;
        }

        if let Ok(table) = std::env::var("SNOW_FEEDBACK_TABLE") {
            settings.instance.feedback_table = table;
        }

        if let Ok(path) = std::env::var("SNOW_SESSION_FILE") {
            settings.cache.credentials_file = Some(PathBuf::from(path));
        }

        if let Ok(level) = std::env::var("LOG_LEVEL") {
            settings.logging.level = level;
        }

        if let Ok(verbose) = std::env::var("VERBOSE") {
            settings.logging.verbose = verbose.parse().unwrap_or(false);
        }

        Ok(settings)
    }

    /// Load settings from a TOML configuration file
    pub fn from_file<P: AsRef<std::path::Path>>(path: P) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            crate::Error::config("file", &format!("Failed to read config file: {}", e))
        })?;

        let settings: Settings = toml::from_str(&content).map_err(|e| {
            crate::Error::config("file", &format!("Failed to parse config file: {}", e))
        })?;

        Ok(settings)
    }

    /// Merge settings with environment variable overrides
    pub fn merge_with_env(mut self) -> crate::Result<Self> {
        let env_settings = Self::from_env()?;
        let defaults = Self::default();

        // Merge only non-default values from environment
        if env_settings.instance.url != defaults.instance.url {
            self.instance.url = env_settings.instance.url;
        }

        if env_settings.instance.feedback_table != defaults.instance.feedback_table {
            self.instance.feedback_table = env_settings.instance.feedback_table;
        }

        if env_settings.cache.credentials_file.is_some() {
            self.cache.credentials_file = env_settings.cache.credentials_file;
        }

        if env_settings.logging.level != defaults.logging.level {
            self.logging.level = env_settings.logging.level;
        }

        if env_settings.logging.verbose {
            self.logging.verbose = true;
        }

        Ok(self)
    }

    /// Validate configuration settings
    pub fn validate(&self) -> crate::Result<()> {
        if let Err(e) = url::Url::parse(&self.instance.url) {
            return Err(crate::Error::config(
                "instance.url",
                &format!("Invalid instance URL '{}': {}", self.instance.url, e),
            ));
        }

        if self.instance.feedback_table.is_empty() {
            return Err(crate::Error::config(
                "instance.feedback_table",
                "Feedback table cannot be empty",
            ));
        }

        if self.browser.interactive_timeout_secs == 0 || self.browser.headless_timeout_secs == 0 {
            return Err(crate::Error::config(
                "browser",
                "Login timeouts cannot be 0",
            ));
        }

        if let Some(command) = &self.browser.login_command
            && command.is_empty()
        {
            return Err(crate::Error::config(
                "browser.login_command",
                "Login helper command cannot be an empty list",
            ));
        }

        match self.logging.level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(crate::Error::config(
                    "logging.level",
                    &format!("Invalid log level: {}", self.logging.level),
                ));
            }
        }

        Ok(())
    }
}
