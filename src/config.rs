//! Configuration system for persona-interact
//!
//! Supports multiple configuration sources with the following precedence (highest to lowest):
//! 1. CLI arguments
//! 2. Environment variables (PERSONA_INTERACT_* prefix)
//! 3. Configuration file (TOML)
//! 4. Default values

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Error, Result};

/// Main panel configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelConfig {
    /// Backend connection settings
    pub backend: BackendSettings,

    /// Agent/action the panel operates on
    pub session: SessionSettings,

    /// Logging configuration
    pub logging: LoggingSettings,
}

/// Backend connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendSettings {
    /// Base URL of the agent backend (walker API root)
    pub url: String,

    /// Bearer token sent with every call
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

/// Session defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// Agent whose parameters are managed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<String>,

    /// Persona action holding the configuration object
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_id: Option<String>,

    /// Parameters shown per page
    pub per_page: u32,
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Log level: trace, debug, info, warn, error
    pub level: String,

    /// Log file path (empty = no file logging)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,

    /// Maximum log file size in MB before rotation
    pub max_file_size_mb: u64,

    /// Number of rotated log files to keep
    pub max_files: u32,

    /// Enable JSON formatted logging
    pub json_format: bool,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            url: "http://localhost:8000".to_string(),
            token: None,
            timeout_secs: 30,
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            agent_id: None,
            action_id: None,
            per_page: 10,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            file: None,
            max_file_size_mb: 100,
            max_files: 5,
            json_format: false,
        }
    }
}

impl BackendSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl PanelConfig {
    /// Load configuration from file with environment variable overrides
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(path) = Self::find_config_file(config_path)? {
            debug!(path = %path.display(), "Loading configuration file");
            let content = fs::read_to_string(&path).map_err(|e| Error::IoRead {
                path: path.clone(),
                source: e,
            })?;
            config = toml::from_str(&content).map_err(|e| Error::ConfigParse {
                message: format!("{}: {}", path.display(), e.message()),
                source: Some(e),
            })?;
            info!(path = %path.display(), "Configuration loaded from file");
        }

        config.apply_env_overrides();
        config.expand_paths();
        config.validate()?;

        Ok(config)
    }

    /// Find the configuration file to use
    fn find_config_file(explicit_path: Option<&str>) -> Result<Option<PathBuf>> {
        if let Some(path) = explicit_path {
            let path = PathBuf::from(expand_path(path));
            if path.exists() {
                return Ok(Some(path));
            }
            return Err(Error::config_not_found(path));
        }

        let search_paths = [
            PathBuf::from("persona-interact.toml"),
            dirs::config_dir()
                .map(|p| p.join("persona-interact").join("config.toml"))
                .unwrap_or_default(),
            dirs::home_dir()
                .map(|p| p.join(".persona-interact").join("config.toml"))
                .unwrap_or_default(),
        ];

        for path in &search_paths {
            if !path.as_os_str().is_empty() && path.exists() {
                debug!(path = %path.display(), "Found configuration file");
                return Ok(Some(path.clone()));
            }
        }

        debug!("No configuration file found, using defaults");
        Ok(None)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("PERSONA_INTERACT_BACKEND_URL") {
            self.backend.url = val;
        }
        if let Ok(val) = std::env::var("PERSONA_INTERACT_TOKEN") {
            self.backend.token = Some(val);
        }
        if let Ok(val) = std::env::var("PERSONA_INTERACT_TIMEOUT_SECS") {
            if let Ok(n) = val.parse() {
                self.backend.timeout_secs = n;
            }
        }

        if let Ok(val) = std::env::var("PERSONA_INTERACT_AGENT_ID") {
            self.session.agent_id = Some(val);
        }
        if let Ok(val) = std::env::var("PERSONA_INTERACT_ACTION_ID") {
            self.session.action_id = Some(val);
        }
        if let Ok(val) = std::env::var("PERSONA_INTERACT_PER_PAGE") {
            if let Ok(n) = val.parse() {
                self.session.per_page = n;
            }
        }

        if let Ok(val) = std::env::var("PERSONA_INTERACT_LOG_LEVEL") {
            self.logging.level = val;
        }
        if let Ok(val) = std::env::var("PERSONA_INTERACT_LOG_FILE") {
            self.logging.file = Some(val);
        }
        if let Ok(val) = std::env::var("PERSONA_INTERACT_LOG_JSON") {
            self.logging.json_format = val.to_lowercase() == "true" || val == "1";
        }
    }

    /// Expand ~ and other path variables
    fn expand_paths(&mut self) {
        if let Some(ref file) = self.logging.file {
            self.logging.file = Some(expand_path(file));
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        let url = url::Url::parse(&self.backend.url).map_err(|e| {
            Error::config_field_invalid("backend.url", format!("Invalid backend URL '{}': {}", self.backend.url, e))
        })?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(Error::config_field_invalid(
                "backend.url",
                "Backend URL must start with http:// or https://",
            ));
        }

        if self.backend.timeout_secs == 0 {
            return Err(Error::config_field_invalid(
                "backend.timeout_secs",
                "timeout_secs must be at least 1",
            ));
        }

        if self.session.per_page == 0 {
            return Err(Error::config_field_invalid(
                "session.per_page",
                "per_page must be at least 1",
            ));
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(Error::config_validation(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_levels.join(", ")
            )));
        }

        Ok(())
    }

    /// Agent id, failing when neither config nor CLI supplied one
    pub fn require_agent_id(&self) -> Result<String> {
        non_empty(self.session.agent_id.as_deref())
            .ok_or_else(|| Error::config_field_invalid("session.agent_id", "agent_id is required"))
    }

    /// Action id, failing when neither config nor CLI supplied one
    pub fn require_action_id(&self) -> Result<String> {
        non_empty(self.session.action_id.as_deref())
            .ok_or_else(|| Error::config_field_invalid("session.action_id", "action_id is required"))
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Expand ~ and environment variables in paths
fn expand_path(path: &str) -> String {
    shellexpand::full(path)
        .unwrap_or_else(|_| std::borrow::Cow::Borrowed(path))
        .into_owned()
}

/// Initialize a new configuration file
pub fn init_config(path: Option<&str>, force: bool) -> Result<PathBuf> {
    let config_path = path
        .map(|p| PathBuf::from(expand_path(p)))
        .unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".persona-interact")
                .join("config.toml")
        });

    if config_path.exists() && !force {
        return Err(Error::Config(format!(
            "Configuration file already exists: {}. Use --force to overwrite.",
            config_path.display()
        )));
    }

    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::IoWrite {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    fs::write(&config_path, generate_default_config()).map_err(|e| Error::IoWrite {
        path: config_path.clone(),
        source: e,
    })?;

    Ok(config_path)
}

/// Generate default configuration content with comments
fn generate_default_config() -> String {
    r#"# persona-interact configuration

[backend]
# Base URL of the agent backend
url = "http://localhost:8000"

# Bearer token sent with every request
# token = "..."

# Request timeout in seconds
timeout_secs = 30

[session]
# Agent whose parameters are managed
# agent_id = "n:Agent:..."

# Persona interact action on that agent
# action_id = "n:Action:..."

# Parameters shown per page
per_page = 10

[logging]
# Log level: trace, debug, info, warn, error
level = "warn"

# Log file path (comment out to disable file logging)
# file = "~/.persona-interact/logs/panel.log"

# Maximum log file size in MB before rotation
max_file_size_mb = 100

# Number of rotated log files to keep
max_files = 5

# Enable JSON formatted logging
json_format = false
"#
    .to_string()
}
