//! Configuration management for fitctl
//!
//! Handles loading and saving the console configuration: backend hosts,
//! session storage location and output preferences.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

use crate::output::OutputFormat;
use crate::utils::expand_path;

/// Complete fitctl configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    /// Backend connection configuration
    pub server: ServerConfig,

    /// Session storage configuration
    pub session: SessionConfig,

    /// Output formatting configuration
    pub output: OutputConfig,
}

impl ConsoleConfig {
    /// Load configuration from file or fall back to defaults
    pub async fn load(config_path: Option<&Path>) -> Result<Self> {
        let path = match config_path {
            Some(p) => p.to_path_buf(),
            None => Self::default_config_path()?,
        };

        if path.exists() {
            debug!("Loading configuration from {}", path.display());
            let content = fs::read_to_string(&path)
                .await
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;

            let config = Self::parse(&path, &content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

            debug!("Configuration loaded successfully");
            Ok(config)
        } else {
            info!("No configuration file found, using defaults");
            Ok(Self::default())
        }
    }

    /// Save configuration to file
    pub async fn save(&self, config_path: Option<&Path>) -> Result<()> {
        let path = match config_path {
            Some(p) => p.to_path_buf(),
            None => Self::default_config_path()?,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
        }

        let content = if is_toml(&path) {
            toml::to_string_pretty(self)?
        } else {
            serde_yaml::to_string(self)?
        };

        fs::write(&path, content)
            .await
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        info!("Configuration saved to {}", path.display());
        Ok(())
    }

    fn parse(path: &Path, content: &str) -> Result<Self> {
        if is_toml(path) {
            Ok(toml::from_str(content)?)
        } else {
            Ok(serde_yaml::from_str(content)?)
        }
    }

    /// Get default configuration file path
    pub fn default_config_path() -> Result<PathBuf> {
        let dirs = directories::ProjectDirs::from("com", "fitfuel", "fitctl")
            .context("Failed to determine config directory")?;
        Ok(dirs.config_dir().join("config.yaml"))
    }

    /// Get default session file path
    pub fn default_session_path() -> Result<PathBuf> {
        let dirs = directories::ProjectDirs::from("com", "fitfuel", "fitctl")
            .context("Failed to determine data directory")?;
        Ok(dirs.data_dir().join("session.json"))
    }

    /// Session file in effect, honouring the configured override
    pub fn session_path(&self) -> Result<PathBuf> {
        match &self.session.path {
            Some(raw) => expand_path(raw),
            None => Self::default_session_path(),
        }
    }
}

fn is_toml(path: &Path) -> bool {
    path.extension().and_then(|s| s.to_str()) == Some("toml")
}

/// Backend connection configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host serving the authentication endpoint
    pub auth_url: String,

    /// Host serving the admin user endpoints
    pub api_url: String,

    /// Send the tunnel interstitial bypass header on admin calls
    pub tunnel_bypass: bool,

    /// Enable TLS verification
    pub verify_tls: bool,

    /// Request timeout in seconds
    pub timeout_seconds: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            auth_url: "http://localhost:5000".to_string(),
            api_url: "http://localhost:3000".to_string(),
            tunnel_bypass: true,
            verify_tls: true,
            timeout_seconds: 30,
        }
    }
}

/// Session storage configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Session file location; `~` and environment variables are expanded
    pub path: Option<String>,

    /// Keep the session in memory only, for one-off runs
    pub ephemeral: bool,
}

/// Output formatting configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Default output format
    pub format: OutputFormat,

    /// Enable color output
    pub color: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Table,
            color: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ConsoleConfig::load(Some(&dir.path().join("absent.yaml")))
            .await
            .unwrap();
        assert_eq!(config, ConsoleConfig::default());
    }

    #[tokio::test]
    async fn test_yaml_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.yaml");

        let mut config = ConsoleConfig::default();
        config.server.api_url = "https://api.example.test".to_string();
        config.server.tunnel_bypass = false;
        config.session.path = Some("/tmp/fitctl-session.json".to_string());
        config.output.format = OutputFormat::Json;

        config.save(Some(&path)).await.unwrap();
        let loaded = ConsoleConfig::load(Some(&path)).await.unwrap();
        assert_eq!(loaded, config);
    }

    #[tokio::test]
    async fn test_toml_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        tokio::fs::write(&path, "[server]\nauth_url = \"https://auth.example.test\"\n")
            .await
            .unwrap();

        let config = ConsoleConfig::load(Some(&path)).await.unwrap();
        assert_eq!(config.server.auth_url, "https://auth.example.test");
        assert_eq!(config.server.api_url, ServerConfig::default().api_url);
        assert_eq!(config.server.timeout_seconds, 30);
        assert!(config.output.color);
    }

    #[test]
    fn test_session_path_override() {
        let mut config = ConsoleConfig::default();
        config.session.path = Some("/var/tmp/session.json".to_string());
        assert_eq!(
            config.session_path().unwrap(),
            PathBuf::from("/var/tmp/session.json")
        );
    }
}
