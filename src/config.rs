//! Configuration settings for the colloquia service.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub deployment: DeploymentConfig,
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 37778,
        }
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|_| {
                ConfigError::Invalid(format!("invalid bind address {}:{}", self.host, self.port))
                    .into()
            })
    }
}

/// Deployment-mode settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DeploymentConfig {
    /// When set, the whole deployment is restricted to one subject and
    /// every listing ignores explicit subject criteria in its favor.
    pub single_subject: Option<String>,
}

/// Resolved deployment mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeploymentMode {
    /// The full multi-subject directory.
    MultiSubject,
    /// A single-subject deployment (e.g. a math-only site).
    SingleSubject(String),
}

impl DeploymentConfig {
    pub fn mode(&self) -> DeploymentMode {
        match &self.single_subject {
            Some(subject) if !subject.is_empty() => {
                DeploymentMode::SingleSubject(subject.clone())
            }
            _ => DeploymentMode::MultiSubject,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::ReadFile)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from default locations or use defaults.
    pub fn load() -> Result<Self> {
        let config_paths = [
            PathBuf::from("config.toml"),
            PathBuf::from("colloquia.toml"),
        ];
        for path in &config_paths {
            if path.exists() {
                tracing::info!("Loading config from: {}", path.display());
                return Self::from_file(path);
            }
        }
        tracing::info!("No config file found, using defaults");
        Ok(Config::default())
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(ConfigError::Invalid("server.port must be > 0".to_string()).into());
        }
        if let Some(subject) = &self.deployment.single_subject {
            if subject.is_empty() {
                return Err(ConfigError::Invalid(
                    "deployment.single_subject must not be empty".to_string(),
                )
                .into());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.port, 37778);
        assert_eq!(config.deployment.mode(), DeploymentMode::MultiSubject);
    }

    #[test]
    fn test_parse_single_subject() {
        let config = Config::from_toml(
            r#"
            [server]
            port = 8080

            [deployment]
            single_subject = "math"
            "#,
        )
        .unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(
            config.deployment.mode(),
            DeploymentMode::SingleSubject("math".to_string())
        );
    }

    #[test]
    fn test_invalid_port_rejected() {
        assert!(Config::from_toml("[server]\nport = 0").is_err());
    }
}
