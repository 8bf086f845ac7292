//! Configuration module for firewall-list
//!
//! Handles loading and merging configuration from multiple sources:
//! - Default values
//! - Configuration file (explicit path, or ./firewall-list.toml)
//! - Environment variables
//! - Command-line arguments (applied by the CLI layer)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default compute API endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://compute.googleapis.com/compute/v1";

/// Default output file name.
pub const DEFAULT_OUTPUT: &str = "output.csv";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Project-local configuration file picked up when no explicit path is given.
pub const PROJECT_CONFIG_FILE: &str = "firewall-list.toml";

/// Environment variable holding a pre-issued OAuth access token.
pub const ACCESS_TOKEN_ENV: &str = "GOOGLE_OAUTH_ACCESS_TOKEN";

/// Main configuration structure
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Compute API settings
    pub api: ApiConfig,

    /// Output settings
    pub output: OutputConfig,

    /// Project whose firewall rules are exported
    #[serde(skip)]
    pub project_id: String,

    /// Static access token, only ever taken from the environment
    #[serde(skip)]
    pub access_token: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            output: OutputConfig::default(),
            project_id: String::new(),
            access_token: None,
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api", &self.api)
            .field("output", &self.output)
            .field("project_id", &self.project_id)
            .field(
                "access_token",
                &self.access_token.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

/// Compute API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the compute API
    pub endpoint: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// User agent sent with every request
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: format!("firewall-list/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ApiConfig {
    /// Request timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Destination CSV file
    pub path: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_OUTPUT),
        }
    }
}

impl Config {
    /// Load configuration from all sources
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        let mut config = Config::default();

        if let Some(path) = Self::get_config_path(config_path) {
            config = config.merge_from_file(&path)?;
        }

        // Apply environment variable overrides
        config.apply_env_overrides()?;

        Ok(config)
    }

    /// Resolve which configuration file to read, if any
    fn get_config_path(explicit_path: Option<&PathBuf>) -> Option<PathBuf> {
        // An explicit path must exist; reading it reports the error
        if let Some(path) = explicit_path {
            return Some(path.clone());
        }

        let project = PathBuf::from(PROJECT_CONFIG_FILE);
        project.exists().then_some(project)
    }

    /// Merge configuration from a file
    fn merge_from_file(&self, path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        // Determine format based on extension
        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");

        let file_config: Config = match extension {
            "yml" | "yaml" => serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?,
            "json" => serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?,
            _ => toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?,
        };

        Ok(self.merge(file_config))
    }

    /// Merge another config into this one
    fn merge(&self, other: Config) -> Config {
        let defaults = ApiConfig::default();
        Config {
            api: ApiConfig {
                endpoint: if other.api.endpoint != defaults.endpoint {
                    other.api.endpoint
                } else {
                    self.api.endpoint.clone()
                },
                timeout_secs: if other.api.timeout_secs != defaults.timeout_secs {
                    other.api.timeout_secs
                } else {
                    self.api.timeout_secs
                },
                user_agent: if other.api.user_agent != defaults.user_agent {
                    other.api.user_agent
                } else {
                    self.api.user_agent.clone()
                },
            },
            output: OutputConfig {
                path: if other.output.path.as_os_str() != DEFAULT_OUTPUT {
                    other.output.path
                } else {
                    self.output.path.clone()
                },
            },
            project_id: self.project_id.clone(),
            access_token: self.access_token.clone(),
        }
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) -> Result<()> {
        // GOOGLE_OAUTH_ACCESS_TOKEN
        self.access_token = std::env::var(ACCESS_TOKEN_ENV)
            .ok()
            .filter(|token| !token.is_empty());

        // FIREWALL_LIST_ENDPOINT
        if let Ok(endpoint) = std::env::var("FIREWALL_LIST_ENDPOINT") {
            if !endpoint.is_empty() {
                self.api.endpoint = endpoint;
            }
        }

        // FIREWALL_LIST_TIMEOUT
        if let Ok(timeout) = std::env::var("FIREWALL_LIST_TIMEOUT") {
            self.api.timeout_secs = timeout
                .parse()
                .with_context(|| format!("FIREWALL_LIST_TIMEOUT is not a number: {}", timeout))?;
        }

        // FIREWALL_LIST_OUTPUT
        if let Ok(path) = std::env::var("FIREWALL_LIST_OUTPUT") {
            if !path.is_empty() {
                self.output.path = PathBuf::from(path);
            }
        }

        Ok(())
    }

    /// Check the settings a run depends on.
    pub fn validate(&self) -> crate::Result<()> {
        if self.project_id.is_empty() {
            return Err(crate::Error::usage("a project ID is required"));
        }
        if self.api.timeout_secs == 0 {
            return Err(crate::Error::config("api.timeout_secs must be greater than zero"));
        }
        url::Url::parse(&self.api.endpoint).map_err(|e| crate::Error::Config {
            message: format!("invalid compute endpoint '{}'", self.api.endpoint),
            source: Some(Box::new(e)),
        })?;
        Ok(())
    }

    /// Set the project to export
    pub fn with_project(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = project_id.into();
        self
    }

    /// Get the effective output path, falling back to the default for an empty value
    pub fn output_path(&self) -> &Path {
        if self.output.path.as_os_str().is_empty() {
            Path::new(DEFAULT_OUTPUT)
        } else {
            &self.output.path
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.api.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.output_path(), Path::new("output.csv"));
        assert!(config.access_token.is_none());
    }

    #[test]
    fn test_config_merge() {
        let base = Config::default().with_project("my-project");
        let other = Config {
            api: ApiConfig {
                timeout_secs: 5,
                ..ApiConfig::default()
            },
            ..Config::default()
        };

        let merged = base.merge(other);
        assert_eq!(merged.api.timeout_secs, 5);
        assert_eq!(merged.api.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(merged.project_id, "my-project");
    }

    #[test]
    fn test_empty_output_falls_back_to_default() {
        let mut config = Config::default();
        config.output.path = PathBuf::new();
        assert_eq!(config.output_path(), Path::new(DEFAULT_OUTPUT));
    }

    #[test]
    fn test_validate_rejects_empty_project() {
        let err = Config::default().validate().unwrap_err();
        assert!(matches!(err, crate::Error::Usage(_)));

        let err = Config::default().with_project("").validate().unwrap_err();
        assert_eq!(err.exit_code(), 1);

        // Whitespace is passed to the API as given
        assert!(Config::default().with_project("   ").validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_endpoint() {
        let mut config = Config::default().with_project("p");
        config.api.endpoint = "not a url".to_string();
        assert!(matches!(
            config.validate(),
            Err(crate::Error::Config { .. })
        ));
    }

    #[test]
    fn test_debug_redacts_token() {
        let mut config = Config::default();
        config.access_token = Some("ya29.secret".to_string());
        let printed = format!("{:?}", config);
        assert!(!printed.contains("ya29.secret"));
        assert!(printed.contains("[REDACTED]"));
    }
}
