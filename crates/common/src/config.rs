//! Client configuration loading from YAML files
//!
//! The configuration names where the service lives and how to reach its
//! discovery document. Every field has a default, so an empty file is valid.

use crate::{ClientError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use url::Url;

/// Root URL used when neither the configuration nor the document names one
pub const DEFAULT_ROOT_URL: &str = "http://localhost:8080/";

/// Location of the discovery document relative to the root URL
pub const DEFAULT_DISCOVERY_PATH: &str = "v1-alpha/discovery.json";

/// Default transport timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Client configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ClientConfig {
    /// Service root (e.g., "http://localhost:8080/")
    #[serde(default)]
    pub root_url: Option<String>,

    /// Discovery document path relative to the root URL
    #[serde(default = "default_discovery_path")]
    pub discovery_path: String,

    /// Transport timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// User-Agent header sent with every request
    #[serde(default)]
    pub user_agent: Option<String>,
}

fn default_discovery_path() -> String {
    DEFAULT_DISCOVERY_PATH.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            root_url: None,
            discovery_path: default_discovery_path(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: None,
        }
    }
}

impl ClientConfig {
    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            ClientError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        Self::from_yaml(&content).map_err(|e| {
            ClientError::Config(format!("Failed to load config from {:?}: {}", path, e))
        })
    }

    /// Parse configuration from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        // An empty document deserializes to unit, not to a mapping
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the configured root URL is absolute
    pub fn validate(&self) -> Result<()> {
        if let Some(root) = &self.root_url {
            let url = Url::parse(root)
                .map_err(|e| ClientError::Config(format!("Invalid root_url '{}': {}", root, e)))?;
            if url.cannot_be_a_base() {
                return Err(ClientError::Config(format!(
                    "root_url '{}' cannot be used as a base URL",
                    root
                )));
            }
        }
        Ok(())
    }

    /// Root URL to use, falling back to the default
    pub fn effective_root_url(&self) -> &str {
        self.root_url.as_deref().unwrap_or(DEFAULT_ROOT_URL)
    }

    /// URL of the discovery document
    pub fn discovery_url(&self) -> Result<Url> {
        let root = Url::parse(self.effective_root_url())?;
        Ok(root.join(&self.discovery_path)?)
    }
}
