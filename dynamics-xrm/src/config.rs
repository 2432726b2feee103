//! Web API connection configuration
//!
//! Loaded from the environment (optionally via a `.env` file) or from a TOML file,
//! with a builder for programmatic setup.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_API_VERSION: &str = "9.2";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const ENV_URL: &str = "DYNAMICS_URL";
pub const ENV_API_VERSION: &str = "DYNAMICS_API_VERSION";
pub const ENV_TOKEN: &str = "DYNAMICS_TOKEN";
pub const ENV_TIMEOUT: &str = "DYNAMICS_TIMEOUT_SECS";

/// Where and how to reach the Web API
#[derive(Debug, Clone, PartialEq)]
pub struct WebApiConfig {
    /// Organization URL (e.g., "https://contoso.crm4.dynamics.com")
    pub base_url: String,
    pub api_version: String,
    /// Bearer token; authentication itself is left to the caller
    pub access_token: Option<String>,
    pub timeout: Duration,
}

/// On-disk TOML shape
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ConfigFile {
    url: Option<String>,
    api_version: Option<String>,
    token: Option<String>,
    timeout_secs: Option<u64>,
}

impl WebApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_version: DEFAULT_API_VERSION.to_string(),
            access_token: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn builder(base_url: impl Into<String>) -> WebApiConfigBuilder {
        WebApiConfigBuilder::new(base_url)
    }

    /// Service root, always ending in `/`
    /// (e.g., "https://contoso.crm4.dynamics.com/api/data/v9.2/")
    pub fn service_root(&self) -> String {
        format!(
            "{}/api/data/v{}/",
            self.base_url.trim_end_matches('/'),
            self.api_version
        )
    }

    /// Load from variables supplied by `lookup`
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup(ENV_URL)
            .filter(|url| !url.trim().is_empty())
            .with_context(|| format!("{} is not set", ENV_URL))?;

        let mut config = WebApiConfig::new(base_url);
        if let Some(version) = lookup(ENV_API_VERSION) {
            config.api_version = version;
        }
        config.access_token = lookup(ENV_TOKEN).filter(|token| !token.is_empty());
        if let Some(secs) = lookup(ENV_TIMEOUT) {
            let secs: u64 = secs
                .trim()
                .parse()
                .with_context(|| format!("{} must be a whole number of seconds", ENV_TIMEOUT))?;
            config.timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }

    /// Load from the process environment, reading `.env` first if present
    pub fn from_env() -> Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            log::debug!("Loaded environment from {}", path.display());
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from a TOML file
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(content).context("Failed to parse TOML")?;
        let base_url = file.url.context("'url' is missing")?;

        let mut config = WebApiConfig::new(base_url);
        if let Some(version) = file.api_version {
            config.api_version = version;
        }
        config.access_token = file.token;
        if let Some(secs) = file.timeout_secs {
            config.timeout = Duration::from_secs(secs);
        }
        Ok(config)
    }

    /// Default config file location (`<config dir>/dynamics-xrm/config.toml`)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("dynamics-xrm").join("config.toml"))
    }

    /// Environment first, then the default config file
    pub fn load() -> Result<Self> {
        match Self::from_env() {
            Ok(config) => Ok(config),
            Err(env_err) => {
                let Some(path) = Self::default_path() else {
                    return Err(env_err);
                };
                if !path.exists() {
                    anyhow::bail!(
                        "No configuration found: set {} or create {}",
                        ENV_URL,
                        path.display()
                    );
                }
                Self::from_toml_file(&path)
            }
        }
    }
}

/// Builder for WebApiConfig
#[derive(Debug)]
pub struct WebApiConfigBuilder {
    config: WebApiConfig,
}

impl WebApiConfigBuilder {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            config: WebApiConfig::new(base_url),
        }
    }

    pub fn api_version(mut self, version: impl Into<String>) -> Self {
        self.config.api_version = version.into();
        self
    }

    pub fn access_token(mut self, token: impl Into<String>) -> Self {
        self.config.access_token = Some(token.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    pub fn build(self) -> WebApiConfig {
        self.config
    }
}
