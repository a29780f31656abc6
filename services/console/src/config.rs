//! Configuration types and loading
//!
//! Config precedence: CLI args > env vars > config file > defaults.
//! A missing config file is not an error; every section has defaults so the
//! console starts against the local backend with the built-in route table.

use formatting::Locale;
use interceptor::SelectionPolicy;
use interceptor::endpoints::DEFAULT_BASE_URL;
use navigation::{RouteSpec, RouteTable};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

/// Root configuration
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub session: SessionConfig,
    /// Route table override. Empty means the built-in layout.
    #[serde(default)]
    pub routes: Vec<RouteSpec>,
}

/// Backend API settings
#[derive(Debug, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

/// Credential persistence and presentation
#[derive(Debug, Default, Deserialize)]
pub struct SessionConfig {
    /// JSON file holding the credentials. Unset keeps them in memory only.
    #[serde(default)]
    pub credential_file: Option<PathBuf>,
    #[serde(default)]
    pub selection: SelectionPolicy,
    #[serde(default)]
    pub locale: Locale,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout() -> u64 {
    30
}

impl Config {
    /// Load configuration from a TOML file, then overlay environment variables.
    pub fn load(path: &Path) -> common::Result<Self> {
        let mut config: Config = if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            toml::from_str(&contents)?
        } else {
            info!(path = %path.display(), "config file not found, using defaults");
            Config::default()
        };

        if let Ok(url) = std::env::var("API_BASE_URL") {
            config.api.base_url = url;
        }

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> common::Result<()> {
        if !self.api.base_url.starts_with("http://") && !self.api.base_url.starts_with("https://")
        {
            return Err(common::Error::Config(format!(
                "base_url must start with http:// or https://, got: {}",
                self.api.base_url
            )));
        }

        if self.api.timeout_secs == 0 {
            return Err(common::Error::Config(
                "timeout_secs must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Build the route table, falling back to the built-in layout.
    pub fn route_table(&self) -> common::Result<RouteTable> {
        if self.routes.is_empty() {
            return Ok(RouteTable::default());
        }
        RouteTable::from_specs(self.routes.clone())
            .map_err(|e| common::Error::Config(e.to_string()))
    }

    /// Resolve config file path from CLI arg or CONFIG_PATH env var.
    pub fn resolve_path(cli_path: Option<&str>) -> PathBuf {
        if let Some(p) = cli_path {
            return PathBuf::from(p);
        }
        if let Ok(p) = std::env::var("CONFIG_PATH") {
            return PathBuf::from(p);
        }
        PathBuf::from("session-console.toml")
    }
}
