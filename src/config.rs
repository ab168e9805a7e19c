//! Configuration Management
//!
//! Client configuration: credentials, default API version, timeouts and host
//! base URLs. Each [`crate::ApiClient`] holds its own snapshot, so clients
//! with different credentials can coexist.

use crate::api::auth::ApiKey;
use crate::error::{Error, Result};
use crate::resource::Host;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "https://api.stripe.com";
pub const DEFAULT_CONNECT_BASE: &str = "https://connect.stripe.com";
pub const DEFAULT_TIMEOUT_MS: u64 = 80_000;

pub const ENV_API_KEY: &str = "STRIPE_API_KEY";
pub const ENV_CLIENT_ID: &str = "STRIPE_CLIENT_ID";
pub const ENV_API_VERSION: &str = "STRIPE_API_VERSION";

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_connect_base() -> String {
    DEFAULT_CONNECT_BASE.to_string()
}

/// Client configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Secret key; read from the config file or environment, never written back
    #[serde(default, skip_serializing)]
    pub api_key: Option<ApiKey>,
    /// Connect platform client id used by OAuth
    #[serde(default)]
    pub client_id: Option<String>,
    /// API version pinned for every request
    #[serde(default)]
    pub api_version: Option<String>,
    /// Request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default)]
    pub max_network_retries: u32,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_connect_base")]
    pub connect_base: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            client_id: None,
            api_version: None,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            max_network_retries: 0,
            api_base: default_api_base(),
            connect_base: default_connect_base(),
        }
    }
}

impl ClientConfig {
    pub fn new(api_key: impl Into<ApiKey>) -> Self {
        Self::default().with_api_key(api_key)
    }

    pub fn with_api_key(mut self, api_key: impl Into<ApiKey>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = Some(version.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn with_max_network_retries(mut self, retries: u32) -> Self {
        self.max_network_retries = retries;
        self
    }

    /// Point a host at a different base URL (test servers, proxies)
    pub fn with_base_url(mut self, host: Host, base: impl Into<String>) -> Self {
        match host {
            Host::Api => self.api_base = base.into(),
            Host::Connect => self.connect_base = base.into(),
        }
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Base URL for a host, without trailing slash
    pub fn base_url(&self, host: Host) -> &str {
        let base = match host {
            Host::Api => &self.api_base,
            Host::Connect => &self.connect_base,
        };
        base.trim_end_matches('/')
    }

    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("stripe-methods").join("config.json"))
    }

    /// Load configuration from disk, falling back to defaults
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };
        Self::load_from(&path)
    }

    /// Load configuration from a specific file, falling back to defaults
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("Ignoring unreadable config {:?}: {}", path, e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        let Some(path) = Self::config_path() else {
            return Ok(());
        };
        self.save_to(&path)
    }

    /// Save configuration to a specific file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| Error::Config(format!("cannot create {:?}: {}", parent, e)))?;
        }

        let content = serde_json::to_string_pretty(self)
            .map_err(|e| Error::Config(e.to_string()))?;
        std::fs::write(path, content)
            .map_err(|e| Error::Config(format!("cannot write {:?}: {}", path, e)))?;

        Ok(())
    }

    /// Apply overrides from the process environment
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|name| std::env::var(name).ok())
    }

    /// Apply overrides from a variable lookup (env > file)
    pub fn with_overrides_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.is_empty());

        if let Some(key) = non_empty(ENV_API_KEY) {
            self.api_key = Some(ApiKey::new(key));
        }
        if let Some(client_id) = non_empty(ENV_CLIENT_ID) {
            self.client_id = Some(client_id);
        }
        if let Some(version) = non_empty(ENV_API_VERSION) {
            self.api_version = Some(version);
        }
        self
    }

    /// Set the default OAuth client id and save
    pub fn set_client_id(&mut self, client_id: &str) -> Result<()> {
        self.client_id = Some(client_id.to_string());
        self.save()
    }

    /// Pin the API version and save
    pub fn set_api_version(&mut self, version: &str) -> Result<()> {
        self.api_version = Some(version.to_string());
        self.save()
    }
}
