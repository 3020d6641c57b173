//! Service configuration parsing
//!
//! Loads the service configuration from YAML and applies environment
//! overrides. Every field has a default, so an empty document (or no file at
//! all) yields a working configuration.

use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::query::MAX_SUGGESTIONS;

/// Environment variable naming the config file
pub const CONFIG_PATH_ENV: &str = "NAMES_SEARCH_CONFIG";
/// Config file used when `NAMES_SEARCH_CONFIG` is unset
pub const DEFAULT_CONFIG_PATH: &str = "config/names_search.yaml";

const ADDR_ENV: &str = "NAMES_SEARCH_ADDR";
const CATALOG_URL_ENV: &str = "NAMES_SEARCH_CATALOG_URL";
const STORE_URL_ENV: &str = "NAMES_SEARCH_STORE_URL";

/// Root configuration structure
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Address the HTTP listener binds to
    pub bind_addr: String,
    pub catalog: CatalogConfig,
    pub store: StoreConfig,
    pub index: IndexConfig,
    pub query: QueryConfig,
}

/// Where the catalog snapshot comes from
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub url: String,
    pub connect_timeout_secs: u64,
    /// Upper bound for one complete fetch, body included
    pub fetch_timeout_secs: u64,
}

/// Sorted-set store backend selection
#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    #[default]
    Redis,
    /// In-process store; the index lives only as long as the process
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    /// Store address, e.g. `redis://redis:6379`
    pub address: String,
    /// Bound on one connection attempt; there are no retries behind it
    pub connect_timeout_ms: u64,
    pub call_timeout_secs: u64,
}

/// Build pipeline settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Pending operations that trigger a flush
    pub batch_size: usize,
    pub rebuild_interval_secs: u64,
    pub readiness_poll_interval_ms: u64,
}

/// Query service settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    pub cache_max_age_secs: u64,
    pub max_suggestions: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            catalog: CatalogConfig::default(),
            store: StoreConfig::default(),
            index: IndexConfig::default(),
            query: QueryConfig::default(),
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            url: "https://replicate.npmjs.com/_all_docs".to_string(),
            connect_timeout_secs: 30,
            fetch_timeout_secs: 3600,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Redis,
            address: "redis://redis:6379".to_string(),
            connect_timeout_ms: 500,
            call_timeout_secs: 30,
        }
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            batch_size: 1000,
            rebuild_interval_secs: 12 * 60 * 60,
            readiness_poll_interval_ms: 1000,
        }
    }
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            cache_max_age_secs: 300,
            max_suggestions: MAX_SUGGESTIONS,
        }
    }
}

impl CatalogConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

impl StoreConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_secs)
    }
}

impl IndexConfig {
    pub fn rebuild_interval(&self) -> Duration {
        Duration::from_secs(self.rebuild_interval_secs)
    }

    pub fn readiness_poll_interval(&self) -> Duration {
        Duration::from_millis(self.readiness_poll_interval_ms)
    }
}

impl QueryConfig {
    pub fn cache_max_age(&self) -> Duration {
        Duration::from_secs(self.cache_max_age_secs)
    }
}

impl ServiceConfig {
    /// Load configuration from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        // An empty document deserializes to unit, not to an empty mapping
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: ServiceConfig = serde_yaml::from_str(content)?;
        Ok(config)
    }

    /// Resolve the configuration for the running process
    ///
    /// Reads the file named by `NAMES_SEARCH_CONFIG` (which must exist), or
    /// the default path if present, then applies environment overrides and
    /// validates the result.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => Self::from_file(path)?,
            Err(_) if Path::new(DEFAULT_CONFIG_PATH).exists() => {
                Self::from_file(DEFAULT_CONFIG_PATH)?
            }
            Err(_) => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from a key lookup (normally the process environment)
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(addr) = lookup(ADDR_ENV) {
            self.bind_addr = addr;
        }
        if let Some(url) = lookup(CATALOG_URL_ENV) {
            self.catalog.url = url;
        }
        if let Some(url) = lookup(STORE_URL_ENV) {
            self.store.address = url;
        }
    }

    /// Reject values the pipeline cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.bind_addr
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::Invalid {
                field: "bind_addr",
                reason: e.to_string(),
            })?;

        let checks: [(&'static str, bool); 6] = [
            ("index.batch_size", self.index.batch_size == 0),
            ("index.rebuild_interval_secs", self.index.rebuild_interval_secs == 0),
            (
                "index.readiness_poll_interval_ms",
                self.index.readiness_poll_interval_ms == 0,
            ),
            ("query.max_suggestions", self.query.max_suggestions == 0),
            ("store.connect_timeout_ms", self.store.connect_timeout_ms == 0),
            ("store.call_timeout_secs", self.store.call_timeout_secs == 0),
        ];
        for (field, is_zero) in checks {
            if is_zero {
                return Err(ConfigError::Invalid {
                    field,
                    reason: "must be greater than zero".to_string(),
                });
            }
        }

        if self.query.max_suggestions > MAX_SUGGESTIONS {
            return Err(ConfigError::Invalid {
                field: "query.max_suggestions",
                reason: format!("must be at most {MAX_SUGGESTIONS}"),
            });
        }
        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.bind_addr.parse().map_err(|e: std::net::AddrParseError| {
            ConfigError::Invalid {
                field: "bind_addr",
                reason: e.to_string(),
            }
        })
    }
}
