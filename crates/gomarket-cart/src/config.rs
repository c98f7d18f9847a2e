//! # Cart Configuration
//!
//! Configuration management for the cart store.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     GOMARKET_BACKEND=memory                                            │
//! │     GOMARKET_DB_PATH=/var/lib/gomarket/cart.db                         │
//! │     GOMARKET_STORAGE_KEY=@GoMarketplace:products                       │
//! │     GOMARKET_COALESCE_WRITES=false                                     │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/gomarket/cart.toml (Linux)                               │
//! │     ~/Library/Application Support/com.GoMarket.gomarket/cart.toml      │
//! │       (macOS)                                                          │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     sqlite backend in the platform data dir                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # cart.toml
//! [storage]
//! backend = "sqlite"            # sqlite | memory
//! database_path = "/data/gomarket.db"
//! max_connections = 2
//!
//! [cart]
//! storage_key = "@GoMarketplace:products"
//! coalesce_writes = true
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

use gomarket_core::DEFAULT_STORAGE_KEY;
use gomarket_db::{Database, DbConfig, KeyValueStore, MemoryStore};

use crate::error::{CartError, CartResult};

// =============================================================================
// Storage Backend
// =============================================================================

/// Where the cart snapshot is kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    /// SQLite file, survives restarts.
    #[default]
    Sqlite,

    /// Process memory only.
    Memory,
}

impl std::fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageBackend::Sqlite => write!(f, "sqlite"),
            StorageBackend::Memory => write!(f, "memory"),
        }
    }
}

impl std::str::FromStr for StorageBackend {
    type Err = CartError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sqlite" | "file" => Ok(StorageBackend::Sqlite),
            "memory" | "mem" => Ok(StorageBackend::Memory),
            other => Err(CartError::InvalidConfig(format!(
                "Unknown storage backend: '{}'. Valid options: sqlite, memory",
                other
            ))),
        }
    }
}

// =============================================================================
// Storage Settings
// =============================================================================

/// Storage backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageSettings {
    /// Backend kind.
    #[serde(default)]
    pub backend: StorageBackend,

    /// SQLite file. Falls back to the platform data directory when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_path: Option<PathBuf>,

    /// Pool size for the SQLite backend.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    2
}

impl Default for StorageSettings {
    fn default() -> Self {
        StorageSettings {
            backend: StorageBackend::default(),
            database_path: None,
            max_connections: default_max_connections(),
        }
    }
}

// =============================================================================
// Cart Settings
// =============================================================================

/// Cart store behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartSettings {
    /// Key the snapshot is stored under.
    #[serde(default = "default_storage_key")]
    pub storage_key: String,

    /// Let the writer skip saves that a newer queued save supersedes.
    #[serde(default = "default_true")]
    pub coalesce_writes: bool,
}

fn default_storage_key() -> String {
    DEFAULT_STORAGE_KEY.to_string()
}

fn default_true() -> bool {
    true
}

impl Default for CartSettings {
    fn default() -> Self {
        CartSettings {
            storage_key: default_storage_key(),
            coalesce_writes: true,
        }
    }
}

// =============================================================================
// Main Configuration
// =============================================================================

/// Complete cart configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CartConfig {
    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageSettings,

    /// Cart store settings.
    #[serde(default)]
    pub cart: CartSettings,
}

impl CartConfig {
    /// Creates a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a config using the in-memory backend (for tests).
    pub fn in_memory() -> Self {
        let mut config = Self::default();
        config.storage.backend = StorageBackend::Memory;
        config
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (cart.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> CartResult<Self> {
        Self::load_with(config_path, |name| std::env::var(name).ok())
    }

    /// Same as [`CartConfig::load`], with variables read through `lookup`.
    fn load_with<F>(config_path: Option<PathBuf>, lookup: F) -> CartResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading cart config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_overrides(lookup);
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load cart config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> CartResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| CartError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Cart config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> CartResult<()> {
        if self.cart.storage_key.trim().is_empty() {
            return Err(CartError::InvalidConfig(
                "storage_key must not be empty".into(),
            ));
        }

        if self.storage.backend == StorageBackend::Sqlite {
            if self.storage.max_connections == 0 {
                return Err(CartError::InvalidConfig(
                    "max_connections must be greater than 0".into(),
                ));
            }

            if self.database_path().is_none() {
                return Err(CartError::InvalidConfig(
                    "sqlite backend needs database_path (no platform data dir found)".into(),
                ));
            }
        }

        Ok(())
    }

    /// Applies overrides from a variable lookup.
    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(backend) = lookup("GOMARKET_BACKEND") {
            match backend.parse() {
                Ok(parsed) => {
                    debug!(backend = %backend, "Overriding storage backend from environment");
                    self.storage.backend = parsed;
                }
                Err(_) => warn!(backend = %backend, "Unknown storage backend in environment"),
            }
        }

        if let Some(path) = lookup("GOMARKET_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.storage.database_path = Some(PathBuf::from(path));
        }

        if let Some(key) = lookup("GOMARKET_STORAGE_KEY") {
            self.cart.storage_key = key;
        }

        if let Some(flag) = lookup("GOMARKET_COALESCE_WRITES") {
            match flag.to_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => self.cart.coalesce_writes = true,
                "0" | "false" | "no" | "off" => self.cart.coalesce_writes = false,
                _ => warn!(value = %flag, "Unknown GOMARKET_COALESCE_WRITES value"),
            }
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join("cart.toml"))
    }

    /// Returns the SQLite file path: the configured one, or the platform
    /// data directory default.
    pub fn database_path(&self) -> Option<PathBuf> {
        self.storage.database_path.clone().or_else(|| {
            project_dirs().map(|dirs| dirs.data_dir().join("gomarket.db"))
        })
    }

    /// Opens the configured storage backend.
    pub async fn connect_storage(&self) -> CartResult<Arc<dyn KeyValueStore>> {
        match self.storage.backend {
            StorageBackend::Memory => {
                info!("Using in-memory cart storage");
                Ok(Arc::new(MemoryStore::new()))
            }
            StorageBackend::Sqlite => {
                let path = self.database_path().ok_or_else(|| {
                    CartError::InvalidConfig("No database path available".into())
                })?;

                if let Some(parent) = path.parent() {
                    if !parent.as_os_str().is_empty() {
                        std::fs::create_dir_all(parent)?;
                    }
                }

                let db_config =
                    DbConfig::new(path).max_connections(self.storage.max_connections);
                let db = Database::new(db_config).await?;
                Ok(Arc::new(db))
            }
        }
    }
}

/// Platform directories for GoMarket (`~/.config/gomarket`,
/// `~/.local/share/gomarket` on Linux).
fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("com", "GoMarket", "gomarket")
}
