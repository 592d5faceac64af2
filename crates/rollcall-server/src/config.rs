// crates/rollcall-server/src/config.rs
// ============================================================================
// Module: Rollcall Configuration
// Description: Configuration loading and validation for the Rollcall server.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: rollcall-store-sqlite, serde, thiserror, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path
//! limits. Missing or invalid configuration fails closed: the server refuses
//! to start rather than guessing at bind addresses or store locations.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::path::PathBuf;

use rollcall_store_sqlite::SqliteStoreMode;
use rollcall_store_sqlite::SqliteSyncMode;
use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "rollcall.toml";
/// Environment variable used to override the config path.
pub(crate) const CONFIG_ENV_VAR: &str = "ROLLCALL_CONFIG";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Default bind address for the HTTP server.
const DEFAULT_BIND: &str = "127.0.0.1:8080";
/// Default maximum request body size in bytes.
const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;
/// Maximum allowed request body size in bytes.
const MAX_MAX_BODY_BYTES: usize = 16 * 1024 * 1024;
/// Default maximum items accepted by one scraped import request.
const DEFAULT_MAX_IMPORT_ITEMS: usize = 1_000;
/// Maximum allowed items per scraped import request.
const MAX_MAX_IMPORT_ITEMS: usize = 100_000;
/// Default page size for resource listings.
const DEFAULT_PAGE_SIZE: u64 = 100;
/// Maximum allowed page size for resource listings.
const MAX_PAGE_SIZE: u64 = 10_000;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read.
    #[error("config io error: {0}")]
    Io(String),
    /// Config file could not be parsed.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Config contents failed validation.
    #[error("config invalid: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Config Model
// ============================================================================

/// Top-level Rollcall configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RollcallConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Catalog store settings.
    #[serde(default)]
    pub store: StoreConfig,
    /// Catalog request limits.
    #[serde(default)]
    pub catalog: CatalogLimits,
}

/// HTTP server settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Socket address to bind.
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Maximum request body size in bytes.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

/// Catalog store backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CatalogStoreType {
    /// In-memory store for tests and demos.
    Memory,
    /// Durable SQLite store.
    #[default]
    Sqlite,
}

/// Catalog store settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    /// Store backend type.
    #[serde(default, rename = "type")]
    pub store_type: CatalogStoreType,
    /// Path to the SQLite database file (required for the sqlite backend).
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// SQLite journal mode.
    #[serde(default)]
    pub journal_mode: SqliteStoreMode,
    /// SQLite sync mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
}

/// Request limits for catalog endpoints.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogLimits {
    /// Maximum items accepted by one scraped import request.
    #[serde(default = "default_max_import_items")]
    pub max_import_items: usize,
    /// Default and maximum page size for resource listings.
    #[serde(default = "default_page_size")]
    pub page_size: u64,
}

impl Default for CatalogLimits {
    fn default() -> Self {
        Self {
            max_import_items: default_max_import_items(),
            page_size: default_page_size(),
        }
    }
}

// ============================================================================
// SECTION: Defaults
// ============================================================================

/// Returns the default bind address.
fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}

/// Returns the default maximum request body size.
const fn default_max_body_bytes() -> usize {
    DEFAULT_MAX_BODY_BYTES
}

/// Returns the default store busy timeout.
const fn default_busy_timeout_ms() -> u64 {
    5_000
}

/// Returns the default maximum import batch size.
const fn default_max_import_items() -> usize {
    DEFAULT_MAX_IMPORT_ITEMS
}

/// Returns the default listing page size.
const fn default_page_size() -> u64 {
    DEFAULT_PAGE_SIZE
}

// ============================================================================
// SECTION: Loading
// ============================================================================

impl RollcallConfig {
    /// Loads configuration from the given path, the `ROLLCALL_CONFIG`
    /// environment variable, or the default filename, in that order.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file cannot be read, parsed, or
    /// validated.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path);
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.store.validate()?;
        self.catalog.validate()?;
        Ok(())
    }
}

impl ServerConfig {
    /// Validates server settings.
    fn validate(&self) -> Result<(), ConfigError> {
        self.parsed_bind()?;
        if self.max_body_bytes == 0 || self.max_body_bytes > MAX_MAX_BODY_BYTES {
            return Err(ConfigError::Invalid(format!(
                "max_body_bytes out of range: {} (max {MAX_MAX_BODY_BYTES})",
                self.max_body_bytes
            )));
        }
        Ok(())
    }

    /// Parses the configured bind address.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the address does not parse.
    pub fn parsed_bind(&self) -> Result<SocketAddr, ConfigError> {
        self.bind
            .parse()
            .map_err(|_| ConfigError::Invalid(format!("invalid bind address: {}", self.bind)))
    }
}

impl StoreConfig {
    /// Validates store settings.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.store_type == CatalogStoreType::Sqlite && self.path.is_none() {
            return Err(ConfigError::Invalid(
                "sqlite store requires a path".to_string(),
            ));
        }
        Ok(())
    }
}

impl CatalogLimits {
    /// Validates catalog limits.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_import_items == 0 || self.max_import_items > MAX_MAX_IMPORT_ITEMS {
            return Err(ConfigError::Invalid(format!(
                "max_import_items out of range: {} (max {MAX_MAX_IMPORT_ITEMS})",
                self.max_import_items
            )));
        }
        if self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            return Err(ConfigError::Invalid(format!(
                "page_size out of range: {} (max {MAX_PAGE_SIZE})",
                self.page_size
            )));
        }
        Ok(())
    }
}

/// Resolves the configuration path from argument, environment, or default.
fn resolve_path(path: Option<&Path>) -> PathBuf {
    if let Some(path) = path {
        return path.to_path_buf();
    }
    if let Ok(value) = env::var(CONFIG_ENV_VAR)
        && !value.is_empty()
    {
        return PathBuf::from(value);
    }
    PathBuf::from(DEFAULT_CONFIG_NAME)
}

// ============================================================================
// SECTION: Tests
// ============================================================================
