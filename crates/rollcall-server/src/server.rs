// crates/rollcall-server/src/server.rs
// ============================================================================
// Module: Rollcall Server Runtime
// Description: Store construction and HTTP serving entry point.
// Purpose: Wire configuration, store, audit, and router into a running server.
// Dependencies: axum, rollcall-core, rollcall-store-sqlite, thiserror, tokio
// ============================================================================

//! ## Overview
//! [`RollcallServer`] owns the configured catalog store and serves the API
//! router over HTTP. Store selection is config-driven: the in-memory catalog
//! for tests and demos, SQLite for durable deployments.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use rollcall_core::InMemoryCatalog;
use rollcall_core::SharedCatalogStore;
use rollcall_store_sqlite::SqliteCatalog;
use rollcall_store_sqlite::SqliteStoreConfig;
use thiserror::Error;

use crate::api::AppState;
use crate::api::build_router;
use crate::audit::AuditSink;
use crate::audit::StderrAuditSink;
use crate::config::CatalogStoreType;
use crate::config::RollcallConfig;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Server startup and serving errors.
#[derive(Debug, Error)]
pub enum ServeError {
    /// Configuration is missing required settings.
    #[error("server config error: {0}")]
    Config(String),
    /// Store initialization failed.
    #[error("store init error: {0}")]
    Init(String),
    /// Transport failed to bind or serve.
    #[error("transport error: {0}")]
    Transport(String),
}

// ============================================================================
// SECTION: Store Construction
// ============================================================================

/// Builds the catalog store selected by configuration.
///
/// # Errors
///
/// Returns [`ServeError`] when the sqlite store lacks a path or fails to
/// initialize.
pub fn build_catalog_store(config: &RollcallConfig) -> Result<SharedCatalogStore, ServeError> {
    let store = match config.store.store_type {
        CatalogStoreType::Memory => SharedCatalogStore::from_store(InMemoryCatalog::new()),
        CatalogStoreType::Sqlite => {
            let path = config
                .store
                .path
                .clone()
                .ok_or_else(|| ServeError::Config("sqlite store requires path".to_string()))?;
            let sqlite_config = SqliteStoreConfig {
                path,
                busy_timeout_ms: config.store.busy_timeout_ms,
                journal_mode: config.store.journal_mode,
                sync_mode: config.store.sync_mode,
            };
            let store = SqliteCatalog::new(sqlite_config)
                .map_err(|err| ServeError::Init(err.to_string()))?;
            SharedCatalogStore::from_store(store)
        }
    };
    Ok(store)
}

// ============================================================================
// SECTION: Server
// ============================================================================

/// HTTP server for the Rollcall catalog.
pub struct RollcallServer {
    /// Validated server configuration.
    config: RollcallConfig,
    /// Catalog store backing the API.
    store: SharedCatalogStore,
    /// Audit sink for mutations and admission decisions.
    audit: Arc<dyn AuditSink>,
}

impl RollcallServer {
    /// Creates a server from validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ServeError`] when the configured store cannot be built.
    pub fn from_config(config: RollcallConfig) -> Result<Self, ServeError> {
        let store = build_catalog_store(&config)?;
        Ok(Self {
            config,
            store,
            audit: Arc::new(StderrAuditSink),
        })
    }

    /// Replaces the audit sink. Used by tests to silence stderr.
    #[must_use]
    pub fn with_audit(mut self, audit: Arc<dyn AuditSink>) -> Self {
        self.audit = audit;
        self
    }

    /// Serves the API until the listener fails.
    ///
    /// # Errors
    ///
    /// Returns [`ServeError`] when binding or serving fails.
    pub async fn serve(self) -> Result<(), ServeError> {
        let addr = self
            .config
            .server
            .parsed_bind()
            .map_err(|err| ServeError::Config(err.to_string()))?;
        let state = AppState {
            store: self.store,
            audit: self.audit,
            limits: self.config.catalog,
        };
        let app = build_router(state, self.config.server.max_body_bytes);
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|_| ServeError::Transport("http bind failed".to_string()))?;
        axum::serve(listener, app)
            .await
            .map_err(|_| ServeError::Transport("http server failed".to_string()))
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, reason = "Test-only assertions are permitted.")]

    use super::ServeError;
    use super::build_catalog_store;
    use crate::config::RollcallConfig;

    #[test]
    fn memory_store_builds_from_defaults() {
        let config: RollcallConfig = toml::from_str(
            r#"
            [store]
            type = "memory"
            "#,
        )
        .unwrap();
        assert!(build_catalog_store(&config).is_ok());
    }

    #[test]
    fn sqlite_store_without_path_is_a_config_error() {
        let config: RollcallConfig = toml::from_str(
            r#"
            [store]
            type = "sqlite"
            "#,
        )
        .unwrap();
        assert!(matches!(build_catalog_store(&config), Err(ServeError::Config(_))));
    }

    #[test]
    fn sqlite_store_builds_at_a_fresh_path() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("catalog.sqlite");
        let config: RollcallConfig = toml::from_str(&format!(
            r#"
            [store]
            type = "sqlite"
            path = "{}"
            "#,
            path.display()
        ))
        .unwrap();
        assert!(build_catalog_store(&config).is_ok());
    }
}
