// crates/rollcall-server/src/lib.rs
// ============================================================================
// Module: Rollcall Server Library
// Description: HTTP API surface for the Rollcall catalog.
// Purpose: Expose configuration, routing, and serving entry points.
// Dependencies: crate::{api, audit, config, server}
// ============================================================================

//! ## Overview
//! The Rollcall server exposes the student-management catalog over HTTP with
//! axum. Configuration is loaded fail-closed from TOML; every mutating
//! request and every admission decision is audited as a JSON line on stderr.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod api;
pub mod audit;
pub mod config;
pub mod server;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use api::AppState;
pub use api::build_router;
pub use audit::AuditSink;
pub use audit::NoopAuditSink;
pub use audit::StderrAuditSink;
pub use config::CatalogStoreType;
pub use config::ConfigError;
pub use config::RollcallConfig;
pub use server::RollcallServer;
pub use server::ServeError;
pub use server::build_catalog_store;
