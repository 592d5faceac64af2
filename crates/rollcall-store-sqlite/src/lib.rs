// crates/rollcall-store-sqlite/src/lib.rs
// ============================================================================
// Module: SQLite Catalog Store
// Description: Durable CatalogStore backend using SQLite WAL.
// Purpose: Provide production-grade persistence for the Rollcall catalog.
// Dependencies: rollcall-core, rusqlite
// ============================================================================

//! ## Overview
//! This crate provides a SQLite-backed [`rollcall_core::CatalogStore`]
//! implementation. Admission commits run inside immediate transactions on a
//! single shared connection, so the capacity count, duplicate check, and
//! insert are serialized with respect to concurrent callers; a unique index
//! on `(student_id, course_id)` backstops the duplicate check at the storage
//! layer.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use store::SqliteCatalog;
pub use store::SqliteStoreConfig;
pub use store::SqliteStoreError;
pub use store::SqliteStoreMode;
pub use store::SqliteSyncMode;
