// crates/rollcall-core/src/runtime/mod.rs
// ============================================================================
// Module: Rollcall Runtime
// Description: Runtime helpers shipped with the core crate.
// Purpose: Provide the in-memory catalog store for tests and demos.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! Runtime helpers that need no external services. The in-memory catalog is
//! the reference [`crate::CatalogStore`] implementation used by tests and
//! local demos.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use store::InMemoryCatalog;
