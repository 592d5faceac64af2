// crates/rollcall-core/src/lib.rs
// ============================================================================
// Module: Rollcall Core Library
// Description: Public API surface for the Rollcall core.
// Purpose: Expose domain types, store interfaces, and runtime helpers.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! Rollcall core provides the student-management domain model and the
//! enrollment admission rule. It is storage-agnostic: persistence backends
//! implement [`CatalogStore`] and reuse the same admission predicate so every
//! backend enforces identical capacity and uniqueness semantics.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use core::*;

pub use interfaces::CatalogStore;
pub use interfaces::SharedCatalogStore;
pub use interfaces::StoreError;
pub use runtime::InMemoryCatalog;
