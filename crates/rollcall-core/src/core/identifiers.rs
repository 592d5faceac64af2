// crates/rollcall-core/src/core/identifiers.rs
// ============================================================================
// Module: Rollcall Identifiers
// Description: Canonical opaque identifiers for catalog records.
// Purpose: Provide strongly typed, serializable IDs with stable integer forms.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! This module defines the canonical integer-based identifiers used
//! throughout Rollcall. Identifiers are opaque row identities assigned by the
//! backing store and serialize as plain integers. Validation of referential
//! integrity happens at store boundaries rather than within these wrappers.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Identifier Types
// ============================================================================

/// Declares an opaque integer identifier newtype.
macro_rules! integer_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Creates a new identifier from a raw row id.
            #[must_use]
            pub const fn new(id: i64) -> Self {
                Self(id)
            }

            /// Returns the identifier as a raw integer.
            #[must_use]
            pub const fn as_i64(self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self::new(value)
            }
        }
    };
}

integer_id!(
    /// Student identifier.
    StudentId
);

integer_id!(
    /// Teacher identifier.
    TeacherId
);

integer_id!(
    /// Course identifier.
    CourseId
);

integer_id!(
    /// Enrollment identifier.
    EnrollmentId
);

integer_id!(
    /// Scraped resource identifier.
    ResourceId
);

// ============================================================================
// SECTION: Tests
// ============================================================================
