// crates/rollcall-core/src/core/mod.rs
// ============================================================================
// Module: Rollcall Core Types
// Description: Canonical student-management domain structures.
// Purpose: Provide stable, serializable types for catalog records and rules.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Rollcall core types define the student, teacher, course, enrollment, and
//! scraped-resource records plus the admission rule applied before every
//! enrollment insert. These types are the canonical source of truth for any
//! derived API surface.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod admission;
pub mod identifiers;
pub mod records;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use admission::AdmissionDecision;
pub use admission::EnrollError;
pub use admission::evaluate_admission;
pub use identifiers::CourseId;
pub use identifiers::EnrollmentId;
pub use identifiers::ResourceId;
pub use identifiers::StudentId;
pub use identifiers::TeacherId;
pub use records::Course;
pub use records::DEFAULT_COURSE_CAPACITY;
pub use records::Enrollment;
pub use records::NewCourse;
pub use records::NewScrapedResource;
pub use records::NewStudent;
pub use records::NewTeacher;
pub use records::ScrapedResource;
pub use records::Student;
pub use records::Teacher;
