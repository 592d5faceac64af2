// crates/rollcall-core/src/core/records.rs
// ============================================================================
// Module: Rollcall Catalog Records
// Description: Persistent record types and insert payloads.
// Purpose: Provide the canonical serialized shape of every catalog row.
// Dependencies: crate::core::identifiers, serde
// ============================================================================

//! ## Overview
//! Records mirror the rows held by a [`crate::interfaces::CatalogStore`].
//! Each record carries its store-assigned identifier; the `New*` payloads are
//! the caller-supplied halves used for inserts. Enrollments are deliberately
//! absent an insert payload: they are only created through the admission
//! check.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::CourseId;
use crate::core::identifiers::EnrollmentId;
use crate::core::identifiers::ResourceId;
use crate::core::identifiers::StudentId;
use crate::core::identifiers::TeacherId;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default course capacity applied when a course is created without one.
pub const DEFAULT_COURSE_CAPACITY: u32 = 30;

/// Returns the default course capacity for serde defaults.
const fn default_capacity() -> u32 {
    DEFAULT_COURSE_CAPACITY
}

// ============================================================================
// SECTION: People
// ============================================================================

/// A registered student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    /// Store-assigned identifier.
    pub id: StudentId,
    /// Display name.
    pub name: String,
    /// Contact email, unique across students.
    pub email: String,
}

/// Insert payload for a student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewStudent {
    /// Display name.
    pub name: String,
    /// Contact email, unique across students.
    pub email: String,
}

/// A registered teacher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Teacher {
    /// Store-assigned identifier.
    pub id: TeacherId,
    /// Display name.
    pub name: String,
    /// Contact email, unique across teachers.
    pub email: String,
}

/// Insert payload for a teacher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTeacher {
    /// Display name.
    pub name: String,
    /// Contact email, unique across teachers.
    pub email: String,
}

// ============================================================================
// SECTION: Courses
// ============================================================================

/// A course offering with a bounded enrollment capacity.
///
/// # Invariants
/// - `count(enrollments for course) <= capacity` holds after every
///   successful admission commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    /// Store-assigned identifier.
    pub id: CourseId,
    /// Course title.
    pub title: String,
    /// Maximum simultaneous enrollments, always positive.
    pub capacity: u32,
    /// Optional owning teacher.
    pub teacher_id: Option<TeacherId>,
}

/// Insert payload for a course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCourse {
    /// Course title.
    pub title: String,
    /// Maximum simultaneous enrollments; defaults to
    /// [`DEFAULT_COURSE_CAPACITY`].
    #[serde(default = "default_capacity")]
    pub capacity: u32,
    /// Optional owning teacher.
    #[serde(default)]
    pub teacher_id: Option<TeacherId>,
}

// ============================================================================
// SECTION: Enrollments
// ============================================================================

/// A student's enrollment in a course.
///
/// # Invariants
/// - `(student_id, course_id)` is unique across all enrollments.
/// - Created only via the admission check; removed only by cascading
///   deletion of the owning student or course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enrollment {
    /// Store-assigned identifier.
    pub id: EnrollmentId,
    /// Enrolled student.
    pub student_id: StudentId,
    /// Enrolled course.
    pub course_id: CourseId,
    /// Creation time in unix milliseconds, assigned by the store.
    pub enrolled_at: i64,
}

// ============================================================================
// SECTION: Scraped Resources
// ============================================================================

/// An imported catalog resource originating from an external producer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapedResource {
    /// Store-assigned identifier.
    pub id: ResourceId,
    /// Resource title.
    pub title: String,
    /// Canonical resource link, unique across resources.
    pub link: String,
    /// Preview image link.
    pub image_url: String,
    /// Display price carried verbatim from the producer.
    pub price: String,
    /// Producer-supplied scrape time, treated as an opaque string.
    pub scraped_at: String,
}

/// Import payload for a scraped resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewScrapedResource {
    /// Resource title.
    pub title: String,
    /// Canonical resource link, unique across resources.
    pub link: String,
    /// Preview image link.
    #[serde(default)]
    pub image_url: String,
    /// Display price carried verbatim from the producer.
    #[serde(default)]
    pub price: String,
    /// Producer-supplied scrape time, treated as an opaque string.
    #[serde(default)]
    pub scraped_at: String,
}

// ============================================================================
// SECTION: Tests
// ============================================================================
