// crates/rollcall-core/src/core/admission.rs
// ============================================================================
// Module: Rollcall Admission Rule
// Description: The enrollment admission predicate and its failure kinds.
// Purpose: Enforce capacity and duplicate checks identically in every store.
// Dependencies: crate::core, crate::interfaces, thiserror
// ============================================================================

//! ## Overview
//! The admission rule decides whether a student may enroll in a course given
//! the course row, the current enrollment count, and any existing enrollment
//! for the same pair. The predicate is pure; each [`crate::CatalogStore`]
//! implementation calls it inside its own atomic unit so the count-then-act
//! sequence is serialized with respect to concurrent admissions. A store-level
//! uniqueness constraint on `(student_id, course_id)` remains the backstop:
//! a lost race surfaces as [`EnrollError::AlreadyEnrolled`], never as a
//! silent capacity overrun or a raw storage error.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::core::identifiers::CourseId;
use crate::core::identifiers::StudentId;
use crate::core::records::Course;
use crate::core::records::Enrollment;
use crate::interfaces::StoreError;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Enrollment admission failures.
///
/// The first three kinds are recoverable rejections scoped to a single
/// admission attempt; none is transient, so callers must not retry without
/// new information.
#[derive(Debug, Error)]
pub enum EnrollError {
    /// The referenced course does not exist.
    #[error("course {0} not found")]
    CourseNotFound(CourseId),
    /// The course is at or above its enrollment limit.
    #[error("course {course_id} is full (capacity {capacity})")]
    CapacityExceeded {
        /// Rejected course.
        course_id: CourseId,
        /// Capacity in force at rejection time.
        capacity: u32,
    },
    /// The student already holds an enrollment for this course.
    #[error("student {student_id} already enrolled in course {course_id}")]
    AlreadyEnrolled {
        /// Rejected student.
        student_id: StudentId,
        /// Rejected course.
        course_id: CourseId,
    },
    /// The underlying store failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl EnrollError {
    /// Returns a stable label for the failure kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::CourseNotFound(_) => "course_not_found",
            Self::CapacityExceeded { .. } => "capacity_exceeded",
            Self::AlreadyEnrolled { .. } => "already_enrolled",
            Self::Store(_) => "store_error",
        }
    }
}

// ============================================================================
// SECTION: Admission Predicate
// ============================================================================

/// Outcome of a passing admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdmissionDecision {
    /// Seats remaining once the pending enrollment commits.
    pub seats_remaining: u32,
}

/// Evaluates the admission rule for one `(student, course)` attempt.
///
/// Checks run in a fixed order: course existence, capacity, duplicate. The
/// caller must hold whatever atomic unit its store provides across this call
/// and the subsequent insert.
///
/// # Errors
///
/// Returns [`EnrollError::CourseNotFound`] when `course` is `None`,
/// [`EnrollError::CapacityExceeded`] when `enrolled_count` has reached the
/// course capacity, and [`EnrollError::AlreadyEnrolled`] when `existing`
/// holds a prior enrollment for the pair.
pub fn evaluate_admission(
    student_id: StudentId,
    course_id: CourseId,
    course: Option<&Course>,
    enrolled_count: u64,
    existing: Option<&Enrollment>,
) -> Result<AdmissionDecision, EnrollError> {
    let Some(course) = course else {
        return Err(EnrollError::CourseNotFound(course_id));
    };
    if enrolled_count >= u64::from(course.capacity) {
        return Err(EnrollError::CapacityExceeded {
            course_id,
            capacity: course.capacity,
        });
    }
    if existing.is_some() {
        return Err(EnrollError::AlreadyEnrolled {
            student_id,
            course_id,
        });
    }
    // enrolled_count < capacity <= u32::MAX, so the subtraction stays in range.
    let occupied = u32::try_from(enrolled_count).unwrap_or(course.capacity);
    Ok(AdmissionDecision {
        seats_remaining: course.capacity.saturating_sub(occupied.saturating_add(1)),
    })
}

// ============================================================================
// SECTION: Tests
// ============================================================================
