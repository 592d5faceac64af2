// crates/rollcall-core/src/interfaces/mod.rs
// ============================================================================
// Module: Rollcall Interfaces
// Description: Backend-agnostic interface for catalog persistence.
// Purpose: Define the contract surface between the domain and its stores.
// Dependencies: crate::core, thiserror
// ============================================================================

//! ## Overview
//! The [`CatalogStore`] trait is the persistence collaborator consumed by the
//! HTTP and CLI surfaces. Implementations must make the admission sequence
//! (count, duplicate check, insert) atomic per course with respect to
//! concurrent callers, and must enforce uniqueness on `(student_id,
//! course_id)` and on people emails at the storage layer.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use thiserror::Error;

use crate::core::admission::EnrollError;
use crate::core::identifiers::CourseId;
use crate::core::identifiers::ResourceId;
use crate::core::identifiers::StudentId;
use crate::core::identifiers::TeacherId;
use crate::core::records::Course;
use crate::core::records::Enrollment;
use crate::core::records::NewCourse;
use crate::core::records::NewScrapedResource;
use crate::core::records::NewStudent;
use crate::core::records::NewTeacher;
use crate::core::records::ScrapedResource;
use crate::core::records::Student;
use crate::core::records::Teacher;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Catalog store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Store I/O error.
    #[error("store io error: {0}")]
    Io(String),
    /// Storage engine error.
    #[error("store error: {0}")]
    Store(String),
    /// A uniqueness constraint other than the enrollment pair was violated.
    #[error("store conflict: {0}")]
    Conflict(String),
    /// Invalid data passed to or read from the store.
    #[error("store invalid data: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Catalog Store
// ============================================================================

/// Backend-agnostic catalog persistence.
///
/// # Invariants
/// - [`CatalogStore::enroll`] serializes its checks and insert against
///   concurrent admissions for the same course.
/// - Deleting a student or course cascades to its enrollments; deleting a
///   teacher detaches owned courses instead of destroying them.
pub trait CatalogStore: Send + Sync {
    /// Inserts a student.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Conflict`] when the email is already registered.
    fn insert_student(&self, student: NewStudent) -> Result<Student, StoreError>;

    /// Looks up a student by id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the store cannot be read.
    fn find_student(&self, id: StudentId) -> Result<Option<Student>, StoreError>;

    /// Deletes a student and its enrollments. Returns `false` when absent.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the store cannot be written.
    fn delete_student(&self, id: StudentId) -> Result<bool, StoreError>;

    /// Inserts a teacher.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Conflict`] when the email is already registered.
    fn insert_teacher(&self, teacher: NewTeacher) -> Result<Teacher, StoreError>;

    /// Looks up a teacher by id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the store cannot be read.
    fn find_teacher(&self, id: TeacherId) -> Result<Option<Teacher>, StoreError>;

    /// Deletes a teacher, detaching owned courses. Returns `false` when
    /// absent.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the store cannot be written.
    fn delete_teacher(&self, id: TeacherId) -> Result<bool, StoreError>;

    /// Inserts a course.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Invalid`] when capacity is zero.
    fn insert_course(&self, course: NewCourse) -> Result<Course, StoreError>;

    /// Looks up a course by id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the store cannot be read.
    fn find_course(&self, id: CourseId) -> Result<Option<Course>, StoreError>;

    /// Deletes a course and its enrollments. Returns `false` when absent.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the store cannot be written.
    fn delete_course(&self, id: CourseId) -> Result<bool, StoreError>;

    /// Runs the admission check and inserts the enrollment atomically.
    ///
    /// # Errors
    ///
    /// Returns [`EnrollError::CourseNotFound`], [`EnrollError::CapacityExceeded`],
    /// or [`EnrollError::AlreadyEnrolled`] per the admission rule, and
    /// [`EnrollError::Store`] when the store itself fails.
    fn enroll(
        &self,
        student_id: StudentId,
        course_id: CourseId,
    ) -> Result<Enrollment, EnrollError>;

    /// Counts enrollments held by a course.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the store cannot be read.
    fn count_enrollments(&self, course_id: CourseId) -> Result<u64, StoreError>;

    /// Looks up the enrollment for a `(student, course)` pair.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the store cannot be read.
    fn find_enrollment(
        &self,
        student_id: StudentId,
        course_id: CourseId,
    ) -> Result<Option<Enrollment>, StoreError>;

    /// Imports scraped resources, skipping links already present. Returns
    /// the number of rows inserted.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the store cannot be written.
    fn import_resources(&self, items: Vec<NewScrapedResource>) -> Result<u64, StoreError>;

    /// Lists scraped resources ordered by id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the store cannot be read.
    fn list_resources(
        &self,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<ScrapedResource>, StoreError>;

    /// Deletes a scraped resource. Returns `false` when absent.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the store cannot be written.
    fn delete_resource(&self, id: ResourceId) -> Result<bool, StoreError>;
}

// ============================================================================
// SECTION: Shared Store
// ============================================================================

/// Shared, cloneable handle over a [`CatalogStore`] implementation.
#[derive(Clone)]
pub struct SharedCatalogStore {
    /// Inner store implementation.
    inner: Arc<dyn CatalogStore>,
}

impl SharedCatalogStore {
    /// Wraps a catalog store in a shared, clonable wrapper.
    #[must_use]
    pub fn from_store(store: impl CatalogStore + 'static) -> Self {
        Self {
            inner: Arc::new(store),
        }
    }

    /// Wraps an existing shared store.
    #[must_use]
    pub const fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self {
            inner: store,
        }
    }
}

impl CatalogStore for SharedCatalogStore {
    fn insert_student(&self, student: NewStudent) -> Result<Student, StoreError> {
        self.inner.insert_student(student)
    }

    fn find_student(&self, id: StudentId) -> Result<Option<Student>, StoreError> {
        self.inner.find_student(id)
    }

    fn delete_student(&self, id: StudentId) -> Result<bool, StoreError> {
        self.inner.delete_student(id)
    }

    fn insert_teacher(&self, teacher: NewTeacher) -> Result<Teacher, StoreError> {
        self.inner.insert_teacher(teacher)
    }

    fn find_teacher(&self, id: TeacherId) -> Result<Option<Teacher>, StoreError> {
        self.inner.find_teacher(id)
    }

    fn delete_teacher(&self, id: TeacherId) -> Result<bool, StoreError> {
        self.inner.delete_teacher(id)
    }

    fn insert_course(&self, course: NewCourse) -> Result<Course, StoreError> {
        self.inner.insert_course(course)
    }

    fn find_course(&self, id: CourseId) -> Result<Option<Course>, StoreError> {
        self.inner.find_course(id)
    }

    fn delete_course(&self, id: CourseId) -> Result<bool, StoreError> {
        self.inner.delete_course(id)
    }

    fn enroll(
        &self,
        student_id: StudentId,
        course_id: CourseId,
    ) -> Result<Enrollment, EnrollError> {
        self.inner.enroll(student_id, course_id)
    }

    fn count_enrollments(&self, course_id: CourseId) -> Result<u64, StoreError> {
        self.inner.count_enrollments(course_id)
    }

    fn find_enrollment(
        &self,
        student_id: StudentId,
        course_id: CourseId,
    ) -> Result<Option<Enrollment>, StoreError> {
        self.inner.find_enrollment(student_id, course_id)
    }

    fn import_resources(&self, items: Vec<NewScrapedResource>) -> Result<u64, StoreError> {
        self.inner.import_resources(items)
    }

    fn list_resources(
        &self,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<ScrapedResource>, StoreError> {
        self.inner.list_resources(offset, limit)
    }

    fn delete_resource(&self, id: ResourceId) -> Result<bool, StoreError> {
        self.inner.delete_resource(id)
    }
}
