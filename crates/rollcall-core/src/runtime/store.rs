// crates/rollcall-core/src/runtime/store.rs
// ============================================================================
// Module: Rollcall In-Memory Catalog
// Description: Simple in-memory catalog store for tests and examples.
// Purpose: Provide a deterministic store implementation without external deps.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! This module provides a simple in-memory implementation of
//! [`CatalogStore`] for tests and local demos. It is not intended for
//! production use. A single mutex guards the whole catalog, so the admission
//! sequence is serialized by construction.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use crate::core::admission::EnrollError;
use crate::core::admission::evaluate_admission;
use crate::core::identifiers::CourseId;
use crate::core::identifiers::EnrollmentId;
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
use crate::interfaces::CatalogStore;
use crate::interfaces::StoreError;

// ============================================================================
// SECTION: State
// ============================================================================

/// Mutable catalog state guarded by the store mutex.
#[derive(Debug, Default)]
struct CatalogState {
    /// Students keyed by raw id.
    students: BTreeMap<i64, Student>,
    /// Teachers keyed by raw id.
    teachers: BTreeMap<i64, Teacher>,
    /// Courses keyed by raw id.
    courses: BTreeMap<i64, Course>,
    /// Enrollments keyed by raw id.
    enrollments: BTreeMap<i64, Enrollment>,
    /// Scraped resources keyed by raw id.
    resources: BTreeMap<i64, ScrapedResource>,
    /// Next row id per table, in declaration order.
    next_ids: [i64; 5],
}

/// Index of the student id counter in [`CatalogState::next_ids`].
const STUDENT_SEQ: usize = 0;
/// Index of the teacher id counter.
const TEACHER_SEQ: usize = 1;
/// Index of the course id counter.
const COURSE_SEQ: usize = 2;
/// Index of the enrollment id counter.
const ENROLLMENT_SEQ: usize = 3;
/// Index of the resource id counter.
const RESOURCE_SEQ: usize = 4;

impl CatalogState {
    /// Returns the next row id for the given sequence.
    fn next_id(&mut self, seq: usize) -> i64 {
        let slot = self.next_ids.get_mut(seq);
        match slot {
            Some(value) => {
                *value += 1;
                *value
            }
            None => 0,
        }
    }
}

// ============================================================================
// SECTION: In-Memory Catalog
// ============================================================================

/// In-memory catalog store for tests and examples.
#[derive(Debug, Default, Clone)]
pub struct InMemoryCatalog {
    /// Catalog state protected by a mutex.
    state: Arc<Mutex<CatalogState>>,
}

impl InMemoryCatalog {
    /// Creates a new empty in-memory catalog.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(CatalogState::default())),
        }
    }

    /// Locks the catalog state.
    fn lock(&self) -> Result<std::sync::MutexGuard<'_, CatalogState>, StoreError> {
        self.state
            .lock()
            .map_err(|_| StoreError::Store("catalog mutex poisoned".to_string()))
    }
}

impl CatalogStore for InMemoryCatalog {
    fn insert_student(&self, student: NewStudent) -> Result<Student, StoreError> {
        let mut state = self.lock()?;
        if state.students.values().any(|row| row.email == student.email) {
            return Err(StoreError::Conflict(format!(
                "student email already registered: {}",
                student.email
            )));
        }
        let id = state.next_id(STUDENT_SEQ);
        let row = Student {
            id: StudentId::new(id),
            name: student.name,
            email: student.email,
        };
        state.students.insert(id, row.clone());
        Ok(row)
    }

    fn find_student(&self, id: StudentId) -> Result<Option<Student>, StoreError> {
        Ok(self.lock()?.students.get(&id.as_i64()).cloned())
    }

    fn delete_student(&self, id: StudentId) -> Result<bool, StoreError> {
        let mut state = self.lock()?;
        if state.students.remove(&id.as_i64()).is_none() {
            return Ok(false);
        }
        state.enrollments.retain(|_, row| row.student_id != id);
        Ok(true)
    }

    fn insert_teacher(&self, teacher: NewTeacher) -> Result<Teacher, StoreError> {
        let mut state = self.lock()?;
        if state.teachers.values().any(|row| row.email == teacher.email) {
            return Err(StoreError::Conflict(format!(
                "teacher email already registered: {}",
                teacher.email
            )));
        }
        let id = state.next_id(TEACHER_SEQ);
        let row = Teacher {
            id: TeacherId::new(id),
            name: teacher.name,
            email: teacher.email,
        };
        state.teachers.insert(id, row.clone());
        Ok(row)
    }

    fn find_teacher(&self, id: TeacherId) -> Result<Option<Teacher>, StoreError> {
        Ok(self.lock()?.teachers.get(&id.as_i64()).cloned())
    }

    fn delete_teacher(&self, id: TeacherId) -> Result<bool, StoreError> {
        let mut state = self.lock()?;
        if state.teachers.remove(&id.as_i64()).is_none() {
            return Ok(false);
        }
        for course in state.courses.values_mut() {
            if course.teacher_id == Some(id) {
                course.teacher_id = None;
            }
        }
        Ok(true)
    }

    fn insert_course(&self, course: NewCourse) -> Result<Course, StoreError> {
        if course.capacity == 0 {
            return Err(StoreError::Invalid("course capacity must be positive".to_string()));
        }
        let mut state = self.lock()?;
        if let Some(teacher_id) = course.teacher_id
            && !state.teachers.contains_key(&teacher_id.as_i64())
        {
            return Err(StoreError::Invalid(format!("teacher {teacher_id} not found")));
        }
        let id = state.next_id(COURSE_SEQ);
        let row = Course {
            id: CourseId::new(id),
            title: course.title,
            capacity: course.capacity,
            teacher_id: course.teacher_id,
        };
        state.courses.insert(id, row.clone());
        Ok(row)
    }

    fn find_course(&self, id: CourseId) -> Result<Option<Course>, StoreError> {
        Ok(self.lock()?.courses.get(&id.as_i64()).cloned())
    }

    fn delete_course(&self, id: CourseId) -> Result<bool, StoreError> {
        let mut state = self.lock()?;
        if state.courses.remove(&id.as_i64()).is_none() {
            return Ok(false);
        }
        state.enrollments.retain(|_, row| row.course_id != id);
        Ok(true)
    }

    fn enroll(
        &self,
        student_id: StudentId,
        course_id: CourseId,
    ) -> Result<Enrollment, EnrollError> {
        // The single state mutex is the atomic unit here: checks and insert
        // run under one lock acquisition.
        let mut state = self.lock()?;
        let course = state.courses.get(&course_id.as_i64()).cloned();
        let enrolled_count = count_for_course(&state, course_id);
        let existing = state
            .enrollments
            .values()
            .find(|row| row.student_id == student_id && row.course_id == course_id)
            .cloned();
        evaluate_admission(
            student_id,
            course_id,
            course.as_ref(),
            enrolled_count,
            existing.as_ref(),
        )?;
        let id = state.next_id(ENROLLMENT_SEQ);
        let row = Enrollment {
            id: EnrollmentId::new(id),
            student_id,
            course_id,
            enrolled_at: unix_millis(),
        };
        state.enrollments.insert(id, row.clone());
        Ok(row)
    }

    fn count_enrollments(&self, course_id: CourseId) -> Result<u64, StoreError> {
        let state = self.lock()?;
        Ok(count_for_course(&state, course_id))
    }

    fn find_enrollment(
        &self,
        student_id: StudentId,
        course_id: CourseId,
    ) -> Result<Option<Enrollment>, StoreError> {
        let state = self.lock()?;
        Ok(state
            .enrollments
            .values()
            .find(|row| row.student_id == student_id && row.course_id == course_id)
            .cloned())
    }

    fn import_resources(&self, items: Vec<NewScrapedResource>) -> Result<u64, StoreError> {
        let mut state = self.lock()?;
        let mut inserted = 0u64;
        for item in items {
            if state.resources.values().any(|row| row.link == item.link) {
                continue;
            }
            let id = state.next_id(RESOURCE_SEQ);
            state.resources.insert(
                id,
                ScrapedResource {
                    id: ResourceId::new(id),
                    title: item.title,
                    link: item.link,
                    image_url: item.image_url,
                    price: item.price,
                    scraped_at: item.scraped_at,
                },
            );
            inserted += 1;
        }
        Ok(inserted)
    }

    fn list_resources(
        &self,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<ScrapedResource>, StoreError> {
        let state = self.lock()?;
        let offset = usize::try_from(offset).unwrap_or(usize::MAX);
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);
        Ok(state.resources.values().skip(offset).take(limit).cloned().collect())
    }

    fn delete_resource(&self, id: ResourceId) -> Result<bool, StoreError> {
        Ok(self.lock()?.resources.remove(&id.as_i64()).is_some())
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Counts enrollments held by a course.
fn count_for_course(state: &CatalogState, course_id: CourseId) -> u64 {
    let count = state.enrollments.values().filter(|row| row.course_id == course_id).count();
    u64::try_from(count).unwrap_or(u64::MAX)
}

/// Returns the current unix epoch in milliseconds.
fn unix_millis() -> i64 {
    let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default();
    i64::try_from(now.as_millis()).unwrap_or(i64::MAX)
}
