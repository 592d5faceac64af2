// crates/rollcall-core/tests/memory_store.rs
// ============================================================================
// Module: In-Memory Catalog Tests
// Description: Validate CatalogStore behavior of the in-memory catalog.
// Purpose: Ensure the reference store enforces admission and cascade rules.
// Dependencies: rollcall-core
// ============================================================================

//! ## Overview
//! Conformance tests for the in-memory catalog store. Exercises the
//! admission invariants, cascade semantics, and import dedup behavior that
//! every [`CatalogStore`] implementation must share.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::thread;

use rollcall_core::CatalogStore;
use rollcall_core::EnrollError;
use rollcall_core::InMemoryCatalog;
use rollcall_core::NewCourse;
use rollcall_core::NewScrapedResource;
use rollcall_core::NewStudent;
use rollcall_core::NewTeacher;
use rollcall_core::StoreError;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn student(store: &InMemoryCatalog, name: &str) -> rollcall_core::Student {
    store
        .insert_student(NewStudent {
            name: name.to_string(),
            email: format!("{name}@example.com"),
        })
        .expect("insert student")
}

fn course(store: &InMemoryCatalog, title: &str, capacity: u32) -> rollcall_core::Course {
    store
        .insert_course(NewCourse {
            title: title.to_string(),
            capacity,
            teacher_id: None,
        })
        .expect("insert course")
}

fn resource(link: &str) -> NewScrapedResource {
    NewScrapedResource {
        title: format!("resource {link}"),
        link: link.to_string(),
        image_url: String::new(),
        price: "10.00".to_string(),
        scraped_at: "2026-08-01 00:00:00".to_string(),
    }
}

// ============================================================================
// SECTION: Admission Tests
// ============================================================================

#[test]
fn enroll_assigns_identity_and_timestamp() {
    let store = InMemoryCatalog::new();
    let s1 = student(&store, "s1");
    let c1 = course(&store, "Algebra", 30);
    let enrollment = store.enroll(s1.id, c1.id).expect("enroll");
    assert_eq!(enrollment.student_id, s1.id);
    assert_eq!(enrollment.course_id, c1.id);
    assert!(enrollment.enrolled_at > 0);
    assert_eq!(store.count_enrollments(c1.id).unwrap(), 1);
}

#[test]
fn enroll_into_missing_course_fails_with_not_found() {
    let store = InMemoryCatalog::new();
    let s1 = student(&store, "s1");
    let missing = rollcall_core::CourseId::new(999_999);
    let result = store.enroll(s1.id, missing);
    assert!(matches!(result, Err(EnrollError::CourseNotFound(id)) if id == missing));
    assert_eq!(store.count_enrollments(missing).unwrap(), 0);
}

#[test]
fn second_enrollment_of_same_pair_fails_with_already_enrolled() {
    let store = InMemoryCatalog::new();
    let s1 = student(&store, "s1");
    let c1 = course(&store, "Algebra", 30);
    store.enroll(s1.id, c1.id).expect("first enroll");
    let result = store.enroll(s1.id, c1.id);
    assert!(matches!(result, Err(EnrollError::AlreadyEnrolled { .. })));
    assert_eq!(store.count_enrollments(c1.id).unwrap(), 1);
}

#[test]
fn capacity_one_admits_exactly_one_of_two_students() {
    let store = InMemoryCatalog::new();
    let s1 = student(&store, "s1");
    let s2 = student(&store, "s2");
    let c1 = course(&store, "Seminar", 1);
    let first = store.enroll(s1.id, c1.id);
    let second = store.enroll(s2.id, c1.id);
    assert!(first.is_ok());
    assert!(matches!(second, Err(EnrollError::CapacityExceeded { capacity: 1, .. })));
    assert_eq!(store.count_enrollments(c1.id).unwrap(), 1);
}

#[test]
fn duplicate_on_full_course_reports_capacity_first() {
    let store = InMemoryCatalog::new();
    let s1 = student(&store, "s1");
    let c1 = course(&store, "Seminar", 1);
    store.enroll(s1.id, c1.id).expect("enroll");
    assert!(matches!(
        store.enroll(s1.id, c1.id),
        Err(EnrollError::CapacityExceeded { .. })
    ));
}

#[test]
fn rejections_are_idempotent_until_state_changes() {
    let store = InMemoryCatalog::new();
    let s1 = student(&store, "s1");
    let s2 = student(&store, "s2");
    let c1 = course(&store, "Seminar", 1);
    let c2 = course(&store, "Lecture", 2);
    store.enroll(s1.id, c1.id).expect("first enroll");
    store.enroll(s1.id, c2.id).expect("second enroll");
    for _ in 0..3 {
        assert!(matches!(
            store.enroll(s2.id, c1.id),
            Err(EnrollError::CapacityExceeded { .. })
        ));
        // The capacity check runs first, so the duplicate kind only shows on
        // a course with a free seat.
        assert!(matches!(
            store.enroll(s1.id, c2.id),
            Err(EnrollError::AlreadyEnrolled { .. })
        ));
    }
    // Removing the existing enrollment (via cascade) frees the seat.
    assert!(store.delete_student(s1.id).unwrap());
    assert!(store.enroll(s2.id, c1.id).is_ok());
}

#[test]
fn concurrent_admissions_never_exceed_capacity() {
    let store = InMemoryCatalog::new();
    let c1 = course(&store, "Popular", 4);
    let students: Vec<_> = (0..16).map(|i| student(&store, &format!("s{i}"))).collect();
    let handles: Vec<_> = students
        .into_iter()
        .map(|s| {
            let store = store.clone();
            let course_id = c1.id;
            thread::spawn(move || store.enroll(s.id, course_id).is_ok())
        })
        .collect();
    let admitted =
        handles.into_iter().map(|h| h.join().unwrap_or(false)).filter(|&ok| ok).count();
    assert_eq!(admitted, 4);
    assert_eq!(store.count_enrollments(c1.id).unwrap(), 4);
}

#[test]
fn concurrent_duplicate_admissions_insert_once() {
    let store = InMemoryCatalog::new();
    let s1 = student(&store, "s1");
    let c1 = course(&store, "Algebra", 30);
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let store = store.clone();
            let (student_id, course_id) = (s1.id, c1.id);
            thread::spawn(move || store.enroll(student_id, course_id).is_ok())
        })
        .collect();
    let admitted =
        handles.into_iter().map(|h| h.join().unwrap_or(false)).filter(|&ok| ok).count();
    assert_eq!(admitted, 1);
    assert_eq!(store.count_enrollments(c1.id).unwrap(), 1);
}

// ============================================================================
// SECTION: Catalog Tests
// ============================================================================

#[test]
fn duplicate_student_email_conflicts() {
    let store = InMemoryCatalog::new();
    student(&store, "s1");
    let result = store.insert_student(NewStudent {
        name: "other".to_string(),
        email: "s1@example.com".to_string(),
    });
    assert!(matches!(result, Err(StoreError::Conflict(_))));
}

#[test]
fn zero_capacity_course_is_invalid() {
    let store = InMemoryCatalog::new();
    let result = store.insert_course(NewCourse {
        title: "Empty".to_string(),
        capacity: 0,
        teacher_id: None,
    });
    assert!(matches!(result, Err(StoreError::Invalid(_))));
}

#[test]
fn deleting_course_cascades_enrollments() {
    let store = InMemoryCatalog::new();
    let s1 = student(&store, "s1");
    let c1 = course(&store, "Algebra", 30);
    store.enroll(s1.id, c1.id).expect("enroll");
    assert!(store.delete_course(c1.id).unwrap());
    assert_eq!(store.count_enrollments(c1.id).unwrap(), 0);
    assert!(store.find_enrollment(s1.id, c1.id).unwrap().is_none());
}

#[test]
fn deleting_teacher_detaches_courses() {
    let store = InMemoryCatalog::new();
    let teacher = store
        .insert_teacher(NewTeacher {
            name: "t1".to_string(),
            email: "t1@example.com".to_string(),
        })
        .expect("insert teacher");
    let c1 = store
        .insert_course(NewCourse {
            title: "Algebra".to_string(),
            capacity: 30,
            teacher_id: Some(teacher.id),
        })
        .expect("insert course");
    assert!(store.delete_teacher(teacher.id).unwrap());
    let course = store.find_course(c1.id).unwrap().expect("course survives");
    assert_eq!(course.teacher_id, None);
}

#[test]
fn import_dedupes_by_link_across_batches() {
    let store = InMemoryCatalog::new();
    let batch = vec![resource("http://x/1"), resource("http://x/2")];
    assert_eq!(store.import_resources(batch.clone()).unwrap(), 2);
    assert_eq!(store.import_resources(batch).unwrap(), 0);
    let listed = store.list_resources(0, 100).unwrap();
    assert_eq!(listed.len(), 2);
}

#[test]
fn list_resources_honors_offset_and_limit() {
    let store = InMemoryCatalog::new();
    let batch: Vec<_> = (0..5).map(|i| resource(&format!("http://x/{i}"))).collect();
    assert_eq!(store.import_resources(batch).unwrap(), 5);
    let page = store.list_resources(2, 2).unwrap();
    assert_eq!(page.len(), 2);
    assert_eq!(page.first().map(|row| row.link.clone()), Some("http://x/2".to_string()));
}

#[test]
fn delete_resource_reports_absence() {
    let store = InMemoryCatalog::new();
    assert_eq!(store.import_resources(vec![resource("http://x/1")]).unwrap(), 1);
    let listed = store.list_resources(0, 10).unwrap();
    let id = listed.first().map(|row| row.id).expect("row id");
    assert!(store.delete_resource(id).unwrap());
    assert!(!store.delete_resource(id).unwrap());
}
