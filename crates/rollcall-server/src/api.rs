// crates/rollcall-server/src/api.rs
// ============================================================================
// Module: Rollcall HTTP API
// Description: Route table and request handlers for the catalog service.
// Purpose: Map catalog operations onto HTTP with stable error bodies.
// Dependencies: axum, rollcall-core, serde, serde_json
// ============================================================================

//! ## Overview
//! The API exposes students, teachers, courses, enrollment admission, and
//! the scraped-resource catalog. Handlers delegate all state changes to the
//! [`CatalogStore`] behind [`AppState`], so capacity and duplicate rules are
//! enforced inside the store's atomic admission path rather than here.
//!
//! Error bodies are stable: every rejection serializes as
//! `{"error": <kind>, "detail": <message>}` where `<kind>` is a fixed label
//! clients can match on.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::extract::Path;
use axum::extract::Query;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::routing::delete;
use axum::routing::get;
use axum::routing::post;
use rollcall_core::CatalogStore;
use rollcall_core::CourseId;
use rollcall_core::EnrollError;
use rollcall_core::EnrollmentId;
use rollcall_core::NewCourse;
use rollcall_core::NewScrapedResource;
use rollcall_core::NewStudent;
use rollcall_core::NewTeacher;
use rollcall_core::ResourceId;
use rollcall_core::SharedCatalogStore;
use rollcall_core::StoreError;
use rollcall_core::StudentId;
use rollcall_core::TeacherId;
use serde::Deserialize;
use serde::Serialize;

use crate::audit::AuditEvent;
use crate::audit::AuditSink;
use crate::config::CatalogLimits;

// ============================================================================
// SECTION: Application State
// ============================================================================

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    /// Catalog store backing all operations.
    pub store: SharedCatalogStore,
    /// Audit sink for mutations and admission decisions.
    pub audit: Arc<dyn AuditSink>,
    /// Request limits for imports and listings.
    pub limits: CatalogLimits,
}

/// Builds the API router over the given state.
#[must_use]
pub fn build_router(state: AppState, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/students", post(create_student))
        .route("/students/{id}", get(get_student))
        .route("/students/{id}", delete(delete_student))
        .route("/students/{id}/enroll", post(enroll_student))
        .route("/teachers", post(create_teacher))
        .route("/teachers/{id}", get(get_teacher))
        .route("/teachers/{id}", delete(delete_teacher))
        .route("/courses", post(create_course))
        .route("/courses/{id}", get(get_course))
        .route("/courses/{id}", delete(delete_course))
        .route("/import/scraped", post(import_scraped))
        .route("/scraped_resources", get(list_resources))
        .route("/scraped_resources/{id}", delete(delete_resource))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .with_state(state)
}

// ============================================================================
// SECTION: Error Mapping
// ============================================================================

/// API rejection with a stable kind label.
#[derive(Debug)]
pub struct ApiError {
    /// HTTP status for the rejection.
    status: StatusCode,
    /// Stable error kind label.
    kind: &'static str,
    /// Human-readable detail.
    detail: String,
}

impl ApiError {
    /// Creates a rejection from parts.
    fn new(status: StatusCode, kind: &'static str, detail: impl Into<String>) -> Self {
        Self {
            status,
            kind,
            detail: detail.into(),
        }
    }

    /// Stable kind label for audit lines.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        self.kind
    }

    /// HTTP status for the rejection.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }
}

/// Serialized rejection body.
#[derive(Debug, Serialize)]
struct ErrorBody {
    /// Stable error kind label.
    error: &'static str,
    /// Human-readable detail.
    detail: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.kind,
            detail: self.detail,
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(detail) => Self::new(StatusCode::CONFLICT, "conflict", detail),
            StoreError::Invalid(detail) => Self::new(StatusCode::BAD_REQUEST, "invalid", detail),
            StoreError::Io(detail) | StoreError::Store(detail) => {
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "store_error", detail)
            }
        }
    }
}

impl From<EnrollError> for ApiError {
    fn from(err: EnrollError) -> Self {
        let kind = err.kind();
        match err {
            EnrollError::CourseNotFound(_) => {
                Self::new(StatusCode::NOT_FOUND, kind, err.to_string())
            }
            EnrollError::CapacityExceeded { .. } | EnrollError::AlreadyEnrolled { .. } => {
                Self::new(StatusCode::CONFLICT, kind, err.to_string())
            }
            EnrollError::Store(inner) => inner.into(),
        }
    }
}

/// Builds a not-found rejection for an entity kind.
fn not_found(kind: &'static str, id: i64) -> ApiError {
    ApiError::new(StatusCode::NOT_FOUND, kind, format!("id {id} not found"))
}

// ============================================================================
// SECTION: Wire Payloads
// ============================================================================

/// Enrollment request body.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct EnrollRequest {
    /// Course to enroll in.
    course_id: CourseId,
}

/// Enrollment success body.
#[derive(Debug, Serialize)]
struct EnrollResponse {
    /// Identifier of the created enrollment.
    enrollment_id: EnrollmentId,
}

/// Deletion result body.
#[derive(Debug, Serialize)]
struct DeletedResponse {
    /// Always true; absence reports as 404 instead.
    deleted: bool,
}

/// Import result body.
#[derive(Debug, Serialize)]
struct ImportResponse {
    /// Number of new resources inserted.
    imported: u64,
}

/// Query parameters for resource listings.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ListQuery {
    /// Number of resources to skip.
    #[serde(default)]
    offset: u64,
    /// Maximum resources to return; clamped to the configured page size.
    #[serde(default)]
    limit: Option<u64>,
}

// ============================================================================
// SECTION: Student Handlers
// ============================================================================

/// Creates a student.
async fn create_student(
    State(state): State<AppState>,
    Json(payload): Json<NewStudent>,
) -> Result<impl IntoResponse, ApiError> {
    let student = audited(&state, "create_student", || {
        state.store.insert_student(payload).map_err(ApiError::from)
    })?;
    Ok((StatusCode::CREATED, Json(student)))
}

/// Fetches a student by id.
async fn get_student(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let student = state
        .store
        .find_student(StudentId::new(id))
        .map_err(ApiError::from)?
        .ok_or_else(|| not_found("student_not_found", id))?;
    Ok(Json(student))
}

/// Deletes a student and cascades their enrollments.
async fn delete_student(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    audited(&state, "delete_student", || {
        let deleted = state.store.delete_student(StudentId::new(id)).map_err(ApiError::from)?;
        if deleted {
            Ok(())
        } else {
            Err(not_found("student_not_found", id))
        }
    })?;
    Ok(Json(DeletedResponse { deleted: true }))
}

/// Enrolls a student in a course through the atomic admission path.
async fn enroll_student(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<EnrollRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let student_id = StudentId::new(id);
    let course_id = payload.course_id;
    let outcome = admit(&state, student_id, course_id);
    let event = match &outcome {
        Ok(enrollment) => AuditEvent::new("enroll", "ok").with_entity(enrollment.id.as_i64()),
        Err(err) => AuditEvent::new("enroll", err.kind()).with_detail(err.detail.clone()),
    };
    state.audit.record(&event.with_pair(student_id.as_i64(), course_id.as_i64()));
    let enrollment = outcome?;
    Ok((StatusCode::CREATED, Json(EnrollResponse { enrollment_id: enrollment.id })))
}

/// Runs the admission check after confirming the student exists.
fn admit(
    state: &AppState,
    student_id: StudentId,
    course_id: CourseId,
) -> Result<rollcall_core::Enrollment, ApiError> {
    let student = state.store.find_student(student_id).map_err(ApiError::from)?;
    if student.is_none() {
        return Err(not_found("student_not_found", student_id.as_i64()));
    }
    state.store.enroll(student_id, course_id).map_err(ApiError::from)
}

// ============================================================================
// SECTION: Teacher Handlers
// ============================================================================

/// Creates a teacher.
async fn create_teacher(
    State(state): State<AppState>,
    Json(payload): Json<NewTeacher>,
) -> Result<impl IntoResponse, ApiError> {
    let teacher = audited(&state, "create_teacher", || {
        state.store.insert_teacher(payload).map_err(ApiError::from)
    })?;
    Ok((StatusCode::CREATED, Json(teacher)))
}

/// Fetches a teacher by id.
async fn get_teacher(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let teacher = state
        .store
        .find_teacher(TeacherId::new(id))
        .map_err(ApiError::from)?
        .ok_or_else(|| not_found("teacher_not_found", id))?;
    Ok(Json(teacher))
}

/// Deletes a teacher and detaches their courses.
async fn delete_teacher(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    audited(&state, "delete_teacher", || {
        let deleted = state.store.delete_teacher(TeacherId::new(id)).map_err(ApiError::from)?;
        if deleted {
            Ok(())
        } else {
            Err(not_found("teacher_not_found", id))
        }
    })?;
    Ok(Json(DeletedResponse { deleted: true }))
}

// ============================================================================
// SECTION: Course Handlers
// ============================================================================

/// Creates a course.
async fn create_course(
    State(state): State<AppState>,
    Json(payload): Json<NewCourse>,
) -> Result<impl IntoResponse, ApiError> {
    let course = audited(&state, "create_course", || {
        state.store.insert_course(payload).map_err(ApiError::from)
    })?;
    Ok((StatusCode::CREATED, Json(course)))
}

/// Fetches a course by id.
async fn get_course(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let course = state
        .store
        .find_course(CourseId::new(id))
        .map_err(ApiError::from)?
        .ok_or_else(|| not_found("course_not_found", id))?;
    Ok(Json(course))
}

/// Deletes a course and cascades its enrollments.
async fn delete_course(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    audited(&state, "delete_course", || {
        let deleted = state.store.delete_course(CourseId::new(id)).map_err(ApiError::from)?;
        if deleted {
            Ok(())
        } else {
            Err(not_found("course_not_found", id))
        }
    })?;
    Ok(Json(DeletedResponse { deleted: true }))
}

// ============================================================================
// SECTION: Scraped Resource Handlers
// ============================================================================

/// Imports a batch of scraped resources, skipping duplicate links.
async fn import_scraped(
    State(state): State<AppState>,
    Json(payload): Json<Vec<NewScrapedResource>>,
) -> Result<impl IntoResponse, ApiError> {
    if payload.len() > state.limits.max_import_items {
        return Err(ApiError::new(
            StatusCode::BAD_REQUEST,
            "invalid",
            format!(
                "import batch of {} exceeds limit {}",
                payload.len(),
                state.limits.max_import_items
            ),
        ));
    }
    let imported = audited(&state, "import_scraped", || {
        state.store.import_resources(payload).map_err(ApiError::from)
    })?;
    Ok(Json(ImportResponse { imported }))
}

/// Lists scraped resources in insertion order.
async fn list_resources(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let limit = query.limit.unwrap_or(state.limits.page_size).min(state.limits.page_size);
    let resources =
        state.store.list_resources(query.offset, limit).map_err(ApiError::from)?;
    Ok(Json(resources))
}

/// Deletes a scraped resource by id.
async fn delete_resource(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    audited(&state, "delete_resource", || {
        let deleted = state.store.delete_resource(ResourceId::new(id)).map_err(ApiError::from)?;
        if deleted {
            Ok(())
        } else {
            Err(not_found("resource_not_found", id))
        }
    })?;
    Ok(Json(DeletedResponse { deleted: true }))
}

// ============================================================================
// SECTION: Audit Helper
// ============================================================================

/// Runs a mutation and records its outcome on the audit sink.
fn audited<T>(
    state: &AppState,
    action: &'static str,
    operation: impl FnOnce() -> Result<T, ApiError>,
) -> Result<T, ApiError> {
    let result = operation();
    let event = match &result {
        Ok(_) => AuditEvent::new(action, "ok"),
        Err(err) => AuditEvent::new(action, err.kind()).with_detail(err.detail.clone()),
    };
    state.audit.record(&event);
    result
}

// ============================================================================
// SECTION: Tests
// ============================================================================
