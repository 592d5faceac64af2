// crates/rollcall-store-sqlite/src/store.rs
// ============================================================================
// Module: SQLite Catalog Store
// Description: Durable CatalogStore backed by SQLite WAL.
// Purpose: Persist catalog rows and serialize enrollment admissions.
// Dependencies: rollcall-core, rusqlite, serde, thiserror
// ============================================================================

//! ## Overview
//! This module implements a durable [`CatalogStore`] using `SQLite`. All
//! access goes through one shared connection guarded by a mutex; admissions
//! additionally run inside `BEGIN IMMEDIATE` transactions so the capacity
//! count, duplicate check, and insert commit as one unit. The schema declares
//! `UNIQUE(student_id, course_id)` as the backstop the admission rule
//! requires: a unique-index rejection at insert time is translated into
//! [`EnrollError::AlreadyEnrolled`], never surfaced as a raw storage error.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use rollcall_core::Course;
use rollcall_core::CourseId;
use rollcall_core::EnrollError;
use rollcall_core::Enrollment;
use rollcall_core::EnrollmentId;
use rollcall_core::NewCourse;
use rollcall_core::NewScrapedResource;
use rollcall_core::NewStudent;
use rollcall_core::NewTeacher;
use rollcall_core::ResourceId;
use rollcall_core::ScrapedResource;
use rollcall_core::Student;
use rollcall_core::StudentId;
use rollcall_core::Teacher;
use rollcall_core::TeacherId;
use rollcall_core::evaluate_admission;
use rollcall_core::interfaces::CatalogStore;
use rollcall_core::interfaces::StoreError;
use rusqlite::Connection;
use rusqlite::OpenFlags;
use rusqlite::OptionalExtension;
use rusqlite::Transaction;
use rusqlite::TransactionBehavior;
use rusqlite::params;
use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// `SQLite` schema version for the store.
const SCHEMA_VERSION: i64 = 1;
/// Default busy timeout (ms).
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;

// ============================================================================
// SECTION: Config
// ============================================================================

/// `SQLite` journal mode configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteStoreMode {
    /// WAL journal mode (recommended).
    #[default]
    Wal,
    /// Delete journal mode (legacy).
    Delete,
}

impl SqliteStoreMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Wal => "wal",
            Self::Delete => "delete",
        }
    }
}

/// `SQLite` sync mode configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteSyncMode {
    /// Full synchronous mode (safest).
    #[default]
    Full,
    /// Normal synchronous mode (balanced).
    Normal,
}

impl SqliteSyncMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Normal => "normal",
        }
    }
}

/// Configuration for the `SQLite` catalog store.
#[derive(Debug, Clone, Deserialize)]
pub struct SqliteStoreConfig {
    /// Path to the `SQLite` database file.
    pub path: PathBuf,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteStoreMode,
    /// `SQLite` sync mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
}

/// Returns the default busy timeout for `SQLite` connections.
const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// `SQLite` store errors.
#[derive(Debug, Error)]
pub enum SqliteStoreError {
    /// Store I/O error.
    #[error("sqlite store io error: {0}")]
    Io(String),
    /// `SQLite` engine error.
    #[error("sqlite store db error: {0}")]
    Db(String),
    /// Uniqueness constraint violation outside the enrollment pair.
    #[error("sqlite store conflict: {0}")]
    Conflict(String),
    /// Store schema version mismatch.
    #[error("sqlite store version mismatch: {0}")]
    VersionMismatch(String),
    /// Invalid store data.
    #[error("sqlite store invalid data: {0}")]
    Invalid(String),
}

impl From<SqliteStoreError> for StoreError {
    fn from(error: SqliteStoreError) -> Self {
        match error {
            SqliteStoreError::Io(message) => Self::Io(message),
            SqliteStoreError::Db(message) | SqliteStoreError::VersionMismatch(message) => {
                Self::Store(message)
            }
            SqliteStoreError::Conflict(message) => Self::Conflict(message),
            SqliteStoreError::Invalid(message) => Self::Invalid(message),
        }
    }
}

// ============================================================================
// SECTION: Store
// ============================================================================

/// `SQLite`-backed catalog store with WAL support.
#[derive(Clone)]
pub struct SqliteCatalog {
    /// Shared `SQLite` connection guarded by a mutex.
    connection: Arc<Mutex<Connection>>,
}

impl SqliteCatalog {
    /// Opens an `SQLite`-backed catalog store.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the database cannot be opened or
    /// initialized.
    pub fn new(config: SqliteStoreConfig) -> Result<Self, SqliteStoreError> {
        validate_store_path(&config.path)?;
        ensure_parent_dir(&config.path)?;
        let mut connection = open_connection(&config)?;
        initialize_schema(&mut connection)?;
        Ok(Self {
            connection: Arc::new(Mutex::new(connection)),
        })
    }

    /// Locks the shared connection.
    fn lock(&self) -> Result<MutexGuard<'_, Connection>, SqliteStoreError> {
        self.connection
            .lock()
            .map_err(|_| SqliteStoreError::Db("connection mutex poisoned".to_string()))
    }
}

impl CatalogStore for SqliteCatalog {
    fn insert_student(&self, student: NewStudent) -> Result<Student, StoreError> {
        let guard = self.lock()?;
        guard
            .execute(
                "INSERT INTO students (name, email) VALUES (?1, ?2)",
                params![student.name, student.email],
            )
            .map_err(|err| map_insert_error(&err, "student email already registered"))?;
        let id = guard.last_insert_rowid();
        Ok(Student {
            id: StudentId::new(id),
            name: student.name,
            email: student.email,
        })
    }

    fn find_student(&self, id: StudentId) -> Result<Option<Student>, StoreError> {
        let guard = self.lock()?;
        guard
            .query_row(
                "SELECT id, name, email FROM students WHERE id = ?1",
                params![id.as_i64()],
                |row| {
                    Ok(Student {
                        id: StudentId::new(row.get(0)?),
                        name: row.get(1)?,
                        email: row.get(2)?,
                    })
                },
            )
            .optional()
            .map_err(db_error)
    }

    fn delete_student(&self, id: StudentId) -> Result<bool, StoreError> {
        let guard = self.lock()?;
        let affected = guard
            .execute("DELETE FROM students WHERE id = ?1", params![id.as_i64()])
            .map_err(db_error)?;
        Ok(affected > 0)
    }

    fn insert_teacher(&self, teacher: NewTeacher) -> Result<Teacher, StoreError> {
        let guard = self.lock()?;
        guard
            .execute(
                "INSERT INTO teachers (name, email) VALUES (?1, ?2)",
                params![teacher.name, teacher.email],
            )
            .map_err(|err| map_insert_error(&err, "teacher email already registered"))?;
        let id = guard.last_insert_rowid();
        Ok(Teacher {
            id: TeacherId::new(id),
            name: teacher.name,
            email: teacher.email,
        })
    }

    fn find_teacher(&self, id: TeacherId) -> Result<Option<Teacher>, StoreError> {
        let guard = self.lock()?;
        guard
            .query_row(
                "SELECT id, name, email FROM teachers WHERE id = ?1",
                params![id.as_i64()],
                |row| {
                    Ok(Teacher {
                        id: TeacherId::new(row.get(0)?),
                        name: row.get(1)?,
                        email: row.get(2)?,
                    })
                },
            )
            .optional()
            .map_err(db_error)
    }

    fn delete_teacher(&self, id: TeacherId) -> Result<bool, StoreError> {
        let guard = self.lock()?;
        let affected = guard
            .execute("DELETE FROM teachers WHERE id = ?1", params![id.as_i64()])
            .map_err(db_error)?;
        Ok(affected > 0)
    }

    fn insert_course(&self, course: NewCourse) -> Result<Course, StoreError> {
        if course.capacity == 0 {
            return Err(StoreError::Invalid("course capacity must be positive".to_string()));
        }
        let guard = self.lock()?;
        guard
            .execute(
                "INSERT INTO courses (title, capacity, teacher_id) VALUES (?1, ?2, ?3)",
                params![
                    course.title,
                    i64::from(course.capacity),
                    course.teacher_id.map(TeacherId::as_i64)
                ],
            )
            .map_err(|err| map_insert_error(&err, "course references a missing teacher"))?;
        let id = guard.last_insert_rowid();
        Ok(Course {
            id: CourseId::new(id),
            title: course.title,
            capacity: course.capacity,
            teacher_id: course.teacher_id,
        })
    }

    fn find_course(&self, id: CourseId) -> Result<Option<Course>, StoreError> {
        let guard = self.lock()?;
        query_course(&guard, id).map_err(StoreError::from)
    }

    fn delete_course(&self, id: CourseId) -> Result<bool, StoreError> {
        let guard = self.lock()?;
        let affected = guard
            .execute("DELETE FROM courses WHERE id = ?1", params![id.as_i64()])
            .map_err(db_error)?;
        Ok(affected > 0)
    }

    fn enroll(
        &self,
        student_id: StudentId,
        course_id: CourseId,
    ) -> Result<Enrollment, EnrollError> {
        let mut guard = self.lock().map_err(StoreError::from)?;
        // An immediate transaction takes the write lock up front, so the
        // count, duplicate check, and insert are serialized against other
        // admissions for the same store.
        let tx = guard
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(|err| StoreError::Store(err.to_string()))?;
        let enrollment = admit_in_tx(&tx, student_id, course_id)?;
        tx.commit().map_err(|err| StoreError::Store(err.to_string()))?;
        Ok(enrollment)
    }

    fn count_enrollments(&self, course_id: CourseId) -> Result<u64, StoreError> {
        let guard = self.lock()?;
        let count: i64 = guard
            .query_row(
                "SELECT COUNT(*) FROM enrollments WHERE course_id = ?1",
                params![course_id.as_i64()],
                |row| row.get(0),
            )
            .map_err(db_error)?;
        u64::try_from(count)
            .map_err(|_| StoreError::Invalid("negative enrollment count".to_string()))
    }

    fn find_enrollment(
        &self,
        student_id: StudentId,
        course_id: CourseId,
    ) -> Result<Option<Enrollment>, StoreError> {
        let guard = self.lock()?;
        query_enrollment(&guard, student_id, course_id).map_err(StoreError::from)
    }

    fn import_resources(&self, items: Vec<NewScrapedResource>) -> Result<u64, StoreError> {
        let mut guard = self.lock()?;
        let tx = guard.transaction().map_err(|err| StoreError::Store(err.to_string()))?;
        let mut inserted = 0u64;
        for item in items {
            // INSERT OR IGNORE leans on the unique link index for dedup.
            let affected = tx
                .execute(
                    "INSERT OR IGNORE INTO scraped_resources (title, link, image_url, price, \
                     scraped_at) VALUES (?1, ?2, ?3, ?4, ?5)",
                    params![item.title, item.link, item.image_url, item.price, item.scraped_at],
                )
                .map_err(db_error)?;
            inserted += u64::try_from(affected).unwrap_or(0);
        }
        tx.commit().map_err(|err| StoreError::Store(err.to_string()))?;
        Ok(inserted)
    }

    fn list_resources(
        &self,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<ScrapedResource>, StoreError> {
        let guard = self.lock()?;
        let mut statement = guard
            .prepare(
                "SELECT id, title, link, image_url, price, scraped_at FROM scraped_resources \
                 ORDER BY id LIMIT ?1 OFFSET ?2",
            )
            .map_err(db_error)?;
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let offset = i64::try_from(offset).unwrap_or(i64::MAX);
        let rows = statement
            .query_map(params![limit, offset], |row| {
                Ok(ScrapedResource {
                    id: ResourceId::new(row.get(0)?),
                    title: row.get(1)?,
                    link: row.get(2)?,
                    image_url: row.get(3)?,
                    price: row.get(4)?,
                    scraped_at: row.get(5)?,
                })
            })
            .map_err(db_error)?;
        let mut resources = Vec::new();
        for row in rows {
            resources.push(row.map_err(db_error)?);
        }
        Ok(resources)
    }

    fn delete_resource(&self, id: ResourceId) -> Result<bool, StoreError> {
        let guard = self.lock()?;
        let affected = guard
            .execute("DELETE FROM scraped_resources WHERE id = ?1", params![id.as_i64()])
            .map_err(db_error)?;
        Ok(affected > 0)
    }
}

// ============================================================================
// SECTION: Admission
// ============================================================================

/// Runs the admission check and insert inside an open transaction.
fn admit_in_tx(
    tx: &Transaction<'_>,
    student_id: StudentId,
    course_id: CourseId,
) -> Result<Enrollment, EnrollError> {
    let course = query_course(tx, course_id).map_err(StoreError::from)?;
    let count: i64 = tx
        .query_row(
            "SELECT COUNT(*) FROM enrollments WHERE course_id = ?1",
            params![course_id.as_i64()],
            |row| row.get(0),
        )
        .map_err(|err| StoreError::Store(err.to_string()))?;
    let enrolled_count = u64::try_from(count)
        .map_err(|_| StoreError::Invalid("negative enrollment count".to_string()))?;
    let existing =
        query_enrollment(tx, student_id, course_id).map_err(StoreError::from)?;
    evaluate_admission(
        student_id,
        course_id,
        course.as_ref(),
        enrolled_count,
        existing.as_ref(),
    )?;
    let enrolled_at = unix_millis();
    let insert = tx.execute(
        "INSERT INTO enrollments (student_id, course_id, enrolled_at) VALUES (?1, ?2, ?3)",
        params![student_id.as_i64(), course_id.as_i64(), enrolled_at],
    );
    if let Err(err) = insert {
        // A lost race on the unique pair index is a hard duplicate, not a
        // storage fault.
        if is_unique_violation(&err) {
            return Err(EnrollError::AlreadyEnrolled {
                student_id,
                course_id,
            });
        }
        return Err(StoreError::Store(err.to_string()).into());
    }
    Ok(Enrollment {
        id: EnrollmentId::new(tx.last_insert_rowid()),
        student_id,
        course_id,
        enrolled_at,
    })
}

// ============================================================================
// SECTION: Queries
// ============================================================================

/// Looks up a course over any connection-like handle.
fn query_course(
    conn: &Connection,
    id: CourseId,
) -> Result<Option<Course>, SqliteStoreError> {
    conn.query_row(
        "SELECT id, title, capacity, teacher_id FROM courses WHERE id = ?1",
        params![id.as_i64()],
        |row| {
            let capacity: i64 = row.get(2)?;
            let teacher_id: Option<i64> = row.get(3)?;
            Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?, capacity, teacher_id))
        },
    )
    .optional()
    .map_err(|err| SqliteStoreError::Db(err.to_string()))?
    .map(|(id, title, capacity, teacher_id)| {
        let capacity = u32::try_from(capacity)
            .map_err(|_| SqliteStoreError::Invalid("course capacity out of range".to_string()))?;
        Ok(Course {
            id: CourseId::new(id),
            title,
            capacity,
            teacher_id: teacher_id.map(TeacherId::new),
        })
    })
    .transpose()
}

/// Looks up an enrollment for a `(student, course)` pair.
fn query_enrollment(
    conn: &Connection,
    student_id: StudentId,
    course_id: CourseId,
) -> Result<Option<Enrollment>, SqliteStoreError> {
    conn.query_row(
        "SELECT id, student_id, course_id, enrolled_at FROM enrollments WHERE student_id = ?1 \
         AND course_id = ?2",
        params![student_id.as_i64(), course_id.as_i64()],
        |row| {
            Ok(Enrollment {
                id: EnrollmentId::new(row.get(0)?),
                student_id: StudentId::new(row.get(1)?),
                course_id: CourseId::new(row.get(2)?),
                enrolled_at: row.get(3)?,
            })
        },
    )
    .optional()
    .map_err(|err| SqliteStoreError::Db(err.to_string()))
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Maps a rusqlite error to a generic store error.
fn db_error(err: rusqlite::Error) -> StoreError {
    StoreError::Store(err.to_string())
}

/// Maps an insert failure, translating constraint violations to conflicts.
fn map_insert_error(err: &rusqlite::Error, conflict_message: &str) -> StoreError {
    if is_constraint_violation(err) {
        return StoreError::Conflict(conflict_message.to_string());
    }
    StoreError::Store(err.to_string())
}

/// Returns true when the error is a unique-index violation.
fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(code, _)
            if code.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

/// Returns true when the error is any constraint violation.
fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(code, _)
            if code.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

/// Ensures the parent directory for the store exists.
fn ensure_parent_dir(path: &Path) -> Result<(), SqliteStoreError> {
    let Some(parent) = path.parent() else {
        return Err(SqliteStoreError::Io("store path missing parent directory".to_string()));
    };
    std::fs::create_dir_all(parent).map_err(|err| SqliteStoreError::Io(err.to_string()))
}

/// Validates store paths for safety limits.
fn validate_store_path(path: &Path) -> Result<(), SqliteStoreError> {
    let path_string = path.display().to_string();
    if path_string.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(SqliteStoreError::Invalid("store path exceeds length limit".to_string()));
    }
    for component in path.components() {
        let name = component.as_os_str().to_string_lossy();
        if name.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(SqliteStoreError::Invalid(
                "store path contains an overlong component".to_string(),
            ));
        }
    }
    if path.exists() && path.is_dir() {
        return Err(SqliteStoreError::Invalid(
            "store path must be a file, not a directory".to_string(),
        ));
    }
    Ok(())
}

/// Opens an `SQLite` connection with secure defaults.
fn open_connection(config: &SqliteStoreConfig) -> Result<Connection, SqliteStoreError> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_CREATE
        | OpenFlags::SQLITE_OPEN_FULL_MUTEX;
    let connection = Connection::open_with_flags(&config.path, flags)
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    apply_pragmas(&connection, config)?;
    Ok(connection)
}

/// Applies `SQLite` pragmas required for durability and integrity.
fn apply_pragmas(
    connection: &Connection,
    config: &SqliteStoreConfig,
) -> Result<(), SqliteStoreError> {
    connection
        .execute_batch("PRAGMA foreign_keys = ON;")
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    connection
        .execute_batch(&format!("PRAGMA journal_mode = {};", config.journal_mode.pragma_value()))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    connection
        .execute_batch(&format!("PRAGMA synchronous = {};", config.sync_mode.pragma_value()))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    connection
        .busy_timeout(std::time::Duration::from_millis(config.busy_timeout_ms))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    Ok(())
}

/// Initializes the `SQLite` schema or validates the existing version.
fn initialize_schema(connection: &mut Connection) -> Result<(), SqliteStoreError> {
    let tx = connection.transaction().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    tx.execute_batch("CREATE TABLE IF NOT EXISTS store_meta (version INTEGER NOT NULL);")
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    let version: Option<i64> = tx
        .query_row("SELECT version FROM store_meta LIMIT 1", params![], |row| row.get(0))
        .optional()
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    match version {
        None => {
            tx.execute("INSERT INTO store_meta (version) VALUES (?1)", params![SCHEMA_VERSION])
                .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            tx.execute_batch(
                "CREATE TABLE IF NOT EXISTS students (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    name TEXT NOT NULL,
                    email TEXT NOT NULL UNIQUE
                );
                CREATE TABLE IF NOT EXISTS teachers (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    name TEXT NOT NULL,
                    email TEXT NOT NULL UNIQUE
                );
                CREATE TABLE IF NOT EXISTS courses (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    title TEXT NOT NULL,
                    capacity INTEGER NOT NULL CHECK (capacity > 0),
                    teacher_id INTEGER REFERENCES teachers(id) ON DELETE SET NULL
                );
                CREATE TABLE IF NOT EXISTS enrollments (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    student_id INTEGER NOT NULL REFERENCES students(id) ON DELETE CASCADE,
                    course_id INTEGER NOT NULL REFERENCES courses(id) ON DELETE CASCADE,
                    enrolled_at INTEGER NOT NULL,
                    UNIQUE (student_id, course_id)
                );
                CREATE INDEX IF NOT EXISTS idx_enrollments_course_id
                    ON enrollments (course_id);
                CREATE TABLE IF NOT EXISTS scraped_resources (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    title TEXT NOT NULL,
                    link TEXT NOT NULL UNIQUE,
                    image_url TEXT NOT NULL,
                    price TEXT NOT NULL,
                    scraped_at TEXT NOT NULL
                );",
            )
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        }
        Some(value) if value == SCHEMA_VERSION => {}
        Some(value) => {
            return Err(SqliteStoreError::VersionMismatch(format!(
                "unsupported schema version: {value}"
            )));
        }
    }
    tx.commit().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    Ok(())
}

/// Returns the current unix epoch in milliseconds.
fn unix_millis() -> i64 {
    let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default();
    i64::try_from(now.as_millis()).unwrap_or(i64::MAX)
}
