// crates/rollcall-server/src/audit.rs
// ============================================================================
// Module: Rollcall Audit
// Description: Audit sink for catalog mutations and admission decisions.
// Purpose: Emit structured JSON audit lines without hard logging deps.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Every mutating request and every enrollment admission decision produces
//! an [`AuditEvent`]. The default sink writes one JSON line per event to
//! stderr; tests plug in [`NoopAuditSink`]. The interface is deliberately
//! dependency-light so deployments can forward events into their own
//! logging pipeline without redesign.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Serialize;

// ============================================================================
// SECTION: Audit Events
// ============================================================================

/// Catalog audit event payload.
#[derive(Debug, Serialize)]
pub struct AuditEvent {
    /// Event identifier, always `catalog`.
    event: &'static str,
    /// Action label, e.g. `enroll` or `delete_course`.
    action: &'static str,
    /// Outcome label, `ok` or a stable rejection kind.
    outcome: &'static str,
    /// Primary entity id touched by the action.
    #[serde(skip_serializing_if = "Option::is_none")]
    entity_id: Option<i64>,
    /// Student id for admission events.
    #[serde(skip_serializing_if = "Option::is_none")]
    student_id: Option<i64>,
    /// Course id for admission events.
    #[serde(skip_serializing_if = "Option::is_none")]
    course_id: Option<i64>,
    /// Free-form detail for failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
}

impl AuditEvent {
    /// Creates a new audit event for an action and outcome.
    #[must_use]
    pub const fn new(action: &'static str, outcome: &'static str) -> Self {
        Self {
            event: "catalog",
            action,
            outcome,
            entity_id: None,
            student_id: None,
            course_id: None,
            detail: None,
        }
    }

    /// Attaches the primary entity id.
    #[must_use]
    pub const fn with_entity(mut self, id: i64) -> Self {
        self.entity_id = Some(id);
        self
    }

    /// Attaches the admission pair.
    #[must_use]
    pub const fn with_pair(mut self, student_id: i64, course_id: i64) -> Self {
        self.student_id = Some(student_id);
        self.course_id = Some(course_id);
        self
    }

    /// Attaches failure detail.
    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

// ============================================================================
// SECTION: Sinks
// ============================================================================

/// Audit sink for catalog events.
pub trait AuditSink: Send + Sync {
    /// Record a catalog audit event.
    fn record(&self, event: &AuditEvent);
}

/// Audit sink that logs JSON lines to stderr.
pub struct StderrAuditSink;

impl AuditSink for StderrAuditSink {
    #[allow(clippy::print_stderr, reason = "The stderr sink exists to write stderr lines.")]
    fn record(&self, event: &AuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            eprintln!("{payload}");
        }
    }
}

/// No-op audit sink for tests.
pub struct NoopAuditSink;

impl AuditSink for NoopAuditSink {
    fn record(&self, _event: &AuditEvent) {}
}

// ============================================================================
// SECTION: Tests
// ============================================================================
