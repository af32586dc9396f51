//! Telemetry Module for input-guard
//!
//! Emits structured audit events as single-line JSON through the `log`
//! facade so any installed logger (env_logger in the demo binary) can
//! collect them.

use log::{info, warn};
use serde::Serialize;

/// Audit event types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditEventType {
    /// Statement passed the gate and was handed to the engine
    QueryAllowed,
    /// Statement rejected as a tautology injection
    InjectionDetected,
    /// Engine failed to execute an allowed statement
    EngineError,
    /// A line did not fit the input buffer
    InputTruncated,
}

/// Audit event for logging
#[derive(Debug, Clone, Serialize)]
pub struct AuditEvent {
    /// Event type
    pub event_type: AuditEventType,
    /// Reason for action
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Left side of the matched comparison
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left_operand: Option<String>,
    /// Right side of the matched comparison
    #[serde(skip_serializing_if = "Option::is_none")]
    pub right_operand: Option<String>,
    /// Buffer capacity in bytes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<usize>,
    /// Bytes kept after truncation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kept_bytes: Option<usize>,
    /// Rows returned by the engine
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_count: Option<usize>,
}

impl AuditEvent {
    /// Create a new audit event
    pub fn new(event_type: AuditEventType) -> Self {
        Self {
            event_type,
            reason: None,
            left_operand: None,
            right_operand: None,
            capacity: None,
            kept_bytes: None,
            row_count: None,
        }
    }

    /// Set reason
    pub fn with_reason(mut self, reason: &str) -> Self {
        self.reason = Some(reason.to_string());
        self
    }

    /// Set both comparison operands
    pub fn with_operands(mut self, left: &str, right: &str) -> Self {
        self.left_operand = Some(left.to_string());
        self.right_operand = Some(right.to_string());
        self
    }

    /// Set row count
    pub fn with_row_count(mut self, rows: usize) -> Self {
        self.row_count = Some(rows);
        self
    }

    /// Log the event
    pub fn emit(&self) {
        match serde_json::to_string(self) {
            Ok(json) => match self.event_type {
                AuditEventType::InjectionDetected
                | AuditEventType::EngineError
                | AuditEventType::InputTruncated => {
                    warn!("[INPUT-GUARD-AUDIT] {}", json);
                }
                AuditEventType::QueryAllowed => {
                    info!("[INPUT-GUARD-AUDIT] {}", json);
                }
            },
            Err(e) => {
                warn!("Failed to serialize audit event: {}", e);
            }
        }
    }
}

/// Create an injection audit event; operand text is included only when asked
pub fn audit_injection(left: &str, right: &str, include_operands: bool) -> AuditEvent {
    let event = AuditEvent::new(AuditEventType::InjectionDetected)
        .with_reason("tautology in OR clause");

    if include_operands {
        event.with_operands(left, right)
    } else {
        event
    }
}

/// Create an allowed query audit event
pub fn audit_allowed(rows: usize) -> AuditEvent {
    AuditEvent::new(AuditEventType::QueryAllowed).with_row_count(rows)
}

/// Create an engine failure audit event
pub fn audit_engine_error(message: &str) -> AuditEvent {
    AuditEvent::new(AuditEventType::EngineError).with_reason(message)
}

/// Create an input truncation audit event
pub fn audit_truncated(capacity: usize, kept_bytes: usize) -> AuditEvent {
    let mut event = AuditEvent::new(AuditEventType::InputTruncated)
        .with_reason("line exceeded buffer capacity");
    event.capacity = Some(capacity);
    event.kept_bytes = Some(kept_bytes);
    event
}
