//! Query Gate
//!
//! CRITICAL: Every statement is inspected BEFORE it reaches the engine.
//! A detected tautology refuses execution outright; the engine is never
//! called for that statement.

use log::{debug, warn};
use thiserror::Error;

use super::tautology_guard::{TautologyFinding, TautologyGuard};
use crate::config::GuardConfig;
use crate::engine::{EngineError, Row, SqlEngine};
use crate::telemetry::{audit_allowed, audit_engine_error, audit_injection, AuditEvent};

/// Gate verdict for one statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Safe to hand to the engine
    Allow,
    /// Refused, with a human-readable reason
    Deny(String),
}

impl GateDecision {
    /// Check if this is a denying decision
    pub fn is_deny(&self) -> bool {
        matches!(self, GateDecision::Deny(_))
    }

    /// Get the deny reason if denied
    pub fn deny_reason(&self) -> Option<&str> {
        match self {
            GateDecision::Deny(reason) => Some(reason),
            GateDecision::Allow => None,
        }
    }
}

impl From<&TautologyFinding> for GateDecision {
    fn from(finding: &TautologyFinding) -> Self {
        match finding {
            TautologyFinding::Clean => GateDecision::Allow,
            detected @ TautologyFinding::Detected { .. } => {
                GateDecision::Deny(format!("SQL injection detected: {}", detected))
            }
        }
    }
}

/// Errors from a gated query
#[derive(Debug, Error)]
pub enum QueryError {
    /// Refused before execution
    #[error("SQL injection detected: tautology attack using 'OR {left_operand}={right_operand}'")]
    InjectionDetected {
        left_operand: String,
        right_operand: String,
    },
    /// Engine failure, passed through as-is
    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Execution entry point that inspects before delegating
pub struct QueryGate<E> {
    engine: E,
    guard: TautologyGuard,
    audit: bool,
    log_operands: bool,
}

impl<E: SqlEngine> QueryGate<E> {
    /// Create a gate with auditing disabled
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            guard: TautologyGuard::new(),
            audit: false,
            log_operands: false,
        }
    }

    /// Create a gate using the configured audit settings
    pub fn with_config(engine: E, config: &GuardConfig) -> Self {
        Self {
            engine,
            guard: TautologyGuard::new(),
            audit: config.audit_enabled,
            log_operands: config.log_operands,
        }
    }

    /// Decide without executing; a denial is audited like one from `run_query`
    pub fn check(&self, sql: &str) -> GateDecision {
        let finding = self.guard.inspect(sql);
        if let Some((left, right)) = finding.operands() {
            if let Some(event) = self.denial_event(left, right) {
                event.emit();
            }
        }
        GateDecision::from(&finding)
    }

    /// Audit event for a denied statement, if auditing is on
    fn denial_event(&self, left: &str, right: &str) -> Option<AuditEvent> {
        self.audit
            .then(|| audit_injection(left, right, self.log_operands))
    }

    /// Inspect `sql`, then execute it only if no tautology was found
    pub fn run_query(&mut self, sql: &str) -> Result<Vec<Row>, QueryError> {
        if let TautologyFinding::Detected {
            left_operand,
            right_operand,
        } = self.guard.inspect(sql)
        {
            warn!(
                "SQL Injection detected: Tautology attack using 'OR {}={}'",
                left_operand, right_operand
            );
            if let Some(event) = self.denial_event(&left_operand, &right_operand) {
                event.emit();
            }
            return Err(QueryError::InjectionDetected {
                left_operand,
                right_operand,
            });
        }

        debug!("Statement passed tautology check, executing");
        match self.engine.execute(sql) {
            Ok(rows) => {
                if self.audit {
                    audit_allowed(rows.len()).emit();
                }
                Ok(rows)
            }
            Err(err) => {
                warn!("Query failed in engine: {}", err);
                if self.audit {
                    audit_engine_error(&err.to_string()).emit();
                }
                Err(QueryError::Engine(err))
            }
        }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    /// Give back the underlying engine
    pub fn into_engine(self) -> E {
        self.engine
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::AuditEventType;

    /// Records every statement it is asked to run
    #[derive(Default)]
    struct RecordingEngine {
        executed: Vec<String>,
        fail_with: Option<EngineError>,
    }

    impl SqlEngine for RecordingEngine {
        fn execute(&mut self, sql: &str) -> Result<Vec<Row>, EngineError> {
            self.executed.push(sql.to_string());
            match &self.fail_with {
                Some(err) => Err(err.clone()),
                None => Ok(vec![Row::new(vec![(
                    "NAME".to_string(),
                    Some("Fred".to_string()),
                )])]),
            }
        }
    }

    #[test]
    fn test_clean_statement_reaches_engine() {
        let mut gate = QueryGate::new(RecordingEngine::default());

        let rows = gate.run_query("SELECT * FROM USERS WHERE NAME='Fred'").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(gate.engine().executed.len(), 1);
    }

    #[test]
    fn test_injection_never_reaches_engine() {
        let mut gate = QueryGate::new(RecordingEngine::default());

        let err = gate
            .run_query("SELECT * FROM USERS WHERE NAME='Fred' or 2=2;")
            .unwrap_err();
        match err {
            QueryError::InjectionDetected {
                left_operand,
                right_operand,
            } => {
                assert_eq!(left_operand, "2");
                assert_eq!(right_operand, "2");
            }
            other => panic!("Expected injection denial, got {:?}", other),
        }
        assert!(gate.engine().executed.is_empty());
    }

    #[test]
    fn test_engine_error_passthrough() {
        let engine = RecordingEngine {
            fail_with: Some(EngineError::Statement("syntax error".to_string())),
            ..Default::default()
        };
        let mut gate = QueryGate::with_config(engine, &GuardConfig::default());

        let err = gate.run_query("SELEC * FROM USERS").unwrap_err();
        assert!(matches!(
            err,
            QueryError::Engine(EngineError::Statement(ref msg)) if msg == "syntax error"
        ));
        assert_eq!(err.to_string(), "sql engine statement error: syntax error");
    }

    #[test]
    fn test_check_decision() {
        let gate = QueryGate::new(RecordingEngine::default());

        assert_eq!(gate.check("SELECT * FROM USERS"), GateDecision::Allow);

        let decision = gate.check("SELECT * FROM USERS WHERE NAME='Fred' or 'hack'='hack';");
        assert!(decision.is_deny());
        assert_eq!(
            decision.deny_reason(),
            Some("SQL injection detected: tautology attack using 'OR 'hack'='hack''")
        );
        assert!(gate.engine().executed.is_empty());
    }

    #[test]
    fn test_injection_error_message() {
        let err = QueryError::InjectionDetected {
            left_operand: "1".to_string(),
            right_operand: "1".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "SQL injection detected: tautology attack using 'OR 1=1'"
        );
    }

    #[test]
    fn test_denial_audit_follows_config() {
        let quiet = QueryGate::new(RecordingEngine::default());
        assert!(quiet.denial_event("1", "1").is_none());

        let audited = QueryGate::with_config(RecordingEngine::default(), &GuardConfig::default());
        let event = audited.denial_event("1", "1").unwrap();
        assert_eq!(event.event_type, AuditEventType::InjectionDetected);
        assert_eq!(event.left_operand.as_deref(), Some("1"));

        let redacted = GuardConfig {
            log_operands: false,
            ..Default::default()
        };
        let gate = QueryGate::with_config(RecordingEngine::default(), &redacted);
        let event = gate.denial_event("'pw'", "'pw'").unwrap();
        assert!(event.left_operand.is_none());

        // check() on an audited gate still only decides
        assert!(audited.check("SELECT * FROM T WHERE a=1 OR 3=3").is_deny());
        assert!(audited.engine().executed.is_empty());
    }

    #[test]
    fn test_engine_mut_reaches_inner_engine() {
        let mut gate = QueryGate::new(RecordingEngine::default());
        gate.engine_mut().fail_with = Some(EngineError::Statement("locked".to_string()));

        let err = gate.run_query("SELECT 1").unwrap_err();
        assert!(matches!(err, QueryError::Engine(_)));
        assert_eq!(gate.into_engine().executed, vec!["SELECT 1".to_string()]);
    }

    #[test]
    fn test_gate_over_borrowed_engine() {
        let mut engine = RecordingEngine::default();
        {
            let mut gate = QueryGate::new(&mut engine);
            gate.run_query("SELECT 1").unwrap();
        }
        assert_eq!(engine.executed, vec!["SELECT 1".to_string()]);
    }
}
