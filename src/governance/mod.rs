//! Governance module for input-guard
//!
//! This module provides:
//! - Tautology injection detection
//! - The query gate that enforces it before execution

pub mod query_gate;
pub mod tautology_guard;

pub use query_gate::{GateDecision, QueryError, QueryGate};
pub use tautology_guard::{TautologyFinding, TautologyGuard};
