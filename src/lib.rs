//! input-guard
//!
//! Two small defensive components:
//! - [`input::BoundedLineReader`] reads one line into a fixed-capacity
//!   buffer, truncating and draining anything that does not fit.
//! - [`governance::TautologyGuard`] spots `WHERE ... OR x = x` style
//!   injections, and [`governance::QueryGate`] refuses to run them.
//!
//! The SQL engine sits behind the [`engine::SqlEngine`] trait; an
//! in-memory SQLite implementation is bundled.

pub mod config;
pub mod engine;
pub mod governance;
pub mod input;
pub mod telemetry;

pub use config::{ConfigError, GuardConfig};
pub use engine::{EngineError, Row, SqlEngine, SqliteEngine};
pub use governance::{GateDecision, QueryError, QueryGate, TautologyFinding, TautologyGuard};
pub use input::{read_line, BoundedLineReader, InputBuffer, ReadError};
