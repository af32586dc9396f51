//! SQL engine boundary
//!
//! The query gate only needs one capability from a database: run a
//! statement and hand back rows or an error. `SqlEngine` is that seam;
//! `SqliteEngine` is the bundled implementation.

pub mod sqlite;

use serde::Serialize;
use thiserror::Error;

pub use sqlite::{bootstrap_users, SqliteEngine};

/// One result row as ordered `(column, value)` pairs; `None` is SQL NULL
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Row {
    columns: Vec<(String, Option<String>)>,
}

impl Row {
    pub fn new(columns: Vec<(String, Option<String>)>) -> Self {
        Self { columns }
    }

    /// Value of the first column named `name` (ASCII case-insensitive)
    pub fn get(&self, name: &str) -> Option<&str> {
        self.columns
            .iter()
            .find(|(column, _)| column.eq_ignore_ascii_case(name))
            .and_then(|(_, value)| value.as_deref())
    }

    pub fn columns(&self) -> &[(String, Option<String>)] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Engine failures, passed through the gate untouched
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// Database could not be opened
    #[error("sql engine open error: {0}")]
    Open(String),
    /// Statement failed to prepare or run
    #[error("sql engine statement error: {0}")]
    Statement(String),
}

/// Anything that can execute one SQL statement
pub trait SqlEngine {
    fn execute(&mut self, sql: &str) -> Result<Vec<Row>, EngineError>;
}

impl<E: SqlEngine + ?Sized> SqlEngine for &mut E {
    fn execute(&mut self, sql: &str) -> Result<Vec<Row>, EngineError> {
        (**self).execute(sql)
    }
}
