//! SQLite-backed engine.
//!
//! Runs statements against a private in-memory database through
//! `rusqlite`. Every value is surfaced as text so callers never depend on
//! SQLite's dynamic typing.

use log::info;
use rusqlite::types::ValueRef;
use rusqlite::Connection;

use super::{EngineError, Row, SqlEngine};

/// Demo schema and seed data: four users, IDs 1 to 4
const USERS_BOOTSTRAP: &str = "CREATE TABLE USERS(
    ID INT PRIMARY KEY     NOT NULL,
    NAME           TEXT    NOT NULL,
    PASSWORD       TEXT    NOT NULL);
INSERT INTO USERS (ID, NAME, PASSWORD) VALUES (1, 'Fred', 'Flinstone');
INSERT INTO USERS (ID, NAME, PASSWORD) VALUES (2, 'Barney', 'Rubble');
INSERT INTO USERS (ID, NAME, PASSWORD) VALUES (3, 'Wilma', 'Flinstone');
INSERT INTO USERS (ID, NAME, PASSWORD) VALUES (4, 'Betty', 'Rubble');";

/// In-process SQLite engine
pub struct SqliteEngine {
    conn: Connection,
}

impl SqliteEngine {
    /// Open a fresh in-memory database
    pub fn open_in_memory() -> Result<Self, EngineError> {
        let conn = Connection::open_in_memory().map_err(|err| EngineError::Open(err.to_string()))?;
        Ok(Self { conn })
    }

    /// Run a multi-statement script that returns no rows
    pub fn execute_batch(&self, sql: &str) -> Result<(), EngineError> {
        self.conn
            .execute_batch(sql)
            .map_err(|err| EngineError::Statement(err.to_string()))
    }
}

impl SqlEngine for SqliteEngine {
    /// Prepare a single statement and collect every row it yields
    fn execute(&mut self, sql: &str) -> Result<Vec<Row>, EngineError> {
        let mut stmt = self
            .conn
            .prepare(sql)
            .map_err(|err| EngineError::Statement(err.to_string()))?;
        let names: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();

        let mut rows = stmt
            .query([])
            .map_err(|err| EngineError::Statement(err.to_string()))?;
        let mut results = Vec::new();
        while let Some(row) = rows
            .next()
            .map_err(|err| EngineError::Statement(err.to_string()))?
        {
            let mut columns = Vec::with_capacity(names.len());
            for (idx, name) in names.iter().enumerate() {
                let value = row
                    .get_ref(idx)
                    .map_err(|err| EngineError::Statement(err.to_string()))?;
                columns.push((name.clone(), value_to_text(value)));
            }
            results.push(Row::new(columns));
        }

        Ok(results)
    }
}

fn value_to_text(value: ValueRef<'_>) -> Option<String> {
    match value {
        ValueRef::Null => None,
        ValueRef::Integer(i) => Some(i.to_string()),
        ValueRef::Real(f) => Some(f.to_string()),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            Some(String::from_utf8_lossy(bytes).into_owned())
        }
    }
}

/// Create the demo USERS table and insert its four rows
pub fn bootstrap_users(engine: &SqliteEngine) -> Result<(), EngineError> {
    engine.execute_batch(USERS_BOOTSTRAP)?;
    info!("USERS table created and seeded");
    Ok(())
}
