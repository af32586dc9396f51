//! input-guard demo driver.
//!
//! Reads one bounded line from stdin, then runs the demo USERS queries
//! and their tautology-injected variants through the query gate.

use std::io::{self, BufRead};
use std::process::ExitCode;

use input_guard::engine::bootstrap_users;
use input_guard::{BoundedLineReader, GuardConfig, QueryGate, ReadError, Row, SqliteEngine};

/// Value that must survive any amount of user input unchanged
const ACCOUNT_NUMBER: &str = "CharlieBrown42";

/// Suffixes an attacker appends to a WHERE clause
const INJECTIONS: [&str; 4] = [" or 1=1;", " or 2=2;", " or 'hi'='hi';", " or 'hack'='hack';"];

fn main() -> ExitCode {
    env_logger::init();

    let config = GuardConfig::default();
    let stdin = io::stdin();

    if let Err(e) = bounded_input_demo(stdin.lock(), &config) {
        eprintln!("Input failed: {}", e);
        return ExitCode::FAILURE;
    }

    match sql_injection_demo(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Database Initialization Failed. Terminating. ERROR = {}", e);
            ExitCode::FAILURE
        }
    }
}

fn bounded_input_demo<R: BufRead>(source: R, config: &GuardConfig) -> Result<(), ReadError> {
    println!("Buffer Overflow Example");
    println!("Enter a value: ");

    let mut reader = BoundedLineReader::from_config(source, config)?;
    match reader.read_line() {
        Ok(input) => {
            if input.is_truncated() {
                println!(
                    "Warning: You entered too much data. Input has been truncated to {} characters.",
                    input.len()
                );
            }
            println!("You entered: {}", input.to_string_lossy());
        }
        Err(ReadError::EndOfInput) => println!("No input received."),
        Err(e) => return Err(e),
    }
    println!("Account Number = {}", ACCOUNT_NUMBER);
    Ok(())
}

fn sql_injection_demo(config: &GuardConfig) -> Result<(), input_guard::EngineError> {
    println!("SQL Injection Example");

    let engine = SqliteEngine::open_in_memory()?;
    println!("Connected to the database.");
    bootstrap_users(&engine)?;

    let mut gate = QueryGate::with_config(engine, config);

    let query_all = "SELECT * from USERS";
    run_and_dump(&mut gate, query_all);

    let query_fred = "SELECT ID, NAME, PASSWORD FROM USERS WHERE NAME='Fred'";
    run_and_dump(&mut gate, query_fred);

    for suffix in INJECTIONS {
        run_and_dump(&mut gate, &inject_tautology(query_fred, suffix));
    }

    Ok(())
}

/// Append an always-true disjunction, dropping a trailing `;` first
fn inject_tautology(sql: &str, suffix: &str) -> String {
    let base = sql.strip_suffix(';').unwrap_or(sql);
    format!("{}{}", base, suffix)
}

fn run_and_dump(gate: &mut QueryGate<SqliteEngine>, sql: &str) {
    match gate.run_query(sql) {
        Ok(rows) => dump_results(sql, &rows),
        Err(e) => println!("\nSQL: {} ==> refused: {}", sql, e),
    }
}

fn dump_results(sql: &str, rows: &[Row]) {
    println!("\nSQL: {} ==> {} records found.", sql, rows.len());

    for row in rows {
        println!(
            "User: {} [UID={} PWD={}]",
            row.get("NAME").unwrap_or("NULL"),
            row.get("ID").unwrap_or("NULL"),
            row.get("PASSWORD").unwrap_or("NULL")
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_inject_tautology() {
        assert_eq!(
            inject_tautology("SELECT 1 WHERE a=1;", " or 1=1;"),
            "SELECT 1 WHERE a=1 or 1=1;"
        );
        assert_eq!(
            inject_tautology("SELECT 1 WHERE a=1", " or 2=2;"),
            "SELECT 1 WHERE a=1 or 2=2;"
        );
    }

    #[test]
    fn test_bounded_input_demo_handles_end_of_input() {
        let config = GuardConfig::default();
        assert!(bounded_input_demo(Cursor::new(""), &config).is_ok());
        assert!(bounded_input_demo(Cursor::new("a very long line of input text\n"), &config).is_ok());
    }

    #[test]
    fn test_sql_injection_demo_runs() {
        assert!(sql_injection_demo(&GuardConfig::default()).is_ok());
    }
}
