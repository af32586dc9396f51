//! End-to-end gate tests against a seeded in-memory SQLite database.

use input_guard::engine::bootstrap_users;
use input_guard::{EngineError, GuardConfig, QueryError, QueryGate, SqliteEngine};

const QUERY_FRED: &str = "SELECT ID, NAME, PASSWORD FROM USERS WHERE NAME='Fred'";

fn seeded_gate() -> QueryGate<SqliteEngine> {
    let engine = SqliteEngine::open_in_memory().unwrap();
    bootstrap_users(&engine).unwrap();
    QueryGate::with_config(engine, &GuardConfig::default())
}

#[test]
fn test_plain_queries_return_seeded_rows() {
    let mut gate = seeded_gate();

    let all = gate.run_query("SELECT * from USERS").unwrap();
    assert_eq!(all.len(), 4);

    let fred = gate.run_query(QUERY_FRED).unwrap();
    assert_eq!(fred.len(), 1);
    assert_eq!(fred[0].get("PASSWORD"), Some("Flinstone"));
}

#[test]
fn test_every_injected_variant_denied() {
    let mut gate = seeded_gate();

    let variants = [
        (" or 1=1;", "1"),
        (" or 2=2;", "2"),
        (" or 'hi'='hi';", "'hi'"),
        (" or 'hack'='hack';", "'hack'"),
    ];
    for (suffix, operand) in variants {
        let sql = format!("{}{}", QUERY_FRED, suffix);
        match gate.run_query(&sql) {
            Err(QueryError::InjectionDetected {
                left_operand,
                right_operand,
            }) => {
                assert_eq!(left_operand, operand);
                assert_eq!(right_operand, operand);
            }
            other => panic!("Expected {} to be denied, got {:?}", sql, other),
        }
    }
}

#[test]
fn test_denied_statement_never_executes() {
    let mut gate = seeded_gate();

    // Would wipe every password if it ran
    let err = gate
        .run_query("UPDATE USERS SET PASSWORD='x' WHERE NAME='Fred' OR 7=7")
        .unwrap_err();
    assert!(matches!(err, QueryError::InjectionDetected { .. }));

    let rows = gate.run_query("SELECT * FROM USERS WHERE PASSWORD='x'").unwrap();
    assert!(rows.is_empty());
}

#[test]
fn test_legitimate_disjunction_allowed() {
    let mut gate = seeded_gate();

    let rows = gate
        .run_query("SELECT * FROM USERS WHERE NAME='Fred' or NAME='Barney';")
        .unwrap();
    assert_eq!(rows.len(), 2);
}

#[test]
fn test_engine_error_surfaces() {
    let mut gate = seeded_gate();

    let err = gate.run_query("SELECT * FROM USERZ WHERE NAME='Fred'").unwrap_err();
    assert!(matches!(err, QueryError::Engine(EngineError::Statement(_))));
}

#[test]
fn test_empty_operand_comparison_denied_before_engine() {
    let mut gate = seeded_gate();

    match gate.run_query("SELECT * FROM USERS WHERE NAME='Fred' OR = ;") {
        Err(QueryError::InjectionDetected {
            left_operand,
            right_operand,
        }) => {
            assert!(left_operand.is_empty());
            assert!(right_operand.is_empty());
        }
        other => panic!("Expected denial before execution, got {:?}", other),
    }
}
