//! Query Compilation Tests
//!
//! Tests for compilation invariants:
//! - Values render through one quoting path and parse back unchanged
//! - Any filter sets the full-scan flag; no filter never does
//! - Compilation is deterministic
//! - Compiled statements are accepted by the store

use std::sync::Arc;

use keyspace_browser::executor::{
    parse_condition, parse_select, Comparison, ExecutionRequest, Literal, MemoryStore, Projection,
    SeedTable, StatementExecutor,
};
use keyspace_browser::query::{
    FilterSpec, Operator, QueryCompiler, RawFilter, TableRef, ValueClass, FULL_SCAN_FLAG,
};
use serde_json::json;

// =============================================================================
// Helper Functions
// =============================================================================

const OPERATORS: [Operator; 7] = [
    Operator::Eq,
    Operator::Ne,
    Operator::Gt,
    Operator::Lt,
    Operator::Ge,
    Operator::Le,
    Operator::Contains,
];

const VALUES: [&str; 16] = [
    "active",
    "4.5",
    "-17",
    "007",
    "O'Brien",
    "''",
    "x' OR '1'='1",
    "'; DROP TABLE app.users; --",
    "1e5",
    "+5",
    "1.",
    ".5",
    " 42 ",
    "naïve café",
    "semi;colon",
    "\"double\"",
];

fn comparison_for(op: Operator) -> Comparison {
    match op {
        Operator::Eq => Comparison::Eq,
        Operator::Ne => Comparison::Ne,
        Operator::Gt => Comparison::Gt,
        Operator::Lt => Comparison::Lt,
        Operator::Ge => Comparison::Ge,
        Operator::Le => Comparison::Le,
        Operator::Contains => Comparison::Like,
    }
}

fn users() -> TableRef {
    TableRef::new("app", "users")
}

// =============================================================================
// Round-trip Tests
// =============================================================================

/// Every fragment parses back to the original column, operator and value.
#[test]
fn test_fragment_round_trip() {
    for op in OPERATORS {
        for value in VALUES {
            let spec = FilterSpec::new("status", op, value).unwrap();
            let predicate = spec.compile();
            let condition = parse_condition(&predicate.fragment)
                .unwrap_or_else(|e| panic!("{:?} {:?}: {}", op, value, e));

            assert_eq!(condition.column, "status");
            assert_eq!(condition.comparison, comparison_for(op));

            match op {
                Operator::Contains => {
                    assert_eq!(condition.literal, Literal::Text(format!("%{}%", value)));
                }
                _ => assert_eq!(condition.literal.raw(), value, "{:?}", op),
            }
        }
    }
}

/// Numeric-looking values stay unquoted, everything else is quoted.
#[test]
fn test_numeric_values_unquoted() {
    for value in VALUES {
        let predicate = FilterSpec::new("v", Operator::Eq, value).unwrap().compile();
        let condition = parse_condition(&predicate.fragment).unwrap();

        match predicate.value_class {
            ValueClass::Numeric => {
                assert!(matches!(condition.literal, Literal::Number(..)), "{}", value);
                assert_eq!(predicate.fragment, format!("v = {}", value));
            }
            ValueClass::Text => {
                assert!(matches!(condition.literal, Literal::Text(_)), "{}", value);
            }
        }
    }
}

/// Whole statements survive the round trip too, whatever the value holds.
#[test]
fn test_statement_round_trip() {
    let compiler = QueryCompiler::default();
    for value in VALUES {
        let spec = FilterSpec::new("name", Operator::Eq, value).unwrap();
        let compiled = compiler.compile_page(&users(), Some(&spec), 25, false).unwrap();
        let stmt = parse_select(&compiled.statement_text).unwrap();

        assert_eq!(stmt.projection, Projection::All);
        assert_eq!((stmt.keyspace.as_str(), stmt.table.as_str()), ("app", "users"));
        assert_eq!(stmt.conditions.len(), 1, "injection split {:?}", value);
        assert_eq!(stmt.conditions[0].literal.raw(), value);
        assert_eq!(stmt.limit, Some(25));
        assert!(stmt.allow_filtering);
    }
}

/// Awkward identifiers are quoted and parse back exactly.
#[test]
fn test_identifier_round_trip() {
    let compiler = QueryCompiler::default();
    let target = TableRef::new("Analytics", "select");
    let spec = FilterSpec::new("userName", Operator::Eq, "x").unwrap();

    let compiled = compiler.compile_page(&target, Some(&spec), 10, false).unwrap();
    assert_eq!(
        compiled.statement_text,
        "SELECT * FROM \"Analytics\".\"select\" WHERE \"userName\" = 'x' LIMIT 10 ALLOW FILTERING"
    );

    let stmt = parse_select(&compiled.statement_text).unwrap();
    assert_eq!(stmt.keyspace, "Analytics");
    assert_eq!(stmt.table, "select");
    assert_eq!(stmt.conditions[0].column, "userName");
}

// =============================================================================
// Full-scan Policy Tests
// =============================================================================

#[test]
fn test_full_scan_policy() {
    let compiler = QueryCompiler::default();

    let plain = compiler.compile_page(&users(), None, 10, false).unwrap();
    assert!(!plain.requires_full_scan);
    assert!(!plain.statement_text.contains(FULL_SCAN_FLAG));

    for op in OPERATORS {
        let spec = FilterSpec::new("id", op, "1").unwrap();
        let compiled = compiler.compile_page(&users(), Some(&spec), 10, false).unwrap();
        assert!(compiled.requires_full_scan, "{:?}", op);
        assert!(compiled.statement_text.ends_with(FULL_SCAN_FLAG));
    }

    let opted_in = compiler.compile_page(&users(), None, 10, true).unwrap();
    assert!(opted_in.requires_full_scan);
}

// =============================================================================
// Scenarios
// =============================================================================

#[test]
fn test_scenario_equality_filter() {
    let spec = RawFilter::new("status", "eq", "active").into_spec().unwrap().unwrap();
    assert_eq!(spec.compile().fragment, "status = 'active'");

    let compiled = QueryCompiler::default()
        .compile_page(&users(), Some(&spec), 50, false)
        .unwrap();
    assert!(compiled.requires_full_scan);
    assert_eq!(
        compiled.statement_text,
        "SELECT * FROM app.users WHERE status = 'active' LIMIT 50 ALLOW FILTERING"
    );
}

#[test]
fn test_scenario_numeric_filter() {
    let spec = RawFilter::new("score", ">=", "4.5").into_spec().unwrap().unwrap();
    assert_eq!(spec.compile().fragment, "score >= 4.5");
}

#[test]
fn test_compilation_is_idempotent() {
    let compiler = QueryCompiler::new(200);
    let spec = FilterSpec::new("name", Operator::Contains, "o'b").unwrap();

    let first = compiler.compile_page(&users(), Some(&spec), 500, false).unwrap();
    let second = compiler.compile_page(&users(), Some(&spec), 500, false).unwrap();
    assert_eq!(first.statement_text.as_bytes(), second.statement_text.as_bytes());
    assert_eq!(first.limit, Some(200));
}

#[test]
fn test_invalid_filters_never_compile() {
    assert_eq!(
        RawFilter {
            column: None,
            operator: Some("eq".into()),
            value: Some("x".into()),
        }
        .into_spec()
        .unwrap_err()
        .code(),
        "INVALID_FILTER"
    );
    assert!(RawFilter::new("status", "eq", "").into_spec().is_err());
    assert!(RawFilter::new("status", "~", "x").into_spec().is_err());
    assert_eq!(RawFilter::default().into_spec().unwrap(), None);
}

// =============================================================================
// Store Acceptance Tests
// =============================================================================

/// Whatever the compiler emits, the store accepts and answers correctly.
#[test]
fn test_compiled_statements_execute() {
    let rows = vec![
        json!({ "id": 1, "name": "O'Brien", "score": 4.5 }),
        json!({ "id": 2, "name": "Smith", "score": 3.0 }),
        json!({ "id": 3, "name": "O'Neil", "score": 5 }),
    ]
    .into_iter()
    .map(|v| v.as_object().cloned().unwrap())
    .collect();
    let store = Arc::new(MemoryStore::from_tables(vec![SeedTable::new("app", "users")
        .with_partition_key(&["id"])
        .with_rows(rows)]));
    let compiler = QueryCompiler::default();

    let cases = [
        (FilterSpec::new("name", Operator::Eq, "O'Brien").unwrap(), 1),
        (FilterSpec::new("name", Operator::Contains, "O'").unwrap(), 2),
        (FilterSpec::new("score", Operator::Ge, "4.5").unwrap(), 2),
        (FilterSpec::new("score", Operator::Lt, "-1").unwrap(), 0),
    ];

    for (spec, expected) in cases {
        let compiled = compiler.compile_page(&users(), Some(&spec), 10, false).unwrap();
        let page = store
            .execute(&ExecutionRequest::new(&compiled.statement_text, None, 10))
            .unwrap();
        assert_eq!(page.returned_count(), expected, "{}", compiled.statement_text);

        let count = compiler.compile_count(&users(), Some(&spec), false).unwrap();
        let counted = store
            .execute(&ExecutionRequest::new(&count.statement_text, None, 1))
            .unwrap();
        assert_eq!(counted.rows[0]["count"], expected);
    }
}
