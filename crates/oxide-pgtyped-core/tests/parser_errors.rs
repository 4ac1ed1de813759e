//! Tests for parser error cases: furthest-failure positions, expected
//! sets and caret rendering.

mod common;
use common::*;

#[test]
fn error_empty_input() {
    let err = parse_err("");
    assert_eq!(err.position.start, 0);
}

#[test]
fn error_incomplete_select() {
    let err = parse_err("SELECT");
    assert_eq!(err.position.start, 6);
}

#[test]
fn error_missing_from_table() {
    let err = parse_err("SELECT * FROM");
    assert_eq!(err.position.start, 13);
}

#[test]
fn error_unexpected_keyword() {
    let err = parse_err("TRUNCATE users");
    assert_eq!(err.position.start, 0);
}

#[test]
fn error_unclosed_paren() {
    let err = parse_err("SELECT (1 + 2");
    assert_eq!(err.position.start, 13);
}

#[test]
fn error_trailing_garbage() {
    let err = parse_err("SELECT 1 FROM users )");
    assert_eq!(err.position.start, 20);
}

#[test]
fn error_second_statement() {
    let _ = parse_err("SELECT 1; SELECT 2");
}

// ===================================================================
// Keyword exclusion
// ===================================================================

#[test]
fn error_reserved_word_as_alias() {
    let err = parse_err("SELECT * FROM jobs AS FROM");
    assert_eq!(err.position.start, 22);
    assert!(err.expected.iter().any(|e| e == "identifier"));
}

#[test]
fn error_reserved_word_as_table() {
    let err = parse_err("SELECT * FROM select");
    assert_eq!(err.position.start, 14);
}

#[test]
fn quoted_reserved_word_is_fine() {
    let s = parse_select("SELECT * FROM \"select\"");
    assert_eq!(s.core.from.len(), 1);
}

// ===================================================================
// Column counts
// ===================================================================

#[test]
fn scalar_subquery_needs_one_column() {
    let _ = parse_err("SELECT (SELECT 1, 2)");
    let _ = parse_err("SELECT ARRAY(SELECT id, name FROM users)");
    let _ = parse_err("SELECT (SELECT 1 UNION SELECT 1, 2)");
}

#[test]
fn multi_column_subqueries_outside_scalar_position() {
    round_trip("SELECT * FROM t WHERE (a, b) = (SELECT 1, 2)");
    round_trip("SELECT * FROM t WHERE (x, y) IN (SELECT a, b FROM u)");
    round_trip("SELECT EXISTS (SELECT a, b FROM u)");
}

#[test]
fn set_map_needs_one_value_per_column() {
    let _ = parse_err("UPDATE users SET (name, age) = ROW($name)");
    let _ = parse_err("UPDATE users SET (name) = (1, 2)");
}

// ===================================================================
// Caret rendering
// ===================================================================

#[test]
fn error_caret_points_at_failure() {
    let sql = "SELECT id\nFROM users\nWHERE id = = 1";
    let err = parse_err(sql);
    assert_eq!(err.line_col(sql), (3, 12));
    let caret = err.caret(sql);
    let lines: Vec<&str> = caret.lines().collect();
    assert!(lines[0].ends_with("WHERE id = = 1"));
    assert_eq!(lines[1].find('^'), Some("   3 | ".len() + 11));
}

#[test]
fn error_display_includes_position() {
    let err = parse_err("SELECT * FROM");
    assert!(err.to_string().contains("13"));
}
