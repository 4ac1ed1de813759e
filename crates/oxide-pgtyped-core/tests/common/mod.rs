#![allow(dead_code)]

use oxide_pgtyped_core::ast::{
    DeleteStatement, Expr, InsertStatement, SelectItem, SelectStatement, Statement,
    UpdateStatement, WithStatement,
};
use oxide_pgtyped_core::{infer, parse as parse_sql, ParseError, QueryInterface};
use regex::Regex;

pub fn parse(sql: &str) -> Statement {
    parse_sql(sql)
        .unwrap_or_else(|e| panic!("Failed to parse: {sql}\nError: {e:?}"))
        .statement
}

pub fn parse_err(sql: &str) -> ParseError {
    parse_sql(sql).expect_err(&format!("Expected parse error for: {sql}"))
}

pub fn parse_select(sql: &str) -> SelectStatement {
    match parse(sql) {
        Statement::Select(s) => s,
        other => panic!("Expected SELECT, got {other:?}"),
    }
}

pub fn parse_insert(sql: &str) -> InsertStatement {
    match parse(sql) {
        Statement::Insert(i) => i,
        other => panic!("Expected INSERT, got {other:?}"),
    }
}

pub fn parse_update(sql: &str) -> UpdateStatement {
    match parse(sql) {
        Statement::Update(u) => u,
        other => panic!("Expected UPDATE, got {other:?}"),
    }
}

pub fn parse_delete(sql: &str) -> DeleteStatement {
    match parse(sql) {
        Statement::Delete(d) => d,
        other => panic!("Expected DELETE, got {other:?}"),
    }
}

pub fn parse_with(sql: &str) -> WithStatement {
    match parse(sql) {
        Statement::With(w) => w,
        other => panic!("Expected WITH, got {other:?}"),
    }
}

/// Debug rendering of a statement with every span blanked out, so two
/// trees compare equal when they differ only in source positions.
pub fn structure(statement: &Statement) -> String {
    let span = Regex::new(r"Span \{ start: \d+, end: \d+ \}").unwrap();
    span.replace_all(&format!("{statement:?}"), "Span").into_owned()
}

/// Verifies that `to_string()` re-parses to the same tree, positions
/// aside, and that rendering is a fixed point.
pub fn round_trip(sql: &str) {
    let ast1 = parse(sql);
    let rendered1 = ast1.to_string();
    let ast2 = parse(&rendered1);
    assert_eq!(
        structure(&ast1),
        structure(&ast2),
        "Round-trip changed the tree.\n  Input:    {sql}\n  Rendered: {rendered1}"
    );
    let rendered2 = ast2.to_string();
    assert_eq!(
        rendered1, rendered2,
        "Round-trip failed.\n  Input:    {sql}\n  First:    {rendered1}\n  Second:   {rendered2}"
    );
}

/// Parses and infers `sql`.
pub fn infer_sql(sql: &str) -> QueryInterface {
    infer(&parse(sql)).unwrap_or_else(|e| panic!("Failed to infer: {sql}\nError: {e:?}"))
}

/// Returns the first projected expression of a SELECT.
pub fn select_expr(sql: &str) -> Expr {
    let s = parse_select(sql);
    match s.core.columns.into_iter().next() {
        Some(SelectItem::Expr { expr, .. }) => expr,
        other => panic!("Expected an expression item, got {other:?}"),
    }
}

/// Returns the WHERE clause of a SELECT.
pub fn where_expr(sql: &str) -> Expr {
    parse_select(sql)
        .core
        .where_clause
        .unwrap_or_else(|| panic!("Expected a WHERE clause in: {sql}"))
}
