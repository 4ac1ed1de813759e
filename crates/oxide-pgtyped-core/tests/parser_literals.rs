//! Tests for literal parsing: numbers, the string forms, booleans,
//! NULL, plus comments and quoted identifiers around them.

mod common;
use common::*;

use oxide_pgtyped_core::ast::{Expr, LiteralKind, UnaryOp};
use oxide_pgtyped_core::parse as parse_sql;

fn literal(sql: &str) -> (LiteralKind, String) {
    match select_expr(sql) {
        Expr::Literal(lit) => (lit.kind, lit.value),
        other => panic!("Expected literal in {sql}, got {other:?}"),
    }
}

#[test]
fn integer_and_decimal() {
    assert_eq!(literal("SELECT 42"), (LiteralKind::Integer, "42".into()));
    assert_eq!(literal("SELECT 3.14"), (LiteralKind::Decimal, "3.14".into()));
    assert_eq!(literal("SELECT .5"), (LiteralKind::Decimal, ".5".into()));
    assert_eq!(literal("SELECT 1e10"), (LiteralKind::Decimal, "1e10".into()));
    assert_eq!(literal("SELECT 2.5E-3"), (LiteralKind::Decimal, "2.5E-3".into()));
    round_trip("SELECT 42, 3.14, .5, 1e10");
}

#[test]
fn negative_number_is_unary() {
    let Expr::Unary(unary) = select_expr("SELECT -5") else {
        panic!("Expected unary minus");
    };
    assert_eq!(unary.op, UnaryOp::Neg);
    assert!(matches!(&unary.operand, Expr::Literal(l) if l.value == "5"));
    round_trip("SELECT -5");
}

#[test]
fn string_with_escaped_quote() {
    assert_eq!(
        literal("SELECT 'it''s'"),
        (LiteralKind::String, "it's".into())
    );
    assert_eq!(parse("SELECT 'it''s'").to_string(), "SELECT 'it''s'");
}

#[test]
fn empty_string() {
    assert_eq!(literal("SELECT ''"), (LiteralKind::String, String::new()));
}

#[test]
fn escape_bit_and_hex_strings() {
    assert_eq!(
        literal(r"SELECT E'line\n'"),
        (LiteralKind::EscapeString, r"line\n".into())
    );
    assert_eq!(literal("SELECT B'1010'"), (LiteralKind::BitString, "1010".into()));
    assert_eq!(literal("SELECT X'1F'"), (LiteralKind::HexString, "1F".into()));
    round_trip(r"SELECT E'a\'b', B'01', X'ff'");
}

#[test]
fn dollar_quoted_strings() {
    assert_eq!(
        literal("SELECT $$ it's raw$$"),
        (
            LiteralKind::DollarString { tag: String::new() },
            " it's raw".into()
        )
    );
    assert_eq!(
        literal("SELECT $fn$ body $$ nested $fn$"),
        (
            LiteralKind::DollarString { tag: "fn".into() },
            " body $$ nested ".into()
        )
    );
    round_trip("SELECT $fn$ x $fn$");
}

#[test]
fn dollar_dollar_name_is_a_parameter() {
    assert!(matches!(
        where_expr("SELECT * FROM t WHERE id IN $$ids"),
        Expr::Binary(b) if matches!(&b.right, Expr::Parameter(_))
    ));
}

#[test]
fn booleans_and_null() {
    assert_eq!(literal("SELECT TRUE"), (LiteralKind::Boolean, "true".into()));
    assert_eq!(literal("SELECT false"), (LiteralKind::Boolean, "false".into()));
    assert_eq!(literal("SELECT NULL"), (LiteralKind::Null, "null".into()));
    assert_eq!(
        parse("SELECT true, false, null").to_string(),
        "SELECT TRUE, FALSE, NULL"
    );
}

#[test]
fn keyword_prefix_is_not_a_literal() {
    assert!(matches!(select_expr("SELECT nullable FROM t"), Expr::Column(_)));
    assert!(matches!(select_expr("SELECT true_value FROM t"), Expr::Column(_)));
}

#[test]
fn unterminated_string_fails() {
    let _ = parse_err("SELECT 'abc");
}

#[test]
fn comments_are_collected() {
    let parsed = parse_sql("-- list users\nSELECT id /* pk */ FROM users").unwrap();
    assert_eq!(parsed.comments.len(), 2);
    assert_eq!(parsed.comments[0].text, "-- list users");
    assert_eq!(parsed.comments[1].text, "/* pk */");
    assert_eq!(parsed.statement.to_string(), "SELECT id FROM users");
}

#[test]
fn quoted_identifiers() {
    let Expr::Column(col) = select_expr("SELECT \"User \"\"Id\"\"\" FROM t") else {
        panic!("Expected column");
    };
    assert!(col.name.quoted);
    assert_eq!(col.name.value, "User \"Id\"");
    assert_eq!(col.name.normalized(), "User \"Id\"");
    round_trip("SELECT \"User \"\"Id\"\"\" FROM t");
}

#[test]
fn quoted_keyword_is_an_identifier() {
    assert!(matches!(
        select_expr("SELECT \"from\" FROM t"),
        Expr::Column(c) if c.name.value == "from"
    ));
}
