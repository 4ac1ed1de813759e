//! Whole-statement parser tests: re-parsing, determinism and deeply
//! nested input.

mod common;
use common::*;

use std::time::{Duration, Instant};

use oxide_pgtyped_core::ast::Expr;

const STATEMENTS: &[&str] = &[
    "SELECT u.id, count(*) AS n FROM users AS u LEFT JOIN orders o ON o.user_id = u.id \
     WHERE u.email ILIKE $pattern AND u.created_at BETWEEN $from AND $to \
     GROUP BY u.id HAVING count(*) > 1 ORDER BY n DESC NULLS LAST LIMIT $limit OFFSET 10",
    "SELECT CASE WHEN a > 1 THEN 'big' ELSE 'small' END, COALESCE(b, 0), NULLIF(c, ''), \
     -d ^ 2, NOT e, f IS NOT DISTINCT FROM g, h::numeric(10, 2), CAST(i AS text[]) FROM t",
    "SELECT x FROM t WHERE (a, b) = (SELECT 1, 2) AND c = ANY($ids) \
     AND EXISTS (SELECT 1 FROM u WHERE u.t_id = t.id) AND d NOT IN (1, 2, 3)",
    "SELECT meta->>'name', meta #> '{a,b}', tags[1:2], ARRAY[1, 2], ROW(1, 'a'), (1, 2) FROM t",
    "SELECT string_agg(name, ',' ORDER BY name) FILTER (WHERE active), \
     rank() OVER (PARTITION BY team ORDER BY score DESC) FROM players",
    "SELECT a FROM t UNION ALL SELECT b FROM u EXCEPT SELECT c FROM v ORDER BY 1",
    "INSERT INTO books AS b (title, pages) VALUES $$books(title, pages) \
     ON CONFLICT (title) DO UPDATE SET pages = EXCLUDED.pages WHERE b.pages < 10 RETURNING id",
    "UPDATE users SET (name, age) = ROW($name, $age), active = DEFAULT \
     FROM teams WHERE users.team_id = teams.id RETURNING users.*",
    "DELETE FROM orders o USING users u WHERE o.user_id = u.id AND u.id = $id! RETURNING o.*",
    "WITH RECURSIVE tree(id, parent) AS (SELECT id, parent FROM nodes WHERE parent IS NULL \
     UNION ALL SELECT n.id, n.parent FROM nodes n JOIN tree ON n.parent = tree.id) \
     SELECT * FROM tree",
    "SELECT x::\"my type\", y::\"Billing\".\"Mood\", date '2024-01-01', $$ raw $$, E'a\\nb' FROM t",
    "SELECT x::timestamp(3) with time zone, y::time(0) without time zone FROM t",
];

// ===================================================================
// Re-parsing
// ===================================================================

#[test]
fn statements_round_trip() {
    for sql in STATEMENTS {
        round_trip(sql);
    }
}

#[test]
fn parsing_is_deterministic() {
    for sql in STATEMENTS {
        assert_eq!(parse(sql), parse(sql), "{sql}");
    }
}

#[test]
fn whitespace_and_comments_do_not_change_the_tree() {
    let compact = parse("SELECT a+1 FROM t WHERE b=$b");
    let spaced = parse("SELECT a /* one */ + 1\n  FROM t -- source\n  WHERE b = $b");
    assert_eq!(structure(&compact), structure(&spaced));
}

#[test]
fn quoted_type_names_keep_their_quotes() {
    let rendered = parse("SELECT x::\"my type\", y::\"Billing\".\"Mood\" FROM t").to_string();
    assert_eq!(rendered, "SELECT x::\"my type\", y::\"Billing\".\"Mood\" FROM t");
}

#[test]
fn zoned_time_precision_renders_before_the_zone() {
    let rendered = parse("SELECT x::timestamp(3) with time zone").to_string();
    assert_eq!(rendered, "SELECT x::timestamp(3) with time zone");
}

// ===================================================================
// Deep nesting
// ===================================================================

fn parse_within(sql: &str, limit: Duration) -> Expr {
    let started = Instant::now();
    let expr = select_expr(sql);
    let elapsed = started.elapsed();
    assert!(elapsed < limit, "parsing took {elapsed:?}: {sql}");
    expr
}

#[test]
fn nested_parentheses_parse_in_linear_time() {
    let depth = 30;
    let sql = format!("SELECT {}1{}", "(".repeat(depth), ")".repeat(depth));
    let mut expr = parse_within(&sql, Duration::from_secs(2));
    let mut levels = 0;
    while let Expr::Paren(paren) = expr {
        levels += 1;
        expr = paren.expr;
    }
    assert_eq!(levels, depth);
    assert!(matches!(expr, Expr::Literal(_)));
}

#[test]
fn nested_rows_and_operators_parse_quickly() {
    let depth = 25;
    let sql = format!(
        "SELECT {}1{} FROM t",
        "(a + ".repeat(depth),
        ", 2)".repeat(depth)
    );
    let expr = parse_within(&sql, Duration::from_secs(2));
    assert!(matches!(expr, Expr::Row(_)));
    round_trip(&sql);
}

#[test]
fn nested_scalar_subqueries_parse_quickly() {
    let depth = 15;
    let sql = format!(
        "SELECT {}1{}",
        "(SELECT ".repeat(depth),
        ")".repeat(depth)
    );
    let expr = parse_within(&sql, Duration::from_secs(2));
    assert!(matches!(expr, Expr::Subquery(_)));
}
