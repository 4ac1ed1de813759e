//! Tests for INSERT: VALUES rows, parameter rows, INSERT ... SELECT,
//! DEFAULT VALUES, ON CONFLICT and RETURNING.

mod common;
use common::*;

use oxide_pgtyped_core::ast::{
    ConflictAction, ConflictTarget, Expr, InsertSource, ParameterKind, SelectItem, ValuesItem,
};

#[test]
fn insert_values_rows() {
    let sql = "INSERT INTO users (name, email) VALUES ('a', 'a@x'), ('b', DEFAULT)";
    let i = parse_insert(sql);
    assert_eq!(i.table.name.value, "users");
    assert_eq!(i.columns.len(), 2);
    let InsertSource::Values(rows) = &i.source else {
        panic!("Expected VALUES");
    };
    assert_eq!(rows.len(), 2);
    assert!(matches!(
        &rows[1],
        ValuesItem::Row { values, .. } if matches!(values[1], Expr::Default(_))
    ));
    round_trip(sql);
}

#[test]
fn insert_without_column_list() {
    let i = parse_insert("INSERT INTO users VALUES (1, 'a')");
    assert!(i.columns.is_empty());
}

#[test]
fn insert_parameter_rows() {
    let sql = "INSERT INTO books (title, pages) VALUES $$books(title, pages)";
    let i = parse_insert(sql);
    let InsertSource::Values(rows) = &i.source else {
        panic!("Expected VALUES");
    };
    let ValuesItem::Parameter(param) = &rows[0] else {
        panic!("Expected parameter row");
    };
    assert_eq!(param.kind, ParameterKind::Spread);
    assert_eq!(param.pick.len(), 2);
    round_trip(sql);
}

#[test]
fn insert_single_object_parameter() {
    let i = parse_insert("INSERT INTO books (title) VALUES $book(title)!");
    let InsertSource::Values(rows) = &i.source else {
        panic!("Expected VALUES");
    };
    assert!(matches!(
        &rows[0],
        ValuesItem::Parameter(p) if p.kind == ParameterKind::Single && p.name == "book"
    ));
}

#[test]
fn insert_row_of_parameters() {
    let i = parse_insert("INSERT INTO books (title, pages) VALUES ($title!, $pages)");
    let InsertSource::Values(rows) = &i.source else {
        panic!("Expected VALUES");
    };
    let ValuesItem::Row { values, .. } = &rows[0] else {
        panic!("Expected row");
    };
    assert!(matches!(&values[0], Expr::Parameter(p) if p.required));
    assert!(matches!(&values[1], Expr::Parameter(p) if !p.required));
}

#[test]
fn insert_select() {
    let sql = "INSERT INTO archive (id, name) SELECT id, name FROM users WHERE deleted";
    let i = parse_insert(sql);
    assert!(matches!(&i.source, InsertSource::Select(_)));
    round_trip(sql);
}

#[test]
fn insert_default_values() {
    let i = parse_insert("INSERT INTO counters DEFAULT VALUES RETURNING id");
    assert!(matches!(i.source, InsertSource::DefaultValues));
    assert_eq!(i.returning.len(), 1);
    round_trip("INSERT INTO counters DEFAULT VALUES RETURNING id");
}

#[test]
fn insert_alias_requires_as() {
    let i = parse_insert("INSERT INTO users AS u (name) VALUES ('a')");
    assert_eq!(i.alias.as_ref().map(|a| a.value.as_str()), Some("u"));
    let _ = parse_err("INSERT INTO users u (name) VALUES ('a')");
}

#[test]
fn insert_on_conflict_do_nothing() {
    let sql = "INSERT INTO users (email) VALUES ($email) ON CONFLICT (email) DO NOTHING";
    let i = parse_insert(sql);
    let conflict = i.on_conflict.as_ref().expect("Expected ON CONFLICT");
    assert!(matches!(&conflict.target, Some(ConflictTarget::Columns(c)) if c.len() == 1));
    assert!(matches!(conflict.action, ConflictAction::DoNothing));
    round_trip(sql);
}

#[test]
fn insert_on_conflict_do_update() {
    let sql = "INSERT INTO users (email, name) VALUES ($email, $name) \
               ON CONFLICT ON CONSTRAINT users_email_key \
               DO UPDATE SET name = EXCLUDED.name WHERE users.locked = FALSE \
               RETURNING *";
    let i = parse_insert(sql);
    let conflict = i.on_conflict.as_ref().expect("Expected ON CONFLICT");
    assert!(matches!(
        &conflict.target,
        Some(ConflictTarget::Constraint(name)) if name.value == "users_email_key"
    ));
    let ConflictAction::DoUpdate { set, where_clause } = &conflict.action else {
        panic!("Expected DO UPDATE");
    };
    assert_eq!(set.len(), 1);
    assert!(where_clause.is_some());
    assert!(matches!(&i.returning[0], SelectItem::Star(_)));
    round_trip(sql);
}

#[test]
fn insert_on_conflict_without_target() {
    let i = parse_insert("INSERT INTO t (a) VALUES (1) ON CONFLICT DO NOTHING");
    assert!(i.on_conflict.is_some_and(|c| c.target.is_none()));
}

#[test]
fn insert_returning_expressions() {
    let sql = "INSERT INTO users (name) VALUES ($name) RETURNING id, upper(name) AS shout";
    let i = parse_insert(sql);
    assert_eq!(i.returning.len(), 2);
    round_trip(sql);
}

#[test]
fn insert_requires_source() {
    let _ = parse_err("INSERT INTO users (name)");
}
