//! Tests for refining inferred interfaces against a static schema.

mod common;
use common::*;

use oxide_pgtyped_core::schema::{refine, SchemaLoader, StaticSchema};
use oxide_pgtyped_core::{QueryInterface, ResultColumn, Type};

const SCHEMA: &str = r#"{
  "tables": [
    {"name": "users", "columns": [
      {"name": "id", "type": "int8"},
      {"name": "email", "type": "text"},
      {"name": "nickname", "type": "varchar", "nullable": true},
      {"name": "mood", "type": "mood"},
      {"name": "tags", "type": "text[]"},
      {"name": "created_at", "type": "timestamptz"}
    ]},
    {"schema": "billing", "name": "invoices", "columns": [
      {"name": "id", "type": "int4"},
      {"name": "amount", "type": "numeric", "nullable": true},
      {"name": "meta", "type": "jsonb"},
      {"name": "paid", "type": "bool"},
      {"name": "currency", "type": "currency_code"}
    ]}
  ],
  "functions": [
    {"name": "slugify", "args": ["text"], "returns": "text"},
    {"schema": "billing", "name": "total_for", "args": ["int8", "date"], "returns": "numeric"}
  ],
  "types": [
    {"name": "mood", "values": ["happy", "sad"]},
    {"name": "currency_code", "base": "char"}
  ]
}"#;

fn schema() -> StaticSchema {
    StaticSchema::from_json(SCHEMA).unwrap()
}

fn refined(sql: &str) -> QueryInterface {
    refine(infer_sql(sql), &schema())
}

#[test]
fn columns_resolve() {
    let i = refined("SELECT id, email, nickname, created_at FROM users WHERE email = $email");
    let types: Vec<_> = i.results.iter().map(|c| c.ty.clone()).collect();
    assert_eq!(
        types,
        vec![
            Type::Number,
            Type::String,
            Type::union([Type::String, Type::Null]),
            Type::Date,
        ]
    );
    assert_eq!(i.params[0].ty, Type::String);
}

#[test]
fn star_expands_in_table_order() {
    let i = refined("SELECT * FROM billing.invoices");
    assert_eq!(
        i.results,
        vec![
            ResultColumn::new("id", Type::Number),
            ResultColumn::new("amount", Type::union([Type::Number, Type::Null])),
            ResultColumn::new("meta", Type::Json),
            ResultColumn::new("paid", Type::Boolean),
            ResultColumn::new("currency", Type::String),
        ]
    );
}

#[test]
fn unknown_table_star_degrades() {
    let i = refined("SELECT * FROM missing");
    assert_eq!(i.results, vec![ResultColumn::new("*", Type::Unknown)]);
}

#[test]
fn unknown_column_degrades() {
    let i = refined("SELECT nope FROM users WHERE other = $x");
    assert_eq!(i.results[0].ty, Type::Unknown);
    assert_eq!(i.params[0].ty, Type::Unknown);
}

#[test]
fn enums_and_arrays() {
    let i = refined("SELECT mood, tags FROM users WHERE mood = $m");
    assert_eq!(i.results[0].ty, Type::String);
    assert_eq!(i.results[1].ty, Type::array(Type::String));
    assert_eq!(i.params[0].ty, Type::String);
}

#[test]
fn cast_to_user_type() {
    let i = refined("SELECT $m::mood AS m");
    assert_eq!(i.params[0].ty, Type::String);
    assert_eq!(i.results[0].ty, Type::String);
}

#[test]
fn required_parameters_drop_null() {
    let i = refined("UPDATE users SET nickname = $a, email = $b WHERE id = $id RETURNING nickname");
    let i2 = refined("UPDATE users SET nickname = $a! WHERE id = $id");
    assert_eq!(i.params[0].ty, Type::union([Type::String, Type::Null]));
    assert_eq!(i2.params[0].ty, Type::String);
    assert_eq!(i.results[0].ty, Type::union([Type::String, Type::Null]));
}

#[test]
fn spread_pick_objects_refine() {
    let i = refined("INSERT INTO users (email, nickname) VALUES $$rows(email, nickname)");
    assert_eq!(
        i.params[0].ty,
        Type::array(Type::object([
            ("email".to_string(), Type::String),
            (
                "nickname".to_string(),
                Type::union([Type::String, Type::Null])
            ),
        ]))
    );
}

#[test]
fn declared_functions() {
    let i = refined("SELECT slugify($title), billing.total_for($user, CURRENT_DATE)");
    assert_eq!(i.params[0].ty, Type::String);
    assert_eq!(i.params[1].ty, Type::Number);
    assert_eq!(i.results[0].ty, Type::String);
    assert_eq!(i.results[1].ty, Type::Number);
}

#[test]
fn builtin_functions_fall_back() {
    let i = refined(
        "SELECT count(*), max(created_at), array_agg(email), upper(email), json_agg(id) FROM users",
    );
    let types: Vec<_> = i.results.iter().map(|c| c.ty.clone()).collect();
    assert_eq!(
        types,
        vec![
            Type::Number,
            Type::Date,
            Type::array(Type::String),
            Type::String,
            Type::Json,
        ]
    );
}

#[test]
fn unknown_function_degrades() {
    let i = refined("SELECT mystery(id) FROM users");
    assert_eq!(i.results[0].ty, Type::Unknown);
}

#[test]
fn operators_resolve_after_columns() {
    let i = refined(
        "SELECT amount * 2, meta ->> 'note', u.created_at - u.created_at \
         FROM billing.invoices, users AS u",
    );
    assert_eq!(
        i.results[0].ty,
        Type::union([Type::Number, Type::Null])
    );
    assert_eq!(i.results[1].ty, Type::String);
    assert_eq!(i.results[2].ty, Type::Number);
}

#[test]
fn cte_star_of_table() {
    let i = refined("WITH u AS (SELECT * FROM users) SELECT * FROM u");
    assert_eq!(i.results.len(), 6);
    assert_eq!(i.results[0], ResultColumn::new("id", Type::Number));
}

#[test]
fn loader_trait_object() {
    let schema = schema();
    let loader: &dyn SchemaLoader = &schema;
    assert_eq!(loader.column("public", "users", "id"), Some(Type::Number));
    assert_eq!(loader.column("public", "users", "nope"), None);
    assert_eq!(
        loader.function_argument(Some("billing"), "total_for", 1),
        Some(Type::Date)
    );
    assert_eq!(loader.named_type(None, "currency_code"), Some(Type::String));
    assert_eq!(loader.columns("billing", "missing"), None);
}

#[test]
fn invalid_schema_json() {
    assert!(StaticSchema::from_json("{\"tables\": 3}").is_err());
    assert_eq!(
        StaticSchema::from_json("{}").unwrap(),
        StaticSchema::default()
    );
}
