//! Tests for binding JSON values to named parameters.

use oxide_pgtyped_core::{to_query_config, QueryError};
use serde_json::{json, Value};

#[test]
fn plain_parameters_in_order() {
    let config = to_query_config(
        "SELECT * FROM users WHERE org = $org AND email = :email",
        &json!({"email": "a@x", "org": 7}),
    )
    .unwrap();
    assert_eq!(
        config.text,
        "SELECT * FROM users WHERE org = $1 AND email = $2"
    );
    assert_eq!(config.values, vec![json!(7), json!("a@x")]);
}

#[test]
fn repeated_parameter_shares_placeholder() {
    let config = to_query_config(
        "SELECT * FROM t WHERE a = $x OR b = $y OR c = $x",
        &json!({"x": 1, "y": 2}),
    )
    .unwrap();
    assert_eq!(config.text, "SELECT * FROM t WHERE a = $1 OR b = $2 OR c = $1");
    assert_eq!(config.values, vec![json!(1), json!(2)]);
}

#[test]
fn text_outside_parameters_is_untouched() {
    let sql = "SELECT '$notaparam', $$ raw $$ , x::int FROM t -- $comment\nWHERE id = $id";
    let config = to_query_config(sql, &json!({"id": 5})).unwrap();
    assert_eq!(
        config.text,
        "SELECT '$notaparam', $$ raw $$ , x::int FROM t -- $comment\nWHERE id = $1"
    );
}

#[test]
fn spread_expands_list() {
    let config = to_query_config(
        "DELETE FROM t WHERE id IN $$ids RETURNING id",
        &json!({"ids": ["a", "b", "c"]}),
    )
    .unwrap();
    assert_eq!(config.text, "DELETE FROM t WHERE id IN ($1, $2, $3) RETURNING id");
    assert_eq!(config.values.len(), 3);
}

#[test]
fn spread_of_empty_array() {
    let config = to_query_config("SELECT * FROM t WHERE id IN $$ids", &json!({"ids": []})).unwrap();
    assert_eq!(config.text, "SELECT * FROM t WHERE id IN ()");
    assert!(config.values.is_empty());
}

#[test]
fn spread_pick_rows() {
    let config = to_query_config(
        "INSERT INTO books (title, pages) VALUES $$books(title, pages) RETURNING id",
        &json!({"books": [
            {"title": "Dune", "pages": 412},
            {"pages": 10, "title": "Zine"}
        ]}),
    )
    .unwrap();
    assert_eq!(
        config.text,
        "INSERT INTO books (title, pages) VALUES ($1, $2), ($3, $4) RETURNING id"
    );
    assert_eq!(
        config.values,
        vec![json!("Dune"), json!(412), json!("Zine"), json!(10)]
    );
}

#[test]
fn spread_rows_without_column_list() {
    let config = to_query_config(
        "INSERT INTO t VALUES $$rows(name, age)",
        &json!({"rows": [{"name": "a", "age": 1}, {"name": "b", "age": 2}]}),
    )
    .unwrap();
    assert_eq!(config.text, "INSERT INTO t VALUES ($1, $2), ($3, $4)");
    assert_eq!(
        config.values,
        vec![json!("a"), json!(1), json!("b"), json!(2)]
    );
}

#[test]
fn pick_of_one_object_with_missing_field() {
    let config = to_query_config(
        "UPDATE t SET (a, b) = $row(a, b) WHERE id = $id",
        &json!({"row": {"a": true}, "id": 1}),
    );
    // A bare pick parameter is not a row constructor on the right of SET.
    assert!(matches!(config, Err(QueryError::Parse(_))));

    let config = to_query_config(
        "INSERT INTO t (a, b) VALUES $row(a, b)",
        &json!({"row": {"a": true}}),
    )
    .unwrap();
    assert_eq!(config.text, "INSERT INTO t (a, b) VALUES ($1, $2)");
    assert_eq!(config.values, vec![json!(true), Value::Null]);
}

#[test]
fn missing_values_bind_null() {
    let config = to_query_config("SELECT $a, $b", &json!({"a": 1})).unwrap();
    assert_eq!(config.values, vec![json!(1), Value::Null]);
}

#[test]
fn required_parameter_must_be_present() {
    let err = to_query_config("SELECT * FROM t WHERE id = $id!", &json!({"id": null})).unwrap_err();
    assert!(matches!(err, QueryError::MissingRequired { ref name } if name == "id"));
    assert_eq!(err.to_string(), "Missing value for required parameter 'id'");
}

#[test]
fn shape_mismatches() {
    assert!(matches!(
        to_query_config("SELECT * FROM t WHERE id IN $$ids", &json!({"ids": {"a": 1}})),
        Err(QueryError::ExpectedArray { .. })
    ));
    assert!(matches!(
        to_query_config(
            "INSERT INTO t (a) VALUES $$rows(a)",
            &json!({"rows": [1, 2]})
        ),
        Err(QueryError::ExpectedObject { .. })
    ));
}

#[test]
fn parse_errors_surface() {
    let err = to_query_config("SELEC 1", &json!({})).unwrap_err();
    assert!(matches!(err, QueryError::Parse(ref e) if e.position.start == 0));
}

#[test]
fn config_serializes() {
    let config = to_query_config("SELECT $a", &json!({"a": [1, 2]})).unwrap();
    assert_eq!(
        serde_json::to_value(&config).unwrap(),
        json!({"text": "SELECT $1", "values": [[1, 2]]})
    );
}
