//! Tests for parameter inference: the type each parameter takes from
//! its position, merging over occurrences, spreads and pick lists.

mod common;
use common::*;

use oxide_pgtyped_core::ast::{SetClause, SetMapSource, Statement};
use oxide_pgtyped_core::{infer, infer_with, InferError, InferOptions, Param, Type};

fn column(table: &str, column: &str) -> Type {
    Type::LoadColumn {
        schema: "public".into(),
        table: table.into(),
        column: column.into(),
    }
}

fn param<'a>(params: &'a [Param], name: &str) -> &'a Param {
    params
        .iter()
        .find(|p| p.name == name)
        .unwrap_or_else(|| panic!("No parameter named {name}"))
}

#[test]
fn compared_with_column() {
    let i = infer_sql("SELECT id FROM users WHERE email = $email");
    assert_eq!(i.params.len(), 1);
    assert_eq!(i.params[0].ty, column("users", "email"));
    assert!(!i.params[0].required);
    assert!(!i.params[0].spread);
}

#[test]
fn parameter_on_left_side() {
    let i = infer_sql("SELECT * FROM items WHERE $min < price");
    assert_eq!(i.params[0].ty, column("items", "price"));
}

#[test]
fn aliased_table_resolves_to_table() {
    let i = infer_sql("SELECT u.id FROM users AS u WHERE u.email = $email");
    assert_eq!(i.params[0].ty, column("users", "email"));
}

#[test]
fn default_schema_option() {
    let options = InferOptions {
        default_schema: "app".into(),
    };
    let i = infer_with(&parse("SELECT * FROM users WHERE id = $id"), &options).unwrap();
    assert_eq!(
        i.params[0].ty,
        Type::LoadColumn {
            schema: "app".into(),
            table: "users".into(),
            column: "id".into(),
        }
    );
}

#[test]
fn limit_and_offset_are_numbers() {
    let i = infer_sql("SELECT * FROM users ORDER BY id LIMIT $limit OFFSET $offset");
    assert_eq!(param(&i.params, "limit").ty, Type::Number);
    assert_eq!(param(&i.params, "offset").ty, Type::Number);
}

#[test]
fn text_matching_takes_strings() {
    let i = infer_sql("SELECT * FROM users WHERE name ILIKE $pattern OR email ~ $regex");
    assert_eq!(param(&i.params, "pattern").ty, Type::String);
    assert_eq!(param(&i.params, "regex").ty, Type::String);
}

#[test]
fn between_bounds() {
    let i = infer_sql("SELECT * FROM events WHERE created_at BETWEEN $from AND $to");
    assert_eq!(i.params.len(), 2);
    assert_eq!(param(&i.params, "from").ty, column("events", "created_at"));
    assert_eq!(param(&i.params, "to").ty, column("events", "created_at"));
}

#[test]
fn in_list_and_spread() {
    let i = infer_sql("SELECT * FROM users WHERE id IN ($a, $b) OR org_id IN $$orgs");
    assert_eq!(param(&i.params, "a").ty, column("users", "id"));
    assert_eq!(param(&i.params, "b").ty, column("users", "id"));
    let orgs = param(&i.params, "orgs");
    assert!(orgs.spread);
    assert_eq!(orgs.ty, Type::array(column("users", "org_id")));
}

#[test]
fn any_array_parameter() {
    let i = infer_sql("SELECT * FROM users WHERE id = ANY($ids)");
    assert_eq!(i.params[0].ty, Type::array(column("users", "id")));
}

#[test]
fn in_subquery_parameters() {
    let i = infer_sql(
        "SELECT * FROM users WHERE id IN (SELECT user_id FROM orders WHERE total > $min)",
    );
    assert_eq!(i.params[0].ty, column("orders", "total"));
}

#[test]
fn repeated_parameter_merges() {
    let i = infer_sql("SELECT * FROM t WHERE a = $p AND b = $p::int OR c = $p");
    assert_eq!(i.params.len(), 1);
    assert_eq!(i.params[0].ty, Type::Number);
    assert_eq!(i.params[0].spans.len(), 3);
    assert!(i.params[0].spans.windows(2).all(|w| w[0].start < w[1].start));
}

#[test]
fn required_on_any_occurrence() {
    let i = infer_sql("SELECT * FROM t WHERE a = $p OR b = $p!");
    assert!(i.params[0].required);
}

#[test]
fn parameters_ordered_by_first_occurrence() {
    let i = infer_sql("SELECT * FROM t WHERE b = $second OR a = $first LIMIT $second");
    let names: Vec<_> = i.params.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["second", "first"]);
}

#[test]
fn casts_fix_the_type() {
    let i = infer_sql("SELECT $n::int, CAST($s AS text), $m::mood, $tags::text[]");
    assert_eq!(param(&i.params, "n").ty, Type::Number);
    assert_eq!(param(&i.params, "s").ty, Type::String);
    assert_eq!(
        param(&i.params, "m").ty,
        Type::Named {
            schema: None,
            name: "mood".into()
        }
    );
    assert_eq!(param(&i.params, "tags").ty, Type::array(Type::String));
}

#[test]
fn function_arguments() {
    let i = infer_sql("SELECT lower($name), util.slug($title)");
    assert_eq!(
        param(&i.params, "name").ty,
        Type::LoadFunctionArgument {
            schema: None,
            name: "lower".into(),
            index: 0
        }
    );
    assert_eq!(
        param(&i.params, "title").ty,
        Type::LoadFunctionArgument {
            schema: Some("util".into()),
            name: "slug".into(),
            index: 0
        }
    );
}

#[test]
fn coalesce_parameter_takes_other_arguments() {
    let i = infer_sql("SELECT COALESCE(nickname, $fallback) FROM users");
    assert_eq!(i.params[0].ty, column("users", "nickname"));
}

#[test]
fn boolean_positions() {
    let i = infer_sql("SELECT CASE WHEN $flag THEN 1 ELSE 0 END WHERE NOT $off AND $on");
    assert_eq!(param(&i.params, "flag").ty, Type::Boolean);
    assert_eq!(param(&i.params, "off").ty, Type::Boolean);
    assert_eq!(param(&i.params, "on").ty, Type::Boolean);
}

#[test]
fn json_keys_and_paths() {
    let i = infer_sql("SELECT data ->> $key, data #> $path FROM docs");
    assert_eq!(param(&i.params, "key").ty, Type::String);
    assert_eq!(param(&i.params, "path").ty, Type::array(Type::String));
}

#[test]
fn unary_minus_is_numeric() {
    let i = infer_sql("SELECT -$n");
    assert_eq!(i.params[0].ty, Type::Number);
}

// ===================================================================
// DML
// ===================================================================

#[test]
fn insert_values_row() {
    let i = infer_sql("INSERT INTO books (title, pages) VALUES ($title!, $pages)");
    assert_eq!(param(&i.params, "title").ty, column("books", "title"));
    assert!(param(&i.params, "title").required);
    assert_eq!(param(&i.params, "pages").ty, column("books", "pages"));
}

#[test]
fn insert_spread_pick() {
    let i = infer_sql("INSERT INTO books (title, pages) VALUES $$books(title, pages)");
    let books = &i.params[0];
    assert!(books.spread);
    assert_eq!(books.pick, vec!["title", "pages"]);
    assert_eq!(
        books.ty,
        Type::array(Type::object([
            ("title".to_string(), column("books", "title")),
            ("pages".to_string(), column("books", "pages")),
        ]))
    );
}

#[test]
fn insert_pick_beyond_column_list() {
    let i = infer_sql("INSERT INTO books (title) VALUES $book(title, author)");
    assert_eq!(
        i.params[0].ty,
        Type::object([
            ("title".to_string(), column("books", "title")),
            ("author".to_string(), column("books", "author")),
        ])
    );
}

#[test]
fn insert_on_conflict_excluded() {
    let i = infer_sql(
        "INSERT INTO users (email, name) VALUES ($email, $name) \
         ON CONFLICT (email) DO UPDATE SET name = EXCLUDED.name || $suffix",
    );
    assert_eq!(param(&i.params, "suffix").ty, column("users", "name"));
}

#[test]
fn update_set_and_where() {
    let i = infer_sql("UPDATE users AS u SET name = $name, score = score + $delta WHERE u.id = $id");
    assert_eq!(param(&i.params, "name").ty, column("users", "name"));
    assert_eq!(param(&i.params, "delta").ty, column("users", "score"));
    assert_eq!(param(&i.params, "id").ty, column("users", "id"));
}

#[test]
fn update_multi_column_assignment() {
    let i = infer_sql("UPDATE users SET (name, age) = ($name, $age)");
    assert_eq!(param(&i.params, "name").ty, column("users", "name"));
    assert_eq!(param(&i.params, "age").ty, column("users", "age"));
}

#[test]
fn update_multi_column_arity_mismatch() {
    // The parser rejects this shape; a tree built by hand still gets an error.
    let mut update = parse_update("UPDATE users SET (name, age) = ROW($name, $age)");
    let Some(SetClause::Map {
        source: SetMapSource::Row(row),
        ..
    }) = update.set.first_mut()
    else {
        panic!("Expected a row assignment");
    };
    row.items.pop();
    let err = infer(&Statement::Update(update)).unwrap_err();
    assert!(matches!(err, InferError::UnsupportedShape { .. }));
}

#[test]
fn delete_using() {
    let i = infer_sql(
        "DELETE FROM orders AS o USING users AS u WHERE o.user_id = u.id AND u.email = $email",
    );
    assert_eq!(i.params[0].ty, column("users", "email"));
}

#[test]
fn cte_parameters() {
    let i = infer_sql(
        "WITH recent AS (SELECT * FROM orders WHERE created_at > $since) \
         SELECT * FROM recent LIMIT $n",
    );
    assert_eq!(param(&i.params, "since").ty, column("orders", "created_at"));
    assert_eq!(param(&i.params, "n").ty, Type::Number);
}
