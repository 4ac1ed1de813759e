//! # oxide-pgtyped-core
//!
//! A PostgreSQL query parser and static type inference for typed query
//! bindings.
//!
//! This crate provides:
//! - A backtracking combinator parser for Postgres SELECT, INSERT, UPDATE,
//!   DELETE and WITH statements, extended with named parameters
//! - A typed AST with a source span on every node
//! - Type inference deriving the parameter and result contract of a
//!   statement from its text alone
//! - Schema refinement resolving column, function and user type
//!   placeholders
//! - Parameter binding that rewrites named parameters to `$1..$n`
//!
//! ## Parameters
//!
//! | Syntax | Meaning |
//! |---|---|
//! | `$name`, `:name` | a single value |
//! | `$name!` | a value that must not be null |
//! | `$$name` | a list, expanded to `($1, $2, ...)` |
//! | `$name(a, b)` | an object, expanded to `($1, $2)` |
//! | `$$name(a, b)` | a list of objects, expanded to `($1, $2), ($3, $4)` |
//!
//! ## Inference
//!
//! ```rust
//! use oxide_pgtyped_core::{infer, parse, Type};
//!
//! let parsed = parse("SELECT id, name FROM users WHERE email = $email LIMIT $limit").unwrap();
//! let interface = infer(&parsed.statement).unwrap();
//!
//! assert_eq!(interface.params[0].name, "email");
//! assert!(matches!(&interface.params[0].ty, Type::LoadColumn { column, .. } if column == "email"));
//! assert_eq!(interface.params[1].ty, Type::Number);
//! assert_eq!(interface.results[1].name, "name");
//! ```
//!
//! ## Refinement
//!
//! Placeholder types are resolved against a schema:
//!
//! ```rust
//! use oxide_pgtyped_core::schema::{refine, StaticSchema};
//! use oxide_pgtyped_core::{infer, parse, Type};
//!
//! let schema = StaticSchema::from_json(r#"{"tables": [{"name": "users", "columns": [
//!     {"name": "id", "type": "int8"},
//!     {"name": "email", "type": "text", "nullable": true}
//! ]}]}"#).unwrap();
//!
//! let parsed = parse("SELECT * FROM users WHERE id = $id").unwrap();
//! let interface = refine(infer(&parsed.statement).unwrap(), &schema);
//!
//! assert_eq!(interface.params[0].ty, Type::Number);
//! assert_eq!(interface.results.len(), 2);
//! assert_eq!(interface.results[1].ty, Type::union([Type::String, Type::Null]));
//! ```

pub mod ast;
pub mod infer;
pub mod parser;
pub mod query;
pub mod runtime;
pub mod schema;

pub use ast::{Expr, Statement};
pub use infer::{
    infer, infer_with, InferError, InferOptions, Param, QueryInterface, ResultColumn, Type,
};
pub use parser::{parse, ParseError, ParsedSql};
pub use query::{to_query_config, QueryConfig, QueryError};
pub use schema::{refine, SchemaLoader, StaticSchema};
