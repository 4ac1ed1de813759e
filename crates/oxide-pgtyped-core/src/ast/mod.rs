//! Abstract Syntax Tree (AST) types for Postgres statements.
//!
//! Every node carries the [`Span`](crate::runtime::Span) of the text it was
//! parsed from. `Display` renders a node back to single-line SQL.

mod display;
mod expression;
mod statement;
mod types;
pub mod visit;

pub use expression::{
    ArrayExpr, ArrayIndex, ArrayItems, BetweenExpr, BinaryExpr, BinaryOp, Builtin, BuiltinKind,
    Case, CaseSimple, Cast, ColumnRef, Conditional, ConditionalKind, Expr, Extract, FunctionCall,
    Ident, InSubquery, Literal, LiteralKind, Nullif, Parameter, ParameterKind, ParameterStyle,
    Paren, QuantifiedExpr, QuantifiedSubject, Quantifier, RowCompare, RowExpr, StarRef, Subquery,
    UnaryExpr, UnaryOp, WhenClause, WindowSpec,
};
pub use statement::{
    Combination, ConflictAction, ConflictTarget, Cte, DeleteStatement, Distinct, FromItem,
    FromSource, InsertSource, InsertStatement, Join, JoinCondition, JoinType, NullOrdering,
    OnConflict, OrderBy, OrderDirection, SelectCore, SelectItem, SelectStatement, SetClause,
    SetMapSource, SetOperator, Statement, TableName, UpdateStatement, ValuesItem, WithStatement,
};
pub use types::DataType;
