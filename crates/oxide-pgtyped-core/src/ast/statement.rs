//! SQL statement AST types.

use super::expression::{Expr, Ident, Parameter, RowExpr, StarRef};
use crate::runtime::Span;

/// Order direction for ORDER BY.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderDirection {
    /// Ascending order.
    Asc,
    /// Descending order.
    Desc,
}

impl OrderDirection {
    /// Returns the SQL representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Null ordering for ORDER BY.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NullOrdering {
    /// NULLs come first.
    First,
    /// NULLs come last.
    Last,
}

impl NullOrdering {
    /// Returns the SQL representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::First => "NULLS FIRST",
            Self::Last => "NULLS LAST",
        }
    }
}

/// An ORDER BY clause entry.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    /// The expression to order by.
    pub expr: Expr,
    /// The direction, when written.
    pub direction: Option<OrderDirection>,
    /// Null ordering, when written.
    pub nulls: Option<NullOrdering>,
    /// Source span.
    pub span: Span,
}

/// Join type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinType {
    /// INNER JOIN.
    Inner,
    /// LEFT OUTER JOIN.
    Left,
    /// RIGHT OUTER JOIN.
    Right,
    /// FULL OUTER JOIN.
    Full,
    /// CROSS JOIN.
    Cross,
}

impl JoinType {
    /// Returns the SQL representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Inner => "INNER JOIN",
            Self::Left => "LEFT JOIN",
            Self::Right => "RIGHT JOIN",
            Self::Full => "FULL JOIN",
            Self::Cross => "CROSS JOIN",
        }
    }
}

/// The join condition.
#[derive(Debug, Clone, PartialEq)]
pub enum JoinCondition {
    /// `ON expr`
    On(Expr),
    /// `USING (a, b)`
    Using(Vec<Ident>),
}

/// A JOIN clause.
#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    /// The type of join.
    pub join_type: JoinType,
    /// `NATURAL` join.
    pub natural: bool,
    /// The joined source.
    pub source: FromSource,
    /// ON / USING, absent for CROSS and NATURAL joins.
    pub condition: Option<JoinCondition>,
    /// Source span.
    pub span: Span,
}

/// A possibly schema-qualified table name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableName {
    /// Schema name.
    pub schema: Option<Ident>,
    /// Table name.
    pub name: Ident,
    /// Source span.
    pub span: Span,
}

/// A table expression in FROM, UPDATE ... FROM or DELETE ... USING.
#[derive(Debug, Clone, PartialEq)]
pub enum FromSource {
    /// A table, view or CTE name.
    Table {
        /// The table.
        table: TableName,
        /// Alias.
        alias: Option<Ident>,
    },
    /// A subquery.
    Subquery {
        /// The subquery.
        query: Box<SelectStatement>,
        /// Alias.
        alias: Ident,
        /// Source span, parentheses included.
        span: Span,
    },
}

impl FromSource {
    /// Returns the name the source is visible under in the query.
    #[must_use]
    pub fn visible_name(&self) -> &Ident {
        match self {
            Self::Table { table, alias } => alias.as_ref().unwrap_or(&table.name),
            Self::Subquery { alias, .. } => alias,
        }
    }
}

/// A comma-separated FROM entry with its join chain.
#[derive(Debug, Clone, PartialEq)]
pub struct FromItem {
    /// The leading source.
    pub source: FromSource,
    /// Joins applied left to right.
    pub joins: Vec<Join>,
    /// Source span.
    pub span: Span,
}

/// An entry of a SELECT or RETURNING list.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectItem {
    /// `expr [AS alias]`
    Expr {
        /// The expression.
        expr: Expr,
        /// Column alias.
        alias: Option<Ident>,
        /// Source span.
        span: Span,
    },
    /// `*` / `t.*`
    Star(StarRef),
}

/// `DISTINCT` or `DISTINCT ON (...)`.
#[derive(Debug, Clone, PartialEq)]
pub enum Distinct {
    /// `DISTINCT`
    All,
    /// `DISTINCT ON (a, b)`
    On(Vec<Expr>),
}

/// One SELECT block, without set operations or ordering.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectCore {
    /// DISTINCT clause.
    pub distinct: Option<Distinct>,
    /// The projected columns.
    pub columns: Vec<SelectItem>,
    /// The FROM clause.
    pub from: Vec<FromItem>,
    /// The WHERE clause.
    pub where_clause: Option<Expr>,
    /// GROUP BY expressions.
    pub group_by: Vec<Expr>,
    /// HAVING clause.
    pub having: Option<Expr>,
    /// Source span.
    pub span: Span,
}

/// Set operation joining SELECT blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOperator {
    Union,
    UnionAll,
    Intersect,
    IntersectAll,
    Except,
    ExceptAll,
}

impl SetOperator {
    /// Returns the SQL representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Union => "UNION",
            Self::UnionAll => "UNION ALL",
            Self::Intersect => "INTERSECT",
            Self::IntersectAll => "INTERSECT ALL",
            Self::Except => "EXCEPT",
            Self::ExceptAll => "EXCEPT ALL",
        }
    }
}

/// `UNION [ALL] SELECT ...` and friends.
#[derive(Debug, Clone, PartialEq)]
pub struct Combination {
    /// The set operator.
    pub op: SetOperator,
    /// The combined block.
    pub select: SelectCore,
    /// Source span.
    pub span: Span,
}

/// A SELECT statement.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectStatement {
    /// The first SELECT block.
    pub core: SelectCore,
    /// Set operations, left to right.
    pub combinations: Vec<Combination>,
    /// ORDER BY clauses.
    pub order_by: Vec<OrderBy>,
    /// LIMIT clause.
    pub limit: Option<Expr>,
    /// OFFSET clause.
    pub offset: Option<Expr>,
    /// Source span.
    pub span: Span,
}

impl SelectStatement {
    /// Returns all SELECT blocks, the first one included.
    pub fn cores(&self) -> impl Iterator<Item = &SelectCore> {
        std::iter::once(&self.core).chain(self.combinations.iter().map(|c| &c.select))
    }
}

/// An assignment in UPDATE SET or ON CONFLICT DO UPDATE SET.
#[derive(Debug, Clone, PartialEq)]
pub enum SetClause {
    /// `column = value`
    Item {
        /// Column name.
        column: Ident,
        /// Value expression.
        value: Expr,
        /// Source span.
        span: Span,
    },
    /// `(a, b) = ROW(...)` / `(a, b) = (SELECT ...)`
    Map {
        /// Column names.
        columns: Vec<Ident>,
        /// Value source.
        source: SetMapSource,
        /// Source span.
        span: Span,
    },
}

/// Right-hand side of a multi-column SET.
#[derive(Debug, Clone, PartialEq)]
pub enum SetMapSource {
    /// `ROW(a, b)` or `(a, b)`
    Row(RowExpr),
    /// `(SELECT a, b ...)`
    Subquery(Box<SelectStatement>),
}

/// An UPDATE statement.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateStatement {
    /// Target table.
    pub table: TableName,
    /// Alias.
    pub alias: Option<Ident>,
    /// SET assignments.
    pub set: Vec<SetClause>,
    /// FROM clause.
    pub from: Vec<FromItem>,
    /// WHERE clause.
    pub where_clause: Option<Expr>,
    /// RETURNING list.
    pub returning: Vec<SelectItem>,
    /// Source span.
    pub span: Span,
}

/// A DELETE statement.
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteStatement {
    /// Target table.
    pub table: TableName,
    /// Alias.
    pub alias: Option<Ident>,
    /// USING clause.
    pub using: Vec<FromItem>,
    /// WHERE clause.
    pub where_clause: Option<Expr>,
    /// RETURNING list.
    pub returning: Vec<SelectItem>,
    /// Source span.
    pub span: Span,
}

/// One entry of a VALUES list.
#[derive(Debug, Clone, PartialEq)]
pub enum ValuesItem {
    /// `(a, b, c)`
    Row {
        /// The values.
        values: Vec<Expr>,
        /// Source span.
        span: Span,
    },
    /// A parameter standing for one row or, when spread, many rows.
    Parameter(Parameter),
}

/// Source of data for INSERT.
#[derive(Debug, Clone, PartialEq)]
pub enum InsertSource {
    /// VALUES (...), (...), ...
    Values(Vec<ValuesItem>),
    /// SELECT ...
    Select(Box<SelectStatement>),
    /// DEFAULT VALUES
    DefaultValues,
}

/// ON CONFLICT target.
#[derive(Debug, Clone, PartialEq)]
pub enum ConflictTarget {
    /// `(a, b)`
    Columns(Vec<Ident>),
    /// `ON CONSTRAINT name`
    Constraint(Ident),
}

/// Action to take on conflict.
#[derive(Debug, Clone, PartialEq)]
pub enum ConflictAction {
    /// DO NOTHING
    DoNothing,
    /// DO UPDATE SET ... [WHERE ...]
    DoUpdate {
        /// Assignments.
        set: Vec<SetClause>,
        /// Condition.
        where_clause: Option<Expr>,
    },
}

/// ON CONFLICT clause for UPSERT.
#[derive(Debug, Clone, PartialEq)]
pub struct OnConflict {
    /// Conflict target.
    pub target: Option<ConflictTarget>,
    /// Action to take on conflict.
    pub action: ConflictAction,
    /// Source span.
    pub span: Span,
}

/// An INSERT statement.
#[derive(Debug, Clone, PartialEq)]
pub struct InsertStatement {
    /// Target table.
    pub table: TableName,
    /// Alias.
    pub alias: Option<Ident>,
    /// Column names (optional).
    pub columns: Vec<Ident>,
    /// Values to insert.
    pub source: InsertSource,
    /// ON CONFLICT clause (for UPSERT).
    pub on_conflict: Option<OnConflict>,
    /// RETURNING list.
    pub returning: Vec<SelectItem>,
    /// Source span.
    pub span: Span,
}

/// A named subquery in WITH.
#[derive(Debug, Clone, PartialEq)]
pub struct Cte {
    /// CTE name.
    pub name: Ident,
    /// Optional column renames.
    pub columns: Vec<Ident>,
    /// The defining statement.
    pub query: Statement,
    /// Source span.
    pub span: Span,
}

/// `WITH [RECURSIVE] name AS (...), ... statement`
#[derive(Debug, Clone, PartialEq)]
pub struct WithStatement {
    /// `WITH RECURSIVE`
    pub recursive: bool,
    /// The CTEs, in order.
    pub ctes: Vec<Cte>,
    /// The terminal statement.
    pub body: Box<Statement>,
    /// Source span.
    pub span: Span,
}

/// A SQL statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// SELECT statement.
    Select(SelectStatement),
    /// INSERT statement.
    Insert(InsertStatement),
    /// UPDATE statement.
    Update(UpdateStatement),
    /// DELETE statement.
    Delete(DeleteStatement),
    /// WITH statement.
    With(WithStatement),
}

impl Statement {
    /// Returns the source span of the statement.
    #[must_use]
    pub const fn span(&self) -> Span {
        match self {
            Self::Select(s) => s.span,
            Self::Insert(s) => s.span,
            Self::Update(s) => s.span,
            Self::Delete(s) => s.span,
            Self::With(s) => s.span,
        }
    }

    /// Returns the statement keyword, for diagnostics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Select(_) => "SELECT",
            Self::Insert(_) => "INSERT",
            Self::Update(_) => "UPDATE",
            Self::Delete(_) => "DELETE",
            Self::With(_) => "WITH",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_direction() {
        assert_eq!(OrderDirection::Asc.as_str(), "ASC");
        assert_eq!(OrderDirection::Desc.as_str(), "DESC");
    }

    #[test]
    fn test_join_type() {
        assert_eq!(JoinType::Inner.as_str(), "INNER JOIN");
        assert_eq!(JoinType::Left.as_str(), "LEFT JOIN");
    }

    #[test]
    fn test_visible_name_prefers_alias() {
        let table = TableName {
            schema: None,
            name: Ident::new("users", Span::default()),
            span: Span::default(),
        };
        let plain = FromSource::Table {
            table: table.clone(),
            alias: None,
        };
        assert_eq!(plain.visible_name().value, "users");
        let aliased = FromSource::Table {
            table,
            alias: Some(Ident::new("u", Span::default())),
        };
        assert_eq!(aliased.visible_name().value, "u");
    }
}
