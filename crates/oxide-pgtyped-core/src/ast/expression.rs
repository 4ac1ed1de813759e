//! Expression AST types.

use super::{DataType, OrderBy, SelectStatement};
use crate::runtime::Span;

/// An identifier. Unquoted identifiers fold to lower case in Postgres;
/// quoted ones keep their spelling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    /// The identifier as written, without quotes.
    pub value: String,
    /// Whether it was written in double quotes.
    pub quoted: bool,
    /// Source span.
    pub span: Span,
}

impl Ident {
    /// Creates an unquoted identifier.
    #[must_use]
    pub fn new(value: impl Into<String>, span: Span) -> Self {
        Self {
            value: value.into(),
            quoted: false,
            span,
        }
    }

    /// Returns the name Postgres resolves this identifier to.
    #[must_use]
    pub fn normalized(&self) -> String {
        if self.quoted {
            self.value.clone()
        } else {
            self.value.to_lowercase()
        }
    }
}

/// A possibly qualified column reference: `name`, `table.name` or
/// `schema.table.name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRef {
    /// Schema qualifier.
    pub schema: Option<Ident>,
    /// Table name or alias.
    pub table: Option<Ident>,
    /// Column name.
    pub name: Ident,
    /// Source span.
    pub span: Span,
}

/// A star projection: `*`, `table.*` or `schema.table.*`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StarRef {
    /// Schema qualifier.
    pub schema: Option<Ident>,
    /// Table name or alias.
    pub table: Option<Ident>,
    /// Source span.
    pub span: Span,
}

/// The lexical form of a literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LiteralKind {
    /// `'text'`
    String,
    /// `E'text\n'`
    EscapeString,
    /// `$tag$text$tag$`
    DollarString {
        /// The tag between the dollar signs (may be empty).
        tag: String,
    },
    /// `B'0101'`
    BitString,
    /// `X'ff'`
    HexString,
    /// `42`
    Integer,
    /// `4.2`, `1e10`
    Decimal,
    /// `TRUE` / `FALSE`
    Boolean,
    /// `NULL`
    Null,
}

/// A literal value. For strings `value` is the unescaped content, for
/// numbers the digits as written, for booleans `true`/`false`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Literal {
    /// The lexical form.
    pub kind: LiteralKind,
    /// The value text.
    pub value: String,
    /// Source span.
    pub span: Span,
}

/// Whether a parameter binds one value or a list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterKind {
    /// `$name`, `:name`
    Single,
    /// `$$name`
    Spread,
}

/// How a parameter was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterStyle {
    /// `$name`
    Dollar,
    /// `:name`
    Colon,
}

/// A named query parameter: `$name`, `:name`, `$name!`, `$$name`,
/// `$$name(f1, f2)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    /// Parameter name.
    pub name: String,
    /// Single value or spread list.
    pub kind: ParameterKind,
    /// Written with a trailing `!`: the bound value must not be null.
    pub required: bool,
    /// Fields destructured from each bound object, in order.
    pub pick: Vec<Ident>,
    /// Sigil used.
    pub style: ParameterStyle,
    /// Source span.
    pub span: Span,
}

impl Parameter {
    /// Returns true for `$$name` parameters.
    #[must_use]
    pub const fn is_spread(&self) -> bool {
        matches!(self.kind, ParameterKind::Spread)
    }
}

/// Binary operators, grouped by precedence level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    // Logical
    Or,
    And,

    // Equality
    Eq,
    NotEq,

    // Ordering
    Lt,
    LtEq,
    Gt,
    GtEq,

    // Pattern matching
    Like,
    NotLike,
    ILike,
    NotILike,

    // Membership
    In,
    NotIn,

    // IS family
    Is,
    IsNot,
    IsDistinctFrom,
    IsNotDistinctFrom,

    // Full text search
    TextSearch,

    // Bitwise and regular expressions
    RightShift,
    LeftShift,
    RegexMatch,
    RegexIMatch,
    NotRegexMatch,
    NotRegexIMatch,
    BitXor,
    BitAnd,
    BitOr,

    // String / array concatenation
    Concat,

    // JSON and array containment
    JsonGetText,
    JsonGet,
    JsonPathText,
    JsonPath,
    Contains,
    ContainedBy,
    JsonAnyKey,
    JsonAllKeys,
    JsonHasKey,
    JsonDeletePath,

    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
}

impl BinaryOp {
    /// Returns the SQL representation of the operator.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Or => "OR",
            Self::And => "AND",
            Self::Eq => "=",
            Self::NotEq => "<>",
            Self::Lt => "<",
            Self::LtEq => "<=",
            Self::Gt => ">",
            Self::GtEq => ">=",
            Self::Like => "LIKE",
            Self::NotLike => "NOT LIKE",
            Self::ILike => "ILIKE",
            Self::NotILike => "NOT ILIKE",
            Self::In => "IN",
            Self::NotIn => "NOT IN",
            Self::Is => "IS",
            Self::IsNot => "IS NOT",
            Self::IsDistinctFrom => "IS DISTINCT FROM",
            Self::IsNotDistinctFrom => "IS NOT DISTINCT FROM",
            Self::TextSearch => "@@",
            Self::RightShift => ">>",
            Self::LeftShift => "<<",
            Self::RegexMatch => "~",
            Self::RegexIMatch => "~*",
            Self::NotRegexMatch => "!~",
            Self::NotRegexIMatch => "!~*",
            Self::BitXor => "#",
            Self::BitAnd => "&",
            Self::BitOr => "|",
            Self::Concat => "||",
            Self::JsonGetText => "->>",
            Self::JsonGet => "->",
            Self::JsonPathText => "#>>",
            Self::JsonPath => "#>",
            Self::Contains => "@>",
            Self::ContainedBy => "<@",
            Self::JsonAnyKey => "?|",
            Self::JsonAllKeys => "?&",
            Self::JsonHasKey => "?",
            Self::JsonDeletePath => "#-",
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Mod => "%",
            Self::Pow => "^",
        }
    }

    /// Returns the precedence level of the operator (higher = binds tighter).
    #[must_use]
    pub const fn precedence(&self) -> u8 {
        match self {
            Self::Or => 1,
            Self::And => 2,
            Self::Eq | Self::NotEq => 3,
            Self::Lt | Self::LtEq | Self::Gt | Self::GtEq => 4,
            Self::Like | Self::NotLike | Self::ILike | Self::NotILike => 5,
            Self::In | Self::NotIn => 6,
            Self::Is | Self::IsNot | Self::IsDistinctFrom | Self::IsNotDistinctFrom => 7,
            Self::TextSearch => 8,
            Self::RightShift
            | Self::LeftShift
            | Self::RegexMatch
            | Self::RegexIMatch
            | Self::NotRegexMatch
            | Self::NotRegexIMatch
            | Self::BitXor
            | Self::BitAnd
            | Self::BitOr => 9,
            Self::Concat => 10,
            Self::JsonGetText
            | Self::JsonGet
            | Self::JsonPathText
            | Self::JsonPath
            | Self::Contains
            | Self::ContainedBy
            | Self::JsonAnyKey
            | Self::JsonAllKeys
            | Self::JsonHasKey
            | Self::JsonDeletePath => 11,
            Self::Add | Self::Sub => 12,
            Self::Mul | Self::Div | Self::Mod => 13,
            Self::Pow => 14,
        }
    }

    /// Returns true for operators whose result is always boolean.
    #[must_use]
    pub const fn is_predicate(&self) -> bool {
        matches!(
            self,
            Self::Or
                | Self::And
                | Self::Eq
                | Self::NotEq
                | Self::Lt
                | Self::LtEq
                | Self::Gt
                | Self::GtEq
                | Self::Like
                | Self::NotLike
                | Self::ILike
                | Self::NotILike
                | Self::In
                | Self::NotIn
                | Self::Is
                | Self::IsNot
                | Self::IsDistinctFrom
                | Self::IsNotDistinctFrom
                | Self::TextSearch
                | Self::RegexMatch
                | Self::RegexIMatch
                | Self::NotRegexMatch
                | Self::NotRegexIMatch
                | Self::Contains
                | Self::ContainedBy
                | Self::JsonAnyKey
                | Self::JsonAllKeys
                | Self::JsonHasKey
        )
    }
}

/// Unary prefix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// `+`
    Plus,
    /// `-`
    Neg,
    /// `NOT`
    Not,
    /// `ISNULL`
    IsNull,
    /// `NOTNULL`
    NotNull,
}

impl UnaryOp {
    /// Returns the SQL representation of the operator.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Plus => "+",
            Self::Neg => "-",
            Self::Not => "NOT",
            Self::IsNull => "ISNULL",
            Self::NotNull => "NOTNULL",
        }
    }
}

/// `left op right`
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryExpr {
    pub left: Expr,
    pub op: BinaryOp,
    pub right: Expr,
    pub span: Span,
}

/// `op operand`
#[derive(Debug, Clone, PartialEq)]
pub struct UnaryExpr {
    pub op: UnaryOp,
    pub operand: Expr,
    pub span: Span,
}

/// `expr [NOT] BETWEEN [SYMMETRIC] low AND high`
#[derive(Debug, Clone, PartialEq)]
pub struct BetweenExpr {
    pub expr: Expr,
    pub negated: bool,
    pub symmetric: bool,
    pub low: Expr,
    pub high: Expr,
    pub span: Span,
}

/// `target[index]` or the slice `target[index:upper]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayIndex {
    pub target: Expr,
    pub index: Expr,
    pub upper: Option<Expr>,
    pub span: Span,
}

/// Element source of an `ARRAY` constructor.
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayItems {
    /// `ARRAY[a, b]`
    List(Vec<Expr>),
    /// `ARRAY(SELECT ...)`
    Subquery(Box<SelectStatement>),
}

/// `ARRAY[...]` / `ARRAY(SELECT ...)`
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayExpr {
    pub items: ArrayItems,
    pub span: Span,
}

/// A row constructor: `ROW(a, b)` or `(a, b)`.
#[derive(Debug, Clone, PartialEq)]
pub struct RowExpr {
    pub items: Vec<Expr>,
    /// Written with the `ROW` keyword.
    pub explicit: bool,
    pub span: Span,
}

/// A parenthesized subquery used as a value.
#[derive(Debug, Clone, PartialEq)]
pub struct Subquery {
    pub query: SelectStatement,
    pub span: Span,
}

/// `expr [NOT] IN (SELECT ...)`
#[derive(Debug, Clone, PartialEq)]
pub struct InSubquery {
    pub expr: Expr,
    pub negated: bool,
    pub query: SelectStatement,
    pub span: Span,
}

/// `ANY`, `SOME` or `ALL`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantifier {
    Any,
    Some,
    All,
}

impl Quantifier {
    /// Returns the SQL representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Any => "ANY",
            Self::Some => "SOME",
            Self::All => "ALL",
        }
    }
}

/// What a quantified comparison ranges over.
#[derive(Debug, Clone, PartialEq)]
pub enum QuantifiedSubject {
    /// `ANY(SELECT ...)`
    Subquery(Box<SelectStatement>),
    /// `ANY(array_expression)`
    Array(Expr),
}

/// `left op ANY|SOME|ALL (...)`
#[derive(Debug, Clone, PartialEq)]
pub struct QuantifiedExpr {
    pub left: Expr,
    pub op: BinaryOp,
    pub quantifier: Quantifier,
    pub subject: QuantifiedSubject,
    pub span: Span,
}

/// `(a, b) op (SELECT x, y ...)`
#[derive(Debug, Clone, PartialEq)]
pub struct RowCompare {
    pub row: RowExpr,
    pub op: BinaryOp,
    pub query: SelectStatement,
    pub span: Span,
}

/// SQL value functions written without parentheses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinKind {
    CurrentDate,
    CurrentTime,
    CurrentTimestamp,
    LocalTime,
    LocalTimestamp,
    CurrentUser,
    SessionUser,
    CurrentRole,
    CurrentCatalog,
    CurrentSchema,
    User,
}

impl BuiltinKind {
    /// All builtins with their keyword, longest keyword first where one
    /// prefixes another.
    pub const ALL: [(&'static str, Self); 11] = [
        ("CURRENT_DATE", Self::CurrentDate),
        ("CURRENT_TIMESTAMP", Self::CurrentTimestamp),
        ("CURRENT_TIME", Self::CurrentTime),
        ("LOCALTIMESTAMP", Self::LocalTimestamp),
        ("LOCALTIME", Self::LocalTime),
        ("CURRENT_USER", Self::CurrentUser),
        ("SESSION_USER", Self::SessionUser),
        ("CURRENT_ROLE", Self::CurrentRole),
        ("CURRENT_CATALOG", Self::CurrentCatalog),
        ("CURRENT_SCHEMA", Self::CurrentSchema),
        ("USER", Self::User),
    ];

    /// Returns the SQL representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::CurrentDate => "CURRENT_DATE",
            Self::CurrentTime => "CURRENT_TIME",
            Self::CurrentTimestamp => "CURRENT_TIMESTAMP",
            Self::LocalTime => "LOCALTIME",
            Self::LocalTimestamp => "LOCALTIMESTAMP",
            Self::CurrentUser => "CURRENT_USER",
            Self::SessionUser => "SESSION_USER",
            Self::CurrentRole => "CURRENT_ROLE",
            Self::CurrentCatalog => "CURRENT_CATALOG",
            Self::CurrentSchema => "CURRENT_SCHEMA",
            Self::User => "USER",
        }
    }
}

/// A no-parenthesis builtin such as `CURRENT_DATE`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Builtin {
    pub kind: BuiltinKind,
    pub span: Span,
}

/// `NULLIF(value, other)`
#[derive(Debug, Clone, PartialEq)]
pub struct Nullif {
    pub value: Expr,
    pub other: Expr,
    pub span: Span,
}

/// The variadic conditional functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionalKind {
    Coalesce,
    Greatest,
    Least,
}

impl ConditionalKind {
    /// Returns the SQL representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Coalesce => "COALESCE",
            Self::Greatest => "GREATEST",
            Self::Least => "LEAST",
        }
    }
}

/// `COALESCE(...)`, `GREATEST(...)`, `LEAST(...)`
#[derive(Debug, Clone, PartialEq)]
pub struct Conditional {
    pub kind: ConditionalKind,
    pub args: Vec<Expr>,
    pub span: Span,
}

/// One `WHEN condition THEN result` arm.
#[derive(Debug, Clone, PartialEq)]
pub struct WhenClause {
    pub condition: Expr,
    pub result: Expr,
    pub span: Span,
}

/// `CASE operand WHEN value THEN result ... [ELSE result] END`
#[derive(Debug, Clone, PartialEq)]
pub struct CaseSimple {
    pub operand: Expr,
    pub whens: Vec<WhenClause>,
    pub else_result: Option<Expr>,
    pub span: Span,
}

/// `CASE WHEN condition THEN result ... [ELSE result] END`
#[derive(Debug, Clone, PartialEq)]
pub struct Case {
    pub whens: Vec<WhenClause>,
    pub else_result: Option<Expr>,
    pub span: Span,
}

/// A cast: `CAST(value AS type)` or `value::type`.
#[derive(Debug, Clone, PartialEq)]
pub struct Cast {
    pub value: Expr,
    pub data_type: DataType,
    pub span: Span,
}

/// `EXTRACT(field FROM source)`
#[derive(Debug, Clone, PartialEq)]
pub struct Extract {
    pub field: Ident,
    pub source: Expr,
    pub span: Span,
}

/// `OVER (PARTITION BY ... ORDER BY ...)`
#[derive(Debug, Clone, PartialEq)]
pub struct WindowSpec {
    pub partition_by: Vec<Expr>,
    pub order_by: Vec<OrderBy>,
    pub span: Span,
}

/// A function call.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCall {
    /// Schema qualifier.
    pub schema: Option<Ident>,
    /// The function name.
    pub name: Ident,
    /// Whether DISTINCT was specified.
    pub distinct: bool,
    /// Called as `name(*)`.
    pub star: bool,
    /// The arguments.
    pub args: Vec<Expr>,
    /// `ORDER BY` inside the argument list, for ordered aggregates.
    pub order_by: Vec<OrderBy>,
    /// `FILTER (WHERE ...)`
    pub filter: Option<Expr>,
    /// `OVER (...)`
    pub over: Option<WindowSpec>,
    pub span: Span,
}

/// A parenthesized expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Paren {
    pub expr: Expr,
    pub span: Span,
}

/// An SQL expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A literal value.
    Literal(Literal),
    /// A column reference.
    Column(ColumnRef),
    /// A query parameter.
    Parameter(Parameter),
    /// `DEFAULT` in a VALUES row or SET clause.
    Default(Span),
    /// A binary expression.
    Binary(Box<BinaryExpr>),
    /// A unary expression.
    Unary(Box<UnaryExpr>),
    /// BETWEEN expression.
    Between(Box<BetweenExpr>),
    /// Array subscript or slice.
    ArrayIndex(Box<ArrayIndex>),
    /// ARRAY constructor.
    Array(ArrayExpr),
    /// Row constructor.
    Row(RowExpr),
    /// `EXISTS (SELECT ...)`
    Exists(Box<Subquery>),
    /// `expr IN (SELECT ...)`
    InSubquery(Box<InSubquery>),
    /// `expr op ANY (...)`
    Quantified(Box<QuantifiedExpr>),
    /// `(a, b) op (SELECT ...)`
    RowCompare(Box<RowCompare>),
    /// `CURRENT_DATE` and friends.
    Builtin(Builtin),
    /// `NULLIF(a, b)`
    Nullif(Box<Nullif>),
    /// `COALESCE`, `GREATEST`, `LEAST`.
    Conditional(Conditional),
    /// CASE with an operand.
    CaseSimple(Box<CaseSimple>),
    /// CASE with conditions.
    Case(Box<Case>),
    /// `CAST(value AS type)`
    Cast(Box<Cast>),
    /// `value::type`
    PgCast(Box<Cast>),
    /// `EXTRACT(field FROM source)`
    Extract(Box<Extract>),
    /// A function call.
    Function(Box<FunctionCall>),
    /// A scalar subquery.
    Subquery(Box<Subquery>),
    /// Parenthesized expression.
    Paren(Box<Paren>),
}

impl Expr {
    /// Returns the source span of the expression.
    #[must_use]
    pub const fn span(&self) -> Span {
        match self {
            Self::Literal(e) => e.span,
            Self::Column(e) => e.span,
            Self::Parameter(e) => e.span,
            Self::Default(span) => *span,
            Self::Binary(e) => e.span,
            Self::Unary(e) => e.span,
            Self::Between(e) => e.span,
            Self::ArrayIndex(e) => e.span,
            Self::Array(e) => e.span,
            Self::Row(e) => e.span,
            Self::Exists(e) | Self::Subquery(e) => e.span,
            Self::InSubquery(e) => e.span,
            Self::Quantified(e) => e.span,
            Self::RowCompare(e) => e.span,
            Self::Builtin(e) => e.span,
            Self::Nullif(e) => e.span,
            Self::Conditional(e) => e.span,
            Self::CaseSimple(e) => e.span,
            Self::Case(e) => e.span,
            Self::Cast(e) | Self::PgCast(e) => e.span,
            Self::Extract(e) => e.span,
            Self::Function(e) => e.span,
            Self::Paren(e) => e.span,
        }
    }

    /// Returns the cast payload of either cast form.
    #[must_use]
    pub fn as_cast(&self) -> Option<&Cast> {
        match self {
            Self::Cast(cast) | Self::PgCast(cast) => Some(cast),
            _ => None,
        }
    }

    /// Returns the parameter if this is a bare parameter.
    #[must_use]
    pub const fn as_parameter(&self) -> Option<&Parameter> {
        match self {
            Self::Parameter(param) => Some(param),
            _ => None,
        }
    }

    /// Returns the column if this is a bare column reference.
    #[must_use]
    pub const fn as_column(&self) -> Option<&ColumnRef> {
        match self {
            Self::Column(column) => Some(column),
            _ => None,
        }
    }

    /// Strips any number of enclosing parentheses.
    #[must_use]
    pub fn unparenthesized(&self) -> &Self {
        match self {
            Self::Paren(paren) => paren.expr.unparenthesized(),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binary_op_precedence() {
        assert!(BinaryOp::Mul.precedence() > BinaryOp::Add.precedence());
        assert!(BinaryOp::And.precedence() > BinaryOp::Or.precedence());
        assert!(BinaryOp::Eq.precedence() > BinaryOp::And.precedence());
        assert!(BinaryOp::JsonGet.precedence() < BinaryOp::Add.precedence());
        assert!(BinaryOp::Concat.precedence() < BinaryOp::JsonGet.precedence());
    }

    #[test]
    fn test_ident_normalized() {
        let plain = Ident::new("Users", Span::default());
        assert_eq!(plain.normalized(), "users");
        let quoted = Ident {
            quoted: true,
            ..plain
        };
        assert_eq!(quoted.normalized(), "Users");
    }

    #[test]
    fn test_as_cast_covers_both_forms() {
        let cast = Cast {
            value: Expr::Default(Span::default()),
            data_type: DataType::new("int", Span::default()),
            span: Span::default(),
        };
        assert!(Expr::Cast(Box::new(cast.clone())).as_cast().is_some());
        assert!(Expr::PgCast(Box::new(cast)).as_cast().is_some());
        assert!(Expr::Default(Span::default()).as_cast().is_none());
    }
}
