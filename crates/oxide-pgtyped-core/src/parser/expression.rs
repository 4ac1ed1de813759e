//! Expression grammar.
//!
//! One function per precedence level, loosest first; each level folds its
//! operators left-associatively over the next tighter level. Unary
//! prefixes bind tighter than every binary operator. The atom alternatives
//! are tried in the order of [`ATOMS`], which decides between overlapping
//! forms and must not be reordered.

use super::keywords::Exclusion;
use super::lexical::{any_identifier, data_type, identifier, literal, name, parameter};
use super::statement::{order_by_list, paren_select};
use crate::ast::{
    ArrayExpr, ArrayIndex, ArrayItems, BetweenExpr, BinaryExpr, BinaryOp, Builtin, BuiltinKind,
    Case, CaseSimple, Cast, ColumnRef, Conditional, ConditionalKind, Expr, Extract, FunctionCall,
    InSubquery, LiteralKind, Nullif, Paren, QuantifiedExpr, QuantifiedSubject, Quantifier,
    RowCompare, RowExpr, SelectStatement, Subquery, UnaryExpr, UnaryOp, WhenClause,
    WindowSpec,
};
use crate::runtime::{Cursor, Span};

type Rule = fn(&mut Cursor<'_>) -> Option<Expr>;

const EQUALITY_OPS: &[(&str, BinaryOp)] = &[
    ("=", BinaryOp::Eq),
    ("<>", BinaryOp::NotEq),
    ("!=", BinaryOp::NotEq),
];

const ORDERING_OPS: &[(&str, BinaryOp)] = &[
    ("<=", BinaryOp::LtEq),
    (">=", BinaryOp::GtEq),
    ("<", BinaryOp::Lt),
    (">", BinaryOp::Gt),
];

const COMPARISON_OPS: &[(&str, BinaryOp)] = &[
    ("=", BinaryOp::Eq),
    ("<>", BinaryOp::NotEq),
    ("!=", BinaryOp::NotEq),
    ("<=", BinaryOp::LtEq),
    (">=", BinaryOp::GtEq),
    ("<", BinaryOp::Lt),
    (">", BinaryOp::Gt),
];

const LIKE_OPS: &[(&[&str], BinaryOp)] = &[
    (&["NOT", "LIKE"], BinaryOp::NotLike),
    (&["NOT", "ILIKE"], BinaryOp::NotILike),
    (&["LIKE"], BinaryOp::Like),
    (&["ILIKE"], BinaryOp::ILike),
];

const IN_OPS: &[(&[&str], BinaryOp)] = &[
    (&["NOT", "IN"], BinaryOp::NotIn),
    (&["IN"], BinaryOp::In),
];

const IS_OPS: &[(&[&str], BinaryOp)] = &[
    (&["IS", "NOT", "DISTINCT", "FROM"], BinaryOp::IsNotDistinctFrom),
    (&["IS", "DISTINCT", "FROM"], BinaryOp::IsDistinctFrom),
    (&["IS", "NOT"], BinaryOp::IsNot),
    (&["IS"], BinaryOp::Is),
];

const BITWISE_OPS: &[(&str, BinaryOp)] = &[
    (">>", BinaryOp::RightShift),
    ("<<", BinaryOp::LeftShift),
    ("!~*", BinaryOp::NotRegexIMatch),
    ("!~", BinaryOp::NotRegexMatch),
    ("~*", BinaryOp::RegexIMatch),
    ("~", BinaryOp::RegexMatch),
    ("#", BinaryOp::BitXor),
    ("&", BinaryOp::BitAnd),
    ("|", BinaryOp::BitOr),
];

const JSON_OPS: &[(&str, BinaryOp)] = &[
    ("->>", BinaryOp::JsonGetText),
    ("->", BinaryOp::JsonGet),
    ("#>>", BinaryOp::JsonPathText),
    ("#>", BinaryOp::JsonPath),
    ("@>", BinaryOp::Contains),
    ("<@", BinaryOp::ContainedBy),
    ("?|", BinaryOp::JsonAnyKey),
    ("?&", BinaryOp::JsonAllKeys),
    ("?", BinaryOp::JsonHasKey),
    ("#-", BinaryOp::JsonDeletePath),
];

const ADDITIVE_OPS: &[(&str, BinaryOp)] = &[("+", BinaryOp::Add), ("-", BinaryOp::Sub)];

const MULTIPLICATIVE_OPS: &[(&str, BinaryOp)] = &[
    ("*", BinaryOp::Mul),
    ("/", BinaryOp::Div),
    ("%", BinaryOp::Mod),
];

const CONDITIONALS: &[(&str, ConditionalKind)] = &[
    ("COALESCE", ConditionalKind::Coalesce),
    ("GREATEST", ConditionalKind::Greatest),
    ("LEAST", ConditionalKind::Least),
];

const QUANTIFIERS: &[(&str, Quantifier)] = &[
    ("ANY", Quantifier::Any),
    ("SOME", Quantifier::Some),
    ("ALL", Quantifier::All),
];

/// Atomic expressions in the order they are tried.
const ATOMS: &[Rule] = &[
    constant,
    array_index,
    array_constructor,
    row_constructor,
    exists,
    in_subquery,
    quantified,
    row_compare,
    builtin,
    nullif,
    conditional,
    case_simple,
    case,
    cast,
    extract,
    function_call,
    column,
    parameter_expr,
    scalar_subquery,
    paren,
];

/// A full expression. Memoized per position: at a `(` several atoms
/// parse the same inner expression before one of them commits.
pub fn expr(c: &mut Cursor<'_>) -> Option<Expr> {
    c.memoized("expr", |c| {
        c.fold_left(and_expr, |c| c.keyword("OR").map(|_| BinaryOp::Or), binary)
    })
}

fn binary(left: Expr, op: BinaryOp, right: Expr) -> Expr {
    let span = left.span().merge(right.span());
    Expr::Binary(Box::new(BinaryExpr {
        left,
        op,
        right,
        span,
    }))
}

fn symbol_of(
    table: &'static [(&'static str, BinaryOp)],
) -> impl FnMut(&mut Cursor<'_>) -> Option<BinaryOp> {
    move |c| c.punct_of(table).map(|(op, _)| op)
}

fn words_of(
    table: &'static [(&'static [&'static str], BinaryOp)],
) -> impl FnMut(&mut Cursor<'_>) -> Option<BinaryOp> {
    move |c| {
        table
            .iter()
            .find_map(|&(words, op)| c.keywords(words).map(|_| op))
    }
}

fn and_expr(c: &mut Cursor<'_>) -> Option<Expr> {
    c.fold_left(equality, |c| c.keyword("AND").map(|_| BinaryOp::And), binary)
}

fn equality(c: &mut Cursor<'_>) -> Option<Expr> {
    c.fold_left(ordering, symbol_of(EQUALITY_OPS), binary)
}

fn ordering(c: &mut Cursor<'_>) -> Option<Expr> {
    c.fold_left(like, symbol_of(ORDERING_OPS), binary)
}

/// A `LIKE`-level suffix. `BETWEEN` shares the level so its `AND` is not
/// taken for a conjunction.
enum LikeSuffix {
    Like(BinaryOp, Expr),
    Between {
        negated: bool,
        symmetric: bool,
        low: Expr,
        high: Expr,
    },
}

fn like(c: &mut Cursor<'_>) -> Option<Expr> {
    let first = c.attempt(membership)?;
    let suffixes = c.star(|c| {
        if let Some(op) = words_of(LIKE_OPS)(c) {
            return Some(LikeSuffix::Like(op, membership(c)?));
        }
        let negated = c.keyword("NOT").is_some();
        c.keyword("BETWEEN")?;
        let symmetric = c.keyword("SYMMETRIC").is_some();
        let low = membership(c)?;
        c.keyword("AND")?;
        let high = membership(c)?;
        Some(LikeSuffix::Between {
            negated,
            symmetric,
            low,
            high,
        })
    });
    Some(suffixes.into_iter().fold(first, |left, suffix| match suffix {
        LikeSuffix::Like(op, right) => binary(left, op, right),
        LikeSuffix::Between {
            negated,
            symmetric,
            low,
            high,
        } => {
            let span = left.span().merge(high.span());
            Expr::Between(Box::new(BetweenExpr {
                expr: left,
                negated,
                symmetric,
                low,
                high,
                span,
            }))
        }
    }))
}

fn membership(c: &mut Cursor<'_>) -> Option<Expr> {
    let first = c.attempt(is_expr)?;
    let tail = c.star(|c| {
        let op = words_of(IN_OPS)(c)?;
        Some((op, in_list(c)?))
    });
    Some(
        tail.into_iter()
            .fold(first, |left, (op, right)| binary(left, op, right)),
    )
}

/// Right side of `IN`: a subquery, a spread parameter or a list.
fn in_list(c: &mut Cursor<'_>) -> Option<Expr> {
    subquery(c)
        .or_else(|| parameter_expr(c))
        .or_else(|| {
            let start = c.start();
            c.attempt(|c| {
                c.punct("(")?;
                let items = c.sep_by1(expr, ",")?;
                c.punct(")")?;
                Some(Expr::Row(RowExpr {
                    items,
                    explicit: false,
                    span: c.span_from(start),
                }))
            })
        })
}

fn is_expr(c: &mut Cursor<'_>) -> Option<Expr> {
    c.fold_left(text_search, words_of(IS_OPS), binary)
}

fn text_search(c: &mut Cursor<'_>) -> Option<Expr> {
    c.fold_left(bitwise, symbol_of(&[("@@", BinaryOp::TextSearch)]), binary)
}

fn bitwise(c: &mut Cursor<'_>) -> Option<Expr> {
    c.fold_left(concat, symbol_of(BITWISE_OPS), binary)
}

fn concat(c: &mut Cursor<'_>) -> Option<Expr> {
    c.fold_left(json, symbol_of(&[("||", BinaryOp::Concat)]), binary)
}

fn json(c: &mut Cursor<'_>) -> Option<Expr> {
    c.fold_left(additive, symbol_of(JSON_OPS), binary)
}

fn additive(c: &mut Cursor<'_>) -> Option<Expr> {
    c.fold_left(multiplicative, symbol_of(ADDITIVE_OPS), binary)
}

fn multiplicative(c: &mut Cursor<'_>) -> Option<Expr> {
    c.fold_left(exponent, symbol_of(MULTIPLICATIVE_OPS), binary)
}

fn exponent(c: &mut Cursor<'_>) -> Option<Expr> {
    c.fold_left(unary, symbol_of(&[("^", BinaryOp::Pow)]), binary)
}

fn unary(c: &mut Cursor<'_>) -> Option<Expr> {
    let start = c.start();
    c.attempt(|c| {
        let op = c
            .punct_of(&[("+", UnaryOp::Plus), ("-", UnaryOp::Neg)])
            .or_else(|| {
                c.keyword_of(&[
                    ("NOT", UnaryOp::Not),
                    ("ISNULL", UnaryOp::IsNull),
                    ("NOTNULL", UnaryOp::NotNull),
                ])
            })?
            .0;
        let operand = unary(c)?;
        Some(Expr::Unary(Box::new(UnaryExpr {
            op,
            operand,
            span: c.span_from(start),
        })))
    })
    .or_else(|| cast_atom(c))
}

/// An atom followed by any number of `::type` casts.
fn cast_atom(c: &mut Cursor<'_>) -> Option<Expr> {
    let start = c.start();
    let value = atom(c)?;
    let types = c.star(|c| {
        c.punct("::")?;
        data_type(c)
    });
    Some(types.into_iter().fold(value, |value, data_type| {
        let span = Span::new(start, data_type.span.end);
        Expr::PgCast(Box::new(Cast {
            value,
            data_type,
            span,
        }))
    }))
}

fn atom(c: &mut Cursor<'_>) -> Option<Expr> {
    ATOMS.iter().find_map(|rule| c.attempt(*rule))
}

/// A literal, a typed literal such as `date '2024-01-01'`, or `DEFAULT`.
/// Plain literals go first so `E'..'`, `B'..'` and `X'..'` are not read
/// as a type name followed by a string.
fn constant(c: &mut Cursor<'_>) -> Option<Expr> {
    if let Some(lit) = literal(c) {
        return Some(Expr::Literal(lit));
    }
    let start = c.start();
    let typed = c.attempt(|c| {
        let data_type = data_type(c)?;
        let value = literal(c).filter(|lit| {
            matches!(
                lit.kind,
                LiteralKind::String | LiteralKind::EscapeString | LiteralKind::DollarString { .. }
            )
        })?;
        Some(Expr::PgCast(Box::new(Cast {
            value: Expr::Literal(value),
            data_type,
            span: c.span_from(start),
        })))
    });
    typed.or_else(|| c.keyword("DEFAULT").map(Expr::Default))
}

/// `target[i]` or `target[i:j]`, repeatable.
fn array_index(c: &mut Cursor<'_>) -> Option<Expr> {
    let start = c.start();
    let target = paren(c)
        .or_else(|| column(c))
        .or_else(|| parameter_expr(c))?;
    let suffixes = c.plus(|c| {
        c.punct("[")?;
        let index = expr(c)?;
        let upper = c.attempt(|c| {
            c.punct(":")?;
            expr(c)
        });
        c.punct("]")?;
        Some((index, upper, c.span_from(start)))
    })?;
    Some(
        suffixes
            .into_iter()
            .fold(target, |target, (index, upper, span)| {
                Expr::ArrayIndex(Box::new(ArrayIndex {
                    target,
                    index,
                    upper,
                    span,
                }))
            }),
    )
}

/// `ARRAY[a, b]` or `ARRAY(SELECT ...)`.
fn array_constructor(c: &mut Cursor<'_>) -> Option<Expr> {
    let start = c.start();
    c.keyword("ARRAY")?;
    let items = if c.punct("[").is_some() {
        let items = c.sep_by1(expr, ",").unwrap_or_default();
        c.punct("]")?;
        ArrayItems::List(items)
    } else {
        let (query, _) = paren_select(c)?;
        if !is_single_column(&query) {
            return c.fail("a single-column subquery");
        }
        ArrayItems::Subquery(Box::new(query))
    };
    Some(Expr::Array(ArrayExpr {
        items,
        span: c.span_from(start),
    }))
}

/// `ROW(a, ...)` or `(a, b, ...)` with at least two items.
fn row(c: &mut Cursor<'_>) -> Option<RowExpr> {
    let start = c.start();
    c.attempt(|c| {
        let explicit = c.keyword("ROW").is_some();
        c.punct("(")?;
        let items = if explicit {
            c.sep_by1(expr, ",").unwrap_or_default()
        } else {
            let first = expr(c)?;
            c.punct(",")?;
            let mut items = vec![first];
            items.extend(c.sep_by1(expr, ",")?);
            items
        };
        c.punct(")")?;
        Some(RowExpr {
            items,
            explicit,
            span: c.span_from(start),
        })
    })
}

fn comparison_op(c: &mut Cursor<'_>) -> Option<BinaryOp> {
    symbol_of(COMPARISON_OPS)(c)
}

/// A row not compared against a subquery; that form is [`row_compare`].
fn row_constructor(c: &mut Cursor<'_>) -> Option<Expr> {
    let row = row(c)?;
    c.not(|c| {
        comparison_op(c)?;
        c.punct("(")?;
        c.keyword("SELECT")
    })?;
    Some(Expr::Row(row))
}

/// `EXISTS (SELECT ...)`
fn exists(c: &mut Cursor<'_>) -> Option<Expr> {
    let start = c.start();
    c.keyword("EXISTS")?;
    let (query, _) = paren_select(c)?;
    Some(Expr::Exists(Box::new(Subquery {
        query,
        span: c.span_from(start),
    })))
}

/// `col [NOT] IN (SELECT ...)`
fn in_subquery(c: &mut Cursor<'_>) -> Option<Expr> {
    let start = c.start();
    let expr = column(c)?;
    let negated = c.keyword("NOT").is_some();
    c.keyword("IN")?;
    let (query, _) = paren_select(c)?;
    Some(Expr::InSubquery(Box::new(InSubquery {
        expr,
        negated,
        query,
        span: c.span_from(start),
    })))
}

/// `col op ANY|SOME|ALL (SELECT ... | array)`
fn quantified(c: &mut Cursor<'_>) -> Option<Expr> {
    let start = c.start();
    let left = column(c).or_else(|| parameter_expr(c))?;
    let op = comparison_op(c).or_else(|| words_of(LIKE_OPS)(c))?;
    let (quantifier, _) = c.keyword_of(QUANTIFIERS)?;
    let subject = match paren_select(c) {
        Some((query, _)) => QuantifiedSubject::Subquery(Box::new(query)),
        None => {
            c.punct("(")?;
            let array = expr(c)?;
            c.punct(")")?;
            QuantifiedSubject::Array(array)
        }
    };
    Some(Expr::Quantified(Box::new(QuantifiedExpr {
        left,
        op,
        quantifier,
        subject,
        span: c.span_from(start),
    })))
}

/// `(a, b) op (SELECT x, y ...)`
fn row_compare(c: &mut Cursor<'_>) -> Option<Expr> {
    let start = c.start();
    let row = row(c)?;
    let op = comparison_op(c)?;
    let (query, _) = paren_select(c)?;
    Some(Expr::RowCompare(Box::new(RowCompare {
        row,
        op,
        query,
        span: c.span_from(start),
    })))
}

/// `CURRENT_DATE` and friends, never followed by `(`.
fn builtin(c: &mut Cursor<'_>) -> Option<Expr> {
    let (kind, span) = c.keyword_of(&BuiltinKind::ALL)?;
    c.not(|c| c.punct("("))?;
    Some(Expr::Builtin(Builtin { kind, span }))
}

fn nullif(c: &mut Cursor<'_>) -> Option<Expr> {
    let start = c.start();
    c.keyword("NULLIF")?;
    c.punct("(")?;
    let value = expr(c)?;
    c.punct(",")?;
    let other = expr(c)?;
    c.punct(")")?;
    Some(Expr::Nullif(Box::new(Nullif {
        value,
        other,
        span: c.span_from(start),
    })))
}

/// `COALESCE(...)`, `GREATEST(...)`, `LEAST(...)`
fn conditional(c: &mut Cursor<'_>) -> Option<Expr> {
    let start = c.start();
    let (kind, _) = c.keyword_of(CONDITIONALS)?;
    c.punct("(")?;
    let args = c.sep_by1(expr, ",")?;
    c.punct(")")?;
    Some(Expr::Conditional(Conditional {
        kind,
        args,
        span: c.span_from(start),
    }))
}

fn when_clauses(c: &mut Cursor<'_>) -> Option<(Vec<WhenClause>, Option<Expr>)> {
    let whens = c.plus(|c| {
        let start = c.start();
        c.keyword("WHEN")?;
        let condition = expr(c)?;
        c.keyword("THEN")?;
        let result = expr(c)?;
        Some(WhenClause {
            condition,
            result,
            span: c.span_from(start),
        })
    })?;
    let else_result = c.attempt(|c| {
        c.keyword("ELSE")?;
        expr(c)
    });
    c.keyword("END")?;
    Some((whens, else_result))
}

/// `CASE operand WHEN value THEN result ... END`
fn case_simple(c: &mut Cursor<'_>) -> Option<Expr> {
    let start = c.start();
    c.keyword("CASE")?;
    let operand = expr(c)?;
    let (whens, else_result) = when_clauses(c)?;
    Some(Expr::CaseSimple(Box::new(CaseSimple {
        operand,
        whens,
        else_result,
        span: c.span_from(start),
    })))
}

/// `CASE WHEN condition THEN result ... END`
fn case(c: &mut Cursor<'_>) -> Option<Expr> {
    let start = c.start();
    c.keyword("CASE")?;
    let (whens, else_result) = when_clauses(c)?;
    Some(Expr::Case(Box::new(Case {
        whens,
        else_result,
        span: c.span_from(start),
    })))
}

/// `CAST(value AS type)`
fn cast(c: &mut Cursor<'_>) -> Option<Expr> {
    let start = c.start();
    c.keyword("CAST")?;
    c.punct("(")?;
    let value = expr(c)?;
    c.keyword("AS")?;
    let data_type = data_type(c)?;
    c.punct(")")?;
    Some(Expr::Cast(Box::new(Cast {
        value,
        data_type,
        span: c.span_from(start),
    })))
}

/// `EXTRACT(field FROM source)`
fn extract(c: &mut Cursor<'_>) -> Option<Expr> {
    let start = c.start();
    c.keyword("EXTRACT")?;
    c.punct("(")?;
    let field = any_identifier(c)?;
    c.keyword("FROM")?;
    let source = expr(c)?;
    c.punct(")")?;
    Some(Expr::Extract(Box::new(Extract {
        field,
        source,
        span: c.span_from(start),
    })))
}

fn window(c: &mut Cursor<'_>) -> Option<WindowSpec> {
    let start = c.start();
    c.attempt(|c| {
        c.keyword("OVER")?;
        c.punct("(")?;
        let partition_by = c
            .attempt(|c| {
                c.keywords(&["PARTITION", "BY"])?;
                c.sep_by1(expr, ",")
            })
            .unwrap_or_default();
        let order_by = c
            .attempt(|c| {
                c.keywords(&["ORDER", "BY"])?;
                order_by_list(c)
            })
            .unwrap_or_default();
        c.punct(")")?;
        Some(WindowSpec {
            partition_by,
            order_by,
            span: c.span_from(start),
        })
    })
}

/// `[schema.]name([DISTINCT] args [ORDER BY ...]) [FILTER (WHERE ...)] [OVER (...)]`
fn function_call(c: &mut Cursor<'_>) -> Option<Expr> {
    let start = c.start();
    let first = identifier(c, Exclusion::Function)?;
    let qualified = c.attempt(|c| {
        c.punct(".")?;
        any_identifier(c)
    });
    let (schema, name) = match qualified {
        Some(name) => (Some(first), name),
        None => (None, first),
    };
    c.punct("(")?;
    let distinct = c.keyword("DISTINCT").is_some();
    let star = !distinct && c.punct("*").is_some();
    let args = if star {
        vec![]
    } else {
        c.sep_by1(expr, ",").unwrap_or_default()
    };
    let order_by = c
        .attempt(|c| {
            c.keywords(&["ORDER", "BY"])?;
            order_by_list(c)
        })
        .unwrap_or_default();
    c.punct(")")?;
    let filter = c.attempt(|c| {
        c.keyword("FILTER")?;
        c.punct("(")?;
        c.keyword("WHERE")?;
        let condition = expr(c)?;
        c.punct(")")?;
        Some(condition)
    });
    let over = window(c);
    Some(Expr::Function(Box::new(FunctionCall {
        schema,
        name,
        distinct,
        star,
        args,
        order_by,
        filter,
        over,
        span: c.span_from(start),
    })))
}

/// `name`, `table.name` or `schema.table.name`.
fn column(c: &mut Cursor<'_>) -> Option<Expr> {
    let start = c.start();
    c.attempt(|c| {
        let first = name(c)?;
        let rest = c.star(|c| {
            c.punct(".")?;
            any_identifier(c)
        });
        let mut parts = std::iter::once(first).chain(rest);
        let (schema, table, name) = match (parts.next(), parts.next(), parts.next()) {
            (Some(name), None, None) => (None, None, name),
            (Some(table), Some(name), None) => (None, Some(table), name),
            (Some(schema), Some(table), Some(name)) => (Some(schema), Some(table), name),
            _ => return None,
        };
        if parts.next().is_some() {
            return None;
        }
        Some(Expr::Column(ColumnRef {
            schema,
            table,
            name,
            span: c.span_from(start),
        }))
    })
}

fn parameter_expr(c: &mut Cursor<'_>) -> Option<Expr> {
    parameter(c).map(Expr::Parameter)
}

/// `(SELECT ...)` used as a value.
fn subquery(c: &mut Cursor<'_>) -> Option<Expr> {
    let (query, span) = paren_select(c)?;
    Some(Expr::Subquery(Box::new(Subquery { query, span })))
}

/// A subquery used as a single value.
fn scalar_subquery(c: &mut Cursor<'_>) -> Option<Expr> {
    let expr = subquery(c)?;
    match &expr {
        Expr::Subquery(subquery) if !is_single_column(&subquery.query) => {
            c.fail("a single-column subquery")
        }
        _ => Some(expr),
    }
}

/// Every block projects one item. A star counts as one; what it expands
/// to is only known after inference.
fn is_single_column(query: &SelectStatement) -> bool {
    query.cores().all(|core| core.columns.len() == 1)
}

fn paren(c: &mut Cursor<'_>) -> Option<Expr> {
    let start = c.start();
    c.attempt(|c| {
        c.punct("(")?;
        let inner = expr(c)?;
        c.punct(")")?;
        Some(Expr::Paren(Box::new(Paren {
            expr: inner,
            span: c.span_from(start),
        })))
    })
}
