//! Statement grammar: SELECT, INSERT, UPDATE, DELETE and WITH.

use super::expression::expr;
use super::keywords::Exclusion;
use super::lexical::{
    alias, any_identifier, identifier, identifier_list, name, parameter, table_name,
};
use crate::ast::{
    Combination, ConflictAction, ConflictTarget, Cte, DeleteStatement, Distinct, Expr, FromItem,
    FromSource, InsertSource, InsertStatement, Join, JoinCondition, JoinType, NullOrdering,
    OnConflict, OrderBy, OrderDirection, RowExpr, SelectCore, SelectItem, SelectStatement,
    SetClause, SetMapSource, SetOperator, StarRef, Statement, UpdateStatement, ValuesItem,
    WithStatement,
};
use crate::runtime::{Cursor, Span};

const JOIN_TYPES: &[(&[&str], JoinType)] = &[
    (&["CROSS", "JOIN"], JoinType::Cross),
    (&["INNER", "JOIN"], JoinType::Inner),
    (&["JOIN"], JoinType::Inner),
    (&["LEFT", "OUTER", "JOIN"], JoinType::Left),
    (&["LEFT", "JOIN"], JoinType::Left),
    (&["RIGHT", "OUTER", "JOIN"], JoinType::Right),
    (&["RIGHT", "JOIN"], JoinType::Right),
    (&["FULL", "OUTER", "JOIN"], JoinType::Full),
    (&["FULL", "JOIN"], JoinType::Full),
];

const SET_OPERATORS: &[(&[&str], SetOperator)] = &[
    (&["UNION", "ALL"], SetOperator::UnionAll),
    (&["UNION"], SetOperator::Union),
    (&["INTERSECT", "ALL"], SetOperator::IntersectAll),
    (&["INTERSECT"], SetOperator::Intersect),
    (&["EXCEPT", "ALL"], SetOperator::ExceptAll),
    (&["EXCEPT"], SetOperator::Except),
];

const NULL_ORDERINGS: &[(&[&str], NullOrdering)] = &[
    (&["NULLS", "FIRST"], NullOrdering::First),
    (&["NULLS", "LAST"], NullOrdering::Last),
];

/// Matches the first keyword sequence of `table` present.
fn keyword_choice<T: Copy>(c: &mut Cursor<'_>, table: &[(&[&'static str], T)]) -> Option<T> {
    table
        .iter()
        .find_map(|&(words, value)| c.keywords(words).map(|_| value))
}

/// `keyword expr`, for optional clauses such as `WHERE`.
fn clause(c: &mut Cursor<'_>, keywords: &[&'static str]) -> Option<Expr> {
    c.attempt(|c| {
        c.keywords(keywords)?;
        expr(c)
    })
}

/// Any statement form.
pub fn statement(c: &mut Cursor<'_>) -> Option<Statement> {
    with_statement(c)
        .map(Statement::With)
        .or_else(|| select_statement(c).map(Statement::Select))
        .or_else(|| insert_statement(c).map(Statement::Insert))
        .or_else(|| update_statement(c).map(Statement::Update))
        .or_else(|| delete_statement(c).map(Statement::Delete))
}

/// `(SELECT ...)`, returning the query and the span including the
/// parentheses.
pub fn paren_select(c: &mut Cursor<'_>) -> Option<(SelectStatement, Span)> {
    c.spanned(|c| {
        c.punct("(")?;
        let query = select_statement(c)?;
        c.punct(")")?;
        Some(query)
    })
}

/// A SELECT with set operations, ORDER BY, LIMIT and OFFSET.
pub fn select_statement(c: &mut Cursor<'_>) -> Option<SelectStatement> {
    let start = c.start();
    c.attempt(|c| {
        let core = select_core(c)?;
        let combinations = c.star(|c| {
            let start = c.start();
            let op = keyword_choice(c, SET_OPERATORS)?;
            let select = select_core(c)?;
            Some(Combination {
                op,
                select,
                span: c.span_from(start),
            })
        });
        let order_by = c
            .attempt(|c| {
                c.keywords(&["ORDER", "BY"])?;
                order_by_list(c)
            })
            .unwrap_or_default();
        let (mut limit, mut offset) = (None, None);
        loop {
            if limit.is_none() {
                if let Some(value) = clause(c, &["LIMIT"]) {
                    limit = Some(value);
                    continue;
                }
            }
            if offset.is_none() {
                if let Some(value) = clause(c, &["OFFSET"]) {
                    offset = Some(value);
                    continue;
                }
            }
            break;
        }
        Some(SelectStatement {
            core,
            combinations,
            order_by,
            limit,
            offset,
            span: c.span_from(start),
        })
    })
}

fn select_core(c: &mut Cursor<'_>) -> Option<SelectCore> {
    let start = c.start();
    c.attempt(|c| {
        c.keyword("SELECT")?;
        let distinct = c.attempt(|c| {
            c.keyword("DISTINCT")?;
            let on = c.attempt(|c| {
                c.keyword("ON")?;
                c.punct("(")?;
                let exprs = c.sep_by1(expr, ",")?;
                c.punct(")")?;
                Some(exprs)
            });
            Some(on.map_or(Distinct::All, Distinct::On))
        });
        if distinct.is_none() {
            let _ = c.keyword("ALL");
        }
        let columns = c.sep_by1(select_item, ",")?;
        let from = from_clause(c, &["FROM"]);
        let where_clause = clause(c, &["WHERE"]);
        let group_by = c
            .attempt(|c| {
                c.keywords(&["GROUP", "BY"])?;
                c.sep_by1(expr, ",")
            })
            .unwrap_or_default();
        let having = clause(c, &["HAVING"]);
        Some(SelectCore {
            distinct,
            columns,
            from,
            where_clause,
            group_by,
            having,
            span: c.span_from(start),
        })
    })
}

/// `*`, `t.*` or `s.t.*`.
fn star_ref(c: &mut Cursor<'_>) -> Option<StarRef> {
    let start = c.start();
    c.attempt(|c| {
        let qualifiers = c.star(|c| {
            let part = any_identifier(c)?;
            c.punct(".")?;
            Some(part)
        });
        c.punct("*")?;
        let mut parts = qualifiers.into_iter();
        let (schema, table) = match (parts.next(), parts.next(), parts.next()) {
            (None, _, _) => (None, None),
            (Some(table), None, _) => (None, Some(table)),
            (Some(schema), Some(table), None) => (Some(schema), Some(table)),
            _ => return None,
        };
        Some(StarRef {
            schema,
            table,
            span: c.span_from(start),
        })
    })
}

/// An entry of a SELECT or RETURNING list.
fn select_item(c: &mut Cursor<'_>) -> Option<SelectItem> {
    if let Some(star) = star_ref(c) {
        return Some(SelectItem::Star(star));
    }
    let start = c.start();
    c.attempt(|c| {
        let expr = expr(c)?;
        let alias = alias(c);
        Some(SelectItem::Expr {
            expr,
            alias,
            span: c.span_from(start),
        })
    })
}

fn returning(c: &mut Cursor<'_>) -> Vec<SelectItem> {
    c.attempt(|c| {
        c.keyword("RETURNING")?;
        c.sep_by1(select_item, ",")
    })
    .unwrap_or_default()
}

/// `ORDER BY` entries, without the keywords.
pub fn order_by_list(c: &mut Cursor<'_>) -> Option<Vec<OrderBy>> {
    c.sep_by1(
        |c| {
            let start = c.start();
            let expr = expr(c)?;
            let direction = c
                .keyword_of(&[("ASC", OrderDirection::Asc), ("DESC", OrderDirection::Desc)])
                .map(|(direction, _)| direction);
            let nulls = keyword_choice(c, NULL_ORDERINGS);
            Some(OrderBy {
                expr,
                direction,
                nulls,
                span: c.span_from(start),
            })
        },
        ",",
    )
}

/// An optional clause introducing a comma-separated FROM list.
fn from_clause(c: &mut Cursor<'_>, keywords: &[&'static str]) -> Vec<FromItem> {
    c.attempt(|c| {
        c.keywords(keywords)?;
        c.sep_by1(from_item, ",")
    })
    .unwrap_or_default()
}

fn from_item(c: &mut Cursor<'_>) -> Option<FromItem> {
    let start = c.start();
    c.attempt(|c| {
        let source = from_source(c)?;
        let joins = c.star(join);
        Some(FromItem {
            source,
            joins,
            span: c.span_from(start),
        })
    })
}

fn from_source(c: &mut Cursor<'_>) -> Option<FromSource> {
    let subquery = c.attempt(|c| {
        let (query, span) = paren_select(c)?;
        let alias = alias(c)?;
        Some(FromSource::Subquery {
            query: Box::new(query),
            alias,
            span,
        })
    });
    subquery.or_else(|| {
        let table = table_name(c)?;
        let alias = alias(c);
        Some(FromSource::Table { table, alias })
    })
}

fn join(c: &mut Cursor<'_>) -> Option<Join> {
    let start = c.start();
    let natural = c.keyword("NATURAL").is_some();
    let join_type = keyword_choice(c, JOIN_TYPES)?;
    let source = from_source(c)?;
    let condition = clause(c, &["ON"]).map(JoinCondition::On).or_else(|| {
        c.attempt(|c| {
            c.keyword("USING")?;
            identifier_list(c)
        })
        .map(JoinCondition::Using)
    });
    Some(Join {
        join_type,
        natural,
        source,
        condition,
        span: c.span_from(start),
    })
}

/// `col = value` or `(a, b) = ROW(...) | (...) | (SELECT ...)`.
fn set_clause(c: &mut Cursor<'_>) -> Option<SetClause> {
    let start = c.start();
    let map = c.attempt(|c| {
        let columns = identifier_list(c)?;
        c.punct("=")?;
        let source = match paren_select(c) {
            Some((query, _)) => SetMapSource::Subquery(Box::new(query)),
            None => {
                let row_start = c.start();
                let explicit = c.keyword("ROW").is_some();
                c.punct("(")?;
                let items = c.sep_by1(expr, ",")?;
                c.punct(")")?;
                if items.len() != columns.len() {
                    return c.fail("one value per assigned column");
                }
                SetMapSource::Row(RowExpr {
                    items,
                    explicit,
                    span: c.span_from(row_start),
                })
            }
        };
        Some(SetClause::Map {
            columns,
            source,
            span: c.span_from(start),
        })
    });
    map.or_else(|| {
        c.attempt(|c| {
            let column = name(c)?;
            c.punct("=")?;
            let value = expr(c)?;
            Some(SetClause::Item {
                column,
                value,
                span: c.span_from(start),
            })
        })
    })
}

fn set_list(c: &mut Cursor<'_>) -> Option<Vec<SetClause>> {
    c.keyword("SET")?;
    c.sep_by1(set_clause, ",")
}

/// `INSERT INTO t [AS a] [(cols)] VALUES ... | SELECT ... | DEFAULT VALUES
/// [ON CONFLICT ...] [RETURNING ...]`
pub fn insert_statement(c: &mut Cursor<'_>) -> Option<InsertStatement> {
    let start = c.start();
    c.attempt(|c| {
        c.keywords(&["INSERT", "INTO"])?;
        let table = table_name(c)?;
        let alias = c.attempt(|c| {
            c.keyword("AS")?;
            identifier(c, Exclusion::Alias)
        });
        let columns = identifier_list(c).unwrap_or_default();
        let source = if c.keywords(&["DEFAULT", "VALUES"]).is_some() {
            InsertSource::DefaultValues
        } else if c.keyword("VALUES").is_some() {
            InsertSource::Values(c.sep_by1(values_item, ",")?)
        } else {
            InsertSource::Select(Box::new(select_statement(c)?))
        };
        let on_conflict = on_conflict(c);
        let returning = returning(c);
        Some(InsertStatement {
            table,
            alias,
            columns,
            source,
            on_conflict,
            returning,
            span: c.span_from(start),
        })
    })
}

fn values_item(c: &mut Cursor<'_>) -> Option<ValuesItem> {
    if let Some(param) = parameter(c) {
        return Some(ValuesItem::Parameter(param));
    }
    let start = c.start();
    c.attempt(|c| {
        c.punct("(")?;
        let values = c.sep_by1(expr, ",")?;
        c.punct(")")?;
        Some(ValuesItem::Row {
            values,
            span: c.span_from(start),
        })
    })
}

fn on_conflict(c: &mut Cursor<'_>) -> Option<OnConflict> {
    let start = c.start();
    c.attempt(|c| {
        c.keywords(&["ON", "CONFLICT"])?;
        let target = identifier_list(c)
            .map(ConflictTarget::Columns)
            .or_else(|| {
                c.attempt(|c| {
                    c.keywords(&["ON", "CONSTRAINT"])?;
                    any_identifier(c)
                })
                .map(ConflictTarget::Constraint)
            });
        let action = if c.keywords(&["DO", "NOTHING"]).is_some() {
            ConflictAction::DoNothing
        } else {
            c.keywords(&["DO", "UPDATE"])?;
            let set = set_list(c)?;
            let where_clause = clause(c, &["WHERE"]);
            ConflictAction::DoUpdate { set, where_clause }
        };
        Some(OnConflict {
            target,
            action,
            span: c.span_from(start),
        })
    })
}

/// `UPDATE t [AS a] SET ... [FROM ...] [WHERE ...] [RETURNING ...]`
pub fn update_statement(c: &mut Cursor<'_>) -> Option<UpdateStatement> {
    let start = c.start();
    c.attempt(|c| {
        c.keyword("UPDATE")?;
        let table = table_name(c)?;
        let alias = alias(c);
        let set = set_list(c)?;
        let from = from_clause(c, &["FROM"]);
        let where_clause = clause(c, &["WHERE"]);
        let returning = returning(c);
        Some(UpdateStatement {
            table,
            alias,
            set,
            from,
            where_clause,
            returning,
            span: c.span_from(start),
        })
    })
}

/// `DELETE FROM t [AS a] [USING ...] [WHERE ...] [RETURNING ...]`
pub fn delete_statement(c: &mut Cursor<'_>) -> Option<DeleteStatement> {
    let start = c.start();
    c.attempt(|c| {
        c.keywords(&["DELETE", "FROM"])?;
        let table = table_name(c)?;
        let alias = alias(c);
        let using = from_clause(c, &["USING"]);
        let where_clause = clause(c, &["WHERE"]);
        let returning = returning(c);
        Some(DeleteStatement {
            table,
            alias,
            using,
            where_clause,
            returning,
            span: c.span_from(start),
        })
    })
}

/// `WITH [RECURSIVE] name [(cols)] AS (statement), ... statement`
pub fn with_statement(c: &mut Cursor<'_>) -> Option<WithStatement> {
    let start = c.start();
    c.attempt(|c| {
        c.keyword("WITH")?;
        let recursive = c.keyword("RECURSIVE").is_some();
        let ctes = c.sep_by1(
            |c| {
                let start = c.start();
                let name = name(c)?;
                let columns = identifier_list(c).unwrap_or_default();
                c.keyword("AS")?;
                c.punct("(")?;
                let query = statement(c)?;
                c.punct(")")?;
                Some(Cte {
                    name,
                    columns,
                    query,
                    span: c.span_from(start),
                })
            },
            ",",
        )?;
        let body = statement(c)?;
        Some(WithStatement {
            recursive,
            ctes,
            body: Box::new(body),
            span: c.span_from(start),
        })
    })
}
