//! Read-only traversal of the AST.
//!
//! Implement [`Visitor`] and override the hooks of interest; the `walk_*`
//! functions perform the default descent in source order.

use super::{
    ArrayItems, ConflictAction, Expr, FromItem, FromSource, InsertSource, JoinCondition,
    Parameter, QuantifiedSubject, SelectCore, SelectItem, SelectStatement, SetClause,
    SetMapSource, Statement, ValuesItem,
};

/// Hooks called while walking a tree.
pub trait Visitor<'ast> {
    /// Called for every statement, CTE bodies included.
    fn visit_statement(&mut self, statement: &'ast Statement) {
        walk_statement(self, statement);
    }

    /// Called for every SELECT, subqueries included.
    fn visit_select(&mut self, select: &'ast SelectStatement) {
        walk_select(self, select);
    }

    /// Called for every expression.
    fn visit_expr(&mut self, expr: &'ast Expr) {
        walk_expr(self, expr);
    }

    /// Called for every parameter, in expressions and in VALUES lists.
    fn visit_parameter(&mut self, _parameter: &'ast Parameter) {}
}

pub fn walk_statement<'ast, V: Visitor<'ast> + ?Sized>(v: &mut V, statement: &'ast Statement) {
    match statement {
        Statement::Select(select) => v.visit_select(select),
        Statement::Insert(insert) => {
            match &insert.source {
                InsertSource::Values(rows) => {
                    for row in rows {
                        match row {
                            ValuesItem::Row { values, .. } => {
                                values.iter().for_each(|e| v.visit_expr(e));
                            }
                            ValuesItem::Parameter(param) => v.visit_parameter(param),
                        }
                    }
                }
                InsertSource::Select(select) => v.visit_select(select),
                InsertSource::DefaultValues => {}
            }
            if let Some(on_conflict) = &insert.on_conflict {
                if let ConflictAction::DoUpdate { set, where_clause } = &on_conflict.action {
                    walk_set(v, set);
                    if let Some(expr) = where_clause {
                        v.visit_expr(expr);
                    }
                }
            }
            walk_select_items(v, &insert.returning);
        }
        Statement::Update(update) => {
            walk_set(v, &update.set);
            walk_from(v, &update.from);
            if let Some(expr) = &update.where_clause {
                v.visit_expr(expr);
            }
            walk_select_items(v, &update.returning);
        }
        Statement::Delete(delete) => {
            walk_from(v, &delete.using);
            if let Some(expr) = &delete.where_clause {
                v.visit_expr(expr);
            }
            walk_select_items(v, &delete.returning);
        }
        Statement::With(with) => {
            for cte in &with.ctes {
                v.visit_statement(&cte.query);
            }
            v.visit_statement(&with.body);
        }
    }
}

pub fn walk_select<'ast, V: Visitor<'ast> + ?Sized>(v: &mut V, select: &'ast SelectStatement) {
    walk_core(v, &select.core);
    for combination in &select.combinations {
        walk_core(v, &combination.select);
    }
    for order in &select.order_by {
        v.visit_expr(&order.expr);
    }
    if let Some(limit) = &select.limit {
        v.visit_expr(limit);
    }
    if let Some(offset) = &select.offset {
        v.visit_expr(offset);
    }
}

fn walk_core<'ast, V: Visitor<'ast> + ?Sized>(v: &mut V, core: &'ast SelectCore) {
    if let Some(super::Distinct::On(exprs)) = &core.distinct {
        exprs.iter().for_each(|e| v.visit_expr(e));
    }
    walk_select_items(v, &core.columns);
    walk_from(v, &core.from);
    if let Some(expr) = &core.where_clause {
        v.visit_expr(expr);
    }
    core.group_by.iter().for_each(|e| v.visit_expr(e));
    if let Some(expr) = &core.having {
        v.visit_expr(expr);
    }
}

fn walk_select_items<'ast, V: Visitor<'ast> + ?Sized>(v: &mut V, items: &'ast [SelectItem]) {
    for item in items {
        if let SelectItem::Expr { expr, .. } = item {
            v.visit_expr(expr);
        }
    }
}

fn walk_from_source<'ast, V: Visitor<'ast> + ?Sized>(v: &mut V, source: &'ast FromSource) {
    if let FromSource::Subquery { query, .. } = source {
        v.visit_select(query);
    }
}

fn walk_from<'ast, V: Visitor<'ast> + ?Sized>(v: &mut V, from: &'ast [FromItem]) {
    for item in from {
        walk_from_source(v, &item.source);
        for join in &item.joins {
            walk_from_source(v, &join.source);
            if let Some(JoinCondition::On(expr)) = &join.condition {
                v.visit_expr(expr);
            }
        }
    }
}

fn walk_set<'ast, V: Visitor<'ast> + ?Sized>(v: &mut V, set: &'ast [SetClause]) {
    for clause in set {
        match clause {
            SetClause::Item { value, .. } => v.visit_expr(value),
            SetClause::Map { source, .. } => match source {
                SetMapSource::Row(row) => row.items.iter().for_each(|e| v.visit_expr(e)),
                SetMapSource::Subquery(query) => v.visit_select(query),
            },
        }
    }
}

pub fn walk_expr<'ast, V: Visitor<'ast> + ?Sized>(v: &mut V, expr: &'ast Expr) {
    match expr {
        Expr::Literal(_) | Expr::Column(_) | Expr::Default(_) | Expr::Builtin(_) => {}
        Expr::Parameter(param) => v.visit_parameter(param),
        Expr::Binary(e) => {
            v.visit_expr(&e.left);
            v.visit_expr(&e.right);
        }
        Expr::Unary(e) => v.visit_expr(&e.operand),
        Expr::Between(e) => {
            v.visit_expr(&e.expr);
            v.visit_expr(&e.low);
            v.visit_expr(&e.high);
        }
        Expr::ArrayIndex(e) => {
            v.visit_expr(&e.target);
            v.visit_expr(&e.index);
            if let Some(upper) = &e.upper {
                v.visit_expr(upper);
            }
        }
        Expr::Array(e) => match &e.items {
            ArrayItems::List(items) => items.iter().for_each(|e| v.visit_expr(e)),
            ArrayItems::Subquery(query) => v.visit_select(query),
        },
        Expr::Row(row) => row.items.iter().for_each(|e| v.visit_expr(e)),
        Expr::Exists(e) | Expr::Subquery(e) => v.visit_select(&e.query),
        Expr::InSubquery(e) => {
            v.visit_expr(&e.expr);
            v.visit_select(&e.query);
        }
        Expr::Quantified(e) => {
            v.visit_expr(&e.left);
            match &e.subject {
                QuantifiedSubject::Subquery(query) => v.visit_select(query),
                QuantifiedSubject::Array(expr) => v.visit_expr(expr),
            }
        }
        Expr::RowCompare(e) => {
            e.row.items.iter().for_each(|e| v.visit_expr(e));
            v.visit_select(&e.query);
        }
        Expr::Nullif(e) => {
            v.visit_expr(&e.value);
            v.visit_expr(&e.other);
        }
        Expr::Conditional(e) => e.args.iter().for_each(|e| v.visit_expr(e)),
        Expr::CaseSimple(e) => {
            v.visit_expr(&e.operand);
            for when in &e.whens {
                v.visit_expr(&when.condition);
                v.visit_expr(&when.result);
            }
            if let Some(else_result) = &e.else_result {
                v.visit_expr(else_result);
            }
        }
        Expr::Case(e) => {
            for when in &e.whens {
                v.visit_expr(&when.condition);
                v.visit_expr(&when.result);
            }
            if let Some(else_result) = &e.else_result {
                v.visit_expr(else_result);
            }
        }
        Expr::Cast(e) | Expr::PgCast(e) => v.visit_expr(&e.value),
        Expr::Extract(e) => v.visit_expr(&e.source),
        Expr::Function(e) => {
            e.args.iter().for_each(|e| v.visit_expr(e));
            for order in &e.order_by {
                v.visit_expr(&order.expr);
            }
            if let Some(filter) = &e.filter {
                v.visit_expr(filter);
            }
            if let Some(over) = &e.over {
                over.partition_by.iter().for_each(|e| v.visit_expr(e));
                for order in &over.order_by {
                    v.visit_expr(&order.expr);
                }
            }
        }
        Expr::Paren(e) => v.visit_expr(&e.expr),
    }
}

struct ParameterCollector<'ast> {
    found: Vec<&'ast Parameter>,
}

impl<'ast> Visitor<'ast> for ParameterCollector<'ast> {
    fn visit_parameter(&mut self, parameter: &'ast Parameter) {
        self.found.push(parameter);
    }
}

/// Returns every parameter occurrence in the statement, ordered by
/// position in the source.
#[must_use]
pub fn parameters(statement: &Statement) -> Vec<&Parameter> {
    let mut collector = ParameterCollector { found: vec![] };
    collector.visit_statement(statement);
    collector.found.sort_by_key(|p| p.span.start);
    collector.found
}
