//! Statement typing: scopes, projections and the DML forms.

use tracing::trace;

use super::context::{Context, Source};
use super::expression::column_name;
use super::params::shape;
use super::{InferError, Inferrer, ResultColumn, Type};
use crate::ast::{
    ConflictAction, DeleteStatement, Distinct, FromItem, FromSource, Ident, InsertSource,
    InsertStatement, JoinCondition, SelectCore, SelectItem, SelectStatement, SetClause,
    SetMapSource, Statement, TableName, UpdateStatement, ValuesItem, WithStatement,
};

impl Inferrer {
    /// Types a statement, returning its result columns.
    pub(super) fn statement(
        &mut self,
        statement: &Statement,
        ctx: &Context,
    ) -> Result<Vec<ResultColumn>, InferError> {
        match statement {
            Statement::Select(select) => self.select(select, ctx),
            Statement::Insert(insert) => self.insert(insert, ctx),
            Statement::Update(update) => self.update(update, ctx),
            Statement::Delete(delete) => self.delete(delete, ctx),
            Statement::With(with) => self.with(with, ctx),
        }
    }

    /// Types a SELECT. Blocks joined by set operators are merged column by
    /// column; names come from the first block.
    pub(super) fn select(
        &mut self,
        select: &SelectStatement,
        ctx: &Context,
    ) -> Result<Vec<ResultColumn>, InferError> {
        let (mut results, scope) = self.core(&select.core, ctx)?;
        for combination in &select.combinations {
            let (columns, _) = self.core(&combination.select, ctx)?;
            for (result, column) in results.iter_mut().zip(columns) {
                result.ty = Type::union([result.ty.clone(), column.ty]);
            }
        }
        for order in &select.order_by {
            self.expr(&order.expr, &scope, &Type::Unknown)?;
        }
        for bound in select.limit.iter().chain(&select.offset) {
            self.expr(bound, &scope, &Type::Number)?;
        }
        Ok(results)
    }

    fn core(
        &mut self,
        core: &SelectCore,
        ctx: &Context,
    ) -> Result<(Vec<ResultColumn>, Context), InferError> {
        let scope = self.scope(ctx, &core.from)?;
        if let Some(Distinct::On(exprs)) = &core.distinct {
            for expr in exprs {
                self.expr(expr, &scope, &Type::Unknown)?;
            }
        }
        let results = self.projection(&core.columns, &scope)?;
        if let Some(condition) = &core.where_clause {
            self.expr(condition, &scope, &Type::Boolean)?;
        }
        for expr in &core.group_by {
            self.expr(expr, &scope, &Type::Unknown)?;
        }
        if let Some(condition) = &core.having {
            self.expr(condition, &scope, &Type::Boolean)?;
        }
        if results.is_empty() {
            return Err(InferError::EmptyProjection { span: core.span });
        }
        Ok((results, scope))
    }

    /// Opens a scope holding the sources of a FROM list.
    fn scope(&mut self, parent: &Context, from: &[FromItem]) -> Result<Context, InferError> {
        self.extend_scope(parent, parent.child(), from)
    }

    fn add_source(
        &mut self,
        parent: &Context,
        scope: &mut Context,
        source: &FromSource,
    ) -> Result<(), InferError> {
        let resolved = match source {
            FromSource::Table { table, .. } => scope.resolve_table(table),
            FromSource::Subquery { query, .. } => Source::Query {
                columns: self.select(query, parent)?,
            },
        };
        scope.add_source(source.visible_name().normalized(), resolved);
        Ok(())
    }

    /// Types a SELECT or RETURNING list.
    fn projection(
        &mut self,
        items: &[SelectItem],
        scope: &Context,
    ) -> Result<Vec<ResultColumn>, InferError> {
        let mut results = Vec::with_capacity(items.len());
        for item in items {
            match item {
                SelectItem::Star(star) => results.extend(scope.star(star)),
                SelectItem::Expr { expr, alias, .. } => {
                    let ty = self.expr(expr, scope, &Type::Unknown)?;
                    let name = alias
                        .as_ref()
                        .map_or_else(|| column_name(expr), Ident::normalized);
                    results.push(ResultColumn::new(name, ty));
                }
            }
        }
        Ok(results)
    }

    /// Opens a scope for the target table of a DML statement.
    fn target(ctx: &Context, table: &TableName, alias: Option<&Ident>) -> (Context, Source) {
        let mut scope = ctx.child();
        let source = scope.resolve_table(table);
        let name = alias.unwrap_or(&table.name).normalized();
        scope.add_source(name, source.clone());
        (scope, source)
    }

    fn insert(
        &mut self,
        insert: &InsertStatement,
        ctx: &Context,
    ) -> Result<Vec<ResultColumn>, InferError> {
        let (scope, target) = Self::target(ctx, &insert.table, insert.alias.as_ref());
        let columns: Vec<(String, Type)> = insert
            .columns
            .iter()
            .map(|column| {
                let name = column.normalized();
                let ty = target.column(&name).unwrap_or(Type::Unknown);
                (name, ty)
            })
            .collect();
        match &insert.source {
            InsertSource::Values(rows) => {
                for row in rows {
                    self.values_item(row, &columns, &target, &scope)?;
                }
            }
            InsertSource::Select(select) => {
                self.select(select, ctx)?;
            }
            InsertSource::DefaultValues => {}
        }
        if let Some(conflict) = &insert.on_conflict {
            if let ConflictAction::DoUpdate { set, where_clause } = &conflict.action {
                let mut upsert = scope.clone();
                upsert.add_source("excluded".to_string(), target.clone());
                self.set_list(set, &target, &upsert)?;
                if let Some(condition) = where_clause {
                    self.expr(condition, &upsert, &Type::Boolean)?;
                }
            }
        }
        self.projection(&insert.returning, &scope)
    }

    /// Types one VALUES entry against the insert column list.
    fn values_item(
        &mut self,
        item: &ValuesItem,
        columns: &[(String, Type)],
        target: &Source,
        scope: &Context,
    ) -> Result<(), InferError> {
        match item {
            ValuesItem::Row { values, .. } => {
                for (i, value) in values.iter().enumerate() {
                    let expected = columns.get(i).map_or(Type::Unknown, |(_, ty)| ty.clone());
                    self.expr(value, scope, &expected)?;
                }
            }
            ValuesItem::Parameter(param) if param.pick.is_empty() => {
                let expected = columns.first().map_or(Type::Unknown, |(_, ty)| ty.clone());
                self.params.add(param, shape(param, expected));
            }
            ValuesItem::Parameter(param) => {
                let fields = param.pick.iter().enumerate().map(|(i, field)| {
                    let name = field.normalized();
                    let ty = columns.get(i).map_or_else(
                        || target.column(&name).unwrap_or(Type::Unknown),
                        |(_, ty)| ty.clone(),
                    );
                    (name, ty)
                });
                let row = Type::object(fields);
                self.params.add(param, shape(param, row));
            }
        }
        Ok(())
    }

    /// Types SET assignments against the columns of `target`.
    fn set_list(
        &mut self,
        set: &[SetClause],
        target: &Source,
        scope: &Context,
    ) -> Result<(), InferError> {
        let column = |ident: &Ident| target.column(&ident.normalized()).unwrap_or(Type::Unknown);
        for clause in set {
            match clause {
                SetClause::Item { column: name, value, .. } => {
                    self.expr(value, scope, &column(name))?;
                }
                SetClause::Map {
                    columns,
                    source: SetMapSource::Row(row),
                    span,
                } => {
                    if row.items.len() != columns.len() {
                        return Err(InferError::UnsupportedShape {
                            what: format!(
                                "assignment of {} values to {} columns",
                                row.items.len(),
                                columns.len()
                            ),
                            span: *span,
                        });
                    }
                    for (name, value) in columns.iter().zip(&row.items) {
                        self.expr(value, scope, &column(name))?;
                    }
                }
                SetClause::Map {
                    source: SetMapSource::Subquery(query),
                    ..
                } => {
                    self.select(query, scope)?;
                }
            }
        }
        Ok(())
    }

    fn update(
        &mut self,
        update: &UpdateStatement,
        ctx: &Context,
    ) -> Result<Vec<ResultColumn>, InferError> {
        let (target_scope, target) = Self::target(ctx, &update.table, update.alias.as_ref());
        let scope = self.extend_scope(ctx, target_scope, &update.from)?;
        self.set_list(&update.set, &target, &scope)?;
        if let Some(condition) = &update.where_clause {
            self.expr(condition, &scope, &Type::Boolean)?;
        }
        self.projection(&update.returning, &scope)
    }

    fn delete(
        &mut self,
        delete: &DeleteStatement,
        ctx: &Context,
    ) -> Result<Vec<ResultColumn>, InferError> {
        let (target_scope, _) = Self::target(ctx, &delete.table, delete.alias.as_ref());
        let scope = self.extend_scope(ctx, target_scope, &delete.using)?;
        if let Some(condition) = &delete.where_clause {
            self.expr(condition, &scope, &Type::Boolean)?;
        }
        self.projection(&delete.returning, &scope)
    }

    /// Adds the sources of a FROM list to `scope`, left to right. Join
    /// conditions see every source to their left; subqueries only see
    /// `parent`.
    fn extend_scope(
        &mut self,
        parent: &Context,
        mut scope: Context,
        from: &[FromItem],
    ) -> Result<Context, InferError> {
        for item in from {
            self.add_source(parent, &mut scope, &item.source)?;
            for join in &item.joins {
                self.add_source(parent, &mut scope, &join.source)?;
                if let Some(JoinCondition::On(condition)) = &join.condition {
                    self.expr(condition, &scope, &Type::Boolean)?;
                }
            }
        }
        trace!(sources = from.len(), "scope built");
        Ok(scope)
    }

    /// Types each CTE in order, exposing it to the ones after it and to
    /// the body as a pseudo-table.
    fn with(
        &mut self,
        with: &WithStatement,
        ctx: &Context,
    ) -> Result<Vec<ResultColumn>, InferError> {
        let mut scope = ctx.clone();
        for cte in &with.ctes {
            let mut columns = self.statement(&cte.query, &scope)?;
            for (column, name) in columns.iter_mut().zip(&cte.columns) {
                column.name = name.normalized();
            }
            scope.add_cte(cte.name.normalized(), columns);
        }
        self.statement(&with.body, &scope)
    }
}
