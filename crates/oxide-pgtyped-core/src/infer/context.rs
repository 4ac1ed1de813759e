//! Name resolution for one query scope.
//!
//! A [`Context`] maps the names visible in a scope (table names, aliases,
//! CTE names) to what they stand for. Aliases are resolved to their
//! canonical `{schema, table}` when they are added, so every column type
//! refers to the real table whatever name the query used.

use tracing::trace;

use super::{ResultColumn, Type};
use crate::ast::{ColumnRef, StarRef, TableName};

/// What a visible name stands for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// A table or view.
    Table {
        /// Schema, the default one when unqualified.
        schema: String,
        /// Table name.
        table: String,
    },
    /// A subquery or CTE, typed by its own inferred result columns.
    Query {
        /// The result columns.
        columns: Vec<ResultColumn>,
    },
}

impl Source {
    /// Returns the type of `column` read through this source.
    pub fn column(&self, column: &str) -> Option<Type> {
        match self {
            Self::Table { schema, table } => Some(Type::LoadColumn {
                schema: schema.clone(),
                table: table.clone(),
                column: column.to_string(),
            }),
            Self::Query { columns } => columns
                .iter()
                .find(|c| c.name == column)
                .map(|c| c.ty.clone()),
        }
    }

    /// Returns the columns `*` expands to for this source.
    pub fn star(&self) -> Vec<ResultColumn> {
        match self {
            Self::Table { schema, table } => vec![ResultColumn::new(
                "*",
                Type::LoadStar {
                    schema: schema.clone(),
                    table: table.clone(),
                },
            )],
            Self::Query { columns } => columns.clone(),
        }
    }
}

/// The names visible in one scope, outer scopes included.
#[derive(Debug, Clone)]
pub struct Context {
    default_schema: String,
    sources: Vec<(String, Source)>,
    /// Index of the first source that belongs to the innermost scope.
    local: usize,
    primary: Option<Source>,
    primary_is_local: bool,
    ctes: Vec<(String, Vec<ResultColumn>)>,
}

impl Context {
    /// Creates an empty top-level scope.
    pub fn new(default_schema: impl Into<String>) -> Self {
        Self {
            default_schema: default_schema.into(),
            sources: vec![],
            local: 0,
            primary: None,
            primary_is_local: false,
            ctes: vec![],
        }
    }

    /// Opens a nested scope. Outer names stay visible for correlated
    /// references, but `*` and the primary table are local.
    pub fn child(&self) -> Self {
        let mut child = self.clone();
        child.local = child.sources.len();
        child.primary_is_local = false;
        child
    }

    /// Resolves a table reference: CTE names first, then real tables.
    pub fn resolve_table(&self, table: &TableName) -> Source {
        let name = table.name.normalized();
        if table.schema.is_none() {
            if let Some((_, columns)) = self.ctes.iter().rev().find(|(cte, _)| *cte == name) {
                return Source::Query {
                    columns: columns.clone(),
                };
            }
        }
        Source::Table {
            schema: table
                .schema
                .as_ref()
                .map_or_else(|| self.default_schema.clone(), |s| s.normalized()),
            table: name,
        }
    }

    /// Makes `source` visible as `name`. The first table added to a scope
    /// becomes its primary table.
    pub fn add_source(&mut self, name: String, source: Source) {
        trace!(name = %name, ?source, "alias added");
        if !self.primary_is_local && matches!(source, Source::Table { .. }) {
            self.primary = Some(source.clone());
            self.primary_is_local = true;
        }
        self.sources.push((name, source));
    }

    /// Makes a CTE visible to the rest of the statement.
    pub fn add_cte(&mut self, name: String, columns: Vec<ResultColumn>) {
        trace!(name = %name, columns = columns.len(), "cte added");
        self.ctes.push((name, columns));
    }

    /// Finds the source a qualifier refers to, innermost scope first.
    /// An aliased table can still be named by its table name.
    pub fn lookup(&self, qualifier: &str) -> Option<&Source> {
        let sources = || self.sources.iter().rev();
        sources()
            .find(|(name, _)| name == qualifier)
            .or_else(|| {
                sources().find(
                    |(_, source)| matches!(source, Source::Table { table, .. } if table == qualifier),
                )
            })
            .map(|(_, source)| source)
    }

    /// Returns the type of a column reference.
    ///
    /// Unqualified columns resolve to the innermost subquery source that
    /// projects them, then to the primary table.
    pub fn column(&self, column: &ColumnRef) -> Type {
        let name = column.name.normalized();
        match (&column.schema, &column.table) {
            (Some(schema), Some(table)) => Type::LoadColumn {
                schema: schema.normalized(),
                table: table.normalized(),
                column: name,
            },
            (_, Some(table)) => {
                let qualifier = table.normalized();
                match self.lookup(&qualifier) {
                    Some(source) => source.column(&name).unwrap_or(Type::Unknown),
                    None => Type::LoadColumn {
                        schema: self.default_schema.clone(),
                        table: qualifier,
                        column: name,
                    },
                }
            }
            _ => self.unqualified(&name),
        }
    }

    /// Returns the type of an unqualified column name.
    pub fn unqualified(&self, name: &str) -> Type {
        let projected = self.sources.iter().rev().find_map(|(_, source)| match source {
            Source::Query { .. } => source.column(name),
            Source::Table { .. } => None,
        });
        projected
            .or_else(|| self.primary.as_ref().and_then(|p| p.column(name)))
            .unwrap_or(Type::Unknown)
    }

    /// Expands `*` or `t.*`.
    pub fn star(&self, star: &StarRef) -> Vec<ResultColumn> {
        let Some(table) = &star.table else {
            return self.sources[self.local..]
                .iter()
                .flat_map(|(_, source)| source.star())
                .collect();
        };
        let qualifier = table.normalized();
        if let Some(schema) = &star.schema {
            return Source::Table {
                schema: schema.normalized(),
                table: qualifier,
            }
            .star();
        }
        match self.lookup(&qualifier) {
            Some(source) => source.star(),
            None => Source::Table {
                schema: self.default_schema.clone(),
                table: qualifier,
            }
            .star(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Ident;
    use crate::runtime::Span;

    fn ident(value: &str) -> Ident {
        Ident::new(value, Span::default())
    }

    fn table(schema: Option<&str>, name: &str) -> TableName {
        TableName {
            schema: schema.map(ident),
            name: ident(name),
            span: Span::default(),
        }
    }

    fn column(table: Option<&str>, name: &str) -> ColumnRef {
        ColumnRef {
            schema: None,
            table: table.map(ident),
            name: ident(name),
            span: Span::default(),
        }
    }

    fn load(table: &str, column: &str) -> Type {
        Type::LoadColumn {
            schema: "public".into(),
            table: table.into(),
            column: column.into(),
        }
    }

    #[test]
    fn test_alias_resolves_to_table() {
        let mut ctx = Context::new("public");
        let source = ctx.resolve_table(&table(None, "users"));
        ctx.add_source("u".into(), source);
        assert_eq!(ctx.column(&column(Some("u"), "id")), load("users", "id"));
        assert_eq!(ctx.column(&column(Some("users"), "id")), load("users", "id"));
        assert_eq!(ctx.column(&column(None, "id")), load("users", "id"));
    }

    #[test]
    fn test_schema_qualified_table() {
        let ctx = Context::new("public");
        assert_eq!(
            ctx.resolve_table(&table(Some("Billing"), "Invoices")),
            Source::Table {
                schema: "billing".into(),
                table: "invoices".into()
            }
        );
    }

    #[test]
    fn test_cte_shadows_table() {
        let mut ctx = Context::new("public");
        ctx.add_cte("tmp".into(), vec![ResultColumn::new("id", Type::Number)]);
        let source = ctx.resolve_table(&table(None, "tmp"));
        assert!(matches!(source, Source::Query { .. }));
        ctx.add_source("tmp".into(), source);
        assert_eq!(ctx.column(&column(Some("tmp"), "id")), Type::Number);
        assert_eq!(ctx.column(&column(Some("tmp"), "missing")), Type::Unknown);
    }

    #[test]
    fn test_child_scope_keeps_outer_names() {
        let mut outer = Context::new("public");
        outer.add_source("a".into(), ctx_table("accounts"));
        let mut inner = outer.child();
        inner.add_source("o".into(), ctx_table("orders"));
        assert_eq!(inner.column(&column(Some("a"), "id")), load("accounts", "id"));
        assert_eq!(inner.column(&column(None, "total")), load("orders", "total"));
        let star = StarRef {
            schema: None,
            table: None,
            span: Span::default(),
        };
        assert_eq!(inner.star(&star).len(), 1);
    }

    fn ctx_table(name: &str) -> Source {
        Source::Table {
            schema: "public".into(),
            table: name.into(),
        }
    }
}
