//! Single-line SQL rendering of the AST.
//!
//! The output re-parses to a structurally identical tree; it makes no
//! attempt at layout.

use std::fmt::{self, Display, Formatter};

use super::expression::{
    ArrayItems, ColumnRef, Expr, Ident, Literal, LiteralKind, Parameter, ParameterKind,
    ParameterStyle, QuantifiedSubject, RowExpr, StarRef, WhenClause, WindowSpec,
};
use super::statement::{
    Combination, ConflictAction, ConflictTarget, Cte, DeleteStatement, Distinct, FromItem,
    FromSource, InsertSource, InsertStatement, Join, JoinCondition, OnConflict, OrderBy,
    SelectCore, SelectItem, SelectStatement, SetClause, SetMapSource, Statement, TableName,
    UpdateStatement, ValuesItem, WithStatement,
};
use super::types::DataType;

/// Comma-separated rendering of a slice.
struct Comma<'a, T>(&'a [T]);

impl<T: Display> Display for Comma<'_, T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (i, item) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{item}")?;
        }
        Ok(())
    }
}

impl Display for Ident {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.quoted {
            write!(f, "\"{}\"", self.value.replace('"', "\"\""))
        } else {
            f.write_str(&self.value)
        }
    }
}

impl Display for ColumnRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if let Some(schema) = &self.schema {
            write!(f, "{schema}.")?;
        }
        if let Some(table) = &self.table {
            write!(f, "{table}.")?;
        }
        write!(f, "{}", self.name)
    }
}

impl Display for StarRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if let Some(schema) = &self.schema {
            write!(f, "{schema}.")?;
        }
        if let Some(table) = &self.table {
            write!(f, "{table}.")?;
        }
        f.write_str("*")
    }
}

impl Display for Literal {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.kind {
            LiteralKind::String => write!(f, "'{}'", self.value.replace('\'', "''")),
            LiteralKind::EscapeString => write!(f, "E'{}'", self.value),
            LiteralKind::DollarString { tag } => write!(f, "${tag}${}${tag}$", self.value),
            LiteralKind::BitString => write!(f, "B'{}'", self.value),
            LiteralKind::HexString => write!(f, "X'{}'", self.value),
            LiteralKind::Integer | LiteralKind::Decimal => f.write_str(&self.value),
            LiteralKind::Boolean => f.write_str(&self.value.to_uppercase()),
            LiteralKind::Null => f.write_str("NULL"),
        }
    }
}

impl Display for Parameter {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let sigil = match (self.kind, self.style) {
            (ParameterKind::Spread, _) => "$$",
            (ParameterKind::Single, ParameterStyle::Dollar) => "$",
            (ParameterKind::Single, ParameterStyle::Colon) => ":",
        };
        write!(f, "{sigil}{}", self.name)?;
        if self.required {
            f.write_str("!")?;
        }
        if !self.pick.is_empty() {
            write!(f, "({})", Comma(&self.pick))?;
        }
        Ok(())
    }
}

impl Display for DataType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if let Some(schema) = &self.schema {
            if self.schema_needs_quotes() {
                write!(f, "\"{}\".", schema.replace('"', "\"\""))?;
            } else {
                write!(f, "{schema}.")?;
            }
        }
        // `timestamp(3) with time zone`: the precision precedes the zone.
        let zoned = self
            .name
            .split_once(' ')
            .filter(|(base, _)| {
                !self.quoted && self.schema.is_none() && matches!(*base, "time" | "timestamp")
            });
        match zoned {
            Some((base, zone)) if !self.modifiers.is_empty() => {
                write!(f, "{base}({}) {zone}", Comma(&self.modifiers))?;
            }
            _ => {
                if self.needs_quotes() {
                    write!(f, "\"{}\"", self.name.replace('"', "\"\""))?;
                } else {
                    f.write_str(&self.name)?;
                }
                if !self.modifiers.is_empty() {
                    write!(f, "({})", Comma(&self.modifiers))?;
                }
            }
        }
        for _ in 0..self.array_dims {
            f.write_str("[]")?;
        }
        Ok(())
    }
}

impl Display for RowExpr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.explicit {
            f.write_str("ROW")?;
        }
        write!(f, "({})", Comma(&self.items))
    }
}

impl Display for WhenClause {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "WHEN {} THEN {}", self.condition, self.result)
    }
}

impl Display for WindowSpec {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("OVER (")?;
        let mut sep = "";
        if !self.partition_by.is_empty() {
            write!(f, "PARTITION BY {}", Comma(&self.partition_by))?;
            sep = " ";
        }
        if !self.order_by.is_empty() {
            write!(f, "{sep}ORDER BY {}", Comma(&self.order_by))?;
        }
        f.write_str(")")
    }
}

fn write_case_tail(
    f: &mut Formatter<'_>,
    whens: &[WhenClause],
    else_result: Option<&Expr>,
) -> fmt::Result {
    for when in whens {
        write!(f, " {when}")?;
    }
    if let Some(else_result) = else_result {
        write!(f, " ELSE {else_result}")?;
    }
    f.write_str(" END")
}

impl Display for Expr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(lit) => write!(f, "{lit}"),
            Self::Column(col) => write!(f, "{col}"),
            Self::Parameter(param) => write!(f, "{param}"),
            Self::Default(_) => f.write_str("DEFAULT"),
            Self::Binary(e) => write!(f, "{} {} {}", e.left, e.op.as_str(), e.right),
            Self::Unary(e) => write!(f, "{} {}", e.op.as_str(), e.operand),
            Self::Between(e) => {
                write!(f, "{} ", e.expr)?;
                if e.negated {
                    f.write_str("NOT ")?;
                }
                f.write_str("BETWEEN ")?;
                if e.symmetric {
                    f.write_str("SYMMETRIC ")?;
                }
                write!(f, "{} AND {}", e.low, e.high)
            }
            Self::ArrayIndex(e) => match &e.upper {
                Some(upper) => write!(f, "{}[{}:{upper}]", e.target, e.index),
                None => write!(f, "{}[{}]", e.target, e.index),
            },
            Self::Array(e) => match &e.items {
                ArrayItems::List(items) => write!(f, "ARRAY[{}]", Comma(items)),
                ArrayItems::Subquery(query) => write!(f, "ARRAY({query})"),
            },
            Self::Row(row) => write!(f, "{row}"),
            Self::Exists(e) => write!(f, "EXISTS ({})", e.query),
            Self::InSubquery(e) => {
                let op = if e.negated { "NOT IN" } else { "IN" };
                write!(f, "{} {op} ({})", e.expr, e.query)
            }
            Self::Quantified(e) => {
                write!(f, "{} {} {}", e.left, e.op.as_str(), e.quantifier.as_str())?;
                match &e.subject {
                    QuantifiedSubject::Subquery(query) => write!(f, "({query})"),
                    QuantifiedSubject::Array(expr) => write!(f, "({expr})"),
                }
            }
            Self::RowCompare(e) => write!(f, "{} {} ({})", e.row, e.op.as_str(), e.query),
            Self::Builtin(e) => f.write_str(e.kind.as_str()),
            Self::Nullif(e) => write!(f, "NULLIF({}, {})", e.value, e.other),
            Self::Conditional(e) => write!(f, "{}({})", e.kind.as_str(), Comma(&e.args)),
            Self::CaseSimple(e) => {
                write!(f, "CASE {}", e.operand)?;
                write_case_tail(f, &e.whens, e.else_result.as_ref())
            }
            Self::Case(e) => {
                f.write_str("CASE")?;
                write_case_tail(f, &e.whens, e.else_result.as_ref())
            }
            Self::Cast(e) => write!(f, "CAST({} AS {})", e.value, e.data_type),
            Self::PgCast(e) => write!(f, "{}::{}", e.value, e.data_type),
            Self::Extract(e) => write!(f, "EXTRACT({} FROM {})", e.field, e.source),
            Self::Function(e) => {
                if let Some(schema) = &e.schema {
                    write!(f, "{schema}.")?;
                }
                write!(f, "{}(", e.name)?;
                if e.distinct {
                    f.write_str("DISTINCT ")?;
                }
                if e.star {
                    f.write_str("*")?;
                } else {
                    write!(f, "{}", Comma(&e.args))?;
                }
                if !e.order_by.is_empty() {
                    write!(f, " ORDER BY {}", Comma(&e.order_by))?;
                }
                f.write_str(")")?;
                if let Some(filter) = &e.filter {
                    write!(f, " FILTER (WHERE {filter})")?;
                }
                if let Some(over) = &e.over {
                    write!(f, " {over}")?;
                }
                Ok(())
            }
            Self::Subquery(e) => write!(f, "({})", e.query),
            Self::Paren(e) => write!(f, "({})", e.expr),
        }
    }
}

impl Display for OrderBy {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.expr)?;
        if let Some(direction) = self.direction {
            write!(f, " {}", direction.as_str())?;
        }
        if let Some(nulls) = self.nulls {
            write!(f, " {}", nulls.as_str())?;
        }
        Ok(())
    }
}

impl Display for TableName {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if let Some(schema) = &self.schema {
            write!(f, "{schema}.")?;
        }
        write!(f, "{}", self.name)
    }
}

impl Display for FromSource {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Table { table, alias } => {
                write!(f, "{table}")?;
                if let Some(alias) = alias {
                    write!(f, " AS {alias}")?;
                }
                Ok(())
            }
            Self::Subquery { query, alias, .. } => write!(f, "({query}) AS {alias}"),
        }
    }
}

impl Display for Join {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.natural {
            f.write_str("NATURAL ")?;
        }
        write!(f, "{} {}", self.join_type.as_str(), self.source)?;
        match &self.condition {
            Some(JoinCondition::On(expr)) => write!(f, " ON {expr}"),
            Some(JoinCondition::Using(columns)) => write!(f, " USING ({})", Comma(columns)),
            None => Ok(()),
        }
    }
}

impl Display for FromItem {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.source)?;
        for join in &self.joins {
            write!(f, " {join}")?;
        }
        Ok(())
    }
}

impl Display for SelectItem {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Expr { expr, alias, .. } => {
                write!(f, "{expr}")?;
                if let Some(alias) = alias {
                    write!(f, " AS {alias}")?;
                }
                Ok(())
            }
            Self::Star(star) => write!(f, "{star}"),
        }
    }
}

impl Display for SelectCore {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("SELECT ")?;
        match &self.distinct {
            Some(Distinct::All) => f.write_str("DISTINCT ")?,
            Some(Distinct::On(exprs)) => write!(f, "DISTINCT ON ({}) ", Comma(exprs))?,
            None => {}
        }
        write!(f, "{}", Comma(&self.columns))?;
        if !self.from.is_empty() {
            write!(f, " FROM {}", Comma(&self.from))?;
        }
        if let Some(where_clause) = &self.where_clause {
            write!(f, " WHERE {where_clause}")?;
        }
        if !self.group_by.is_empty() {
            write!(f, " GROUP BY {}", Comma(&self.group_by))?;
        }
        if let Some(having) = &self.having {
            write!(f, " HAVING {having}")?;
        }
        Ok(())
    }
}

impl Display for Combination {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.op.as_str(), self.select)
    }
}

impl Display for SelectStatement {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.core)?;
        for combination in &self.combinations {
            write!(f, " {combination}")?;
        }
        if !self.order_by.is_empty() {
            write!(f, " ORDER BY {}", Comma(&self.order_by))?;
        }
        if let Some(limit) = &self.limit {
            write!(f, " LIMIT {limit}")?;
        }
        if let Some(offset) = &self.offset {
            write!(f, " OFFSET {offset}")?;
        }
        Ok(())
    }
}

impl Display for SetClause {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Item { column, value, .. } => write!(f, "{column} = {value}"),
            Self::Map {
                columns, source, ..
            } => {
                write!(f, "({}) = ", Comma(columns))?;
                match source {
                    SetMapSource::Row(row) => write!(f, "{row}"),
                    SetMapSource::Subquery(query) => write!(f, "({query})"),
                }
            }
        }
    }
}

fn write_returning(f: &mut Formatter<'_>, returning: &[SelectItem]) -> fmt::Result {
    if returning.is_empty() {
        Ok(())
    } else {
        write!(f, " RETURNING {}", Comma(returning))
    }
}

impl Display for UpdateStatement {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "UPDATE {}", self.table)?;
        if let Some(alias) = &self.alias {
            write!(f, " AS {alias}")?;
        }
        write!(f, " SET {}", Comma(&self.set))?;
        if !self.from.is_empty() {
            write!(f, " FROM {}", Comma(&self.from))?;
        }
        if let Some(where_clause) = &self.where_clause {
            write!(f, " WHERE {where_clause}")?;
        }
        write_returning(f, &self.returning)
    }
}

impl Display for DeleteStatement {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "DELETE FROM {}", self.table)?;
        if let Some(alias) = &self.alias {
            write!(f, " AS {alias}")?;
        }
        if !self.using.is_empty() {
            write!(f, " USING {}", Comma(&self.using))?;
        }
        if let Some(where_clause) = &self.where_clause {
            write!(f, " WHERE {where_clause}")?;
        }
        write_returning(f, &self.returning)
    }
}

impl Display for ValuesItem {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Row { values, .. } => write!(f, "({})", Comma(values)),
            Self::Parameter(param) => write!(f, "{param}"),
        }
    }
}

impl Display for OnConflict {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("ON CONFLICT")?;
        match &self.target {
            Some(ConflictTarget::Columns(columns)) => write!(f, " ({})", Comma(columns))?,
            Some(ConflictTarget::Constraint(name)) => write!(f, " ON CONSTRAINT {name}")?,
            None => {}
        }
        match &self.action {
            ConflictAction::DoNothing => f.write_str(" DO NOTHING"),
            ConflictAction::DoUpdate { set, where_clause } => {
                write!(f, " DO UPDATE SET {}", Comma(set))?;
                if let Some(where_clause) = where_clause {
                    write!(f, " WHERE {where_clause}")?;
                }
                Ok(())
            }
        }
    }
}

impl Display for InsertStatement {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "INSERT INTO {}", self.table)?;
        if let Some(alias) = &self.alias {
            write!(f, " AS {alias}")?;
        }
        if !self.columns.is_empty() {
            write!(f, " ({})", Comma(&self.columns))?;
        }
        match &self.source {
            InsertSource::Values(items) => write!(f, " VALUES {}", Comma(items))?,
            InsertSource::Select(query) => write!(f, " {query}")?,
            InsertSource::DefaultValues => f.write_str(" DEFAULT VALUES")?,
        }
        if let Some(on_conflict) = &self.on_conflict {
            write!(f, " {on_conflict}")?;
        }
        write_returning(f, &self.returning)
    }
}

impl Display for Cte {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.columns.is_empty() {
            write!(f, "({})", Comma(&self.columns))?;
        }
        write!(f, " AS ({})", self.query)
    }
}

impl Display for WithStatement {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("WITH ")?;
        if self.recursive {
            f.write_str("RECURSIVE ")?;
        }
        write!(f, "{} {}", Comma(&self.ctes), self.body)
    }
}

impl Display for Statement {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Select(s) => write!(f, "{s}"),
            Self::Insert(s) => write!(f, "{s}"),
            Self::Update(s) => write!(f, "{s}"),
            Self::Delete(s) => write!(f, "{s}"),
            Self::With(s) => write!(f, "{s}"),
        }
    }
}
