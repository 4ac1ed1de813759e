//! Expression typing.
//!
//! Every expression is typed with the type its position expects. The
//! expectation only matters for parameters, which take it as their own
//! type; everything else computes its type bottom-up.

use super::context::Context;
use super::params::shape;
use super::signatures::binary_result;
use super::{InferError, Inferrer, Type};
use crate::ast::{
    ArrayItems, BinaryExpr, BinaryOp, BuiltinKind, Expr, FunctionCall, Ident, LiteralKind,
    QuantifiedSubject, SelectItem, SelectStatement, UnaryOp, WhenClause,
};

impl Inferrer {
    /// Types `expr`, recording the parameters it contains.
    pub(super) fn expr(
        &mut self,
        expr: &Expr,
        ctx: &Context,
        expected: &Type,
    ) -> Result<Type, InferError> {
        let ty = match expr {
            Expr::Literal(literal) => match literal.kind {
                LiteralKind::Integer | LiteralKind::Decimal => Type::Number,
                LiteralKind::Boolean => Type::Boolean,
                LiteralKind::Null => Type::Null,
                LiteralKind::String
                | LiteralKind::EscapeString
                | LiteralKind::DollarString { .. }
                | LiteralKind::BitString
                | LiteralKind::HexString => Type::String,
            },
            Expr::Column(column) => ctx.column(column),
            Expr::Parameter(param) => {
                let ty = shape(param, expected.clone());
                self.params.add(param, ty.clone());
                ty
            }
            Expr::Default(_) => expected.clone(),
            Expr::Binary(binary) => self.binary(binary, ctx)?,
            Expr::Unary(unary) => match unary.op {
                UnaryOp::Not => {
                    self.expr(&unary.operand, ctx, &Type::Boolean)?;
                    Type::Boolean
                }
                UnaryOp::IsNull | UnaryOp::NotNull => {
                    self.expr(&unary.operand, ctx, &Type::Unknown)?;
                    Type::Boolean
                }
                UnaryOp::Plus | UnaryOp::Neg => {
                    let expected = if expected.is_placeholder() {
                        &Type::Number
                    } else {
                        expected
                    };
                    self.expr(&unary.operand, ctx, expected)?
                }
            },
            Expr::Between(between) => {
                let (_, low) = self.paired(&between.expr, &between.low, ctx)?;
                self.expr(&between.high, ctx, &low)?;
                Type::Boolean
            }
            Expr::ArrayIndex(index) => {
                let target = self.expr(&index.target, ctx, &Type::Unknown)?;
                self.expr(&index.index, ctx, &Type::Number)?;
                if let Some(upper) = &index.upper {
                    self.expr(upper, ctx, &Type::Number)?;
                }
                match target {
                    Type::Array { items } if index.upper.is_none() => *items,
                    Type::Array { items } => Type::Array { items },
                    _ => Type::Unknown,
                }
            }
            Expr::Array(array) => match &array.items {
                ArrayItems::List(items) => {
                    let element = match expected {
                        Type::Array { items } => (**items).clone(),
                        _ => Type::Unknown,
                    };
                    let types = self.alike(items, ctx, &element)?;
                    Type::array(Type::union(types))
                }
                ArrayItems::Subquery(query) => {
                    Type::array(self.scalar_subquery(query, ctx)?)
                }
            },
            Expr::Row(row) => {
                for item in &row.items {
                    self.expr(item, ctx, &Type::Unknown)?;
                }
                Type::Unknown
            }
            Expr::Exists(subquery) => {
                self.select(&subquery.query, ctx)?;
                Type::Boolean
            }
            Expr::InSubquery(membership) => {
                let columns = self.select(&membership.query, ctx)?;
                let element = columns.first().map_or(Type::Unknown, |c| c.ty.clone());
                self.expr(&membership.expr, ctx, &element)?;
                Type::Boolean
            }
            Expr::Quantified(quantified) => {
                let element = match &quantified.subject {
                    QuantifiedSubject::Subquery(query) => {
                        let columns = self.select(query, ctx)?;
                        columns.first().map_or(Type::Unknown, |c| c.ty.clone())
                    }
                    QuantifiedSubject::Array(array) if is_parameter(array) => {
                        let left = self.expr(&quantified.left, ctx, &Type::Unknown)?;
                        self.expr(array, ctx, &Type::array(left.clone()))?;
                        return Ok(Type::Boolean);
                    }
                    QuantifiedSubject::Array(array) => {
                        match self.expr(array, ctx, &Type::Unknown)? {
                            Type::Array { items } => *items,
                            _ => Type::Unknown,
                        }
                    }
                };
                let element = if is_text_match(quantified.op) {
                    Type::String
                } else {
                    element
                };
                self.expr(&quantified.left, ctx, &element)?;
                Type::Boolean
            }
            Expr::RowCompare(compare) => {
                let columns = self.select(&compare.query, ctx)?;
                for (i, item) in compare.row.items.iter().enumerate() {
                    let element = columns.get(i).map_or(Type::Unknown, |c| c.ty.clone());
                    self.expr(item, ctx, &element)?;
                }
                Type::Boolean
            }
            Expr::Builtin(builtin) => match builtin.kind {
                BuiltinKind::CurrentDate
                | BuiltinKind::CurrentTime
                | BuiltinKind::CurrentTimestamp
                | BuiltinKind::LocalTime
                | BuiltinKind::LocalTimestamp => Type::Date,
                BuiltinKind::CurrentUser
                | BuiltinKind::SessionUser
                | BuiltinKind::CurrentRole
                | BuiltinKind::CurrentCatalog
                | BuiltinKind::CurrentSchema
                | BuiltinKind::User => Type::String,
            },
            Expr::Nullif(nullif) => {
                let (value, _) = self.paired(&nullif.value, &nullif.other, ctx)?;
                Type::union([value, Type::Null])
            }
            Expr::Conditional(conditional) => {
                Type::union(self.alike(&conditional.args, ctx, expected)?)
            }
            Expr::CaseSimple(case) => {
                let operand = self.expr(&case.operand, ctx, &Type::Unknown)?;
                self.case(&case.whens, case.else_result.as_ref(), ctx, &operand, expected)?
            }
            Expr::Case(case) => {
                self.case(&case.whens, case.else_result.as_ref(), ctx, &Type::Boolean, expected)?
            }
            Expr::Cast(cast) | Expr::PgCast(cast) => {
                let target = Type::from_data_type(&cast.data_type);
                self.expr(&cast.value, ctx, &target)?;
                target
            }
            Expr::Extract(extract) => {
                self.expr(&extract.source, ctx, &Type::Date)?;
                Type::Number
            }
            Expr::Function(call) => self.function(call, ctx)?,
            Expr::Subquery(subquery) => self.scalar_subquery(&subquery.query, ctx)?,
            Expr::Paren(paren) => self.expr(&paren.expr, ctx, expected)?,
        };
        Ok(ty)
    }

    fn binary(&mut self, binary: &BinaryExpr, ctx: &Context) -> Result<Type, InferError> {
        use BinaryOp as Op;

        let (left, right) = (&binary.left, &binary.right);
        match binary.op {
            Op::And | Op::Or => {
                self.expr(left, ctx, &Type::Boolean)?;
                self.expr(right, ctx, &Type::Boolean)?;
                Ok(Type::Boolean)
            }
            op if is_text_match(op) => {
                self.expr(left, ctx, &Type::String)?;
                self.expr(right, ctx, &Type::String)?;
                Ok(Type::Boolean)
            }
            Op::In | Op::NotIn => {
                let element = self.expr(left, ctx, &Type::Unknown)?;
                self.membership(right, ctx, &element)?;
                Ok(Type::Boolean)
            }
            Op::Is | Op::IsNot => {
                self.expr(left, ctx, &Type::Unknown)?;
                self.expr(right, ctx, &Type::Unknown)?;
                Ok(Type::Boolean)
            }
            Op::JsonGet | Op::JsonGetText | Op::JsonHasKey => {
                let target = self.expr(left, ctx, &Type::Json)?;
                let key = self.expr(right, ctx, &Type::String)?;
                Ok(binary_result(binary.op, &target, &key))
            }
            Op::JsonPath | Op::JsonPathText | Op::JsonDeletePath | Op::JsonAnyKey
            | Op::JsonAllKeys => {
                let target = self.expr(left, ctx, &Type::Json)?;
                let path = self.expr(right, ctx, &Type::array(Type::String))?;
                Ok(binary_result(binary.op, &target, &path))
            }
            op => {
                let (left, right) = self.paired(left, right, ctx)?;
                Ok(binary_result(op, &left, &right))
            }
        }
    }

    /// Types two operands that constrain each other. A bare parameter
    /// takes the type of the other side, whichever side it is on.
    fn paired(
        &mut self,
        left: &Expr,
        right: &Expr,
        ctx: &Context,
    ) -> Result<(Type, Type), InferError> {
        if is_parameter(left) && !is_parameter(right) {
            let right = self.expr(right, ctx, &Type::Unknown)?;
            let left = self.expr(left, ctx, &right)?;
            Ok((left, right))
        } else {
            let left = self.expr(left, ctx, &Type::Unknown)?;
            let right = self.expr(right, ctx, &left)?;
            Ok((left, right))
        }
    }

    /// Types expressions that must agree, such as `COALESCE` arguments or
    /// array items. Parameters take the union of the other members.
    fn alike(
        &mut self,
        items: &[Expr],
        ctx: &Context,
        expected: &Type,
    ) -> Result<Vec<Type>, InferError> {
        let mut types = Vec::with_capacity(items.len());
        for item in items.iter().filter(|item| !is_parameter(item)) {
            types.push(self.expr(item, ctx, expected)?);
        }
        let element = if types.is_empty() {
            expected.clone()
        } else {
            Type::union(types.iter().cloned().filter(|ty| *ty != Type::Null))
        };
        for item in items.iter().filter(|item| is_parameter(item)) {
            types.push(self.expr(item, ctx, &element)?);
        }
        Ok(types)
    }

    /// Right side of `IN`.
    fn membership(
        &mut self,
        list: &Expr,
        ctx: &Context,
        element: &Type,
    ) -> Result<(), InferError> {
        match list {
            Expr::Row(row) => {
                for item in &row.items {
                    self.expr(item, ctx, element)?;
                }
            }
            Expr::Subquery(subquery) => {
                self.select(&subquery.query, ctx)?;
            }
            Expr::Paren(paren) => self.membership(&paren.expr, ctx, element)?,
            other => {
                self.expr(other, ctx, element)?;
            }
        }
        Ok(())
    }

    fn case(
        &mut self,
        whens: &[WhenClause],
        else_result: Option<&Expr>,
        ctx: &Context,
        condition: &Type,
        expected: &Type,
    ) -> Result<Type, InferError> {
        let mut results = Vec::with_capacity(whens.len() + 1);
        for when in whens {
            self.expr(&when.condition, ctx, condition)?;
            results.push(self.expr(&when.result, ctx, expected)?);
        }
        match else_result {
            Some(other) => results.push(self.expr(other, ctx, expected)?),
            None => results.push(Type::Null),
        }
        Ok(Type::union(results))
    }

    fn function(&mut self, call: &FunctionCall, ctx: &Context) -> Result<Type, InferError> {
        let schema = call.schema.as_ref().map(Ident::normalized);
        let name = call.name.normalized();
        let mut args = Vec::with_capacity(call.args.len());
        for (index, arg) in call.args.iter().enumerate() {
            let expected = Type::LoadFunctionArgument {
                schema: schema.clone(),
                name: name.clone(),
                index,
            };
            args.push(self.expr(arg, ctx, &expected)?);
        }
        for order in &call.order_by {
            self.expr(&order.expr, ctx, &Type::Unknown)?;
        }
        if let Some(filter) = &call.filter {
            self.expr(filter, ctx, &Type::Boolean)?;
        }
        if let Some(window) = &call.over {
            for partition in &window.partition_by {
                self.expr(partition, ctx, &Type::Unknown)?;
            }
            for order in &window.order_by {
                self.expr(&order.expr, ctx, &Type::Unknown)?;
            }
        }
        Ok(Type::LoadFunction { schema, name, args })
    }

    /// The type of `(SELECT x ...)` used as a value: its single column, or
    /// `Unknown` when that column is an unexpanded star or a star expands
    /// to more than one column.
    fn scalar_subquery(
        &mut self,
        query: &SelectStatement,
        ctx: &Context,
    ) -> Result<Type, InferError> {
        let columns = self.select(query, ctx)?;
        let starred = query
            .cores()
            .any(|core| core.columns.iter().any(|item| matches!(item, SelectItem::Star(_))));
        match columns.as_slice() {
            [column] if matches!(column.ty, Type::LoadStar { .. }) => Ok(Type::Unknown),
            [column] => Ok(column.ty.clone()),
            _ if starred => Ok(Type::Unknown),
            _ => Err(InferError::UnsupportedShape {
                what: format!("scalar subquery with {} columns", columns.len()),
                span: query.span,
            }),
        }
    }
}

/// Returns the name Postgres gives a result column computed by `expr`.
pub(super) fn column_name(expr: &Expr) -> String {
    match expr {
        Expr::Column(column) => column.name.normalized(),
        Expr::Function(call) => call.name.normalized(),
        Expr::Case(_) | Expr::CaseSimple(_) => "case".to_string(),
        Expr::Conditional(conditional) => conditional.kind.as_str().to_ascii_lowercase(),
        Expr::Nullif(_) => "nullif".to_string(),
        Expr::Exists(_) => "exists".to_string(),
        Expr::Array(_) => "array".to_string(),
        Expr::Row(_) => "row".to_string(),
        Expr::Builtin(builtin) => builtin.kind.as_str().to_ascii_lowercase(),
        Expr::Extract(_) => "extract".to_string(),
        Expr::Cast(cast) | Expr::PgCast(cast) => match column_name(&cast.value) {
            name if name == "?column?" => cast.data_type.name.clone(),
            name => name,
        },
        Expr::ArrayIndex(index) => column_name(&index.target),
        Expr::Paren(paren) => column_name(&paren.expr),
        Expr::Subquery(subquery) => match subquery.query.core.columns.first() {
            Some(SelectItem::Expr {
                alias: Some(alias), ..
            }) => alias.normalized(),
            Some(SelectItem::Expr { expr, .. }) => column_name(expr),
            _ => "?column?".to_string(),
        },
        _ => "?column?".to_string(),
    }
}

const fn is_text_match(op: BinaryOp) -> bool {
    matches!(
        op,
        BinaryOp::Like
            | BinaryOp::NotLike
            | BinaryOp::ILike
            | BinaryOp::NotILike
            | BinaryOp::RegexMatch
            | BinaryOp::RegexIMatch
            | BinaryOp::NotRegexMatch
            | BinaryOp::NotRegexIMatch
    )
}

fn is_parameter(expr: &Expr) -> bool {
    match expr {
        Expr::Parameter(_) => true,
        Expr::Paren(paren) => is_parameter(&paren.expr),
        _ => false,
    }
}
