//! Static type inference.
//!
//! [`infer`] walks a parsed statement and derives its [`QueryInterface`]:
//! the type expected for every parameter, from the position it appears in,
//! and the name and type of every result column. Only lexical information
//! is used. Anything that depends on the database schema is left as a
//! placeholder type for [`crate::schema::refine`] to resolve.

mod context;
mod expression;
mod params;
mod signatures;
mod statement;
mod types;

pub use types::{Field, Param, QueryInterface, ResultColumn, Type};

pub(crate) use signatures::{binary_result, function_result, operator};

use tracing::debug;

use crate::ast::Statement;
use crate::runtime::Span;
use context::Context;
use params::ParamSet;

/// Inference settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InferOptions {
    /// Schema applied to unqualified table names.
    pub default_schema: String,
}

impl Default for InferOptions {
    fn default() -> Self {
        Self {
            default_schema: "public".to_string(),
        }
    }
}

/// A statement shape inference cannot type. The parser never produces
/// these for valid Postgres, so callers should treat them as fatal.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InferError {
    /// A construct that is valid syntax but has no typing rule.
    #[error("Unsupported {what} at position {}..{}", span.start, span.end)]
    UnsupportedShape {
        /// What was found.
        what: String,
        /// Where it was found.
        span: Span,
    },

    /// A query block that projects no columns.
    #[error("Query at position {}..{} projects no columns", span.start, span.end)]
    EmptyProjection {
        /// The query block.
        span: Span,
    },
}

/// Infers the parameters and results of `statement` with default options.
///
/// # Errors
///
/// Returns an [`InferError`] for a statement shape that cannot be typed.
pub fn infer(statement: &Statement) -> Result<QueryInterface, InferError> {
    infer_with(statement, &InferOptions::default())
}

/// Infers the parameters and results of `statement`.
///
/// # Errors
///
/// Returns an [`InferError`] for a statement shape that cannot be typed.
pub fn infer_with(
    statement: &Statement,
    options: &InferOptions,
) -> Result<QueryInterface, InferError> {
    let mut inferrer = Inferrer::default();
    let ctx = Context::new(options.default_schema.clone());
    let results = inferrer.statement(statement, &ctx)?;
    let params = inferrer.params.into_sorted();
    debug!(
        kind = statement.kind(),
        params = params.len(),
        results = results.len(),
        "inferred statement"
    );
    Ok(QueryInterface { params, results })
}

/// Walks one statement, collecting parameters as it types expressions.
#[derive(Debug, Default)]
struct Inferrer {
    params: ParamSet,
}
