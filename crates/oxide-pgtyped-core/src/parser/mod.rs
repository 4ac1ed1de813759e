//! Postgres grammar.
//!
//! A backtracking recursive-descent parser built from the primitives in
//! [`crate::runtime`]. Each grammar rule is a function over a
//! [`Cursor`]; alternatives are tried in a fixed order and the first one
//! that matches wins.

mod error;
mod expression;
mod keywords;
mod lexical;
mod statement;

pub use error::ParseError;
pub use keywords::Exclusion;

use tracing::debug;

use crate::ast::Statement;
use crate::runtime::{Comment, Cursor};

/// A parsed statement and the comments detached from it.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedSql {
    /// The statement.
    pub statement: Statement,
    /// Comments in source order, keyed by their spans.
    pub comments: Vec<Comment>,
}

/// Parses one statement, optionally terminated by `;`.
///
/// # Errors
///
/// Returns a [`ParseError`] at the furthest position any alternative
/// reached when the text is not a single valid statement.
pub fn parse(text: &str) -> Result<ParsedSql, ParseError> {
    let mut cursor = Cursor::new(text);
    match sql(&mut cursor) {
        Some(statement) => {
            let comments = cursor.into_comments();
            debug!(
                kind = statement.kind(),
                comments = comments.len(),
                "parsed statement"
            );
            Ok(ParsedSql {
                statement,
                comments,
            })
        }
        None => {
            let error = cursor.error();
            debug!(position = error.position.start, "parse failed: {}", error.message);
            Err(error)
        }
    }
}

fn sql(c: &mut Cursor<'_>) -> Option<Statement> {
    let statement = statement::statement(c)?;
    let _ = c.punct(";");
    c.end_of_input()?;
    Some(statement)
}
