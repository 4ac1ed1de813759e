//! Parser error types.

use crate::runtime::Span;

/// A parse error: no grammar alternative matched the input.
///
/// The position is the furthest point any alternative reached, which is
/// almost always where the statement actually goes wrong.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message} at position {}..{}", position.start, position.end)]
pub struct ParseError {
    /// The error message.
    pub message: String,
    /// The location of the error.
    pub position: Span,
    /// What the grammar would have accepted at that location.
    pub expected: Vec<String>,
}

impl ParseError {
    /// Creates a new parse error.
    #[must_use]
    pub fn new(message: impl Into<String>, position: Span, expected: Vec<String>) -> Self {
        Self {
            message: message.into(),
            position,
            expected,
        }
    }

    /// Returns the 1-based line and column of the error in `source`.
    #[must_use]
    pub fn line_col(&self, source: &str) -> (usize, usize) {
        let offset = self.position.start.min(source.len());
        let before = &source[..offset];
        let line = before.matches('\n').count() + 1;
        let column = before
            .rfind('\n')
            .map_or(before.chars().count(), |nl| before[nl + 1..].chars().count())
            + 1;
        (line, column)
    }

    /// Renders the offending line of `source` with a caret under the error.
    #[must_use]
    pub fn caret(&self, source: &str) -> String {
        let (line, column) = self.line_col(source);
        let text = source.lines().nth(line - 1).unwrap_or_default();
        let width = self.position.len().max(1);
        format!(
            "{line:>4} | {text}\n     | {}{}\n{}",
            " ".repeat(column - 1),
            "^".repeat(width),
            self.message
        )
    }
}
