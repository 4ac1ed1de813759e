//! The cursor over the source text and its matching primitives.

use std::any::Any;
use std::collections::HashMap;

use regex::Regex;
use serde::Serialize;

use super::Span;
use crate::parser::ParseError;

/// A comment skipped while parsing, detached from the AST.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Comment {
    /// The comment text including its delimiters.
    pub text: String,
    /// Where the comment sits in the source.
    pub span: Span,
}

/// A position in the source text plus the bookkeeping needed to report
/// the furthest failure.
pub struct Cursor<'a> {
    /// The input source text.
    input: &'a str,
    /// The current byte position.
    pos: usize,
    /// End of the last consumed token, used to close node spans.
    last_end: usize,
    /// The furthest position at which a primitive failed.
    furthest: usize,
    /// What was expected at `furthest`.
    expected: Vec<&'static str>,
    /// Comments skipped on the current parse path.
    comments: Vec<Comment>,
    /// Lookahead depth; failures inside a lookahead are not reported.
    quiet: usize,
    /// Outcomes of memoized rules, keyed by rule name and start position.
    memo: HashMap<(&'static str, usize), Memo>,
}

/// A remembered rule outcome at one position.
struct Memo {
    value: Option<Box<dyn Any>>,
    pos: usize,
    last_end: usize,
    comments: Vec<Comment>,
}

/// Characters that may continue an unquoted identifier or keyword.
const fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$'
}

impl<'a> Cursor<'a> {
    /// Creates a cursor at the start of the input.
    #[must_use]
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            last_end: 0,
            furthest: 0,
            expected: Vec::new(),
            comments: Vec::new(),
            quiet: 0,
            memo: HashMap::new(),
        }
    }

    /// Returns the full input.
    #[must_use]
    pub const fn input(&self) -> &'a str {
        self.input
    }

    /// Returns the current byte position.
    #[must_use]
    pub const fn pos(&self) -> usize {
        self.pos
    }

    /// Returns the unconsumed input.
    #[must_use]
    pub fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn consume(&mut self, len: usize) -> Span {
        let start = self.pos;
        self.pos += len;
        self.last_end = self.pos;
        Span::new(start, self.pos)
    }

    /// Consumes `len` bytes recognised by a hand-written scanner over
    /// [`Cursor::rest`].
    pub fn advance(&mut self, len: usize) -> Span {
        self.consume(len)
    }

    /// Skips whitespace, `--` line comments and `/* */` block comments.
    pub fn skip_ignored(&mut self) {
        loop {
            while self.peek().is_some_and(char::is_whitespace) {
                self.pos += self.peek().map_or(0, char::len_utf8);
            }

            let rest = self.rest();
            if rest.starts_with("--") {
                let len = rest.find('\n').unwrap_or(rest.len());
                self.record_comment(len);
            } else if rest.starts_with("/*") {
                self.record_comment(block_comment_len(rest));
            } else {
                break;
            }
        }
    }

    fn record_comment(&mut self, len: usize) {
        let span = Span::new(self.pos, self.pos + len);
        self.pos += len;
        self.push_comment(Comment {
            text: span.slice(self.input).to_string(),
            span,
        });
    }

    fn push_comment(&mut self, comment: Comment) {
        // Re-skipping after a backtrack revisits the same comment.
        if self
            .comments
            .last()
            .map_or(true, |last| last.span.start < comment.span.start)
        {
            self.comments.push(comment);
        }
    }

    /// Skips ignored input and returns the position the next token starts at.
    pub fn start(&mut self) -> usize {
        self.skip_ignored();
        self.pos
    }

    /// Returns a span from `start` to the end of the last consumed token.
    #[must_use]
    pub fn span_from(&self, start: usize) -> Span {
        Span::new(start, self.last_end.max(start))
    }

    /// Records a failure at the current position and returns `None`.
    pub fn fail<T>(&mut self, expected: &'static str) -> Option<T> {
        if self.quiet == 0 {
            if self.pos > self.furthest {
                self.furthest = self.pos;
                self.expected.clear();
            }
            if self.pos == self.furthest && !self.expected.contains(&expected) {
                self.expected.push(expected);
            }
        }
        None
    }

    /// Runs `rule`, restoring the cursor if it fails.
    pub fn attempt<T>(&mut self, rule: impl FnOnce(&mut Self) -> Option<T>) -> Option<T> {
        let pos = self.pos;
        let last_end = self.last_end;
        let comments = self.comments.len();
        let result = rule(self);
        if result.is_none() {
            self.pos = pos;
            self.last_end = last_end;
            self.comments.truncate(comments);
        }
        result
    }

    /// Runs `rule` at most once per position under `key`; later calls at
    /// the same position replay the first outcome. `key` must name a
    /// single rule with a single value type.
    pub fn memoized<T: Clone + 'static>(
        &mut self,
        key: &'static str,
        rule: impl FnOnce(&mut Self) -> Option<T>,
    ) -> Option<T> {
        let start = self.pos;
        if let Some(memo) = self.memo.get(&(key, start)) {
            let value = memo
                .value
                .as_ref()
                .and_then(|value| value.downcast_ref::<T>())
                .cloned();
            if value.is_some() {
                let (pos, last_end) = (memo.pos, memo.last_end);
                let comments = memo.comments.clone();
                self.pos = pos;
                self.last_end = last_end;
                for comment in comments {
                    self.push_comment(comment);
                }
            }
            return value;
        }
        let before = self.comments.len();
        let value = self.attempt(rule);
        // Failures under a lookahead were not reported, so they are not kept.
        if self.quiet == 0 {
            let memo = Memo {
                value: value.clone().map(|value| Box::new(value) as Box<dyn Any>),
                pos: self.pos,
                last_end: self.last_end,
                comments: self.comments.get(before..).unwrap_or_default().to_vec(),
            };
            self.memo.insert((key, start), memo);
        }
        value
    }

    /// Runs `rule` and pairs its value with the span it consumed.
    pub fn spanned<T>(&mut self, rule: impl FnOnce(&mut Self) -> Option<T>) -> Option<(T, Span)> {
        let start = self.start();
        let value = self.attempt(rule)?;
        Some((value, self.span_from(start)))
    }

    /// Matches a keyword, case-insensitively, on a word boundary.
    pub fn keyword(&mut self, word: &'static str) -> Option<Span> {
        self.skip_ignored();
        let rest = self.rest().as_bytes();
        let len = word.len();
        let matched = rest.len() >= len
            && rest[..len].eq_ignore_ascii_case(word.as_bytes())
            && !self.input[self.pos + len..]
                .chars()
                .next()
                .is_some_and(is_word_char);
        if matched {
            Some(self.consume(len))
        } else {
            self.fail(word)
        }
    }

    /// Matches a sequence of keywords, e.g. `["ORDER", "BY"]`.
    pub fn keywords(&mut self, words: &[&'static str]) -> Option<Span> {
        let start = self.start();
        self.attempt(|c| {
            for &word in words {
                c.keyword(word)?;
            }
            Some(c.span_from(start))
        })
    }

    /// Matches the first keyword of `choices` present, returning its value.
    pub fn keyword_of<T: Copy>(&mut self, choices: &[(&'static str, T)]) -> Option<(T, Span)> {
        choices
            .iter()
            .find_map(|&(word, value)| self.keyword(word).map(|span| (value, span)))
    }

    /// Matches an exact symbol.
    pub fn punct(&mut self, symbol: &'static str) -> Option<Span> {
        self.skip_ignored();
        if self.rest().starts_with(symbol) {
            Some(self.consume(symbol.len()))
        } else {
            self.fail(symbol)
        }
    }

    /// Matches the first symbol of `table` present. Longer symbols sharing a
    /// prefix must come first.
    pub fn punct_of<T: Copy>(&mut self, table: &[(&'static str, T)]) -> Option<(T, Span)> {
        table
            .iter()
            .find_map(|&(symbol, value)| self.punct(symbol).map(|span| (value, span)))
    }

    /// Matches an anchored regular expression at the current position.
    pub fn regex(&mut self, re: &Regex, expected: &'static str) -> Option<(&'a str, Span)> {
        self.skip_ignored();
        let rest = self.rest();
        match re.find(rest) {
            Some(m) if m.start() == 0 && !m.is_empty() => {
                let text = &rest[..m.end()];
                Some((text, self.consume(m.end())))
            }
            _ => self.fail(expected),
        }
    }

    /// Matches `rule` zero or more times. An iteration that consumes
    /// nothing ends the repetition.
    pub fn star<T>(&mut self, mut rule: impl FnMut(&mut Self) -> Option<T>) -> Vec<T> {
        let mut items = vec![];
        loop {
            let before = self.pos;
            match self.attempt(&mut rule) {
                Some(item) if self.pos > before => items.push(item),
                _ => break,
            }
        }
        items
    }

    /// Matches `rule` one or more times.
    pub fn plus<T>(&mut self, mut rule: impl FnMut(&mut Self) -> Option<T>) -> Option<Vec<T>> {
        let first = self.attempt(&mut rule)?;
        let mut items = vec![first];
        items.extend(self.star(rule));
        Some(items)
    }

    /// Matches one or more `item`s separated by `separator`.
    pub fn sep_by1<T>(
        &mut self,
        mut item: impl FnMut(&mut Self) -> Option<T>,
        separator: &'static str,
    ) -> Option<Vec<T>> {
        let first = self.attempt(&mut item)?;
        let mut items = vec![first];
        items.extend(self.star(|c| {
            c.punct(separator)?;
            item(c)
        }));
        Some(items)
    }

    /// Negative lookahead: succeeds, consuming nothing, only if `rule`
    /// does not match here.
    pub fn not<T>(&mut self, rule: impl FnOnce(&mut Self) -> Option<T>) -> Option<()> {
        let pos = self.pos;
        let last_end = self.last_end;
        let comments = self.comments.len();
        self.quiet += 1;
        let matched = rule(self).is_some();
        self.quiet -= 1;
        self.pos = pos;
        self.last_end = last_end;
        self.comments.truncate(comments);
        if matched {
            None
        } else {
            Some(())
        }
    }

    /// Folds `operand (operator operand)*` left-to-right into nested values.
    pub fn fold_left<T, O>(
        &mut self,
        mut operand: impl FnMut(&mut Self) -> Option<T>,
        mut operator: impl FnMut(&mut Self) -> Option<O>,
        mut build: impl FnMut(T, O, T) -> T,
    ) -> Option<T> {
        let first = self.attempt(&mut operand)?;
        let tail = self.star(|c| {
            let op = operator(c)?;
            let rhs = operand(c)?;
            Some((op, rhs))
        });
        Some(
            tail.into_iter()
                .fold(first, |lhs, (op, rhs)| build(lhs, op, rhs)),
        )
    }

    /// Succeeds only when nothing but whitespace and comments remain.
    pub fn end_of_input(&mut self) -> Option<()> {
        self.skip_ignored();
        if self.pos == self.input.len() {
            Some(())
        } else {
            self.fail("end of input")
        }
    }

    /// Builds the error for the furthest failure seen so far.
    #[must_use]
    pub fn error(&self) -> ParseError {
        let rest = &self.input[self.furthest..];
        let found_len = rest
            .char_indices()
            .find(|(_, c)| c.is_whitespace())
            .map_or(rest.len(), |(i, _)| i);
        let found = &rest[..found_len];
        let expected: Vec<String> = self.expected.iter().map(ToString::to_string).collect();
        let message = match (expected.is_empty(), found.is_empty()) {
            (true, true) => String::from("Unexpected end of input"),
            (true, false) => format!("Unexpected input \"{found}\""),
            (false, true) => format!("Expected {}, found end of input", expected.join(", ")),
            (false, false) => format!("Expected {}, found \"{found}\"", expected.join(", ")),
        };
        ParseError::new(
            message,
            Span::new(self.furthest, self.furthest + found_len),
            expected,
        )
    }

    /// Consumes the cursor, returning the comments of the successful parse.
    #[must_use]
    pub fn into_comments(self) -> Vec<Comment> {
        self.comments
    }
}

/// Length of a block comment at the start of `text`, honouring nesting.
/// An unterminated comment runs to the end of the input.
fn block_comment_len(text: &str) -> usize {
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut i = 0;
    while i + 1 < bytes.len() {
        match (bytes[i], bytes[i + 1]) {
            (b'/', b'*') => {
                depth += 1;
                i += 2;
            }
            (b'*', b'/') => {
                depth -= 1;
                i += 2;
                if depth == 0 {
                    return i;
                }
            }
            _ => i += 1,
        }
    }
    text.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_is_case_insensitive_and_bounded() {
        let mut c = Cursor::new("select selection");
        assert!(c.keyword("SELECT").is_some());
        assert!(c.keyword("SELECT").is_none());
        assert_eq!(c.rest(), "selection");
    }

    #[test]
    fn test_attempt_restores_position() {
        let mut c = Cursor::new("ORDER LIMIT");
        let result = c.attempt(|c| {
            c.keyword("ORDER")?;
            c.keyword("BY")
        });
        assert!(result.is_none());
        assert_eq!(c.pos(), 0);
    }

    #[test]
    fn test_comments_are_recorded_once() {
        let mut c = Cursor::new("-- first\n  /* second */ x");
        let _ = c.attempt(|c| c.keyword("Y"));
        let _ = c.keyword("X");
        let comments = c.into_comments();
        assert_eq!(comments.len(), 2);
        assert_eq!(comments[0].text, "-- first");
        assert_eq!(comments[1].text, "/* second */");
    }

    #[test]
    fn test_failed_branch_drops_comments() {
        let mut c = Cursor::new("a /* inside */ b");
        let _ = c.attempt(|c| {
            c.keyword("A")?;
            c.keyword("C")
        });
        assert!(c.into_comments().is_empty());
    }

    #[test]
    fn test_nested_block_comment() {
        assert_eq!(block_comment_len("/* a /* b */ c */ rest"), 17);
        assert_eq!(block_comment_len("/* open"), 7);
    }

    #[test]
    fn test_fold_left() {
        let mut c = Cursor::new("1-2-3");
        let digit = Regex::new(r"^\d").unwrap();
        let value = c
            .fold_left(
                |c| c.regex(&digit, "digit").map(|(t, _)| t.to_string()),
                |c| c.punct("-"),
                |l, _, r| format!("({l}-{r})"),
            )
            .unwrap();
        assert_eq!(value, "((1-2)-3)");
    }

    #[test]
    fn test_memoized_rule_runs_once_per_position() {
        let mut c = Cursor::new("/* c */ word rest");
        let mut runs = 0;
        let mut rule = |c: &mut Cursor<'_>| {
            runs += 1;
            c.keyword("WORD").map(|span| span.start)
        };
        let first = c.memoized("word", &mut rule);
        let after = c.pos();
        c.pos = 0;
        c.last_end = 0;
        c.comments.clear();
        let second = c.memoized("word", &mut rule);
        assert_eq!(first, Some(8));
        assert_eq!(second, first);
        assert_eq!(c.pos(), after);
        assert_eq!(c.into_comments().len(), 1);
        assert_eq!(runs, 1);
    }

    #[test]
    fn test_memoized_failure_consumes_nothing() {
        let mut c = Cursor::new("other");
        assert_eq!(c.memoized("word", |c| c.keyword("WORD")), None);
        assert_eq!(c.memoized("word", |c| c.keyword("WORD")), None);
        assert_eq!(c.pos(), 0);
        assert_eq!(c.error().expected, vec!["WORD".to_string()]);
    }

    #[test]
    fn test_not_does_not_consume() {
        let mut c = Cursor::new("FROM x");
        assert!(c.not(|c| c.keyword("FROM")).is_none());
        assert!(c.not(|c| c.keyword("WHERE")).is_some());
        assert_eq!(c.pos(), 0);
    }

    #[test]
    fn test_error_reports_furthest_position() {
        let mut c = Cursor::new("SELECT FROM");
        let _ = c.attempt(|c| {
            c.keyword("SELECT")?;
            c.keyword("DISTINCT")
        });
        let err = c.error();
        assert_eq!(err.position.start, 7);
        assert!(err.expected.contains(&String::from("DISTINCT")));
    }
}
