//! Backtracking combinator runtime.
//!
//! Grammar rules are plain functions over a [`Cursor`]. A rule returns
//! `Some(value)` after consuming input, or `None` after consuming nothing;
//! [`Cursor::attempt`] restores the cursor when a compound rule fails
//! part-way, which gives every composition full backtracking. Whitespace
//! and comments are skipped before each primitive and the comments are
//! kept aside so they can be reattached by position later.

mod cursor;
mod span;

pub use cursor::{Comment, Cursor};
pub use span::Span;
