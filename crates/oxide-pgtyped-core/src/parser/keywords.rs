//! Keyword sets excluded from identifier positions.
//!
//! Words are stored upper-case; lookups upper-case the candidate first.
//! Quoted identifiers bypass every set.

use std::collections::HashSet;
use std::sync::LazyLock;

/// Words that can never be an unquoted column, table or type name.
static RESERVED: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "ALL",
        "ANALYSE",
        "ANALYZE",
        "AND",
        "ANY",
        "ARRAY",
        "AS",
        "ASC",
        "ASYMMETRIC",
        "BETWEEN",
        "BOTH",
        "CASE",
        "CAST",
        "CHECK",
        "COLLATE",
        "COLUMN",
        "CONSTRAINT",
        "CREATE",
        "CROSS",
        "CURRENT_CATALOG",
        "CURRENT_DATE",
        "CURRENT_ROLE",
        "CURRENT_SCHEMA",
        "CURRENT_TIME",
        "CURRENT_TIMESTAMP",
        "CURRENT_USER",
        "DEFAULT",
        "DEFERRABLE",
        "DESC",
        "DISTINCT",
        "DO",
        "ELSE",
        "END",
        "EXCEPT",
        "EXISTS",
        "FALSE",
        "FETCH",
        "FOR",
        "FOREIGN",
        "FROM",
        "FULL",
        "GRANT",
        "GROUP",
        "HAVING",
        "ILIKE",
        "IN",
        "INITIALLY",
        "INNER",
        "INTERSECT",
        "INTO",
        "IS",
        "ISNULL",
        "JOIN",
        "LATERAL",
        "LEADING",
        "LEFT",
        "LIKE",
        "LIMIT",
        "LOCALTIME",
        "LOCALTIMESTAMP",
        "NATURAL",
        "NOT",
        "NOTNULL",
        "NULL",
        "OFFSET",
        "ON",
        "ONLY",
        "OR",
        "ORDER",
        "OUTER",
        "PLACING",
        "PRIMARY",
        "REFERENCES",
        "RETURNING",
        "RIGHT",
        "SELECT",
        "SESSION_USER",
        "SOME",
        "SYMMETRIC",
        "TABLE",
        "THEN",
        "TO",
        "TRAILING",
        "TRUE",
        "UNION",
        "UNIQUE",
        "USER",
        "USING",
        "VARIADIC",
        "WHEN",
        "WHERE",
        "WINDOW",
        "WITH",
    ]
    .into_iter()
    .collect()
});

/// Clause-starting words that cannot be an unquoted alias, with or
/// without `AS`.
static ALIAS_EXCLUDED: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "AND",
        "AS",
        "ASC",
        "BETWEEN",
        "CROSS",
        "DESC",
        "DO",
        "ELSE",
        "END",
        "EXCEPT",
        "FETCH",
        "FILTER",
        "FOR",
        "FROM",
        "FULL",
        "GROUP",
        "HAVING",
        "ILIKE",
        "IN",
        "INNER",
        "INTERSECT",
        "INTO",
        "IS",
        "ISNULL",
        "JOIN",
        "LEFT",
        "LIKE",
        "LIMIT",
        "NATURAL",
        "NOT",
        "NOTNULL",
        "OFFSET",
        "ON",
        "OR",
        "ORDER",
        "OUTER",
        "OVER",
        "RETURNING",
        "RIGHT",
        "SELECT",
        "SET",
        "THEN",
        "UNION",
        "USING",
        "VALUES",
        "WHEN",
        "WHERE",
        "WINDOW",
        "WITH",
    ]
    .into_iter()
    .collect()
});

/// Words that look like a call when followed by `(` but start some other
/// construct.
static NON_FUNCTION: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "AND", "AS", "BETWEEN", "CASE", "DISTINCT", "ELSE", "END", "EXISTS", "FROM", "ILIKE",
        "IN", "IS", "ISNULL", "LIKE", "NOT", "NOTNULL", "ON", "OR", "RETURNING", "SELECT",
        "SET", "THEN", "USING", "VALUES", "WHEN", "WHERE",
    ]
    .into_iter()
    .collect()
});

/// Which keyword set an identifier position excludes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exclusion {
    /// Column, table and type names.
    Reserved,
    /// Aliases.
    Alias,
    /// Function names.
    Function,
}

impl Exclusion {
    /// Returns true if the unquoted `word` may not appear in this position.
    #[must_use]
    pub fn excludes(self, word: &str) -> bool {
        let set = match self {
            Self::Reserved => &*RESERVED,
            Self::Alias => &*ALIAS_EXCLUDED,
            Self::Function => &*NON_FUNCTION,
        };
        set.contains(word.to_ascii_uppercase().as_str())
    }
}
