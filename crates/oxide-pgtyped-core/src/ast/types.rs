//! SQL data type names, as written in casts.

use crate::runtime::Span;

/// A data type reference: `int`, `character varying(20)`, `numeric(10, 2)`,
/// `text[]`, `public.mood`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataType {
    /// Schema qualifier for user-defined types.
    pub schema: Option<String>,
    /// Type name. Unquoted names are lower-cased and multi-word names are
    /// joined by single spaces.
    pub name: String,
    /// Whether the name was written in double quotes.
    pub quoted: bool,
    /// Type modifiers such as length, precision and scale.
    pub modifiers: Vec<u32>,
    /// Number of `[]` suffixes.
    pub array_dims: usize,
    /// Source span.
    pub span: Span,
}

impl DataType {
    /// Creates a scalar type with no schema or modifiers.
    #[must_use]
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            schema: None,
            name: name.into(),
            quoted: false,
            modifiers: vec![],
            array_dims: 0,
            span,
        }
    }

    /// Returns true if the type carries `[]` suffixes.
    #[must_use]
    pub const fn is_array(&self) -> bool {
        self.array_dims > 0
    }

    /// Returns true if the name must be quoted to survive re-parsing.
    /// Spaces are allowed unquoted only in the built-in multi-word names.
    #[must_use]
    pub fn needs_quotes(&self) -> bool {
        self.quoted || !is_plain(&self.name, true)
    }

    /// Returns true if the schema qualifier must be quoted.
    #[must_use]
    pub fn schema_needs_quotes(&self) -> bool {
        self.schema.as_deref().is_some_and(|schema| !is_plain(schema, false))
    }
}

/// A name that reads back unchanged without quotes.
fn is_plain(name: &str, spaces: bool) -> bool {
    !name.is_empty()
        && !name.starts_with(|c: char| c.is_ascii_digit())
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || (spaces && c == ' '))
}
