//! Lexical rules: identifiers, literals, parameters and data type names.

use std::sync::LazyLock;

use regex::Regex;

use super::keywords::Exclusion;
use crate::ast::{
    DataType, Ident, Literal, LiteralKind, Parameter, ParameterKind, ParameterStyle, TableName,
};
use crate::runtime::Cursor;

static WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_$]*").expect("Invalid word regex"));
static QUOTED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^"(?:[^"]|"")+""#).expect("Invalid quoted regex"));
static NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[0-9]+(?:\.[0-9]*)?|\.[0-9]+)(?:[eE][+-]?[0-9]+)?")
        .expect("Invalid number regex")
});
static STRING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^'(?:[^']|'')*'").expect("Invalid string regex"));
static ESCAPE_STRING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[eE]'(?:[^'\\]|\\.|'')*'").expect("Invalid escape string regex")
});
static BIT_STRING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[bB]'[01]*'").expect("Invalid bit string regex"));
static HEX_STRING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[xX]'[0-9A-Fa-f]*'").expect("Invalid hex string regex"));
static DOLLAR_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\$(?:[A-Za-z_][A-Za-z0-9_]*)?\$").expect("Invalid dollar tag regex")
});
static PARAMETER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:\$\$|\$|:)[A-Za-z_][A-Za-z0-9_]*").expect("Invalid parameter regex")
});
static MODIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+").expect("Invalid type modifier regex"));

/// Multi-word type names, longest first where one prefixes another.
const MULTI_WORD_TYPES: &[&[&str]] = &[
    &["DOUBLE", "PRECISION"],
    &["CHARACTER", "VARYING"],
    &["NATIONAL", "CHARACTER", "VARYING"],
    &["NATIONAL", "CHARACTER"],
    &["BIT", "VARYING"],
    &["TIMESTAMP", "WITHOUT", "TIME", "ZONE"],
    &["TIMESTAMP", "WITH", "TIME", "ZONE"],
    &["TIME", "WITHOUT", "TIME", "ZONE"],
    &["TIME", "WITH", "TIME", "ZONE"],
];

/// Zone suffixes accepted after `timestamp(p)` and `time(p)`.
const ZONE_SUFFIXES: &[&[&str]] = &[&["WITHOUT", "TIME", "ZONE"], &["WITH", "TIME", "ZONE"]];

/// An identifier; unquoted words in `exclusion`'s set are rejected.
pub fn identifier(c: &mut Cursor<'_>, exclusion: Exclusion) -> Option<Ident> {
    quoted_identifier(c).or_else(|| {
        c.skip_ignored();
        if WORD
            .find(c.rest())
            .is_some_and(|word| exclusion.excludes(word.as_str()))
        {
            return c.fail("identifier");
        }
        let (text, span) = c.regex(&WORD, "identifier")?;
        Some(Ident::new(text, span))
    })
}

/// Any identifier, keywords included.
pub fn any_identifier(c: &mut Cursor<'_>) -> Option<Ident> {
    quoted_identifier(c).or_else(|| {
        let (text, span) = c.regex(&WORD, "identifier")?;
        Some(Ident::new(text, span))
    })
}

fn quoted_identifier(c: &mut Cursor<'_>) -> Option<Ident> {
    let (text, span) = c.regex(&QUOTED, "quoted identifier")?;
    Some(Ident {
        value: text[1..text.len() - 1].replace("\"\"", "\""),
        quoted: true,
        span,
    })
}

/// A column, table or type name.
pub fn name(c: &mut Cursor<'_>) -> Option<Ident> {
    identifier(c, Exclusion::Reserved)
}

/// An alias, optionally introduced by `AS`.
pub fn alias(c: &mut Cursor<'_>) -> Option<Ident> {
    c.attempt(|c| {
        let _ = c.keyword("AS");
        identifier(c, Exclusion::Alias)
    })
}

/// `name` or `schema.name`.
pub fn table_name(c: &mut Cursor<'_>) -> Option<TableName> {
    let start = c.start();
    c.attempt(|c| {
        let first = name(c)?;
        let second = c.attempt(|c| {
            c.punct(".")?;
            any_identifier(c)
        });
        let (schema, name) = match second {
            Some(second) => (Some(first), second),
            None => (None, first),
        };
        Some(TableName {
            schema,
            name,
            span: c.span_from(start),
        })
    })
}

/// `(a, b, c)`
pub fn identifier_list(c: &mut Cursor<'_>) -> Option<Vec<Ident>> {
    c.attempt(|c| {
        c.punct("(")?;
        let items = c.sep_by1(name, ",")?;
        c.punct(")")?;
        Some(items)
    })
}

fn strip(text: &str, prefix: usize) -> String {
    text[prefix..text.len() - 1].to_string()
}

/// A literal constant.
pub fn literal(c: &mut Cursor<'_>) -> Option<Literal> {
    let make = |kind, value: String, span| Literal { kind, value, span };
    if let Some((text, span)) = c.regex(&NUMBER, "number") {
        let kind = if text.contains(['.', 'e', 'E']) {
            LiteralKind::Decimal
        } else {
            LiteralKind::Integer
        };
        return Some(make(kind, text.to_string(), span));
    }
    if let Some((text, span)) = c.regex(&STRING, "string") {
        let value = strip(text, 1).replace("''", "'");
        return Some(make(LiteralKind::String, value, span));
    }
    if let Some((text, span)) = c.regex(&ESCAPE_STRING, "string") {
        return Some(make(LiteralKind::EscapeString, strip(text, 2), span));
    }
    if let Some((text, span)) = c.regex(&BIT_STRING, "bit string") {
        return Some(make(LiteralKind::BitString, strip(text, 2), span));
    }
    if let Some((text, span)) = c.regex(&HEX_STRING, "hex string") {
        return Some(make(LiteralKind::HexString, strip(text, 2), span));
    }
    if let Some(lit) = dollar_string(c) {
        return Some(lit);
    }
    if let Some(span) = c.keyword("TRUE") {
        return Some(make(LiteralKind::Boolean, "true".into(), span));
    }
    if let Some(span) = c.keyword("FALSE") {
        return Some(make(LiteralKind::Boolean, "false".into(), span));
    }
    let span = c.keyword("NULL")?;
    Some(make(LiteralKind::Null, "null".into(), span))
}

/// `$tag$text$tag$`. An empty tag directly followed by a letter is a
/// spread parameter, not a string.
fn dollar_string(c: &mut Cursor<'_>) -> Option<Literal> {
    c.skip_ignored();
    let rest = c.rest();
    let Some(open) = DOLLAR_TAG.find(rest) else {
        return c.fail("dollar-quoted string");
    };
    let delimiter = open.as_str();
    if delimiter == "$$" && rest[2..].starts_with(|ch: char| ch.is_ascii_alphabetic() || ch == '_')
    {
        return c.fail("dollar-quoted string");
    }
    let body = &rest[delimiter.len()..];
    let Some(close) = body.find(delimiter) else {
        return c.fail("dollar-quoted string");
    };
    let value = body[..close].to_string();
    let tag = delimiter[1..delimiter.len() - 1].to_string();
    let span = c.advance(delimiter.len() * 2 + close);
    Some(Literal {
        kind: LiteralKind::DollarString { tag },
        value,
        span,
    })
}

/// A named parameter: `$name`, `:name`, `$$name`, each optionally marked
/// required with `!` and destructured with a pick list `(a, b)` written
/// directly after the name.
pub fn parameter(c: &mut Cursor<'_>) -> Option<Parameter> {
    let start = c.start();
    c.attempt(|c| {
        let (text, _) = c.regex(&PARAMETER, "parameter")?;
        let (kind, style, name) = if let Some(name) = text.strip_prefix("$$") {
            (ParameterKind::Spread, ParameterStyle::Dollar, name)
        } else if let Some(name) = text.strip_prefix('$') {
            (ParameterKind::Single, ParameterStyle::Dollar, name)
        } else {
            (ParameterKind::Single, ParameterStyle::Colon, &text[1..])
        };
        let mut required = required_mark(c);
        let mut pick = vec![];
        if c.rest().starts_with('(') {
            if let Some(fields) = identifier_list(c) {
                pick = fields;
                required = required || required_mark(c);
            }
        }
        Some(Parameter {
            name: name.to_string(),
            kind,
            required,
            pick,
            style,
            span: c.span_from(start),
        })
    })
}

/// A `!` glued to the parameter that is not the start of `!=` or `!~`.
fn required_mark(c: &mut Cursor<'_>) -> bool {
    let rest = c.rest();
    if rest.starts_with('!') && !rest.starts_with("!=") && !rest.starts_with("!~") {
        c.advance(1);
        true
    } else {
        false
    }
}

/// A data type: `int`, `character varying(20)`, `numeric(10, 2)`,
/// `timestamp(3) with time zone`, `text[]`, `public.mood`.
pub fn data_type(c: &mut Cursor<'_>) -> Option<DataType> {
    let start = c.start();
    c.attempt(|c| {
        let (schema, mut type_name, quoted) = match multi_word_type(c) {
            Some(name) => (None, name, false),
            None => {
                let first = name(c)?;
                let second = c.attempt(|c| {
                    c.punct(".")?;
                    any_identifier(c)
                });
                match second {
                    Some(second) => (Some(first.normalized()), second.normalized(), second.quoted),
                    None => (None, first.normalized(), first.quoted),
                }
            }
        };
        let modifiers = c
            .attempt(|c| {
                c.punct("(")?;
                let values = c.sep_by1(
                    |c| c.regex(&MODIFIER, "type modifier")?.0.parse::<u32>().ok(),
                    ",",
                )?;
                c.punct(")")?;
                Some(values)
            })
            .unwrap_or_default();
        if schema.is_none() && !quoted && (type_name == "timestamp" || type_name == "time") {
            if let Some(suffix) = ZONE_SUFFIXES
                .iter()
                .find(|words| c.keywords(words).is_some())
            {
                type_name = format!("{type_name} {}", suffix.join(" ").to_lowercase());
            }
        }
        let array_dims = c
            .star(|c| {
                c.punct("[")?;
                c.punct("]")
            })
            .len();
        Some(DataType {
            schema,
            name: type_name,
            quoted,
            modifiers,
            array_dims,
            span: c.span_from(start),
        })
    })
}

fn multi_word_type(c: &mut Cursor<'_>) -> Option<String> {
    MULTI_WORD_TYPES
        .iter()
        .find(|words| c.keywords(words).is_some())
        .map(|words| words.join(" ").to_lowercase())
}
