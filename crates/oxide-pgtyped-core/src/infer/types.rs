//! The inferred type lattice and the query contract built from it.

use serde::{Deserialize, Serialize};

use crate::ast::DataType;
use crate::runtime::Span;

/// A field of an object-literal type, built from a parameter pick list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    /// Field name.
    pub name: String,
    /// Field type.
    #[serde(rename = "type")]
    pub ty: Type,
}

/// An inferred type.
///
/// `String`, `Number`, `Boolean`, `Date`, `Null`, `Json` and `Any` are
/// final. The `Load*` variants and `Named` are placeholders that only a
/// schema loader can resolve; `Unknown` is what a placeholder degrades to
/// when it cannot be resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Type {
    String,
    Number,
    Boolean,
    Date,
    Null,
    Json,
    Unknown,
    Any,
    Array {
        items: Box<Type>,
    },
    Union {
        items: Vec<Type>,
    },
    Object {
        fields: Vec<Field>,
    },
    /// A user-defined type named in a cast: enum, domain, composite.
    Named {
        schema: Option<String>,
        name: String,
    },
    LoadColumn {
        schema: String,
        table: String,
        column: String,
    },
    /// Every column of a table, in table order.
    LoadStar {
        schema: String,
        table: String,
    },
    LoadFunction {
        schema: Option<String>,
        name: String,
        args: Vec<Type>,
    },
    /// The declared type of a function argument.
    LoadFunctionArgument {
        schema: Option<String>,
        name: String,
        index: usize,
    },
    /// An operator whose operands are not known yet.
    LoadOperator {
        op: String,
        left: Box<Type>,
        right: Box<Type>,
    },
}

impl Type {
    /// Wraps `items` in an array type.
    #[must_use]
    pub fn array(items: Self) -> Self {
        Self::Array {
            items: Box::new(items),
        }
    }

    /// Builds a union, flattening nested unions and dropping duplicates.
    ///
    /// A single distinct member is returned as is; an empty input is
    /// `Unknown`.
    #[must_use]
    pub fn union(items: impl IntoIterator<Item = Self>) -> Self {
        let mut members: Vec<Self> = Vec::new();
        for item in items {
            let flat = match item {
                Self::Union { items } => items,
                other => vec![other],
            };
            for member in flat {
                if !members.contains(&member) {
                    members.push(member);
                }
            }
        }
        match members.len() {
            0 => Self::Unknown,
            1 => members.remove(0),
            _ => Self::Union { items: members },
        }
    }

    /// Builds an object type from `(name, type)` pairs.
    #[must_use]
    pub fn object(fields: impl IntoIterator<Item = (String, Self)>) -> Self {
        Self::Object {
            fields: fields
                .into_iter()
                .map(|(name, ty)| Field { name, ty })
                .collect(),
        }
    }

    /// Returns true for types a schema loader still has to resolve.
    #[must_use]
    pub const fn is_placeholder(&self) -> bool {
        matches!(
            self,
            Self::Unknown
                | Self::Named { .. }
                | Self::LoadColumn { .. }
                | Self::LoadStar { .. }
                | Self::LoadFunction { .. }
                | Self::LoadFunctionArgument { .. }
                | Self::LoadOperator { .. }
        )
    }

    /// How much a type says about a value, used when one parameter is
    /// seen several times. Only a strictly higher rank replaces the type
    /// already recorded.
    #[must_use]
    pub const fn rank(&self) -> u8 {
        match self {
            Self::Unknown | Self::Null => 0,
            Self::Any => 1,
            Self::Named { .. }
            | Self::LoadColumn { .. }
            | Self::LoadStar { .. }
            | Self::LoadFunction { .. }
            | Self::LoadFunctionArgument { .. }
            | Self::LoadOperator { .. } => 2,
            _ => 3,
        }
    }

    /// Removes `Null` from a union.
    #[must_use]
    pub fn non_null(self) -> Self {
        match self {
            Self::Union { items } => {
                Self::union(items.into_iter().filter(|item| *item != Self::Null))
            }
            other => other,
        }
    }

    /// Maps a type name as written in a cast or reported by a schema to
    /// an inferred type. `[]` suffixes on `name` wrap the result in arrays.
    #[must_use]
    pub fn from_type_name(schema: Option<&str>, name: &str) -> Self {
        let trimmed = name.trim();
        if let Some(inner) = trimmed.strip_suffix("[]") {
            return Self::array(Self::from_type_name(schema, inner));
        }
        let lower = trimmed.to_ascii_lowercase();
        let builtin = schema.map_or(true, |s| s.eq_ignore_ascii_case("pg_catalog"));
        if !builtin {
            return Self::Named {
                schema: schema.map(str::to_string),
                name: trimmed.to_string(),
            };
        }
        match lower.as_str() {
            "smallint" | "int2" | "integer" | "int" | "int4" | "bigint" | "int8" | "real"
            | "float4" | "float8" | "float" | "double precision" | "numeric" | "decimal"
            | "smallserial" | "serial" | "bigserial" | "serial2" | "serial4" | "serial8"
            | "oid" => Self::Number,
            "text" | "varchar" | "character varying" | "char" | "character" | "bpchar"
            | "name" | "citext" | "uuid" | "inet" | "cidr" | "macaddr" | "bytea" | "xml"
            | "interval" | "money" | "bit" | "bit varying" | "varbit" | "tsvector"
            | "tsquery" | "national character" | "national character varying" => Self::String,
            "bool" | "boolean" => Self::Boolean,
            "date" | "time" | "timetz" | "timestamp" | "timestamptz"
            | "time with time zone" | "time without time zone"
            | "timestamp with time zone" | "timestamp without time zone" => Self::Date,
            "json" | "jsonb" => Self::Json,
            "record" | "anyelement" | "any" => Self::Any,
            _ => Self::Named {
                schema: None,
                name: lower,
            },
        }
    }

    /// Maps a parsed cast target.
    #[must_use]
    pub fn from_data_type(data_type: &DataType) -> Self {
        let scalar = Self::from_type_name(data_type.schema.as_deref(), &data_type.name);
        (0..data_type.array_dims).fold(scalar, |ty, _| Self::array(ty))
    }
}

/// An inferred query parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Param {
    /// Parameter name, without sigil.
    pub name: String,
    /// The most specific type seen over all occurrences.
    #[serde(rename = "type")]
    pub ty: Type,
    /// Whether any occurrence was marked `!`.
    pub required: bool,
    /// Whether the parameter expands to a list (`$$name`).
    pub spread: bool,
    /// Destructured field names.
    pub pick: Vec<String>,
    /// Every occurrence, in source order.
    pub spans: Vec<Span>,
}

/// An inferred result column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultColumn {
    /// Column name as Postgres reports it.
    pub name: String,
    /// Column type.
    #[serde(rename = "type")]
    pub ty: Type,
}

impl ResultColumn {
    /// Creates a result column.
    #[must_use]
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// The inferred contract of one statement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QueryInterface {
    /// Parameters ordered by first occurrence.
    pub params: Vec<Param>,
    /// Result columns in projection order.
    pub results: Vec<ResultColumn>,
}
