//! Schema metadata and placeholder refinement.
//!
//! Inference leaves every schema-dependent type as a placeholder. A
//! [`SchemaLoader`] answers what those placeholders stand for, and
//! [`refine`] rewrites a [`QueryInterface`] with the answers. A miss is not
//! an error: the placeholder simply becomes [`Type::Unknown`].
//!
//! [`StaticSchema`] is an in-memory loader read from JSON:
//!
//! ```json
//! {
//!   "tables": [
//!     {"schema": "public", "name": "users", "columns": [
//!       {"name": "id", "type": "int4"},
//!       {"name": "email", "type": "text", "nullable": true}
//!     ]}
//!   ],
//!   "functions": [
//!     {"name": "slugify", "args": ["text"], "returns": "text"}
//!   ],
//!   "types": [
//!     {"name": "mood", "values": ["happy", "sad"]}
//!   ]
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::infer::{
    Field, Param, QueryInterface, ResultColumn, Type, binary_result, function_result, operator,
};

/// Errors loading a [`StaticSchema`].
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// The schema file could not be read.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The schema file is not valid schema JSON.
    #[error("Invalid schema JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Source of concrete types for placeholder types.
///
/// Names are passed as Postgres resolves them: unquoted identifiers are
/// already lower-cased.
pub trait SchemaLoader {
    /// Returns the type of a table column.
    fn column(&self, schema: &str, table: &str, column: &str) -> Option<Type>;

    /// Returns every column of a table, in table order.
    fn columns(&self, schema: &str, table: &str) -> Option<Vec<ResultColumn>>;

    /// Returns the result type of a function called with `args`.
    fn function(&self, schema: Option<&str>, name: &str, args: &[Type]) -> Option<Type>;

    /// Returns the declared type of a function argument.
    fn function_argument(&self, schema: Option<&str>, name: &str, index: usize) -> Option<Type>;

    /// Returns the type a user-defined type name stands for.
    fn named_type(&self, schema: Option<&str>, name: &str) -> Option<Type>;
}

/// A column in a [`StaticSchema`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSchema {
    /// Column name.
    pub name: String,
    /// Postgres type name, `[]` suffixed for arrays.
    #[serde(rename = "type")]
    pub data_type: String,
    /// Whether the column accepts NULL.
    #[serde(default)]
    pub nullable: bool,
}

/// A table in a [`StaticSchema`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    /// Schema, `public` when omitted.
    #[serde(default = "default_schema")]
    pub schema: String,
    /// Table name.
    pub name: String,
    /// Columns in table order.
    pub columns: Vec<ColumnSchema>,
}

/// A function signature in a [`StaticSchema`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionSchema {
    /// Schema, `public` when omitted.
    #[serde(default = "default_schema")]
    pub schema: String,
    /// Function name.
    pub name: String,
    /// Argument type names.
    #[serde(default)]
    pub args: Vec<String>,
    /// Return type name.
    pub returns: String,
}

/// A user-defined type in a [`StaticSchema`]: an enum when `values` is
/// given, otherwise a domain over `base`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedTypeSchema {
    /// Schema, `public` when omitted.
    #[serde(default = "default_schema")]
    pub schema: String,
    /// Type name.
    pub name: String,
    /// Enum labels.
    #[serde(default)]
    pub values: Vec<String>,
    /// Underlying type name of a domain.
    #[serde(default)]
    pub base: Option<String>,
}

fn default_schema() -> String {
    "public".to_string()
}

/// An in-memory schema, typically loaded from a JSON file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticSchema {
    /// Tables and views.
    #[serde(default)]
    pub tables: Vec<TableSchema>,
    /// Functions.
    #[serde(default)]
    pub functions: Vec<FunctionSchema>,
    /// Enums and domains.
    #[serde(default)]
    pub types: Vec<NamedTypeSchema>,
}

impl StaticSchema {
    /// Parses a schema from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Json`] if the text is not schema JSON.
    pub fn from_json(json: &str) -> Result<Self, SchemaError> {
        let schema: Self = serde_json::from_str(json)?;
        debug!(
            tables = schema.tables.len(),
            functions = schema.functions.len(),
            types = schema.types.len(),
            "loaded schema"
        );
        Ok(schema)
    }

    /// Reads a schema from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Io`] if the file cannot be read and
    /// [`SchemaError::Json`] if it is not schema JSON.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SchemaError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    fn table(&self, schema: &str, table: &str) -> Option<&TableSchema> {
        self.tables
            .iter()
            .find(|t| t.schema == schema && t.name == table)
    }

    fn find_function(&self, schema: Option<&str>, name: &str) -> Option<&FunctionSchema> {
        self.functions
            .iter()
            .find(|f| f.name == name && schema.map_or(true, |s| f.schema == s))
    }

    fn column_type(&self, column: &ColumnSchema) -> Type {
        let ty = self.resolve_name(&column.data_type);
        if column.nullable {
            Type::union([ty, Type::Null])
        } else {
            ty
        }
    }

    /// Maps a type name, looking through user-defined types.
    fn resolve_name(&self, name: &str) -> Type {
        let (schema, bare) = match name.split_once('.') {
            Some((schema, bare)) => (Some(schema), bare),
            None => (None, name),
        };
        match Type::from_type_name(schema, bare) {
            Type::Named { schema, name } => self
                .named_type(schema.as_deref(), &name)
                .unwrap_or(Type::Unknown),
            Type::Array { items } => match *items {
                Type::Named { schema, name } => Type::array(
                    self.named_type(schema.as_deref(), &name)
                        .unwrap_or(Type::Unknown),
                ),
                other => Type::array(other),
            },
            other => other,
        }
    }
}

impl SchemaLoader for StaticSchema {
    fn column(&self, schema: &str, table: &str, column: &str) -> Option<Type> {
        let column = self
            .table(schema, table)?
            .columns
            .iter()
            .find(|c| c.name == column)?;
        Some(self.column_type(column))
    }

    fn columns(&self, schema: &str, table: &str) -> Option<Vec<ResultColumn>> {
        let table = self.table(schema, table)?;
        Some(
            table
                .columns
                .iter()
                .map(|c| ResultColumn::new(c.name.clone(), self.column_type(c)))
                .collect(),
        )
    }

    fn function(&self, schema: Option<&str>, name: &str, _args: &[Type]) -> Option<Type> {
        let function = self.find_function(schema, name)?;
        Some(self.resolve_name(&function.returns))
    }

    fn function_argument(&self, schema: Option<&str>, name: &str, index: usize) -> Option<Type> {
        let function = self.find_function(schema, name)?;
        function.args.get(index).map(|arg| self.resolve_name(arg))
    }

    fn named_type(&self, schema: Option<&str>, name: &str) -> Option<Type> {
        let named = self
            .types
            .iter()
            .find(|t| t.name == name && schema.map_or(true, |s| t.schema == s))?;
        match &named.base {
            Some(base) if named.values.is_empty() => Some(self.resolve_name(base)),
            _ => Some(Type::String),
        }
    }
}

/// Resolves every placeholder in `interface` through `loader`.
///
/// Star results expand into one result per column. Unions drop duplicate
/// members after resolution, and `required` parameters lose `Null`.
#[must_use]
pub fn refine(interface: QueryInterface, loader: &dyn SchemaLoader) -> QueryInterface {
    let mut results = Vec::with_capacity(interface.results.len());
    for result in interface.results {
        match &result.ty {
            Type::LoadStar { schema, table } => match loader.columns(schema, table) {
                Some(columns) => results.extend(columns),
                None => {
                    trace!(%schema, %table, "unresolved star");
                    results.push(ResultColumn::new(result.name, Type::Unknown));
                }
            },
            _ => results.push(ResultColumn::new(
                result.name,
                refine_type(&result.ty, loader),
            )),
        }
    }
    let params = interface
        .params
        .into_iter()
        .map(|param| {
            let ty = refine_type(&param.ty, loader);
            Param {
                ty: if param.required { ty.non_null() } else { ty },
                ..param
            }
        })
        .collect();
    QueryInterface { params, results }
}

/// Resolves the placeholders inside one type.
pub fn refine_type(ty: &Type, loader: &dyn SchemaLoader) -> Type {
    let resolved = match ty {
        Type::LoadColumn {
            schema,
            table,
            column,
        } => loader.column(schema, table, column),
        Type::LoadFunction { schema, name, args } => {
            let args: Vec<Type> = args.iter().map(|arg| refine_type(arg, loader)).collect();
            loader
                .function(schema.as_deref(), name, &args)
                .or_else(|| function_result(name, &args))
        }
        Type::LoadFunctionArgument {
            schema,
            name,
            index,
        } => loader.function_argument(schema.as_deref(), name, *index),
        Type::Named { schema, name } => loader.named_type(schema.as_deref(), name),
        Type::LoadOperator { op, left, right } => {
            let left = refine_type(left, loader);
            let right = refine_type(right, loader);
            operator(op).map(|op| {
                if left.is_placeholder() || right.is_placeholder() {
                    Type::Unknown
                } else {
                    binary_result(op, &left, &right)
                }
            })
        }
        Type::Array { items } => Some(Type::array(refine_type(items, loader))),
        Type::Union { items } => Some(Type::union(
            items.iter().map(|item| refine_type(item, loader)),
        )),
        Type::Object { fields } => Some(Type::Object {
            fields: fields
                .iter()
                .map(|field| Field {
                    name: field.name.clone(),
                    ty: refine_type(&field.ty, loader),
                })
                .collect(),
        }),
        Type::LoadStar { .. } => None,
        final_type => Some(final_type.clone()),
    };
    resolved.unwrap_or_else(|| {
        trace!(?ty, "unresolved placeholder");
        Type::Unknown
    })
}
