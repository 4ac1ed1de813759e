//! Parameter binding.
//!
//! Rewrites the named parameters of a statement to Postgres positional
//! placeholders and flattens the bound values in placeholder order:
//!
//! ```rust
//! use oxide_pgtyped_core::query::to_query_config;
//! use serde_json::json;
//!
//! let config = to_query_config(
//!     "SELECT * FROM users WHERE id IN $$ids AND org = $org",
//!     &json!({"ids": [3, 5], "org": "acme"}),
//! )
//! .unwrap();
//! assert_eq!(config.text, "SELECT * FROM users WHERE id IN ($1, $2) AND org = $3");
//! assert_eq!(config.values, vec![json!(3), json!(5), json!("acme")]);
//! ```

use std::collections::HashMap;

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::ast::{visit, Parameter};
use crate::parser::{parse, ParseError};

/// Errors binding values to a statement.
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    /// The statement does not parse.
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// A `!` parameter is missing or null.
    #[error("Missing value for required parameter '{name}'")]
    MissingRequired {
        /// Parameter name.
        name: String,
    },

    /// A spread parameter is bound to something other than an array.
    #[error("Parameter '{name}' expects an array")]
    ExpectedArray {
        /// Parameter name.
        name: String,
    },

    /// A pick parameter is bound to something other than an object.
    #[error("Parameter '{name}' expects an object")]
    ExpectedObject {
        /// Parameter name.
        name: String,
    },
}

/// A statement ready for a Postgres driver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryConfig {
    /// Statement text with `$1..$n` placeholders.
    pub text: String,
    /// Values for the placeholders, in order.
    pub values: Vec<Value>,
}

/// Binds `values`, a JSON object keyed by parameter name, to `sql`.
///
/// Every occurrence of a plain parameter reuses one placeholder. Spread
/// and pick parameters expand to parenthesized placeholder lists. Missing
/// values bind `null`.
///
/// # Errors
///
/// Returns [`QueryError::Parse`] if `sql` does not parse and the other
/// variants when a value does not fit its parameter.
pub fn to_query_config(sql: &str, values: &Value) -> Result<QueryConfig, QueryError> {
    let parsed = parse(sql)?;
    let mut binder = Binder::default();
    let mut text = String::with_capacity(sql.len());
    let mut last = 0;
    for param in visit::parameters(&parsed.statement) {
        text.push_str(&sql[last..param.span.start]);
        let value = values.get(&param.name).unwrap_or(&Value::Null);
        text.push_str(&binder.bind(param, value)?);
        last = param.span.end;
    }
    text.push_str(&sql[last..]);
    debug!(placeholders = binder.values.len(), "bound statement");
    Ok(QueryConfig {
        text,
        values: binder.values,
    })
}

#[derive(Debug, Default)]
struct Binder {
    values: Vec<Value>,
    indexes: HashMap<String, usize>,
}

impl Binder {
    /// Returns the placeholder text for one parameter occurrence.
    fn bind(&mut self, param: &Parameter, value: &Value) -> Result<String, QueryError> {
        if param.required && value.is_null() {
            return Err(QueryError::MissingRequired {
                name: param.name.clone(),
            });
        }
        if param.is_spread() {
            let Value::Array(items) = value else {
                return Err(QueryError::ExpectedArray {
                    name: param.name.clone(),
                });
            };
            if param.pick.is_empty() {
                let placeholders: Vec<String> =
                    items.iter().map(|item| self.push(item.clone())).collect();
                return Ok(format!("({})", placeholders.join(", ")));
            }
            let rows = items
                .iter()
                .map(|item| self.row(param, item))
                .collect::<Result<Vec<_>, _>>()?;
            return Ok(rows.join(", "));
        }
        if !param.pick.is_empty() {
            return self.row(param, value);
        }
        if let Some(index) = self.indexes.get(&param.name) {
            return Ok(format!("${index}"));
        }
        let placeholder = self.push(value.clone());
        self.indexes.insert(param.name.clone(), self.values.len());
        Ok(placeholder)
    }

    /// `($i, $j)` for the picked fields of one object.
    fn row(&mut self, param: &Parameter, value: &Value) -> Result<String, QueryError> {
        let Value::Object(fields) = value else {
            return Err(QueryError::ExpectedObject {
                name: param.name.clone(),
            });
        };
        let placeholders: Vec<String> = param
            .pick
            .iter()
            .map(|field| {
                let value = fields.get(&field.value).cloned().unwrap_or(Value::Null);
                self.push(value)
            })
            .collect();
        Ok(format!("({})", placeholders.join(", ")))
    }

    fn push(&mut self, value: Value) -> String {
        self.values.push(value);
        format!("${}", self.values.len())
    }
}
