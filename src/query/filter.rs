//! # Filter Specification
//!
//! Validates the UI's `(column, operator, value)` triple and compiles it into
//! a predicate fragment. Values and column names are rendered exclusively by
//! [`super::value`].

use serde::{Deserialize, Serialize};

use super::errors::{QueryError, QueryResult};
use super::value::{self, ValueClass};

/// Filter operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    /// Equals
    #[serde(rename = "eq")]
    Eq,

    /// Not equals
    #[serde(rename = "ne")]
    Ne,

    /// Greater than
    #[serde(rename = "gt")]
    Gt,

    /// Less than
    #[serde(rename = "lt")]
    Lt,

    /// Greater than or equal
    #[serde(rename = "ge")]
    Ge,

    /// Less than or equal
    #[serde(rename = "le")]
    Le,

    /// Substring match, compiled to a LIKE pattern
    #[serde(rename = "contains")]
    Contains,
}

impl Operator {
    /// Get the operator name
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Eq => "eq",
            Operator::Ne => "ne",
            Operator::Gt => "gt",
            Operator::Lt => "lt",
            Operator::Ge => "ge",
            Operator::Le => "le",
            Operator::Contains => "contains",
        }
    }

    /// Statement-level symbol
    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Ne => "!=",
            Operator::Gt => ">",
            Operator::Lt => "<",
            Operator::Ge => ">=",
            Operator::Le => "<=",
            Operator::Contains => "LIKE",
        }
    }

    /// Parse an operator from its name or its symbol
    pub fn parse(text: &str) -> QueryResult<Self> {
        let op = match text.trim().to_ascii_lowercase().as_str() {
            "eq" | "=" => Operator::Eq,
            "ne" | "neq" | "!=" => Operator::Ne,
            "gt" | ">" => Operator::Gt,
            "lt" | "<" => Operator::Lt,
            "ge" | "gte" | ">=" => Operator::Ge,
            "le" | "lte" | "<=" => Operator::Le,
            "contains" | "like" => Operator::Contains,
            other => {
                return Err(QueryError::invalid_filter(format!(
                    "unknown operator '{}'",
                    other
                )))
            }
        };
        Ok(op)
    }

    /// Whether this operator can never use a key-efficient path
    pub fn forces_full_scan(&self) -> bool {
        matches!(self, Operator::Contains)
    }
}

/// Filter triple as it arrives from the UI, before validation.
///
/// All three parts empty means "no filter".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawFilter {
    #[serde(default)]
    pub column: Option<String>,

    #[serde(default)]
    pub operator: Option<String>,

    #[serde(default)]
    pub value: Option<String>,
}

impl RawFilter {
    pub fn new(column: impl Into<String>, operator: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            column: Some(column.into()),
            operator: Some(operator.into()),
            value: Some(value.into()),
        }
    }

    /// Validate into a [`FilterSpec`], or `None` when nothing was supplied.
    pub fn into_spec(self) -> QueryResult<Option<FilterSpec>> {
        let column = self.column.map(|c| c.trim().to_string()).filter(|c| !c.is_empty());
        let operator = self.operator.filter(|o| !o.trim().is_empty());
        let value = self.value.filter(|v| !v.is_empty());

        match (column, operator, value) {
            (None, None, None) => Ok(None),
            (None, _, _) => Err(QueryError::invalid_filter(
                "column is required when an operator or value is set",
            )),
            (Some(column), _, None) => Err(QueryError::invalid_filter(format!(
                "value is required for column '{}'",
                column
            ))),
            (Some(column), operator, Some(value)) => {
                let operator = match operator {
                    Some(text) => Operator::parse(&text)?,
                    None => Operator::Eq,
                };
                FilterSpec::new(column, operator, value).map(Some)
            }
        }
    }
}

/// A validated filter
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterSpec {
    column: String,
    operator: Operator,
    value: String,
}

impl FilterSpec {
    /// Create a filter, rejecting an empty column or value
    pub fn new(column: impl Into<String>, operator: Operator, value: impl Into<String>) -> QueryResult<Self> {
        let column = column.into();
        let value = value.into();

        if column.trim().is_empty() {
            return Err(QueryError::invalid_filter("column is empty"));
        }
        if value.is_empty() {
            return Err(QueryError::invalid_filter(format!(
                "value is required for column '{}'",
                column
            )));
        }

        Ok(Self {
            column,
            operator,
            value,
        })
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn operator(&self) -> Operator {
        self.operator
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Compile into a predicate fragment
    pub fn compile(&self) -> Predicate {
        let column = value::render_identifier(&self.column);

        match self.operator {
            Operator::Contains => Predicate {
                fragment: format!(
                    "{} LIKE {}",
                    column,
                    value::quote_text(&format!("%{}%", self.value))
                ),
                value_class: ValueClass::Text,
                requires_full_scan: true,
            },
            op => Predicate {
                fragment: format!(
                    "{} {} {}",
                    column,
                    op.symbol(),
                    value::render_literal(&self.value)
                ),
                value_class: value::classify(&self.value),
                requires_full_scan: op.forces_full_scan(),
            },
        }
    }
}

/// Compiled predicate fragment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Predicate {
    /// Text placed after `WHERE`
    pub fragment: String,

    /// How the value was rendered
    pub value_class: ValueClass,

    /// Whether the operator alone demands a full scan
    pub requires_full_scan: bool,
}
