//! Client-side row sorting
//!
//! Orders the rows of one retrieved page. Sorting never reaches the store
//! and never carries over to the next page.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::executor::Row;

/// Sort direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// Column and direction to sort a page by
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub column: String,
    #[serde(default)]
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: SortDirection::Desc,
        }
    }
}

/// Sorts retrieved rows
pub struct RowSorter;

impl RowSorter {
    /// Sorts rows in place. Stable; null and absent values go last in
    /// either direction.
    pub fn sort(rows: &mut [Row], spec: &SortSpec) {
        rows.sort_by(|a, b| {
            let a_val = a.get(&spec.column).filter(|v| !v.is_null());
            let b_val = b.get(&spec.column).filter(|v| !v.is_null());

            match (a_val, b_val) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Greater,
                (Some(_), None) => Ordering::Less,
                (Some(a_val), Some(b_val)) => {
                    let ordering = Self::compare_values(a_val, b_val);
                    match spec.direction {
                        SortDirection::Asc => ordering,
                        SortDirection::Desc => ordering.reverse(),
                    }
                }
            }
        });
    }

    /// Numbers (and numeric strings) rank before text. Inside a rank values
    /// compare numerically or case-folded, so the order is total.
    fn compare_values(a: &Value, b: &Value) -> Ordering {
        match (SortKey::of(a), SortKey::of(b)) {
            (SortKey::Number(a_n), SortKey::Number(b_n)) => a_n.total_cmp(&b_n),
            (SortKey::Number(_), SortKey::Text(_)) => Ordering::Less,
            (SortKey::Text(_), SortKey::Number(_)) => Ordering::Greater,
            (SortKey::Text(a_s), SortKey::Text(b_s)) => a_s
                .to_lowercase()
                .cmp(&b_s.to_lowercase())
                .then_with(|| a_s.cmp(&b_s)),
        }
    }
}

/// Type rank of a non-null value
enum SortKey {
    Number(f64),
    Text(String),
}

impl SortKey {
    fn of(value: &Value) -> Self {
        match value {
            Value::Number(n) => match n.as_f64() {
                Some(n) => SortKey::Number(n),
                None => SortKey::Text(n.to_string()),
            },
            Value::String(s) => match s.trim().parse::<f64>() {
                Ok(n) if n.is_finite() => SortKey::Number(n),
                _ => SortKey::Text(s.clone()),
            },
            other => SortKey::Text(other.to_string()),
        }
    }
}
