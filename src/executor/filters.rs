//! Row filtering for the in-memory store
//!
//! Rows are matched strictly against parsed conditions.
//! No type coercion: a numeric literal only matches numbers, a text literal
//! only matches strings.

use std::cmp::Ordering;

use serde_json::Value;

use super::result::Row;
use super::statement::{Comparison, Condition, Literal};

/// Evaluates conditions against rows
pub struct ConditionFilter;

impl ConditionFilter {
    /// Checks if a row matches all conditions
    pub fn matches(row: &Row, conditions: &[Condition]) -> bool {
        // AND semantics
        conditions
            .iter()
            .all(|condition| Self::matches_condition(row, condition))
    }

    fn matches_condition(row: &Row, condition: &Condition) -> bool {
        let field_value = match row.get(&condition.column) {
            Some(v) if !v.is_null() => v,
            // Missing or null never matches
            _ => return false,
        };

        if condition.comparison == Comparison::Like {
            return match (field_value, &condition.literal) {
                (Value::String(s), Literal::Text(pattern)) => matches_like_pattern(s, pattern),
                _ => false,
            };
        }

        let ordering = match Self::compare(field_value, &condition.literal) {
            Some(ordering) => ordering,
            None => return false,
        };

        match condition.comparison {
            Comparison::Eq => ordering == Ordering::Equal,
            Comparison::Ne => ordering != Ordering::Equal,
            Comparison::Gt => ordering == Ordering::Greater,
            Comparison::Lt => ordering == Ordering::Less,
            Comparison::Ge => ordering != Ordering::Less,
            Comparison::Le => ordering != Ordering::Greater,
            Comparison::Like => false,
        }
    }

    /// Order `actual` relative to `literal`; None when types differ
    fn compare(actual: &Value, literal: &Literal) -> Option<Ordering> {
        match (actual, literal) {
            (Value::Number(a), Literal::Number(_, b)) => a.as_f64()?.partial_cmp(b),
            (Value::String(a), Literal::Text(b)) => Some(a.as_str().cmp(b.as_str())),
            _ => None,
        }
    }
}

/// SQL LIKE match: `%` is any run, `_` is exactly one character
pub fn matches_like_pattern(value: &str, pattern: &str) -> bool {
    let value: Vec<char> = value.chars().collect();
    let pattern: Vec<char> = pattern.chars().collect();

    // matched[j]: pattern[..i] matches value[..j]
    let mut matched = vec![false; value.len() + 1];
    matched[0] = true;

    for &p in &pattern {
        let mut next = vec![false; value.len() + 1];
        match p {
            '%' => {
                let mut any = false;
                for j in 0..=value.len() {
                    any = any || matched[j];
                    next[j] = any;
                }
            }
            _ => {
                for j in 1..=value.len() {
                    next[j] = matched[j - 1] && (p == '_' || p == value[j - 1]);
                }
            }
        }
        matched = next;
    }

    matched[value.len()]
}
