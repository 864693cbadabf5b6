//! # Literal and Identifier Rendering
//!
//! The only place where user-supplied text becomes statement text.
//! Every predicate value and every keyspace, table and column name passes
//! through [`render_literal`] or [`render_identifier`].

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Classification of a raw filter value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueClass {
    /// Optional minus, digits, optional fraction. Emitted unquoted.
    Numeric,
    /// Everything else. Emitted as a quoted string literal.
    Text,
}

/// Words the statement grammar reserves; never emitted as bare identifiers.
const RESERVED_WORDS: &[&str] = &[
    "allow", "and", "asc", "by", "count", "desc", "filtering", "from", "in", "like", "limit",
    "order", "select", "token", "where",
];

fn numeric_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^-?[0-9]+(\.[0-9]+)?$").expect("numeric pattern compiles"))
}

fn bare_identifier_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[a-z_][a-z0-9_]*$").expect("identifier pattern compiles"))
}

/// Classify a raw value.
///
/// Only ASCII digits count; scientific notation, a leading `+`, a bare or
/// trailing decimal point and surrounding whitespace all classify as text.
pub fn classify(value: &str) -> ValueClass {
    if numeric_pattern().is_match(value) {
        ValueClass::Numeric
    } else {
        ValueClass::Text
    }
}

/// Render a value as a literal: numeric values verbatim, text quoted.
pub fn render_literal(value: &str) -> String {
    match classify(value) {
        ValueClass::Numeric => value.to_string(),
        ValueClass::Text => quote_text(value),
    }
}

/// Quote a value as a string literal, doubling embedded single quotes.
pub fn quote_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for c in value.chars() {
        if c == '\'' {
            out.push('\'');
        }
        out.push(c);
    }
    out.push('\'');
    out
}

/// Render an identifier.
///
/// Lowercase names that are not reserved are emitted bare; anything else is
/// double-quoted (case-sensitive) with embedded double quotes doubled.
pub fn render_identifier(name: &str) -> String {
    if bare_identifier_pattern().is_match(name) && !RESERVED_WORDS.contains(&name) {
        return name.to_string();
    }

    let mut out = String::with_capacity(name.len() + 2);
    out.push('"');
    for c in name.chars() {
        if c == '"' {
            out.push('"');
        }
        out.push(c);
    }
    out.push('"');
    out
}
