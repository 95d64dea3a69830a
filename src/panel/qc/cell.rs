//! Locale-tolerant parsing of raw spreadsheet cells.
//!
//! Every parser here degrades malformed input to `None` instead of failing,
//! so the rules downstream only ever see typed values or absence.

use serde::{Deserialize, Serialize};

/// Placeholder strings that stand for missing data, compared after trimming
/// and lower-casing.
pub const NULL_TOKENS: &[&str] = &[
    "", "-", "na", "n/a", "null", "none", "thiếu", "thieu", "nan",
];

/// A cell as delivered by a spreadsheet, CSV export or query result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawCell {
    /// Blank cell or SQL `NULL`.
    Empty,
    /// Boolean cell; counts as 1 or 0 when read as a number.
    Bool(bool),
    /// Numeric cell already typed by the source.
    Number(f64),
    /// Free text, including numbers stored as text.
    Text(String),
}

impl RawCell {
    /// Shorthand for a text cell.
    pub fn text(value: impl Into<String>) -> Self {
        RawCell::Text(value.into())
    }
}

impl From<&str> for RawCell {
    fn from(value: &str) -> Self {
        RawCell::Text(value.to_string())
    }
}

impl From<String> for RawCell {
    fn from(value: String) -> Self {
        RawCell::Text(value)
    }
}

impl From<f64> for RawCell {
    fn from(value: f64) -> Self {
        RawCell::Number(value)
    }
}

impl From<i64> for RawCell {
    fn from(value: i64) -> Self {
        RawCell::Number(value as f64)
    }
}

impl From<Option<f64>> for RawCell {
    fn from(value: Option<f64>) -> Self {
        value.map_or(RawCell::Empty, RawCell::Number)
    }
}

/// Returns true when `value` is one of the [`NULL_TOKENS`] in any casing.
pub fn is_null_token(value: &str) -> bool {
    let folded = value.trim().to_lowercase();
    NULL_TOKENS.contains(&folded.as_str())
}

/// Returns `None` for blanks, NaN and null-like placeholder text, otherwise
/// the cell itself.
pub fn normalize_null(cell: &RawCell) -> Option<&RawCell> {
    match cell {
        RawCell::Empty => None,
        RawCell::Number(value) if value.is_nan() => None,
        RawCell::Text(value) if is_null_token(value) => None,
        other => Some(other),
    }
}

/// Parses a cell into a float, guessing the thousands and decimal separators.
///
/// The separator appearing last is taken as the decimal point whenever the
/// text is ambiguous. A lone `,` is a decimal comma while a lone `.` is a
/// decimal point, so `"1.234"` reads as 1.234 and not 1234.
///
/// Typed numbers pass through unchanged, except that infinities are treated
/// as null alongside NaN so no rule ever compares against them.
pub fn parse_number(cell: &RawCell) -> Option<f64> {
    match normalize_null(cell)? {
        RawCell::Number(value) => value.is_finite().then_some(*value),
        RawCell::Bool(flag) => Some(if *flag { 1.0 } else { 0.0 }),
        RawCell::Text(text) => parse_number_text(text),
        RawCell::Empty => None,
    }
}

fn parse_number_text(text: &str) -> Option<f64> {
    let cleaned: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '-' | '+' | '.' | ','))
        .collect();
    if cleaned.is_empty() {
        return None;
    }

    let dots = cleaned.matches('.').count();
    let commas = cleaned.matches(',').count();

    let canonical = if dots > 0 && commas > 0 {
        let last_dot = cleaned.rfind('.');
        let last_comma = cleaned.rfind(',');
        if last_dot > last_comma {
            cleaned.replace(',', "")
        } else {
            cleaned.replace('.', "").replace(',', ".")
        }
    } else if dots > 1 {
        promote_last_separator(&cleaned, '.')
    } else if commas > 1 {
        promote_last_separator(&cleaned, ',')
    } else if commas == 1 {
        cleaned.replace(',', ".")
    } else {
        cleaned.replace(',', "")
    };

    canonical
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

/// Drops every `separator` except the last, which becomes a `.`.
fn promote_last_separator(text: &str, separator: char) -> String {
    match text.rsplit_once(separator) {
        Some((head, tail)) => {
            let mut joined: String = head.chars().filter(|c| *c != separator).collect();
            joined.push('.');
            joined.push_str(tail);
            joined
        }
        None => text.to_string(),
    }
}

/// Parses a cell as a number and rounds it to the nearest integer.
pub fn parse_integer(cell: &RawCell) -> Option<i64> {
    let value = parse_number(cell)?.round();
    if value < i64::MIN as f64 || value > i64::MAX as f64 {
        return None;
    }
    Some(value as i64)
}

/// Trims and upper-cases a ticker symbol; blank tickers become `None`.
pub fn normalize_ticker(cell: &RawCell) -> Option<String> {
    let raw = match cell {
        RawCell::Empty => return None,
        RawCell::Number(value) if value.is_nan() => return None,
        RawCell::Number(value) => value.to_string(),
        RawCell::Bool(flag) => flag.to_string(),
        RawCell::Text(text) => text.clone(),
    };
    let ticker = raw.trim().to_uppercase();
    (!ticker.is_empty()).then_some(ticker)
}

/// Text content of a non-null cell, trimmed. Numbers are rendered with
/// their shortest representation.
pub fn cell_text(cell: &RawCell) -> Option<String> {
    match normalize_null(cell)? {
        RawCell::Text(text) => Some(text.trim().to_string()),
        RawCell::Number(value) => Some(value.to_string()),
        RawCell::Bool(flag) => Some(flag.to_string()),
        RawCell::Empty => None,
    }
}
