//! Binary indicator cells that may carry a free-text annotation, such as
//! `"1 (new packaging line)"`.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::panel::qc::cell::{RawCell, normalize_null};

static DUMMY_WITH_NOTE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^\s*([01])\s*(?:\((.*)\))?\s*$").expect("dummy pattern is valid")
});

const AFFIRMATIVE: &[&str] = &["yes", "true", "có", "co"];
const NEGATIVE: &[&str] = &["no", "false", "không", "khong"];

/// Indicator and annotation decoded from one cell.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DummyCell {
    pub indicator: Option<i64>,
    pub note: Option<String>,
}

impl DummyCell {
    fn new(indicator: Option<i64>, note: Option<String>) -> Self {
        Self { indicator, note }
    }
}

/// Decodes a 0/1 indicator and its optional parenthesised note.
///
/// Numbers, including numbers stored as text such as `"1.0"`, yield an
/// indicator only when exactly 0 or 1 and never a note. Other text that
/// matches no indicator form is returned whole as the note.
pub fn parse_dummy_with_note(cell: &RawCell) -> DummyCell {
    if let Some(value) = dummy_number(cell) {
        return DummyCell::new(exact_indicator(value), None);
    }
    let Some(cell) = normalize_null(cell) else {
        return DummyCell::default();
    };

    let text = match cell {
        RawCell::Bool(flag) => return DummyCell::new(Some(i64::from(*flag)), None),
        RawCell::Text(text) => text,
        RawCell::Number(_) | RawCell::Empty => return DummyCell::default(),
    };

    if let Some(captures) = DUMMY_WITH_NOTE.captures(text) {
        let indicator = captures[1].parse::<i64>().ok();
        let note = captures
            .get(2)
            .map(|m| m.as_str().trim().to_string())
            .filter(|note| !note.is_empty());
        return DummyCell::new(indicator, note);
    }

    let trimmed = text.trim();
    let folded = trimmed.to_lowercase();
    if AFFIRMATIVE.contains(&folded.as_str()) {
        return DummyCell::new(Some(1), None);
    }
    if NEGATIVE.contains(&folded.as_str()) {
        return DummyCell::new(Some(0), None);
    }

    DummyCell::new(None, Some(trimmed.to_string()))
}

/// Numeric content of a dummy cell: a typed number, or text that is a plain
/// number once trimmed. Separator guessing is not applied, so free-text notes
/// that merely contain digits stay notes.
pub fn dummy_number(cell: &RawCell) -> Option<f64> {
    match normalize_null(cell)? {
        RawCell::Number(value) => Some(*value),
        RawCell::Text(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|value| value.is_finite())
}

fn exact_indicator(value: f64) -> Option<i64> {
    if value == 0.0 {
        Some(0)
    } else if value == 1.0 {
        Some(1)
    } else {
        None
    }
}

/// Joins the product and process annotations into one evidence note,
/// e.g. `"Product: new line | Process: automation"`.
pub fn merge_notes(product: Option<&str>, process: Option<&str>) -> Option<String> {
    let parts: Vec<String> = [("Product", product), ("Process", process)]
        .into_iter()
        .filter_map(|(label, note)| {
            let note = note?.trim();
            (!note.is_empty()).then(|| format!("{label}: {note}"))
        })
        .collect();
    (!parts.is_empty()).then(|| parts.join(" | "))
}
