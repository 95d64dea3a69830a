use std::collections::BTreeSet;

use crate::panel::qc::model::schema::{FISCAL_YEAR, TICKER, schema_columns};
use crate::panel::qc::model::{FieldValue, FirmYearRecord};

/// Longest sheet name Excel accepts.
const MAX_SHEET_NAME: usize = 31;

/// Default sheet name for an exported panel.
pub const PANEL_SHEET: &str = "firm_panel";

/// A typed cell headed for a CSV, XLSX or JSON writer.
#[derive(Debug, Clone, PartialEq)]
pub enum SheetCell {
    Blank,
    Number(f64),
    Text(String),
}

impl SheetCell {
    /// Plain text rendering used by the CSV writer.
    pub fn render(&self) -> String {
        match self {
            SheetCell::Blank => String::new(),
            SheetCell::Number(value) => value.to_string(),
            SheetCell::Text(value) => value.clone(),
        }
    }
}

impl From<Option<&FieldValue>> for SheetCell {
    fn from(value: Option<&FieldValue>) -> Self {
        match value {
            Some(FieldValue::Integer(value)) => SheetCell::Number(*value as f64),
            Some(FieldValue::Float(value)) => SheetCell::Number(*value),
            Some(FieldValue::Text(value)) => SheetCell::Text(value.clone()),
            None => SheetCell::Blank,
        }
    }
}

/// A table that will be materialised as a sheet or CSV file.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetTable {
    pub sheet_name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<SheetCell>>,
}

/// Flattens records into a panel table sorted by ticker and fiscal year.
///
/// Schema columns come first in schema order, followed by any extra columns
/// the sources carried, alphabetically.
pub fn build_panel_table(records: &[FirmYearRecord]) -> SheetTable {
    let mut ordered: Vec<&FirmYearRecord> = records.iter().collect();
    ordered.sort_by(|lhs, rhs| lhs.key.cmp(&rhs.key));

    let schema: Vec<&str> = schema_columns().collect();
    let extras: BTreeSet<&str> = records
        .iter()
        .flat_map(|record| record.fields.keys().map(String::as_str))
        .filter(|field| !schema.contains(field))
        .collect();
    let fields: Vec<&str> = schema.iter().copied().chain(extras).collect();

    let mut columns = vec![TICKER.to_string(), FISCAL_YEAR.to_string()];
    columns.extend(fields.iter().map(|field| field.to_string()));

    let rows = ordered
        .into_iter()
        .map(|record| {
            let mut row = vec![
                SheetCell::Text(record.ticker().to_string()),
                SheetCell::Number(f64::from(record.fiscal_year())),
            ];
            row.extend(fields.iter().map(|field| SheetCell::from(record.get(field))));
            row
        })
        .collect();

    SheetTable {
        sheet_name: sanitize_sheet_name(PANEL_SHEET),
        columns,
        rows,
    }
}

/// Replaces characters Excel rejects in sheet names and truncates.
pub fn sanitize_sheet_name(raw: &str) -> String {
    let invalid = [':', '\\', '/', '?', '*', '[', ']', '\'', '"'];
    let mut name: String = raw
        .chars()
        .map(|c| if invalid.contains(&c) { '_' } else { c })
        .collect();
    if name.trim().is_empty() {
        name = "Sheet".to_string();
    }
    if name.chars().count() > MAX_SHEET_NAME {
        name = name.chars().take(MAX_SHEET_NAME).collect();
    }
    name
}
