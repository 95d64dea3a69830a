pub mod schema;

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::panel::qc::cell::{
    RawCell, cell_text, normalize_null, normalize_ticker, parse_integer, parse_number,
};
use crate::panel::qc::dummy::{dummy_number, merge_notes, parse_dummy_with_note};
use crate::panel::qc::error::{QcError, Result};
use schema::{
    EVIDENCE_NOTE, FISCAL_YEAR, FieldKind, PROCESS_INNOVATION, PRODUCT_INNOVATION, TICKER,
    canonical_column, field_kind,
};

/// One source row: column name → raw cell.
pub type RawRow = BTreeMap<String, RawCell>;

/// A table as read from a spreadsheet, CSV export or query.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawTable {
    /// Label used in logs and errors, usually the file stem.
    pub name: String,
    /// Canonical column names in source order.
    pub columns: Vec<String>,
    pub rows: Vec<RawRow>,
}

impl RawTable {
    /// Builds a table from positional rows, canonicalising the header.
    ///
    /// When several headers map to the same field, such as `inventory` and
    /// `total_inventory`, the leftmost non-null cell of each row wins.
    pub fn from_rows(name: impl Into<String>, headers: &[String], rows: Vec<Vec<RawCell>>) -> Self {
        let name = name.into();
        let positions: Vec<String> = headers.iter().map(|h| canonical_column(h)).collect();

        let mut columns: Vec<String> = Vec::with_capacity(positions.len());
        for column in &positions {
            if column.is_empty() {
                continue;
            }
            if columns.contains(column) {
                warn!(table = %name, column = %column, "several headers map to one field");
            } else {
                columns.push(column.clone());
            }
        }

        let rows = rows
            .into_iter()
            .map(|cells| {
                let mut row = RawRow::new();
                for (column, cell) in positions.iter().zip(cells) {
                    if column.is_empty() {
                        continue;
                    }
                    match row.entry(column.clone()) {
                        Entry::Vacant(slot) => {
                            slot.insert(cell);
                        }
                        Entry::Occupied(mut slot) => {
                            if normalize_null(slot.get()).is_none() {
                                slot.insert(cell);
                            }
                        }
                    }
                }
                row
            })
            .collect();
        Self {
            name,
            columns,
            rows,
        }
    }
}

/// Compound key identifying a firm-year.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FirmYearKey {
    pub ticker: String,
    pub fiscal_year: i32,
}

impl FirmYearKey {
    pub fn new(ticker: impl Into<String>, fiscal_year: i32) -> Self {
        Self {
            ticker: ticker.into(),
            fiscal_year,
        }
    }
}

impl fmt::Display for FirmYearKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.ticker, self.fiscal_year)
    }
}

/// A typed, null-free field value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl FieldValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Integer(value) => Some(*value as f64),
            FieldValue::Float(value) => Some(*value),
            FieldValue::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(value) => Some(value),
            _ => None,
        }
    }
}

/// One firm in one fiscal year. Absent keys in `fields` mean null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FirmYearRecord {
    pub key: FirmYearKey,
    pub fields: BTreeMap<String, FieldValue>,
}

impl FirmYearRecord {
    pub fn new(ticker: impl Into<String>, fiscal_year: i32) -> Self {
        Self {
            key: FirmYearKey::new(ticker, fiscal_year),
            fields: BTreeMap::new(),
        }
    }

    /// Builder-style setter for a numeric field.
    pub fn with_number(mut self, field: &str, value: f64) -> Self {
        self.set(field, FieldValue::Float(value));
        self
    }

    /// Builder-style setter for an integer field.
    pub fn with_integer(mut self, field: &str, value: i64) -> Self {
        self.set(field, FieldValue::Integer(value));
        self
    }

    /// Builder-style setter for a text field.
    pub fn with_text(mut self, field: &str, value: &str) -> Self {
        self.set(field, FieldValue::Text(value.to_string()));
        self
    }

    pub fn set(&mut self, field: &str, value: FieldValue) {
        self.fields.insert(field.to_string(), value);
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field)
    }

    pub fn has(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Numeric value of a field, `None` when absent or textual.
    pub fn number(&self, field: &str) -> Option<f64> {
        self.get(field).and_then(FieldValue::as_f64)
    }

    pub fn text(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(FieldValue::as_text)
    }

    pub fn ticker(&self) -> &str {
        &self.key.ticker
    }

    pub fn fiscal_year(&self) -> i32 {
        self.key.fiscal_year
    }

    /// Types one raw row whose column names are already canonical. Rows
    /// whose key cannot be recovered are rejected.
    pub fn from_raw_row(row: &RawRow, row_index: usize) -> std::result::Result<Self, RejectedRow> {
        let ticker = row
            .get(TICKER)
            .and_then(|cell| normalize_ticker(cell))
            .ok_or_else(|| RejectedRow::new(row_index, "missing ticker"))?;
        let fiscal_year = row
            .get(FISCAL_YEAR)
            .and_then(|cell| parse_integer(cell))
            .ok_or_else(|| RejectedRow::new(row_index, "missing or unparseable fiscal_year"))?;
        let fiscal_year = i32::try_from(fiscal_year)
            .map_err(|_| RejectedRow::new(row_index, "fiscal_year out of range"))?;

        let mut record = FirmYearRecord::new(ticker, fiscal_year);
        let mut product_note = None;
        let mut process_note = None;

        for (column, cell) in row {
            if column == TICKER || column == FISCAL_YEAR {
                continue;
            }
            match field_kind(column) {
                FieldKind::Float => {
                    if let Some(value) = parse_number(cell) {
                        record.set(column, FieldValue::Float(value));
                    }
                }
                FieldKind::Integer => {
                    if let Some(value) = parse_integer(cell) {
                        record.set(column, FieldValue::Integer(value));
                    }
                }
                FieldKind::Dummy => {
                    let parsed = parse_dummy_with_note(cell);
                    if let Some(indicator) = parsed.indicator {
                        record.set(column, FieldValue::Integer(indicator));
                    } else if let Some(value) = dummy_number(cell) {
                        // Out-of-domain numbers are kept so the dummy check can flag them.
                        record.set(column, FieldValue::Float(value));
                    }
                    if column == PRODUCT_INNOVATION {
                        product_note = parsed.note;
                    } else if column == PROCESS_INNOVATION {
                        process_note = parsed.note;
                    }
                }
                FieldKind::Text => {
                    if let Some(text) = cell_text(cell).filter(|text| !text.is_empty()) {
                        record.set(column, FieldValue::Text(text));
                    }
                }
            }
        }

        if !record.has(EVIDENCE_NOTE) {
            if let Some(note) = merge_notes(product_note.as_deref(), process_note.as_deref()) {
                record.set(EVIDENCE_NOTE, FieldValue::Text(note));
            }
        }

        Ok(record)
    }
}

/// A source row dropped because its key could not be recovered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedRow {
    /// Zero-based position of the row in its table, header excluded.
    pub row_index: usize,
    pub reason: String,
}

impl RejectedRow {
    fn new(row_index: usize, reason: &str) -> Self {
        Self {
            row_index,
            reason: reason.to_string(),
        }
    }
}

/// Typed records of one table plus the rows that could not be keyed.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NormalizedTable {
    pub name: String,
    pub records: Vec<FirmYearRecord>,
    pub rejected: Vec<RejectedRow>,
}

/// Types every row of `table`.
///
/// Fails only when the header lacks a key column altogether; individual
/// rows without a usable key are collected in `rejected`.
#[instrument(level = "debug", skip_all, fields(table = %table.name, rows = table.rows.len()))]
pub fn normalize_table(table: &RawTable) -> Result<NormalizedTable> {
    for key in [TICKER, FISCAL_YEAR] {
        if !table.columns.iter().any(|column| column == key) {
            return Err(QcError::MissingKeyColumn {
                table: table.name.clone(),
                column: key.to_string(),
            });
        }
    }

    let mut normalized = NormalizedTable {
        name: table.name.clone(),
        ..NormalizedTable::default()
    };
    for (index, row) in table.rows.iter().enumerate() {
        match FirmYearRecord::from_raw_row(row, index) {
            Ok(record) => normalized.records.push(record),
            Err(rejected) => {
                if row.values().all(|cell| normalize_null(cell).is_none()) {
                    debug!(row = index, "skipping blank row");
                } else {
                    warn!(row = index, reason = %rejected.reason, "rejected row");
                }
                normalized.rejected.push(rejected);
            }
        }
    }

    info!(
        records = normalized.records.len(),
        rejected = normalized.rejected.len(),
        "normalized table"
    );
    Ok(normalized)
}
