use std::fs::File;
use std::path::Path;

use tracing::{debug, instrument};

use crate::panel::qc::cell::RawCell;
use crate::panel::qc::error::Result;
use crate::panel::qc::io::excel_read::table_name;
use crate::panel::qc::model::RawTable;

const BOM: char = '\u{feff}';

/// Reads a CSV export as a raw table. Every cell arrives as text, blanks as
/// [`RawCell::Empty`].
#[instrument(level = "debug", skip_all, fields(path = %path.display()))]
pub fn read_table(path: &Path) -> Result<RawTable> {
    let file = File::open(path)?;
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|header| header.trim_start_matches(BOM).to_string())
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let cells = record
            .iter()
            .map(|value| {
                if value.is_empty() {
                    RawCell::Empty
                } else {
                    RawCell::Text(value.to_string())
                }
            })
            .collect();
        rows.push(cells);
    }
    debug!(columns = headers.len(), rows = rows.len(), "read CSV");

    Ok(RawTable::from_rows(table_name(path), &headers, rows))
}
