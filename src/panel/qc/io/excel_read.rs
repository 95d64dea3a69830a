use std::path::Path;

use calamine::{DataType, Reader, Xlsx, open_workbook};
use tracing::{debug, instrument};

use crate::panel::qc::cell::RawCell;
use crate::panel::qc::error::{QcError, Result};
use crate::panel::qc::model::RawTable;

/// Reads one worksheet as a raw table. The first row is the header.
///
/// When `sheet` is `None` the first worksheet of the workbook is used.
#[instrument(level = "debug", skip_all, fields(path = %path.display(), sheet = ?sheet))]
pub fn read_table(path: &Path, sheet: Option<&str>) -> Result<RawTable> {
    let mut workbook: Xlsx<_> = open_workbook(path)?;

    let sheet_name = match sheet {
        Some(name) => name.to_string(),
        None => workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| QcError::InvalidWorkbook("workbook has no sheets".into()))?,
    };
    let range = read_required_sheet(&mut workbook, &sheet_name)?;

    let mut rows = range.rows();
    let headers: Vec<String> = match rows.next() {
        Some(first_row) => first_row
            .iter()
            .map(cell_to_string)
            .collect(),
        None => Vec::new(),
    };

    let body: Vec<Vec<RawCell>> = rows
        .map(|row| row.iter().map(cell_to_raw).collect())
        .collect();
    debug!(columns = headers.len(), rows = body.len(), "read worksheet");

    Ok(RawTable::from_rows(table_name(path), &headers, body))
}

fn read_required_sheet<R: std::io::Read + std::io::Seek>(
    workbook: &mut Xlsx<R>,
    name: &str,
) -> Result<calamine::Range<DataType>> {
    let range_result = workbook
        .worksheet_range(name)
        .ok_or_else(|| QcError::InvalidWorkbook(format!("missing sheet '{name}'")))?;
    let range = range_result.map_err(QcError::from)?;
    Ok(range)
}

fn cell_to_raw(cell: &DataType) -> RawCell {
    match cell {
        DataType::String(value) => RawCell::Text(value.clone()),
        DataType::Float(value) => RawCell::Number(*value),
        DataType::Int(value) => RawCell::Number(*value as f64),
        DataType::Bool(value) => RawCell::Bool(*value),
        DataType::Empty | DataType::Error(_) => RawCell::Empty,
        other => RawCell::Text(other.to_string()),
    }
}

fn cell_to_string(cell: &DataType) -> String {
    match cell {
        DataType::String(value) => value.clone(),
        DataType::Float(value) => value.to_string(),
        DataType::Int(value) => value.to_string(),
        DataType::Bool(value) => value.to_string(),
        DataType::Empty => String::new(),
        other => other.to_string(),
    }
}

pub(crate) fn table_name(path: &Path) -> String {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("table")
        .to_string()
}
