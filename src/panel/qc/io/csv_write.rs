use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::panel::qc::error::Result;
use crate::panel::qc::table::SheetTable;

/// Writes a table as UTF-8 CSV with a byte order mark, so spreadsheet tools
/// pick the right encoding for Vietnamese text.
pub fn write_table(path: &Path, table: &SheetTable) -> Result<()> {
    let mut file = File::create(path)?;
    file.write_all("\u{feff}".as_bytes())?;

    let mut writer = csv::Writer::from_writer(file);
    writer.write_record(&table.columns)?;
    for row in &table.rows {
        writer.write_record(row.iter().map(|cell| cell.render()))?;
    }
    writer.flush()?;
    Ok(())
}
