pub mod csv_read;
pub mod csv_write;
pub mod excel_read;
pub mod excel_write;
pub mod json_write;

use std::path::Path;

/// File formats understood by the readers and writers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Csv,
    Xlsx,
    Json,
}

/// Guesses the file format from the path extension.
pub fn detect_format(path: &Path) -> Option<FileFormat> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "csv" => Some(FileFormat::Csv),
        "xlsx" | "xlsm" => Some(FileFormat::Xlsx),
        "json" => Some(FileFormat::Json),
        _ => None,
    }
}
