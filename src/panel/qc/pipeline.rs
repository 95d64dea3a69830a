//! File-to-file orchestration used by the command line interface.

use std::path::{Path, PathBuf};

use tracing::{info, instrument};

use crate::panel::qc::config::QcConfig;
use crate::panel::qc::engine::Validator;
use crate::panel::qc::error::{QcError, Result};
use crate::panel::qc::io::{self, FileFormat, csv_read, csv_write, excel_read, excel_write, json_write};
use crate::panel::qc::merge::{derive_share_price, merge_panel};
use crate::panel::qc::model::{FirmYearRecord, NormalizedTable, RawTable, RejectedRow, normalize_table};
use crate::panel::qc::report::AnomalyReport;
use crate::panel::qc::table::{SheetTable, build_panel_table};

/// One input table on disk.
#[derive(Debug, Clone)]
pub struct TableSource {
    pub path: PathBuf,
    /// Worksheet to read from XLSX inputs; the first sheet when omitted.
    pub sheet: Option<String>,
}

impl TableSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            sheet: None,
        }
    }

    pub fn with_sheet(mut self, sheet: Option<String>) -> Self {
        self.sheet = sheet;
        self
    }
}

/// Inputs of a merge: the primary panel plus auxiliary tables such as
/// market prices or innovation notes.
#[derive(Debug, Clone)]
pub struct PanelSources {
    pub primary: TableSource,
    pub auxiliary: Vec<TableSource>,
}

/// A check or export run: where to read, how to validate, where to write.
#[derive(Debug, Clone)]
pub struct PanelJob {
    pub sources: PanelSources,
    pub config: QcConfig,
    pub output: PathBuf,
}

/// Merged panel ready for validation or export.
#[derive(Debug, Clone, Default)]
pub struct LoadedPanel {
    pub records: Vec<FirmYearRecord>,
    /// Rows dropped from the primary table for lack of a key.
    pub rejected: Vec<RejectedRow>,
    pub derived_prices: usize,
}

/// Result of a check run.
#[derive(Debug, Clone)]
pub struct CheckOutcome {
    pub records: usize,
    pub rejected: Vec<RejectedRow>,
    pub report: AnomalyReport,
}

/// Reads a CSV or XLSX file into a raw table.
pub fn read_table(source: &TableSource) -> Result<RawTable> {
    if !source.path.exists() {
        return Err(QcError::MissingInput(source.path.clone()));
    }
    match io::detect_format(&source.path) {
        Some(FileFormat::Csv) => csv_read::read_table(&source.path),
        Some(FileFormat::Xlsx) => excel_read::read_table(&source.path, source.sheet.as_deref()),
        _ => Err(QcError::UnsupportedFormat(source.path.clone())),
    }
}

/// Writes a table in the format implied by the output extension.
pub fn write_table(path: &Path, table: &SheetTable) -> Result<()> {
    match io::detect_format(path) {
        Some(FileFormat::Csv) => csv_write::write_table(path, table),
        Some(FileFormat::Xlsx) => excel_write::write_workbook(path, std::slice::from_ref(table)),
        Some(FileFormat::Json) => json_write::write_table(path, table),
        None => Err(QcError::UnsupportedFormat(path.to_path_buf())),
    }
}

/// Loads, normalises and merges every source.
#[instrument(level = "info", skip_all, fields(primary = %sources.primary.path.display()))]
pub fn load_panel(sources: &PanelSources, config: &QcConfig) -> Result<LoadedPanel> {
    let primary = normalize_table(&read_table(&sources.primary)?)?;
    let auxiliary = sources
        .auxiliary
        .iter()
        .map(|source| normalize_table(&read_table(source)?))
        .collect::<Result<Vec<NormalizedTable>>>()?;

    let mut records = merge_panel(&primary.records, &auxiliary);
    let mut derived_prices = 0;
    if config.derive_share_price {
        for record in &mut records {
            if derive_share_price(record) {
                derived_prices += 1;
            }
        }
        info!(derived_prices, "derived missing share prices");
    }

    Ok(LoadedPanel {
        records,
        rejected: primary.rejected,
        derived_prices,
    })
}

/// Validates the merged panel and writes the anomaly report.
#[instrument(level = "info", skip_all, fields(output = %request.output.display()))]
pub fn check(request: &PanelJob) -> Result<CheckOutcome> {
    let validator = Validator::new(request.config.clone())?;
    let panel = load_panel(&request.sources, &request.config)?;
    let report = validator.validate_all(&panel.records);
    write_table(&request.output, &report.to_sheet_table())?;
    info!(
        records = panel.records.len(),
        rejected = panel.rejected.len(),
        anomalies = report.len(),
        "quality check finished"
    );
    Ok(CheckOutcome {
        records: panel.records.len(),
        rejected: panel.rejected,
        report,
    })
}

/// Writes the merged, typed panel sorted by ticker and fiscal year.
/// Returns the number of records written.
#[instrument(level = "info", skip_all, fields(output = %request.output.display()))]
pub fn export_panel(request: &PanelJob) -> Result<usize> {
    request.config.validate()?;
    let panel = load_panel(&request.sources, &request.config)?;
    write_table(&request.output, &build_panel_table(&panel.records))?;
    info!(records = panel.records.len(), "panel exported");
    Ok(panel.records.len())
}
