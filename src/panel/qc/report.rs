use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::panel::qc::model::FirmYearKey;
use crate::panel::qc::table::{SheetCell, SheetTable};

/// Closed set of finding kinds a rule can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorType {
    RangeError,
    InvalidValue,
    NegativeValue,
    PositiveValue,
    Outlier,
    Inconsistent,
    AccountingImbalance,
    ComponentError,
    InvalidDummy,
    MissingNote,
    UnexpectedNote,
}

impl ErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::RangeError => "RANGE_ERROR",
            ErrorType::InvalidValue => "INVALID_VALUE",
            ErrorType::NegativeValue => "NEGATIVE_VALUE",
            ErrorType::PositiveValue => "POSITIVE_VALUE",
            ErrorType::Outlier => "OUTLIER",
            ErrorType::Inconsistent => "INCONSISTENT",
            ErrorType::AccountingImbalance => "ACCOUNTING_IMBALANCE",
            ErrorType::ComponentError => "COMPONENT_ERROR",
            ErrorType::InvalidDummy => "INVALID_DUMMY",
            ErrorType::MissingNote => "MISSING_NOTE",
            ErrorType::UnexpectedNote => "UNEXPECTED_NOTE",
        }
    }
}

impl fmt::Display for ErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One validation finding against one firm-year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anomaly {
    pub ticker: String,
    pub fiscal_year: i32,
    pub field_name: String,
    pub error_type: ErrorType,
    pub message: String,
}

impl Anomaly {
    pub fn new(
        key: &FirmYearKey,
        field_name: impl Into<String>,
        error_type: ErrorType,
        message: impl Into<String>,
    ) -> Self {
        Self {
            ticker: key.ticker.clone(),
            fiscal_year: key.fiscal_year,
            field_name: field_name.into(),
            error_type,
            message: message.into(),
        }
    }
}

/// Every anomaly of a validation pass in evaluation order. An empty report
/// means the pass ran and found nothing.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnomalyReport {
    pub anomalies: Vec<Anomaly>,
}

impl AnomalyReport {
    /// Column order of the tabular report.
    pub const COLUMNS: [&'static str; 5] =
        ["ticker", "fiscal_year", "field_name", "error_type", "message"];

    pub const SHEET_NAME: &'static str = "qc_report";

    pub fn new(anomalies: Vec<Anomaly>) -> Self {
        Self { anomalies }
    }

    pub fn len(&self) -> usize {
        self.anomalies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.anomalies.is_empty()
    }

    /// True when the pass found no anomalies.
    pub fn is_clean(&self) -> bool {
        self.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Anomaly> {
        self.anomalies.iter()
    }

    pub fn of_type(&self, error_type: ErrorType) -> impl Iterator<Item = &Anomaly> {
        self.anomalies
            .iter()
            .filter(move |anomaly| anomaly.error_type == error_type)
    }

    pub fn counts_by_type(&self) -> BTreeMap<ErrorType, usize> {
        let mut counts = BTreeMap::new();
        for anomaly in &self.anomalies {
            *counts.entry(anomaly.error_type).or_insert(0) += 1;
        }
        counts
    }

    pub fn to_sheet_table(&self) -> SheetTable {
        let rows = self
            .anomalies
            .iter()
            .map(|anomaly| {
                vec![
                    SheetCell::Text(anomaly.ticker.clone()),
                    SheetCell::Number(f64::from(anomaly.fiscal_year)),
                    SheetCell::Text(anomaly.field_name.clone()),
                    SheetCell::Text(anomaly.error_type.to_string()),
                    SheetCell::Text(anomaly.message.clone()),
                ]
            })
            .collect();
        SheetTable {
            sheet_name: Self::SHEET_NAME.to_string(),
            columns: Self::COLUMNS.iter().map(|c| c.to_string()).collect(),
            rows,
        }
    }
}

impl Extend<Anomaly> for AnomalyReport {
    fn extend<T: IntoIterator<Item = Anomaly>>(&mut self, iter: T) {
        self.anomalies.extend(iter);
    }
}

impl FromIterator<Anomaly> for AnomalyReport {
    fn from_iter<T: IntoIterator<Item = Anomaly>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
