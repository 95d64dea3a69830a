use rayon::prelude::*;
use tracing::{info, instrument};

use crate::panel::qc::config::QcConfig;
use crate::panel::qc::error::Result;
use crate::panel::qc::model::FirmYearRecord;
use crate::panel::qc::report::{Anomaly, AnomalyReport};
use crate::panel::qc::rules::{CATALOGUE, Rule};

/// Runs a rule catalogue over merged records with a fixed configuration.
#[derive(Debug, Clone)]
pub struct Validator {
    config: QcConfig,
    rules: Vec<Rule>,
}

impl Validator {
    /// Builds a validator over the full catalogue after checking `config`.
    pub fn new(config: QcConfig) -> Result<Self> {
        Self::with_rules(config, CATALOGUE.to_vec())
    }

    /// Builds a validator running only `rules`, in the given order.
    pub fn with_rules(config: QcConfig, rules: Vec<Rule>) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, rules })
    }

    pub fn config(&self) -> &QcConfig {
        &self.config
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Findings for one record, rule by rule in catalogue order.
    pub fn validate_record(&self, record: &FirmYearRecord) -> Vec<Anomaly> {
        self.rules
            .iter()
            .flat_map(|rule| rule.apply(record, &self.config))
            .collect()
    }

    /// Validates every record in parallel.
    ///
    /// Findings are concatenated in record order, so the report is the
    /// same as a sequential pass would produce.
    #[instrument(level = "info", skip_all, fields(records = records.len(), rules = self.rules.len()))]
    pub fn validate_all(&self, records: &[FirmYearRecord]) -> AnomalyReport {
        let per_record: Vec<Vec<Anomaly>> = records
            .par_iter()
            .map(|record| self.validate_record(record))
            .collect();
        let report: AnomalyReport = per_record.into_iter().flatten().collect();
        info!(anomalies = report.len(), "validation finished");
        report
    }
}
