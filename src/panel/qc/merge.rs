//! Left join of auxiliary tables onto the primary panel.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use tracing::{debug, info, instrument, warn};

use crate::panel::qc::model::schema::{MARKET_VALUE_EQUITY, SHARE_PRICE, SHARES_OUTSTANDING};
use crate::panel::qc::model::{FieldValue, FirmYearKey, FirmYearRecord, NormalizedTable};

/// Auxiliary records indexed by key, first occurrence winning.
#[derive(Debug)]
pub struct AuxIndex<'a> {
    pub name: &'a str,
    by_key: HashMap<&'a FirmYearKey, &'a FirmYearRecord>,
    pub duplicates: usize,
}

impl<'a> AuxIndex<'a> {
    pub fn build(table: &'a NormalizedTable) -> Self {
        let mut by_key = HashMap::with_capacity(table.records.len());
        let mut duplicates = 0;
        for record in &table.records {
            match by_key.entry(&record.key) {
                Entry::Vacant(slot) => {
                    slot.insert(record);
                }
                Entry::Occupied(_) => {
                    duplicates += 1;
                    debug!(table = %table.name, key = %record.key, "ignoring duplicate key");
                }
            }
        }
        if duplicates > 0 {
            warn!(table = %table.name, duplicates, "auxiliary table has duplicate keys");
        }
        Self {
            name: &table.name,
            by_key,
            duplicates,
        }
    }

    pub fn get(&self, key: &FirmYearKey) -> Option<&'a FirmYearRecord> {
        self.by_key.get(key).copied()
    }
}

/// Joins every auxiliary table onto `primary`.
///
/// The output holds exactly one record per primary record, in primary
/// order. A field the primary row already carries is never overwritten;
/// auxiliary values only fill fields the primary row lacks.
#[instrument(level = "info", skip_all, fields(primary = primary.len(), auxiliary = auxiliary.len()))]
pub fn merge_panel(
    primary: &[FirmYearRecord],
    auxiliary: &[NormalizedTable],
) -> Vec<FirmYearRecord> {
    let indexes: Vec<AuxIndex<'_>> = auxiliary.iter().map(AuxIndex::build).collect();

    let mut matched = vec![0usize; indexes.len()];
    let merged: Vec<FirmYearRecord> = primary
        .iter()
        .map(|record| {
            let mut merged = record.clone();
            for (position, index) in indexes.iter().enumerate() {
                if let Some(aux) = index.get(&record.key) {
                    matched[position] += 1;
                    for (field, value) in &aux.fields {
                        merged
                            .fields
                            .entry(field.clone())
                            .or_insert_with(|| value.clone());
                    }
                }
            }
            merged
        })
        .collect();

    for (index, hits) in indexes.iter().zip(&matched) {
        info!(table = index.name, matched = *hits, "joined auxiliary table");
    }
    merged
}

/// Fills a missing share price with market value / shares outstanding.
///
/// Returns true when a price was derived.
pub fn derive_share_price(record: &mut FirmYearRecord) -> bool {
    if record.has(SHARE_PRICE) {
        return false;
    }
    let (Some(market_value), Some(shares)) = (
        record.number(MARKET_VALUE_EQUITY),
        record.number(SHARES_OUTSTANDING),
    ) else {
        return false;
    };
    if shares == 0.0 {
        return false;
    }
    record.set(SHARE_PRICE, FieldValue::Float(market_value / shares));
    true
}
