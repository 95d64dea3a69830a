//! The catalogue of per-record checks.
//!
//! Each rule reads one merged record and the configuration and returns its
//! findings. A rule that lacks any input it needs returns nothing: missing
//! data is not reported as a defect.

use crate::panel::qc::cell::is_null_token;
use crate::panel::qc::config::{ComponentBound, QcConfig};
use crate::panel::qc::model::FirmYearRecord;
use crate::panel::qc::model::schema::{
    EVIDENCE_NOTE, GROWTH_RATIO, MARKET_VALUE_EQUITY, SHARE_PRICE, SHARES_OUTSTANDING,
    TOTAL_ASSETS, TOTAL_EQUITY, TOTAL_LIABILITIES,
};
use crate::panel::qc::report::{Anomaly, ErrorType};

/// Signature shared by every rule.
pub type RuleFn = fn(&FirmYearRecord, &QcConfig) -> Vec<Anomaly>;

/// A named entry of the catalogue.
#[derive(Clone, Copy)]
pub struct Rule {
    pub name: &'static str,
    pub check: RuleFn,
}

impl Rule {
    pub fn apply(&self, record: &FirmYearRecord, config: &QcConfig) -> Vec<Anomaly> {
        (self.check)(record, config)
    }
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule").field("name", &self.name).finish()
    }
}

/// Rules in evaluation order.
pub const CATALOGUE: &[Rule] = &[
    Rule { name: "ownership_range", check: ownership_range },
    Rule { name: "shares_positive", check: shares_positive },
    Rule { name: "non_negative", check: non_negative },
    Rule { name: "non_positive", check: non_positive },
    Rule { name: "growth_outlier", check: growth_outlier },
    Rule { name: "market_cap_consistency", check: market_cap_consistency },
    Rule { name: "accounting_identity", check: accounting_identity },
    Rule { name: "component_bounds", check: component_bounds },
    Rule { name: "dummy_validity", check: dummy_validity },
    Rule { name: "evidence_coherence", check: evidence_coherence },
];

/// Looks a rule up by name.
pub fn find(name: &str) -> Option<&'static Rule> {
    CATALOGUE.iter().find(|rule| rule.name == name)
}

/// Ownership ratios are fractions in [0, 1].
pub fn ownership_range(record: &FirmYearRecord, config: &QcConfig) -> Vec<Anomaly> {
    config
        .ownership_fields
        .iter()
        .filter_map(|field| {
            let value = record.number(field)?;
            (!(0.0..=1.0).contains(&value)).then(|| {
                Anomaly::new(
                    &record.key,
                    field.as_str(),
                    ErrorType::RangeError,
                    format!("value {value} is outside [0, 1]"),
                )
            })
        })
        .collect()
}

pub fn shares_positive(record: &FirmYearRecord, _config: &QcConfig) -> Vec<Anomaly> {
    match record.number(SHARES_OUTSTANDING) {
        Some(shares) if shares <= 0.0 => vec![Anomaly::new(
            &record.key,
            SHARES_OUTSTANDING,
            ErrorType::InvalidValue,
            format!("shares outstanding must be positive, got {shares}"),
        )],
        _ => Vec::new(),
    }
}

pub fn non_negative(record: &FirmYearRecord, config: &QcConfig) -> Vec<Anomaly> {
    sign_check(
        record,
        &config.non_negative_fields,
        |value| value < 0.0,
        ErrorType::NegativeValue,
        "must not be negative",
    )
}

/// Costs are stored as outflows, so a positive value is a sign error.
pub fn non_positive(record: &FirmYearRecord, config: &QcConfig) -> Vec<Anomaly> {
    sign_check(
        record,
        &config.non_positive_fields,
        |value| value > 0.0,
        ErrorType::PositiveValue,
        "must not be positive",
    )
}

fn sign_check(
    record: &FirmYearRecord,
    fields: &[String],
    violates: fn(f64) -> bool,
    error_type: ErrorType,
    expectation: &str,
) -> Vec<Anomaly> {
    fields
        .iter()
        .filter_map(|field| {
            let value = record.number(field)?;
            violates(value).then(|| {
                Anomaly::new(
                    &record.key,
                    field.as_str(),
                    error_type,
                    format!("{field} {expectation}, got {value}"),
                )
            })
        })
        .collect()
}

pub fn growth_outlier(record: &FirmYearRecord, config: &QcConfig) -> Vec<Anomaly> {
    match record.number(GROWTH_RATIO) {
        Some(growth) if growth < config.growth_lower || growth > config.growth_upper => {
            vec![Anomaly::new(
                &record.key,
                GROWTH_RATIO,
                ErrorType::Outlier,
                format!(
                    "growth ratio {growth} is outside [{}, {}]",
                    config.growth_lower, config.growth_upper
                ),
            )]
        }
        _ => Vec::new(),
    }
}

/// Shares × price must match the reported market value of equity.
pub fn market_cap_consistency(record: &FirmYearRecord, config: &QcConfig) -> Vec<Anomaly> {
    let (Some(shares), Some(price), Some(reported)) = (
        record.number(SHARES_OUTSTANDING),
        record.number(SHARE_PRICE),
        record.number(MARKET_VALUE_EQUITY),
    ) else {
        return Vec::new();
    };
    if reported == 0.0 {
        return Vec::new();
    }

    let computed = shares * price;
    let relative = (computed - reported) / reported.abs();
    if relative.abs() <= config.market_cap_tolerance {
        return Vec::new();
    }
    vec![Anomaly::new(
        &record.key,
        MARKET_VALUE_EQUITY,
        ErrorType::Inconsistent,
        format!(
            "shares x price = {computed} deviates from reported {reported} by {:+.2}%",
            relative * 100.0
        ),
    )]
}

/// Total assets must equal total liabilities plus total equity.
pub fn accounting_identity(record: &FirmYearRecord, config: &QcConfig) -> Vec<Anomaly> {
    let (Some(assets), Some(liabilities), Some(equity)) = (
        record.number(TOTAL_ASSETS),
        record.number(TOTAL_LIABILITIES),
        record.number(TOTAL_EQUITY),
    ) else {
        return Vec::new();
    };
    if assets == 0.0 {
        return Vec::new();
    }

    let absolute = (assets - (liabilities + equity)).abs();
    let relative = absolute / assets.abs();
    if relative <= config.accounting_tolerance {
        return Vec::new();
    }
    vec![Anomaly::new(
        &record.key,
        format!("{TOTAL_ASSETS}/{TOTAL_LIABILITIES}/{TOTAL_EQUITY}"),
        ErrorType::AccountingImbalance,
        format!(
            "balance sheet does not balance: difference {absolute:.0} ({:.2}%)",
            relative * 100.0
        ),
    )]
}

pub fn component_bounds(record: &FirmYearRecord, config: &QcConfig) -> Vec<Anomaly> {
    config
        .component_bounds
        .iter()
        .filter_map(|bound| exceeded_bound(record, bound))
        .collect()
}

fn exceeded_bound(record: &FirmYearRecord, bound: &ComponentBound) -> Option<Anomaly> {
    let parent = record.number(&bound.parent)?;
    let total = bound
        .parts
        .iter()
        .map(|part| record.number(part))
        .sum::<Option<f64>>()?;
    if total <= parent {
        return None;
    }
    let description = if bound.description.is_empty() {
        format!("{} exceeds {}", bound.field_label(), bound.parent)
    } else {
        bound.description.clone()
    };
    Some(Anomaly::new(
        &record.key,
        bound.field_label(),
        ErrorType::ComponentError,
        format!("{description}: {total} > {parent}"),
    ))
}

pub fn dummy_validity(record: &FirmYearRecord, config: &QcConfig) -> Vec<Anomaly> {
    config
        .dummy_fields
        .iter()
        .filter_map(|field| {
            let value = record.number(field)?;
            (value != 0.0 && value != 1.0).then(|| {
                Anomaly::new(
                    &record.key,
                    field.as_str(),
                    ErrorType::InvalidDummy,
                    format!("{field} must be 0 or 1, got {value}"),
                )
            })
        })
        .collect()
}

/// An innovation flagged 1 needs evidence; evidence with every flag at 0
/// is suspicious.
pub fn evidence_coherence(record: &FirmYearRecord, config: &QcConfig) -> Vec<Anomaly> {
    let flags: Vec<Option<f64>> = config
        .dummy_fields
        .iter()
        .map(|field| record.number(field))
        .collect();
    let has_note = record
        .text(EVIDENCE_NOTE)
        .is_some_and(|note| !is_null_token(note));

    let any_set = flags.iter().any(|flag| *flag == Some(1.0));
    let all_clear = !flags.is_empty() && flags.iter().all(|flag| *flag == Some(0.0));

    if any_set && !has_note {
        vec![Anomaly::new(
            &record.key,
            EVIDENCE_NOTE,
            ErrorType::MissingNote,
            "innovation flagged as 1 but no evidence note given",
        )]
    } else if all_clear && has_note {
        vec![Anomaly::new(
            &record.key,
            EVIDENCE_NOTE,
            ErrorType::UnexpectedNote,
            "evidence note present but every innovation flag is 0",
        )]
    } else {
        Vec::new()
    }
}
