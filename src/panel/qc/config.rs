use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::panel::qc::error::{QcError, Result};

/// A sum of component fields that must not exceed a parent field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentBound {
    /// Fields summed on the left-hand side.
    pub parts: Vec<String>,
    /// Field the sum is bounded by.
    pub parent: String,
    /// Human readable explanation used in the anomaly message.
    #[serde(default)]
    pub description: String,
}

impl ComponentBound {
    pub fn new(parts: &[&str], parent: &str, description: &str) -> Self {
        Self {
            parts: parts.iter().map(|part| part.to_string()).collect(),
            parent: parent.to_string(),
            description: description.to_string(),
        }
    }

    /// Name reported in `field_name`, e.g. `cash_and_equivalents/inventory`.
    pub fn field_label(&self) -> String {
        self.parts.join("/")
    }
}

/// Thresholds and field lists consumed by the validation rules.
///
/// Each threshold feeds exactly one rule family: the growth bounds the
/// outlier check, `market_cap_tolerance` the shares × price comparison and
/// `accounting_tolerance` the balance sheet identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QcConfig {
    pub growth_lower: f64,
    pub growth_upper: f64,
    pub market_cap_tolerance: f64,
    pub accounting_tolerance: f64,
    pub ownership_fields: Vec<String>,
    /// Balances stored as non-negative amounts.
    pub non_negative_fields: Vec<String>,
    /// Costs stored as outflows, so never positive.
    pub non_positive_fields: Vec<String>,
    pub dummy_fields: Vec<String>,
    pub component_bounds: Vec<ComponentBound>,
    /// Fill a missing share price from market value / shares after merging.
    pub derive_share_price: bool,
}

impl Default for QcConfig {
    fn default() -> Self {
        Self {
            growth_lower: -0.95,
            growth_upper: 5.0,
            market_cap_tolerance: 0.05,
            accounting_tolerance: 0.05,
            ownership_fields: strings(&[
                "managerial_inside_own",
                "state_own",
                "institutional_own",
                "foreign_own",
            ]),
            non_negative_fields: strings(&[
                "total_sales_revenue",
                "net_sales",
                "total_assets",
                "intangible_assets_net",
                "total_liabilities",
                "cash_and_equivalents",
                "long_term_debt",
                "current_assets",
                "current_liabilities",
                "inventory",
                "dividend_cash_paid",
                "net_ppe",
                "wip_goods_purchase",
                "merchandise_purchase_year",
                "firm_age",
                "employees_count",
            ]),
            non_positive_fields: strings(&[
                "selling_expenses",
                "general_admin_expenses",
                "manufacturing_overhead",
                "raw_material_consumption",
                "outside_manufacturing_expenses",
                "production_cost",
                "rnd_expenses",
                "capex",
            ]),
            dummy_fields: strings(&["product_innovation", "process_innovation"]),
            component_bounds: vec![
                ComponentBound::new(
                    &["current_assets"],
                    "total_assets",
                    "current assets exceed total assets",
                ),
                ComponentBound::new(
                    &["cash_and_equivalents", "inventory"],
                    "current_assets",
                    "cash and inventory exceed current assets",
                ),
                ComponentBound::new(
                    &["net_ppe", "intangible_assets_net"],
                    "total_assets",
                    "PP&E and intangible assets exceed total assets",
                ),
                ComponentBound::new(
                    &["long_term_debt", "current_liabilities"],
                    "total_liabilities",
                    "long-term debt and current liabilities exceed total liabilities",
                ),
                ComponentBound::new(&["net_income"], "net_sales", "net income exceeds net sales"),
                ComponentBound::new(
                    &["net_sales"],
                    "total_sales_revenue",
                    "net sales exceed total sales revenue",
                ),
            ],
            derive_share_price: false,
        }
    }
}

impl QcConfig {
    /// Loads a TOML file; keys it omits keep their defaults.
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(QcError::MissingInput(path.to_path_buf()));
        }
        let source = fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: QcConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects thresholds no rule could evaluate meaningfully.
    pub fn validate(&self) -> Result<()> {
        if !self.growth_lower.is_finite() || !self.growth_upper.is_finite() {
            return Err(QcError::InvalidConfig("growth bounds must be finite".into()));
        }
        if self.growth_lower >= self.growth_upper {
            return Err(QcError::InvalidConfig(format!(
                "growth_lower ({}) must be below growth_upper ({})",
                self.growth_lower, self.growth_upper
            )));
        }
        for (name, value) in [
            ("market_cap_tolerance", self.market_cap_tolerance),
            ("accounting_tolerance", self.accounting_tolerance),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(QcError::InvalidConfig(format!(
                    "{name} must be a non-negative number, got {value}"
                )));
            }
        }
        if let Some(bound) = self.component_bounds.iter().find(|b| b.parts.is_empty()) {
            return Err(QcError::InvalidConfig(format!(
                "component bound on '{}' has no parts",
                bound.parent
            )));
        }
        Ok(())
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|item| item.to_string()).collect()
}
