//! Canonical panel columns and the source spellings that map onto them.

/// How a column's raw cells are typed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Float,
    Integer,
    /// 0/1 indicator that may carry an annotation.
    Dummy,
    Text,
}

pub const TICKER: &str = "ticker";
pub const FISCAL_YEAR: &str = "fiscal_year";
pub const SHARES_OUTSTANDING: &str = "shares_outstanding";
pub const SHARE_PRICE: &str = "share_price";
pub const MARKET_VALUE_EQUITY: &str = "market_value_equity";
pub const GROWTH_RATIO: &str = "growth_ratio";
pub const TOTAL_ASSETS: &str = "total_assets";
pub const TOTAL_LIABILITIES: &str = "total_liabilities";
pub const TOTAL_EQUITY: &str = "total_equity";
pub const PRODUCT_INNOVATION: &str = "product_innovation";
pub const PROCESS_INNOVATION: &str = "process_innovation";
pub const EVIDENCE_NOTE: &str = "evidence_note";

pub const OWNERSHIP_FIELDS: &[&str] = &[
    "managerial_inside_own",
    "state_own",
    "institutional_own",
    "foreign_own",
];

pub const MARKET_FIELDS: &[&str] = &[
    SHARES_OUTSTANDING,
    SHARE_PRICE,
    MARKET_VALUE_EQUITY,
    "dividend_cash_paid",
    "eps_basic",
];

pub const CASHFLOW_FIELDS: &[&str] = &["net_cfo", "capex", "net_cfi"];

pub const FINANCIAL_FIELDS: &[&str] = &[
    "total_sales_revenue",
    "net_sales",
    TOTAL_ASSETS,
    "selling_expenses",
    "general_admin_expenses",
    "intangible_assets_net",
    "manufacturing_overhead",
    "net_operating_income",
    "raw_material_consumption",
    "merchandise_purchase_year",
    "wip_goods_purchase",
    "outside_manufacturing_expenses",
    "production_cost",
    "rnd_expenses",
    "net_income",
    TOTAL_EQUITY,
    TOTAL_LIABILITIES,
    "cash_and_equivalents",
    "long_term_debt",
    "current_assets",
    "current_liabilities",
    GROWTH_RATIO,
    "inventory",
    "net_ppe",
];

pub const META_FIELDS: &[&str] = &["employees_count", "firm_age"];

pub const INNOVATION_FIELDS: &[&str] = &[PRODUCT_INNOVATION, PROCESS_INNOVATION, EVIDENCE_NOTE];

const INTEGER_FIELDS: &[&str] = &[SHARES_OUTSTANDING, "employees_count", "firm_age"];

/// Source column names renamed to their canonical form.
pub const COLUMN_ALIASES: &[(&str, &str)] = &[
    ("dividend_payment", "dividend_cash_paid"),
    ("eps", "eps_basic"),
    ("total_inventory", "inventory"),
    ("net_cash_from_operating", "net_cfo"),
    ("cash_flows_from_investing", "net_cfi"),
    ("capital_expenditure", "capex"),
    ("employees", "employees_count"),
    ("net_sales_revenue", "net_sales"),
    ("total_shareholders_equity", "total_equity"),
    ("intangible_assets_value", "intangible_assets_net"),
    ("merchandise_purchase", "merchandise_purchase_year"),
    ("rnd_expenditure", "rnd_expenses"),
    ("total_share_outstanding", SHARES_OUTSTANDING),
    ("cash_and_cash_equivalent", "cash_and_equivalents"),
];

/// Trims a header and resolves it to its canonical name.
pub fn canonical_column(header: &str) -> String {
    let trimmed = header.trim();
    COLUMN_ALIASES
        .iter()
        .find(|(alias, _)| *alias == trimmed)
        .map(|(_, canonical)| canonical.to_string())
        .unwrap_or_else(|| trimmed.to_string())
}

/// Kind of a canonical column; unknown columns are kept as text.
pub fn field_kind(name: &str) -> FieldKind {
    if INTEGER_FIELDS.contains(&name) {
        FieldKind::Integer
    } else if name == PRODUCT_INNOVATION || name == PROCESS_INNOVATION {
        FieldKind::Dummy
    } else if name == EVIDENCE_NOTE {
        FieldKind::Text
    } else if OWNERSHIP_FIELDS.contains(&name)
        || MARKET_FIELDS.contains(&name)
        || CASHFLOW_FIELDS.contains(&name)
        || FINANCIAL_FIELDS.contains(&name)
    {
        FieldKind::Float
    } else {
        FieldKind::Text
    }
}

/// Every schema column in export order, keys excluded.
pub fn schema_columns() -> impl Iterator<Item = &'static str> {
    OWNERSHIP_FIELDS
        .iter()
        .chain(MARKET_FIELDS)
        .chain(CASHFLOW_FIELDS)
        .chain(FINANCIAL_FIELDS)
        .chain(META_FIELDS)
        .chain(INNOVATION_FIELDS)
        .copied()
}
