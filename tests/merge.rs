use firm_panel_qc::QcError;
use firm_panel_qc::cell::RawCell;
use firm_panel_qc::config::QcConfig;
use firm_panel_qc::engine::Validator;
use firm_panel_qc::merge::{derive_share_price, merge_panel};
use firm_panel_qc::model::{FieldValue, FirmYearRecord, NormalizedTable, RawTable, normalize_table};
use firm_panel_qc::report::ErrorType;

fn raw_table(name: &str, headers: &[&str], rows: Vec<Vec<RawCell>>) -> RawTable {
    let headers: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
    RawTable::from_rows(name, &headers, rows)
}

fn aux(name: &str, records: Vec<FirmYearRecord>) -> NormalizedTable {
    NormalizedTable {
        name: name.to_string(),
        records,
        rejected: Vec::new(),
    }
}

#[test]
fn normalizes_keys_aliases_and_types() {
    let table = raw_table(
        "panel",
        &[" ticker ", "fiscal_year", "total_inventory", "employees", "state_own", "eps"],
        vec![vec![
            " hpg ".into(),
            RawCell::Number(2023.0),
            "1.234.567,89".into(),
            "1,250".into(),
            "n/a".into(),
            RawCell::Number(3500.0),
        ]],
    );
    assert_eq!(table.columns[2], "inventory");

    let normalized = normalize_table(&table).expect("key columns present");
    assert!(normalized.rejected.is_empty());
    let record = &normalized.records[0];
    assert_eq!(record.ticker(), "HPG");
    assert_eq!(record.fiscal_year(), 2023);
    assert_eq!(record.number("inventory"), Some(1234567.89));
    assert_eq!(record.get("employees_count"), Some(&FieldValue::Integer(1)));
    assert_eq!(record.number("eps_basic"), Some(3500.0));
    assert!(!record.has("state_own"));
}

#[test]
fn rows_without_a_key_are_rejected_not_reported() {
    let table = raw_table(
        "panel",
        &["ticker", "fiscal_year", "total_assets"],
        vec![
            vec!["VNM".into(), "2022".into(), "100".into()],
            vec!["".into(), "2022".into(), "100".into()],
            vec!["FPT".into(), "thiếu".into(), "100".into()],
            vec![RawCell::Empty, RawCell::Empty, RawCell::Empty],
        ],
    );
    let normalized = normalize_table(&table).expect("key columns present");
    assert_eq!(normalized.records.len(), 1);
    let rejected: Vec<usize> = normalized.rejected.iter().map(|r| r.row_index).collect();
    assert_eq!(rejected, vec![1, 2, 3]);
}

#[test]
fn missing_key_column_fails_the_table() {
    let table = raw_table("prices", &["ticker", "share_price"], vec![]);
    match normalize_table(&table) {
        Err(QcError::MissingKeyColumn { table, column }) => {
            assert_eq!(table, "prices");
            assert_eq!(column, "fiscal_year");
        }
        other => panic!("expected missing key column, got {other:?}"),
    }
}

#[test]
fn innovation_cells_become_dummies_and_a_merged_note() {
    let table = raw_table(
        "panel",
        &["ticker", "fiscal_year", "product_innovation", "process_innovation"],
        vec![
            vec![
                "DGC".into(),
                "2023".into(),
                "1 (new fertiliser grade)".into(),
                "0".into(),
            ],
            vec!["DGC".into(), "2022".into(), RawCell::Number(2.0), "Có".into()],
        ],
    );
    let normalized = normalize_table(&table).expect("key columns present");

    let first = &normalized.records[0];
    assert_eq!(first.number("product_innovation"), Some(1.0));
    assert_eq!(first.number("process_innovation"), Some(0.0));
    assert_eq!(
        first.text("evidence_note"),
        Some("Product: new fertiliser grade")
    );

    let second = &normalized.records[1];
    assert_eq!(second.number("product_innovation"), Some(2.0));
    assert_eq!(second.number("process_innovation"), Some(1.0));
    assert_eq!(second.text("evidence_note"), None);
}

#[test]
fn numeric_text_in_innovation_columns_is_read_as_a_number() {
    let table = raw_table(
        "panel",
        &["ticker", "fiscal_year", "product_innovation", "process_innovation"],
        vec![
            vec!["AAA".into(), "2023".into(), "2".into(), "0".into()],
            vec!["AAA".into(), "2024".into(), " 1.0 ".into(), "0".into()],
            vec!["AAA".into(), "2022".into(), "line 2 upgraded".into(), "0".into()],
        ],
    );
    let normalized = normalize_table(&table).expect("key columns present");

    let invalid = &normalized.records[0];
    assert_eq!(invalid.get("product_innovation"), Some(&FieldValue::Float(2.0)));
    assert_eq!(invalid.text("evidence_note"), None);

    let flagged = &normalized.records[1];
    assert_eq!(flagged.get("product_innovation"), Some(&FieldValue::Integer(1)));
    assert_eq!(flagged.text("evidence_note"), None);

    let note_only = &normalized.records[2];
    assert!(!note_only.has("product_innovation"));
    assert_eq!(note_only.text("evidence_note"), Some("Product: line 2 upgraded"));

    let validator = Validator::new(QcConfig::default()).expect("default config is valid");
    let report = validator.validate_all(&normalized.records);
    let found: Vec<(i32, &str, ErrorType)> = report
        .iter()
        .map(|a| (a.fiscal_year, a.field_name.as_str(), a.error_type))
        .collect();
    assert_eq!(
        found,
        vec![
            (2023, "product_innovation", ErrorType::InvalidDummy),
            (2024, "evidence_note", ErrorType::MissingNote),
        ]
    );
}

#[test]
fn aliased_headers_keep_the_first_populated_cell() {
    let table = raw_table(
        "panel",
        &["ticker", "fiscal_year", "inventory", "total_inventory"],
        vec![
            vec!["AAA".into(), "2023".into(), "500".into(), RawCell::Empty],
            vec!["AAA".into(), "2024".into(), "n/a".into(), "700".into()],
            vec!["AAA".into(), "2025".into(), "800".into(), "900".into()],
        ],
    );
    assert_eq!(table.columns, vec!["ticker", "fiscal_year", "inventory"]);

    let normalized = normalize_table(&table).expect("key columns present");
    let inventory: Vec<Option<f64>> = normalized
        .records
        .iter()
        .map(|record| record.number("inventory"))
        .collect();
    assert_eq!(inventory, vec![Some(500.0), Some(700.0), Some(800.0)]);
}

#[test]
fn explicit_evidence_note_wins_over_derived_note() {
    let table = raw_table(
        "panel",
        &["ticker", "fiscal_year", "product_innovation", "evidence_note"],
        vec![vec![
            "GMD".into(),
            "2021".into(),
            "1 (port automation)".into(),
            "Annual report p. 12".into(),
        ]],
    );
    let normalized = normalize_table(&table).expect("key columns present");
    assert_eq!(
        normalized.records[0].text("evidence_note"),
        Some("Annual report p. 12")
    );
}

#[test]
fn merge_preserves_primary_rows_and_prefers_primary_values() {
    let primary = vec![
        FirmYearRecord::new("HPG", 2022).with_number("share_price", 20.0),
        FirmYearRecord::new("HPG", 2023),
        FirmYearRecord::new("VNM", 2023),
    ];
    let market = aux(
        "market",
        vec![
            FirmYearRecord::new("HPG", 2022).with_number("share_price", 99.0),
            FirmYearRecord::new("HPG", 2023).with_number("share_price", 25.0),
            FirmYearRecord::new("HPG", 2023).with_number("share_price", 26.0),
            FirmYearRecord::new("FPT", 2023).with_number("share_price", 90.0),
        ],
    );
    let innovation = aux(
        "innovation",
        vec![FirmYearRecord::new("VNM", 2023).with_text("evidence_note", "new dairy line")],
    );

    let merged = merge_panel(&primary, &[market, innovation]);
    assert_eq!(merged.len(), primary.len());
    let keys: Vec<_> = merged.iter().map(|r| r.key.clone()).collect();
    let expected: Vec<_> = primary.iter().map(|r| r.key.clone()).collect();
    assert_eq!(keys, expected);

    assert_eq!(merged[0].number("share_price"), Some(20.0));
    assert_eq!(merged[1].number("share_price"), Some(25.0));
    assert_eq!(merged[2].number("share_price"), None);
    assert_eq!(merged[2].text("evidence_note"), Some("new dairy line"));
}

#[test]
fn merge_without_auxiliary_tables_is_identity() {
    let primary = vec![
        FirmYearRecord::new("PVS", 2020).with_number("net_sales", 5.0),
        FirmYearRecord::new("PVS", 2020).with_number("net_sales", 6.0),
    ];
    assert_eq!(merge_panel(&primary, &[]), primary);
}

#[test]
fn share_price_is_derived_only_when_missing() {
    let mut missing = FirmYearRecord::new("GVR", 2024)
        .with_number("market_value_equity", 1_000.0)
        .with_integer("shares_outstanding", 50);
    assert!(derive_share_price(&mut missing));
    assert_eq!(missing.number("share_price"), Some(20.0));

    let mut present = missing.clone();
    assert!(!derive_share_price(&mut present));

    let mut zero_shares = FirmYearRecord::new("GVR", 2024)
        .with_number("market_value_equity", 1_000.0)
        .with_integer("shares_outstanding", 0);
    assert!(!derive_share_price(&mut zero_shares));
    assert!(!zero_shares.has("share_price"));
}
