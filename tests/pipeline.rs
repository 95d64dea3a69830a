use std::fs;

use firm_panel_qc::QcError;
use firm_panel_qc::config::QcConfig;
use firm_panel_qc::io::{csv_read, excel_read, excel_write};
use firm_panel_qc::model::normalize_table;
use firm_panel_qc::pipeline::{self, PanelJob, PanelSources, TableSource};
use firm_panel_qc::report::{AnomalyReport, ErrorType};
use firm_panel_qc::table::{SheetCell, SheetTable, build_panel_table};
use tempfile::tempdir;

const PANEL_CSV: &str = "\
ticker,fiscal_year,state_own,total_assets,total_liabilities,total_shareholders_equity,shares_outstanding,market_value_equity,product_innovation,process_innovation
hpg,2023,\"0,4\",1000,600,400,100,\"2,000.00\",1 (new furnace),0
VNM,2023,1.2,1000,600,100,100,1000,0,0
,2023,0.1,1,1,1,1,1,0,0
";

const MARKET_CSV: &str = "\
ticker,fiscal_year,share_price
HPG,2023,20
VNM,2023,10
VNM,2023,11
";

fn job(dir: &std::path::Path, output: &str, config: QcConfig) -> PanelJob {
    let panel = dir.join("panel.csv");
    let market = dir.join("market.csv");
    fs::write(&panel, PANEL_CSV).expect("panel written");
    fs::write(&market, MARKET_CSV).expect("market written");
    PanelJob {
        sources: PanelSources {
            primary: TableSource::new(panel),
            auxiliary: vec![TableSource::new(market)],
        },
        config,
        output: dir.join(output),
    }
}

#[test]
fn check_writes_csv_report_with_fixed_columns() {
    let temp_dir = tempdir().expect("temporary directory");
    let job = job(temp_dir.path(), "report.csv", QcConfig::default());

    let outcome = pipeline::check(&job).expect("check succeeds");
    assert_eq!(outcome.records, 2);
    assert_eq!(outcome.rejected.len(), 1);

    let kinds: Vec<(String, ErrorType)> = outcome
        .report
        .iter()
        .map(|a| (a.ticker.clone(), a.error_type))
        .collect();
    assert_eq!(
        kinds,
        vec![
            ("VNM".to_string(), ErrorType::RangeError),
            ("VNM".to_string(), ErrorType::AccountingImbalance),
        ]
    );

    let written = fs::read_to_string(&job.output).expect("report read");
    let mut lines = written.trim_start_matches('\u{feff}').lines();
    assert_eq!(
        lines.next(),
        Some("ticker,fiscal_year,field_name,error_type,message")
    );
    assert!(lines.next().expect("first anomaly").starts_with("VNM,2023,state_own,RANGE_ERROR,"));
}

#[test]
fn missing_share_price_is_derived_after_merge() {
    let temp_dir = tempdir().expect("temporary directory");
    let panel = temp_dir.path().join("panel.csv");
    fs::write(
        &panel,
        "ticker,fiscal_year,shares_outstanding,market_value_equity\nDPM,2022,100,5000\n",
    )
    .expect("panel written");
    let config = QcConfig {
        derive_share_price: true,
        ..QcConfig::default()
    };
    let loaded = pipeline::load_panel(
        &PanelSources {
            primary: TableSource::new(&panel),
            auxiliary: Vec::new(),
        },
        &config,
    )
    .expect("panel loads");
    assert_eq!(loaded.derived_prices, 1);
    assert_eq!(loaded.records[0].number("share_price"), Some(50.0));
}

#[test]
fn check_writes_json_report() {
    let temp_dir = tempdir().expect("temporary directory");
    let job = job(temp_dir.path(), "report.json", QcConfig::default());
    pipeline::check(&job).expect("check succeeds");

    let written = fs::read_to_string(&job.output).expect("report read");
    let parsed: serde_json::Value = serde_json::from_str(&written).expect("JSON parsed");
    let first = &parsed[0];
    assert_eq!(first["ticker"], "VNM");
    assert_eq!(first["fiscal_year"], 2023);
    assert_eq!(first["error_type"], "RANGE_ERROR");
}

#[test]
fn clean_panel_yields_empty_report() {
    let temp_dir = tempdir().expect("temporary directory");
    let panel = temp_dir.path().join("panel.csv");
    fs::write(&panel, "ticker,fiscal_year,state_own\nBSR,2024,0.2\n").expect("panel written");
    let job = PanelJob {
        sources: PanelSources {
            primary: TableSource::new(&panel),
            auxiliary: Vec::new(),
        },
        config: QcConfig::default(),
        output: temp_dir.path().join("report.xlsx"),
    };

    let outcome = pipeline::check(&job).expect("check succeeds");
    assert!(outcome.report.is_clean());
    assert!(job.output.exists());
}

#[test]
fn export_round_trips_through_xlsx() {
    let temp_dir = tempdir().expect("temporary directory");
    let job = job(temp_dir.path(), "panel.xlsx", QcConfig::default());

    let written = pipeline::export_panel(&job).expect("export succeeds");
    assert_eq!(written, 2);

    let raw = excel_read::read_table(&job.output, None).expect("Excel read");
    let restored = normalize_table(&raw).expect("keys present");
    let tickers: Vec<&str> = restored.records.iter().map(|r| r.ticker()).collect();
    assert_eq!(tickers, vec!["HPG", "VNM"]);
    let hpg = &restored.records[0];
    assert_eq!(hpg.number("state_own"), Some(0.4));
    assert_eq!(hpg.number("total_equity"), Some(400.0));
    assert_eq!(hpg.number("share_price"), Some(20.0));
    assert_eq!(hpg.text("evidence_note"), Some("Product: new furnace"));
}

#[test]
fn report_sheet_survives_excel_and_csv_readers() {
    let temp_dir = tempdir().expect("temporary directory");
    let report = AnomalyReport::default();
    let table = report.to_sheet_table();
    let xlsx_path = temp_dir.path().join("empty.xlsx");
    excel_write::write_workbook(&xlsx_path, &[table]).expect("Excel written");
    let raw = excel_read::read_table(&xlsx_path, Some(AnomalyReport::SHEET_NAME))
        .expect("Excel read");
    assert_eq!(raw.columns, AnomalyReport::COLUMNS);

    let csv_path = temp_dir.path().join("panel.csv");
    let panel = SheetTable {
        sheet_name: "panel".to_string(),
        columns: vec!["ticker".into(), "fiscal_year".into(), "net_sales".into()],
        rows: vec![vec![
            SheetCell::Text("PC1".into()),
            SheetCell::Number(2021.0),
            SheetCell::Blank,
        ]],
    };
    pipeline::write_table(&csv_path, &panel).expect("CSV written");
    let raw = csv_read::read_table(&csv_path).expect("CSV read");
    assert_eq!(raw.columns, vec!["ticker", "fiscal_year", "net_sales"]);
    let records = normalize_table(&raw).expect("keys present").records;
    assert_eq!(records[0].fiscal_year(), 2021);
    assert!(!records[0].has("net_sales"));
}

#[test]
fn panel_table_sorts_and_lists_schema_columns_first() {
    use firm_panel_qc::model::FirmYearRecord;

    let records = vec![
        FirmYearRecord::new("VSC", 2022).with_text("trading_date", "2022-12-30"),
        FirmYearRecord::new("DHG", 2023),
        FirmYearRecord::new("DHG", 2021),
    ];
    let table = build_panel_table(&records);
    assert_eq!(&table.columns[..3], ["ticker", "fiscal_year", "managerial_inside_own"]);
    assert_eq!(table.columns.last().map(String::as_str), Some("trading_date"));
    let order: Vec<(String, String)> = table
        .rows
        .iter()
        .map(|row| (row[0].render(), row[1].render()))
        .collect();
    assert_eq!(
        order,
        vec![
            ("DHG".to_string(), "2021".to_string()),
            ("DHG".to_string(), "2023".to_string()),
            ("VSC".to_string(), "2022".to_string()),
        ]
    );
}

#[test]
fn unknown_extension_and_missing_input_are_errors() {
    let temp_dir = tempdir().expect("temporary directory");
    let missing = PanelSources {
        primary: TableSource::new(temp_dir.path().join("absent.csv")),
        auxiliary: Vec::new(),
    };
    assert!(matches!(
        pipeline::load_panel(&missing, &QcConfig::default()),
        Err(QcError::MissingInput(_))
    ));

    let text = temp_dir.path().join("panel.txt");
    fs::write(&text, "ticker,fiscal_year\n").expect("file written");
    let unsupported = PanelSources {
        primary: TableSource::new(text),
        auxiliary: Vec::new(),
    };
    assert!(matches!(
        pipeline::load_panel(&unsupported, &QcConfig::default()),
        Err(QcError::UnsupportedFormat(_))
    ));
}

#[test]
fn config_file_overrides_only_given_keys() {
    let temp_dir = tempdir().expect("temporary directory");
    let path = temp_dir.path().join("qc.toml");
    fs::write(
        &path,
        "growth_upper = 3.0\nnon_positive_fields = [\"capex\"]\n\n[[component_bounds]]\nparts = [\"net_income\"]\nparent = \"net_sales\"\n",
    )
    .expect("config written");

    let config = QcConfig::from_toml_file(&path).expect("config parsed");
    assert_eq!(config.growth_upper, 3.0);
    assert_eq!(config.growth_lower, -0.95);
    assert_eq!(config.non_positive_fields, vec!["capex"]);
    assert_eq!(config.component_bounds.len(), 1);
    assert!(config.component_bounds[0].description.is_empty());
    assert_eq!(config.ownership_fields, QcConfig::default().ownership_fields);

    assert!(matches!(
        QcConfig::from_toml_str("market_cap_tolerance = -1.0"),
        Err(QcError::InvalidConfig(_))
    ));
}
