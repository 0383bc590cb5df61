//! File-level round trips: export, snapshot, sample data, and load failures.

use std::fs;
use std::sync::Arc;

use sales_dash::app::pipeline::recompute;
use sales_dash::data::{SampleConfig, generate_sample};
use sales_dash::domain::FilterParams;
use sales_dash::error::AppError;
use sales_dash::filter::{apply, selection};
use sales_dash::io::export::{write_records_csv, write_view_csv};
use sales_dash::io::ingest::load_dataset;
use sales_dash::io::snapshot::write_snapshot_json;

fn sample(rows: usize) -> Vec<sales_dash::domain::SaleRecord> {
    generate_sample(&SampleConfig {
        rows,
        ..SampleConfig::default()
    })
    .unwrap()
}

#[test]
fn missing_file_is_a_data_load_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_dataset(&dir.path().join("nope.csv")).unwrap_err();
    assert!(matches!(err, AppError::DataLoad(_)));
    assert_eq!(err.exit_code(), 2);
}

#[test]
fn missing_columns_are_named() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("short.csv");
    fs::write(&path, "id,date,location\n1,2023-01-01,Astoria\n").unwrap();
    let err = load_dataset(&path).unwrap_err().to_string();
    assert!(err.contains("`sales`"), "{err}");
    assert!(err.contains("`quantity`"), "{err}");
}

#[test]
fn sample_data_loads_back_cleanly() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sample.csv");
    let records = sample(500);
    assert_eq!(write_records_csv(&path, &records).unwrap(), 500);

    let ds = load_dataset(&path).unwrap();
    assert_eq!(ds.len(), 500);
    assert!(ds.row_errors.is_empty());
    assert!(ds.has_hour_column);
    assert_eq!(ds.records, records);
}

#[test]
fn filtered_export_reloads_to_the_same_dashboard() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("sample.csv");
    write_records_csv(&source, &sample(800)).unwrap();
    let ds = Arc::new(load_dataset(&source).unwrap());

    let mut params = FilterParams::select_all(&ds);
    params.locations = selection(["Astoria"]);
    let view = apply(&ds, &params);

    let out = dir.path().join("filtered.csv");
    let n = write_view_csv(&out, &view).unwrap();
    assert_eq!(n, view.len());

    let reloaded = Arc::new(load_dataset(&out).unwrap());
    let before = recompute(&ds, &params);
    let after = recompute(&reloaded, &FilterParams::select_all(&reloaded));
    assert_eq!(after.rows, before.rows);
    assert!((after.kpis.total_revenue - before.kpis.total_revenue).abs() < 1e-6);
    assert_eq!(after.kpis.total_orders, before.kpis.total_orders);
    assert_eq!(after.hours, before.hours);
    assert_eq!(after.insights, before.insights);
}

#[test]
fn snapshot_is_valid_json() {
    let dir = tempfile::tempdir().unwrap();
    let ds = Arc::new(sales_dash::io::ingest::Dataset::from_records("mem", sample(200)));
    let dash = recompute(&ds, &FilterParams::select_all(&ds));

    let path = dir.path().join("dashboard.json");
    write_snapshot_json(&path, &dash).unwrap();
    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(json["rows"], 200);
    assert_eq!(json["insights"]["monthly"]["kind"], "finding");
    assert!(json.get("view").is_none());
}

#[test]
fn export_to_a_missing_directory_fails() {
    let dir = tempfile::tempdir().unwrap();
    let ds = Arc::new(sales_dash::io::ingest::Dataset::from_records("mem", sample(10)));
    let view = apply(&ds, &FilterParams::select_all(&ds));
    let err = write_view_csv(&dir.path().join("no/such/dir/out.csv"), &view).unwrap_err();
    assert!(matches!(err, AppError::Export(_)));
}
