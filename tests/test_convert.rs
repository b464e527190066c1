//! Tests for the convert subcommand

use dropstat::cli::convert::{default_output_path, run_convert};
use dropstat::pipeline::{load_dataset, records_from_frame, LoadOptions};
use polars::prelude::*;
use tempfile::TempDir;

#[path = "common/mod.rs"]
mod common;

#[test]
fn test_csv_to_parquet_normalizes_headers() {
    let temp_dir = TempDir::new().unwrap();
    let csv_path = common::write_three_row_csv(&temp_dir);
    let parquet_path = temp_dir.path().join("alunos_norm.parquet");

    let (rows, cols) = run_convert(&csv_path, Some(&parquet_path), &LoadOptions::default()).unwrap();

    assert_eq!((rows, cols), (3, 10));
    let df = LazyFrame::scan_parquet(&parquet_path, Default::default())
        .unwrap()
        .collect()
        .unwrap();
    assert_eq!(df.shape(), (3, 10));
    assert_eq!(df.get_column_names()[1].as_str(), "estágio");
}

#[test]
fn test_converted_file_loads_back_into_records() {
    let temp_dir = TempDir::new().unwrap();
    let csv_path = common::write_three_row_csv(&temp_dir);
    let parquet_path = temp_dir.path().join("roundtrip.parquet");
    run_convert(&csv_path, Some(&parquet_path), &LoadOptions::default()).unwrap();

    let df = load_dataset(&parquet_path, &LoadOptions::default()).unwrap();
    let records = records_from_frame(&df).unwrap();

    assert_eq!(records.len(), 3);
    assert_eq!(records[0].withdrawal_reason.as_deref(), Some("A"));
}

#[test]
fn test_convert_to_csv() {
    let temp_dir = TempDir::new().unwrap();
    let csv_path = common::write_three_row_csv(&temp_dir);
    let out_path = temp_dir.path().join("normalized.csv");

    run_convert(&csv_path, Some(&out_path), &LoadOptions::default()).unwrap();

    let content = std::fs::read_to_string(&out_path).unwrap();
    assert!(content.starts_with("nome,estágio,data_de_desistência_do_curso"));
}

#[test]
fn test_convert_default_output_path() {
    let temp_dir = TempDir::new().unwrap();
    let csv_path = common::write_three_row_csv(&temp_dir);

    run_convert(&csv_path, None, &LoadOptions::default()).unwrap();

    assert!(default_output_path(&csv_path).exists());
}

#[test]
fn test_convert_missing_input_fails() {
    let temp_dir = TempDir::new().unwrap();
    let missing = temp_dir.path().join("missing.csv");
    let out = temp_dir.path().join("out.parquet");

    assert!(run_convert(&missing, Some(&out), &LoadOptions::default()).is_err());
    assert!(!out.exists());
}
